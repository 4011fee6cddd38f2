use crate::config::Settings;
use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;

#[async_trait::async_trait]
pub trait MessageSender: Send + Sync {
    /// Sends `text` to `to`, a WhatsApp JID or bare number.
    async fn send_text(&self, to: &str, text: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendTextRequest<'a> {
    number: &'a str,
    text: &'a str,
}

/// Evolution API `message/sendText` client.
#[derive(Debug, Clone)]
pub struct EvolutionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    instance: String,
}

impl EvolutionClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build evolution http client")?;

        Ok(Self {
            http,
            base_url: settings.require_evolution_api_url()?.to_string(),
            api_key: settings.require_evolution_api_key()?.to_string(),
            instance: settings.require_evolution_instance()?.to_string(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/message/sendText/{}",
            self.base_url.trim_end_matches('/'),
            self.instance
        )
    }
}

/// `5511999999999@s.whatsapp.net` -> `5511999999999`.
pub fn jid_number(jid: &str) -> &str {
    jid.split('@').next().unwrap_or(jid).trim()
}

#[async_trait::async_trait]
impl MessageSender for EvolutionClient {
    async fn send_text(&self, to: &str, text: &str) -> Result<()> {
        let number = jid_number(to);
        let res = self
            .http
            .post(self.url())
            .header("apikey", &self.api_key)
            .json(&SendTextRequest { number, text })
            .send()
            .await
            .context("evolution sendText request failed")?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            anyhow::bail!("evolution sendText failed: status={status} body={body}");
        }

        tracing::info!(%number, chars = text.chars().count(), "message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_jid_domain() {
        assert_eq!(jid_number("5511999999999@s.whatsapp.net"), "5511999999999");
        assert_eq!(jid_number("5511999999999"), "5511999999999");
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(SendTextRequest {
            number: "5511",
            text: "oi",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"number": "5511", "text": "oi"}));
    }
}
