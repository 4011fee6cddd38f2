use investbot_core::chat::MessageSender;

/// Stand-in sender used when the Evolution API is not configured.
pub struct LogOnlySender;

#[async_trait::async_trait]
impl MessageSender for LogOnlySender {
    async fn send_text(&self, to: &str, text: &str) -> anyhow::Result<()> {
        tracing::info!(%to, %text, "reply not sent (evolution api not configured)");
        Ok(())
    }
}
