use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingChoice,
}

/// What the bot should do in response to one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ShowMenu,
    Greet,
    ShowQuotes,
    ShowPortfolio,
    ShowRecommendations,
    InvalidOption,
    Ignore,
}

/// Pure state machine step. `text` is matched case-insensitively.
pub fn transition(state: ConversationState, text: &str) -> (ConversationState, Action) {
    let text = text.trim().to_lowercase();
    match state {
        ConversationState::AwaitingChoice => {
            if is_choice(&text, "1") {
                (ConversationState::Idle, Action::ShowQuotes)
            } else if is_choice(&text, "2") {
                (ConversationState::Idle, Action::ShowPortfolio)
            } else if is_choice(&text, "3") || text.contains("recomenda") {
                (ConversationState::Idle, Action::ShowRecommendations)
            } else {
                (ConversationState::AwaitingChoice, Action::InvalidOption)
            }
        }
        ConversationState::Idle => {
            if text.contains("investimento") {
                (ConversationState::AwaitingChoice, Action::ShowMenu)
            } else if text.contains("oi") {
                (ConversationState::Idle, Action::Greet)
            } else {
                (ConversationState::Idle, Action::Ignore)
            }
        }
    }
}

fn is_choice(text: &str, digit: &str) -> bool {
    text == digit
        || ["option", "opção", "opcao"]
            .iter()
            .any(|word| text.contains(&format!("{word} {digit}")))
}

/// Per-sender conversation state. Senders without an entry are idle.
#[derive(Debug, Default)]
pub struct ConversationStore {
    states: Mutex<HashMap<String, ConversationState>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one message for `sender` and returns the resulting action.
    pub async fn advance(&self, sender: &str, text: &str) -> Action {
        let mut states = self.states.lock().await;
        let current = states.get(sender).copied().unwrap_or_default();
        let (next, action) = transition(current, text);

        match next {
            ConversationState::Idle => {
                states.remove(sender);
            }
            other => {
                states.insert(sender.to_string(), other);
            }
        }

        tracing::debug!(%sender, from = ?current, to = ?next, ?action, "conversation step");
        action
    }

    pub async fn state_of(&self, sender: &str) -> ConversationState {
        self.states
            .lock()
            .await
            .get(sender)
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::ConversationState::*;

    #[test]
    fn idle_triggers() {
        assert_eq!(transition(Idle, "Quero falar de INVESTIMENTO"), (AwaitingChoice, Action::ShowMenu));
        assert_eq!(transition(Idle, "Oi"), (Idle, Action::Greet));
        assert_eq!(transition(Idle, "bom dia"), (Idle, Action::Ignore));
        // A bare choice means nothing outside the menu.
        assert_eq!(transition(Idle, "1"), (Idle, Action::Ignore));
    }

    #[test]
    fn menu_choices() {
        assert_eq!(transition(AwaitingChoice, "1"), (Idle, Action::ShowQuotes));
        assert_eq!(transition(AwaitingChoice, "Option 1 please"), (Idle, Action::ShowQuotes));
        assert_eq!(transition(AwaitingChoice, "opção 2"), (Idle, Action::ShowPortfolio));
        assert_eq!(transition(AwaitingChoice, " 3 "), (Idle, Action::ShowRecommendations));
        assert_eq!(transition(AwaitingChoice, "quero recomendações"), (Idle, Action::ShowRecommendations));
    }

    #[test]
    fn invalid_choice_keeps_waiting() {
        assert_eq!(transition(AwaitingChoice, "4"), (AwaitingChoice, Action::InvalidOption));
        assert_eq!(transition(AwaitingChoice, "12"), (AwaitingChoice, Action::InvalidOption));
    }

    #[tokio::test]
    async fn store_tracks_senders_independently() {
        let store = ConversationStore::new();

        assert_eq!(store.advance("a@s", "investimento").await, Action::ShowMenu);
        assert_eq!(store.state_of("a@s").await, AwaitingChoice);
        assert_eq!(store.state_of("b@s").await, Idle);

        assert_eq!(store.advance("b@s", "2").await, Action::Ignore);
        assert_eq!(store.advance("a@s", "x").await, Action::InvalidOption);
        assert_eq!(store.advance("a@s", "2").await, Action::ShowPortfolio);
        assert_eq!(store.state_of("a@s").await, Idle);
    }
}
