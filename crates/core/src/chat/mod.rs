//! WhatsApp conversation layer on top of the Evolution API.

pub mod bot;
pub mod conversation;
pub mod evolution;
pub mod reply;
pub mod webhook;

pub use bot::{Bot, BotConfig};
pub use conversation::{Action, ConversationState, ConversationStore};
pub use evolution::{EvolutionClient, MessageSender};
pub use webhook::{IncomingText, WebhookEvent};
