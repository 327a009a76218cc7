/// Messaging gateway contract
///
/// The bot never talks to a chat platform directly. A gateway delivers
/// `Inbound` messages and takes `Reply` values back; what the options turn
/// into (inline buttons, a reply keyboard, a numbered list) is up to the
/// gateway.

pub mod console;

pub use console::ConsoleGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::UserId;
use crate::BotError;

/// One text message received from a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inbound {
    pub user_id: UserId,
    pub text: String,
}

impl Inbound {
    pub fn new(user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            user_id,
            text: text.into(),
        }
    }
}

/// A selectable option attached to a reply
///
/// `id` is an opaque token the gateway may send back instead of the label
/// (used for habit selection). Options without an id are matched by label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyOption {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ReplyOption {
    /// Option that is answered with its own label
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: None,
        }
    }

    /// Option that carries an identifier token
    pub fn with_id(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: Some(id.into()),
        }
    }
}

/// Text sent back to a user, with the options they may pick from next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    #[serde(default)]
    pub options: Vec<ReplyOption>,
}

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: Vec<ReplyOption>) -> Self {
        self.options = options;
        self
    }

    /// Labels of the attached options, in order
    pub fn option_labels(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.label.as_str()).collect()
    }
}

/// Transport that feeds user messages to the bot and delivers its replies
#[async_trait]
pub trait MessagingGateway: Send {
    /// Wait for the next message. `None` means the transport is closed.
    async fn recv(&mut self) -> Result<Option<Inbound>, BotError>;

    /// Deliver a reply to one user
    async fn send(&mut self, user_id: UserId, reply: &Reply) -> Result<(), BotError>;
}
