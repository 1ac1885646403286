//! Message composer for the chat screen.

use super::{Form, ValidationErrors, present};
use travel_desk_api::types::{SendMessageRequest, UserId};

/// Longest message the composer accepts, in characters
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Fields of [`ChatComposer`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComposerField {
    /// Message text
    Content,
}

/// Composer bound to the open conversation
#[derive(Clone, Debug, Default)]
pub struct ChatComposer {
    /// Peer of the open conversation; `None` until one is selected
    pub receiver: Option<UserId>,
    /// Raw message text
    pub content: String,
}

impl ChatComposer {
    /// Empty composer for a conversation with `receiver`
    #[must_use]
    pub const fn to(receiver: UserId) -> Self {
        Self {
            receiver: Some(receiver),
            content: String::new(),
        }
    }
}

impl Form for ChatComposer {
    type Field = ComposerField;
    type Output = SendMessageRequest;

    fn key(field: ComposerField) -> &'static str {
        match field {
            ComposerField::Content => "content",
        }
    }

    fn set(&mut self, field: ComposerField, value: String) {
        match field {
            ComposerField::Content => self.content = value,
        }
    }

    fn validate(&self) -> Result<SendMessageRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let content = present(&self.content);
        match content {
            None => errors.insert("content", "Message cannot be empty"),
            Some(text) if text.chars().count() > MAX_MESSAGE_LEN => errors.insert(
                "content",
                format!("Message must be at most {MAX_MESSAGE_LEN} characters"),
            ),
            Some(_) => {},
        }
        if self.receiver.is_none() {
            errors.insert("receiver", "Select a conversation first");
        }

        match (&self.receiver, content) {
            (Some(receiver_id), Some(content)) if errors.is_empty() => Ok(SendMessageRequest {
                receiver_id: receiver_id.clone(),
                content: content.to_string(),
            }),
            _ => Err(errors),
        }
    }
}
