//! Messaging-platform capability consumed by the sync engine.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MessagingError;
use crate::types::{MessageRef, SurfaceBinding};

/// A message that exists on the platform, as returned by a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub channel_id: String,
    pub id: MessageRef,
}

#[async_trait]
pub trait Messaging: Send + Sync {
    /// Fetch a message from the surface's channel.
    ///
    /// Fails with [`MessagingError::NotFound`] when the platform no longer
    /// has the message.
    async fn fetch_message(
        &self,
        binding: &SurfaceBinding,
        message_ref: &MessageRef,
    ) -> Result<Message, MessagingError>;

    async fn delete_message(&self, message: &Message) -> Result<(), MessagingError>;
}

/// Stand-in used when no surface is bound, so no platform call can happen.
pub struct Disconnected;

#[async_trait]
impl Messaging for Disconnected {
    async fn fetch_message(
        &self,
        _binding: &SurfaceBinding,
        _message_ref: &MessageRef,
    ) -> Result<Message, MessagingError> {
        Err(MessagingError::Unavailable)
    }

    async fn delete_message(&self, _message: &Message) -> Result<(), MessagingError> {
        Err(MessagingError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disconnected_never_reaches_a_platform() {
        let err = Disconnected
            .fetch_message(&SurfaceBinding::new("1"), &MessageRef::new("2"))
            .await
            .unwrap_err();
        assert!(matches!(err, MessagingError::Unavailable));
        assert!(!err.is_not_found());
    }
}
