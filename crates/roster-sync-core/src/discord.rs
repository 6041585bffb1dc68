//! [`Messaging`] over the Discord REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::DiscordConfig;
use crate::error::MessagingError;
use crate::messaging::{Message, Messaging};
use crate::types::{MessageRef, SurfaceBinding};

pub struct DiscordMessaging {
    client: reqwest::Client,
    api_base: String,
    token: String,
}

/// Discord JSON error code for a message that no longer exists.
const UNKNOWN_MESSAGE: u64 = 10008;

/// The subset of a Discord error body used to classify a 404.
#[derive(Deserialize)]
struct ApiError {
    code: u64,
}

/// The subset of a Discord message object the engine reads.
#[derive(Deserialize)]
struct ApiMessage {
    id: String,
    channel_id: String,
}

impl DiscordMessaging {
    pub fn new(
        api_base: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MessagingError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MessagingError::Http(e.to_string()))?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Build a client from config, reading the bot token from the configured env var.
    pub fn from_config(config: &DiscordConfig) -> Result<Self, MessagingError> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| MessagingError::MissingToken(config.token_env.clone()))?;
        Self::new(
            config.api_base.as_str(),
            token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn message_url(&self, channel_id: &str, message_id: &str) -> String {
        format!(
            "{}/channels/{}/messages/{}",
            self.api_base, channel_id, message_id
        )
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, MessagingError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        // Unknown channel (10003) is also a 404; only a gone message counts.
        if status == StatusCode::NOT_FOUND && is_unknown_message(&body) {
            return Err(MessagingError::NotFound);
        }
        Err(MessagingError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

fn is_unknown_message(body: &str) -> bool {
    serde_json::from_str::<ApiError>(body).is_ok_and(|e| e.code == UNKNOWN_MESSAGE)
}

#[async_trait]
impl Messaging for DiscordMessaging {
    async fn fetch_message(
        &self,
        binding: &SurfaceBinding,
        message_ref: &MessageRef,
    ) -> Result<Message, MessagingError> {
        let response = self
            .client
            .get(self.message_url(&binding.channel_id, message_ref.as_str()))
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await
            .map_err(|e| MessagingError::Http(e.to_string()))?;
        let message: ApiMessage = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| MessagingError::Http(e.to_string()))?;
        Ok(Message {
            channel_id: message.channel_id,
            id: MessageRef(message.id),
        })
    }

    async fn delete_message(&self, message: &Message) -> Result<(), MessagingError> {
        let response = self
            .client
            .delete(self.message_url(&message.channel_id, message.id.as_str()))
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await
            .map_err(|e| MessagingError::Http(e.to_string()))?;
        Self::check(response).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
