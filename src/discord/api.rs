use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use super::model::{ApplicationInfo, DiscordErrorResponse, InteractionResponse};
use super::ratelimit::RateLimiter;
use crate::commands::schema::Scope;
use crate::config::CompatConfig;
use crate::context::message::ChannelMessage;
use crate::context::payload::{MessageEdit, MessagePayload};
use crate::error::{CompatError, Result};
use crate::host::MessageSink;

/// Bot-authenticated Discord REST client.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    token: String,
    api_base: Url,
    limiter: Arc<RateLimiter>,
}

impl RestClient {
    pub fn new(config: &CompatConfig) -> Self {
        Self {
            client: Client::new(),
            token: config.token.clone(),
            api_base: config.api_base.clone(),
            limiter: Arc::new(RateLimiter::new(config.rate_limit)),
        }
    }

    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Response> {
        let url = self.api_base.join(path)?;
        self.limiter.acquire().await;

        let mut request = self
            .client
            .request(method.clone(), url)
            .header("Authorization", format!("Bot {}", self.token));
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%method, path, %status, "discord request");

        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        if let Ok(discord_err) = serde_json::from_str::<DiscordErrorResponse>(&error_text) {
            return Err(CompatError::new("discord_api_error")
                .push_str(format!("{} /{}: {}", method, path, discord_err)));
        }
        Err(CompatError::new("http_error")
            .push_str(format!("{} /{}: {} - {}", method, path, status, error_text)))
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T> {
        Ok(self.request(method, path, body).await?.json().await?)
    }

    pub async fn application_id(&self) -> Result<String> {
        let info: ApplicationInfo = self
            .request_json(Method::GET, "oauth2/applications/@me", None)
            .await?;
        Ok(info.id)
    }

    /// https://discord.com/developers/docs/interactions/receiving-and-responding#create-interaction-response
    pub async fn create_interaction_response(
        &self,
        interaction_id: &str,
        interaction_token: &str,
        response: &InteractionResponse,
    ) -> Result<()> {
        let path = format!("interactions/{}/{}/callback", interaction_id, interaction_token);
        self.request(Method::POST, &path, Some(serde_json::to_value(response)?)).await?;
        Ok(())
    }

    pub async fn create_followup(&self, application_id: &str, interaction_token: &str, data: Value) -> Result<()> {
        let path = format!("webhooks/{}/{}", application_id, interaction_token);
        self.request(Method::POST, &path, Some(data)).await?;
        Ok(())
    }

    pub async fn edit_original_response(
        &self,
        application_id: &str,
        interaction_token: &str,
        edit: &MessageEdit,
    ) -> Result<()> {
        let path = format!("webhooks/{}/{}/messages/@original", application_id, interaction_token);
        self.request(Method::PATCH, &path, Some(serde_json::to_value(edit)?)).await?;
        Ok(())
    }

    /// Bulk overwrite the commands of `scope`.
    pub async fn sync_commands(&self, application_id: &str, scope: Scope, commands: &[Value]) -> Result<()> {
        let path = match scope {
            Scope::Global => format!("applications/{}/commands", application_id),
            Scope::Guild(guild_id) => format!("applications/{}/guilds/{}/commands", application_id, guild_id),
        };
        self.request(Method::PUT, &path, Some(Value::from(commands.to_vec()))).await?;
        info!(?scope, count = commands.len(), "synced application commands");
        Ok(())
    }
}

#[async_trait]
impl MessageSink for RestClient {
    async fn send_message(&self, channel_id: &str, payload: &MessagePayload) -> Result<ChannelMessage> {
        let path = format!("channels/{}/messages", channel_id);
        self.request_json(Method::POST, &path, Some(serde_json::to_value(payload)?))
            .await
    }

    async fn edit_message(&self, channel_id: &str, message_id: &str, edit: &MessageEdit) -> Result<()> {
        let path = format!("channels/{}/messages/{}", channel_id, message_id);
        self.request(Method::PATCH, &path, Some(serde_json::to_value(edit)?)).await?;
        Ok(())
    }

    async fn delete_message(&self, channel_id: &str, message_id: &str) -> Result<()> {
        let path = format!("channels/{}/messages/{}", channel_id, message_id);
        self.request(Method::DELETE, &path, None).await?;
        Ok(())
    }
}
