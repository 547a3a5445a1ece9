use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::api::RestClient;
use super::model::{INTERACTION_APPLICATION_COMMAND, InteractionPayload, InteractionResponse};
use crate::context::message::User;
use crate::context::payload::{EPHEMERAL_FLAG, InteractionMessage, MessageEdit};
use crate::error::{CompatError, Result};
use crate::host::Interaction;

/// https://discord.com/developers/docs/interactions/receiving-and-responding#interaction-response-object-interaction-callback-type
const CHANNEL_MESSAGE_WITH_SOURCE: u8 = 4;
const DEFERRED_CHANNEL_MESSAGE_WITH_SOURCE: u8 = 5;
const DEFERRED_UPDATE_MESSAGE: u8 = 6;
const UPDATE_MESSAGE: u8 = 7;

/// An interaction answered over the REST callback and webhook endpoints.
#[derive(Debug)]
pub struct HttpInteraction {
    rest: Arc<RestClient>,
    payload: InteractionPayload,
    user: User,
    responded: AtomicBool,
}

impl HttpInteraction {
    pub fn new(rest: Arc<RestClient>, payload: InteractionPayload) -> Result<Self> {
        let user = payload.invoker().cloned().ok_or_else(|| {
            CompatError::new("missing_user").push_str(format!("interaction {} has no user", payload.id))
        })?;
        Ok(Self {
            rest,
            payload,
            user,
            responded: AtomicBool::new(false),
        })
    }

    pub fn payload(&self) -> &InteractionPayload {
        &self.payload
    }

    fn ensure_pending(&self) -> Result<()> {
        if self.is_responded() {
            return Err(CompatError::new("interaction_responded")
                .push_str(format!("interaction {} has already been responded to", self.payload.id)));
        }
        Ok(())
    }

    async fn callback(&self, response: InteractionResponse) -> Result<()> {
        self.ensure_pending()?;
        self.rest
            .create_interaction_response(&self.payload.id, &self.payload.token, &response)
            .await?;
        self.responded.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Interaction for HttpInteraction {
    fn id(&self) -> &str {
        &self.payload.id
    }

    fn user(&self) -> &User {
        &self.user
    }

    fn channel_id(&self) -> &str {
        self.payload.channel_id.as_deref().unwrap_or_default()
    }

    fn guild_id(&self) -> Option<&str> {
        self.payload.guild_id.as_deref()
    }

    fn is_responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }

    async fn respond(&self, message: InteractionMessage) -> Result<()> {
        self.callback(InteractionResponse {
            kind: CHANNEL_MESSAGE_WITH_SOURCE,
            data: Some(message.data()),
        })
        .await
    }

    async fn followup(&self, message: InteractionMessage) -> Result<()> {
        self.rest
            .create_followup(&self.payload.application_id, &self.payload.token, message.data())
            .await
    }

    async fn edit_response(&self, edit: MessageEdit) -> Result<()> {
        self.callback(InteractionResponse {
            kind: UPDATE_MESSAGE,
            data: Some(serde_json::to_value(&edit)?),
        })
        .await
    }

    async fn edit_original(&self, edit: MessageEdit) -> Result<()> {
        self.rest
            .edit_original_response(&self.payload.application_id, &self.payload.token, &edit)
            .await
    }

    async fn defer(&self, loading: bool, ephemeral: bool) -> Result<()> {
        let kind = if loading || self.payload.kind == INTERACTION_APPLICATION_COMMAND {
            DEFERRED_CHANNEL_MESSAGE_WITH_SOURCE
        } else {
            DEFERRED_UPDATE_MESSAGE
        };
        let data = ephemeral.then(|| json!({ "flags": EPHEMERAL_FLAG }));
        self.callback(InteractionResponse { kind, data }).await
    }
}
