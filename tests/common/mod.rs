#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use discord_compat::context::message::{ChannelMessage, User};
use discord_compat::context::payload::{InteractionMessage, MessageEdit, MessagePayload};
use discord_compat::discord::model::{CommandData, DataOption};
use discord_compat::{
    CommandError, CommandEvent, CompatBot, CompatError, Context, Host, Interaction, MessageSink,
    Result,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Respond(Option<String>),
    Followup(Option<String>),
    EditResponse(Option<String>),
    EditOriginal(Option<String>),
    Defer { loading: bool, ephemeral: bool },
}

/// In-memory interaction that enforces the one-response rule like the platform does.
pub struct FakeInteraction {
    id: String,
    user: User,
    guild_id: Option<String>,
    responded: AtomicBool,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeInteraction {
    pub fn new(guild_id: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            id: "900".to_string(),
            user: User {
                id: "42".to_string(),
                username: "ann".to_string(),
                bot: None,
            },
            guild_id: guild_id.map(str::to_string),
            responded: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn first_response(&self, call: Call) -> Result<()> {
        if self.responded.swap(true, Ordering::SeqCst) {
            return Err(CompatError::new("interaction_responded"));
        }
        self.record(call);
        Ok(())
    }
}

#[async_trait]
impl Interaction for FakeInteraction {
    fn id(&self) -> &str {
        &self.id
    }

    fn user(&self) -> &User {
        &self.user
    }

    fn channel_id(&self) -> &str {
        "77"
    }

    fn guild_id(&self) -> Option<&str> {
        self.guild_id.as_deref()
    }

    fn is_responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }

    async fn respond(&self, message: InteractionMessage) -> Result<()> {
        self.first_response(Call::Respond(message.content))
    }

    async fn followup(&self, message: InteractionMessage) -> Result<()> {
        self.record(Call::Followup(message.content));
        Ok(())
    }

    async fn edit_response(&self, edit: MessageEdit) -> Result<()> {
        self.first_response(Call::EditResponse(edit.content))
    }

    async fn edit_original(&self, edit: MessageEdit) -> Result<()> {
        self.record(Call::EditOriginal(edit.content));
        Ok(())
    }

    async fn defer(&self, loading: bool, ephemeral: bool) -> Result<()> {
        self.first_response(Call::Defer { loading, ephemeral })
    }
}

#[derive(Default)]
pub struct FakeSink {
    counter: AtomicUsize,
    pub sent: Mutex<Vec<(String, MessagePayload)>>,
    pub edited: Mutex<Vec<(String, MessageEdit)>>,
    pub deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl MessageSink for FakeSink {
    async fn send_message(&self, channel_id: &str, payload: &MessagePayload) -> Result<ChannelMessage> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .unwrap()
            .push((channel_id.to_string(), payload.clone()));
        Ok(ChannelMessage {
            id: format!("sent-{}", n),
            channel_id: channel_id.to_string(),
            content: payload.content.clone().unwrap_or_default(),
            ..Default::default()
        })
    }

    async fn edit_message(&self, _channel_id: &str, message_id: &str, edit: &MessageEdit) -> Result<()> {
        self.edited
            .lock()
            .unwrap()
            .push((message_id.to_string(), edit.clone()));
        Ok(())
    }

    async fn delete_message(&self, _channel_id: &str, message_id: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(message_id.to_string());
        Ok(())
    }
}

/// Host that records events and can be told to fail its global checks.
pub struct RecordingHost {
    pub pass_checks: AtomicBool,
    pub events: Mutex<Vec<&'static str>>,
    pub errors: Mutex<Vec<CommandError>>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            pass_checks: AtomicBool::new(true),
            events: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingHost {
    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<CommandError> {
        self.errors.lock().unwrap().clone()
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn evaluate_once(&self, _ctx: &Context) -> std::result::Result<bool, CommandError> {
        Ok(self.pass_checks.load(Ordering::SeqCst))
    }

    async fn emit(&self, event: CommandEvent<'_>) {
        if let CommandEvent::CommandError(_, error) = &event {
            self.errors.lock().unwrap().push((*error).clone());
        }
        self.events.lock().unwrap().push(event.name());
    }
}

pub struct Harness {
    pub host: Arc<RecordingHost>,
    pub sink: Arc<FakeSink>,
    pub bot: CompatBot,
}

pub fn harness() -> Harness {
    let host = Arc::new(RecordingHost::default());
    let sink = Arc::new(FakeSink::default());
    let bot = CompatBot::new(host.clone(), sink.clone());
    Harness { host, sink, bot }
}

pub fn option(name: &str, kind: u8, value: serde_json::Value) -> DataOption {
    DataOption {
        name: name.to_string(),
        kind,
        value: Some(value),
        options: Vec::new(),
    }
}

pub fn data(name: &str, options: Vec<DataOption>) -> CommandData {
    CommandData {
        id: "1".to_string(),
        name: name.to_string(),
        kind: 1,
        options,
    }
}

pub fn channel_message(content: &str) -> ChannelMessage {
    ChannelMessage {
        id: "m1".to_string(),
        author: User {
            id: "42".to_string(),
            username: "ann".to_string(),
            bot: None,
        },
        channel_id: "77".to_string(),
        content: content.to_string(),
        ..Default::default()
    }
}
