use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::Value;

use super::command::OptionType;
use super::permissions::Permissions;

/// A signed HTTP request as received. Nothing here is trusted until the
/// signature has been checked against `raw_body`.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    headers: HeaderMap,
    raw_body: Bytes,
}

impl InboundEvent {
    pub fn new(headers: HeaderMap, raw_body: Bytes) -> Self {
        Self { headers, raw_body }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    /// Parse the body. Call only after verification.
    pub fn payload(&self) -> Result<InteractionPayload, PayloadError> {
        serde_json::from_slice(&self.raw_body).map_err(PayloadError::Malformed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("malformed interaction payload: {0}")]
    Malformed(serde_json::Error),
    #[error("interaction payload has no command data")]
    MissingCommandData,
    #[error("unsupported interaction type {0}")]
    UnsupportedType(u8),
}

/// Interaction kinds as numbered by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionType {
    Ping = 1,
    ApplicationCommand = 2,
    MessageComponent = 3,
    Autocomplete = 4,
    ModalSubmit = 5,
}

impl InteractionType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Ping),
            2 => Some(Self::ApplicationCommand),
            3 => Some(Self::MessageComponent),
            4 => Some(Self::Autocomplete),
            5 => Some(Self::ModalSubmit),
            _ => None,
        }
    }
}

/// Wire shape of an interaction. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionPayload {
    #[serde(default)]
    pub id: String,
    pub application_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: u8,
    pub data: Option<CommandData>,
    pub guild_id: Option<String>,
    pub channel_id: Option<String>,
    pub member: Option<Member>,
    pub user: Option<User>,
    pub token: Option<String>,
}

impl InteractionPayload {
    pub fn interaction_type(&self) -> Option<InteractionType> {
        InteractionType::from_code(self.kind)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandData {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandDataOption>,
    #[serde(default)]
    pub resolved: Resolved,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandDataOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub value: Option<Value>,
    /// Nested options of a subcommand or subcommand group.
    #[serde(default)]
    pub options: Vec<CommandDataOption>,
}

impl CommandDataOption {
    pub fn option_type(&self) -> Option<OptionType> {
        OptionType::from_code(self.kind)
    }
}

/// Full objects for the ids referenced by user/role options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Resolved {
    #[serde(default)]
    pub users: HashMap<String, User>,
    #[serde(default)]
    pub roles: HashMap<String, Role>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    pub global_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub user: Option<User>,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Decimal string of the member's effective permission bits.
    pub permissions: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}

/// One invocation of a command, handed to its handler.
#[derive(Debug, Clone)]
pub struct Interaction {
    pub id: String,
    pub command_name: String,
    pub options: Vec<CommandDataOption>,
    pub resolved: Resolved,
    pub guild_id: Option<String>,
    pub channel_id: Option<String>,
    pub member: Option<Member>,
    pub user: Option<User>,
}

impl Interaction {
    pub fn new(command_name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            command_name: command_name.into(),
            options: Vec::new(),
            resolved: Resolved::default(),
            guild_id: None,
            channel_id: None,
            member: None,
            user: None,
        }
    }

    pub fn from_payload(payload: InteractionPayload) -> Result<Self, PayloadError> {
        match payload.interaction_type() {
            Some(InteractionType::ApplicationCommand) => {}
            _ => return Err(PayloadError::UnsupportedType(payload.kind)),
        }
        let data = payload.data.ok_or(PayloadError::MissingCommandData)?;
        Ok(Self {
            id: payload.id,
            command_name: data.name,
            options: data.options,
            resolved: data.resolved,
            guild_id: payload.guild_id,
            channel_id: payload.channel_id,
            member: payload.member,
            user: payload.user,
        })
    }

    /// Add a top-level option value.
    pub fn with_option(mut self, name: &str, kind: OptionType, value: Value) -> Self {
        self.options.push(CommandDataOption {
            name: name.to_string(),
            kind: kind as u8,
            value: Some(value),
            options: Vec::new(),
        });
        self
    }

    /// The invoking user. In a guild the user sits on `member`, in DMs on `user`.
    pub fn caller(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_ref())
    }

    pub fn string_option(&self, name: &str) -> Option<&str> {
        self.option(name).and_then(Value::as_str)
    }

    pub fn integer_option(&self, name: &str) -> Option<i64> {
        self.option(name).and_then(Value::as_i64)
    }

    pub fn role_option(&self, name: &str) -> Option<&Role> {
        let id = self.string_option(name)?;
        self.resolved.roles.get(id)
    }

    /// Permissions of the calling member; empty outside a guild.
    pub fn member_permissions(&self) -> Permissions {
        self.member
            .as_ref()
            .and_then(|m| m.permissions.as_deref())
            .map(Permissions::from_decimal)
            .unwrap_or(Permissions::empty())
    }
}
