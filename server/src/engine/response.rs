use serde::Serialize;

/// Text substituted for the reply of any handler that fails.
pub const FALLBACK_REPLY: &str = "🤕 Something went wrong";

/// Embed colour used by `say`.
pub const SAY_COLOR: u32 = 0xff9900;

/// Message flag that makes a reply visible only to the caller.
const EPHEMERAL_FLAG: u64 = 1 << 6;

/// What a handler produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    Text(String),
    Reply(ReplyMessage),
    /// The handler deliberately sends no reply.
    None,
}

impl CommandResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn fallback() -> Self {
        Self::Text(FALLBACK_REPLY.to_string())
    }
}

impl From<String> for CommandResult {
    fn from(content: String) -> Self {
        Self::Text(content)
    }
}

impl From<&str> for CommandResult {
    fn from(content: &str) -> Self {
        Self::Text(content.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplyMessage {
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
    pub allowed_mentions: Option<AllowedMentions>,
    pub ephemeral: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
}

/// Which mention kinds the platform may ping. Empty `parse` pings no one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllowedMentions {
    pub parse: Vec<String>,
}

/// Wrap a message in a single coloured embed.
pub fn say(message: impl Into<String>, ephemeral: bool) -> CommandResult {
    CommandResult::Reply(ReplyMessage {
        embeds: vec![Embed {
            description: Some(message.into()),
            color: Some(SAY_COLOR),
            ..Embed::default()
        }],
        ephemeral,
        ..ReplyMessage::default()
    })
}

/// JSON body returned to the platform for a handled command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionResponse {
    pub tts: bool,
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
    pub allowed_mentions: AllowedMentions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl InteractionResponse {
    pub fn new(content: Option<String>, embeds: Vec<Embed>) -> Self {
        Self {
            tts: false,
            content,
            embeds,
            allowed_mentions: AllowedMentions::default(),
            flags: None,
        }
    }

    /// `None` when the handler chose not to reply.
    pub fn from_result(result: CommandResult) -> Option<Self> {
        match result {
            CommandResult::Text(content) => Some(Self::new(Some(content), Vec::new())),
            CommandResult::Reply(reply) => Some(Self {
                allowed_mentions: reply.allowed_mentions.unwrap_or_default(),
                flags: reply.ephemeral.then_some(EPHEMERAL_FLAG),
                ..Self::new(reply.content, reply.embeds)
            }),
            CommandResult::None => None,
        }
    }
}
