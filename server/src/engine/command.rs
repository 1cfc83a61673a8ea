use std::sync::Arc;

use serde::{Serialize, Serializer};

use super::handler::CommandHandler;

/// Option type tags, serialized as the platform's integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    SubCommand = 1,
    SubCommandGroup = 2,
    String = 3,
    Integer = 4,
    Boolean = 5,
    User = 6,
    Channel = 7,
    Role = 8,
    Mentionable = 9,
    Number = 10,
    Attachment = 11,
}

impl OptionType {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::SubCommand,
            2 => Self::SubCommandGroup,
            3 => Self::String,
            4 => Self::Integer,
            5 => Self::Boolean,
            6 => Self::User,
            7 => Self::Channel,
            8 => Self::Role,
            9 => Self::Mentionable,
            10 => Self::Number,
            11 => Self::Attachment,
            _ => return None,
        })
    }
}

impl Serialize for OptionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    String(String),
    Integer(i64),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionChoice {
    pub name: String,
    pub value: ChoiceValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOption {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: OptionType,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,
}

impl CommandOption {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: OptionType) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
            choices: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn choice(mut self, name: impl Into<String>, value: ChoiceValue) -> Self {
        self.choices.push(OptionChoice {
            name: name.into(),
            value,
        });
        self
    }
}

/// Everything about a command except its handler. This is what gets pushed
/// to the platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandSpec {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
    /// When false the command is hidden from members without admin rights,
    /// sent as `default_member_permissions: "0"`.
    #[serde(
        rename = "default_member_permissions",
        skip_serializing_if = "is_enabled",
        serialize_with = "serialize_restricted"
    )]
    pub default_enabled: bool,
}

fn is_enabled(enabled: &bool) -> bool {
    *enabled
}

fn serialize_restricted<S: Serializer>(_: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str("0")
}

/// A command as authored: its spec plus the raw handler.
#[derive(Clone)]
pub struct CommandDefinition {
    pub spec: CommandSpec,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
    ) -> Self {
        Self {
            spec: CommandSpec {
                name: name.into(),
                description: description.into(),
                options: Vec::new(),
                default_enabled: true,
            },
            handler,
        }
    }

    pub fn option(mut self, option: CommandOption) -> Self {
        self.spec.options.push(option);
        self
    }

    pub fn disabled_by_default(mut self) -> Self {
        self.spec.default_enabled = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }
}

impl std::fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::handler::handler_fn;
    use crate::engine::response::CommandResult;
    use serde_json::json;

    fn noop() -> Arc<dyn CommandHandler> {
        handler_fn(|_| async { Ok(CommandResult::None) })
    }

    #[test]
    fn test_platform_json_shape() {
        let def = CommandDefinition::new("boop", "Boops", noop())
            .option(CommandOption::new("user", "The user", OptionType::User).required())
            .option(
                CommandOption::new("every", "How often", OptionType::Integer)
                    .choice("Every day", ChoiceValue::Integer(1))
                    .choice("Weekly", ChoiceValue::Integer(7)),
            );

        assert_eq!(
            serde_json::to_value(&def.spec).unwrap(),
            json!({
                "name": "boop",
                "description": "Boops",
                "options": [
                    {"name": "user", "description": "The user", "type": 6, "required": true},
                    {
                        "name": "every",
                        "description": "How often",
                        "type": 4,
                        "choices": [
                            {"name": "Every day", "value": 1},
                            {"name": "Weekly", "value": 7}
                        ]
                    }
                ]
            })
        );
    }

    #[test]
    fn test_disabled_by_default_serializes_zero_permissions() {
        let def = CommandDefinition::new("giverole", "Gives role", noop()).disabled_by_default();
        let value = serde_json::to_value(&def.spec).unwrap();
        assert_eq!(value["default_member_permissions"], json!("0"));
        assert!(value.get("options").is_none());
    }

    #[test]
    fn test_option_type_codes() {
        for code in 1..=11u8 {
            assert_eq!(OptionType::from_code(code).unwrap() as u8, code);
        }
        assert!(OptionType::from_code(0).is_none());
        assert!(OptionType::from_code(12).is_none());
    }
}
