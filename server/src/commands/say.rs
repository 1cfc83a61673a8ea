use crate::engine::command::{CommandDefinition, CommandOption, OptionType};
use crate::engine::handler::handler_fn;
use crate::engine::response::say;

pub fn definition() -> CommandDefinition {
    CommandDefinition::new(
        "say",
        "Replies with your message in an embed",
        handler_fn(|interaction| async move {
            let Some(message) = interaction.string_option("message") else {
                anyhow::bail!("missing required option `message`");
            };
            Ok(say(message, true))
        }),
    )
    .option(CommandOption::new("message", "What to say", OptionType::String).required())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::interaction::Interaction;
    use crate::engine::response::CommandResult;
    use serde_json::json;

    #[tokio::test]
    async fn test_say_echoes_in_embed() {
        let def = definition();
        let i = Interaction::new("say").with_option("message", OptionType::String, json!("hello"));
        let result = def.handler.handle(&i).await.unwrap();
        let CommandResult::Reply(reply) = result else {
            panic!("expected embed reply");
        };
        assert!(reply.ephemeral);
        assert_eq!(reply.embeds[0].description.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_say_without_message_errors() {
        let def = definition();
        assert!(def.handler.handle(&Interaction::new("say")).await.is_err());
    }
}
