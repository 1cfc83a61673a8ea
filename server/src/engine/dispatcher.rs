use std::sync::Arc;

use tracing::{Instrument, info_span, warn};
use uuid::Uuid;

use super::interaction::Interaction;
use super::registry::CommandRegistry;
use super::response::CommandResult;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// No command with this name is registered. Reported to the caller as a
    /// client error; distinct from a handler failure, which never surfaces here.
    #[error("Invalid slash command: {0}")]
    UnknownCommand(String),
}

/// Routes interactions to registered commands.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Resolve and run one interaction.
    ///
    /// The command is resolved once; the rest of the call works on that
    /// snapshot, so concurrent re-registration is not observed. Handler
    /// failures come back as the fallback reply, never as `Err`.
    pub async fn dispatch(&self, interaction: &Interaction) -> Result<CommandResult, DispatchError> {
        let span = info_span!(
            "dispatch",
            request_id = %Uuid::new_v4(),
            command = %interaction.command_name,
        );

        async {
            let Some(command) = self.registry.lookup(&interaction.command_name) else {
                warn!("unknown command");
                return Err(DispatchError::UnknownCommand(
                    interaction.command_name.clone(),
                ));
            };

            let outcome = command.handler().run(interaction).await;
            Ok(outcome.into_result())
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::command::CommandDefinition;
    use crate::engine::handler::handler_fn;
    use crate::engine::response::FALLBACK_REPLY;
    use std::time::Duration;

    fn dispatcher_with(defs: Vec<CommandDefinition>) -> Dispatcher {
        let registry = Arc::new(CommandRegistry::with_handler_timeout(Some(
            Duration::from_millis(50),
        )));
        registry.register_many(defs);
        Dispatcher::new(registry)
    }

    #[tokio::test]
    async fn test_dispatch_boop() {
        let dispatcher = dispatcher_with(vec![CommandDefinition::new(
            "boop",
            "Boops",
            handler_fn(|_| async { Ok(CommandResult::text("boop")) }),
        )]);
        let result = dispatcher.dispatch(&Interaction::new("boop")).await;
        assert_eq!(result, Ok(CommandResult::text("boop")));
    }

    #[tokio::test]
    async fn test_unknown_command_is_an_error() {
        let dispatcher = dispatcher_with(vec![]);
        let result = dispatcher.dispatch(&Interaction::new("nope")).await;
        assert_eq!(result, Err(DispatchError::UnknownCommand("nope".into())));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid slash command: nope"
        );
    }

    #[tokio::test]
    async fn test_failing_handler_yields_fallback() {
        let dispatcher = dispatcher_with(vec![CommandDefinition::new(
            "broken",
            "fails",
            handler_fn(|_| async { Err(anyhow::anyhow!("handler bug")) }),
        )]);
        let result = dispatcher.dispatch(&Interaction::new("broken")).await;
        assert_eq!(result, Ok(CommandResult::Text(FALLBACK_REPLY.into())));
    }

    #[tokio::test]
    async fn test_hung_handler_yields_fallback() {
        let dispatcher = dispatcher_with(vec![CommandDefinition::new(
            "hang",
            "never finishes",
            handler_fn(|_| async {
                std::future::pending::<()>().await;
                Ok(CommandResult::None)
            }),
        )]);
        let result = dispatcher.dispatch(&Interaction::new("hang")).await;
        assert_eq!(result, Ok(CommandResult::fallback()));
    }

    #[tokio::test]
    async fn test_failure_does_not_affect_siblings() {
        let dispatcher = dispatcher_with(vec![
            CommandDefinition::new(
                "broken",
                "fails",
                handler_fn(|_| async { Err(anyhow::anyhow!("bug")) }),
            ),
            CommandDefinition::new(
                "ok",
                "works",
                handler_fn(|_| async { Ok(CommandResult::text("fine")) }),
            ),
        ]);

        for _ in 0..3 {
            assert_eq!(
                dispatcher.dispatch(&Interaction::new("broken")).await,
                Ok(CommandResult::fallback())
            );
            assert_eq!(
                dispatcher.dispatch(&Interaction::new("ok")).await,
                Ok(CommandResult::text("fine"))
            );
        }
    }

    #[tokio::test]
    async fn test_handler_sees_interaction_options() {
        use crate::engine::command::OptionType;
        use serde_json::json;

        let dispatcher = dispatcher_with(vec![CommandDefinition::new(
            "echo",
            "echoes",
            handler_fn(|i: Interaction| async move {
                Ok(CommandResult::text(
                    i.string_option("message").unwrap_or("nothing").to_string(),
                ))
            }),
        )]);
        let interaction =
            Interaction::new("echo").with_option("message", OptionType::String, json!("hi"));
        assert_eq!(
            dispatcher.dispatch(&interaction).await,
            Ok(CommandResult::text("hi"))
        );
    }
}
