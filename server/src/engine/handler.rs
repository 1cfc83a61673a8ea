//! Command handlers and the fault boundary every registered handler runs behind.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::FutureExt;
use tracing::error;

use super::interaction::Interaction;
use super::response::CommandResult;

/// Produces a reply for one interaction.
///
/// Handlers may fail however they like (error, panic, hang); the registry
/// only ever calls them through a [`GuardedHandler`].
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, interaction: &Interaction) -> Result<CommandResult>;
}

/// Adapter that turns an async closure into a handler.
pub struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(Interaction) -> Fut + Send + Sync,
    Fut: Future<Output = Result<CommandResult>> + Send,
{
    async fn handle(&self, interaction: &Interaction) -> Result<CommandResult> {
        (self.0)(interaction.clone()).await
    }
}

pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn CommandHandler>
where
    F: Fn(Interaction) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<CommandResult>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

#[derive(Debug, Clone, PartialEq)]
pub enum HandlerFailure {
    Error(String),
    Panicked(String),
    TimedOut(Duration),
}

impl std::fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error(msg) => write!(f, "handler returned error: {msg}"),
            Self::Panicked(msg) => write!(f, "handler panicked: {msg}"),
            Self::TimedOut(limit) => write!(f, "handler exceeded {}ms deadline", limit.as_millis()),
        }
    }
}

/// Result of one guarded handler run.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutcome {
    Completed(CommandResult),
    Failed(HandlerFailure),
}

impl HandlerOutcome {
    /// Collapse to the reply sent back, substituting the fallback on failure.
    pub fn into_result(self) -> CommandResult {
        match self {
            Self::Completed(result) => result,
            Self::Failed(_) => CommandResult::fallback(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// A handler wrapped at registration time. `run` never panics and never
/// returns an error.
#[derive(Clone)]
pub struct GuardedHandler {
    command: String,
    inner: Arc<dyn CommandHandler>,
    timeout: Option<Duration>,
}

impl GuardedHandler {
    pub fn new(
        command: impl Into<String>,
        inner: Arc<dyn CommandHandler>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            command: command.into(),
            inner,
            timeout,
        }
    }

    pub async fn run(&self, interaction: &Interaction) -> HandlerOutcome {
        let guarded = AssertUnwindSafe(self.inner.handle(interaction)).catch_unwind();

        let finished = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(finished) => finished,
                Err(_) => return self.fail(HandlerFailure::TimedOut(limit)),
            },
            None => guarded.await,
        };

        match finished {
            Ok(Ok(result)) => HandlerOutcome::Completed(result),
            Ok(Err(e)) => self.fail(HandlerFailure::Error(format!("{e:#}"))),
            Err(panic) => self.fail(HandlerFailure::Panicked(panic_message(&*panic))),
        }
    }

    fn fail(&self, failure: HandlerFailure) -> HandlerOutcome {
        error!(command = %self.command, error = %failure, "Error executing command");
        HandlerOutcome::Failed(failure)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
