use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::auth::signature::SignatureVerifier;
use crate::commands::builtin_commands;
use crate::config::ServerConfig;
use crate::engine::dispatcher::Dispatcher;
use crate::engine::registry::CommandRegistry;
use crate::platform::client::{PlatformApi, RestClient};
use crate::platform::guilds::GuildClient;
use crate::platform::sync::RemoteSync;

/// Shared state for every request. Built once at startup.
pub struct AppState {
    pub config: ServerConfig,
    pub verifier: SignatureVerifier,
    pub registry: Arc<CommandRegistry>,
    pub dispatcher: Dispatcher,
    pub sync: RemoteSync,
    pub guilds: GuildClient,
}

impl AppState {
    /// Wire everything from configuration, talking to the real platform API.
    pub fn from_config(config: ServerConfig) -> Result<Self> {
        let sync_api = RestClient::from_config(&config.discord)
            .context("failed to build platform API client")?;
        // Guild calls run inside handlers and must give up before the handler deadline
        let guild_api = RestClient::new(
            &config.discord.api_base,
            config.discord.bot_token.clone(),
            config.interaction_request_timeout(),
        )
        .context("failed to build platform API client")?;
        let verifier = SignatureVerifier::from_config(&config.discord.public_key);
        Ok(Self::with_apis(
            config,
            verifier,
            Arc::new(sync_api),
            Arc::new(guild_api),
        ))
    }

    /// Wire everything around an injected verifier and a single platform API,
    /// and register the built-in commands.
    pub fn new(config: ServerConfig, verifier: SignatureVerifier, api: Arc<dyn PlatformApi>) -> Self {
        Self::with_apis(config, verifier, api.clone(), api)
    }

    /// Like `new`, with separate clients for command sync and for the guild
    /// calls made while answering interactions.
    pub fn with_apis(
        config: ServerConfig,
        verifier: SignatureVerifier,
        sync_api: Arc<dyn PlatformApi>,
        guild_api: Arc<dyn PlatformApi>,
    ) -> Self {
        let registry = Arc::new(CommandRegistry::with_handler_timeout(
            config.dispatch.handler_timeout(),
        ));
        let guilds = GuildClient::new(guild_api);
        registry.register_many(builtin_commands(guilds.clone()));
        info!(commands = ?registry.names(), "command registry loaded");

        let sync = RemoteSync::new(
            registry.clone(),
            sync_api,
            config.discord.application_id.clone(),
        );

        Self {
            dispatcher: Dispatcher::new(registry.clone()),
            verifier,
            registry,
            sync,
            guilds,
            config,
        }
    }
}
