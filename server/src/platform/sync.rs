//! Reconciliation of the local command registry with the platform's
//! registered commands.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::client::{PlatformApi, PlatformError};
use super::routes;
use crate::engine::command::CommandOption;
use crate::engine::registry::{CommandRegistry, RegisteredCommand};

/// The platform's view of a registered command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCommandRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
}

/// One row of the merged local/remote listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandListing {
    pub name: String,
    pub description: String,
    /// Local fields; absent for commands only the platform knows about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<CommandOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_enabled: Option<bool>,
    /// Absent for commands not registered with the platform.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration: Option<RemoteCommandRecord>,
}

/// Outcome of a bulk registration. A failed bulk call is one aggregate error.
#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    pub data: Vec<RemoteCommandRecord>,
    pub errors: Vec<String>,
}

impl SyncReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct RemoteSync {
    registry: Arc<CommandRegistry>,
    api: Arc<dyn PlatformApi>,
    application_id: String,
}

impl RemoteSync {
    pub fn new(
        registry: Arc<CommandRegistry>,
        api: Arc<dyn PlatformApi>,
        application_id: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            api,
            application_id: application_id.into(),
        }
    }

    fn application_id(&self) -> Result<&str, PlatformError> {
        if self.application_id.is_empty() {
            Err(PlatformError::MissingConfig("application id"))
        } else {
            Ok(&self.application_id)
        }
    }

    /// Overwrite the application's global command set with the full local registry.
    pub async fn register_all(&self) -> SyncReport {
        let mut report = SyncReport::default();
        let specs = self.registry.specs();
        info!(count = specs.len(), "Started refreshing application (/) commands");

        let result = async {
            let path = routes::application_commands(self.application_id()?);
            let body = serde_json::to_value(&specs)?;
            self.api.put(&path, Some(&body)).await
        }
        .await;

        match result {
            // Remote set is already replaced once the PUT succeeds
            Ok(response) => match serde_json::from_value::<Vec<RemoteCommandRecord>>(response) {
                Ok(records) => {
                    info!(count = records.len(), "Successfully reloaded application (/) commands");
                    report.data = records;
                }
                Err(e) => {
                    warn!(error = %e, operation = "register_all", "commands reloaded but response could not be decoded");
                }
            },
            Err(e) => {
                error!(error = %e, operation = "register_all", "command sync failed");
                report.errors.push(e.to_string());
            }
        }
        report
    }

    /// Register one local command without touching the others.
    pub async fn register(&self, name: &str) -> Option<RemoteCommandRecord> {
        let Some(command) = self.registry.lookup(name) else {
            warn!(command = name, "cannot register unknown local command");
            return None;
        };

        let result = async {
            let path = routes::application_commands(self.application_id()?);
            let body = serde_json::to_value(command.spec())?;
            let response = self.api.post(&path, &body).await?;
            Ok::<_, PlatformError>(serde_json::from_value::<RemoteCommandRecord>(response)?)
        }
        .await;

        match result {
            Ok(record) => {
                info!(command = name, id = %record.id, "registered command");
                Some(record)
            }
            Err(e) => {
                error!(error = %e, operation = "register", command = name, "command registration failed");
                None
            }
        }
    }

    /// Local registry left-joined with the platform's records by name.
    pub async fn list(&self) -> Option<Vec<CommandListing>> {
        let result = async {
            let path = routes::application_commands(self.application_id()?);
            let response = self.api.get(&path).await?;
            Ok::<_, PlatformError>(serde_json::from_value::<Vec<RemoteCommandRecord>>(response)?)
        }
        .await;

        match result {
            Ok(remote) => Some(merge_listing(&self.registry.list_all(), remote)),
            Err(e) => {
                error!(error = %e, operation = "list", "fetching registered commands failed");
                None
            }
        }
    }

    /// Delete a remote command, guild-scoped when `guild_id` is given.
    pub async fn unregister(&self, command_id: &str, guild_id: Option<&str>) -> bool {
        let result = async {
            let app = self.application_id()?;
            let path = match guild_id {
                Some(guild) => routes::guild_command(app, guild, command_id),
                None => routes::application_command(app, command_id),
            };
            self.api.delete(&path).await
        }
        .await;

        match result {
            Ok(_) => {
                info!(command_id, guild_id, "unregistered command");
                true
            }
            Err(e) => {
                error!(error = %e, operation = "unregister", command_id, guild_id, "Error deleting command");
                false
            }
        }
    }
}

/// Local commands first (registration order) with their registration when the
/// platform knows them, then platform-only commands in the platform's order.
pub fn merge_listing(
    local: &[Arc<RegisteredCommand>],
    remote: Vec<RemoteCommandRecord>,
) -> Vec<CommandListing> {
    let mut listing: Vec<CommandListing> = local
        .iter()
        .map(|command| {
            let spec = command.spec();
            CommandListing {
                name: spec.name.clone(),
                description: spec.description.clone(),
                options: Some(spec.options.clone()),
                default_enabled: Some(spec.default_enabled),
                registration: None,
            }
        })
        .collect();

    for record in remote {
        match listing
            .iter_mut()
            .find(|entry| entry.name == record.name && entry.registration.is_none())
        {
            Some(entry) => entry.registration = Some(record),
            None => listing.push(CommandListing {
                name: record.name.clone(),
                description: record.description.clone(),
                options: None,
                default_enabled: None,
                registration: Some(record),
            }),
        }
    }

    listing
}
