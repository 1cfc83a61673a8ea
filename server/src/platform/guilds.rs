use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use super::client::PlatformApi;
use super::routes;

/// Guild membership operations used by role-granting commands and the operator routes.
/// Failures are logged and reported as `None`/`false`.
#[derive(Clone)]
pub struct GuildClient {
    api: Arc<dyn PlatformApi>,
}

impl GuildClient {
    pub fn new(api: Arc<dyn PlatformApi>) -> Self {
        Self { api }
    }

    /// Guilds the bot user belongs to, as returned by the platform.
    pub async fn list_guilds(&self) -> Option<Value> {
        match self.api.get(&routes::current_user_guilds()).await {
            Ok(guilds) => Some(guilds),
            Err(e) => {
                error!(error = %e, "Error fetching guilds");
                None
            }
        }
    }

    pub async fn add_role(&self, guild_id: &str, user_id: &str, role_id: &str) -> bool {
        let path = routes::guild_member_role(guild_id, user_id, role_id);
        match self.api.put(&path, None).await {
            Ok(_) => {
                info!(guild_id, user_id, role_id, "added role to member");
                true
            }
            Err(e) => {
                error!(error = %e, guild_id, user_id, role_id, "Error adding role");
                false
            }
        }
    }

    pub async fn remove_role(&self, guild_id: &str, user_id: &str, role_id: &str) -> bool {
        let path = routes::guild_member_role(guild_id, user_id, role_id);
        match self.api.delete(&path).await {
            Ok(_) => {
                info!(guild_id, user_id, role_id, "removed role from member");
                true
            }
            Err(e) => {
                error!(error = %e, guild_id, user_id, role_id, "Error removing role");
                false
            }
        }
    }
}
