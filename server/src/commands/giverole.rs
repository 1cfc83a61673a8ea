use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::engine::command::{CommandDefinition, CommandOption, OptionType};
use crate::engine::handler::CommandHandler;
use crate::engine::interaction::Interaction;
use crate::engine::permissions::Permissions;
use crate::engine::response::CommandResult;
use crate::platform::guilds::GuildClient;

pub fn definition(guilds: GuildClient) -> CommandDefinition {
    CommandDefinition::new(
        "giverole",
        "Gives role to user",
        Arc::new(GiveRole { guilds }),
    )
    .disabled_by_default()
    .option(CommandOption::new("role", "Role to give", OptionType::Role).required())
    .option(CommandOption::new("user", "User to receive role", OptionType::User).required())
}

/// Grants a role in the guild the command was invoked from. DMs carry no
/// member permissions to check, so they are refused.
pub struct GiveRole {
    guilds: GuildClient,
}

#[async_trait]
impl CommandHandler for GiveRole {
    async fn handle(&self, interaction: &Interaction) -> Result<CommandResult> {
        let caller = interaction
            .caller()
            .ok_or_else(|| anyhow!("interaction has no caller"))?;
        let role_id = interaction
            .string_option("role")
            .ok_or_else(|| anyhow!("missing required option `role`"))?;
        let user_id = interaction
            .string_option("user")
            .ok_or_else(|| anyhow!("missing required option `user`"))?;

        if caller.id == user_id {
            return Ok(CommandResult::text(
                "This command does not support adding roles to yourself.",
            ));
        }

        let Some(guild_id) = interaction.guild_id.as_deref() else {
            return Ok(CommandResult::text(
                "This command can only be used in a server.",
            ));
        };

        if !interaction
            .member_permissions()
            .allows(Permissions::MANAGE_ROLES)
        {
            return Ok(CommandResult::text(
                "You need the Manage Roles permission to use this command.",
            ));
        }

        if !self.guilds.add_role(guild_id, user_id, role_id).await {
            return Err(anyhow!("failed to add role {role_id} to user {user_id}"));
        }

        let role_name = interaction
            .role_option("role")
            .map(|r| r.name.as_str())
            .unwrap_or(role_id);
        Ok(CommandResult::Text(format!(
            "Successfully added role `{role_name}` to user."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::interaction::{Member, Resolved, Role, User};
    use crate::test_support::FakePlatform;
    use serde_json::json;

    fn member(id: &str, permissions: Permissions) -> Member {
        Member {
            user: Some(User {
                id: id.into(),
                username: format!("user{id}"),
                global_name: None,
            }),
            roles: Vec::new(),
            permissions: Some(permissions.to_decimal()),
        }
    }

    fn interaction(caller: &str, target: &str, permissions: Permissions) -> Interaction {
        let mut resolved = Resolved::default();
        resolved.roles.insert(
            "r1".into(),
            Role {
                id: "r1".into(),
                name: "contributor".into(),
            },
        );
        Interaction {
            guild_id: Some("g1".into()),
            member: Some(member(caller, permissions)),
            resolved,
            ..Interaction::new("giverole")
        }
        .with_option("role", OptionType::Role, json!("r1"))
        .with_option("user", OptionType::User, json!(target))
    }

    fn handler(fake: &Arc<FakePlatform>) -> GiveRole {
        GiveRole {
            guilds: GuildClient::new(fake.clone()),
        }
    }

    #[tokio::test]
    async fn test_grants_role() {
        let fake = Arc::new(FakePlatform::default());
        let result = handler(&fake)
            .handle(&interaction("1", "2", Permissions::MANAGE_ROLES))
            .await
            .unwrap();
        assert_eq!(
            result,
            CommandResult::text("Successfully added role `contributor` to user.")
        );
        assert_eq!(fake.calls()[0].1, "/guilds/g1/members/2/roles/r1");
    }

    #[tokio::test]
    async fn test_refuses_self_target() {
        let fake = Arc::new(FakePlatform::default());
        let result = handler(&fake)
            .handle(&interaction("1", "1", Permissions::ADMINISTRATOR))
            .await
            .unwrap();
        assert_eq!(
            result,
            CommandResult::text("This command does not support adding roles to yourself.")
        );
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_requires_manage_roles() {
        let fake = Arc::new(FakePlatform::default());
        let result = handler(&fake)
            .handle(&interaction("1", "2", Permissions::SEND_MESSAGES))
            .await
            .unwrap();
        assert_eq!(
            result,
            CommandResult::text("You need the Manage Roles permission to use this command.")
        );
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dm_invocation_is_refused() {
        let fake = Arc::new(FakePlatform::default());
        let dm = Interaction {
            user: Some(User {
                id: "1".into(),
                username: "user1".into(),
                global_name: None,
            }),
            ..Interaction::new("giverole")
        }
        .with_option("role", OptionType::Role, json!("r1"))
        .with_option("user", OptionType::User, json!("2"));

        let result = handler(&fake).handle(&dm).await.unwrap();
        assert_eq!(
            result,
            CommandResult::text("This command can only be used in a server.")
        );
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_platform_failure_is_an_error() {
        let fake = Arc::new(FakePlatform::default());
        fake.fail_with(403);
        let result = handler(&fake)
            .handle(&interaction("1", "2", Permissions::MANAGE_ROLES))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_hidden_by_default() {
        let def = definition(GuildClient::new(Arc::new(FakePlatform::default())));
        assert!(!def.spec.default_enabled);
        assert_eq!(def.spec.options.len(), 2);
    }
}
