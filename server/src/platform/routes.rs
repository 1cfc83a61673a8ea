//! Paths on the platform REST API, relative to the API base.

pub fn application_commands(application_id: &str) -> String {
    format!("/applications/{application_id}/commands")
}

pub fn application_command(application_id: &str, command_id: &str) -> String {
    format!("/applications/{application_id}/commands/{command_id}")
}

pub fn guild_command(application_id: &str, guild_id: &str, command_id: &str) -> String {
    format!("/applications/{application_id}/guilds/{guild_id}/commands/{command_id}")
}

pub fn current_user_guilds() -> String {
    "/users/@me/guilds".to_string()
}

pub fn guild_member_role(guild_id: &str, user_id: &str, role_id: &str) -> String {
    format!("/guilds/{guild_id}/members/{user_id}/roles/{role_id}")
}
