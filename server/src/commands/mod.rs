//! Commands compiled into the bot. The registry is rebuilt from these at startup.

pub mod boop;
pub mod giverole;
pub mod say;

use crate::engine::command::CommandDefinition;
use crate::platform::guilds::GuildClient;

pub fn builtin_commands(guilds: GuildClient) -> Vec<CommandDefinition> {
    vec![
        boop::definition(),
        giverole::definition(guilds),
        say::definition(),
    ]
}
