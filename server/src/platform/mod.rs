pub mod client;
pub mod guilds;
pub mod routes;
pub mod sync;
