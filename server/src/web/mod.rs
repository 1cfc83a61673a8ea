pub mod app_state;
pub mod commands_api;
pub mod interact;
pub mod router;
