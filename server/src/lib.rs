pub mod auth;
pub mod commands;
pub mod config;
pub mod engine;
pub mod platform;
pub mod web;

#[cfg(test)]
pub(crate) mod test_support;
