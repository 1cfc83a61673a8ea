pub mod command;
pub mod dispatcher;
pub mod handler;
pub mod interaction;
pub mod permissions;
pub mod registry;
pub mod response;
