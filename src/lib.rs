pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod countdown;
pub mod error;
pub mod notices;
pub mod resources;
pub mod state;
pub mod store;
pub mod todos;
