pub mod auth;
pub mod events;
pub mod guard;
pub mod profile;
pub mod registry;
pub mod session_store;
