pub mod auth;
pub mod client;
pub mod guard;
pub mod i18n;
