//! Thin wrappers over external collaborators.

pub mod ntp_client;
pub mod ping;
pub mod resolver;
pub mod telegram;
