//! Entity Module

pub mod provider_link;
pub mod token;
pub mod user;
