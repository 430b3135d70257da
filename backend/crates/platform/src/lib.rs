//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (base64 / base64url, random bytes)
//! - Password policy and Argon2id hashing
//! - Bearer-token extraction from request headers

pub mod client;
pub mod crypto;
pub mod password;
