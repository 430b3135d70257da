//! Value Object Module

pub mod display_name;
pub mod email;
pub mod login_id;
pub mod user_password;
pub mod user_status;
