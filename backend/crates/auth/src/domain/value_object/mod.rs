//! Value Object Module

pub mod email;
pub mod role_name;
pub mod user_name;
pub mod user_password;
pub mod user_status;
