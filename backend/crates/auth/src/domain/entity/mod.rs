//! Entity Module

pub mod role;
pub mod user;
