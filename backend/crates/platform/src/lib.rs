//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no domain knowledge:
//! - Password hashing (Argon2id, NIST SP 800-63B style policy)
//! - Cookie building and parsing
//! - Bearer token extraction
//! - Small cryptographic helpers (SHA-256, base64url, random bytes)

pub mod bearer;
pub mod cookie;
pub mod crypto;
pub mod password;
