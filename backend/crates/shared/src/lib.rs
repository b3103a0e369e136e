//! Shared Kernel
//!
//! Vocabulary shared by every backend crate:
//! - Unified error type ([`error::app_error::AppError`]) and its HTTP mapping
//! - Typed entity identifiers ([`id::Id`])
//!
//! Anything placed here must mean the same thing in auth and in the catalog.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
