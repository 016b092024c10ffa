//! HTTP middleware stack and request extractors.

pub mod cors;
pub mod trace;
pub mod user;

pub use user::UserId;
