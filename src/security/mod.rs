//! Security hardening.
//!
//! # Responsibilities
//! - Bound request body size
//! - Add security response headers
//!
//! # Design Decisions
//! - Both are configurable under `[security]`
//! - Authentication and authorization are out of scope for this service

pub mod headers;
pub mod limits;
