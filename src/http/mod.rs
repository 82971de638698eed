//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, tracing span)
//!     → recipes.rs / status.rs (decode, call the store)
//!     → response.rs (errors rendered as JSON)
//!     → Send to client
//! ```

pub mod recipes;
pub mod request;
pub mod response;
pub mod server;
pub mod status;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use response::{ApiError, ErrorBody};
pub use server::{AppState, HttpServer};
