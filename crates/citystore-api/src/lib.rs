//! Request/response adapter for CityStore
//!
//! Sits between a transport (HTTP or anything else that carries JSON) and
//! `citystore-core`. It owns everything the core deliberately does not:
//!
//! - Decoding and validating incoming city bodies (required fields, date
//!   syntax, no founding dates in the future)
//! - Mapping core outcomes to statuses: created, conflict, not found,
//!   no content
//! - Encoding `{"cities": [...]}` result bodies and `{"errors": [...]}`
//!   error bodies
//!
//! Routing paths and verbs to these handlers is left to the transport.

pub mod error;
pub mod response;
pub mod service;
pub mod wire;

pub use error::ApiError;
pub use response::{ApiResponse, ErrorEnvelope, ErrorMessage, Status};
pub use service::{CityApi, Clock, SystemClock};
pub use wire::{CityPayload, DateInput};
