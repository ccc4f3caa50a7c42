//! Data models

pub mod prediction;
pub mod sensor;
pub mod user;

pub use prediction::*;
pub use sensor::*;
pub use user::*;

use serde::Serialize;

/// Plain acknowledgment body shared by the write endpoints
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
