//! Shared protocol pieces for AWS IoT Device Defender.
//!
//! - `topics`: build and match the report topics
//! - `keys`: long/short report key names
//! - `error`: `DefenderError` and `DefenderResult`

pub mod error;
pub mod keys;
pub mod topics;

pub use error::*;
pub use keys::*;
pub use topics::*;
