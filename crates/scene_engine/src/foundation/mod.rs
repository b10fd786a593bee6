//! Foundation utilities shared by every other module
//!
//! - Math types and operations
//! - Change tracking for cached values
//! - Frame timing
//! - Logging setup

pub mod math;
pub mod tracked;
pub mod time;
pub mod logging;
