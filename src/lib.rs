// src/lib.rs
//! gpsd client library
//!
//! Decodes gpsd's tagged-field text protocol into a change-tracked fix
//! snapshot, plus a few geodesy helpers for working with the fixes.

pub mod config;
pub mod display;
pub mod error;
pub mod geodesy;
pub mod gps;
pub mod monitor;

// Re-export main types for convenience
pub use error::{FieldError, GpsError, Result};
pub use geodesy::{earth_distance, meter_offset, radius_of_curvature, LatLon};
pub use gps::{decode_line, ChangeTracker, Decoded, Decoder, FixState, GpsdSession};
pub use monitor::GpsMonitor;
