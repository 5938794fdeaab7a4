// src/gps/mod.rs
//! gpsd protocol decoding and fix state

pub mod data;
pub mod gpsd;
pub mod protocol;
pub mod tracker;

pub use data::{FixMode, FixQuality, FixState, FixStatus, Satellite};
pub use gpsd::GpsdSession;
pub use protocol::{decode_line, Decoded, Decoder, Field, RawLineObserver};
pub use tracker::ChangeTracker;
