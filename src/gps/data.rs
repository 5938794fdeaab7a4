// src/gps/data.rs
//! Fix state and the value types it is made of

use super::tracker::ChangeTracker;
use crate::geodesy::{LatLon, KNOTS_TO_MPH};
use serde::Serialize;
use std::fmt;

/// One satellite from a visibility report. Never edited in place; a new
/// report replaces the whole list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Satellite {
    pub prn: i32,
    pub elevation: i32,   // degrees
    pub azimuth: i32,     // degrees
    pub signal_strength: i32,
    pub used: Option<bool>,
}

impl Satellite {
    pub fn new(prn: i32, elevation: i32, azimuth: i32, signal_strength: i32, used: Option<bool>) -> Self {
        Self {
            prn,
            elevation,
            azimuth,
            signal_strength,
            used,
        }
    }
}

impl fmt::Display for Satellite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = match self.used {
            Some(true) => "y",
            Some(false) => "n",
            None => "?",
        };
        write!(
            f,
            "PRN: {:>3}  E: {:>3}  Az: {:>3}  Ss: {} Used: {}",
            self.prn, self.elevation, self.azimuth, self.signal_strength, used
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FixStatus {
    #[default]
    NoFix = 0,
    Fix = 1,
    DgpsFix = 2,
}

impl FixStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(FixStatus::NoFix),
            1 => Some(FixStatus::Fix),
            2 => Some(FixStatus::DgpsFix),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FixStatus::NoFix => "STATUS_NO_FIX",
            FixStatus::Fix => "STATUS_FIX",
            FixStatus::DgpsFix => "STATUS_DGPS_FIX",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FixMode {
    #[default]
    NoFix = 1,
    TwoD = 2,
    ThreeD = 3,
}

impl FixMode {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(FixMode::NoFix),
            2 => Some(FixMode::TwoD),
            3 => Some(FixMode::ThreeD),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FixMode::NoFix => "MODE_NO_FIX",
            FixMode::TwoD => "MODE_2D",
            FixMode::ThreeD => "MODE_3D",
        }
    }
}

/// Satellites used in the last fix and the dilution-of-precision figures.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FixQuality {
    pub satellites_used: i32,
    pub pdop: f64,
    pub hdop: f64,
    pub vdop: f64,
}

/// Everything currently known about the receiver's fix.
///
/// Each group carries its own [`ChangeTracker`]; `utc` is stored verbatim
/// and not tracked. Created once per session and mutated in place by the
/// decoder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixState {
    pub online: ChangeTracker<bool>,
    pub utc: String,
    pub position: ChangeTracker<LatLon>,
    pub altitude: ChangeTracker<f64>,    // meters
    pub speed: ChangeTracker<f64>,       // knots
    pub track: ChangeTracker<f64>,       // degrees from true north
    pub status: ChangeTracker<FixStatus>,
    pub mode: ChangeTracker<FixMode>,
    pub quality: ChangeTracker<FixQuality>,
    pub satellites: ChangeTracker<Vec<Satellite>>,
}

impl FixState {
    pub fn new() -> Self {
        Self {
            online: ChangeTracker::new(false),
            utc: String::new(),
            position: ChangeTracker::new(LatLon::default()),
            altitude: ChangeTracker::new(0.0),
            speed: ChangeTracker::new(0.0),
            track: ChangeTracker::new(0.0),
            status: ChangeTracker::new(FixStatus::NoFix),
            mode: ChangeTracker::new(FixMode::NoFix),
            quality: ChangeTracker::new(FixQuality::default()),
            satellites: ChangeTracker::new(Vec::new()),
        }
    }

    /// True if any tracked group reported a change on its latest write
    pub fn any_changed(&self) -> bool {
        self.online.changed()
            || self.position.changed()
            || self.altitude.changed()
            || self.speed.changed()
            || self.track.changed()
            || self.status.changed()
            || self.mode.changed()
            || self.quality.changed()
            || self.satellites.changed()
    }

    pub fn latitude(&self) -> f64 {
        self.position.get().lat
    }

    pub fn longitude(&self) -> f64 {
        self.position.get().lon
    }

    pub fn speed_mph(&self) -> f64 {
        self.speed.get() * KNOTS_TO_MPH
    }

    pub fn has_fix(&self) -> bool {
        *self.status.get() != FixStatus::NoFix
    }

    /// Count of visible satellites flagged as used
    pub fn satellites_used(&self) -> usize {
        self.satellites
            .get()
            .iter()
            .filter(|sat| sat.used == Some(true))
            .count()
    }

    /// Multi-line diagnostic report, each group followed by its tracker
    pub fn snapshot(&self) -> String {
        let mut st = String::new();
        let pos = self.position.get();
        st.push_str(&format!("Online:   {} {}\n", self.online.get(), self.online));
        st.push_str(&format!("UTC:      {}\n", self.utc));
        st.push_str(&format!("Lat/lon:  {:.6} {:.6} {}\n", pos.lat, pos.lon, self.position));
        st.push_str(&format!("Altitude: {:.6} {}\n", self.altitude.get(), self.altitude));
        st.push_str(&format!("Speed:    {:.6} {}\n", self.speed.get(), self.speed));
        st.push_str(&format!("Track:    {:.6} {}\n", self.track.get(), self.track));
        st.push_str(&format!("Status:   {} {}\n", self.status.get().label(), self.status));
        st.push_str(&format!("Mode:     {} {}\n", self.mode.get().label(), self.mode));

        let q = self.quality.get();
        st.push_str(&format!(
            "Quality:  {} p={:.2} h={:.2} v={:.2} {}\n",
            q.satellites_used, q.pdop, q.hdop, q.vdop, self.quality
        ));

        let sats = self.satellites.get();
        st.push_str(&format!("Y: {} satellites in view:\n", sats.len()));
        for sat in sats {
            st.push_str(&format!("    {}\n", sat));
        }
        st.push_str(&format!("    {}\n", self.satellites));
        st
    }
}

impl Default for FixState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FixState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.snapshot())
    }
}
