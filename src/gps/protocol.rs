// src/gps/protocol.rs
//! Decoder for gpsd's tagged-field text protocol
//!
//! A daemon response looks like `GPSD,P=37.300000 -122.000000,A=12.5,S=1`:
//! the `GPSD` sentinel followed by comma-separated `<code>=<payload>`
//! fields. Each recognised field updates one group of a [`FixState`].

use super::data::{FixMode, FixQuality, FixState, FixStatus, Satellite};
use crate::error::FieldError;
use crate::geodesy::LatLon;
use log::{debug, trace};
use serde::Serialize;
use std::str::FromStr;

const SENTINEL: &str = "GPSD";
const UNKNOWN: &str = "?";

/// Field codes understood by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Field {
    Altitude,
    Utc,
    Mode,
    Position,
    Quality,
    Status,
    Track,
    Speed,
    Online,
    Satellites,
}

impl Field {
    /// Look up a field by its code letter, ignoring case
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'A' => Some(Field::Altitude),
            'D' => Some(Field::Utc),
            'M' => Some(Field::Mode),
            'P' => Some(Field::Position),
            'Q' => Some(Field::Quality),
            'S' => Some(Field::Status),
            'T' => Some(Field::Track),
            'V' => Some(Field::Speed),
            'X' => Some(Field::Online),
            'Y' => Some(Field::Satellites),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Field::Altitude => 'A',
            Field::Utc => 'D',
            Field::Mode => 'M',
            Field::Position => 'P',
            Field::Quality => 'Q',
            Field::Status => 'S',
            Field::Track => 'T',
            Field::Speed => 'V',
            Field::Online => 'X',
            Field::Satellites => 'Y',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Field::Altitude => "altitude",
            Field::Utc => "utc",
            Field::Mode => "mode",
            Field::Position => "position",
            Field::Quality => "quality",
            Field::Status => "status",
            Field::Track => "track",
            Field::Speed => "speed",
            Field::Online => "online",
            Field::Satellites => "satellites",
        }
    }
}

/// Outcome of decoding one line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    /// OR of every tracked group's `changed` flag after the line
    pub changed: bool,
    /// Fields whose payload could not be parsed, in line order
    pub errors: Vec<FieldError>,
}

impl Decoded {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Receives every raw line handed to a [`Decoder`]
pub trait RawLineObserver: Send {
    fn on_raw_line(&mut self, line: &str);
}

impl<F> RawLineObserver for F
where
    F: FnMut(&str) + Send,
{
    fn on_raw_line(&mut self, line: &str) {
        self(line)
    }
}

/// Line decoder with an optional raw-line observer
#[derive(Default)]
pub struct Decoder {
    observer: Option<Box<dyn RawLineObserver>>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_observer(&mut self, observer: impl RawLineObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    pub fn has_observer(&self) -> bool {
        self.observer.is_some()
    }

    /// Decode `line` into `state`, then hand the untouched line to the
    /// observer regardless of what the decode found.
    pub fn decode(&mut self, line: &str, state: &mut FixState) -> Decoded {
        let decoded = decode_line(line, state);
        if let Some(observer) = self.observer.as_mut() {
            observer.on_raw_line(line);
        }
        decoded
    }
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("observer", &self.has_observer())
            .finish()
    }
}

/// Decode one protocol line into `state`.
///
/// Lines that do not start with the `GPSD` sentinel are ignored. Malformed
/// tokens, `?` payloads and unknown codes are skipped. A field whose payload
/// fails to parse is reported in [`Decoded::errors`] and leaves its group
/// untouched; the remaining fields are still applied.
pub fn decode_line(line: &str, state: &mut FixState) -> Decoded {
    let mut fields = line.trim_end().split(',');
    if fields.next() != Some(SENTINEL) {
        trace!("ignoring non-GPSD line: {:?}", line);
        return Decoded::default();
    }

    let mut errors = Vec::new();
    for token in fields {
        let bytes = token.as_bytes();
        if bytes.len() < 2 || bytes[1] != b'=' {
            trace!("skipping malformed field {:?}", token);
            continue;
        }

        // byte 1 is '=' so byte 0 is a single-byte char
        let code = bytes[0] as char;
        let payload = &token[2..];
        if payload == UNKNOWN {
            continue;
        }

        let Some(field) = Field::from_code(code) else {
            trace!("skipping unrecognised field code {:?}", code);
            continue;
        };

        if let Err(e) = apply_field(field, payload, state) {
            debug!("{}", e);
            errors.push(e);
        }
    }

    Decoded {
        changed: state.any_changed(),
        errors,
    }
}

/// Parse the payload completely before touching the state, so a bad field
/// never leaves its group half-written.
fn apply_field(field: Field, payload: &str, state: &mut FixState) -> Result<(), FieldError> {
    let err = |reason: &str| FieldError::new(field, payload, reason);

    match field {
        Field::Altitude => state.altitude.set(parse_float(payload).ok_or_else(|| err("expected a number"))?),
        Field::Utc => state.utc = payload.to_string(),
        Field::Mode => {
            let code = parse_number(payload).ok_or_else(|| err("expected an integer"))?;
            let mode = FixMode::from_code(code).ok_or_else(|| err("mode must be 1, 2 or 3"))?;
            state.mode.set(mode);
        }
        Field::Position => {
            let [lat, lon] = parse_floats::<2>(payload).ok_or_else(|| err("expected `lat lon`"))?;
            state.position.set(LatLon::new(lat, lon));
        }
        Field::Quality => {
            let quality = parse_quality(payload).ok_or_else(|| err("expected `used pdop hdop vdop`"))?;
            state.quality.set(quality);
        }
        Field::Status => {
            let code = parse_number(payload).ok_or_else(|| err("expected an integer"))?;
            let status = FixStatus::from_code(code).ok_or_else(|| err("status must be 0, 1 or 2"))?;
            state.status.set(status);
        }
        Field::Track => state.track.set(parse_float(payload).ok_or_else(|| err("expected a number"))?),
        Field::Speed => state.speed.set(parse_float(payload).ok_or_else(|| err("expected a number"))?),
        Field::Online => {
            let online = match payload.chars().next() {
                Some('1') => true,
                Some('0') => false,
                _ => return Err(err("expected 0 or 1")),
            };
            state.online.set(online);
        }
        Field::Satellites => {
            let satellites = parse_satellites(payload).map_err(|reason| err(reason.as_str()))?;
            state.satellites.set(satellites);
        }
    }

    Ok(())
}

fn parse_number<T: FromStr>(s: &str) -> Option<T> {
    s.trim().parse().ok()
}

/// Decimal literal only; `nan` and `inf` are rejected
fn parse_float(s: &str) -> Option<f64> {
    parse_number::<f64>(s).filter(|v| v.is_finite())
}

/// Exactly `N` whitespace-separated decimal numbers
fn parse_floats<const N: usize>(s: &str) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    let mut parts = s.split_whitespace();
    for slot in out.iter_mut() {
        *slot = parse_float(parts.next()?)?;
    }
    match parts.next() {
        Some(_) => None,
        None => Some(out),
    }
}

fn parse_quality(s: &str) -> Option<FixQuality> {
    let (used, dops) = s.trim().split_once(char::is_whitespace)?;
    let [pdop, hdop, vdop] = parse_floats::<3>(dops)?;
    Some(FixQuality {
        satellites_used: used.parse().ok()?,
        pdop,
        hdop,
        vdop,
    })
}

/// `count:sat:sat:...` where each sat is `PRN elevation azimuth ss [used]`
fn parse_satellites(s: &str) -> Result<Vec<Satellite>, String> {
    let mut parts = s.split(':');
    let count: usize = parts
        .next()
        .and_then(parse_number)
        .ok_or_else(|| "expected a satellite count".to_string())?;

    // the count comes off the wire, so it never sizes an allocation
    let mut satellites = Vec::new();
    for i in 0..count {
        let entry = parts
            .next()
            .ok_or_else(|| format!("count is {} but only {} satellites follow", count, i))?;
        satellites.push(parse_satellite(entry).ok_or_else(|| format!("bad satellite entry {:?}", entry))?);
    }

    Ok(satellites)
}

fn parse_satellite(entry: &str) -> Option<Satellite> {
    let values: Vec<i32> = entry
        .split_whitespace()
        .map(|v| v.parse().ok())
        .collect::<Option<_>>()?;

    let used = match values.len() {
        4 => None,
        5 => match values[4] {
            0 => Some(false),
            1 => Some(true),
            _ => return None,
        },
        _ => return None,
    };
    Some(Satellite::new(values[0], values[1], values[2], values[3], used))
}
