// src/display/terminal.rs
//! Terminal view of the fix state, redrawn only when something changed

use crate::{
    error::{GpsError, Result},
    gps::{tracker::ChangeTracker, FixState},
};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType, DisableLineWrap, EnableLineWrap},
};
use std::{
    io::{self, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
    time::Duration,
};
use tokio::time::sleep;

pub struct TerminalDisplay {
    refresh: Duration,
}

impl TerminalDisplay {
    pub fn new(refresh: Duration) -> Self {
        Self { refresh }
    }

    /// Start the terminal display loop
    pub async fn run(
        &self,
        data: Arc<RwLock<FixState>>,
        running: Arc<AtomicBool>,
        dirty: Arc<AtomicBool>,
    ) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, Hide, DisableLineWrap)?;

        // Set up Ctrl+C handler
        let running_clone = Arc::clone(&running);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                running_clone.store(false, Ordering::Relaxed);
            }
        });

        while running.load(Ordering::Relaxed) {
            if dirty.swap(false, Ordering::AcqRel) {
                let state = data
                    .read()
                    .map_err(|_| GpsError::Other("fix state lock poisoned".to_string()))?
                    .clone();

                execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
                self.render_display(&mut stdout, &state)?;
                stdout.flush()?;
            }
            sleep(self.refresh).await;
        }

        execute!(stdout, Show, EnableLineWrap)?;
        println!("\nShutting down...");
        Ok(())
    }

    /// Render the fix state to the terminal
    pub fn render_display(&self, out: &mut impl Write, data: &FixState) -> Result<()> {
        execute!(
            out,
            SetForegroundColor(Color::Green),
            Print("=".repeat(60)),
            Print("\n"),
            Print(format!("gpsd client    UTC: {}", if data.utc.is_empty() { "-" } else { data.utc.as_str() })),
            Print("\n"),
            Print("=".repeat(60)),
            Print("\n"),
            ResetColor
        )?;

        Self::section(out, "POSITION:", Color::Yellow)?;
        let pos = data.position.get();
        Self::line(out, &data.position, format!("  Lat/Lon:   {:>12.6} {:>12.6}", pos.lat, pos.lon))?;
        Self::line(out, &data.altitude, format!("  Altitude:  {:>12.1} m", data.altitude.get()))?;

        Self::section(out, "MOVEMENT:", Color::Cyan)?;
        Self::line(
            out,
            &data.speed,
            format!("  Speed:     {:>12.1} kn ({:.1} mph)", data.speed.get(), data.speed_mph()),
        )?;
        Self::line(out, &data.track, format!("  Track:     {:>12.1} deg", data.track.get()))?;

        Self::section(out, "FIX:", Color::Magenta)?;
        Self::line(out, &data.online, format!("  Online:    {:>12}", data.online.get()))?;
        Self::line(out, &data.status, format!("  Status:    {:>16}", data.status.get().label()))?;
        Self::line(out, &data.mode, format!("  Mode:      {:>16}", data.mode.get().label()))?;
        let q = data.quality.get();
        Self::line(
            out,
            &data.quality,
            format!("  Quality:   {} used  p={:.2} h={:.2} v={:.2}", q.satellites_used, q.pdop, q.hdop, q.vdop),
        )?;

        Self::section(out, "SATELLITES:", Color::Blue)?;
        let sats = data.satellites.get();
        Self::line(out, &data.satellites, format!("  {} in view, {} used", sats.len(), data.satellites_used()))?;
        for sat in sats {
            execute!(out, Print(format!("    {}\n", sat)))?;
        }

        execute!(
            out,
            Print("\n"),
            SetForegroundColor(Color::Green),
            Print("=".repeat(60)),
            Print("\n"),
            Print("Press Ctrl+C to exit"),
            Print("\n"),
            ResetColor
        )?;

        Ok(())
    }

    fn section(out: &mut impl Write, title: &str, color: Color) -> Result<()> {
        execute!(out, Print("\n"), SetForegroundColor(color), Print(title), Print("\n"), ResetColor)?;
        Ok(())
    }

    /// Groups that changed on their last write are drawn highlighted
    fn line<T>(out: &mut impl Write, tracker: &ChangeTracker<T>, text: String) -> Result<()>
    where
        T: PartialEq,
    {
        if tracker.changed() {
            execute!(out, SetForegroundColor(Color::White), Print(text), Print(" *\n"), ResetColor)?;
        } else {
            execute!(out, Print(text), Print("\n"))?;
        }
        Ok(())
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new(Duration::from_millis(250))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gps::decode_line;

    #[test]
    fn test_render_marks_changed_groups() {
        let mut state = FixState::new();
        decode_line("GPSD,P=37.3 -122.0,Y=1:7 45 180 38 1", &mut state);

        let mut out = Vec::new();
        TerminalDisplay::default().render_display(&mut out, &state).unwrap();
        let text = String::from_utf8_lossy(&out);

        assert!(text.contains("37.300000"));
        assert!(text.contains("-122.000000"));
        assert!(text.contains("1 in view, 1 used"));
        assert!(text.contains("PRN:   7"));
        assert_eq!(text.matches(" *\n").count(), 2);
    }
}
