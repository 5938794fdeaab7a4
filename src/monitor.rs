// src/monitor.rs
//! Background polling of a gpsd session into shared fix state

use crate::{
    config::ClientConfig,
    display::terminal::TerminalDisplay,
    error::Result,
    gps::{data::FixState, gpsd::GpsdSession},
};
use log::{error, info, warn};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
    time::Duration,
};

/// Keeps a shared copy of the fix state current and flags when it changed
pub struct GpsMonitor {
    data: Arc<RwLock<FixState>>,
    running: Arc<AtomicBool>,
    dirty: Arc<AtomicBool>,
}

impl GpsMonitor {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(FixState::new())),
            running: Arc::new(AtomicBool::new(true)),
            // first frame always draws
            dirty: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Connect to gpsd and start polling in the background
    pub async fn start(&self, config: &ClientConfig) -> Result<()> {
        let mut session = GpsdSession::connect(&config.host, Some(config.port)).await?;
        session.set_verbose(config.verbose);
        self.spawn_poller(session);
        Ok(())
    }

    fn spawn_poller(&self, mut session: GpsdSession) {
        let data = Arc::clone(&self.data);
        let running = Arc::clone(&self.running);
        let dirty = Arc::clone(&self.dirty);

        tokio::spawn(async move {
            while running.load(Ordering::Relaxed) {
                match session.poll().await {
                    Ok(decoded) => {
                        for e in &decoded.errors {
                            warn!("{}", e);
                        }
                        match data.write() {
                            Ok(mut guard) => *guard = session.data().clone(),
                            Err(_) => {
                                error!("fix state lock poisoned, stopping");
                                break;
                            }
                        }
                        if decoded.changed {
                            dirty.store(true, Ordering::Release);
                        }
                    }
                    Err(e) => {
                        error!("Error reading from gpsd: {}", e);
                        break;
                    }
                }
            }
            info!("gpsd poller stopped");
            running.store(false, Ordering::Relaxed);
        });
    }

    /// Run the terminal display until Ctrl+C or the connection ends
    pub async fn run_display(&self, refresh: Duration) -> Result<()> {
        let terminal_display = TerminalDisplay::new(refresh);
        terminal_display
            .run(Arc::clone(&self.data), Arc::clone(&self.running), Arc::clone(&self.dirty))
            .await
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Clear the change flag, returning whether anything changed since last call
    pub fn take_changed(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    /// Get a clone of the current fix state
    pub fn get_data(&self) -> FixState {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for GpsMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{io::AsyncWriteExt, net::TcpListener};

    #[tokio::test]
    async fn test_monitor_tracks_changes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"GPSD,P=48.117 11.517,M=3\n").await.unwrap();
        });

        let monitor = GpsMonitor::new();
        assert!(monitor.take_changed());
        assert!(!monitor.take_changed());

        let mut config = ClientConfig::default();
        config.update_server("127.0.0.1".to_string(), port);
        monitor.start(&config).await.unwrap();

        // poller exits once the server hangs up
        for _ in 0..100 {
            if !monitor.is_running() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert!(!monitor.is_running());
        assert!(monitor.take_changed());
        let data = monitor.get_data();
        assert_eq!(data.latitude(), 48.117);
        assert_eq!(data.longitude(), 11.517);
    }
}
