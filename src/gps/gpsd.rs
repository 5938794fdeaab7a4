// src/gps/gpsd.rs
//! gpsd session: owns the connection and the fix state it feeds

use super::data::FixState;
use super::protocol::{Decoded, Decoder, RawLineObserver};
use crate::error::{GpsError, Result};
use log::{debug, info};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 2947;

/// Split an optional `:port` suffix off `host`.
///
/// The suffix is only honoured when no explicit port is given and the host
/// holds a single colon (so bare IPv6 addresses pass through untouched).
pub fn resolve_address(host: &str, port: Option<u16>) -> Result<(String, u16)> {
    if let Some(port) = port {
        return Ok((host.to_string(), port));
    }

    match host.split_once(':') {
        Some((name, suffix)) if !suffix.contains(':') => {
            let port = suffix
                .parse()
                .map_err(|_| GpsError::Connection(format!("nonnumeric port {:?}", suffix)))?;
            Ok((name.to_string(), port))
        }
        _ => Ok((host.to_string(), DEFAULT_PORT)),
    }
}

/// Client session with a running gpsd instance
pub struct GpsdSession {
    reader: BufReader<TcpStream>,
    data: FixState,
    decoder: Decoder,
    verbose: bool,
    line: String,
}

impl GpsdSession {
    /// Connect to gpsd; `host` may carry a `:port` suffix when `port` is `None`
    pub async fn connect(host: &str, port: Option<u16>) -> Result<Self> {
        let (host, port) = resolve_address(host, port)?;
        let stream = TcpStream::connect((host.as_str(), port))
            .await
            .map_err(|e| GpsError::Connection(format!("Failed to connect to gpsd at {}:{}: {}", host, port, e)))?;

        info!("connected to gpsd at {}:{}", host, port);
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream(stream: TcpStream) -> Self {
        Self {
            reader: BufReader::new(stream),
            data: FixState::new(),
            decoder: Decoder::new(),
            verbose: false,
            line: String::new(),
        }
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Register a hook that sees every raw line read from the daemon
    pub fn set_raw_hook(&mut self, hook: impl RawLineObserver + 'static) {
        self.decoder.set_observer(hook);
    }

    pub fn data(&self) -> &FixState {
        &self.data
    }

    /// Wait for the next line from gpsd and decode it
    pub async fn poll(&mut self) -> Result<Decoded> {
        self.line.clear();
        let n = self
            .reader
            .read_line(&mut self.line)
            .await
            .map_err(|e| GpsError::Connection(format!("Failed to read from gpsd: {}", e)))?;

        if n == 0 {
            info!("gpsd closed the connection");
            return Err(GpsError::Connection("gpsd closed the connection".to_string()));
        }

        if self.verbose {
            debug!("GPS DATA {:?}", self.line);
        }

        Ok(self.decoder.decode(&self.line, &mut self.data))
    }

    /// Send a command string, then wait for and decode the response
    pub async fn query(&mut self, commands: &str) -> Result<Decoded> {
        let stream = self.reader.get_mut();
        stream
            .write_all(commands.as_bytes())
            .await
            .map_err(|e| GpsError::Connection(format!("Failed to send command: {}", e)))?;
        if !commands.ends_with('\n') {
            stream
                .write_all(b"\n")
                .await
                .map_err(|e| GpsError::Connection(format!("Failed to send command: {}", e)))?;
        }
        stream.flush().await?;

        self.poll().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gps::data::FixStatus;
    use std::sync::{Arc, Mutex};
    use tokio::{io::AsyncReadExt, net::TcpListener};

    #[test]
    fn test_resolve_address() {
        assert_eq!(resolve_address("localhost", None).unwrap(), ("localhost".to_string(), 2947));
        assert_eq!(resolve_address("gps.local:3000", None).unwrap(), ("gps.local".to_string(), 3000));
        assert_eq!(resolve_address("gps.local:3000", Some(4000)).unwrap(), ("gps.local:3000".to_string(), 4000));
        assert_eq!(resolve_address("::1", None).unwrap(), ("::1".to_string(), 2947));
        assert!(resolve_address("gps.local:abc", None).is_err());
    }

    #[tokio::test]
    async fn test_poll_decodes_lines() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"GPSD,S=1,P=37.3 -122.0\nGPSD,S=1,P=37.3 -122.0\n").await.unwrap();
        });

        let mut session = GpsdSession::connect("127.0.0.1", Some(addr.port())).await.unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        session.set_raw_hook(move |line: &str| sink.lock().unwrap().push(line.trim_end().to_string()));

        let first = session.poll().await.unwrap();
        assert!(first.changed);
        assert_eq!(*session.data().status.get(), FixStatus::Fix);
        assert_eq!(session.data().latitude(), 37.3);

        let second = session.poll().await.unwrap();
        assert!(!second.changed);

        // peer hung up
        assert!(matches!(session.poll().await, Err(GpsError::Connection(_))));
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_query_sends_command() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 3];
            socket.read_exact(&mut buf).await.unwrap();
            socket.write_all(b"GPSD,A=545.4\n").await.unwrap();
            buf
        });

        let mut session = GpsdSession::connect(&format!("127.0.0.1:{}", addr.port()), None).await.unwrap();
        let decoded = session.query("pa").await.unwrap();
        assert!(decoded.changed);
        assert_eq!(*session.data().altitude.get(), 545.4);
        assert_eq!(&server.await.unwrap(), b"pa\n");
    }
}
