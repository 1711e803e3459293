//! Printer adapters for sending ESC/POS data
//!
//! Supports:
//! - Network printers (raw TCP, port 9100)
//! - Local spooler printers addressed by name (CUPS `lp` in raw mode)
//!
//! Each job opens its own connection, writes the whole buffer and closes it.
//! Nothing is held open between jobs and nothing is retried here.

use std::fmt;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::process::Command;
use tracing::{info, instrument, warn};

use crate::error::{PrintError, PrintResult};

/// Default raw printing port
pub const DEFAULT_PORT: u16 = 9100;

/// Default bound for a whole connect + write sequence
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

/// Trait for printer adapters
#[async_trait]
pub trait Printer: Send + Sync + fmt::Debug {
    /// Send raw ESC/POS data to the printer
    ///
    /// `Ok(())` means the whole buffer was handed to the transport layer.
    async fn print(&self, data: &[u8]) -> PrintResult<()>;

    /// Check if the printer is online/reachable
    async fn is_online(&self) -> bool;

    /// Human-readable address, used in operator-facing error messages
    fn destination(&self) -> String;
}

/// Where tickets are sent, as configured by the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterDestination {
    /// Named printer on the local spooler
    Spooler { name: String },
    /// Raw socket printer
    Network { host: String, port: u16 },
}

impl PrinterDestination {
    /// Build the printer adapter for this destination
    pub fn connect(&self, timeout: Duration) -> PrintResult<Arc<dyn Printer>> {
        match self {
            PrinterDestination::Spooler { name } => {
                Ok(Arc::new(SpoolerPrinter::new(name)?.with_timeout(timeout)))
            }
            PrinterDestination::Network { host, port } => {
                Ok(Arc::new(NetworkPrinter::new(host, *port)?.with_timeout(timeout)))
            }
        }
    }
}

impl fmt::Display for PrinterDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrinterDestination::Spooler { name } => write!(f, "printer:{}", name),
            PrinterDestination::Network { host, port } => write!(f, "{}:{}", host, port),
        }
    }
}

// ============================================================================
// Network printer
// ============================================================================

/// Network printer (raw TCP)
///
/// Most thermal printers support raw printing on port 9100.
#[derive(Debug, Clone)]
pub struct NetworkPrinter {
    host: String,
    port: u16,
    timeout: Duration,
}

impl NetworkPrinter {
    /// Create a new network printer
    ///
    /// `host` may be an IP address or a resolvable host name.
    pub fn new(host: &str, port: u16) -> PrintResult<Self> {
        let host = host.trim();
        if host.is_empty() {
            return Err(PrintError::InvalidConfig("Empty printer host".to_string()));
        }
        if port == 0 {
            return Err(PrintError::InvalidConfig(format!(
                "Invalid port for {}: 0",
                host
            )));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set the connect + write timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the printer address
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    async fn send(&self, data: &[u8]) -> PrintResult<()> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| PrintError::Unreachable(format!("{}: {}", self.addr(), e)))?;

        info!("Connected, sending {} bytes", data.len());

        stream
            .write_all(data)
            .await
            .map_err(|e| PrintError::WriteFailed(format!("{}: {}", self.addr(), e)))?;
        stream
            .flush()
            .await
            .map_err(|e| PrintError::WriteFailed(format!("{}: {}", self.addr(), e)))?;
        // Half-close so the printer sees EOF; a failure here does not undo the write
        if let Err(e) = stream.shutdown().await {
            warn!(error = %e, "Socket shutdown failed after write");
        }
        Ok(())
    }
}

#[async_trait]
impl Printer for NetworkPrinter {
    #[instrument(skip(self, data), fields(addr = %self.addr(), data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        info!("Connecting to printer");

        // One bound for the whole sequence; dropping the future closes the socket
        tokio::time::timeout(self.timeout, self.send(data))
            .await
            .map_err(|_| {
                PrintError::Timeout(format!(
                    "{} did not accept the job within {}ms",
                    self.addr(),
                    self.timeout.as_millis()
                ))
            })??;

        info!("Print job sent successfully");
        Ok(())
    }

    #[instrument(skip(self), fields(addr = %self.addr()))]
    async fn is_online(&self) -> bool {
        let check_timeout = Duration::from_millis(500);

        match tokio::time::timeout(
            check_timeout,
            TcpStream::connect((self.host.as_str(), self.port)),
        )
        .await
        {
            Ok(Ok(_)) => {
                info!("Printer online");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Printer offline");
                false
            }
            Err(_) => {
                warn!("Printer check timeout");
                false
            }
        }
    }

    fn destination(&self) -> String {
        self.addr()
    }
}

// ============================================================================
// Local spooler printer
// ============================================================================

/// Named printer on the local spooler
///
/// Uses the CUPS command line tools: `lpstat -p` as liveness check and
/// `lp -o raw` to submit the buffer untouched.
#[derive(Debug, Clone)]
pub struct SpoolerPrinter {
    name: String,
    timeout: Duration,
}

impl SpoolerPrinter {
    /// Create a printer with a specific name
    pub fn new(name: &str) -> PrintResult<Self> {
        let name = name.trim();
        if name.is_empty() || name.starts_with('-') {
            return Err(PrintError::InvalidConfig(format!(
                "Invalid printer name: {:?}",
                name
            )));
        }
        Ok(Self {
            name: name.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set the check + submit timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the printer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Liveness check: the queue exists and is not disabled
    async fn check_online(&self) -> PrintResult<bool> {
        let output = Command::new("lpstat")
            .arg("-p")
            .arg(&self.name)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| PrintError::Unreachable(format!("lpstat: {}", e)))?;

        if !output.status.success() {
            return Ok(false);
        }
        let status = String::from_utf8_lossy(&output.stdout).to_lowercase();
        Ok(!status.contains("disabled"))
    }

    async fn submit(&self, data: &[u8]) -> PrintResult<()> {
        let mut child = Command::new("lp")
            .arg("-d")
            .arg(&self.name)
            .arg("-o")
            .arg("raw")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PrintError::Unreachable(format!("lp: {}", e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| PrintError::WriteFailed("lp stdin not captured".to_string()))?;
        stdin
            .write_all(data)
            .await
            .map_err(|e| PrintError::WriteFailed(format!("{}: {}", self.name, e)))?;
        // Close stdin so lp submits the job
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| PrintError::WriteFailed(format!("{}: {}", self.name, e)))?;

        if !output.status.success() {
            return Err(PrintError::WriteFailed(format!(
                "{}: {}",
                self.name,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Printer for SpoolerPrinter {
    #[instrument(skip(self, data), fields(printer = %self.name, data_len = data.len()))]
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        let job = async {
            // Fail fast without writing when the queue is not ready
            if !self.check_online().await? {
                return Err(PrintError::Unreachable(format!(
                    "printer:{} is not connected",
                    self.name
                )));
            }
            self.submit(data).await
        };

        tokio::time::timeout(self.timeout, job).await.map_err(|_| {
            PrintError::Timeout(format!(
                "printer:{} did not accept the job within {}ms",
                self.name,
                self.timeout.as_millis()
            ))
        })??;

        info!("Print job sent successfully");
        Ok(())
    }

    async fn is_online(&self) -> bool {
        matches!(
            tokio::time::timeout(self.timeout, self.check_online()).await,
            Ok(Ok(true))
        )
    }

    fn destination(&self) -> String {
        format!("printer:{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[test]
    fn test_network_printer_new() {
        let printer = NetworkPrinter::new(" 192.168.1.100 ", DEFAULT_PORT).unwrap();
        assert_eq!(printer.addr(), "192.168.1.100:9100");
        assert_eq!(printer.destination(), "192.168.1.100:9100");
    }

    #[test]
    fn test_invalid_network_config() {
        assert!(NetworkPrinter::new("", 9100).is_err());
        assert!(NetworkPrinter::new("10.0.0.1", 0).is_err());
    }

    #[test]
    fn test_spooler_name_validation() {
        assert!(SpoolerPrinter::new("EPSON_TM_T20").is_ok());
        assert!(SpoolerPrinter::new("  ").is_err());
        assert!(SpoolerPrinter::new("-d").is_err());
    }

    #[cfg(unix)]
    fn stub_tool(dir: &std::path::Path, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    // The only test in this crate that touches PATH or spawns processes
    #[cfg(unix)]
    #[tokio::test]
    async fn test_spooler_checks_queue_before_submitting() {
        let dir = tempfile::tempdir().unwrap();
        let submitted = dir.path().join("submitted.bin");
        stub_tool(
            dir.path(),
            "lp",
            &format!("cat > '{}'", submitted.display()),
        );

        let original_path = std::env::var("PATH").unwrap_or_default();
        unsafe {
            std::env::set_var("PATH", format!("{}:{}", dir.path().display(), original_path));
        }

        let printer = SpoolerPrinter::new("COCINA").unwrap();

        // Unknown queue: lpstat exits non-zero, lp never runs
        stub_tool(dir.path(), "lpstat", "exit 1");
        let err = printer.print(b"comanda 12").await.unwrap_err();
        assert!(
            matches!(err, PrintError::Unreachable(ref msg) if msg.contains("printer:COCINA")),
            "got {err:?}"
        );
        assert!(!printer.is_online().await);
        assert!(!submitted.exists());

        // Disabled queue is treated the same way
        stub_tool(dir.path(), "lpstat", "echo 'printer COCINA disabled since lun'");
        let err = printer.print(b"comanda 12").await.unwrap_err();
        assert!(matches!(err, PrintError::Unreachable(_)), "got {err:?}");
        assert!(!submitted.exists());

        // Idle queue gets the raw buffer on stdin
        stub_tool(dir.path(), "lpstat", "echo 'printer COCINA is idle.'");
        assert!(printer.is_online().await);
        let payload = [0x1B, 0x40, b'h', b'o', b'l', b'a', 0x1D, 0x56, 0x00];
        printer.print(&payload).await.unwrap();
        assert_eq!(std::fs::read(&submitted).unwrap(), payload);

        unsafe {
            std::env::set_var("PATH", original_path);
        }
    }

    #[test]
    fn test_destination_display() {
        let net = PrinterDestination::Network {
            host: "10.0.0.7".into(),
            port: 9100,
        };
        assert_eq!(net.to_string(), "10.0.0.7:9100");
        let spool = PrinterDestination::Spooler {
            name: "COCINA".into(),
        };
        assert_eq!(spool.to_string(), "printer:COCINA");
        assert_eq!(
            spool.connect(DEFAULT_TIMEOUT).unwrap().destination(),
            "printer:COCINA"
        );
    }

    #[tokio::test]
    async fn test_network_print_delivers_whole_buffer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        });

        let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let printer = NetworkPrinter::new("127.0.0.1", port).unwrap();
        printer.print(&payload).await.unwrap();

        assert_eq!(server.await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_network_print_refused_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let printer = NetworkPrinter::new("127.0.0.1", port).unwrap();
        let err = printer.print(b"hola").await.unwrap_err();
        assert!(matches!(err, PrintError::Unreachable(_)), "got {err:?}");
        assert!(!printer.is_online().await);
    }

    #[tokio::test]
    async fn test_network_print_stalled_reader_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        // Accept but never read, so the socket buffers fill up
        let holder = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let payload = vec![b'x'; 64 * 1024 * 1024];
        let printer = NetworkPrinter::new("127.0.0.1", port)
            .unwrap()
            .with_timeout(Duration::from_millis(300));
        let err = printer.print(&payload).await.unwrap_err();
        assert!(matches!(err, PrintError::Timeout(_)), "got {err:?}");

        holder.abort();
    }
}
