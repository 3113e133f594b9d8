//! Per-device processing and the end-of-run summary.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::{error, info, warn};
use serde::Serialize;

use crate::backup::{backup_file_name, capture_backup};
use crate::driver::{CommandOutcome, ConfigPusher};
use crate::error::{Result, SourceError};
use crate::platform::PlatformDefinition;
use crate::source::load_commands;
use crate::transport::Connector;

/// Options shared by every device in a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Capture the running configuration before pushing.
    pub backup: bool,

    /// Directory backup files are written to.
    pub backup_dir: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            backup: false,
            backup_dir: PathBuf::from("."),
        }
    }
}

/// What happened on one device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub hostname: String,
    pub address: String,
    pub success: bool,
    pub files_processed: usize,
    pub error: Option<String>,
    pub failed: Vec<CommandOutcome>,
    pub unreadable_files: Vec<PathBuf>,
    pub backup: Option<PathBuf>,
}

impl DeviceReport {
    fn new(hostname: &str, address: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            address: address.to_string(),
            success: false,
            files_processed: 0,
            error: None,
            failed: Vec::new(),
            unreadable_files: Vec::new(),
            backup: None,
        }
    }

    fn finish(mut self) -> Self {
        self.success = self.failed.is_empty() && self.unreadable_files.is_empty();
        if !self.failed.is_empty() {
            self.error = Some(format!("{} command failures", self.failed.len()));
        } else if !self.unreadable_files.is_empty() {
            self.error = Some(format!("{} unreadable files", self.unreadable_files.len()));
        }
        self
    }
}

/// Connect to one device, optionally back it up, push every file in
/// order, then disconnect.
///
/// Never fails: every problem ends up in the returned report.
pub async fn process_device<C: Connector>(
    connector: &C,
    platform: &PlatformDefinition,
    hostname: &str,
    address: &str,
    files: &[PathBuf],
    options: &RunOptions,
) -> DeviceReport {
    let mut report = DeviceReport::new(hostname, address);

    info!("[{}] Connecting to {}", hostname, address);
    let session = match connector.connect(address).await {
        Ok(session) => session,
        Err(e) => {
            error!("[{}] Failed to connect to switch: {}", hostname, e);
            report.error = Some("Connection failed".to_string());
            return report;
        }
    };
    info!("[{}] Successfully connected", hostname);

    if options.backup {
        let path = options
            .backup_dir
            .join(backup_file_name(hostname, SystemTime::now()));
        if capture_backup(&session, platform, hostname, &path).await {
            report.backup = Some(path);
        } else {
            warn!("[{}] Failed to create backup, continuing anyway...", hostname);
        }
    }

    info!("[{}] Applying configuration from {} file(s)", hostname, files.len());
    let pusher = ConfigPusher::new(&session, platform, hostname);
    for (i, file) in files.iter().enumerate() {
        info!(
            "[{}] Processing file {}/{}: {}",
            hostname,
            i + 1,
            files.len(),
            file.display()
        );
        report.files_processed += 1;

        let commands = match load_commands(file).await {
            Ok(commands) => commands,
            Err(e) => {
                error!("[{}] Error reading configuration file: {}", hostname, e);
                report.unreadable_files.push(file.clone());
                continue;
            }
        };
        if commands.is_empty() {
            warn!("[{}] No commands in {}, skipping", hostname, file.display());
            continue;
        }

        let result = pusher.push(&commands).await;
        if result.is_success() {
            info!(
                "[{}] Configuration file {} applied successfully ({})",
                hostname,
                file.display(),
                result.strategy()
            );
        } else {
            error!(
                "[{}] Configuration file {} completed with errors",
                hostname,
                file.display()
            );
            report.failed.extend(result.into_failed());
        }
    }

    if let Err(e) = connector.disconnect(session).await {
        warn!("[{}] Error during disconnect: {}", hostname, e);
    }
    info!("[{}] Disconnected", hostname);

    let report = report.finish();
    if report.success {
        info!("[{}] All configuration files applied successfully", hostname);
    } else if !report.failed.is_empty() {
        error!(
            "[{}] Configuration completed with {} errors:",
            hostname,
            report.failed.len()
        );
        for outcome in &report.failed {
            error!("[{}]   {}", hostname, outcome);
        }
    }
    report
}

/// Reports for every device of a run, in processing order.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    devices: Vec<DeviceReport>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, report: DeviceReport) {
        self.devices.push(report);
    }

    pub fn devices(&self) -> &[DeviceReport] {
        &self.devices
    }

    /// Whether every device succeeded.
    pub fn success(&self) -> bool {
        self.devices.iter().all(|d| d.success)
    }

    pub fn successful(&self) -> usize {
        self.devices.iter().filter(|d| d.success).count()
    }

    pub fn failed(&self) -> usize {
        self.devices.len() - self.successful()
    }

    /// Log one line per device plus the totals.
    pub fn log_summary(&self) {
        info!("{}", "=".repeat(60));
        info!("CONFIGURATION SUMMARY");
        info!("{}", "=".repeat(60));

        for device in &self.devices {
            if device.success {
                info!(
                    "{}: SUCCESS ({} files processed)",
                    device.hostname, device.files_processed
                );
            } else {
                error!(
                    "{}: FAILED - {}",
                    device.hostname,
                    device.error.as_deref().unwrap_or("Unknown error")
                );
            }
        }

        let total = self.devices.len();
        info!("Successful: {}/{}", self.successful(), total);
        info!("Failed: {}/{}", self.failed(), total);

        if self.success() {
            info!("All switches configured successfully!");
        } else {
            error!("Some switches failed configuration. Check logs above for details.");
        }
    }

    /// Write the run as pretty-printed JSON.
    pub async fn write_report(&self, path: &Path) -> Result<()> {
        let write_error = |source| SourceError::Write {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| write_error(std::io::Error::other(e)))?;
        tokio::fs::write(path, json).await.map_err(write_error)?;
        Ok(())
    }
}
