//! Running-configuration backup.
//!
//! Runs the platform's read-only backup query on an exec channel and writes
//! its output verbatim. A failed backup is reported but never aborts a push.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{error, info};

use crate::error::{Result, SourceError};
use crate::platform::PlatformDefinition;
use crate::transport::SessionHandle;

/// Default backup file name for a device: `<device>_backup_<unix-seconds>.conf`.
pub fn backup_file_name(device: &str, now: SystemTime) -> String {
    let secs = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("{device}_backup_{secs}.conf")
}

/// Capture the running configuration into `path`.
///
/// Returns `true` only if the query exited with status zero, produced
/// non-blank output, and the file was written.
pub async fn capture_backup<S: SessionHandle>(
    session: &S,
    platform: &PlatformDefinition,
    device: &str,
    path: &Path,
) -> bool {
    info!("[{}] Creating configuration backup", device);
    match try_capture(session, platform, path).await {
        Ok(true) => {
            info!("[{}] Configuration backed up to {}", device, path.display());
            true
        }
        Ok(false) => false,
        Err(e) => {
            error!("[{}] Error creating backup: {}", device, e);
            false
        }
    }
}

async fn try_capture<S: SessionHandle>(
    session: &S,
    platform: &PlatformDefinition,
    path: &Path,
) -> Result<bool> {
    let output = session.exec(&platform.backup_command).await?;

    if !output.is_success() || output.stdout.trim().is_empty() {
        error!(
            "Failed to backup configuration (exit status {}): {}",
            output.exit_status,
            output.stderr.trim()
        );
        return Ok(false);
    }

    tokio::fs::write(path, output.stdout.as_bytes())
        .await
        .map_err(|source| SourceError::Write {
            path: PathBuf::from(path),
            source,
        })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::platform::vendors::dell_sonic;
    use crate::transport::ExecOutput;
    use crate::transport::mock::MockSession;

    const RUNNING: &str = "!\nhostname esw1\ninterface Ethernet0\n mtu 9100\n!\n";

    #[tokio::test]
    async fn test_backup_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("esw1_backup.conf");
        let session = MockSession::new().exec_reply(
            "show running-configuration",
            ExecOutput {
                stdout: RUNNING.to_string(),
                stderr: String::new(),
                exit_status: 0,
            },
        );

        assert!(capture_backup(&session, &dell_sonic::platform(), "esw1", &path).await);
        assert_eq!(std::fs::read(&path).unwrap(), RUNNING.as_bytes());
        assert_eq!(session.exec_sent(), vec!["show running-configuration"]);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("esw1_backup.conf");
        let session = MockSession::new().exec_default(ExecOutput {
            stdout: RUNNING.to_string(),
            stderr: "permission denied".to_string(),
            exit_status: 1,
        });

        assert!(!capture_backup(&session, &dell_sonic::platform(), "esw1", &path).await);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_empty_output_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("esw1_backup.conf");
        let session = MockSession::new().exec_default(ExecOutput {
            stdout: "  \n".to_string(),
            stderr: String::new(),
            exit_status: 0,
        });

        assert!(!capture_backup(&session, &dell_sonic::platform(), "esw1", &path).await);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_channel_and_write_failures_do_not_raise() {
        let dir = tempfile::tempdir().unwrap();
        let platform = dell_sonic::platform();

        let broken = MockSession::new().exec_error();
        assert!(!capture_backup(&broken, &platform, "esw1", &dir.path().join("a.conf")).await);

        let healthy = MockSession::new().exec_default(ExecOutput {
            stdout: RUNNING.to_string(),
            stderr: String::new(),
            exit_status: 0,
        });
        let unwritable = dir.path().join("missing-dir").join("b.conf");
        assert!(!capture_backup(&healthy, &platform, "esw1", &unwritable).await);
    }

    #[test]
    fn test_backup_file_name() {
        let when = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(backup_file_name("esw1", when), "esw1_backup_1700000000.conf");
    }
}
