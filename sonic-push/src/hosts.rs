//! Device name resolution through a local hosts file, then the system
//! resolver.
//!
//! The hosts file uses the familiar `/etc/hosts` layout:
//!
//! ```text
//! # IP_ADDRESS  HOSTNAME  [ALIAS...]
//! 10.20.0.11    esw101    esw101.lab
//! ```

use std::net::IpAddr;
use std::path::Path;

use log::{debug, error, info, warn};

use crate::error::{Result, SourceError};

/// One `IP NAME [ALIAS...]` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    /// Address as written in the file.
    pub address: String,
    /// Hostname followed by any aliases.
    pub names: Vec<String>,
}

/// A formatting problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsIssue {
    /// 1-based line number.
    pub line: usize,
    /// What is wrong with it.
    pub message: String,
}

/// Parsed hosts file.
#[derive(Debug, Clone, Default)]
pub struct HostsFile {
    entries: Vec<HostEntry>,
    issues: Vec<HostsIssue>,
}

impl HostsFile {
    /// Parse hosts file text. Lines that cannot be used are recorded as
    /// issues; lines with an unparsable address are still usable for lookup.
    pub fn parse(text: &str) -> Self {
        let mut hosts = Self::default();

        for (idx, line) in text.lines().enumerate() {
            let line_num = idx + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let address = parts.next().unwrap_or_default().to_string();
            let names: Vec<String> = parts.map(str::to_string).collect();

            if names.is_empty() {
                hosts.issues.push(HostsIssue {
                    line: line_num,
                    message: "Invalid format - need at least IP and hostname".to_string(),
                });
                continue;
            }

            if address.parse::<IpAddr>().is_err() {
                hosts.issues.push(HostsIssue {
                    line: line_num,
                    message: format!("Invalid IP address '{address}'"),
                });
            } else {
                debug!("hosts entry: {} -> {}", address, names.join(", "));
            }

            hosts.entries.push(HostEntry { address, names });
        }

        hosts
    }

    /// Read and parse a hosts file.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SourceError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::parse(&text))
    }

    /// Find the address for `name`, matching hostnames and aliases
    /// case-insensitively. The first matching line wins.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.names.iter().any(|n| n.eq_ignore_ascii_case(name)))
            .map(|entry| entry.address.as_str())
    }

    /// Parsed entries.
    pub fn entries(&self) -> &[HostEntry] {
        &self.entries
    }

    /// Formatting problems found while parsing.
    pub fn issues(&self) -> &[HostsIssue] {
        &self.issues
    }
}

/// Resolve a device name to an address.
///
/// Tries the hosts file, then the system resolver (first IPv4 address).
/// If both fail the name is returned unchanged.
pub async fn resolve(name: &str, hosts_path: &Path) -> String {
    if hosts_path.exists() {
        match HostsFile::load(hosts_path).await {
            Ok(hosts) => {
                if let Some(address) = hosts.lookup(name) {
                    info!("Resolved {} to {} via {}", name, address, hosts_path.display());
                    return address.to_string();
                }
            }
            Err(e) => warn!("Error reading hosts file '{}': {}", hosts_path.display(), e),
        }
    } else {
        debug!(
            "Hosts file '{}' not found, will use system resolver",
            hosts_path.display()
        );
    }

    if name.parse::<IpAddr>().is_ok() {
        return name.to_string();
    }

    match tokio::net::lookup_host((name, 0)).await {
        Ok(addrs) => {
            let mut addrs: Vec<IpAddr> = addrs.map(|a| a.ip()).collect();
            addrs.sort_by_key(|ip| !ip.is_ipv4());
            if let Some(ip) = addrs.first() {
                info!("Resolved {} to {} via system resolver", name, ip);
                return ip.to_string();
            }
        }
        Err(e) => warn!("Could not resolve hostname '{}' via system resolver: {}", name, e),
    }

    warn!("Using original hostname '{}' as IP resolution failed", name);
    name.to_string()
}

/// Validate a hosts file, logging every problem.
///
/// A missing file is valid (the system resolver is used instead).
pub async fn validate_hosts_file(path: &Path) -> bool {
    if !path.exists() {
        info!(
            "Hosts file '{}' not found - system resolver will be used",
            path.display()
        );
        return true;
    }

    let hosts = match HostsFile::load(path).await {
        Ok(hosts) => hosts,
        Err(e) => {
            error!("Error validating hosts file '{}': {}", path.display(), e);
            return false;
        }
    };

    for issue in hosts.issues() {
        warn!("{} line {}: {}", path.display(), issue.line, issue.message);
    }

    if hosts.issues().is_empty() {
        info!("Hosts file '{}' validated successfully", path.display());
        true
    } else {
        warn!(
            "Hosts file '{}' has format issues but will continue",
            path.display()
        );
        false
    }
}
