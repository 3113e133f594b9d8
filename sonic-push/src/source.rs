//! Configuration sources: command extraction, file discovery and grouping
//! of files by the device they target.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use indexmap::IndexMap;
use log::{info, warn};
use regex::Regex;

use crate::error::{Result, SourceError};

/// File extensions treated as configuration files when scanning a directory.
pub const CONFIG_EXTENSIONS: &[&str] = &["txt", "conf", "cfg", "config"];

/// One character, then `sw`, then up to eight digits, e.g. `esw123`.
static DEVICE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(.)sw\d{1,8}").expect("device name pattern is valid"));

/// A single configuration line, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command(String);

impl Command {
    /// Parse one physical line.
    ///
    /// Returns `None` for blank lines and for comments (first non-blank
    /// character `#` or `!`). Surrounding whitespace is trimmed.
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            return None;
        }
        Some(Self(line.to_string()))
    }

    /// The command text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Command {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract the ordered command list from a configuration blob.
///
/// Each physical line is at most one command; nothing is merged or split.
pub fn extract_commands(text: &str) -> Vec<Command> {
    text.lines().filter_map(Command::from_line).collect()
}

/// Read a configuration file and extract its commands.
pub async fn load_commands(path: &Path) -> Result<Vec<Command>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(extract_commands(&text))
}

/// List the configuration files at `path`.
///
/// A file is returned as is. A directory yields its files with a
/// configuration extension (or none), sorted by name.
pub fn discover_config_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        info!("Single configuration file: {}", path.display());
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        return Err(SourceError::NotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let entries = std::fs::read_dir(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file = entry.path();
        if file.is_file() && has_config_extension(&file) {
            files.push(file);
        }
    }
    files.sort();

    info!(
        "Found {} configuration files in directory: {}",
        files.len(),
        path.display()
    );
    if files.is_empty() {
        warn!("No configuration files found in directory: {}", path.display());
        warn!("Looking for files with extensions: .txt, .conf, .cfg, .config, or no extension");
    }

    Ok(files)
}

fn has_config_extension(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        None => true,
        Some(ext) => CONFIG_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext)),
    }
}

/// Derive the target device name from a configuration file name.
///
/// Falls back to the file stem when no switch name is embedded.
pub fn device_name_from_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match DEVICE_NAME.find(&stem) {
        Some(m) => {
            let name = m.as_str().to_lowercase();
            info!("Found SW switch name: {}", name);
            name
        }
        None => {
            warn!("No SW switch name pattern found in filename '{}'", path.display());
            warn!("Expected pattern: sw + up to 8 digits (e.g., esw123, esw12345678)");
            stem
        }
    }
}

/// Group files by device name, keeping first-seen order.
pub fn group_by_device(files: &[PathBuf]) -> IndexMap<String, Vec<PathBuf>> {
    let mut groups: IndexMap<String, Vec<PathBuf>> = IndexMap::new();
    for file in files {
        groups
            .entry(device_name_from_path(file))
            .or_default()
            .push(file.clone());
    }
    groups
}
