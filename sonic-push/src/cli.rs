//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "sonic-push",
    version,
    about = "Apply configuration files to Dell SONiC switches",
    long_about = "Pushes line-oriented configuration files to Dell SONiC switches through an interactive\nsonic-cli session over SSH. Files are grouped by the switch name found in their file name\n(e.g. esw123.txt), names are resolved through a hosts file, and a batch pipe into sonic-cli\nis used once if the interactive session breaks.",
    after_help = "EXAMPLES:\n  sonic-push esw123.txt\n  sonic-push configs/\n  sonic-push /path/to/configs/ --hostname esw456\n  sonic-push switch_configs/ --backup\n  sonic-push esw123.txt --hosts-file /path/to/custom_hosts.txt"
)]
pub struct Cli {
    #[arg(help = "Configuration file or directory containing configuration files")]
    pub config_path: PathBuf,

    #[arg(short = 'u', long, help = "SSH username (prompted if not provided)")]
    pub username: Option<String>,

    #[arg(long, help = "Only configure this switch")]
    pub hostname: Option<String>,

    #[arg(long, default_value = "22", help = "SSH port")]
    pub port: u16,

    #[arg(long, default_value = "30", help = "SSH connect timeout in seconds")]
    pub timeout: u64,

    #[arg(long, help = "Back up the running configuration before pushing")]
    pub backup: bool,

    #[arg(long, default_value = ".", help = "Directory for backup files")]
    pub backup_dir: PathBuf,

    #[arg(long, help = "Show what would be done without applying changes")]
    pub dry_run: bool,

    #[arg(
        long,
        default_value = "hosts.txt",
        help = "Hosts file for hostname resolution"
    )]
    pub hosts_file: PathBuf,

    #[arg(long, help = "Validate the hosts file format and exit")]
    pub validate_hosts: bool,

    #[arg(
        long,
        help = "Reject hosts missing from known_hosts instead of accepting new keys"
    )]
    pub strict_host_keys: bool,

    #[arg(long, help = "JSON file overriding the session pacing intervals")]
    pub pacing: Option<PathBuf>,

    #[arg(long, help = "Write a JSON run report to this path")]
    pub report: Option<PathBuf>,

    #[arg(long, help = "Also write log records to this file")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,
}
