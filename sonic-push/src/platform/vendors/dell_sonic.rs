//! Dell Enterprise SONiC platform definition.
//!
//! Login lands in a Linux shell. Configuration goes through the management
//! CLI, started with `sonic-cli`:
//!
//! ```text
//! admin@sonic:~$ sonic-cli
//! sonic# configure
//! sonic(config)# interface Ethernet0
//! sonic(conf-if-Ethernet0)# end
//! sonic# write memory
//! sonic# exit
//! ```
//!
//! Rejections are free text, e.g. `% Error: Invalid input detected at "^" marker.`

use crate::platform::PlatformDefinition;

/// Platform name used in logs.
pub const PLATFORM_NAME: &str = "dell_sonic";

/// Create the Dell SONiC platform definition.
pub fn platform() -> PlatformDefinition {
    PlatformDefinition::new(PLATFORM_NAME)
        .with_cli_command("sonic-cli")
        .with_config_command("configure")
        .with_save_command("write memory")
        .with_backup_command("show running-configuration")
        .with_failure_pattern("Error")
        .with_failure_pattern("error")
        .with_failure_pattern("Invalid")
}
