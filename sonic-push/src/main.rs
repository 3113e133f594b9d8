use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use indexmap::IndexMap;
use log::{error, info};
use secrecy::SecretString;

use sonic_push::cli::Cli;
use sonic_push::hosts::{resolve, validate_hosts_file};
use sonic_push::platform::Pacing;
use sonic_push::platform::vendors::dell_sonic;
use sonic_push::runner::{RunOptions, RunSummary, process_device};
use sonic_push::source::{discover_config_files, group_by_device, load_commands};
use sonic_push::transport::{HostKeyVerification, SessionBuilder, SshConnector};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = sonic_push::logging::init(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    if cli.validate_hosts {
        info!("Validating hosts file: {}", cli.hosts_file.display());
        let valid = validate_hosts_file(&cli.hosts_file).await;
        if valid {
            info!("Hosts file validation passed");
        } else {
            error!("Hosts file validation failed");
        }
        return Ok(valid);
    }

    validate_hosts_file(&cli.hosts_file).await;

    let files = discover_config_files(&cli.config_path)?;
    if files.is_empty() {
        bail!("No configuration files found");
    }

    let devices = group_by_device(&files);
    info!("Found configuration files for {} switches:", devices.len());
    for (device, files) in &devices {
        let address = resolve(device, &cli.hosts_file).await;
        let via = if address != *device {
            format!(" -> {address}")
        } else {
            String::new()
        };
        info!("  {}{}: {} file(s)", device, via, files.len());
        for file in files {
            info!("    - {}", file.display());
        }
    }

    let targets = match &cli.hostname {
        Some(name) => match devices.get(name) {
            Some(files) => IndexMap::from([(name.clone(), files.clone())]),
            None => bail!("No configuration files found for hostname: {name}"),
        },
        None => devices,
    };

    if cli.dry_run {
        dry_run(&cli, &targets).await;
        return Ok(true);
    }

    let mut platform = dell_sonic::platform();
    if let Some(path) = &cli.pacing {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read pacing file {}", path.display()))?;
        let pacing: Pacing = serde_json::from_str(&text)
            .with_context(|| format!("Invalid pacing file {}", path.display()))?;
        platform = platform.with_pacing(pacing);
    }

    let username = match &cli.username {
        Some(username) => username.clone(),
        None => prompt("Enter SSH username: ")?,
    };
    let password = rpassword::prompt_password("Enter SSH password: ")
        .context("Failed to read password")?;

    let connector = SshConnector::new(
        SessionBuilder::new("")
            .port(cli.port)
            .username(username)
            .secret_password(SecretString::new(password.into_boxed_str()))
            .timeout(Duration::from_secs(cli.timeout))
            .host_key_verification(HostKeyVerification::from_strict(cli.strict_host_keys)),
    );
    let options = RunOptions {
        backup: cli.backup,
        backup_dir: cli.backup_dir.clone(),
    };

    let mut summary = RunSummary::new();
    for (device, files) in &targets {
        info!("{}", "=".repeat(60));
        info!("Processing switch: {}", device);
        info!("Configuration files: {}", files.len());
        info!("{}", "=".repeat(60));

        let address = resolve(device, &cli.hosts_file).await;
        summary.push(process_device(&connector, &platform, device, &address, files, &options).await);
    }

    summary.log_summary();
    if let Some(path) = &cli.report {
        summary.write_report(path).await?;
        info!("Run report written to {}", path.display());
    }

    Ok(summary.success())
}

async fn dry_run(cli: &Cli, targets: &IndexMap<String, Vec<std::path::PathBuf>>) {
    info!("DRY RUN MODE - Configuration will not be applied");
    info!("Target switches: {:?}", targets.keys().collect::<Vec<_>>());

    let mut grand_total = 0;
    for (device, files) in targets {
        let address = resolve(device, &cli.hosts_file).await;
        if address != *device {
            info!("Switch: {} ({})", device, address);
        } else {
            info!("Switch: {}", device);
        }
        info!("Configuration files: {}", files.len());

        let mut total = 0;
        for file in files {
            info!("Configuration file: {}", file.display());
            match load_commands(file).await {
                Ok(commands) => {
                    info!("  Commands from {} ({}):", file.display(), commands.len());
                    for (i, command) in commands.iter().enumerate() {
                        println!("    {:3}: {}", i + 1, command);
                    }
                    total += commands.len();
                }
                Err(e) => error!("Error reading config file {}: {}", file.display(), e),
            }
        }

        info!("Total commands for {}: {}", device, total);
        grand_total += total;
    }

    info!("Grand total commands to be applied: {}", grand_total);
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read username")?;
    Ok(line.trim().to_string())
}
