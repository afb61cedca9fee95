//! CLI definitions and command routing.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::blocker::{Blocker, Consistency};
use crate::config::{AppPaths, Settings};
use crate::error::ELEVATION_HINT;
use crate::timer::{format_remaining, TimerState};

#[derive(Parser)]
#[command(name = "hostguard")]
#[command(about = "Block domains via the hosts file, with a deliberate 15-minute wait before unblocking")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// First-run setup: store the domain list and turn blocking on
    Init {
        /// Domains to block (defaults to the starter list or built-in list)
        domains: Vec<String>,
        /// Read domains from a file, one per line ('#' comments allowed)
        #[arg(long)]
        from_file: Option<PathBuf>,
    },

    /// Show blocking and timer status
    Status,

    /// Turn blocking on, or re-sync the hosts file with the domain list
    Apply,

    /// Turn blocking off (needs a completed timer)
    Off,

    /// Remove all blocks and delete hostguard's state (needs a completed timer)
    Uninstall,

    /// Show or change the domain list
    Domains {
        #[command(subcommand)]
        cmd: DomainsCmd,
    },

    /// Manage the 15-minute turn-off timer
    Timer {
        #[command(subcommand)]
        cmd: TimerCmd,
    },

    /// Re-apply blocking if the hosts block was removed or is incomplete
    Check,

    /// Run health checks
    Doctor,
}

#[derive(Subcommand)]
pub enum DomainsCmd {
    /// List stored domains
    List {
        /// Show the expanded set written to the hosts file (with www. variants)
        #[arg(long)]
        expanded: bool,
    },
    /// Replace the domain list and re-apply blocking (needs a completed timer)
    Set {
        domains: Vec<String>,
        /// Read domains from a file, one per line ('#' comments allowed)
        #[arg(long)]
        from_file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum TimerCmd {
    /// Start the timer; blocking stays on while it runs
    Start,
    /// Cancel the timer and keep blocking
    Cancel,
    /// Show timer state and time left
    Status,
}

/// Run CLI and dispatch to handlers.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = AppPaths::default_paths();
    let settings = Settings::load(&paths)?;
    crate::logging::setup_logging(&settings.log_level);

    match cli.command {
        Commands::Init { domains, from_file } => cmd_init(&paths, &settings, domains, from_file),
        Commands::Status => cmd_status(&Blocker::open(&paths, &settings)?),
        Commands::Apply => cmd_apply(&Blocker::open(&paths, &settings)?),
        Commands::Off => cmd_off(&Blocker::open(&paths, &settings)?),
        Commands::Uninstall => cmd_uninstall(&paths, &Blocker::open(&paths, &settings)?),
        Commands::Domains { cmd } => cmd_domains(&Blocker::open(&paths, &settings)?, cmd),
        Commands::Timer { cmd } => cmd_timer(&Blocker::open(&paths, &settings)?, cmd),
        Commands::Check => cmd_check(&Blocker::open(&paths, &settings)?),
        Commands::Doctor => cmd_doctor(&Blocker::open(&paths, &settings)?),
    }
}

/// Positional domains plus those read from `from_file`.
fn collect_domains(mut domains: Vec<String>, from_file: Option<&Path>) -> Result<Vec<String>> {
    if let Some(path) = from_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read domain list {}", path.display()))?;
        domains.extend(crate::domain::parse_domain_list(&text));
    }
    Ok(domains)
}

fn cmd_init(
    paths: &AppPaths,
    settings: &Settings,
    domains: Vec<String>,
    from_file: Option<PathBuf>,
) -> Result<()> {
    if !paths.settings_file.is_file() {
        settings.save(paths)?;
    }
    let blocker = Blocker::open(paths, settings)?;
    let domains = collect_domains(domains, from_file.as_deref())?;
    blocker.onboard(&domains)?;
    println!(
        "Blocking is on for {} domain(s) in {}",
        blocker.domains().len(),
        blocker.hosts().path().display()
    );
    println!("hostguard initialised at {}", paths.data_dir.display());
    Ok(())
}

fn cmd_status(blocker: &Blocker) -> Result<()> {
    match blocker.is_active() {
        Ok(true) => println!("Blocking: on"),
        Ok(false) => println!("Blocking: off"),
        Err(e) => println!("Blocking: unknown ({})", e.detail()),
    }
    println!("Timer: {}", blocker.timer_state());
    println!(
        "Domains: {} ({} with www. variants)",
        blocker.domains().len(),
        blocker.expanded_domains().len()
    );
    if !blocker.is_onboarded() {
        println!("Setup not finished. Run 'hostguard init'.");
    }
    Ok(())
}

fn cmd_apply(blocker: &Blocker) -> Result<()> {
    blocker.apply()?;
    println!(
        "Blocking on: {} domain(s) routed to this device.",
        blocker.expanded_domains().len()
    );
    Ok(())
}

fn cmd_off(blocker: &Blocker) -> Result<()> {
    if blocker.turn_off()? {
        println!("Blocking turned off. Run 'hostguard apply' to turn it back on.");
    } else {
        println!("Blocking was not active.");
    }
    Ok(())
}

fn cmd_uninstall(paths: &AppPaths, blocker: &Blocker) -> Result<()> {
    blocker.uninstall()?;
    if paths.settings_file.is_file() {
        std::fs::remove_file(&paths.settings_file)?;
    }
    // Leaves the directory if the user kept a preset list in it.
    let _ = std::fs::remove_dir(&paths.data_dir);
    println!("Uninstalled. All blocks removed; you can now delete hostguard.");
    Ok(())
}

fn cmd_domains(blocker: &Blocker, cmd: DomainsCmd) -> Result<()> {
    match cmd {
        DomainsCmd::List { expanded } => {
            let list = if expanded {
                blocker.expanded_domains()
            } else {
                blocker.domains()
            };
            for d in list {
                println!("{d}");
            }
            Ok(())
        }
        DomainsCmd::Set { domains, from_file } => {
            let domains = collect_domains(domains, from_file.as_deref())?;
            blocker.set_domains(&domains)?;
            println!("Domain list updated ({} domain(s)).", blocker.domains().len());
            blocker.apply()?;
            println!("Blocking re-applied.");
            Ok(())
        }
    }
}

fn cmd_timer(blocker: &Blocker, cmd: TimerCmd) -> Result<()> {
    match cmd {
        TimerCmd::Start => {
            match blocker.start_timer()? {
                TimerState::Ready => println!("Timer already done; you can turn blocking off."),
                state => println!("Timer started: {state}. Blocking stays on meanwhile."),
            }
            Ok(())
        }
        TimerCmd::Cancel => {
            blocker.cancel_timer()?;
            println!("Timer cancelled. Blocking stays on.");
            Ok(())
        }
        TimerCmd::Status => {
            let state = blocker.timer_state();
            println!("{state}");
            if let TimerState::Running { .. } = state {
                println!("{}", format_remaining(blocker.time_remaining()));
            }
            Ok(())
        }
    }
}

fn cmd_check(blocker: &Blocker) -> Result<()> {
    match blocker.ensure_consistency() {
        Consistency::AlreadyActive => println!("Blocking already active."),
        Consistency::Reapplied => println!("Blocking re-applied."),
        Consistency::Failed(e) => {
            eprintln!("Warning: could not restore blocking: {}", e.detail());
            if e.is_permission_denied() {
                eprintln!("{ELEVATION_HINT}");
            }
        }
    }
    Ok(())
}

fn cmd_doctor(blocker: &Blocker) -> Result<()> {
    for check in crate::doctor::run_checks(blocker) {
        let mark = if check.ok { "ok" } else { "!!" };
        println!("[{mark}] {}", check.message);
    }
    Ok(())
}
