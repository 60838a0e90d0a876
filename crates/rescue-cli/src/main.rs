//! `rescue-cli` – operator shell for the maze-rescue robot.
//!
//! This binary:
//!
//! 1. Installs logging and optional trace export via
//!    [`rescue_runtime::init_tracing`].
//! 2. Loads `~/.rescue/config.toml` (defaults when absent, `RESCUE_*`
//!    overrides applied).
//! 3. Drops the operator into an interactive REPL that runs simulated
//!    missions and draws the maze.
//! 4. Turns **Ctrl-C** into a mission abort while a mission runs, and into a
//!    clean exit otherwise.

mod config;
mod render;
mod repl;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Flags shared between the Ctrl-C handler and the REPL.
#[derive(Default)]
pub struct Interrupts {
    /// Raised by Ctrl-C; polled by the mission between cells.
    pub abort: AtomicBool,
    /// Set while a mission is running.
    pub in_mission: AtomicBool,
}

fn main() {
    let _guard = rescue_runtime::init_tracing("rescue");

    print_banner();

    let interrupts = Arc::new(Interrupts::default());
    let handler_flags = interrupts.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if handler_flags.in_mission.load(Ordering::SeqCst) {
            println!();
            println!("{}", "⚠  Ctrl-C received – stopping the robot …".yellow().bold());
            handler_flags.abort.store(true, Ordering::SeqCst);
        } else {
            println!();
            println!("{}", "  ✓ Exiting.".green());
            std::process::exit(0);
        }
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler; missions cannot be aborted");
    }

    match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            println!(
                "  Home {}  ·  {} waypoint(s)  ·  {} victim(s) to find",
                cfg.mission.home,
                cfg.mission.waypoints.len(),
                cfg.mission.victim_count
            );
        }
        Ok(None) => println!(
            "  No config at {}; using defaults. {} writes one.",
            config::config_path().display().to_string().dimmed(),
            "/config init".bold()
        ),
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Fix the file or remove it to fall back to defaults.");
        }
    }

    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    repl::run(&interrupts);
}

fn print_banner() {
    println!();
    println!("{}", r#"   ___                        "#.bold().cyan());
    println!("{}", r#"  / _ \___ ___ ______ _____   "#.bold().cyan());
    println!("{}", r#" / , _/ -_|_-</ __/ // / -_)  "#.bold().cyan());
    println!("{}", r#"/_/|_|\__/___/\__/\_,_/\__/   "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "Rescue".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Maze rescue robot controller");
    println!();
}
