//! REPL – the interactive `rescue>` shell.
//!
//! Supported slash-commands:
//!   /help          – show this list
//!   /run [--json]  – run a simulated mission with the current config
//!   /map           – draw the maze (with virtual walls from the last run)
//!   /plan X Y      – flood-fill distances from home to cell (X, Y)
//!   /config [init] – show the config, or write the defaults to disk
//!   /quit | /exit  – leave the shell

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::atomic::Ordering;

use rescue_hal::sim::SimRobot;
use rescue_perception::{FloodPlanner, MazeMap};
use rescue_runtime::{MissionController, MissionEventKind, RunOutcome};
use rescue_types::Coordinate;

use crate::Interrupts;
use crate::config::{self, Config};
use crate::render::{render_field, render_map};

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Run { json: bool },
    Map,
    Plan(Coordinate),
    Config { init: bool },
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match (head, rest.as_slice()) {
        ("/help", []) => Command::Help,
        ("/run", []) => Command::Run { json: false },
        ("/run", ["--json"]) => Command::Run { json: true },
        ("/map", []) => Command::Map,
        ("/plan", args) if !args.is_empty() => {
            let cell = config::parse_cell(&args.join(" "))
                .ok_or_else(|| format!("'{}' is not a cell of the 5x4 grid", args.join(" ")))?;
            Command::Plan(cell)
        }
        ("/plan", []) => return Err("usage: /plan X Y".to_string()),
        ("/config", []) => Command::Config { init: false },
        ("/config", ["init"]) => Command::Config { init: true },
        ("/quit" | "/exit", []) => Command::Quit,
        _ => return Err(format!("unknown command '{}'", line.trim())),
    };
    Ok(Some(command))
}

/// State kept between commands.
#[derive(Default)]
struct Session {
    /// The robot's map at the end of the last `/run`.
    last_map: Option<MazeMap>,
}

/// Entry point for the interactive REPL. Returns on `/quit` or end of input.
pub fn run(interrupts: &Interrupts) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut session = Session::default();

    loop {
        print!("{} ", "rescue>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        match parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => {
                println!("{}", "Goodbye.".green());
                break;
            }
            Ok(Some(command)) => dispatch(command, &mut session, interrupts),
            Err(e) => println!(
                "{} {}. Type {} for available commands.",
                "Error:".red(),
                e,
                "/help".bold()
            ),
        }
    }
}

fn dispatch(command: Command, session: &mut Session, interrupts: &Interrupts) {
    let cfg = match config::load_or_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            return;
        }
    };
    match command {
        Command::Help => cmd_help(),
        Command::Run { json } => cmd_run(&cfg, json, session, interrupts),
        Command::Map => cmd_map(&cfg, session),
        Command::Plan(target) => cmd_plan(&cfg, target),
        Command::Config { init } => cmd_config(&cfg, init),
        Command::Quit => {}
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Rescue Commands".bold().underline());
    println!("  {}  – run a simulated mission", "/run [--json]".bold().cyan());
    println!("  {}           – draw the maze", "/map".bold().cyan());
    println!("  {}       – distances from home to a cell", "/plan X Y".bold().cyan());
    println!("  {} – show or initialise ~/.rescue/config.toml", "/config [init]".bold().cyan());
    println!("  {}   – exit the shell", "/quit  /exit".bold().cyan());
    println!();
}

fn cmd_run(cfg: &Config, json: bool, session: &mut Session, interrupts: &Interrupts) {
    let mission_config = cfg.mission_config();
    let world = cfg.simulation.world(cfg.profile.cell_length_mm);
    let robot = SimRobot::new(world, cfg.mission.home);
    let mut mission = match MissionController::new(robot, mission_config) {
        Ok(m) => m,
        Err(e) => {
            println!("{}: {}", "Cannot start mission".red(), e);
            return;
        }
    };

    println!(
        "  Running mission from {} over {} waypoint(s) … (Ctrl-C aborts)",
        cfg.mission.home.to_string().bold(),
        cfg.mission.waypoints.len()
    );
    interrupts.abort.store(false, Ordering::SeqCst);
    interrupts.in_mission.store(true, Ordering::SeqCst);
    let result = mission.run_until(&interrupts.abort);
    interrupts.in_mission.store(false, Ordering::SeqCst);
    interrupts.abort.store(false, Ordering::SeqCst);

    match result {
        Ok(RunOutcome::Completed) => println!("  {} mission complete", "✓".green().bold()),
        Ok(RunOutcome::Aborted) => println!("  {} mission aborted by operator", "⚠".yellow().bold()),
        Err(e) => println!("  {} {}", "✗".red().bold(), e),
    }
    print_summary(&mission);

    if json {
        match mission.report().to_json() {
            Ok(text) => println!("{text}"),
            Err(e) => println!("{}: {}", "Cannot serialise report".red(), e),
        }
    }
    session.last_map = Some(mission.map().clone());
}

fn print_summary(mission: &MissionController<SimRobot>) {
    let report = mission.report();
    let reached: Vec<String> = report.reached().iter().map(|c| c.to_string()).collect();
    let abandoned = report
        .kinds()
        .filter(|k| matches!(k, MissionEventKind::WaypointAbandoned { .. }))
        .count();
    let interrupts = report
        .kinds()
        .filter(|k| matches!(k, MissionEventKind::Interrupted { .. }))
        .count();
    let victims = mission.victims();
    let found: Vec<String> = [victims.first(), victims.second()]
        .into_iter()
        .flatten()
        .map(|c| c.to_string())
        .collect();

    println!("  Mission id     : {}", report.id.to_string().dimmed());
    println!("  Final cell     : {}  ({:?})", mission.cell().to_string().bold(), mission.state());
    println!("  Waypoints hit  : {}", reached.join(" → "));
    println!("  Abandoned      : {abandoned}");
    println!("  Interrupts     : {interrupts}");
    println!("  Virtual walls  : {}", mission.map().virtual_wall_count());
    println!("  Victims        : {}", if found.is_empty() { "none".to_string() } else { found.join(", ") });
    println!("  Sim time       : {:.1} s", mission.robot().ticks() as f64 * 0.02);
}

fn cmd_map(cfg: &Config, session: &Session) {
    let map = session
        .last_map
        .clone()
        .unwrap_or_else(|| MazeMap::new(&cfg.simulation.layout()));
    let home = cfg.mission.home;
    let text = render_map(&map, |cell| {
        if cell == home {
            "H".to_string()
        } else if let Some(i) = cfg.mission.waypoints.iter().position(|w| *w == cell) {
            (i + 1).to_string()
        } else {
            String::new()
        }
    });
    println!("{}", text.cyan());
    println!("  {} home, {} waypoint order, {} virtual wall", "H".bold(), "1..".bold(), "~ :".bold());
}

fn cmd_plan(cfg: &Config, target: Coordinate) {
    let map = MazeMap::new(&cfg.simulation.layout());
    let mut planner = FloodPlanner::new();
    let field = planner.plan(&map, target, cfg.mission.home);
    println!("{}", render_field(&map, field));
    if field.is_reachable(cfg.mission.home) {
        println!(
            "  {} is {} cell(s) from home after {} round(s)",
            target.to_string().bold(),
            field.get(cfg.mission.home).unwrap_or_default(),
            field.rounds()
        );
    } else {
        println!("  {} cannot be reached from home", target.to_string().yellow());
    }
}

fn cmd_config(cfg: &Config, init: bool) {
    let path = config::config_path();
    if init {
        if path.exists() {
            println!("  Config already exists at {}", path.display().to_string().bold());
            return;
        }
        match config::save(cfg) {
            Ok(()) => println!("{} {}", "✓ Config written to".green(), path.display().to_string().bold()),
            Err(e) => println!("{}: {}", "Error saving config".red(), e),
        }
        return;
    }
    println!("  {}", path.display().to_string().dimmed());
    match toml::to_string_pretty(cfg) {
        Ok(text) => println!("{text}"),
        Err(e) => println!("{}: {}", "Cannot render config".red(), e),
    }
}
