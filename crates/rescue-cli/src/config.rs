//! Configuration vault – reads/writes `~/.rescue/config.toml`.

use rescue_hal::sim::SimWorld;
use rescue_perception::{ARENA_LAYOUT, MazeLayout, WallSpec};
use rescue_runtime::sim::world_from_layout;
use rescue_runtime::{MissionConfig, MissionPlan, MotionProfile};
use rescue_types::{Compass, Coordinate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The simulated arena the `/run` command drives through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Start from the perimeter-walled arena instead of an open grid.
    pub perimeter: bool,
    /// Extra walls known to the robot's map and present in the arena.
    pub walls: Vec<WallSpec>,
    /// Walls present in the arena but missing from the robot's map.
    pub obstacles: Vec<WallSpec>,
    /// Hidden virtual-wall beams.
    pub beams: Vec<WallSpec>,
    pub victims: Vec<Coordinate>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            perimeter: true,
            walls: Vec::new(),
            obstacles: Vec::new(),
            beams: vec![WallSpec { cell: Coordinate::at(2, 1), side: Compass::East }],
            victims: vec![Coordinate::at(3, 3), Coordinate::at(0, 0)],
        }
    }
}

impl SimulationConfig {
    /// The layout the robot starts with.
    pub fn layout(&self) -> MazeLayout {
        let base = if self.perimeter { ARENA_LAYOUT } else { MazeLayout::open() };
        self.walls
            .iter()
            .fold(base, |layout, w| layout.with_wall(w.cell, w.side))
    }

    /// The hidden world: the mapped layout plus obstacles, beams and victims.
    pub fn world(&self, cell_length_mm: u16) -> SimWorld {
        let world = world_from_layout(&self.layout(), cell_length_mm);
        let world = self
            .obstacles
            .iter()
            .fold(world, |world, w| world.with_wall(w.cell, w.side));
        let world = self
            .beams
            .iter()
            .fold(world, |world, b| world.with_beam(b.cell, b.side));
        self.victims
            .iter()
            .fold(world, |world, v| world.with_victim(*v))
    }
}

/// Persisted user configuration stored in `~/.rescue/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub profile: MotionProfile,
    #[serde(default)]
    pub mission: MissionPlan,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Config {
    pub fn mission_config(&self) -> MissionConfig {
        MissionConfig {
            plan: self.mission.clone(),
            profile: self.profile.clone(),
            layout: self.simulation.layout(),
        }
    }
}

/// Return the path to `~/.rescue/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".rescue").join("config.toml")
}

/// Load the config from disk. Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    let mut cfg = read_from(path)?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

/// Parse the file at `path` without environment overrides.
fn read_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    toml::from_str(&raw)
        .map(Some)
        .map_err(|e| format!("Failed to parse config: {}", e))
}

/// Load the config, falling back to defaults (with env overrides) when the
/// file is missing.
pub fn load_or_default() -> Result<Config, String> {
    match load()? {
        Some(cfg) => Ok(cfg),
        None => {
            let mut cfg = Config::default();
            apply_env_overrides(&mut cfg);
            Ok(cfg)
        }
    }
}

/// Apply `RESCUE_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `RESCUE_CELL_LENGTH_MM` | `profile.cell_length_mm` |
/// | `RESCUE_CRUISE_SPEED` | `profile.cruise_speed` |
/// | `RESCUE_HOME` | `mission.home`, written `x,y` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("RESCUE_CELL_LENGTH_MM")
        && let Ok(mm) = v.trim().parse::<u16>()
    {
        cfg.profile.cell_length_mm = mm;
    }
    if let Ok(v) = std::env::var("RESCUE_CRUISE_SPEED")
        && let Ok(speed) = v.trim().parse::<i16>()
    {
        cfg.profile.cruise_speed = speed;
    }
    if let Ok(v) = std::env::var("RESCUE_HOME")
        && let Some(home) = parse_cell(&v)
    {
        cfg.mission.home = home;
    }
}

/// Parse `"x,y"` (or `"x y"`) into an in-grid cell.
pub fn parse_cell(text: &str) -> Option<Coordinate> {
    let mut parts = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    let x = parts.next()?.parse::<u8>().ok()?;
    let y = parts.next()?.parse::<u8>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Coordinate::new(x, y).ok()
}

/// Save the config to disk, creating `~/.rescue/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
