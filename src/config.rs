/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use log::{debug, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::sim::level::Tier;
use crate::sim::step::DEFAULT_SUBSTEPS;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub rules: RulesConfig,
    pub display: DisplayConfig,
    pub levels_dir: PathBuf,
    /// `.zep` pack file, if one is configured.
    pub pack: Option<PathBuf>,
    /// Start in endless mode on this tier instead of the campaign.
    pub start_tier: Option<Tier>,
}

#[derive(Clone, Debug)]
pub struct RulesConfig {
    /// Pursuer sub-steps per turn.
    pub pursuer_substeps: u32,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    /// Transpose levels whose long axis doesn't match the terminal's.
    pub fit_to_screen: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    display: TomlDisplay,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_substeps")]
    pursuer_substeps: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default)]
    pack: String,
    #[serde(default)]
    start_tier: String,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_fit")]
    fit_to_screen: bool,
}

// ── Defaults ──

fn default_substeps() -> u32 { DEFAULT_SUBSTEPS }
fn default_levels_dir() -> String { "levels".into() }
fn default_fit() -> bool { true }

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules { pursuer_substeps: default_substeps() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            pack: String::new(),
            start_tier: String::new(),
        }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay { fit_to_screen: default_fit() }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, CWD, XDG data home, system data dir.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse config text directly. Parse errors fall back to defaults.
    pub fn parse(text: &str) -> Self {
        GameConfig::from_toml(parse_toml(text, Path::new("config.toml")), &[])
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let levels_dir = resolve_path(&toml_cfg.general.levels_dir, search_dirs, |p| p.is_dir());

        let pack = if toml_cfg.general.pack.trim().is_empty() {
            None
        } else {
            Some(resolve_path(toml_cfg.general.pack.trim(), search_dirs, |p| p.is_file()))
        };

        let start_tier = match toml_cfg.general.start_tier.trim() {
            "" => None,
            s => match s.parse::<Tier>() {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!("config.toml: {e}; starting the campaign instead");
                    None
                }
            },
        };

        GameConfig {
            rules: RulesConfig { pursuer_substeps: toml_cfg.rules.pursuer_substeps },
            display: DisplayConfig { fit_to_screen: toml_cfg.display.fit_to_screen },
            levels_dir,
            pack,
            start_tier,
        }
    }
}

/// Absolute paths are kept; relative ones are looked up in `search_dirs`
/// and otherwise left relative to the CWD.
fn resolve_path(raw: &str, search_dirs: &[PathBuf], exists: impl Fn(&Path) -> bool) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return path;
    }
    search_dirs.iter()
        .map(|d| d.join(raw))
        .find(|p| exists(p.as_path()))
        .unwrap_or(path)
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/zombie-escape)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/zombie-escape");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/zombie-escape");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    debug!("using {}", path.display());
                    return parse_toml(&text, &path);
                }
                Err(e) => warn!("could not read {}: {e}", path.display()),
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str, path: &Path) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("{} parse error: {e}; using default settings", path.display());
            TomlConfig::default()
        }
    }
}
