/// Level loader with pack support.
///
/// ## Sources (priority order):
///   1. Configured pack file (`.zep` format)
///   2. `levels/` directory (individual `.txt` files)
///   3. Built-in embedded levels
///
/// ## Pack format (`.zep`, Zombie Escape Pack):
///   ```text
///   ## Pack Name
///   ## Author: name
///   ---
///   # First Level
///   @ tier=beginner score=3
///   P..#
///   .Z.E
///   ---
///   # Second Level
///   <rows>
///   ```
///
/// Levels are separated by a line containing only `---`.
/// Pack metadata lines start with `##` and precede the first `---`.
///
/// ## Single-level format (`.txt`):
///   `# Level Name` (hash + space), optional `@ tier=.. score=..`, then rows.
///
/// ## Tile legend:
///   'P' = Agent start      'Z' = Pursuer start
///   '#' = Wall             'E' = Exit
///   '.' = Empty
///
/// Layout rows never contain spaces, so `# ` unambiguously starts a name.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::{debug, info, warn};

use crate::config::GameConfig;
use crate::domain::entity::{Position, Pursuer};
use crate::domain::tile::{Cell, Tile};
use crate::error::LevelFormatError;
use crate::sim::world::GridState;

// ══════════════════════════════════════════════════════════════
// Layout parsing
// ══════════════════════════════════════════════════════════════

/// Parse a rectangular character grid into a fresh `GridState`.
///
/// Rows are scanned row-major (y outer, x inner). Pursuer ids are handed out
/// in scan order starting at 0. If several `P` or `E` markers appear, the
/// last one in scan order wins.
pub fn load_level<S: AsRef<str>>(rows: &[S]) -> Result<GridState, LevelFormatError> {
    let height = rows.len();
    let width = rows.first().map_or(0, |r| r.as_ref().chars().count());
    if height == 0 || width == 0 {
        return Err(LevelFormatError::Empty);
    }

    let mut tiles = vec![vec![Tile::Floor; width]; height];
    let mut agent: Option<Position> = None;
    let mut exit: Option<Position> = None;
    let mut pursuers = Vec::new();

    for (y, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        let found = row.chars().count();
        if found != width {
            return Err(LevelFormatError::RaggedRow { row: y, expected: width, found });
        }
        for (x, ch) in row.chars().enumerate() {
            let pos = Position::new(x, y);
            match Cell::from_char(ch) {
                Some(Cell::Agent) => {
                    if let Some(prev) = agent.replace(pos) {
                        debug!("agent start {} overridden by {}", prev, pos);
                    }
                }
                Some(Cell::Pursuer) => pursuers.push(Pursuer::new(pursuers.len(), x, y)),
                Some(Cell::Wall) => tiles[y][x] = Tile::Wall,
                Some(Cell::Exit) => {
                    if let Some(prev) = exit.replace(pos) {
                        debug!("exit {} overridden by {}", prev, pos);
                    }
                }
                Some(Cell::Empty) => {}
                None => return Err(LevelFormatError::UnknownTile { x, y, ch }),
            }
        }
    }

    let agent = agent.ok_or(LevelFormatError::MissingAgent)?;
    let exit = exit.ok_or(LevelFormatError::MissingExit)?;

    debug!(
        "loaded {}x{} level: agent {}, exit {}, {} pursuer(s)",
        width, height, agent, exit, pursuers.len()
    );
    Ok(GridState::new(tiles, agent, exit, pursuers))
}

/// Swap rows and columns. Ragged input is truncated to the first row's width.
pub fn transpose_layout<S: AsRef<str>>(rows: &[S]) -> Vec<String> {
    let grid: Vec<Vec<char>> = rows.iter().map(|r| r.as_ref().chars().collect()).collect();
    let cols = grid.first().map_or(0, |r| r.len());
    (0..cols)
        .map(|x| grid.iter().filter_map(|row| row.get(x)).collect())
        .collect()
}

/// Put the grid's long axis along the screen's long axis. Square grids are
/// returned as-is.
pub fn fit_layout<S: AsRef<str>>(rows: &[S], screen_wide: bool) -> Vec<String> {
    let height = rows.len();
    let width = rows.first().map_or(0, |r| r.as_ref().chars().count());
    if width != height && (width > height) != screen_wide {
        transpose_layout(rows)
    } else {
        rows.iter().map(|r| r.as_ref().to_string()).collect()
    }
}

// ══════════════════════════════════════════════════════════════
// Tiers, level definitions, catalog
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub enum Tier {
    Beginner,
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Tier {
    pub const ALL: [Tier; 5] = [Tier::Beginner, Tier::Easy, Tier::Medium, Tier::Hard, Tier::Expert];

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Beginner => "beginner",
            Tier::Easy => "easy",
            Tier::Medium => "medium",
            Tier::Hard => "hard",
            Tier::Expert => "expert",
        }
    }

    /// Next tier, wrapping from expert back to beginner.
    pub fn cycle(self) -> Tier {
        let i = Tier::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Tier::ALL[(i + 1) % Tier::ALL.len()]
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown tier {s:?}"))
    }
}

/// Runtime level data (owned strings, loaded from file or embedded).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDef {
    pub name: String,
    pub tier: Tier,
    pub score: u32,
    pub rows: Vec<String>,
}

/// Ordered level list: tier order, then score ascending.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub name: String,
    pub author: String,
    levels: Vec<LevelDef>,
}

impl Catalog {
    pub fn new(name: impl Into<String>, author: impl Into<String>, mut levels: Vec<LevelDef>) -> Self {
        levels.sort_by_key(|l| (l.tier, l.score));
        Catalog { name: name.into(), author: author.into(), levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// 0-based.
    pub fn get(&self, idx: usize) -> Option<&LevelDef> {
        self.levels.get(idx)
    }

    pub fn levels(&self) -> &[LevelDef] {
        &self.levels
    }

    /// Catalog indices of every level in `tier`, in catalog order.
    pub fn tier_indices(&self, tier: Tier) -> Vec<usize> {
        self.levels
            .iter()
            .enumerate()
            .filter(|(_, l)| l.tier == tier)
            .map(|(i, _)| i)
            .collect()
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Build the catalog from the configured sources, falling back in order.
pub fn load_catalog(config: &GameConfig) -> Catalog {
    if let Some(path) = &config.pack {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let catalog = parse_pack(&content, path);
                if !catalog.is_empty() {
                    info!("loaded {} level(s) from pack {}", catalog.len(), path.display());
                    return catalog;
                }
                warn!("pack {} has no playable levels", path.display());
            }
            Err(e) => warn!("could not read pack {}: {e}", path.display()),
        }
    }

    let dir = &config.levels_dir;
    if dir.is_dir() {
        let mut files = load_from_directory(dir);
        if !files.is_empty() {
            files.sort_by(|a, b| a.0.cmp(&b.0));
            let dir_name = dir.file_name().unwrap_or_default().to_string_lossy().to_string();
            info!("loaded {} level(s) from {}/", files.len(), dir_name);
            return Catalog::new(
                format!("{}/  (individual files)", dir_name),
                String::new(),
                files.into_iter().map(|(_, def)| def).collect(),
            );
        }
    }

    Catalog::new("Built-in Levels", "Zombie Escape", embedded_levels())
}

// ══════════════════════════════════════════════════════════════
// Pack parsing
// ══════════════════════════════════════════════════════════════

/// Parse a `.zep` pack: metadata header, then `---`-separated levels.
pub fn parse_pack(content: &str, path: &Path) -> Catalog {
    let mut name = String::new();
    let mut author = String::new();
    let mut levels = vec![];
    let mut section = String::new();
    let mut in_levels = false;

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed == "---" {
            if in_levels {
                levels.extend(parse_level_file(&section));
            }
            section.clear();
            in_levels = true;
            continue;
        }

        if !in_levels {
            if let Some(rest) = trimmed.strip_prefix("## Author:") {
                author = rest.trim().to_string();
            } else if let Some(rest) = trimmed.strip_prefix("##") {
                if name.is_empty() {
                    name = rest.trim().to_string();
                }
            }
            continue;
        }

        section.push_str(line);
        section.push('\n');
    }

    if in_levels {
        levels.extend(parse_level_file(&section));
    }

    if name.is_empty() {
        name = path.file_stem().unwrap_or_default().to_string_lossy().to_string();
    }

    Catalog::new(name, author, levels)
}

// ══════════════════════════════════════════════════════════════
// Single-level parsing
// ══════════════════════════════════════════════════════════════

/// Parse one level. Returns `None` (with a warning) for blank sections,
/// unknown tiers, and layouts `load_level` rejects.
pub fn parse_level_file(content: &str) -> Option<LevelDef> {
    let mut name = String::new();
    let mut tier = Tier::Beginner;
    let mut score = 0;
    let mut rows = vec![];

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("# ") {
            if name.is_empty() {
                name = rest.trim().to_string();
            }
        } else if let Some(rest) = trimmed.strip_prefix("@ ") {
            for pair in rest.split_whitespace() {
                match pair.split_once('=') {
                    Some(("tier", v)) => match v.parse::<Tier>() {
                        Ok(t) => tier = t,
                        Err(e) => {
                            warn!("skipping level {name:?}: {e}");
                            return None;
                        }
                    },
                    Some(("score", v)) => match v.parse::<u32>() {
                        Ok(s) => score = s,
                        Err(_) => warn!("level {name:?}: ignoring bad score {v:?}"),
                    },
                    _ => debug!("level {name:?}: ignoring metadata {pair:?}"),
                }
            }
        } else {
            rows.push(trimmed.to_string());
        }
    }

    if rows.is_empty() {
        return None;
    }
    if name.is_empty() {
        name = "Unnamed Level".to_string();
    }
    if let Err(e) = load_level(&rows) {
        warn!("skipping level {name:?}: {e}");
        return None;
    }

    Some(LevelDef { name, tier, score, rows })
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .txt files)
// ══════════════════════════════════════════════════════════════

fn load_from_directory(dir: &Path) -> Vec<(String, LevelDef)> {
    let mut results = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!("could not list {}: {e}", dir.display());
            return results;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(false, |e| e == "txt") {
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    if let Some(def) = parse_level_file(&content) {
                        let filename = path.file_name().unwrap_or_default().to_string_lossy().to_string();
                        results.push((filename, def));
                    }
                }
                Err(e) => warn!("could not read {}: {e}", path.display()),
            }
        }
    }

    results
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("First Steps", Tier::Beginner, 1, &[
            "P...#....",
            ".##.#.##.",
            ".#.....#.",
            "...#Z#...",
            ".#.....#.",
            ".##.#.##.",
            "....#...E",
        ]),
        make_embedded("Corridor", Tier::Beginner, 2, &[
            "P.........",
            "#########.",
            "Z.........",
            ".########.",
            ".........E",
        ]),
        make_embedded("Pillars", Tier::Easy, 5, &[
            "P.....#...",
            ".#.#..#.#.",
            "......Z...",
            ".#.#....#.",
            "...#..#..E",
        ]),
        make_embedded("Two Shadows", Tier::Easy, 8, &[
            "Z.......Z",
            ".#.###.#.",
            ".#.....#.",
            "...#P#...",
            ".#.....#.",
            ".#.###.#.",
            "....E....",
        ]),
        make_embedded("Cages", Tier::Medium, 12, &[
            "P..#.....#",
            ".#.#.###.#",
            ".#...#Z#..",
            ".###.#.#.#",
            ".....#...E",
        ]),
        make_embedded("Crossfire", Tier::Medium, 15, &[
            "....Z....",
            ".#.###.#.",
            ".#.....#.",
            "Z..#P#..Z",
            ".#.....#.",
            ".#.###.#.",
            "....E....",
        ]),
        make_embedded("Horde", Tier::Hard, 20, &[
            "Z...#...Z",
            ".##.#.##.",
            ".........",
            "##.#P#.##",
            ".........",
            ".##.#.##.",
            "Z...E...Z",
        ]),
        make_embedded("Labyrinth", Tier::Expert, 30, &[
            "P.#.....#.Z",
            ".##.###.#.#",
            "....#Z#....",
            "#.#.#.#.##.",
            "..#...#...E",
            ".####.###.#",
            "Z.........Z",
        ]),
    ]
}

fn make_embedded(name: &str, tier: Tier, score: u32, rows: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        tier,
        score,
        rows: rows.iter().map(|s| s.to_string()).collect(),
    }
}
