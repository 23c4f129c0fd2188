/// Session: one player's run through a catalog.
///
/// Owns exactly one `GridState` plus what is needed to replace it: the
/// layout it came from (for restarts), the catalog cursor, and the endless
/// mode tier cursors. A session is a plain value; several can live side by
/// side with nothing shared between them.
///
/// ## Modes
///   - **Campaign**: catalog order, level numbers are 1-based.
///   - **Endless** : one tier, round-robin through its levels.
///   - **Custom**  : an ad-hoc layout with no successor.

use std::collections::HashMap;

use log::{info, warn};

use crate::domain::entity::{Direction, Status};
use crate::error::LevelFormatError;
use super::level::{fit_layout, load_level, Catalog, Tier};
use super::step::{self, MoveResult};
use super::world::GridState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Campaign,
    Endless(Tier),
    Custom,
}

/// What `advance` did.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Advance {
    /// A new level is loaded.
    Next,
    /// Nothing left to play in this mode.
    Completed,
    /// The current level has not been escaped yet.
    NotEscaped,
}

#[derive(Clone, Debug)]
pub struct Session {
    catalog: Catalog,
    substeps: u32,
    state: GridState,
    /// Rows as authored, before any screen fitting.
    source: Vec<String>,
    /// Rows actually loaded; `restart` reloads these.
    layout: Vec<String>,
    level_idx: Option<usize>,
    mode: Mode,
    tier_cursor: HashMap<Tier, usize>,
    /// `Some(screen_is_wide)` when layouts should be fitted to the screen.
    fit: Option<bool>,
}

// ── Construction ──

impl Session {
    /// Start the campaign at level 1.
    pub fn new(catalog: Catalog, substeps: u32) -> Result<Self, LevelFormatError> {
        let def = catalog.get(0).ok_or(LevelFormatError::NoLevels)?;
        let layout = def.rows.clone();
        let state = load_level(&layout)?;
        info!("level 1: {}", def.name);
        Ok(Session {
            catalog,
            substeps,
            state,
            source: layout.clone(),
            layout,
            level_idx: Some(0),
            mode: Mode::Campaign,
            tier_cursor: HashMap::new(),
            fit: None,
        })
    }

    /// Fit layouts to a wide (`true`) or tall screen. The current level is
    /// reloaded from its authored rows under the new setting.
    pub fn set_fit(&mut self, fit: Option<bool>) -> Result<(), LevelFormatError> {
        self.fit = fit;
        let source = std::mem::take(&mut self.source);
        let result = self.install(&source);
        if result.is_err() {
            self.source = source;
        }
        result
    }
}

// ── Level selection ──

impl Session {
    /// Campaign level by 1-based number. Numbers outside the catalog wrap
    /// back to level 1.
    pub fn start_level(&mut self, number: usize) -> Result<(), LevelFormatError> {
        let idx = if number == 0 || number > self.catalog.len() {
            0
        } else {
            number - 1
        };
        self.load_catalog_level(idx)?;
        self.mode = Mode::Campaign;
        Ok(())
    }

    /// Play an arbitrary layout with no successor.
    pub fn start_from_layout<S: AsRef<str>>(&mut self, rows: &[S]) -> Result<(), LevelFormatError> {
        self.install(rows)?;
        self.level_idx = None;
        self.mode = Mode::Custom;
        Ok(())
    }

    /// Endless mode: next level of `tier`, round-robin. `Ok(false)` when the
    /// catalog has no level in that tier; the current level is kept.
    pub fn start_tier(&mut self, tier: Tier) -> Result<bool, LevelFormatError> {
        let indices = self.catalog.tier_indices(tier);
        if indices.is_empty() {
            warn!("no levels available for tier {tier}");
            return Ok(false);
        }
        let cursor = self.tier_cursor.entry(tier).or_insert(0);
        let idx = indices[*cursor % indices.len()];
        *cursor += 1;
        self.load_catalog_level(idx)?;
        self.mode = Mode::Endless(tier);
        Ok(true)
    }

    /// Reload the current layout from scratch.
    pub fn restart(&mut self) -> Result<(), LevelFormatError> {
        self.state = load_level(&self.layout)?;
        Ok(())
    }

    /// Move on after an escape.
    pub fn advance(&mut self) -> Result<Advance, LevelFormatError> {
        if self.state.status() != Status::Escaped {
            return Ok(Advance::NotEscaped);
        }
        match self.mode {
            Mode::Campaign => {
                let next = self.level_idx.map_or(0, |i| i + 1);
                if next >= self.catalog.len() {
                    info!("campaign complete");
                    return Ok(Advance::Completed);
                }
                self.load_catalog_level(next)?;
                Ok(Advance::Next)
            }
            Mode::Endless(tier) => {
                if self.start_tier(tier)? {
                    Ok(Advance::Next)
                } else {
                    Ok(Advance::Completed)
                }
            }
            Mode::Custom => Ok(Advance::Completed),
        }
    }

    fn load_catalog_level(&mut self, idx: usize) -> Result<(), LevelFormatError> {
        let def = self.catalog.get(idx).ok_or(LevelFormatError::NoLevels)?;
        let rows = def.rows.clone();
        let name = def.name.clone();
        self.install(&rows)?;
        self.level_idx = Some(idx);
        info!("level {}: {}", idx + 1, name);
        Ok(())
    }

    /// Load (and optionally fit) a layout; the session is untouched on error.
    fn install<S: AsRef<str>>(&mut self, rows: &[S]) -> Result<(), LevelFormatError> {
        let layout = match self.fit {
            Some(wide) => fit_layout(rows, wide),
            None => rows.iter().map(|r| r.as_ref().to_string()).collect(),
        };
        self.state = load_level(&layout)?;
        self.source = rows.iter().map(|r| r.as_ref().to_string()).collect();
        self.layout = layout;
        Ok(())
    }
}

// ── Play ──

impl Session {
    pub fn move_player(&mut self, dir: Direction) -> MoveResult {
        step::move_dir(&mut self.state, dir, self.substeps)
    }
}

// ── Read-only accessors ──

impl Session {
    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn substeps(&self) -> u32 {
        self.substeps
    }

    /// 1-based catalog number; `None` for custom layouts.
    pub fn level_number(&self) -> Option<usize> {
        self.level_idx.map(|i| i + 1)
    }

    pub fn level_name(&self) -> &str {
        self.level_idx
            .and_then(|i| self.catalog.get(i))
            .map_or("Custom Level", |d| d.name.as_str())
    }

    pub fn tier(&self) -> Option<Tier> {
        self.level_idx.and_then(|i| self.catalog.get(i)).map(|d| d.tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Position;
    use crate::sim::level::LevelDef;

    fn def(name: &str, tier: Tier, score: u32, rows: &[&str]) -> LevelDef {
        LevelDef {
            name: name.to_string(),
            tier,
            score,
            rows: rows.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new("test", "", vec![
            def("one", Tier::Beginner, 1, &["PE"]),
            def("two", Tier::Beginner, 2, &["P.E"]),
            def("three", Tier::Easy, 1, &["PZ.E"]),
            def("four", Tier::Easy, 2, &["EP"]),
        ])
    }

    #[test]
    fn new_starts_campaign_at_level_one() {
        let s = Session::new(catalog(), 2).unwrap();
        assert_eq!(s.level_number(), Some(1));
        assert_eq!(s.level_name(), "one");
        assert_eq!(s.mode(), Mode::Campaign);
        assert_eq!(s.state().turn(), 0);
    }

    #[test]
    fn empty_catalog_is_an_error() {
        let err = Session::new(Catalog::new("none", "", vec![]), 2).unwrap_err();
        assert_eq!(err, LevelFormatError::NoLevels);
    }

    #[test]
    fn level_number_past_end_wraps_to_one() {
        let mut s = Session::new(catalog(), 2).unwrap();
        s.start_level(3).unwrap();
        assert_eq!(s.level_name(), "three");
        s.start_level(99).unwrap();
        assert_eq!(s.level_number(), Some(1));
    }

    #[test]
    fn advance_requires_escape() {
        let mut s = Session::new(catalog(), 2).unwrap();
        assert_eq!(s.advance().unwrap(), Advance::NotEscaped);
        assert_eq!(s.move_player(Direction::Right).status, Status::Escaped);
        assert_eq!(s.advance().unwrap(), Advance::Next);
        assert_eq!(s.level_name(), "two");
        assert_eq!(s.state().status(), Status::InProgress);
    }

    #[test]
    fn campaign_ends_after_last_level() {
        let mut s = Session::new(catalog(), 2).unwrap();
        s.start_level(4).unwrap();
        s.move_player(Direction::Left);
        assert_eq!(s.advance().unwrap(), Advance::Completed);
        assert_eq!(s.level_number(), Some(4));
    }

    #[test]
    fn restart_resets_turn_and_status() {
        let mut s = Session::new(catalog(), 2).unwrap();
        s.start_level(3).unwrap();
        assert_eq!(s.move_player(Direction::Right).status, Status::Caught);
        s.restart().unwrap();
        assert_eq!(s.state().status(), Status::InProgress);
        assert_eq!(s.state().turn(), 0);
        assert_eq!(s.state().agent(), Position::new(0, 0));
    }

    #[test]
    fn endless_mode_round_robins_tier() {
        let mut s = Session::new(catalog(), 2).unwrap();
        assert!(s.start_tier(Tier::Easy).unwrap());
        assert_eq!(s.level_name(), "three");
        assert_eq!(s.mode(), Mode::Endless(Tier::Easy));
        s.restart().unwrap();
        assert!(s.start_tier(Tier::Easy).unwrap());
        assert_eq!(s.level_name(), "four");
        s.move_player(Direction::Left);
        assert_eq!(s.advance().unwrap(), Advance::Next);
        assert_eq!(s.level_name(), "three");
    }

    #[test]
    fn empty_tier_keeps_current_level() {
        let mut s = Session::new(catalog(), 2).unwrap();
        assert!(!s.start_tier(Tier::Expert).unwrap());
        assert_eq!(s.level_name(), "one");
        assert_eq!(s.mode(), Mode::Campaign);
    }

    #[test]
    fn custom_layout_has_no_successor() {
        let mut s = Session::new(catalog(), 2).unwrap();
        s.start_from_layout(&["P.E"]).unwrap();
        assert_eq!(s.level_number(), None);
        assert_eq!(s.level_name(), "Custom Level");
        s.move_player(Direction::Right);
        s.move_player(Direction::Right);
        assert_eq!(s.advance().unwrap(), Advance::Completed);
    }

    #[test]
    fn bad_custom_layout_leaves_session_untouched() {
        let mut s = Session::new(catalog(), 2).unwrap();
        assert_eq!(s.start_from_layout(&["P.."]), Err(LevelFormatError::MissingExit));
        assert_eq!(s.level_name(), "one");
        assert_eq!(s.mode(), Mode::Campaign);
    }

    #[test]
    fn fitted_layout_survives_restart() {
        let mut s = Session::new(catalog(), 2).unwrap();
        s.set_fit(Some(false)).unwrap();
        s.start_from_layout(&["P.E"]).unwrap();
        assert_eq!(s.state().dimensions(), (1, 3));
        s.restart().unwrap();
        assert_eq!(s.state().dimensions(), (1, 3));
        assert_eq!(s.state().exit(), Position::new(0, 2));
    }

    #[test]
    fn fit_applies_to_the_level_already_loaded() {
        let cat = Catalog::new("fit", "", vec![
            def("short", Tier::Beginner, 1, &["P.E"]),
            def("long", Tier::Beginner, 2, &["P..E"]),
        ]);
        let mut s = Session::new(cat, 2).unwrap();
        assert_eq!(s.state().dimensions(), (3, 1));

        s.set_fit(Some(false)).unwrap();
        assert_eq!(s.state().dimensions(), (1, 3));
        s.restart().unwrap();
        assert_eq!(s.state().dimensions(), (1, 3));
        assert_eq!(s.state().exit(), Position::new(0, 2));

        s.move_player(Direction::Down);
        s.move_player(Direction::Down);
        assert_eq!(s.advance().unwrap(), Advance::Next);
        assert_eq!(s.state().dimensions(), (1, 4));
    }

    #[test]
    fn clearing_fit_restores_authored_orientation() {
        let mut s = Session::new(catalog(), 2).unwrap();
        s.start_level(2).unwrap();
        s.set_fit(Some(false)).unwrap();
        assert_eq!(s.state().dimensions(), (1, 3));
        s.set_fit(None).unwrap();
        assert_eq!(s.state().dimensions(), (3, 1));
        assert_eq!(s.level_name(), "two");
    }

    #[test]
    fn sessions_are_independent() {
        let mut a = Session::new(catalog(), 2).unwrap();
        let b = a.clone();
        a.move_player(Direction::Right);
        assert_eq!(a.state().status(), Status::Escaped);
        assert_eq!(b.state().status(), Status::InProgress);
        assert_eq!(b.state().turn(), 0);
    }
}
