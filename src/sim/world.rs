/// GridState: the authoritative model of one level attempt.
///
/// ## Layers
///
///   - `tiles`   : static terrain (walls). **Never mutated** after load.
///   - entities  : agent position, pursuers (id order), exit.
///   - meta      : `turn` and `status`.
///
/// Only the loader constructs a `GridState`, and only the turn resolver
/// mutates one. Everything else goes through the read-only accessors below.
/// Once `status` is terminal the resolver refuses every further mutation.
///
/// ## Display precedence
///
/// `cell_at` / `display_grid` label each position with the first entity
/// present in `CELL_PRECEDENCE`: agent > pursuer > wall > exit > empty.

use crate::domain::entity::{Position, Pursuer, Status};
use crate::domain::rules::{self, MapView};
use crate::domain::tile::{Cell, Tile};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridState {
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) tiles: Vec<Vec<Tile>>,
    pub(crate) agent: Position,
    pub(crate) exit: Position,
    pub(crate) pursuers: Vec<Pursuer>,
    pub(crate) turn: u64,
    pub(crate) status: Status,
}

/// Owned, read-only copy of a `GridState` handed to collaborators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    pub turn: u64,
    pub status: Status,
    pub agent: Position,
    pub exit: Position,
    pub pursuers: Vec<Pursuer>,
    pub walls: Vec<Position>,
}

// ── Construction ──

impl GridState {
    /// Fresh state: turn 0, in progress. Pursuers must already be in id order.
    pub(crate) fn new(
        tiles: Vec<Vec<Tile>>,
        agent: Position,
        exit: Position,
        pursuers: Vec<Pursuer>,
    ) -> Self {
        let height = tiles.len();
        let width = tiles.first().map_or(0, |r| r.len());
        debug_assert!(pursuers.windows(2).all(|w| w[0].id < w[1].id));
        GridState {
            width,
            height,
            tiles,
            agent,
            exit,
            pursuers,
            turn: 0,
            status: Status::InProgress,
        }
    }
}

// ── Read-only accessors ──

impl GridState {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn agent(&self) -> Position {
        self.agent
    }

    pub fn exit(&self) -> Position {
        self.exit
    }

    pub fn pursuers(&self) -> &[Pursuer] {
        &self.pursuers
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Out of bounds reads as wall.
    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        self.map().is_wall(Position::new(x, y))
    }

    pub fn walls(&self) -> impl Iterator<Item = Position> + '_ {
        self.tiles.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, t)| !t.is_passable())
                .map(move |(x, _)| Position::new(x, y))
        })
    }

    pub fn pursuer_at(&self, pos: Position) -> Option<&Pursuer> {
        self.pursuers.iter().find(|z| z.pos == pos)
    }

    /// Does any pursuer share the agent's cell?
    pub fn agent_caught(&self) -> bool {
        self.pursuer_at(self.agent).is_some()
    }

    pub fn map(&self) -> MapView<'_> {
        MapView { tiles: &self.tiles, width: self.width, height: self.height }
    }

    pub fn is_valid_agent_move(&self, target: Option<Position>) -> bool {
        rules::is_valid_agent_move(&self.map(), target)
    }

    pub fn can_pursuer_enter(&self, target: Option<Position>, moving_id: usize) -> bool {
        rules::can_pursuer_enter(&self.map(), &self.pursuers, target, moving_id)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.width,
            height: self.height,
            turn: self.turn,
            status: self.status,
            agent: self.agent,
            exit: self.exit,
            pursuers: self.pursuers.clone(),
            walls: self.walls().collect(),
        }
    }
}

// ── Serializer ──

impl GridState {
    /// Display label at (x, y). Out of bounds is `None`.
    pub fn cell_at(&self, x: usize, y: usize) -> Option<Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let pos = Position::new(x, y);
        Some(Cell::resolve(|c| match c {
            Cell::Agent => self.agent == pos,
            Cell::Pursuer => self.pursuer_at(pos).is_some(),
            Cell::Wall => self.tiles[y][x] == Tile::Wall,
            Cell::Exit => self.exit == pos,
            Cell::Empty => true,
        }))
    }

    /// Row-major grid of display labels.
    pub fn display_grid(&self) -> Vec<Vec<Cell>> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.cell_at(x, y).unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect()
    }

    /// Display grid in the level-layout character set.
    pub fn to_rows(&self) -> Vec<String> {
        self.display_grid()
            .iter()
            .map(|row| row.iter().map(|c| c.to_char()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::load_level;

    #[test]
    fn serializer_matches_loaded_layout() {
        let rows = ["P.#", ".Z#", "..E"];
        let s = load_level(&rows).unwrap();
        assert_eq!(s.to_rows(), vec!["P.#", ".Z#", "..E"]);
    }

    #[test]
    fn agent_label_wins_over_pursuer() {
        let mut s = load_level(&["PZE"]).unwrap();
        s.agent = Position::new(1, 0);
        assert_eq!(s.cell_at(1, 0), Some(Cell::Agent));
        assert_eq!(s.to_rows(), vec![".PE"]);
    }

    #[test]
    fn pursuer_label_wins_over_exit() {
        let mut s = load_level(&["P.ZE"]).unwrap();
        s.pursuers[0].pos = Position::new(3, 0);
        assert_eq!(s.cell_at(3, 0), Some(Cell::Pursuer));
    }

    #[test]
    fn cell_at_out_of_bounds_is_none() {
        let s = load_level(&["PE"]).unwrap();
        assert_eq!(s.cell_at(2, 0), None);
        assert_eq!(s.cell_at(0, 1), None);
    }

    #[test]
    fn wall_queries() {
        let s = load_level(&["P#", "#E"]).unwrap();
        assert!(s.is_wall(1, 0));
        assert!(s.is_wall(0, 1));
        assert!(!s.is_wall(0, 0));
        assert!(s.is_wall(5, 5));
        let walls: Vec<_> = s.walls().collect();
        assert_eq!(walls, vec![Position::new(1, 0), Position::new(0, 1)]);
    }

    #[test]
    fn snapshot_is_a_detached_copy() {
        let s = load_level(&["P.Z", "#.E"]).unwrap();
        let snap = s.snapshot();
        assert_eq!(snap.width, 3);
        assert_eq!(snap.height, 2);
        assert_eq!(snap.turn, 0);
        assert_eq!(snap.status, Status::InProgress);
        assert_eq!(snap.agent, Position::new(0, 0));
        assert_eq!(snap.exit, Position::new(2, 1));
        assert_eq!(snap.pursuers, vec![Pursuer::new(0, 2, 0)]);
        assert_eq!(snap.walls, vec![Position::new(0, 1)]);
    }
}
