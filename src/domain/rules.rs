/// Movement rules: pure legality checks, no side effects.
///
/// ## Movement Truth Table
///
/// ### Controllable agent
/// ┌──────────────────────────┬─────────┬──────────────────────────┐
/// │ Condition                 │ Allow?  │ Notes                    │
/// ├──────────────────────────┼─────────┼──────────────────────────┤
/// │ Dest out of bounds        │ DENY    │ map edge                 │
/// │ Dest is wall              │ DENY    │                          │
/// │ Dest holds a pursuer      │ ALLOW   │ resolves to capture      │
/// │ Otherwise                 │ ALLOW   │                          │
/// └──────────────────────────┴─────────┴──────────────────────────┘
///
/// ### Pursuer
/// ┌──────────────────────────┬─────────┬──────────────────────────┐
/// │ Condition                 │ Allow?  │ Notes                    │
/// ├──────────────────────────┼─────────┼──────────────────────────┤
/// │ Dest out of bounds        │ DENY    │                          │
/// │ Dest is wall              │ DENY    │                          │
/// │ Dest holds OTHER pursuer  │ DENY    │ never stack              │
/// │ Dest holds the agent      │ ALLOW   │ capture by pursuit       │
/// │ Otherwise                 │ ALLOW   │                          │
/// └──────────────────────────┴─────────┴──────────────────────────┘
///
/// Pursuer occupancy is read from the live pursuer slice, so a pursuer that
/// already moved this sub-step blocks the cell it moved into.

use super::entity::{Position, Pursuer};
use super::tile::Tile;

/// Immutable view of the terrain for rule queries.
pub struct MapView<'a> {
    pub tiles: &'a [Vec<Tile>],
    pub width: usize,
    pub height: usize,
}

impl<'a> MapView<'a> {
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Out of bounds reads as wall.
    pub fn tile_at(&self, pos: Position) -> Tile {
        if self.in_bounds(pos) {
            self.tiles[pos.y][pos.x]
        } else {
            Tile::Wall
        }
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        !self.tile_at(pos).is_passable()
    }
}

/// In bounds and not a wall. Pursuer occupancy does not block the agent.
pub fn is_valid_agent_move(map: &MapView, target: Option<Position>) -> bool {
    match target {
        Some(pos) => map.in_bounds(pos) && !map.is_wall(pos),
        None => false,
    }
}

/// In bounds, not a wall, and not held by any pursuer other than `moving_id`.
pub fn can_pursuer_enter(
    map: &MapView,
    pursuers: &[Pursuer],
    target: Option<Position>,
    moving_id: usize,
) -> bool {
    let pos = match target {
        Some(p) => p,
        None => return false,
    };
    if !map.in_bounds(pos) || map.is_wall(pos) {
        return false;
    }
    !pursuers.iter().any(|z| z.id != moving_id && z.pos == pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiles_from(rows: &[&str]) -> (Vec<Vec<Tile>>, usize, usize) {
        let h = rows.len();
        let w = rows[0].len();
        let mut t = vec![vec![Tile::Floor; w]; h];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    t[y][x] = Tile::Wall;
                }
            }
        }
        (t, w, h)
    }

    fn at(x: usize, y: usize) -> Option<Position> {
        Some(Position::new(x, y))
    }

    #[test]
    fn agent_blocked_by_wall() {
        let (t, width, height) = tiles_from(&[".#"]);
        let map = MapView { tiles: &t, width, height };
        assert!(!is_valid_agent_move(&map, at(1, 0)));
        assert!(is_valid_agent_move(&map, at(0, 0)));
    }

    #[test]
    fn agent_blocked_by_bounds() {
        let (t, width, height) = tiles_from(&["..", ".."]);
        let map = MapView { tiles: &t, width, height };
        assert!(!is_valid_agent_move(&map, at(2, 0)));
        assert!(!is_valid_agent_move(&map, at(0, 2)));
        assert!(!is_valid_agent_move(&map, None));
    }

    #[test]
    fn pursuer_cannot_stack() {
        let (t, width, height) = tiles_from(&["..."]);
        let map = MapView { tiles: &t, width, height };
        let zs = vec![Pursuer::new(0, 0, 0), Pursuer::new(1, 1, 0)];
        assert!(!can_pursuer_enter(&map, &zs, at(1, 0), 0));
        assert!(can_pursuer_enter(&map, &zs, at(2, 0), 0));
    }

    #[test]
    fn pursuer_own_cell_is_not_blocking() {
        let (t, width, height) = tiles_from(&[".."]);
        let map = MapView { tiles: &t, width, height };
        let zs = vec![Pursuer::new(0, 0, 0)];
        assert!(can_pursuer_enter(&map, &zs, at(0, 0), 0));
    }

    #[test]
    fn pursuer_blocked_by_wall_and_edge() {
        let (t, width, height) = tiles_from(&["#."]);
        let map = MapView { tiles: &t, width, height };
        let zs = vec![Pursuer::new(0, 1, 0)];
        assert!(!can_pursuer_enter(&map, &zs, at(0, 0), 0));
        assert!(!can_pursuer_enter(&map, &zs, at(2, 0), 0));
        assert!(!can_pursuer_enter(&map, &zs, None, 0));
    }
}
