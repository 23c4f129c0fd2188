/// Pursuer AI: fixed two-candidate greedy rule, no search.
///
/// For a pursuer at `z` chasing the agent at `a`, with `dx = a.x - z.x` and
/// `dy = a.y - z.y`:
///   - `|dx| > |dy|`: primary = horizontal step, secondary = vertical step
///     (only if `dy != 0`).
///   - otherwise (ties included): primary = vertical step, secondary =
///     horizontal step (only if `dx != 0`).
///
/// Primary is tried first, then secondary. A pursuer that wanted to move but
/// could take neither is trapped for that sub-step.
///
/// Pursuers are processed in id order against live state: a lower id that
/// claims a cell makes it unavailable to every higher id in the same sub-step.

use log::trace;

use super::entity::{Position, Pursuer};
use super::rules::{self, MapView};

/// Unit step on one axis.
pub type Step = (i32, i32);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Candidates {
    pub primary: Step,
    pub secondary: Option<Step>,
}

/// What one pursuer did in one sub-step.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StepOutcome {
    Primary,
    Secondary,
    Trapped,
    /// Already on the agent's cell; no desired direction.
    Idle,
}

/// Greedy candidate steps from `from` toward `target`.
/// `None` when the two coincide.
pub fn candidates(from: Position, target: Position) -> Option<Candidates> {
    let dx = target.x as i64 - from.x as i64;
    let dy = target.y as i64 - from.y as i64;
    if dx == 0 && dy == 0 {
        return None;
    }

    let horizontal = (dx.signum() as i32, 0);
    let vertical = (0, dy.signum() as i32);

    let c = if dx.abs() > dy.abs() {
        Candidates {
            primary: horizontal,
            secondary: (dy != 0).then_some(vertical),
        }
    } else {
        Candidates {
            primary: vertical,
            secondary: (dx != 0).then_some(horizontal),
        }
    };
    Some(c)
}

/// Resolve a single pursuer (by slice index) against live occupancy and
/// commit its move.
pub fn step_one(
    map: &MapView,
    pursuers: &mut [Pursuer],
    idx: usize,
    agent: Position,
) -> StepOutcome {
    let Pursuer { id, pos } = pursuers[idx].clone();
    let cand = match candidates(pos, agent) {
        Some(c) => c,
        None => return StepOutcome::Idle,
    };

    let primary = pos.offset(cand.primary.0, cand.primary.1);
    if rules::can_pursuer_enter(map, pursuers, primary, id) {
        if let Some(next) = primary {
            pursuers[idx].pos = next;
            return StepOutcome::Primary;
        }
    }

    if let Some((sx, sy)) = cand.secondary {
        let secondary = pos.offset(sx, sy);
        if rules::can_pursuer_enter(map, pursuers, secondary, id) {
            if let Some(next) = secondary {
                pursuers[idx].pos = next;
                return StepOutcome::Secondary;
            }
        }
    }

    StepOutcome::Trapped
}

/// Run one sub-step for every pursuer in slice order (= id order).
/// Returns the number of trapped pursuers.
pub fn step_pursuers(map: &MapView, pursuers: &mut [Pursuer], agent: Position) -> u32 {
    let mut trapped = 0;
    for idx in 0..pursuers.len() {
        let outcome = step_one(map, pursuers, idx, agent);
        trace!("pursuer {} -> {:?} at {}", pursuers[idx].id, outcome, pursuers[idx].pos);
        if outcome == StepOutcome::Trapped {
            trapped += 1;
        }
    }
    trapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::Tile;

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

    fn p(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    // ── candidates ──

    #[test]
    fn horizontal_dominant_prefers_horizontal() {
        let c = candidates(p(0, 0), p(3, 1)).unwrap();
        assert_eq!(c.primary, (1, 0));
        assert_eq!(c.secondary, Some((0, 1)));
    }

    #[test]
    fn vertical_dominant_prefers_vertical() {
        let c = candidates(p(2, 4), p(1, 0)).unwrap();
        assert_eq!(c.primary, (0, -1));
        assert_eq!(c.secondary, Some((-1, 0)));
    }

    #[test]
    fn exact_tie_goes_vertical() {
        let c = candidates(p(0, 0), p(2, 2)).unwrap();
        assert_eq!(c.primary, (0, 1));
        assert_eq!(c.secondary, Some((1, 0)));
    }

    #[test]
    fn aligned_on_axis_has_no_secondary() {
        let c = candidates(p(0, 2), p(5, 2)).unwrap();
        assert_eq!(c.primary, (1, 0));
        assert_eq!(c.secondary, None);

        let c = candidates(p(3, 5), p(3, 1)).unwrap();
        assert_eq!(c.primary, (0, -1));
        assert_eq!(c.secondary, None);
    }

    #[test]
    fn same_cell_has_no_candidates() {
        assert_eq!(candidates(p(1, 1), p(1, 1)), None);
    }

    // ── step_pursuers ──

    #[test]
    fn tie_moves_vertically_when_free() {
        let (t, width, height) = tiles_from(&["...", "...", "..."]);
        let map = MapView { tiles: &t, width, height };
        let mut zs = vec![Pursuer::new(0, 0, 0)];
        let trapped = step_pursuers(&map, &mut zs, p(2, 2));
        assert_eq!(trapped, 0);
        assert_eq!(zs[0].pos, p(0, 1));
    }

    #[test]
    fn blocked_primary_falls_back_to_secondary() {
        let (t, width, height) = tiles_from(&["...", "#..", "..."]);
        let map = MapView { tiles: &t, width, height };
        let mut zs = vec![Pursuer::new(0, 0, 0)];
        let trapped = step_pursuers(&map, &mut zs, p(2, 2));
        assert_eq!(trapped, 0);
        assert_eq!(zs[0].pos, p(1, 0));
    }

    #[test]
    fn both_candidates_walled_is_trapped() {
        let (t, width, height) = tiles_from(&[".#.", "#..", "..."]);
        let map = MapView { tiles: &t, width, height };
        let mut zs = vec![Pursuer::new(0, 0, 0)];
        let trapped = step_pursuers(&map, &mut zs, p(2, 2));
        assert_eq!(trapped, 1);
        assert_eq!(zs[0].pos, p(0, 0));
    }

    #[test]
    fn aligned_and_blocked_is_trapped() {
        let (t, width, height) = tiles_from(&[".#."]);
        let map = MapView { tiles: &t, width, height };
        let mut zs = vec![Pursuer::new(0, 0, 0)];
        assert_eq!(step_pursuers(&map, &mut zs, p(2, 0)), 1);
        assert_eq!(zs[0].pos, p(0, 0));
    }

    #[test]
    fn pursuer_on_agent_is_idle_not_trapped() {
        let (t, width, height) = tiles_from(&["..."]);
        let map = MapView { tiles: &t, width, height };
        let mut zs = vec![Pursuer::new(0, 1, 0)];
        assert_eq!(step_one(&map, &mut zs, 0, p(1, 0)), StepOutcome::Idle);
        assert_eq!(zs[0].pos, p(1, 0));
    }

    #[test]
    fn lower_id_wins_contested_cell() {
        // Agent at (2,1). Both pursuers want (1,1):
        //   id0 at (1,0): tie -> vertical step into (1,1)
        //   id1 at (0,1): aligned -> horizontal step into (1,1), no secondary
        let (t, width, height) = tiles_from(&["...", "...", "..."]);
        let map = MapView { tiles: &t, width, height };
        let mut zs = vec![Pursuer::new(0, 1, 0), Pursuer::new(1, 0, 1)];
        let trapped = step_pursuers(&map, &mut zs, p(2, 1));
        assert_eq!(zs[0].pos, p(1, 1));
        assert_eq!(zs[1].pos, p(0, 1));
        assert_eq!(trapped, 1);
    }

    #[test]
    fn loser_of_contest_takes_secondary() {
        let (t, width, height) = tiles_from(&["...", "...", "..."]);
        let map = MapView { tiles: &t, width, height };
        // Agent at (2,2).
        //   id0 at (1,0): vertical into (1,1)
        //   id1 at (0,1): horizontal into (1,1) is taken, secondary (0,2)
        let mut zs = vec![Pursuer::new(0, 1, 0), Pursuer::new(1, 0, 1)];
        let trapped = step_pursuers(&map, &mut zs, p(2, 2));
        assert_eq!(zs[0].pos, p(1, 1));
        assert_eq!(zs[1].pos, p(0, 2));
        assert_eq!(trapped, 0);
    }

    #[test]
    fn processing_order_is_slice_order() {
        // Positions swapped: id0 is now the horizontal mover and claims
        // (1,1) first.
        let (t, width, height) = tiles_from(&["...", "...", "..."]);
        let map = MapView { tiles: &t, width, height };
        let mut zs = vec![Pursuer::new(0, 0, 1), Pursuer::new(1, 1, 0)];
        let trapped = step_pursuers(&map, &mut zs, p(2, 2));
        assert_eq!(zs[0].pos, p(1, 1));
        // id1 at (1,0): primary (1,1) taken, secondary (2,0).
        assert_eq!(zs[1].pos, p(2, 0));
        assert_eq!(trapped, 0);
    }
}
