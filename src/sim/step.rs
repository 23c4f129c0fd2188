/// The turn resolver: advances a `GridState` by one agent move.
///
/// Processing order:
///   1. Reject if terminal, out of bounds, or walled (no mutation)
///   2. Agent move, turn += 1
///   3. Walked onto a pursuer → caught
///   4. Reached the exit → escaped
///   5. `substeps` pursuer sub-steps, capture checked after each
///
/// The exit is only checked after the agent's own move: pursuers can end a
/// game by capture but never by escape.

use log::{debug, info};

use crate::domain::ai;
use crate::domain::entity::{Direction, Status};
use crate::domain::rules::MapView;
use super::world::GridState;

/// Pursuer sub-steps per turn unless configured otherwise.
pub const DEFAULT_SUBSTEPS: u32 = 2;

/// Result of one `move_player` call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveResult {
    pub moved: bool,
    pub status: Status,
    /// Trapped pursuers summed over executed sub-steps. `Some` exactly when
    /// the pursuer phase ran this turn.
    pub trapped_count: Option<u32>,
}

impl MoveResult {
    fn rejected(status: Status) -> Self {
        MoveResult { moved: false, status, trapped_count: None }
    }

    fn ended(status: Status) -> Self {
        MoveResult { moved: true, status, trapped_count: None }
    }
}

/// Resolve one turn for the intent `(dx, dy)`.
///
/// The intent is expected to be a unit orthogonal step; diagonal or zero
/// intents are not validated.
pub fn move_player(state: &mut GridState, dx: i32, dy: i32, substeps: u32) -> MoveResult {
    if state.status.is_terminal() {
        return MoveResult::rejected(state.status);
    }

    let target = state.agent.offset(dx, dy);
    let next = match target {
        Some(pos) if state.is_valid_agent_move(target) => pos,
        _ => return MoveResult::rejected(state.status),
    };

    state.agent = next;
    state.turn += 1;

    if state.agent_caught() {
        return finish(state, Status::Caught);
    }
    if state.agent == state.exit {
        return finish(state, Status::Escaped);
    }

    let trapped = resolve_pursuers(state, substeps);
    MoveResult { moved: true, status: state.status, trapped_count: Some(trapped) }
}

/// `move_player` for a typed direction.
pub fn move_dir(state: &mut GridState, dir: Direction, substeps: u32) -> MoveResult {
    let (dx, dy) = dir.delta();
    move_player(state, dx, dy, substeps)
}

/// Run the pursuer phase. Stops early on capture.
fn resolve_pursuers(state: &mut GridState, substeps: u32) -> u32 {
    let mut trapped = 0;
    for sub in 0..substeps {
        let agent = state.agent;
        let map = MapView {
            tiles: &state.tiles,
            width: state.width,
            height: state.height,
        };
        trapped += ai::step_pursuers(&map, &mut state.pursuers, agent);

        if state.agent_caught() {
            debug!("caught during pursuer sub-step {}", sub + 1);
            finish(state, Status::Caught);
            break;
        }
    }
    trapped
}

fn finish(state: &mut GridState, status: Status) -> MoveResult {
    state.status = status;
    info!("turn {}: {}", state.turn, status);
    MoveResult::ended(status)
}
