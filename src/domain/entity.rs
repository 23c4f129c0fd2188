/// Entities: the controllable agent (a bare `Position`), pursuers, and the
/// directional intents that move the agent.

use std::fmt;

/// 0-based grid coordinate.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, PartialOrd, Ord)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Shift by a signed delta. `None` when the result would be negative;
    /// the upper bound is the caller's check.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Position> {
        let nx = self.x as i64 + dx as i64;
        let ny = self.y as i64 + dy as i64;
        if nx < 0 || ny < 0 {
            return None;
        }
        Some(Position::new(nx as usize, ny as usize))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pursuer {
    /// Assigned in level-scan order, never reused.
    pub id: usize,
    pub pos: Position,
}

impl Pursuer {
    pub fn new(id: usize, x: usize, y: usize) -> Self {
        Pursuer { id, pos: Position::new(x, y) }
    }
}

/// Orthogonal movement intent.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Session status. `Escaped` and `Caught` are terminal.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Status {
    InProgress,
    Escaped,
    Caught,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::InProgress)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::InProgress => "in_progress",
            Status::Escaped => "escaped",
            Status::Caught => "caught",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_below_zero_is_none() {
        assert_eq!(Position::new(0, 3).offset(-1, 0), None);
        assert_eq!(Position::new(2, 0).offset(0, -1), None);
    }

    #[test]
    fn offset_moves_by_delta() {
        assert_eq!(Position::new(1, 1).offset(1, 0), Some(Position::new(2, 1)));
        assert_eq!(Position::new(1, 1).offset(0, -1), Some(Position::new(1, 0)));
    }

    #[test]
    fn deltas_are_unit_and_orthogonal() {
        for d in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            let (dx, dy) = d.delta();
            assert_eq!(dx.abs() + dy.abs(), 1);
        }
    }

    #[test]
    fn only_in_progress_is_live() {
        assert!(!Status::InProgress.is_terminal());
        assert!(Status::Escaped.is_terminal());
        assert!(Status::Caught.is_terminal());
        assert_eq!(Status::Caught.to_string(), "caught");
    }
}
