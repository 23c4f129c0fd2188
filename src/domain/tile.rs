/// Tile and cell labels.
///
/// `Tile` is the static terrain fixed at load. `Cell` is what a single grid
/// position shows once entities are layered on top of terrain; the layering
/// order is `CELL_PRECEDENCE`.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Floor,
    Wall,
}

impl Tile {
    /// Can any agent occupy this tile?
    pub fn is_passable(self) -> bool {
        !matches!(self, Tile::Wall)
    }
}

/// Single-category label for one grid position.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Cell {
    Agent,
    Pursuer,
    Wall,
    Exit,
    Empty,
}

/// When several entities coincide on one position, the earliest entry wins.
pub const CELL_PRECEDENCE: [Cell; 5] = [
    Cell::Agent,
    Cell::Pursuer,
    Cell::Wall,
    Cell::Exit,
    Cell::Empty,
];

impl Cell {
    /// Layout character, identical to the level format.
    pub fn to_char(self) -> char {
        match self {
            Cell::Agent => 'P',
            Cell::Pursuer => 'Z',
            Cell::Wall => '#',
            Cell::Exit => 'E',
            Cell::Empty => '.',
        }
    }

    pub fn from_char(ch: char) -> Option<Cell> {
        match ch {
            'P' => Some(Cell::Agent),
            'Z' => Some(Cell::Pursuer),
            '#' => Some(Cell::Wall),
            'E' => Some(Cell::Exit),
            '.' => Some(Cell::Empty),
            _ => None,
        }
    }

    /// Pick the winning label out of everything present at a position.
    pub fn resolve(present: impl Fn(Cell) -> bool) -> Cell {
        CELL_PRECEDENCE
            .iter()
            .copied()
            .find(|&c| c == Cell::Empty || present(c))
            .unwrap_or(Cell::Empty)
    }
}
