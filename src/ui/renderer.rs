/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only reads the session: the display grid, HUD values and the
/// status. It never mutates game state.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use zombie_escape::{Cell as Label, Mode, Session, Status};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Renderer ──

/// Each game cell = 2 terminal columns, which keeps cells roughly square.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        self.sync_size();
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Is the usable map area wider than it is tall (in game cells)?
    pub fn screen_is_wide(&self) -> bool {
        let cols = self.term_w / CELL_W;
        let rows = self.term_h.saturating_sub(MAP_ROW + 4);
        cols >= rows
    }

    pub fn render(&mut self, session: &Session, message: &str) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.sync_size();
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose_hud(session);
        let map_h = self.compose_map(session);
        self.compose_footer(session, message, MAP_ROW + map_h + 1);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    /// Re-read terminal size and force a full repaint.
    fn sync_size(&mut self) {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.cells.fill(Cell::INVALID);
    }

    fn compose_hud(&mut self, session: &Session) {
        let state = session.state();
        let level = match (session.mode(), session.level_number()) {
            (Mode::Endless(tier), _) => format!("Endless {}", tier),
            (_, Some(n)) => format!("Level {}/{}", n, session.catalog().len()),
            (_, None) => "Custom".to_string(),
        };
        let tier = session.tier().map_or("-", |t| t.as_str());
        let hud = format!(
            " {}  {}  [{}]  Turn:{:<4}  Zombies:{} ",
            level,
            session.level_name(),
            tier,
            state.turn(),
            state.pursuers().len(),
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    /// Draws the display grid centred horizontally. Returns rows used.
    fn compose_map(&mut self, session: &Session) -> usize {
        let grid = session.state().display_grid();
        let map_w = session.state().width() * CELL_W;
        let left = self.front.width.saturating_sub(map_w) / 2;

        for (y, row) in grid.iter().enumerate() {
            let ty = MAP_ROW + y;
            if ty >= self.front.height {
                break;
            }
            for (x, label) in row.iter().enumerate() {
                let tx = left + x * CELL_W;
                let (glyph, fg, bg) = style(*label);
                self.front.set(tx, ty, Cell::new(glyph, fg, bg));
                self.front.set(tx + 1, ty, Cell::new(' ', fg, bg));
            }
        }
        grid.len()
    }

    fn compose_footer(&mut self, session: &Session, message: &str, row: usize) {
        if row < self.front.height && !message.is_empty() {
            let msg = format!(" ◈ {} ", message);
            self.front.fill_row(row, MSG_BG);
            self.front.put_str(0, row, &msg, Color::Black, MSG_BG);
        }

        let help_row = row + 2;
        if help_row < self.front.height {
            let help = match session.state().status() {
                Status::InProgress => " Arrows/WASD:Move  R:Restart  T:Endless tier  Q:Quit",
                Status::Escaped => " Enter/N:Next level  R:Replay  T:Endless tier  Q:Quit",
                Status::Caught => " Enter/R:Retry  T:Endless tier  Q:Quit",
            };
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}

/// Glyph and colours for a display label.
fn style(label: Label) -> (char, Color, Color) {
    match label {
        Label::Agent => ('@', Color::Rgb { r: 80, g: 230, b: 120 }, Color::Reset),
        Label::Pursuer => ('Z', Color::Rgb { r: 230, g: 70, b: 70 }, Color::Reset),
        Label::Wall => ('█', Color::Rgb { r: 90, g: 90, b: 110 }, Color::Rgb { r: 90, g: 90, b: 110 }),
        Label::Exit => ('>', Color::Rgb { r: 250, g: 210, b: 60 }, Color::Reset),
        Label::Empty => ('·', Color::DarkGrey, Color::Reset),
    }
}
