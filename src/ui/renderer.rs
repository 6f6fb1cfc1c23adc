/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Screen layout (rows):
///
/// ```text
///   0      HUD: title, count field, Go state, round status
///   1      (blank)
///   2      ┌──────── playfield frame ────────┐
///   3..    │ playfield interior = container  │
///   h-3    └─────────────────────────────────┘
///   h-2    message bar
///   h-1    help line
/// ```
///
/// The playfield interior is the container the layout works in; its top-left
/// cell is container (0, 0).

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::geometry::{BoundsProvider, Point, Size};
use crate::domain::item::{Item, ItemId};
use crate::sim::round::{Outcome, Phase};
use crate::sim::session::Session;
use super::presenter::{MessageStyle, TerminalPresenter};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every empty cell, so the terminal's own
    /// default never shows through between rows.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Never equal to a real cell; forces a full repaint.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }

    #[cfg(test)]
    fn ch(&self) -> char {
        self.as_str().chars().next().unwrap_or(' ')
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

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell::from_char(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, fg: Color, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', fg, bg));
        }
    }
}

// ── Playfield: the container in terminal coordinates ──

const HUD_ROW: usize = 0;
const FRAME_TOP_ROW: usize = 2;
/// Rows below the frame: bottom border, message bar, help line.
const ROWS_BELOW: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Playfield {
    /// Terminal (column, row) of container (0, 0).
    pub origin: (u16, u16),
    pub size: Size,
}

impl Playfield {
    pub fn for_terminal(term_w: u16, term_h: u16) -> Self {
        let width = (term_w as i32 - 2).max(0);
        let height = (term_h as i32 - (FRAME_TOP_ROW + 1 + ROWS_BELOW) as i32).max(0);
        Playfield {
            origin: (1, (FRAME_TOP_ROW + 1) as u16),
            size: Size::new(width, height),
        }
    }

    /// Terminal cell → container point, if the cell is inside the playfield.
    pub fn to_local(&self, col: u16, row: u16) -> Option<Point> {
        let x = col as i32 - self.origin.0 as i32;
        let y = row as i32 - self.origin.1 as i32;
        (x >= 0 && y >= 0 && x < self.size.width && y < self.size.height).then(|| Point::new(x, y))
    }
}

impl BoundsProvider for Playfield {
    fn container_size(&self) -> Size {
        self.size
    }
}

// ── Colors ──

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const FRAME_FG: Color = Color::Rgb { r: 90, g: 90, b: 130 };
const INFO_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const ERROR_BG: Color = Color::Rgb { r: 170, g: 40, b: 40 };
const GO_ON: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const FOCUS_FG: Color = Color::Rgb { r: 255, g: 220, b: 50 };

const HELP: &str =
    " 3-7 ↑↓: count  Enter: Go  Tab/←→: focus  Space: press  Click: press  Bksp: give up  q: quit";

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: u16,
    term_h: u16,
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
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize_buffers(tw, th);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Re-read the terminal size. True when it changed since the last call.
    pub fn sync_size(&mut self) -> io::Result<bool> {
        let (tw, th) = terminal::size()?;
        if tw == self.term_w && th == self.term_h {
            return Ok(false);
        }
        self.resize_buffers(tw, th);
        queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        Ok(true)
    }

    fn resize_buffers(&mut self, tw: u16, th: u16) {
        self.term_w = tw;
        self.term_h = th;
        self.front.resize(tw as usize, th as usize);
        self.back.resize(tw as usize, th as usize);
        self.back.cells.fill(Cell::INVALID);
    }

    pub fn playfield(&self) -> Playfield {
        Playfield::for_terminal(self.term_w, self.term_h)
    }

    pub fn render(
        &mut self,
        session: &Session<TerminalPresenter>,
        focused: Option<ItemId>,
    ) -> io::Result<()> {
        self.compose(session, focused);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.as_str()))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, session: &Session<TerminalPresenter>, focused: Option<ItemId>) {
        self.front.clear();
        let field = self.playfield();
        let machine = session.machine();

        self.compose_hud(session);
        self.compose_frame(&field);
        for item in machine.items() {
            self.compose_item(&field, item);
        }
        if machine.phase() == Phase::Play {
            if let Some(item) = focused.and_then(|id| machine.item(id)) {
                self.compose_focus(&field, item);
            }
        }
        self.compose_message(session.gateway());

        let help_row = (self.term_h as usize).saturating_sub(1);
        if help_row > FRAME_TOP_ROW {
            self.front.put_str(0, help_row, HELP, Color::DarkGrey, Color::Reset);
        }
    }

    fn compose_hud(&mut self, session: &Session<TerminalPresenter>) {
        self.front.fill_row(HUD_ROW, Color::White, HUD_BG);
        let go_enabled = session.go_enabled();

        let mut x = 0;
        let title = " Scramble Memory   Buttons: ";
        self.front.put_str(x, HUD_ROW, title, Color::White, HUD_BG);
        x += title.chars().count();

        let field = format!("[{:<4}]", session.gateway().count_input());
        let field_fg = if go_enabled { Color::White } else { Color::DarkGrey };
        self.front.put_str(x, HUD_ROW, &field, field_fg, Color::Rgb { r: 40, g: 40, b: 90 });
        x += field.chars().count() + 2;

        let (go, go_fg) = if go_enabled { ("[ GO ]", GO_ON) } else { ("[ .. ]", Color::DarkGrey) };
        self.front.put_str(x, HUD_ROW, go, go_fg, HUD_BG);
        x += go.chars().count() + 3;

        let machine = session.machine();
        let status = match machine.phase() {
            Phase::Setup => String::new(),
            Phase::Memorize => "memorize".to_string(),
            Phase::Scrambling => "scrambling".to_string(),
            Phase::Play => format!("found {}/{}", machine.next_expected().saturating_sub(1),machine.round_size()),
            Phase::Ended(Outcome::Success) => "solved".to_string(),
            Phase::Ended(Outcome::Failure) => "missed".to_string(),
        };
        self.front.put_str(x, HUD_ROW, &status, Color::Rgb { r: 180, g: 180, b: 220 }, HUD_BG);
    }

    fn compose_frame(&mut self, field: &Playfield) {
        let left = 0;
        let right = field.origin.0 as usize + field.size.width as usize;
        let top = FRAME_TOP_ROW;
        let bottom = field.origin.1 as usize + field.size.height as usize;
        if right >= self.front.width || bottom >= self.front.height {
            return;
        }
        for x in left + 1..right {
            self.front.set(x, top, Cell::from_char('─', FRAME_FG, Color::Reset));
            self.front.set(x, bottom, Cell::from_char('─', FRAME_FG, Color::Reset));
        }
        for y in top + 1..bottom {
            self.front.set(left, y, Cell::from_char('│', FRAME_FG, Color::Reset));
            self.front.set(right, y, Cell::from_char('│', FRAME_FG, Color::Reset));
        }
        self.front.set(left, top, Cell::from_char('┌', FRAME_FG, Color::Reset));
        self.front.set(right, top, Cell::from_char('┐', FRAME_FG, Color::Reset));
        self.front.set(left, bottom, Cell::from_char('└', FRAME_FG, Color::Reset));
        self.front.set(right, bottom, Cell::from_char('┘', FRAME_FG, Color::Reset));
    }

    /// Container point → terminal cell, clipped to the playfield interior.
    fn to_screen(field: &Playfield, x: i32, y: i32) -> Option<(usize, usize)> {
        (x >= 0 && y >= 0 && x < field.size.width && y < field.size.height).then(|| {
            (field.origin.0 as usize + x as usize, field.origin.1 as usize + y as usize)
        })
    }

    fn compose_item(&mut self, field: &Playfield, item: &Item) {
        let Some(rect) = item.rect() else { return };
        let (r, g, b) = item.color().rgb();
        let bg = Color::Rgb { r, g, b };
        let fg = if item.color().is_dark() { Color::White } else { Color::Black };

        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                if let Some((col, row)) = Self::to_screen(field, x, y) {
                    self.front.set(col, row, Cell::from_char(' ', fg, bg));
                }
            }
        }

        if let Some(label) = item.label() {
            let len = label.chars().count() as i32;
            let lx = rect.x + (rect.width - len).max(0) / 2;
            let ly = rect.y + rect.height / 2;
            for (i, ch) in label.chars().enumerate() {
                if let Some((col, row)) = Self::to_screen(field, lx + i as i32, ly) {
                    self.front.set(col, row, Cell::from_char(ch, fg, bg));
                }
            }
        }
    }

    fn compose_focus(&mut self, field: &Playfield, item: &Item) {
        if !item.input_enabled() {
            return;
        }
        let Some(rect) = item.rect() else { return };
        let y = rect.y + rect.height / 2;
        if let Some((col, row)) = Self::to_screen(field, rect.x - 1, y) {
            self.front.set(col, row, Cell::from_char('[', FOCUS_FG, Color::Reset));
        }
        if let Some((col, row)) = Self::to_screen(field, rect.right(), y) {
            self.front.set(col, row, Cell::from_char(']', FOCUS_FG, Color::Reset));
        }
    }

    fn compose_message(&mut self, presenter: &TerminalPresenter) {
        let row = (self.term_h as usize).saturating_sub(2);
        if row <= FRAME_TOP_ROW {
            return;
        }
        if let Some((text, style)) = presenter.message() {
            let (fg, bg) = match style {
                MessageStyle::Info => (Color::Black, INFO_BG),
                MessageStyle::Error => (Color::White, ERROR_BG),
            };
            self.front.fill_row(row, fg, bg);
            self.front.put_str(0, row, &format!(" ◈ {text} "), fg, bg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::layout::LayoutSettings;
    use crate::sim::round::RoundMachine;
    use crate::sim::session::SessionTiming;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Instant;

    fn renderer(w: u16, h: u16) -> Renderer {
        let mut r = Renderer::new();
        r.resize_buffers(w, h);
        r
    }

    fn session(count: usize) -> Session<TerminalPresenter> {
        let machine = RoundMachine::with_rng(
            TerminalPresenter::new(count),
            LayoutSettings::new(1, 2),
            Size::new(7, 3),
            StdRng::seed_from_u64(3),
        );
        Session::new(machine, SessionTiming::default())
    }

    #[test]
    fn playfield_sits_inside_the_frame() {
        let field = Playfield::for_terminal(80, 24);
        assert_eq!(field.origin, (1, 3));
        assert_eq!(field.size, Size::new(78, 18));
        assert_eq!(field.container_size(), field.size);
    }

    #[test]
    fn tiny_terminal_gives_empty_playfield() {
        let field = Playfield::for_terminal(1, 4);
        assert_eq!(field.size, Size::new(0, 0));
        assert_eq!(field.to_local(1, 3), None);
    }

    #[test]
    fn to_local_maps_interior_only() {
        let field = Playfield::for_terminal(80, 24);
        assert_eq!(field.to_local(1, 3), Some(Point::new(0, 0)));
        assert_eq!(field.to_local(78, 20), Some(Point::new(77, 17)));
        assert_eq!(field.to_local(0, 3), None); // border
        assert_eq!(field.to_local(79, 10), None);
        assert_eq!(field.to_local(10, 2), None);
        assert_eq!(field.to_local(10, 21), None);
    }

    #[test]
    fn items_are_drawn_with_color_and_label() {
        let mut r = renderer(80, 24);
        let mut s = session(3);
        let field = r.playfield();
        assert!(s.press_go(Instant::now(), &field));
        r.compose(&s, None);

        for item in s.machine().items() {
            let rect = item.rect().unwrap();
            let (cr, cg, cb) = item.color().rgb();
            let (col, row) = Renderer::to_screen(&field, rect.x, rect.y).unwrap();
            assert_eq!(r.front.get(col, row).bg, Color::Rgb { r: cr, g: cg, b: cb });

            let (lc, lr) = Renderer::to_screen(&field, rect.x + 3, rect.y + 1).unwrap();
            let digit = char::from_digit(item.id() as u32, 10).unwrap();
            assert_eq!(r.front.get(lc, lr).ch(), digit);
        }
    }

    #[test]
    fn frame_and_help_are_drawn() {
        let mut r = renderer(40, 12);
        let s = session(3);
        r.compose(&s, None);
        assert_eq!(r.front.get(0, FRAME_TOP_ROW).ch(), '┌');
        assert_eq!(r.front.get(39, 9).ch(), '┘');
        assert_eq!(r.front.get(1, 11).ch(), '3');
    }

    #[test]
    fn error_message_uses_error_colors() {
        let mut r = renderer(40, 12);
        let mut s = session(3);
        s.gateway_mut().backspace();
        assert!(!s.press_go(Instant::now(), &r.playfield()));
        r.compose(&s, None);
        assert_eq!(r.front.get(0, 10).bg, ERROR_BG);
    }

    #[test]
    fn go_indicator_tracks_lock() {
        let mut r = renderer(80, 24);
        let mut s = session(3);
        r.compose(&s, None);
        let hud: String = (0..80).map(|x| r.front.get(x, HUD_ROW).ch()).collect();
        assert!(hud.contains("[ GO ]"));

        let field = r.playfield();
        s.press_go(Instant::now(), &field);
        r.compose(&s, None);
        let hud: String = (0..80).map(|x| r.front.get(x, HUD_ROW).ch()).collect();
        assert!(hud.contains("[ .. ]"));
        assert!(hud.contains("memorize"));
    }
}
