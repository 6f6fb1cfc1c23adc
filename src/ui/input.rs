/// Terminal input collected once per frame.
///
/// Everything here is edge-triggered: a key press, a typed character or a
/// left-button mouse-down is reported for the frame it arrived in and then
/// forgotten. Nothing in the game needs held keys.
///
/// Release events (sent by terminals with keyboard enhancement) are dropped
/// so a single press never counts twice.

use std::time::Duration;

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

pub struct InputState {
    /// Key codes pressed this frame, in arrival order.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events for modifier checks.
    raw_events: Vec<KeyEvent>,

    /// Left mouse-button downs this frame, as terminal (column, row).
    clicks: Vec<(u16, u16)>,

    /// Terminal reported a resize this frame.
    resized: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            clicks: Vec::with_capacity(4),
            resized: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.clear();
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(ev) => self.push_event(ev),
                Err(_) => break,
            }
        }
    }

    fn clear(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.clicks.clear();
        self.resized = false;
    }

    fn push_event(&mut self, ev: Event) {
        match ev {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                self.raw_events.push(key);
                self.fresh_presses.push(key.code);
            }
            Event::Mouse(m) => {
                if let MouseEventKind::Down(MouseButton::Left) = m.kind {
                    self.clicks.push((m.column, m.row));
                }
            }
            Event::Resize(_, _) => self.resized = true,
            _ => {}
        }
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Printable characters typed this frame (Ctrl/Alt chords excluded).
    pub fn typed_chars(&self) -> impl Iterator<Item = char> + '_ {
        self.raw_events.iter().filter_map(|k| match k.code {
            KeyCode::Char(c)
                if !k.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                Some(c)
            }
            _ => None,
        })
    }

    pub fn clicks(&self) -> &[(u16, u16)] {
        &self.clicks
    }

    pub fn resized(&self) -> bool {
        self.resized
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
