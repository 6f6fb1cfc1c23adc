/// Keyboard / gamepad focus over the round's items.
///
/// Focus walks items in reading order (top-to-bottom, left-to-right by
/// current position), so after a scramble it follows what is on screen,
/// not the hidden numbering.

use crate::domain::item::{Item, ItemId};
use crate::domain::layout::reading_order;

#[derive(Clone, Debug, Default)]
pub struct FocusRing {
    focused: Option<ItemId>,
}

impl FocusRing {
    pub fn new() -> Self {
        FocusRing { focused: None }
    }

    pub fn focused(&self) -> Option<ItemId> {
        self.focused
    }

    pub fn clear(&mut self) {
        self.focused = None;
    }

    pub fn next(&mut self, items: &[Item]) {
        self.step(items, 1);
    }

    pub fn prev(&mut self, items: &[Item]) {
        self.step(items, -1);
    }

    fn step(&mut self, items: &[Item], delta: isize) {
        let order = reading_order(items);
        if order.is_empty() {
            self.focused = None;
            return;
        }
        let len = order.len() as isize;
        let idx = match self.focused.and_then(|id| order.iter().position(|&o| o == id)) {
            Some(i) => (i as isize + delta).rem_euclid(len),
            None if delta >= 0 => 0,
            None => len - 1,
        };
        self.focused = Some(order[idx as usize]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::Size;
    use crate::domain::palette::ButtonColor;

    fn placed(coords: &[(i32, i32)]) -> Vec<Item> {
        coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                let mut it = Item::new(i + 1, ButtonColor::Red, Size::new(3, 1));
                it.move_to(x, y);
                it
            })
            .collect()
    }

    #[test]
    fn starts_at_first_in_reading_order() {
        let items = placed(&[(10, 5), (0, 5), (4, 0)]);
        let mut f = FocusRing::new();
        f.next(&items);
        assert_eq!(f.focused(), Some(3));
        f.next(&items);
        assert_eq!(f.focused(), Some(2));
        f.next(&items);
        assert_eq!(f.focused(), Some(1));
        f.next(&items);
        assert_eq!(f.focused(), Some(3)); // wraps
    }

    #[test]
    fn prev_from_nothing_goes_to_last() {
        let items = placed(&[(0, 0), (5, 0)]);
        let mut f = FocusRing::new();
        f.prev(&items);
        assert_eq!(f.focused(), Some(2));
        f.prev(&items);
        assert_eq!(f.focused(), Some(1));
        f.prev(&items);
        assert_eq!(f.focused(), Some(2));
    }

    #[test]
    fn no_items_means_no_focus() {
        let mut f = FocusRing::new();
        f.next(&[]);
        assert_eq!(f.focused(), None);
    }

    #[test]
    fn stale_focus_restarts() {
        let items = placed(&[(0, 0), (5, 0)]);
        let mut f = FocusRing { focused: Some(6) };
        f.next(&items);
        assert_eq!(f.focused(), Some(1));
    }
}
