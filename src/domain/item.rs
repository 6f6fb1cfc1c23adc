/// Item: one numbered, colored, movable button.
///
/// An item knows its own identity, color, measured size and position, and
/// whether its number is showing. It knows nothing about other items.
///
/// ## Input subscription
///
/// Input is bound through an explicit handle rather than a stored callback.
/// At most one `SubscriptionId` is held at a time:
///   - `enable_input(sub)` replaces (and hands back) any previous handle
///   - `disable_input()` drops the handle; calling it again is a no-op
///   - `activate()` yields an `Activation` only while a handle is held
///
/// The owner decides what an activation means by matching the handle.

use super::geometry::{Point, Rect, Size};
use super::palette::ButtonColor;

pub type ItemId = usize;

/// Opaque input subscription handle. Minted by the round owner.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SubscriptionId(pub u64);

/// Produced when an enabled item is activated.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Activation {
    pub item: ItemId,
    pub subscription: SubscriptionId,
}

#[derive(Clone, Debug)]
pub struct Item {
    id: ItemId,
    color: ButtonColor,
    size: Size,
    position: Option<Point>,
    label_visible: bool,
    subscription: Option<SubscriptionId>,
}

impl Item {
    /// Label visible, input disabled, not yet placed.
    pub fn new(id: ItemId, color: ButtonColor, size: Size) -> Self {
        Item {
            id,
            color,
            size,
            position: None,
            label_visible: true,
            subscription: None,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn color(&self) -> ButtonColor {
        self.color
    }

    pub fn width(&self) -> i32 {
        self.size.width
    }

    pub fn height(&self) -> i32 {
        self.size.height
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// Bounding box at the current position, if placed.
    pub fn rect(&self) -> Option<Rect> {
        self.position.map(|p| Rect::new(p, self.size))
    }

    /// Absolute move. Bounds are the caller's problem.
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.position = Some(Point::new(x, y));
    }

    pub fn show_label(&mut self) {
        self.label_visible = true;
    }

    pub fn hide_label(&mut self) {
        self.label_visible = false;
    }

    pub fn label_visible(&self) -> bool {
        self.label_visible
    }

    /// Visible text: the id while shown, nothing while hidden.
    pub fn label(&self) -> Option<String> {
        self.label_visible().then(|| self.id.to_string())
    }

    /// Bind input to `sub`. Returns the handle that was replaced, if any.
    pub fn enable_input(&mut self, sub: SubscriptionId) -> Option<SubscriptionId> {
        let previous = self.disable_input();
        self.subscription = Some(sub);
        previous
    }

    /// Unbind input. Idempotent.
    pub fn disable_input(&mut self) -> Option<SubscriptionId> {
        self.subscription.take()
    }

    pub fn input_enabled(&self) -> bool {
        self.subscription.is_some()
    }

    /// A click (or confirm) on this item.
    pub fn activate(&self) -> Option<Activation> {
        self.subscription.map(|subscription| Activation { item: self.id, subscription })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> Item {
        Item::new(3, ButtonColor::Blue, Size::new(7, 3))
    }

    #[test]
    fn fresh_item_defaults() {
        let it = item();
        assert_eq!(it.id(), 3);
        assert!(it.label_visible());
        assert_eq!(it.label().as_deref(), Some("3"));
        assert!(!it.input_enabled());
        assert_eq!(it.position(), None);
        assert_eq!(it.rect(), None);
        assert_eq!(it.activate(), None);
    }

    #[test]
    fn move_to_has_no_bounds_check() {
        let mut it = item();
        it.move_to(-5, 1000);
        assert_eq!(it.position(), Some(Point::new(-5, 1000)));
        assert_eq!(it.rect().map(|r| r.bottom()), Some(1003));
    }

    #[test]
    fn label_toggles() {
        let mut it = item();
        it.hide_label();
        assert_eq!(it.label(), None);
        it.show_label();
        assert_eq!(it.label().as_deref(), Some("3"));
    }

    #[test]
    fn enable_replaces_previous_subscription() {
        let mut it = item();
        assert_eq!(it.enable_input(SubscriptionId(1)), None);
        assert_eq!(it.enable_input(SubscriptionId(2)), Some(SubscriptionId(1)));
        // Only the newest handle fires
        assert_eq!(
            it.activate(),
            Some(Activation { item: 3, subscription: SubscriptionId(2) })
        );
    }

    #[test]
    fn disable_is_idempotent() {
        let mut it = item();
        it.enable_input(SubscriptionId(9));
        assert_eq!(it.disable_input(), Some(SubscriptionId(9)));
        assert_eq!(it.disable_input(), None);
        assert!(!it.input_enabled());
        assert_eq!(it.activate(), None);
    }

    #[test]
    fn disable_on_never_enabled_item() {
        let mut it = item();
        assert_eq!(it.disable_input(), None);
        assert_eq!(it.disable_input(), None);
    }
}
