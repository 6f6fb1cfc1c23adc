/// Layout engine: stateless placement of items inside a container.
///
/// Pure functions over `&mut [Item]` plus the container size. They read the
/// items' measured sizes, write positions, and keep no state between calls.
///
/// ## Operations
/// ┌──────────────────────────┬─────────────────────────────────────────────┐
/// │ Operation                │ Behavior                                    │
/// ├──────────────────────────┼─────────────────────────────────────────────┤
/// │ place_in_row             │ left→right flow, wrap before the right pad, │
/// │                          │ clamp the bottom into the bottom pad        │
/// │ clamp_all_into_container │ reproject each placed item into the box     │
/// │ scramble_once            │ random non-overlapping spots, best effort   │
/// │ item_at                  │ topmost item under a point                  │
/// └──────────────────────────┴─────────────────────────────────────────────┘
///
/// Row wrap advances by the *current* item's height plus the gap, not by the
/// tallest item of the finished row. With uniform button sizes the two agree.
///
/// `scramble_once` gives up on an item after `max_tries` samples and keeps
/// the last sample even if it overlaps. A crowded container therefore yields
/// overlaps instead of a stall; the count is reported, never raised.

use rand::Rng;

use super::geometry::{Point, Rect, Size};
use super::item::{Item, ItemId};

pub const MAX_PLACEMENT_TRIES: u32 = 200;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LayoutSettings {
    /// Inset from the container edges used by row placement.
    pub padding: i32,
    /// Horizontal gap between items and vertical gap between rows.
    pub gap: i32,
    /// Random samples per item before `scramble_once` accepts an overlap.
    pub max_tries: u32,
}

impl LayoutSettings {
    pub fn new(padding: i32, gap: i32) -> Self {
        LayoutSettings { padding, gap, max_tries: MAX_PLACEMENT_TRIES }
    }
}

/// Outcome of one scramble step.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ScrambleReport {
    pub placed: usize,
    /// Items that ran out of tries and were left overlapping.
    pub overlapping: usize,
}

impl ScrambleReport {
    pub fn is_clean(&self) -> bool {
        self.overlapping == 0
    }
}

/// Sequential row flow, in slice order.
pub fn place_in_row(items: &mut [Item], bounds: Size, settings: &LayoutSettings) {
    let pad = settings.padding;
    let gap = settings.gap;
    let mut x = pad;
    let mut y = pad;

    for item in items.iter_mut() {
        let (bw, bh) = (item.width(), item.height());
        if x + bw > bounds.width - pad {
            x = pad;
            y += bh + gap;
        }
        if y + bh > bounds.height - pad {
            y = (bounds.height - pad - bh).max(pad);
        }
        item.move_to(x, y);
        x += bw + gap;
    }
}

/// Pull every placed item back inside `[0, W-w] × [0, H-h]`.
/// Unplaced items stay unplaced.
pub fn clamp_all_into_container(items: &mut [Item], bounds: Size) {
    for item in items.iter_mut() {
        let Some(pos) = item.position() else { continue };
        let max_x = (bounds.width - item.width()).max(0);
        let max_y = (bounds.height - item.height()).max(0);
        let x = pos.x.max(0).min(max_x);
        let y = pos.y.max(0).min(max_y);
        if x != pos.x || y != pos.y {
            item.move_to(x, y);
        }
    }
}

/// One scramble step: every item gets a fresh uniform random position.
pub fn scramble_once<R: Rng + ?Sized>(
    items: &mut [Item],
    bounds: Size,
    settings: &LayoutSettings,
    rng: &mut R,
) -> ScrambleReport {
    let mut placed: Vec<Rect> = Vec::with_capacity(items.len());
    let mut report = ScrambleReport::default();
    let tries = settings.max_tries.max(1);

    for item in items.iter_mut() {
        let size = item.size();
        let max_x = (bounds.width - size.width).max(0);
        let max_y = (bounds.height - size.height).max(0);

        let mut candidate = Rect::new(Point::default(), size);
        let mut fits = false;
        for _ in 0..tries {
            let x = rng.random_range(0..=max_x);
            let y = rng.random_range(0..=max_y);
            candidate = Rect::new(Point::new(x, y), size);
            if placed.iter().all(|p| !candidate.overlaps(p)) {
                fits = true;
                break;
            }
        }

        if !fits {
            report.overlapping += 1;
        }
        item.move_to(candidate.x, candidate.y);
        placed.push(candidate);
        report.placed += 1;
    }

    report
}

/// Topmost item containing `p`. Later items are drawn over earlier ones.
pub fn item_at(items: &[Item], p: Point) -> Option<ItemId> {
    items
        .iter()
        .rev()
        .find(|it| it.rect().is_some_and(|r| r.contains(p)))
        .map(Item::id)
}

/// Placed items ordered top-to-bottom, then left-to-right.
pub fn reading_order(items: &[Item]) -> Vec<ItemId> {
    let mut placed: Vec<(Point, ItemId)> = items
        .iter()
        .filter_map(|it| it.position().map(|p| (p, it.id())))
        .collect();
    placed.sort_by_key(|(p, id)| (p.y, p.x, *id));
    placed.into_iter().map(|(_, id)| id).collect()
}

/// Number of overlapping pairs among placed items.
pub fn count_overlaps(items: &[Item]) -> usize {
    let rects: Vec<Rect> = items.iter().filter_map(Item::rect).collect();
    let mut count = 0;
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if rects[i].overlaps(&rects[j]) {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::palette::PALETTE;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Helper: `n` items of identical size, ids 1..=n.
    fn items(n: usize, w: i32, h: i32) -> Vec<Item> {
        (1..=n)
            .map(|id| Item::new(id, PALETTE[(id - 1) % PALETTE.len()], Size::new(w, h)))
            .collect()
    }

    fn positions(items: &[Item]) -> Vec<Option<Point>> {
        items.iter().map(Item::position).collect()
    }

    // ── Row placement ──

    #[test]
    fn row_places_left_to_right_with_gap() {
        let mut its = items(3, 60, 40);
        place_in_row(&mut its, Size::new(800, 600), &LayoutSettings::new(16, 16));
        assert_eq!(
            positions(&its),
            vec![
                Some(Point::new(16, 16)),
                Some(Point::new(16 + 60 + 16, 16)),
                Some(Point::new(16 + 2 * (60 + 16), 16)),
            ]
        );
    }

    #[test]
    fn row_wraps_before_right_padding() {
        // 16 + 60 + 16 + 60 = 152 fits within 200 - 16; the third does not.
        let mut its = items(3, 60, 40);
        place_in_row(&mut its, Size::new(200, 600), &LayoutSettings::new(16, 16));
        assert_eq!(its[0].position(), Some(Point::new(16, 16)));
        assert_eq!(its[1].position(), Some(Point::new(92, 16)));
        assert_eq!(its[2].position(), Some(Point::new(16, 16 + 40 + 16)));
    }

    #[test]
    fn row_clamps_bottom_into_padding() {
        // One item per row, container only tall enough for two rows.
        let mut its = items(3, 60, 40);
        place_in_row(&mut its, Size::new(100, 130), &LayoutSettings::new(16, 16));
        assert_eq!(its[0].position(), Some(Point::new(16, 16)));
        assert_eq!(its[1].position(), Some(Point::new(16, 72)));
        // 128 + 40 > 114 → y = 130 - 16 - 40
        assert_eq!(its[2].position(), Some(Point::new(16, 74)));
    }

    #[test]
    fn row_clamp_never_rises_above_padding() {
        let mut its = items(1, 10, 50);
        place_in_row(&mut its, Size::new(100, 40), &LayoutSettings::new(4, 2));
        assert_eq!(its[0].position(), Some(Point::new(4, 4)));
    }

    #[test]
    fn oversized_first_item_still_wraps() {
        // 16 + 90 > 100 - 16: even the first item drops a row.
        let mut its = items(1, 90, 10);
        place_in_row(&mut its, Size::new(100, 100), &LayoutSettings::new(16, 16));
        assert_eq!(its[0].position(), Some(Point::new(16, 16 + 10 + 16)));
    }

    #[test]
    fn row_is_deterministic() {
        let mut a = items(7, 7, 3);
        let mut b = items(7, 7, 3);
        let bounds = Size::new(40, 20);
        let settings = LayoutSettings::new(1, 2);
        place_in_row(&mut a, bounds, &settings);
        place_in_row(&mut b, bounds, &settings);
        assert_eq!(positions(&a), positions(&b));
    }

    proptest! {
        #[test]
        fn prop_row_never_negative(
            n in 3usize..=7,
            w in 1i32..30,
            h in 1i32..10,
            cw in 1i32..300,
            ch in 1i32..300,
        ) {
            let mut its = items(n, w, h);
            place_in_row(&mut its, Size::new(cw, ch), &LayoutSettings::new(16, 16));
            for it in &its {
                let p = it.position().unwrap();
                prop_assert!(p.x >= 0);
                prop_assert!(p.y >= 0);
            }
        }

        #[test]
        fn prop_row_distinct_and_disjoint_when_rows_fit(
            n in 3usize..=7,
            w in 1i32..30,
            h in 1i32..10,
            extra_w in 0i32..200,
        ) {
            let mut its = items(n, w, h);
            // Height for one row per item plus a leading wrap when the row is too narrow
            let bounds = Size::new(w + extra_w, 16 + (n as i32 + 1) * (h + 16) + 16);
            place_in_row(&mut its, bounds, &LayoutSettings::new(16, 16));
            for (i, a) in its.iter().enumerate() {
                for b in &its[i + 1..] {
                    prop_assert_ne!(a.position(), b.position());
                }
            }
            prop_assert_eq!(count_overlaps(&its), 0);
        }
    }

    // ── Clamp ──

    #[test]
    fn clamp_pulls_items_inside() {
        let mut its = items(3, 10, 4);
        its[0].move_to(95, 50);
        its[1].move_to(-3, -7);
        its[2].move_to(20, 10);
        clamp_all_into_container(&mut its, Size::new(100, 30));
        assert_eq!(its[0].position(), Some(Point::new(90, 26)));
        assert_eq!(its[1].position(), Some(Point::new(0, 0)));
        assert_eq!(its[2].position(), Some(Point::new(20, 10)));
    }

    #[test]
    fn clamp_in_container_smaller_than_item() {
        let mut its = items(1, 10, 4);
        its[0].move_to(5, 5);
        clamp_all_into_container(&mut its, Size::new(6, 2));
        assert_eq!(its[0].position(), Some(Point::new(0, 0)));
    }

    #[test]
    fn clamp_leaves_unplaced_items_alone() {
        let mut its = items(2, 10, 4);
        clamp_all_into_container(&mut its, Size::new(6, 2));
        assert_eq!(positions(&its), vec![None, None]);
    }

    // ── Scramble ──

    #[test]
    fn scramble_stays_inside_container() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = Size::new(50, 15);
        for _ in 0..50 {
            let mut its = items(7, 7, 3);
            scramble_once(&mut its, bounds, &LayoutSettings::new(1, 2), &mut rng);
            for it in &its {
                let r = it.rect().unwrap();
                assert!(r.x >= 0 && r.y >= 0);
                assert!(r.right() <= bounds.width && r.bottom() <= bounds.height);
            }
        }
    }

    #[test]
    fn scramble_avoids_overlap_in_generous_container() {
        let mut rng = StdRng::seed_from_u64(2024);
        let settings = LayoutSettings::new(16, 16);
        let trials = 100;
        let clean = (0..trials)
            .filter(|_| {
                let mut its = items(5, 60, 40);
                let report = scramble_once(&mut its, Size::new(800, 600), &settings, &mut rng);
                report.is_clean() && count_overlaps(&its) == 0
            })
            .count();
        assert!(clean * 100 >= trials * 95, "only {clean}/{trials} clean");
    }

    #[test]
    fn scramble_accepts_overlap_when_crowded() {
        // Seven 10x10 items in a 12x12 box cannot all be separated.
        let mut rng = StdRng::seed_from_u64(5);
        let mut its = items(7, 10, 10);
        let report = scramble_once(&mut its, Size::new(12, 12), &LayoutSettings::new(0, 0), &mut rng);
        assert_eq!(report.placed, 7);
        assert_eq!(report.overlapping, 6);
        assert!(its.iter().all(|it| it.position().is_some()));
    }

    #[test]
    fn scramble_with_zero_tries_still_places() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut its = items(3, 2, 2);
        let mut settings = LayoutSettings::new(0, 0);
        settings.max_tries = 0;
        let report = scramble_once(&mut its, Size::new(100, 100), &settings, &mut rng);
        assert_eq!(report.placed, 3);
        assert!(its.iter().all(|it| it.position().is_some()));
    }

    #[test]
    fn scramble_in_container_smaller_than_item_pins_origin() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut its = items(1, 10, 10);
        scramble_once(&mut its, Size::new(4, 4), &LayoutSettings::new(0, 0), &mut rng);
        assert_eq!(its[0].position(), Some(Point::new(0, 0)));
    }

    #[test]
    fn scramble_is_reproducible_with_seed() {
        let settings = LayoutSettings::new(1, 2);
        let mut a = items(5, 7, 3);
        let mut b = items(5, 7, 3);
        scramble_once(&mut a, Size::new(60, 20), &settings, &mut StdRng::seed_from_u64(11));
        scramble_once(&mut b, Size::new(60, 20), &settings, &mut StdRng::seed_from_u64(11));
        assert_eq!(positions(&a), positions(&b));
    }

    // ── Queries ──

    #[test]
    fn item_at_prefers_topmost() {
        let mut its = items(2, 10, 4);
        its[0].move_to(0, 0);
        its[1].move_to(5, 2);
        assert_eq!(item_at(&its, Point::new(1, 1)), Some(1));
        assert_eq!(item_at(&its, Point::new(6, 3)), Some(2)); // shared area
        assert_eq!(item_at(&its, Point::new(30, 30)), None);
    }

    #[test]
    fn item_at_skips_unplaced() {
        let its = items(2, 10, 4);
        assert_eq!(item_at(&its, Point::new(0, 0)), None);
    }

    #[test]
    fn reading_order_is_row_major() {
        let mut its = items(4, 2, 2);
        its[0].move_to(30, 10);
        its[1].move_to(5, 10);
        its[2].move_to(50, 0);
        its[3].move_to(0, 20);
        assert_eq!(reading_order(&its), vec![3, 2, 1, 4]);
    }
}
