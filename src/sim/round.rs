/// Round state machine: memorize → scramble → play → ended.
///
/// ## Phases
/// ┌─────────────┬──────────────────────────────┬──────────────────────────┐
/// │ Phase       │ Entered by                   │ Input                    │
/// ├─────────────┼──────────────────────────────┼──────────────────────────┤
/// │ Setup       │ new / clear / start_round    │ none (no items or fresh) │
/// │ Memorize    │ start_round                  │ disabled, labels shown   │
/// │ Scrambling  │ begin_scramble               │ disabled, animating      │
/// │ Play        │ prepare_play                 │ enabled, labels hidden   │
/// │ Ended(..)   │ first mistake or last item   │ disabled                 │
/// └─────────────┴──────────────────────────────┴──────────────────────────┘
///
/// Transitions only move forward. The only way back is `start_round`,
/// which clears everything first.
///
/// The machine is synchronous. Timed pauses between steps belong to the
/// session (`sim::session`), which calls `scramble_step` once per delay.
///
/// `next_expected` always lies in `1..=N+1`.

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::geometry::{BoundsProvider, Point, Size};
use crate::domain::item::{Activation, Item, ItemId, SubscriptionId};
use crate::domain::layout::{self, LayoutSettings, ScrambleReport};
use crate::domain::palette::shuffled_colors;
use crate::error::{GameError, GameResult};
use super::event::RoundEvent;
use super::gateway::{Gateway, MessageKey};

pub const MIN_ITEMS: usize = 3;
pub const MAX_ITEMS: usize = 7;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Success,
    Failure,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Setup,
    Memorize,
    Scrambling,
    Play,
    Ended(Outcome),
}

pub struct RoundMachine<G: Gateway> {
    gateway: G,
    settings: LayoutSettings,
    item_size: Size,
    rng: StdRng,

    items: Vec<Item>,
    phase: Phase,
    next_expected: ItemId,
    /// Advisory lock: true while scramble steps are still running.
    animating: bool,
    scramble_steps: u32,

    /// Handle bound to every item during Play. Anything else is stale.
    play_subscription: Option<SubscriptionId>,
    subscription_counter: u64,

    events: Vec<RoundEvent>,
}

// ── Construction / queries ──

impl<G: Gateway> RoundMachine<G> {
    pub fn new(gateway: G, settings: LayoutSettings, item_size: Size) -> Self {
        Self::with_rng(gateway, settings, item_size, StdRng::from_os_rng())
    }

    pub fn with_rng(gateway: G, settings: LayoutSettings, item_size: Size, rng: StdRng) -> Self {
        RoundMachine {
            gateway,
            settings,
            item_size,
            rng,
            items: vec![],
            phase: Phase::Setup,
            next_expected: 1,
            animating: false,
            scramble_steps: 0,
            play_subscription: None,
            subscription_counter: 0,
            events: vec![],
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|it| it.id() == id)
    }

    pub fn round_size(&self) -> usize {
        self.items.len()
    }

    pub fn next_expected(&self) -> ItemId {
        self.next_expected
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// Take all events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    fn require(&self, expected: Phase, to: Phase) -> GameResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(GameError::PhaseOrder { from: self.phase, to })
        }
    }

    fn mint_subscription(&mut self) -> SubscriptionId {
        self.subscription_counter += 1;
        SubscriptionId(self.subscription_counter)
    }
}

// ── Lifecycle ──

impl<G: Gateway> RoundMachine<G> {
    /// Destroy every item and its input binding; back to an empty Setup.
    pub fn clear(&mut self) {
        for item in &mut self.items {
            item.disable_input();
        }
        self.items.clear();
        self.play_subscription = None;
        self.animating = false;
        self.scramble_steps = 0;
        self.next_expected = 1;
        self.phase = Phase::Setup;
    }

    /// Tear down the previous round and lay out `n` fresh items in a row.
    pub fn start_round(&mut self, n: usize, bounds: &impl BoundsProvider) -> GameResult<()> {
        if !(MIN_ITEMS..=MAX_ITEMS).contains(&n) {
            return Err(GameError::InvalidSize { size: n, min: MIN_ITEMS, max: MAX_ITEMS });
        }

        self.clear();

        let size = self.item_size;
        let colors = shuffled_colors(n, &mut self.rng);
        self.items = colors
            .into_iter()
            .enumerate()
            .map(|(i, color)| {
                let mut item = Item::new(i + 1, color, size);
                item.show_label();
                item.disable_input();
                item
            })
            .collect();

        layout::place_in_row(&mut self.items, bounds.container_size(), &self.settings);

        self.phase = Phase::Memorize;
        info!("round started with {n} items");
        self.events.push(RoundEvent::RoundStarted { size: n });
        self.gateway.show_message(MessageKey::Memorize);
        Ok(())
    }

    /// Enter Scrambling. Input goes off before the first step so a click
    /// queued during the memorize pause cannot land mid-animation.
    pub fn begin_scramble(&mut self) -> GameResult<()> {
        self.require(Phase::Memorize, Phase::Scrambling)?;
        self.phase = Phase::Scrambling;
        self.animating = true;
        self.scramble_steps = 0;
        for item in &mut self.items {
            item.disable_input();
        }
        Ok(())
    }

    /// One scramble step. Only valid while the scramble is running.
    pub fn scramble_step(&mut self, bounds: &impl BoundsProvider) -> GameResult<ScrambleReport> {
        self.require(Phase::Scrambling, Phase::Scrambling)?;
        if !self.animating {
            return Err(GameError::PhaseOrder { from: self.phase, to: Phase::Scrambling });
        }

        let report = layout::scramble_once(
            &mut self.items,
            bounds.container_size(),
            &self.settings,
            &mut self.rng,
        );
        self.scramble_steps += 1;
        if !report.is_clean() {
            debug!(
                "scramble step {}: {} of {} items left overlapping",
                self.scramble_steps, report.overlapping, report.placed
            );
        }
        self.events.push(RoundEvent::ScrambleStep {
            step: self.scramble_steps,
            overlapping: report.overlapping,
        });
        Ok(report)
    }

    /// Release the animation lock after the final step's pause.
    pub fn finish_scramble(&mut self) -> GameResult<()> {
        self.require(Phase::Scrambling, Phase::Scrambling)?;
        self.animating = false;
        debug!("scramble finished after {} steps", self.scramble_steps);
        Ok(())
    }

    /// Hide every number and open input for the play phase.
    pub fn prepare_play(&mut self) -> GameResult<()> {
        self.require(Phase::Scrambling, Phase::Play)?;
        if self.animating {
            return Err(GameError::PhaseOrder { from: self.phase, to: Phase::Play });
        }

        self.next_expected = 1;
        let sub = self.mint_subscription();
        for item in &mut self.items {
            item.hide_label();
            item.enable_input(sub);
        }
        self.play_subscription = Some(sub);

        self.phase = Phase::Play;
        self.events.push(RoundEvent::PlayStarted);
        self.gateway.show_message(MessageKey::ClickInOrder);
        Ok(())
    }

    /// Resolve one activation. Returns false when it was ignored.
    pub fn handle_activation(&mut self, activation: Activation) -> bool {
        if self.phase != Phase::Play || self.animating {
            trace!("ignoring activation of {} in {:?}", activation.item, self.phase);
            return false;
        }
        if self.play_subscription != Some(activation.subscription) {
            trace!("ignoring stale activation of {}", activation.item);
            return false;
        }
        let Some(idx) = self.items.iter().position(|it| it.id() == activation.item) else {
            return false;
        };

        if activation.item == self.next_expected {
            self.items[idx].show_label();
            self.next_expected += 1;
            self.events.push(RoundEvent::ItemRevealed { id: activation.item });
            if self.next_expected > self.items.len() {
                self.finish(Outcome::Success);
            }
        } else {
            self.events.push(RoundEvent::Mistake {
                expected: self.next_expected,
                got: activation.item,
            });
            self.finish(Outcome::Failure);
        }
        true
    }

    /// Activate the item with `id`, as a click on it would.
    pub fn activate(&mut self, id: ItemId) -> bool {
        match self.item(id).and_then(Item::activate) {
            Some(activation) => self.handle_activation(activation),
            None => false,
        }
    }

    /// Activate whatever item sits on top at `point` (container space).
    pub fn activate_at(&mut self, point: Point) -> bool {
        match layout::item_at(&self.items, point) {
            Some(id) => self.activate(id),
            None => false,
        }
    }

    /// End the play phase early with the given outcome.
    pub fn end_round(&mut self, outcome: Outcome) -> GameResult<()> {
        self.require(Phase::Play, Phase::Ended(outcome))?;
        self.finish(outcome);
        Ok(())
    }

    fn finish(&mut self, outcome: Outcome) {
        for item in &mut self.items {
            item.disable_input();
        }
        self.play_subscription = None;

        match outcome {
            Outcome::Success => self.gateway.show_message(MessageKey::Success),
            Outcome::Failure => {
                for item in &mut self.items {
                    item.show_label();
                }
                self.gateway.show_error(MessageKey::Failure);
            }
        }

        self.phase = Phase::Ended(outcome);
        info!("round ended: {outcome:?}");
        self.events.push(RoundEvent::RoundEnded { outcome });
    }

    /// Container resized. No-op while the scramble animates.
    ///
    /// Before play the row is rebuilt; once positions are scrambled they are
    /// only clamped, so a resize never gives the order away.
    pub fn relayout(&mut self, bounds: &impl BoundsProvider) -> bool {
        if self.animating || self.items.is_empty() {
            return false;
        }
        let size = bounds.container_size();
        if matches!(self.phase, Phase::Setup | Phase::Memorize) {
            layout::place_in_row(&mut self.items, size, &self.settings);
        }
        layout::clamp_all_into_container(&mut self.items, size);
        debug!(
            "relayout to {}x{}: {} overlapping pairs",
            size.width,
            size.height,
            layout::count_overlaps(&self.items)
        );
        true
    }
}
