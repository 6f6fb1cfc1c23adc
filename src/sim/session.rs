/// Session: drives one round machine through its timed sequence.
///
/// The memorize pause and the per-step scramble pause are deadlines. The
/// frame loop calls `tick(now, ..)`; nothing is scheduled concurrently, and
/// a scramble step only runs once the previous step's pause has elapsed in
/// full (`next_at` is measured from the step that just ran).
///
/// Sequence per round:
///   press_go → start_round → [n × memorize_per_item]
///            → "scrambling" → begin_scramble
///            → n × (scramble_step, [scramble_delay])
///            → finish_scramble → prepare_play
///            → activations … → Ended → Go unlocked
///
/// Go stays locked from `press_go` until the round reaches Ended.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::domain::geometry::{BoundsProvider, Point};
use crate::domain::item::ItemId;
use crate::error::GameResult;
use super::event::RoundEvent;
use super::gateway::{Gateway, MessageKey};
use super::round::{Outcome, Phase, RoundMachine};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SessionTiming {
    /// Memorize pause per item; the full pause is this times the round size.
    pub memorize_per_item: Duration,
    /// Visible pause after each scramble step.
    pub scramble_delay: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        SessionTiming {
            memorize_per_item: Duration::from_secs(1),
            scramble_delay: Duration::from_millis(700),
        }
    }
}

/// The pause currently being waited on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Pending {
    Idle,
    Memorize { until: Instant },
    Scramble { remaining: u32, next_at: Instant },
}

pub struct Session<G: Gateway> {
    machine: RoundMachine<G>,
    timing: SessionTiming,
    pending: Pending,
    go_enabled: bool,
}

impl<G: Gateway> Session<G> {
    pub fn new(machine: RoundMachine<G>, timing: SessionTiming) -> Self {
        Session { machine, timing, pending: Pending::Idle, go_enabled: true }
    }

    pub fn machine(&self) -> &RoundMachine<G> {
        &self.machine
    }

    pub fn gateway(&self) -> &G {
        self.machine.gateway()
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        self.machine.gateway_mut()
    }

    pub fn go_enabled(&self) -> bool {
        self.go_enabled
    }

    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        self.machine.drain_events()
    }

    /// The Go trigger. Returns true when a round actually started.
    pub fn press_go(&mut self, now: Instant, bounds: &impl BoundsProvider) -> bool {
        if !self.go_enabled {
            return false;
        }
        let Some(n) = self.machine.gateway_mut().round_size() else {
            return false;
        };

        if let Err(e) = self.machine.start_round(n, bounds) {
            warn!("round not started: {e}");
            self.machine.gateway_mut().show_error(MessageKey::InvalidCount);
            return false;
        }

        self.go_enabled = false;
        let pause = self.timing.memorize_per_item * n as u32;
        self.pending = Pending::Memorize { until: now + pause };
        info!("memorize for {:.1}s", pause.as_secs_f32());
        true
    }

    /// Advance whatever pause has expired by `now`.
    pub fn tick(&mut self, now: Instant, bounds: &impl BoundsProvider) -> GameResult<()> {
        loop {
            match self.pending {
                Pending::Memorize { until } if now >= until => {
                    self.machine.gateway_mut().show_message(MessageKey::Scrambling);
                    self.machine.begin_scramble()?;
                    let steps = self.machine.round_size() as u32;
                    // Zero-length wait: fall through to the first step now
                    self.pending = Pending::Scramble { remaining: steps, next_at: now };
                }
                Pending::Scramble { remaining, next_at } if now >= next_at => {
                    if remaining == 0 {
                        self.machine.finish_scramble()?;
                        self.machine.prepare_play()?;
                        self.pending = Pending::Idle;
                    } else {
                        self.machine.scramble_step(bounds)?;
                        self.pending = Pending::Scramble {
                            remaining: remaining - 1,
                            next_at: now + self.timing.scramble_delay,
                        };
                    }
                    return Ok(());
                }
                _ => return Ok(()),
            }
        }
    }

    /// Activate an item by id (keyboard / gamepad confirm).
    pub fn activate(&mut self, id: ItemId) -> bool {
        let handled = self.machine.activate(id);
        self.unlock_go_if_ended();
        handled
    }

    /// Activate the item under a container-space point (mouse click).
    pub fn click(&mut self, point: Point) -> bool {
        let handled = self.machine.activate_at(point);
        self.unlock_go_if_ended();
        handled
    }

    /// Container resized. Ignored while the scramble animates.
    pub fn on_resize(&mut self, bounds: &impl BoundsProvider) -> bool {
        if self.machine.is_animating() {
            debug!("resize ignored mid-scramble");
        }
        self.machine.relayout(bounds)
    }

    /// Abandon the round in play. Counts as a failure and unlocks Go.
    pub fn give_up(&mut self) -> bool {
        if self.machine.phase() != Phase::Play {
            return false;
        }
        if let Err(e) = self.machine.end_round(Outcome::Failure) {
            warn!("give up refused: {e}");
            return false;
        }
        self.unlock_go_if_ended();
        true
    }

    fn unlock_go_if_ended(&mut self) {
        if matches!(self.machine.phase(), Phase::Ended(_)) {
            self.go_enabled = true;
        }
    }
}
