/// Events recorded by the round state machine.
/// The presentation layer drains these for sound; the core logs them.

use crate::domain::item::ItemId;
use super::round::Outcome;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RoundEvent {
    RoundStarted { size: usize },
    ScrambleStep { step: u32, overlapping: usize },
    PlayStarted,
    ItemRevealed { id: ItemId },
    Mistake { expected: ItemId, got: ItemId },
    RoundEnded { outcome: Outcome },
}
