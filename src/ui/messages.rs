/// English text for each message key.

use crate::sim::gateway::MessageKey;

pub fn text(key: MessageKey) -> &'static str {
    match key {
        MessageKey::Memorize => "Memorize the order of the buttons!",
        MessageKey::Scrambling => "Scrambling...",
        MessageKey::ClickInOrder => "Now click the buttons in order, starting from 1.",
        MessageKey::Success => "Excellent memory!",
        MessageKey::Failure => "Wrong order!",
        MessageKey::InvalidCount => "Please enter a whole number from 3 to 7.",
    }
}
