/// Presentation gateway: the round's only channel to the player.
///
/// Messages cross as keys, never as structured errors. The gateway also
/// owns the round-size input and validates it before the core sees it.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MessageKey {
    Memorize,
    Scrambling,
    ClickInOrder,
    Success,
    Failure,
    InvalidCount,
}

impl MessageKey {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKey::Memorize => "memorize",
            MessageKey::Scrambling => "scrambling",
            MessageKey::ClickInOrder => "clickInOrder",
            MessageKey::Success => "success",
            MessageKey::Failure => "failure",
            MessageKey::InvalidCount => "invalidCount",
        }
    }
}

pub trait Gateway {
    /// Fire-and-forget informational message.
    fn show_message(&mut self, key: MessageKey);

    /// Fire-and-forget error message.
    fn show_error(&mut self, key: MessageKey);

    /// Validated round size, or `None` after reporting invalid input.
    fn round_size(&mut self) -> Option<usize>;
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Records every notification; hands out a fixed round size.
    #[derive(Debug, Default)]
    pub struct RecordingGateway {
        pub messages: Vec<MessageKey>,
        pub errors: Vec<MessageKey>,
        pub size: Option<usize>,
    }

    impl RecordingGateway {
        pub fn last_message(&self) -> Option<MessageKey> {
            self.messages.last().copied()
        }

        pub fn last_error(&self) -> Option<MessageKey> {
            self.errors.last().copied()
        }
    }

    impl Gateway for RecordingGateway {
        fn show_message(&mut self, key: MessageKey) {
            self.messages.push(key);
        }

        fn show_error(&mut self, key: MessageKey) {
            self.errors.push(key);
        }

        fn round_size(&mut self) -> Option<usize> {
            if self.size.is_none() {
                self.errors.push(MessageKey::InvalidCount);
            }
            self.size
        }
    }
}
