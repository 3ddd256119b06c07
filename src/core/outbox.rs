//! Fire-and-forget messaging to characters and locations
//!
//! The engine never talks to connections directly. It queues text here and the
//! game layer drains the queue after each tick and delivers it however it likes.

use serde::{Deserialize, Serialize};

use crate::core::types::{CharacterId, LocationId};

/// Who a queued message is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    Character(CharacterId),
    /// Everyone in the location except the listed characters
    Location {
        location: LocationId,
        exclude: Vec<CharacterId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub to: Recipient,
    pub text: String,
}

/// Queue of outgoing user-visible text
#[derive(Debug, Default, Clone)]
pub struct Outbox {
    messages: Vec<Message>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message a single character
    pub fn msg(&mut self, to: CharacterId, text: impl Into<String>) {
        self.messages.push(Message {
            to: Recipient::Character(to),
            text: text.into(),
        });
    }

    /// Message every occupant of a location except `exclude`
    pub fn msg_location(&mut self, location: LocationId, text: impl Into<String>, exclude: &[CharacterId]) {
        self.messages.push(Message {
            to: Recipient::Location {
                location,
                exclude: exclude.to_vec(),
            },
            text: text.into(),
        });
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Take every queued message, leaving the outbox empty
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }

    /// Text of every message addressed directly to `character`
    pub fn messages_for(&self, character: CharacterId) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.to == Recipient::Character(character))
            .map(|m| m.text.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_for_filters_direct_messages() {
        let mut outbox = Outbox::new();
        let a = CharacterId::new();
        let b = CharacterId::new();

        outbox.msg(a, "hello a");
        outbox.msg(b, "hello b");
        outbox.msg_location(LocationId(1), "room", &[a]);

        assert_eq!(outbox.messages_for(a), vec!["hello a"]);
        assert_eq!(outbox.messages().len(), 3);

        let drained = outbox.drain();
        assert_eq!(drained.len(), 3);
        assert!(outbox.is_empty());
    }
}
