//! Canonical chat-room identity for two-party chats.
//!
//! A chat is written as `<member1>:<member2>`. Both orders and any casing of
//! the names resolve to the same [`ChatRoomKey`].

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::ChatError;

/// Separates the two participant names. Never valid inside a name.
pub const SEPARATOR: char = ':';

/// Canonical identifier of a two-party room: lowercased names, smaller first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ChatRoomKey(String);

impl ChatRoomKey {
    /// Wrap a key read back from storage, where it was written canonical.
    pub(crate) fn from_stored(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two participant names in canonical order.
    pub fn participants(&self) -> (&str, &str) {
        // constructed by canonicalize, so exactly one separator is present
        self.0.split_once(SEPARATOR).unwrap_or((self.0.as_str(), ""))
    }

    /// Whether `name` (any case) is one of the two participants.
    pub fn has_participant(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        let (first, second) = self.participants();
        name == first || name == second
    }
}

impl fmt::Display for ChatRoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChatRoomKey {
    type Err = ChatError;

    fn from_str(chat: &str) -> Result<Self, Self::Err> {
        canonicalize(chat)
    }
}

/// Derive the room key for `chat`.
///
/// `chat` must hold exactly one [`SEPARATOR`] with a non-empty name on each
/// side. Self-chats (`a:a`) are allowed.
pub fn canonicalize(chat: &str) -> Result<ChatRoomKey, ChatError> {
    let invalid = || ChatError::InvalidChatFormat(chat.to_owned());

    if chat.matches(SEPARATOR).count() != 1 {
        return Err(invalid());
    }
    let (first, second) = chat.split_once(SEPARATOR).ok_or_else(invalid)?;
    if first.is_empty() || second.is_empty() {
        return Err(invalid());
    }

    let (first, second) = (first.to_lowercase(), second.to_lowercase());
    let (low, high) = if first <= second {
        (first, second)
    } else {
        (second, first)
    };

    Ok(ChatRoomKey(format!("{low}{SEPARATOR}{high}")))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_orders_share_a_key() {
        let ab = canonicalize("alice:bob").unwrap();
        let ba = canonicalize("bob:alice").unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.as_str(), "alice:bob");
    }

    #[test]
    fn case_is_normalized() {
        assert_eq!(canonicalize("Bob:ALICE").unwrap().as_str(), "alice:bob");
        assert_eq!(canonicalize("b:A").unwrap(), canonicalize("a:B").unwrap());
    }

    #[test]
    fn self_chat_is_accepted() {
        let key = canonicalize("User1:user1").unwrap();
        assert_eq!(key.as_str(), "user1:user1");
        assert_eq!(key.participants(), ("user1", "user1"));
    }

    #[test]
    fn wrong_separator_count_is_rejected() {
        for chat in ["user1user2", "a:b:c", "::", "", "a::b"] {
            assert!(
                matches!(canonicalize(chat), Err(ChatError::InvalidChatFormat(_))),
                "{chat:?} should be rejected"
            );
        }
    }

    #[test]
    fn empty_names_are_rejected() {
        for chat in [":bob", "alice:", ":"] {
            assert!(matches!(
                canonicalize(chat),
                Err(ChatError::InvalidChatFormat(_))
            ));
        }
    }

    #[test]
    fn participant_lookup_ignores_case() {
        let key: ChatRoomKey = "a:b".parse().unwrap();
        assert!(key.has_participant("A"));
        assert!(key.has_participant("b"));
        assert!(!key.has_participant("c"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = canonicalize("y:x").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"x:y\"");
    }
}
