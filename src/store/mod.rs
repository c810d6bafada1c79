//! Per-room append-only message logs.

mod memory;
mod sqlite;

pub use memory::MemoryMessageStore;
pub use sqlite::SqliteMessageStore;

use async_trait::async_trait;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{error::StoreError, identity::ChatRoomKey};

/// A message as it sits in a room's log. Never mutated after append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub chat: ChatRoomKey,
    pub sender: String,
    pub text: String,
    /// Unix time in nanoseconds, assigned by the store.
    pub send_time: i64,
}

/// Direction of a range read over a room's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Earliest `send_time` first.
    Ascending,
    /// Latest `send_time` first; the exact reverse of [`Order::Ascending`].
    Descending,
}

impl Order {
    pub fn from_reverse(reverse: bool) -> Self {
        if reverse {
            Self::Descending
        } else {
            Self::Ascending
        }
    }
}

/// Storage behind send and pull.
///
/// Implementations serialize appends to the same room, so concurrent appends
/// land in some total order without lost writes. Reads follow insertion
/// order in both directions, and an assigned `send_time` is never below the
/// latest one already in the room.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a message to `room` and return its assigned `send_time`.
    async fn append(&self, room: &ChatRoomKey, sender: &str, text: &str)
    -> Result<i64, StoreError>;

    /// Up to `count` messages of `room`, skipping the first `offset` in `order`.
    async fn range(
        &self,
        room: &ChatRoomKey,
        offset: u64,
        count: u64,
        order: Order,
    ) -> Result<Vec<Message>, StoreError>;
}

pub(crate) fn now_nanos() -> i64 {
    i64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos()).unwrap_or(i64::MAX)
}
