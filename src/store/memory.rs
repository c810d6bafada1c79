use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Message, MessageStore, Order, now_nanos};
use crate::{error::StoreError, identity::ChatRoomKey};

/// In-process store keeping each room's log as a vector in arrival order.
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    rooms: RwLock<HashMap<ChatRoomKey, Vec<Message>>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn append(
        &self,
        room: &ChatRoomKey,
        sender: &str,
        text: &str,
    ) -> Result<i64, StoreError> {
        let mut rooms = self.rooms.write().await;
        let log = rooms.entry(room.clone()).or_default();

        // keep send_time non-decreasing within the room even if the clock steps back
        let send_time = match log.last() {
            Some(last) => now_nanos().max(last.send_time),
            None => now_nanos(),
        };

        log.push(Message {
            id: Uuid::now_v7(),
            chat: room.clone(),
            sender: sender.to_owned(),
            text: text.to_owned(),
            send_time,
        });
        Ok(send_time)
    }

    async fn range(
        &self,
        room: &ChatRoomKey,
        offset: u64,
        count: u64,
        order: Order,
    ) -> Result<Vec<Message>, StoreError> {
        let rooms = self.rooms.read().await;
        let Some(log) = rooms.get(room) else {
            return Ok(Vec::new());
        };

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let count = usize::try_from(count).unwrap_or(usize::MAX);

        let messages = match order {
            Order::Ascending => log.iter().skip(offset).take(count).cloned().collect(),
            Order::Descending => log.iter().rev().skip(offset).take(count).cloned().collect(),
        };
        Ok(messages)
    }
}
