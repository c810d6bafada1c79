use async_trait::async_trait;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use uuid::Uuid;

use super::{Message, MessageStore, Order, now_nanos};
use crate::{error::StoreError, identity::ChatRoomKey};

// send_time never drops below the room's latest, so seq order is also send_time order
const INSERT: &str = "INSERT INTO messages (id, chat, sender, text, send_time)
     SELECT ?, ?, ?, ?, MAX(?, COALESCE((SELECT MAX(send_time) FROM messages WHERE chat = ?), 0))
     RETURNING send_time";

const SELECT_ASC: &str = "SELECT id, chat, sender, text, send_time FROM messages
     WHERE chat = ?
     ORDER BY seq ASC
     LIMIT ? OFFSET ?";

const SELECT_DESC: &str = "SELECT id, chat, sender, text, send_time FROM messages
     WHERE chat = ?
     ORDER BY seq DESC
     LIMIT ? OFFSET ?";

/// SQLite-backed store, one row per message.
pub struct SqliteMessageStore {
    pool: SqlitePool,
}

impl SqliteMessageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool on `url` and make sure the schema exists.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Self::init(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Create the messages table and its index if missing.
    pub async fn init(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS messages (
                seq       INTEGER PRIMARY KEY AUTOINCREMENT,
                id        TEXT    NOT NULL UNIQUE,
                chat      TEXT    NOT NULL,
                sender    TEXT    NOT NULL,
                text      TEXT    NOT NULL,
                send_time INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_chat_seq
             ON messages (chat, seq)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn append(
        &self,
        room: &ChatRoomKey,
        sender: &str,
        text: &str,
    ) -> Result<i64, StoreError> {
        let (send_time,): (i64,) = sqlx::query_as(INSERT)
            .bind(Uuid::now_v7().to_string())
            .bind(room.as_str())
            .bind(sender)
            .bind(text)
            .bind(now_nanos())
            .bind(room.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(send_time)
    }

    async fn range(
        &self,
        room: &ChatRoomKey,
        offset: u64,
        count: u64,
        order: Order,
    ) -> Result<Vec<Message>, StoreError> {
        let sql = match order {
            Order::Ascending => SELECT_ASC,
            Order::Descending => SELECT_DESC,
        };

        let rows: Vec<(String, String, String, String, i64)> = sqlx::query_as(sql)
            .bind(room.as_str())
            .bind(i64::try_from(count).unwrap_or(i64::MAX))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|(id, chat, sender, text, send_time)| {
                let id = Uuid::parse_str(&id)
                    .map_err(|e| StoreError::Backend(format!("bad message id {id}: {e}")))?;
                Ok(Message {
                    id,
                    chat: ChatRoomKey::from_stored(chat),
                    sender,
                    text,
                    send_time,
                })
            })
            .collect()
    }
}
