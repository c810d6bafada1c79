use serde::Serialize;
use tracing::{debug, error};

use super::{ChatService, PullRequest};
use crate::{error::ChatError, identity::canonicalize, store::Message, store::Order};

/// One page of a room's log, in the requested direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub messages: Vec<Message>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<i64>,
}

impl Page {
    #[cfg(test)]
    pub fn empty() -> Self {
        Self {
            messages: Vec::new(),
            has_more: false,
            next_cursor: None,
        }
    }
}

/// A validated `cursor`/`limit` pair.
///
/// The window asks the store for one record more than `limit`; seeing that
/// extra record is how `has_more` is known without counting the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    cursor: i64,
    limit: i32,
}

impl PageWindow {
    pub fn new(cursor: i64, limit: i32) -> Result<Self, ChatError> {
        if cursor < 0 {
            return Err(ChatError::InvalidCursor(cursor));
        }
        if limit < 0 {
            return Err(ChatError::InvalidLimit(limit));
        }
        // i32::MAX is reserved: limit + 1 has to stay representable
        if limit == i32::MAX {
            return Err(ChatError::LimitTooLarge);
        }
        Ok(Self { cursor, limit })
    }

    /// Offset into the log, counted in the requested direction.
    pub fn offset(&self) -> u64 {
        self.cursor.unsigned_abs()
    }

    /// Records to request from the store.
    pub fn fetch_count(&self) -> u64 {
        u64::from(self.limit.unsigned_abs()) + 1
    }

    /// Turn what the store returned for this window into a page.
    pub fn paginate(&self, mut records: Vec<Message>) -> Page {
        let limit = self.limit.unsigned_abs() as usize;
        if records.len() <= limit {
            return Page {
                messages: records,
                has_more: false,
                next_cursor: None,
            };
        }

        records.truncate(limit);
        Page {
            messages: records,
            has_more: true,
            next_cursor: Some(self.cursor.saturating_add(i64::from(self.limit))),
        }
    }
}

impl ChatService {
    /// Read one page of the room named by `req.chat`.
    ///
    /// `cursor` counts messages from the start of the log (or from the end
    /// when `reverse` is set). It is an offset, so appends between two pulls
    /// can shift page boundaries.
    pub async fn pull(&self, req: PullRequest) -> Result<Page, ChatError> {
        let room = canonicalize(&req.chat).inspect_err(|err| debug!("pull rejected: {err}"))?;
        let window = PageWindow::new(req.cursor, req.limit)
            .inspect_err(|err| debug!(chat = %room, "pull rejected: {err}"))?;
        let order = Order::from_reverse(req.reverse);

        let records = self
            .store
            .range(&room, window.offset(), window.fetch_count(), order)
            .await
            .inspect_err(|err| error!(chat = %room, "range read failed: {err}"))?;

        let page = window.paginate(records);
        debug!(
            chat = %room,
            cursor = req.cursor,
            limit = req.limit,
            reverse = req.reverse,
            returned = page.messages.len(),
            has_more = page.has_more,
            "pulled page"
        );
        Ok(page)
    }
}
