/// Application code for a successful call.
pub const CODE_OK: i32 = 0;
/// Application code for any rejected request parameter.
pub const CODE_INVALID_PARAM: i32 = 1;
/// Application code for a failed store call.
pub const CODE_STORE_UNAVAILABLE: i32 = 2;

/// Failure of a send or pull operation.
///
/// Every variant except [`ChatError::StoreUnavailable`] is detected before the
/// store is touched.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat `{0}` should be in the form <member1>:<member2>")]
    InvalidChatFormat(String),
    #[error("sender cannot be empty")]
    EmptySender,
    #[error("sender `{sender}` is not a member of chat `{chat}`")]
    SenderNotInChat { sender: String, chat: String },
    #[error("cursor cannot be negative, got {0}")]
    InvalidCursor(i64),
    #[error("limit cannot be negative, got {0}")]
    InvalidLimit(i32),
    #[error("max supported value of limit is {}", i32::MAX - 1)]
    LimitTooLarge,
    #[error("message store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),
}

impl ChatError {
    /// Nonzero application code reported to the caller.
    pub fn code(&self) -> i32 {
        if self.is_validation() {
            CODE_INVALID_PARAM
        } else {
            CODE_STORE_UNAVAILABLE
        }
    }

    /// Whether the request itself was at fault.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<StoreError> for ChatError {
    fn from(err: StoreError) -> Self {
        Self::StoreUnavailable(err)
    }
}

/// Failure reported by a [`MessageStore`](crate::store::MessageStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("store backend error: {0}")]
    Backend(String),
}
