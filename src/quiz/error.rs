use thiserror::Error;

use crate::quiz::store::StoreError;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("no previous question found for user {user_id}")]
    MissingPriorQuestion { user_id: String },
    #[error("invalid {kind}: {value}")]
    InvalidDomainValue { kind: &'static str, value: String },
    #[error("record store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    #[error("corrupt user record: {0}")]
    CorruptRecord(String),
}
