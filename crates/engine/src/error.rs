//! The module contains the errors the engine can throw.
//!
//! Domain conflicts:
//!
//! - [`NoSuchRequest`] there is no one-sided request to act on.
//! - [`AlreadySent`] / [`HasIncomingRequest`] a relation already exists.
//! - [`NotAFriend`] the pair is not mutual.
//! - [`ExpenseNotFound`] / [`NotYourExpense`] ledger lookups and authorization.
//!
//! Everything coming from the store is wrapped in [`Database`] and reported as
//! [`ErrorCode::Internal`]. A compensation that fails is reported as
//! [`RollbackFailed`], never swallowed.
//!
//!  [`NoSuchRequest`]: EngineError::NoSuchRequest
//!  [`AlreadySent`]: EngineError::AlreadySent
//!  [`HasIncomingRequest`]: EngineError::HasIncomingRequest
//!  [`NotAFriend`]: EngineError::NotAFriend
//!  [`ExpenseNotFound`]: EngineError::ExpenseNotFound
//!  [`NotYourExpense`]: EngineError::NotYourExpense
//!  [`Database`]: EngineError::Database
//!  [`RollbackFailed`]: EngineError::RollbackFailed
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No pending friend request: {0}")]
    NoSuchRequest(String),
    #[error("Friend request already sent: {0}")]
    AlreadySent(String),
    #[error("Incoming friend request pending: {0}")]
    HasIncomingRequest(String),
    #[error("Not a friend: {0}")]
    NotAFriend(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("\"{0}\" expense not found!")]
    ExpenseNotFound(String),
    #[error("Not your expense: {0}")]
    NotYourExpense(String),
    #[error("Invalid expense: {0}")]
    InvalidExpense(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Corrupt row: {0}")]
    CorruptRow(String),
    #[error("Compensation misuse: {0}")]
    Compensation(String),
    #[error("Rollback failed: {0}")]
    RollbackFailed(#[source] Box<EngineError>),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Stable code exposed to the request-handling layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NoSuchRequest,
    AlreadySent,
    HasIncomingRequest,
    NotAFriend,
    InvalidRequest,
    ExpenseNotFound,
    NotYourExpense,
    InvalidExpense,
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoSuchRequest => "no_such_request",
            Self::AlreadySent => "already_sent",
            Self::HasIncomingRequest => "has_incoming_request",
            Self::NotAFriend => "not_a_friend",
            Self::InvalidRequest => "invalid_request",
            Self::ExpenseNotFound => "expense_not_found",
            Self::NotYourExpense => "not_your_expense",
            Self::InvalidExpense => "invalid_expense",
            Self::Internal => "internal",
        }
    }
}

impl EngineError {
    /// Maps the error onto the code surfaced to callers.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NoSuchRequest(_) => ErrorCode::NoSuchRequest,
            Self::AlreadySent(_) => ErrorCode::AlreadySent,
            Self::HasIncomingRequest(_) => ErrorCode::HasIncomingRequest,
            Self::NotAFriend(_) => ErrorCode::NotAFriend,
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::ExpenseNotFound(_) => ErrorCode::ExpenseNotFound,
            Self::NotYourExpense(_) => ErrorCode::NotYourExpense,
            Self::InvalidExpense(_) => ErrorCode::InvalidExpense,
            Self::InvalidId(_)
            | Self::CorruptRow(_)
            | Self::Compensation(_)
            | Self::RollbackFailed(_)
            | Self::Database(_) => ErrorCode::Internal,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.code() == ErrorCode::Internal
    }

    pub(crate) fn rollback_failed(err: EngineError) -> Self {
        match err {
            already @ Self::RollbackFailed(_) => already,
            other => Self::RollbackFailed(Box::new(other)),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NoSuchRequest(a), Self::NoSuchRequest(b)) => a == b,
            (Self::AlreadySent(a), Self::AlreadySent(b)) => a == b,
            (Self::HasIncomingRequest(a), Self::HasIncomingRequest(b)) => a == b,
            (Self::NotAFriend(a), Self::NotAFriend(b)) => a == b,
            (Self::InvalidRequest(a), Self::InvalidRequest(b)) => a == b,
            (Self::ExpenseNotFound(a), Self::ExpenseNotFound(b)) => a == b,
            (Self::NotYourExpense(a), Self::NotYourExpense(b)) => a == b,
            (Self::InvalidExpense(a), Self::InvalidExpense(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::CorruptRow(a), Self::CorruptRow(b)) => a == b,
            (Self::Compensation(a), Self::Compensation(b)) => a == b,
            (Self::RollbackFailed(a), Self::RollbackFailed(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
