//! Unified error types and result handling.
//!
//! One error enum for the whole crate. Core operations return typed variants
//! (`InvalidAmount`, `WalletNotFound`, ...) that the API layer maps onto HTTP
//! status codes. Price-oracle degradation is deliberately NOT represented
//! here: an unreachable feed degrades to "price unavailable" inside
//! [`crate::pricing`] and never fails a ledger write.

use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration problem (missing setting, unreadable file)
    #[error("Configuration error: {message}")]
    Config {
        /// Description of what is wrong
        message: String,
    },

    /// Transaction amount is non-finite or not strictly positive
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Transaction kind string is not one of the five valid kinds
    #[error("Invalid transaction kind: {value}")]
    InvalidTransactionKind {
        /// The rejected kind string
        value: String,
    },

    /// No wallet with the given id
    #[error("Wallet not found: {id}")]
    WalletNotFound {
        /// The wallet id that was looked up
        id: i64,
    },

    /// No transaction with the given id in the given wallet
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// The transaction id that was looked up
        id: i64,
    },

    /// No user with the given id or subject
    #[error("User not found: {id}")]
    UserNotFound {
        /// The user id or auth subject that was looked up
        id: String,
    },

    /// Referral code is already taken by another user
    #[error("Referral code already exists: {code}")]
    DuplicateReferralCode {
        /// The conflicting code
        code: String,
    },

    /// Admin credentials or token rejected
    #[error("Authentication failed")]
    Unauthorized,

    /// Database error from SeaORM
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// JWT encode/decode error
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        use axum::response::IntoResponse as _;

        let (status, message) = match &self {
            Self::InvalidAmount { .. }
            | Self::InvalidTransactionKind { .. }
            | Self::Config { .. } => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::DuplicateReferralCode { .. } => {
                (StatusCode::BAD_REQUEST, "Referral code already exists".to_string())
            }
            Self::WalletNotFound { .. }
            | Self::TransactionNotFound { .. }
            | Self::UserNotFound { .. } => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Unauthorized | Self::Token(_) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            // Everything unexpected stays opaque to the caller.
            Self::Database(e) => {
                tracing::error!("database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            Self::Io(_) | Self::EnvVar(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = axum::Json(serde_json::json!({ "error": message }));
        (status, body).into_response()
    }
}
