use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Any failure inside the document store, wrapped with operation context.
    #[error("store operation failed: {0}")]
    Store(String),

    #[error("{kind} with id <{id}> already exists")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("{kind} with id <{id}> not found")]
    NotFound { kind: &'static str, id: String },

    /// The message source could not be reached or returned garbage.
    #[error("message source error: {0}")]
    Source(String),

    /// The bot send capability rejected a message.
    #[error("delivery failed: {0}")]
    Delivery(String),
}
