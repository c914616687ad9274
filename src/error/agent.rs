use thiserror::Error;

use super::{CodecError, ConnectionError, PatternError};

/// Зонтичная ошибка публичного API агента.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("publish/subscribe topic must not be empty")]
    EmptyTopic,

    #[error("subscription '{filter}' is already registered with a different payload type")]
    SubscriptionConflict { filter: String },

    #[error("inbound message stream is already claimed by another hub")]
    InboundAlreadyClaimed,

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),
}
