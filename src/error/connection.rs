use thiserror::Error;

/// Ошибка соединения с брокером.
///
/// Первоначальный `connect` и одноразовое переподключение перед публикацией
/// возвращают её вызывающему; фоновые попытки переподключения её только
/// логируют и повторяются бесконечно.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("failed to connect to broker: {reason}")]
    ConnectFailed { reason: String },

    #[error("broker transport error: {reason}")]
    Transport { reason: String },

    #[error("not connected to broker")]
    NotConnected,

    #[error("connection has been disposed")]
    Disposed,
}
