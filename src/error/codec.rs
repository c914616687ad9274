use thiserror::Error;

/// Ошибка кодека полезной нагрузки.
///
/// В пути доставки (хаб) ошибка декодирования изолируется: сообщение
/// отбрасывается только для той подписки, где декодирование не удалось.
/// В пути публикации ошибка кодирования поднимается к вызывающему.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("JSON (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
