//! Кодеки полезной нагрузки.
//!
//! Кодек выбирается один раз на подписку или публикацию по объявленной
//! форме полезной нагрузки:
//!
//! - `raw`: сырые байты, тождественное преобразование.
//! - `text`: UTF-8 текст.
//! - `json`: структурированная сериализация через serde по статически
//!   известному типу (рефлексия не требуется).

pub mod json;
pub mod raw;
pub mod text;

use bytes::Bytes;

use crate::error::CodecError;

pub use json::JsonCodec;
pub use raw::RawCodec;
pub use text::TextCodec;

/// Пара функций кодирования/декодирования для одной формы полезной нагрузки.
///
/// Декодирование вызывается хабом один раз на подписку для каждого
/// подходящего входящего сообщения; кодирование — издателем перед отправкой.
pub trait PayloadCodec: Send + Sync + 'static {
    /// Типизированное значение в памяти.
    ///
    /// `Clone` нужен для веера: одно декодированное значение раздаётся
    /// нескольким стокам подписки.
    type Value: Clone + Send + Sync + 'static;

    /// Декодирует байты проводного представления.
    fn decode(&self, payload: &[u8]) -> Result<Self::Value, CodecError>;

    /// Кодирует значение в байты проводного представления.
    fn encode(&self, value: &Self::Value) -> Result<Bytes, CodecError>;
}
