use bytes::Bytes;

use super::PayloadCodec;
use crate::error::CodecError;

/// Текстовый кодек: UTF-8 в обе стороны.
///
/// Пустая нагрузка декодируется в пустую строку, а не в отсутствие
/// значения; пустая строка кодируется в ноль байтов.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl PayloadCodec for TextCodec {
    type Value = String;

    fn decode(&self, payload: &[u8]) -> Result<Self::Value, CodecError> {
        Ok(String::from_utf8(payload.to_vec())?)
    }

    fn encode(&self, value: &Self::Value) -> Result<Bytes, CodecError> {
        Ok(Bytes::copy_from_slice(value.as_bytes()))
    }
}
