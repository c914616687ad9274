use bytes::Bytes;

use super::PayloadCodec;
use crate::error::CodecError;

/// Кодек сырых байтов: полезная нагрузка передаётся как есть.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl PayloadCodec for RawCodec {
    type Value = Bytes;

    fn decode(&self, payload: &[u8]) -> Result<Self::Value, CodecError> {
        Ok(Bytes::copy_from_slice(payload))
    }

    fn encode(&self, value: &Self::Value) -> Result<Bytes, CodecError> {
        Ok(value.clone())
    }
}
