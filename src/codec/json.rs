use std::marker::PhantomData;

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

use super::PayloadCodec;
use crate::error::CodecError;

/// Структурированный кодек: JSON через serde по статически известному типу.
///
/// Тип играет роль дескриптора схемы; рефлексия во время выполнения не
/// нужна. Для строковых нагрузок используйте [`TextCodec`] или
/// `publish_text` — `JsonCodec<String>` закавычит строку как JSON-литерал.
///
/// [`TextCodec`]: super::TextCodec
#[derive(Debug)]
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> PayloadCodec for JsonCodec<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Value = T;

    fn decode(&self, payload: &[u8]) -> Result<Self::Value, CodecError> {
        Ok(serde_json::from_slice(payload)?)
    }

    fn encode(&self, value: &Self::Value) -> Result<Bytes, CodecError> {
        Ok(Bytes::from(serde_json::to_vec(value)?))
    }
}
