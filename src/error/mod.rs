//! Типы ошибок крейта.
//!
//! Каждая область имеет собственный enum на базе `thiserror`:
//!
//! - `agent`: зонтичная ошибка публичного API.
//! - `codec`: ошибки кодирования/декодирования полезной нагрузки.
//! - `connection`: ошибки соединения с брокером.
//! - `pattern`: ошибки компиляции фильтров тем.
//! - `pubsub`: ошибки получения сообщений из широковещательных подписок.

pub mod agent;
pub mod codec;
pub mod connection;
pub mod pattern;
pub mod pubsub;

pub use agent::AgentError;
pub use codec::CodecError;
pub use connection::ConnectionError;
pub use pattern::PatternError;
pub use pubsub::{RecvError, TryRecvError};
