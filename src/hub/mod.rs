//! Центральный диспетчер входящих сообщений.
//!
//! Хаб — единственный потребитель потока входящих сообщений соединения.
//! Каждое сообщение сопоставляется со всеми зарегистрированными подписками
//! в порядке их регистрации, декодируется по одному разу на подписку и
//! раздаётся веером всем её стокам:
//!
//! - `channel` (приватный): типизированный канал подписки и веер по стокам.
//! - `dispatch`: сам хаб и цикл диспетчеризации.
//! - `message`: конверт доставляемого сообщения.
//! - `sink`: потребительские концы стоков — очередь, вещание, колбэк.

pub(crate) mod channel;
pub mod dispatch;
pub mod message;
pub mod sink;

pub use dispatch::{DispatchHub, DEFAULT_SINK_CAPACITY};
pub use message::MessageArgs;
pub use sink::{BroadcastHandle, BroadcastReader, CallbackGuard, QueueReader};
