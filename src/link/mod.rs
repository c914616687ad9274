//! Интерфейс соединения с брокером.
//!
//! Сам проводной протокол (фреймы, пакеты CONNECT/PUBLISH/SUBSCRIBE)
//! реализуется внешним коллаборатором; здесь — только его поверхность:
//!
//! - `ack`: коды подтверждения брокера для публикаций и подписок.
//! - `broker_link`: трейт `BrokerLink`, единственная точка контакта крейта
//!   с реализацией соединения.
//! - `event`: уведомления о жизненном цикле соединения.
//! - `message`: входящие/исходящие сообщения и уровень QoS.

pub mod ack;
pub mod broker_link;
pub mod event;
pub mod message;

pub use ack::{AckCode, PublishAck, SubscribeAck};
pub use broker_link::BrokerLink;
pub use event::LinkEvent;
pub use message::{InboundMessage, OutboundMessage, QoS};
