use std::sync::Arc;

use bytes::Bytes;
use tracing::warn;

use crate::{
    codec::PayloadCodec,
    connection::ConnectionSupervisor,
    error::AgentError,
    link::{BrokerLink, OutboundMessage, QoS},
};

/// Издатель: кодирует и отправляет сообщения, предварительно убеждаясь
/// в пригодности соединения.
///
/// Отказ брокера (ненулевой код причины подтверждения) — не ошибка Rust:
/// он логируется предупреждением, а вызов возвращает `Ok(false)`. Ошибки
/// кодирования, аргументов и соединения поднимаются к вызывающему.
pub struct Publisher {
    link: Arc<dyn BrokerLink>,
    supervisor: Arc<ConnectionSupervisor>,
}

impl Publisher {
    pub fn new(link: Arc<dyn BrokerLink>, supervisor: Arc<ConnectionSupervisor>) -> Self {
        Self { link, supervisor }
    }

    /// Публикует типизированное значение, закодированное данным кодеком.
    ///
    /// Ошибка кодирования поднимается к вызывающему — в отличие от пути
    /// доставки, где ошибки декодирования изолируются.
    pub async fn publish<C: PayloadCodec>(
        &self,
        topic: &str,
        value: &C::Value,
        codec: &C,
        retain: bool,
        qos: QoS,
    ) -> Result<bool, AgentError> {
        if topic.trim().is_empty() {
            return Err(AgentError::EmptyTopic);
        }
        let payload = codec.encode(value)?;
        self.send(topic, payload, retain, qos).await
    }

    /// Публикует текст как есть, минуя кодек.
    pub async fn publish_text(
        &self,
        topic: &str,
        text: &str,
        retain: bool,
        qos: QoS,
    ) -> Result<bool, AgentError> {
        if topic.trim().is_empty() {
            return Err(AgentError::EmptyTopic);
        }
        self.send(topic, Bytes::copy_from_slice(text.as_bytes()), retain, qos)
            .await
    }

    async fn send(
        &self,
        topic: &str,
        payload: Bytes,
        retain: bool,
        qos: QoS,
    ) -> Result<bool, AgentError> {
        self.supervisor.ensure_connected_for_publish().await?;

        let message = OutboundMessage::new(topic, payload)
            .with_retain(retain)
            .with_qos(qos);
        let ack = self.link.publish(message).await?;
        if !ack.code.is_success() {
            warn!(
                %topic,
                code = ?ack.code,
                reason = ack.reason.as_deref().unwrap_or(""),
                "broker rejected publish"
            );
            return Ok(false);
        }
        Ok(true)
    }
}
