use bytes::Bytes;

/// Уровень гарантии доставки, согласуемый с брокером.
///
/// Передаётся брокеру как есть; крейт не реализует семантику QoS сам.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QoS {
    /// Не более одного раза (0).
    #[default]
    AtMostOnce,
    /// Не менее одного раза (1).
    AtLeastOnce,
    /// Ровно один раз (2).
    ExactlyOnce,
}

impl QoS {
    /// Числовое значение уровня для проводного протокола.
    pub fn as_u8(self) -> u8 {
        match self {
            QoS::AtMostOnce => 0,
            QoS::AtLeastOnce => 1,
            QoS::ExactlyOnce => 2,
        }
    }

    /// Обратное преобразование из числового уровня.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(QoS::AtMostOnce),
            1 => Some(QoS::AtLeastOnce),
            2 => Some(QoS::ExactlyOnce),
            _ => None,
        }
    }
}

/// Входящее прикладное сообщение, произведённое соединением с брокером.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub topic: String,
    /// Байты полезной нагрузки; могут быть пустыми.
    pub payload: Bytes,
    pub qos: QoS,
    pub retain: bool,
}

/// Исходящее сообщение для публикации через соединение.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: Bytes,
    pub qos: QoS,
    pub retain: bool,
}

impl OutboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            qos: QoS::default(),
            retain: false,
        }
    }

    pub fn with_retain(mut self, retain: bool) -> Self {
        self.retain = retain;
        self
    }

    pub fn with_qos(mut self, qos: QoS) -> Self {
        self.qos = qos;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет преобразование уровней QoS в числа и обратно.
    #[test]
    fn test_qos_roundtrip() {
        for qos in [QoS::AtMostOnce, QoS::AtLeastOnce, QoS::ExactlyOnce] {
            assert_eq!(QoS::from_u8(qos.as_u8()), Some(qos));
        }
        assert_eq!(QoS::from_u8(3), None);
    }

    /// Тест проверяет построение исходящего сообщения с флагами.
    #[test]
    fn test_outbound_builder() {
        let msg = OutboundMessage::new("sensors/temp", Bytes::from_static(b"25.5"))
            .with_retain(true)
            .with_qos(QoS::AtLeastOnce);
        assert_eq!(msg.topic, "sensors/temp");
        assert_eq!(msg.payload, Bytes::from_static(b"25.5"));
        assert!(msg.retain);
        assert_eq!(msg.qos, QoS::AtLeastOnce);
    }

    /// Тест проверяет, что пустая полезная нагрузка допустима.
    #[test]
    fn test_empty_payload() {
        let msg = OutboundMessage::new("t", Bytes::new());
        assert!(msg.payload.is_empty());
    }
}
