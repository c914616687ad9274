/// Конверт доставляемого сообщения: тема плюс декодированное значение.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageArgs<T> {
    /// Фактическая тема, на которую пришло сообщение (не фильтр подписки).
    pub topic: String,
    pub payload: T,
}

impl<T> MessageArgs<T> {
    pub fn new(topic: impl Into<String>, payload: T) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }
}
