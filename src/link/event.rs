/// Уведомление о жизненном цикле соединения с брокером.
#[derive(Debug, Clone)]
pub enum LinkEvent {
    /// Соединение установлено (в том числе после переподключения).
    Connected,
    /// Соединение потеряно; причина — если брокер или транспорт её сообщили.
    Disconnected { reason: Option<String> },
}
