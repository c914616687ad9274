use std::fmt;

/// Состояние соединения с брокером.
///
/// Переходы: `Disconnected → Connecting → Connected`; неожиданный обрыв
/// переводит в `Reconnecting`, откуда попытки ведут обратно в `Connected`.
/// `Disposed` терминально: дальнейшие переходы не принимаются.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Disposed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Disposed => "disposed",
        };
        f.write_str(name)
    }
}
