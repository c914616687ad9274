/// Код причины из подтверждения брокера.
///
/// Ненулевые коды передаются как есть; их трактовка зависит от протокола
/// брокера.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckCode {
    Success,
    Failure(u8),
}

impl AckCode {
    pub fn is_success(self) -> bool {
        matches!(self, AckCode::Success)
    }
}

/// Подтверждение публикации.
#[derive(Debug, Clone)]
pub struct PublishAck {
    pub code: AckCode,
    /// Человекочитаемое пояснение брокера, если он его прислал.
    pub reason: Option<String>,
}

impl PublishAck {
    pub fn success() -> Self {
        Self {
            code: AckCode::Success,
            reason: None,
        }
    }
}

/// Пофильтровый результат подписки.
#[derive(Debug, Clone)]
pub struct SubscribeAck {
    pub filter: String,
    pub code: AckCode,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет распознавание успешного кода.
    #[test]
    fn test_ack_code_success() {
        assert!(AckCode::Success.is_success());
        assert!(!AckCode::Failure(135).is_success());
    }

    /// Тест проверяет конструктор успешного подтверждения публикации.
    #[test]
    fn test_publish_ack_success() {
        let ack = PublishAck::success();
        assert!(ack.code.is_success());
        assert!(ack.reason.is_none());
    }
}
