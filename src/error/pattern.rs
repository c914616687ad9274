use thiserror::Error;

/// Ошибка компиляции фильтра темы.
///
/// Возвращается сразу на границе вызова и фатальна только для него.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("topic filter is empty")]
    EmptyFilter,

    #[error("multi-level wildcard '#' is only valid as the final segment: '{0}'")]
    MultiLevelNotLast(String),

    #[error("wildcard must occupy an entire segment: '{0}'")]
    InvalidSegment(String),

    #[error("failed to compile topic pattern: {0}")]
    Regex(#[from] regex::Error),
}
