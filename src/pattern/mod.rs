//! Компиляция фильтров тем в сопоставители.
//!
//! Фильтр — строка с сегментами через `/`; `+` замещает ровно один сегмент,
//! `#` (только в конце) — остаток темы, включая ноль сегментов. Компиляция
//! детерминирована и чиста: один [`TopicMatcher`] на каждую уникальную
//! строку фильтра.

pub mod matcher;

pub use matcher::{TopicMatcher, DELIMITER};
