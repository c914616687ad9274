use regex::Regex;
use tracing::trace;

use crate::error::PatternError;

/// Разделитель сегментов темы.
pub const DELIMITER: char = '/';

/// Одноуровневый подстановочный сегмент: ровно один сегмент любого содержимого.
const SINGLE_LEVEL: &str = "+";

/// Многоуровневый подстановочный сегмент: остаток темы, включая пустой.
const MULTI_LEVEL: &str = "#";

/// Скомпилированный сопоставитель фильтра темы.
///
/// Чистая функция `matches(topic) -> bool`; тема сопоставляется целиком,
/// частичное/префиксное совпадение не считается совпадением. Приоритета
/// между пересекающимися фильтрами нет — это забота диспетчера.
#[derive(Debug, Clone)]
pub struct TopicMatcher {
    filter: String,
    pattern: Regex,
}

impl TopicMatcher {
    /// Компилирует фильтр в сопоставитель.
    ///
    /// # Ошибки
    /// - `EmptyFilter` для пустой строки
    /// - `MultiLevelNotLast`, если `#` встречается не последним сегментом
    /// - `InvalidSegment`, если `+`/`#` смешаны с литералами в одном сегменте
    pub fn compile(filter: &str) -> Result<Self, PatternError> {
        if filter.is_empty() {
            return Err(PatternError::EmptyFilter);
        }

        // Отделяем хвостовой '#': он покрывает остаток темы,
        // включая ноль дальнейших сегментов.
        let (head, tail_multi) = if filter == MULTI_LEVEL {
            (None, true)
        } else if let Some(prefix) = filter.strip_suffix("/#") {
            (Some(prefix), true)
        } else {
            (Some(filter), false)
        };

        let mut pattern = String::from("^");
        if let Some(head) = head {
            let segments = head
                .split(DELIMITER)
                .map(|segment| Self::translate_segment(filter, segment))
                .collect::<Result<Vec<_>, _>>()?;
            pattern.push_str(&segments.join("/"));
        }
        if tail_multi {
            match head {
                Some(_) => pattern.push_str("(?:/.*)?"),
                None => pattern.push_str(".*"),
            }
        }
        pattern.push('$');

        trace!("build topic match pattern '{filter}' => '{pattern}'");
        Ok(Self {
            filter: filter.to_string(),
            pattern: Regex::new(&pattern)?,
        })
    }

    /// Переводит один сегмент фильтра в фрагмент регулярного выражения.
    fn translate_segment(filter: &str, segment: &str) -> Result<String, PatternError> {
        if segment == SINGLE_LEVEL {
            return Ok("[^/]+".to_string());
        }
        if segment.contains(MULTI_LEVEL) {
            // '#' внутри головы фильтра: либо не последний сегмент,
            // либо смешан с литералами.
            return Err(PatternError::MultiLevelNotLast(filter.to_string()));
        }
        if segment.contains(SINGLE_LEVEL) {
            return Err(PatternError::InvalidSegment(filter.to_string()));
        }
        Ok(regex::escape(segment))
    }

    /// Проверяет, подходит ли тема под фильтр.
    pub fn matches(&self, topic: &str) -> bool {
        self.pattern.is_match(topic)
    }

    /// Исходная строка фильтра.
    pub fn filter(&self) -> &str {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет, что литеральный фильтр совпадает только
    /// со своей темой.
    #[test]
    fn test_literal_filter_exact_match() {
        let m = TopicMatcher::compile("home/kitchen/temp").unwrap();
        assert!(m.matches("home/kitchen/temp"));
        assert!(!m.matches("home/kitchen"));
        assert!(!m.matches("home/kitchen/temp/extra"));
        assert!(!m.matches("home/kitchen/temperature"));
        assert!(!m.matches("xhome/kitchen/temp"));
    }

    /// Тест проверяет семантику одноуровневого подстановочного сегмента.
    #[test]
    fn test_single_level_wildcard() {
        let m = TopicMatcher::compile("a/+/c").unwrap();
        assert!(m.matches("a/b/c"));
        assert!(!m.matches("a/b/x/c"));
        assert!(!m.matches("a/c"));
    }

    /// Тест проверяет, что `#` покрывает и ноль дальнейших сегментов.
    #[test]
    fn test_multi_level_wildcard() {
        let m = TopicMatcher::compile("a/#").unwrap();
        assert!(m.matches("a"));
        assert!(m.matches("a/b"));
        assert!(m.matches("a/b/c"));
        assert!(!m.matches("b"));
        assert!(!m.matches("ab"));
    }

    /// Тест проверяет фильтр из одного `#`.
    #[test]
    fn test_bare_multi_level() {
        let m = TopicMatcher::compile("#").unwrap();
        assert!(m.matches("a"));
        assert!(m.matches("a/b/c"));
    }

    /// Тест проверяет, что символы-метазнаки regex в фильтре
    /// трактуются литерально.
    #[test]
    fn test_regex_metacharacters_are_literal() {
        let m = TopicMatcher::compile("stats/cpu.load").unwrap();
        assert!(m.matches("stats/cpu.load"));
        assert!(!m.matches("stats/cpuxload"));
    }

    /// Тест проверяет, что частичное совпадение темы не засчитывается.
    #[test]
    fn test_no_prefix_match() {
        let m = TopicMatcher::compile("a/b").unwrap();
        assert!(!m.matches("a/b/c"));
        assert!(!m.matches("a"));
    }

    /// Тест проверяет отказ при некорректных фильтрах.
    #[test]
    fn test_invalid_filters() {
        assert!(matches!(
            TopicMatcher::compile(""),
            Err(PatternError::EmptyFilter)
        ));
        assert!(matches!(
            TopicMatcher::compile("a/#/b"),
            Err(PatternError::MultiLevelNotLast(_))
        ));
        assert!(matches!(
            TopicMatcher::compile("a#"),
            Err(PatternError::MultiLevelNotLast(_))
        ));
        assert!(matches!(
            TopicMatcher::compile("a/b+c"),
            Err(PatternError::InvalidSegment(_))
        ));
    }

    /// Тест проверяет, что независимо скомпилированные пересекающиеся
    /// фильтры оба совпадают с одной темой.
    #[test]
    fn test_overlapping_filters_both_match() {
        let plus = TopicMatcher::compile("x/+").unwrap();
        let hash = TopicMatcher::compile("x/#").unwrap();
        assert!(plus.matches("x/y"));
        assert!(hash.matches("x/y"));
    }
}
