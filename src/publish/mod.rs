//! Исходящий путь: публикация с гарантией живого соединения.

pub mod publisher;

pub use publisher::Publisher;
