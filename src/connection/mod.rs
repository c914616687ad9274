//! Надзор за соединением с брокером.
//!
//! Супервизор — единственная точка истины о живости соединения:
//!
//! - `state`: машина состояний соединения.
//! - `supervisor`: владелец дескриптора соединения и набора отслеживаемых
//!   фильтров; автоматическое восстановление после обрыва.

pub mod state;
pub mod supervisor;

pub use state::ConnectionState;
pub use supervisor::{ConnectionSupervisor, RECONNECT_DELAY};
