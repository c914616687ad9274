use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

fn default_clean_session() -> bool {
    true
}

fn default_keep_alive() -> u64 {
    60
}

/// Параметры соединения с брокером.
///
/// Передаются реализации [`BrokerLink`] при каждой попытке соединения;
/// супервизор хранит последние использованные параметры и повторяет их
/// при переподключении.
///
/// [`BrokerLink`]: crate::link::BrokerLink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectOptions {
    /// Адрес брокера, например `mqtt://localhost:1883`.
    pub server_uri: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Начинать ли сессию с чистого листа (по умолчанию — да).
    #[serde(default = "default_clean_session")]
    pub clean_session: bool,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,
}

impl ConnectOptions {
    pub fn new(server_uri: impl Into<String>) -> Self {
        Self {
            server_uri: server_uri.into(),
            username: None,
            password: None,
            clean_session: default_clean_session(),
            client_id: None,
            keep_alive_secs: default_keep_alive(),
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Загружает параметры из переменных окружения с префиксом `TOPICBUS_`.
    pub fn load() -> Result<Self, ConfigError> {
        let cfg = Config::builder()
            // Значения по умолчанию
            .set_default("clean_session", true)?
            .set_default("keep_alive_secs", 60)?
            // Переменные окружения с префиксом TOPICBUS_
            .add_source(Environment::with_prefix("TOPICBUS"))
            .build()?;

        // Десериализуем конфигурацию в нашу структуру
        cfg.try_deserialize()
    }
}
