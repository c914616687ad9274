use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::{sync::broadcast, task::JoinHandle, time::sleep};
use tracing::{debug, info, warn};

use super::ConnectionState;
use crate::{
    config::ConnectOptions,
    error::ConnectionError,
    link::{BrokerLink, LinkEvent},
};

/// Задержка между фоновыми попытками переподключения.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Супервизор соединения с брокером.
///
/// Эксклюзивно владеет дескриптором соединения и набором отслеживаемых
/// фильтров. Декоратор в виде явной композиции: держит внутренний
/// [`BrokerLink`] и дополняет его поведение, не переэкспортируя события.
///
/// Семантика отказов:
/// - первоначальный `connect` фатален для вызывающего и не повторяется;
/// - фоновые переподключения логируются и повторяются бесконечно с
///   фиксированной задержкой, без увеличения интервала;
/// - одноразовое переподключение перед публикацией фатально только для
///   той публикации.
pub struct ConnectionSupervisor {
    link: Arc<dyn BrokerLink>,
    state: Mutex<ConnectionState>,
    /// Фильтры, которые должны быть подписаны на брокере; воспроизводятся
    /// дословно после каждого успешного переподключения.
    tracked: DashMap<String, ()>,
    /// Последние использованные параметры соединения.
    options: Mutex<Option<ConnectOptions>>,
    reconnect_delay: Duration,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionSupervisor {
    pub fn new(link: Arc<dyn BrokerLink>) -> Arc<Self> {
        Self::with_reconnect_delay(link, RECONNECT_DELAY)
    }

    /// Создаёт супервизор с нестандартной задержкой переподключения.
    pub fn with_reconnect_delay(link: Arc<dyn BrokerLink>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            link,
            state: Mutex::new(ConnectionState::Disconnected),
            tracked: DashMap::new(),
            options: Mutex::new(None),
            reconnect_delay: delay,
            watcher: Mutex::new(None),
        })
    }

    /// Первая попытка соединения.
    ///
    /// Блокирует до завершения попытки; при неудаче возвращает
    /// [`ConnectionError`] и не повторяет — решение о повторе за
    /// вызывающим. При успехе запускает наблюдателя жизненного цикла.
    pub async fn connect(self: &Arc<Self>, options: ConnectOptions) -> Result<(), ConnectionError> {
        if self.state() == ConnectionState::Disposed {
            return Err(ConnectionError::Disposed);
        }
        if options.server_uri.is_empty() {
            return Err(ConnectionError::ConnectFailed {
                reason: "server_uri is not set".to_string(),
            });
        }

        *self.state.lock() = ConnectionState::Connecting;
        *self.options.lock() = Some(options.clone());

        // Приёмник событий берём до попытки, чтобы не пропустить ранний обрыв.
        let events = self.link.lifecycle();

        debug!("connecting to {}", options.server_uri);
        if let Err(err) = self.link.connect(&options).await {
            *self.state.lock() = ConnectionState::Disconnected;
            return Err(err);
        }
        *self.state.lock() = ConnectionState::Connected;
        debug!("connection established with {}", options.server_uri);

        let mut watcher = self.watcher.lock();
        if watcher.is_none() {
            *watcher = Some(tokio::spawn(Arc::clone(self).run_watcher(events)));
        }
        Ok(())
    }

    /// Гарантирует живое соединение перед публикацией.
    ///
    /// Если соединение на месте — ничего не делает; иначе ровно одна
    /// попытка переподключения с последними параметрами. Неудача фатальна
    /// только для этой публикации.
    pub async fn ensure_connected_for_publish(&self) -> Result<(), ConnectionError> {
        if self.state() == ConnectionState::Disposed {
            return Err(ConnectionError::Disposed);
        }
        if self.link.is_connected() {
            return Ok(());
        }
        let options = self
            .options
            .lock()
            .clone()
            .ok_or(ConnectionError::NotConnected)?;
        info!("reconnecting to broker {} before publish", options.server_uri);
        self.link.connect(&options).await?;
        *self.state.lock() = ConnectionState::Connected;
        Ok(())
    }

    /// Добавляет фильтр в отслеживаемый набор.
    ///
    /// При живом соединении сперва выполняется подписка на брокере;
    /// фильтр попадает в набор только после её подтверждения, так что
    /// отменённый на полпути вызов не оставляет мусора. Пофильтровые
    /// отказы брокера логируются и не фатальны. Без соединения фильтр
    /// записывается сразу и будет воспроизведён при переподключении.
    pub async fn track(&self, filter: &str) -> Result<(), ConnectionError> {
        if self.state() == ConnectionState::Disposed {
            return Err(ConnectionError::Disposed);
        }
        if self.link.is_connected() {
            let acks = self.link.subscribe(&[filter.to_string()]).await?;
            for ack in &acks {
                if ack.code.is_success() {
                    info!(filter = %ack.filter, "subscribed");
                } else {
                    warn!(filter = %ack.filter, code = ?ack.code, "broker rejected subscribe");
                }
            }
        }
        self.tracked.insert(filter.to_string(), ());
        Ok(())
    }

    /// Убирает фильтр из отслеживаемого набора и с брокера.
    pub async fn untrack(&self, filter: &str) -> Result<(), ConnectionError> {
        self.tracked.remove(filter);
        if self.link.is_connected() {
            self.link.unsubscribe(&[filter.to_string()]).await?;
        }
        Ok(())
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    /// Снимок отслеживаемых фильтров (порядок произвольный).
    pub fn tracked_filters(&self) -> Vec<String> {
        self.tracked.iter().map(|e| e.key().clone()).collect()
    }

    /// Терминальное завершение: останавливает наблюдателя и закрывает
    /// соединение. Повторный вызов — no-op.
    pub async fn dispose(&self) {
        {
            let mut state = self.state.lock();
            if *state == ConnectionState::Disposed {
                return;
            }
            *state = ConnectionState::Disposed;
        }
        if let Some(handle) = self.watcher.lock().take() {
            handle.abort();
        }
        if let Err(err) = self.link.disconnect().await {
            debug!(%err, "disconnect during dispose failed");
        }
    }

    /// Наблюдатель жизненного цикла: реагирует на неожиданные обрывы.
    async fn run_watcher(self: Arc<Self>, mut events: broadcast::Receiver<LinkEvent>) {
        loop {
            match events.recv().await {
                Ok(LinkEvent::Connected) => {}
                Ok(LinkEvent::Disconnected { reason }) => {
                    if self.state() == ConnectionState::Disposed {
                        break;
                    }
                    warn!(
                        reason = reason.as_deref().unwrap_or("unknown"),
                        "broker connection lost"
                    );
                    *self.state.lock() = ConnectionState::Reconnecting;
                    if !self.reconnect_until_connected().await {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "lifecycle receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Цикл переподключения: фиксированная задержка, без предела попыток.
    ///
    /// Возвращает `false`, если супервизор был завершён во время цикла.
    async fn reconnect_until_connected(&self) -> bool {
        loop {
            info!(
                "retrying broker connection in {} s",
                self.reconnect_delay.as_secs_f32()
            );
            sleep(self.reconnect_delay).await;
            if self.state() == ConnectionState::Disposed {
                return false;
            }
            let options = match self.options.lock().clone() {
                Some(options) => options,
                None => return false,
            };
            match self.link.connect(&options).await {
                Ok(()) => {
                    self.replay_subscriptions().await;
                    *self.state.lock() = ConnectionState::Connected;
                    info!("broker connection restored");
                    return true;
                }
                Err(err) => {
                    warn!(%err, "reconnect attempt failed");
                }
            }
        }
    }

    /// Воспроизводит отслеживаемые подписки после переподключения.
    ///
    /// Каждый фильтр — независимый обмен с брокером; неудача одного не
    /// прерывает остальные.
    async fn replay_subscriptions(&self) {
        for filter in self.tracked_filters() {
            info!("restoring subscription '{filter}'");
            match self.link.subscribe(std::slice::from_ref(&filter)).await {
                Ok(acks) => {
                    for ack in acks {
                        if !ack.code.is_success() {
                            warn!(filter = %ack.filter, code = ?ack.code, "broker rejected resubscribe");
                        }
                    }
                }
                Err(err) => {
                    warn!(%filter, %err, "resubscribe round-trip failed");
                }
            }
        }
    }
}
