//! Управляемое соединение с брокером для сценарных тестов.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};

use topicbus::{
    AckCode, BrokerLink, ConnectOptions, ConnectionError, InboundMessage, LinkEvent,
    OutboundMessage, PublishAck, QoS, SubscribeAck,
};

/// Соединение-заглушка: фиксирует обращения, позволяет имитировать
/// обрывы, отказы соединения и отказы брокера, впрыскивать входящие
/// сообщения.
pub struct MockLink {
    connected: AtomicBool,
    fail_connects: AtomicUsize,
    pub connect_calls: AtomicUsize,
    pub subscribe_calls: Mutex<Vec<String>>,
    pub unsubscribe_calls: Mutex<Vec<String>>,
    pub published: Mutex<Vec<OutboundMessage>>,
    publish_code: Mutex<AckCode>,
    subscribe_code: Mutex<AckCode>,
    lifecycle: broadcast::Sender<LinkEvent>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    inbound_rx: Mutex<Option<mpsc::Receiver<InboundMessage>>>,
}

impl MockLink {
    pub fn new() -> Arc<Self> {
        let (lifecycle, _) = broadcast::channel(16);
        let (inbound_tx, inbound_rx) = mpsc::channel(64);
        Arc::new(Self {
            connected: AtomicBool::new(false),
            fail_connects: AtomicUsize::new(0),
            connect_calls: AtomicUsize::new(0),
            subscribe_calls: Mutex::new(Vec::new()),
            unsubscribe_calls: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
            publish_code: Mutex::new(AckCode::Success),
            subscribe_code: Mutex::new(AckCode::Success),
            lifecycle,
            inbound_tx,
            inbound_rx: Mutex::new(Some(inbound_rx)),
        })
    }

    /// Следующие `n` попыток соединения завершатся отказом.
    pub fn fail_next_connects(&self, n: usize) {
        self.fail_connects.store(n, Ordering::SeqCst);
    }

    /// Код причины для последующих публикаций.
    pub fn set_publish_code(&self, code: AckCode) {
        *self.publish_code.lock() = code;
    }

    /// Код причины для последующих подписок.
    pub fn set_subscribe_code(&self, code: AckCode) {
        *self.subscribe_code.lock() = code;
    }

    /// Имитирует неожиданный обрыв с уведомлением жизненного цикла.
    pub fn drop_connection(&self) {
        self.connected.store(false, Ordering::SeqCst);
        let _ = self.lifecycle.send(LinkEvent::Disconnected {
            reason: Some("simulated drop".into()),
        });
    }

    /// Тихо помечает соединение оборванным, без уведомления.
    pub fn set_disconnected(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Впрыскивает входящее прикладное сообщение.
    ///
    /// После завершения хаба приёмник закрыт — сообщение молча пропадает,
    /// как пропало бы на отключённом клиенте.
    pub async fn inject(&self, topic: &str, payload: &[u8]) {
        let _ = self
            .inbound_tx
            .send(InboundMessage {
                topic: topic.to_string(),
                payload: Bytes::copy_from_slice(payload),
                qos: QoS::AtMostOnce,
                retain: false,
            })
            .await;
    }

    pub fn subscribe_count_for(&self, filter: &str) -> usize {
        self.subscribe_calls
            .lock()
            .iter()
            .filter(|f| f.as_str() == filter)
            .count()
    }
}

#[async_trait]
impl BrokerLink for MockLink {
    async fn connect(&self, _options: &ConnectOptions) -> Result<(), ConnectionError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_connects.load(Ordering::SeqCst) > 0 {
            self.fail_connects.fetch_sub(1, Ordering::SeqCst);
            return Err(ConnectionError::ConnectFailed {
                reason: "simulated refusal".into(),
            });
        }
        self.connected.store(true, Ordering::SeqCst);
        let _ = self.lifecycle.send(LinkEvent::Connected);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ConnectionError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn publish(&self, message: OutboundMessage) -> Result<PublishAck, ConnectionError> {
        if !self.is_connected() {
            return Err(ConnectionError::NotConnected);
        }
        self.published.lock().push(message);
        Ok(PublishAck {
            code: *self.publish_code.lock(),
            reason: None,
        })
    }

    async fn subscribe(&self, filters: &[String]) -> Result<Vec<SubscribeAck>, ConnectionError> {
        self.subscribe_calls.lock().extend(filters.iter().cloned());
        let code = *self.subscribe_code.lock();
        Ok(filters
            .iter()
            .map(|filter| SubscribeAck {
                filter: filter.clone(),
                code,
            })
            .collect())
    }

    async fn unsubscribe(&self, filters: &[String]) -> Result<(), ConnectionError> {
        self.unsubscribe_calls.lock().extend(filters.iter().cloned());
        Ok(())
    }

    fn lifecycle(&self) -> broadcast::Receiver<LinkEvent> {
        self.lifecycle.subscribe()
    }

    fn take_inbound(&self) -> Option<mpsc::Receiver<InboundMessage>> {
        self.inbound_rx.lock().take()
    }
}

/// Параметры соединения для тестов.
pub fn test_options() -> ConnectOptions {
    ConnectOptions::new("mqtt://localhost:1883")
}

/// Включает вывод логов тестов (однократно, по RUST_LOG).
pub fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
