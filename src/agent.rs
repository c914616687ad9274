use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::{
    codec::PayloadCodec,
    config::ConnectOptions,
    connection::{ConnectionState, ConnectionSupervisor, RECONNECT_DELAY},
    error::{AgentError, ConnectionError},
    hub::{
        BroadcastHandle, CallbackGuard, DispatchHub, MessageArgs, QueueReader,
        DEFAULT_SINK_CAPACITY,
    },
    link::{BrokerLink, QoS},
    publish::Publisher,
};

/// Агент сообщений: единый фасад над супервизором, хабом и издателем.
///
/// Владеет единственным соединением с брокером. Подписки оформляются в
/// одном из трёх стилей доставки (очередь, вещание, колбэк) и переживают
/// обрывы соединения: супервизор восстанавливает их автоматически.
/// `dispose` завершает всё разом: диспетчер, соединение и каждый сток.
pub struct MessageAgent {
    supervisor: Arc<ConnectionSupervisor>,
    hub: Arc<DispatchHub>,
    publisher: Publisher,
    disposed: AtomicBool,
}

impl std::fmt::Debug for MessageAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageAgent")
            .field("disposed", &self.disposed.load(std::sync::atomic::Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl MessageAgent {
    /// Подключается к брокеру и собирает агент.
    ///
    /// Неудача первой попытки соединения фатальна и возвращается
    /// вызывающему; решение о повторе — за ним.
    pub async fn connect(
        link: Arc<dyn BrokerLink>,
        options: ConnectOptions,
    ) -> Result<Self, AgentError> {
        Self::connect_with(link, options, RECONNECT_DELAY).await
    }

    /// То же, что [`connect`](Self::connect), но с нестандартной задержкой
    /// фонового переподключения.
    pub async fn connect_with(
        link: Arc<dyn BrokerLink>,
        options: ConnectOptions,
        reconnect_delay: Duration,
    ) -> Result<Self, AgentError> {
        let supervisor = ConnectionSupervisor::with_reconnect_delay(
            Arc::clone(&link),
            reconnect_delay,
        );
        supervisor.connect(options).await?;

        // Приёмник входящих забирается после успешного соединения: неудачная
        // первая попытка не расходует единственное право на поток входящих,
        // и вызывающий может повторить connect.
        let inbound = match link.take_inbound() {
            Some(inbound) => inbound,
            None => {
                supervisor.dispose().await;
                return Err(AgentError::InboundAlreadyClaimed);
            }
        };

        let hub = DispatchHub::new(DEFAULT_SINK_CAPACITY);
        hub.attach(inbound);

        let publisher = Publisher::new(Arc::clone(&link), Arc::clone(&supervisor));
        Ok(Self {
            supervisor,
            hub,
            publisher,
            disposed: AtomicBool::new(false),
        })
    }

    /// Подписка с доставкой через ограниченную очередь.
    ///
    /// Несколько фильтров разделяют одну очередь: сообщения всех тем
    /// приходят в общий читающий конец. Повторная подписка на уже
    /// зарегистрированный фильтр переиспользует его подписку (кодек
    /// первого вызова побеждает) и добавляет к ней новый сток.
    pub async fn subscribe_queue<C>(
        &self,
        filters: &[&str],
        codec: C,
    ) -> Result<QueueReader<C::Value>, AgentError>
    where
        C: PayloadCodec + Clone,
    {
        self.ensure_live()?;
        if filters.is_empty() {
            return Err(AgentError::EmptyTopic);
        }

        let (sender, receiver) = tokio::sync::mpsc::channel(self.hub.default_capacity());
        for filter in filters {
            let (channel, created) = self.hub.get_or_create(filter, codec.clone())?;
            channel.add_queue(sender.clone());
            if created {
                self.supervisor.track(filter).await?;
            }
        }
        Ok(QueueReader::new(receiver))
    }

    /// Подписка с вещательной доставкой.
    ///
    /// Возвращённая рукоятка позволяет подключать независимых
    /// потребителей в любой момент; прошлые сообщения не повторяются.
    pub async fn subscribe_broadcast<C>(
        &self,
        filter: &str,
        codec: C,
    ) -> Result<BroadcastHandle<C::Value>, AgentError>
    where
        C: PayloadCodec,
    {
        self.ensure_live()?;
        let (channel, created) = self.hub.get_or_create(filter, codec)?;
        let sender = channel.broadcast_sender(self.hub.default_capacity());
        if created {
            self.supervisor.track(filter).await?;
        }
        Ok(BroadcastHandle::new(filter, sender))
    }

    /// Подписка со встроенным обработчиком.
    ///
    /// Обработчик вызывается в цикле диспетчеризации. Возвращённая
    /// рукоятка снимает ровно его, не трогая подписку и её другие стоки.
    pub async fn subscribe_callback<C, F>(
        &self,
        filter: &str,
        codec: C,
        handler: F,
    ) -> Result<CallbackGuard, AgentError>
    where
        C: PayloadCodec,
        F: Fn(MessageArgs<C::Value>) + Send + Sync + 'static,
    {
        self.ensure_live()?;
        let (channel, created) = self.hub.get_or_create(filter, codec)?;
        let id = channel.add_callback(Arc::new(handler));
        if created {
            self.supervisor.track(filter).await?;
        }
        Ok(CallbackGuard::new(move || channel.remove_callback(id)))
    }

    /// Публикует типизированное значение.
    ///
    /// `Ok(false)` означает, что брокер отверг публикацию кодом причины;
    /// подробности в логе предупреждений.
    pub async fn publish<C: PayloadCodec>(
        &self,
        topic: &str,
        value: &C::Value,
        codec: &C,
        retain: bool,
        qos: QoS,
    ) -> Result<bool, AgentError> {
        self.publisher.publish(topic, value, codec, retain, qos).await
    }

    /// Публикует текст как есть, минуя кодек.
    pub async fn publish_text(
        &self,
        topic: &str,
        text: &str,
        retain: bool,
        qos: QoS,
    ) -> Result<bool, AgentError> {
        self.publisher.publish_text(topic, text, retain, qos).await
    }

    /// Текущее состояние соединения.
    pub fn state(&self) -> ConnectionState {
        self.supervisor.state()
    }

    pub fn is_connected(&self) -> bool {
        self.supervisor.is_connected()
    }

    /// Число зарегистрированных подписок.
    pub fn subscription_count(&self) -> usize {
        self.hub.subscription_count()
    }

    /// Полное завершение: отключает диспетчер от входящих, закрывает
    /// соединение и завершает каждый сток каждой подписки. Повторный
    /// вызов — no-op.
    pub async fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.hub.detach();
        self.supervisor.dispose().await;
        self.hub.close_sinks();
    }

    fn ensure_live(&self) -> Result<(), AgentError> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(ConnectionError::Disposed.into());
        }
        Ok(())
    }
}
