use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use parking_lot::Mutex;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, trace};

use super::channel::{AnyChannel, TypedChannel};
use crate::{
    codec::PayloadCodec, error::AgentError, link::InboundMessage, pattern::TopicMatcher,
};

/// Вместимость стока по умолчанию (очередь и вещание).
pub const DEFAULT_SINK_CAPACITY: usize = 10;

/// Одна зарегистрированная подписка: фильтр, сопоставитель и канал.
struct SubscriptionEntry {
    filter: String,
    matcher: TopicMatcher,
    channel: Arc<dyn AnyChannel>,
}

/// Центральный диспетчер входящих сообщений.
///
/// Владеет списком подписок и единственным приёмником входящих сообщений
/// соединения. Сообщения обрабатываются строго по одному в порядке
/// прибытия; для каждого перебираются все подписки в порядке регистрации —
/// доставку получают все совпавшие, без приоритета первой.
///
/// Подписка создаётся при первом обращении с данной строкой фильтра и
/// удаляется только при завершении хаба — опустевший набор стоков её
/// не уничтожает.
pub struct DispatchHub {
    /// Подписки в порядке регистрации.
    entries: Mutex<Vec<Arc<SubscriptionEntry>>>,
    default_capacity: usize,
    dispatch_task: Mutex<Option<JoinHandle<()>>>,
    disposed: AtomicBool,
}

impl DispatchHub {
    pub fn new(default_capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(Vec::new()),
            default_capacity,
            dispatch_task: Mutex::new(None),
            disposed: AtomicBool::new(false),
        })
    }

    pub fn default_capacity(&self) -> usize {
        self.default_capacity
    }

    pub fn subscription_count(&self) -> usize {
        self.entries.lock().len()
    }

    /// Подключает хаб к приёмнику входящих сообщений и запускает цикл
    /// диспетчеризации. Повторное подключение игнорируется.
    pub fn attach(self: &Arc<Self>, inbound: mpsc::Receiver<InboundMessage>) {
        let mut task = self.dispatch_task.lock();
        if task.is_none() {
            *task = Some(tokio::spawn(Arc::clone(self).run_dispatch(inbound)));
        }
    }

    /// Цикл диспетчеризации: одно сообщение за раз, в порядке прибытия.
    async fn run_dispatch(self: Arc<Self>, mut inbound: mpsc::Receiver<InboundMessage>) {
        while let Some(message) = inbound.recv().await {
            if self.disposed.load(Ordering::SeqCst) {
                break;
            }
            self.dispatch_one(&message);
        }
        debug!("inbound dispatch loop finished");
    }

    /// Раздаёт одно сообщение всем совпавшим подпискам.
    fn dispatch_one(&self, message: &InboundMessage) {
        let entries: Vec<Arc<SubscriptionEntry>> = self.entries.lock().iter().cloned().collect();
        let mut matched = 0usize;
        for entry in &entries {
            if entry.matcher.matches(&message.topic) {
                matched += 1;
                entry.channel.dispatch(&message.topic, &message.payload);
            }
        }
        trace!(topic = %message.topic, matched, "inbound message dispatched");
    }

    /// Возвращает канал подписки для фильтра, создавая его при первом
    /// обращении.
    ///
    /// Кодек первого вызова побеждает: для уже зарегистрированного фильтра
    /// аргумент игнорируется, а несовпадение типа полезной нагрузки даёт
    /// [`AgentError::SubscriptionConflict`]. Второй элемент результата —
    /// признак того, что подписка создана только что (и фильтр ещё нужно
    /// отследить у супервизора).
    pub(crate) fn get_or_create<C: PayloadCodec>(
        &self,
        filter: &str,
        codec: C,
    ) -> Result<(Arc<TypedChannel<C>>, bool), AgentError> {
        if filter.is_empty() {
            return Err(AgentError::EmptyTopic);
        }
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.iter().find(|entry| entry.filter == filter) {
            return Arc::clone(&entry.channel)
                .as_any()
                .downcast::<TypedChannel<C>>()
                .map(|channel| (channel, false))
                .map_err(|_| AgentError::SubscriptionConflict {
                    filter: filter.to_string(),
                });
        }

        let matcher = TopicMatcher::compile(filter)?;
        let channel = Arc::new(TypedChannel::new(filter, codec));
        entries.push(Arc::new(SubscriptionEntry {
            filter: filter.to_string(),
            matcher,
            channel: Arc::clone(&channel) as Arc<dyn AnyChannel>,
        }));
        Ok((channel, true))
    }

    /// Отключает цикл диспетчеризации от приёмника входящих.
    pub(crate) fn detach(&self) {
        if let Some(task) = self.dispatch_task.lock().take() {
            task.abort();
        }
    }

    /// Закрывает все стоки всех подписок и очищает список.
    pub(crate) fn close_sinks(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let entries = std::mem::take(&mut *self.entries.lock());
        for entry in entries {
            entry.channel.close();
        }
    }

    /// Полное завершение хаба. Повторный вызов — no-op.
    pub fn dispose(&self) {
        self.detach();
        self.close_sinks();
    }
}
