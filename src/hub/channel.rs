use std::{
    any::Any,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tracing::{trace, warn};

use super::MessageArgs;
use crate::codec::PayloadCodec;

/// Обработчик колбэк-стока.
pub(crate) type CallbackFn<T> = Arc<dyn Fn(MessageArgs<T>) + Send + Sync>;

/// Сток доставки одной подписки.
pub(crate) enum Sink<T> {
    /// Ограниченная очередь; переполнение теряет сообщение только для неё.
    Queue(mpsc::Sender<MessageArgs<T>>),
    /// Вещание подключённым в данный момент потребителям, без повтора.
    Broadcast(broadcast::Sender<MessageArgs<T>>),
    /// Встроенный обработчик, вызываемый в цикле диспетчеризации.
    Callback { id: u64, handler: CallbackFn<T> },
}

impl<T> Clone for Sink<T> {
    fn clone(&self) -> Self {
        match self {
            Sink::Queue(sender) => Sink::Queue(sender.clone()),
            Sink::Broadcast(sender) => Sink::Broadcast(sender.clone()),
            Sink::Callback { id, handler } => Sink::Callback {
                id: *id,
                handler: Arc::clone(handler),
            },
        }
    }
}

/// Стираемый тип канала подписки: хабу не важен тип полезной нагрузки.
pub(crate) trait AnyChannel: Send + Sync + 'static {
    /// Декодирует сообщение и раздаёт его стокам подписки.
    fn dispatch(&self, topic: &str, payload: &Bytes);

    /// Закрывает все стоки подписки.
    fn close(&self);

    /// Доступ к конкретному типу для сверки кодека повторной подписки.
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// Типизированный канал подписки: кодек плюс набор стоков.
///
/// Декодирование выполняется один раз на входящее сообщение; значение
/// клонируется по числу стоков. Неудачное декодирование отбрасывает
/// сообщение только для этой подписки.
pub(crate) struct TypedChannel<C: PayloadCodec> {
    filter: String,
    codec: C,
    sinks: Mutex<Vec<Sink<C::Value>>>,
    next_callback_id: AtomicU64,
}

impl<C: PayloadCodec> std::fmt::Debug for TypedChannel<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedChannel")
            .field("filter", &self.filter)
            .field("sinks", &self.sink_count())
            .finish()
    }
}

impl<C: PayloadCodec> TypedChannel<C> {
    pub(crate) fn new(filter: &str, codec: C) -> Self {
        Self {
            filter: filter.to_string(),
            codec,
            sinks: Mutex::new(Vec::new()),
            next_callback_id: AtomicU64::new(0),
        }
    }

    pub(crate) fn add_queue(&self, sender: mpsc::Sender<MessageArgs<C::Value>>) {
        self.sinks.lock().push(Sink::Queue(sender));
    }

    /// Отдаёт вещательный отправитель подписки, создавая его при первом
    /// обращении. Повторные вещательные подписки на тот же фильтр
    /// разделяют один отправитель.
    pub(crate) fn broadcast_sender(
        &self,
        capacity: usize,
    ) -> broadcast::Sender<MessageArgs<C::Value>> {
        let mut sinks = self.sinks.lock();
        for sink in sinks.iter() {
            if let Sink::Broadcast(sender) = sink {
                return sender.clone();
            }
        }
        let (sender, _) = broadcast::channel(capacity);
        sinks.push(Sink::Broadcast(sender.clone()));
        sender
    }

    /// Регистрирует обработчик; возвращает его идентификатор для снятия.
    pub(crate) fn add_callback(&self, handler: CallbackFn<C::Value>) -> u64 {
        let id = self.next_callback_id.fetch_add(1, Ordering::Relaxed);
        self.sinks.lock().push(Sink::Callback { id, handler });
        id
    }

    /// Снимает ровно один обработчик; остальные стоки не затрагиваются.
    pub(crate) fn remove_callback(&self, id: u64) {
        self.sinks
            .lock()
            .retain(|sink| !matches!(sink, Sink::Callback { id: sink_id, .. } if *sink_id == id));
    }

    pub(crate) fn sink_count(&self) -> usize {
        self.sinks.lock().len()
    }
}

impl<C: PayloadCodec> AnyChannel for TypedChannel<C> {
    fn dispatch(&self, topic: &str, payload: &Bytes) {
        let value = match self.codec.decode(payload) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    filter = %self.filter,
                    %topic,
                    %err,
                    "failed to decode inbound payload, message dropped for this subscription"
                );
                trace!(%topic, payload = ?payload, "undecodable payload");
                return;
            }
        };

        // Снимок списка: обработчик вправе снимать себя или добавлять
        // стоки, не упираясь в удерживаемый замок.
        let sinks: Vec<Sink<C::Value>> = self.sinks.lock().iter().cloned().collect();
        for sink in sinks.iter() {
            let message = MessageArgs::new(topic, value.clone());
            match sink {
                Sink::Queue(sender) => match sender.try_send(message) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(
                            filter = %self.filter,
                            %topic,
                            "queue sink is full, message dropped for this sink"
                        );
                    }
                    // Читатель ушёл; сток вычистится при закрытии.
                    Err(mpsc::error::TrySendError::Closed(_)) => {}
                },
                Sink::Broadcast(sender) => {
                    // Нет подключённых потребителей — сообщение просто пропадает.
                    let _ = sender.send(message);
                }
                Sink::Callback { handler, .. } => (handler)(message),
            }
        }
    }

    fn close(&self) {
        // Уничтожение отправителей закрывает очереди и вещание;
        // читатели дочитывают буфер и получают конец последовательности.
        self.sinks.lock().clear();
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::codec::TextCodec;

    /// Тест проверяет веер: одно сообщение получают и очередь,
    /// и обработчик одной подписки.
    #[tokio::test]
    async fn test_dispatch_fans_out_to_all_sinks() {
        let channel = TypedChannel::new("t/+", TextCodec);
        let (tx, mut rx) = mpsc::channel(4);
        channel.add_queue(tx);

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        channel.add_callback(Arc::new(move |_msg| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        channel.dispatch("t/1", &Bytes::from_static(b"hello"));

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.topic, "t/1");
        assert_eq!(msg.payload, "hello");
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    /// Тест проверяет, что неудачное декодирование не паникует и не
    /// доставляет сообщение.
    #[tokio::test]
    async fn test_dispatch_drops_undecodable() {
        let channel = TypedChannel::new("t/+", TextCodec);
        let (tx, mut rx) = mpsc::channel(4);
        channel.add_queue(tx);

        channel.dispatch("t/1", &Bytes::from_static(&[0xff, 0xfe]));
        assert!(rx.try_recv().is_err());
    }

    /// Тест проверяет, что переполненная очередь теряет сообщение
    /// только для себя, не трогая другие стоки.
    #[tokio::test]
    async fn test_full_queue_drops_only_for_that_sink() {
        let channel = TypedChannel::new("t/+", TextCodec);
        let (tx, mut rx) = mpsc::channel(1);
        channel.add_queue(tx);

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        channel.add_callback(Arc::new(move |_msg| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        channel.dispatch("t/1", &Bytes::from_static(b"a"));
        channel.dispatch("t/1", &Bytes::from_static(b"b"));

        // Очередь вместимостью 1 получила только первое сообщение...
        assert_eq!(rx.recv().await.unwrap().payload, "a");
        assert!(rx.try_recv().is_err());
        // ...а обработчик — оба.
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    /// Тест проверяет повторное использование вещательного отправителя.
    #[tokio::test]
    async fn test_broadcast_sender_is_shared() {
        let channel = TypedChannel::new("b/+", TextCodec);
        let first = channel.broadcast_sender(8);
        let second = channel.broadcast_sender(8);
        assert_eq!(channel.sink_count(), 1);

        // Подключение к первому отправителю видно через второй.
        let _reader = first.subscribe();
        assert_eq!(second.receiver_count(), 1);
    }

    /// Тест проверяет снятие ровно одного обработчика.
    #[tokio::test]
    async fn test_remove_callback_leaves_others() {
        let channel = TypedChannel::new("c/+", TextCodec);
        let id_a = channel.add_callback(Arc::new(|_msg| {}));
        let _id_b = channel.add_callback(Arc::new(|_msg| {}));
        assert_eq!(channel.sink_count(), 2);

        channel.remove_callback(id_a);
        assert_eq!(channel.sink_count(), 1);
    }

    /// Тест проверяет, что закрытие канала терминирует очередь.
    #[tokio::test]
    async fn test_close_terminates_queue() {
        let channel = TypedChannel::new("t/+", TextCodec);
        let (tx, mut rx) = mpsc::channel(4);
        channel.add_queue(tx);
        channel.dispatch("t/1", &Bytes::from_static(b"last"));

        channel.close();
        // Буфер дочитывается, затем конец последовательности.
        assert_eq!(rx.recv().await.unwrap().payload, "last");
        assert!(rx.recv().await.is_none());
    }
}
