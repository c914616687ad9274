use tokio::sync::{broadcast, mpsc};

use super::MessageArgs;
use crate::error::{RecvError, TryRecvError};

/// Читающий конец очереди подписки.
///
/// Очередь ограничена; переполнение приводит к потере сообщений только
/// этой очереди (см. [`DispatchHub`]). После завершения хаба чтение
/// отдаёт накопленные сообщения и затем `None` — последовательность
/// терминируется.
///
/// [`DispatchHub`]: super::DispatchHub
pub struct QueueReader<T> {
    inner: mpsc::Receiver<MessageArgs<T>>,
}

impl<T> QueueReader<T> {
    pub(crate) fn new(inner: mpsc::Receiver<MessageArgs<T>>) -> Self {
        Self { inner }
    }

    /// Асинхронно ожидает следующее сообщение.
    ///
    /// `None` означает, что хаб завершён и сообщений больше не будет.
    pub async fn recv(&mut self) -> Option<MessageArgs<T>> {
        self.inner.recv().await
    }

    /// Пытается получить сообщение без ожидания.
    pub fn try_recv(&mut self) -> Result<MessageArgs<T>, TryRecvError> {
        self.inner.try_recv().map_err(Into::into)
    }

    /// Прекращает приём: дальнейшие доставки в эту очередь отбрасываются,
    /// уже буферизованные сообщения остаются читаемыми.
    pub fn close(&mut self) {
        self.inner.close();
    }
}

/// Рукоятка вещательной подписки.
///
/// Позволяет подключать независимых потребителей в любой момент, в том
/// числе конкурентно с доставкой. Потребитель, не подключённый в момент
/// доставки, это сообщение не получит — повтора прошлого нет.
pub struct BroadcastHandle<T> {
    filter: String,
    sender: broadcast::Sender<MessageArgs<T>>,
}

impl<T> std::fmt::Debug for BroadcastHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastHandle")
            .field("filter", &self.filter)
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}

impl<T: Clone> BroadcastHandle<T> {
    pub(crate) fn new(filter: &str, sender: broadcast::Sender<MessageArgs<T>>) -> Self {
        Self {
            filter: filter.to_string(),
            sender,
        }
    }

    /// Подключает нового потребителя начиная с текущего момента.
    pub fn attach(&self) -> BroadcastReader<T> {
        BroadcastReader {
            inner: self.sender.subscribe(),
        }
    }

    /// Фильтр, на который оформлена подписка.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Число подключённых в данный момент потребителей.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Потребитель вещательной подписки.
pub struct BroadcastReader<T> {
    inner: broadcast::Receiver<MessageArgs<T>>,
}

impl<T: Clone> BroadcastReader<T> {
    /// Асинхронно ожидает следующее сообщение.
    ///
    /// # Возвращает
    /// - `Ok(MessageArgs)` при успешном получении
    /// - `Err(RecvError::Closed)` после завершения хаба
    /// - `Err(RecvError::Lagged(n))` если потребитель отстал на `n` сообщений
    pub async fn recv(&mut self) -> Result<MessageArgs<T>, RecvError> {
        self.inner.recv().await.map_err(Into::into)
    }

    /// Пытается получить сообщение без ожидания.
    pub fn try_recv(&mut self) -> Result<MessageArgs<T>, TryRecvError> {
        self.inner.try_recv().map_err(Into::into)
    }
}

/// Рукоятка колбэк-подписки.
///
/// Снимает ровно свой обработчик — при явном `dispose` или при `Drop`.
/// Подписка и остальные её стоки остаются нетронутыми.
pub struct CallbackGuard {
    remove: Option<Box<dyn FnOnce() + Send>>,
}

impl CallbackGuard {
    pub(crate) fn new(remove: impl FnOnce() + Send + 'static) -> Self {
        Self {
            remove: Some(Box::new(remove)),
        }
    }

    /// Явно снимает обработчик. Аналогично `drop(self)`.
    pub fn dispose(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for CallbackGuard {
    fn drop(&mut self) {
        self.run();
    }
}
