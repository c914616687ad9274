use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use super::{InboundMessage, LinkEvent, OutboundMessage, PublishAck, SubscribeAck};
use crate::{config::ConnectOptions, error::ConnectionError};

/// Соединение с брокером сообщений.
///
/// Единственная точка контакта крейта с проводным протоколом. Реализация
/// владеет физическим соединением; крейт никогда не переоткрывает его в
/// обход этого трейта.
///
/// Контракт:
/// - `connect` выполняет ровно одну попытку; политика повторов целиком
///   на стороне вызывающего ([`ConnectionSupervisor`]).
/// - `take_inbound` отдаёт приёмник входящих сообщений ровно один раз:
///   у потока входящих единственный потребитель — диспетчер хаба.
/// - события `lifecycle` рассылаются всем интересующимся; порядок
///   `Connected`/`Disconnected` соответствует фактическому соединению.
///
/// [`ConnectionSupervisor`]: crate::connection::ConnectionSupervisor
#[async_trait]
pub trait BrokerLink: Send + Sync + 'static {
    /// Одна попытка установить соединение с параметрами `options`.
    async fn connect(&self, options: &ConnectOptions) -> Result<(), ConnectionError>;

    /// Закрывает соединение.
    async fn disconnect(&self) -> Result<(), ConnectionError>;

    /// Текущее состояние физического соединения.
    fn is_connected(&self) -> bool;

    /// Публикует сообщение и возвращает подтверждение брокера.
    async fn publish(&self, message: OutboundMessage) -> Result<PublishAck, ConnectionError>;

    /// Подписывается на фильтры; результат — пофильтровые коды причины.
    async fn subscribe(&self, filters: &[String]) -> Result<Vec<SubscribeAck>, ConnectionError>;

    /// Снимает подписку с фильтров.
    async fn unsubscribe(&self, filters: &[String]) -> Result<(), ConnectionError>;

    /// Новый приёмник уведомлений жизненного цикла.
    fn lifecycle(&self) -> broadcast::Receiver<LinkEvent>;

    /// Забирает приёмник входящих сообщений; `None`, если уже забран.
    fn take_inbound(&self) -> Option<mpsc::Receiver<InboundMessage>>;
}
