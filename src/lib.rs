/// Consumer-facing message agent: connect, subscribe, publish, dispose.
pub mod agent;
/// Payload codecs: raw bytes, UTF-8 text, JSON.
pub mod codec;
/// Broker connection options loading.
pub mod config;
/// Connection supervisor: liveness state machine and automatic recovery.
pub mod connection;
/// Common error types: connection, codec, topic patterns, delivery.
pub mod error;
/// Central dispatch hub: subscriptions, sinks, fan-out.
pub mod hub;
/// Broker connection collaborator interface and wire-facing types.
pub mod link;
/// Topic filter compilation and matching.
pub mod pattern;
/// Connection-guarded publish path.
pub mod publish;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// The one-stop facade over hub, publisher and supervisor.
pub use agent::MessageAgent;
/// Codec selection per declared payload shape.
pub use codec::{JsonCodec, PayloadCodec, RawCodec, TextCodec};
/// Connection options (env-loadable).
pub use config::ConnectOptions;
/// Connection lifecycle.
pub use connection::{ConnectionState, ConnectionSupervisor};
/// Operation errors.
pub use error::{AgentError, CodecError, ConnectionError, PatternError, RecvError, TryRecvError};
/// Dispatch hub and delivery endpoints.
pub use hub::{
    BroadcastHandle, BroadcastReader, CallbackGuard, DispatchHub, MessageArgs, QueueReader,
};
/// Broker link collaborator surface.
pub use link::{
    AckCode, BrokerLink, InboundMessage, LinkEvent, OutboundMessage, PublishAck, QoS, SubscribeAck,
};
/// Topic pattern matcher.
pub use pattern::TopicMatcher;
/// Outbound send path.
pub use publish::Publisher;
