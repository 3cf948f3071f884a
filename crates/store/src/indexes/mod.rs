//! Typed registries over the document store, one per index.

pub mod channels;
pub mod messages;
pub mod subscribers;

pub use channels::ChannelIndex;
pub use messages::MessageIndex;
pub use subscribers::SubscriberIndex;
