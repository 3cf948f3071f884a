pub mod bootstrap;
pub mod client;
pub mod indexes;

pub use client::SearchStore;
pub use indexes::{ChannelIndex, MessageIndex, SubscriberIndex};
