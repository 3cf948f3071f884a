use std::sync::Arc;

use sift_store::{ChannelIndex, SubscriberIndex};

#[derive(Clone)]
pub struct AppState {
    pub channels: Arc<ChannelIndex>,
    pub subscribers: Arc<SubscriberIndex>,
}

#[derive(Debug, Clone)]
pub struct RequestId(pub String);
