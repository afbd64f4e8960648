mod agent;
mod element;
mod event;
mod page;
mod throttle;
mod transport;

pub use agent::{Tracker, TrackerConfig};
pub use element::ElementInfo;
pub use event::{ElementFields, EventDetail, EventType, TrackingEvent, RESERVED_KEYS};
pub use page::{
    DomEvent, Element, EventKind, EventListener, ListenerOptions, ListenerTarget, Page,
    ReadyState, ScrollMetrics, Viewport,
};
pub use throttle::ThrottleSlot;
pub use transport::{HttpTransport, Transport};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("tracking requires a tokio runtime: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}
