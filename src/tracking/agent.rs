use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use serde_json::{Map, Value};
use tokio::{runtime::Handle, time::Instant};
use tracing::{debug, info};

use super::{
    element::ElementInfo,
    event::{EventDetail, EventType, TrackingEvent},
    page::{
        DomEvent, Element, EventKind, EventListener, ListenerOptions, ListenerTarget, Page,
        ReadyState,
    },
    throttle::ThrottleSlot,
    transport::Transport,
    TrackerError,
};

/// Collector endpoint baked in at build time. Unset means the tracker stays
/// inert until a host supplies one through [`TrackerConfig::with_endpoint`].
const BUILD_ENDPOINT: Option<&str> = option_env!("UX_TRACKING_ENDPOINT");

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub endpoint: Option<String>,
    pub scroll_throttle: Duration,
    pub mousemove_throttle: Duration,
    pub scroll_interval: Duration,
    pub mousemove_interval: Duration,
    pub max_events_per_session: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            endpoint: BUILD_ENDPOINT
                .map(str::trim)
                .filter(|endpoint| !endpoint.is_empty())
                .map(str::to_string),
            scroll_throttle: Duration::from_millis(100),
            mousemove_throttle: Duration::from_millis(500),
            scroll_interval: Duration::from_millis(1000),
            mousemove_interval: Duration::from_millis(2000),
            max_events_per_session: 1000,
        }
    }
}

impl TrackerConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

#[derive(Debug, Default)]
struct SessionState {
    initialized: bool,
    session_id: Option<String>,
    events_sent: u32,
    last_scroll: Option<Instant>,
    last_mousemove: Option<Instant>,
}

struct Inner<P, T> {
    page: Arc<P>,
    transport: T,
    config: TrackerConfig,
    throttle: ThrottleSlot,
    state: Mutex<SessionState>,
}

/// Listeners registered on the page only hold a weak reference, so the host
/// must keep the tracker alive for as long as the page is loaded.
pub struct Tracker<P, T> {
    inner: Arc<Inner<P, T>>,
}

impl<P, T> Clone for Tracker<P, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, T> Tracker<P, T>
where
    P: Page + 'static,
    T: Transport + 'static,
{
    pub fn install(page: Arc<P>, transport: T, config: TrackerConfig) -> Result<Self, TrackerError> {
        let throttle = ThrottleSlot::new(Handle::try_current()?);
        let tracker = Self {
            inner: Arc::new(Inner {
                page,
                transport,
                config,
                throttle,
                state: Mutex::new(SessionState::default()),
            }),
        };

        if tracker.inner.page.ready_state() == ReadyState::Loading {
            tracker.inner.page.add_event_listener(
                ListenerTarget::Document,
                EventKind::DomContentLoaded,
                ListenerOptions::BUBBLE,
                tracker.listener(),
            );
        } else {
            tracker.init();
        }

        Ok(tracker)
    }

    pub fn init(&self) {
        let session_id = {
            let mut state = self.state();
            if state.initialized {
                return;
            }
            let session_id = generate_session_id();
            state.session_id = Some(session_id.clone());
            state.initialized = true;
            session_id
        };

        self.attach_listeners();
        self.track_page_view();

        if self.inner.config.endpoint.is_none() {
            info!(%session_id, "tracking endpoint not configured; events will be dropped");
        } else {
            debug!(%session_id, "tracking initialized");
        }
    }

    pub fn session_id(&self) -> Option<String> {
        self.state().session_id.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.state().initialized
    }

    pub fn events_sent(&self) -> u32 {
        self.state().events_sent
    }

    /// Records an application-defined event. The common fields always win
    /// over keys of the same name in `data`.
    pub fn track_custom_event(&self, event_type: &str, data: Map<String, Value>) {
        self.deliver(
            EventType::Custom(event_type.to_string()),
            EventDetail::custom(data),
        );
    }

    fn dispatch(&self, event: &DomEvent) {
        match event {
            DomEvent::DomContentLoaded => self.init(),
            DomEvent::Click { x, y, target } => self.handle_click(*x, *y, target),
            DomEvent::Scroll => {
                let tracker = self.clone();
                self.inner
                    .throttle
                    .schedule(self.inner.config.scroll_throttle, move || tracker.handle_scroll());
            }
            DomEvent::MouseMove { x, y } => {
                let (tracker, x, y) = (self.clone(), *x, *y);
                self.inner.throttle.schedule(self.inner.config.mousemove_throttle, move || {
                    tracker.handle_mouse_move(x, y)
                });
            }
            DomEvent::MouseEnter { x, y, target } => self.handle_hover(*x, *y, target),
            DomEvent::VisibilityChange => self.handle_visibility_change(),
            DomEvent::BeforeUnload => self.handle_page_unload(),
        }
    }

    fn attach_listeners(&self) {
        let page = &self.inner.page;
        for kind in [EventKind::Click, EventKind::Scroll, EventKind::MouseMove] {
            page.add_event_listener(
                ListenerTarget::Document,
                kind,
                ListenerOptions::CAPTURE,
                self.listener(),
            );
        }
        page.add_event_listener(
            ListenerTarget::Document,
            EventKind::VisibilityChange,
            ListenerOptions::BUBBLE,
            self.listener(),
        );
        page.add_event_listener(
            ListenerTarget::Window,
            EventKind::BeforeUnload,
            ListenerOptions::BUBBLE,
            self.listener(),
        );

        for index in 0..page.interactive_elements().len() {
            page.add_event_listener(
                ListenerTarget::Element(index),
                EventKind::MouseEnter,
                ListenerOptions::BUBBLE,
                self.listener(),
            );
        }
    }

    fn handle_click(&self, x: i32, y: i32, target: &Element) {
        let viewport = self.inner.page.viewport();
        self.deliver(
            EventType::Click,
            EventDetail::Click {
                x,
                y,
                element: ElementInfo::describe(target).into(),
                viewport_width: viewport.width,
                viewport_height: viewport.height,
            },
        );
    }

    fn handle_scroll(&self) {
        let metrics = self.inner.page.scroll_metrics();
        {
            let mut state = self.state();
            if !self.is_active(&state) {
                return;
            }
            let now = Instant::now();
            if within(state.last_scroll, now, self.inner.config.scroll_interval) {
                return;
            }
            state.last_scroll = Some(now);
        }

        self.deliver(
            EventType::Scroll,
            EventDetail::Scroll {
                scroll_depth: metrics.depth_percent(),
                scroll_top: metrics.scroll_top,
                document_height: metrics.document_height,
                viewport_height: metrics.viewport_height,
            },
        );
    }

    fn handle_mouse_move(&self, x: i32, y: i32) {
        {
            let mut state = self.state();
            if !self.is_active(&state) {
                return;
            }
            let now = Instant::now();
            if within(state.last_mousemove, now, self.inner.config.mousemove_interval) {
                return;
            }
            state.last_mousemove = Some(now);
        }

        self.deliver(EventType::MouseMove, EventDetail::MouseMove { x, y });
    }

    fn handle_hover(&self, x: i32, y: i32, target: &Element) {
        self.deliver(
            EventType::Hover,
            EventDetail::Hover {
                x,
                y,
                element: ElementInfo::describe(target).into(),
            },
        );
    }

    fn handle_visibility_change(&self) {
        let event_type = if self.inner.page.is_hidden() {
            EventType::PageHidden
        } else {
            EventType::PageVisible
        };
        self.deliver(event_type, EventDetail::Empty {});
    }

    fn handle_page_unload(&self) {
        let Some((endpoint, event)) = self.claim(EventType::PageUnload, |events_sent| {
            EventDetail::Unload { events_sent }
        }) else {
            return;
        };

        if !self.inner.transport.send_beacon(&endpoint, &event) {
            debug!("unload beacon could not be queued");
        }
    }

    fn track_page_view(&self) {
        let page = &self.inner.page;
        let viewport = page.viewport();
        self.deliver(
            EventType::PageView,
            EventDetail::PageView {
                referrer: page.referrer(),
                title: page.title(),
                viewport_width: viewport.width,
                viewport_height: viewport.height,
                user_agent: page.user_agent(),
            },
        );
    }

    fn deliver(&self, event_type: EventType, detail: EventDetail) {
        if let Some((endpoint, event)) = self.claim(event_type, |_| detail) {
            self.inner.transport.send(&endpoint, &event);
        }
    }

    /// Reserves one slot of the session budget and stamps the event. `None`
    /// when tracking is not active.
    fn claim(
        &self,
        event_type: EventType,
        detail: impl FnOnce(u32) -> EventDetail,
    ) -> Option<(String, TrackingEvent)> {
        let url = self.inner.page.location_href();
        let mut state = self.state();
        if !self.is_active(&state) {
            return None;
        }
        let endpoint = self.inner.config.endpoint.clone()?;
        let session_id = state.session_id.clone()?;
        let detail = detail(state.events_sent);
        state.events_sent += 1;

        Some((
            endpoint,
            TrackingEvent {
                event_type,
                session_id,
                timestamp: Utc::now(),
                url,
                detail,
            },
        ))
    }

    fn is_active(&self, state: &SessionState) -> bool {
        state.initialized
            && state.session_id.is_some()
            && state.events_sent < self.inner.config.max_events_per_session
            && self.inner.config.endpoint.is_some()
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn listener(&self) -> Arc<dyn EventListener> {
        Arc::new(TrackerListener {
            inner: Arc::downgrade(&self.inner),
        })
    }
}

struct TrackerListener<P, T> {
    inner: Weak<Inner<P, T>>,
}

impl<P, T> EventListener for TrackerListener<P, T>
where
    P: Page + 'static,
    T: Transport + 'static,
{
    fn handle(&self, event: &DomEvent) {
        if let Some(inner) = self.inner.upgrade() {
            Tracker { inner }.dispatch(event);
        }
    }
}

fn within(last: Option<Instant>, now: Instant, interval: Duration) -> bool {
    last.is_some_and(|last| now.duration_since(last) < interval)
}

fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| {
            let idx = rng.gen_range(0..36u8);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'a' + idx - 10) as char
            }
        })
        .collect();
    format!("sess_{}_{suffix}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_prefixed_and_unique() {
        let first = generate_session_id();
        let second = generate_session_id();

        let parts: Vec<&str> = first.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "sess");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(first, second);
    }

    #[test]
    fn interval_check_ignores_first_event() {
        let now = Instant::now();
        assert!(!within(None, now, Duration::from_secs(1)));
        assert!(within(Some(now), now, Duration::from_secs(1)));
    }
}
