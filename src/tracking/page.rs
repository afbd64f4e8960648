use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTarget {
    Document,
    Window,
    /// A single element, identified by its index in
    /// [`Page::interactive_elements`].
    Element(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DomContentLoaded,
    Click,
    Scroll,
    MouseMove,
    MouseEnter,
    VisibilityChange,
    BeforeUnload,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerOptions {
    pub capture: bool,
}

impl ListenerOptions {
    pub const CAPTURE: Self = Self { capture: true };
    pub const BUBBLE: Self = Self { capture: false };
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub document_height: f64,
    pub viewport_height: f64,
}

impl ScrollMetrics {
    /// Percentage of the scrollable range covered so far, clamped to 0..=100.
    /// A document that does not scroll is fully seen.
    pub fn depth_percent(&self) -> u8 {
        let range = self.document_height - self.viewport_height;
        if range <= 0.0 {
            return 100;
        }
        let depth = (self.scroll_top / range * 100.0).round();
        depth.clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag_name: Option<String>,
    pub input_type: Option<String>,
    pub role: Option<String>,
    pub has_onclick: bool,
    pub text_content: Option<String>,
    pub value: Option<String>,
    pub alt: Option<String>,
    pub id: String,
    pub class_name: String,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: Some(tag_name.into()),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_input_type(mut self, input_type: impl Into<String>) -> Self {
        self.input_type = Some(input_type.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    DomContentLoaded,
    Click { x: i32, y: i32, target: Element },
    Scroll,
    MouseMove { x: i32, y: i32 },
    MouseEnter { x: i32, y: i32, target: Element },
    VisibilityChange,
    BeforeUnload,
}

impl DomEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomEvent::DomContentLoaded => EventKind::DomContentLoaded,
            DomEvent::Click { .. } => EventKind::Click,
            DomEvent::Scroll => EventKind::Scroll,
            DomEvent::MouseMove { .. } => EventKind::MouseMove,
            DomEvent::MouseEnter { .. } => EventKind::MouseEnter,
            DomEvent::VisibilityChange => EventKind::VisibilityChange,
            DomEvent::BeforeUnload => EventKind::BeforeUnload,
        }
    }
}

pub trait EventListener: Send + Sync {
    fn handle(&self, event: &DomEvent);
}

pub trait Page: Send + Sync {
    fn location_href(&self) -> String;
    fn referrer(&self) -> String;
    fn title(&self) -> String;
    fn user_agent(&self) -> String;
    fn viewport(&self) -> Viewport;
    fn scroll_metrics(&self) -> ScrollMetrics;
    fn is_hidden(&self) -> bool;
    fn ready_state(&self) -> ReadyState;

    /// Elements matching
    /// `button, a, input, select, textarea, [onclick], [role="button"]`
    /// at the time of the call.
    fn interactive_elements(&self) -> Vec<Element>;

    fn add_event_listener(
        &self,
        target: ListenerTarget,
        kind: EventKind,
        options: ListenerOptions,
        listener: Arc<dyn EventListener>,
    );
}
