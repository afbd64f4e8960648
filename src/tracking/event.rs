use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::element::ElementInfo;

/// Keys every event carries at the top level; custom payloads cannot shadow them.
pub const RESERVED_KEYS: [&str; 4] = ["event_type", "session_id", "timestamp", "url"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    PageView,
    Click,
    Scroll,
    MouseMove,
    Hover,
    PageHidden,
    PageVisible,
    PageUnload,
    Custom(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::PageView => "pageview",
            EventType::Click => "click",
            EventType::Scroll => "scroll",
            EventType::MouseMove => "mousemove",
            EventType::Hover => "hover",
            EventType::PageHidden => "page_hidden",
            EventType::PageVisible => "page_visible",
            EventType::PageUnload => "page_unload",
            EventType::Custom(name) => name,
        }
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementFields {
    pub element_type: String,
    pub element_text: String,
    pub element_id: String,
    pub element_class: String,
}

impl From<ElementInfo> for ElementFields {
    fn from(info: ElementInfo) -> Self {
        Self {
            element_type: info.element_type,
            element_text: info.text,
            element_id: info.id,
            element_class: info.class_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventDetail {
    PageView {
        referrer: String,
        title: String,
        viewport_width: u32,
        viewport_height: u32,
        user_agent: String,
    },
    Click {
        x: i32,
        y: i32,
        #[serde(flatten)]
        element: ElementFields,
        viewport_width: u32,
        viewport_height: u32,
    },
    Hover {
        x: i32,
        y: i32,
        #[serde(flatten)]
        element: ElementFields,
    },
    Scroll {
        scroll_depth: u8,
        scroll_top: f64,
        document_height: f64,
        viewport_height: f64,
    },
    MouseMove {
        x: i32,
        y: i32,
    },
    Unload {
        events_sent: u32,
    },
    Custom(Map<String, Value>),
    Empty {},
}

/// One observed interaction, posted to the collector as a flat JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingEvent {
    pub event_type: EventType,
    pub session_id: String,
    #[serde(serialize_with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
    pub url: String,
    #[serde(flatten)]
    pub detail: EventDetail,
}

fn iso_millis<S: Serializer>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl EventDetail {
    /// Custom payload with the reserved keys stripped.
    pub fn custom(mut data: Map<String, Value>) -> Self {
        for key in RESERVED_KEYS {
            data.remove(key);
        }
        EventDetail::Custom(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn click_serializes_flat() {
        let event = TrackingEvent {
            event_type: EventType::Click,
            session_id: "sess_1_abc".to_string(),
            timestamp: at_noon(),
            url: "https://shop.test/cart".to_string(),
            detail: EventDetail::Click {
                x: 120,
                y: 48,
                element: ElementFields {
                    element_type: "button".to_string(),
                    element_text: "Checkout".to_string(),
                    element_id: "checkout".to_string(),
                    element_class: "btn primary".to_string(),
                },
                viewport_width: 1280,
                viewport_height: 720,
            },
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "event_type": "click",
                "session_id": "sess_1_abc",
                "timestamp": "2026-03-14T12:00:00.000Z",
                "url": "https://shop.test/cart",
                "x": 120,
                "y": 48,
                "element_type": "button",
                "element_text": "Checkout",
                "element_id": "checkout",
                "element_class": "btn primary",
                "viewport_width": 1280,
                "viewport_height": 720
            })
        );
    }

    #[test]
    fn visibility_events_carry_only_common_fields() {
        let event = TrackingEvent {
            event_type: EventType::PageHidden,
            session_id: "sess_1_abc".to_string(),
            timestamp: at_noon(),
            url: "https://shop.test/".to_string(),
            detail: EventDetail::Empty {},
        };

        let value = serde_json::to_value(&event).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 4);
        assert_eq!(value["event_type"], "page_hidden");
    }

    #[test]
    fn custom_payload_cannot_override_reserved_keys() {
        let data = json!({ "plan": "pro", "url": "https://evil.test", "session_id": "forged" });
        let Value::Object(map) = data else { unreachable!() };

        let event = TrackingEvent {
            event_type: EventType::Custom("signup".to_string()),
            session_id: "sess_1_abc".to_string(),
            timestamp: at_noon(),
            url: "https://shop.test/".to_string(),
            detail: EventDetail::custom(map),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event_type"], "signup");
        assert_eq!(value["plan"], "pro");
        assert_eq!(value["url"], "https://shop.test/");
        assert_eq!(value["session_id"], "sess_1_abc");
    }
}
