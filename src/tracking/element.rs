use super::page::Element;

const MAX_TEXT_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    pub element_type: String,
    pub text: String,
    pub id: String,
    pub class_name: String,
}

impl ElementInfo {
    pub fn describe(element: &Element) -> Self {
        let tag = element
            .tag_name
            .as_deref()
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "unknown".to_string());

        let element_type = match tag.as_str() {
            "button" => "button".to_string(),
            "a" => "link".to_string(),
            "input" => element
                .input_type
                .clone()
                .filter(|kind| !kind.is_empty())
                .unwrap_or_else(|| "input".to_string()),
            _ if element.role.as_deref() == Some("button") => "button".to_string(),
            _ if element.has_onclick => "clickable".to_string(),
            _ => tag,
        };

        let text = [&element.text_content, &element.value, &element.alt]
            .into_iter()
            .flatten()
            .find(|candidate| !candidate.is_empty())
            .map(|candidate| candidate.chars().take(MAX_TEXT_CHARS).collect())
            .unwrap_or_default();

        Self {
            element_type,
            text,
            id: element.id.clone(),
            class_name: element.class_name.clone(),
        }
    }
}
