use std::fmt::Write as _;

use super::escape_html;
use crate::models::Suggestion;

pub const LOADING: &str = "Analyzing user behavior patterns...";
pub const LOAD_FAILED: &str =
    "No suggestions available yet. Collect more data to get AI-powered insights.";
pub const NONE_YET: &str =
    "No specific suggestions available yet. Continue collecting data for more insights.";

pub fn render_notice(message: &str) -> String {
    format!(r#"<div class="loading-suggestions">{}</div>"#, escape_html(message))
}

pub fn render_suggestions(suggestions: &[Suggestion]) -> String {
    if suggestions.is_empty() {
        return render_notice(NONE_YET);
    }

    let mut html = String::new();
    for suggestion in suggestions {
        let priority = escape_html(&suggestion.priority);
        let _ = write!(
            html,
            r#"<div class="suggestion-card {priority}-priority"><div class="suggestion-header"><h4>{}</h4><span class="priority-badge {priority}">{priority}</span></div><p>{}</p><ul class="suggestion-tips">"#,
            escape_html(&suggestion.title),
            escape_html(&suggestion.description),
        );
        for tip in &suggestion.actionable_tips {
            let _ = write!(html, "<li>{}</li>", escape_html(tip));
        }
        html.push_str("</ul></div>");
    }
    html
}
