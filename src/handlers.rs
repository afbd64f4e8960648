use crate::dashboard::{AnalyticsApi, DashboardController, EXPORT_FAILED};
use crate::errors::AppError;
use crate::state::AppState;
use crate::summary::AnalyticsSummary;
use crate::ui::render_index;
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use tracing::warn;

/// Every request renders from scratch; the page's meta refresh reloads it.
pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let api = state.api.for_request(&headers);
    let summary = match api.export_data().await {
        Ok(export) => AnalyticsSummary::from_export(&export),
        Err(err) => {
            warn!("error loading analytics summary: {err}");
            AnalyticsSummary::default()
        }
    };

    let mut controller = DashboardController::new(api);
    controller.initialize(summary).await;

    Html(render_index(
        controller.view(),
        controller.charts(),
        controller.summary(),
        state.config.refresh_interval,
    ))
}

pub async fn export(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let controller = DashboardController::new(state.api.for_request(&headers));
    let file = controller
        .export(Utc::now().date_naive())
        .await
        .map_err(|_| AppError::bad_gateway(EXPORT_FAILED))?;

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.contents,
    )
        .into_response())
}

pub async fn health() -> &'static str {
    "ok"
}
