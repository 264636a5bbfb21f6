use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{CatalogPage, CatalogStats, RecordFilter, StatusFilter},
    core::TrackerError,
    web::{Result, WebError, page, state::AppState},
};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<usize>,
    pub q: Option<String>,
    pub status: Option<StatusFilter>,
}

impl ListQuery {
    fn page(&self) -> usize {
        self.page.unwrap_or(1)
    }

    fn filter(&self) -> RecordFilter {
        RecordFilter::new(self.q.as_deref(), self.status.unwrap_or_default())
    }
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub identity: String,
    pub addressed: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Html<String> {
    let filter = query.filter();
    let catalog = state.catalog.lock().await;
    let listing = catalog.search(&filter, query.page(), state.page_size);
    let stats = catalog.stats();
    Html(page::render_index(&listing, &stats, &filter))
}

pub async fn list_errors(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<CatalogPage> {
    let filter = query.filter();
    let catalog = state.catalog.lock().await;
    Json(catalog.search(&filter, query.page(), state.page_size))
}

pub async fn toggle_error(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<Json<ToggleResponse>> {
    if identity.trim().is_empty() {
        return Err(WebError::Input("identity must not be blank".to_string()));
    }

    // The state-file write does blocking I/O; the owned guard keeps the
    // catalog locked until it completes.
    let mut catalog = state.catalog.clone().lock_owned().await;
    let (identity, addressed) = tokio::task::spawn_blocking(move || {
        let addressed = catalog.toggle(&identity)?;
        Ok::<_, TrackerError>((identity, addressed))
    })
    .await??;

    Ok(Json(ToggleResponse {
        success: true,
        identity,
        addressed,
    }))
}

pub async fn get_stats(State(state): State<AppState>) -> Json<CatalogStats> {
    let catalog = state.catalog.lock().await;
    Json(catalog.stats())
}
