use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConnectivityQuery {
    pub demo: Option<String>,
}

/// Coupling maps only exist for demo data; live backends report none.
pub async fn handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ConnectivityQuery>,
) -> Result<HttpResponse> {
    let backend = path.into_inner();

    if query.demo.as_deref() != Some("true") {
        return Err(AppError::NotFound(format!(
            "Connectivity data for {backend} is only available in demo mode"
        )));
    }

    Ok(HttpResponse::Ok().json(state.dashboard.connectivity(&backend)))
}
