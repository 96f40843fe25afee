use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub demo: Option<String>,
    pub force: Option<String>,
}

impl DashboardQuery {
    pub fn demo(&self) -> bool {
        flag(self.demo.as_deref())
    }

    pub fn force(&self) -> bool {
        flag(self.force.as_deref())
    }
}

/// Only the literal `true` switches a flag on.
fn flag(value: Option<&str>) -> bool {
    value == Some("true")
}

pub async fn handler(
    state: web::Data<AppState>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse> {
    let snapshot = state
        .dashboard
        .dashboard(query.demo(), query.force())
        .await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_require_literal_true() {
        let query = DashboardQuery {
            demo: Some("true".to_string()),
            force: Some("1".to_string()),
        };
        assert!(query.demo());
        assert!(!query.force());

        let query = DashboardQuery {
            demo: Some("TRUE".to_string()),
            force: None,
        };
        assert!(!query.demo());
        assert!(!query.force());
    }
}
