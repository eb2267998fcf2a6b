//! Audit Log Handler

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::ApiResult;
use crate::auth::Identity;
use crate::db;
use crate::db::audit::AuditEntry;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Default, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AuditQuery {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// GET /api/audit
///
/// Admins see their own restaurant; superadmins see every tenant.
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Vec<AuditEntry>> {
    let entries = db::audit::query(
        &state.pool,
        identity.restaurant_id,
        query.limit(),
        query.offset(),
    )
    .await?;
    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_and_offset_are_clamped() {
        let q = AuditQuery::default();
        assert_eq!((q.limit(), q.offset()), (DEFAULT_LIMIT, 0));

        let q = AuditQuery {
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!((q.limit(), q.offset()), (MAX_LIMIT, 0));

        let q = AuditQuery {
            limit: Some(0),
            offset: Some(20),
        };
        assert_eq!((q.limit(), q.offset()), (1, 20));
    }
}
