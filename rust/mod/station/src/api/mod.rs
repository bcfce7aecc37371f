mod entries;
mod kpis;
mod stations;

use std::sync::Arc;

use axum::Router;

use kpidash_core::{protect, protect_admin, Authenticator};

use crate::service::StationService;

/// Shared application state.
pub type AppState = Arc<StationService>;

/// Build the station router. Station records are managed by admins; entries
/// and station KPIs are open to every signed-in user.
pub fn build_router(svc: Arc<StationService>, auth: Arc<dyn Authenticator>) -> Router {
    let signed_in = Router::new()
        .merge(stations::routes())
        .merge(entries::routes())
        .merge(kpis::routes());

    Router::new()
        .merge(protect(signed_in, auth.clone()))
        .merge(protect_admin(stations::admin_routes(), auth))
        .with_state(svc)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, HeaderMap, Request, StatusCode};
    use kpidash_core::{AllowAll, Principal, Role, ServiceError};
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::service::testing::{memory_service, operator};

    struct Operator;

    impl Authenticator for Operator {
        fn authenticate(&self, _headers: &HeaderMap) -> Result<Principal, ServiceError> {
            Ok(operator())
        }
    }

    async fn call(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let body = match body {
            Some(v) => Body::from(serde_json::to_string(&v).unwrap()),
            None => Body::empty(),
        };
        let resp = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(json!(null));
        (status, json)
    }

    #[tokio::test]
    async fn station_writes_need_admin() {
        assert_eq!(operator().role, Role::User);
        let svc = memory_service();
        let admin = build_router(svc.clone(), Arc::new(AllowAll));
        let user = build_router(svc, Arc::new(Operator));

        let body = json!({"code": "PRS-01", "name": "Pres 1", "department": "Üretim"});
        let (status, resp) = call(&user, "POST", "/api/stations", Some(body.clone())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(resp["code"], "PERMISSION_DENIED");

        let (status, created) = call(&admin, "POST", "/api/stations", Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap();

        let (status, _) = call(&admin, "POST", "/api/stations", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, station) = call(&user, "GET", &format!("/api/stations/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(station["active"], true);

        let (status, _) = call(&user, "DELETE", &format!("/api/stations/{}", id), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(&admin, "DELETE", &format!("/api/stations/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn operator_records_production() {
        let svc = memory_service();
        let admin = build_router(svc.clone(), Arc::new(AllowAll));
        let user = build_router(svc, Arc::new(Operator));

        let (_, station) = call(
            &admin,
            "POST",
            "/api/stations",
            Some(json!({"code": "KYN-02", "name": "Kaynak 2"})),
        )
        .await;
        let id = station["id"].as_str().unwrap();
        assert_eq!(station["department"], "Genel");

        let entries = format!("/api/stations/{}/entries", id);
        for (date, produced, defects) in [("2024-05-01", 500, 5), ("2024-05-02", 500, 15)] {
            let (status, entry) = call(
                &user,
                "POST",
                &entries,
                Some(json!({
                    "date": date,
                    "produced": produced,
                    "defects": defects,
                    "downtime_minutes": 60,
                    "planned_minutes": 480
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(entry["created_by"], "mehmet");
        }

        let (status, bad) = call(&user, "POST", &entries, Some(json!({"produced": 1, "defects": 2}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(bad["code"], "VALIDATION_FAILED");

        let (_, list) = call(&user, "GET", &format!("{}?from=2024-05-02", entries), None).await;
        assert_eq!(list["total"], 1);

        let (status, summary) = call(&user, "GET", &format!("/api/stations/{}/summary", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["produced"], 1000);
        assert_eq!(summary["defect_rate"], 2.0);
        assert_eq!(summary["availability"], 87.5);

        let entry_id = list["items"][0]["id"].as_str().unwrap();
        let (status, _) = call(&user, "DELETE", &format!("/api/station-entries/{}", entry_id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn station_kpis_over_http() {
        let svc = memory_service();
        let admin = build_router(svc.clone(), Arc::new(AllowAll));
        let (_, station) = call(&admin, "POST", "/api/stations", Some(json!({"code": "A", "name": "A"}))).await;
        let id = station["id"].as_str().unwrap();

        let (status, kpi) = call(
            &admin,
            "POST",
            &format!("/api/stations/{}/kpis", id),
            Some(json!({"name": "OEE", "value": 60, "target": 80, "period": "2024-05-01"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(kpi["percentage"], 75.0);

        let kpi_uri = format!("/api/station-kpis/{}", kpi["id"].as_str().unwrap());
        let (_, updated) = call(&admin, "PUT", &kpi_uri, Some(json!({"value": 80}))).await;
        assert_eq!(updated["percentage"], 100.0);

        let (status, _) = call(&admin, "GET", "/api/stations/missing/kpis", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
