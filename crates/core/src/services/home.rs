use crate::constants::{DOCTOR_HOME, DOCTOR_HOME_STATUS};
use crate::models::{DoctorHome, OnlineStatus};
use crate::{ApiClient, PortalResult};
use serde_json::json;

/// The doctor's dashboard.
pub struct HomeService<'a> {
    api: &'a ApiClient,
}

impl<'a> HomeService<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Online flag, today's appointments and the per-faculty graph.
    pub async fn dashboard(&self) -> PortalResult<DoctorHome> {
        self.api.get(DOCTOR_HOME, &[]).await
    }

    /// Flips the doctor's online status and returns the new state.
    pub async fn toggle_status(&self) -> PortalResult<OnlineStatus> {
        let status: OnlineStatus = self.api.put(DOCTOR_HOME_STATUS, &json!({})).await?;
        tracing::info!(online = status.online, "doctor status changed");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock;
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use serde_json::Value;

    #[tokio::test]
    async fn dashboard_and_status_toggle() {
        let routes = Router::new()
            .route(
                "/tabs/doctors/home",
                get(|| async {
                    Json(json!({
                        "online": false,
                        "appointments": [],
                        "graph": [{"faculty": "Medicine", "years": [{"year": "2025", "count": 40}]}]
                    }))
                }),
            )
            .route(
                "/tabs/doctors/home/status",
                put(|Json(body): Json<Value>| async move {
                    assert_eq!(body, json!({}));
                    Json(json!({"status": "success", "message": "You are online", "online": true}))
                }),
            );
        let api = mock::client(routes).await;
        let service = HomeService::new(&api);

        let home = service.dashboard().await.expect("home");
        assert!(!home.online);
        assert_eq!(home.graph[0].faculty, "Medicine");

        assert!(service.toggle_status().await.expect("toggle").online);
    }
}
