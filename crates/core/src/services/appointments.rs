use super::check_form;
use crate::constants::{STUDENT_APPOINTMENTS, STUDENT_APPOINTMENTS_ADD, STUDENT_FREE_SLOTS};
use crate::models::{AppointmentLists, AppointmentRequest, FreeSlot, FreeSlotList, StatusMessage};
use crate::{ApiClient, PortalResult};
use chrono::NaiveDate;
use unicare_validation::presets;
use unicare_validation::value::format_date;

/// The student's appointment screen.
pub struct AppointmentService<'a> {
    api: &'a ApiClient,
}

impl<'a> AppointmentService<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> PortalResult<AppointmentLists> {
        self.api.get(STUDENT_APPOINTMENTS, &[]).await
    }

    /// Unbooked consultation windows on `date`.
    pub async fn free_slots(&self, date: NaiveDate) -> PortalResult<Vec<FreeSlot>> {
        let date = format_date(date);
        let list: FreeSlotList = self
            .api
            .get(STUDENT_FREE_SLOTS, &[("date", date.as_str())])
            .await?;
        Ok(list.free_slots)
    }

    pub async fn book(&self, request: &AppointmentRequest) -> PortalResult<StatusMessage> {
        check_form(&presets::appointment_request(), &request.form_values())?;
        let reply: StatusMessage = self.api.put(STUDENT_APPOINTMENTS_ADD, request).await?;
        tracing::info!(timeslot = %request.timeslot_id, date = %request.date, "appointment booked");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock;
    use crate::PortalError;
    use axum::extract::Query;
    use axum::routing::{get, put};
    use axum::{Json, Router};
    use chrono::{Days, Local};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    const DESCRIPTION: &str =
        "Recurring headaches in the afternoon for the past two weeks, worse after lectures.";

    #[tokio::test]
    async fn free_slots_are_requested_for_the_day() {
        let routes = Router::new().route(
            "/tabs/students/appointments/free-slots",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q.get("date").map(String::as_str), Some("2026-10-20"));
                Json(json!({"freeSlots": [{"_id": "t1", "startTime": 480, "endTime": 510}]}))
            }),
        );
        let api = mock::client(routes).await;
        let day = NaiveDate::from_ymd_opt(2026, 10, 20).expect("valid date");

        let slots = AppointmentService::new(&api).free_slots(day).await.expect("slots");
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start_time, 480);
    }

    #[tokio::test]
    async fn lists_are_grouped() {
        let routes = Router::new().route(
            "/tabs/students/appointments",
            get(|| async {
                Json(json!({
                    "upcomingAppointments": [{
                        "_id": "a1",
                        "startTime": "2026-10-20T03:00:00Z",
                        "endTime": "2026-10-20T03:30:00Z",
                        "description": DESCRIPTION,
                        "checked": false
                    }],
                    "previousAppointments": []
                }))
            }),
        );
        let api = mock::client(routes).await;
        let lists = AppointmentService::new(&api).list().await.expect("list");
        assert_eq!(lists.upcoming_appointments.len(), 1);
        assert!(lists.ongoing_appointments.is_empty());
    }

    #[tokio::test]
    async fn booking_sends_the_request() {
        let routes = Router::new().route(
            "/tabs/students/appointments/add",
            put(|Json(body): Json<Value>| async move {
                assert_eq!(body["timeslotId"], "t1");
                Json(json!({"status": "success", "message": "Appointment added"}))
            }),
        );
        let api = mock::client(routes).await;
        let request = AppointmentRequest {
            date: Local::now().date_naive() + Days::new(1),
            timeslot_id: "t1".into(),
            description: DESCRIPTION.into(),
        };
        let reply = AppointmentService::new(&api).book(&request).await.expect("book");
        assert_eq!(reply.status, "success");
    }

    #[tokio::test]
    async fn past_dates_and_short_descriptions_are_rejected_locally() {
        let api = mock::unreachable();
        let request = AppointmentRequest {
            date: Local::now().date_naive() - Days::new(1),
            timeslot_id: "t1".into(),
            description: "Headache".into(),
        };
        match AppointmentService::new(&api).book(&request).await {
            Err(PortalError::Validation(report)) => {
                assert!(report.error_for("date").is_some());
                assert_eq!(
                    report.error_for("description"),
                    Some("This field must have at least 50 characters")
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
