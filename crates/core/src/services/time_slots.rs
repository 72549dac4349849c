use super::check_form;
use crate::common::time_to_minutes;
use crate::constants::{TIME_SLOTS, TIME_SLOTS_ADD};
use crate::models::{NewTimeSlot, StatusMessage, TimeSlot, TimeSlotList};
use crate::{ApiClient, PortalError, PortalResult};
use unicare_validation::presets;
use unicare_validation::{FieldValue, FormValues};

/// The medical centre's consultation windows.
pub struct TimeSlotService<'a> {
    api: &'a ApiClient,
}

impl<'a> TimeSlotService<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> PortalResult<Vec<TimeSlot>> {
        let list: TimeSlotList = self.api.get(TIME_SLOTS, &[]).await?;
        Ok(list.slots)
    }

    /// Adds a window given as 12-hour clock times (`08:30 AM`).
    pub async fn add(&self, start: &str, end: &str) -> PortalResult<StatusMessage> {
        let slot = new_slot(start, end)?;
        let reply: StatusMessage = self.api.put(TIME_SLOTS_ADD, &slot).await?;
        tracing::info!(start = slot.start_time, end = slot.end_time, "time slot added");
        Ok(reply)
    }

    pub async fn remove(&self, id: &str) -> PortalResult<StatusMessage> {
        if id.trim().is_empty() {
            return Err(PortalError::InvalidInput("time slot id is empty".into()));
        }
        self.api.delete(TIME_SLOTS, &[("_id", id)]).await
    }
}

fn new_slot(start: &str, end: &str) -> PortalResult<NewTimeSlot> {
    let values = FormValues::from([
        ("startTime".to_string(), FieldValue::from(start)),
        ("endTime".to_string(), FieldValue::from(end)),
    ]);
    check_form(&presets::time_slot(), &values)?;

    let (Some(start_time), Some(end_time)) = (time_to_minutes(start), time_to_minutes(end)) else {
        return Err(PortalError::InvalidInput("unrecognized time format".into()));
    };
    if end_time <= start_time {
        return Err(PortalError::InvalidInput(
            "End time must be after start time".into(),
        ));
    }
    Ok(NewTimeSlot {
        start_time,
        end_time,
    })
}
