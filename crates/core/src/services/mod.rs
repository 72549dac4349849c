//! Typed per-screen views over [`ApiClient`].
//!
//! Each service borrows the client, checks its input against the portal's rule tables
//! and only then issues the request. A rejected form never reaches the network.

mod appointments;
mod auth;
mod emergency;
mod home;
mod patients;
mod profile;
mod time_slots;

pub use appointments::AppointmentService;
pub use auth::{AuthService, StudentSignup};
pub use emergency::{EmergencyService, SentMessage};
pub use home::HomeService;
pub use patients::PatientService;
pub use profile::ProfileService;
pub use time_slots::TimeSlotService;

use crate::client::UploadFile;
use crate::constants::MAX_PROFILE_IMAGE_BYTES;
use crate::{PortalError, PortalResult};
use unicare_validation::{FormRules, FormValues};

pub const IMAGE_TOO_LARGE: &str = "Profile picture cannot exceed 3MB.";

fn check_form(rules: &FormRules, values: &FormValues) -> PortalResult<()> {
    rules.validate(values).into_result().map_err(PortalError::from)
}

fn check_image(file: &UploadFile) -> PortalResult<()> {
    if file.is_empty() {
        return Err(PortalError::InvalidInput("Please select a picture".into()));
    }
    if file.len() > MAX_PROFILE_IMAGE_BYTES {
        return Err(PortalError::InvalidInput(IMAGE_TOO_LARGE.into()));
    }
    Ok(())
}
