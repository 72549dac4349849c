//! Constants used throughout the portal core crate.
//!
//! Endpoint paths are relative to the configured API base URL.

/// API base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Directory under the user's home that holds the session file.
pub const SESSION_DIR_NAME: &str = ".unicare";

/// Filename for the persisted session flags.
pub const SESSION_FILE_NAME: &str = "session.json";

/// Status value the API uses when the token is missing or expired.
pub const NO_AUTH_STATUS: &str = "no-auth";

/// Multipart field carrying profile pictures.
pub const IMAGE_FIELD: &str = "image";

pub use unicare_validation::presets::MAX_PROFILE_IMAGE_BYTES;

// Authentication and accounts
pub const DOCTOR_LOGIN: &str = "doctors/login";
pub const STUDENT_LOGIN: &str = "students/login";
pub const STUDENT_SIGNUP: &str = "students/signup";
pub const DOCTOR_CURRENT: &str = "doctors/current";
pub const STUDENT_CURRENT: &str = "students/current";
pub const FACULTIES: &str = "faculties/all";

// Doctor dashboard
pub const DOCTOR_HOME: &str = "tabs/doctors/home";
pub const DOCTOR_HOME_STATUS: &str = "tabs/doctors/home/status";

// Patient records
pub const CHECK_PATIENT: &str = "tabs/doctors/check-patient";
pub const CHECK_PATIENT_STUDENT: &str = "tabs/doctors/check-patient/student";
pub const CHECK_PATIENT_APPOINTMENT: &str = "tabs/doctors/check-patient/appointment";
pub const CHECK_PATIENT_ADD_RECORD: &str = "tabs/doctors/check-patient/add-record";
pub const DISEASES: &str = "diseases/all";
pub const DISEASES_ADD: &str = "diseases/add";

// Time slots
pub const TIME_SLOTS: &str = "timeslots";
pub const TIME_SLOTS_ADD: &str = "timeslots/add";

// Student appointments
pub const STUDENT_APPOINTMENTS: &str = "tabs/students/appointments";
pub const STUDENT_FREE_SLOTS: &str = "tabs/students/appointments/free-slots";
pub const STUDENT_APPOINTMENTS_ADD: &str = "tabs/students/appointments/add";

// Emergency messaging
pub const STUDENT_EMERGENCY: &str = "tabs/students/emergency";
pub const STUDENT_EMERGENCY_SEND: &str = "tabs/students/emergency/send-message";
pub const DOCTOR_EMERGENCY: &str = "tabs/doctors/emergency";
pub const DOCTOR_EMERGENCY_MESSAGES: &str = "tabs/doctors/emergency/messages";
pub const DOCTOR_EMERGENCY_SEARCH: &str = "tabs/doctors/emergency/search";
pub const DOCTOR_EMERGENCY_SEND: &str = "tabs/doctors/emergency/send-message";

// Profile and settings
pub const DOCTOR_UPDATE_GENERAL: &str = "doctors/update-general";
pub const DOCTOR_UPDATE_PRO: &str = "doctors/update-pro";
pub const DOCTOR_CHANGE_PASSWORD: &str = "doctors/change-password";
pub const DOCTOR_CHANGE_DP: &str = "doctors/change-dp";
pub const STUDENT_UPDATE_GENERAL: &str = "students/update-general";
pub const STUDENT_UPDATE_REG: &str = "students/update-reg";
pub const STUDENT_UPDATE_HEALTH: &str = "students/update-health";
pub const STUDENT_CHANGE_PASSWORD: &str = "students/change-password";
pub const STUDENT_CHANGE_DP: &str = "students/change-dp";
