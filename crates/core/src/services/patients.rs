use super::check_form;
use crate::constants::{
    CHECK_PATIENT, CHECK_PATIENT_ADD_RECORD, CHECK_PATIENT_APPOINTMENT, CHECK_PATIENT_STUDENT,
    DISEASES, DISEASES_ADD,
};
use crate::models::{
    Disease, DiseaseList, NewHealthRecord, PatientFile, StatusMessage, StudentList, StudentSummary,
};
use crate::{ApiClient, PortalError, PortalResult};
use unicare_validation::presets;

/// The doctor's patient screens: the student list, a patient's file and health records.
pub struct PatientService<'a> {
    api: &'a ApiClient,
}

impl<'a> PatientService<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn students(&self) -> PortalResult<Vec<StudentSummary>> {
        let list: StudentList = self.api.get(CHECK_PATIENT, &[]).await?;
        Ok(list.students)
    }

    pub async fn by_student(&self, student_id: &str) -> PortalResult<PatientFile> {
        self.api
            .get(CHECK_PATIENT_STUDENT, &[("studentId", student_id)])
            .await
    }

    /// Opens the file of the student who booked `appointment_id`.
    pub async fn by_appointment(&self, appointment_id: &str) -> PortalResult<PatientFile> {
        self.api
            .get(CHECK_PATIENT_APPOINTMENT, &[("appointmentId", appointment_id)])
            .await
    }

    pub async fn add_record(&self, record: &NewHealthRecord) -> PortalResult<StatusMessage> {
        check_form(&presets::health_record(), &record.form_values())?;
        let reply: StatusMessage = self.api.put(CHECK_PATIENT_ADD_RECORD, record).await?;
        tracing::info!(student = %record.student_id, disease = %record.disease, "health record added");
        Ok(reply)
    }

    pub async fn diseases(&self) -> PortalResult<Vec<Disease>> {
        let list: DiseaseList = self.api.get(DISEASES, &[]).await?;
        Ok(list.diseases)
    }

    pub async fn add_disease(&self, name: &str) -> PortalResult<StatusMessage> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PortalError::InvalidInput("disease name is empty".into()));
        }
        self.api
            .put(DISEASES_ADD, &Disease { name: name.to_string() })
            .await
    }
}
