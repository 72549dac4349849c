use super::{check_form, check_image};
use crate::client::{ProgressFn, UploadFile};
use crate::constants::{
    DOCTOR_CHANGE_DP, DOCTOR_CHANGE_PASSWORD, DOCTOR_CURRENT, DOCTOR_UPDATE_GENERAL,
    DOCTOR_UPDATE_PRO, IMAGE_FIELD, STUDENT_CHANGE_DP, STUDENT_CHANGE_PASSWORD, STUDENT_CURRENT,
    STUDENT_UPDATE_GENERAL, STUDENT_UPDATE_HEALTH, STUDENT_UPDATE_REG,
};
use crate::models::{
    Doctor, DoctorEnvelope, DoctorUpdate, PasswordChange, StatusMessage, Student, StudentEnvelope,
    StudentUpdate,
};
use crate::{ApiClient, PortalError, PortalResult};
use unicare_types::Role;
use unicare_validation::presets::{self, DoctorSection, StudentSection, CONFIRM_MISMATCH};

/// Profile screens for both roles. Each section saves through its own endpoint.
pub struct ProfileService<'a> {
    api: &'a ApiClient,
}

impl<'a> ProfileService<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn current_student(&self) -> PortalResult<Student> {
        let envelope: StudentEnvelope = self.api.get(STUDENT_CURRENT, &[]).await?;
        Ok(envelope.student)
    }

    pub async fn current_doctor(&self) -> PortalResult<Doctor> {
        let envelope: DoctorEnvelope = self.api.get(DOCTOR_CURRENT, &[]).await?;
        Ok(envelope.doctor)
    }

    /// Validates one section of `student` and saves it.
    pub async fn update_student(
        &self,
        section: StudentSection,
        student: &Student,
    ) -> PortalResult<StudentUpdate> {
        check_form(&presets::student_profile_section(section), &student.form_values())?;
        let path = match section {
            StudentSection::General => STUDENT_UPDATE_GENERAL,
            StudentSection::Registration => STUDENT_UPDATE_REG,
            StudentSection::Health => STUDENT_UPDATE_HEALTH,
        };
        self.api.put(path, student).await
    }

    pub async fn update_doctor(
        &self,
        section: DoctorSection,
        doctor: &Doctor,
    ) -> PortalResult<DoctorUpdate> {
        check_form(&presets::doctor_profile_section(section), &doctor.form_values())?;
        let path = match section {
            DoctorSection::General => DOCTOR_UPDATE_GENERAL,
            DoctorSection::Professional => DOCTOR_UPDATE_PRO,
        };
        self.api.put(path, doctor).await
    }

    pub async fn change_password(
        &self,
        role: Role,
        change: &PasswordChange,
    ) -> PortalResult<StatusMessage> {
        let report = presets::password_change()
            .validate(&change.form_values())
            .require_match(
                "confirmPassword",
                &change.new_password,
                &change.confirm_password,
                CONFIRM_MISMATCH,
            );
        if !report.is_valid() {
            return Err(PortalError::Validation(report));
        }

        let path = match role {
            Role::Student => STUDENT_CHANGE_PASSWORD,
            Role::MedicalCentre => DOCTOR_CHANGE_PASSWORD,
        };
        self.api.put(path, change).await
    }

    /// Replaces the profile picture. Pictures over 3 MiB are refused locally.
    pub async fn change_picture(
        &self,
        role: Role,
        mut picture: UploadFile,
        progress: Option<ProgressFn>,
    ) -> PortalResult<StatusMessage> {
        check_image(&picture)?;
        picture.field = IMAGE_FIELD.to_string();
        let path = match role {
            Role::Student => STUDENT_CHANGE_DP,
            Role::MedicalCentre => DOCTOR_CHANGE_DP,
        };
        self.api.upload(path, picture, &[], progress).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::UploadProgress;
    use crate::constants::MAX_PROFILE_IMAGE_BYTES;
    use crate::services::mock;
    use axum::extract::{DefaultBodyLimit, Multipart};
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    fn doctor() -> Doctor {
        Doctor {
            id: "d1".into(),
            first_name: "Ruwan".into(),
            last_name: "Silva".into(),
            gender: "male".into(),
            birthday: Some("1985-02-11".into()),
            phone: "0712345678".into(),
            email: "ruwan@example.com".into(),
            bio: "Chief medical officer of the university health centre with fifteen years of \
                  experience in general practice and student wellbeing."
                .into(),
            mc_reg_no: "SLMC-10293".into(),
            specialize: Some("General practice".into()),
            image: None,
        }
    }

    #[tokio::test]
    async fn section_updates_hit_their_endpoints() {
        let routes = Router::new()
            .route(
                "/doctors/current",
                get(|| async { Json(json!({"doctor": {"_id": "d1", "firstName": "Ruwan"}})) }),
            )
            .route(
                "/doctors/update-pro",
                put(|Json(body): Json<Value>| async move {
                    Json(json!({"status": "success", "message": "Updated", "doctor": body}))
                }),
            );
        let api = mock::client(routes).await;
        let service = ProfileService::new(&api);

        assert_eq!(service.current_doctor().await.expect("current").first_name, "Ruwan");

        let reply = service
            .update_doctor(DoctorSection::Professional, &doctor())
            .await
            .expect("update");
        assert_eq!(reply.doctor.mc_reg_no, "SLMC-10293");
    }

    #[tokio::test]
    async fn only_the_saved_section_is_checked() {
        let api = mock::unreachable();
        let service = ProfileService::new(&api);
        let mut student = Student {
            first_name: "Nimal".into(),
            blood_group: "x+".into(),
            ..Student::default()
        };
        student.reg_no = "S/19/123".into();
        student.index_no = "S12345".into();
        student.faculty = "Science".into();

        match service.update_student(StudentSection::Health, &student).await {
            Err(PortalError::Validation(report)) => {
                assert_eq!(
                    report.error_for("bloodGroup"),
                    Some("This field value is not an accepted value")
                );
                assert!(report.error_for("lastName").is_none());
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        // Registration passes locally, so the request goes out and fails on the network.
        match service.update_student(StudentSection::Registration, &student).await {
            Err(PortalError::Api(_)) => {}
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn password_confirmation_must_match() {
        let api = mock::unreachable();
        let change = PasswordChange {
            current_password: "old".into(),
            new_password: "newpass1!".into(),
            confirm_password: "newpass2!".into(),
        };
        match ProfileService::new(&api).change_password(Role::Student, &change).await {
            Err(PortalError::Validation(report)) => {
                assert_eq!(report.error_for("confirmPassword"), Some(CONFIRM_MISMATCH));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn picture_upload_reports_progress() {
        let routes = Router::new()
            .route(
                "/students/change-dp",
                post(|mut multipart: Multipart| async move {
                    let field = multipart.next_field().await.expect("read").expect("field");
                    assert_eq!(field.name(), Some("image"));
                    let len = field.bytes().await.expect("bytes").len();
                    Json(json!({"status": "success", "message": format!("{len} bytes")}))
                }),
            )
            .layer(DefaultBodyLimit::max(MAX_PROFILE_IMAGE_BYTES * 2));
        let api = mock::client(routes).await;

        let seen = Arc::new(Mutex::new(Vec::<UploadProgress>::new()));
        let sink = Arc::clone(&seen);
        let progress: ProgressFn = Arc::new(move |p| sink.lock().expect("lock").push(p));

        let picture = UploadFile::new("file", "dp.jpg", vec![7; 200 * 1024]);
        let reply = ProfileService::new(&api)
            .change_picture(Role::Student, picture, Some(progress))
            .await
            .expect("upload");

        assert_eq!(reply.message, format!("{} bytes", 200 * 1024));
        let seen = seen.lock().expect("lock");
        assert_eq!(seen.last().map(|p| p.percent), Some(100));
    }

    #[tokio::test]
    async fn oversized_pictures_are_refused() {
        let api = mock::unreachable();
        let picture = UploadFile::new("image", "dp.jpg", vec![0; MAX_PROFILE_IMAGE_BYTES + 1]);
        let err = ProfileService::new(&api)
            .change_picture(Role::MedicalCentre, picture, None)
            .await
            .expect_err("should fail");
        assert!(matches!(err, PortalError::InvalidInput(_)));
    }
}
