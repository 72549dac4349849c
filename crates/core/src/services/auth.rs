use super::{check_form, check_image};
use crate::client::{ProgressFn, UploadFile};
use crate::constants::{DOCTOR_LOGIN, FACULTIES, IMAGE_FIELD, STUDENT_LOGIN, STUDENT_SIGNUP};
use crate::models::{AuthToken, Credentials, Faculty, FacultyList, StatusMessage, Student};
use crate::{ApiClient, PortalError, PortalResult, Session};
use unicare_types::Role;
use unicare_validation::presets::{self, CONFIRM_MISMATCH};
use unicare_validation::{Bounds, FieldValue, FormReport, FormRules, FormValues, Rule};

/// Signup form: the student profile plus the chosen password.
#[derive(Debug, Clone)]
pub struct StudentSignup {
    pub student: Student,
    pub password: String,
    pub confirm_password: String,
}

impl StudentSignup {
    pub fn form_values(&self) -> FormValues {
        let mut values = self.student.form_values();
        values.insert("password".into(), FieldValue::from(&self.password));
        values.insert("confirmPassword".into(), FieldValue::from(&self.confirm_password));
        values
    }

    /// Checks the fields up to and including signup step `step`.
    pub fn validate_step(&self, step: usize) -> FormReport {
        presets::student_signup_step(step)
            .validate(&self.form_values())
            .require_match(
                "confirmPassword",
                &self.password,
                &self.confirm_password,
                CONFIRM_MISMATCH,
            )
    }

    /// Text fields sent alongside the picture.
    fn multipart_fields(&self) -> Vec<(&'static str, String)> {
        let s = &self.student;
        let number = |n: Option<f64>| n.map(|n| n.to_string()).unwrap_or_default();
        vec![
            ("firstName", s.first_name.clone()),
            ("lastName", s.last_name.clone()),
            ("gender", s.gender.clone()),
            ("birthday", s.birthday.clone().unwrap_or_default()),
            ("phone", s.phone.clone()),
            ("email", s.email.clone()),
            ("password", self.password.clone()),
            ("confirmPassword", self.confirm_password.clone()),
            ("address", s.address.clone()),
            ("bio", s.bio.clone()),
            ("regNo", s.reg_no.clone()),
            ("indexNo", s.index_no.clone()),
            ("faculty", s.faculty.clone()),
            ("height", number(s.height)),
            ("weight", number(s.weight)),
            ("bloodGroup", s.blood_group.clone()),
            ("diseases", s.diseases.clone().unwrap_or_default()),
        ]
    }
}

fn login_rules() -> FormRules {
    FormRules::new()
        .field("username", Rule::text(Bounds::unbounded()).required())
        .field("password", Rule::text(Bounds::unbounded()).required())
}

/// Login, logout and signup.
pub struct AuthService<'a> {
    api: &'a ApiClient,
}

impl<'a> AuthService<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Logs in as `role` and records the token and role in `session`.
    ///
    /// The caller persists the session and hands the token to its client.
    pub async fn login(
        &self,
        session: &mut Session,
        role: Role,
        username: &str,
        password: &str,
    ) -> PortalResult<AuthToken> {
        let values = FormValues::from([
            ("username".to_string(), FieldValue::from(username)),
            ("password".to_string(), FieldValue::from(password)),
        ]);
        check_form(&login_rules(), &values)?;

        let path = match role {
            Role::Student => STUDENT_LOGIN,
            Role::MedicalCentre => DOCTOR_LOGIN,
        };
        let reply: AuthToken = self
            .api
            .post(path, &Credentials { username, password })
            .await?;

        session.log_in(reply.token.clone(), role);
        tracing::info!(%role, "logged in");
        Ok(reply)
    }

    pub fn logout(session: &mut Session) {
        session.log_out();
        tracing::info!("logged out");
    }

    /// Creates a student account. Every step of the form is checked before the upload.
    pub async fn signup(
        &self,
        form: &StudentSignup,
        mut picture: UploadFile,
        progress: Option<ProgressFn>,
    ) -> PortalResult<StatusMessage> {
        check_image(&picture)?;
        let report = form.validate_step(2);
        if !report.is_valid() {
            return Err(PortalError::Validation(report));
        }

        picture.field = IMAGE_FIELD.to_string();
        let fields = form.multipart_fields();
        self.api
            .upload(STUDENT_SIGNUP, picture, &fields, progress)
            .await
    }

    /// Faculties offered in the signup form.
    pub async fn faculties(&self) -> PortalResult<Vec<Faculty>> {
        let list: FacultyList = self.api.get(FACULTIES, &[]).await?;
        Ok(list.faculties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mock;
    use axum::extract::Multipart;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn signup_form() -> StudentSignup {
        StudentSignup {
            student: Student {
                first_name: "Nimal".into(),
                last_name: "Perera".into(),
                gender: "male".into(),
                birthday: Some("2001-04-12".into()),
                phone: "0771234567".into(),
                email: "nimal@example.com".into(),
                address: "12 Lake Road, Peradeniya".into(),
                bio: "Third year undergraduate reading physics, member of the chess club and \
                      a keen swimmer who trains at the university pool."
                    .into(),
                reg_no: "S/19/123".into(),
                index_no: "S12345".into(),
                faculty: "Science".into(),
                height: Some(172.0),
                weight: Some(64.5),
                blood_group: "o+".into(),
                ..Student::default()
            },
            password: "secret1!x".into(),
            confirm_password: "secret1!x".into(),
        }
    }

    #[tokio::test]
    async fn login_records_token_and_role() {
        let routes = Router::new().route(
            "/doctors/login",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["username"], "dr.silva");
                Json(json!({"status": "success", "message": "Welcome", "token": "jwt-1"}))
            }),
        );
        let api = mock::client(routes).await;
        let mut session = Session::default();

        let reply = AuthService::new(&api)
            .login(&mut session, Role::MedicalCentre, "dr.silva", "pw")
            .await
            .expect("login");

        assert_eq!(reply.message, "Welcome");
        assert_eq!(session.token.as_deref(), Some("jwt-1"));
        assert_eq!(session.role().expect("role"), Role::MedicalCentre);

        AuthService::logout(&mut session);
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn empty_credentials_never_reach_the_api() {
        let api = mock::unreachable();
        let mut session = Session::default();
        let err = AuthService::new(&api)
            .login(&mut session, Role::Student, "", "pw")
            .await
            .expect_err("should fail");
        match err {
            PortalError::Validation(report) => {
                assert_eq!(report.error_for("username"), Some("This field is required"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(!session.is_logged_in());
    }

    #[test]
    fn signup_steps_check_confirmation() {
        let mut form = signup_form();
        assert!(form.validate_step(2).is_valid());

        form.confirm_password = "different1!".into();
        let report = form.validate_step(0);
        assert_eq!(report.error_for("confirmPassword"), Some(CONFIRM_MISMATCH));

        let mut form = signup_form();
        form.student.blood_group.clear();
        assert!(form.validate_step(0).is_valid());
        assert!(!form.validate_step(2).is_valid());
    }

    #[tokio::test]
    async fn signup_uploads_picture_with_fields() {
        let routes = Router::new().route(
            "/students/signup",
            post(|mut multipart: Multipart| async move {
                let mut names = Vec::new();
                while let Some(field) = multipart.next_field().await.expect("field") {
                    names.push(field.name().unwrap_or_default().to_string());
                }
                assert!(names.contains(&"image".to_string()));
                assert!(names.contains(&"bloodGroup".to_string()));
                Json(json!({"status": "success", "message": "Account created"}))
            }),
        );
        let api = mock::client(routes).await;
        let picture = UploadFile::new("file", "dp.png", vec![1; 2048]);

        let reply = AuthService::new(&api)
            .signup(&signup_form(), picture, None)
            .await
            .expect("signup");
        assert_eq!(reply.message, "Account created");
    }

    #[tokio::test]
    async fn lists_faculties() {
        let routes = Router::new().route(
            "/faculties/all",
            get(|| async { Json(json!({"faculties": [{"_id": "f1", "name": "Science"}]})) }),
        );
        let api = mock::client(routes).await;
        let faculties = AuthService::new(&api).faculties().await.expect("faculties");
        assert_eq!(faculties[0].name, "Science");
    }
}
