use std::path::Path;
use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use super::error::{ApiError, GENERIC_FAILURE_MESSAGE};
use super::types::*;
use crate::config::ApiConfig;
use crate::session::Session;

/// HTTP client for the Dermascan backend
///
/// Authenticated calls take the caller's [`Session`] explicitly; the client
/// itself holds no identity.
///
/// # Examples
///
/// ```no_run
/// use dermascan::api::{ApiClient, LoginRequest};
/// use dermascan::config::ApiConfig;
///
/// # async fn example() -> Result<(), dermascan::api::ApiError> {
/// let client = ApiClient::new(&ApiConfig::default())?;
/// let auth = client
///     .login(&LoginRequest {
///         email: "a@b.com".to_string(),
///         password: "secret1".to_string(),
///     })
///     .await?;
/// println!("logged in as {}", auth.user.id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a request, attaching the bearer token when given.
    fn build_request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "Building API request");
        let request = self
            .http
            .request(method, &url)
            .header(header::ACCEPT, "application/json");
        match token {
            Some(token) => request.header(header::AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    fn authed(
        &self,
        method: Method,
        path: &str,
        session: &Session,
    ) -> Result<RequestBuilder, ApiError> {
        if session.auth_token.is_empty() {
            return Err(ApiError::MissingCredentials(
                "no bearer token in session".to_string(),
            ));
        }
        Ok(self.build_request(method, path, Some(&session.auth_token)))
    }

    /// Sends a request and returns the classified, id-normalized JSON body.
    async fn execute(&self, request: RequestBuilder) -> Result<JsonValue, ApiError> {
        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                ApiError::InvalidRequest(e.to_string())
            } else {
                warn!("No response from backend: {}", e);
                ApiError::Connectivity(e.to_string())
            }
        })?;

        let status = response.status();
        let html_content = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Connectivity(format!("Failed to read response: {}", e)))?;

        debug!(status = status.as_u16(), bytes = body.len(), "Received API response");
        let mut value = classify_response(status, html_content, &body)?;
        normalize_ids(&mut value);
        Ok(value)
    }

    async fn execute_as<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let value = self.execute(request).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        session: Option<&Session>,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = match session {
            Some(session) => self.authed(Method::POST, path, session)?,
            None => self.build_request(Method::POST, path, None),
        };
        self.execute_as(request.json(body)).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        session: &Session,
    ) -> Result<T, ApiError> {
        let request = self.authed(Method::GET, path, session)?;
        self.execute_as(request).await
    }

    // -----------------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------------

    /// `POST /api/auth/login`
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let auth: AuthResponse = self.post_json("/api/auth/login", None, request).await?;
        info!(user_id = %auth.user.id, role = %auth.user.role, "Logged in");
        Ok(auth)
    }

    /// `POST /api/auth/register`
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let auth: AuthResponse = self.post_json("/api/auth/register", None, request).await?;
        info!(user_id = %auth.user.id, role = %auth.user.role, "Registered");
        Ok(auth)
    }

    // -----------------------------------------------------------------------
    // Patient
    // -----------------------------------------------------------------------

    /// `POST /api/upload` with the image as multipart field `image`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the image cannot be read.
    pub async fn upload_image(
        &self,
        session: &Session,
        image: &Path,
    ) -> Result<UploadResponse, ApiError> {
        let bytes = tokio::fs::read(image).await.map_err(|e| {
            ApiError::InvalidRequest(format!("Cannot read image {}: {}", image.display(), e))
        })?;
        let (file_name, mime) = image_file_meta(image);

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&mime)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let request = self.authed(Method::POST, "/api/upload", session)?.multipart(form);
        let response: UploadResponse = self.execute_as(request).await?;
        info!(diagnosis_id = %response.diagnosis.id, "Image diagnosed");
        Ok(response)
    }

    /// `GET /api/patient/doctors`
    pub async fn list_doctors(&self, session: &Session) -> Result<Vec<Doctor>, ApiError> {
        let response: DoctorsResponse = self.get_json("/api/patient/doctors", session).await?;
        Ok(response.doctors)
    }

    /// `GET /api/patient/doctors/:id`
    pub async fn get_doctor(&self, session: &Session, doctor_id: &str) -> Result<Doctor, ApiError> {
        let path = format!("/api/patient/doctors/{}", doctor_id);
        let response: DoctorResponse = self.get_json(&path, session).await?;
        Ok(response.doctor)
    }

    /// `POST /api/patient/select-doctor/:id`
    pub async fn select_doctor(
        &self,
        session: &Session,
        doctor_id: &str,
        request: &SelectDoctorRequest,
    ) -> Result<(), ApiError> {
        let path = format!("/api/patient/select-doctor/{}", doctor_id);
        let _: JsonValue = self.post_json(&path, Some(session), request).await?;
        Ok(())
    }

    /// `POST /api/patient/appointments`
    pub async fn book_appointment(
        &self,
        session: &Session,
        request: &AppointmentRequest,
    ) -> Result<BookingResponse, ApiError> {
        self.post_json("/api/patient/appointments", Some(session), request)
            .await
    }

    /// `POST /api/patient/send-diagnosis`
    pub async fn send_diagnosis(
        &self,
        session: &Session,
        request: &SendDiagnosisRequest,
    ) -> Result<(), ApiError> {
        let _: JsonValue = self
            .post_json("/api/patient/send-diagnosis", Some(session), request)
            .await?;
        Ok(())
    }

    /// `GET /api/patient/reports/view-reports`
    ///
    /// Relative `fileUrl` values are resolved against the base URL.
    pub async fn view_reports(&self, session: &Session) -> Result<Vec<Report>, ApiError> {
        let response: ReportsResponse = self
            .get_json("/api/patient/reports/view-reports", session)
            .await?;
        Ok(response
            .reports
            .into_iter()
            .map(|mut report| {
                report.file_url = self.absolute_url(&report.file_url);
                report
            })
            .collect())
    }

    fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    // -----------------------------------------------------------------------
    // Doctor
    // -----------------------------------------------------------------------

    /// `GET /api/doctor/appointments`
    pub async fn doctor_appointments(
        &self,
        session: &Session,
    ) -> Result<Vec<Appointment>, ApiError> {
        let response: AppointmentsResponse =
            self.get_json("/api/doctor/appointments", session).await?;
        Ok(response.appointments)
    }

    /// `GET /api/doctor/profile`
    pub async fn doctor_profile(&self, session: &Session) -> Result<Doctor, ApiError> {
        let response: DoctorProfileResponse = self.get_json("/api/doctor/profile", session).await?;
        Ok(response.doctor)
    }

    /// `GET /api/doctor/messages`
    pub async fn doctor_messages(&self, session: &Session) -> Result<Vec<DoctorMessage>, ApiError> {
        let response: MessagesResponse = self.get_json("/api/doctor/messages", session).await?;
        Ok(response.messages)
    }

    /// `POST /api/doctor/submit-medical-info`
    pub async fn submit_medical_info(
        &self,
        session: &Session,
        request: &MedicalInfoRequest,
    ) -> Result<(), ApiError> {
        let _: JsonValue = self
            .post_json("/api/doctor/submit-medical-info", Some(session), request)
            .await?;
        Ok(())
    }

    /// `POST /api/doctor/reports/create-report`
    pub async fn create_report(
        &self,
        session: &Session,
        request: &CreateReportRequest,
    ) -> Result<MessageResponse, ApiError> {
        let value: JsonValue = self
            .post_json("/api/doctor/reports/create-report", Some(session), request)
            .await?;
        Ok(message_of(value))
    }

    // -----------------------------------------------------------------------
    // Admin
    // -----------------------------------------------------------------------

    /// `GET /api/admin/pending-doctors`
    pub async fn pending_doctors(&self, session: &Session) -> Result<Vec<Doctor>, ApiError> {
        self.get_json("/api/admin/pending-doctors", session).await
    }

    /// `GET /api/admin/approved-doctors`
    pub async fn approved_doctors(&self, session: &Session) -> Result<Vec<Doctor>, ApiError> {
        self.get_json("/api/admin/approved-doctors", session).await
    }

    /// `POST /api/admin/approve-doctor/:id`
    pub async fn approve_doctor(
        &self,
        session: &Session,
        doctor_id: &str,
    ) -> Result<MessageResponse, ApiError> {
        let path = format!("/api/admin/approve-doctor/{}", doctor_id);
        let value: JsonValue = self
            .post_json(&path, Some(session), &serde_json::json!({}))
            .await?;
        info!(%doctor_id, "Doctor approved");
        Ok(message_of(value))
    }

    /// `DELETE /api/admin/reject-doctor/:id`
    pub async fn reject_doctor(
        &self,
        session: &Session,
        doctor_id: &str,
    ) -> Result<MessageResponse, ApiError> {
        let path = format!("/api/admin/reject-doctor/{}", doctor_id);
        let request = self.authed(Method::DELETE, &path, session)?;
        let value = self.execute(request).await?;
        info!(%doctor_id, "Doctor rejected");
        Ok(message_of(value))
    }
}

/// Turns a raw response into JSON or a classified error.
///
/// HTML is checked first so that an error page is never mistaken for a
/// server message.
fn classify_response(
    status: StatusCode,
    html_content: bool,
    body: &str,
) -> Result<JsonValue, ApiError> {
    if html_content || looks_like_html(body) {
        return Err(ApiError::MalformedUpstream {
            status: status.as_u16(),
        });
    }

    let parsed: Option<JsonValue> = if body.trim().is_empty() {
        None
    } else {
        serde_json::from_str(body).ok()
    };

    if !status.is_success() {
        let message = parsed
            .as_ref()
            .and_then(body_message)
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized {
                status: status.as_u16(),
                message,
            },
            _ => ApiError::Server {
                status: status.as_u16(),
                message,
            },
        });
    }

    let value = match parsed {
        Some(value) => value,
        None if body.trim().is_empty() => JsonValue::Null,
        None => return Err(ApiError::Decode("response body is not JSON".to_string())),
    };

    if value.get("success") == Some(&JsonValue::Bool(false)) {
        return Err(ApiError::Rejected {
            message: body_message(&value).unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
        });
    }

    Ok(value)
}

fn looks_like_html(body: &str) -> bool {
    body.trim_start().starts_with('<')
}

/// Extracts `message`, then `error`, from a JSON body.
fn body_message(value: &JsonValue) -> Option<String> {
    ["message", "error"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|v| v.as_str().map(str::to_string))
        .filter(|m| !m.trim().is_empty())
}

fn message_of(value: JsonValue) -> MessageResponse {
    MessageResponse {
        message: body_message(&value),
    }
}

/// Rewrites every `_id` key to `id` throughout a JSON document.
///
/// When both spellings are present `id` wins and `_id` is dropped. Numeric
/// ids become strings.
pub fn normalize_ids(value: &mut JsonValue) {
    match value {
        JsonValue::Object(map) => {
            if let Some(underscore) = map.remove("_id") {
                map.entry("id").or_insert(underscore);
            }
            if let Some(id) = map.get_mut("id") {
                if id.is_number() {
                    *id = JsonValue::String(id.to_string());
                }
            }
            for child in map.values_mut() {
                normalize_ids(child);
            }
        }
        JsonValue::Array(items) => items.iter_mut().for_each(normalize_ids),
        _ => {}
    }
}

/// File name and MIME type for an upload, `image/jpeg` when unknown.
fn image_file_meta(image: &Path) -> (String, String) {
    let file_name = image
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "image.jpg".to_string());
    let mime = image
        .extension()
        .map(|ext| format!("image/{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_else(|| "image/jpeg".to_string());
    (file_name, mime)
}
