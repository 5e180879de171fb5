//! Request and response schemas for the Dermascan backend
//!
//! Optional fields are modeled as `Option`; ids arrive already normalized to
//! `id` (see [`normalize_ids`](super::normalize_ids)).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::preferences::SelectedDoctor;
use crate::session::Role;

/// Canonical identifier of a backend entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wraps an id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwraps the id.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Accepts strings, numbers, and booleans, yielding their text form.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// `POST /api/auth/login` body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// `POST /api/auth/register` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    pub full_name: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Requested role.
    pub role: Role,
    /// Ten-digit mobile number.
    #[serde(rename = "mobilenumber")]
    pub mobile_number: String,
    /// Date of birth as entered.
    pub birth_date: String,
}

/// User block of an auth response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    /// Account id.
    pub id: EntityId,
    /// Account email.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Session role.
    pub role: Role,
    /// Doctor approval flag.
    #[serde(default)]
    pub is_approved: Option<bool>,
    /// Patient profile id, present for patients.
    #[serde(default, deserialize_with = "lenient_string")]
    pub patient_user_id: Option<String>,
    /// Doctor profile id, present for doctors after signup.
    #[serde(default, deserialize_with = "lenient_string")]
    pub doctor_user_id: Option<String>,
}

/// Response of login and register.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Bearer token.
    pub token: String,
    /// Authenticated user.
    pub user: AuthUser,
}

// ---------------------------------------------------------------------------
// Diagnosis
// ---------------------------------------------------------------------------

/// Diagnosis produced by the upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Diagnosis {
    /// Diagnosis label, e.g. `eczema`.
    pub result: String,
    /// Diagnosis id.
    pub id: EntityId,
}

/// `POST /api/upload` response.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    /// The diagnosis.
    pub diagnosis: Diagnosis,
}

// ---------------------------------------------------------------------------
// Doctors
// ---------------------------------------------------------------------------

/// A doctor as returned by patient and admin listings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    /// Doctor id.
    pub id: EntityId,
    /// Account id of the doctor.
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Account email.
    #[serde(default)]
    pub email: Option<String>,
    /// Medical specialization.
    #[serde(default)]
    pub specialization: Option<String>,
    /// Years of experience, as text.
    #[serde(default, deserialize_with = "lenient_string")]
    pub experience: Option<String>,
    /// Qualifications.
    #[serde(default)]
    pub qualifications: Option<String>,
    /// Hospital or clinic.
    #[serde(default)]
    pub hospital: Option<String>,
    /// Contact phone number.
    #[serde(default, deserialize_with = "lenient_string")]
    pub contact_number: Option<String>,
    /// License number.
    #[serde(default)]
    pub medical_license: Option<String>,
    /// Approval flag.
    #[serde(default)]
    pub is_approved: Option<bool>,
}

impl Doctor {
    /// Name to display, falling back to the id.
    pub fn display_name(&self) -> String {
        self.full_name
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// `GET /api/patient/doctors` response.
#[derive(Debug, Clone, Deserialize)]
pub struct DoctorsResponse {
    /// All approved doctors.
    pub doctors: Vec<Doctor>,
}

/// Response wrapping a single doctor.
#[derive(Debug, Clone, Deserialize)]
pub struct DoctorResponse {
    /// The doctor.
    pub doctor: Doctor,
}

/// `POST /api/patient/select-doctor/:id` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectDoctorRequest {
    /// Account id of the patient.
    pub patient_id: String,
    /// Diagnosis to share.
    pub diagnosis_id: String,
    /// Image of the diagnosis.
    pub image_url: String,
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

/// `POST /api/patient/appointments` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    /// Account id of the patient.
    pub patient_id: String,
    /// Doctor being booked.
    pub doctor_id: String,
    /// Appointment date, `YYYY-MM-DD`.
    pub date: String,
    /// Appointment time, 24-hour `HH:MM`.
    pub time: String,
    /// Always `pending` on creation.
    pub status: String,
    /// Free-text message to the doctor.
    pub message: String,
    /// Diagnosis being discussed.
    pub diagnosis_id: String,
    /// Image of the diagnosis.
    pub image_url: String,
    /// Proof that the doctor was selected first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_proof: Option<SelectedDoctor>,
}

/// `POST /api/patient/appointments` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    /// Id of the created appointment.
    #[serde(default, deserialize_with = "lenient_string")]
    pub appointment_id: Option<String>,
}

/// `POST /api/patient/send-diagnosis` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendDiagnosisRequest {
    /// Recipient doctor.
    pub doctor_id: String,
    /// Diagnosis being sent.
    pub diagnosis_id: String,
    /// Free-text message.
    pub message_text: String,
    /// Account id of the patient.
    pub patient_id: String,
    /// Image of the diagnosis.
    pub image_url: String,
    /// Proof that the doctor was selected first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_proof: Option<SelectedDoctor>,
}

/// An appointment as seen by the doctor.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Appointment id.
    pub id: EntityId,
    /// Patient who booked. Orphaned bookings come back without one.
    #[serde(default, deserialize_with = "lenient_string")]
    pub patient_id: Option<String>,
    /// Booked doctor.
    #[serde(default, deserialize_with = "lenient_string")]
    pub doctor_id: Option<String>,
    /// Appointment date.
    pub date: String,
    /// Appointment time.
    pub time: String,
    /// Remote status (`pending`, `confirmed`, `cancelled`).
    #[serde(default = "default_status")]
    pub status: String,
    /// Message left by the patient.
    #[serde(default)]
    pub message: Option<String>,
    /// Diagnosis attached to the booking.
    #[serde(default, deserialize_with = "lenient_string")]
    pub diagnosis_id: Option<String>,
    /// Image attached to the booking.
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_status() -> String {
    "pending".to_string()
}

/// `GET /api/doctor/appointments` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentsResponse {
    /// Appointments addressed to the doctor.
    pub appointments: Vec<Appointment>,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// A generated PDF report.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Report id.
    pub id: EntityId,
    /// Location of the PDF; absolute after [`ApiClient::view_reports`](super::ApiClient::view_reports).
    pub file_url: String,
    /// Creation date.
    #[serde(default)]
    pub date: Option<String>,
}

/// `GET /api/patient/reports/view-reports` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportsResponse {
    /// The patient's reports.
    pub reports: Vec<Report>,
}

/// `POST /api/doctor/reports/create-report` body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    /// Diagnosis the report is about.
    pub diagnosis_id: String,
    /// Optional clinical notes.
    pub doctor_notes: String,
    /// Medical findings.
    pub report_text: String,
}

/// Generic `{message}` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    /// Message from the backend.
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Doctor-side
// ---------------------------------------------------------------------------

/// `GET /api/doctor/profile` response.
#[derive(Debug, Clone, Deserialize)]
pub struct DoctorProfileResponse {
    /// The logged-in doctor.
    pub doctor: Doctor,
}

/// A diagnosis message sent by a patient to a doctor.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorMessage {
    /// Message id.
    #[serde(default)]
    pub id: Option<EntityId>,
    /// Sender.
    #[serde(default, deserialize_with = "lenient_string")]
    pub from: Option<String>,
    /// Recipient doctor.
    #[serde(default, deserialize_with = "lenient_string")]
    pub to: Option<String>,
    /// Message text.
    #[serde(default, alias = "messageText")]
    pub message: Option<String>,
    /// Attached diagnosis id.
    #[serde(default, deserialize_with = "lenient_string")]
    pub diagnosis_id: Option<String>,
    /// Attached diagnosis label.
    #[serde(default)]
    pub diagnosis: Option<String>,
    /// Attached image.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Send time.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `GET /api/doctor/messages` response.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    /// All messages visible to the doctor.
    pub messages: Vec<DoctorMessage>,
}

/// `POST /api/doctor/submit-medical-info` body.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicalInfoRequest {
    /// Medical specialization.
    pub specialization: String,
    /// Years of experience.
    pub experience: String,
    /// Qualifications.
    pub qualifications: String,
    /// License number.
    pub medical_license: String,
    /// Hospital or clinic.
    pub hospital: String,
    /// Contact phone number.
    pub contact_number: String,
    /// Account id of the doctor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}
