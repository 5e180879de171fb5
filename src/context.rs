//! Application context
//!
//! [`AppContext`] bundles the store, the caches, and the API client, and
//! implements the workflows that span more than one of them. Every
//! authenticated workflow reads the session once and passes it down
//! explicitly.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::api::{
    ApiClient, Appointment, AppointmentRequest, Doctor, DoctorMessage, LoginRequest,
    MessageResponse, Report, SelectDoctorRequest, SendDiagnosisRequest,
};
use crate::appointments::{ConfirmationCache, ConfirmedAppointmentEntry, ExpirySweep};
use crate::config::Config;
use crate::diagnosis::{DiagnosisCache, DiagnosisRecord};
use crate::error::{DermascanError, Result};
use crate::preferences::{Preferences, SelectedDoctor};
use crate::session::{Role, Session, SessionManager};
use crate::storage::{KeyValueStore, SledStore};
use crate::validation::{self, BookingForm, LoginForm, MedicalInfoForm, SignupForm};

/// Result of a successful booking
#[derive(Debug, Clone, PartialEq)]
pub struct BookingOutcome {
    /// Id assigned by the backend, when returned
    pub appointment_id: Option<String>,
    pub doctor_id: String,
    pub diagnosis_id: String,
    pub date: String,
    /// 24-hour `HH:MM`
    pub time: String,
}

/// Shared state and workflows for one installation
#[derive(Clone)]
pub struct AppContext {
    store: Arc<dyn KeyValueStore>,
    sessions: SessionManager,
    diagnoses: DiagnosisCache,
    confirmations: ConfirmationCache,
    preferences: Preferences,
    api: ApiClient,
}

impl AppContext {
    /// Opens the durable store named by `config` and builds a context.
    ///
    /// # Errors
    ///
    /// Fails when the store cannot be opened or the HTTP client cannot be
    /// built.
    pub fn new(config: &Config) -> Result<Self> {
        let store = match &config.storage.path {
            Some(path) => SledStore::open(path)?,
            None => SledStore::new()?,
        };
        Self::with_store(config, Arc::new(store))
    }

    /// Builds a context over an existing store.
    pub fn with_store(config: &Config, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        Ok(Self {
            sessions: SessionManager::new(store.clone()),
            diagnoses: DiagnosisCache::new(store.clone()),
            confirmations: ConfirmationCache::new(store.clone()),
            preferences: Preferences::new(store.clone()),
            api: ApiClient::new(&config.api)?,
            store,
        })
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn diagnoses(&self) -> &DiagnosisCache {
        &self.diagnoses
    }

    pub fn confirmations(&self) -> &ConfirmationCache {
        &self.confirmations
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    // -----------------------------------------------------------------------
    // Session
    // -----------------------------------------------------------------------

    /// Logs in and replaces the stored session.
    pub async fn login(&self, form: &LoginForm) -> Result<Session> {
        form.validate()?;
        let auth = self
            .api
            .login(&LoginRequest {
                email: form.email.trim().to_string(),
                password: form.password.clone(),
            })
            .await?;

        let mut session = Session::from_auth(&auth, None);
        if session.email.is_none() {
            session.email = Some(form.email.trim().to_string());
        }
        self.sessions.establish(&session).await?;
        Ok(session)
    }

    /// Registers a new account and logs it in.
    pub async fn signup(&self, form: &SignupForm) -> Result<Session> {
        let request = form.validate()?;
        let auth = self.api.register(&request).await?;

        let mut session = Session::from_auth(&auth, Some(&request.full_name));
        if session.email.is_none() {
            session.email = Some(request.email.clone());
        }
        self.sessions.establish(&session).await?;
        Ok(session)
    }

    /// Ends the session. A doctor's confirmed appointments go with it.
    ///
    /// Logging out without a session is not an error.
    pub async fn logout(&self) -> Result<()> {
        let role = match self.sessions.current().await {
            Ok(session) => session.map(|s| s.role),
            Err(e) => {
                warn!("Could not read session before logout: {}", e);
                None
            }
        };
        if role == Some(Role::Doctor) {
            self.confirmations.clear().await?;
        }
        self.sessions.teardown().await
    }

    /// The current session, or an authentication error.
    pub async fn require_session(&self) -> Result<Session> {
        self.sessions.require().await
    }

    /// The current session if it has `role`.
    ///
    /// # Errors
    ///
    /// Authentication error without a session; validation error for a
    /// session of another role.
    pub async fn require_role(&self, role: Role) -> Result<Session> {
        let session = self.require_session().await?;
        if session.role != role {
            return Err(DermascanError::Validation(format!(
                "This action is only available to {} accounts",
                role
            ))
            .into());
        }
        Ok(session)
    }

    // -----------------------------------------------------------------------
    // Patient
    // -----------------------------------------------------------------------

    /// Uploads `image`, then caches the diagnosis under the session's
    /// patient id.
    ///
    /// The upload is sent before the patient id is checked, so a session
    /// without one gets a diagnosis from the backend that is not cached.
    ///
    /// # Errors
    ///
    /// `DermascanError::MissingPatientIdentity` when the session has no
    /// patient id; API errors as returned by the upload.
    pub async fn upload_and_diagnose(&self, image: &Path) -> Result<DiagnosisRecord> {
        let is_file = tokio::fs::metadata(image)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(
                DermascanError::Validation("Please select or take a photo".to_string()).into(),
            );
        }
        let session = self.require_session().await?;
        let response = self.api.upload_image(&session, image).await?;

        self.diagnoses
            .record(
                session.patient_id.as_deref(),
                &image.display().to_string(),
                &response.diagnosis.result,
                response.diagnosis.id.as_str(),
            )
            .await
    }

    /// Latest cached diagnosis of the logged-in patient.
    pub async fn latest_diagnosis(&self) -> Result<Option<DiagnosisRecord>> {
        let session = self.require_session().await?;
        match session.patient_id.as_deref() {
            Some(patient_id) => self.diagnoses.fetch(patient_id).await,
            None => Err(DermascanError::MissingPatientIdentity.into()),
        }
    }

    async fn require_doctor_browser(&self) -> Result<Session> {
        let session = self.require_session().await?;
        if session.role == Role::Doctor {
            return Err(DermascanError::Validation(
                "Doctors cannot view other doctor profiles".to_string(),
            )
            .into());
        }
        Ok(session)
    }

    /// Approved doctors a patient can pick from.
    pub async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        let session = self.require_doctor_browser().await?;
        Ok(self.api.list_doctors(&session).await?)
    }

    pub async fn get_doctor(&self, doctor_id: &str) -> Result<Doctor> {
        let session = self.require_doctor_browser().await?;
        Ok(self.api.get_doctor(&session, doctor_id).await?)
    }

    /// Shares the latest diagnosis with a doctor and remembers the choice.
    ///
    /// # Errors
    ///
    /// Validation error "Diagnosis data not found" when the patient has no
    /// cached diagnosis.
    pub async fn select_doctor(&self, doctor_id: &str) -> Result<SelectedDoctor> {
        let session = self.require_doctor_browser().await?;
        let record = match session.patient_id.as_deref() {
            Some(patient_id) => self.diagnoses.fetch(patient_id).await?,
            None => None,
        }
        .ok_or_else(|| DermascanError::Validation("Diagnosis data not found".to_string()))?;

        let doctor = self.api.get_doctor(&session, doctor_id).await?;
        self.api
            .select_doctor(
                &session,
                doctor_id,
                &SelectDoctorRequest {
                    patient_id: session.user_id.clone(),
                    diagnosis_id: record.diagnosis_id.clone(),
                    image_url: record.image_reference.clone(),
                },
            )
            .await?;

        let selected = SelectedDoctor {
            doctor_id: doctor_id.to_string(),
            user_id: doctor.user_id.clone(),
            doctor_name: doctor.display_name(),
            specialization: doctor.specialization.clone(),
            selected_at: Utc::now(),
            diagnosis_id: Some(record.diagnosis_id),
            image_uri: Some(record.image_reference),
        };
        self.preferences.set_selected_doctor(&selected).await?;
        info!(%doctor_id, "Doctor selected");
        Ok(selected)
    }

    /// Books the selected doctor and sends them the diagnosis.
    ///
    /// Both requests are issued together; the booking succeeds only when
    /// both do.
    pub async fn book_appointment(&self, form: &BookingForm) -> Result<BookingOutcome> {
        let session = self.require_doctor_browser().await?;
        let selected = self.preferences.selected_doctor().await?;
        let booking = form.validate(selected.as_ref())?;

        let cached = match session.patient_id.as_deref() {
            Some(patient_id) => self.diagnoses.fetch(patient_id).await?,
            None => None,
        };
        let (diagnosis_id, image_url) = match (
            booking.selection.diagnosis_id.clone(),
            booking.selection.image_uri.clone(),
            cached,
        ) {
            (Some(id), Some(uri), _) => (id, uri),
            (_, _, Some(record)) => (record.diagnosis_id, record.image_reference),
            _ => {
                return Err(
                    DermascanError::Validation("Diagnosis data not found".to_string()).into(),
                )
            }
        };

        let appointment = AppointmentRequest {
            patient_id: session.user_id.clone(),
            doctor_id: form.doctor_id.clone(),
            date: booking.date.clone(),
            time: booking.time.clone(),
            status: "pending".to_string(),
            message: booking.message.clone(),
            diagnosis_id: diagnosis_id.clone(),
            image_url: image_url.clone(),
            selection_proof: Some(booking.selection.clone()),
        };
        let diagnosis = SendDiagnosisRequest {
            doctor_id: form.doctor_id.clone(),
            diagnosis_id: diagnosis_id.clone(),
            message_text: booking.message.clone(),
            patient_id: session.user_id.clone(),
            image_url,
            selection_proof: Some(booking.selection),
        };

        let (booked, ()) = tokio::try_join!(
            self.api.book_appointment(&session, &appointment),
            self.api.send_diagnosis(&session, &diagnosis),
        )?;

        info!(doctor_id = %form.doctor_id, "Appointment booked");
        Ok(BookingOutcome {
            appointment_id: booked.appointment_id,
            doctor_id: form.doctor_id.clone(),
            diagnosis_id,
            date: booking.date,
            time: booking.time,
        })
    }

    /// Reports generated for the logged-in patient.
    pub async fn view_reports(&self) -> Result<Vec<Report>> {
        let session = self.require_role(Role::Patient).await?;
        Ok(self.api.view_reports(&session).await?)
    }

    // -----------------------------------------------------------------------
    // Doctor
    // -----------------------------------------------------------------------

    pub async fn doctor_appointments(&self) -> Result<Vec<Appointment>> {
        let session = self.require_role(Role::Doctor).await?;
        Ok(self.api.doctor_appointments(&session).await?)
    }

    /// Confirms one of the doctor's appointments on this device.
    ///
    /// The appointment is looked up remotely; the confirmation itself is
    /// local only.
    pub async fn confirm_appointment(
        &self,
        appointment_id: &str,
    ) -> Result<ConfirmedAppointmentEntry> {
        let session = self.require_role(Role::Doctor).await?;
        let appointment = self
            .api
            .doctor_appointments(&session)
            .await?
            .into_iter()
            .find(|a| a.id.as_str() == appointment_id)
            .ok_or_else(|| {
                DermascanError::Validation(format!("Appointment not found: {}", appointment_id))
            })?;
        self.confirmations.confirm_locally(&appointment).await
    }

    pub async fn confirmed_appointments(&self) -> Result<Vec<ConfirmedAppointmentEntry>> {
        self.confirmations.snapshot().await
    }

    /// A disarmed sweep over this context's confirmed list.
    pub fn expiry_sweep(&self) -> ExpirySweep {
        ExpirySweep::new(self.confirmations.clone())
    }

    /// Messages addressed to the logged-in doctor.
    pub async fn doctor_messages(&self) -> Result<Vec<DoctorMessage>> {
        let session = self.require_role(Role::Doctor).await?;
        let messages = self.api.doctor_messages(&session).await?;
        Ok(messages
            .into_iter()
            .filter(|m| m.to.as_deref() == Some(session.user_id.as_str()))
            .collect())
    }

    pub async fn doctor_profile(&self) -> Result<Doctor> {
        let session = self.require_role(Role::Doctor).await?;
        Ok(self.api.doctor_profile(&session).await?)
    }

    pub async fn submit_medical_info(&self, form: &MedicalInfoForm) -> Result<()> {
        let session = self.require_role(Role::Doctor).await?;
        let request = form.validate(Some(&session.user_id))?;
        self.api.submit_medical_info(&session, &request).await?;
        info!(user_id = %session.user_id, "Medical info submitted");
        Ok(())
    }

    pub async fn create_report(
        &self,
        diagnosis_id: &str,
        report_text: &str,
        doctor_notes: Option<&str>,
    ) -> Result<MessageResponse> {
        let session = self.require_role(Role::Doctor).await?;
        let request = validation::report_request(diagnosis_id, report_text, doctor_notes)?;
        Ok(self.api.create_report(&session, &request).await?)
    }

    // -----------------------------------------------------------------------
    // Admin
    // -----------------------------------------------------------------------

    pub async fn pending_doctors(&self) -> Result<Vec<Doctor>> {
        let session = self.require_role(Role::Admin).await?;
        Ok(self.api.pending_doctors(&session).await?)
    }

    pub async fn approved_doctors(&self) -> Result<Vec<Doctor>> {
        let session = self.require_role(Role::Admin).await?;
        Ok(self.api.approved_doctors(&session).await?)
    }

    pub async fn approve_doctor(&self, doctor_id: &str) -> Result<MessageResponse> {
        let session = self.require_role(Role::Admin).await?;
        Ok(self.api.approve_doctor(&session, doctor_id).await?)
    }

    pub async fn reject_doctor(&self, doctor_id: &str) -> Result<MessageResponse> {
        let session = self.require_role(Role::Admin).await?;
        Ok(self.api.reject_doctor(&session, doctor_id).await?)
    }

    /// Wipes every key in the store, the admin session included.
    pub async fn clear_store(&self) -> Result<()> {
        self.require_role(Role::Admin).await?;
        self.store.clear().await?;
        info!("Local store cleared");
        Ok(())
    }
}
