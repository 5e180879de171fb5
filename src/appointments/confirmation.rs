use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::format::{format_date, format_time};
use crate::api::Appointment;
use crate::error::{DermascanError, Result};
use crate::storage::{get_json, keys, KeyValueStore};

/// Status carried by every entry in the confirmed list.
pub const CONFIRMED_STATUS: &str = "confirmed";

/// Title of the notification sent on confirmation.
pub const CONFIRMATION_TITLE: &str = "Appointment Confirmed";

/// An appointment the doctor confirmed on this device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedAppointmentEntry {
    /// Remote appointment id
    pub appointment_id: String,
    /// Patient who booked
    pub patient_id: String,
    /// Raw date as received
    pub date: String,
    /// Raw time as received
    pub time: String,
    /// e.g. `May 1, 2024`
    pub date_formatted: String,
    /// e.g. `10:00 AM`
    pub time_formatted: String,
    /// Always [`CONFIRMED_STATUS`]
    pub status: String,
    /// When the doctor confirmed
    pub confirmed_at: DateTime<Utc>,
}

/// Notification queued for a patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEntry {
    /// Short heading
    pub title: String,
    /// Body text
    pub message: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Appointment the notification is about
    pub appointment_id: String,
}

/// Doctor-side cache of locally confirmed appointments
///
/// The confirmed list and each patient's notification list are stored
/// newest-first. Writes from one cache instance (and its clones) are
/// serialized; separate instances over the same store are last-writer-wins.
#[derive(Clone)]
pub struct ConfirmationCache {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl ConfirmationCache {
    /// Creates a cache over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Records `appointment` as confirmed and notifies its patient.
    ///
    /// Both effects are written in one batch, confirmed list first, so a
    /// partial write can only leave a confirmation without its
    /// notification. Retrying is safe: an appointment already in the list
    /// is not added again, and a patient never gets two notifications for
    /// the same appointment.
    ///
    /// # Errors
    ///
    /// Returns `DermascanError::Validation` when the appointment has no
    /// patient, or a storage error when the batch is not saved.
    pub async fn confirm_locally(
        &self,
        appointment: &Appointment,
    ) -> Result<ConfirmedAppointmentEntry> {
        let patient_id = match appointment.patient_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => {
                return Err(
                    DermascanError::Validation("Appointment has no patient".to_string()).into(),
                )
            }
        };

        let _guard = self.write_lock.lock().await;
        let appointment_id = appointment.id.as_str();
        let notifications_key = keys::notifications(patient_id);

        let mut confirmed = self.load_confirmed().await?;
        let mut notifications: Vec<NotificationEntry> =
            get_json(self.store.as_ref(), &notifications_key)
                .await?
                .unwrap_or_default();

        let existing = confirmed
            .iter()
            .find(|e| e.appointment_id == appointment_id)
            .cloned();
        let notified = notifications
            .iter()
            .any(|n| n.appointment_id == appointment_id);

        let newly_confirmed = existing.is_none();
        let entry = match existing {
            Some(entry) => entry,
            None => {
                let entry = ConfirmedAppointmentEntry {
                    appointment_id: appointment_id.to_string(),
                    patient_id: patient_id.to_string(),
                    date: appointment.date.clone(),
                    time: appointment.time.clone(),
                    date_formatted: format_date(&appointment.date),
                    time_formatted: format_time(&appointment.time),
                    status: CONFIRMED_STATUS.to_string(),
                    confirmed_at: Utc::now(),
                };
                confirmed.insert(0, entry.clone());
                entry
            }
        };

        let mut batch = Vec::with_capacity(2);
        if newly_confirmed {
            batch.push((keys::CONFIRMED_APPOINTMENTS.to_string(), to_json(&confirmed)?));
        }
        if !notified {
            notifications.insert(
                0,
                NotificationEntry {
                    title: CONFIRMATION_TITLE.to_string(),
                    message: format!(
                        "Your appointment on {} at {} has been confirmed.",
                        entry.date_formatted, entry.time_formatted
                    ),
                    timestamp: Utc::now(),
                    appointment_id: appointment_id.to_string(),
                },
            );
            batch.push((notifications_key, to_json(&notifications)?));
        }

        if batch.is_empty() {
            tracing::debug!(%appointment_id, "Appointment already confirmed");
        } else {
            self.store.set_many(&batch).await?;
            tracing::info!(
                %appointment_id,
                patient_id = %entry.patient_id,
                "Appointment confirmed locally"
            );
        }
        Ok(entry)
    }

    /// Confirmed appointments, newest first.
    pub async fn snapshot(&self) -> Result<Vec<ConfirmedAppointmentEntry>> {
        self.load_confirmed().await
    }

    /// Notifications for `patient_id`, newest first.
    pub async fn notifications(&self, patient_id: &str) -> Result<Vec<NotificationEntry>> {
        Ok(get_json(self.store.as_ref(), &keys::notifications(patient_id))
            .await?
            .unwrap_or_default())
    }

    /// Drops the whole confirmed list. Notifications are kept.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(keys::CONFIRMED_APPOINTMENTS).await
    }

    async fn load_confirmed(&self) -> Result<Vec<ConfirmedAppointmentEntry>> {
        Ok(get_json(self.store.as_ref(), keys::CONFIRMED_APPOINTMENTS)
            .await?
            .unwrap_or_default())
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value).map_err(DermascanError::Serialization)?)
}
