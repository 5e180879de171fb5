//! Per-patient cache of the most recent diagnosis
//!
//! The record under `patient_<id>_results` is authoritative. The flat
//! `diagnosisId` / `imageUri` keys are a mirror kept for older readers and
//! are never consulted by this crate when the per-patient record exists.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DermascanError, Result};
use crate::storage::{get_json, keys, KeyValueStore};

/// Latest diagnosis for one patient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRecord {
    /// Owning patient; filled from the key on read
    #[serde(default)]
    pub patient_id: String,
    /// Local path or remote URL of the photographed skin area
    #[serde(rename = "imageUri")]
    pub image_reference: String,
    /// Label returned by the diagnosis service
    #[serde(rename = "diagnosis")]
    pub diagnosis_label: String,
    /// Id assigned by the diagnosis service
    pub diagnosis_id: String,
    /// When the record was written
    pub created_at: DateTime<Utc>,
}

/// Values of the flat mirror keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirroredDiagnosis {
    /// Last mirrored diagnosis id
    pub diagnosis_id: Option<String>,
    /// Last mirrored image reference
    pub image_uri: Option<String>,
}

/// Reads and writes [`DiagnosisRecord`]s
#[derive(Clone)]
pub struct DiagnosisCache {
    store: Arc<dyn KeyValueStore>,
}

impl DiagnosisCache {
    /// Creates a cache over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stores the diagnosis for `patient_id`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `DermascanError::MissingPatientIdentity` when `patient_id` is
    /// absent or empty; nothing is written in that case.
    pub async fn record(
        &self,
        patient_id: Option<&str>,
        image_reference: &str,
        diagnosis_label: &str,
        diagnosis_id: &str,
    ) -> Result<DiagnosisRecord> {
        let patient_id = match patient_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(DermascanError::MissingPatientIdentity.into()),
        };

        let record = DiagnosisRecord {
            patient_id: patient_id.to_string(),
            image_reference: image_reference.to_string(),
            diagnosis_label: diagnosis_label.to_string(),
            diagnosis_id: diagnosis_id.to_string(),
            created_at: Utc::now(),
        };
        let raw = serde_json::to_string(&record)
            .map_err(|e| DermascanError::Storage(format!("Serialization failed: {}", e)))?;

        self.store
            .set_many(&[
                (keys::patient_results(patient_id), raw),
                (keys::DIAGNOSIS_ID.to_string(), record.diagnosis_id.clone()),
                (keys::IMAGE_URI.to_string(), record.image_reference.clone()),
            ])
            .await?;

        tracing::info!(%patient_id, diagnosis_id = %record.diagnosis_id, "Diagnosis cached");
        Ok(record)
    }

    /// Latest diagnosis for `patient_id`, if any.
    pub async fn fetch(&self, patient_id: &str) -> Result<Option<DiagnosisRecord>> {
        let record: Option<DiagnosisRecord> =
            get_json(self.store.as_ref(), &keys::patient_results(patient_id)).await?;
        Ok(record.map(|mut r| {
            r.patient_id = patient_id.to_string();
            r
        }))
    }

    /// Reads the flat mirror keys.
    ///
    /// Prefer [`fetch`](Self::fetch); the mirror is not tied to a patient.
    pub async fn mirrored(&self) -> Result<MirroredDiagnosis> {
        Ok(MirroredDiagnosis {
            diagnosis_id: self.store.get(keys::DIAGNOSIS_ID).await?,
            image_uri: self.store.get(keys::IMAGE_URI).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn cache() -> (DiagnosisCache, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (DiagnosisCache::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_record_then_fetch() {
        let (cache, _) = cache();
        cache
            .record(Some("P1"), "/tmp/skin.jpg", "eczema", "D1")
            .await
            .unwrap();

        let record = cache.fetch("P1").await.unwrap().unwrap();
        assert_eq!(record.patient_id, "P1");
        assert_eq!(record.diagnosis_label, "eczema");
        assert_eq!(record.diagnosis_id, "D1");
        assert_eq!(record.image_reference, "/tmp/skin.jpg");
    }

    #[tokio::test]
    async fn test_new_record_overwrites_previous() {
        let (cache, _) = cache();
        cache.record(Some("P1"), "a.jpg", "eczema", "D1").await.unwrap();
        cache.record(Some("P1"), "b.jpg", "psoriasis", "D2").await.unwrap();

        let record = cache.fetch("P1").await.unwrap().unwrap();
        assert_eq!(record.diagnosis_id, "D2");
        assert_eq!(record.image_reference, "b.jpg");
    }

    #[tokio::test]
    async fn test_records_are_per_patient() {
        let (cache, _) = cache();
        cache.record(Some("P1"), "a.jpg", "eczema", "D1").await.unwrap();
        cache.record(Some("P2"), "b.jpg", "acne", "D2").await.unwrap();

        assert_eq!(cache.fetch("P1").await.unwrap().unwrap().diagnosis_id, "D1");
        assert_eq!(cache.fetch("P2").await.unwrap().unwrap().diagnosis_id, "D2");
    }

    #[tokio::test]
    async fn test_missing_patient_fails_without_writing() {
        let (cache, store) = cache();
        for patient in [None, Some(""), Some("   ")] {
            let err = cache
                .record(patient, "a.jpg", "eczema", "D1")
                .await
                .unwrap_err();
            assert!(matches!(
                err.downcast_ref::<DermascanError>(),
                Some(DermascanError::MissingPatientIdentity)
            ));
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_mirror_keys_follow_latest_record() {
        let (cache, _) = cache();
        cache.record(Some("P1"), "a.jpg", "eczema", "D1").await.unwrap();
        cache.record(Some("P2"), "b.jpg", "acne", "D2").await.unwrap();

        let mirror = cache.mirrored().await.unwrap();
        assert_eq!(mirror.diagnosis_id.as_deref(), Some("D2"));
        assert_eq!(mirror.image_uri.as_deref(), Some("b.jpg"));
    }

    #[tokio::test]
    async fn test_fetch_reads_legacy_layout() {
        let (cache, store) = cache();
        store
            .set(
                "patient_P7_results",
                r#"{"imageUri":"file:///x.jpg","diagnosis":"melanoma","diagnosisId":"D7","createdAt":"2024-05-01T10:00:00.000Z"}"#,
            )
            .await
            .unwrap();
        let record = cache.fetch("P7").await.unwrap().unwrap();
        assert_eq!(record.patient_id, "P7");
        assert_eq!(record.diagnosis_label, "melanoma");
    }

    #[tokio::test]
    async fn test_fetch_unknown_patient() {
        let (cache, _) = cache();
        assert!(cache.fetch("nobody").await.unwrap().is_none());
    }
}
