//! Test utilities for Dermascan
//!
//! Assertion helpers and sample domain values shared by unit tests.

use crate::api::{Appointment, EntityId};
use crate::error::Result;
use crate::session::{Role, Session};
/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Logged-in patient "Jane"
pub fn patient_session() -> Session {
    Session {
        auth_token: "T1".to_string(),
        role: Role::Patient,
        user_id: "U1".to_string(),
        display_name: "Jane".to_string(),
        approval_status: false,
        email: Some("a@b.com".to_string()),
        patient_id: Some("P1".to_string()),
    }
}

/// Logged-in, approved doctor
pub fn doctor_session() -> Session {
    Session {
        auth_token: "DOC-TOKEN".to_string(),
        role: Role::Doctor,
        user_id: "DOC1".to_string(),
        display_name: "Dr. House".to_string(),
        approval_status: true,
        email: Some("house@clinic.com".to_string()),
        patient_id: None,
    }
}

/// Pending appointment on 2024-05-01 at 10:00
pub fn sample_appointment(id: &str, patient_id: &str) -> Appointment {
    Appointment {
        id: EntityId::new(id),
        patient_id: Some(patient_id.to_string()),
        doctor_id: Some("DOC1".to_string()),
        date: "2024-05-01".to_string(),
        time: "10:00".to_string(),
        status: "pending".to_string(),
        message: None,
        diagnosis_id: Some("D1".to_string()),
        image_url: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DermascanError;

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> =
            Err(DermascanError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<()> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<()> =
            Err(DermascanError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_sample_appointment() {
        let appointment = sample_appointment("A1", "P1");
        assert_eq!(appointment.id.as_str(), "A1");
        assert_eq!(appointment.patient_id.as_deref(), Some("P1"));
    }
}
