//! Logical key names used in the local store
//!
//! These names are shared with earlier releases of the mobile client, so
//! data written by either side stays readable.

/// Bearer token for patient and admin sessions
pub const TOKEN: &str = "token";
/// Bearer token for doctor sessions
pub const DOCTOR_TOKEN: &str = "doctorToken";
/// Account identifier of the logged-in user
pub const USER_ID: &str = "userId";
/// Session role (`patient`, `doctor`, `admin`)
pub const ROLE: &str = "role";
/// Display name
pub const FULL_NAME: &str = "fullName";
/// Login email
pub const EMAIL: &str = "email";
/// Doctor approval flag, stored as `"true"` / `"false"`
pub const IS_APPROVED: &str = "isApproved";
/// Patient profile identifier (distinct from the account id)
pub const PATIENT_ID: &str = "patientId";
/// Doctor identifier, mirrors `userId` for doctor sessions
pub const DOCTOR_ID: &str = "doctorId";
/// Local URI of the profile picture
pub const PROFILE_IMAGE: &str = "profileImage";
/// Doctor-side list of locally confirmed appointments
pub const CONFIRMED_APPOINTMENTS: &str = "confirmedAppointments";
/// Doctor picked by the patient before booking
pub const SELECTED_DOCTOR: &str = "selectedDoctor";
/// `light` or `dark`
pub const THEME_PREFERENCE: &str = "themePreference";
/// Read-only mirror of the latest diagnosis id
pub const DIAGNOSIS_ID: &str = "diagnosisId";
/// Read-only mirror of the latest diagnosis image
pub const IMAGE_URI: &str = "imageUri";

/// Every key that belongs to a login session.
pub const SESSION_KEYS: &[&str] = &[
    TOKEN,
    DOCTOR_TOKEN,
    USER_ID,
    ROLE,
    FULL_NAME,
    EMAIL,
    IS_APPROVED,
    PATIENT_ID,
    DOCTOR_ID,
];

/// Key of the per-patient diagnosis record.
pub fn patient_results(patient_id: &str) -> String {
    format!("patient_{}_results", patient_id)
}

/// Key of the per-patient notification list.
pub fn notifications(patient_id: &str) -> String {
    format!("notifications_{}", patient_id)
}
