//! Form validation
//!
//! Everything here runs before a network call. Failures are
//! `DermascanError::Validation` carrying the text shown to the user.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::api::{CreateReportRequest, MedicalInfoRequest, RegisterRequest};
use crate::appointments::to_24_hour;
use crate::error::{DermascanError, Result};
use crate::preferences::SelectedDoctor;
use crate::session::Role;

const EMAIL_PATTERN: &str = r"\S+@\S+\.\S+";
const PHONE_PATTERN: &str = r"^\d{10}$";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn invalid(message: &str) -> anyhow::Error {
    DermascanError::Validation(message.to_string()).into()
}

fn matches(cell: &'static OnceLock<Regex>, pattern: &str, value: &str) -> Result<bool> {
    let re = match cell.get() {
        Some(re) => re,
        None => {
            let compiled = Regex::new(pattern)
                .map_err(|e| DermascanError::Validation(format!("Invalid pattern: {}", e)))?;
            cell.get_or_init(|| compiled)
        }
    };
    Ok(re.is_match(value))
}

fn any_blank(fields: &[&str]) -> bool {
    fields.iter().any(|f| f.trim().is_empty())
}

/// Login form
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Fails when either field is empty.
    pub fn validate(&self) -> Result<()> {
        if any_blank(&[&self.email, &self.password]) {
            return Err(invalid("Please enter email and password."));
        }
        Ok(())
    }
}

/// Signup form
#[derive(Debug, Clone)]
pub struct SignupForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub mobile_number: String,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    pub role: Role,
}

impl SignupForm {
    /// Checks the form and builds the register request.
    ///
    /// Admin accounts cannot be created through signup.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: required fields, email shape,
    /// password length, 10-digit mobile number, birth date, role.
    pub fn validate(&self) -> Result<RegisterRequest> {
        if any_blank(&[
            &self.full_name,
            &self.email,
            &self.password,
            &self.mobile_number,
            &self.birth_date,
        ]) {
            return Err(invalid("Please fill in all fields."));
        }
        if !matches(&EMAIL_RE, EMAIL_PATTERN, self.email.trim())? {
            return Err(invalid("Please enter a valid email address."));
        }
        if self.password.chars().count() < 6 {
            return Err(invalid("Password must be at least 6 characters long."));
        }
        if !matches(&PHONE_RE, PHONE_PATTERN, self.mobile_number.trim())? {
            return Err(invalid("Please enter a valid 10-digit mobile number."));
        }
        if NaiveDate::parse_from_str(self.birth_date.trim(), "%Y-%m-%d").is_err() {
            return Err(invalid("Please enter your birth date as YYYY-MM-DD."));
        }
        if self.role == Role::Admin {
            return Err(invalid("Please sign up as a patient or a doctor."));
        }

        Ok(RegisterRequest {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            role: self.role,
            mobile_number: self.mobile_number.trim().to_string(),
            birth_date: self.birth_date.trim().to_string(),
        })
    }
}

/// Doctor medical information form
#[derive(Debug, Clone, Default)]
pub struct MedicalInfoForm {
    pub specialization: String,
    pub experience: String,
    pub qualifications: String,
    pub medical_license: String,
    pub hospital: String,
    pub contact_number: String,
}

impl MedicalInfoForm {
    /// Checks the form and builds a request with trimmed values.
    ///
    /// # Errors
    ///
    /// Fails when a field is empty or the contact number is not 10 digits.
    pub fn validate(&self, user_id: Option<&str>) -> Result<MedicalInfoRequest> {
        if any_blank(&[
            &self.specialization,
            &self.experience,
            &self.qualifications,
            &self.medical_license,
            &self.hospital,
            &self.contact_number,
        ]) {
            return Err(invalid("Please fill in all fields."));
        }
        if !matches(&PHONE_RE, PHONE_PATTERN, self.contact_number.trim())? {
            return Err(invalid("Please enter a valid 10-digit contact number."));
        }

        Ok(MedicalInfoRequest {
            specialization: self.specialization.trim().to_string(),
            experience: self.experience.trim().to_string(),
            qualifications: self.qualifications.trim().to_string(),
            medical_license: self.medical_license.trim().to_string(),
            hospital: self.hospital.trim().to_string(),
            contact_number: self.contact_number.trim().to_string(),
            user_id: user_id.map(str::to_string),
        })
    }
}

/// Appointment booking form
#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    pub doctor_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// 12- or 24-hour time
    pub time: String,
    pub message: String,
}

/// A booking that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBooking {
    pub date: String,
    /// 24-hour `HH:MM`
    pub time: String,
    pub message: String,
    pub selection: SelectedDoctor,
}

impl BookingForm {
    /// Checks the form against the doctor the patient selected.
    ///
    /// # Errors
    ///
    /// Fails when no doctor or a different doctor was selected, or when
    /// the date or time is missing or unreadable.
    pub fn validate(&self, selected: Option<&SelectedDoctor>) -> Result<ValidatedBooking> {
        let selection = match selected {
            Some(s) if s.doctor_id == self.doctor_id => s.clone(),
            _ => return Err(invalid("Please select this doctor before booking.")),
        };
        if any_blank(&[&self.date, &self.time]) {
            return Err(invalid("Please choose a date and time."));
        }
        if NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").is_err() {
            return Err(invalid("Please enter the date as YYYY-MM-DD."));
        }

        Ok(ValidatedBooking {
            date: self.date.trim().to_string(),
            time: to_24_hour(&self.time)?,
            message: self.message.trim().to_string(),
            selection,
        })
    }
}

/// Builds a create-report request.
///
/// # Errors
///
/// Fails when the findings text or the diagnosis id is empty.
pub fn report_request(
    diagnosis_id: &str,
    report_text: &str,
    doctor_notes: Option<&str>,
) -> Result<CreateReportRequest> {
    if report_text.trim().is_empty() {
        return Err(invalid("Medical findings cannot be empty"));
    }
    if diagnosis_id.trim().is_empty() {
        return Err(invalid("Diagnosis ID is missing"));
    }
    Ok(CreateReportRequest {
        diagnosis_id: diagnosis_id.trim().to_string(),
        doctor_notes: doctor_notes.unwrap_or_default().trim().to_string(),
        report_text: report_text.trim().to_string(),
    })
}
