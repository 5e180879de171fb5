//! Doctor-side appointment handling
//!
//! Confirmation is local: the doctor confirms an appointment on this device,
//! which records it in the confirmed list and queues a notification for the
//! patient. The confirmed list is purged by an [`ExpirySweep`] while the
//! doctor profile view is open, and on doctor logout.

mod confirmation;
mod expiry;
pub mod format;

pub use confirmation::{
    ConfirmationCache, ConfirmedAppointmentEntry, NotificationEntry, CONFIRMATION_TITLE,
    CONFIRMED_STATUS,
};
pub use expiry::{ExpirySweep, CONFIRMED_APPOINTMENTS_TTL};
pub use format::{format_date, format_time, to_24_hour};
