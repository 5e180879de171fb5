//! Command-line interface definition for Dermascan
//!
//! This module defines the CLI structure using clap's derive API. Each
//! command group stands in for one group of screens of the mobile client.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::preferences::Theme;
use crate::session::Role;

/// Dermascan - dermatology scan client
///
/// Upload skin photos for diagnosis, book doctors, and manage
/// appointments and approvals against the Dermascan backend.
#[derive(Parser, Debug, Clone)]
#[command(name = "dermascan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Override the local store directory
    #[arg(long, global = true)]
    pub store: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Dermascan
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Log in and store the session
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Create an account and log in
    Signup {
        /// Full name
        #[arg(long)]
        name: String,

        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,

        /// Ten-digit mobile number
        #[arg(short, long)]
        mobile: String,

        /// Date of birth, YYYY-MM-DD
        #[arg(short, long)]
        birth_date: String,

        /// Account type
        #[arg(short, long, value_enum, default_value = "patient")]
        role: SignupRole,
    },

    /// Log out and clear the session
    Logout,

    /// Show the current session
    Whoami,

    /// Upload a skin photo for diagnosis
    Upload {
        /// Path to the image
        image: PathBuf,
    },

    /// Show the latest cached diagnosis
    Diagnosis,

    /// Browse and select doctors
    Doctors {
        #[command(subcommand)]
        command: DoctorsCommand,
    },

    /// Book the selected doctor and send them the diagnosis
    Book {
        /// Doctor to book
        doctor_id: String,

        /// Appointment date, YYYY-MM-DD
        #[arg(short, long)]
        date: String,

        /// Appointment time, e.g. 14:30 or "2:30 PM"
        #[arg(short, long)]
        time: String,

        /// Message to the doctor
        #[arg(short, long, default_value = "")]
        message: String,
    },

    /// List generated reports
    Reports,

    /// Doctor workflows
    Doctor {
        #[command(subcommand)]
        command: DoctorCommand,
    },

    /// Admin workflows
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },

    /// Show or set the colour theme
    Theme {
        /// New theme; omit to show the current one
        #[arg(value_enum)]
        theme: Option<ThemeArg>,
    },
}

/// Patient-side doctor subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DoctorsCommand {
    /// List approved doctors
    List,

    /// Show one doctor
    Show {
        /// Doctor id
        id: String,
    },

    /// Share the latest diagnosis with a doctor
    Select {
        /// Doctor id
        id: String,
    },
}

/// Doctor subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum DoctorCommand {
    /// List appointments booked with you
    Appointments,

    /// Confirm an appointment and notify the patient
    Confirm {
        /// Appointment id
        id: String,
    },

    /// Show confirmed appointments
    Confirmed {
        /// Keep the view open; the list is purged after two minutes
        #[arg(short, long)]
        watch: bool,
    },

    /// Show diagnosis messages sent to you
    Messages,

    /// Show your profile
    Profile,

    /// Submit medical information for approval
    MedicalInfo {
        #[arg(long)]
        specialization: String,

        /// Years of experience
        #[arg(long)]
        experience: String,

        #[arg(long)]
        qualifications: String,

        #[arg(long)]
        license: String,

        #[arg(long)]
        hospital: String,

        /// Ten-digit contact number
        #[arg(long)]
        contact: String,
    },

    /// Create a report for a diagnosis
    Report {
        /// Diagnosis id
        diagnosis_id: String,

        /// Medical findings
        #[arg(short, long)]
        findings: String,

        /// Additional notes
        #[arg(short, long)]
        notes: Option<String>,
    },
}

/// Admin subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AdminCommand {
    /// List doctors awaiting approval
    Pending,

    /// Approve a doctor
    Approve {
        /// Doctor id
        id: String,
    },

    /// Reject a doctor
    Reject {
        /// Doctor id
        id: String,
    },

    /// List approved doctors
    Approved,

    /// Wipe all local data
    ClearStore,
}

/// Roles that can sign up
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupRole {
    Patient,
    Doctor,
}

impl From<SignupRole> for Role {
    fn from(role: SignupRole) -> Self {
        match role {
            SignupRole::Patient => Role::Patient,
            SignupRole::Doctor => Role::Doctor,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            api_url: None,
            store: None,
            command: Commands::Whoami,
        }
    }
}
