use std::path::Path;

use colored::Colorize;
use prettytable::{format, Table};

use super::{or_dash, truncate};
use crate::api::Doctor;
use crate::cli::DoctorsCommand;
use crate::context::AppContext;
use crate::error::Result;
use crate::validation::BookingForm;

/// Upload an image and print the diagnosis
pub async fn upload(ctx: &AppContext, image: &Path) -> Result<()> {
    println!("Uploading {}...", image.display());
    let record = ctx.upload_and_diagnose(image).await?;
    println!(
        "{} {}",
        "Diagnosis:".bold(),
        record.diagnosis_label.green().bold()
    );
    println!("{} {}", "Diagnosis ID:".bold(), record.diagnosis_id);
    println!(
        "Share it with a doctor using {}.",
        "dermascan doctors select <ID>".cyan()
    );
    Ok(())
}

pub async fn show_diagnosis(ctx: &AppContext) -> Result<()> {
    match ctx.latest_diagnosis().await? {
        Some(record) => {
            println!("{:<14} {}", "Diagnosis:".bold(), record.diagnosis_label);
            println!("{:<14} {}", "Diagnosis ID:".bold(), record.diagnosis_id);
            println!("{:<14} {}", "Image:".bold(), record.image_reference);
            println!(
                "{:<14} {}",
                "Created:".bold(),
                record.created_at.format("%Y-%m-%d %H:%M")
            );
        }
        None => println!("{}", "No diagnosis yet. Upload an image first.".yellow()),
    }
    Ok(())
}

/// Handle `doctors` subcommands
pub async fn handle_doctors(ctx: &AppContext, command: DoctorsCommand) -> Result<()> {
    match command {
        DoctorsCommand::List => {
            let doctors = ctx.list_doctors().await?;
            if doctors.is_empty() {
                println!("{}", "No doctors available.".yellow());
                return Ok(());
            }
            print_doctors(&doctors);
        }
        DoctorsCommand::Show { id } => {
            let doctor = ctx.get_doctor(&id).await?;
            print_doctor(&doctor);
        }
        DoctorsCommand::Select { id } => {
            let selected = ctx.select_doctor(&id).await?;
            println!("{} {}", "Selected".green(), selected.doctor_name.bold());
            println!(
                "Book with {}.",
                format!("dermascan book {} --date YYYY-MM-DD --time HH:MM", id).cyan()
            );
        }
    }
    Ok(())
}

pub async fn book(ctx: &AppContext, form: &BookingForm) -> Result<()> {
    let outcome = ctx.book_appointment(form).await?;
    println!("{}", "Appointment requested.".green());
    println!("{} {} at {}", "When:".bold(), outcome.date, outcome.time);
    if let Some(id) = outcome.appointment_id {
        println!("{} {}", "Appointment ID:".bold(), id);
    }
    Ok(())
}

pub async fn reports(ctx: &AppContext) -> Result<()> {
    let reports = ctx.view_reports().await?;
    if reports.is_empty() {
        println!("{}", "No reports yet.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row!["ID".bold(), "Date".bold(), "File".bold()]);
    for report in reports {
        let date = report
            .date
            .as_deref()
            .map(crate::appointments::format_date);
        table.add_row(prettytable::row![
            report.id.as_str().cyan(),
            or_dash(date.as_deref()),
            report.file_url
        ]);
    }
    println!("\nReports:");
    table.printstd();
    Ok(())
}

pub(crate) fn print_doctors(doctors: &[Doctor]) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "ID".bold(),
        "Name".bold(),
        "Specialization".bold(),
        "Hospital".bold(),
        "Experience".bold()
    ]);
    for doctor in doctors {
        table.add_row(prettytable::row![
            doctor.id.as_str().cyan(),
            truncate(&doctor.display_name(), 30),
            or_dash(doctor.specialization.as_deref()),
            truncate(&or_dash(doctor.hospital.as_deref()), 30),
            or_dash(doctor.experience.as_deref())
        ]);
    }
    println!();
    table.printstd();
    println!();
}

pub(crate) fn print_doctor(doctor: &Doctor) {
    println!("{}", doctor.display_name().bold());
    let fields = [
        ("ID", Some(doctor.id.as_str())),
        ("Email", doctor.email.as_deref()),
        ("Specialization", doctor.specialization.as_deref()),
        ("Experience", doctor.experience.as_deref()),
        ("Qualifications", doctor.qualifications.as_deref()),
        ("Hospital", doctor.hospital.as_deref()),
        ("Contact", doctor.contact_number.as_deref()),
        ("License", doctor.medical_license.as_deref()),
    ];
    for (label, value) in fields {
        println!("  {:<16} {}", format!("{}:", label), or_dash(value));
    }
    if let Some(approved) = doctor.is_approved {
        let status = if approved {
            "approved".green()
        } else {
            "pending".yellow()
        };
        println!("  {:<16} {}", "Status:", status);
    }
}
