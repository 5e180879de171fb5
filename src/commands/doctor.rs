use colored::Colorize;
use prettytable::{format, Table};

use super::{or_dash, truncate};
use crate::appointments::{format_date, format_time, ConfirmedAppointmentEntry};
use crate::cli::DoctorCommand;
use crate::context::AppContext;
use crate::error::Result;
use crate::session::Role;
use crate::validation::MedicalInfoForm;

/// Handle `doctor` subcommands
pub async fn handle_doctor(ctx: &AppContext, command: DoctorCommand) -> Result<()> {
    match command {
        DoctorCommand::Appointments => appointments(ctx).await,
        DoctorCommand::Confirm { id } => {
            let entry = ctx.confirm_appointment(&id).await?;
            println!(
                "{} {} on {} at {}",
                "Confirmed".green(),
                entry.appointment_id.cyan(),
                entry.date_formatted,
                entry.time_formatted
            );
            println!("Patient {} has been notified.", entry.patient_id);
            Ok(())
        }
        DoctorCommand::Confirmed { watch } => confirmed(ctx, watch).await,
        DoctorCommand::Messages => messages(ctx).await,
        DoctorCommand::Profile => {
            let doctor = ctx.doctor_profile().await?;
            super::patient::print_doctor(&doctor);
            Ok(())
        }
        DoctorCommand::MedicalInfo {
            specialization,
            experience,
            qualifications,
            license,
            hospital,
            contact,
        } => {
            let form = MedicalInfoForm {
                specialization,
                experience,
                qualifications,
                medical_license: license,
                hospital,
                contact_number: contact,
            };
            ctx.submit_medical_info(&form).await?;
            println!(
                "{}",
                "Medical information submitted. An admin will review it.".green()
            );
            Ok(())
        }
        DoctorCommand::Report {
            diagnosis_id,
            findings,
            notes,
        } => {
            let response = ctx
                .create_report(&diagnosis_id, &findings, notes.as_deref())
                .await?;
            let message = response
                .message
                .unwrap_or_else(|| "Report created.".to_string());
            println!("{}", message.green());
            Ok(())
        }
    }
}

async fn appointments(ctx: &AppContext) -> Result<()> {
    let appointments = ctx.doctor_appointments().await?;
    if appointments.is_empty() {
        println!("{}", "No appointments.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "ID".bold(),
        "Patient".bold(),
        "Date".bold(),
        "Time".bold(),
        "Status".bold(),
        "Message".bold()
    ]);
    for appointment in appointments {
        table.add_row(prettytable::row![
            appointment.id.as_str().cyan(),
            or_dash(appointment.patient_id.as_deref()),
            format_date(&appointment.date),
            format_time(&appointment.time),
            appointment.status,
            truncate(&or_dash(appointment.message.as_deref()), 40)
        ]);
    }
    println!();
    table.printstd();
    println!();
    println!("Confirm with {}.", "dermascan doctor confirm <ID>".cyan());
    Ok(())
}

/// Show the confirmed list; with `watch`, keep the view open until the
/// sweep purges it or the user presses Ctrl-C.
async fn confirmed(ctx: &AppContext, watch: bool) -> Result<()> {
    ctx.require_role(Role::Doctor).await?;
    print_confirmed(&ctx.confirmed_appointments().await?);
    if !watch {
        return Ok(());
    }

    let mut sweep = ctx.expiry_sweep();
    sweep.arm();
    println!(
        "{}",
        "Watching confirmed appointments; they are cleared after two minutes. Press Ctrl-C to leave."
            .dimmed()
    );

    tokio::select! {
        cleared = sweep.wait() => {
            if cleared? {
                println!("{}", "Confirmed appointments cleared.".yellow());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::debug!("Leaving confirmed view");
        }
    }
    sweep.cancel();
    Ok(())
}

fn print_confirmed(entries: &[ConfirmedAppointmentEntry]) {
    if entries.is_empty() {
        println!("{}", "No confirmed appointments.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "ID".bold(),
        "Patient".bold(),
        "Date".bold(),
        "Time".bold(),
        "Confirmed".bold()
    ]);
    for entry in entries {
        table.add_row(prettytable::row![
            entry.appointment_id.as_str().cyan(),
            entry.patient_id,
            entry.date_formatted,
            entry.time_formatted,
            entry.confirmed_at.format("%H:%M:%S")
        ]);
    }
    println!();
    table.printstd();
    println!();
}

async fn messages(ctx: &AppContext) -> Result<()> {
    let messages = ctx.doctor_messages().await?;
    if messages.is_empty() {
        println!("{}", "No messages.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "From".bold(),
        "Diagnosis".bold(),
        "Diagnosis ID".bold(),
        "Message".bold(),
        "Sent".bold()
    ]);
    for message in messages {
        let sent = message.created_at.as_deref().map(format_date);
        table.add_row(prettytable::row![
            or_dash(message.from.as_deref()),
            or_dash(message.diagnosis.as_deref()),
            or_dash(message.diagnosis_id.as_deref()).cyan(),
            truncate(&or_dash(message.message.as_deref()), 40),
            or_dash(sent.as_deref())
        ]);
    }
    println!();
    table.printstd();
    println!();
    Ok(())
}
