//! Command handlers.
//!
//! Each handler returns the text to print; progress and failures of long
//! jobs are reported through the log.

use std::fmt::Write as _;

use anyhow::bail;
use medhist_application::{
    CaxCodeApi, DatesApi, MedicalHistoryApi, PatientSearch, RegistryApi, StaffApi,
};
use medhist_domain::date::format_display;
use medhist_domain::entities::{
    DischargeRequest, MedicalHistoryRead, PatientSearchParams, Personal, StaffKind,
};
use medhist_domain::{Credentials, PersistedFilters, ReportKind, UserRead};
use tracing::debug;

use crate::cli::{
    Command, DischargeAction, FilterArgs, HistoriesAction, ListAction, PatientSearchArgs,
    PatientsAction, ReportAction,
};
use crate::context::App;

/// Runs one command.
///
/// Every command except `login` and `logout` restores the saved session
/// first.
///
/// # Errors
///
/// Returns the first error the command hits.
pub async fn run(app: &App, command: Command) -> anyhow::Result<String> {
    match command {
        Command::Login { username, password } => {
            let user = app
                .auth()
                .login(&Credentials::new(username, password))
                .await?;
            Ok(format!("Signed in as {}", describe_user(&user)))
        }
        Command::Logout => {
            app.auth().logout().await?;
            Ok("Signed out".to_string())
        }
        command => {
            let user = app.require_session().await?;
            debug!(username = %user.username, "session restored");
            run_signed_in(app, &user, command).await
        }
    }
}

async fn run_signed_in(app: &App, user: &UserRead, command: Command) -> anyhow::Result<String> {
    match command {
        Command::Whoami => Ok(describe_user(user)),
        Command::Doctors {
            action: ListAction::List,
        } => list_staff(app, StaffKind::Doctor).await,
        Command::Nurses {
            action: ListAction::List,
        } => list_staff(app, StaffKind::Nurse).await,
        Command::CaxCodes {
            action: ListAction::List,
        } => {
            let codes = CaxCodeApi::cax_codes(app.client().clone()).list().await?;
            Ok(render(codes.iter().map(|c| {
                let days = c
                    .quantity_of_days
                    .map_or_else(|| "-".to_string(), |d| d.to_string());
                format!("{}\t{}\t{}\t{days}", c.id, c.cax_code, c.cax_name)
            })))
        }
        Command::Patients {
            action: PatientsAction::Search(args),
        } => search_patients(app, args).await,
        Command::Histories {
            action: HistoriesAction::List(args),
        } => {
            let filters = merged_filters(app, &args).await?;
            app.filters().save(&filters).await?;
            let histories = MedicalHistoryApi::new(app.client().clone())
                .list(&filters.to_request_filters())
                .await?;
            Ok(render(histories.iter().map(describe_history)))
        }
        Command::Histories {
            action: HistoriesAction::Export(args),
        } => {
            let filters = merged_filters(app, &args).await?;
            let saved = app
                .poller()
                .export(&filters.to_request_filters(), "export")
                .await?;
            Ok(format!("Saved {}", saved.display()))
        }
        Command::History {
            action: ReportAction::Report { id },
        } => {
            let history = MedicalHistoryApi::new(app.client().clone()).get(id).await?;
            let saved = app
                .poller()
                .generate(
                    ReportKind::MedicalHistory,
                    id,
                    &history.report_filename(),
                    &format!("history-report-{id}"),
                )
                .await?;
            Ok(format!("Saved {}", saved.display()))
        }
        Command::Operation {
            action: ReportAction::Report { id },
        } => {
            let saved = app
                .poller()
                .generate(
                    ReportKind::Operation,
                    id,
                    &ReportKind::Operation.default_filename(id),
                    &format!("operation-report-{id}"),
                )
                .await?;
            Ok(format!("Saved {}", saved.display()))
        }
        Command::Discharge {
            action:
                DischargeAction::Suggest {
                    admission,
                    cax_code_id,
                },
        } => {
            let suggestion = DatesApi::new(app.client().clone())
                .suggest_discharge_date(&DischargeRequest {
                    admission_date: admission,
                    cax_code_id,
                })
                .await?;
            Ok(format_display(suggestion.discharge_date))
        }
        Command::Login { .. } | Command::Logout => bail!("command does not need a session"),
    }
}

async fn list_staff(app: &App, kind: StaffKind) -> anyhow::Result<String> {
    let staff = StaffApi::staff(app.client().clone(), kind).list().await?;
    Ok(render(staff.iter().map(describe_staff)))
}

async fn search_patients(app: &App, args: PatientSearchArgs) -> anyhow::Result<String> {
    let params = PatientSearchParams {
        lastname: args.lastname,
        firstname: args.firstname,
        secondname: args.secondname,
        birthdate: args.birthdate,
        address: args.address,
    };
    match RegistryApi::new(app.client().clone())
        .search_patients(&params)
        .await?
    {
        PatientSearch::Found(patients) if patients.is_empty() => Ok("No patients found".to_string()),
        PatientSearch::Found(patients) => Ok(render(patients.iter().map(|p| {
            format!(
                "{}\t{}\t{}",
                p.pname,
                p.birthdate,
                p.address.as_deref().unwrap_or("-")
            )
        }))),
        PatientSearch::Rejected(message) => bail!("registry refused the search: {message}"),
    }
}

/// Remembered filters with the given arguments applied over them.
async fn merged_filters(app: &App, args: &FilterArgs) -> anyhow::Result<PersistedFilters> {
    let mut filters = app.filters().load().await?;
    if let Some(name) = &args.name {
        filters.full_name.clone_from(name);
    }
    if let Some(from) = &args.from {
        filters.start_date.clone_from(from);
    }
    if let Some(to) = &args.to {
        filters.end_date.clone_from(to);
    }
    Ok(filters)
}

fn describe_user(user: &UserRead) -> String {
    let roles: Vec<&str> = user.roles.iter().map(|r| r.name.as_str()).collect();
    if roles.is_empty() {
        user.username.clone()
    } else {
        format!("{} ({})", user.username, roles.join(", "))
    }
}

fn describe_staff(person: &Personal) -> String {
    let state = if person.is_active { "" } else { "\tinactive" };
    format!("{}\t{}{state}", person.id, person.full_name)
}

fn describe_history(history: &MedicalHistoryRead) -> String {
    let mut line = format!(
        "{}\t{}\t{}\t{}",
        history.history_number,
        format_display(history.admission_date),
        history.patient.full_name,
        history.diagnosis
    );
    if history.is_cancelled() {
        line.push_str("\tcancelled");
    }
    line
}

fn render(lines: impl Iterator<Item = String>) -> String {
    let mut out = String::new();
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
    out.trim_end().to_string()
}
