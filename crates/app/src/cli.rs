//! Command-line arguments.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use medhist_domain::date::{parse_user_date, to_iso_date};

/// Console client for the hospital medical-records API
///
/// The API address comes from `MEDHIST_API_URL`. Log verbosity follows
/// `RUST_LOG`.
#[derive(Parser, Debug)]
#[command(name = "medhist", version)]
#[command(about = "Console client for the hospital medical-records API")]
pub struct Cli {
    /// Keep the session in memory only; nothing is read from or written to disk
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        /// Account name
        username: String,
        /// Account password
        #[arg(long, env = "MEDHIST_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Doctors
    Doctors {
        /// Action
        #[command(subcommand)]
        action: ListAction,
    },
    /// Nurses
    Nurses {
        /// Action
        #[command(subcommand)]
        action: ListAction,
    },
    /// Tariff (CAX) codes
    CaxCodes {
        /// Action
        #[command(subcommand)]
        action: ListAction,
    },
    /// External patient registry
    Patients {
        /// Action
        #[command(subcommand)]
        action: PatientsAction,
    },
    /// Medical history lists and spreadsheet export
    Histories {
        /// Action
        #[command(subcommand)]
        action: HistoriesAction,
    },
    /// A single medical history
    History {
        /// Action
        #[command(subcommand)]
        action: ReportAction,
    },
    /// A single operation protocol
    Operation {
        /// Action
        #[command(subcommand)]
        action: ReportAction,
    },
    /// Discharge date helpers
    Discharge {
        /// Action
        #[command(subcommand)]
        action: DischargeAction,
    },
}

/// Read-only collection actions.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    /// List every record
    List,
}

/// Registry actions.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PatientsAction {
    /// Search the registry
    Search(PatientSearchArgs),
}

/// Registry search fields; any combination may be given.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientSearchArgs {
    /// Last name
    #[arg(long)]
    pub lastname: Option<String>,
    /// First name
    #[arg(long)]
    pub firstname: Option<String>,
    /// Patronymic
    #[arg(long)]
    pub secondname: Option<String>,
    /// Birth date, as the registry stores it
    #[arg(long)]
    pub birthdate: Option<String>,
    /// Address fragment
    #[arg(long)]
    pub address: Option<String>,
}

/// History list actions.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HistoriesAction {
    /// List histories; without filters the remembered ones are used
    List(FilterArgs),
    /// Export histories to a spreadsheet in the download directory
    Export(FilterArgs),
}

/// History filters. Dates accept `DD.MM.YYYY` or `YYYY-MM-DD`.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterArgs {
    /// Patient name fragment
    #[arg(long)]
    pub name: Option<String>,
    /// Admitted on or after
    #[arg(long, value_parser = iso_date)]
    pub from: Option<String>,
    /// Admitted on or before
    #[arg(long, value_parser = iso_date)]
    pub to: Option<String>,
}

impl FilterArgs {
    /// Returns true if no filter was given.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.from.is_none() && self.to.is_none()
    }
}

/// Document actions.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    /// Render the document and save it to the download directory
    Report {
        /// Record id
        id: i64,
    },
}

/// Discharge actions.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DischargeAction {
    /// Suggest a discharge date
    Suggest {
        /// Admission date
        #[arg(value_parser = user_date)]
        admission: NaiveDate,
        /// Tariff code id
        cax_code_id: i64,
    },
}

fn iso_date(input: &str) -> Result<String, String> {
    to_iso_date(input).map_err(|e| e.to_string())
}

fn user_date(input: &str) -> Result<NaiveDate, String> {
    parse_user_date(input).map_err(|e| e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_filter_dates_are_normalized() {
        let cli = Cli::try_parse_from([
            "medhist", "histories", "list", "--name", "Иванов", "--from", "01.02.2024", "--to",
            "2024-02-29",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Histories {
                action: HistoriesAction::List(FilterArgs {
                    name: Some("Иванов".to_string()),
                    from: Some("2024-02-01".to_string()),
                    to: Some("2024-02-29".to_string()),
                })
            }
        );
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        assert!(Cli::try_parse_from(["medhist", "histories", "export", "--from", "31.02.2024"]).is_err());
        assert!(Cli::try_parse_from(["medhist", "discharge", "suggest", "tomorrow", "3"]).is_err());
    }

    #[test]
    fn test_discharge_suggest() {
        let cli = Cli::try_parse_from(["medhist", "--ephemeral", "discharge", "suggest", "01.03.2024", "3"])
            .unwrap();
        assert!(cli.ephemeral);
        assert_eq!(
            cli.command,
            Command::Discharge {
                action: DischargeAction::Suggest {
                    admission: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    cax_code_id: 3,
                }
            }
        );
    }

    #[test]
    fn test_login_password_flag() {
        let cli = Cli::try_parse_from(["medhist", "login", "admin", "--password", "secret"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Login {
                username: "admin".to_string(),
                password: "secret".to_string(),
            }
        );
    }
}
