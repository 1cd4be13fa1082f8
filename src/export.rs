//! Client-side export of the admin user list to CSV, JSON or an
//! Excel-labelled CSV download.

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::domain::filter::UserFilters;
use crate::domain::user::{ProfessionalStatus, User};

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("select at least one group of fields to export")]
    NoFieldsSelected,
    #[error("no users match the selected export criteria")]
    NoMatchingRecords,
    #[error("choose a registration window, or both a start and an end date")]
    InvalidDateRange,
    #[error("failed to serialize export: {0}")]
    Serialization(String),
    #[error("an export is already in progress")]
    AlreadyExporting,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    /// CSV content served with the XLSX content type; no workbook is built.
    Excel,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Excel => "xlsx",
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
            ExportFormat::Excel => XLSX_CONTENT_TYPE,
        }
    }
}

/// Groups of columns the admin can tick in the export dialog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportFields {
    pub basic_info: bool,
    pub contact_info: bool,
    pub professional_info: bool,
    pub membership_info: bool,
    pub timestamps: bool,
    /// Adds the profile keys specific to one professional status.
    pub custom: Option<ProfessionalStatus>,
}

impl ExportFields {
    /// Flattened, de-duplicated column keys in group order.
    pub fn columns(&self) -> Vec<&'static str> {
        let groups: [(bool, &[&'static str]); 5] = [
            (self.basic_info, &["id", "fullName", "email", "phone", "status"]),
            (self.contact_info, &["email", "phone"]),
            (
                self.professional_info,
                &["professionalStatus", "yearsOfExperience", "industry", "certifications"],
            ),
            (
                self.membership_info,
                &["membershipType", "status", "cpeScore", "eventsAttended"],
            ),
            (self.timestamps, &["createdAt", "lastLogin"]),
        ];

        let custom = self.custom.map(ProfessionalStatus::custom_field_keys).unwrap_or(&[]);

        let mut columns: Vec<&'static str> = Vec::new();
        for key in groups
            .iter()
            .filter(|(enabled, _)| *enabled)
            .flat_map(|(_, keys)| keys.iter())
            .chain(custom.iter())
        {
            if !columns.contains(key) {
                columns.push(*key);
            }
        }
        columns
    }
}

/// Registration-date window applied on top of the list filters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateWindow {
    #[default]
    All,
    LastDays(i64),
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl DateWindow {
    fn contains(&self, user: &User, today: NaiveDate) -> Result<bool, ExportError> {
        let created = user.created_at.date();
        match *self {
            DateWindow::All => Ok(true),
            DateWindow::LastDays(days) => {
                let since = TimeDelta::try_days(days)
                    .and_then(|span| today.checked_sub_signed(span))
                    .ok_or(ExportError::InvalidDateRange)?;
                Ok(created >= since)
            }
            DateWindow::Custom {
                start: Some(start),
                end: Some(end),
            } => Ok(created >= start && created <= end),
            DateWindow::Custom { .. } => Err(ExportError::InvalidDateRange),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub fields: ExportFields,
    pub window: DateWindow,
}

/// Serialized export ready to be sent as an attachment.
#[derive(Debug, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub rows: usize,
}

/// Filters `users` with the list predicate and the date window, then
/// serializes the selected columns.
pub fn export_users(
    users: &[User],
    filters: &UserFilters,
    request: &ExportRequest,
    today: NaiveDate,
) -> Result<ExportFile, ExportError> {
    let columns = request.fields.columns();
    if columns.is_empty() {
        return Err(ExportError::NoFieldsSelected);
    }

    let mut selected = Vec::new();
    for user in users.iter().filter(|user| filters.matches(user)) {
        if request.window.contains(user, today)? {
            selected.push(user);
        }
    }
    if selected.is_empty() {
        return Err(ExportError::NoMatchingRecords);
    }

    let body = match request.format {
        ExportFormat::Json => to_json(&selected, &columns)?,
        ExportFormat::Csv | ExportFormat::Excel => to_csv(&selected, &columns)?,
    };

    Ok(ExportFile {
        filename: format!("users-export-{}.{}", today.format("%Y-%m-%d"), request.format.extension()),
        content_type: request.format.content_type(),
        body,
        rows: selected.len(),
    })
}

/// Lifecycle of the export dialog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportDialog {
    #[default]
    Closed,
    Open { error: Option<String> },
    Exporting,
}

impl ExportDialog {
    pub fn open() -> Self {
        ExportDialog::Open { error: None }
    }

    /// Moves an open dialog to `Exporting`; refused while an export runs.
    pub fn begin(&mut self) -> Result<(), ExportError> {
        match self {
            ExportDialog::Exporting => Err(ExportError::AlreadyExporting),
            _ => {
                *self = ExportDialog::Exporting;
                Ok(())
            }
        }
    }

    /// Closes on success, reopens with the message on failure.
    pub fn finish<T>(&mut self, result: &Result<T, ExportError>) {
        *self = match result {
            Ok(_) => ExportDialog::Closed,
            Err(err) => ExportDialog::Open {
                error: Some(err.to_string()),
            },
        };
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ExportDialog::Open { error } => error.as_deref(),
            _ => None,
        }
    }

    pub fn is_exporting(&self) -> bool {
        matches!(self, ExportDialog::Exporting)
    }
}

fn column_value(user: &User, key: &str) -> Value {
    match key {
        "id" => json!(user.id.as_str()),
        "fullName" => json!(user.full_name.as_str()),
        "email" => json!(user.email.as_str()),
        "phone" => json!(user.phone.as_ref().map(|p| p.as_str())),
        "status" => json!(user.status.as_str()),
        "professionalStatus" => json!(user.professional_status.as_str()),
        "yearsOfExperience" => json!(user.years_of_experience),
        "industry" => json!(user.industry),
        "certifications" => json!(user.certifications),
        "membershipType" => json!(user.membership_type.as_str()),
        "cpeScore" => json!(user.cpe_score),
        "eventsAttended" => json!(user.events_attended),
        "createdAt" => json!(user.created_at.format(DATE_TIME_FORMAT).to_string()),
        "lastLogin" => json!(
            user.last_login
                .map(|at| at.format(DATE_TIME_FORMAT).to_string())
        ),
        custom => json!(user.custom_fields.get(custom)),
    }
}

fn csv_cell(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(csv_cell)
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

fn to_csv(users: &[&User], columns: &[&str]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(columns)
        .map_err(|e| ExportError::Serialization(e.to_string()))?;
    for user in users {
        let record = columns.iter().map(|key| csv_cell(column_value(user, key)));
        writer
            .write_record(record)
            .map_err(|e| ExportError::Serialization(e.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Serialization(e.to_string()))
}

fn to_json(users: &[&User], columns: &[&str]) -> Result<Vec<u8>, ExportError> {
    let rows: Vec<Value> = users
        .iter()
        .map(|user| {
            let object: Map<String, Value> = columns
                .iter()
                .map(|key| ((*key).to_string(), column_value(user, key)))
                .collect();
            Value::Object(object)
        })
        .collect();
    serde_json::to_vec_pretty(&rows).map_err(|e| ExportError::Serialization(e.to_string()))
}
