use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::filter::empty_as_none;
use crate::domain::user::ProfessionalStatus;
use crate::export::{DateWindow, ExportError, ExportFields, ExportFormat, ExportRequest};
use crate::forms::is_checked;

/// Day counts offered by the registration window radios.
const WINDOW_PRESETS: [i64; 3] = [30, 90, 365];

/// Export dialog submission.
#[derive(Debug, Default, Deserialize)]
pub struct ExportForm {
    /// Query string of the list whose filters are exported.
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default)]
    pub basic_info: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub professional_info: Option<String>,
    #[serde(default)]
    pub membership_info: Option<String>,
    #[serde(default)]
    pub timestamps: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub custom_status: Option<ProfessionalStatus>,
    /// `all`, one of the day presets, or `custom`.
    #[serde(default)]
    pub window: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub end: Option<NaiveDate>,
}

impl ExportForm {
    pub fn request(&self) -> Result<ExportRequest, ExportError> {
        let window = match self.window.trim() {
            "" | "all" => DateWindow::All,
            "custom" => DateWindow::Custom {
                start: self.start,
                end: self.end,
            },
            days => match days.parse::<i64>() {
                Ok(days) if WINDOW_PRESETS.contains(&days) => DateWindow::LastDays(days),
                _ => return Err(ExportError::InvalidDateRange),
            },
        };

        Ok(ExportRequest {
            format: self.format,
            fields: ExportFields {
                basic_info: is_checked(&self.basic_info),
                contact_info: is_checked(&self.contact_info),
                professional_info: is_checked(&self.professional_info),
                membership_info: is_checked(&self.membership_info),
                timestamps: is_checked(&self.timestamps),
                custom: self.custom_status,
            },
            window,
        })
    }
}
