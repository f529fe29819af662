//! Partner firm roster import.
//!
//! Rosters are CSV exports with one firm per row. Specialties are listed in a single cell
//! separated by `;` or `|`.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::workflows::intake::domain::{FirmId, IncidentType, KeeperGrade, PartnerFirm};

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: u64, reason: String },
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read partner roster: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid partner roster CSV data: {}", err),
            RosterImportError::InvalidRow { line, reason } => {
                write!(f, "invalid partner roster row at line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
            RosterImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct PartnerRoster;

impl PartnerRoster {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<PartnerFirm>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<PartnerFirm>, RosterImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers()?.clone();
        let mut firms = Vec::new();

        for result in csv_reader.records() {
            let record = result?;
            let line = record
                .position()
                .map(|position| position.line())
                .unwrap_or_default();
            let row: RosterRow = record
                .deserialize(Some(&headers))
                .map_err(|err| RosterImportError::InvalidRow {
                    line,
                    reason: row_error_reason(&err),
                })?;
            firms.push(row.into_firm(line)?);
        }

        Ok(firms)
    }

    /// Three seed firms matching the default partner network.
    pub fn sample() -> Vec<PartnerFirm> {
        vec![
            sample_firm(
                "1",
                "Smith & Associates",
                "John Smith",
                "john@smithlaw.com",
                "(555) 123-4567",
                &[
                    IncidentType::Auto,
                    IncidentType::Trucking,
                    IncidentType::Workplace,
                ],
                KeeperGrade::B,
                50,
                0.85,
                15.0,
            ),
            sample_firm(
                "2",
                "Johnson Legal Group",
                "Sarah Johnson",
                "sarah@johnsonlegal.com",
                "(555) 234-5678",
                &[IncidentType::Auto, IncidentType::Catastrophic],
                KeeperGrade::A,
                30,
                0.90,
                20.0,
            ),
            sample_firm(
                "3",
                "Williams Law Firm",
                "Mike Williams",
                "mike@williamslaw.com",
                "(555) 345-6789",
                &[IncidentType::Catastrophic, IncidentType::Workplace],
                KeeperGrade::A,
                25,
                0.95,
                25.0,
            ),
        ]
    }
}

#[allow(clippy::too_many_arguments)]
fn sample_firm(
    id: &str,
    name: &str,
    contact_name: &str,
    contact_email: &str,
    contact_phone: &str,
    specialties: &[IncidentType],
    min_keeper_grade: KeeperGrade,
    capacity: u32,
    acceptance_rate: f64,
    referral_fee_percentage: f64,
) -> PartnerFirm {
    PartnerFirm {
        id: FirmId(id.to_string()),
        name: name.to_string(),
        contact_name: Some(contact_name.to_string()),
        contact_email: contact_email.to_string(),
        contact_phone: Some(contact_phone.to_string()),
        specialties: specialties.iter().cloned().collect(),
        min_keeper_grade,
        capacity,
        acceptance_rate,
        referral_fee_percentage,
        active: true,
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    id: String,
    name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    contact_name: Option<String>,
    contact_email: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    contact_phone: Option<String>,
    specialties: String,
    min_keeper_grade: String,
    capacity: u32,
    acceptance_rate: f64,
    referral_fee_percentage: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    active: Option<String>,
}

impl RosterRow {
    fn into_firm(self, line: u64) -> Result<PartnerFirm, RosterImportError> {
        let invalid = |reason: String| RosterImportError::InvalidRow { line, reason };

        let min_keeper_grade = KeeperGrade::parse(&self.min_keeper_grade).ok_or_else(|| {
            invalid(format!(
                "unknown minimum keeper grade '{}'",
                self.min_keeper_grade
            ))
        })?;

        let mut specialties = BTreeSet::new();
        for raw in self
            .specialties
            .split(|c: char| c == ';' || c == '|')
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            let specialty = IncidentType::parse(raw);
            if !specialty.is_recognized() {
                return Err(invalid(format!("unknown specialty '{raw}'")));
            }
            specialties.insert(specialty);
        }
        if specialties.is_empty() {
            return Err(invalid(format!("firm '{}' lists no specialties", self.id)));
        }

        if !(0.0..=1.0).contains(&self.acceptance_rate) {
            return Err(invalid(format!(
                "acceptance rate {} outside 0.0-1.0",
                self.acceptance_rate
            )));
        }
        if !(0.0..=100.0).contains(&self.referral_fee_percentage) {
            return Err(invalid(format!(
                "referral fee percentage {} outside 0-100",
                self.referral_fee_percentage
            )));
        }

        let active = match self.active.as_deref().map(str::to_ascii_lowercase) {
            None => true,
            Some(value) => match value.as_str() {
                "true" | "yes" | "1" => true,
                "false" | "no" | "0" => false,
                other => return Err(invalid(format!("unrecognized active flag '{other}'"))),
            },
        };

        Ok(PartnerFirm {
            id: FirmId(self.id),
            name: self.name,
            contact_name: self.contact_name,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            specialties,
            min_keeper_grade,
            capacity: self.capacity,
            acceptance_rate: self.acceptance_rate,
            referral_fee_percentage: self.referral_fee_percentage,
            active,
        })
    }
}

fn row_error_reason(err: &csv::Error) -> String {
    match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => match err.field() {
            Some(field) => format!("column {}: {}", field + 1, err.kind()),
            None => err.kind().to_string(),
        },
        _ => err.to_string(),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}
