use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Regulatory category of the fund behind a filing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FundType {
    Mutual,
    Private,
}

/// Standalone fund vs. umbrella whose sub-funds file individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FundStructure {
    Single,
    Multi,
}

/// Lifecycle status of a filing.
///
/// `Waived` and `UnderReview` are valid values but no tab other than
/// `reports` selects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReturnStatus {
    Available,
    Prepared,
    ReadyToSubmit,
    Processed,
    Returned,
    Waived,
    Outstanding,
    Deferred,
    UnderReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PendingRequestType {
    Extension,
    Waiver,
    Deferral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PendingRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl FundType {
    pub fn as_str(self) -> &'static str {
        match self {
            FundType::Mutual => "mutual",
            FundType::Private => "private",
        }
    }
}

impl FundStructure {
    pub fn as_str(self) -> &'static str {
        match self {
            FundStructure::Single => "single",
            FundStructure::Multi => "multi",
        }
    }
}

impl ReturnStatus {
    pub const ALL: [ReturnStatus; 9] = [
        ReturnStatus::Available,
        ReturnStatus::Prepared,
        ReturnStatus::ReadyToSubmit,
        ReturnStatus::Processed,
        ReturnStatus::Returned,
        ReturnStatus::Waived,
        ReturnStatus::Outstanding,
        ReturnStatus::Deferred,
        ReturnStatus::UnderReview,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReturnStatus::Available => "available",
            ReturnStatus::Prepared => "prepared",
            ReturnStatus::ReadyToSubmit => "ready-to-submit",
            ReturnStatus::Processed => "processed",
            ReturnStatus::Returned => "returned",
            ReturnStatus::Waived => "waived",
            ReturnStatus::Outstanding => "outstanding",
            ReturnStatus::Deferred => "deferred",
            ReturnStatus::UnderReview => "under-review",
        }
    }
}

impl PendingRequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            PendingRequestType::Extension => "extension",
            PendingRequestType::Waiver => "waiver",
            PendingRequestType::Deferral => "deferral",
        }
    }
}

impl PendingRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PendingRequestStatus::Pending => "pending",
            PendingRequestStatus::Approved => "approved",
            PendingRequestStatus::Rejected => "rejected",
        }
    }
}

// -- Text parsing: case-insensitive, separators optional --

/// Lowercase and drop `-`, `_` and spaces so `Ready-To-Submit`,
/// `ready_to_submit` and `readytosubmit` all compare equal.
fn compact(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for FundType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match compact(s).as_str() {
            "mutual" | "mutualfund" => Ok(FundType::Mutual),
            "private" | "privatefund" => Ok(FundType::Private),
            _ => Err(Error::unknown("fund type", s)),
        }
    }
}

impl FromStr for FundStructure {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match compact(s).as_str() {
            "single" | "singlefund" => Ok(FundStructure::Single),
            "multi" | "multifund" => Ok(FundStructure::Multi),
            _ => Err(Error::unknown("fund structure", s)),
        }
    }
}

impl FromStr for ReturnStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = compact(s);
        ReturnStatus::ALL
            .into_iter()
            .find(|status| compact(status.as_str()) == key)
            .ok_or_else(|| Error::unknown("status", s))
    }
}

impl FromStr for PendingRequestType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match compact(s).as_str() {
            "extension" => Ok(PendingRequestType::Extension),
            "waiver" => Ok(PendingRequestType::Waiver),
            "deferral" => Ok(PendingRequestType::Deferral),
            _ => Err(Error::unknown("pending request type", s)),
        }
    }
}

impl FromStr for PendingRequestStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match compact(s).as_str() {
            "pending" => Ok(PendingRequestStatus::Pending),
            "approved" => Ok(PendingRequestStatus::Approved),
            "rejected" => Ok(PendingRequestStatus::Rejected),
            _ => Err(Error::unknown("pending request status", s)),
        }
    }
}

impl fmt::Display for FundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Filing – one reporting obligation
// ---------------------------------------------------------------------------

/// An extension, waiver or deferral that has been requested but not closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub kind: PendingRequestType,
    pub status: PendingRequestStatus,
}

/// A single filing (one row of the dashboard).
///
/// Filings are read-only once built; the filter engine only ever borrows
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filing {
    pub id: String,
    pub entity_id: String,
    pub fund_name: String,
    pub fund_type: FundType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_structure: Option<FundStructure>,
    /// Umbrella name, set for multi-fund structures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_fund_name: Option<String>,
    /// Free-text period label, e.g. "Q4 2024" or "FY 2023".
    pub period: String,
    /// e.g. "Oct 1 - Dec 31, 2024"
    pub period_description: String,
    pub due_date: String,
    /// e.g. "5 days remaining"
    pub due_date_description: String,
    pub status: ReturnStatus,
    pub extensions_used: u32,
    pub used_extension_days: u32,
    pub max_extensions: u32,
    pub extension_description: String,
    pub can_request_extension: bool,
    pub is_urgent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_request: Option<PendingRequest>,
}

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{4}").expect("static year pattern is valid"));

/// First run of four digits anywhere in a period label.
pub fn period_year(label: &str) -> Option<&str> {
    YEAR_RE.find(label).map(|m| m.as_str())
}

impl Filing {
    /// Year extracted from the period label, if the label carries one.
    pub fn period_year(&self) -> Option<&str> {
        period_year(&self.period)
    }

    pub fn is_multi_fund(&self) -> bool {
        self.fund_structure == Some(FundStructure::Multi)
    }

    /// Check the extension counter invariants.
    pub fn validate(&self) -> Result<()> {
        if self.extensions_used > self.max_extensions {
            return Err(Error::InvalidRecord {
                id: self.id.clone(),
                reason: format!(
                    "{} extensions used exceeds maximum of {}",
                    self.extensions_used, self.max_extensions
                ),
            });
        }
        if self.can_request_extension && self.extensions_used >= self.max_extensions {
            return Err(Error::InvalidRecord {
                id: self.id.clone(),
                reason: "extension requestable with no extensions remaining".to_string(),
            });
        }
        Ok(())
    }
}

/// Validate every record and reject identifiers that appear twice.
pub fn validate_records(records: &[Filing]) -> Result<()> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for filing in records {
        filing.validate()?;
        if !seen.insert(filing.id.as_str()) {
            return Err(Error::DuplicateId(filing.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::seed::seed_filings;

    #[test]
    fn status_parses_case_insensitively_with_or_without_separators() {
        for text in ["ready-to-submit", "Ready-To-Submit", "readytosubmit", "READY_TO_SUBMIT"] {
            assert_eq!(text.parse::<ReturnStatus>().unwrap(), ReturnStatus::ReadyToSubmit);
        }
        assert_eq!("UnderReview".parse::<ReturnStatus>().unwrap(), ReturnStatus::UnderReview);
        assert!("archived".parse::<ReturnStatus>().is_err());
    }

    #[test]
    fn status_display_matches_wire_name() {
        for status in ReturnStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }

    #[test]
    fn period_year_takes_first_four_digit_run() {
        assert_eq!(period_year("Q4 2024"), Some("2024"));
        assert_eq!(period_year("FY 2023"), Some("2023"));
        assert_eq!(period_year("2022-2023"), Some("2022"));
        assert_eq!(period_year("Q1 24"), None);
        assert_eq!(period_year(""), None);
    }

    #[test]
    fn validate_rejects_overused_extensions() {
        let mut filing = seed_filings().remove(0);
        filing.extensions_used = filing.max_extensions + 1;
        filing.can_request_extension = false;
        assert!(matches!(filing.validate(), Err(Error::InvalidRecord { .. })));
    }

    #[test]
    fn validate_rejects_requestable_when_exhausted() {
        let mut filing = seed_filings().remove(0);
        filing.extensions_used = filing.max_extensions;
        filing.can_request_extension = true;
        assert!(matches!(filing.validate(), Err(Error::InvalidRecord { .. })));
    }

    #[test]
    fn validate_records_rejects_duplicate_ids() {
        let mut records = seed_filings();
        let copy = records[0].clone();
        records.push(copy);
        match validate_records(&records) {
            Err(Error::DuplicateId(id)) => assert_eq!(id, "1"),
            other => panic!("expected duplicate id error, got {other:?}"),
        }
    }

    #[test]
    fn seed_records_are_valid() {
        validate_records(&seed_filings()).unwrap();
    }
}
