use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::model::Filing;
use crate::data::provider::ReturnsProvider;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Request vocabulary
// ---------------------------------------------------------------------------

/// What the filer is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExtensionType {
    #[serde(rename = "2-month")]
    TwoMonth,
    #[serde(rename = "3-month")]
    ThreeMonth,
    #[serde(rename = "waiver")]
    Waiver,
    #[default]
    #[serde(rename = "none")]
    None,
}

impl ExtensionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtensionType::TwoMonth => "2-month",
            ExtensionType::ThreeMonth => "3-month",
            ExtensionType::Waiver => "waiver",
            ExtensionType::None => "none",
        }
    }
}

impl FromStr for ExtensionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2-month" => Ok(ExtensionType::TwoMonth),
            "3-month" => Ok(ExtensionType::ThreeMonth),
            "waiver" => Ok(ExtensionType::Waiver),
            "none" => Ok(ExtensionType::None),
            _ => Err(Error::unknown("extension type", s)),
        }
    }
}

impl fmt::Display for ExtensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upload slots on the request form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    CoverLetter,
    AuditorLetter,
    OperatorAffidavit,
    AdministratorLetter,
    LiquidatorReport,
    OtherDocuments,
}

impl FromStr for DocumentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "cover-letter" => Ok(DocumentKind::CoverLetter),
            "auditor-letter" => Ok(DocumentKind::AuditorLetter),
            "operator-affidavit" => Ok(DocumentKind::OperatorAffidavit),
            "administrator-letter" => Ok(DocumentKind::AdministratorLetter),
            "liquidator-report" => Ok(DocumentKind::LiquidatorReport),
            "other-documents" => Ok(DocumentKind::OtherDocuments),
            _ => Err(Error::unknown("document kind", s)),
        }
    }
}

/// A file chosen for one of the upload slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportingDocument {
    pub file_name: String,
    pub size_bytes: u64,
}

// ---------------------------------------------------------------------------
// Sub-fund breakdown
// ---------------------------------------------------------------------------

/// One sub-fund row on a multi-fund request. Lives only as long as the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubFundRequest {
    pub id: String,
    pub name: String,
    /// e.g. "Sub-fund 1 of 3"
    pub description: String,
    pub current_filing_date: String,
    pub extension_type: ExtensionType,
    pub waiver_reason: Option<String>,
    pub extensions_used: u32,
    pub used_extension_days: u32,
    pub max_extensions: u32,
    pub entity_id: String,
}

impl SubFundRequest {
    fn from_filing(filing: &Filing, position: usize, total: usize) -> Self {
        SubFundRequest {
            id: filing.id.clone(),
            name: filing.fund_name.clone(),
            description: format!("Sub-fund {position} of {total}"),
            current_filing_date: filing.due_date.clone(),
            extension_type: ExtensionType::None,
            waiver_reason: None,
            extensions_used: filing.extensions_used,
            used_extension_days: filing.used_extension_days,
            max_extensions: filing.max_extensions,
            entity_id: filing.entity_id.clone(),
        }
    }
}

/// Sub-funds sharing `filing`'s umbrella, in provider order.
///
/// Empty unless `filing` is part of a multi-fund structure.
fn sub_funds_for(filing: &Filing, all: &[Filing]) -> Vec<SubFundRequest> {
    let Some(parent) = filing.parent_fund_name.as_deref().filter(|_| filing.is_multi_fund()) else {
        return Vec::new();
    };
    let members: Vec<&Filing> = all
        .iter()
        .filter(|f| f.is_multi_fund() && f.parent_fund_name.as_deref() == Some(parent))
        .collect();
    let total = members.len();
    members
        .into_iter()
        .enumerate()
        .map(|(i, f)| SubFundRequest::from_filing(f, i + 1, total))
        .collect()
}

// ---------------------------------------------------------------------------
// Form data and flow
// ---------------------------------------------------------------------------

/// Everything collected on the request form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRequestData {
    pub extension_type: ExtensionType,
    pub waiver_reason: Option<String>,
    /// Present only for multi-fund structures.
    pub sub_funds: Option<Vec<SubFundRequest>>,
    pub documents: BTreeMap<DocumentKind, SupportingDocument>,
    pub additional_comments: Option<String>,
}

/// Data handed to the payment step after the filer continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentHandoff {
    pub filing_id: String,
    pub request: ExtensionRequestData,
}

impl PaymentHandoff {
    pub fn payment_path(&self) -> String {
        format!("/payment/{}", self.filing_id)
    }
}

/// How a flow ended without submitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowExit {
    Back { filing_id: String },
}

/// An open extension-request form for one filing.
///
/// The form stage is this value; [`continue_to_payment`](Self::continue_to_payment)
/// and [`back`](Self::back) consume it, so a finished flow cannot be edited.
/// No field is validated before continuing.
#[derive(Debug, Clone)]
pub struct ExtensionRequestFlow {
    filing: Filing,
    data: ExtensionRequestData,
}

impl ExtensionRequestFlow {
    /// Open the form for `filing_id`. `Ok(None)` when no such filing exists.
    pub fn open(provider: &dyn ReturnsProvider, filing_id: &str) -> Result<Option<Self>> {
        let Some(filing) = provider.get_by_id(filing_id)? else {
            log::info!("No filing {filing_id}; extension request not opened");
            return Ok(None);
        };

        let sub_funds = if filing.is_multi_fund() {
            let all = provider.list_all()?;
            Some(sub_funds_for(&filing, &all))
        } else {
            None
        };

        log::info!(
            "Opened extension request for filing {} ({} sub-funds)",
            filing.id,
            sub_funds.as_ref().map_or(0, Vec::len)
        );

        Ok(Some(Self {
            filing,
            data: ExtensionRequestData {
                sub_funds,
                ..ExtensionRequestData::default()
            },
        }))
    }

    pub fn filing(&self) -> &Filing {
        &self.filing
    }

    pub fn data(&self) -> &ExtensionRequestData {
        &self.data
    }

    pub fn set_extension_type(&mut self, extension_type: ExtensionType) {
        self.data.extension_type = extension_type;
    }

    pub fn set_waiver_reason(&mut self, reason: Option<String>) {
        self.data.waiver_reason = reason;
    }

    pub fn set_comments(&mut self, comments: Option<String>) {
        self.data.additional_comments = comments;
    }

    /// Put a document in a slot, replacing any previous one.
    pub fn attach_document(&mut self, kind: DocumentKind, document: SupportingDocument) {
        if let Some(old) = self.data.documents.insert(kind, document) {
            log::debug!("Replaced {kind:?} document {}", old.file_name);
        }
    }

    pub fn remove_document(&mut self, kind: DocumentKind) -> Option<SupportingDocument> {
        self.data.documents.remove(&kind)
    }

    /// Mutable access to one sub-fund row by id, if this is a multi-fund form.
    pub fn sub_fund_mut(&mut self, id: &str) -> Option<&mut SubFundRequest> {
        self.data
            .sub_funds
            .as_mut()?
            .iter_mut()
            .find(|s| s.id == id)
    }

    /// Submit the form and hand off to payment.
    pub fn continue_to_payment(self) -> PaymentHandoff {
        log::info!(
            "Extension request for filing {} continued to payment ({})",
            self.filing.id,
            self.data.extension_type
        );
        PaymentHandoff {
            filing_id: self.filing.id,
            request: self.data,
        }
    }

    /// Leave the form without submitting; collected data is dropped.
    pub fn back(self) -> FlowExit {
        log::debug!("Extension request for filing {} abandoned", self.filing.id);
        FlowExit::Back {
            filing_id: self.filing.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FundStructure;
    use crate::data::provider::{InMemoryProvider, SeedProvider};
    use crate::data::seed::seed_filings;

    #[test]
    fn open_missing_filing_is_none() {
        let flow = ExtensionRequestFlow::open(&SeedProvider::new(), "404").unwrap();
        assert!(flow.is_none());
    }

    #[test]
    fn single_fund_has_no_sub_fund_breakdown() {
        let flow = ExtensionRequestFlow::open(&SeedProvider::new(), "1")
            .unwrap()
            .unwrap();
        assert!(flow.data().sub_funds.is_none());
        assert_eq!(flow.data().extension_type, ExtensionType::None);
    }

    #[test]
    fn multi_fund_collects_siblings_under_same_umbrella() {
        let mut records = seed_filings();
        // Make filing 11 a second member of filing 5's umbrella.
        records[10].fund_structure = Some(FundStructure::Multi);
        records[10].parent_fund_name = records[4].parent_fund_name.clone();
        let provider = InMemoryProvider::new(records).unwrap();

        let flow = ExtensionRequestFlow::open(&provider, "5").unwrap().unwrap();
        let subs = flow.data().sub_funds.as_ref().unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].id, "5");
        assert_eq!(subs[0].description, "Sub-fund 1 of 2");
        assert_eq!(subs[1].id, "11");
        assert_eq!(subs[1].description, "Sub-fund 2 of 2");
        assert_eq!(subs[1].current_filing_date, "March 31, 2025");
        assert_eq!(subs[1].extensions_used, 2);
        assert_eq!(subs[1].entity_id, "111");
    }

    #[test]
    fn continue_hands_off_everything_keyed_by_filing() {
        let mut flow = ExtensionRequestFlow::open(&SeedProvider::new(), "5")
            .unwrap()
            .unwrap();
        flow.set_extension_type("waiver".parse().unwrap());
        flow.set_waiver_reason(Some("Fund in liquidation".into()));
        flow.attach_document(
            DocumentKind::CoverLetter,
            SupportingDocument {
                file_name: "draft.pdf".into(),
                size_bytes: 10,
            },
        );
        flow.attach_document(
            DocumentKind::CoverLetter,
            SupportingDocument {
                file_name: "cover.pdf".into(),
                size_bytes: 2048,
            },
        );
        if let Some(sub) = flow.sub_fund_mut("5") {
            sub.extension_type = ExtensionType::ThreeMonth;
        }

        let handoff = flow.continue_to_payment();
        assert_eq!(handoff.filing_id, "5");
        assert_eq!(handoff.payment_path(), "/payment/5");
        assert_eq!(handoff.request.extension_type, ExtensionType::Waiver);
        assert_eq!(handoff.request.documents.len(), 1);
        assert_eq!(handoff.request.documents[&DocumentKind::CoverLetter].file_name, "cover.pdf");
        let subs = handoff.request.sub_funds.unwrap();
        assert_eq!(subs[0].extension_type, ExtensionType::ThreeMonth);
    }

    #[test]
    fn empty_form_may_continue() {
        let flow = ExtensionRequestFlow::open(&SeedProvider::new(), "3")
            .unwrap()
            .unwrap();
        let handoff = flow.continue_to_payment();
        assert_eq!(handoff.request, ExtensionRequestData::default());
    }

    #[test]
    fn back_exits_without_handoff() {
        let flow = ExtensionRequestFlow::open(&SeedProvider::new(), "2")
            .unwrap()
            .unwrap();
        assert_eq!(
            flow.back(),
            FlowExit::Back {
                filing_id: "2".into()
            }
        );
    }

    #[test]
    fn extension_type_wire_names() {
        assert_eq!(serde_json::to_string(&ExtensionType::TwoMonth).unwrap(), "\"2-month\"");
        assert_eq!("3-MONTH".parse::<ExtensionType>().unwrap(), ExtensionType::ThreeMonth);
        assert!("6-month".parse::<ExtensionType>().is_err());
        assert_eq!("cover_letter".parse::<DocumentKind>().unwrap(), DocumentKind::CoverLetter);
    }
}
