use super::model::{
    Filing, FundStructure, FundType, PendingRequest, PendingRequestStatus, PendingRequestType,
    ReturnStatus,
};

// ---------------------------------------------------------------------------
// Sample dataset
// ---------------------------------------------------------------------------

/// Fields every seed row sets; counters default to a fresh filing.
fn base(
    id: &str,
    fund_name: &str,
    fund_type: FundType,
    period: &str,
    period_description: &str,
    status: ReturnStatus,
) -> Filing {
    Filing {
        id: id.to_string(),
        entity_id: (100 + id.parse::<u32>().unwrap_or(0)).to_string(),
        fund_name: fund_name.to_string(),
        fund_type,
        fund_structure: None,
        parent_fund_name: None,
        period: period.to_string(),
        period_description: period_description.to_string(),
        due_date: String::new(),
        due_date_description: String::new(),
        status,
        extensions_used: 0,
        used_extension_days: 0,
        max_extensions: 3,
        extension_description: "All extensions available".to_string(),
        can_request_extension: true,
        is_urgent: false,
        pending_request: None,
    }
}

fn pending(kind: PendingRequestType) -> Option<PendingRequest> {
    Some(PendingRequest {
        kind,
        status: PendingRequestStatus::Pending,
    })
}

/// The twelve sample filings used by [`SeedProvider`](super::provider::SeedProvider).
///
/// Entity ids run 101..=112 alongside record ids 1..=12.
pub fn seed_filings() -> Vec<Filing> {
    use FundType::{Mutual, Private};
    use ReturnStatus::*;

    vec![
        Filing {
            fund_structure: Some(FundStructure::Single),
            due_date: "March 31, 2025".into(),
            due_date_description: "5 days remaining".into(),
            ..base("1", "Healthcare Innovation Fund", Mutual, "Q4 2024", "Oct 1 - Dec 31, 2024", Available)
        },
        Filing {
            due_date: "June 30, 2025".into(),
            due_date_description: "125 days remaining".into(),
            extensions_used: 1,
            used_extension_days: 30,
            extension_description: "60 days remaining".into(),
            pending_request: pending(PendingRequestType::Extension),
            ..base("2", "Technology Growth Fund", Private, "FY 2024", "Jan 1 - Dec 31, 2024", Available)
        },
        Filing {
            fund_structure: Some(FundStructure::Single),
            due_date: "September 30, 2024".into(),
            due_date_description: "91 days past filing due date".into(),
            extensions_used: 3,
            used_extension_days: 90,
            extension_description: "All extensions used".into(),
            can_request_extension: false,
            ..base("3", "Emerging Markets Equity Fund", Mutual, "FY 2024", "Jan 1 - Dec 31, 2024", Outstanding)
        },
        Filing {
            due_date: "November 30, 2024".into(),
            due_date_description: "Filed on December 30, 2024 with extension".into(),
            extensions_used: 1,
            used_extension_days: 30,
            extension_description: "Extension approved - 30 days".into(),
            can_request_extension: false,
            ..base("4", "Real Estate Investment Fund", Private, "Q2 2024", "Apr 1 - Jun 30, 2024", Processed)
        },
        Filing {
            fund_structure: Some(FundStructure::Multi),
            parent_fund_name: Some("Sustainable Growth Multi-Fund Complex".into()),
            due_date: "March 31, 2025".into(),
            due_date_description: "45 days remaining".into(),
            pending_request: pending(PendingRequestType::Waiver),
            ..base("5", "Global Equity Sub-Fund", Mutual, "Q4 2024", "Oct 1 - Dec 31, 2024", Available)
        },
        Filing {
            due_date: "March 31, 2025".into(),
            due_date_description: "Prepared for submission".into(),
            extensions_used: 1,
            used_extension_days: 30,
            extension_description: "Prepared by filing team".into(),
            ..base("6", "Infrastructure Development Fund", Private, "Q3 2024", "Jul 1 - Sep 30, 2024", Prepared)
        },
        Filing {
            fund_structure: Some(FundStructure::Single),
            due_date: "December 20, 2024".into(),
            due_date_description: "Ready for submission".into(),
            extension_description: "Awaiting final submission".into(),
            pending_request: pending(PendingRequestType::Deferral),
            ..base("7", "Small Cap Growth Fund", Mutual, "Q2 2024", "Apr 1 - Jun 30, 2024", ReadyToSubmit)
        },
        Filing {
            fund_structure: Some(FundStructure::Single),
            due_date: "January 15, 2025".into(),
            due_date_description: "Returned on January 20, 2025".into(),
            extensions_used: 1,
            used_extension_days: 30,
            extension_description: "Amendments required - resubmit within 30 days".into(),
            can_request_extension: false,
            ..base("8", "Asia Pacific Growth Fund", Mutual, "Q3 2024", "Jul 1 - Sep 30, 2024", Returned)
        },
        Filing {
            due_date: "September 30, 2024".into(),
            due_date_description: "Returned on November 5, 2024".into(),
            extensions_used: 2,
            used_extension_days: 60,
            extension_description: "Incomplete documentation - 1 extension remaining".into(),
            ..base("9", "Sustainable Energy Fund", Private, "FY 2023", "Jan 1 - Dec 31, 2023", Returned)
        },
        Filing {
            fund_structure: Some(FundStructure::Single),
            due_date: "July 31, 2024".into(),
            due_date_description: "Returned on October 10, 2024".into(),
            extension_description: "Calculation errors identified - all extensions available".into(),
            ..base("10", "European Bond Fund", Mutual, "Q1 2024", "Jan 1 - Mar 31, 2024", Returned)
        },
        Filing {
            fund_structure: Some(FundStructure::Single),
            due_date: "March 31, 2025".into(),
            due_date_description: "92 days remaining".into(),
            extensions_used: 2,
            used_extension_days: 60,
            extension_description: "30 days remaining".into(),
            ..base("11", "Emerging Markets Bond Fund", Mutual, "Q4 2024", "Oct 1 - Dec 31, 2024", Available)
        },
        Filing {
            due_date: "June 30, 2025".into(),
            due_date_description: "182 days remaining".into(),
            ..base("12", "Commodity Trading Fund", Private, "FY 2024", "Jan 1 - Dec 31, 2024", Available)
        },
    ]
}
