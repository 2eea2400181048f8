use std::collections::BTreeSet;
use std::str::FromStr;

use super::model::{Filing, FundType, ReturnStatus};
use crate::error::{Error, Result};

/// Rows per dashboard page.
pub const PAGE_SIZE: usize = 12;

/// Identifiers are left-padded with zeros to this width for search.
pub const SEARCH_ID_WIDTH: usize = 6;

// ---------------------------------------------------------------------------
// Tab and fund-type selectors
// ---------------------------------------------------------------------------

/// Top-level lifecycle view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Active,
    Submitted,
    Returned,
    /// Analytics view: no row-level filtering at all.
    Reports,
}

/// Heading text and filter visibility for a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabContent {
    pub title: &'static str,
    pub description: &'static str,
    pub show_status_filter: bool,
}

impl Tab {
    /// Parse a tab name. Anything unrecognized is the reports view.
    pub fn parse(s: &str) -> Tab {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Tab::Active,
            "submitted" => Tab::Submitted,
            "returned" => Tab::Returned,
            _ => Tab::Reports,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Active => "active",
            Tab::Submitted => "submitted",
            Tab::Returned => "returned",
            Tab::Reports => "reports",
        }
    }

    /// Whether a status belongs in this tab. `Reports` accepts everything.
    pub fn admits(self, status: ReturnStatus) -> bool {
        use ReturnStatus::*;
        match self {
            Tab::Active => matches!(
                status,
                Available | Prepared | ReadyToSubmit | Outstanding | Deferred
            ),
            Tab::Submitted => status == Processed,
            Tab::Returned => status == Returned,
            Tab::Reports => true,
        }
    }

    pub fn content(self) -> TabContent {
        match self {
            Tab::Active => TabContent {
                title: "Active Filings",
                description: "Filings that are actively being worked on or pending action. \
                    Includes available, prepared, ready to submit, outstanding, and deferred filings.",
                show_status_filter: true,
            },
            Tab::Submitted => TabContent {
                title: "Submitted Filings",
                description: "Filings that have been successfully processed by the authority. \
                    View your filing history and approved extensions.",
                show_status_filter: false,
            },
            Tab::Returned => TabContent {
                title: "Returned Filings",
                description: "Filings that were rejected or sent back by the authority requiring \
                    amendments. Review feedback and resubmit your filings.",
                show_status_filter: false,
            },
            Tab::Reports => TabContent {
                title: "Returns Filing & Extension Management Portal",
                description: "File your financial returns or request deadline extensions as needed.",
                show_status_filter: true,
            },
        }
    }
}

/// Fund-type selector: everything, or one fund type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FundTypeFilter {
    #[default]
    All,
    Only(FundType),
}

impl FundTypeFilter {
    pub fn matches(self, fund_type: FundType) -> bool {
        match self {
            FundTypeFilter::All => true,
            FundTypeFilter::Only(wanted) => wanted == fund_type,
        }
    }
}

impl FromStr for FundTypeFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(FundTypeFilter::All);
        }
        s.parse::<FundType>()
            .map(FundTypeFilter::Only)
            .map_err(|_| Error::unknown("fund type filter", s))
    }
}

// ---------------------------------------------------------------------------
// Filter specification
// ---------------------------------------------------------------------------

/// Everything the presentation layer can select, plus the current page.
///
/// Empty sets and a blank query mean "no constraint".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub tab: Tab,
    pub fund_type: FundTypeFilter,
    /// Only consulted on the active tab.
    pub statuses: BTreeSet<ReturnStatus>,
    pub period_years: BTreeSet<String>,
    pub search_query: String,
    /// 1-based.
    pub page: usize,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            tab: Tab::default(),
            fund_type: FundTypeFilter::default(),
            statuses: BTreeSet::new(),
            period_years: BTreeSet::new(),
            search_query: String::new(),
            page: 1,
        }
    }
}

/// Result of running the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Indices into the input slice, in input order.
    pub indices: Vec<usize>,
    pub page_count: usize,
    pub current_page: usize,
}

impl FilterOutcome {
    /// Indices of the rows on `current_page`.
    pub fn page_indices(&self) -> &[usize] {
        let start = (self.current_page - 1) * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.indices.len());
        self.indices.get(start..end).unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

fn passes_fund_type(spec: &FilterSpec, filing: &Filing) -> bool {
    spec.tab == Tab::Reports || spec.fund_type.matches(filing.fund_type)
}

fn passes_status(spec: &FilterSpec, filing: &Filing) -> bool {
    if spec.tab != Tab::Active || spec.statuses.is_empty() {
        return true;
    }
    spec.statuses.contains(&filing.status)
}

fn passes_period_year(spec: &FilterSpec, filing: &Filing) -> bool {
    if spec.period_years.is_empty() {
        return true;
    }
    // A label without a year never matches an active year filter.
    filing
        .period_year()
        .is_some_and(|year| spec.period_years.contains(year))
}

/// Left-pad with zeros to `width` characters; longer input is unchanged.
fn zero_pad(s: &str, width: usize) -> String {
    format!("{s:0>width$}")
}

/// Case-insensitive substring match over name and both id forms.
pub fn matches_search(filing: &Filing, query: &str) -> bool {
    let needle = query.to_lowercase();
    [
        filing.fund_name.to_lowercase(),
        filing.entity_id.to_lowercase(),
        zero_pad(&filing.entity_id, SEARCH_ID_WIDTH).to_lowercase(),
        filing.id.to_lowercase(),
        zero_pad(&filing.id, SEARCH_ID_WIDTH).to_lowercase(),
    ]
    .iter()
    .any(|haystack| haystack.contains(&needle))
}

fn passes_search(spec: &FilterSpec, filing: &Filing) -> bool {
    spec.search_query.trim().is_empty() || matches_search(filing, &spec.search_query)
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Number of pages needed for `count` rows; never less than one.
pub fn page_count_for(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE).max(1)
}

/// Return indices of filings that pass every stage, with page bounds.
///
/// Stages run in a fixed order (tab, fund type, status, period year,
/// search), each narrowing what the previous one kept. `spec.page` is
/// clamped into `1..=page_count`.
pub fn apply(filings: &[Filing], spec: &FilterSpec) -> FilterOutcome {
    let indices: Vec<usize> = filings
        .iter()
        .enumerate()
        .filter(|(_, f)| spec.tab.admits(f.status))
        .filter(|(_, f)| passes_fund_type(spec, f))
        .filter(|(_, f)| passes_status(spec, f))
        .filter(|(_, f)| passes_period_year(spec, f))
        .filter(|(_, f)| passes_search(spec, f))
        .map(|(i, _)| i)
        .collect();

    let page_count = page_count_for(indices.len());
    let current_page = spec.page.clamp(1, page_count);

    FilterOutcome {
        indices,
        page_count,
        current_page,
    }
}
