use std::collections::BTreeSet;

use crate::data::filter::{apply, FilterOutcome, FilterSpec, FundTypeFilter, Tab, TabContent};
use crate::data::model::{Filing, ReturnStatus};
use crate::data::provider::ReturnsProvider;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Dashboard session state
// ---------------------------------------------------------------------------

/// The full dashboard state, independent of rendering.
///
/// Every setter takes `&mut self` and re-runs the filter pipeline before
/// returning, so readers never observe a stale page count.
#[derive(Debug)]
pub struct DashboardState {
    /// Loaded filings, in provider order. Never mutated after load.
    records: Vec<Filing>,

    /// Current selections and page.
    spec: FilterSpec,

    /// Indices of filings passing the current filters (cached).
    outcome: FilterOutcome,

    /// Status / error message for the presentation layer.
    pub status_message: Option<String>,

    /// Whether a provider fetch is in progress.
    pub loading: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        let spec = FilterSpec::default();
        let outcome = apply(&[], &spec);
        Self {
            records: Vec::new(),
            spec,
            outcome,
            status_message: None,
            loading: false,
        }
    }
}

impl DashboardState {
    /// Build a session over already-loaded records.
    pub fn with_records(records: Vec<Filing>) -> Self {
        let mut state = Self::default();
        state.set_records(records);
        state
    }

    /// Fetch every record from `provider` and refilter.
    ///
    /// On failure the previous records stay in place and the error is
    /// recorded in `status_message` as well as returned.
    pub fn load(&mut self, provider: &dyn ReturnsProvider) -> Result<()> {
        self.loading = true;
        let fetched = provider.list_all();
        self.loading = false;

        match fetched {
            Ok(records) => {
                log::info!("Loaded {} filings into dashboard", records.len());
                self.set_records(records);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load filings: {e}");
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Ingest a newly loaded record set and refilter from page 1.
    pub fn set_records(&mut self, records: Vec<Filing>) {
        self.records = records;
        self.spec.page = 1;
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the filtered view after a change.
    fn refilter(&mut self) {
        self.outcome = apply(&self.records, &self.spec);
        self.spec.page = self.outcome.current_page;
        log::debug!(
            "Refiltered: tab={} visible={}/{} page {}/{}",
            self.spec.tab.as_str(),
            self.outcome.indices.len(),
            self.records.len(),
            self.outcome.current_page,
            self.outcome.page_count
        );
    }

    // -- Filter setters: each resets to page 1 --

    /// Switch tab. Status selection is tab-scoped and is cleared.
    pub fn set_tab(&mut self, tab: Tab) {
        self.spec.tab = tab;
        self.spec.statuses.clear();
        self.spec.page = 1;
        self.refilter();
    }

    pub fn set_fund_type(&mut self, fund_type: FundTypeFilter) {
        self.spec.fund_type = fund_type;
        self.spec.page = 1;
        self.refilter();
    }

    pub fn set_statuses(&mut self, statuses: impl IntoIterator<Item = ReturnStatus>) {
        self.spec.statuses = statuses.into_iter().collect();
        self.spec.page = 1;
        self.refilter();
    }

    /// Toggle a single status in the selection.
    pub fn toggle_status(&mut self, status: ReturnStatus) {
        if !self.spec.statuses.remove(&status) {
            self.spec.statuses.insert(status);
        }
        self.spec.page = 1;
        self.refilter();
    }

    pub fn set_period_years<S: Into<String>>(&mut self, years: impl IntoIterator<Item = S>) {
        self.spec.period_years = years.into_iter().map(Into::into).collect();
        self.spec.page = 1;
        self.refilter();
    }

    /// Toggle a single year in the selection.
    pub fn toggle_period_year(&mut self, year: &str) {
        if !self.spec.period_years.remove(year) {
            self.spec.period_years.insert(year.to_string());
        }
        self.spec.page = 1;
        self.refilter();
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.spec.search_query = query.into();
        self.spec.page = 1;
        self.refilter();
    }

    /// Clear every filter except the tab.
    pub fn reset_filters(&mut self) {
        self.spec = FilterSpec {
            tab: self.spec.tab,
            ..FilterSpec::default()
        };
        self.refilter();
    }

    // -- Page navigation: out-of-range requests are ignored --

    pub fn next_page(&mut self) {
        if self.spec.page < self.outcome.page_count {
            self.set_page_unchecked(self.spec.page + 1);
        }
    }

    pub fn previous_page(&mut self) {
        if self.spec.page > 1 {
            self.set_page_unchecked(self.spec.page - 1);
        }
    }

    pub fn go_to_page(&mut self, page: usize) {
        if (1..=self.outcome.page_count).contains(&page) {
            self.set_page_unchecked(page);
        }
    }

    fn set_page_unchecked(&mut self, page: usize) {
        self.spec.page = page;
        self.outcome.current_page = page;
    }

    // -- Read accessors --

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn tab(&self) -> Tab {
        self.spec.tab
    }

    pub fn tab_content(&self) -> TabContent {
        self.spec.tab.content()
    }

    pub fn fund_type(&self) -> FundTypeFilter {
        self.spec.fund_type
    }

    pub fn statuses(&self) -> &BTreeSet<ReturnStatus> {
        &self.spec.statuses
    }

    pub fn period_years(&self) -> &BTreeSet<String> {
        &self.spec.period_years
    }

    pub fn search_query(&self) -> &str {
        &self.spec.search_query
    }

    pub fn current_page(&self) -> usize {
        self.outcome.current_page
    }

    pub fn page_count(&self) -> usize {
        self.outcome.page_count
    }

    /// All filings passing the filters, in provider order.
    pub fn filtered_records(&self) -> impl Iterator<Item = &Filing> + '_ {
        self.outcome.indices.iter().map(|&i| &self.records[i])
    }

    /// Filings on the current page.
    pub fn paged_slice(&self) -> Vec<&Filing> {
        self.outcome
            .page_indices()
            .iter()
            .map(|&i| &self.records[i])
            .collect()
    }

    pub fn visible_count(&self) -> usize {
        self.outcome.indices.len()
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    /// Distinct period years in the loaded records, newest first.
    pub fn available_years(&self) -> Vec<String> {
        let years: BTreeSet<&str> = self.records.iter().filter_map(Filing::period_year).collect();
        years.into_iter().rev().map(str::to_string).collect()
    }

    /// Look up a loaded filing by id.
    pub fn get_record(&self, id: &str) -> Option<&Filing> {
        self.records.iter().find(|f| f.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::PAGE_SIZE;
    use crate::data::model::FundType;
    use crate::data::provider::{FileProvider, SeedProvider};
    use crate::data::seed::seed_filings;
    use crate::error::Error;

    fn seeded() -> DashboardState {
        let mut state = DashboardState::default();
        state.load(&SeedProvider::new()).unwrap();
        state
    }

    /// 40 active filings: four pages.
    fn many() -> DashboardState {
        let template = seed_filings().remove(0);
        let records = (1..=40)
            .map(|i| Filing {
                id: i.to_string(),
                entity_id: (1000 + i).to_string(),
                ..template.clone()
            })
            .collect();
        DashboardState::with_records(records)
    }

    fn assert_page_in_range(state: &DashboardState) {
        assert!(state.current_page() >= 1);
        assert!(state.current_page() <= state.page_count());
        let expected = state.visible_count().div_ceil(PAGE_SIZE).max(1);
        assert_eq!(state.page_count(), expected);
    }

    #[test]
    fn default_active_tab_fits_one_page() {
        let state = seeded();
        assert_eq!(state.tab(), Tab::Active);
        assert_eq!(state.visible_count(), 8);
        assert_eq!(state.page_count(), 1);
        assert_eq!(state.paged_slice().len(), 8);
    }

    #[test]
    fn tab_change_clears_statuses_and_page() {
        let mut state = many();
        state.go_to_page(3);
        state.set_statuses([ReturnStatus::Available]);
        state.go_to_page(2);
        state.set_tab(Tab::Reports);
        assert!(state.statuses().is_empty());
        assert_eq!(state.current_page(), 1);
        assert_page_in_range(&state);
    }

    #[test]
    fn every_filter_setter_resets_page() {
        let mut state = many();
        let steps: Vec<Box<dyn Fn(&mut DashboardState)>> = vec![
            Box::new(|s: &mut DashboardState| s.set_fund_type(FundTypeFilter::All)),
            Box::new(|s: &mut DashboardState| s.set_statuses(Vec::<ReturnStatus>::new())),
            Box::new(|s: &mut DashboardState| s.toggle_status(ReturnStatus::Available)),
            Box::new(|s: &mut DashboardState| s.set_period_years(Vec::<String>::new())),
            Box::new(|s: &mut DashboardState| s.toggle_period_year("2024")),
            Box::new(|s: &mut DashboardState| s.set_search_query("")),
            Box::new(|s: &mut DashboardState| s.reset_filters()),
        ];
        for step in steps {
            state.reset_filters();
            state.go_to_page(2);
            assert_eq!(state.current_page(), 2);
            step(&mut state);
            assert_eq!(state.current_page(), 1);
            assert_page_in_range(&state);
        }
    }

    #[test]
    fn reset_keeps_tab() {
        let mut state = seeded();
        state.set_tab(Tab::Returned);
        state.set_fund_type(FundTypeFilter::Only(FundType::Mutual));
        state.set_period_years(["2024"]);
        state.set_search_query("fund");
        state.reset_filters();

        assert_eq!(state.tab(), Tab::Returned);
        assert_eq!(state.fund_type(), FundTypeFilter::All);
        assert!(state.statuses().is_empty());
        assert!(state.period_years().is_empty());
        assert_eq!(state.search_query(), "");
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.visible_count(), 3);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut state = many();
        assert_eq!(state.page_count(), 4);

        state.previous_page();
        assert_eq!(state.current_page(), 1);

        for _ in 0..10 {
            state.next_page();
        }
        assert_eq!(state.current_page(), 4);
        assert_eq!(state.paged_slice().len(), 4);

        state.go_to_page(0);
        assert_eq!(state.current_page(), 4);
        state.go_to_page(5);
        assert_eq!(state.current_page(), 4);
        state.go_to_page(2);
        assert_eq!(state.current_page(), 2);
        assert_eq!(state.paged_slice()[0].id, "13");
    }

    #[test]
    fn shrinking_record_set_clamps_page() {
        let mut state = many();
        state.go_to_page(4);
        state.set_records(seed_filings());
        assert_page_in_range(&state);
        assert_eq!(state.current_page(), 1);
    }

    #[test]
    fn empty_filter_result_reports_one_empty_page() {
        let mut state = seeded();
        state.set_search_query("zzz");
        assert_eq!(state.visible_count(), 0);
        assert_eq!(state.page_count(), 1);
        assert_eq!(state.current_page(), 1);
        assert!(state.paged_slice().is_empty());
    }

    #[test]
    fn toggles_add_then_remove() {
        let mut state = seeded();
        state.toggle_status(ReturnStatus::Prepared);
        assert_eq!(state.visible_count(), 1);
        state.toggle_status(ReturnStatus::Prepared);
        assert_eq!(state.visible_count(), 8);

        state.toggle_period_year("2023");
        assert_eq!(state.visible_count(), 0);
        state.toggle_period_year("2023");
        assert!(state.period_years().is_empty());
    }

    #[test]
    fn available_years_are_newest_first() {
        assert_eq!(seeded().available_years(), ["2024", "2023"]);
    }

    #[test]
    fn tab_content_hides_status_filter_on_history_tabs() {
        let mut state = seeded();
        assert!(state.tab_content().show_status_filter);
        state.set_tab(Tab::Submitted);
        assert!(!state.tab_content().show_status_filter);
        assert_eq!(state.tab_content().title, "Submitted Filings");
    }

    #[test]
    fn failed_load_keeps_previous_records() {
        let mut state = seeded();
        let err = state
            .load(&FileProvider::new("/nonexistent/filings.csv"))
            .unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
        assert!(!state.loading);
        assert_eq!(state.total_count(), 12);
        assert!(state.status_message.is_some());
    }

    #[test]
    fn get_record_is_none_for_unknown_id() {
        let state = seeded();
        assert!(state.get_record("42").is_none());
        assert_eq!(state.get_record("4").map(|f| f.status), Some(ReturnStatus::Processed));
    }
}
