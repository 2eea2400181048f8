use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::loader::load_file;
use super::model::{validate_records, Filing, FundType, ReturnStatus};
use super::seed::seed_filings;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Provider contract
// ---------------------------------------------------------------------------

/// Source of filing records.
///
/// Implementations must hand back the same records in the same order on
/// every call within a session. A missing id is `Ok(None)`, not an error.
pub trait ReturnsProvider {
    fn list_all(&self) -> Result<Vec<Filing>>;

    fn get_by_id(&self, id: &str) -> Result<Option<Filing>> {
        log::info!("Fetching filing with id {id}");
        Ok(self.list_all()?.into_iter().find(|f| f.id == id))
    }

    /// Coarse filter: exact fund type, exact status, and a plain
    /// case-insensitive search over name, entity id and record id.
    fn filter_returns(
        &self,
        fund_type: Option<FundType>,
        status: Option<ReturnStatus>,
        search: Option<&str>,
    ) -> Result<Vec<Filing>> {
        log::info!(
            "Filtering filings - fund type: {fund_type:?}, status: {status:?}, search: {search:?}"
        );
        let needle = search
            .filter(|q| !q.trim().is_empty())
            .map(str::to_lowercase);

        Ok(self
            .list_all()?
            .into_iter()
            .filter(|f| fund_type.is_none_or(|t| f.fund_type == t))
            .filter(|f| status.is_none_or(|s| f.status == s))
            .filter(|f| {
                needle.as_deref().is_none_or(|q| {
                    f.fund_name.to_lowercase().contains(q)
                        || f.entity_id.to_lowercase().contains(q)
                        || f.id.to_lowercase().contains(q)
                })
            })
            .collect())
    }
}

impl<P: ReturnsProvider + ?Sized> ReturnsProvider for Box<P> {
    fn list_all(&self) -> Result<Vec<Filing>> {
        (**self).list_all()
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Filing>> {
        (**self).get_by_id(id)
    }
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

/// The built-in sample dataset, materialized once.
#[derive(Debug, Default)]
pub struct SeedProvider {
    cache: OnceLock<Vec<Filing>>,
}

impl SeedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> &[Filing] {
        self.cache.get_or_init(seed_filings).as_slice()
    }
}

impl ReturnsProvider for SeedProvider {
    fn list_all(&self) -> Result<Vec<Filing>> {
        log::info!("Fetching all filings");
        Ok(self.records().to_vec())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Filing>> {
        log::info!("Fetching filing with id {id}");
        Ok(self.records().iter().find(|f| f.id == id).cloned())
    }
}

/// Records already in memory.
#[derive(Debug, Clone)]
pub struct InMemoryProvider {
    records: Vec<Filing>,
}

impl InMemoryProvider {
    /// Wrap validated records.
    pub fn new(records: Vec<Filing>) -> Result<Self> {
        validate_records(&records)?;
        Ok(Self { records })
    }
}

impl ReturnsProvider for InMemoryProvider {
    fn list_all(&self) -> Result<Vec<Filing>> {
        Ok(self.records.clone())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Filing>> {
        Ok(self.records.iter().find(|f| f.id == id).cloned())
    }
}

/// Filings read from a `.parquet`, `.json` or `.csv` file on first use.
///
/// The file is read once; later calls serve the cached records so the
/// order stays stable for the session.
#[derive(Debug)]
pub struct FileProvider {
    path: PathBuf,
    cache: OnceLock<Vec<Filing>>,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn records(&self) -> Result<&[Filing]> {
        if let Some(records) = self.cache.get() {
            return Ok(records.as_slice());
        }
        let records = load_file(&self.path).inspect_err(|e| {
            log::error!("Failed to load {}: {e:#}", self.path.display());
        })?;
        validate_records(&records).inspect_err(|e| {
            log::warn!("Rejected {}: {e}", self.path.display());
        })?;
        log::info!(
            "Loaded {} filings from {}",
            records.len(),
            self.path.display()
        );
        Ok(self.cache.get_or_init(|| records).as_slice())
    }
}

impl ReturnsProvider for FileProvider {
    fn list_all(&self) -> Result<Vec<Filing>> {
        Ok(self.records()?.to_vec())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Filing>> {
        log::debug!("Looking up filing {id} in {}", self.path.display());
        Ok(self.records()?.iter().find(|f| f.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn seed_provider_is_stable_across_calls() {
        let provider = SeedProvider::new();
        let first = provider.list_all().unwrap();
        let second = provider.list_all().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 12);
    }

    #[test]
    fn missing_id_is_none() {
        let provider = SeedProvider::new();
        assert!(provider.get_by_id("999").unwrap().is_none());
        assert_eq!(provider.get_by_id("7").unwrap().unwrap().fund_name, "Small Cap Growth Fund");
    }

    #[test]
    fn filter_returns_combines_criteria() {
        let provider = SeedProvider::new();
        let hits = provider
            .filter_returns(Some(FundType::Mutual), Some(ReturnStatus::Available), Some("FUND"))
            .unwrap();
        let ids: Vec<&str> = hits.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["1", "5", "11"]);

        let all = provider.filter_returns(None, None, Some("  ")).unwrap();
        assert_eq!(all.len(), 12);
    }

    #[test]
    fn filter_returns_does_not_pad_ids() {
        let provider = SeedProvider::new();
        assert!(provider.filter_returns(None, None, Some("00101")).unwrap().is_empty());
    }

    #[test]
    fn in_memory_provider_rejects_duplicates() {
        let mut records = seed_filings();
        records.push(records[3].clone());
        assert!(matches!(InMemoryProvider::new(records), Err(Error::DuplicateId(_))));
    }

    #[test]
    fn file_provider_reports_missing_file_as_provider_failure() {
        let provider = FileProvider::new("/nonexistent/filings.json");
        assert!(matches!(provider.list_all(), Err(Error::Provider(_))));
    }
}
