//! Cross-module aggregation for the admin dashboard.

mod router;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::records::{Choice, StoreError};

pub use router::dashboard_router;

/// Counts reported by a single workflow module.
///
/// Extra figures are flattened next to `total` and `by_status`; whole counts
/// stay integers in the JSON body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModuleStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    #[serde(flatten)]
    pub counts: BTreeMap<&'static str, u64>,
    #[serde(flatten)]
    pub amounts: BTreeMap<&'static str, f64>,
}

impl ModuleStats {
    /// Tally statuses, listing every known status even when its count is zero.
    pub fn tally<S, I>(statuses: I) -> Self
    where
        S: Choice,
        I: IntoIterator<Item = S>,
    {
        let mut by_status: BTreeMap<&'static str, usize> =
            S::ALL.iter().map(|status| (status.label(), 0)).collect();
        let mut total = 0;
        for status in statuses {
            *by_status.entry(status.label()).or_default() += 1;
            total += 1;
        }

        Self {
            total,
            by_status,
            ..Self::default()
        }
    }

    pub fn with_count(mut self, name: &'static str, value: u64) -> Self {
        self.counts.insert(name, value);
        self
    }

    pub fn with_amount(mut self, name: &'static str, value: f64) -> Self {
        self.amounts.insert(name, value);
        self
    }
}

/// Zone totals for the map widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MapStats {
    pub zones: usize,
    pub total_area_sqm: f64,
}

/// What a single source contributes to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModuleSummary {
    Workflow(ModuleStats),
    Map(MapStats),
}

impl ModuleSummary {
    /// Number of records behind the summary.
    pub fn total(&self) -> usize {
        match self {
            Self::Workflow(stats) => stats.total,
            Self::Map(stats) => stats.zones,
        }
    }

    pub fn workflow(&self) -> Option<&ModuleStats> {
        match self {
            Self::Workflow(stats) => Some(stats),
            Self::Map(_) => None,
        }
    }
}

impl From<ModuleStats> for ModuleSummary {
    fn from(stats: ModuleStats) -> Self {
        Self::Workflow(stats)
    }
}

impl From<MapStats> for ModuleSummary {
    fn from(stats: MapStats) -> Self {
        Self::Map(stats)
    }
}

/// Sum that starts from positive zero, so an empty input serializes as `0.0`.
pub fn sum_amounts<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    values.into_iter().fold(0.0, |acc, value| acc + value)
}

/// Implemented by each workflow service so the dashboard stays decoupled from storage.
pub trait StatsSource: Send + Sync {
    fn module(&self) -> &'static str;
    fn stats(&self) -> Result<ModuleSummary, StoreError>;
}

/// Dashboard payload for `GET /api/dashboard/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub modules: BTreeMap<&'static str, ModuleSummary>,
    pub generated_at: DateTime<Utc>,
}

pub struct DashboardService {
    sources: Vec<Arc<dyn StatsSource>>,
}

impl DashboardService {
    pub fn new(sources: Vec<Arc<dyn StatsSource>>) -> Self {
        Self { sources }
    }

    pub fn stats(&self) -> Result<DashboardStats, StoreError> {
        let mut modules = BTreeMap::new();
        for source in &self.sources {
            let stats = source.stats()?;
            debug!(module = source.module(), total = stats.total(), "collected module stats");
            modules.insert(source.module(), stats);
        }

        Ok(DashboardStats {
            modules,
            generated_at: Utc::now(),
        })
    }
}
