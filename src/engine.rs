//! Projection pipeline.
//!
//! Expands recurring rules, normalizes all records into signed events and
//! derives clusters, the running balance and monthly buckets from them.
//! Every call rebuilds the whole result from its inputs; nothing is cached
//! or updated incrementally.

use crate::balance::{project_balance, BalanceSeries, MinimumBalance};
use crate::cluster::{cluster_events, ClusterStrategy, EventCluster};
use crate::expander::expand_rules;
use crate::money::Money;
use crate::monthly::{aggregate_monthly, MonthlySummary};
use crate::normalizer::{normalize, CashEvent};
use crate::record::RecordSet;
use crate::window::DateWindow;
use log::debug;

/// Cluster thresholds in days, one per timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterThresholds {
    pub operational: u32,
    pub capital: u32,
}

impl Default for ClusterThresholds {
    fn default() -> Self {
        ClusterThresholds {
            operational: 7,
            capital: 14,
        }
    }
}

/// Which minimum-balance figure [`Projection::minimum_balance`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinimumGranularity {
    /// Lowest balance after any single event.
    #[default]
    Event,

    /// Lowest closing balance at month-end checkpoints.
    Month,
}

/// Everything a projection run depends on besides the records.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    pub window: DateWindow,
    pub opening_balance: Money,
    pub thresholds: ClusterThresholds,
    pub strategy: ClusterStrategy,
    pub granularity: MinimumGranularity,
}

impl ProjectionConfig {
    /// Config with default thresholds, strategy and granularity.
    pub fn new(window: DateWindow, opening_balance: Money) -> Self {
        ProjectionConfig {
            window,
            opening_balance,
            thresholds: ClusterThresholds::default(),
            strategy: ClusterStrategy::default(),
            granularity: MinimumGranularity::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: ClusterThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_strategy(mut self, strategy: ClusterStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_granularity(mut self, granularity: MinimumGranularity) -> Self {
        self.granularity = granularity;
        self
    }
}

/// Clusters for the operational and the capital timeline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimelineClusters {
    pub operational: Vec<EventCluster>,
    pub capital: Vec<EventCluster>,
}

/// Complete derived output of one projection run.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// All normalized events, in no particular order and not window-filtered.
    pub events: Vec<CashEvent>,
    pub clusters: TimelineClusters,
    pub balance: BalanceSeries,
    pub monthly: MonthlySummary,

    /// Minimum at the granularity the config asked for.
    pub minimum_balance: MinimumBalance,
    pub granularity: MinimumGranularity,
}

impl Projection {
    /// Minimum at the given granularity, regardless of the configured one.
    pub fn minimum_at(&self, granularity: MinimumGranularity) -> MinimumBalance {
        match granularity {
            MinimumGranularity::Event => self.balance.minimum,
            MinimumGranularity::Month => self.monthly.minimum,
        }
    }

    /// How far the month-end minimum sits above the event-level one, when
    /// an intra-month dip recovered before month end.
    pub fn minimum_discrepancy(&self) -> Option<Money> {
        let gap = self.monthly.minimum.amount - self.balance.minimum.amount;
        if gap.is_zero() {
            None
        } else {
            Some(gap)
        }
    }

    pub fn final_balance(&self) -> Money {
        self.balance.final_balance
    }
}

/// Runs the full pipeline over `records`.
///
/// Clusters, the balance series and the monthly buckets only consider
/// events inside the window.
pub fn compute_projection(records: &RecordSet, config: &ProjectionConfig) -> Projection {
    let window = &config.window;

    let instances = expand_rules(&records.rules, window);
    let events = normalize(&instances, &records.one_offs);
    debug!(
        "Normalized {} events ({} from recurring rules)",
        events.len(),
        instances.len()
    );

    let (capital, operational): (Vec<CashEvent>, Vec<CashEvent>) = events
        .iter()
        .filter(|e| window.contains(e.date))
        .cloned()
        .partition(|e| e.category.is_capital());

    let clusters = TimelineClusters {
        operational: cluster_events(
            &operational,
            config.thresholds.operational,
            config.strategy,
        ),
        capital: cluster_events(&capital, config.thresholds.capital, config.strategy),
    };

    let balance = project_balance(&events, config.opening_balance, window);
    let monthly = aggregate_monthly(&events, config.opening_balance, window);

    let projection = Projection {
        minimum_balance: match config.granularity {
            MinimumGranularity::Event => balance.minimum,
            MinimumGranularity::Month => monthly.minimum,
        },
        granularity: config.granularity,
        events,
        clusters,
        balance,
        monthly,
    };

    if let Some(gap) = projection.minimum_discrepancy() {
        debug!(
            "Event-level minimum {} on {} is {} below month-end minimum {} on {}",
            projection.balance.minimum.amount,
            projection.balance.minimum.date,
            gap,
            projection.monthly.minimum.amount,
            projection.monthly.minimum.date
        );
    }

    projection
}
