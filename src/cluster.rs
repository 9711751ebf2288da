//! Proximity clustering of events for timeline layout.
//!
//! Clusters are a presentation aid only. Balances and totals are always
//! computed from the events themselves, never from clusters.
//!
//! The default [`ClusterStrategy::DriftingCentroid`] walks date-sorted events
//! once and compares each event with the mean date of the open cluster. The
//! mean is recomputed after every admission, so a dense run of events pulls
//! the centroid forward and a cluster can end up spanning more than the
//! threshold. With a threshold of 7 days, events on days 0, 5 and 11 split
//! into `{0, 5}` and `{11}` (centroid 2.5, and 11 - 2.5 = 8.5 > 7), whereas
//! day 0, nine events on day 7 and day 13 stay together: the centroid has
//! drifted to 6.3 by the time day 13 is tested.

use crate::normalizer::CashEvent;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// How an event is tested for admission into the open cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterStrategy {
    /// Within the threshold of the cluster's running mean date.
    #[default]
    DriftingCentroid,

    /// Within the threshold of the cluster's latest member.
    SingleLinkage,

    /// Within the threshold of every member, i.e. of the earliest one.
    CompleteLinkage,
}

/// A group of events placed together on a timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct EventCluster {
    /// Mean timestamp of all members, recomputed on each admission.
    pub centroid: NaiveDateTime,
    pub members: Vec<CashEvent>,

    day_sum: i64,
}

impl EventCluster {
    fn start(event: CashEvent) -> Self {
        let day_sum = day_number(event.date);
        EventCluster {
            centroid: midnight(event.date),
            members: vec![event],
            day_sum,
        }
    }

    fn admit(&mut self, event: CashEvent) {
        self.day_sum += day_number(event.date);
        self.members.push(event);
        self.centroid = self.mean_datetime();
    }

    /// Mean member date as fractional days from the common era.
    pub fn centroid_days(&self) -> f64 {
        self.day_sum as f64 / self.members.len() as f64
    }

    /// Calendar date the centroid falls on.
    pub fn centroid_date(&self) -> NaiveDate {
        self.centroid.date()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn first_day(&self) -> i64 {
        self.members.first().map(|e| day_number(e.date)).unwrap_or(0)
    }

    fn last_day(&self) -> i64 {
        self.members.last().map(|e| day_number(e.date)).unwrap_or(0)
    }

    fn mean_datetime(&self) -> NaiveDateTime {
        let mean = self.centroid_days();
        let whole = mean.floor();
        let seconds = ((mean - whole) * SECONDS_PER_DAY).round() as i64;

        match i32::try_from(whole as i64)
            .ok()
            .and_then(NaiveDate::from_num_days_from_ce_opt)
        {
            Some(date) => midnight(date) + Duration::seconds(seconds),
            None => self.centroid,
        }
    }

    fn accepts(&self, event: &CashEvent, threshold_days: u32, strategy: ClusterStrategy) -> bool {
        let day = day_number(event.date);
        let threshold = f64::from(threshold_days);

        let days_diff = match strategy {
            ClusterStrategy::DriftingCentroid => (day as f64 - self.centroid_days()).abs(),
            ClusterStrategy::SingleLinkage => (day - self.last_day()).abs() as f64,
            ClusterStrategy::CompleteLinkage => (day - self.first_day()).abs() as f64,
        };

        days_diff <= threshold
    }
}

/// Groups `events` into clusters in ascending date order.
///
/// Events are sorted by date first (stable, so same-day events keep their
/// input order). `threshold_days` is supplied by the caller; timelines use
/// different values for operational and capital events.
pub fn cluster_events(
    events: &[CashEvent],
    threshold_days: u32,
    strategy: ClusterStrategy,
) -> Vec<EventCluster> {
    let mut sorted = events.to_vec();
    sorted.sort_by_key(|e| e.date);

    let mut clusters = Vec::new();
    let mut current: Option<EventCluster> = None;

    for event in sorted {
        current = Some(match current.take() {
            None => EventCluster::start(event),
            Some(mut cluster) => {
                if cluster.accepts(&event, threshold_days, strategy) {
                    cluster.admit(event);
                    cluster
                } else {
                    clusters.push(cluster);
                    EventCluster::start(event)
                }
            }
        });
    }

    if let Some(cluster) = current {
        clusters.push(cluster);
    }

    clusters
}

fn day_number(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}
