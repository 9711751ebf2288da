//! Calendar-month aggregation of cash events.
//!
//! The month-level minimum only looks at closing balances at month end. It
//! is coarser than the event-level minimum in [`crate::balance`] and misses
//! any dip that recovers before the month closes; both figures are kept.

use crate::balance::MinimumBalance;
use crate::money::Money;
use crate::normalizer::{CashEvent, Direction};
use crate::window::{DateWindow, MonthKey};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Inflows, outflows and closing balance of one calendar month.
///
/// Outflow fields hold positive magnitudes, so
/// `net_flow == (capital_in + operational_in) - (capital_out + operational_out)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthBucket {
    pub month: MonthKey,

    /// Last day of the month, or the window end for a partial final month.
    pub checkpoint: NaiveDate,
    pub capital_in: Money,
    pub capital_out: Money,
    pub operational_in: Money,
    pub operational_out: Money,
    pub net_flow: Money,
    pub closing_balance: Money,
}

impl MonthBucket {
    fn empty(month: MonthKey, checkpoint: NaiveDate) -> Self {
        MonthBucket {
            month,
            checkpoint,
            capital_in: Money::ZERO,
            capital_out: Money::ZERO,
            operational_in: Money::ZERO,
            operational_out: Money::ZERO,
            net_flow: Money::ZERO,
            closing_balance: Money::ZERO,
        }
    }

    fn add(&mut self, event: &CashEvent) {
        let magnitude = event.signed_amount.abs();
        let slot = match (event.category.is_capital(), event.category.direction()) {
            (true, Direction::Inflow) => &mut self.capital_in,
            (true, Direction::Outflow) => &mut self.capital_out,
            (false, Direction::Inflow) => &mut self.operational_in,
            (false, Direction::Outflow) => &mut self.operational_out,
        };
        *slot += magnitude;
    }

    pub fn inflow(&self) -> Money {
        self.capital_in + self.operational_in
    }

    pub fn outflow(&self) -> Money {
        self.capital_out + self.operational_out
    }
}

/// Monthly buckets for a window plus the month-end minimum balance.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub buckets: Vec<MonthBucket>,
    pub opening_balance: Money,
    pub minimum: MinimumBalance,
}

impl MonthlySummary {
    pub fn closing_balance(&self) -> Money {
        self.buckets
            .last()
            .map(|b| b.closing_balance)
            .unwrap_or(self.opening_balance)
    }
}

/// Buckets in-window events by calendar month.
///
/// Every month the window touches gets a bucket, including partial months at
/// the edges and months without any activity.
pub fn aggregate_monthly(
    events: &[CashEvent],
    opening_balance: Money,
    window: &DateWindow,
) -> MonthlySummary {
    let mut buckets: Vec<MonthBucket> = window
        .months()
        .map(|month| {
            let checkpoint = month
                .last_day()
                .map(|last| last.min(window.end()))
                .unwrap_or(window.end());
            MonthBucket::empty(month, checkpoint)
        })
        .collect();

    let index: HashMap<MonthKey, usize> = buckets
        .iter()
        .enumerate()
        .map(|(i, b)| (b.month, i))
        .collect();

    for event in events.iter().filter(|e| window.contains(e.date)) {
        if let Some(&i) = index.get(&MonthKey::of(event.date)) {
            buckets[i].add(event);
        }
    }

    let mut closing = opening_balance;
    for bucket in &mut buckets {
        bucket.net_flow = bucket.inflow() - bucket.outflow();
        closing += bucket.net_flow;
        bucket.closing_balance = closing;
    }

    let minimum = buckets
        .iter()
        .fold(None, |lowest: Option<MinimumBalance>, bucket| match lowest {
            Some(m) if m.amount <= bucket.closing_balance => Some(m),
            _ => Some(MinimumBalance {
                amount: bucket.closing_balance,
                date: bucket.checkpoint,
            }),
        })
        .unwrap_or(MinimumBalance {
            amount: opening_balance,
            date: window.end(),
        });

    MonthlySummary {
        buckets,
        opening_balance,
        minimum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::{EventCategory, SourceRef};
    use crate::record::RecordCategory;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(category: EventCategory, on: NaiveDate, amount: i64) -> CashEvent {
        CashEvent {
            id: format!("{}-{}", category, on),
            category,
            date: on,
            signed_amount: category.signed(Money::from_units(amount)),
            description: String::new(),
            source: SourceRef {
                category: RecordCategory::Invoice,
                record_id: String::new(),
            },
        }
    }

    #[test]
    fn test_same_day_in_and_out_net_out() {
        let window = DateWindow::new(date(2025, 3, 1), date(2025, 3, 31)).unwrap();
        let events = vec![
            event(EventCategory::NonRecurring, date(2025, 3, 1), 100),
            event(EventCategory::Invoice, date(2025, 3, 1), 50),
        ];
        let summary = aggregate_monthly(&events, Money::from_units(1000), &window);

        assert_eq!(summary.buckets.len(), 1);
        let march = &summary.buckets[0];
        assert_eq!(march.net_flow, Money::from_units(-50));
        assert_eq!(march.closing_balance, Money::from_units(950));
        assert_eq!(march.operational_in, Money::from_units(50));
        assert_eq!(march.operational_out, Money::from_units(100));
    }

    #[test]
    fn test_capital_and_operational_split() {
        let window = DateWindow::new(date(2025, 1, 1), date(2025, 1, 31)).unwrap();
        let events = vec![
            event(EventCategory::CapitalBuy, date(2025, 1, 3), 5000),
            event(EventCategory::CapitalSale, date(2025, 1, 4), 2000),
            event(EventCategory::Recurring, date(2025, 1, 5), 300),
            event(EventCategory::SupplierPayment, date(2025, 1, 6), 200),
            event(EventCategory::Invoice, date(2025, 1, 7), 900),
        ];
        let summary = aggregate_monthly(&events, Money::ZERO, &window);
        let bucket = &summary.buckets[0];

        assert_eq!(bucket.capital_out, Money::from_units(5000));
        assert_eq!(bucket.capital_in, Money::from_units(2000));
        assert_eq!(bucket.operational_out, Money::from_units(500));
        assert_eq!(bucket.operational_in, Money::from_units(900));
        assert_eq!(bucket.net_flow, Money::from_units(-2600));
    }

    #[test]
    fn test_closing_balance_chains_and_empty_months_exist() {
        let window = DateWindow::new(date(2025, 1, 15), date(2025, 4, 10)).unwrap();
        let events = vec![
            event(EventCategory::Invoice, date(2025, 1, 20), 100),
            event(EventCategory::NonRecurring, date(2025, 3, 2), 40),
            event(EventCategory::Invoice, date(2025, 4, 11), 999),
        ];
        let summary = aggregate_monthly(&events, Money::from_units(10), &window);

        let closings: Vec<Money> = summary.buckets.iter().map(|b| b.closing_balance).collect();
        assert_eq!(
            closings,
            vec![
                Money::from_units(110),
                Money::from_units(110),
                Money::from_units(70),
                Money::from_units(70),
            ]
        );
        assert_eq!(summary.buckets[3].checkpoint, date(2025, 4, 10));
        assert_eq!(summary.buckets[1].checkpoint, date(2025, 2, 28));
        assert_eq!(summary.closing_balance(), Money::from_units(70));
    }

    #[test]
    fn test_month_end_minimum_misses_intra_month_dip() {
        let window = DateWindow::new(date(2025, 3, 1), date(2025, 4, 30)).unwrap();
        let events = vec![
            event(EventCategory::SupplierPayment, date(2025, 3, 5), 500),
            event(EventCategory::Invoice, date(2025, 3, 20), 500),
            event(EventCategory::Recurring, date(2025, 4, 1), 50),
        ];
        let summary = aggregate_monthly(&events, Money::from_units(100), &window);

        assert_eq!(summary.minimum.amount, Money::from_units(50));
        assert_eq!(summary.minimum.date, date(2025, 4, 30));
    }

    #[test]
    fn test_minimum_tie_keeps_earliest_month() {
        let window = DateWindow::new(date(2025, 1, 1), date(2025, 3, 31)).unwrap();
        let summary = aggregate_monthly(&[], Money::from_units(20), &window);

        assert_eq!(summary.buckets.len(), 3);
        assert_eq!(summary.minimum.amount, Money::from_units(20));
        assert_eq!(summary.minimum.date, date(2025, 1, 31));
    }
}
