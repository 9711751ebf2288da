//! Running-balance projection over a date window.
//!
//! The projector reports negative balances, it never rejects them: there is
//! no insufficient-funds condition at this layer.

use crate::money::Money;
use crate::normalizer::CashEvent;
use crate::window::DateWindow;
use chrono::NaiveDate;

/// One sample of the running balance.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub balance: Money,

    /// Event that moved the balance; `None` for the two window boundaries.
    pub triggering_event: Option<CashEvent>,
}

/// Lowest balance reached and the earliest date it was reached on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimumBalance {
    pub amount: Money,
    pub date: NaiveDate,
}

/// Running balance across a window.
///
/// # Invariants
///
/// - `points` is non-decreasing in date
/// - the first point is `(window.start, opening_balance)`
/// - the last point is `(window.end, final_balance)`
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSeries {
    pub points: Vec<BalancePoint>,
    pub opening_balance: Money,
    pub final_balance: Money,
    pub minimum: MinimumBalance,
}

/// Projects the running balance of in-window events.
///
/// Events are sorted by date with a stable sort, so same-day events apply in
/// input order. The minimum includes both boundary points and, when tied,
/// keeps the chronologically first occurrence.
pub fn project_balance(
    events: &[CashEvent],
    opening_balance: Money,
    window: &DateWindow,
) -> BalanceSeries {
    let mut in_window: Vec<&CashEvent> = events
        .iter()
        .filter(|e| window.contains(e.date))
        .collect();
    in_window.sort_by_key(|e| e.date);

    let mut points = Vec::with_capacity(in_window.len() + 2);
    points.push(BalancePoint {
        date: window.start(),
        balance: opening_balance,
        triggering_event: None,
    });

    let mut running = opening_balance;
    for event in in_window {
        running += event.signed_amount;
        points.push(BalancePoint {
            date: event.date,
            balance: running,
            triggering_event: Some(event.clone()),
        });
    }

    points.push(BalancePoint {
        date: window.end(),
        balance: running,
        triggering_event: None,
    });

    let mut minimum = MinimumBalance {
        amount: opening_balance,
        date: window.start(),
    };
    for point in &points {
        if point.balance < minimum.amount {
            minimum = MinimumBalance {
                amount: point.balance,
                date: point.date,
            };
        }
    }

    BalanceSeries {
        points,
        opening_balance,
        final_balance: running,
        minimum,
    }
}
