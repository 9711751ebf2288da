//! Normalization of every record kind into one signed event stream.
//!
//! The sign of a [`CashEvent`] comes from its category alone. Source records
//! are not consistently signed (a supplier payment may be stored as `200` or
//! `-200`), so only the magnitude of the stored amount is used.

use crate::expander::RecurringInstance;
use crate::money::Money;
use crate::record::{OneOffKind, OneOffRecord, RecordCategory};
use chrono::NaiveDate;
use log::warn;
use std::fmt;

/// Whether an event category adds to or draws from the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inflow,
    Outflow,
}

/// Category of a canonical cash event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Recurring,
    NonRecurring,
    Invoice,
    SupplierPayment,
    CapitalBuy,
    CapitalSale,
}

impl EventCategory {
    pub fn direction(&self) -> Direction {
        match self {
            EventCategory::Invoice | EventCategory::CapitalSale => Direction::Inflow,
            EventCategory::Recurring
            | EventCategory::NonRecurring
            | EventCategory::SupplierPayment
            | EventCategory::CapitalBuy => Direction::Outflow,
        }
    }

    /// Capital categories; the other four are operational.
    pub fn is_capital(&self) -> bool {
        matches!(self, EventCategory::CapitalBuy | EventCategory::CapitalSale)
    }

    /// Applies this category's sign to the magnitude of `amount`.
    pub fn signed(&self, amount: Money) -> Money {
        match self.direction() {
            Direction::Inflow => amount.abs(),
            Direction::Outflow => -amount.abs(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Recurring => "recurring",
            EventCategory::NonRecurring => "nonRecurring",
            EventCategory::Invoice => "invoice",
            EventCategory::SupplierPayment => "supplierPayment",
            EventCategory::CapitalBuy => "capitalBuy",
            EventCategory::CapitalSale => "capitalSale",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OneOffKind> for EventCategory {
    fn from(kind: OneOffKind) -> Self {
        match kind {
            OneOffKind::NonRecurring => EventCategory::NonRecurring,
            OneOffKind::Invoice => EventCategory::Invoice,
            OneOffKind::SupplierPayment => EventCategory::SupplierPayment,
            OneOffKind::CapitalBuy => EventCategory::CapitalBuy,
            OneOffKind::CapitalSale => EventCategory::CapitalSale,
        }
    }
}

/// Pointer back to the stored record an event was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub category: RecordCategory,
    pub record_id: String,
}

/// Canonical signed cash event.
///
/// # Invariants
///
/// - Inflow categories have `signed_amount >= 0`
/// - Outflow categories have `signed_amount <= 0`
#[derive(Debug, Clone, PartialEq)]
pub struct CashEvent {
    pub id: String,
    pub category: EventCategory,
    pub date: NaiveDate,
    pub signed_amount: Money,
    pub description: String,
    pub source: SourceRef,
}

/// Produces one event per input, in input order: recurring instances
/// first, then one-off records.
///
/// Output order carries no meaning; consumers sort by date themselves. A
/// one-off record with a missing or non-numeric amount becomes a
/// zero-amount event with a warning rather than being dropped.
pub fn normalize(instances: &[RecurringInstance], one_offs: &[OneOffRecord]) -> Vec<CashEvent> {
    let mut events = Vec::with_capacity(instances.len() + one_offs.len());

    for instance in instances {
        events.push(CashEvent {
            id: instance.instance_id(),
            category: EventCategory::Recurring,
            date: instance.date,
            signed_amount: EventCategory::Recurring.signed(instance.amount),
            description: instance.description.clone(),
            source: SourceRef {
                category: RecordCategory::RecurringPaymentRule,
                record_id: instance.rule_id.clone(),
            },
        });
    }

    for record in one_offs {
        let category = EventCategory::from(record.kind);
        let amount = record.amount.unwrap_or_else(|| {
            warn!(
                "{} record {}: missing or non-numeric amount, treating as 0",
                category, record.id
            );
            Money::ZERO
        });

        events.push(CashEvent {
            id: record.id.clone(),
            category,
            date: record.date,
            signed_amount: category.signed(amount),
            description: record.description.clone(),
            source: SourceRef {
                category: record.kind.source_category(),
                record_id: record.id.clone(),
            },
        });
    }

    events
}
