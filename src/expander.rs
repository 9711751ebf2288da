//! Expansion of recurring payment rules into dated instances.
//!
//! Each rule pays once per calendar month on its `day_of_month`, clamped to
//! the month's last day (a rule on the 31st pays on Feb 28/29). Months are
//! walked one by one so windows crossing a year boundary need no special
//! casing.

use crate::money::Money;
use crate::record::RecurringPaymentRule;
use crate::window::DateWindow;
use chrono::NaiveDate;
use log::{debug, warn};

/// One dated payment produced from a recurring rule.
///
/// The amount is the rule's positive magnitude; the sign is applied by the
/// normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringInstance {
    pub rule_id: String,
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
}

impl RecurringInstance {
    /// Identifier unique per rule and payment date.
    pub fn instance_id(&self) -> String {
        format!("{}@{}", self.rule_id, self.date)
    }
}

/// Expands every rule over `window`.
///
/// Rules with a `day_of_month` outside `1..=31` or a missing or non-positive
/// amount are skipped with a warning; the remaining rules still expand.
pub fn expand_rules(rules: &[RecurringPaymentRule], window: &DateWindow) -> Vec<RecurringInstance> {
    let mut instances = Vec::new();

    for rule in rules {
        let day = match u32::try_from(rule.day_of_month) {
            Ok(day) if (1..=31).contains(&day) => day,
            _ => {
                warn!(
                    "Rule {}: day_of_month {} out of range 1-31, skipping",
                    rule.id, rule.day_of_month
                );
                continue;
            }
        };

        let amount = match rule.amount {
            Some(amount) if amount.is_positive() => amount,
            Some(amount) => {
                warn!("Rule {}: non-positive amount {}, skipping", rule.id, amount);
                continue;
            }
            None => {
                warn!("Rule {}: missing or non-numeric amount, skipping", rule.id);
                continue;
            }
        };

        let before = instances.len();
        for month in window.months() {
            let Some(date) = month.clamped_day(day) else {
                continue;
            };
            if window.contains(date) {
                instances.push(RecurringInstance {
                    rule_id: rule.id.clone(),
                    description: rule.description.clone(),
                    amount,
                    date,
                });
            }
        }

        debug!(
            "Rule {}: expanded to {} instances",
            rule.id,
            instances.len() - before
        );
    }

    instances
}
