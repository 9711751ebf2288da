//! Record models for CSV parsing and the typed records the engine consumes.

use crate::error::{EngineError, Result};
use crate::money::Money;
use crate::window::parse_date;
use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Category a raw record is stored under in the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordCategory {
    RecurringPaymentRule,
    NonRecurringPayment,
    Invoice,
    SupplierPayment,
    CapitalTransaction,
}

impl RecordCategory {
    /// Every category, in the order the loader queries them.
    pub const ALL: [RecordCategory; 5] = [
        RecordCategory::RecurringPaymentRule,
        RecordCategory::NonRecurringPayment,
        RecordCategory::Invoice,
        RecordCategory::SupplierPayment,
        RecordCategory::CapitalTransaction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordCategory::RecurringPaymentRule => "recurringPaymentRule",
            RecordCategory::NonRecurringPayment => "nonRecurringPayment",
            RecordCategory::Invoice => "invoice",
            RecordCategory::SupplierPayment => "supplierPayment",
            RecordCategory::CapitalTransaction => "capitalTransaction",
        }
    }
}

impl fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordCategory {
    type Err = String;

    /// Accepts camelCase, snake_case and kebab-case spellings.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match folded.as_str() {
            "recurringpaymentrule" | "recurring" => Ok(RecordCategory::RecurringPaymentRule),
            "nonrecurringpayment" | "nonrecurring" => Ok(RecordCategory::NonRecurringPayment),
            "invoice" => Ok(RecordCategory::Invoice),
            "supplierpayment" => Ok(RecordCategory::SupplierPayment),
            "capitaltransaction" | "capital" => Ok(RecordCategory::CapitalTransaction),
            _ => Err(format!("unknown record category '{}'", s.trim())),
        }
    }
}

/// Raw record as held by the record store.
///
/// Every field except `id` is optional text: the store is schemaless and
/// fields are present inconsistently. [`RawRecord::parse`] is the single
/// place where a raw row is validated into a typed [`Record`].
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub id: String,

    pub description: Option<String>,

    /// Amount as stored; may be missing, non-numeric or carry either sign
    pub amount: Option<String>,

    /// `YYYY-MM-DD`, required for one-off records
    pub date: Option<String>,

    /// Required for recurring payment rules
    pub day_of_month: Option<String>,

    /// `buy` or `sale`, required for capital transactions
    pub kind: Option<String>,
}

impl RawRecord {
    /// Parses the raw record stored under `category` into a typed record.
    ///
    /// A missing or non-numeric amount is not an error here; it is carried
    /// as `None` and resolved downstream.
    pub fn parse(&self, category: RecordCategory) -> Result<Record> {
        let id = self.id.trim().to_string();
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        let amount = self.parse_amount();

        match category {
            RecordCategory::RecurringPaymentRule => {
                let day_of_month = self.parse_day_of_month()?;
                Ok(Record::Rule(RecurringPaymentRule {
                    id,
                    description,
                    amount,
                    day_of_month,
                }))
            }
            RecordCategory::NonRecurringPayment => {
                self.one_off(id, description, amount, OneOffKind::NonRecurring)
            }
            RecordCategory::Invoice => self.one_off(id, description, amount, OneOffKind::Invoice),
            RecordCategory::SupplierPayment => {
                self.one_off(id, description, amount, OneOffKind::SupplierPayment)
            }
            RecordCategory::CapitalTransaction => {
                let kind = self.parse_capital_kind()?;
                self.one_off(id, description, amount, kind)
            }
        }
    }

    fn one_off(
        &self,
        id: String,
        description: String,
        amount: Option<Money>,
        kind: OneOffKind,
    ) -> Result<Record> {
        let date = self.parse_date()?;
        Ok(Record::OneOff(OneOffRecord {
            id,
            description,
            amount,
            date,
            kind,
        }))
    }

    fn parse_amount(&self) -> Option<Money> {
        let amount_str = self.amount.as_ref()?;
        let trimmed = amount_str.trim();
        if trimmed.is_empty() {
            return None;
        }
        let exact = Decimal::from_str(trimmed).ok()?;
        let amount = Money::new(exact);
        if amount.as_decimal() != exact {
            warn!(
                "Record {}: amount {} has more than {} decimal places, rounded to {}",
                self.id,
                trimmed,
                Money::SCALE,
                amount
            );
        }
        Some(amount)
    }

    fn parse_date(&self) -> Result<NaiveDate> {
        let raw = self
            .date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| self.invalid("missing date"))?;
        parse_date(raw).map_err(|e| self.invalid(&e.to_string()))
    }

    fn parse_day_of_month(&self) -> Result<i64> {
        let raw = self
            .day_of_month
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| self.invalid("missing day_of_month"))?;
        raw.parse::<i64>()
            .map_err(|_| self.invalid(&format!("day_of_month '{}' is not an integer", raw)))
    }

    fn parse_capital_kind(&self) -> Result<OneOffKind> {
        let kind = self
            .kind
            .as_deref()
            .map(|k| k.trim().to_lowercase())
            .unwrap_or_default();

        match kind.as_str() {
            "buy" | "purchase" => Ok(OneOffKind::CapitalBuy),
            "sale" | "sell" => Ok(OneOffKind::CapitalSale),
            "" => Err(self.invalid("capital transaction without kind")),
            other => Err(self.invalid(&format!("unknown capital kind '{}'", other))),
        }
    }

    fn invalid(&self, message: &str) -> EngineError {
        EngineError::InvalidRecord {
            id: self.id.trim().to_string(),
            message: message.to_string(),
        }
    }
}

/// A rule paying a fixed amount on the same day of every month.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringPaymentRule {
    pub id: String,
    pub description: String,

    /// Positive magnitude; `None` when the stored amount was unusable
    pub amount: Option<Money>,

    /// Expected in `1..=31`; validated by the expander
    pub day_of_month: i64,
}

/// Kind of a dated, non-recurring record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OneOffKind {
    NonRecurring,
    Invoice,
    SupplierPayment,
    CapitalBuy,
    CapitalSale,
}

impl OneOffKind {
    /// Store category this kind of record lives under.
    pub fn source_category(&self) -> RecordCategory {
        match self {
            OneOffKind::NonRecurring => RecordCategory::NonRecurringPayment,
            OneOffKind::Invoice => RecordCategory::Invoice,
            OneOffKind::SupplierPayment => RecordCategory::SupplierPayment,
            OneOffKind::CapitalBuy | OneOffKind::CapitalSale => RecordCategory::CapitalTransaction,
        }
    }
}

/// A single dated payment, invoice or capital transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOffRecord {
    pub id: String,
    pub description: String,

    /// Stored amount, sign not trusted; `None` when missing or non-numeric
    pub amount: Option<Money>,
    pub date: NaiveDate,
    pub kind: OneOffKind,
}

/// A validated record of any category.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Rule(RecurringPaymentRule),
    OneOff(OneOffRecord),
}

/// All records fetched from a store, split by shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub rules: Vec<RecurringPaymentRule>,
    pub one_offs: Vec<OneOffRecord>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Record) {
        match record {
            Record::Rule(rule) => self.rules.push(rule),
            Record::OneOff(one_off) => self.one_offs.push(one_off),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.one_offs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len() + self.one_offs.len()
    }
}

impl Extend<Record> for RecordSet {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        for record in iter {
            self.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str) -> RawRecord {
        RawRecord {
            id: id.to_string(),
            ..RawRecord::default()
        }
    }

    #[test]
    fn test_category_spellings() {
        assert_eq!(
            "recurringPaymentRule".parse::<RecordCategory>().unwrap(),
            RecordCategory::RecurringPaymentRule
        );
        assert_eq!(
            " supplier_payment ".parse::<RecordCategory>().unwrap(),
            RecordCategory::SupplierPayment
        );
        assert_eq!(
            "CAPITAL-TRANSACTION".parse::<RecordCategory>().unwrap(),
            RecordCategory::CapitalTransaction
        );
        assert!("refund".parse::<RecordCategory>().is_err());
    }

    #[test]
    fn test_parse_rule() {
        let mut record = raw("r1");
        record.description = Some(" Rent ".to_string());
        record.amount = Some("1200".to_string());
        record.day_of_month = Some("31".to_string());

        match record.parse(RecordCategory::RecurringPaymentRule).unwrap() {
            Record::Rule(rule) => {
                assert_eq!(rule.description, "Rent");
                assert_eq!(rule.amount, Some(Money::from_units(1200)));
                assert_eq!(rule.day_of_month, 31);
            }
            other => panic!("Expected rule, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rule_rejects_missing_day() {
        let mut record = raw("r1");
        record.amount = Some("10".to_string());

        assert!(matches!(
            record.parse(RecordCategory::RecurringPaymentRule),
            Err(EngineError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_parse_invoice_keeps_unusable_amount_as_none() {
        let mut record = raw("i1");
        record.amount = Some("twelve".to_string());
        record.date = Some("2025-03-01".to_string());

        match record.parse(RecordCategory::Invoice).unwrap() {
            Record::OneOff(one_off) => {
                assert_eq!(one_off.kind, OneOffKind::Invoice);
                assert!(one_off.amount.is_none());
            }
            other => panic!("Expected one-off, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_keeps_sub_cent_amounts() {
        let mut record = raw("i2");
        record.date = Some("2025-03-01".to_string());

        record.amount = Some("0.005".to_string());
        match record.parse(RecordCategory::Invoice).unwrap() {
            Record::OneOff(one_off) => {
                let amount = one_off.amount.unwrap();
                assert!(amount.is_positive());
                assert_eq!(amount.to_string(), "0.0050");
            }
            other => panic!("Expected one-off, got {:?}", other),
        }

        record.amount = Some("0.123456".to_string());
        match record.parse(RecordCategory::Invoice).unwrap() {
            Record::OneOff(one_off) => {
                assert_eq!(one_off.amount.unwrap().to_string(), "0.1235");
            }
            other => panic!("Expected one-off, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_one_off_rejects_missing_date() {
        let mut record = raw("p1");
        record.amount = Some("10".to_string());

        assert!(record.parse(RecordCategory::NonRecurringPayment).is_err());
    }

    #[test]
    fn test_parse_capital_kinds() {
        let mut record = raw("c1");
        record.amount = Some("5000".to_string());
        record.date = Some("2025-04-10".to_string());

        record.kind = Some("Sale".to_string());
        match record.parse(RecordCategory::CapitalTransaction).unwrap() {
            Record::OneOff(one_off) => assert_eq!(one_off.kind, OneOffKind::CapitalSale),
            other => panic!("Expected one-off, got {:?}", other),
        }

        record.kind = Some("buy".to_string());
        match record.parse(RecordCategory::CapitalTransaction).unwrap() {
            Record::OneOff(one_off) => assert_eq!(one_off.kind, OneOffKind::CapitalBuy),
            other => panic!("Expected one-off, got {:?}", other),
        }

        record.kind = Some("lease".to_string());
        assert!(record.parse(RecordCategory::CapitalTransaction).is_err());

        record.kind = None;
        assert!(record.parse(RecordCategory::CapitalTransaction).is_err());
    }

    #[test]
    fn test_record_set_splits_by_shape() {
        let mut rule = raw("r1");
        rule.day_of_month = Some("1".to_string());
        let mut invoice = raw("i1");
        invoice.date = Some("2025-01-01".to_string());

        let mut set = RecordSet::new();
        set.extend([
            rule.parse(RecordCategory::RecurringPaymentRule).unwrap(),
            invoice.parse(RecordCategory::Invoice).unwrap(),
        ]);

        assert_eq!(set.rules.len(), 1);
        assert_eq!(set.one_offs.len(), 1);
        assert_eq!(set.len(), 2);
    }
}
