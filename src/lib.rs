//! # Cash Flow Projection
//!
//! Projects the cash position of a business over a date window from its
//! recurring payment rules, one-off payments, invoices, supplier payments
//! and capital transactions.
//!
//! ## Pipeline
//!
//! - **Rule expansion**: recurring rules become one dated instance per month
//! - **Normalization**: every record becomes a [`CashEvent`] whose sign is
//!   derived from its category, not from the stored amount
//! - **Clustering**: events are grouped by date proximity for timeline layout
//! - **Balance**: running balance series and event-level minimum
//! - **Monthly**: per-month inflow/outflow buckets and month-end minimum
//!
//! Every projection is a pure function of the records and the
//! [`ProjectionConfig`]; [`ProjectionSession`] installs results atomically
//! and drops stale ones.
//!
//! ## Example
//!
//! ```no_run
//! use cashflow_projection::{
//!     compute_projection, load_records, parse_date, CsvRecordStore, DateWindow, Money,
//!     ProjectionConfig,
//! };
//! use std::io::Cursor;
//!
//! let csv = "category,id,description,amount,date,day_of_month,kind\n\
//!            recurringPaymentRule,rent,Rent,1200,,31,\n\
//!            invoice,inv-1,Client A,5000,2025-02-10,,\n";
//! let store = CsvRecordStore::from_reader(Cursor::new(csv)).unwrap();
//! let records = load_records(&store).unwrap();
//!
//! let window = DateWindow::new(
//!     parse_date("2025-01-01").unwrap(),
//!     parse_date("2025-03-31").unwrap(),
//! )
//! .unwrap();
//! let config = ProjectionConfig::new(window, Money::from_units(1000));
//! let projection = compute_projection(&records, &config);
//! println!("minimum balance: {}", projection.minimum_balance.amount);
//! ```

pub mod balance;
pub mod cluster;
pub mod engine;
pub mod error;
pub mod expander;
pub mod money;
pub mod monthly;
pub mod normalizer;
pub mod record;
pub mod report;
pub mod session;
pub mod store;
pub mod window;

pub use balance::{project_balance, BalancePoint, BalanceSeries, MinimumBalance};
pub use cluster::{cluster_events, ClusterStrategy, EventCluster};
pub use engine::{
    compute_projection, ClusterThresholds, MinimumGranularity, Projection, ProjectionConfig,
    TimelineClusters,
};
pub use error::{EngineError, Result};
pub use expander::{expand_rules, RecurringInstance};
pub use money::Money;
pub use monthly::{aggregate_monthly, MonthBucket, MonthlySummary};
pub use normalizer::{normalize, CashEvent, Direction, EventCategory, SourceRef};
pub use record::{
    OneOffKind, OneOffRecord, RawRecord, Record, RecordCategory, RecordSet, RecurringPaymentRule,
};
pub use report::{write_report, Report};
pub use session::{ProjectionSession, RecalcTicket};
pub use store::{load_records, CsvRecordStore, MemoryRecordStore, RecordStore};
pub use window::{parse_date, DateWindow, MonthKey};
