//! CSV output of projection results.
//!
//! Amounts are carried at 4 decimal places internally and rounded half away
//! from zero to exactly 2 decimal places here, at the output boundary.

use crate::engine::Projection;
use crate::error::Result;
use crate::money::Money;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use std::str::FromStr;

/// Which part of a projection to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Report {
    #[default]
    Monthly,
    Balance,
    Clusters,
}

impl FromStr for Report {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(Report::Monthly),
            "balance" => Ok(Report::Balance),
            "clusters" => Ok(Report::Clusters),
            other => Err(other.to_string()),
        }
    }
}

const MONTHLY_HEADER: &[&str] = &[
    "month",
    "capital_in",
    "capital_out",
    "operational_in",
    "operational_out",
    "net_flow",
    "closing_balance",
];
const BALANCE_HEADER: &[&str] = &["date", "balance", "event", "category", "amount"];
const CLUSTER_HEADER: &[&str] = &["timeline", "centroid", "members", "net", "events"];

// Field names double as the header row written by `csv::Writer::serialize`.
#[derive(Debug, Serialize)]
struct MonthlyRow {
    month: String,
    capital_in: Decimal,
    capital_out: Decimal,
    operational_in: Decimal,
    operational_out: Decimal,
    net_flow: Decimal,
    closing_balance: Decimal,
}

#[derive(Debug, Serialize)]
struct BalanceRow<'a> {
    date: String,
    balance: Decimal,
    event: Option<&'a str>,
    category: Option<&'static str>,
    amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
struct ClusterRow {
    timeline: &'static str,
    centroid: String,
    members: usize,
    net: Decimal,
    events: String,
}

/// Writes the selected report.
pub fn write_report<W: Write>(projection: &Projection, report: Report, writer: W) -> Result<()> {
    match report {
        Report::Monthly => write_monthly(projection, writer),
        Report::Balance => write_balance_series(projection, writer),
        Report::Clusters => write_clusters(projection, writer),
    }
}

/// One row per calendar month, oldest first.
pub fn write_monthly<W: Write>(projection: &Projection, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for bucket in &projection.monthly.buckets {
        csv_writer.serialize(MonthlyRow {
            month: bucket.month.to_string(),
            capital_in: bucket.capital_in.cents(),
            capital_out: bucket.capital_out.cents(),
            operational_in: bucket.operational_in.cents(),
            operational_out: bucket.operational_out.cents(),
            net_flow: bucket.net_flow.cents(),
            closing_balance: bucket.closing_balance.cents(),
        })?;
    }

    finish(
        csv_writer,
        MONTHLY_HEADER,
        projection.monthly.buckets.is_empty(),
    )
}

/// One row per balance point; boundary points have empty event columns.
pub fn write_balance_series<W: Write>(projection: &Projection, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for point in &projection.balance.points {
        let event = point.triggering_event.as_ref();
        csv_writer.serialize(BalanceRow {
            date: point.date.to_string(),
            balance: point.balance.cents(),
            event: event.map(|e| e.id.as_str()),
            category: event.map(|e| e.category.as_str()),
            amount: event.map(|e| e.signed_amount.cents()),
        })?;
    }

    finish(
        csv_writer,
        BALANCE_HEADER,
        projection.balance.points.is_empty(),
    )
}

/// One row per cluster, operational timeline first.
pub fn write_clusters<W: Write>(projection: &Projection, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let timelines = [
        ("operational", &projection.clusters.operational),
        ("capital", &projection.clusters.capital),
    ];

    let mut rows = 0;
    for (timeline, clusters) in timelines {
        for cluster in clusters {
            let net: Money = cluster.members.iter().map(|e| e.signed_amount).sum();
            let ids: Vec<&str> = cluster.members.iter().map(|e| e.id.as_str()).collect();
            csv_writer.serialize(ClusterRow {
                timeline,
                centroid: cluster.centroid.format("%Y-%m-%dT%H:%M:%S").to_string(),
                members: cluster.len(),
                net: net.cents(),
                events: ids.join(" "),
            })?;
            rows += 1;
        }
    }

    finish(csv_writer, CLUSTER_HEADER, rows == 0)
}

/// Flushes the writer. With no rows serialized the header row was never
/// emitted, so it is written explicitly.
fn finish<W: Write>(mut csv_writer: csv::Writer<W>, header: &[&str], empty: bool) -> Result<()> {
    if empty {
        csv_writer.write_record(header)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{compute_projection, ProjectionConfig};
    use crate::record::{OneOffKind, OneOffRecord, RecordSet};
    use crate::window::DateWindow;
    use chrono::NaiveDate;

    fn projection() -> Projection {
        let date = |m, d| NaiveDate::from_ymd_opt(2025, m, d).unwrap();
        let records = RecordSet {
            rules: vec![],
            one_offs: vec![
                OneOffRecord {
                    id: "out".to_string(),
                    description: String::new(),
                    amount: Some(Money::from_units(100)),
                    date: date(3, 1),
                    kind: OneOffKind::NonRecurring,
                },
                OneOffRecord {
                    id: "in".to_string(),
                    description: String::new(),
                    amount: Some(Money::from_units(50)),
                    date: date(3, 1),
                    kind: OneOffKind::Invoice,
                },
            ],
        };
        let window = DateWindow::new(date(3, 1), date(3, 31)).unwrap();
        compute_projection(&records, &ProjectionConfig::new(window, Money::from_units(1000)))
    }

    fn render(report: Report) -> String {
        let mut output = Vec::new();
        write_report(&projection(), report, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_monthly_output_format() {
        let output = render(Report::Monthly);
        assert!(output.starts_with(
            "month,capital_in,capital_out,operational_in,operational_out,net_flow,closing_balance"
        ));
        assert!(output.contains("2025-03,0.00,0.00,50.00,100.00,-50.00,950.00"));
    }

    #[test]
    fn test_balance_output_format() {
        let output = render(Report::Balance);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "date,balance,event,category,amount");
        assert_eq!(lines[1], "2025-03-01,1000.00,,,");
        assert_eq!(lines[2], "2025-03-01,900.00,out,nonRecurring,-100.00");
        assert_eq!(lines[3], "2025-03-01,950.00,in,invoice,50.00");
        assert_eq!(lines[4], "2025-03-31,950.00,,,");
    }

    #[test]
    fn test_clusters_output_format() {
        let output = render(Report::Clusters);
        assert!(output.contains("operational,2025-03-01T00:00:00,2,-50.00,out in"));
    }

    #[test]
    fn test_sub_cent_amounts_round_only_at_output() {
        let date = |d| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();
        let fee = |id: &str, d| OneOffRecord {
            id: id.to_string(),
            description: String::new(),
            amount: Some("0.005".parse().unwrap()),
            date: date(d),
            kind: OneOffKind::NonRecurring,
        };
        let records = RecordSet {
            rules: vec![],
            one_offs: vec![fee("f1", 2), fee("f2", 3)],
        };
        let window = DateWindow::new(date(1), date(31)).unwrap();
        let projection = compute_projection(&records, &ProjectionConfig::new(window, Money::ZERO));

        // Two half-cent fees add up to a full cent before rounding.
        assert_eq!(projection.final_balance().to_string(), "-0.0100");

        let mut output = Vec::new();
        write_report(&projection, Report::Balance, &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[2], "2025-03-02,-0.01,f1,nonRecurring,-0.01");
        assert_eq!(lines[3], "2025-03-03,-0.01,f2,nonRecurring,-0.01");
    }

    #[test]
    fn test_empty_cluster_report_still_has_header() {
        let date = |m, d| NaiveDate::from_ymd_opt(2025, m, d).unwrap();
        let window = DateWindow::new(date(3, 1), date(3, 31)).unwrap();
        let projection = compute_projection(
            &RecordSet::new(),
            &ProjectionConfig::new(window, Money::from_units(5)),
        );

        let mut output = Vec::new();
        write_clusters(&projection, &mut output).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "timeline,centroid,members,net,events\n"
        );
    }

    #[test]
    fn test_report_names() {
        assert_eq!("Balance".parse::<Report>().unwrap(), Report::Balance);
        assert!("pie".parse::<Report>().is_err());
    }
}
