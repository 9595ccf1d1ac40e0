//! Location status aggregation.
//!
//! Recent reports are merged into a single current status (the most severe
//! kind present wins) plus per-kind counts for the window.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// The kind of issue a report describes, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    OutOfOrder,
    Dirty,
    NoSupplies,
    Crowded,
    Other,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::OutOfOrder => "out_of_order",
            ReportKind::Dirty => "dirty",
            ReportKind::NoSupplies => "no_supplies",
            ReportKind::Crowded => "crowded",
            ReportKind::Other => "other",
        }
    }

    /// Higher wins when picking the current status.
    fn severity(self) -> u8 {
        match self {
            ReportKind::OutOfOrder => 5,
            ReportKind::Dirty => 4,
            ReportKind::NoSupplies => 3,
            ReportKind::Crowded => 2,
            ReportKind::Other => 1,
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown report kind: {0}")]
pub struct UnknownReportKind(pub String);

impl FromStr for ReportKind {
    type Err = UnknownReportKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "out_of_order" => Ok(ReportKind::OutOfOrder),
            "dirty" => Ok(ReportKind::Dirty),
            "no_supplies" => Ok(ReportKind::NoSupplies),
            "crowded" => Ok(ReportKind::Crowded),
            "other" => Ok(ReportKind::Other),
            other => Err(UnknownReportKind(other.to_string())),
        }
    }
}

/// Aggregated view of a location's recent reports.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    /// `normal`, or the most severe recent report kind.
    pub status: String,
    /// Per-kind report counts inside the window.
    pub counts: BTreeMap<String, u32>,
    pub report_count: u32,
}

/// Merge raw report kind strings (as stored) into a status summary.
///
/// Unknown kinds are counted under their raw string but never outrank a
/// known one, so a bad row cannot flip the status.
pub fn summarize(raw_kinds: &[String]) -> StatusSummary {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut current: Option<ReportKind> = None;

    for raw in raw_kinds {
        *counts.entry(raw.clone()).or_insert(0) += 1;
        match raw.parse::<ReportKind>() {
            Ok(kind) => {
                if current.map_or(true, |c| kind.severity() > c.severity()) {
                    current = Some(kind);
                }
            }
            Err(e) => warn!(%e, "ignoring report kind for status"),
        }
    }

    StatusSummary {
        status: current.map_or("normal", ReportKind::as_str).to_string(),
        report_count: raw_kinds.len() as u32,
        counts,
    }
}
