//! Receivables aging report.
//!
//! Buckets every open credit entry by how many days it is past due.
//! Settled entries never appear; partially paid entries count at their
//! pending amount, not their original total.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::credit::entry::CreditEntry;

/// Aging buckets by days past due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    /// Not yet due.
    Current,
    /// Due today up to 30 days past due.
    Days0To30,
    /// 31 to 60 days past due.
    Days30To60,
    /// 61 to 90 days past due.
    Days60To90,
    /// More than 90 days past due.
    Days90Plus,
}

impl AgingBucket {
    /// All buckets in report order.
    pub const ALL: [Self; 5] = [
        Self::Current,
        Self::Days0To30,
        Self::Days30To60,
        Self::Days60To90,
        Self::Days90Plus,
    ];

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Days0To30 => "0-30",
            Self::Days30To60 => "30-60",
            Self::Days60To90 => "60-90",
            Self::Days90Plus => "90+",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Current => 0,
            Self::Days0To30 => 1,
            Self::Days30To60 => 2,
            Self::Days60To90 => 3,
            Self::Days90Plus => 4,
        }
    }
}

/// Buckets a days-past-due count. Boundary days fall in the lower bucket.
#[must_use]
pub const fn bucket_for_days(days_overdue: i64) -> AgingBucket {
    if days_overdue < 0 {
        AgingBucket::Current
    } else if days_overdue <= 30 {
        AgingBucket::Days0To30
    } else if days_overdue <= 60 {
        AgingBucket::Days30To60
    } else if days_overdue <= 90 {
        AgingBucket::Days60To90
    } else {
        AgingBucket::Days90Plus
    }
}

/// One bucket's totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingRow {
    /// The bucket.
    pub bucket: AgingBucket,
    /// Open entries in the bucket.
    pub count: usize,
    /// Pending amount summed over those entries.
    pub pending: Decimal,
}

/// Aging report over the open credit book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingReport {
    /// One row per bucket, in report order; empty buckets stay present.
    pub rows: Vec<AgingRow>,
    /// Pending amount summed over every open entry.
    pub total_pending: Decimal,
    /// Date the report was computed for.
    pub as_of: NaiveDate,
}

impl AgingReport {
    /// Builds the report for `as_of` over the given entries.
    #[must_use]
    pub fn build(entries: &[CreditEntry], as_of: NaiveDate) -> Self {
        let mut rows: Vec<AgingRow> = AgingBucket::ALL
            .into_iter()
            .map(|bucket| AgingRow {
                bucket,
                count: 0,
                pending: Decimal::ZERO,
            })
            .collect();
        let mut total_pending = Decimal::ZERO;

        for entry in entries {
            let pending = entry.pending_amount();
            if pending == Decimal::ZERO {
                continue;
            }
            let row = &mut rows[bucket_for_days(entry.days_overdue(as_of)).index()];
            row.count += 1;
            row.pending += pending;
            total_pending += pending;
        }

        Self {
            rows,
            total_pending,
            as_of,
        }
    }

    /// Borrows the row for one bucket.
    #[must_use]
    pub fn row(&self, bucket: AgingBucket) -> &AgingRow {
        &self.rows[bucket.index()]
    }
}
