//! Aggregation engine.
//!
//! Reduces dated records into ordered time buckets (day, month, year) and into
//! per-entity totals. Bucket keys are UTC calendar values. Gaps are never
//! filled: a month with no gifts is absent, not present with zero.
//!
//! Callers decide which records count. Money figures are always computed over
//! Completed donations, so the dashboard and insight code filter before calling
//! in; this module sums whatever it is given, including zero or negative amounts.

use crate::{
    entities::{donation, donor},
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, Months, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// A record that can be placed in a time bucket.
pub trait Dated {
    /// Identifier reported when the record cannot be bucketed.
    fn record_id(&self) -> i64;
    /// When the record happened; `None` if the source row has no date.
    fn occurred_at(&self) -> Option<DateTime<Utc>>;
}

/// A dated record carrying an amount.
pub trait Valued: Dated {
    /// Amount to add to the record's bucket.
    fn amount(&self) -> f64;
}

impl Dated for donation::Model {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Some(self.donation_date)
    }
}

impl Valued for donation::Model {
    fn amount(&self) -> f64 {
        self.amount
    }
}

/// Donors are bucketed by creation time for the growth series.
impl Dated for donor::Model {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }
}

/// Sum of amounts for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBucket {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Summed amount
    pub amount: f64,
}

/// Sum of amounts for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBucket {
    /// `YYYY-MM`
    pub month: String,
    /// Summed amount
    pub amount: f64,
}

/// Sum of amounts for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyBucket {
    /// Four-digit year
    pub year: i32,
    /// Summed amount
    pub amount: f64,
}

/// Number of records in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`
    pub month: String,
    /// Record count
    pub count: u64,
}

fn timestamp<R: Dated>(record: &R) -> Result<DateTime<Utc>> {
    record.occurred_at().ok_or_else(|| Error::InvalidRecord {
        id: record.record_id(),
        field: "date",
    })
}

/// `YYYY-MM-DD` key for a timestamp.
#[must_use]
pub fn day_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM` key for a timestamp.
#[must_use]
pub fn month_key(at: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", at.year(), at.month())
}

/// First instant inside a trailing window of `months` months ending at `now`.
#[must_use]
pub fn window_start(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn sum_by<R, K, F>(records: &[R], key: F) -> Result<BTreeMap<K, f64>>
where
    R: Valued,
    K: Ord,
    F: Fn(DateTime<Utc>) -> K,
{
    let mut buckets = BTreeMap::new();
    for record in records {
        let at = timestamp(record)?;
        *buckets.entry(key(at)).or_insert(0.0) += record.amount();
    }
    Ok(buckets)
}

fn count_by<R, K, F>(records: &[R], key: F) -> Result<BTreeMap<K, u64>>
where
    R: Dated,
    K: Ord,
    F: Fn(DateTime<Utc>) -> K,
{
    let mut buckets = BTreeMap::new();
    for record in records {
        let at = timestamp(record)?;
        *buckets.entry(key(at)).or_insert(0) += 1;
    }
    Ok(buckets)
}

/// Sums amounts per UTC day, ascending by date.
pub fn daily_totals<R: Valued>(records: &[R]) -> Result<Vec<DailyBucket>> {
    Ok(sum_by(records, day_key)?
        .into_iter()
        .map(|(date, amount)| DailyBucket { date, amount })
        .collect())
}

/// Sums amounts per UTC month, ascending by `YYYY-MM`.
pub fn monthly_totals<R: Valued>(records: &[R]) -> Result<Vec<MonthlyBucket>> {
    Ok(sum_by(records, month_key)?
        .into_iter()
        .map(|(month, amount)| MonthlyBucket { month, amount })
        .collect())
}

/// Sums amounts per UTC year, ascending numerically.
pub fn yearly_totals<R: Valued>(records: &[R]) -> Result<Vec<YearlyBucket>> {
    Ok(sum_by(records, |at| at.year())?
        .into_iter()
        .map(|(year, amount)| YearlyBucket { year, amount })
        .collect())
}

/// Counts records per UTC month, ascending by `YYYY-MM`.
pub fn monthly_counts<R: Dated>(records: &[R]) -> Result<Vec<MonthlyCount>> {
    Ok(count_by(records, month_key)?
        .into_iter()
        .map(|(month, count)| MonthlyCount { month, count })
        .collect())
}

/// Monthly totals over the trailing `window_months`, falling back to the whole
/// history when the window is empty.
///
/// A dataset whose newest record is older than the window would otherwise
/// render as an empty chart. Every record is still checked for a date, so a
/// malformed row fails the call even when it falls outside the window.
pub fn monthly_trend<R: Valued>(
    records: &[R],
    now: DateTime<Utc>,
    window_months: u32,
) -> Result<Vec<MonthlyBucket>> {
    let start = window_start(now, window_months);

    let mut windowed: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        let at = timestamp(record)?;
        if at >= start {
            *windowed.entry(month_key(at)).or_insert(0.0) += record.amount();
        }
    }

    if windowed.is_empty() {
        debug!(
            records = records.len(),
            "Trailing window empty, falling back to full history"
        );
        return monthly_totals(records);
    }

    Ok(windowed
        .into_iter()
        .map(|(month, amount)| MonthlyBucket { month, amount })
        .collect())
}

/// Monthly record counts over the trailing `window_months`, with the same
/// empty-window fallback as [`monthly_trend`].
pub fn monthly_growth<R: Dated>(
    records: &[R],
    now: DateTime<Utc>,
    window_months: u32,
) -> Result<Vec<MonthlyCount>> {
    let start = window_start(now, window_months);

    let mut windowed: BTreeMap<String, u64> = BTreeMap::new();
    for record in records {
        let at = timestamp(record)?;
        if at >= start {
            *windowed.entry(month_key(at)).or_insert(0) += 1;
        }
    }

    if windowed.is_empty() {
        return monthly_counts(records);
    }

    Ok(windowed
        .into_iter()
        .map(|(month, count)| MonthlyCount { month, count })
        .collect())
}

/// Sums amounts per owning entity.
///
/// `owner` returns the entity id a record belongs to; records for which it
/// returns `None` are skipped. All records passed in are counted, whatever
/// their status. The map iterates in ascending id order.
pub fn totals_by<R, F>(records: &[R], owner: F) -> BTreeMap<i64, f64>
where
    R: Valued,
    F: Fn(&R) -> Option<i64>,
{
    let mut totals = BTreeMap::new();
    for record in records {
        if let Some(id) = owner(record) {
            *totals.entry(id).or_insert(0.0) += record.amount();
        }
    }
    totals
}
