//! Monthly category-wise totals for the stacked chart.
//!
//! Stage 1 sums amounts per (month, year, category). Stage 2 regroups those
//! sums per period, ordered oldest first. The reshape then emits one entry
//! per period carrying every [`Category`], zero when nothing was spent.
//! Analytics always cover the full record set, never the listing filter.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::database::models::{Category, Expense};
use crate::error::AppError;

/// A calendar month. Orders by year first, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn of(date: NaiveDate) -> Self {
        Period {
            year: date.year(),
            month: date.month(),
        }
    }

    /// `"<month>/<year>"` without zero padding, e.g. `1/2024`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.month, self.year)
    }
}

/// One stage-1 row: the sum for a category within a month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyCategoryTotal {
    pub month: u32,
    pub year: i32,
    pub category: Category,
    pub total: Decimal,
}

impl MonthlyCategoryTotal {
    pub fn period(&self) -> Period {
        Period {
            year: self.year,
            month: self.month,
        }
    }
}

/// Stage-1 accumulator. Only combinations that occur get an entry.
#[derive(Debug, Default)]
pub struct MonthlyTotals {
    sums: BTreeMap<(Period, Category), Decimal>,
}

impl MonthlyTotals {
    /// Fails when the running sum would leave the decimal range.
    pub fn add(&mut self, date: NaiveDate, category: Category, amount: Decimal) -> Result<(), AppError> {
        let period = Period::of(date);
        let sum = self.sums.entry((period, category)).or_insert(Decimal::ZERO);
        *sum = sum
            .checked_add(amount)
            .ok_or_else(|| AppError::overflow(period, category.as_str()))?;
        Ok(())
    }

    pub fn into_totals(self) -> Vec<MonthlyCategoryTotal> {
        self.sums
            .into_iter()
            .map(|((period, category), total)| MonthlyCategoryTotal {
                month: period.month,
                year: period.year,
                category,
                total,
            })
            .collect()
    }
}

pub fn monthly_totals<'a>(
    records: impl IntoIterator<Item = &'a Expense>,
) -> Result<Vec<MonthlyCategoryTotal>, AppError> {
    let mut totals = MonthlyTotals::default();
    for e in records {
        totals.add(e.date, e.category, e.amount)?;
    }
    Ok(totals.into_totals())
}

/// Stage-2 output: the category sums observed in one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodGroup {
    pub period: Period,
    pub categories: Vec<(Category, Decimal)>,
}

/// Regroup stage-1 rows by period, oldest period first.
pub fn group_by_period(totals: impl IntoIterator<Item = MonthlyCategoryTotal>) -> Vec<PeriodGroup> {
    let mut periods: BTreeMap<Period, Vec<(Category, Decimal)>> = BTreeMap::new();
    for t in totals {
        periods
            .entry(t.period())
            .or_default()
            .push((t.category, t.total));
    }
    periods
        .into_iter()
        .map(|(period, categories)| PeriodGroup { period, categories })
        .collect()
}

/// One chart data point: every category of the enum, in enum order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyBreakdown {
    pub period: Period,
    totals: Vec<(Category, Decimal)>,
    total: Decimal,
}

impl MonthlyBreakdown {
    pub fn label(&self) -> String {
        self.period.label()
    }

    pub fn totals(&self) -> &[(Category, Decimal)] {
        &self.totals
    }

    pub fn get(&self, category: Category) -> Decimal {
        self.totals
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, v)| *v)
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum over all categories of the period.
    pub fn total(&self) -> Decimal {
        self.total
    }
}

/// Fill the categories a period never saw with zero. Repeated entries for
/// the same category are summed.
pub fn densify(group: &PeriodGroup) -> Result<MonthlyBreakdown, AppError> {
    let period = group.period;
    let mut lookup: BTreeMap<Category, Decimal> = BTreeMap::new();
    for (category, total) in &group.categories {
        let sum = lookup.entry(*category).or_insert(Decimal::ZERO);
        *sum = sum
            .checked_add(*total)
            .ok_or_else(|| AppError::overflow(period, category.as_str()))?;
    }

    let totals: Vec<(Category, Decimal)> = Category::ALL
        .iter()
        .map(|c| (*c, lookup.get(c).copied().unwrap_or(Decimal::ZERO)))
        .collect();
    let total = totals
        .iter()
        .try_fold(Decimal::ZERO, |acc, (_, v)| acc.checked_add(*v))
        .ok_or_else(|| AppError::overflow(period, "all categories"))?;

    Ok(MonthlyBreakdown { period, totals, total })
}

/// Stages 2 to 4 over stage-1 rows produced by the store. One period that
/// cannot be totalled fails the whole series.
pub fn summarize(
    totals: impl IntoIterator<Item = MonthlyCategoryTotal>,
) -> Result<Vec<MonthlyBreakdown>, AppError> {
    group_by_period(totals).iter().map(densify).collect()
}

struct Amount(Decimal);

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl Serialize for MonthlyBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.totals.len() + 1))?;
        map.serialize_entry("month", &self.label())?;
        for (category, total) in &self.totals {
            map.serialize_entry(category.as_str(), &Amount(*total))?;
        }
        map.end()
    }
}
