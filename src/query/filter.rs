//! Turns the facets picked in the client into a storage query.
//!
//! A [`Predicate`] is a conjunction of independent [`Clause`]s; an axis with
//! no clause is unrestricted. The storage layer renders it to SQL, and
//! [`Predicate::matches`] evaluates the same rules in memory.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::Deserialize;
use tracing::debug;

use crate::database::models::{Category, DateRange, Expense, PaymentMode};

/// Facets currently selected in the client. Empty sets mean "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    pub date_range: DateRange,
    pub categories: BTreeSet<Category>,
    pub payment_modes: BTreeSet<PaymentMode>,
}

impl FilterSelection {
    pub fn toggle_category(&mut self, category: Category) {
        if !self.categories.remove(&category) {
            self.categories.insert(category);
        }
    }

    pub fn toggle_payment_mode(&mut self, mode: PaymentMode) {
        if !self.payment_modes.remove(&mode) {
            self.payment_modes.insert(mode);
        }
    }

    pub fn clear(&mut self) {
        *self = FilterSelection::default();
    }
}

/// Query-string form of a selection: `?category=Rental,Travel&paymentMode=UPI&dateRange=this_month`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    pub category: Option<String>,
    pub payment_mode: Option<String>,
    pub date_range: Option<String>,
}

impl From<FilterParams> for FilterSelection {
    /// Unknown values never fail the request; they just stop restricting.
    fn from(params: FilterParams) -> Self {
        let date_range = match params.date_range.as_deref().map(str::trim) {
            None | Some("") => DateRange::AllTime,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                debug!(date_range = raw, "unrecognized date range, not restricting by date");
                DateRange::AllTime
            }),
        };

        FilterSelection {
            date_range,
            categories: parse_list(params.category.as_deref(), "category"),
            payment_modes: parse_list(params.payment_mode.as_deref(), "paymentMode"),
        }
    }
}

fn parse_list<T>(raw: Option<&str>, axis: &str) -> BTreeSet<T>
where
    T: FromStr + Ord,
{
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| match token.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                debug!(axis, token, "dropping unrecognized filter value");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    CategoryIn(BTreeSet<Category>),
    PaymentModeIn(BTreeSet<PaymentMode>),
    /// Inclusive lower bound on the expense date.
    DateFrom(NaiveDate),
}

impl Clause {
    pub fn matches(&self, expense: &Expense) -> bool {
        match self {
            Clause::CategoryIn(set) => set.contains(&expense.category),
            Clause::PaymentModeIn(set) => set.contains(&expense.payment_mode),
            Clause::DateFrom(from) => expense.date >= *from,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        self.clauses.iter().all(|c| c.matches(expense))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortSpec {
    DateAscending,
    DateDescending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseQuery {
    pub predicate: Predicate,
    pub sort: SortSpec,
}

impl ExpenseQuery {
    /// Evaluate against records already in memory. Ties on date fall back
    /// to id so the order is stable.
    pub fn apply(&self, records: impl IntoIterator<Item = Expense>) -> Vec<Expense> {
        let mut out: Vec<Expense> = records
            .into_iter()
            .filter(|e| self.predicate.matches(e))
            .collect();
        out.sort_by(|a, b| {
            let ord = a.date.cmp(&b.date).then(a.id.cmp(&b.id));
            match self.sort {
                SortSpec::DateAscending => ord,
                SortSpec::DateDescending => ord.reverse(),
            }
        });
        out
    }
}

/// Today's local date. Capture it once per request and pass it down.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Lower date bound for a range, relative to `today`. `None` for all-time.
pub fn from_date(range: DateRange, today: NaiveDate) -> Option<NaiveDate> {
    match range {
        DateRange::ThisMonth => today.with_day(1),
        DateRange::Last30Days => today.checked_sub_days(Days::new(30)),
        DateRange::Last90Days => today.checked_sub_days(Days::new(90)),
        DateRange::AllTime => None,
    }
}

pub fn build_query(selection: &FilterSelection, today: NaiveDate) -> ExpenseQuery {
    let mut clauses = Vec::new();

    if !selection.categories.is_empty() {
        clauses.push(Clause::CategoryIn(selection.categories.clone()));
    }
    if !selection.payment_modes.is_empty() {
        clauses.push(Clause::PaymentModeIn(selection.payment_modes.clone()));
    }
    if let Some(from) = from_date(selection.date_range, today) {
        clauses.push(Clause::DateFrom(from));
    }

    ExpenseQuery {
        predicate: Predicate { clauses },
        sort: SortSpec::DateDescending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(id: i64, amount: i64, category: Category, on: NaiveDate, mode: PaymentMode) -> Expense {
        Expense {
            id,
            amount: Decimal::from(amount),
            category,
            notes: None,
            date: on,
            payment_mode: mode,
        }
    }

    fn scenario() -> Vec<Expense> {
        vec![
            expense(1, 500, Category::Rental, date(2024, 1, 5), PaymentMode::Upi),
            expense(2, 300, Category::Groceries, date(2024, 1, 20), PaymentMode::Cash),
            expense(3, 200, Category::Rental, date(2024, 2, 1), PaymentMode::CreditCard),
        ]
    }

    #[test]
    fn this_month_starts_on_the_first() {
        assert_eq!(from_date(DateRange::ThisMonth, date(2024, 3, 17)), Some(date(2024, 3, 1)));
        assert_eq!(from_date(DateRange::ThisMonth, date(2024, 1, 1)), Some(date(2024, 1, 1)));
    }

    #[test]
    fn relative_ranges_subtract_calendar_days() {
        assert_eq!(from_date(DateRange::Last30Days, date(2024, 3, 17)), Some(date(2024, 2, 16)));
        assert_eq!(from_date(DateRange::Last30Days, date(2024, 3, 31)), Some(date(2024, 3, 1)));
        assert_eq!(from_date(DateRange::Last90Days, date(2024, 3, 17)), Some(date(2023, 12, 18)));
        assert_eq!(from_date(DateRange::AllTime, date(2024, 3, 17)), None);
    }

    #[test]
    fn last_30_days_is_exactly_thirty_days_back_all_year() {
        let mut day = date(2023, 1, 1);
        while day < date(2025, 1, 1) {
            let from = from_date(DateRange::Last30Days, day).unwrap();
            assert_eq!((day - from).num_days(), 30);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn empty_selection_matches_everything() {
        let q = build_query(&FilterSelection::default(), date(2024, 6, 1));
        assert!(q.predicate.is_empty());
        assert_eq!(q.apply(scenario()).len(), 3);
    }

    #[test]
    fn clauses_only_for_restricted_axes() {
        let mut sel = FilterSelection::default();
        sel.toggle_payment_mode(PaymentMode::Cash);
        sel.date_range = DateRange::ThisMonth;
        let q = build_query(&sel, date(2024, 6, 20));
        assert_eq!(
            q.predicate.clauses(),
            &[
                Clause::PaymentModeIn(BTreeSet::from([PaymentMode::Cash])),
                Clause::DateFrom(date(2024, 6, 1)),
            ]
        );
        assert_eq!(q.sort, SortSpec::DateDescending);
    }

    #[test]
    fn category_filter_returns_newest_first() {
        let mut sel = FilterSelection::default();
        sel.toggle_category(Category::Rental);
        let ids: Vec<i64> = build_query(&sel, date(2024, 6, 1))
            .apply(scenario())
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn date_bound_is_inclusive_and_open_ended() {
        let mut sel = FilterSelection::default();
        sel.date_range = DateRange::Last30Days;
        // from = 2024-01-20; the record on that day is kept, later ones too.
        let ids: Vec<i64> = build_query(&sel, date(2024, 2, 19))
            .apply(scenario())
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn axes_combine_as_conjunction() {
        let mut sel = FilterSelection::default();
        sel.toggle_category(Category::Rental);
        sel.toggle_payment_mode(PaymentMode::Upi);
        let out = build_query(&sel, date(2024, 6, 1)).apply(scenario());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 1);
    }

    #[test]
    fn toggling_twice_removes_the_facet() {
        let mut sel = FilterSelection::default();
        sel.toggle_category(Category::Travel);
        sel.toggle_category(Category::Travel);
        assert!(sel.categories.is_empty());
    }

    #[test]
    fn params_split_comma_lists() {
        let sel: FilterSelection = FilterParams {
            category: Some("Rental,Travel".into()),
            payment_mode: Some("Credit Card, UPI".into()),
            date_range: Some("last_90_days".into()),
        }
        .into();
        assert_eq!(sel.categories, BTreeSet::from([Category::Rental, Category::Travel]));
        assert_eq!(sel.payment_modes, BTreeSet::from([PaymentMode::CreditCard, PaymentMode::Upi]));
        assert_eq!(sel.date_range, DateRange::Last90Days);
    }

    #[test]
    fn unknown_params_degrade_to_no_restriction() {
        crate::logging::init_for_tests();
        let sel: FilterSelection = FilterParams {
            category: Some("Food".into()),
            payment_mode: Some("Cheque,Cash".into()),
            date_range: Some("last_week".into()),
        }
        .into();
        assert!(sel.categories.is_empty());
        assert_eq!(sel.payment_modes, BTreeSet::from([PaymentMode::Cash]));
        assert_eq!(sel.date_range, DateRange::AllTime);

        let q = build_query(&sel, date(2024, 6, 1));
        assert_eq!(q.predicate.clauses().len(), 1);
    }

    #[test]
    fn missing_params_mean_all_time() {
        let sel: FilterSelection = FilterParams::default().into();
        assert_eq!(sel, FilterSelection::default());
    }
}
