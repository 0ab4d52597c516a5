use sqlx::{Pool, QueryBuilder, Sqlite};
use tracing::debug;

use crate::database::models::{Expense, NewExpense, StoredExpense};
use crate::error::AppError;
use crate::query::aggregate::{MonthlyCategoryTotal, MonthlyTotals};
use crate::query::filter::{Clause, ExpenseQuery, Predicate, SortSpec};
/*
SQL for the expenses table. Amounts are kept as TEXT so decimals survive
the round trip; dates are ISO `YYYY-MM-DD` strings, which compare in
calendar order as long as the year has four digits (enforced on insert).
 */

const SELECT_EXPENSES: &str = r#"
    SELECT expense_id, amount, category, notes, expense_date, payment_mode
    FROM expenses"#;

fn iso(date: &chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// Insert an expense and hand back the stored record
pub async fn insert_expense(pool: &Pool<Sqlite>, new: &NewExpense) -> Result<Expense, AppError> {
    new.validate()?;

    let row: StoredExpense = sqlx::query_as(
        r#"
        INSERT INTO expenses (amount, category, notes, expense_date, payment_mode, created_at)
        VALUES (?, ?, ?, ?, ?, strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        RETURNING expense_id, amount, category, notes, expense_date, payment_mode
        "#,
    )
    .bind(new.amount.to_string())
    .bind(new.category.as_str())
    .bind(new.notes())
    .bind(iso(&new.date))
    .bind(new.payment_mode.as_str())
    .fetch_one(pool)
    .await?;

    Expense::try_from(row)
}

pub async fn get_expense(pool: &Pool<Sqlite>, expense_id: i64) -> Result<Option<Expense>, AppError> {
    let mut qb = QueryBuilder::<Sqlite>::new(SELECT_EXPENSES);
    qb.push(" WHERE expense_id = ").push_bind(expense_id);

    qb.build_query_as::<StoredExpense>()
        .fetch_optional(pool)
        .await?
        .map(Expense::try_from)
        .transpose()
}

/// Listing query: the predicate and sort spec rendered to SQL as given.
pub async fn find_expenses(pool: &Pool<Sqlite>, query: &ExpenseQuery) -> Result<Vec<Expense>, AppError> {
    let mut qb = QueryBuilder::<Sqlite>::new(SELECT_EXPENSES);
    push_predicate(&mut qb, &query.predicate);
    push_sort(&mut qb, query.sort);
    debug!(sql = qb.sql(), "find_expenses");

    qb.build_query_as::<StoredExpense>()
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(Expense::try_from)
        .collect()
}

/// Stage 1 of the analytics over every stored expense: one total per
/// (month, year, category) that occurs. Summing happens on decoded
/// decimals because SQLite would fold TEXT amounts into floats. The first
/// row that does not decode fails the whole call.
pub async fn group_all(pool: &Pool<Sqlite>) -> Result<Vec<MonthlyCategoryTotal>, AppError> {
    let rows: Vec<StoredExpense> = sqlx::query_as(SELECT_EXPENSES).fetch_all(pool).await?;
    debug!(rows = rows.len(), "group_all");

    let mut totals = MonthlyTotals::default();
    for row in rows {
        let e = Expense::try_from(row)?;
        totals.add(e.date, e.category, e.amount)?;
    }
    Ok(totals.into_totals())
}

fn push_predicate(qb: &mut QueryBuilder<'_, Sqlite>, predicate: &Predicate) {
    for (i, clause) in predicate.clauses().iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match clause {
            Clause::CategoryIn(set) => {
                qb.push("category IN (");
                let mut list = qb.separated(", ");
                for c in set {
                    list.push_bind(c.as_str());
                }
                list.push_unseparated(")");
            }
            Clause::PaymentModeIn(set) => {
                qb.push("payment_mode IN (");
                let mut list = qb.separated(", ");
                for m in set {
                    list.push_bind(m.as_str());
                }
                list.push_unseparated(")");
            }
            Clause::DateFrom(from) => {
                qb.push("expense_date >= ").push_bind(iso(from));
            }
        }
    }
}

fn push_sort(qb: &mut QueryBuilder<'_, Sqlite>, sort: SortSpec) {
    qb.push(match sort {
        SortSpec::DateAscending => " ORDER BY expense_date ASC, expense_id ASC",
        SortSpec::DateDescending => " ORDER BY expense_date DESC, expense_id DESC",
    });
}
