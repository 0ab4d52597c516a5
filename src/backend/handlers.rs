// src/backend/handlers.rs
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::backend::AppState;
use crate::database::db::queries;
use crate::database::models::{Expense, NewExpense};
use crate::error::ApiError;
use crate::query::aggregate::{self, MonthlyBreakdown};
use crate::query::filter::{self, FilterParams, FilterSelection};

#[derive(Debug, Serialize)]
pub struct ExpenseCreated {
    pub message: &'static str,
    pub expense: Expense,
}

pub async fn create_expense(
    State(state): State<AppState>,
    Json(payload): Json<NewExpense>,
) -> Result<(StatusCode, Json<ExpenseCreated>), ApiError> {
    let expense = queries::insert_expense(&state.db, &payload)
        .await
        .map_err(|e| ApiError::new("Failed to add expense", e))?;

    info!(id = expense.id, category = %expense.category, amount = %expense.amount, "Expense added");

    Ok((
        StatusCode::CREATED,
        Json(ExpenseCreated {
            message: "Expense added successfully",
            expense,
        }),
    ))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let selection = FilterSelection::from(params);
    let query = filter::build_query(&selection, filter::today());

    let expenses = queries::find_expenses(&state.db, &query)
        .await
        .map_err(|e| ApiError::new("Error fetching expenses", e))?;

    info!(matched = expenses.len(), clauses = query.predicate.clauses().len(), "Listed expenses");
    Ok(Json(expenses))
}

/// Always over the full data set; listing filters do not apply here.
pub async fn analytics(State(state): State<AppState>) -> Result<Json<Vec<MonthlyBreakdown>>, ApiError> {
    let totals = queries::group_all(&state.db)
        .await
        .map_err(|e| ApiError::new("Analytics failed", e))?;

    let series = aggregate::summarize(totals).map_err(|e| ApiError::new("Analytics failed", e))?;
    info!(periods = series.len(), "Analytics computed");
    Ok(Json(series))
}
