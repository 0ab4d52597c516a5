use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use expense_tracker::backend::handlers::{analytics, create_expense, list_expenses};
use expense_tracker::backend::AppState;
use expense_tracker::database::db::{connection, migrate};
use expense_tracker::database::models::{Category, NewExpense};
use expense_tracker::query::filter::FilterParams;
use serde_json::json;

async fn state() -> AppState {
    let pool = connection::memory_pool().await.expect("in-memory pool");
    migrate::run_migrations(&pool).await.expect("migrations");
    AppState { db: pool }
}

fn body(value: serde_json::Value) -> Json<NewExpense> {
    Json(serde_json::from_value(value).expect("valid expense body"))
}

async fn seed(state: &AppState) {
    for b in [
        json!({"amount": "500", "category": "Rental", "date": "2024-01-05", "paymentMode": "Net Banking"}),
        json!({"amount": 300, "category": "Groceries", "notes": "weekly", "date": "2024-01-20", "paymentMode": "UPI"}),
        json!({"amount": "200", "category": "Rental", "date": "2024-02-01", "paymentMode": "Cash"}),
    ] {
        create_expense(State(state.clone()), body(b)).await.unwrap();
    }
}

#[tokio::test]
async fn create_answers_201_with_the_record() {
    let state = state().await;
    let (status, Json(created)) = create_expense(
        State(state.clone()),
        body(json!({"amount": "49.50", "category": "Entertainment", "notes": "cinema", "date": "2024-03-09", "paymentMode": "Credit Card"})),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    let v = serde_json::to_value(&created).unwrap();
    assert_eq!(v["message"], "Expense added successfully");
    assert_eq!(v["expense"]["amount"], json!(49.5));
    assert_eq!(v["expense"]["category"], "Entertainment");
    assert_eq!(v["expense"]["paymentMode"], "Credit Card");
    assert_eq!(v["expense"]["date"], "2024-03-09");
}

#[tokio::test]
async fn create_rejects_overlong_notes_with_400() {
    let state = state().await;
    let err = create_expense(
        State(state),
        body(json!({"amount": 1, "category": "Others", "notes": "n".repeat(101), "date": "2024-03-09", "paymentMode": "Cash"})),
    )
    .await
    .unwrap_err();

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_applies_query_string_filters() {
    let state = state().await;
    seed(&state).await;

    let params = FilterParams {
        category: Some("Rental".into()),
        payment_mode: None,
        date_range: Some("all_time".into()),
    };
    let Json(listed) = list_expenses(State(state), Query(params)).await.unwrap();

    let dates: Vec<String> = listed.iter().map(|e| e.date.to_string()).collect();
    assert_eq!(dates, ["2024-02-01", "2024-01-05"]);
    assert!(listed.iter().all(|e| e.category == Category::Rental));
}

#[tokio::test]
async fn listing_ignores_unknown_filter_values() {
    let state = state().await;
    seed(&state).await;

    let params = FilterParams {
        category: Some("Food".into()),
        payment_mode: Some("Cheque".into()),
        date_range: Some("fortnight".into()),
    };
    let Json(listed) = list_expenses(State(state), Query(params)).await.unwrap();
    assert_eq!(listed.len(), 3);
}

#[tokio::test]
async fn analytics_cover_all_records_regardless_of_listing_filter() {
    let state = state().await;
    seed(&state).await;

    // A narrow listing first; analytics must not be affected by it.
    let params = FilterParams {
        category: Some("Groceries".into()),
        ..Default::default()
    };
    let Json(listed) = list_expenses(State(state.clone()), Query(params)).await.unwrap();
    assert_eq!(listed.len(), 1);

    let Json(series) = analytics(State(state)).await.unwrap();
    assert_eq!(
        serde_json::to_value(&series).unwrap(),
        json!([
            {"month": "1/2024", "Rental": 500.0, "Groceries": 300.0, "Entertainment": 0.0, "Travel": 0.0, "Others": 0.0},
            {"month": "2/2024", "Rental": 200.0, "Groceries": 0.0, "Entertainment": 0.0, "Travel": 0.0, "Others": 0.0},
        ])
    );
}

#[tokio::test]
async fn analytics_failure_is_a_500() {
    let state = state().await;
    sqlx::query(
        "INSERT INTO expenses (amount, category, notes, expense_date, payment_mode, created_at)
         VALUES ('5', 'Travel', NULL, '31/12/2024', 'Cash', '2024-01-01T00:00:00Z')",
    )
    .execute(&state.db)
    .await
    .unwrap();

    let err = analytics(State(state)).await.unwrap_err();
    assert_eq!(err.message, "Analytics failed");
    assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn analytics_overflow_is_a_500_not_a_panic() {
    let state = state().await;
    for day in ["2024-08-03", "2024-08-17"] {
        create_expense(
            State(state.clone()),
            body(json!({"amount": "50000000000000000000000000000", "category": "Travel", "date": day, "paymentMode": "Cash"})),
        )
        .await
        .unwrap();
    }

    let err = analytics(State(state)).await.unwrap_err();
    assert_eq!(err.message, "Analytics failed");
    assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
}
