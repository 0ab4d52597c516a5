use anyhow::Result;
use sqlx::{Pool, Sqlite};

use crate::config::Config;
use crate::database::db::{connection, migrate, queries};
use crate::database::models::{Expense, NewExpense};
use crate::query::aggregate::{self, MonthlyBreakdown};
use crate::query::filter::{self, FilterSelection};

/// Direct SQLite access for the terminal client, sharing the server's queries.
#[derive(Clone)]
pub struct Client {
    pool: Pool<Sqlite>,
}

impl Client {
    pub async fn sqlite(cfg: &Config) -> Result<Self> {
        let pool = connection::get_db_pool(cfg).await?;
        migrate::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    // ============= Expenses =============

    pub async fn list_expenses(&self, selection: &FilterSelection) -> Result<Vec<Expense>> {
        let query = filter::build_query(selection, filter::today());
        Ok(queries::find_expenses(&self.pool, &query).await?)
    }

    pub async fn create_expense(&self, req: &NewExpense) -> Result<Expense> {
        Ok(queries::insert_expense(&self.pool, req).await?)
    }

    // ============= Analytics =============

    pub async fn analytics(&self) -> Result<Vec<MonthlyBreakdown>> {
        let totals = queries::group_all(&self.pool).await?;
        Ok(aggregate::summarize(totals)?)
    }
}
