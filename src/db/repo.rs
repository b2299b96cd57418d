//! Repository layer for stored investments.

use crate::domain::{Holding, Investment};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Insert a new investment record.
    ///
    /// # Errors
    /// Returns an error if the insert fails (including a duplicate id).
    pub async fn insert_investment(&self, investment: &Investment) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO investments (
                id, user_id, token_ticker, token_name, token_amount, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&investment.id)
        .bind(&investment.user_id)
        .bind(&investment.token_ticker)
        .bind(&investment.token_name)
        .bind(investment.token_amount)
        .bind(&investment.created_at)
        .bind(&investment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All investments owned by `user_id`, newest first.
    pub async fn list_investments(&self, user_id: &str) -> Result<Vec<Investment>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, token_ticker, token_name, token_amount, created_at, updated_at
            FROM investments
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(investment_from_row).collect()
    }

    pub async fn get_investment(&self, id: &str) -> Result<Option<Investment>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, token_ticker, token_name, token_amount, created_at, updated_at
            FROM investments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(investment_from_row).transpose()
    }

    /// Overwrite the mutable fields of an existing investment.
    ///
    /// Returns false if no row with that id exists.
    pub async fn update_investment(&self, investment: &Investment) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE investments
            SET token_ticker = ?, token_name = ?, token_amount = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&investment.token_ticker)
        .bind(&investment.token_name)
        .bind(investment.token_amount)
        .bind(&investment.updated_at)
        .bind(&investment.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns false if no row with that id exists.
    pub async fn delete_investment(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM investments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The user's holdings snapshot for one valuation pass.
    pub async fn list_holdings(&self, user_id: &str) -> Result<Vec<Holding>, sqlx::Error> {
        Ok(self
            .list_investments(user_id)
            .await?
            .iter()
            .map(Investment::holding)
            .collect())
    }
}

fn investment_from_row(row: &SqliteRow) -> Result<Investment, sqlx::Error> {
    Ok(Investment {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        token_ticker: row.try_get("token_ticker")?,
        token_name: row.try_get("token_name")?,
        token_amount: row.try_get("token_amount")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
