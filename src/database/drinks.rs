use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::drink::Drink;

/// Data access for the `drinks` table.
pub struct DrinkRepository {
    pool: PgPool,
}

impl DrinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn all(&self) -> Result<Vec<Drink>, DatabaseError> {
        let drinks = sqlx::query_as::<_, Drink>("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(drinks)
    }

    pub async fn by_id(&self, id: i32) -> Result<Option<Drink>, DatabaseError> {
        let drink =
            sqlx::query_as::<_, Drink>("SELECT id, title, recipe FROM drinks WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(drink)
    }

    /// Exact-match title lookup, used for the duplicate check on create.
    pub async fn by_title(&self, title: &str) -> Result<Option<Drink>, DatabaseError> {
        let drink =
            sqlx::query_as::<_, Drink>("SELECT id, title, recipe FROM drinks WHERE title = $1")
                .bind(title)
                .fetch_optional(&self.pool)
                .await?;
        Ok(drink)
    }

    /// Insert a new row; the store assigns the id.
    pub async fn insert(&self, title: &str, recipe: &str) -> Result<Drink, DatabaseError> {
        let drink = sqlx::query_as::<_, Drink>(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(title)
        .bind(recipe)
        .fetch_one(&self.pool)
        .await?;
        Ok(drink)
    }

    /// Persist mutated fields of an existing row.
    pub async fn update(&self, drink: &Drink) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE drinks SET title = $1, recipe = $2 WHERE id = $3")
            .bind(&drink.title)
            .bind(&drink.recipe)
            .bind(drink.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("drink {}", drink.id)));
        }
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("drink {}", id)));
        }
        Ok(())
    }
}
