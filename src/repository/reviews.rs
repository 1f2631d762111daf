//! Reviews repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{is_unique_violation, AppError, AppResult},
    models::review::{
        CreateReview, Review, UpdateReview, DUPLICATE_REVIEW_MESSAGE, REVIEW_UNIQUE_CONSTRAINT,
    },
};

const REVIEW_SELECT: &str = r#"
    SELECT rv.id, rv.book_id, b.title AS book_title, rv.user_id, u.username AS user_name,
           rv.rating, rv.comment
    FROM reviews rv
    JOIN books b ON b.id = rv.book_id
    JOIN users u ON u.id = rv.user_id
"#;

#[derive(Clone)]
pub struct ReviewsRepository {
    pool: Pool<Postgres>,
}

impl ReviewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get review by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Review> {
        sqlx::query_as::<_, Review>(&format!("{} WHERE rv.id = $1", REVIEW_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Review with id {} not found", id)))
    }

    pub async fn list(&self) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!("{} ORDER BY rv.id", REVIEW_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(reviews)
    }

    pub async fn list_by_book(&self, book_id: i32) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "{} WHERE rv.book_id = $1 ORDER BY rv.id",
            REVIEW_SELECT
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    /// Reviews written by a user
    pub async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "{} WHERE rv.user_id = $1 ORDER BY rv.id",
            REVIEW_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    pub async fn exists_for(&self, book_id: i32, user_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE book_id = $1 AND user_id = $2)",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a review; a (book, user) collision surfaces as a validation error
    pub async fn create(&self, user_id: i32, review: &CreateReview) -> AppResult<Review> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO reviews (book_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(review.book_id)
        .bind(user_id)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, REVIEW_UNIQUE_CONSTRAINT) {
                AppError::Validation(DUPLICATE_REVIEW_MESSAGE.to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        self.get_by_id(id).await
    }

    pub async fn update(&self, id: i32, review: &UpdateReview) -> AppResult<Review> {
        let result = sqlx::query(
            r#"
            UPDATE reviews SET
                rating = COALESCE($2, rating),
                comment = COALESCE($3, comment)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(review.rating)
        .bind(&review.comment)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Review with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Review with id {} not found", id)));
        }

        Ok(())
    }
}
