//! Rentals repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{is_check_violation, AppError, AppResult},
    models::{
        rental::{
            validate_period, CreateRental, Rental, RentalAction, RentalStatus, UpdateRental,
            INVALID_PERIOD_MESSAGE, RENTAL_PERIOD_CONSTRAINT,
        },
        user::UserClaims,
    },
};

const RENTAL_SELECT: &str = r#"
    SELECT r.id, r.renter_id, u.username AS renter_name, r.book_id, b.title AS book_title,
           b.owner_id AS book_owner_id, r.start_date, r.end_date, r.status
    FROM rentals r
    JOIN users u ON u.id = r.renter_id
    JOIN books b ON b.id = r.book_id
"#;

#[derive(Clone)]
pub struct RentalsRepository {
    pool: Pool<Postgres>,
}

impl RentalsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get rental by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Rental> {
        sqlx::query_as::<_, Rental>(&format!("{} WHERE r.id = $1", RENTAL_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rental with id {} not found", id)))
    }

    pub async fn list(&self) -> AppResult<Vec<Rental>> {
        let rentals = sqlx::query_as::<_, Rental>(&format!("{} ORDER BY r.id", RENTAL_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(rentals)
    }

    /// Rentals where the user is the renter
    pub async fn list_by_renter(&self, renter_id: i32) -> AppResult<Vec<Rental>> {
        let rentals = sqlx::query_as::<_, Rental>(&format!(
            "{} WHERE r.renter_id = $1 ORDER BY r.id",
            RENTAL_SELECT
        ))
        .bind(renter_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rentals)
    }

    /// Rentals on books the user owns
    pub async fn list_by_book_owner(&self, owner_id: i32) -> AppResult<Vec<Rental>> {
        let rentals = sqlx::query_as::<_, Rental>(&format!(
            "{} WHERE b.owner_id = $1 ORDER BY r.id",
            RENTAL_SELECT
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rentals)
    }

    /// Find a rental of a book by a renter in the given status (seeding)
    pub async fn find(
        &self,
        book_id: i32,
        renter_id: i32,
        status: RentalStatus,
    ) -> AppResult<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>(&format!(
            "{} WHERE r.book_id = $1 AND r.renter_id = $2 AND r.status = $3 ORDER BY r.id LIMIT 1",
            RENTAL_SELECT
        ))
        .bind(book_id)
        .bind(renter_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rental)
    }

    pub async fn create(&self, renter_id: i32, rental: &CreateRental) -> AppResult<Rental> {
        self.create_with_status(renter_id, rental, RentalStatus::Pending).await
    }

    /// Insert a rental in an arbitrary status (seeding)
    pub async fn create_with_status(
        &self,
        renter_id: i32,
        rental: &CreateRental,
        status: RentalStatus,
    ) -> AppResult<Rental> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO rentals (renter_id, book_id, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(renter_id)
        .bind(rental.book_id)
        .bind(rental.start_date)
        .bind(rental.end_date)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(period_violation)?;

        self.get_by_id(id).await
    }

    /// Update the rental period.
    ///
    /// The row stays locked from the `authorize` check to the write, so the
    /// period is validated against the dates that actually get committed.
    pub async fn update_period<F>(
        &self,
        id: i32,
        update: &UpdateRental,
        authorize: F,
    ) -> AppResult<Rental>
    where
        F: FnOnce(&Rental) -> AppResult<()>,
    {
        let mut tx = self.pool.begin().await?;

        let rental = Self::lock(&mut *tx, id).await?;
        authorize(&rental)?;

        let start_date = update.start_date.unwrap_or(rental.start_date);
        let end_date = update.end_date.unwrap_or(rental.end_date);
        validate_period(start_date, end_date)?;

        sqlx::query("UPDATE rentals SET start_date = $1, end_date = $2 WHERE id = $3")
            .bind(start_date)
            .bind(end_date)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(period_violation)?;

        tx.commit().await?;

        Ok(Rental {
            start_date,
            end_date,
            ..rental
        })
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM rentals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Rental with id {} not found", id)));
        }

        Ok(())
    }

    /// Run a workflow action atomically.
    ///
    /// The rental row is locked for the duration of the transaction, guards
    /// are evaluated on the locked row, and the rental and book writes commit
    /// together. Any error rolls both back.
    pub async fn apply_action(
        &self,
        id: i32,
        action: RentalAction,
        claims: &UserClaims,
    ) -> AppResult<Rental> {
        let mut tx = self.pool.begin().await?;

        let rental = Self::lock(&mut *tx, id).await?;
        let transition = action.apply(claims, &rental)?;

        sqlx::query("UPDATE rentals SET status = $1 WHERE id = $2")
            .bind(transition.rental_status)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(book_status) = transition.book_status {
            sqlx::query("UPDATE books SET status = $1 WHERE id = $2")
                .bind(book_status)
                .bind(rental.book_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(Rental {
            status: transition.rental_status,
            ..rental
        })
    }

    async fn lock(con: &mut PgConnection, id: i32) -> AppResult<Rental> {
        sqlx::query_as::<_, Rental>(&format!("{} WHERE r.id = $1 FOR UPDATE OF r", RENTAL_SELECT))
            .bind(id)
            .fetch_optional(con)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rental with id {} not found", id)))
    }
}

fn period_violation(err: sqlx::Error) -> AppError {
    if is_check_violation(&err, RENTAL_PERIOD_CONSTRAINT) {
        AppError::Validation(INVALID_PERIOD_MESSAGE.to_string())
    } else {
        AppError::Database(err)
    }
}
