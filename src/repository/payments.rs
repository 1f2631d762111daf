//! Payments repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{is_unique_violation, AppError, AppResult},
    models::payment::{CreatePayment, Payment, UpdatePayment, PAYMENT_RENTAL_UNIQUE_CONSTRAINT},
};

const PAYMENT_SELECT: &str = r#"
    SELECT p.id, p.rental_id, u.username || ' - ' || b.title AS rental_details,
           p.amount, p.status, p.transaction_id
    FROM payments p
    JOIN rentals r ON r.id = p.rental_id
    JOIN users u ON u.id = r.renter_id
    JOIN books b ON b.id = r.book_id
"#;

/// Which payments a caller may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentScope {
    All,
    /// Payments on rentals where the user is the renter or owns the book
    Party(i32),
    /// Payments on rentals where the user is the renter
    Renter(i32),
}

impl PaymentScope {
    fn clause(&self) -> &'static str {
        match self {
            PaymentScope::All => "TRUE",
            PaymentScope::Party(_) => "(r.renter_id = $1 OR b.owner_id = $1)",
            PaymentScope::Renter(_) => "r.renter_id = $1",
        }
    }

    fn user_id(&self) -> Option<i32> {
        match self {
            PaymentScope::All => None,
            PaymentScope::Party(id) | PaymentScope::Renter(id) => Some(*id),
        }
    }
}

#[derive(Clone)]
pub struct PaymentsRepository {
    pool: Pool<Postgres>,
}

impl PaymentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List the payments in scope
    pub async fn list(&self, scope: PaymentScope) -> AppResult<Vec<Payment>> {
        let query = format!("{} WHERE {} ORDER BY p.id", PAYMENT_SELECT, scope.clause());
        let mut builder = sqlx::query_as::<_, Payment>(&query);
        if let Some(user_id) = scope.user_id() {
            builder = builder.bind(user_id);
        }
        Ok(builder.fetch_all(&self.pool).await?)
    }

    /// Get a payment by ID if it is in scope
    pub async fn get(&self, id: i32, scope: PaymentScope) -> AppResult<Payment> {
        let query = match scope.user_id() {
            Some(_) => format!("{} WHERE p.id = $2 AND {}", PAYMENT_SELECT, scope.clause()),
            None => format!("{} WHERE p.id = $1", PAYMENT_SELECT),
        };
        let mut builder = sqlx::query_as::<_, Payment>(&query);
        if let Some(user_id) = scope.user_id() {
            builder = builder.bind(user_id);
        }
        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Payment with id {} not found", id)))
    }

    pub async fn exists_for_rental(&self, rental_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM payments WHERE rental_id = $1)")
            .bind(rental_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn create(&self, payment: &CreatePayment) -> AppResult<Payment> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO payments (rental_id, amount, status, transaction_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(payment.rental_id)
        .bind(payment.amount)
        .bind(payment.status.unwrap_or_default())
        .bind(&payment.transaction_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, PAYMENT_RENTAL_UNIQUE_CONSTRAINT) {
                AppError::Validation("This rental already has a payment".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        self.get(id, PaymentScope::All).await
    }

    pub async fn update(&self, id: i32, payment: &UpdatePayment) -> AppResult<Payment> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET
                amount = COALESCE($2, amount),
                status = COALESCE($3, status),
                transaction_id = COALESCE($4, transaction_id)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payment.amount)
        .bind(payment.status)
        .bind(&payment.transaction_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Payment with id {} not found", id)));
        }

        self.get(id, PaymentScope::All).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Payment with id {} not found", id)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_scope_has_no_filter() {
        assert_eq!(PaymentScope::All.clause(), "TRUE");
        assert_eq!(PaymentScope::All.user_id(), None);
    }

    #[test]
    fn party_scope_covers_renter_and_owner() {
        let scope = PaymentScope::Party(4);
        assert!(scope.clause().contains("r.renter_id = $1"));
        assert!(scope.clause().contains("b.owner_id = $1"));
        assert_eq!(scope.user_id(), Some(4));
    }

    #[test]
    fn renter_scope_ignores_ownership() {
        let scope = PaymentScope::Renter(4);
        assert!(!scope.clause().contains("owner_id"));
    }
}
