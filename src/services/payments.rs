//! Payment service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        payment::{validate_amount, CreatePayment, Payment, UpdatePayment},
        user::UserClaims,
    },
    permissions,
    repository::{payments::PaymentScope, Repository},
};

#[derive(Clone)]
pub struct PaymentsService {
    repository: Repository,
}

/// Payments the caller is allowed to see: everything for an admin, otherwise
/// those on rentals where the caller is the renter or the book owner
pub fn visible_scope(claims: &UserClaims) -> PaymentScope {
    if permissions::is_admin(claims) {
        PaymentScope::All
    } else {
        PaymentScope::Party(claims.user_id)
    }
}

impl PaymentsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_payments(&self, claims: &UserClaims) -> AppResult<Vec<Payment>> {
        self.repository.payments.list(visible_scope(claims)).await
    }

    /// Payments on rentals the caller made
    pub async fn my_payments(&self, claims: &UserClaims) -> AppResult<Vec<Payment>> {
        self.repository
            .payments
            .list(PaymentScope::Renter(claims.user_id))
            .await
    }

    pub async fn get_payment(&self, claims: &UserClaims, id: i32) -> AppResult<Payment> {
        self.repository.payments.get(id, visible_scope(claims)).await
    }

    /// Record a payment for a rental (admin)
    pub async fn create_payment(&self, claims: &UserClaims, payment: CreatePayment) -> AppResult<Payment> {
        claims.require_admin()?;
        payment.validate()?;
        validate_amount(payment.amount).map_err(AppError::Validation)?;

        self.repository
            .rentals
            .get_by_id(payment.rental_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(msg) => AppError::Validation(msg),
                other => other,
            })?;

        if self.repository.payments.exists_for_rental(payment.rental_id).await? {
            return Err(AppError::Validation("This rental already has a payment".to_string()));
        }

        let created = self.repository.payments.create(&payment).await?;
        tracing::info!(payment_id = created.id, rental_id = created.rental_id, "Payment recorded");
        Ok(created)
    }

    pub async fn update_payment(&self, claims: &UserClaims, id: i32, update: UpdatePayment) -> AppResult<Payment> {
        claims.require_admin()?;
        update.validate()?;
        if let Some(amount) = update.amount {
            validate_amount(amount).map_err(AppError::Validation)?;
        }

        self.repository.payments.update(id, &update).await
    }

    pub async fn delete_payment(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        claims.require_admin()?;
        self.repository.payments.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::permissions::tests::claims;

    #[test]
    fn admin_sees_every_payment() {
        assert_eq!(visible_scope(&claims(1, Role::Admin)), PaymentScope::All);
    }

    #[test]
    fn other_roles_see_their_rentals_only() {
        for role in [Role::Owner, Role::Renter, Role::Viewer] {
            assert_eq!(visible_scope(&claims(8, role)), PaymentScope::Party(8));
        }
    }
}
