//! Rental workflow service

use crate::{
    error::{AppError, AppResult},
    models::{
        rental::{validate_period, CreateRental, Rental, RentalAction, UpdateRental},
        user::UserClaims,
    },
    permissions::{self, Access},
    repository::Repository,
};

#[derive(Clone)]
pub struct RentalsService {
    repository: Repository,
}

impl RentalsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_rentals(&self) -> AppResult<Vec<Rental>> {
        self.repository.rentals.list().await
    }

    pub async fn get_rental(&self, id: i32) -> AppResult<Rental> {
        self.repository.rentals.get_by_id(id).await
    }

    /// Rentals requested by the caller
    pub async fn my_rentals(&self, claims: &UserClaims) -> AppResult<Vec<Rental>> {
        self.repository.rentals.list_by_renter(claims.user_id).await
    }

    /// Rentals on the caller's books
    pub async fn my_book_rentals(&self, claims: &UserClaims) -> AppResult<Vec<Rental>> {
        self.repository.rentals.list_by_book_owner(claims.user_id).await
    }

    /// Request a rental; the caller is the renter and the rental starts pending
    pub async fn request_rental(&self, claims: &UserClaims, rental: CreateRental) -> AppResult<Rental> {
        validate_period(rental.start_date, rental.end_date)?;

        self.repository
            .books
            .get_by_id(rental.book_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(msg) => AppError::Validation(msg),
                other => other,
            })?;

        let created = self.repository.rentals.create(claims.user_id, &rental).await?;
        tracing::info!(
            rental_id = created.id,
            book_id = created.book_id,
            renter_id = claims.user_id,
            "Rental requested"
        );
        Ok(created)
    }

    /// Change the rental period
    pub async fn update_rental(&self, claims: &UserClaims, id: i32, update: UpdateRental) -> AppResult<Rental> {
        self.repository
            .rentals
            .update_period(id, &update, |rental| self.require_party(claims, rental))
            .await
    }

    /// Delete a rental. The book's status is left as it is.
    pub async fn delete_rental(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        let rental = self.repository.rentals.get_by_id(id).await?;
        self.require_party(claims, &rental)?;

        self.repository.rentals.delete(id).await?;
        tracing::info!(rental_id = id, user_id = claims.user_id, "Rental deleted");
        Ok(())
    }

    /// Approve, complete or cancel a rental
    pub async fn apply_action(&self, claims: &UserClaims, id: i32, action: RentalAction) -> AppResult<Rental> {
        let rental = self.repository.rentals.apply_action(id, action, claims).await?;
        tracing::info!(
            rental_id = id,
            book_id = rental.book_id,
            user_id = claims.user_id,
            action = action.as_str(),
            status = %rental.status,
            "Rental transitioned"
        );
        Ok(rental)
    }

    fn require_party(&self, claims: &UserClaims, rental: &Rental) -> AppResult<()> {
        permissions::require(
            permissions::is_renter_or_owner_or_admin(
                claims,
                Access::Write,
                rental.renter_id,
                rental.book_owner_id,
            ),
            "You are not allowed to modify this rental",
        )
    }
}
