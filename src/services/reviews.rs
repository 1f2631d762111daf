//! Review service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        review::{CreateReview, Review, UpdateReview, DUPLICATE_REVIEW_MESSAGE},
        user::UserClaims,
    },
    permissions::{self, Access},
    repository::Repository,
};

#[derive(Clone)]
pub struct ReviewsService {
    repository: Repository,
}

impl ReviewsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_reviews(&self) -> AppResult<Vec<Review>> {
        self.repository.reviews.list().await
    }

    pub async fn get_review(&self, id: i32) -> AppResult<Review> {
        self.repository.reviews.get_by_id(id).await
    }

    /// Reviews for one book
    pub async fn book_reviews(&self, book_id: i32) -> AppResult<Vec<Review>> {
        self.repository.books.get_by_id(book_id).await?;
        self.repository.reviews.list_by_book(book_id).await
    }

    /// Reviews written by the caller
    pub async fn my_reviews(&self, claims: &UserClaims) -> AppResult<Vec<Review>> {
        self.repository.reviews.list_by_user(claims.user_id).await
    }

    /// Write a review as the caller, at most one per book
    pub async fn create_review(&self, claims: &UserClaims, review: CreateReview) -> AppResult<Review> {
        review.validate()?;

        self.repository
            .books
            .get_by_id(review.book_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(msg) => AppError::Validation(msg),
                other => other,
            })?;

        // Concurrent duplicates are still rejected by the unique constraint
        if self.repository.reviews.exists_for(review.book_id, claims.user_id).await? {
            return Err(AppError::Validation(DUPLICATE_REVIEW_MESSAGE.to_string()));
        }

        let created = self.repository.reviews.create(claims.user_id, &review).await?;
        tracing::info!(
            review_id = created.id,
            book_id = created.book_id,
            user_id = claims.user_id,
            "Review created"
        );
        Ok(created)
    }

    pub async fn update_review(&self, claims: &UserClaims, id: i32, update: UpdateReview) -> AppResult<Review> {
        update.validate()?;
        let review = self.repository.reviews.get_by_id(id).await?;
        permissions::require(
            permissions::is_reviewer_or_read_only(claims, Access::Write, review.user_id),
            "You are not the author of this review",
        )?;

        self.repository.reviews.update(id, &update).await
    }

    pub async fn delete_review(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        let review = self.repository.reviews.get_by_id(id).await?;
        permissions::require(
            permissions::is_reviewer_or_read_only(claims, Access::Write, review.user_id),
            "You are not the author of this review",
        )?;

        self.repository.reviews.delete(id).await
    }
}
