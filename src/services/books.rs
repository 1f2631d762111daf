//! Book catalog service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookStatus, CreateBook, UpdateBook},
        user::UserClaims,
    },
    permissions::{self, Access},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Books owned by the caller
    pub async fn my_books(&self, claims: &UserClaims) -> AppResult<Vec<Book>> {
        self.repository.books.list_by_owner(claims.user_id).await
    }

    pub async fn available_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_by_status(BookStatus::Available).await
    }

    /// List a book; the caller becomes its owner
    pub async fn create_book(&self, claims: &UserClaims, book: CreateBook) -> AppResult<Book> {
        book.validate()?;
        let created = self.repository.books.create(claims.user_id, &book).await?;
        tracing::info!(book_id = created.id, owner_id = claims.user_id, "Book listed");
        Ok(created)
    }

    pub async fn update_book(&self, claims: &UserClaims, id: i32, update: UpdateBook) -> AppResult<Book> {
        update.validate()?;
        let book = self.repository.books.get_by_id(id).await?;
        permissions::require(
            permissions::is_owner_or_read_only(claims, Access::Write, book.owner_id),
            "You are not the owner of this book",
        )?;

        self.repository.books.update(id, &update).await
    }

    pub async fn delete_book(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        let book = self.repository.books.get_by_id(id).await?;
        permissions::require(
            permissions::is_owner_or_read_only(claims, Access::Write, book.owner_id),
            "You are not the owner of this book",
        )?;

        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, user_id = claims.user_id, "Book deleted");
        Ok(())
    }
}
