//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookStatus, CreateBook, UpdateBook},
};

const BOOK_SELECT: &str = r#"
    SELECT b.id, b.title, b.author, b.isbn, b.owner_id, u.username AS owner_name,
           b.category, b.status
    FROM books b
    JOIN users u ON u.id = b.owner_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("{} WHERE b.id = $1", BOOK_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!("{} ORDER BY b.id", BOOK_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Books owned by a user
    pub async fn list_by_owner(&self, owner_id: i32) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!("{} WHERE b.owner_id = $1 ORDER BY b.id", BOOK_SELECT))
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    pub async fn list_by_status(&self, status: BookStatus) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!("{} WHERE b.status = $1 ORDER BY b.id", BOOK_SELECT))
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Find a book by owner and title (seeding)
    pub async fn find_by_owner_and_title(&self, owner_id: i32, title: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "{} WHERE b.owner_id = $1 AND b.title = $2",
            BOOK_SELECT
        ))
        .bind(owner_id)
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    pub async fn create(&self, owner_id: i32, book: &CreateBook) -> AppResult<Book> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author, isbn, owner_id, category, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(owner_id)
        .bind(&book.category)
        .bind(book.status.unwrap_or_default())
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update the fields present in the request
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let result = sqlx::query(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                isbn = COALESCE($4, isbn),
                category = COALESCE($5, category),
                status = COALESCE($6, status)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.category)
        .bind(book.status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }
}
