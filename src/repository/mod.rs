//! Repository layer for database operations

pub mod books;
pub mod payments;
pub mod rentals;
pub mod reviews;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub books: books::BooksRepository,
    pub rentals: rentals::RentalsRepository,
    pub reviews: reviews::ReviewsRepository,
    pub payments: payments::PaymentsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            rentals: rentals::RentalsRepository::new(pool.clone()),
            reviews: reviews::ReviewsRepository::new(pool.clone()),
            payments: payments::PaymentsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database, used by the readiness check
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
