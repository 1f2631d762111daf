//! Database seeding tool
//!
//! Creates the fixed `admin`, `owner`, `renter` and `viewer` accounts and,
//! unless `--users-only` is given, a small sample library with rentals in
//! every status, payments and reviews. Safe to run repeatedly.

use anyhow::Context;
use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;

use book_lending_server::{
    config::AppConfig,
    models::{
        book::{BookStatus, CreateBook, UpdateBook},
        payment::{CreatePayment, PaymentStatus},
        rental::{CreateRental, RentalStatus},
        review::CreateReview,
        user::{CreateUser, Role, User, UserStatus},
    },
    repository::Repository,
    services::{users::hash_password, Services},
};

const ACCOUNT_PASSWORD: &str = "1234567890";
const SAMPLE_PASSWORD: &str = "password123";

struct SampleUser {
    username: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    role: Role,
    phone_number: &'static str,
    room_number: &'static str,
    hostel_number: &'static str,
}

const SAMPLE_USERS: &[SampleUser] = &[
    SampleUser { username: "owner1", first_name: "John", last_name: "Doe", role: Role::Owner, phone_number: "111-222-3333", room_number: "B-201", hostel_number: "H2" },
    SampleUser { username: "owner2", first_name: "Jane", last_name: "Smith", role: Role::Owner, phone_number: "222-333-4444", room_number: "C-301", hostel_number: "H3" },
    SampleUser { username: "renter1", first_name: "Alice", last_name: "Johnson", role: Role::Renter, phone_number: "333-444-5555", room_number: "D-401", hostel_number: "H4" },
    SampleUser { username: "renter2", first_name: "Bob", last_name: "Brown", role: Role::Renter, phone_number: "444-555-6666", room_number: "E-501", hostel_number: "H5" },
    SampleUser { username: "renter3", first_name: "Charlie", last_name: "Davis", role: Role::Renter, phone_number: "555-666-7777", room_number: "F-601", hostel_number: "H6" },
];

// (title, author, isbn, category, owner)
const SAMPLE_BOOKS: &[(&str, &str, &str, &str, &str)] = &[
    ("The Great Gatsby", "F. Scott Fitzgerald", "9780743273565", "Fiction", "owner1"),
    ("To Kill a Mockingbird", "Harper Lee", "9780061120084", "Fiction", "owner1"),
    ("1984", "George Orwell", "9780451524935", "Fiction", "owner1"),
    ("Pride and Prejudice", "Jane Austen", "9780141439518", "Fiction", "owner2"),
    ("The Catcher in the Rye", "J.D. Salinger", "9780316769488", "Fiction", "owner2"),
    ("The Hobbit", "J.R.R. Tolkien", "9780547928227", "Fantasy", "owner2"),
    ("Brave New World", "Aldous Huxley", "9780060850524", "Science Fiction", "owner1"),
    ("The Lord of the Rings", "J.R.R. Tolkien", "9780618640157", "Fantasy", "owner1"),
    ("Animal Farm", "George Orwell", "9780451526342", "Fiction", "owner2"),
    ("The Alchemist", "Paulo Coelho", "9780061122415", "Fiction", "owner2"),
    ("Python Crash Course", "Eric Matthes", "9781593276034", "Computer Science", "owner1"),
    ("Clean Code", "Robert C. Martin", "9780132350884", "Computer Science", "owner1"),
];

// (title, renter, start offset in days, end offset in days, status)
const SAMPLE_RENTALS: &[(&str, &str, i64, i64, RentalStatus)] = &[
    ("The Great Gatsby", "renter1", -30, -15, RentalStatus::Completed),
    ("To Kill a Mockingbird", "renter1", -20, -5, RentalStatus::Completed),
    ("1984", "renter2", -10, 5, RentalStatus::Approved),
    ("Pride and Prejudice", "renter2", -5, 10, RentalStatus::Approved),
    ("The Catcher in the Rye", "renter3", 5, 20, RentalStatus::Pending),
    ("The Hobbit", "renter3", 10, 25, RentalStatus::Pending),
    ("Clean Code", "renter1", 3, 17, RentalStatus::Pending),
    ("Animal Farm", "renter3", -12, -2, RentalStatus::Canceled),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let users_only = std::env::args().any(|arg| arg == "--users-only");

    let config = AppConfig::load().context("Failed to load configuration")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let repository = Repository::new(pool);
    let services = Services::new(repository.clone(), config.auth.clone());

    for (username, role) in [
        ("admin", Role::Admin),
        ("owner", Role::Owner),
        ("renter", Role::Renter),
        ("viewer", Role::Viewer),
    ] {
        let user = services.users.ensure_account(username, ACCOUNT_PASSWORD, role).await?;
        tracing::info!(user_id = user.id, %role, "Account {} ready", username);
    }

    if users_only {
        return Ok(());
    }

    seed_library(&repository).await?;
    tracing::info!("Seed data created");
    Ok(())
}

async fn seed_library(repository: &Repository) -> anyhow::Result<()> {
    let mut users: Vec<User> = Vec::with_capacity(SAMPLE_USERS.len());
    for sample in SAMPLE_USERS {
        users.push(sample_user(repository, sample).await?);
    }
    let user_id_of = |username: &str| {
        users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.id)
            .with_context(|| format!("sample user {} missing", username))
    };

    let mut books = Vec::with_capacity(SAMPLE_BOOKS.len());
    for &(title, author, isbn, category, owner) in SAMPLE_BOOKS {
        let owner_id = user_id_of(owner)?;
        let book = match repository.books.find_by_owner_and_title(owner_id, title).await? {
            Some(book) => book,
            None => {
                let book = CreateBook {
                    title: title.to_string(),
                    author: author.to_string(),
                    isbn: Some(isbn.to_string()),
                    category: Some(category.to_string()),
                    status: Some(BookStatus::Available),
                };
                repository.books.create(owner_id, &book).await?
            }
        };
        books.push(book);
    }
    let book_id_of = |title: &str| {
        books
            .iter()
            .find(|b| b.title == title)
            .map(|b| b.id)
            .with_context(|| format!("sample book {} missing", title))
    };

    let today = Utc::now().date_naive();
    let mut rng = rand::thread_rng();

    for &(title, renter, start, end, status) in SAMPLE_RENTALS {
        let book_id = book_id_of(title)?;
        let renter_id = user_id_of(renter)?;
        let start_date: NaiveDate = today + Duration::days(start);
        let end_date: NaiveDate = today + Duration::days(end);

        if status == RentalStatus::Approved {
            let rented = UpdateBook {
                status: Some(BookStatus::Rented),
                ..Default::default()
            };
            repository.books.update(book_id, &rented).await?;
        }

        if repository
            .rentals
            .find(book_id, renter_id, status)
            .await?
            .is_some()
        {
            continue;
        }

        let request = CreateRental {
            book_id,
            start_date,
            end_date,
        };
        let rental = repository
            .rentals
            .create_with_status(renter_id, &request, status)
            .await?;

        if status == RentalStatus::Completed && !repository.payments.exists_for_rental(rental.id).await? {
            let payment = CreatePayment {
                rental_id: rental.id,
                amount: Decimal::new(500, 2),
                status: Some(PaymentStatus::Completed),
                transaction_id: Some(format!("TR-{}", rng.gen_range(10000..=99999))),
            };
            repository.payments.create(&payment).await?;
        }
    }

    for rental in repository.rentals.list().await? {
        if rental.status != RentalStatus::Completed
            || repository.reviews.exists_for(rental.book_id, rental.renter_id).await?
        {
            continue;
        }

        let rating = rng.gen_range(3..=5);
        let comment = match rating {
            5 => format!("Excellent book! I thoroughly enjoyed {}.", rental.book_title),
            4 => format!("Very good read. {} was quite interesting.", rental.book_title),
            _ => format!("Decent book, but not my favorite. {} was okay.", rental.book_title),
        };
        let review = CreateReview {
            book_id: rental.book_id,
            rating,
            comment: Some(comment),
        };
        repository.reviews.create(rental.renter_id, &review).await?;
    }

    Ok(())
}

async fn sample_user(repository: &Repository, sample: &SampleUser) -> anyhow::Result<User> {
    if let Some(user) = repository.users.get_by_username(sample.username).await? {
        return Ok(user);
    }

    let request = CreateUser {
        username: sample.username.to_string(),
        password: SAMPLE_PASSWORD.to_string(),
        email: Some(format!("{}@example.com", sample.username)),
        first_name: Some(sample.first_name.to_string()),
        last_name: Some(sample.last_name.to_string()),
        role: Some(sample.role),
        status: Some(UserStatus::Active),
        room_number: Some(sample.room_number.to_string()),
        phone_number: Some(sample.phone_number.to_string()),
        hostel_number: Some(sample.hostel_number.to_string()),
    };
    let hash = hash_password(SAMPLE_PASSWORD)?;
    let user = repository.users.create(&request, &hash).await?;
    tracing::info!(user_id = user.id, role = %user.role, "Created sample user {}", user.username);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn sample_rentals_are_keyed_without_dates() {
        let keys: HashSet<_> = SAMPLE_RENTALS
            .iter()
            .map(|&(title, renter, _, _, status)| (title, renter, status))
            .collect();
        assert_eq!(keys.len(), SAMPLE_RENTALS.len());
    }

    #[test]
    fn sample_rentals_reference_sample_data() {
        for &(title, renter, start, end, _) in SAMPLE_RENTALS {
            assert!(SAMPLE_BOOKS.iter().any(|b| b.0 == title), "{}", title);
            assert!(SAMPLE_USERS.iter().any(|u| u.username == renter), "{}", renter);
            assert!(end >= start, "{} ends before it starts", title);
        }
    }
}
