//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, UpdateUser, User, UserQuery, UserStatus},
};

const USER_COLUMNS: &str = r#"
    id, username, password, email, first_name, last_name, role, status,
    room_number, phone_number, hostel_number, date_joined
"#;

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username (authentication)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND id != $2)")
                .bind(username)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// List users, optionally filtered by role and username fragment
    pub async fn list(&self, query: &UserQuery) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE ($1::user_role IS NULL OR role = $1)
              AND ($2::text IS NULL OR username ILIKE '%' || $2 || '%')
            ORDER BY id
            "#,
            USER_COLUMNS
        ))
        .bind(query.role)
        .bind(query.username.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Create a new user with an already hashed password
    pub async fn create(&self, user: &CreateUser, password_hash: &str) -> AppResult<User> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (
                username, password, email, first_name, last_name, role, status,
                room_number, phone_number, hostel_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(password_hash)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.unwrap_or_default())
        .bind(user.status.unwrap_or_default())
        .bind(&user.room_number)
        .bind(&user.phone_number)
        .bind(&user.hostel_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Insert or refresh a fixed account (bootstrap)
    pub async fn upsert_account(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
        email: &str,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password, email, role, status)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (username) DO UPDATE
                SET password = EXCLUDED.password, role = EXCLUDED.role
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(role)
        .bind(UserStatus::Active)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update the fields present in the request
    pub async fn update(&self, id: i32, user: &UpdateUser, password_hash: Option<String>) -> AppResult<User> {
        let mut sets: Vec<String> = Vec::new();
        let mut param_idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, param_idx));
                    param_idx += 1;
                }
            };
        }

        add_field!(user.username, "username");
        add_field!(password_hash, "password");
        add_field!(user.email, "email");
        add_field!(user.first_name, "first_name");
        add_field!(user.last_name, "last_name");
        add_field!(user.role, "role");
        add_field!(user.status, "status");
        add_field!(user.room_number, "room_number");
        add_field!(user.phone_number, "phone_number");
        add_field!(user.hostel_number, "hostel_number");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!("UPDATE users SET {} WHERE id = $1", sets.join(", "));
        let mut builder = sqlx::query(&query).bind(id);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(user.username);
        bind_field!(password_hash);
        bind_field!(user.email);
        bind_field!(user.first_name);
        bind_field!(user.last_name);
        bind_field!(user.role);
        bind_field!(user.status);
        bind_field!(user.room_number);
        bind_field!(user.phone_number);
        bind_field!(user.hostel_number);

        let result = builder.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Delete a user. Books, rentals and reviews cascade.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        Ok(())
    }
}
