//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Duration;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, TokenType, UpdateProfile, UpdateUser, User, UserClaims, UserQuery},
    repository::Repository,
};

/// Access and refresh tokens issued together
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by username and password and issue a token pair
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(TokenPair, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let tokens = self.issue_tokens(&user)?;
        tracing::info!(user_id = user.id, role = %user.role, "User authenticated");
        Ok((tokens, user))
    }

    /// Exchange a refresh token for a new pair. Identity and role are reloaded.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenPair> {
        let claims = self.decode(refresh_token, TokenType::Refresh)?;
        let user = self
            .repository
            .users
            .get_by_id(claims.user_id)
            .await
            .map_err(|e| match e {
                AppError::NotFound(_) => AppError::Authentication("User no longer exists".to_string()),
                other => other,
            })?;

        self.issue_tokens(&user)
    }

    /// Validate a token and check it is of the expected kind
    pub fn decode(&self, token: &str, expected: TokenType) -> AppResult<UserClaims> {
        decode_token(token, &self.config.jwt_secret, expected)
    }

    fn issue_tokens(&self, user: &User) -> AppResult<TokenPair> {
        let access = UserClaims::new(
            user,
            TokenType::Access,
            Duration::minutes(self.config.access_token_minutes),
        );
        let refresh = UserClaims::new(
            user,
            TokenType::Refresh,
            Duration::days(self.config.refresh_token_days),
        );

        let sign = |claims: &UserClaims| {
            claims
                .create_token(&self.config.jwt_secret)
                .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
        };

        Ok(TokenPair {
            access: sign(&access)?,
            refresh: sign(&refresh)?,
        })
    }

    /// Verify user password
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list_users(&self, query: &UserQuery) -> AppResult<Vec<User>> {
        self.repository.users.list(query).await
    }

    /// Register a new user
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        user.validate()?;
        if self.repository.users.username_exists(&user.username, None).await? {
            return Err(AppError::Validation("A user with that username already exists".to_string()));
        }

        let password = hash_password(&user.password)?;
        let created = self.repository.users.create(&user, &password).await?;
        tracing::info!(user_id = created.id, role = %created.role, "User registered");
        Ok(created)
    }

    /// Update any user (admin)
    pub async fn update_user(&self, id: i32, user: UpdateUser) -> AppResult<User> {
        user.validate()?;
        self.repository.users.get_by_id(id).await?;

        if let Some(ref username) = user.username {
            if self.repository.users.username_exists(username, Some(id)).await? {
                return Err(AppError::Validation("A user with that username already exists".to_string()));
            }
        }

        let password = user.password.as_deref().map(hash_password).transpose()?;
        self.repository.users.update(id, &user, password).await
    }

    /// Update the caller's own profile; role and status are not reachable here
    pub async fn update_profile(&self, user_id: i32, profile: UpdateProfile) -> AppResult<User> {
        self.update_user(user_id, profile.into()).await
    }

    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Create or reset one of the fixed bootstrap accounts
    pub async fn ensure_account(&self, username: &str, password: &str, role: Role) -> AppResult<User> {
        let hash = hash_password(password)?;
        let email = format!("{}@example.com", username);
        self.repository
            .users
            .upsert_account(username, &hash, role, &email)
            .await
    }
}

/// Decode a JWT and check it is of the expected kind
pub fn decode_token(token: &str, secret: &str, expected: TokenType) -> AppResult<UserClaims> {
    let claims = UserClaims::from_token(token, secret)
        .map_err(|e| AppError::Authentication(e.to_string()))?;

    if claims.token_type != expected {
        return Err(AppError::Authentication("Token has wrong type".to_string()));
    }

    Ok(claims)
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserStatus;
    use chrono::Utc;

    fn user(password: &str) -> User {
        User {
            id: 3,
            username: "renter1".to_string(),
            password: hash_password(password).unwrap(),
            email: None,
            first_name: None,
            last_name: None,
            role: Role::Renter,
            status: UserStatus::Active,
            room_number: None,
            phone_number: None,
            hostel_number: None,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn hashed_password_verifies() {
        let user = user("password123");
        assert!(user.password.starts_with("$argon2"));

        let parsed = PasswordHash::new(&user.password).unwrap();
        assert!(Argon2::default().verify_password(b"password123", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let user = user("password123");
        let refresh = UserClaims::new(&user, TokenType::Refresh, Duration::days(1))
            .create_token("secret")
            .unwrap();

        assert!(decode_token(&refresh, "secret", TokenType::Refresh).is_ok());
        assert!(matches!(
            decode_token(&refresh, "secret", TokenType::Access),
            Err(AppError::Authentication(_))
        ));
    }

    #[test]
    fn garbage_token_is_an_authentication_error() {
        assert!(matches!(
            decode_token("not-a-jwt", "secret", TokenType::Access),
            Err(AppError::Authentication(_))
        ));
    }
}
