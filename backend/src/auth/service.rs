//! Core business logic for the authentication system.
//!
//! This service handles company registration, password hashing and verification,
//! session token issuance and validation. It orchestrates interactions between
//! the handlers and the database.

use std::sync::OnceLock;
use std::time::Duration;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{info, warn};
use uuid::Uuid;

use super::errors::AuthError;
use super::models::{ChangePasswordRequest, Claims, LoginRequest, RegisterCompanyRequest};
use crate::database::models::{Company, Role, UserRecord};
use crate::database::{queries, Database};
use crate::errors::{AppError, AppResult};
use crate::utils::{normalize_email, normalize_slug, required_text};

pub const MIN_PASSWORD_CHARS: usize = 8;

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::WeakPassword(MIN_PASSWORD_CHARS));
    }
    Ok(())
}

/// Hashes `password` with Argon2id into a PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Hashing(err.to_string()))
}

pub fn verify_password(password: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Signing material and lifetime for session tokens.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user: &UserRecord) -> Result<(String, DateTime<Utc>), AuthError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(
        &self,
        user: &UserRecord,
        issued_at: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), AuthError> {
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|err| AuthError::TokenEncoding(err.to_string()))?;
        let expires_at = issued_at + ttl;
        let claims = Claims {
            sub: user.id,
            cid: user.company_id,
            role: user.role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| AuthError::TokenEncoding(err.to_string()))?;
        Ok((token, expires_at))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })
    }
}

/// Creates a company together with its first administrator.
pub async fn register_company(
    db: &Database,
    request: &RegisterCompanyRequest,
) -> AppResult<(Company, UserRecord)> {
    let company_name = required_text("company_name", &request.company_name, 120)?;
    let slug = normalize_slug(&request.slug)?;
    let admin_name = required_text("admin_name", &request.admin_name, 120)?;
    let email = normalize_email(&request.email)?;
    validate_password(&request.password)?;
    let password_hash = hash_password(&request.password)?;

    let (company, admin) = db
        .transaction(|tx| {
            if queries::find_company_by_slug(tx, &slug)?.is_some() {
                return Err(AppError::conflict(format!("company slug `{slug}` is taken")));
            }
            let company = queries::insert_company(tx, &company_name, &slug)?;
            let admin = queries::insert_user(
                tx,
                &queries::NewUser {
                    company_id: company.id,
                    department_id: None,
                    email: &email,
                    full_name: &admin_name,
                    password_hash: &password_hash,
                    role: Role::Admin,
                },
            )?;
            Ok((company, admin))
        })
        .await?;

    info!(company_id = company.id, slug = %company.slug, "company registered");
    Ok((company, admin))
}

/// Verified against when no user matches a login, keeping failures equally slow.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash_password(&Uuid::new_v4().to_string()).unwrap_or_default())
}

/// Verifies credentials and returns the user with their company.
pub async fn login(db: &Database, request: &LoginRequest) -> AppResult<(Company, UserRecord)> {
    let slug = request.company_slug.trim().to_ascii_lowercase();
    let email = request.email.trim().to_lowercase();

    let found = db
        .call(|conn| {
            let Some(company) = queries::find_company_by_slug(conn, &slug)? else {
                return Ok(None);
            };
            let user = queries::find_user_by_email(conn, company.id, &email)?;
            Ok(user.map(|user| (company, user)))
        })
        .await?;

    let Some((company, user)) = found else {
        verify_password(&request.password, dummy_hash());
        warn!(slug = %slug, "login failed: unknown company or email");
        return Err(AuthError::InvalidCredentials.into());
    };
    if !verify_password(&request.password, &user.password_hash) {
        warn!(company_id = company.id, user_id = user.id, "login failed: wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }
    if !user.active {
        warn!(company_id = company.id, user_id = user.id, "login refused: account disabled");
        return Err(AuthError::AccountDisabled.into());
    }

    info!(company_id = company.id, user_id = user.id, "login succeeded");
    Ok((company, user))
}

pub async fn change_password(
    db: &Database,
    user: &UserRecord,
    request: &ChangePasswordRequest,
) -> AppResult<()> {
    if !verify_password(&request.current_password, &user.password_hash) {
        return Err(AuthError::InvalidCredentials.into());
    }
    validate_password(&request.new_password)?;
    let mut updated = user.clone();
    updated.password_hash = hash_password(&request.new_password)?;
    db.call(move |conn| Ok(queries::save_user(conn, &updated)?)).await?;
    info!(user_id = user.id, "password changed");
    Ok(())
}
