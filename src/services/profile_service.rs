use std::sync::Arc;

use secrecy::ExposeSecret;
use validator::Validate;

use crate::{
    auth::{hash_password, verify_password, JwtService, RequestContext},
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::{Profile, UserRole},
        dto::{
            request::{LoginRequest, RegisterRequest},
            response::{AuthResponse, ProfileDto},
        },
    },
    repositories::ProfileRepository,
};

pub struct ProfileService {
    repository: Arc<dyn ProfileRepository>,
    jwt: JwtService,
}

impl ProfileService {
    pub fn new(repository: Arc<dyn ProfileRepository>, jwt: JwtService) -> Self {
        Self { repository, jwt }
    }

    /// Self-registration always yields a student profile.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        request.validate()?;

        if self.repository.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "Profile with email '{}' already exists",
                request.email.trim().to_lowercase()
            )));
        }

        let password_hash = hash_password(&request.password)?;
        let profile = Profile::new(
            &request.name,
            &request.email,
            &password_hash,
            UserRole::Student,
            &request.class_label,
        );

        let profile = self.repository.create(profile).await.map_err(|e| {
            log::error!("Failed to create profile: {}", e);
            e
        })?;
        log::info!("Registered student {} in class {}", profile.id, profile.class_label);

        self.issue(profile)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        request.validate()?;

        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let profile = self
            .repository
            .find_by_email(&request.email)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&request.password, &profile.password_hash)? {
            log::warn!("Failed login for {}", profile.id);
            return Err(invalid());
        }

        self.issue(profile)
    }

    pub async fn me(&self, ctx: &RequestContext) -> AppResult<ProfileDto> {
        self.repository
            .find_by_id(&ctx.user_id)
            .await?
            .map(ProfileDto::from)
            .ok_or_else(|| AppError::NotFound(format!("Profile '{}' not found", ctx.user_id)))
    }

    /// Creates the configured admin on first start. A no-op when no admin
    /// credentials are configured or the email is already taken.
    pub async fn seed_admin(&self, config: &Config) -> AppResult<Option<Profile>> {
        let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
            return Ok(None);
        };

        if self.repository.find_by_email(email).await?.is_some() {
            return Ok(None);
        }

        log::info!("Seeding admin profile: {}", email);
        let password_hash = hash_password(password.expose_secret())?;
        let profile = Profile::new(
            &config.admin_name,
            email,
            &password_hash,
            UserRole::Admin,
            &config.admin_class_label,
        );

        let profile = self.repository.create(profile).await?;
        log::info!("Admin profile created successfully.");
        Ok(Some(profile))
    }

    fn issue(&self, profile: Profile) -> AppResult<AuthResponse> {
        let token = self.jwt.create_token(&profile)?;
        Ok(AuthResponse {
            token,
            expires_in_hours: self.jwt.expiration_hours(),
            profile: ProfileDto::from(profile),
        })
    }
}
