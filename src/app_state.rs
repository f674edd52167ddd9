use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        AttemptRepository, MongoAttemptRepository, MongoProfileRepository, MongoQuizRepository,
        ProfileRepository, QuizRepository,
    },
    services::{
        AuthoringService, DeliveryService, ProfileService, QuizService, ResultsService,
        StatsService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub profile_service: Arc<ProfileService>,
    pub quiz_service: Arc<QuizService>,
    pub authoring_service: Arc<AuthoringService>,
    pub delivery_service: DeliveryService,
    pub results_service: Arc<ResultsService>,
    pub stats_service: Arc<StatsService>,
    pub jwt_service: JwtService,
    pub db: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let profile_repository = Arc::new(MongoProfileRepository::new(&db));
        profile_repository.ensure_indexes().await?;

        let quiz_repository = Arc::new(MongoQuizRepository::new(&db));
        quiz_repository.ensure_indexes().await?;

        let attempt_repository = Arc::new(MongoAttemptRepository::new(&db));
        attempt_repository.ensure_indexes().await?;

        let mut state = Self::from_repositories(
            config,
            profile_repository,
            quiz_repository,
            attempt_repository,
        );
        state.profile_service.seed_admin(&state.config).await?;
        state.db = Some(db);

        Ok(state)
    }

    /// Wires the services over any repository implementation. No database
    /// handle is attached, so readiness checks report not ready.
    pub fn from_repositories(
        config: Config,
        profiles: Arc<dyn ProfileRepository>,
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);

        Self {
            profile_service: Arc::new(ProfileService::new(profiles, jwt_service.clone())),
            quiz_service: Arc::new(QuizService::new(quizzes.clone(), attempts.clone())),
            authoring_service: Arc::new(AuthoringService::new(quizzes.clone())),
            delivery_service: DeliveryService::new(quizzes.clone(), attempts.clone()),
            results_service: Arc::new(ResultsService::new(quizzes.clone(), attempts.clone())),
            stats_service: Arc::new(StatsService::new(quizzes, attempts)),
            jwt_service,
            db: None,
            config: Arc::new(config),
        }
    }
}
