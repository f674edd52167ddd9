pub mod authoring_service;
pub mod countdown;
pub mod delivery_service;
pub mod grading;
pub mod profile_service;
pub mod quiz_service;
pub mod results_service;
pub mod shuffle;
pub mod stats_service;

pub use authoring_service::AuthoringService;
pub use delivery_service::DeliveryService;
pub use profile_service::ProfileService;
pub use quiz_service::QuizService;
pub use results_service::ResultsService;
pub use stats_service::StatsService;
