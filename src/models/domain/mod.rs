pub mod attempt;
pub mod profile;
pub mod question;
pub mod quiz;
pub mod student_answer;

pub use attempt::{Attempt, AttemptSubmission, DeliveryState, SubmitReason};
pub use profile::{Profile, UserRole};
pub use question::{Question, QuestionType};
pub use quiz::Quiz;
pub use student_answer::StudentAnswer;
