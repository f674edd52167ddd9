pub mod claims;
pub mod context;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod utils;

pub use claims::Claims;
pub use context::RequestContext;
pub use jwt::JwtService;
pub use middleware::{AuthMiddleware, AuthenticatedUser};
pub use password::{hash_password, verify_password};
pub use utils::{
    can_view_attempt, can_view_quiz, extract_request_context, require_admin, require_quiz_owner,
    require_quiz_visible,
};
