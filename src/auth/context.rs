use crate::{auth::Claims, models::domain::profile::UserRole};

/// Caller identity handed to every service operation that needs authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: String,
    pub role: UserRole,
    pub class_label: String,
}

impl RequestContext {
    pub fn new(user_id: &str, role: UserRole, class_label: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            role,
            class_label: class_label.to_string(),
        }
    }

    pub fn student(user_id: &str, class_label: &str) -> Self {
        Self::new(user_id, UserRole::Student, class_label)
    }

    pub fn admin(user_id: &str) -> Self {
        Self::new(user_id, UserRole::Admin, "")
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&Claims> for RequestContext {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            role: claims.role,
            class_label: claims.class_label.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_from_claims_keeps_identity() {
        let claims = Claims {
            sub: "profile-1".to_string(),
            name: "Jane".to_string(),
            email: "jane@example.com".to_string(),
            role: UserRole::Admin,
            class_label: "staff".to_string(),
            iat: 0,
            exp: 9999999999,
        };

        let ctx = RequestContext::from(&claims);
        assert_eq!(ctx.user_id, "profile-1");
        assert!(ctx.is_admin());
        assert_eq!(ctx.class_label, "staff");
    }
}
