use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::profile::{Profile, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (profile id)
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub class_label: String,
    pub exp: usize, // Expiration time (as UTC timestamp)
    pub iat: usize, // Issued at (as UTC timestamp)
}

impl Claims {
    pub fn new(profile: &Profile, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours);

        Self {
            sub: profile.id.clone(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            role: profile.role,
            class_label: profile.class_label.clone(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let profile = Profile::new("John Doe", "john@example.com", "hash", UserRole::Student, "10A");
        let claims = Claims::new(&profile, 24);

        assert_eq!(claims.sub, profile.id);
        assert_eq!(claims.email, "john@example.com");
        assert_eq!(claims.role, UserRole::Student);
        assert_eq!(claims.class_label, "10A");
        assert!(claims.exp > claims.iat);
    }
}
