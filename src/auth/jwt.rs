use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};

use crate::web::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: i64,
}

impl UserClaims {
    pub fn new(user_id: uuid::Uuid, email: &str, role: UserRole, ttl: chrono::Duration) -> Self {
        Self {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            exp: (chrono::Utc::now() + ttl).timestamp(),
        }
    }
}

pub fn generate_token<K: AsRef<[u8]>>(
    claims: UserClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    let header = Header::default();
    let key = EncodingKey::from_secret(key.as_ref());

    let token = jsonwebtoken::encode(&header, &claims, &key)?;
    Ok(token)
}

pub fn process_token<K: AsRef<[u8]>>(
    token: &str,
    key: K,
) -> jsonwebtoken::errors::Result<TokenData<UserClaims>> {
    let validation = Validation::default();
    let key = DecodingKey::from_secret(key.as_ref());

    let claims = jsonwebtoken::decode::<UserClaims>(token, &key, &validation)?;
    Ok(claims)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn token_round_trip_test() {
        let id = uuid::Uuid::new_v4();
        let claims = UserClaims::new(id, "a@b.com", UserRole::Instructor, chrono::Duration::hours(1));
        let token = generate_token(claims, "secret").unwrap();

        let decoded = process_token(&token, "secret").unwrap().claims;
        assert_eq!(decoded.sub, id.to_string());
        assert_eq!(decoded.email, "a@b.com");
        assert_eq!(decoded.role, "instructor");
    }

    #[test]
    fn token_wrong_key_test() {
        let claims = UserClaims::new(
            uuid::Uuid::new_v4(),
            "a@b.com",
            UserRole::Student,
            chrono::Duration::hours(1),
        );
        let token = generate_token(claims, "secret").unwrap();
        assert!(process_token(&token, "other").is_err());
    }

    #[test]
    fn token_expired_test() {
        let claims = UserClaims::new(
            uuid::Uuid::new_v4(),
            "a@b.com",
            UserRole::Student,
            chrono::Duration::hours(-2),
        );
        let token = generate_token(claims, "secret").unwrap();
        assert!(process_token(&token, "secret").is_err());
    }

    #[test]
    fn token_garbage_test() {
        assert!(process_token("invalid-token", "secret").is_err());
    }
}
