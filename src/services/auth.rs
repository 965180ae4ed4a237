// src/services/auth.rs

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{common::error::AppError, models::auth::Claims};

// Os tokens são emitidos pelo provedor de identidade; aqui só validamos.
#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("Token rejeitado: {}", e);
            AppError::InvalidToken
        })?;

        Ok(token_data.claims)
    }
}

// Emissão de tokens só existe para os testes (o provedor real é externo)
#[cfg(test)]
pub(crate) mod test_tokens {
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    use crate::models::auth::Claims;

    pub const TEST_SECRET: &str = "segredo-de-teste";

    pub fn claims(organizations: Vec<Uuid>, permissions: &[&str]) -> Claims {
        let now = Utc::now();
        Claims {
            sub: Uuid::new_v4(),
            email: Some("archivista@empresa.co".to_string()),
            organizations,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            exp: (now + chrono::Duration::hours(1)).timestamp() as usize,
            iat: now.timestamp() as usize,
        }
    }

    pub fn issue(claims: &Claims, secret: &str) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_tokens::{claims, issue, TEST_SECRET};
    use super::*;
    use uuid::Uuid;

    #[test]
    fn accepts_tokens_signed_with_the_secret() {
        let org = Uuid::new_v4();
        let original = claims(vec![org], &["archive:write"]);
        let token = issue(&original, TEST_SECRET);

        let validated = AuthService::new(TEST_SECRET).validate_token(&token).unwrap();
        assert_eq!(validated.sub, original.sub);
        assert!(validated.can_access(org));
        assert!(validated.has_permission("archive:write"));
        assert!(!validated.has_permission("settings:write"));
    }

    #[test]
    fn rejects_foreign_signatures_and_garbage() {
        let token = issue(&claims(vec![], &[]), "outro-segredo");
        let service = AuthService::new(TEST_SECRET);
        assert!(matches!(service.validate_token(&token), Err(AppError::InvalidToken)));
        assert!(matches!(service.validate_token("abc.def"), Err(AppError::InvalidToken)));
    }

    #[test]
    fn rejects_expired_tokens() {
        let mut expired = claims(vec![], &[]);
        expired.exp = (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as usize;
        let token = issue(&expired, TEST_SECRET);
        assert!(AuthService::new(TEST_SECRET).validate_token(&token).is_err());
    }
}
