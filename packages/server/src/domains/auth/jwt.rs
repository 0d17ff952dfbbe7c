use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims - data carried by identity provider tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,    // Subject (identity id, doubles as profile id)
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>, // Display name hint
    pub exp: i64,     // Expiration timestamp
    pub iat: i64,     // Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// JWT Service - verifies provider tokens (HS256 shared secret)
///
/// Tokens are issued by the identity provider. `create_token` mints
/// equivalent tokens for the admin CLI and tests.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
}

impl JwtService {
    /// Create new JWT service. With an issuer set, tokens must carry a matching `iss`.
    pub fn new(secret: &str, issuer: Option<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
        }
    }

    /// Create a token for an identity
    ///
    /// Token expires after 24 hours
    pub fn create_token(&self, identity: Uuid, email: &str, name: Option<&str>) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::hours(24);

        let claims = Claims {
            sub: identity,
            email: email.to_string(),
            name: name.map(String::from),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(Into::into)
    }

    /// Verify and decode a token
    ///
    /// Returns claims if the signature is valid and the token is not expired
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        // Provider tokens carry an audience we don't pin
        validation.validate_aud = false;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_verify_token() {
        let service = JwtService::new("test_secret_key", Some("test_issuer".to_string()));
        let identity = Uuid::new_v4();

        let token = service
            .create_token(identity, "ana@news.example", Some("Ana"))
            .unwrap();

        let claims = service.verify_token(&token).unwrap();
        assert_eq!(claims.sub, identity);
        assert_eq!(claims.email, "ana@news.example");
        assert_eq!(claims.name.as_deref(), Some("Ana"));
        assert_eq!(claims.iss.as_deref(), Some("test_issuer"));
    }

    #[test]
    fn test_invalid_token() {
        let service = JwtService::new("test_secret_key", None);
        assert!(service.verify_token("invalid_token").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let service1 = JwtService::new("secret1", None);
        let service2 = JwtService::new("secret2", None);

        let token = service1
            .create_token(Uuid::new_v4(), "ana@news.example", None)
            .unwrap();

        assert!(service2.verify_token(&token).is_err());
    }

    #[test]
    fn test_issuer_mismatch_is_rejected() {
        let minted = JwtService::new("shared", Some("someone-else".to_string()));
        let verifier = JwtService::new("shared", Some("newsroom".to_string()));

        let token = minted
            .create_token(Uuid::new_v4(), "ana@news.example", None)
            .unwrap();

        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn test_expiry_is_a_day_out() {
        let service = JwtService::new("test_secret_key", None);
        let token = service
            .create_token(Uuid::new_v4(), "ana@news.example", None)
            .unwrap();

        let claims = service.verify_token(&token).unwrap();

        let now = chrono::Utc::now().timestamp();
        let expires_in = claims.exp - now;
        assert!(expires_in > 23 * 3600);
        assert!(expires_in <= 24 * 3600);
    }
}
