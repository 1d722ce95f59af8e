use crate::domain_model::{AccessToken, IssuedAccessToken, UserId};
use crate::domain_port::{Clock, IssuerError, TokenIssuer, expires_after};
use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub signing_key: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String, // user id as string
    pub admin: bool,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
    pub jti: String, // makes every minted token distinct
}

pub struct JwtHs256Issuer {
    cfg: JwtConfig,
    clock: Arc<dyn Clock>,
}

impl JwtHs256Issuer {
    pub fn new(cfg: JwtConfig, clock: Arc<dyn Clock>) -> Self {
        JwtHs256Issuer { cfg, clock }
    }

    /// Signature, issuer, audience and expiry check.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, IssuerError> {
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = true;
        v.set_audience(&[self.cfg.audience.clone()]);
        v.set_issuer(&[self.cfg.issuer.clone()]);
        let data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(&self.cfg.signing_key),
            &v,
        )
        .map_err(|e| IssuerError::Invalid(e.to_string()))?;
        Ok(data.claims)
    }
}

impl TokenIssuer for JwtHs256Issuer {
    fn mint(&self, user_id: UserId, is_admin: bool) -> Result<IssuedAccessToken, IssuerError> {
        let iat_dt = self.clock.now();
        let exp_dt = expires_after(iat_dt, self.cfg.access_ttl);
        let claims = AccessClaims {
            sub: user_id.to_string(),
            admin: is_admin,
            exp: exp_dt.timestamp(),
            iat: iat_dt.timestamp(),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.cfg.signing_key),
        )
        .map_err(|e| IssuerError::Signing(e.to_string()))?;

        Ok(IssuedAccessToken {
            token: AccessToken(token),
            expires_at: exp_dt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::SystemClock;
    use chrono::{DateTime, Utc};

    fn cfg(key: &str) -> JwtConfig {
        JwtConfig {
            issuer: "turnstile.test".into(),
            audience: "api-client".into(),
            access_ttl: Duration::hours(1),
            signing_key: key.as_bytes().to_vec(),
        }
    }

    #[test]
    fn minted_token_carries_user_and_privilege() {
        let issuer = JwtHs256Issuer::new(cfg("k1"), Arc::new(SystemClock));
        let user = UserId::new_random();
        let issued = issuer.mint(user, true).unwrap();

        let claims = issuer.verify(issued.token.as_str()).unwrap();
        assert_eq!(claims.sub, user.to_string());
        assert!(claims.admin);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn tokens_minted_back_to_back_differ() {
        let issuer = JwtHs256Issuer::new(cfg("k1"), Arc::new(SystemClock));
        let user = UserId::new_random();
        let a = issuer.mint(user, false).unwrap();
        let b = issuer.mint(user, false).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn unbounded_lifetime_clamps_the_expiry() {
        let mut config = cfg("k1");
        config.access_ttl = Duration::MAX;
        let issuer = JwtHs256Issuer::new(config, Arc::new(SystemClock));
        let issued = issuer.mint(UserId::new_random(), false).unwrap();
        assert_eq!(issued.expires_at, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let ours = JwtHs256Issuer::new(cfg("k1"), Arc::new(SystemClock));
        let theirs = JwtHs256Issuer::new(cfg("k2"), Arc::new(SystemClock));
        let issued = theirs.mint(UserId::new_random(), false).unwrap();
        assert!(matches!(
            ours.verify(issued.token.as_str()),
            Err(IssuerError::Invalid(_))
        ));
    }
}
