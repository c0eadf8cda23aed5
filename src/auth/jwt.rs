use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use super::claims::{Claims, Subject};
use crate::{config::JwtConfig, error::AppError, state::AppState};

/// Signing and verification keys for session tokens. The server keeps no
/// token state; a token is valid until `exp`.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: Duration::from_secs((cfg.ttl_days.max(0) as u64) * 24 * 60 * 60),
        }
    }

    fn sign_with_ttl(
        &self,
        id: Uuid,
        subject: Subject,
        role: &str,
        ttl: TimeDuration,
    ) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + ttl;
        let claims = Claims {
            id,
            subject,
            role: role.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp().max(0) as usize,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(id = %id, role, "jwt signed");
        Ok(token)
    }

    pub fn sign(&self, id: Uuid, subject: Subject, role: &str) -> anyhow::Result<String> {
        self.sign_with_ttl(
            id,
            subject,
            role,
            TimeDuration::seconds(self.ttl.as_secs() as i64),
        )
    }

    /// Rejects a bad signature or an `exp` in the past (no leeway).
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            warn!(error = %e, "jwt rejected");
            AppError::InvalidOrExpiredToken
        })?;
        debug!(id = %data.claims.id, role = %data.claims.role, "jwt verified");
        Ok(data.claims)
    }
}
