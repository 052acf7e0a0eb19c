use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::UserId;

type HmacSha256 = Hmac<Sha256>;

/// Issues and checks bearer tokens of the form `<user_id>.<expires_unix>.<signature-hex>`.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token signature mismatch")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

impl TokenSigner {
    pub fn new(secret: Vec<u8>, ttl_minutes: i64) -> Self {
        Self {
            secret,
            ttl: Duration::minutes(ttl_minutes.max(1)),
        }
    }

    pub fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> (String, DateTime<Utc>) {
        let expires_at = now + self.ttl;
        let payload = format!("{}.{}", user_id.0, expires_at.timestamp());
        let signature = hex::encode(self.sign(payload.as_bytes()));
        (format!("{payload}.{signature}"), expires_at)
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let (payload, signature) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let (user_id, expires) = payload.split_once('.').ok_or(TokenError::Malformed)?;
        let user_id = user_id.parse::<u64>().map_err(|_| TokenError::Malformed)?;
        let expires = expires.parse::<i64>().map_err(|_| TokenError::Malformed)?;
        let expires_at = Utc
            .timestamp_opt(expires, 0)
            .single()
            .ok_or(TokenError::Malformed)?;

        if expires_at <= now {
            return Err(TokenError::Expired);
        }

        Ok(TokenClaims {
            user_id: UserId(user_id),
            expires_at,
        })
    }

    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC key size is always valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"0123456789abcdef0123456789abcdef".to_vec(), 60)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let signer = signer();
        let (token, expires_at) = signer.issue(UserId(7), now());
        let claims = signer.verify(&token, now()).expect("token verifies");
        assert_eq!(claims.user_id, UserId(7));
        assert_eq!(claims.expires_at, expires_at);
    }

    #[test]
    fn tampered_payload_fails_signature_check() {
        let signer = signer();
        let (token, _) = signer.issue(UserId(7), now());
        let forged = token.replacen('7', "8", 1);
        assert_eq!(signer.verify(&forged, now()), Err(TokenError::BadSignature));
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let (token, _) = signer().issue(UserId(1), now());
        let other = TokenSigner::new(b"another-secret-another-secret-xx".to_vec(), 60);
        assert_eq!(other.verify(&token, now()), Err(TokenError::BadSignature));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let signer = signer();
        let (token, _) = signer.issue(UserId(1), now());
        let later = now() + Duration::minutes(61);
        assert_eq!(signer.verify(&token, later), Err(TokenError::Expired));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(signer().verify("not-a-token", now()), Err(TokenError::Malformed));
        assert_eq!(signer().verify("1.2.zz", now()), Err(TokenError::Malformed));
    }
}
