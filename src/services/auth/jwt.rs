//! `jsonwebtoken`-backed [`Verifier`] (HS256 or Ed25519).

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde_json::{Map, Value};
use thiserror::Error;

use super::token::{Claims, Token, TokenCheck, TokenResult, Verifier, VerifyError};

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid ed25519 public key pem: {0}")]
    InvalidPem(#[source] jsonwebtoken::errors::Error),
    #[error("empty hs256 secret")]
    EmptySecret,
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidIssuer => Self::InvalidIssuer,
            ErrorKind::InvalidAudience => Self::InvalidAudience,
            ErrorKind::MissingRequiredClaim(claim) if claim == "aud" => Self::InvalidAudience,
            ErrorKind::MissingRequiredClaim(claim) if claim == "iss" => Self::InvalidIssuer,
            _ => Self::Invalid(e.to_string()),
        }
    }
}

struct JwtCheck {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCheck for JwtCheck {
    fn check(&self, compact: &str) -> TokenResult {
        let data = jsonwebtoken::decode::<Map<String, Value>>(
            compact,
            &self.decoding_key,
            &self.validation,
        )?;

        Ok(Claims::new(data.claims))
    }
}

/// JWT verifier backed by `jsonwebtoken`.
///
/// - `exp` is always required; `iss`/`aud` are checked only when configured.
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct JwtVerifier {
    check: Arc<JwtCheck>,
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("validation", &self.check.validation)
            .finish()
    }
}

impl JwtVerifier {
    pub fn hs256(secret: &[u8]) -> Result<Self, KeyError> {
        if secret.is_empty() {
            return Err(KeyError::EmptySecret);
        }
        Ok(Self::with_key(
            DecodingKey::from_secret(secret),
            Algorithm::HS256,
        ))
    }

    /// EdDSA (Ed25519) verifier from a SPKI public key PEM.
    pub fn ed25519_pem(public_key_pem: &str) -> Result<Self, KeyError> {
        let decoding_key =
            DecodingKey::from_ed_pem(public_key_pem.as_bytes()).map_err(KeyError::InvalidPem)?;
        Ok(Self::with_key(decoding_key, Algorithm::EdDSA))
    }

    fn with_key(decoding_key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        // Audience is opt-in; see `with_audience`.
        validation.validate_aud = false;

        Self {
            check: Arc::new(JwtCheck {
                decoding_key,
                validation,
            }),
        }
    }

    fn update(mut self, f: impl FnOnce(&mut Validation)) -> Self {
        let mut validation = self.check.validation.clone();
        f(&mut validation);
        self.check = Arc::new(JwtCheck {
            decoding_key: self.check.decoding_key.clone(),
            validation,
        });
        self
    }

    pub fn with_issuer(self, issuer: &str) -> Self {
        self.update(|v| {
            v.set_issuer(&[issuer]);
            v.required_spec_claims.insert("iss".to_string());
        })
    }

    pub fn with_audience(self, audience: &str) -> Self {
        self.update(|v| {
            v.set_audience(&[audience]);
            v.validate_aud = true;
            v.required_spec_claims.insert("aud".to_string());
        })
    }

    pub fn with_leeway(self, leeway_seconds: u64) -> Self {
        self.update(|v| v.leeway = leeway_seconds)
    }
}

#[async_trait]
impl Verifier for JwtVerifier {
    async fn on_verifying(&self) -> Result<Token, VerifyError> {
        Ok(Token::from_check(self.check.clone()))
    }
}
