//! Verification delegate contract.
//!
//! The filter never performs cryptography itself. It asks a [`Verifier`] for an
//! unverified [`Token`] seed, attaches the raw bearer credential to it and runs
//! the seed's [`TokenCheck`]. Whatever happens inside the check (signature,
//! expiry, claim rules) is opaque here; only the outcome matters.

use std::{any::Any, fmt, panic::AssertUnwindSafe, sync::Arc};

use async_trait::async_trait;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Outcome of verifying one credential.
pub type TokenResult = Result<Claims, VerifyError>;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// No usable `Authorization: Bearer` header on the request.
    #[error("Unauthorized")]
    MissingCredential,
    #[error("expired")]
    Expired,
    #[error("not yet valid")]
    NotYetValid,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid issuer")]
    InvalidIssuer,
    #[error("invalid audience")]
    InvalidAudience,
    #[error("invalid token: {0}")]
    Invalid(String),
    /// Free-form rejection reported by a custom delegate, surfaced verbatim.
    #[error("{0}")]
    Rejected(String),
    /// The delegate panicked. The panic message is logged, not sent to the client.
    #[error("verification failed")]
    Panicked,
}

impl VerifyError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Claims of a verified token, as seen by downstream handlers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// `sub` when it is a string.
    pub fn subject(&self) -> Option<&str> {
        self.0.get("sub").and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(claims: Map<String, Value>) -> Self {
        Self(claims)
    }
}

/// The verification step applied to a compact credential.
pub trait TokenCheck: Send + Sync {
    fn check(&self, compact: &str) -> TokenResult;
}

impl<F> TokenCheck for F
where
    F: Fn(&str) -> TokenResult + Send + Sync,
{
    fn check(&self, compact: &str) -> TokenResult {
        self(compact)
    }
}

/// Unverified token seed produced by a [`Verifier`].
#[derive(Clone)]
pub struct Token {
    check: Arc<dyn TokenCheck>,
    compact: Option<String>,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the credential
        f.debug_struct("Token")
            .field("has_compact", &self.compact.is_some())
            .finish()
    }
}

impl Token {
    pub fn new(check: impl TokenCheck + 'static) -> Self {
        Self::from_check(Arc::new(check))
    }

    pub fn from_check(check: Arc<dyn TokenCheck>) -> Self {
        Self {
            check,
            compact: None,
        }
    }

    /// Attach the raw credential the check will run against.
    pub fn with_compact(mut self, compact: impl Into<String>) -> Self {
        self.compact = Some(compact.into());
        self
    }

    pub fn compact(&self) -> Option<&str> {
        self.compact.as_deref()
    }

    pub fn verify(&self) -> TokenResult {
        match self.compact.as_deref() {
            Some(compact) => self.check.check(compact),
            None => Err(VerifyError::MissingCredential),
        }
    }
}

/// Produces the token seed a credential is verified against.
///
/// Implemented for plain closures, so a delegate can be as small as
/// `|| Ok(Token::new(check))`.
#[async_trait]
pub trait Verifier: Send + Sync + 'static {
    async fn on_verifying(&self) -> Result<Token, VerifyError>;
}

#[async_trait]
impl<F> Verifier for F
where
    F: Fn() -> Result<Token, VerifyError> + Send + Sync + 'static,
{
    async fn on_verifying(&self) -> Result<Token, VerifyError> {
        self()
    }
}

/// Sequence one verification: seed, attach, check.
///
/// A missing credential short-circuits without calling the verifier. A panic in
/// the verifier or the check is caught and reported as [`VerifyError::Panicked`].
pub async fn verify_credential(verifier: &dyn Verifier, credential: Option<&str>) -> TokenResult {
    let Some(credential) = credential else {
        return Err(VerifyError::MissingCredential);
    };

    let attempt = async {
        verifier
            .on_verifying()
            .await
            .and_then(|seed| seed.with_compact(credential).verify())
    };

    match AssertUnwindSafe(attempt).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            tracing::error!(panic = %panic_message(&*panic), "token verifier panicked");
            Err(VerifyError::Panicked)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
