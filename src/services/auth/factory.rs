//! Factory: build verifiers and route overrides from application `Config`.
use axum::http::{HeaderValue, header, request::Parts};
use serde_json::{Map, json};

use crate::config::{Config, KeySource};
use crate::middleware::auth::{ErrorBody, ErrorReply, RouteOverrides};
use crate::services::auth::jwt::{JwtVerifier, KeyError};

pub fn build_verifier(config: &Config) -> Result<JwtVerifier, KeyError> {
    let mut verifier = match &config.auth_key {
        KeySource::Hs256Secret(secret) => JwtVerifier::hs256(secret.as_bytes())?,
        KeySource::Ed25519Pem(pem) => JwtVerifier::ed25519_pem(pem)?,
    }
    .with_leeway(config.auth_leeway_seconds);

    if let Some(issuer) = &config.auth_issuer {
        verifier = verifier.with_issuer(issuer);
    }
    if let Some(audience) = &config.auth_audience {
        verifier = verifier.with_audience(audience);
    }

    Ok(verifier)
}

/// Overrides for the admin route: JSON errors with a `WWW-Authenticate`
/// challenge, and a stricter audience when `AUTH_ADMIN_AUDIENCE` is set.
pub fn build_admin_overrides(config: &Config) -> Result<RouteOverrides, KeyError> {
    let mut overrides = RouteOverrides::new().on_error(|_: &Parts, message: &str| {
        ErrorReply::new(ErrorBody::structured(Map::from_iter([(
            "error".to_string(),
            json!({ "code": "UNAUTHORIZED", "message": message }),
        )])))
        .header(
            header::WWW_AUTHENTICATE,
            HeaderValue::from_static("Bearer error=\"invalid_token\""),
        )
    });

    if let Some(audience) = &config.auth_admin_audience {
        overrides = overrides.on_verifying(build_verifier(config)?.with_audience(audience));
    }

    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::services::auth::Verifier;
    use jsonwebtoken::{EncodingKey, Header, get_current_timestamp};

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
    }

    fn sign(aud: &str) -> String {
        let claims = json!({"sub": "u1", "aud": aud, "exp": get_current_timestamp() + 600});
        jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(b"s3cret"))
            .unwrap()
    }

    #[tokio::test]
    async fn verifier_follows_configured_audience() {
        let config = config(&[("AUTH_JWT_SECRET", "s3cret"), ("AUTH_AUDIENCE", "api")]).unwrap();
        let verifier = build_verifier(&config).unwrap();

        let seed = verifier.on_verifying().await.unwrap();
        assert!(seed.clone().with_compact(sign("api")).verify().is_ok());
        assert!(seed.with_compact(sign("other")).verify().is_err());
    }

    #[test]
    fn admin_overrides_only_replace_verifier_when_configured() {
        let plain = config(&[("AUTH_JWT_SECRET", "s3cret")]).unwrap();
        let overrides = build_admin_overrides(&plain).unwrap();
        assert!(overrides.verifier().is_none());
        assert!(overrides.error_handler().is_some());

        let admin = config(&[("AUTH_JWT_SECRET", "s3cret"), ("AUTH_ADMIN_AUDIENCE", "admin")]).unwrap();
        let overrides = build_admin_overrides(&admin).unwrap();
        assert!(overrides.verifier().is_some());
    }
}
