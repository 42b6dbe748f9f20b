//! JWT bearer authentication for the buyer-facing routes.
//!
//! The storefront issues short-lived HS256 tokens when buyers log in; this server only verifies them. The shared
//! secret comes from `DPG_JWT_SECRET`. Handlers take a [`JwtClaims`] argument and actix resolves it from the
//! `Authorization: Bearer ...` header via the [`FromRequest`] impl below.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The user id of the logged-in buyer.
    pub sub: String,
    /// The buyer's email, forwarded to the gateway when initializing charges.
    pub email: String,
    /// Expiry as a unix timestamp. Validated on every request.
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self { encoding_key: EncodingKey::from_secret(secret), decoding_key: DecodingKey::from_secret(secret) }
    }

    pub fn issue_token(&self, claims: JwtClaims) -> Result<String, ServerError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServerError::CouldNotSerializeAccessToken(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        Ok(data.claims)
    }
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req))
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, ServerError> {
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| ServerError::InitializeError("No TokenIssuer has been configured on the server".to_string()))?;
    let header = req.headers().get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected a Bearer token".to_string()))?;
    let claims = issuer.verify_token(token)?;
    Ok(claims)
}
