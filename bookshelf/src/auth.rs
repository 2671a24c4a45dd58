use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use paperclip::actix::Apiv2Security;

use crate::api::ErrorResponse;

/// Single username/password pair accepted by the protected routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "Admin".to_string(),
            password: "python".to_string(),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingHeader,

    #[error("Malformed basic authorization header")]
    Malformed,

    #[error("Invalid credentials for user {0}")]
    InvalidCredentials(String),

    #[error("Credentials are not configured")]
    NotConfigured,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AuthError::NotConfigured => HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Internal server error")),
            _ => HttpResponse::Unauthorized().json(ErrorResponse::new("Unauthorized access")),
        }
    }
}

/// Extractor guarding a handler with HTTP Basic authentication.
/// Rejects the request with 401 unless the header carries the configured [`Credentials`].
#[derive(Apiv2Security)]
#[openapi(
    apiKey,
    in = "header",
    name = "Authorization",
    description = "HTTP Basic credentials: 'Basic base64(username:password)'"
)]
pub struct BasicAuth {
    pub username: String,
}

impl BasicAuth {
    fn authenticate(req: &HttpRequest) -> Result<Self, AuthError> {
        let credentials = req.app_data::<Data<Credentials>>().ok_or_else(|| {
            tracing::error!("Credentials missing from application data");
            AuthError::NotConfigured
        })?;

        let header = req
            .headers()
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AuthError::Malformed)?;

        let (username, password) = decode_basic(header)?;
        if username != credentials.username || password != credentials.password {
            return Err(AuthError::InvalidCredentials(username));
        }

        Ok(Self { username })
    }
}

/// Splits `Basic <base64(username:password)>` into its username and password
fn decode_basic(header: &str) -> Result<(String, String), AuthError> {
    let (scheme, encoded) = header.trim().split_once(' ').ok_or(AuthError::Malformed)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(AuthError::Malformed);
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AuthError::Malformed)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::Malformed)?;

    // password may itself contain ':'
    let (username, password) = decoded.split_once(':').ok_or(AuthError::Malformed)?;
    Ok((username.to_string(), password.to_string()))
}

impl FromRequest for BasicAuth {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = Self::authenticate(req);
        if let Err(err) = &result {
            tracing::warn!("Rejected request to {}: {}", req.path(), err);
        }
        ready(result)
    }
}

#[cfg(test)]
mod auth_tests {
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use actix_web::ResponseError;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde_json::json;

    use super::{decode_basic, AuthError};

    #[test]
    fn decodes_basic_header() {
        let header = format!("Basic {}", STANDARD.encode("Admin:python"));
        assert_eq!(
            decode_basic(&header),
            Ok(("Admin".to_string(), "python".to_string()))
        );

        let lowercase_scheme = format!("basic {}", STANDARD.encode("Admin:py:thon"));
        assert_eq!(
            decode_basic(&lowercase_scheme),
            Ok(("Admin".to_string(), "py:thon".to_string()))
        );
    }

    #[test]
    fn rejects_malformed_headers() {
        let bearer = format!("Bearer {}", STANDARD.encode("Admin:python"));
        let no_colon = format!("Basic {}", STANDARD.encode("Admin"));
        for header in ["Basic", "Basic !!!notbase64", bearer.as_str(), no_colon.as_str()] {
            assert_eq!(decode_basic(header), Err(AuthError::Malformed), "{header}");
        }
    }

    #[actix_web::test]
    async fn every_rejection_has_the_same_body() {
        for err in [
            AuthError::MissingHeader,
            AuthError::Malformed,
            AuthError::InvalidCredentials("guest".to_string()),
        ] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
            let body = to_bytes(err.error_response().into_body()).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(body, json!({"error": "Unauthorized access"}));
        }
    }

    #[actix_web::test]
    async fn missing_credentials_config_is_a_server_error() {
        let err = AuthError::NotConfigured;
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"error": "Internal server error"}));
    }
}
