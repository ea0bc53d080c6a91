/// HTTP middleware for the forum content service
///
/// Session lookup is an external concern; this middleware consumes it as a
/// capability by validating the bearer token and exposing the resulting
/// `CurrentUser { username, privilege_level }` to handlers via request
/// extensions and a `FromRequest` extractor.
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{error::ErrorUnauthorized, Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;
use jsonwebtoken::{decode, DecodingKey, Validation};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use std::rc::Rc;

static DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

/// Install the session-token validation key. Called once at startup.
pub fn init_validation_key(secret: &str) {
    let _ = DECODING_KEY.set(DecodingKey::from_secret(secret.as_bytes()));
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Username of the session owner.
    sub: String,
    /// Privilege level; > 0 denotes moderator/admin capability.
    #[serde(default)]
    privilege_level: i32,
    exp: usize,
}

/// Authenticated session user stored in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
    pub privilege_level: i32,
}

fn validate_token(token: &str) -> Result<Claims, Error> {
    let key = DECODING_KEY
        .get()
        .ok_or_else(|| ErrorUnauthorized("Session validation key not configured"))?;

    let data = decode::<Claims>(token, key, &Validation::default())
        .map_err(|_| ErrorUnauthorized("Invalid or expired token"))?;

    Ok(data.claims)
}

/// Actix middleware that validates a Bearer token and attaches the session
/// user to the request.
pub struct SessionAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for SessionAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let auth_header = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| ErrorUnauthorized("Missing Authorization header"))?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| ErrorUnauthorized("Invalid Authorization scheme"))?;

            let claims = validate_token(token)?;

            req.extensions_mut().insert(CurrentUser {
                username: claims.sub,
                privilege_level: claims.privilege_level,
            });

            service.call(req).await
        })
    }
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<CurrentUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Session user missing")),
        )
    }
}
