use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use marketplace_shared::UserRole;
use std::{
    future::{ready, Ready},
    rc::Rc,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::services::Actor;
use crate::utils::jwt::{Claims, JwtService};

/// Authenticated caller extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub claims: Claims,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Claims) -> Result<Self, AppError> {
        Ok(Self {
            user_id: claims.user_id()?,
            email: claims.email.clone(),
            role: claims.role,
            claims,
        })
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Claims set by [`AuthMiddleware`] are reused; otherwise the token is
/// validated here against the app's [`JwtService`].
impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    if let Some(claims) = req.extensions().get::<Claims>().cloned() {
        return AuthenticatedUser::from_claims(claims);
    }

    let token = bearer_token(req)
        .ok_or_else(|| AppError::Authentication("Authorization token is required".to_string()))?;
    let jwt_service = req
        .app_data::<web::Data<JwtService>>()
        .ok_or_else(|| AppError::Internal("JWT service is not configured".to_string()))?;
    let claims = jwt_service.validate_token(token)?;
    req.extensions_mut().insert(claims.clone());
    AuthenticatedUser::from_claims(claims)
}

/// Rejects requests without a valid token, optionally gating on a role.
pub struct AuthMiddleware {
    jwt_service: Rc<JwtService>,
    required_role: Option<UserRole>,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self {
            jwt_service: Rc::new(jwt_service),
            required_role: None,
        }
    }

    pub fn require_role(mut self, role: UserRole) -> Self {
        self.required_role = Some(role);
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<actix_web::body::EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            jwt_service: self.jwt_service.clone(),
            required_role: self.required_role,
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    jwt_service: Rc<JwtService>,
    required_role: Option<UserRole>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<actix_web::body::EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let jwt_service = self.jwt_service.clone();
        let required_role = self.required_role;

        Box::pin(async move {
            let claims = match bearer_token(req.request()) {
                Some(token) => jwt_service.validate_token(token),
                None => Err(AppError::Authentication("Authorization token is required".to_string())),
            };

            let claims = match claims {
                Ok(claims) => claims,
                Err(err) => return Ok(req.into_response(err.error_response()).map_into_right_body()),
            };

            if let Some(required_role) = required_role {
                if !UserRole::satisfies(required_role, claims.role) {
                    let err = AppError::Authorization(format!("This action requires the {} role", required_role));
                    return Ok(req.into_response(err.error_response()).map_into_right_body());
                }
            }

            req.extensions_mut().insert(claims);
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{get, test, App, HttpResponse};

    const SECRET: &str = "middleware-test-secret-0123456789abcdef";

    #[get("/whoami")]
    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().json(serde_json::json!({ "role": user.role }))
    }

    #[actix_web::test]
    async fn role_gate_and_extractor() {
        let jwt = JwtService::new(SECRET, 5).unwrap();
        let app = test::init_service(
            App::new().app_data(web::Data::new(jwt.clone())).service(
                web::scope("/admin")
                    .wrap(AuthMiddleware::new(jwt.clone()).require_role(UserRole::Admin))
                    .service(whoami),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/admin/whoami").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);

        let seller = jwt.generate_access_token(Uuid::new_v4(), "s@example.com", UserRole::Seller).unwrap();
        let req = test::TestRequest::get()
            .uri("/admin/whoami")
            .insert_header(("Authorization", format!("Bearer {}", seller)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 403);

        let admin = jwt.generate_access_token(Uuid::new_v4(), "a@example.com", UserRole::Admin).unwrap();
        let req = test::TestRequest::get()
            .uri("/admin/whoami")
            .insert_header(("Authorization", format!("Bearer {}", admin)))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["role"], "admin");
    }

    #[actix_web::test]
    async fn extractor_without_middleware() {
        let jwt = JwtService::new(SECRET, 5).unwrap();
        let app = test::init_service(App::new().app_data(web::Data::new(jwt.clone())).service(whoami)).await;

        let req = test::TestRequest::get().uri("/whoami").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);

        let token = jwt.generate_access_token(Uuid::new_v4(), "c@example.com", UserRole::Customer).unwrap();
        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["role"], "customer");
    }
}
