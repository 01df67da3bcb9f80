pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::documents::handlers as documents;
use crate::employers::handlers as employers;
use crate::profile::{achievements, educations, experiences};
use crate::state::AppState;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        // Users
        .route(
            "/api/v1/users/me",
            get(users::handle_me).put(users::handle_update_me),
        )
        // Profile
        .route(
            "/api/v1/profile/experiences",
            get(experiences::handle_list).post(experiences::handle_create),
        )
        .route(
            "/api/v1/profile/experiences/:id",
            get(experiences::handle_get)
                .put(experiences::handle_update)
                .delete(experiences::handle_delete),
        )
        .route(
            "/api/v1/profile/educations",
            get(educations::handle_list).post(educations::handle_create),
        )
        .route(
            "/api/v1/profile/educations/:id",
            get(educations::handle_get)
                .put(educations::handle_update)
                .delete(educations::handle_delete),
        )
        .route(
            "/api/v1/profile/achievements",
            get(achievements::handle_list).post(achievements::handle_create),
        )
        .route(
            "/api/v1/profile/achievements/:id",
            get(achievements::handle_get)
                .put(achievements::handle_update)
                .delete(achievements::handle_delete),
        )
        // Documents
        .route(
            "/api/v1/documents",
            get(documents::handle_list).post(documents::handle_create),
        )
        .route("/api/v1/documents/generate", post(documents::handle_generate))
        .route(
            "/api/v1/documents/:id",
            get(documents::handle_get)
                .put(documents::handle_update)
                .delete(documents::handle_delete),
        )
        // Employers
        .route("/api/v1/employers", get(employers::handle_list))
        .route("/api/v1/employers/scrape", post(employers::handle_scrape))
        .route("/api/v1/employers/:id", get(employers::handle_get))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::auth::password::fast_password_service;
    use crate::auth::store::memory::{InMemoryUserStore, UnavailableUserStore};
    use crate::auth::token::test_auth_config;
    use crate::auth::{CurrentUser, UserStore, VerifiedUser};
    use crate::config::Config;
    use crate::models::user::UserResponse;

    fn test_state(users: Arc<dyn UserStore>, auto_verify_accounts: bool) -> AppState {
        let config = Config {
            database_url: "postgres://localhost/cv_tailor_test".to_string(),
            auth: test_auth_config(),
            auto_verify_accounts,
            cors_origins: Vec::new(),
            debug: false,
            port: 0,
            rust_log: "debug".to_string(),
        };
        // Never connects: the routes exercised here only touch the user store.
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        AppState::new(db, config, users, fast_password_service())
    }

    fn test_app() -> (Router, Arc<InMemoryUserStore>) {
        let store = Arc::new(InMemoryUserStore::default());
        (build_router(test_state(store.clone(), true)), store)
    }

    /// Full router plus two routes guarded by the other requirement levels.
    fn app_with_levels(auto_verify_accounts: bool) -> (Router, Arc<InMemoryUserStore>) {
        let store = Arc::new(InMemoryUserStore::default());
        let state = test_state(store.clone(), auto_verify_accounts);
        let levels = Router::new()
            .route(
                "/levels/any",
                get(|CurrentUser(user): CurrentUser| async move {
                    axum::Json(UserResponse::from(user))
                }),
            )
            .route(
                "/levels/verified",
                get(|VerifiedUser(user): VerifiedUser| async move {
                    axum::Json(UserResponse::from(user))
                }),
            )
            .with_state(state.clone());
        (build_router(state).merge(levels), store)
    }

    fn get_with_token(uri: &str, token: &str) -> Request<Body> {
        Request::get(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn register_request(email: &str, password: &str) -> Request<Body> {
        let payload = json!({
            "email": email,
            "password": password,
            "first_name": "John",
            "last_name": "Doe"
        });
        Request::post("/api/v1/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    }

    fn login_request(email: &str, password: &str) -> Request<Body> {
        let form = format!(
            "username={}&password={}",
            email.replace('@', "%40"),
            password
        );
        Request::post("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap()
    }

    fn me_request(token: Option<&str>) -> Request<Body> {
        let mut builder = Request::get("/api/v1/users/me");
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn register_and_login(app: &Router, email: &str, password: &str) -> (String, String) {
        let resp = app
            .clone()
            .oneshot(register_request(email, password))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let user = body_json(resp).await;

        let resp = app
            .clone()
            .oneshot(login_request(email, password))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let token = body_json(resp).await;
        assert_eq!(token["token_type"], "bearer");

        (
            user["id"].as_str().unwrap().to_string(),
            token["access_token"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = test_app();
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_register_response_hides_password_hash() {
        let (app, _) = test_app();
        let resp = app.oneshot(register_request("a@x.com", "secret1")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["email"], "a@x.com");
        assert_eq!(body["is_active"], true);
        assert_eq!(body["is_verified"], true);
        assert_eq!(body["subscription_status"], "free");
        assert!(body.get("hashed_password").is_none());
        assert!(!body.to_string().contains("secret1"));
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_409() {
        let (app, _) = test_app();
        let first = app.clone().oneshot(register_request("a@x.com", "secret1")).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(register_request("a@x.com", "secret1")).await.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(second).await["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_login_then_me() {
        let (app, _) = test_app();
        let (id, token) = register_and_login(&app, "a@x.com", "secret1").await;

        let resp = app.oneshot(me_request(Some(&token))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let me = body_json(resp).await;
        assert_eq!(me["email"], "a@x.com");
        assert_eq!(me["id"], id.as_str());
    }

    #[tokio::test]
    async fn test_wrong_password_is_401() {
        let (app, _) = test_app();
        register_and_login(&app, "a@x.com", "secret1").await;

        let resp = app.oneshot(login_request("a@x.com", "wrong")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(resp).await["error"]["message"],
            "Incorrect email or password"
        );
    }

    #[tokio::test]
    async fn test_missing_or_garbage_token_is_401_with_challenge() {
        let (app, _) = test_app();

        let resp = app.clone().oneshot(me_request(None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");

        let resp = app.oneshot(me_request(Some("garbage"))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_deactivated_mid_session_is_403() {
        let (app, store) = test_app();
        let (id, token) = register_and_login(&app, "a@x.com", "secret1").await;

        let mut user = store.find_by_id(&id).await.unwrap().unwrap();
        user.is_active = false;
        store.update(&user).await.unwrap();

        let resp = app.oneshot(me_request(Some(&token))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(resp).await["error"]["message"], "Inactive user");
    }

    #[tokio::test]
    async fn test_deleted_account_token_is_401() {
        let (app, store) = test_app();
        let (id, token) = register_and_login(&app, "a@x.com", "secret1").await;

        store.remove(&id);

        let resp = app.oneshot(me_request(Some(&token))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_me_and_email_conflict() {
        let (app, _) = test_app();
        register_and_login(&app, "b@x.com", "secret1").await;
        let (_, token) = register_and_login(&app, "a@x.com", "secret1").await;

        let rename = Request::put("/api/v1/users/me")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "first_name": "Jane" }).to_string()))
            .unwrap();
        let resp = app.clone().oneshot(rename).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["first_name"], "Jane");

        let steal = Request::put("/api/v1/users/me")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "email": "b@x.com" }).to_string()))
            .unwrap();
        let resp = app.oneshot(steal).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_protected_profile_route_rejects_before_touching_db() {
        let (app, _) = test_app();
        let resp = app
            .oneshot(
                Request::get("/api/v1/profile/experiences")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unverified_account_is_403_on_verified_route() {
        let (app, _) = app_with_levels(false);
        let (_, token) = register_and_login(&app, "a@x.com", "secret1").await;

        let resp = app
            .clone()
            .oneshot(get_with_token("/levels/verified", &token))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(resp).await["error"]["message"], "Unverified user");

        // Active routes still accept the same account.
        let resp = app.oneshot(me_request(Some(&token))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["is_verified"], false);
    }

    #[tokio::test]
    async fn test_verified_route_accepts_auto_verified_account() {
        let (app, _) = app_with_levels(true);
        let (id, token) = register_and_login(&app, "a@x.com", "secret1").await;

        let resp = app.oneshot(get_with_token("/levels/verified", &token)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["id"], id.as_str());
    }

    #[tokio::test]
    async fn test_any_identity_route_ignores_account_state() {
        let (app, store) = app_with_levels(true);
        let (id, token) = register_and_login(&app, "a@x.com", "secret1").await;

        let mut user = store.find_by_id(&id).await.unwrap().unwrap();
        user.is_active = false;
        user.is_verified = false;
        store.update(&user).await.unwrap();

        let resp = app
            .clone()
            .oneshot(get_with_token("/levels/any", &token))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app.oneshot(get_with_token("/levels/any", "garbage")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_store_outage_fails_closed_with_500() {
        let state = test_state(Arc::new(UnavailableUserStore), true);
        let token = state.tokens.issue_default("user-123").unwrap();
        let app = build_router(state);

        let resp = app.oneshot(me_request(Some(&token))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
        assert!(body.get("email").is_none());
    }
}
