/*
 * Responsibility
 * - URL 構造を定義 (/, /hello, /pets, /forceSignOut)
 * - access gate を全 route に適用 (allowlist の path は gate 側で素通し)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    health::health,
    hello::hello,
    pets::{create_pet, delete_pet, get_pet, list_pets, update_pet},
    sign_out::force_sign_out,
};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let router = Router::new()
        .route("/", get(health))
        .route("/hello", get(hello))
        .route("/pets", get(list_pets).post(create_pet))
        .route(
            "/pets/{pet_id}",
            get(get_pet).put(update_pet).delete(delete_pet),
        )
        .route("/forceSignOut", post(force_sign_out));

    middleware::auth::access::apply(router, state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::repos::{InMemoryPetStore, Pet, PetStore};
    use crate::services::auth::revocation::InMemoryRevocationStore;
    use crate::services::auth::revocation::oracle::test_stores::FlakyStore;
    use crate::services::auth::token::test_tokens::unsigned;
    use crate::state::test_support::{ADMINS, USERS, state_with, test_state};

    fn app(state: AppState) -> Router {
        routes(state.clone()).with_state(state)
    }

    fn token(user: &str, group: &str, iat: i64) -> String {
        unsigned(&json!({
            "sub": format!("sub-{user}"),
            "cognito:username": user,
            "email": format!("{user}@example.com"),
            "iat": iat,
            "custom:groups": format!("[\"{group}\"]"),
            "custom:member_status": "gold"
        }))
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    async fn send(
        app: &Router,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn seeded(pets: &[(&str, &str)]) -> (AppState, Arc<InMemoryPetStore>) {
        let store = Arc::new(InMemoryPetStore::new());
        for (id, owner) in pets {
            store
                .put(&Pet {
                    id: id.to_string(),
                    owner: owner.to_string(),
                    owner_display_name: None,
                    name: format!("pet-{id}"),
                    species: None,
                })
                .await
                .unwrap();
        }
        let state = state_with(Arc::new(InMemoryRevocationStore::new()), store.clone());
        (state, store)
    }

    #[tokio::test]
    async fn root_is_open_and_everything_else_needs_a_token() {
        let app = app(test_state());

        let (status, body) = send(&app, Method::GET, "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));

        let (status, body) = send(&app, Method::GET, "/pets", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn hello_echoes_member_status() {
        let app = app(test_state());
        let alice = token("alice", USERS, now());

        let (status, body) = send(&app, Method::GET, "/hello", Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Hello API!", "member_status": "gold"}));
    }

    #[tokio::test]
    async fn unsupported_group_is_forbidden() {
        let app = app(test_state());
        let mallory = token("mallory", "marketing", now());

        let (status, body) = send(&app, Method::GET, "/pets", Some(&mallory), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn users_see_own_pets_and_admins_see_all() {
        let (state, _) = seeded(&[("1", "alice"), ("2", "bob")]).await;
        let app = app(state);

        let alice = token("alice", USERS, now());
        let (status, body) = send(&app, Method::GET, "/pets", Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["owner"], "alice");

        let admin = token("root", ADMINS, now());
        let (_, body) = send(&app, Method::GET, "/pets", Some(&admin), None).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn get_pet_checks_existence_then_ownership() {
        let (state, _) = seeded(&[("1", "alice"), ("2", "bob")]).await;
        let app = app(state);
        let alice = token("alice", USERS, now());

        let (status, _) = send(&app, Method::GET, "/pets/1", Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::GET, "/pets/2", Some(&alice), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&app, Method::GET, "/pets/nope", Some(&alice), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Pet with id nope was not found");
    }

    #[tokio::test]
    async fn create_assigns_id_and_owner() {
        let (state, store) = seeded(&[]).await;
        let app = app(state);
        let alice = token("alice", USERS, now());

        let (status, _) = send(
            &app,
            Method::POST,
            "/pets",
            Some(&alice),
            Some(json!({"id": "mine", "name": "Rex"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::POST,
            "/pets",
            Some(&alice),
            Some(json!({"name": "Rex", "species": "dog", "owner": "bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["owner"], "alice");
        assert_eq!(body["ownerDisplayName"], "alice@example.com");

        let id = body["id"].as_str().unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
        assert!(store.get(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn only_admins_change_owner() {
        let (state, store) = seeded(&[("1", "alice")]).await;
        let app = app(state);
        let alice = token("alice", USERS, now());
        let bob = token("bob", USERS, now());
        let admin = token("root", ADMINS, now());

        let (status, _) = send(
            &app,
            Method::PUT,
            "/pets/1",
            Some(&alice),
            Some(json!({"id": "2", "name": "Rex"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::PUT,
            "/pets/1",
            Some(&alice),
            Some(json!({"id": "1", "owner": "alice", "name": "Renamed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Renamed");

        let (status, _) = send(
            &app,
            Method::PUT,
            "/pets/1",
            Some(&alice),
            Some(json!({"id": "1", "owner": "bob", "name": "Renamed"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            Method::PUT,
            "/pets/1",
            Some(&bob),
            Some(json!({"id": "1", "name": "Stolen"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            Method::PUT,
            "/pets/1",
            Some(&admin),
            Some(json!({"id": "1", "owner": "bob", "name": "Rex"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.get("1").await.unwrap().unwrap().owner, "bob");
    }

    #[tokio::test]
    async fn delete_returns_the_removed_pet() {
        let (state, store) = seeded(&[("1", "alice")]).await;
        let app = app(state);

        let bob = token("bob", USERS, now());
        let (status, _) = send(&app, Method::DELETE, "/pets/1", Some(&bob), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let alice = token("alice", USERS, now());
        let (status, body) = send(&app, Method::DELETE, "/pets/1", Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "1");
        assert!(store.get("1").await.unwrap().is_none());

        let (status, _) = send(&app, Method::DELETE, "/pets/1", Some(&alice), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn force_sign_out_revokes_earlier_tokens() {
        let app = app(test_state());
        let old = token("alice", USERS, now() - 60);

        let (status, _) = send(&app, Method::GET, "/pets", Some(&old), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::POST, "/forceSignOut", Some(&old), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");

        let (status, _) = send(&app, Method::GET, "/pets", Some(&old), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        // A token issued after the sign-out is accepted again.
        let fresh = token("alice", USERS, now() + 5);
        let (status, _) = send(&app, Method::GET, "/pets", Some(&fresh), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn signing_out_someone_else_needs_admin() {
        let app = app(test_state());
        let alice = token("alice", USERS, now() - 60);
        let bob = token("bob", USERS, now() - 60);
        let admin = token("root", ADMINS, now() - 60);

        let (status, _) = send(
            &app,
            Method::POST,
            "/forceSignOut",
            Some(&alice),
            Some(json!({"username": "bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(
            &app,
            Method::POST,
            "/forceSignOut",
            Some(&admin),
            Some(json!({"username": "bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::GET, "/pets", Some(&bob), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(&app, Method::GET, "/pets", Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn failed_sign_out_write_is_500() {
        let state = state_with(
            Arc::new(FlakyStore::default()),
            Arc::new(InMemoryPetStore::new()),
        );
        let app = app(state);
        let alice = token("alice", USERS, now());

        let (status, body) = send(&app, Method::POST, "/forceSignOut", Some(&alice), None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("READONLY"));
    }
}
