pub mod health;

use axum::{
    http::Uri,
    routing::{get, patch, post, put},
    Router,
};

use crate::assistant::handlers as assistant;
use crate::errors::AppError;
use crate::identity::handlers as identity;
use crate::map::handlers as map;
use crate::problems::handlers as problems;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Identity
        .route("/api/v1/auth/signin", post(identity::handle_sign_in))
        .route("/api/v1/auth/signup", post(identity::handle_sign_up))
        .route("/api/v1/auth/signout", post(identity::handle_sign_out))
        .route("/api/v1/auth/me", get(identity::handle_me))
        .route("/api/v1/auth/location", put(identity::handle_update_location))
        .route("/api/v1/auth/location/locate", post(identity::handle_locate))
        // Problems
        .route(
            "/api/v1/problems",
            get(problems::handle_list_problems).post(problems::handle_submit_problem),
        )
        .route("/api/v1/problems/:id", get(problems::handle_get_problem))
        .route(
            "/api/v1/problems/:id/status",
            patch(problems::handle_change_status),
        )
        .route(
            "/api/v1/problems/:id/comments",
            post(problems::handle_add_comment),
        )
        .route("/api/v1/problems/:id/upvote", post(problems::handle_upvote))
        .route("/api/v1/profile", get(problems::handle_profile))
        .route("/api/v1/categories", get(problems::handle_categories))
        // Assistant
        .route(
            "/api/v1/problems/:id/chat",
            get(assistant::handle_transcript)
                .post(assistant::handle_send_message)
                .delete(assistant::handle_clear_history),
        )
        // Map
        .route("/api/v1/map", get(map::handle_map))
        .route("/api/v1/map/problems", get(map::handle_map_problems))
        .route(
            "/api/v1/map/markers/:marker_id/click",
            post(map::handle_marker_click),
        )
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::identity::storage::MemorySessionStorage;

    fn test_state() -> AppState {
        let config = Config {
            auth_delay: Duration::ZERO,
            assistant_delay: Duration::ZERO,
            ..Config::default()
        };
        AppState::build(config, Arc::new(MemorySessionStorage::default()))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
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
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn sign_in(app: &Router, email: &str, role: &str) {
        let (status, _) = call(
            app,
            Method::POST,
            "/api/v1/auth/signin",
            Some(json!({ "email": email, "password": "x", "role": role })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state());
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = build_router(test_state());
        let (status, body) = call(&app, Method::GET, "/nowhere", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_bad_credentials_are_401() {
        let app = build_router(test_state());
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/auth/signin",
            Some(json!({ "email": "nobody@milaan.org", "role": "helper" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTHENTICATION_ERROR");
    }

    #[tokio::test]
    async fn test_list_sorted_by_votes() {
        let app = build_router(test_state());
        let (status, body) = call(&app, Method::GET, "/api/v1/problems?sort=votes", None).await;
        assert_eq!(status, StatusCode::OK);
        let votes: Vec<u64> = body["problems"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["upvotes"].as_u64().unwrap())
            .collect();
        assert_eq!(votes, vec![23, 15, 12, 8]);
        assert_eq!(body["total"], 4);
    }

    #[tokio::test]
    async fn test_list_filters_by_category_and_search() {
        let app = build_router(test_state());
        let (_, body) = call(
            &app,
            Method::GET,
            "/api/v1/problems?category=Healthcare&search=FLU&status=All",
            None,
        )
        .await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["problems"][0]["id"], "3");
    }

    #[tokio::test]
    async fn test_submit_requires_login_and_fields() {
        let app = build_router(test_state());
        let submission = json!({
            "title": "Stray dog bites",
            "description": "Several children bitten this month",
            "category": "Healthcare"
        });

        let (status, _) = call(&app, Method::POST, "/api/v1/problems", Some(submission.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        sign_in(&app, "seeker@milaan.org", "seeker").await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/problems",
            Some(json!({ "title": "Only a title" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Please fill in all required fields");

        let (status, body) = call(&app, Method::POST, "/api/v1/problems", Some(submission)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "open");
        assert_eq!(body["author_id"], "2");
        assert_eq!(body["upvotes"], 0);
    }

    #[tokio::test]
    async fn test_get_missing_problem_is_404() {
        let app = build_router(test_state());
        let (status, _) = call(&app, Method::GET, "/api/v1/problems/does-not-exist", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_only_helpers_change_status() {
        let app = build_router(test_state());
        let body = Some(json!({ "status": "in-progress" }));

        sign_in(&app, "seeker@milaan.org", "seeker").await;
        let (status, _) = call(&app, Method::PATCH, "/api/v1/problems/1/status", body.clone()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        sign_in(&app, "helper@milaan.org", "helper").await;
        let (status, problem) = call(&app, Method::PATCH, "/api/v1/problems/1/status", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(problem["status"], "in-progress");
        assert_eq!(problem["helper_id"], "1");
        assert_eq!(problem["helper_name"], "Demo Helper");
    }

    #[tokio::test]
    async fn test_comments_need_user_and_content() {
        let app = build_router(test_state());
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/problems/1/comments",
            Some(json!({ "content": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        sign_in(&app, "helper@milaan.org", "helper").await;
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/problems/1/comments",
            Some(json!({ "content": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, comment) = call(
            &app,
            Method::POST,
            "/api/v1/problems/1/comments",
            Some(json!({ "content": "We have a rig nearby" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(comment["user_name"], "Demo Helper");

        let (_, problem) = call(&app, Method::GET, "/api/v1/problems/1", None).await;
        assert_eq!(problem["comments"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_signed_in_user_votes_once() {
        let app = build_router(test_state());

        // anonymous votes are not deduplicated
        for expected in [16, 17] {
            let (status, body) = call(&app, Method::POST, "/api/v1/problems/1/upvote", None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["upvotes"], expected);
        }

        sign_in(&app, "seeker@milaan.org", "seeker").await;
        let (status, body) = call(&app, Method::POST, "/api/v1/problems/1/upvote", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["upvotes"], 18);

        let (status, _) = call(&app, Method::POST, "/api/v1/problems/1/upvote", None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = call(&app, Method::POST, "/api/v1/problems/nope/upvote", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_lists_own_and_helping() {
        let app = build_router(test_state());
        let (status, _) = call(&app, Method::GET, "/api/v1/profile", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        sign_in(&app, "helper@milaan.org", "helper").await;
        let (status, body) = call(&app, Method::GET, "/api/v1/profile", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["problems"].as_array().unwrap().is_empty());
        assert_eq!(body["helping"][0]["id"], "2");
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let app = build_router(test_state());
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/problems/2/chat",
            Some(json!({ "content": "How do I contact an NGO?" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
        assert!(messages[1]["content"]
            .as_str()
            .unwrap()
            .starts_with("You can contact local NGOs"));

        let (status, _) = call(&app, Method::DELETE, "/api/v1/problems/2/chat", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = call(&app, Method::GET, "/api/v1/problems/2/chat", None).await;
        assert!(body["messages"].as_array().unwrap().is_empty());

        let (status, _) = call(&app, Method::GET, "/api/v1/problems/ghost/chat", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_locate_falls_back_to_coordinates() {
        let app = build_router(test_state());
        sign_in(&app, "seeker@milaan.org", "seeker").await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/auth/location/locate",
            Some(json!({ "lat": 12.97, "lng": 77.59 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["location"]["address"], "Bangalore, India");
        assert!(body["notice"].is_null());

        let (_, body) = call(
            &app,
            Method::POST,
            "/api/v1/auth/location/locate",
            Some(json!({ "lat": -33.0, "lng": 151.0 })),
        )
        .await;
        assert!(body["location"]["address"].is_null());
        assert_eq!(
            body["notice"],
            "Address could not be determined, but coordinates were captured"
        );
        assert_eq!(body["user"]["location"]["lat"], -33.0);
    }

    #[tokio::test]
    async fn test_map_markers_track_problems() {
        let state = test_state();
        let app = build_router(state);

        let (_, body) = call(&app, Method::GET, "/api/v1/map", None).await;
        let markers = body["markers"].as_array().unwrap();
        assert_eq!(markers.len(), 4);
        assert_eq!(body["zoom"], 5);

        let marker_id = markers[0]["marker_id"].as_u64().unwrap();
        let (status, click) = call(
            &app,
            Method::POST,
            &format!("/api/v1/map/markers/{marker_id}/click"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            click["navigate_to"],
            format!("/problems/{}", markers[0]["problem_id"].as_str().unwrap())
        );

        let (_, open) = call(&app, Method::GET, "/api/v1/map/problems?status=open", None).await;
        assert_eq!(open.as_array().unwrap().len(), 3);
        let (status, _) = call(&app, Method::GET, "/api/v1/map/problems?status=closed", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submitted_problem_is_on_map_immediately() {
        let state = test_state();
        let binder = tokio::spawn(state.map.clone().run(state.problems.clone()));
        let app = build_router(state);

        let (_, body) = call(&app, Method::GET, "/api/v1/map", None).await;
        assert_eq!(body["markers"].as_array().unwrap().len(), 4);

        sign_in(&app, "seeker@milaan.org", "seeker").await;
        let (status, created) = call(
            &app,
            Method::POST,
            "/api/v1/problems",
            Some(json!({
                "title": "Open drain",
                "description": "Uncovered drain beside the school gate.",
                "category": "Infrastructure",
                "location": { "lat": 26.85, "lng": 80.95, "address": "Lucknow, India" },
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = call(&app, Method::GET, "/api/v1/map", None).await;
        let markers = body["markers"].as_array().unwrap();
        assert_eq!(markers.len(), 5);
        assert!(markers.iter().any(|m| m["problem_id"] == created["id"]));

        binder.abort();
    }

    #[tokio::test]
    async fn test_unknown_status_filter_is_rejected_on_browse() {
        let app = build_router(test_state());
        let (status, body) = call(&app, Method::GET, "/api/v1/problems?status=closed", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = call(&app, Method::GET, "/api/v1/problems?status=all", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 4);
    }
}
