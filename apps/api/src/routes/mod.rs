pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::cv::handlers as cvs;
use crate::profiles::handlers as profiles;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profiles
        .route(
            "/api/v1/profiles",
            get(profiles::handle_list_profiles).post(profiles::handle_create_profile),
        )
        .route(
            "/api/v1/profiles/:id",
            get(profiles::handle_get_profile)
                .patch(profiles::handle_update_profile)
                .delete(profiles::handle_delete_profile),
        )
        // CVs
        .route("/api/v1/cvs", get(cvs::handle_list_cvs))
        .route("/api/v1/cvs/generate", post(cvs::handle_generate_cv))
        .route(
            "/api/v1/cvs/profile/:profile_id",
            get(cvs::handle_list_profile_cvs),
        )
        .route(
            "/api/v1/cvs/:id",
            get(cvs::handle_get_cv).delete(cvs::handle_delete_cv),
        )
        .route("/api/v1/cvs/:id/cv-data", patch(cvs::handle_update_cv_data))
        .route("/api/v1/cvs/:id/regenerate", get(cvs::handle_regenerate_cv))
        .route("/api/v1/cvs/:id/download", get(cvs::handle_download_cv))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::cv::handlers::CV_ID_HEADER;
    use crate::cv::store::MemoryCvStore;
    use crate::cv::testing::{pipeline_with, sample_profile, ScriptedProvider, CV_JSON};
    use crate::models::profile::Profile;
    use crate::profiles::store::MemoryProfileStore;

    struct Harness {
        router: Router,
        profiles: Arc<MemoryProfileStore>,
        cvs: Arc<MemoryCvStore>,
    }

    fn harness(reply: &str) -> Harness {
        let profiles = Arc::new(MemoryProfileStore::default());
        let cvs = Arc::new(MemoryCvStore::default());
        let state = AppState {
            profiles: profiles.clone(),
            cvs: cvs.clone(),
            pipeline: pipeline_with(Arc::new(ScriptedProvider::reply(reply)), cvs.clone()),
        };
        Harness {
            router: build_router(state),
            profiles,
            cvs,
        }
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Body) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();
        router.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn seeded(h: &Harness) -> Profile {
        let profile = sample_profile();
        h.profiles.insert(profile.clone()).await;
        profile
    }

    async fn generate(h: &Harness, profile_id: Uuid) -> Response {
        let body = json!({"profileId": profile_id, "jobDescription": "Rust backend engineer"});
        send(
            &h.router,
            Method::POST,
            "/api/v1/cvs/generate",
            Body::from(body.to_string()),
        )
        .await
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(CV_JSON);
        let response = send(&h.router, Method::GET, "/health", Body::empty()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["service"], "cvsmith-api");
    }

    #[tokio::test]
    async fn test_profile_crud() {
        let h = harness(CV_JSON);

        let created = send(
            &h.router,
            Method::POST,
            "/api/v1/profiles",
            Body::from(json!({"profileName": "Backend", "email": "ada@example.com"}).to_string()),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let created = json_body(created).await;
        let id = created["id"].as_str().unwrap().to_string();

        let patched = send(
            &h.router,
            Method::PATCH,
            &format!("/api/v1/profiles/{id}"),
            Body::from(
                json!({"fullName": "Ada Lovelace", "skills": ["Rust"], "pronouns": "she/her"})
                    .to_string(),
            ),
        )
        .await;
        assert_eq!(patched.status(), StatusCode::OK);
        let patched = json_body(patched).await;
        assert_eq!(patched["profileName"], "Backend");
        assert_eq!(patched["fullName"], "Ada Lovelace");
        assert_eq!(patched["skills"], json!(["Rust"]));
        assert_eq!(patched["pronouns"], "she/her");

        let listed = send(&h.router, Method::GET, "/api/v1/profiles", Body::empty()).await;
        assert_eq!(json_body(listed).await.as_array().unwrap().len(), 1);

        let deleted = send(
            &h.router,
            Method::DELETE,
            &format!("/api/v1/profiles/{id}"),
            Body::empty(),
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let missing = send(
            &h.router,
            Method::GET,
            &format!("/api/v1/profiles/{id}"),
            Body::empty(),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_patch_with_fetched_profile_keeps_single_account_keys() {
        let h = harness(CV_JSON);
        let profile = seeded(&h).await;
        let uri = format!("/api/v1/profiles/{}", profile.id);

        let fetched = json_body(send(&h.router, Method::GET, &uri, Body::empty()).await).await;
        let mut body = fetched.clone();
        body["id"] = json!(Uuid::nil());
        body["createdAt"] = json!("1970-01-01T00:00:00Z");

        let patched = send(&h.router, Method::PATCH, &uri, Body::from(body.to_string())).await;
        assert_eq!(patched.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(patched.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(text.matches("\"id\":").count(), 1);
        assert_eq!(text.matches("\"createdAt\":").count(), 1);

        let patched: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(patched["id"], json!(profile.id));
        assert_eq!(patched["createdAt"], fetched["createdAt"]);
    }

    #[tokio::test]
    async fn test_concurrent_patches_keep_both_fields() {
        let h = harness(CV_JSON);
        let profile = seeded(&h).await;
        let uri = format!("/api/v1/profiles/{}", profile.id);

        let (first, second) = tokio::join!(
            send(
                &h.router,
                Method::PATCH,
                &uri,
                Body::from(json!({"title": "Staff Engineer"}).to_string()),
            ),
            send(
                &h.router,
                Method::PATCH,
                &uri,
                Body::from(json!({"summary": "Builds databases."}).to_string()),
            ),
        );
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::OK);

        let stored = json_body(send(&h.router, Method::GET, &uri, Body::empty()).await).await;
        assert_eq!(stored["title"], "Staff Engineer");
        assert_eq!(stored["summary"], "Builds databases.");
        assert_eq!(stored["fullName"], "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_patch_unknown_profile_is_not_found() {
        let h = harness(CV_JSON);
        let response = send(
            &h.router,
            Method::PATCH,
            &format!("/api/v1/profiles/{}", Uuid::new_v4()),
            Body::from(json!({"title": "X"}).to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_profile_rejects_bad_email() {
        let h = harness(CV_JSON);
        let response = send(
            &h.router,
            Method::POST,
            "/api/v1/profiles",
            Body::from(json!({"profileName": "Backend", "email": "nope"}).to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_generate_returns_pdf_and_persists_record() {
        let h = harness(&format!("Here you go:\n```json\n{CV_JSON}\n```\nGood luck!"));
        let profile = seeded(&h).await;

        let response = generate(&h, profile.id).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        assert!(response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .starts_with("attachment"));
        let id = response.headers()[CV_ID_HEADER]
            .to_str()
            .unwrap()
            .to_string();

        let record = send(&h.router, Method::GET, &format!("/api/v1/cvs/{id}"), Body::empty()).await;
        assert_eq!(record.status(), StatusCode::OK);
        let record = json_body(record).await;
        assert_eq!(record["profileId"], json!(profile.id));
        assert_eq!(record["cvData"]["fullName"], "Ada Lovelace");
        assert_eq!(record["cvData"]["interests"], json!(["chess"]));

        let by_profile = send(
            &h.router,
            Method::GET,
            &format!("/api/v1/cvs/profile/{}", profile.id),
            Body::empty(),
        )
        .await;
        assert_eq!(json_body(by_profile).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_unknown_profile_is_not_found() {
        let h = harness(CV_JSON);
        let response = generate(&h, Uuid::new_v4()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(h.cvs.len().await, 0);
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_job_description() {
        let h = harness(CV_JSON);
        let profile = seeded(&h).await;
        let response = send(
            &h.router,
            Method::POST,
            "/api/v1/cvs/generate",
            Body::from(json!({"profileId": profile.id, "jobDescription": "  "}).to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_prose_reply_is_unprocessable() {
        let h = harness("Unfortunately I cannot produce that.");
        let profile = seeded(&h).await;

        let response = generate(&h, profile.id).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "NO_JSON_FOUND");
        assert_eq!(
            body["error"]["details"]["raw"],
            "Unfortunately I cannot produce that."
        );
        assert_eq!(h.cvs.len().await, 0);
    }

    #[tokio::test]
    async fn test_edit_then_regenerate_and_download() {
        let h = harness(CV_JSON);
        let profile = seeded(&h).await;
        let response = generate(&h, profile.id).await;
        let id = response.headers()[CV_ID_HEADER]
            .to_str()
            .unwrap()
            .to_string();

        let edited = send(
            &h.router,
            Method::PATCH,
            &format!("/api/v1/cvs/{id}/cv-data"),
            Body::from("{\"fullName\": \"Ada King\", \"skills\": [\"Rust\"]}"),
        )
        .await;
        assert_eq!(edited.status(), StatusCode::OK);
        assert_eq!(
            json_body(edited).await["cvData"],
            json!({"fullName": "Ada King", "skills": ["Rust"]})
        );

        let inline = send(
            &h.router,
            Method::GET,
            &format!("/api/v1/cvs/{id}/regenerate"),
            Body::empty(),
        )
        .await;
        assert_eq!(inline.status(), StatusCode::OK);
        assert!(inline.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .starts_with("inline"));

        let download = send(
            &h.router,
            Method::GET,
            &format!("/api/v1/cvs/{id}/download"),
            Body::empty(),
        )
        .await;
        assert_eq!(download.status(), StatusCode::OK);
        assert!(download.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .starts_with("attachment"));
    }

    #[tokio::test]
    async fn test_malformed_edit_is_rejected_with_payload() {
        let h = harness(CV_JSON);
        let profile = seeded(&h).await;
        let response = generate(&h, profile.id).await;
        let id = response.headers()[CV_ID_HEADER]
            .to_str()
            .unwrap()
            .to_string();

        let edited = send(
            &h.router,
            Method::PATCH,
            &format!("/api/v1/cvs/{id}/cv-data"),
            Body::from("{\"fullName\": \"Ada\",}"),
        )
        .await;
        assert_eq!(edited.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(edited).await;
        assert_eq!(body["error"]["code"], "MALFORMED_JSON");
        assert_eq!(body["error"]["details"]["payload"], "{\"fullName\": \"Ada\",}");
    }

    #[tokio::test]
    async fn test_cv_delete_and_missing_lookups() {
        let h = harness(CV_JSON);
        let profile = seeded(&h).await;
        let response = generate(&h, profile.id).await;
        let id = response.headers()[CV_ID_HEADER]
            .to_str()
            .unwrap()
            .to_string();

        let deleted = send(&h.router, Method::DELETE, &format!("/api/v1/cvs/{id}"), Body::empty()).await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        for uri in [
            format!("/api/v1/cvs/{id}"),
            format!("/api/v1/cvs/{id}/download"),
            format!("/api/v1/cvs/{id}/regenerate"),
        ] {
            let response = send(&h.router, Method::GET, &uri, Body::empty()).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }

        let again = send(&h.router, Method::DELETE, &format!("/api/v1/cvs/{id}"), Body::empty()).await;
        assert_eq!(again.status(), StatusCode::NOT_FOUND);
    }
}
