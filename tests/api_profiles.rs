//! Integration tests for profiles, the provider directory and support tickets
//!
//! - PATCH /api/users/me, verification and portfolio under /api/users/me
//! - GET /api/providers, GET /api/providers/{id}
//! - /api/support and the admin replies

mod common;

#[cfg(test)]
mod profile_tests {
    use super::common::*;
    use axum_test::TestServer;
    use axum_test::http::StatusCode;
    use khidmap::entities::UserRole;
    use serde_json::{Value, json};
    use sqlx::SqlitePool;

    async fn post(server: &TestServer, token: &str, path: &str, body: Value) -> axum_test::TestResponse {
        server
            .post(path)
            .add_header(auth_header(), bearer(token))
            .json(&body)
            .await
    }

    #[sqlx::test]
    async fn test_profile_update(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let seeker = create_test_jwt(&seed_user(&state, "sara", UserRole::Seeker).await);
        let provider = create_test_jwt(&seed_user(&state, "karim", UserRole::Provider).await);
        let server = create_test_server(state);

        let response = server
            .patch("/api/users/me")
            .add_header(auth_header(), bearer(&seeker))
            .json(&json!({ "location": "Algiers", "bio": "Looking for help at home" }))
            .await;
        response.assert_status_ok();
        let user: Value = response.json();
        assert_eq!(user["location"], "Algiers");
        assert_eq!(user["bio"], "Looking for help at home");
        assert_eq!(user["name"], "sara");

        server
            .patch("/api/users/me")
            .add_header(auth_header(), bearer(&seeker))
            .json(&json!({ "hourly_rate": 1000 }))
            .await
            .assert_status_forbidden();
        server
            .patch("/api/users/me")
            .add_header(auth_header(), bearer(&seeker))
            .json(&json!({}))
            .await
            .assert_status_bad_request();

        let response = server
            .patch("/api/users/me")
            .add_header(auth_header(), bearer(&provider))
            .json(&json!({ "service_category": "Plumbing", "hourly_rate": 1500 }))
            .await;
        response.assert_status_ok();
        let user: Value = response.json();
        assert_eq!(user["service_category"], "Plumbing");
        assert_eq!(user["hourly_rate"], 1500);

        Ok(())
    }

    #[sqlx::test]
    async fn test_verification_and_directory(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let seeker = create_test_jwt(&seed_user(&state, "sara", UserRole::Seeker).await);
        let karim = seed_user(&state, "karim", UserRole::Provider).await;
        let provider = create_test_jwt(&karim);
        let admin = create_test_jwt(&seed_user(&state, "admin", UserRole::Admin).await);
        let server = create_test_server(state);

        // unverified providers are not listed
        let response = server
            .get("/api/providers")
            .add_header(auth_header(), bearer(&seeker))
            .await;
        response.assert_status_ok();
        assert!(response.json::<Vec<Value>>().is_empty());
        // the profile itself stays reachable
        let response = server
            .get(&format!("/api/providers/{}", karim.user_id))
            .add_header(auth_header(), bearer(&seeker))
            .await;
        response.assert_status_ok();
        let profile: Value = response.json();
        assert_eq!(profile["provider"]["verification_status"], "unverified");
        assert!(profile["provider"]["rating_average"].is_null());
        // seekers have no provider profile
        server
            .get("/api/providers/1")
            .add_header(auth_header(), bearer(&seeker))
            .await
            .assert_status_not_found();

        let document = json!({ "document_url": "https://files.example.com/id-card.pdf" });
        post(&server, &seeker, "/api/users/me/verification", document.clone())
            .await
            .assert_status_forbidden();

        let response = post(&server, &provider, "/api/users/me/verification", document.clone()).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["verification_status"], "pending");

        // already pending
        post(&server, &provider, "/api/users/me/verification", document)
            .await
            .assert_status_conflict();

        let response = server
            .get("/api/admin/verifications")
            .add_header(auth_header(), bearer(&admin))
            .await;
        let pending: Vec<Value> = response.json();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0]["id"], karim.user_id);

        let response = post(
            &server,
            &admin,
            &format!("/api/admin/verifications/{}/approve", karim.user_id),
            json!({}),
        )
        .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["verification_status"], "verified");

        // a second decision is refused
        post(
            &server,
            &admin,
            &format!("/api/admin/verifications/{}/reject", karim.user_id),
            json!({ "reason": "Too late" }),
        )
        .await
        .assert_status_conflict();

        server
            .patch("/api/users/me")
            .add_header(auth_header(), bearer(&provider))
            .json(&json!({ "service_category": "Plumbing", "location": "Oran" }))
            .await
            .assert_status_ok();

        let response = server
            .get("/api/providers?category=plumbing&location=ora")
            .add_header(auth_header(), bearer(&seeker))
            .await;
        let providers: Vec<Value> = response.json();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0]["rating_count"], 0);

        let response = server
            .get("/api/providers?category=Electricity")
            .add_header(auth_header(), bearer(&seeker))
            .await;
        assert!(response.json::<Vec<Value>>().is_empty());

        Ok(())
    }

    #[sqlx::test]
    async fn test_portfolio(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let yacine = seed_verified_provider(&state, "yacine").await;
        let provider = create_test_jwt(&yacine);
        let other = create_test_jwt(&seed_verified_provider(&state, "nadia").await);
        let seeker = create_test_jwt(&seed_user(&state, "sara", UserRole::Seeker).await);
        let server = create_test_server(state);

        let item = json!({
            "title": "Bathroom renovation",
            "media_url": "https://files.example.com/bathroom.jpg"
        });
        post(&server, &seeker, "/api/users/me/portfolio", item.clone())
            .await
            .assert_status_forbidden();

        let response = post(&server, &provider, "/api/users/me/portfolio", item).await;
        response.assert_status(StatusCode::CREATED);
        let item_id = response.json::<Value>()["id"].as_i64().unwrap();

        let response = server
            .get(&format!("/api/providers/{}", yacine.user_id))
            .add_header(auth_header(), bearer(&seeker))
            .await;
        response.assert_status_ok();
        let profile: Value = response.json();
        assert_eq!(profile["portfolio"].as_array().map(Vec::len), Some(1));
        assert_eq!(profile["portfolio"][0]["title"], "Bathroom renovation");

        // another provider's item looks missing
        server
            .delete(&format!("/api/users/me/portfolio/{}", item_id))
            .add_header(auth_header(), bearer(&other))
            .await
            .assert_status_not_found();
        server
            .delete(&format!("/api/users/me/portfolio/{}", item_id))
            .add_header(auth_header(), bearer(&provider))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let response = server
            .get(&format!("/api/providers/{}", yacine.user_id))
            .add_header(auth_header(), bearer(&seeker))
            .await;
        assert_eq!(response.json::<Value>()["portfolio"], json!([]));

        Ok(())
    }

    #[sqlx::test]
    async fn test_deleted_provider_leaves_the_directory(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let seeker = create_test_jwt(&seed_user(&state, "sara", UserRole::Seeker).await);
        let yacine = seed_verified_provider(&state, "yacine").await;
        let provider = create_test_jwt(&yacine);
        let admin = create_test_jwt(&seed_user(&state, "admin", UserRole::Admin).await);
        let server = create_test_server(state);

        let order = json!({
            "provider_id": yacine.user_id,
            "title": "Fix the boiler",
            "description": "No hot water since Sunday",
            "amount": 4000
        });
        let response = post(&server, &seeker, "/api/orders", order.clone()).await;
        response.assert_status(StatusCode::CREATED);
        let order_id = response.json::<Value>()["id"].as_i64().unwrap();
        post(
            &server,
            &provider,
            "/api/ads",
            json!({ "title": "Boiler service", "description": "Yearly check", "duration_days": 30 }),
        )
        .await
        .assert_status(StatusCode::CREATED);

        let response = server
            .get("/api/providers")
            .add_header(auth_header(), bearer(&seeker))
            .await;
        assert_eq!(response.json::<Vec<Value>>().len(), 1);

        server
            .delete("/api/users/me")
            .add_header(auth_header(), bearer(&provider))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let response = server
            .get("/api/providers")
            .add_header(auth_header(), bearer(&seeker))
            .await;
        assert!(response.json::<Vec<Value>>().is_empty());

        let response = server
            .get(&format!("/api/providers/{}", yacine.user_id))
            .add_header(auth_header(), bearer(&seeker))
            .await;
        let profile: Value = response.json();
        assert_eq!(profile["provider"]["verification_status"], "unverified");
        assert!(profile["provider"]["service_category"].is_null());

        post(&server, &seeker, "/api/orders", order)
            .await
            .assert_status_not_found();

        // work that was never paid for is closed with the account
        let response = server
            .get(&format!("/api/orders/{}", order_id))
            .add_header(auth_header(), bearer(&seeker))
            .await;
        assert_eq!(response.json::<Value>()["status"], "cancelled");

        let response = server
            .get("/api/admin/ads?status=rejected")
            .add_header(auth_header(), bearer(&admin))
            .await;
        let ads: Vec<Value> = response.json();
        assert_eq!(ads.len(), 1);
        assert_eq!(ads[0]["rejection_reason"], "Account deleted");

        Ok(())
    }

    #[sqlx::test]
    async fn test_support_tickets(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let seeker = create_test_jwt(&seed_user(&state, "sara", UserRole::Seeker).await);
        let omar = create_test_jwt(&seed_user(&state, "omar", UserRole::Seeker).await);
        let admin = create_test_jwt(&seed_user(&state, "admin", UserRole::Admin).await);
        let server = create_test_server(state);

        let response = post(
            &server,
            &seeker,
            "/api/support",
            json!({ "subject": "Refund question", "message": "When will I get my money back?" }),
        )
        .await;
        response.assert_status(StatusCode::CREATED);
        let ticket: Value = response.json();
        assert_eq!(ticket["status"], "open");
        let id = ticket["id"].as_i64().unwrap();
        let path = format!("/api/support/{}", id);

        post(&server, &seeker, "/api/support", json!({ "subject": "Hi", "message": "x" }))
            .await
            .assert_status_bad_request();

        server
            .get(&path)
            .add_header(auth_header(), bearer(&omar))
            .await
            .assert_status_forbidden();
        let response = server
            .get("/api/support")
            .add_header(auth_header(), bearer(&omar))
            .await;
        assert!(response.json::<Vec<Value>>().is_empty());

        // admins are told about new tickets
        let response = server
            .get("/api/notifications")
            .add_header(auth_header(), bearer(&admin))
            .await;
        let notifications: Vec<Value> = response.json();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0]["kind"], "support");

        let response = server
            .get("/api/admin/support?status=open")
            .add_header(auth_header(), bearer(&admin))
            .await;
        assert_eq!(response.json::<Vec<Value>>().len(), 1);

        let response = post(
            &server,
            &admin,
            &format!("/api/admin/support/{}/reply", id),
            json!({ "reply": "Within three working days", "resolve": true }),
        )
        .await;
        response.assert_status_ok();
        let ticket: Value = response.json();
        assert_eq!(ticket["status"], "resolved");
        assert_eq!(ticket["admin_reply"], "Within three working days");

        post(
            &server,
            &admin,
            "/api/admin/support/4242/reply",
            json!({ "reply": "Hello" }),
        )
        .await
        .assert_status_not_found();

        let response = server
            .get(&path)
            .add_header(auth_header(), bearer(&seeker))
            .await;
        assert_eq!(response.json::<Value>()["status"], "resolved");

        Ok(())
    }
}
