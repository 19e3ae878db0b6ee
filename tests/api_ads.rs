//! Integration tests for advertisement requests
//!
//! - POST /api/ads, GET /api/ads/mine, GET /api/ads/active
//! - POST /api/ads/{id}/payment
//! - admin review under /api/admin/ads

mod common;

#[cfg(test)]
mod ad_tests {
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

    fn ad_body() -> Value {
        json!({
            "title": "Plumbing discounts",
            "description": "20% off every repair in March",
            "duration_days": 7
        })
    }

    #[sqlx::test]
    async fn test_ad_review_and_activation(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let provider = create_test_jwt(&seed_verified_provider(&state, "yacine").await);
        let other = create_test_jwt(&seed_verified_provider(&state, "nadia").await);
        let admin = create_test_jwt(&seed_user(&state, "admin", UserRole::Admin).await);
        let server = create_test_server(state);

        let response = post(&server, &provider, "/api/ads", ad_body()).await;
        response.assert_status(StatusCode::CREATED);
        let ad: Value = response.json();
        assert_eq!(ad["status"], "pending_approval");
        assert!(ad["amount"].is_null());
        let id = ad["id"].as_i64().unwrap();

        // no payment before the admin sets a price
        post(
            &server,
            &provider,
            &format!("/api/ads/{}/payment", id),
            json!({ "receipt_url": "https://files.example.com/ad.png" }),
        )
        .await
        .assert_status_conflict();

        let response = server
            .get("/api/admin/ads?status=pending_approval")
            .add_header(auth_header(), bearer(&admin))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Vec<Value>>().len(), 1);

        let response = post(
            &server,
            &admin,
            &format!("/api/admin/ads/{}/approve", id),
            json!({ "amount": 1500 }),
        )
        .await;
        response.assert_status_ok();
        let ad: Value = response.json();
        assert_eq!(ad["status"], "awaiting_payment");
        assert_eq!(ad["amount"], 1500);

        post(
            &server,
            &other,
            &format!("/api/ads/{}/payment", id),
            json!({ "receipt_url": "https://files.example.com/ad.png" }),
        )
        .await
        .assert_status_forbidden();

        let response = post(
            &server,
            &provider,
            &format!("/api/ads/{}/payment", id),
            json!({ "receipt_url": "https://files.example.com/ad.png" }),
        )
        .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "payment_submitted");

        // not live until the payment is confirmed
        let response = server
            .get("/api/ads/active")
            .add_header(auth_header(), bearer(&other))
            .await;
        assert!(response.json::<Vec<Value>>().is_empty());

        let response = post(
            &server,
            &admin,
            &format!("/api/admin/ads/{}/confirm-payment", id),
            json!({}),
        )
        .await;
        response.assert_status_ok();
        let ad: Value = response.json();
        assert_eq!(ad["status"], "active");
        assert!(ad["starts_at"].is_string());
        assert!(ad["ends_at"].is_string());

        let response = server
            .get("/api/ads/active")
            .add_header(auth_header(), bearer(&other))
            .await;
        let active: Vec<Value> = response.json();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0]["id"], id);

        let response = server
            .get("/api/ads/mine")
            .add_header(auth_header(), bearer(&other))
            .await;
        assert!(response.json::<Vec<Value>>().is_empty());

        Ok(())
    }

    #[sqlx::test]
    async fn test_ad_permissions(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let unverified = create_test_jwt(&seed_user(&state, "karim", UserRole::Provider).await);
        let seeker = create_test_jwt(&seed_user(&state, "sara", UserRole::Seeker).await);
        let provider = create_test_jwt(&seed_verified_provider(&state, "yacine").await);
        let admin = create_test_jwt(&seed_user(&state, "admin", UserRole::Admin).await);
        let server = create_test_server(state);

        post(&server, &unverified, "/api/ads", ad_body())
            .await
            .assert_status_forbidden();
        post(&server, &seeker, "/api/ads", ad_body())
            .await
            .assert_status_forbidden();

        let mut too_long = ad_body();
        too_long["duration_days"] = json!(365);
        post(&server, &provider, "/api/ads", too_long)
            .await
            .assert_status_bad_request();

        // only admins review ads
        server
            .post("/api/admin/ads/1/approve")
            .add_header(auth_header(), bearer(&provider))
            .json(&json!({ "amount": 10 }))
            .await
            .assert_status_forbidden();

        let response = post(&server, &provider, "/api/ads", ad_body()).await;
        let id = response.json::<Value>()["id"].as_i64().unwrap();

        let response = post(
            &server,
            &admin,
            &format!("/api/admin/ads/{}/reject", id),
            json!({ "reason": "Misleading offer" }),
        )
        .await;
        response.assert_status_ok();
        let ad: Value = response.json();
        assert_eq!(ad["status"], "rejected");
        assert_eq!(ad["rejection_reason"], "Misleading offer");

        // rejected ads are final
        post(
            &server,
            &admin,
            &format!("/api/admin/ads/{}/approve", id),
            json!({ "amount": 1500 }),
        )
        .await
        .assert_status_conflict();

        Ok(())
    }
}
