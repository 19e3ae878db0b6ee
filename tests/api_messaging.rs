//! Integration tests for chats, calls and notifications
//!
//! - POST /api/chats, GET /api/chats
//! - GET/POST /api/chats/{id}/messages, POST /api/chats/{id}/read
//! - POST /api/calls, accept / decline / end
//! - GET /api/notifications, read, read-all

mod common;

#[cfg(test)]
mod messaging_tests {
    use super::common::*;
    use axum_test::TestServer;
    use axum_test::http::StatusCode;
    use khidmap::entities::{User, UserRole};
    use serde_json::{Value, json};
    use sqlx::SqlitePool;

    struct Pair {
        sara: User,
        yacine: User,
        sara_token: String,
        yacine_token: String,
        omar_token: String,
    }

    async fn setup(pool: SqlitePool) -> (TestServer, Pair) {
        let state = create_test_state(pool);
        let sara = seed_user(&state, "sara", UserRole::Seeker).await;
        let yacine = seed_verified_provider(&state, "yacine").await;
        let omar = seed_user(&state, "omar", UserRole::Seeker).await;
        let pair = Pair {
            sara_token: create_test_jwt(&sara),
            yacine_token: create_test_jwt(&yacine),
            omar_token: create_test_jwt(&omar),
            sara,
            yacine,
        };
        (create_test_server(state), pair)
    }

    async fn post(server: &TestServer, token: &str, path: &str, body: Value) -> axum_test::TestResponse {
        server
            .post(path)
            .add_header(auth_header(), bearer(token))
            .json(&body)
            .await
    }

    async fn open_chat(server: &TestServer, pair: &Pair) -> i64 {
        let response = post(
            server,
            &pair.sara_token,
            "/api/chats",
            json!({ "participant_id": pair.yacine.user_id }),
        )
        .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["id"].as_i64().unwrap()
    }

    #[sqlx::test]
    async fn test_chat_is_unique_per_pair(pool: SqlitePool) -> sqlx::Result<()> {
        let (server, pair) = setup(pool).await;
        let chat_id = open_chat(&server, &pair).await;

        // same pair from the other side returns the existing chat
        let response = post(
            &server,
            &pair.yacine_token,
            "/api/chats",
            json!({ "participant_id": pair.sara.user_id }),
        )
        .await;
        response.assert_status_ok();
        let chat: Value = response.json();
        assert_eq!(chat["id"], chat_id);
        assert_eq!(chat["counterpart"]["name"], "sara");

        post(
            &server,
            &pair.sara_token,
            "/api/chats",
            json!({ "participant_id": pair.sara.user_id }),
        )
        .await
        .assert_status_bad_request();
        post(&server, &pair.sara_token, "/api/chats", json!({ "participant_id": 9999 }))
            .await
            .assert_status_not_found();

        Ok(())
    }

    #[sqlx::test]
    async fn test_messages_and_unread_counts(pool: SqlitePool) -> sqlx::Result<()> {
        let (server, pair) = setup(pool).await;
        let chat_id = open_chat(&server, &pair).await;
        let path = format!("/api/chats/{}/messages", chat_id);

        for content in ["Hello", "Are you free on Monday?"] {
            let response = post(&server, &pair.sara_token, &path, json!({ "content": content })).await;
            response.assert_status(StatusCode::CREATED);
            let message: Value = response.json();
            assert_eq!(message["sender_id"], pair.sara.user_id);
            assert_eq!(message["is_read"], false);
        }

        post(&server, &pair.sara_token, &path, json!({ "content": "" }))
            .await
            .assert_status_bad_request();
        post(&server, &pair.omar_token, &path, json!({ "content": "Hi" }))
            .await
            .assert_status_forbidden();
        server
            .get(&path)
            .add_header(auth_header(), bearer(&pair.omar_token))
            .await
            .assert_status_forbidden();

        let response = server
            .get("/api/chats")
            .add_header(auth_header(), bearer(&pair.yacine_token))
            .await;
        response.assert_status_ok();
        let chats: Vec<Value> = response.json();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0]["unread_count"], 2);

        let response = server
            .get(&format!("{}?limit=1", path))
            .add_header(auth_header(), bearer(&pair.yacine_token))
            .await;
        let page: Vec<Value> = response.json();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0]["content"], "Are you free on Monday?");

        let response = post(
            &server,
            &pair.yacine_token,
            &format!("/api/chats/{}/read", chat_id),
            json!({}),
        )
        .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["updated"], 2);

        let response = server
            .get("/api/chats")
            .add_header(auth_header(), bearer(&pair.yacine_token))
            .await;
        assert_eq!(response.json::<Vec<Value>>()[0]["unread_count"], 0);

        // the sender has nothing unread
        let response = server
            .get("/api/chats")
            .add_header(auth_header(), bearer(&pair.sara_token))
            .await;
        assert_eq!(response.json::<Vec<Value>>()[0]["unread_count"], 0);

        Ok(())
    }

    #[sqlx::test]
    async fn test_call_signalling(pool: SqlitePool) -> sqlx::Result<()> {
        let (server, pair) = setup(pool).await;
        let chat_id = open_chat(&server, &pair).await;

        post(
            &server,
            &pair.omar_token,
            "/api/calls",
            json!({ "chat_id": chat_id, "kind": "voice" }),
        )
        .await
        .assert_status_forbidden();

        let response = post(
            &server,
            &pair.sara_token,
            "/api/calls",
            json!({ "chat_id": chat_id, "kind": "video" }),
        )
        .await;
        response.assert_status(StatusCode::CREATED);
        let call: Value = response.json();
        assert_eq!(call["status"], "ringing");
        assert_eq!(call["callee_id"], pair.yacine.user_id);
        let call_id = call["id"].as_i64().unwrap();

        // only the callee answers
        post(&server, &pair.sara_token, &format!("/api/calls/{}/accept", call_id), json!({}))
            .await
            .assert_status_forbidden();

        let response =
            post(&server, &pair.yacine_token, &format!("/api/calls/{}/accept", call_id), json!({}))
                .await;
        response.assert_status_ok();
        let call: Value = response.json();
        assert_eq!(call["status"], "ongoing");
        assert!(call["answered_at"].is_string());

        let response =
            post(&server, &pair.sara_token, &format!("/api/calls/{}/end", call_id), json!({})).await;
        response.assert_status_ok();
        let call: Value = response.json();
        assert_eq!(call["status"], "ended");
        assert!(call["ended_at"].is_string());

        post(&server, &pair.sara_token, &format!("/api/calls/{}/end", call_id), json!({}))
            .await
            .assert_status_conflict();

        let response = server
            .get("/api/calls")
            .add_header(auth_header(), bearer(&pair.yacine_token))
            .await;
        assert_eq!(response.json::<Vec<Value>>().len(), 1);

        Ok(())
    }

    #[sqlx::test]
    async fn test_unanswered_and_declined_calls(pool: SqlitePool) -> sqlx::Result<()> {
        let (server, pair) = setup(pool).await;
        let chat_id = open_chat(&server, &pair).await;

        let response = post(
            &server,
            &pair.sara_token,
            "/api/calls",
            json!({ "chat_id": chat_id, "kind": "voice" }),
        )
        .await;
        let call_id = response.json::<Value>()["id"].as_i64().unwrap();

        let response =
            post(&server, &pair.sara_token, &format!("/api/calls/{}/end", call_id), json!({})).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "missed");

        let response = post(
            &server,
            &pair.yacine_token,
            "/api/calls",
            json!({ "chat_id": chat_id, "kind": "voice" }),
        )
        .await;
        let call_id = response.json::<Value>()["id"].as_i64().unwrap();
        // the caller cannot decline their own call
        post(&server, &pair.yacine_token, &format!("/api/calls/{}/decline", call_id), json!({}))
            .await
            .assert_status_forbidden();
        let response =
            post(&server, &pair.sara_token, &format!("/api/calls/{}/decline", call_id), json!({}))
                .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "declined");

        Ok(())
    }

    #[sqlx::test]
    async fn test_notifications(pool: SqlitePool) -> sqlx::Result<()> {
        let (server, pair) = setup(pool).await;
        let chat_id = open_chat(&server, &pair).await;

        // the callee is offline, so each call leaves a notification
        for _ in 0..2 {
            post(
                &server,
                &pair.sara_token,
                "/api/calls",
                json!({ "chat_id": chat_id, "kind": "voice" }),
            )
            .await
            .assert_status(StatusCode::CREATED);
        }

        let response = server
            .get("/api/notifications")
            .add_header(auth_header(), bearer(&pair.yacine_token))
            .await;
        response.assert_status_ok();
        let notifications: Vec<Value> = response.json();
        assert_eq!(notifications.len(), 2);
        assert!(notifications.iter().all(|n| n["kind"] == "call"));
        let first = notifications[0]["id"].as_i64().unwrap();

        // someone else's notification looks missing
        post(
            &server,
            &pair.sara_token,
            &format!("/api/notifications/{}/read", first),
            json!({}),
        )
        .await
        .assert_status_not_found();

        post(
            &server,
            &pair.yacine_token,
            &format!("/api/notifications/{}/read", first),
            json!({}),
        )
        .await
        .assert_status(StatusCode::NO_CONTENT);

        let response = server
            .get("/api/notifications?unread_only=true")
            .add_header(auth_header(), bearer(&pair.yacine_token))
            .await;
        assert_eq!(response.json::<Vec<Value>>().len(), 1);

        let response =
            post(&server, &pair.yacine_token, "/api/notifications/read-all", json!({})).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["updated"], 1);

        let response = server
            .get("/api/notifications?unread_only=true")
            .add_header(auth_header(), bearer(&pair.yacine_token))
            .await;
        assert!(response.json::<Vec<Value>>().is_empty());

        Ok(())
    }
}
