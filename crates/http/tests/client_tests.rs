//! Integration tests for the typed Inkpost endpoints

use inkpost_core::{
    ContactDraft, ContentKind, CredentialPair, CredentialStore, FeedItem, FeedItemDraft, Id,
    MemoryStore, PostDraft, Role, SessionState, UserUpdate,
};
use inkpost_http::client::content::CONTACT_THANKS;
use inkpost_http::{ClientBuilder, ClientError, PublicClient, SessionClient};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session(server: &MockServer, store: Arc<MemoryStore>) -> SessionClient {
    ClientBuilder::new()
        .base_url(server.uri())
        .build_session(store)
        .unwrap()
}

fn signed_in() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_credentials(CredentialPair::new("A", "R")))
}

#[tokio::test]
async fn test_client_builder() {
    let client = ClientBuilder::new()
        .base_url("http://localhost:5000")
        .user_agent("inkpost-test")
        .build_public();

    assert!(client.is_ok());
    let client = client.unwrap();
    assert_eq!(client.base_url(), "http://localhost:5000");
    assert_eq!(client.url("/api/posts"), "http://localhost:5000/api/posts");
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = ClientBuilder::new().build_session(Arc::new(MemoryStore::new()));
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_builder_from_config() {
    let config = inkpost_core::ApiConfig {
        base_url: "https://blog.example.com/".into(),
        ..inkpost_core::ApiConfig::default()
    };
    let client = ClientBuilder::from_config(&config).build_public().unwrap();
    assert_eq!(client.base_url(), "https://blog.example.com");
}

#[tokio::test]
async fn test_login_persists_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({"email": "ada@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "A1",
            "refreshToken": "R1",
            "user": {"id": 5, "name": "Ada", "email": "ada@example.com", "role": "user"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = session(&server, store.clone());

    let user = client.login("ada@example.com", "secret").await.unwrap();
    assert_eq!(user.id, Id::Num(5));
    assert_eq!(user.role, Role::User);

    assert_eq!(
        store.credentials().await.unwrap(),
        Some(CredentialPair::new("A1", "R1"))
    );
    assert_eq!(client.cached_user().await.unwrap(), Some(user));
    assert_eq!(client.state().await.unwrap(), SessionState::Authenticated);
}

#[tokio::test]
async fn test_login_without_user_fetches_profile() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"token": "A1", "refreshToken": "R1"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/protected"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "u-9", "role": "user"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = session(&server, Arc::new(MemoryStore::new()));
    let user = client.login("ada@example.com", "secret").await.unwrap();
    assert_eq!(user.id, Id::Str("u-9".into()));
}

#[tokio::test]
async fn test_rejected_login_is_not_session_expiry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = session(&server, store.clone());

    let err = client.login("ada@example.com", "wrong!").await.unwrap_err();
    assert!(!err.is_session_expired());
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(store.credentials().await.unwrap().is_none());
}

#[tokio::test]
async fn test_admin_login_requires_admin_role() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"token": "A", "refreshToken": "R"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/protected"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2, "role": "user"})))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let client = session(&server, store.clone());

    let err = client.admin_login("bob@example.com", "secret").await.unwrap_err();
    assert_eq!(err.user_message(), "Admin access required");
    assert!(store.credentials().await.unwrap().is_none());
    assert!(client.cached_user().await.unwrap().is_none());
}

#[tokio::test]
async fn test_admin_register_sends_role() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/register"))
        .and(body_json(json!({
            "name": "Root",
            "email": "root@example.com",
            "password": "secret",
            "role": "admin"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let client = PublicClient::new(server.uri()).unwrap();
    client
        .admin_register("Root", "root@example.com", "secret")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_logout_clears_store() {
    let store = signed_in();
    let client = ClientBuilder::new()
        .base_url("http://localhost:5000")
        .build_session(store.clone())
        .unwrap();

    client.logout().await.unwrap();
    assert!(store.credentials().await.unwrap().is_none());
    assert_eq!(client.state().await.unwrap(), SessionState::Anonymous);
}

#[tokio::test]
async fn test_public_listing_with_search() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param("search", "rust async"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "Async Rust", "excerpt": "e", "content": "c", "category": "dev"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/trending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 3, "title": "Crates", "summary": "s", "source": "blog"}
        ])))
        .mount(&server)
        .await;

    let client = PublicClient::new(server.uri()).unwrap();
    let posts = client.list_posts(Some("rust async")).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "Async Rust");

    let trending = client.list_trending(None).await.unwrap();
    assert_eq!(trending[0].source, "blog");
}

#[tokio::test]
async fn test_home_loads_all_collections_with_one_search() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param("search", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "Async Rust", "excerpt": "e", "content": "c", "category": "dev"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    for (collection, title) in [("/api/news", "Rust 2024"), ("/api/trending", "Tokio")] {
        Mock::given(method("GET"))
            .and(path(collection))
            .and(query_param("search", "rust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 2, "title": title, "summary": "s", "source": "blog"}
            ])))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = PublicClient::new(server.uri()).unwrap();
    let feed = client.home(Some("rust")).await.unwrap();

    assert_eq!(feed.posts[0].title, "Async Rust");
    assert_eq!(feed.news[0].title, "Rust 2024");
    assert_eq!(feed.trending[0].title, "Tokio");
}

#[tokio::test]
async fn test_home_fails_when_one_collection_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/news"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/trending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = PublicClient::new(server.uri()).unwrap();
    let err = client.home(None).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.user_message(), "Request failed");
}

#[tokio::test]
async fn test_string_ids_are_path_encoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/news/a%2Fb%3Fx%3D1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "a/b?x=1", "title": "Odd", "summary": "s", "source": "x"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/users/a%2Fb%3Fx%3D1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let id = Id::from("a/b?x=1");
    let public = PublicClient::new(server.uri()).unwrap();
    let item: FeedItem = public.get_content(ContentKind::News, &id).await.unwrap();
    assert_eq!(item.id, id);

    let client = session(&server, signed_in());
    client.delete_user(&id).await.unwrap();
}

#[tokio::test]
async fn test_public_failure_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts/42"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Post not found"})))
        .mount(&server)
        .await;

    let client = PublicClient::new(server.uri()).unwrap();
    let err = client.get_post(&Id::Num(42)).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.user_message(), "Post not found");
}

#[tokio::test]
async fn test_contact_acknowledgement() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .and(body_json(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "message": "Hello there, lovely blog"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "Got it"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 4})))
        .mount(&server)
        .await;

    let client = PublicClient::new(server.uri()).unwrap();
    let draft = ContactDraft {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        message: "Hello there, lovely blog".into(),
    };

    assert_eq!(client.send_contact(&draft).await.unwrap(), "Got it");
    assert_eq!(client.send_contact(&draft).await.unwrap(), CONTACT_THANKS);
}

#[tokio::test]
async fn test_dashboard_lists_only_own_items() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/news"))
        .and(query_param("userId", "7"))
        .and(header("authorization", "Bearer A"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "title": "Mine", "summary": "s", "source": "x", "user_id": 7},
            {"id": 2, "title": "Theirs", "summary": "s", "source": "x", "user_id": 8},
            {"id": 3, "title": "Orphan", "summary": "s", "source": "x"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = session(&server, signed_in());
    let items = client
        .my_feed_items(ContentKind::News, &Id::Num(7))
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Mine");
}

#[tokio::test]
async fn test_dashboard_writes_attach_author() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/posts"))
        .and(body_json(json!({
            "title": "Hello",
            "excerpt": "Short",
            "content": "Long",
            "category": "general",
            "userId": 7
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 11})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/trending/3"))
        .and(body_json(json!({
            "title": "Up",
            "summary": "Sum",
            "source": "Src",
            "userId": 7
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/news/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = session(&server, signed_in());
    let author = Id::Num(7);

    let created = client
        .create_post(
            &author,
            &PostDraft {
                title: "Hello".into(),
                excerpt: "Short".into(),
                content: "Long".into(),
                category: "general".into(),
                image: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(created["id"], 11);

    client
        .update_feed_item(
            ContentKind::Trending,
            &Id::Num(3),
            &author,
            &FeedItemDraft {
                title: "Up".into(),
                summary: "Sum".into(),
                source: "Src".into(),
            },
        )
        .await
        .unwrap();

    client
        .delete_content(ContentKind::News, &Id::Num(5))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_admin_user_management() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Root", "email": "root@example.com", "role": "admin"},
            {"id": 2, "name": "Ada", "email": "ada@example.com", "role": "user"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/users/2"))
        .and(body_json(json!({"name": "Ada L", "email": "ada@example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/users/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = session(&server, signed_in());

    let users = client.list_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert!(users[0].is_admin());

    client
        .update_user(
            &Id::Num(2),
            &UserUpdate {
                name: "Ada L".into(),
                email: "ada@example.com".into(),
                password: None,
            },
        )
        .await
        .unwrap();
    client.delete_user(&Id::Num(2)).await.unwrap();
}

#[tokio::test]
async fn test_admin_message_management() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/contact/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4,
            "name": "Ada",
            "email": "ada@example.com",
            "message": "Hello there, lovely blog",
            "created_at": "2024-05-01T10:00:00Z"
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/contact/4"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "Admin access required"})))
        .mount(&server)
        .await;

    let client = session(&server, signed_in());

    let message = client.get_message(&Id::Num(4)).await.unwrap();
    assert_eq!(message.created_at.as_deref(), Some("2024-05-01T10:00:00Z"));

    let err = client.delete_message(&Id::Num(4)).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert_eq!(client.state().await.unwrap(), SessionState::Authenticated);
}
