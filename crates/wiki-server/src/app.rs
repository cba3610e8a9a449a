//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, pages, rename};
use crate::middleware::auth::{self, Credentials};
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `credentials` - Basic auth credentials; `None` leaves the wiki open
pub(crate) fn create_router(state: Arc<AppState>, credentials: Option<Credentials>) -> Router {
    let mut router = Router::new()
        .route("/view/{*title}", get(pages::view))
        .route("/edit/{*title}", get(pages::edit))
        .route("/save/{*title}", post(pages::save))
        .route("/rename/{*title}", post(rename::rename))
        .route("/all", get(pages::all))
        .route("/all/", get(pages::all))
        .fallback(handlers::front_page)
        .with_state(state);

    if let Some(credentials) = credentials {
        router = router.layer(axum::middleware::from_fn_with_state(
            credentials,
            auth::basic_auth,
        ));
    }

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(security::content_type_options_layer())
            .layer(security::frame_options_layer()),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;
    use wiki_storage::{MockPageStore, PageStore};
    use wiki_storage_fs::FsPageStore;

    use super::*;
    use crate::templates::Templates;

    fn router_with(store: Arc<dyn PageStore>) -> Router {
        let state = Arc::new(AppState::new(store, Templates::builtin().unwrap()));
        create_router(state, None)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn form_request(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_view_renders_page() {
        let store = MockPageStore::new().with_page("TestWikiPage", "This is a sample wiki page");
        let app = router_with(Arc::new(store));

        let response = app.oneshot(get_request("/view/TestWikiPage")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(">TestWikiPage</h1>"));
        assert!(html.contains(">This is a sample wiki page<"));
    }

    #[tokio::test]
    async fn test_view_renders_markdown_links() {
        let store = MockPageStore::new().with_page("Home", "See [there](Other)");
        let app = router_with(Arc::new(store));

        let response = app.oneshot(get_request("/view/Home")).await.unwrap();

        let html = body_text(response).await;
        assert!(html.contains(r#"<a href="Other">there</a>"#));
    }

    #[tokio::test]
    async fn test_view_missing_redirects_to_edit() {
        let app = router_with(Arc::new(MockPageStore::new()));

        let response = app.oneshot(get_request("/view/Nothing")).await.unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/edit/Nothing");
    }

    #[tokio::test]
    async fn test_view_nested_title() {
        let store = MockPageStore::new().with_page("notes/today", "body");
        let app = router_with(Arc::new(store));

        let response = app.oneshot(get_request("/view/notes/today")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(">notes/today</h1>"));
    }

    #[tokio::test]
    async fn test_view_decodes_title() {
        let store = MockPageStore::new().with_page("Two Words", "body");
        let app = router_with(Arc::new(store));

        let response = app.oneshot(get_request("/view/Two%20Words")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_edit_existing_page() {
        let store = MockPageStore::new()
            .with_page("TestEditPage", "This is a sample wiki page to edit");
        let app = router_with(Arc::new(store));

        let response = app.oneshot(get_request("/edit/TestEditPage")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(">Editing TestEditPage</h1>"));
        assert!(html.contains(">This is a sample wiki page to edit</textarea>"));
    }

    #[tokio::test]
    async fn test_edit_missing_page_is_empty() {
        let app = router_with(Arc::new(MockPageStore::new()));

        let response = app.oneshot(get_request("/edit/Fresh")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(">Editing Fresh</h1>"));
        assert!(html.contains("></textarea>"));
    }

    #[tokio::test]
    async fn test_edit_escapes_body() {
        let store = MockPageStore::new().with_page("Page", "<script>x</script>");
        let app = router_with(Arc::new(store));

        let response = app.oneshot(get_request("/edit/Page")).await.unwrap();

        let html = body_text(response).await;
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn test_save_stores_and_redirects() {
        let store = Arc::new(MockPageStore::new());
        let app = router_with(Arc::clone(&store) as Arc<dyn PageStore>);

        let response = app
            .oneshot(form_request("/save/TestSavePage", &[("body", "saved body")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/view/TestSavePage");
        assert_eq!(store.body("TestSavePage"), Some(b"saved body".to_vec()));
    }

    #[tokio::test]
    async fn test_save_without_body_field_stores_empty() {
        let store = Arc::new(MockPageStore::new());
        let app = router_with(Arc::clone(&store) as Arc<dyn PageStore>);

        let response = app
            .oneshot(form_request("/save/Empty", &[]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(store.body("Empty"), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_save_failure_is_server_error() {
        let store = MockPageStore::new().with_failing_save("Locked");
        let app = router_with(Arc::new(store));

        let response = app
            .oneshot(form_request("/save/Locked", &[("body", "x")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_save_bad_page_name_on_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FsPageStore::open(temp_dir.path()).unwrap();
        let app = router_with(Arc::new(store));

        let response = app
            .oneshot(form_request("/save/Bad/Page/Name", &[("body", "x")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!temp_dir.path().join("Bad").exists());
    }

    #[tokio::test]
    async fn test_view_traversal_is_server_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FsPageStore::open(temp_dir.path().join("pages")).unwrap();
        std::fs::write(temp_dir.path().join("secret.txt"), "hidden").unwrap();
        let app = router_with(Arc::new(store));

        let response = app.oneshot(get_request("/view/..%2Fsecret")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body_text(response).await.contains("hidden"));
    }

    #[tokio::test]
    async fn test_rename_existing_redirects_to_view() {
        let store = Arc::new(
            MockPageStore::new()
                .with_page("Home", "See [there](OldName)")
                .with_page("OldName", "content"),
        );
        let app = router_with(Arc::clone(&store) as Arc<dyn PageStore>);

        let response = app
            .oneshot(form_request("/rename/OldName", &[("new_title", "NewName")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/view/NewName");
        assert_eq!(store.body("NewName"), Some(b"content".to_vec()));
        assert_eq!(store.body("OldName"), None);
        assert_eq!(store.body("Home"), Some(b"See [there](NewName)".to_vec()));
    }

    #[tokio::test]
    async fn test_rename_missing_redirects_to_edit() {
        let store = Arc::new(MockPageStore::new().with_page("Home", "See [there](Gone)"));
        let app = router_with(Arc::clone(&store) as Arc<dyn PageStore>);

        let response = app
            .oneshot(form_request("/rename/Gone", &[("new_title", "Back")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/edit/Back");
        assert_eq!(store.body("Home"), Some(b"See [there](Back)".to_vec()));
    }

    #[tokio::test]
    async fn test_rename_to_same_title_redirects_to_view() {
        let store = Arc::new(MockPageStore::new().with_page("Page", "content"));
        let app = router_with(Arc::clone(&store) as Arc<dyn PageStore>);

        let response = app
            .oneshot(form_request("/rename/Page", &[("new_title", "Page")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/view/Page");
        assert_eq!(store.body("Page"), Some(b"content".to_vec()));
    }

    #[tokio::test]
    async fn test_rename_onto_existing_page_keeps_both() {
        let store = Arc::new(
            MockPageStore::new()
                .with_page("A", "alpha")
                .with_page("B", "beta precious"),
        );
        let app = router_with(Arc::clone(&store) as Arc<dyn PageStore>);

        let response = app
            .oneshot(form_request("/rename/A", &[("new_title", "B")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.body("A"), Some(b"alpha".to_vec()));
        assert_eq!(store.body("B"), Some(b"beta precious".to_vec()));
    }

    #[tokio::test]
    async fn test_rename_empty_new_title_is_server_error() {
        let store = Arc::new(MockPageStore::new().with_page("Page", "content"));
        let app = router_with(Arc::clone(&store) as Arc<dyn PageStore>);

        let response = app
            .oneshot(form_request("/rename/Page", &[("new_title", "")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.body("Page"), Some(b"content".to_vec()));
    }

    #[tokio::test]
    async fn test_rename_rewrite_failure_is_server_error() {
        let store = Arc::new(
            MockPageStore::new()
                .with_page("Old", "content")
                .with_page("Linker", "[x](Old)")
                .with_failing_save("Linker"),
        );
        let app = router_with(Arc::clone(&store) as Arc<dyn PageStore>);

        let response = app
            .oneshot(form_request("/rename/Old", &[("new_title", "New")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.body("New"), Some(b"content".to_vec()));
        assert!(body_text(response).await.contains("Linker"));
    }

    #[tokio::test]
    async fn test_all_lists_sorted_titles() {
        let store = MockPageStore::new()
            .with_page("Zebra", "z")
            .with_page("Apple", "a");
        let app = router_with(Arc::new(store));

        let response = app.oneshot(get_request("/all/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        let apple = html.find(">Apple</a>").unwrap();
        let zebra = html.find(">Zebra</a>").unwrap();
        assert!(apple < zebra);
    }

    #[tokio::test]
    async fn test_all_without_trailing_slash() {
        let app = router_with(Arc::new(MockPageStore::new()));

        let response = app.oneshot(get_request("/all")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path_redirects_to_front_page() {
        let app = router_with(Arc::new(MockPageStore::new()));

        let response = app.oneshot(get_request("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/view/FrontPage");
    }

    #[tokio::test]
    async fn test_unknown_path_with_post_redirects_to_front_page() {
        let app = router_with(Arc::new(MockPageStore::new()));

        let response = app
            .oneshot(form_request("/nowhere", &[]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(location(&response), "/view/FrontPage");
    }

    #[tokio::test]
    async fn test_security_headers() {
        let app = router_with(Arc::new(MockPageStore::new()));

        let response = app.oneshot(get_request("/all/")).await.unwrap();

        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-frame-options"], "DENY");
    }

    #[tokio::test]
    async fn test_missing_template_dir_is_server_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = MockPageStore::new().with_page("Page", "body");
        let state = Arc::new(AppState::new(
            Arc::new(store),
            Templates::from_dir(temp_dir.path().join("missing")),
        ));
        let app = create_router(state, None);

        let response = app.oneshot(get_request("/view/Page")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.starts_with("open "));
    }

    #[tokio::test]
    async fn test_broken_template_has_no_partial_output() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join("view.html"),
            "<h1>{{ title }}</h1>{{ missing_filter_value|nosuchfilter }}",
        )
        .unwrap();
        let store = MockPageStore::new().with_page("Page", "body");
        let state = Arc::new(AppState::new(
            Arc::new(store),
            Templates::from_dir(temp_dir.path().to_path_buf()),
        ));
        let app = create_router(state, None);

        let response = app.oneshot(get_request("/view/Page")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body_text(response).await.contains("<h1>"));
    }

    /// Store whose saves wait until a listing has happened.
    struct GatedStore {
        inner: MockPageStore,
        listed: std::sync::mpsc::Sender<()>,
        gate: std::sync::Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl PageStore for GatedStore {
        fn load(&self, title: &str) -> Result<wiki_storage::Page, wiki_storage::StorageError> {
            self.inner.load(title)
        }

        fn save(&self, title: &str, body: &[u8]) -> Result<(), wiki_storage::StorageError> {
            let gate = self.gate.lock().unwrap();
            gate.recv_timeout(std::time::Duration::from_secs(5))
                .map_err(|_| wiki_storage::StorageError::new(wiki_storage::StorageErrorKind::Other))?;
            self.inner.save(title, body)
        }

        fn list(&self) -> Result<Vec<String>, wiki_storage::StorageError> {
            let _ = self.listed.send(());
            self.inner.list()
        }

        fn rename(
            &self,
            old_title: &str,
            new_title: &str,
        ) -> Result<wiki_storage::RenameStatus, wiki_storage::StorageError> {
            self.inner.rename(old_title, new_title)
        }

        fn exists(&self, title: &str) -> bool {
            self.inner.exists(title)
        }
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_slow_save_does_not_block_other_requests() {
        let (listed, gate) = std::sync::mpsc::channel();
        let store = GatedStore {
            inner: MockPageStore::new(),
            listed,
            gate: std::sync::Mutex::new(gate),
        };
        let app = router_with(Arc::new(store));

        let save = tokio::spawn(
            app.clone()
                .oneshot(form_request("/save/Slow", &[("body", "x")])),
        );
        tokio::task::yield_now().await;

        let listing = app.oneshot(get_request("/all/")).await.unwrap();
        assert_eq!(listing.status(), StatusCode::OK);

        let saved = save.await.unwrap().unwrap();
        assert_eq!(saved.status(), StatusCode::FOUND);
    }

    fn auth_router() -> Router {
        let store = MockPageStore::new().with_page("FrontPage", "welcome");
        let state = Arc::new(AppState::new(Arc::new(store), Templates::builtin().unwrap()));
        create_router(state, Some(Credentials::new("user", "secret")))
    }

    fn authorized(uri: &str, value: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_auth_missing_header() {
        let response = auth_router()
            .oneshot(get_request("/view/FrontPage"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            r#"Basic realm="wiki""#
        );
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert_eq!(
            body_text(response).await,
            r#"Authorization header should be "Basic username:password""#
        );
    }

    #[tokio::test]
    async fn test_auth_wrong_credentials() {
        let value = format!("Basic {}", STANDARD.encode("user:wrong"));

        let response = auth_router()
            .oneshot(authorized("/view/FrontPage", &value))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, "Username/password validation failed");
    }

    #[tokio::test]
    async fn test_auth_bad_base64() {
        let response = auth_router()
            .oneshot(authorized("/view/FrontPage", "Basic %%%"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(!body_text(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_auth_valid_credentials() {
        let value = format!("Basic {}", STANDARD.encode("user:secret"));

        let response = auth_router()
            .oneshot(authorized("/view/FrontPage", &value))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(">welcome<"));
    }

    #[tokio::test]
    async fn test_auth_guards_fallback() {
        let response = auth_router().oneshot(get_request("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
