//! HTTP surface: snapshot and write endpoints plus the demo host page.
//!
//! Pure Rust HTTP stack (axum + hyper) with JSON via serde.

pub mod api;
pub mod csrf;
pub mod page;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::capture::{Accumulator, TranslationProvider, Translator};
use crate::store::TranslationStore;

pub use csrf::{CSRF_FIELD, CSRF_HEADER, CsrfToken};

/// Default mount point of the translator endpoints.
pub const DEFAULT_PREFIX: &str = "/translator";

/// Shared state of every handler.
#[derive(Clone)]
pub struct ServerState {
    /// Capture shared with the page translator.
    pub accumulator: Arc<Accumulator>,
    /// Store receiving edits.
    pub store: Arc<dyn TranslationStore>,
    /// Capturing translator used to render pages.
    pub translator: Arc<Translator<Arc<dyn TranslationProvider>>>,
    /// Token writes must present.
    pub csrf: CsrfToken,
}

impl ServerState {
    /// What: Wire a provider/store pair to a fresh accumulator.
    ///
    /// Inputs:
    /// - `provider`: Lookup side, usually the same object as `store`
    /// - `store`: Write side
    /// - `csrf`: Token writes must present
    pub fn new(
        provider: Arc<dyn TranslationProvider>,
        store: Arc<dyn TranslationStore>,
        csrf: CsrfToken,
    ) -> Self {
        let accumulator = Arc::new(Accumulator::new());
        let translator = Arc::new(Translator::new(provider, Arc::clone(&accumulator)));
        Self {
            accumulator,
            store,
            translator,
            csrf,
        }
    }
}

/// What: Build the router with every endpoint mounted under `prefix`.
///
/// Inputs:
/// - `state`: Shared handler state
/// - `prefix`: Mount point such as `/translator` (a trailing `/` is ignored)
///
/// Output:
/// - Router with the demo page at `/` and the translator endpoints under `prefix`
pub fn router(state: ServerState, prefix: &str) -> Router {
    let prefix = prefix.trim_end_matches('/');
    Router::new()
        .route("/", get(page::index))
        .route(&format!("{prefix}/translations.json"), get(api::snapshot))
        .route(&format!("{prefix}/translations"), delete(api::reset))
        .route(&format!("{prefix}/translate"), post(api::translate_form))
        .route(&format!("{prefix}/translate.json"), post(api::translate_json))
        .with_state(state)
}

/// What: Serve `router` on `addr` until Ctrl-C.
///
/// # Errors
/// - Binding the listener or accepting connections fails
pub async fn serve(addr: SocketAddr, state: ServerState, prefix: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, prefix, "translator server listening");
    axum::serve(listener, router(state, prefix))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt; // For oneshot()

    fn state() -> ServerState {
        let store = Arc::new(
            MemoryStore::from_yaml_str(
                "en",
                "en:\n  greeting: Hello\n  farewell: \"Bye %{name}\"\n  home:\n    title: Home\n",
            )
            .expect("valid yaml"),
        );
        let provider: Arc<dyn TranslationProvider> = store.clone();
        ServerState::new(provider, store, CsrfToken::from_config(Some("tok")))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_page_render_fills_snapshot() {
        let state = state();
        let app = router(state.clone(), DEFAULT_PREFIX);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let html = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let html = String::from_utf8_lossy(&html);
        assert!(html.contains(r#"<meta name="csrf-token" content="tok">"#));
        assert!(html.contains("Bye Alice"));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/translator/translations.json")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["en"]["farewell"]["value"], "Bye %{name}");
        assert_eq!(json["en"]["farewell"]["options"]["name"], "Alice");
        assert_eq!(json["en"]["home.title"]["value"], "Home");
        assert_eq!(json["en"]["errors.messages.blank"]["value"], "");
    }

    #[tokio::test]
    async fn test_form_write_requires_token() {
        let app = router(state(), DEFAULT_PREFIX);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/translator/translate")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("translations%5Ben%5D%5Bgreeting%5D=Hi"))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_form_write_updates_store_and_resets_capture() {
        let state = state();
        state.translator.t("greeting", &crate::capture::Options::new()).expect("renders");
        assert!(!state.accumulator.is_empty());

        let app = router(state.clone(), DEFAULT_PREFIX);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/translator/translate")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .header(CSRF_HEADER, "tok")
                    .body(Body::from(
                        "translations%5Ben%5D%5Bgreeting%5D=Hi&translations%5Ben%5D%5Bfarewell%5D=Bye+%25%7Bname%7D",
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["written"], 1);
        assert_eq!(
            state.store.get("en", "greeting"),
            Some(crate::capture::Value::scalar("Hi"))
        );
        assert!(state.accumulator.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_field_is_bad_request() {
        let app = router(state(), DEFAULT_PREFIX);
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/translator/translate")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("authenticity_token=tok&translations%5Ben%5D=Hi"))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_json_write_and_conflict() {
        let state = state();
        let app = router(state.clone(), DEFAULT_PREFIX);
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/translator/translate.json")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(CSRF_HEADER, "tok")
                    .body(Body::from(r#"{"translations":{"de":{"greeting":"Hallo"}}}"#))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            state.store.get("de", "greeting"),
            Some(crate::capture::Value::scalar("Hallo"))
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/translator/translate.json")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(CSRF_HEADER, "tok")
                    .body(Body::from(r#"{"translations":{"en":{"greeting.deeper":"x"}}}"#))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["code"], "INVALID_TRANSLATION");
    }

    #[tokio::test]
    async fn test_reset_and_locale_filter() {
        let state = state();
        state
            .translator
            .t("greeting", &crate::capture::Options::new().with("locale", "de"))
            .expect("renders");
        state.translator.t("greeting", &crate::capture::Options::new()).expect("renders");
        let app = router(state.clone(), "/translator/");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/translator/translations.json?locale=de")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let json = body_json(response).await;
        assert!(json.get("en").is_none());
        assert_eq!(json["de"]["greeting"]["value"], "");

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/translator/translations")
                    .header(CSRF_HEADER, "tok")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(state.accumulator.is_empty());
    }
}
