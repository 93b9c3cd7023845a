use libreria_chatbot::message::ChatResponse;
use libreria_chatbot::routes::create_router;
use libreria_chatbot::services::chat_session::{ChatSession, MessageRole};
use libreria_chatbot::services::gemini::{ChatModel, Content, UpstreamError};
use libreria_chatbot::state::AppState;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::util::ServiceExt;

const INSTRUCTION: &str = "Eres un librero.\nA continuación la pregunta:\n";

/// Replies with "re: <last prompt>" and remembers what it was sent.
#[derive(Default)]
struct EchoModel {
    calls: Mutex<Vec<Vec<Content>>>,
    delay: Option<Duration>,
}

#[async_trait]
impl ChatModel for EchoModel {
    async fn generate(&self, contents: &[Content]) -> Result<String, UpstreamError> {
        self.calls.lock().unwrap().push(contents.to_vec());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let last = contents
            .last()
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.clone())
            .unwrap_or_default();
        Ok(format!("re: {last}"))
    }
}

struct FailingModel;

#[async_trait]
impl ChatModel for FailingModel {
    async fn generate(&self, _contents: &[Content]) -> Result<String, UpstreamError> {
        Err(UpstreamError::Http {
            status: 429,
            body: "quota exceeded".into(),
        })
    }
}

fn app_with(model: Arc<dyn ChatModel>) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(ChatSession::new(model), INSTRUCTION));
    (create_router().with_state(state.clone()), state)
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_reply(response: axum::response::Response) -> ChatResponse {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn test_pregunta_relays_prefixed_prompt() {
    let model = Arc::new(EchoModel::default());
    let (app, state) = app_with(model.clone());

    let response = app
        .oneshot(json_post("/pregunta", r#"{"user": "¿Tienen Dune?"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reply = read_reply(response).await;
    let expected_prompt = format!("{INSTRUCTION}¿Tienen Dune?");
    assert_eq!(reply.response, format!("re: {expected_prompt}"));

    let calls = model.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], vec![Content::new("user", expected_prompt.clone())]);
    drop(calls);

    let history = state.session.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, expected_prompt);
}

#[tokio::test]
async fn test_pregunta_missing_user_is_400() {
    let (app, state) = app_with(Arc::new(EchoModel::default()));

    let response = app
        .oneshot(json_post("/pregunta", r#"{"message": "hola"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_reply(response).await.response,
        "No se proporcionó 'user_input' en el JSON."
    );
    assert!(state.session.is_empty().await);
}

#[tokio::test]
async fn test_pregunta_malformed_body_is_500() {
    let (app, _) = app_with(Arc::new(EchoModel::default()));

    let response = app
        .oneshot(json_post("/pregunta", "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_reply(response).await.response,
        "Hubo un error al procesar la pregunta."
    );
}

async fn assert_processing_error(app: Router, request: Request<Body>) {
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_reply(response).await.response,
        "Hubo un error al procesar la pregunta."
    );
}

#[tokio::test]
async fn test_pregunta_wrong_content_type_is_500() {
    let (app, state) = app_with(Arc::new(EchoModel::default()));

    let request = Request::builder()
        .method("POST")
        .uri("/pregunta")
        .header("content-type", "text/plain")
        .body(Body::from(r#"{"user": "hola"}"#))
        .unwrap();
    assert_processing_error(app, request).await;
    assert!(state.session.is_empty().await);
}

#[tokio::test]
async fn test_pregunta_non_string_user_is_500() {
    let (app, _) = app_with(Arc::new(EchoModel::default()));
    assert_processing_error(app.clone(), json_post("/pregunta", r#"{"user": 5}"#)).await;
    assert_processing_error(app, json_post("/pregunta", r#"{"user": null}"#)).await;
}

#[tokio::test]
async fn test_pregunta_array_without_user_is_400() {
    let (app, _) = app_with(Arc::new(EchoModel::default()));

    let response = app.oneshot(json_post("/pregunta", "[]")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_reply(response).await.response,
        "No se proporcionó 'user_input' en el JSON."
    );
}

#[tokio::test]
async fn test_pregunta_upstream_failure_is_500() {
    let (app, state) = app_with(Arc::new(FailingModel));

    let response = app
        .oneshot(json_post("/pregunta", r#"{"user": "hola"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_reply(response).await.response,
        "Hubo un error al procesar la pregunta."
    );
    assert!(state.session.is_empty().await);
}

#[tokio::test]
async fn test_ask_form_success() {
    let (app, _) = app_with(Arc::new(EchoModel::default()));

    let response = app
        .oneshot(form_post("/ask", "user_input=hola+librero"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_reply(response).await.response,
        format!("re: {INSTRUCTION}hola librero")
    );
}

fn multipart_post(fields: &[(&str, &str)]) -> Request<Body> {
    let boundary = "XlibreriaBoundary";
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/ask")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_ask_multipart_success() {
    let (app, _) = app_with(Arc::new(EchoModel::default()));

    let response = app
        .oneshot(multipart_post(&[("user_input", "¿Tienen Aura?")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_reply(response).await.response,
        format!("re: {INSTRUCTION}¿Tienen Aura?")
    );
}

#[tokio::test]
async fn test_ask_multipart_without_field_apologizes() {
    let (app, state) = app_with(Arc::new(EchoModel::default()));

    let response = app
        .oneshot(multipart_post(&[("other", "x")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_reply(response).await.response,
        "¿Podrías volver a formular tu pregunta?, no entendí bien."
    );
    assert!(state.session.is_empty().await);
}

#[tokio::test]
async fn test_ask_missing_field_apologizes_with_200() {
    let (app, state) = app_with(Arc::new(EchoModel::default()));

    let response = app
        .oneshot(form_post("/ask", "other=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_reply(response).await.response,
        "¿Podrías volver a formular tu pregunta?, no entendí bien."
    );
    assert!(state.session.is_empty().await);
}

#[tokio::test]
async fn test_ask_upstream_failure_apologizes_with_200() {
    let (app, _) = app_with(Arc::new(FailingModel));

    let response = app
        .oneshot(form_post("/ask", "user_input=hola"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_reply(response).await.response,
        "¿Podrías volver a formular tu pregunta?, no entendí bien."
    );
}

#[tokio::test]
async fn test_index_is_static_and_leaves_session_alone() {
    let (app, state) = app_with(Arc::new(EchoModel::default()));

    let mut bodies = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
        assert!(content_type.starts_with("text/html"));
        bodies.push(axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap());
    }

    assert_eq!(bodies[0], bodies[1]);
    assert!(!bodies[0].is_empty());
    assert!(state.session.is_empty().await);
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app_with(Arc::new(EchoModel::default()));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_concurrent_preguntas_keep_history_paired() {
    let model = Arc::new(EchoModel {
        delay: Some(Duration::from_millis(20)),
        ..Default::default()
    });
    let (app, state) = app_with(model);

    let (a, b) = tokio::join!(
        app.clone().oneshot(json_post("/pregunta", r#"{"user": "uno"}"#)),
        app.clone().oneshot(json_post("/pregunta", r#"{"user": "dos"}"#)),
    );
    assert_eq!(a.unwrap().status(), StatusCode::OK);
    assert_eq!(b.unwrap().status(), StatusCode::OK);

    let history = state.session.history().await;
    assert_eq!(history.len(), 4);
    for pair in history.chunks(2) {
        assert_eq!(pair[0].role, MessageRole::User);
        assert_eq!(pair[1].role, MessageRole::Model);
        assert_eq!(pair[1].content, format!("re: {}", pair[0].content));
    }
}
