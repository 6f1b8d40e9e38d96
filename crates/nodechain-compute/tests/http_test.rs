//! Integration tests for HttpComputeService against a mock compute service.

use nodechain_compute::{
  ChainRequest, ComputeConfig, ComputeError, ComputeService, HttpComputeService, ImageRequest,
  PromptRequest,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpComputeService {
  HttpComputeService::new(ComputeConfig::new(server.uri(), "user-42")).unwrap()
}

#[tokio::test]
async fn test_prompt_node_sends_encoded_params() {
  let server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/api/run/prompt_node"))
    .and(query_param("prompt", "Hello\nWorld & more"))
    .and(query_param("temperature", "0.5"))
    .and(query_param("length", "128"))
    .and(query_param("userid", "user-42"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": "generated" })))
    .expect(1)
    .mount(&server)
    .await;

  let output = client_for(&server)
    .prompt_node(&PromptRequest {
      prompt: "Hello\nWorld & more".to_string(),
      temperature: 0.5,
      length: 128,
    })
    .await
    .unwrap();

  assert_eq!(output, "generated");
}

#[tokio::test]
async fn test_chain_node_sends_input() {
  let server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/api/run/chain_node"))
    .and(query_param("prompt", "Summarize"))
    .and(query_param("input", "first\nsecond"))
    .and(query_param("userid", "user-42"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": "summary" })))
    .mount(&server)
    .await;

  let output = client_for(&server)
    .chain_node(&ChainRequest {
      prompt: "Summarize".to_string(),
      input: "first\nsecond".to_string(),
      temperature: 0.7,
      length: 256,
    })
    .await
    .unwrap();

  assert_eq!(output, "summary");
}

#[tokio::test]
async fn test_non_success_status_is_error() {
  let server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/api/run/prompt_node"))
    .respond_with(ResponseTemplate::new(503).set_body_string("model overloaded"))
    .mount(&server)
    .await;

  let result = client_for(&server)
    .prompt_node(&PromptRequest {
      prompt: "Hi".to_string(),
      temperature: 0.7,
      length: 16,
    })
    .await;

  match result {
    Err(ComputeError::Status { status, body }) => {
      assert_eq!(status, 503);
      assert_eq!(body, "model overloaded");
    }
    other => panic!("expected status error, got {:?}", other),
  }
}

#[tokio::test]
async fn test_missing_output_field_is_decode_error() {
  let server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/api/run/prompt_node"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "wrong key" })))
    .mount(&server)
    .await;

  let result = client_for(&server)
    .prompt_node(&PromptRequest {
      prompt: "Hi".to_string(),
      temperature: 0.7,
      length: 16,
    })
    .await;

  assert!(matches!(result, Err(ComputeError::Decode(_))));
}

#[tokio::test]
async fn test_text_to_image_returns_bytes() {
  let server = MockServer::start().await;
  let png = vec![0x89, b'P', b'N', b'G'];

  Mock::given(method("GET"))
    .and(path("/api/run/txt_to_img_node"))
    .and(query_param("prompt", "a red fox"))
    .and(query_param("userid", "user-42"))
    .respond_with(ResponseTemplate::new(200).set_body_raw(png.clone(), "image/png"))
    .mount(&server)
    .await;

  let payload = client_for(&server)
    .text_to_image(&ImageRequest {
      prompt: "a red fox".to_string(),
    })
    .await
    .unwrap();

  assert_eq!(payload.bytes.as_ref(), png.as_slice());
  assert_eq!(payload.content_type, "image/png");
}

#[tokio::test]
async fn test_run_notifications() {
  let server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/api/run/start"))
    .and(query_param("userid", "user-42"))
    .respond_with(ResponseTemplate::new(200))
    .expect(1)
    .mount(&server)
    .await;

  Mock::given(method("GET"))
    .and(path("/api/run/end"))
    .respond_with(ResponseTemplate::new(500))
    .mount(&server)
    .await;

  let client = client_for(&server);
  assert!(client.run_start().await.is_ok());
  assert!(matches!(
    client.run_end().await,
    Err(ComputeError::Status { status: 500, .. })
  ));
}
