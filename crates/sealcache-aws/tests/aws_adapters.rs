//! S3 and KMS adapters against a mock AWS endpoint.

use sealcache::{CacheConfig, EncryptionContext, Error, RemoteCall};
use sealcache_aws::{ClientOptions, build_clients, connect};
use sealcache_core::StaticCredentials;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CIPHERTEXT: &[u8] = b"myValueInCiphertext";
const CIPHERTEXT_B64: &str = "bXlWYWx1ZUluQ2lwaGVydGV4dA==";
// base64 of "plaintext"
const PLAINTEXT_B64: &str = "cGxhaW50ZXh0";

fn options(server: &MockServer) -> ClientOptions {
    ClientOptions {
        region: "us-east-1".to_string(),
        credentials: Some(StaticCredentials::new("AKIDEXAMPLE", "secret")),
        s3_endpoint: Some(server.uri()),
        kms_endpoint: Some(server.uri()),
        force_path_style: true,
    }
}

fn config(server: &MockServer) -> CacheConfig {
    CacheConfig::builder()
        .bucket("b")
        .region("us-east-1")
        .context_attribute("app", "x")
        .credentials(StaticCredentials::new("AKIDEXAMPLE", "secret"))
        .s3_endpoint(server.uri())
        .kms_endpoint(server.uri())
        .force_path_style(true)
        .build()
}

fn s3_error(status: u16, code: &str) -> ResponseTemplate {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <Error><Code>{code}</Code><Message>{code} raised</Message><RequestId>req-1</RequestId></Error>"
    );
    ResponseTemplate::new(status).set_body_raw(body, "application/xml")
}

fn kms_json(status: u16, body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body.to_string(), "application/x-amz-json-1.1")
}

async fn mock_object(server: &MockServer, key: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/b/{key}")))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn mock_decrypt(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", "TrentService.Decrypt"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_s3_returns_object_body() {
    let server = MockServer::start().await;
    mock_object(
        &server,
        "k1",
        ResponseTemplate::new(200).set_body_bytes(CIPHERTEXT.to_vec()),
    )
    .await;

    let clients = build_clients(options(&server)).await;
    let body = clients.blobs.fetch_object("b", "k1").await.unwrap();

    assert_eq!(body, CIPHERTEXT);
    assert_eq!(clients.blobs.target().export, "S3");
}

#[tokio::test]
async fn test_s3_no_such_key_keeps_code() {
    let server = MockServer::start().await;
    mock_object(&server, "k2", s3_error(404, "NoSuchKey")).await;

    let clients = build_clients(options(&server)).await;
    let err = clients.blobs.fetch_object("b", "k2").await.unwrap_err();

    assert_eq!(err.operation, RemoteCall::GetObject);
    assert_eq!(err.code.as_deref(), Some("NoSuchKey"));
}

#[tokio::test]
async fn test_s3_access_denied_keeps_code() {
    let server = MockServer::start().await;
    mock_object(&server, "k2", s3_error(403, "AccessDenied")).await;

    let clients = build_clients(options(&server)).await;
    let err = clients.blobs.fetch_object("b", "k2").await.unwrap_err();

    assert_eq!(err.code.as_deref(), Some("AccessDenied"));
}

#[tokio::test]
async fn test_kms_sends_context_and_returns_plaintext() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", "TrentService.Decrypt"))
        .and(body_partial_json(json!({
            "CiphertextBlob": CIPHERTEXT_B64,
            "EncryptionContext": {"app": "x", "keyId": "k1"}
        })))
        .respond_with(kms_json(200, json!({"KeyId": "arn:aws:kms:us-east-1:1:key/1", "Plaintext": PLAINTEXT_B64})))
        .expect(1)
        .mount(&server)
        .await;

    let clients = build_clients(options(&server)).await;
    let context = EncryptionContext::new().with("app", "x").with("keyId", "k1");
    let plaintext = clients.keys.decrypt(CIPHERTEXT, &context).await.unwrap();

    assert_eq!(plaintext, Some(b"plaintext".to_vec()));
}

#[tokio::test]
async fn test_kms_without_plaintext_is_none() {
    let server = MockServer::start().await;
    mock_decrypt(&server, kms_json(200, json!({"KeyId": "arn:aws:kms:us-east-1:1:key/1"}))).await;

    let clients = build_clients(options(&server)).await;
    let plaintext = clients
        .keys
        .decrypt(CIPHERTEXT, &EncryptionContext::new())
        .await
        .unwrap();

    assert_eq!(plaintext, None);
}

#[tokio::test]
async fn test_kms_service_error_keeps_code() {
    let server = MockServer::start().await;
    mock_decrypt(
        &server,
        kms_json(400, json!({"__type": "InvalidCiphertextException", "message": "bad ciphertext"})),
    )
    .await;

    let clients = build_clients(options(&server)).await;
    let err = clients
        .keys
        .decrypt(CIPHERTEXT, &EncryptionContext::new())
        .await
        .unwrap_err();

    assert_eq!(err.operation, RemoteCall::Decrypt);
    assert_eq!(err.code.as_deref(), Some("InvalidCiphertextException"));
}

#[tokio::test]
async fn test_connect_resolves_and_caches_through_aws() {
    let server = MockServer::start().await;
    mock_object(
        &server,
        "k1",
        ResponseTemplate::new(200).set_body_bytes(CIPHERTEXT.to_vec()),
    )
    .await;
    mock_decrypt(&server, kms_json(200, json!({"Plaintext": PLAINTEXT_B64}))).await;
    mock_object(&server, "k2", s3_error(404, "NoSuchKey")).await;

    let cache = connect(config(&server)).await.unwrap();

    assert_eq!(cache.get("k1").await.unwrap(), Some(b"plaintext".to_vec()));
    assert_eq!(cache.get("k1").await.unwrap(), Some(b"plaintext".to_vec()));
    assert_eq!(cache.get("k2").await.unwrap(), None);
    assert_eq!(cache.get("k2").await.unwrap(), None);
    assert_eq!(cache.cached_len(), 2);
}

#[tokio::test]
async fn test_connect_surfaces_decrypt_failure() {
    let server = MockServer::start().await;
    mock_object(
        &server,
        "k1",
        ResponseTemplate::new(200).set_body_bytes(CIPHERTEXT.to_vec()),
    )
    .await;
    mock_decrypt(
        &server,
        kms_json(400, json!({"__type": "AccessDeniedException", "message": "denied"})),
    )
    .await;

    let cache = connect(config(&server)).await.unwrap();
    let err = cache.get("k1").await.unwrap_err();

    assert!(matches!(err, Error::Decrypt(_)));
    assert!(cache.cached("k1").is_none());
}

#[tokio::test]
async fn test_connect_rejects_invalid_config_without_requests() {
    let server = MockServer::start().await;
    let config = CacheConfig::builder().region("us-east-1").build();

    let err = connect(config).await.err().expect("connect should fail");

    assert!(matches!(err, Error::Config(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
