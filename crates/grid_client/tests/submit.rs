use std::sync::Arc;

use grid_client::{
    BatchId, BatchSubmission, BatchSubmitter, ClientConfig, FilePayload, FileSlot, GridClient,
    SubmitError, UPLOAD_REJECTED_FALLBACK,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn submitter_for(base: &str) -> BatchSubmitter {
    let config = ClientConfig::default().with_api_base(base).unwrap();
    BatchSubmitter::new(Arc::new(GridClient::new(config).unwrap()))
}

fn payload(slot: FileSlot) -> FilePayload {
    FilePayload::new(
        format!("{}.csv", slot.field_name()),
        format!("id,value\n1,{}\n", slot.field_name()).into_bytes(),
    )
}

fn full_submission() -> BatchSubmission {
    FileSlot::ALL
        .into_iter()
        .fold(BatchSubmission::new(), |submission, slot| {
            submission.with_file(slot, payload(slot))
        })
}

fn accepted() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "batch_id": "BATCH_2026_10_18_9F00AB12",
        "status": "processing",
        "files_received": 5
    }))
}

/// Value of a plain (non-file) multipart field, if present.
fn text_field(body: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{name}\"");
    let start = body.find(&marker)? + marker.len();
    let rest = &body[start..];
    let value_start = rest.find("\r\n\r\n")? + 4;
    let value = &rest[value_start..];
    let value_end = value.find("\r\n")?;
    Some(value[..value_end].to_string())
}

fn single_request(requests: &[Request]) -> String {
    assert_eq!(requests.len(), 1, "expected exactly one upload request");
    String::from_utf8_lossy(&requests[0].body).into_owned()
}

#[tokio::test]
async fn incomplete_submissions_never_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(accepted())
        .expect(0)
        .mount(&server)
        .await;
    let submitter = submitter_for(&format!("{}/api", server.uri()));

    for mask in 0u8..31 {
        let mut submission = BatchSubmission::new().with_start_index("0");
        for (bit, slot) in FileSlot::ALL.into_iter().enumerate() {
            if mask & (1 << bit) != 0 {
                submission.set_file(slot, payload(slot));
            }
        }

        let err = submitter.submit(&submission).await.unwrap_err();
        match err {
            SubmitError::MissingFiles { missing } => {
                assert!(!missing.is_empty());
                assert_eq!(missing, submission.missing_slots());
            }
            other => panic!("mask {mask:05b}: unexpected error {other:?}"),
        }
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn five_files_and_no_bounds_send_one_multipart_post() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/batch/upload"))
        .respond_with(accepted())
        .expect(1)
        .mount(&server)
        .await;
    let submitter = submitter_for(&format!("{}/api", server.uri()));

    let receipt = submitter.submit(&full_submission()).await.unwrap();
    assert_eq!(receipt.batch_id, BatchId::from("BATCH_2026_10_18_9F00AB12"));
    assert_eq!(receipt.status.as_deref(), Some("processing"));
    assert_eq!(receipt.files_received, Some(5));

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = single_request(&requests);
    assert_eq!(body.matches("filename=").count(), 5);
    for slot in FileSlot::ALL {
        let disposition = format!(
            "name=\"{}\"; filename=\"{}.csv\"",
            slot.field_name(),
            slot.field_name()
        );
        assert!(body.contains(&disposition), "missing part {disposition}");
    }
    assert_eq!(text_field(&body, "start_index"), None);
    assert_eq!(text_field(&body, "end_index"), None);
}

#[tokio::test]
async fn present_bound_is_sent_and_empty_bound_omitted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/batch/upload"))
        .respond_with(accepted())
        .expect(1)
        .mount(&server)
        .await;
    let submitter = submitter_for(&format!("{}/api", server.uri()));

    let submission = full_submission().with_start_index("5").with_end_index("");
    submitter.submit(&submission).await.unwrap();

    let body = single_request(&server.received_requests().await.unwrap());
    assert_eq!(text_field(&body, "start_index").as_deref(), Some("5"));
    assert_eq!(text_field(&body, "end_index"), None);
    assert_eq!(body.matches("filename=").count(), 5);
}

#[tokio::test]
async fn both_bounds_are_sent_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/batch/upload"))
        .respond_with(accepted())
        .mount(&server)
        .await;
    let submitter = submitter_for(&format!("{}/api", server.uri()));

    // Ordering is the server's business.
    let submission = full_submission()
        .with_start_index(" 40 ")
        .with_end_index("10");
    submitter.submit(&submission).await.unwrap();

    let body = single_request(&server.received_requests().await.unwrap());
    assert_eq!(text_field(&body, "start_index").as_deref(), Some("40"));
    assert_eq!(text_field(&body, "end_index").as_deref(), Some("10"));
}

#[tokio::test]
async fn rejection_detail_becomes_the_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/batch/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_raw(
            r#"{"detail":"bad schema"}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;
    let submitter = submitter_for(&format!("{}/api", server.uri()));

    let err = submitter.submit(&full_submission()).await.unwrap_err();
    assert_eq!(
        err,
        SubmitError::Rejected {
            status: 400,
            message: "bad schema".to_string()
        }
    );
    assert_eq!(err.to_string(), "bad schema");
}

#[tokio::test]
async fn unparseable_rejection_uses_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/batch/upload"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .expect(1)
        .mount(&server)
        .await;
    let submitter = submitter_for(&format!("{}/api", server.uri()));

    let err = submitter.submit(&full_submission()).await.unwrap_err();
    assert_eq!(
        err,
        SubmitError::Rejected {
            status: 502,
            message: UPLOAD_REJECTED_FALLBACK.to_string()
        }
    );
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Grab a free port and release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let base = format!("http://127.0.0.1:{port}/api");

    let submitter = submitter_for(&base);
    let err = submitter.submit(&full_submission()).await.unwrap_err();
    assert!(matches!(err, SubmitError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn success_without_batch_id_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/batch/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&server)
        .await;
    let submitter = submitter_for(&format!("{}/api", server.uri()));

    let err = submitter.submit(&full_submission()).await.unwrap_err();
    assert!(matches!(err, SubmitError::InvalidResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn failed_submission_can_be_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/batch/upload"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(serde_json::json!({"detail": "try again"})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/batch/upload"))
        .respond_with(accepted())
        .mount(&server)
        .await;
    let submitter = submitter_for(&format!("{}/api", server.uri()));
    let submission = full_submission();

    assert!(submitter.submit(&submission).await.is_err());
    // Nothing is retried behind the caller's back.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    let receipt = submitter.submit(&submission).await.unwrap();
    assert_eq!(receipt.batch_id.as_str(), "BATCH_2026_10_18_9F00AB12");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
