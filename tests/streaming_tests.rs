use std::time::Duration;

use futures::StreamExt;
use ollama_tutor::{
    CompletionClient, ErrorKind, GenerationChunk, GenerationRequest, LlmError, OllamaConfig,
};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

const PROMPT: &str = "Explique o conceito de frações para um estudante de nível fácil.";

fn client_for(server: &MockServer) -> CompletionClient {
    CompletionClient::new(OllamaConfig::new().with_base_url(server.uri())).expect("client")
}

fn streamed_request() -> GenerationRequest {
    GenerationRequest::builder()
        .model("llama3")
        .prompt(PROMPT)
        .stream(true)
        .build()
        .expect("valid request")
}

async fn mount_stream(server: &MockServer, body: &str) {
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({ "stream": true })))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "application/x-ndjson"),
        )
        .mount(server)
        .await;
}

/// Run a streamed call and collect every chunk handed to the callback.
async fn collect_chunks(
    client: &CompletionClient,
    request: GenerationRequest,
) -> (Vec<GenerationChunk>, ollama_tutor::GenerationResult) {
    let mut chunks = Vec::new();
    let mut sink = |chunk: &GenerationChunk| chunks.push(chunk.clone());
    let result = client.generate(request, Some(&mut sink)).await;
    (chunks, result)
}

#[tokio::test]
async fn fragments_are_forwarded_in_order_and_reassembled() {
    let server = MockServer::start().await;
    mount_stream(&server, "{\"response\":\"Fra\"}\n{\"response\":\"ções...\"}\n").await;

    let (chunks, result) = collect_chunks(&client_for(&server), streamed_request()).await;

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["Fra", "ções..."]);
    assert_eq!(result.text, "Frações...");
    assert_eq!(result.error, None);
}

#[tokio::test]
async fn concatenated_chunks_equal_result_text() {
    let server = MockServer::start().await;
    let body = [
        json!({ "model": "llama3", "response": "Uma ", "done": false }),
        json!({ "model": "llama3", "response": "fração ", "done": false }),
        json!({ "model": "llama3", "response": "é ", "done": false }),
        json!({ "model": "llama3", "response": "a/b.", "done": false }),
        json!({ "model": "llama3", "response": "", "done": true, "eval_count": 4, "prompt_eval_count": 20 }),
    ]
    .iter()
    .map(|line| format!("{line}\n"))
    .collect::<String>();
    mount_stream(&server, &body).await;

    let (chunks, result) = collect_chunks(&client_for(&server), streamed_request()).await;

    let reassembled: String = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(reassembled, result.text);
    assert_eq!(result.text, "Uma fração é a/b.");
}

#[tokio::test]
async fn final_object_is_flagged_and_carries_usage() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "{\"response\":\"x = 2\",\"done\":false}\n{\"response\":\"\",\"done\":true,\"prompt_eval_count\":10,\"eval_count\":3}\n",
    )
    .await;

    let (chunks, result) = collect_chunks(&client_for(&server), streamed_request()).await;

    assert_eq!(chunks.len(), 2);
    assert!(!chunks[0].is_final);
    assert!(chunks[1].is_final);

    let usage = result.usage.expect("usage");
    assert_eq!(usage.total_tokens, 13);
}

#[tokio::test]
async fn malformed_lines_are_skipped() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "{\"response\":\"a\"}\n\n{\"resp\nnot json at all\n[1,2]\n{\"response\":\"b\"}\n",
    )
    .await;

    let (chunks, result) = collect_chunks(&client_for(&server), streamed_request()).await;

    assert_eq!(chunks.len(), 2);
    assert_eq!(result.text, "ab");
    assert_eq!(result.error, None);
}

#[tokio::test]
async fn unterminated_last_line_is_decoded() {
    let server = MockServer::start().await;
    mount_stream(&server, "{\"response\":\"a\"}\n{\"response\":\"b\"}").await;

    let (_, result) = collect_chunks(&client_for(&server), streamed_request()).await;

    assert_eq!(result.text, "ab");
}

#[tokio::test]
async fn server_error_object_fails_and_keeps_partial_text() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        "{\"response\":\"Fra\"}\n{\"error\":\"out of memory\"}\n{\"response\":\"ções\"}\n",
    )
    .await;

    let (chunks, result) = collect_chunks(&client_for(&server), streamed_request()).await;

    assert_eq!(chunks.len(), 1);
    assert_eq!(result.text, "Fra");
    let error = result.error.expect("error");
    assert_eq!(error.kind, ErrorKind::Transport);
    assert!(error.message.contains("out of memory"));
}

#[tokio::test]
async fn error_status_fails_before_any_chunk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (chunks, result) = collect_chunks(&client_for(&server), streamed_request()).await;

    assert!(chunks.is_empty());
    assert_eq!(result.text, "");
    assert_eq!(result.error.and_then(|e| e.status_code), Some(500));
}

#[tokio::test]
async fn pull_stream_yields_the_same_fragments() {
    let server = MockServer::start().await;
    mount_stream(&server, "{\"response\":\"Fra\"}\n\n{\"response\":\"ções\",\"done\":true}\n").await;

    let client = client_for(&server);
    // `stream()` forces streaming even when the request asked for a batch.
    let mut request = streamed_request();
    request.stream = false;

    let chunks: Vec<GenerationChunk> = client
        .stream(request)
        .map(|chunk| chunk.expect("chunk"))
        .collect()
        .await;

    assert_eq!(
        chunks,
        vec![
            GenerationChunk {
                text: "Fra".to_string(),
                is_final: false
            },
            GenerationChunk {
                text: "ções".to_string(),
                is_final: true
            },
        ]
    );
}

#[tokio::test]
async fn pull_stream_ends_with_error_on_connection_failure() {
    let client =
        CompletionClient::new(OllamaConfig::new().with_base_url("http://127.0.0.1:1")).unwrap();

    let items: Vec<Result<GenerationChunk, LlmError>> =
        client.stream(streamed_request()).collect().await;

    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(LlmError::Network { .. })));
}

/// Serve one streamed response over a raw socket, writing each line as its own
/// HTTP chunk after `pause`, then idling for `linger` before closing.
async fn spawn_slow_server(lines: Vec<&'static str>, pause: Duration, linger: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        read_request(&mut socket).await;

        socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/x-ndjson\r\nTransfer-Encoding: chunked\r\n\r\n",
            )
            .await
            .expect("write head");

        for line in lines {
            tokio::time::sleep(pause).await;
            let chunk = format!("{:x}\r\n{line}\r\n", line.len());
            if socket.write_all(chunk.as_bytes()).await.is_err() {
                return;
            }
            let _ = socket.flush().await;
        }

        tokio::time::sleep(linger).await;
        let _ = socket.write_all(b"0\r\n\r\n").await;
    });

    format!("http://{addr}")
}

/// Consume headers and a `Content-Length` body.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = socket.read(&mut buf).await.expect("read request");
        if n == 0 {
            return;
        }
        request.extend_from_slice(&buf[..n]);

        let Some(head_end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&request[..head_end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if request.len() >= head_end + 4 + content_length {
            return;
        }
    }
}

#[tokio::test]
async fn slow_stream_outlasting_read_timeout_completes() {
    let lines = vec![
        "{\"response\":\"Fra\"}\n",
        "{\"response\":\"ções \"}\n",
        "{\"response\":\"são \"}\n",
        "{\"response\":\"partes\"}\n",
        "{\"response\":\"\",\"done\":true}\n",
    ];
    let base_url = spawn_slow_server(lines, Duration::from_millis(300), Duration::ZERO).await;

    let client = CompletionClient::new(
        OllamaConfig::new()
            .with_base_url(base_url)
            .with_read_timeout(Duration::from_secs(1)),
    )
    .unwrap();

    let started = std::time::Instant::now();
    let (chunks, result) = collect_chunks(&client, streamed_request()).await;

    assert!(started.elapsed() > Duration::from_secs(1));
    assert_eq!(result.error, None);
    assert_eq!(result.text, "Frações são partes");
    assert_eq!(chunks.len(), 5);
    assert!(chunks[4].is_final);
}

#[tokio::test]
async fn stalled_stream_fails_on_read_timeout() {
    let lines = vec!["{\"response\":\"Fra\"}\n"];
    let base_url = spawn_slow_server(lines, Duration::ZERO, Duration::from_secs(5)).await;

    let client = CompletionClient::new(
        OllamaConfig::new()
            .with_base_url(base_url)
            .with_read_timeout(Duration::from_millis(300)),
    )
    .unwrap();

    let (chunks, result) = collect_chunks(&client, streamed_request()).await;

    assert_eq!(chunks.len(), 1);
    assert_eq!(result.text, "Fra");
    assert_eq!(result.error.map(|e| e.kind), Some(ErrorKind::Transport));
}

#[tokio::test]
async fn explicit_total_timeout_caps_a_slow_stream() {
    let lines = vec!["{\"response\":\"Fra\"}\n", "{\"response\":\"ções\"}\n"];
    let base_url = spawn_slow_server(lines, Duration::from_millis(400), Duration::ZERO).await;

    let client = CompletionClient::new(
        OllamaConfig::new()
            .with_base_url(base_url)
            .with_timeout(Duration::from_millis(600)),
    )
    .unwrap();

    let (_, result) = collect_chunks(&client, streamed_request()).await;

    assert_eq!(result.text, "Fra");
    assert_eq!(result.error.map(|e| e.kind), Some(ErrorKind::Transport));
}
