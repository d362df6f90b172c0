use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Thin client for the external payment-intent API. One instance lives in
/// `AppState`; every call carries the configured bearer key and the bounded
/// timeout.
#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

/// How an outbound call went wrong. `Timeout` means the outcome at the
/// gateway is unknown (the intent may or may not exist) and callers must not
/// treat it as a definitive failure.
#[derive(Debug)]
pub enum GatewayFailure {
    Timeout,
    Rejected { status: u16, detail: String },
    Protocol(String),
}

impl GatewayFailure {
    pub fn is_unknown_outcome(&self) -> bool {
        matches!(self, GatewayFailure::Timeout)
    }

    pub fn detail(&self) -> String {
        match self {
            GatewayFailure::Timeout => "payment gateway timed out".to_string(),
            GatewayFailure::Rejected { status, detail } => {
                format!("payment gateway rejected the request ({status}): {detail}")
            }
            GatewayFailure::Protocol(msg) => format!("payment gateway protocol error: {msg}"),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayFailure>;

#[derive(Debug, Serialize)]
pub struct IntentMetadata {
    pub user_id: String,
    pub booking_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateIntentRequest {
    pub amount: i64,
    pub currency: String,
    pub metadata: IntentMetadata,
    pub return_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Deserialize)]
struct IntentEnvelope {
    #[serde(default)]
    status: bool,
    #[serde(default)]
    data: Option<IntentData>,
}

/// Gateway-side snapshot of a payment intent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IntentData {
    pub payment_intent_id: String,
    #[serde(default)]
    pub payment_link: Option<String>,
    #[serde(default)]
    pub intent_secret: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub const INTENT_STATUS_SUCCESSFUL: &str = "successful";

impl GatewayClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, String> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| format!("gateway http client init failed: {e}"))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match self.api_key.as_deref() {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    pub async fn create_intent(&self, req: &CreateIntentRequest) -> GatewayResult<IntentData> {
        let resp = self
            .authorize(self.http.post(self.url("/v1/payment-intents")).json(req))
            .send()
            .await
            .map_err(classify_send_error)?;
        read_intent_envelope(resp).await
    }

    pub async fn retrieve_intent(&self, intent_id: &str) -> GatewayResult<IntentData> {
        let resp = self
            .authorize(
                self.http
                    .get(self.url(&format!("/v1/payment-intents/{intent_id}"))),
            )
            .send()
            .await
            .map_err(classify_send_error)?;
        read_intent_envelope(resp).await
    }

    pub async fn cancel_intent(&self, intent_id: &str) -> GatewayResult<()> {
        let resp = self
            .authorize(
                self.http
                    .post(self.url(&format!("/v1/payment-intents/{intent_id}/cancel"))),
            )
            .send()
            .await
            .map_err(classify_send_error)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayFailure::Rejected {
                status: status.as_u16(),
                detail: extract_detail(&body),
            });
        }
        Ok(())
    }
}

async fn read_intent_envelope(resp: reqwest::Response) -> GatewayResult<IntentData> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(GatewayFailure::Rejected {
            status: status.as_u16(),
            detail: extract_detail(&body),
        });
    }
    let envelope: IntentEnvelope = serde_json::from_str(&body)
        .map_err(|e| GatewayFailure::Protocol(format!("invalid intent response: {e}")))?;
    if !envelope.status {
        return Err(GatewayFailure::Rejected {
            status: status.as_u16(),
            detail: extract_detail(&body),
        });
    }
    envelope
        .data
        .ok_or_else(|| GatewayFailure::Protocol("intent response missing data".to_string()))
}

fn classify_send_error(e: reqwest::Error) -> GatewayFailure {
    if e.is_timeout() {
        GatewayFailure::Timeout
    } else {
        GatewayFailure::Protocol(e.to_string())
    }
}

// Best-effort extraction of upstream error details.
fn extract_detail(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(d) = v.get(key).and_then(|x| x.as_str()) {
                return d.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no detail".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    #[derive(Debug)]
    struct CapturedRequest {
        method: String,
        path: String,
        headers: HashMap<String, String>,
        body: String,
    }

    fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    async fn spawn_mock_gateway(
        status_line: &str,
        response_body: &str,
    ) -> (String, oneshot::Receiver<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let (tx, rx) = oneshot::channel();
        let status_line = status_line.to_string();
        let response_body = response_body.to_string();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("accept");
            let mut buf: Vec<u8> = Vec::new();
            let mut tmp = [0u8; 2048];
            let header_end = loop {
                let n = stream.read(&mut tmp).await.expect("read");
                if n == 0 {
                    break None;
                }
                buf.extend_from_slice(&tmp[..n]);
                if let Some(i) = find_subsequence(&buf, b"\r\n\r\n") {
                    break Some(i);
                }
            };

            let Some(header_end) = header_end else {
                return;
            };

            let header_text = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let mut lines = header_text.split("\r\n");
            let request_line = lines.next().unwrap_or_default();
            let mut req_parts = request_line.split_whitespace();
            let method = req_parts.next().unwrap_or_default().to_string();
            let path = req_parts.next().unwrap_or_default().to_string();

            let mut headers: HashMap<String, String> = HashMap::new();
            for line in lines {
                if let Some((k, v)) = line.split_once(':') {
                    headers.insert(k.trim().to_ascii_lowercase(), v.trim().to_string());
                }
            }

            let content_len = headers
                .get("content-length")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);

            let mut body = buf[(header_end + 4)..].to_vec();
            while body.len() < content_len {
                let n = stream.read(&mut tmp).await.expect("read body");
                if n == 0 {
                    break;
                }
                body.extend_from_slice(&tmp[..n]);
            }
            body.truncate(content_len);

            let _ = tx.send(CapturedRequest {
                method,
                path,
                headers,
                body: String::from_utf8_lossy(&body).to_string(),
            });

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                response_body.len(),
                response_body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.flush().await;
        });

        (format!("http://{addr}"), rx)
    }

    fn intent_request() -> CreateIntentRequest {
        CreateIntentRequest {
            amount: 325,
            currency: "GMD".to_string(),
            metadata: IntentMetadata {
                user_id: "user-1".to_string(),
                booking_id: "booking-1".to_string(),
            },
            return_url: "http://localhost:3000/booking/success?ref=GFB12345678".to_string(),
            cancel_url: "http://localhost:3000/booking/cancel?ref=GFB12345678".to_string(),
        }
    }

    #[tokio::test]
    async fn create_intent_sends_authorized_json_and_parses_data() {
        let (base_url, rx) = spawn_mock_gateway(
            "200 OK",
            "{\"status\":true,\"data\":{\"payment_intent_id\":\"pi_123\",\"payment_link\":\"https://pay.example/pi_123\",\"intent_secret\":\"sec_1\",\"amount\":325,\"currency\":\"gmd\"}}",
        )
        .await;
        let client =
            GatewayClient::new(&base_url, Some("gk_test_key_123".to_string()), 5).expect("client");

        let intent = client
            .create_intent(&intent_request())
            .await
            .expect("intent created");
        assert_eq!(intent.payment_intent_id, "pi_123");
        assert_eq!(
            intent.payment_link.as_deref(),
            Some("https://pay.example/pi_123")
        );

        let captured = rx.await.expect("captured request");
        assert_eq!(captured.method, "POST");
        assert_eq!(captured.path, "/v1/payment-intents");
        assert_eq!(
            captured.headers.get("authorization").map(String::as_str),
            Some("Bearer gk_test_key_123")
        );

        let body: serde_json::Value = serde_json::from_str(&captured.body).expect("json body");
        assert_eq!(body.get("amount").and_then(|v| v.as_i64()), Some(325));
        assert_eq!(
            body.pointer("/metadata/booking_id").and_then(|v| v.as_str()),
            Some("booking-1")
        );
        assert!(body
            .get("return_url")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .contains("ref=GFB12345678"));
    }

    #[tokio::test]
    async fn non_success_status_is_a_rejection_with_detail() {
        let (base_url, _rx) =
            spawn_mock_gateway("402 Payment Required", "{\"error\":\"card declined\"}").await;
        let client = GatewayClient::new(&base_url, None, 5).expect("client");

        let err = client
            .create_intent(&intent_request())
            .await
            .expect_err("rejection");
        let is_unknown = err.is_unknown_outcome();
        match err {
            GatewayFailure::Rejected { status, detail } => {
                assert_eq!(status, 402);
                assert_eq!(detail, "card declined");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert!(!is_unknown);
    }

    #[tokio::test]
    async fn envelope_with_false_status_is_a_rejection() {
        let (base_url, _rx) = spawn_mock_gateway(
            "200 OK",
            "{\"status\":false,\"message\":\"intent creation failed\"}",
        )
        .await;
        let client = GatewayClient::new(&base_url, None, 5).expect("client");

        let err = client
            .create_intent(&intent_request())
            .await
            .expect_err("rejection");
        assert!(matches!(err, GatewayFailure::Rejected { .. }));
    }

    #[tokio::test]
    async fn silent_server_surfaces_as_unknown_outcome_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            // Accept and hold the connection open without ever responding.
            let (_stream, _) = listener.accept().await.expect("accept");
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = GatewayClient::new(&format!("http://{addr}"), None, 1).expect("client");
        let err = client
            .create_intent(&intent_request())
            .await
            .expect_err("timeout");
        assert!(matches!(err, GatewayFailure::Timeout));
        assert!(err.is_unknown_outcome());
    }

    #[tokio::test]
    async fn retrieve_intent_hits_intent_path() {
        let (base_url, rx) = spawn_mock_gateway(
            "200 OK",
            "{\"status\":true,\"data\":{\"payment_intent_id\":\"pi_9\",\"status\":\"successful\"}}",
        )
        .await;
        let client = GatewayClient::new(&base_url, None, 5).expect("client");

        let intent = client.retrieve_intent("pi_9").await.expect("intent");
        assert_eq!(intent.status.as_deref(), Some(INTENT_STATUS_SUCCESSFUL));

        let captured = rx.await.expect("captured request");
        assert_eq!(captured.method, "GET");
        assert_eq!(captured.path, "/v1/payment-intents/pi_9");
    }

    #[tokio::test]
    async fn cancel_intent_hits_cancel_path() {
        let (base_url, rx) = spawn_mock_gateway("200 OK", "{\"status\":true}").await;
        let client = GatewayClient::new(&base_url, None, 5).expect("client");

        client.cancel_intent("pi_9").await.expect("cancelled");

        let captured = rx.await.expect("captured request");
        assert_eq!(captured.method, "POST");
        assert_eq!(captured.path, "/v1/payment-intents/pi_9/cancel");
    }
}
