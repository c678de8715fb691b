//! BtcTurk REST 클라이언트.
//!
//! 서명 방식: 시크릿은 base64 로 인코딩되어 있어 생성 시 한 번만 디코드한다.
//! 요청마다 `api_key + timestamp(ms)` 를 디코드된 시크릿으로 HMAC-SHA256 하고
//! base64 인코딩해서 `X-Signature` 헤더로 보낸다. 파라미터는 서명에 포함되지 않는다.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

use interface::ExchangeError;

use crate::credentials::{env_credentials, Credentials};
use crate::params::ParamList;
use crate::request::{api_error, execute, Body, Endpoint, Payload, SignedRequest};

pub mod account;
pub mod market;
pub mod trading;
mod venue;

pub use market::TickerFilter;
pub use trading::SubmitOrder;

pub const BASE_URL: &str = "https://api.btcturk.com";
pub const GRAPH_BASE_URL: &str = "https://graph-api.btcturk.com";

pub const KEY_HEADER: &str = "X-PCK";
pub const STAMP_HEADER: &str = "X-Stamp";
pub const SIGNATURE_HEADER: &str = "X-Signature";

type HmacSha256 = Hmac<Sha256>;

/// BtcTurk 서명: base64(HMAC-SHA256(secret, api_key + stamp))
pub fn generate_signature(api_key: &str, stamp_ms: i64, api_secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(api_secret).expect("HMAC can take key of any size");
    mac.update(format!("{}{}", api_key, stamp_ms).as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// 인증 헤더 3종
pub fn auth_headers(credentials: &Credentials, stamp_ms: i64) -> Vec<(&'static str, String)> {
    vec![
        (KEY_HEADER, credentials.api_key().to_string()),
        (STAMP_HEADER, stamp_ms.to_string()),
        (
            SIGNATURE_HEADER,
            generate_signature(credentials.api_key(), stamp_ms, credentials.secret()),
        ),
    ]
}

pub fn decode_secret(api_secret: &str) -> Result<Vec<u8>, ExchangeError> {
    BASE64
        .decode(api_secret.trim())
        .map_err(|e| ExchangeError::Credentials(format!("BtcTurk secret is not base64: {}", e)))
}

/// 환경변수에서 API 키와 시크릿 가져오기
pub fn get_api_credentials() -> Result<(String, String), ExchangeError> {
    env_credentials("BTCTURK_API_KEY", "BTCTURK_API_SECRET")
}

pub fn has_api_credentials() -> bool {
    get_api_credentials().is_ok()
}

/// `{"success": false, ...}` 는 HTTP 200 이어도 에러로 본다.
pub(crate) fn check_envelope(payload: Payload) -> Result<Payload, ExchangeError> {
    let failed = payload
        .as_json()
        .and_then(|v| v.get("success"))
        .and_then(|s| s.as_bool())
        == Some(false);

    if failed {
        return Err(api_error(200, &payload));
    }
    Ok(payload)
}

/// `{"data": ...}` 봉투 안의 데이터
pub(crate) fn envelope_data(value: Value) -> Result<Value, ExchangeError> {
    match value {
        Value::Object(mut map) => map
            .remove("data")
            .ok_or_else(|| ExchangeError::Malformed("response without `data`".to_string())),
        _ => Err(ExchangeError::Malformed(
            "expected an object envelope".to_string(),
        )),
    }
}

#[derive(Clone)]
pub struct BtcTurkClient {
    pub(crate) http: reqwest::Client,
    base_url: String,
    graph_base_url: String,
    credentials: Option<Credentials>,
}

impl Default for BtcTurkClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BtcTurkClient {
    /// 공개 API만 사용하는 경우
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            graph_base_url: GRAPH_BASE_URL.to_string(),
            credentials: None,
        }
    }

    /// 인증이 필요한 API를 사용하는 경우 (환경변수)
    pub fn with_credentials() -> Result<Self, ExchangeError> {
        let (api_key, api_secret) = get_api_credentials()?;
        Self::with_keys(&api_key, &api_secret)
    }

    /// `api_secret` 은 거래소가 발급한 base64 문자열 그대로.
    pub fn with_keys(api_key: &str, api_secret: &str) -> Result<Self, ExchangeError> {
        let secret = decode_secret(api_secret)?;
        Ok(Self {
            credentials: Some(Credentials::new(api_key, secret)),
            ..Self::new()
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn credentials(&self) -> Result<&Credentials, ExchangeError> {
        self.credentials.as_ref().ok_or_else(|| {
            ExchangeError::Credentials(
                "API key not set. Use BtcTurkClient::with_credentials()".to_string(),
            )
        })
    }

    pub fn build_request(
        &self,
        endpoint: &Endpoint,
        params: &ParamList,
        body: Option<Value>,
    ) -> Result<SignedRequest, ExchangeError> {
        self.build_request_at(endpoint, params, body, Utc::now().timestamp_millis())
    }

    /// 파라미터는 항상 쿼리스트링, 주문 본문은 JSON 으로 보낸다.
    pub fn build_request_at(
        &self,
        endpoint: &Endpoint,
        params: &ParamList,
        body: Option<Value>,
        stamp_ms: i64,
    ) -> Result<SignedRequest, ExchangeError> {
        let (headers, timestamp) = if endpoint.requires_auth() {
            (auth_headers(self.credentials()?, stamp_ms), Some(stamp_ms))
        } else {
            (Vec::new(), None)
        };

        Ok(SignedRequest {
            method: endpoint.method,
            url: join_url(&self.base_url, endpoint.path, params),
            headers,
            body: body.map(Body::Json).unwrap_or(Body::Empty),
            timestamp_ms: timestamp,
        })
    }

    pub(crate) async fn send(
        &self,
        endpoint: &Endpoint,
        params: ParamList,
        body: Option<Value>,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        let request = self.build_request(endpoint, &params, body)?;
        check_envelope(execute(&self.http, request, timeout).await?)
    }

    /// graph-api 호스트 (OHLC) 용 공개 요청
    pub(crate) async fn send_graph(
        &self,
        endpoint: &Endpoint,
        params: ParamList,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        let request = SignedRequest {
            method: endpoint.method,
            url: join_url(&self.graph_base_url, endpoint.path, &params),
            headers: Vec::new(),
            body: Body::Empty,
            timestamp_ms: None,
        };
        execute(&self.http, request, timeout).await
    }
}

fn join_url(base: &str, path: &str, params: &ParamList) -> String {
    if params.is_empty() {
        format!("{}{}", base, path)
    } else {
        format!("{}{}?{}", base, path, params.to_query())
    }
}
