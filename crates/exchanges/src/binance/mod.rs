//! Binance Spot REST 클라이언트.
//!
//! 서명 방식: 파라미터를 `key=value&...` 로 직렬화하고 `timestamp`를 붙인 뒤
//! 원본 시크릿으로 HMAC-SHA256, hex 서명을 `&signature=` 로 덧붙인다.
//! - `market`: 공개 시세 API
//! - `trading`: 주문/취소/OCO
//! - `account`: 계정 정보
//! - `venue`: `TradingVenue` / `QuoteVenue` 구현

use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use interface::ExchangeError;

use crate::credentials::{env_credentials, Credentials};
use crate::params::{ParamLimit, ParamList};
use crate::request::{execute, Auth, Body, Endpoint, Method, Payload, SignedRequest};

pub mod account;
pub mod market;
pub mod trading;
mod venue;

pub use trading::{NewOco, NewOrder};

pub const BASE_URL: &str = "https://api.binance.com";
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// 모든 서명 API 공통: recvWindow 는 60000 을 넘을 수 없다.
pub const RECV_WINDOW: ParamLimit = ParamLimit::new(None, 60_000);

/// "Unknown order sent." (취소할 주문이 없음)
pub const UNKNOWN_ORDER_CODE: i64 = -2011;

type HmacSha256 = Hmac<Sha256>;

/// Binance API 서명 생성
/// payload: 서명 대상 문자열 (예: "symbol=BTCUSDT&timestamp=1234567890")
pub fn generate_signature(payload: &str, api_secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(api_secret).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// 파라미터 + timestamp 를 직렬화하고 signature 를 덧붙인 최종 문자열
pub fn sign_query(params: &ParamList, api_secret: &[u8], timestamp_ms: i64) -> String {
    let mut payload = params.to_query();
    if !payload.is_empty() {
        payload.push('&');
    }
    payload.push_str(&format!("timestamp={}", timestamp_ms));

    let signature = generate_signature(&payload, api_secret);
    format!("{}&signature={}", payload, signature)
}

/// 타임스탬프 생성 (밀리초)
pub fn get_timestamp() -> i64 {
    Utc::now().timestamp_millis()
}

/// 환경변수에서 API 키와 시크릿 가져오기
pub fn get_api_credentials() -> Result<(String, String), ExchangeError> {
    env_credentials("BINANCE_API_KEY", "BINANCE_API_SECRET")
}

/// 환경변수가 설정되어 있는지 확인
pub fn has_api_credentials() -> bool {
    get_api_credentials().is_ok()
}

/// recvWindow 가 있으면 clamp 해서 넣는다.
pub(crate) fn push_recv_window(params: &mut ParamList, recv_window: Option<u64>) {
    params.push_opt("recvWindow", recv_window.map(|v| RECV_WINDOW.clamp(v)));
}

#[derive(Clone)]
pub struct BinanceClient {
    pub(crate) http: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl Default for BinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BinanceClient {
    /// 공개 API만 사용하는 경우
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            credentials: None,
        }
    }

    /// 인증이 필요한 API를 사용하는 경우 (환경변수)
    pub fn with_credentials() -> Result<Self, ExchangeError> {
        let (api_key, api_secret) = get_api_credentials()?;
        Ok(Self::with_keys(&api_key, &api_secret))
    }

    /// Binance 시크릿은 인코딩 없이 그대로 HMAC 키로 쓴다.
    pub fn with_keys(api_key: &str, api_secret: &str) -> Self {
        Self {
            credentials: Some(Credentials::new(api_key, api_secret.as_bytes())),
            ..Self::new()
        }
    }

    /// testnet 등 다른 호스트를 쓸 때
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn credentials(&self) -> Result<&Credentials, ExchangeError> {
        self.credentials.as_ref().ok_or_else(|| {
            ExchangeError::Credentials(
                "API key not set. Use BinanceClient::with_credentials()".to_string(),
            )
        })
    }

    /// 현재 시각으로 요청을 만든다. 파라미터가 확정된 뒤에 타임스탬프를 찍는다.
    pub fn build_request(
        &self,
        endpoint: &Endpoint,
        params: &ParamList,
    ) -> Result<SignedRequest, ExchangeError> {
        self.build_request_at(endpoint, params, get_timestamp())
    }

    /// 타임스탬프를 지정해서 요청을 만든다. 같은 입력이면 같은 결과.
    /// 서명 요청은 GET/DELETE 면 쿼리스트링, POST/PUT 이면 form 본문으로 보낸다.
    pub fn build_request_at(
        &self,
        endpoint: &Endpoint,
        params: &ParamList,
        timestamp_ms: i64,
    ) -> Result<SignedRequest, ExchangeError> {
        let mut headers = Vec::new();
        let url = format!("{}{}", self.base_url, endpoint.path);

        let (query, body, timestamp) = match endpoint.auth {
            Auth::None => {
                if let Some(creds) = &self.credentials {
                    headers.push((API_KEY_HEADER, creds.api_key().to_string()));
                }
                (params.to_query(), Body::Empty, None)
            }
            Auth::ApiKey => {
                let creds = self.credentials()?;
                headers.push((API_KEY_HEADER, creds.api_key().to_string()));
                (params.to_query(), Body::Empty, None)
            }
            Auth::Signed => {
                let creds = self.credentials()?;
                headers.push((API_KEY_HEADER, creds.api_key().to_string()));
                let signed = sign_query(params, creds.secret(), timestamp_ms);
                match endpoint.method {
                    Method::Post | Method::Put => (String::new(), Body::Form(signed), Some(timestamp_ms)),
                    Method::Get | Method::Delete => (signed, Body::Empty, Some(timestamp_ms)),
                }
            }
        };

        let url = if query.is_empty() {
            url
        } else {
            format!("{}?{}", url, query)
        };

        Ok(SignedRequest {
            method: endpoint.method,
            url,
            headers,
            body,
            timestamp_ms: timestamp,
        })
    }

    pub(crate) async fn send(
        &self,
        endpoint: &Endpoint,
        params: ParamList,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        let request = self.build_request(endpoint, &params)?;
        execute(&self.http, request, timeout).await
    }
}
