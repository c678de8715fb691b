//! 요청 값 타입과 HTTP 전송.
//!
//! 클라이언트는 호출마다 `SignedRequest`를 새로 만들고 `execute`로 한 번만 보낸다.
//! 재시도는 하지 않는다.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::debug;

use interface::ExchangeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// 공개 API
    None,
    /// API 키 헤더만 필요 (Binance historicalTrades)
    ApiKey,
    /// 서명 필요
    Signed,
}

/// 엔드포인트 정의. 호출마다 바뀌지 않는 정적 정보.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub method: Method,
    pub path: &'static str,
    pub auth: Auth,
}

impl Endpoint {
    pub const fn public(method: Method, path: &'static str) -> Self {
        Self {
            method,
            path,
            auth: Auth::None,
        }
    }

    pub const fn signed(method: Method, path: &'static str) -> Self {
        Self {
            method,
            path,
            auth: Auth::Signed,
        }
    }

    pub fn requires_auth(&self) -> bool {
        self.auth != Auth::None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    /// `application/x-www-form-urlencoded`
    Form(String),
    Json(Value),
}

/// 전송 직전의 완성된 요청. 서명에 타임스탬프가 들어가므로 재사용하지 않는다.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Body,
    pub timestamp_ms: Option<i64>,
}

impl SignedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// 응답 본문. JSON 파싱에 실패하면 원문을 그대로 돌려준다.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Raw(String),
}

impl Payload {
    pub fn from_text(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Raw(text.to_string()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Raw(_) => None,
        }
    }

    /// 타입이 정해진 데이터가 필요한 호출자용. 원문이면 `Malformed`.
    pub fn into_json(self) -> Result<Value, ExchangeError> {
        match self {
            Payload::Json(value) => Ok(value),
            Payload::Raw(text) => Err(ExchangeError::Malformed(format!(
                "expected JSON, got: {}",
                text.chars().take(200).collect::<String>()
            ))),
        }
    }
}

/// 요청 한 건을 보낸다. 2xx 가 아니면 거래소 에러 응답을 `Api` 에러로 바꾼다.
pub(crate) async fn execute(
    http: &reqwest::Client,
    request: SignedRequest,
    timeout: Option<Duration>,
) -> Result<Payload, ExchangeError> {
    debug!(method = ?request.method, url = %request.url, "sending request");

    let mut builder = http.request(request.method.into(), &request.url);
    for (name, value) in &request.headers {
        builder = builder.header(*name, value);
    }

    builder = match request.body {
        Body::Empty => builder,
        Body::Form(form) => builder
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form),
        Body::Json(json) => builder.json(&json),
    };

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    let response = builder.send().await?;
    let status = response.status();
    let text = response.text().await?;
    let payload = Payload::from_text(&text);

    if !status.is_success() {
        return Err(api_error(status.as_u16(), &payload));
    }

    Ok(payload)
}

/// 거래소 에러 본문에서 code / message 추출.
/// Binance: `{"code":-2011,"msg":"..."}`, BtcTurk: `{"code":1123,"message":"..."}`
pub(crate) fn api_error(status: u16, payload: &Payload) -> ExchangeError {
    match payload {
        Payload::Json(value) => {
            let code = value.get("code").and_then(|c| c.as_i64());
            let message = value
                .get("msg")
                .or_else(|| value.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
                .unwrap_or_else(|| value.to_string().chars().take(200).collect());
            ExchangeError::Api {
                status,
                code,
                message,
            }
        }
        Payload::Raw(text) => ExchangeError::Api {
            status,
            code: None,
            message: text.chars().take(200).collect(),
        },
    }
}
