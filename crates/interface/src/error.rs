use thiserror::Error;

/// 거래소 호출 계층의 에러.
///
/// 클라이언트 계층은 재시도하지 않는다. 재시도 여부는 호출하는 루프가 결정한다.
/// 파라미터 범위 초과는 에러가 아니라 최대값으로 clamp 된다.
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("http error: {0}")]
    Transport(reqwest::Error),
    #[error("request timed out")]
    Timeout,
    /// 거래소가 돌려준 JSON 에러 응답 (인증 실패 포함)
    #[error("api error: status {status}, code {code:?}, message: {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("invalid credentials: {0}")]
    Credentials(String),
    #[error("other error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for ExchangeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ExchangeError::Timeout
        } else {
            ExchangeError::Transport(e)
        }
    }
}

impl ExchangeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExchangeError::Timeout)
    }

    /// 거래소 에러 코드 (Binance `code`, BtcTurk `code`)
    pub fn api_code(&self) -> Option<i64> {
        match self {
            ExchangeError::Api { code, .. } => *code,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_code_only_for_api_errors() {
        let err = ExchangeError::Api {
            status: 400,
            code: Some(-2011),
            message: "Unknown order sent.".to_string(),
        };
        assert_eq!(err.api_code(), Some(-2011));
        assert!(!err.is_timeout());

        assert_eq!(ExchangeError::Timeout.api_code(), None);
        assert!(ExchangeError::Timeout.is_timeout());
    }

    #[test]
    fn display_includes_venue_message() {
        let err = ExchangeError::Api {
            status: 401,
            code: Some(-2015),
            message: "Invalid API-key, IP, or permissions for action.".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("Invalid API-key"));
    }
}
