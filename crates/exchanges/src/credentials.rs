use std::env;
use std::fmt;

use interface::ExchangeError;

/// API 키와 서명용 시크릿 바이트.
/// 생성 후 변경되지 않으며, 시크릿은 Debug 출력에서 가려진다.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: Vec<u8>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// HMAC 키로만 사용할 것
    pub(crate) fn secret(&self) -> &[u8] {
        &self.api_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

/// 환경변수에서 API 키와 시크릿 가져오기
pub fn env_credentials(key_var: &str, secret_var: &str) -> Result<(String, String), ExchangeError> {
    let api_key = env::var(key_var)
        .map_err(|e| ExchangeError::Credentials(format!("{} not found: {}", key_var, e)))?;
    let api_secret = env::var(secret_var)
        .map_err(|e| ExchangeError::Credentials(format!("{} not found: {}", secret_var, e)))?;
    Ok((api_key, api_secret))
}
