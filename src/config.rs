use std::fmt;
use std::time::Duration;

use crate::crypto::sign::SignType;
use crate::error::WxPayError;

const DEFAULT_BASE_URL: &str = "https://api.mch.weixin.qq.com";

pub struct ClientConfig {
    pub app_id: String,
    pub mch_id: String,
    pub api_key: String,
    pub sign_type: SignType,
    pub base_url: String,
    /// Merchant client certificate (PEM), required for refund.
    pub tls_cert_pem: Option<String>,
    /// Private key of the merchant client certificate (PEM).
    pub tls_key_pem: Option<String>,
    pub http_client: Option<reqwest::Client>,
    /// Prebuilt client for the mutually authenticated endpoints.
    pub refund_http_client: Option<reqwest::Client>,
    /// Deadline for a whole request: connect, write and response read.
    pub timeout: Option<Duration>,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("app_id", &self.app_id)
            .field("mch_id", &self.mch_id)
            .field("api_key", &"<redacted>")
            .field("sign_type", &self.sign_type)
            .field("base_url", &self.base_url)
            .field("tls_identity", &self.tls_cert_pem.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Default)]
pub struct ClientConfigBuilder {
    app_id: Option<String>,
    mch_id: Option<String>,
    api_key: Option<String>,
    sign_type: Option<SignType>,
    base_url: Option<String>,
    tls_cert_pem: Option<String>,
    tls_key_pem: Option<String>,
    http_client: Option<reqwest::Client>,
    refund_http_client: Option<reqwest::Client>,
    timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub fn has_tls_identity(&self) -> bool {
        self.tls_cert_pem.is_some() && self.tls_key_pem.is_some()
    }
}

impl ClientConfigBuilder {
    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn mch_id(mut self, mch_id: impl Into<String>) -> Self {
        self.mch_id = Some(mch_id.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn sign_type(mut self, sign_type: SignType) -> Self {
        self.sign_type = Some(sign_type);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn tls_cert_pem(mut self, cert_pem: impl Into<String>) -> Self {
        self.tls_cert_pem = Some(cert_pem.into());
        self
    }

    pub fn tls_key_pem(mut self, key_pem: impl Into<String>) -> Self {
        self.tls_key_pem = Some(key_pem.into());
        self
    }

    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn refund_http_client(mut self, client: reqwest::Client) -> Self {
        self.refund_http_client = Some(client);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ClientConfig, WxPayError> {
        let app_id = required(self.app_id, "app_id")?;
        let mch_id = required(self.mch_id, "mch_id")?;
        let api_key = required(self.api_key, "api_key")?;

        if self.tls_cert_pem.is_some() != self.tls_key_pem.is_some() {
            return Err(WxPayError::Config(
                "tls_cert_pem and tls_key_pem must be set together".into(),
            ));
        }

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(ClientConfig {
            app_id,
            mch_id,
            api_key,
            sign_type: self.sign_type.unwrap_or_default(),
            base_url,
            tls_cert_pem: self.tls_cert_pem,
            tls_key_pem: self.tls_key_pem,
            http_client: self.http_client,
            refund_http_client: self.refund_http_client,
            timeout: self.timeout,
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, WxPayError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(WxPayError::Config(format!("{name} is required"))),
    }
}
