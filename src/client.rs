use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::codec::{self, Params};
use crate::config::ClientConfig;
use crate::crypto::sign::{sign, SignType, SIGN_FIELD};
use crate::crypto::verify::SIGN_TYPE_FIELD;
use crate::error::WxPayError;
use crate::model::common::ResponseStatus;
use crate::model::{self, Envelope};

const XML_MEDIA_TYPE: &str = "application/xml";
const SDK_USER_AGENT: &str = concat!("wxpay-v2-rust-sdk/", env!("CARGO_PKG_VERSION"));

/// WeChat Pay merchant API v2 client.
///
/// Holds the merchant credentials and the HTTP clients; safe to share between
/// tasks. Each call is independent and keeps no state behind.
pub struct WxPayClient {
    pub(crate) config: ClientConfig,
    pub(crate) http: reqwest::Client,
    /// Client carrying the merchant TLS identity, used for refund.
    pub(crate) secure_http: Option<reqwest::Client>,
}

impl WxPayClient {
    /// Create a new WeChat Pay client.
    ///
    /// When a TLS client identity is configured it is loaded here, once.
    pub fn new(config: ClientConfig) -> Result<Self, WxPayError> {
        let http = match &config.http_client {
            Some(client) => client.clone(),
            None => reqwest::Client::builder().build()?,
        };

        let secure_http = match (
            &config.refund_http_client,
            &config.tls_cert_pem,
            &config.tls_key_pem,
        ) {
            (Some(client), _, _) => Some(client.clone()),
            (None, Some(cert), Some(key)) => Some(build_identity_client(cert, key)?),
            _ => None,
        };

        Ok(Self {
            config,
            http,
            secure_http,
        })
    }

    pub fn app_id(&self) -> &str {
        &self.config.app_id
    }

    pub fn mch_id(&self) -> &str {
        &self.config.mch_id
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.config.api_key
    }

    pub(crate) fn resolve_sign_type(&self, requested: Option<SignType>) -> SignType {
        requested.unwrap_or(self.config.sign_type)
    }

    /// Start a request mapping with the merchant identity and a nonce.
    pub(crate) fn base_params(&self, nonce_str: Option<&str>) -> Result<Params, WxPayError> {
        if self.config.app_id.is_empty() {
            return Err(WxPayError::missing("app_id"));
        }
        if self.config.mch_id.is_empty() {
            return Err(WxPayError::missing("mch_id"));
        }

        let mut params = Params::new();
        params.insert("appid", self.config.app_id.as_str());
        params.insert("mch_id", self.config.mch_id.as_str());
        match nonce_str.filter(|n| !n.is_empty()) {
            Some(nonce) if nonce.len() > 32 => {
                return Err(WxPayError::InvalidArgument(
                    "nonce_str must be at most 32 characters".into(),
                ));
            }
            Some(nonce) => params.insert("nonce_str", nonce),
            None => params.insert("nonce_str", generate_nonce_str()),
        }
        Ok(params)
    }

    /// Add `sign_type` and `sign` to a finished mapping.
    pub(crate) fn seal(&self, mut params: Params, sign_type: SignType) -> Result<Params, WxPayError> {
        params.remove(SIGN_FIELD);
        params.insert(SIGN_TYPE_FIELD, sign_type.as_str());
        let signature = sign(&params, self.api_key(), sign_type)?;
        params.insert(SIGN_FIELD, signature);
        Ok(params)
    }

    /// POST a sealed mapping and return the validated, typed response.
    pub(crate) async fn post_xml<T: Envelope>(&self, path: &str, params: &Params) -> Result<T, WxPayError> {
        self.send(&self.http, path, params).await
    }

    /// Same as [`post_xml`](Self::post_xml) over the mutually authenticated client.
    pub(crate) async fn post_xml_secure<T: Envelope>(
        &self,
        path: &str,
        params: &Params,
    ) -> Result<T, WxPayError> {
        let http = self.secure_http.as_ref().ok_or_else(|| {
            WxPayError::Config(format!("{path} requires a merchant TLS client identity"))
        })?;
        self.send(http, path, params).await
    }

    async fn send<T: Envelope>(
        &self,
        http: &reqwest::Client,
        path: &str,
        params: &Params,
    ) -> Result<T, WxPayError> {
        let body = codec::encode(params)?;
        let url = format!("{}{path}", self.config.base_url);
        debug!(path, sign_type = params.get(SIGN_TYPE_FIELD), "sending signed request");

        let mut req = http
            .post(&url)
            .header(CONTENT_TYPE, XML_MEDIA_TYPE)
            .header(ACCEPT, XML_MEDIA_TYPE)
            .header(USER_AGENT, SDK_USER_AGENT)
            .body(body);
        if let Some(timeout) = self.config.timeout {
            req = req.timeout(timeout);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if status != StatusCode::OK {
            warn!(path, status = status.as_u16(), "unexpected HTTP status");
            return Err(WxPayError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let fields = codec::decode(&text)?;
        ResponseStatus::from_params(&fields).check()?;
        model::typed(fields)
    }
}

fn build_identity_client(cert_pem: &str, key_pem: &str) -> Result<reqwest::Client, WxPayError> {
    let pem = format!("{}\n{}", key_pem.trim(), cert_pem.trim());
    let identity = reqwest::Identity::from_pem(pem.as_bytes())
        .map_err(|e| WxPayError::Config(format!("load TLS client identity: {e}")))?;
    reqwest::Client::builder()
        .identity(identity)
        .build()
        .map_err(|e| WxPayError::Config(format!("build TLS client: {e}")))
}

/// 32 random alphanumeric characters.
pub(crate) fn generate_nonce_str() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub(crate) fn current_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::verify::verify_envelope;
    use crate::error::ErrorKind;

    fn client() -> WxPayClient {
        let config = ClientConfig::builder()
            .app_id("wx1")
            .mch_id("100")
            .api_key("abc")
            .build()
            .unwrap();
        WxPayClient::new(config).unwrap()
    }

    #[test]
    fn test_generate_nonce_str() {
        let a = generate_nonce_str();
        let b = generate_nonce_str();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_base_params_keeps_given_nonce() {
        let params = client().base_params(Some("abcdef")).unwrap();
        assert_eq!(params.get("appid"), Some("wx1"));
        assert_eq!(params.get("mch_id"), Some("100"));
        assert_eq!(params.get("nonce_str"), Some("abcdef"));
    }

    #[test]
    fn test_base_params_generates_nonce() {
        for nonce in [None, Some("")] {
            let params = client().base_params(nonce).unwrap();
            assert_eq!(params.get("nonce_str").unwrap().len(), 32);
        }
    }

    #[test]
    fn test_base_params_rejects_long_nonce() {
        let long = "x".repeat(33);
        let err = client().base_params(Some(&long)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_seal_signs_final_field_set() {
        let c = client();
        for st in [SignType::Md5, SignType::HmacSha256] {
            let mut params = c.base_params(Some("n")).unwrap();
            params.insert(SIGN_FIELD, "STALE");
            let sealed = c.seal(params, st).unwrap();
            assert_eq!(sealed.get(SIGN_TYPE_FIELD), Some(st.as_str()));
            assert_ne!(sealed.get(SIGN_FIELD), Some("STALE"));
            assert!(verify_envelope(&sealed, "abc").is_ok());
        }
    }

    #[test]
    fn test_resolve_sign_type() {
        let c = client();
        assert_eq!(c.resolve_sign_type(None), SignType::Md5);
        assert_eq!(
            c.resolve_sign_type(Some(SignType::HmacSha256)),
            SignType::HmacSha256
        );
    }

    #[test]
    fn test_current_timestamp_is_positive() {
        // Should be after 2024-01-01 (1704067200)
        assert!(current_timestamp() > 1_704_067_200);
    }

    #[tokio::test]
    async fn test_secure_post_without_identity() {
        let c = client();
        let params = c.seal(c.base_params(None).unwrap(), SignType::Md5).unwrap();
        let err = c
            .post_xml_secure::<crate::model::refund::RefundResponse>("/secapi/pay/refund", &params)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
