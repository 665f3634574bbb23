use serde::Deserialize;

use super::common::{ResponseStatus, FAIL, SUCCESS};
use super::Envelope;
use crate::codec::{self, Params};
use crate::error::WxPayError;

/// Payment result callback.
#[derive(Debug, Clone, Deserialize)]
pub struct PaidNotify {
    #[serde(skip)]
    pub status: ResponseStatus,
    #[serde(default, rename = "appid")]
    pub app_id: String,
    #[serde(default)]
    pub mch_id: String,
    #[serde(default)]
    pub nonce_str: String,
    #[serde(default)]
    pub sign_type: Option<String>,
    #[serde(default)]
    pub device_info: Option<String>,
    #[serde(default)]
    pub openid: String,
    /// `Y` or `N`.
    #[serde(default)]
    pub is_subscribe: Option<String>,
    #[serde(default)]
    pub trade_type: String,
    #[serde(default)]
    pub bank_type: String,
    #[serde(default)]
    pub total_fee: i64,
    #[serde(default)]
    pub settlement_total_fee: Option<i64>,
    #[serde(default)]
    pub fee_type: Option<String>,
    #[serde(default)]
    pub cash_fee: i64,
    #[serde(default)]
    pub cash_fee_type: Option<String>,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub out_trade_no: String,
    #[serde(default)]
    pub attach: Option<String>,
    /// `yyyyMMddHHmmss`
    #[serde(default)]
    pub time_end: String,
    #[serde(skip)]
    pub raw: Params,
}

impl Envelope for PaidNotify {
    fn attach(&mut self, status: ResponseStatus, raw: Params) {
        self.status = status;
        self.raw = raw;
    }
}

/// Refund result callback. The result itself travels encrypted in `req_info`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefundedNotify {
    #[serde(skip)]
    pub status: ResponseStatus,
    #[serde(default, rename = "appid")]
    pub app_id: String,
    #[serde(default)]
    pub mch_id: String,
    #[serde(default)]
    pub nonce_str: String,
    #[serde(default)]
    pub req_info: String,
    /// Decrypted `req_info`.
    #[serde(skip)]
    pub info: Option<RefundedReqInfo>,
    #[serde(skip)]
    pub raw: Params,
}

impl Envelope for RefundedNotify {
    fn attach(&mut self, status: ResponseStatus, raw: Params) {
        self.status = status;
        self.raw = raw;
    }
}

/// Decrypted content of a refund callback.
#[derive(Debug, Clone, Deserialize)]
pub struct RefundedReqInfo {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub out_trade_no: String,
    #[serde(default)]
    pub refund_id: String,
    #[serde(default)]
    pub out_refund_no: String,
    #[serde(default)]
    pub total_fee: i64,
    #[serde(default)]
    pub settlement_total_fee: Option<i64>,
    #[serde(default)]
    pub refund_fee: i64,
    #[serde(default)]
    pub settlement_refund_fee: Option<i64>,
    /// `SUCCESS`, `CHANGE` or `REFUNDCLOSE`.
    #[serde(default)]
    pub refund_status: String,
    /// `yyyy-MM-dd HH:mm:ss`
    #[serde(default)]
    pub success_time: Option<String>,
    #[serde(default)]
    pub refund_recv_accout: Option<String>,
    #[serde(default)]
    pub refund_account: Option<String>,
    #[serde(default)]
    pub refund_request_source: Option<String>,
    #[serde(skip)]
    pub raw: Params,
}

/// Acknowledgement the merchant's callback handler sends back to WeChat Pay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyReply {
    Success,
    Fail(String),
}

impl NotifyReply {
    /// Reply reflecting the outcome of handling a callback.
    pub fn from_result<T>(result: &Result<T, WxPayError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(e) => Self::Fail(e.to_string()),
        }
    }

    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        match self {
            Self::Success => {
                params.insert("return_code", SUCCESS);
                params.insert("return_msg", "OK");
            }
            Self::Fail(msg) => {
                params.insert("return_code", FAIL);
                params.insert("return_msg", msg.as_str());
            }
        }
        params
    }

    pub fn to_xml(&self) -> Result<String, WxPayError> {
        codec::encode(&self.to_params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_success() {
        assert_eq!(
            NotifyReply::Success.to_xml().unwrap(),
            "<xml><return_code>SUCCESS</return_code><return_msg>OK</return_msg></xml>"
        );
    }

    #[test]
    fn test_reply_fail() {
        let xml = NotifyReply::Fail("签名失败".into()).to_xml().unwrap();
        let params = codec::decode(&xml).unwrap();
        assert_eq!(params.get("return_code"), Some("FAIL"));
        assert_eq!(params.get("return_msg"), Some("签名失败"));
    }

    #[test]
    fn test_reply_from_result() {
        let ok: Result<(), WxPayError> = Ok(());
        assert_eq!(NotifyReply::from_result(&ok), NotifyReply::Success);

        let err: Result<(), WxPayError> = Err(WxPayError::VerifyError("signature mismatch".into()));
        match NotifyReply::from_result(&err) {
            NotifyReply::Fail(msg) => assert!(msg.contains("signature mismatch")),
            other => panic!("unexpected reply: {other:?}"),
        }
    }
}
