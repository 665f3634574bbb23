use serde::{Deserialize, Serialize};

use super::common::ResponseStatus;
use super::Envelope;
use crate::codec::Params;
use crate::crypto::sign::SignType;

/// Unified order request (JSAPI).
///
/// `appid`, `mch_id`, `trade_type` and `sign` are filled in by the client.
#[derive(Debug, Clone, Default)]
pub struct UnifiedOrderRequest {
    pub body: String,
    pub out_trade_no: String,
    /// Amount in fen.
    pub total_fee: i64,
    pub spbill_create_ip: String,
    pub notify_url: String,
    pub open_id: String,
    /// Generated when `None`.
    pub nonce_str: Option<String>,
    /// Falls back to the client's configured sign type.
    pub sign_type: Option<SignType>,
    pub device_info: Option<String>,
    pub detail: Option<String>,
    pub attach: Option<String>,
    pub fee_type: Option<String>,
    /// `yyyyMMddHHmmss`
    pub time_start: Option<String>,
    /// `yyyyMMddHHmmss`
    pub time_expire: Option<String>,
    pub goods_tag: Option<String>,
    pub limit_pay: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnifiedOrderResponse {
    #[serde(skip)]
    pub status: ResponseStatus,
    #[serde(default, rename = "appid")]
    pub app_id: String,
    #[serde(default)]
    pub mch_id: String,
    #[serde(default)]
    pub nonce_str: String,
    #[serde(default)]
    pub device_info: Option<String>,
    #[serde(default)]
    pub trade_type: Option<String>,
    #[serde(default)]
    pub prepay_id: String,
    #[serde(default)]
    pub code_url: Option<String>,
    /// Every field of the response envelope, as received.
    #[serde(skip)]
    pub raw: Params,
}

impl Envelope for UnifiedOrderResponse {
    fn attach(&mut self, status: ResponseStatus, raw: Params) {
        self.status = status;
        self.raw = raw;
    }
}

/// Parameters for invoking payment in the JSAPI/mini-program frontend.
#[derive(Debug, Clone, Serialize)]
pub struct FrontPayParams {
    #[serde(rename = "appId")]
    pub app_id: String,
    #[serde(rename = "timeStamp")]
    pub time_stamp: String,
    #[serde(rename = "nonceStr")]
    pub nonce_str: String,
    pub package: String,
    #[serde(rename = "signType")]
    pub sign_type: String,
    #[serde(rename = "paySign")]
    pub pay_sign: String,
}
