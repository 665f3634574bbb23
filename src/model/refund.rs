use serde::Deserialize;

use super::common::ResponseStatus;
use super::Envelope;
use crate::codec::Params;
use crate::crypto::sign::SignType;
use crate::error::WxPayError;

/// The payment a refund is issued against. The gateway accepts exactly one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefundTarget {
    /// WeChat Pay order number.
    TransactionId(String),
    /// Merchant order number.
    OutTradeNo(String),
}

impl RefundTarget {
    /// Pick the target from a pair of possibly-empty identifiers.
    ///
    /// Exactly one of them must be non-empty.
    pub fn from_ids(transaction_id: &str, out_trade_no: &str) -> Result<Self, WxPayError> {
        match (transaction_id.is_empty(), out_trade_no.is_empty()) {
            (false, true) => Ok(Self::TransactionId(transaction_id.to_string())),
            (true, false) => Ok(Self::OutTradeNo(out_trade_no.to_string())),
            (true, true) => Err(WxPayError::InvalidArgument(
                "one of transaction_id or out_trade_no is required".into(),
            )),
            (false, false) => Err(WxPayError::InvalidArgument(
                "only one of transaction_id or out_trade_no may be set".into(),
            )),
        }
    }

    pub(crate) fn field(&self) -> (&'static str, &str) {
        match self {
            Self::TransactionId(id) => ("transaction_id", id),
            Self::OutTradeNo(no) => ("out_trade_no", no),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RefundRequest {
    pub target: RefundTarget,
    pub out_refund_no: String,
    /// Order amount in fen.
    pub total_fee: i64,
    /// Refund amount in fen.
    pub refund_fee: i64,
    /// Generated when `None`.
    pub nonce_str: Option<String>,
    /// Falls back to the client's configured sign type.
    pub sign_type: Option<SignType>,
    pub refund_fee_type: Option<String>,
    pub refund_desc: Option<String>,
    /// `REFUND_SOURCE_UNSETTLED_FUNDS` or `REFUND_SOURCE_RECHARGE_FUNDS`.
    pub refund_account: Option<String>,
    /// Overrides the refund callback URL configured on the merchant platform.
    pub notify_url: Option<String>,
}

impl RefundRequest {
    pub fn new(
        target: RefundTarget,
        out_refund_no: impl Into<String>,
        total_fee: i64,
        refund_fee: i64,
    ) -> Self {
        Self {
            target,
            out_refund_no: out_refund_no.into(),
            total_fee,
            refund_fee,
            nonce_str: None,
            sign_type: None,
            refund_fee_type: None,
            refund_desc: None,
            refund_account: None,
            notify_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefundResponse {
    #[serde(skip)]
    pub status: ResponseStatus,
    #[serde(default, rename = "appid")]
    pub app_id: String,
    #[serde(default)]
    pub mch_id: String,
    #[serde(default)]
    pub nonce_str: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub out_trade_no: String,
    #[serde(default)]
    pub out_refund_no: String,
    #[serde(default)]
    pub refund_id: String,
    #[serde(default)]
    pub refund_fee: i64,
    #[serde(default)]
    pub settlement_refund_fee: Option<i64>,
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
    pub cash_refund_fee: Option<i64>,
    #[serde(skip)]
    pub raw: Params,
}

impl Envelope for RefundResponse {
    fn attach(&mut self, status: ResponseStatus, raw: Params) {
        self.status = status;
        self.raw = raw;
    }
}
