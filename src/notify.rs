use tracing::{debug, warn};

use crate::client::WxPayClient;
use crate::codec;
use crate::crypto::decrypt::decrypt_aes_256_ecb;
use crate::crypto::verify::verify_envelope;
use crate::error::WxPayError;
use crate::model::common::ResponseStatus;
use crate::model::notify::*;
use crate::model::typed;

impl WxPayClient {
    /// Parse and verify a payment result callback.
    ///
    /// See [`parse_paid_notify`].
    pub fn parse_paid_notify(&self, body: &[u8]) -> Result<PaidNotify, WxPayError> {
        parse_paid_notify(body, self.api_key())
    }

    /// Parse a refund result callback and decrypt its `req_info`.
    ///
    /// See [`parse_refunded_notify`].
    pub fn parse_refunded_notify(&self, body: &[u8]) -> Result<RefundedNotify, WxPayError> {
        parse_refunded_notify(body, self.api_key())
    }
}

/// Parse and verify a payment result callback.
///
/// 1. Decodes the envelope and checks `return_code`
/// 2. Verifies `sign` over the envelope with `api_key`, using the declared `sign_type`
/// 3. Checks `result_code`
pub fn parse_paid_notify(body: &[u8], api_key: &str) -> Result<PaidNotify, WxPayError> {
    let body = body_str(body)?;
    let fields = codec::decode(body)?;
    let status = ResponseStatus::from_params(&fields);
    status.check_return()?;

    if let Err(e) = verify_envelope(&fields, api_key) {
        warn!(out_trade_no = fields.get("out_trade_no"), "paid notify signature rejected");
        return Err(e);
    }
    status.check_result()?;

    let notify: PaidNotify = typed(fields)?;
    debug!(
        out_trade_no = %notify.out_trade_no,
        transaction_id = %notify.transaction_id,
        "paid notify accepted"
    );
    Ok(notify)
}

/// Parse a refund result callback.
///
/// Only `return_code` is checked on the outer envelope; the refund result is
/// carried inside the AES-256-ECB encrypted `req_info`, keyed by the MD5 of `api_key`.
pub fn parse_refunded_notify(body: &[u8], api_key: &str) -> Result<RefundedNotify, WxPayError> {
    let body = body_str(body)?;
    let fields = codec::decode(body)?;
    ResponseStatus::from_params(&fields).check_return()?;

    let mut notify: RefundedNotify = typed(fields)?;
    if notify.req_info.is_empty() {
        return Err(WxPayError::Decode("refund notify carries no req_info".into()));
    }

    let plaintext = decrypt_aes_256_ecb(api_key, &notify.req_info)?;
    let inner = codec::decode(&plaintext)?;
    let mut info: RefundedReqInfo = codec::decode_as(&inner)?;
    info.raw = inner;

    debug!(
        out_refund_no = %info.out_refund_no,
        refund_status = %info.refund_status,
        "refund notify decrypted"
    );
    notify.info = Some(info);
    Ok(notify)
}

fn body_str(body: &[u8]) -> Result<&str, WxPayError> {
    if body.is_empty() {
        return Err(WxPayError::Decode("notify body is empty".into()));
    }
    std::str::from_utf8(body).map_err(|e| WxPayError::Decode(format!("utf8 decode: {e}")))
}
