use super::require;
use crate::client::{current_timestamp, WxPayClient};
use crate::codec::Params;
use crate::crypto::sign::{sign, SignType};
use crate::error::WxPayError;
use crate::model::prepay::*;

const UNIFIED_ORDER_PATH: &str = "/pay/unifiedorder";
const TRADE_TYPE_JSAPI: &str = "JSAPI";

impl WxPayClient {
    /// Unified order (JSAPI / mini-program).
    ///
    /// POST /pay/unifiedorder
    pub async fn unified_order(
        &self,
        req: &UnifiedOrderRequest,
    ) -> Result<UnifiedOrderResponse, WxPayError> {
        let sign_type = self.resolve_sign_type(req.sign_type);
        let params = self.seal(self.unified_order_params(req)?, sign_type)?;

        let resp: UnifiedOrderResponse = self.post_xml(UNIFIED_ORDER_PATH, &params).await?;
        if resp.prepay_id.is_empty() {
            return Err(WxPayError::Decode("response carries no prepay_id".into()));
        }
        Ok(resp)
    }

    /// Validate a unified order request and lay it out as the unsigned field set.
    pub(crate) fn unified_order_params(
        &self,
        req: &UnifiedOrderRequest,
    ) -> Result<Params, WxPayError> {
        require(&req.body, "body")?;
        require(&req.out_trade_no, "out_trade_no")?;
        if req.total_fee <= 0 {
            return Err(WxPayError::InvalidArgument(format!(
                "total_fee must be positive, got {}",
                req.total_fee
            )));
        }
        require(&req.spbill_create_ip, "spbill_create_ip")?;
        require(&req.notify_url, "notify_url")?;
        require(&req.open_id, "open_id")?;

        let mut params = self.base_params(req.nonce_str.as_deref())?;
        params.insert("body", req.body.as_str());
        params.insert("out_trade_no", req.out_trade_no.as_str());
        params.insert("total_fee", req.total_fee.to_string());
        params.insert("spbill_create_ip", req.spbill_create_ip.as_str());
        params.insert("notify_url", req.notify_url.as_str());
        params.insert("openid", req.open_id.as_str());
        params.insert("trade_type", TRADE_TYPE_JSAPI);
        params.insert_opt("device_info", req.device_info.as_deref());
        params.insert_opt("detail", req.detail.as_deref());
        params.insert_opt("attach", req.attach.as_deref());
        params.insert_opt("fee_type", req.fee_type.as_deref());
        params.insert_opt("time_start", req.time_start.as_deref());
        params.insert_opt("time_expire", req.time_expire.as_deref());
        params.insert_opt("goods_tag", req.goods_tag.as_deref());
        params.insert_opt("limit_pay", req.limit_pay.as_deref());
        Ok(params)
    }

    /// Build the frontend payment invocation parameters for a prepay response.
    ///
    /// Signed with MD5 over `appId`, `timeStamp`, `nonceStr`, `package` and
    /// `signType`; the camel-case names are part of the signed content.
    pub fn front_pay_params(
        &self,
        resp: &UnifiedOrderResponse,
        timestamp: i64,
    ) -> Result<FrontPayParams, WxPayError> {
        build_front_pay_params(self.api_key(), resp, timestamp)
    }

    /// [`front_pay_params`](Self::front_pay_params) stamped with the current time.
    pub fn front_pay_params_now(
        &self,
        resp: &UnifiedOrderResponse,
    ) -> Result<FrontPayParams, WxPayError> {
        self.front_pay_params(resp, current_timestamp())
    }
}

pub fn build_front_pay_params(
    api_key: &str,
    resp: &UnifiedOrderResponse,
    timestamp: i64,
) -> Result<FrontPayParams, WxPayError> {
    for (value, field) in [
        (&resp.prepay_id, "prepay_id"),
        (&resp.app_id, "appid"),
        (&resp.nonce_str, "nonce_str"),
    ] {
        if value.is_empty() {
            return Err(WxPayError::missing(field));
        }
    }

    let time_stamp = timestamp.to_string();
    let package = format!("prepay_id={}", resp.prepay_id);
    let sign_type = SignType::Md5;

    let mut params = Params::new();
    params.insert("appId", resp.app_id.as_str());
    params.insert("timeStamp", time_stamp.as_str());
    params.insert("nonceStr", resp.nonce_str.as_str());
    params.insert("package", package.as_str());
    params.insert("signType", sign_type.as_str());
    let pay_sign = sign(&params, api_key, sign_type)?;

    Ok(FrontPayParams {
        app_id: resp.app_id.clone(),
        time_stamp,
        nonce_str: resp.nonce_str.clone(),
        package,
        sign_type: sign_type.as_str().to_string(),
        pay_sign,
    })
}
