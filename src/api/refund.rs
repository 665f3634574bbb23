use super::require;
use crate::client::WxPayClient;
use crate::codec::Params;
use crate::error::WxPayError;
use crate::model::refund::{RefundRequest, RefundResponse};

const REFUND_PATH: &str = "/secapi/pay/refund";

impl WxPayClient {
    /// Create a refund. Needs the merchant TLS client identity.
    ///
    /// POST /secapi/pay/refund
    pub async fn refund(&self, req: &RefundRequest) -> Result<RefundResponse, WxPayError> {
        let sign_type = self.resolve_sign_type(req.sign_type);
        let params = self.seal(self.refund_params(req)?, sign_type)?;
        self.post_xml_secure(REFUND_PATH, &params).await
    }

    /// Validate a refund request and lay it out as the unsigned field set.
    pub(crate) fn refund_params(&self, req: &RefundRequest) -> Result<Params, WxPayError> {
        let (target_field, target_value) = req.target.field();
        require(target_value, target_field)?;
        require(&req.out_refund_no, "out_refund_no")?;
        if req.total_fee <= 0 {
            return Err(WxPayError::InvalidArgument(format!(
                "total_fee must be positive, got {}",
                req.total_fee
            )));
        }
        if req.refund_fee <= 0 {
            return Err(WxPayError::InvalidArgument(format!(
                "refund_fee must be positive, got {}",
                req.refund_fee
            )));
        }

        let mut params = self.base_params(req.nonce_str.as_deref())?;
        params.insert(target_field, target_value);
        params.insert("out_refund_no", req.out_refund_no.as_str());
        params.insert("total_fee", req.total_fee.to_string());
        params.insert("refund_fee", req.refund_fee.to_string());
        params.insert_opt("refund_fee_type", req.refund_fee_type.as_deref());
        params.insert_opt("refund_desc", req.refund_desc.as_deref());
        params.insert_opt("refund_account", req.refund_account.as_deref());
        params.insert_opt("notify_url", req.notify_url.as_deref());
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::error::ErrorKind;
    use crate::model::refund::RefundTarget;

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
    fn test_params_by_out_trade_no() {
        let mut req = RefundRequest::new(RefundTarget::OutTradeNo("T1".into()), "R1", 100, 30);
        req.refund_desc = Some("damaged".into());
        let params = client().refund_params(&req).unwrap();
        assert_eq!(params.get("out_trade_no"), Some("T1"));
        assert!(!params.contains_key("transaction_id"));
        assert_eq!(params.get("out_refund_no"), Some("R1"));
        assert_eq!(params.get("total_fee"), Some("100"));
        assert_eq!(params.get("refund_fee"), Some("30"));
        assert_eq!(params.get("refund_desc"), Some("damaged"));
        assert!(!params.contains_key("notify_url"));
    }

    #[test]
    fn test_params_by_transaction_id() {
        let req = RefundRequest::new(RefundTarget::TransactionId("42".into()), "R1", 100, 100);
        let params = client().refund_params(&req).unwrap();
        assert_eq!(params.get("transaction_id"), Some("42"));
        assert!(!params.contains_key("out_trade_no"));
    }

    #[test]
    fn test_empty_target_rejected() {
        let req = RefundRequest::new(RefundTarget::OutTradeNo(String::new()), "R1", 100, 30);
        let err = client().refund_params(&req).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("out_trade_no"));
    }

    #[test]
    fn test_missing_out_refund_no() {
        let req = RefundRequest::new(RefundTarget::OutTradeNo("T1".into()), "", 100, 30);
        let err = client().refund_params(&req).unwrap_err();
        assert!(err.to_string().contains("out_refund_no"));
    }

    #[test]
    fn test_non_positive_fees() {
        let req = RefundRequest::new(RefundTarget::OutTradeNo("T1".into()), "R1", 0, 30);
        assert!(client().refund_params(&req).unwrap_err().to_string().contains("total_fee"));

        let req = RefundRequest::new(RefundTarget::OutTradeNo("T1".into()), "R1", 100, 0);
        assert!(client().refund_params(&req).unwrap_err().to_string().contains("refund_fee"));
    }

    #[tokio::test]
    async fn test_validation_precedes_identity_check() {
        // No TLS identity configured: the argument error must still win.
        let req = RefundRequest::new(RefundTarget::OutTradeNo(String::new()), "R1", 100, 30);
        let err = client().refund(&req).await.unwrap_err();
        assert!(err.to_string().contains("out_trade_no"));
    }
}
