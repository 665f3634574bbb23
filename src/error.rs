use thiserror::Error;

#[derive(Error, Debug)]
pub enum WxPayError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Encode failed: {0}")]
    Encode(String),

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WeChat Pay server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("WeChat Pay return failed: {return_msg}")]
    ReturnFail { return_msg: String },

    #[error("WeChat Pay business failed: code={err_code}, message={err_code_des}")]
    BusinessFail {
        err_code: String,
        err_code_des: String,
    },

    #[error("Signature generation failed: {0}")]
    SignError(String),

    #[error("Signature verification failed: {0}")]
    VerifyError(String),

    #[error("Decryption failed: {0}")]
    DecryptError(String),
}

/// Stable classification of [`WxPayError`], for callers that branch on the
/// failure class rather than the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    Encode,
    Decode,
    Transport,
    GatewayReturn,
    GatewayBusiness,
    Signature,
    Decrypt,
}

impl WxPayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) | Self::Config(_) => ErrorKind::InvalidArgument,
            Self::Encode(_) | Self::SignError(_) => ErrorKind::Encode,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Http(_) | Self::Status { .. } => ErrorKind::Transport,
            Self::ReturnFail { .. } => ErrorKind::GatewayReturn,
            Self::BusinessFail { .. } => ErrorKind::GatewayBusiness,
            Self::VerifyError(_) => ErrorKind::Signature,
            Self::DecryptError(_) => ErrorKind::Decrypt,
        }
    }

    pub(crate) fn missing(field: &str) -> Self {
        Self::InvalidArgument(format!("{field} is required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            WxPayError::Config("x".into()).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            WxPayError::Status {
                status: 502,
                body: String::new()
            }
            .kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            WxPayError::ReturnFail {
                return_msg: "签名错误".into()
            }
            .kind(),
            ErrorKind::GatewayReturn
        );
        assert_eq!(
            WxPayError::VerifyError("mismatch".into()).kind(),
            ErrorKind::Signature
        );
    }

    #[test]
    fn test_missing_message() {
        let err = WxPayError::missing("out_trade_no");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("out_trade_no is required"));
    }

    #[test]
    fn test_business_fail_display() {
        let err = WxPayError::BusinessFail {
            err_code: "ORDERPAID".into(),
            err_code_des: "订单已支付".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ORDERPAID"));
        assert!(msg.contains("订单已支付"));
    }
}
