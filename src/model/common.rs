use tracing::warn;

use crate::codec::Params;
use crate::error::WxPayError;

pub const SUCCESS: &str = "SUCCESS";
pub const FAIL: &str = "FAIL";

/// Status fields shared by every response and callback envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseStatus {
    pub return_code: String,
    pub return_msg: Option<String>,
    pub result_code: Option<String>,
    pub err_code: Option<String>,
    pub err_code_des: Option<String>,
}

impl ResponseStatus {
    pub fn from_params(params: &Params) -> Self {
        let field = |k: &str| params.get(k).map(str::to_string);
        Self {
            return_code: field("return_code").unwrap_or_default(),
            return_msg: field("return_msg"),
            result_code: field("result_code"),
            err_code: field("err_code"),
            err_code_des: field("err_code_des"),
        }
    }

    /// Transport layer: `return_code`.
    pub fn check_return(&self) -> Result<(), WxPayError> {
        match self.return_code.as_str() {
            SUCCESS => Ok(()),
            FAIL => {
                let return_msg = self.return_msg.clone().unwrap_or_default();
                warn!(return_msg = %return_msg, "gateway returned FAIL");
                Err(WxPayError::ReturnFail { return_msg })
            }
            other => Err(WxPayError::ReturnFail {
                return_msg: format!("unknown return code: {other}"),
            }),
        }
    }

    /// Business layer: `result_code`. Only meaningful once [`check_return`] passed.
    ///
    /// [`check_return`]: ResponseStatus::check_return
    pub fn check_result(&self) -> Result<(), WxPayError> {
        match self.result_code.as_deref().unwrap_or_default() {
            SUCCESS => Ok(()),
            FAIL => {
                let err_code = self.err_code.clone().unwrap_or_default();
                let err_code_des = self.err_code_des.clone().unwrap_or_default();
                warn!(err_code = %err_code, err_code_des = %err_code_des, "gateway business FAIL");
                Err(WxPayError::BusinessFail {
                    err_code,
                    err_code_des,
                })
            }
            other => Err(WxPayError::BusinessFail {
                err_code: other.to_string(),
                err_code_des: "unknown result code".into(),
            }),
        }
    }

    /// Both layers, in order.
    pub fn check(&self) -> Result<(), WxPayError> {
        self.check_return()?;
        self.check_result()
    }
}
