pub mod prepay;
pub mod refund;

use crate::error::WxPayError;

fn require(value: &str, field: &str) -> Result<(), WxPayError> {
    if value.is_empty() {
        Err(WxPayError::missing(field))
    } else {
        Ok(())
    }
}
