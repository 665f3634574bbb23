pub mod common;
pub mod notify;
pub mod prepay;
pub mod refund;

use serde::de::DeserializeOwned;

use crate::codec::{self, Params};
use crate::error::WxPayError;
use common::ResponseStatus;

/// A typed response or callback record.
///
/// Business fields are read from the decoded field set; the status layers and
/// the raw fields are attached afterwards.
pub(crate) trait Envelope: DeserializeOwned {
    fn attach(&mut self, status: ResponseStatus, raw: Params);
}

/// Build `T` from decoded `params` and attach them.
pub(crate) fn typed<T: Envelope>(params: Params) -> Result<T, WxPayError> {
    let mut record: T = codec::decode_as(&params)?;
    record.attach(ResponseStatus::from_params(&params), params);
    Ok(record)
}
