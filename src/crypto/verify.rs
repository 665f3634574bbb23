use crate::codec::Params;
use crate::crypto::sign::{sign, SignType, SIGN_FIELD};
use crate::error::WxPayError;

/// Field declaring the signature algorithm of an envelope.
pub const SIGN_TYPE_FIELD: &str = "sign_type";

/// Check a signature against `params` signed with `api_key`.
///
/// Hex case is ignored.
pub fn verify_signature(
    params: &Params,
    api_key: &str,
    sign_type: SignType,
    signature: &str,
) -> Result<bool, WxPayError> {
    let expected = sign(params, api_key, sign_type)?;
    Ok(expected.eq_ignore_ascii_case(signature))
}

/// Verify a decoded envelope against its own `sign` field.
///
/// The algorithm is taken from the envelope's `sign_type`, `MD5` when absent.
pub fn verify_envelope(params: &Params, api_key: &str) -> Result<(), WxPayError> {
    let signature = params
        .get(SIGN_FIELD)
        .ok_or_else(|| WxPayError::VerifyError("envelope carries no sign".into()))?;

    let sign_type = match params.get(SIGN_TYPE_FIELD) {
        None => SignType::Md5,
        Some(s) => s
            .parse()
            .map_err(|_| WxPayError::VerifyError(format!("unsupported sign_type: {s}")))?,
    };

    if verify_signature(params, api_key, sign_type, signature)? {
        Ok(())
    } else {
        Err(WxPayError::VerifyError("signature mismatch".into()))
    }
}
