use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::codec::Params;
use crate::error::WxPayError;

/// Field carrying the signature; never part of its own input.
pub const SIGN_FIELD: &str = "sign";

/// Signature algorithm, as declared in the `sign_type` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SignType {
    #[default]
    Md5,
    HmacSha256,
}

impl SignType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignType::Md5 => "MD5",
            SignType::HmacSha256 => "HMAC-SHA256",
        }
    }
}

impl fmt::Display for SignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignType {
    type Err = WxPayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MD5" => Ok(SignType::Md5),
            "HMAC-SHA256" => Ok(SignType::HmacSha256),
            other => Err(WxPayError::InvalidArgument(format!(
                "unsupported sign_type: {other}"
            ))),
        }
    }
}

/// Build the string to sign.
///
/// Format: `k1=v1&k2=v2&...&kn=vn&key={api_key}`, keys in ascending byte order,
/// empty values and the `sign` field left out.
pub fn build_sign_message(params: &Params, api_key: &str) -> String {
    let mut message = String::new();
    for (k, v) in params.iter().filter(|(k, v)| *k != SIGN_FIELD && !v.is_empty()) {
        message.push_str(k);
        message.push('=');
        message.push_str(v);
        message.push('&');
    }
    message.push_str("key=");
    message.push_str(api_key);
    message
}

/// Sign `params` with the merchant API key and return an uppercase hex digest.
pub fn sign(params: &Params, api_key: &str, sign_type: SignType) -> Result<String, WxPayError> {
    let message = build_sign_message(params, api_key);
    match sign_type {
        SignType::Md5 => Ok(format!("{:X}", md5::compute(message.as_bytes()))),
        SignType::HmacSha256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(api_key.as_bytes())
                .map_err(|e| WxPayError::SignError(format!("create hmac: {e}")))?;
            mac.update(message.as_bytes());
            Ok(hex::encode_upper(mac.finalize().into_bytes()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Params {
        [
            ("appid", "wxd930ea5d5a258f4f"),
            ("mch_id", "10000100"),
            ("device_info", "1000"),
            ("body", "test"),
            ("nonce_str", "ibuaiVcKdpRxkhJA"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_build_sign_message() {
        let msg = build_sign_message(&sample(), "192006250b4c09247ec02edce69f6a2d");
        assert_eq!(
            msg,
            "appid=wxd930ea5d5a258f4f&body=test&device_info=1000&mch_id=10000100&nonce_str=ibuaiVcKdpRxkhJA&key=192006250b4c09247ec02edce69f6a2d"
        );
    }

    #[test]
    fn test_build_sign_message_empty_params() {
        assert_eq!(build_sign_message(&Params::new(), "k"), "key=k");
    }

    #[test]
    fn test_md5_known_vector() {
        // Reference example from the merchant API documentation.
        let sig = sign(&sample(), "192006250b4c09247ec02edce69f6a2d", SignType::Md5).unwrap();
        assert_eq!(sig, "9A0A8659F005D6984697E2CA0A9CF3B7");
    }

    #[test]
    fn test_hmac_sha256_known_vector() {
        let sig = sign(
            &sample(),
            "192006250b4c09247ec02edce69f6a2d",
            SignType::HmacSha256,
        )
        .unwrap();
        assert_eq!(
            sig,
            "6A9AE1657590FD6257D693A078E1C3E4BB6BA4DC30B23E0EE2496E54170DACD6"
        );
    }

    #[test]
    fn test_output_is_uppercase_hex() {
        for st in [SignType::Md5, SignType::HmacSha256] {
            let sig = sign(&sample(), "abc", st).unwrap();
            assert!(sig
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        }
        assert_eq!(sign(&sample(), "abc", SignType::Md5).unwrap().len(), 32);
        assert_eq!(sign(&sample(), "abc", SignType::HmacSha256).unwrap().len(), 64);
    }

    #[test]
    fn test_order_independent() {
        let forward: Params = [("a", "1"), ("b", "2"), ("c", "3")].into_iter().collect();
        let backward: Params = [("c", "3"), ("b", "2"), ("a", "1")].into_iter().collect();
        for st in [SignType::Md5, SignType::HmacSha256] {
            assert_eq!(
                sign(&forward, "k", st).unwrap(),
                sign(&backward, "k", st).unwrap()
            );
        }
    }

    #[test]
    fn test_sign_field_excluded() {
        let mut with_sign = sample();
        with_sign.insert(SIGN_FIELD, "WHATEVER");
        let mut other_sign = sample();
        other_sign.insert(SIGN_FIELD, "SOMETHING_ELSE");
        for st in [SignType::Md5, SignType::HmacSha256] {
            let base = sign(&sample(), "k", st).unwrap();
            assert_eq!(sign(&with_sign, "k", st).unwrap(), base);
            assert_eq!(sign(&other_sign, "k", st).unwrap(), base);
        }
    }

    #[test]
    fn test_empty_value_excluded() {
        let mut with_empty = sample();
        with_empty.insert("attach", "");
        assert_eq!(
            sign(&with_empty, "k", SignType::Md5).unwrap(),
            sign(&sample(), "k", SignType::Md5).unwrap()
        );
    }

    #[test]
    fn test_key_changes_signature() {
        assert_ne!(
            sign(&sample(), "k1", SignType::Md5).unwrap(),
            sign(&sample(), "k2", SignType::Md5).unwrap()
        );
    }

    #[test]
    fn test_does_not_mutate_input() {
        let mut params = sample();
        params.insert(SIGN_FIELD, "X");
        let before = params.clone();
        sign(&params, "k", SignType::HmacSha256).unwrap();
        assert_eq!(params, before);
    }

    #[test]
    fn test_sign_type_parse_and_display() {
        assert_eq!("MD5".parse::<SignType>().unwrap(), SignType::Md5);
        assert_eq!(
            "HMAC-SHA256".parse::<SignType>().unwrap(),
            SignType::HmacSha256
        );
        assert!("SHA1".parse::<SignType>().is_err());
        assert_eq!(SignType::HmacSha256.to_string(), "HMAC-SHA256");
        assert_eq!(SignType::default(), SignType::Md5);
    }
}
