use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the sender's signature, formatted `sha256=<base64>`.
pub const SIGNATURE_HEADER: &str = "typeform-signature";

/// The only hash name the sender is allowed to announce.
pub const SUPPORTED_ALGORITHM: &str = "sha256";

/// Why an inbound signature header was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureRejection {
    Missing,
    UnsupportedAlgorithm,
    Invalid,
}

impl SignatureRejection {
    /// Message used for logs and the alert channel.
    pub fn alert_message(self) -> &'static str {
        match self {
            Self::Missing => "Webhook signature is missing. Permission denied.",
            Self::UnsupportedAlgorithm => "Webhook sha is invalid. Permission denied.",
            Self::Invalid => "Webhook signature is invalid. Permission denied.",
        }
    }

    /// Detail returned to the sender in the 403 body.
    pub fn response_detail(self) -> &'static str {
        match self {
            Self::Missing => "Permission denied.",
            Self::UnsupportedAlgorithm => "Operation not supported.",
            Self::Invalid => "Invalid signature. Permission Denied.",
        }
    }
}

/// Split a `sha256=<base64>` header value into its signature part.
///
/// Only the first `=` separates the hash name; base64 padding stays in the signature.
pub fn parse_signature_header(value: Option<&str>) -> Result<&str, SignatureRejection> {
    let value = value.ok_or(SignatureRejection::Missing)?;
    let (algorithm, signature) = value
        .split_once('=')
        .ok_or(SignatureRejection::UnsupportedAlgorithm)?;
    if algorithm != SUPPORTED_ALGORITHM {
        return Err(SignatureRejection::UnsupportedAlgorithm);
    }
    Ok(signature)
}

/// Base64 HMAC-SHA256 of `body` keyed by `secret`.
pub fn sign(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verify `provided` against the HMAC of the exact raw body bytes.
///
/// Never errors: anything that prevents a comparison counts as a mismatch.
pub fn verify(secret: &str, body: &[u8], provided: &str) -> bool {
    let Ok(expected) = base64::engine::general_purpose::STANDARD.decode(provided) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
