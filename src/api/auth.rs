//! OAuth 1.0a request signing utilities.

use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;

use crate::config::Credentials;
use crate::error::{Error, Result};

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters are left as-is, everything else is encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Length of the generated `oauth_nonce`.
const NONCE_LENGTH: usize = 32;

/// Percent-encode a value the way OAuth 1.0a requires.
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}

/// Generate a random alphanumeric nonce.
pub fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

/// Current unix timestamp in seconds.
pub fn oauth_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Build the signature base string.
///
/// Format: METHOD&encode(base_url)&encode(sorted, encoded k=v pairs joined by &)
pub fn signature_base_string(method: &str, base_url: &str, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(base_url),
        percent_encode(&param_string)
    )
}

/// Compute the HMAC-SHA1 signature for a base string.
pub fn sign(base_string: &str, consumer_secret: &str, token_secret: &str) -> Result<String> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );

    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| Error::Authentication(format!("Invalid signing key: {}", e)))?;
    mac.update(base_string.as_bytes());

    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

/// Build the `Authorization` header value with an explicit nonce and timestamp.
pub fn authorization_header_with(
    credentials: &Credentials,
    method: &str,
    base_url: &str,
    query: &[(&str, &str)],
    nonce: &str,
    timestamp: i64,
) -> Result<String> {
    let timestamp = timestamp.to_string();
    let oauth_params: [(&str, &str); 6] = [
        ("oauth_consumer_key", credentials.app_key.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_token", credentials.access_token.as_str()),
        ("oauth_version", "1.0"),
    ];

    let mut all_params: Vec<(&str, &str)> = oauth_params.to_vec();
    all_params.extend_from_slice(query);

    let base_string = signature_base_string(method, base_url, &all_params);
    let signature = sign(
        &base_string,
        &credentials.app_secret,
        &credentials.access_secret,
    )?;

    let mut header_params: Vec<(&str, &str)> = oauth_params.to_vec();
    header_params.push(("oauth_signature", signature.as_str()));
    header_params.sort();

    let fields = header_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {}", fields))
}

/// Build the `Authorization` header value for a request.
pub fn authorization_header(
    credentials: &Credentials,
    method: &str,
    base_url: &str,
    query: &[(&str, &str)],
) -> Result<String> {
    authorization_header_with(
        credentials,
        method,
        base_url,
        query,
        &generate_nonce(),
        oauth_timestamp(),
    )
}
