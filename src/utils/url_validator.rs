//! 横幅目标地址校验
//!
//! 只接受 http/https，拒绝 javascript:、data: 等危险协议。

use url::Url;

use crate::errors::{AffiliatesError, Result};

const DANGEROUS_PROTOCOLS: &[&str] = &["javascript:", "data:", "file:", "vbscript:", "blob:"];

pub fn validate_url(url: &str) -> Result<()> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AffiliatesError::validation("URL cannot be empty"));
    }

    let lower = url.to_lowercase();
    if let Some(proto) = DANGEROUS_PROTOCOLS.iter().find(|p| lower.starts_with(*p)) {
        return Err(AffiliatesError::validation(format!(
            "Dangerous protocol blocked: {}",
            proto
        )));
    }

    let parsed = Url::parse(url)
        .map_err(|e| AffiliatesError::validation(format!("Invalid URL format: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AffiliatesError::validation(format!(
            "Invalid protocol: {}:. Only http:// and https:// are allowed",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_http_and_https() {
        assert!(validate_url("https://www.mozilla.org/firefox/").is_ok());
        assert!(validate_url("http://example.com/path?q=1").is_ok());
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(validate_url("").is_err());
        assert!(validate_url("javascript:alert(1)").is_err());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("not a url").is_err());
    }
}
