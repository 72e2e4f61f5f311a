//! Target identifier classification
//!
//! Customers submit free-form identifiers. Classifying them up front lets the
//! investigation stage pick the intelligence sources that understand them.

use crate::error::{CoreError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::sync::OnceLock;

/// Kind of identifier under investigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Domain,
    Url,
    Email,
    IpAddress,
    Phone,
    Company,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Domain => "domain",
            TargetKind::Url => "url",
            TargetKind::Email => "email",
            TargetKind::IpAddress => "ip_address",
            TargetKind::Phone => "phone",
            TargetKind::Company => "company",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const MAX_TARGET_LEN: usize = 512;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("valid email regex")
    })
}

fn domain_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?i)([a-z0-9]([a-z0-9\-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$")
            .expect("valid domain regex")
    })
}

/// Check that an e-mail address is syntactically plausible
pub fn is_valid_email(value: &str) -> bool {
    email_pattern().is_match(value.trim())
}

fn looks_like_phone(value: &str) -> bool {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')' | '.'));
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    allowed && (7..=15).contains(&digits)
}

/// Classify a target identifier
pub fn classify_target(target: &str) -> TargetKind {
    let target = target.trim();

    if target.parse::<IpAddr>().is_ok() {
        TargetKind::IpAddress
    } else if target.starts_with("http://") || target.starts_with("https://") {
        TargetKind::Url
    } else if email_pattern().is_match(target) {
        TargetKind::Email
    } else if looks_like_phone(target) {
        TargetKind::Phone
    } else if domain_pattern().is_match(target) {
        TargetKind::Domain
    } else {
        TargetKind::Company
    }
}

/// Normalize and validate a target, returning the trimmed value and its kind
pub fn validate_target(target: &str) -> Result<(String, TargetKind)> {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidTarget("target must not be empty".to_string()));
    }
    if trimmed.len() > MAX_TARGET_LEN {
        return Err(CoreError::InvalidTarget(format!(
            "target longer than {} characters",
            MAX_TARGET_LEN
        )));
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(CoreError::InvalidTarget(
            "target contains control characters".to_string(),
        ));
    }

    Ok((trimmed.to_string(), classify_target(trimmed)))
}
