//! Request-normalization firewall.
//!
//! # Responsibilities
//! - Reject paths whose meaning depends on normalization (`/../`, `//`)
//! - Reject encodings that let a path mean different things to different layers
//!
//! # Design Decisions
//! - Runs before policy evaluation; a rejected request never reaches it
//! - Pluggable through the `HttpFirewall` trait
//! - Ignored paths skip the firewall entirely

use std::fmt::Debug;

use axum::http::{Method, Uri};

use crate::config::FirewallKind;
use crate::security::error::SecurityError;

/// Inspects a request before any security decision is made.
pub trait HttpFirewall: Send + Sync + Debug {
    /// Returns `MalformedRequestPath` if the request must be rejected.
    fn inspect(&self, method: &Method, uri: &Uri) -> Result<(), SecurityError>;
}

/// Build the firewall selected in configuration.
pub fn from_kind(kind: FirewallKind) -> Box<dyn HttpFirewall> {
    match kind {
        FirewallKind::Default => Box::new(DefaultHttpFirewall),
        FirewallKind::Strict => Box::new(StrictHttpFirewall::default()),
    }
}

/// Rejects un-normalized paths and encoded slashes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHttpFirewall;

impl HttpFirewall for DefaultHttpFirewall {
    fn inspect(&self, _method: &Method, uri: &Uri) -> Result<(), SecurityError> {
        let path = uri.path();

        if !is_normalized(path) {
            return Err(SecurityError::MalformedRequestPath(
                "un-normalized paths are not supported".to_string(),
            ));
        }
        if contains_any(path, &["%2f", "%2F"]) {
            return Err(SecurityError::MalformedRequestPath(
                "encoded slash".to_string(),
            ));
        }
        Ok(())
    }
}

const STRICT_BLOCKLIST: &[(&str, &str)] = &[
    (";", "semicolon"),
    ("%3b", "encoded semicolon"),
    ("%3B", "encoded semicolon"),
    ("%25", "encoded percent"),
    ("%2e", "encoded period"),
    ("%2E", "encoded period"),
    ("\\", "backslash"),
    ("%5c", "encoded backslash"),
    ("%5C", "encoded backslash"),
    ("%00", "encoded null"),
];

/// Everything `DefaultHttpFirewall` rejects, plus risky encodings and
/// methods outside the allow-list.
#[derive(Debug, Clone)]
pub struct StrictHttpFirewall {
    allowed_methods: Vec<Method>,
}

impl Default for StrictHttpFirewall {
    fn default() -> Self {
        Self {
            allowed_methods: vec![
                Method::DELETE,
                Method::GET,
                Method::HEAD,
                Method::OPTIONS,
                Method::PATCH,
                Method::POST,
                Method::PUT,
            ],
        }
    }
}

impl HttpFirewall for StrictHttpFirewall {
    fn inspect(&self, method: &Method, uri: &Uri) -> Result<(), SecurityError> {
        if !self.allowed_methods.contains(method) {
            return Err(SecurityError::MalformedRequestPath(format!(
                "method {method} is not allowed"
            )));
        }

        DefaultHttpFirewall.inspect(method, uri)?;

        let path = uri.path();
        if let Some((_, what)) = STRICT_BLOCKLIST
            .iter()
            .find(|(needle, _)| path.contains(needle))
        {
            return Err(SecurityError::MalformedRequestPath(what.to_string()));
        }
        if path.chars().any(char::is_control) {
            return Err(SecurityError::MalformedRequestPath(
                "control character".to_string(),
            ));
        }
        Ok(())
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// A path is normalized when it has no empty, `.` or `..` segments.
fn is_normalized(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return path.is_empty();
    };

    let segments: Vec<&str> = rest.split('/').collect();
    let last = segments.len() - 1;
    segments.iter().enumerate().all(|(i, segment)| match *segment {
        "." | ".." => false,
        // A single trailing slash is allowed, empty inner segments are not.
        "" => i == last,
        _ => true,
    })
}
