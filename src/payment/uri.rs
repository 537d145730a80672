//! Payment URI assembly and read-back

use crate::error::{Error, Result};
use crate::payment::Address;
use std::fmt;

/// `scheme:target?key=value&...` with parameters kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentUri {
    scheme: String,
    target: String,
    params: Vec<(String, String)>,
}

impl PaymentUri {
    /// Start a URI addressed to `target`.
    pub fn new(scheme: &str, target: &Address) -> Self {
        Self {
            scheme: scheme.to_string(),
            target: target.to_string(),
            params: Vec::new(),
        }
    }

    /// Append a query parameter.
    pub fn with_param(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// Split a URI previously produced by [`PaymentUri`] back into its parts.
    pub fn parse(text: &str) -> Result<Self> {
        let (scheme, rest) = text
            .split_once(':')
            .filter(|(scheme, _)| !scheme.is_empty())
            .ok_or_else(|| Error::Other(format!("'{text}' has no URI scheme")))?;

        let (target, query) = match rest.split_once('?') {
            Some((target, query)) => (target, Some(query)),
            None => (rest, None),
        };

        let params = query
            .into_iter()
            .flat_map(|q| q.split('&'))
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect();

        Ok(Self {
            scheme: scheme.to_string(),
            target: target.to_string(),
            params,
        })
    }

    /// URI scheme without the colon
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Path target: the recipient, or the token contract for token transfers
    pub fn target(&self) -> &str {
        &self.target
    }

    /// First value for `key`, if present
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All parameters in order
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

impl fmt::Display for PaymentUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.target)?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}
