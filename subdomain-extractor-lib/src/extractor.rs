//! Subdomain matching over a single page body.
//!
//! A match is one or more `label.` segments (letters, digits, `-`, `_`)
//! directly followed by the target domain, with the domain matched literally.

use crate::error::ExtractorError;
use regex::Regex;
use std::collections::HashSet;

/// Compiled matcher for one target domain.
///
/// Build it once per run and share it between units; matching is read-only.
///
/// # Example
///
/// ```rust
/// use subdomain_extractor_lib::SubdomainExtractor;
///
/// let extractor = SubdomainExtractor::new("ford.com").unwrap();
/// let found = extractor.extract("see www.ford.com or api.eu.ford.com");
/// assert!(found.contains("www.ford.com"));
/// assert!(found.contains("api.eu.ford.com"));
/// ```
#[derive(Debug, Clone)]
pub struct SubdomainExtractor {
    domain: String,
    pattern: Regex,
}

impl SubdomainExtractor {
    /// Compile the pattern for `domain`.
    ///
    /// # Errors
    ///
    /// Returns `ExtractorError::InvalidDomain` if the domain is empty or
    /// contains whitespace.
    pub fn new(domain: &str) -> Result<Self, ExtractorError> {
        if domain.is_empty() {
            return Err(ExtractorError::invalid_domain(
                domain,
                "Domain cannot be empty",
            ));
        }
        if domain.chars().any(char::is_whitespace) {
            return Err(ExtractorError::invalid_domain(
                domain,
                "Domain cannot contain whitespace",
            ));
        }

        let pattern = Regex::new(&format!(r"([a-zA-Z0-9_-]+\.)+{}", regex::escape(domain)))?;

        Ok(Self {
            domain: domain.to_string(),
            pattern,
        })
    }

    /// The target domain this extractor was built for.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Return every distinct match in `body`. Never fails; no match is an empty set.
    pub fn extract(&self, body: &str) -> HashSet<String> {
        self.pattern
            .find_iter(body)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// One-shot form of [`SubdomainExtractor::extract`].
pub fn find_subdomains(body: &str, domain: &str) -> Result<HashSet<String>, ExtractorError> {
    Ok(SubdomainExtractor::new(domain)?.extract(body))
}
