//! Compiled keyword index.
//!
//! The index is an immutable, insertion-ordered list of compiled keyword
//! patterns. Rebuilds produce a fresh index that the matcher swaps in
//! atomically; readers always see either the old index or the new one in
//! full.

use regex::Regex;
use router_core::{RouterError, RouterResult, ServiceRegistry};
use tracing::warn;

/// One keyword binding before compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordSpec {
    /// The keyword, matched case-insensitively at word boundaries.
    pub keyword: String,
    /// Target service id.
    pub service: String,
    /// Score weight per occurrence.
    pub weight: f64,
}

impl KeywordSpec {
    /// Create a spec with the default weight of `1.0`.
    pub fn new(keyword: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            service: service.into(),
            weight: 1.0,
        }
    }

    /// Create a spec with an explicit weight.
    pub fn weighted(
        keyword: impl Into<String>,
        service: impl Into<String>,
        weight: f64,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            service: service.into(),
            weight,
        }
    }
}

/// A compiled entry: the keyword plus its word-boundary pattern.
#[derive(Debug)]
pub struct KeywordEntry {
    keyword: String,
    pattern: Regex,
    service: String,
    weight: f64,
}

impl KeywordEntry {
    /// The lowercase keyword.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// The target service id.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The score weight per occurrence.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Count non-overlapping word-boundary occurrences in lowercased text.
    #[must_use]
    pub fn count_matches(&self, text_lower: &str) -> usize {
        self.pattern.find_iter(text_lower).count()
    }
}

/// Immutable, insertion-ordered keyword index.
#[derive(Debug, Default)]
pub struct KeywordIndex {
    entries: Vec<KeywordEntry>,
}

impl KeywordIndex {
    /// Build an index from static specs plus registry-derived entries.
    ///
    /// Registry entries overlay static ones: when both bind the same
    /// keyword, the registry binding wins and keeps the static entry's
    /// position. A keyword whose pattern fails to compile is logged and
    /// skipped; blank keywords are rejected.
    ///
    /// # Errors
    /// Returns `Configuration` for a blank keyword.
    pub fn build(
        static_specs: &[KeywordSpec],
        registry: Option<&ServiceRegistry>,
    ) -> RouterResult<Self> {
        let mut specs: Vec<KeywordSpec> = Vec::with_capacity(static_specs.len());
        for spec in static_specs {
            merge_spec(&mut specs, spec.clone())?;
        }
        if let Some(registry) = registry {
            for definition in registry.list() {
                for keyword in definition.keywords() {
                    merge_spec(
                        &mut specs,
                        KeywordSpec::new(keyword.clone(), definition.id()),
                    )?;
                }
            }
        }

        let mut entries = Vec::with_capacity(specs.len());
        for spec in specs {
            let keyword = spec.keyword.to_lowercase();
            let pattern = format!(r"\b{}\b", regex::escape(&keyword));
            match Regex::new(&pattern) {
                Ok(regex) => entries.push(KeywordEntry {
                    keyword,
                    pattern: regex,
                    service: spec.service,
                    weight: spec.weight,
                }),
                Err(error) => {
                    warn!(keyword = %keyword, error = %error, "skipping keyword with uncompilable pattern");
                }
            }
        }
        Ok(Self { entries })
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }

    /// Number of compiled entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn merge_spec(specs: &mut Vec<KeywordSpec>, spec: KeywordSpec) -> RouterResult<()> {
    if spec.keyword.trim().is_empty() {
        return Err(RouterError::configuration("keyword must not be blank"));
    }
    if spec.service.trim().is_empty() {
        return Err(RouterError::configuration(format!(
            "keyword '{}' maps to a blank service",
            spec.keyword
        )));
    }
    let keyword = spec.keyword.to_lowercase();
    if let Some(existing) = specs
        .iter_mut()
        .find(|s| s.keyword.to_lowercase() == keyword)
    {
        // Later bindings (registry overlaying static) replace in place.
        *existing = spec;
    } else {
        specs.push(spec);
    }
    Ok(())
}
