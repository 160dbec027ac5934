use ignore::overrides::{Override, OverrideBuilder};
use std::fmt;
use std::path::Path;

/// A compiled gitignore-style glob.
///
/// Patterns without a `/` match at any depth (`*.py`); patterns containing a
/// `/` are anchored at the project root (`/next.config.*`, `docs/**/*.md`).
#[derive(Clone)]
pub struct GlobPattern {
    source: String,
    matcher: Override,
}

impl GlobPattern {
    pub fn new(source: &str) -> Result<Self, String> {
        if source.trim().is_empty() {
            return Err("glob must not be empty".to_string());
        }
        if source.starts_with('!') {
            return Err(format!("negated glob {:?} is not supported", source));
        }
        if source.split('/').any(|part| part == "..") {
            return Err(format!("glob {:?} must not contain '..'", source));
        }

        let mut builder = OverrideBuilder::new("/");
        builder
            .add(source)
            .map_err(|e| format!("invalid glob {:?}: {}", source, e))?;
        let matcher = builder
            .build()
            .map_err(|e| format!("invalid glob {:?}: {}", source, e))?;

        Ok(Self {
            source: source.to_string(),
            matcher,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Match a file path relative to the project root
    pub fn is_match(&self, relative: &Path) -> bool {
        self.matcher.matched(relative, false).is_whitelist()
    }
}

impl fmt::Debug for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GlobPattern").field(&self.source).finish()
    }
}
