use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};

static QUOTES_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/quotes");

/// Languages with a bundled quote pool.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SupportedLanguage {
    #[default]
    En,
    Ko,
}

impl FromStr for SupportedLanguage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::En),
            "ko" | "korean" => Ok(Self::Ko),
            other => Err(Error::UnknownLanguage(other.to_string())),
        }
    }
}

impl SupportedLanguage {
    pub fn code(&self) -> String {
        self.to_string()
    }

    pub fn all() -> &'static [SupportedLanguage] {
        &[Self::En, Self::Ko]
    }
}

/// Ordered passages for one language. Never mutated after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotePool {
    language: String,
    quotes: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PoolFile {
    Tagged {
        #[serde(default)]
        language: Option<String>,
        quotes: Vec<String>,
    },
    Bare(Vec<String>),
}

impl QuotePool {
    pub fn new(language: impl Into<String>, quotes: Vec<String>) -> Self {
        let quotes = quotes
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();
        Self {
            language: language.into(),
            quotes,
        }
    }

    /// Pool bundled into the binary.
    pub fn bundled(language: SupportedLanguage) -> Result<Self> {
        let name = format!("{}.json", language.code());
        let file = QUOTES_DIR
            .get_file(&name)
            .ok_or_else(|| Error::QuotePool(format!("missing bundled pool {name}")))?;
        let text = file
            .contents_utf8()
            .ok_or_else(|| Error::QuotePool(format!("{name} is not utf-8")))?;
        let pool = Self::parse(&language.code(), text)?;
        debug!(language = %language, size = pool.len(), "bundled pool loaded");
        Ok(pool)
    }

    /// Pool from a JSON file: `{"language": .., "quotes": [..]}` or a bare array.
    /// The file's own `language` field wins over `fallback_language`.
    pub fn from_file<P: AsRef<Path>>(path: P, fallback_language: &str) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::QuotePool(format!("{}: {e}", path.display())))?;
        let pool = Self::parse(fallback_language, &text)?;
        debug!(path = %path.display(), language = %pool.language, size = pool.len(), "custom pool loaded");
        Ok(pool)
    }

    pub fn parse(fallback_language: &str, text: &str) -> Result<Self> {
        let file: PoolFile =
            serde_json::from_str(text).map_err(|e| Error::QuotePool(e.to_string()))?;
        Ok(match file {
            PoolFile::Tagged { language, quotes } => Self::new(
                language.unwrap_or_else(|| fallback_language.to_string()),
                quotes,
            ),
            PoolFile::Bare(quotes) => Self::new(fallback_language, quotes),
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn quotes(&self) -> &[String] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_bundled_pools_load() {
        for lang in SupportedLanguage::all() {
            let pool = QuotePool::bundled(*lang).unwrap();
            assert_eq!(pool.language(), lang.code());
            assert!(pool.len() >= 3);
        }
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(SupportedLanguage::En.to_string(), "en");
        assert_eq!(SupportedLanguage::Ko.code(), "ko");
        assert_eq!("KO".parse::<SupportedLanguage>().unwrap(), SupportedLanguage::Ko);
        assert_eq!("english".parse::<SupportedLanguage>().unwrap(), SupportedLanguage::En);
        assert_matches!(
            "fr".parse::<SupportedLanguage>(),
            Err(Error::UnknownLanguage(code)) if code == "fr"
        );
    }

    #[test]
    fn test_parse_tagged_and_bare() {
        let tagged = QuotePool::parse("en", r#"{"language": "de", "quotes": ["a", "b"]}"#).unwrap();
        assert_eq!(tagged.language(), "de");
        assert_eq!(tagged.quotes(), &["a".to_string(), "b".to_string()]);

        let untagged = QuotePool::parse("en", r#"{"quotes": ["x"]}"#).unwrap();
        assert_eq!(untagged.language(), "en");

        let bare = QuotePool::parse("ko", r#"["one", "two", "three"]"#).unwrap();
        assert_eq!(bare.language(), "ko");
        assert_eq!(bare.len(), 3);
    }

    #[test]
    fn test_blank_quotes_are_dropped() {
        let pool = QuotePool::parse("en", r#"["  spaced  ", "", "   "]"#).unwrap();
        assert_eq!(pool.quotes(), &["spaced".to_string()]);
    }

    #[test]
    fn test_empty_pool_is_allowed() {
        let pool = QuotePool::parse("en", "[]").unwrap();
        assert!(pool.is_empty());
    }

    #[test]
    fn test_invalid_pool_is_error() {
        assert_matches!(QuotePool::parse("en", "{\"quotes\": 3}"), Err(Error::QuotePool(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pool.json");
        std::fs::write(&path, r#"["alpha", "beta"]"#).unwrap();
        let pool = QuotePool::from_file(&path, "en").unwrap();
        assert_eq!(pool.len(), 2);

        assert_matches!(
            QuotePool::from_file(dir.path().join("missing.json"), "en"),
            Err(Error::QuotePool(_))
        );
    }
}
