use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use cv_types::DataError;

/// Where a chain document lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "location", rename_all = "lowercase")]
pub enum ChainSource {
    File(PathBuf),
    Http(String),
}

impl ChainSource {
    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        ChainSource::File(path.into())
    }

    pub fn http(url: &str) -> Self {
        ChainSource::Http(url.to_string())
    }

    /// The bundled sample chain location used when nothing is configured.
    pub fn sample() -> Self {
        ChainSource::file("data/options.json")
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ChainSource::Http(_))
    }
}

impl FromStr for ChainSource {
    type Err = DataError;

    /// `http://` and `https://` locations are remote; anything else is a path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DataError::InvalidSource {
                message: "empty chain location".to_string(),
            });
        }
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(ChainSource::http(s))
        } else if lower.contains("://") {
            Err(DataError::InvalidSource {
                message: format!("unsupported scheme in {s}"),
            })
        } else {
            Ok(ChainSource::file(s))
        }
    }
}

impl fmt::Display for ChainSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainSource::File(path) => write!(f, "{}", path.display()),
            ChainSource::Http(url) => write!(f, "{}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sources() {
        assert_eq!(
            "data/options.json".parse::<ChainSource>().unwrap(),
            ChainSource::file("data/options.json")
        );
        let remote = "https://example.com/chain.json".parse::<ChainSource>().unwrap();
        assert!(remote.is_remote());
        assert_eq!(remote.to_string(), "https://example.com/chain.json");
    }

    #[test]
    fn test_parse_rejects_bad_locations() {
        assert!(matches!(
            "".parse::<ChainSource>(),
            Err(DataError::InvalidSource { .. })
        ));
        assert!(matches!(
            "ftp://example.com/chain.json".parse::<ChainSource>(),
            Err(DataError::InvalidSource { .. })
        ));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(ChainSource::http("http://localhost/x.json")).unwrap();
        assert_eq!(json["type"], "http");
        assert_eq!(json["location"], "http://localhost/x.json");
    }
}
