//! Render configuration, from the environment or a JSON file.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use cv_data::ChainSource;
use cv_types::{config_error, ChainSide, CvResult};

pub const ENV_SOURCE: &str = "CHAINVIEW_SOURCE";
pub const ENV_MEASURE: &str = "CHAINVIEW_MEASURE";
pub const ENV_SIDE: &str = "CHAINVIEW_SIDE";
pub const ENV_AS_OF: &str = "CHAINVIEW_AS_OF";
pub const ENV_OUTPUT: &str = "CHAINVIEW_OUTPUT";
pub const ENV_FORMAT: &str = "CHAINVIEW_FORMAT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// SVG document.
    #[default]
    Svg,
    /// The draw list as JSON, for other surfaces to replay.
    Json,
}

/// Configuration for one chain graph render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub source: ChainSource,
    /// Registry name of the measure to plot.
    pub measure: String,
    pub side: ChainSide,
    /// Reference instant for expiry filtering and day counts. `None` = now.
    pub as_of: Option<DateTime<Utc>>,
    /// Output file. `None` = stdout.
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            source: ChainSource::sample(),
            measure: "askPrice".to_string(),
            side: ChainSide::Calls,
            as_of: None,
            output: None,
            format: OutputFormat::Svg,
        }
    }
}

impl RenderConfig {
    /// Read `CHAINVIEW_*` variables over the defaults.
    pub fn from_env() -> CvResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> CvResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(source) = get(ENV_SOURCE) {
            config.source = source
                .parse()
                .map_err(|e| config_error!("{}: {}", ENV_SOURCE, e))?;
        }
        if let Some(measure) = get(ENV_MEASURE) {
            config.measure = measure.trim().to_string();
        }
        if let Some(side) = get(ENV_SIDE) {
            config.side = side
                .parse()
                .map_err(|e| config_error!("{}: {}", ENV_SIDE, e))?;
        }
        if let Some(as_of) = get(ENV_AS_OF) {
            config.as_of = Some(parse_as_of(&as_of)?);
        }
        if let Some(output) = get(ENV_OUTPUT) {
            config.output = Some(PathBuf::from(output));
        }
        if let Some(format) = get(ENV_FORMAT) {
            config.format = match format.trim().to_ascii_lowercase().as_str() {
                "svg" => OutputFormat::Svg,
                "json" => OutputFormat::Json,
                other => return Err(config_error!("{}: unknown format {}", ENV_FORMAT, other)),
            };
        }

        Ok(config)
    }

    /// Load a JSON config file; missing fields keep defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CvResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| config_error!("{}: {}", path.display(), e))
    }

    /// The configured reference instant, or `now`.
    pub fn resolve_as_of(&self) -> DateTime<Utc> {
        self.as_of.unwrap_or_else(Utc::now)
    }
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_as_of(value: &str) -> CvResult<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|d| d.and_time(NaiveTime::default()).and_utc())
        })
        .map_err(|_| config_error!("{}: cannot parse {:?} as a date", ENV_AS_OF, value))
}
