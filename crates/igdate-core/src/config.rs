use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use log::LevelFilter;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// One export page and the media folder its entries point into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSource {
    pub html_file: String,
    pub media_folder: String,
}

/// Run configuration, loaded from YAML.
///
/// ```yaml
/// content_dir: your_instagram_activity/content
/// media_dir: media
/// html_files:
///   posts_1.html: posts
///   stories.html: stories
/// log_level: INFO
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory of the export pages, relative to the base directory.
    pub content_dir: PathBuf,
    /// Directory of the media folders, relative to the base directory.
    pub media_dir: PathBuf,
    /// Pages to process, in file order.
    #[serde(deserialize_with = "ordered_sources")]
    pub html_files: Vec<DocumentSource>,
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(text)?;
        if let Some(level) = &config.log_level {
            parse_log_level(level)?;
        }
        Ok(config)
    }

    /// Level from the file, INFO when unset.
    pub fn level_filter(&self) -> anyhow::Result<LevelFilter> {
        self.log_level
            .as_deref()
            .map_or(Ok(LevelFilter::Info), parse_log_level)
    }
}

/// Accepts DEBUG, INFO, WARNING, ERROR and CRITICAL in any case.
pub fn parse_log_level(name: &str) -> anyhow::Result<LevelFilter> {
    Ok(match name.trim().to_ascii_uppercase().as_str() {
        "TRACE" => LevelFilter::Trace,
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARNING" | "WARN" => LevelFilter::Warn,
        "ERROR" | "CRITICAL" => LevelFilter::Error,
        _ => bail!("Unknown log level: {}", name),
    })
}

fn ordered_sources<'de, D>(deserializer: D) -> Result<Vec<DocumentSource>, D::Error>
where
    D: Deserializer<'de>,
{
    let mapping = serde_yaml::Mapping::deserialize(deserializer)?;
    mapping
        .into_iter()
        .map(|(html, media)| match (html.as_str(), media.as_str()) {
            (Some(html_file), Some(media_folder)) => Ok(DocumentSource {
                html_file: html_file.to_string(),
                media_folder: media_folder.to_string(),
            }),
            _ => Err(D::Error::custom(
                "html_files entries must map an HTML file name to a media folder name",
            )),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
content_dir: your_instagram_activity/content
media_dir: media
html_files:
  stories.html: stories
  posts_1.html: posts
  reels.html: reels
log_level: warning
"#;

    #[test]
    fn test_load_keeps_file_order() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.content_dir, PathBuf::from("your_instagram_activity/content"));
        assert_eq!(config.media_dir, PathBuf::from("media"));
        let names: Vec<_> = config.html_files.iter().map(|s| s.html_file.as_str()).collect();
        assert_eq!(names, vec!["stories.html", "posts_1.html", "reels.html"]);
        assert_eq!(config.html_files[1].media_folder, "posts");
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Warn);
    }

    #[test]
    fn test_log_level_defaults_to_info() {
        let config = Config::from_yaml("content_dir: c\nmedia_dir: m\nhtml_files: {}\n").unwrap();
        assert!(config.html_files.is_empty());
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Info);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Config::from_yaml("media_dir: m\nhtml_files: {}\n").is_err());
        assert!(Config::from_yaml("content_dir: c\nmedia_dir: m\nhtml_files: [a, b]\n").is_err());
        assert!(Config::from_yaml("content_dir: c\nmedia_dir: m\nhtml_files:\n  a.html: [x]\n").is_err());
        assert!(Config::from_yaml("content_dir: c\nmedia_dir: m\nhtml_files: {}\nlog_level: LOUD\n").is_err());
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_log_level("critical").unwrap(), LevelFilter::Error);
        assert!(parse_log_level("verbose").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = Config::load(&dir.path().join(DEFAULT_CONFIG_FILE)).unwrap_err();
        assert!(err.to_string().contains("Cannot read config file"));
    }
}
