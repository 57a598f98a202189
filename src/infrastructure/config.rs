use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_FEED_URL: &str = "https://data.winnipeg.ca/resource/vrzk-mj7v.json";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    fn with_port(port: u16) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self::with_port(5000)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ApiConfig {
    pub server: ServerSettings,
    pub tagger: TaggerSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TaggerSettings {
    /// JSON model to load; trained from the bundled corpus and written here when missing
    pub model_path: Option<PathBuf>,
    pub training_iterations: usize,
    pub min_tagdict_frequency: u32,
    pub tagdict_ambiguity: f64,
    pub keep_punctuation: bool,
}

impl Default for TaggerSettings {
    fn default() -> Self {
        Self {
            model_path: None,
            training_iterations: 5,
            min_tagdict_frequency: 2,
            tagdict_ambiguity: 0.97,
            keep_punctuation: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerSettings,
    pub feed: FeedSettings,
    pub table: TableSettings,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::with_port(8050),
            feed: FeedSettings::default(),
            table: TableSettings::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeedSettings {
    pub url: String,
    /// Row cap passed to the open-data API as `$limit`
    pub limit: Option<u32>,
    /// Read the feed from a local JSON file instead of `url`
    pub path: Option<PathBuf>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
            limit: None,
            path: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TableSettings {
    pub page_size: usize,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

pub fn load_api_config() -> anyhow::Result<ApiConfig> {
    load_settings("config/api", "API")
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    load_settings("config/dashboard", "DASHBOARD")
}

/// Optional config file, overridden by `<PREFIX>__SECTION__KEY` variables
fn load_settings<T: DeserializeOwned>(file: &str, env_prefix: &str) -> anyhow::Result<T> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(file).required(false))
        .add_source(
            config::Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace `${key}` template variables in a string
pub fn fill_template(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
