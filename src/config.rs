/// API origin used when neither `CRM_API_URL` nor `VITE_API_URL` is set.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001/api";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL every endpoint path is appended to (e.g. `http://localhost:5001/api`).
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let raw = std::env::var("CRM_API_URL")
            .or_else(|_| std::env::var("VITE_API_URL"))
            .ok()
            .filter(|s| !s.trim().is_empty());

        let config = Self {
            api_base_url: Self::parse_api_url(raw.as_deref())?,
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("API Base URL: {}", config.api_base_url);

        Ok(config)
    }

    /// Checks the scheme and strips the trailing slash; `None` yields the default.
    pub fn parse_api_url(raw: Option<&str>) -> anyhow::Result<String> {
        let url = match raw {
            Some(url) => url.trim(),
            None => return Ok(DEFAULT_API_BASE_URL.to_string()),
        };
        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("CRM_API_URL must start with http:// or https://");
        }
        url::Url::parse(url).map_err(|e| anyhow::anyhow!("CRM_API_URL is not a valid URL: {}", e))?;
        Ok(url.trim_end_matches('/').to_string())
    }
}
