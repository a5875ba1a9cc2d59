use std::sync::Arc;

use crate::api_client::ApiService;
use crate::auth::AuthService;
use crate::config::Config;
use crate::errors::ApiError;

/// Services shared by the whole process, built once at startup and handed
/// to every consumer.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub api: Arc<ApiService>,
    pub auth: Arc<AuthService>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let api = Arc::new(ApiService::from_config(&config)?);
        let auth = Arc::new(AuthService::new(Arc::clone(&api)));
        Ok(Self { config, api, auth })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_shares_one_api_client() {
        let ctx = AppContext::new(Config::default()).unwrap();
        assert_eq!(ctx.api.base_url(), "http://localhost:5001/api");
        assert!(!ctx.auth.is_authenticated());
    }

    #[test]
    fn test_context_rejects_bad_base_url() {
        let config = Config {
            api_base_url: "localhost".to_string(),
        };
        assert!(AppContext::new(config).is_err());
    }
}
