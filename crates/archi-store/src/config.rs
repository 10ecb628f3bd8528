use crate::error::StoreError;

/// Connection credentials for the hosted store, consumed once at startup.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub api_key: String,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, StoreError> {
        Ok(Self {
            base_url: require("ARCHI_STORE_URL")?,
            project_id: require("ARCHI_PROJECT_ID")?,
            api_key: require("ARCHI_API_KEY")?,
        })
    }
}

fn require(name: &str) -> Result<String, StoreError> {
    std::env::var(name).map_err(|_| StoreError::Config(name.to_string()))
}
