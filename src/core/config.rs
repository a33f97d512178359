use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;

pub(crate) const DEFAULT_UPSTREAM_URL: &str = "http://20.244.56.144/test";

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct Args {
    pub(crate) log_level: String,
    pub(crate) port: u16,
    pub(crate) upstream_url: String,
    pub(crate) user_agent: String,
    pub(crate) fan_out_limit: usize,
    pub(crate) company_name: String,
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
    pub(crate) owner_name: String,
    pub(crate) owner_email: String,
    pub(crate) roll_no: String,
}

impl Args {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .set_default("log_level", "info")?
            .set_default("port", 3005)?
            .set_default("upstream_url", DEFAULT_UPSTREAM_URL)?
            .set_default("user_agent", "aggregator")?
            .set_default("fan_out_limit", 16)?
            .add_source(config::Environment::with_prefix("AGGREGATOR"))
            .build()?;

        let args = config.try_deserialize::<Args>()?;

        args.validate()?;

        Ok(args)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.fan_out_limit == 0 {
            return Err(ConfigError::Invalid(
                "fan_out_limit must be at least 1".to_owned(),
            ));
        }

        if !self.upstream_url.starts_with("http://") && !self.upstream_url.starts_with("https://")
        {
            return Err(ConfigError::Invalid(format!(
                "upstream_url must be an http(s) url, got {}",
                self.upstream_url
            )));
        }

        Ok(())
    }

    pub(crate) fn base_url(&self) -> String {
        self.upstream_url.trim_end_matches('/').to_owned()
    }

    pub(crate) fn credentials(&self) -> Credentials {
        Credentials {
            company_name: self.company_name.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            owner_name: self.owner_name.clone(),
            owner_email: self.owner_email.clone(),
            roll_no: self.roll_no.clone(),
        }
    }
}

/// Client identity sent to the upstream `/auth` endpoint.
#[derive(Clone, Serialize)]
pub(crate) struct Credentials {
    #[serde(rename = "companyName")]
    pub(crate) company_name: String,
    #[serde(rename = "clientID")]
    pub(crate) client_id: String,
    #[serde(rename = "clientSecret")]
    pub(crate) client_secret: String,
    #[serde(rename = "ownerName")]
    pub(crate) owner_name: String,
    #[serde(rename = "ownerEmail")]
    pub(crate) owner_email: String,
    #[serde(rename = "rollNo")]
    pub(crate) roll_no: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("company_name", &self.company_name)
            .field("client_id", &self.client_id)
            .field("owner_name", &self.owner_name)
            .field("owner_email", &self.owner_email)
            .field("roll_no", &self.roll_no)
            .finish()
    }
}
