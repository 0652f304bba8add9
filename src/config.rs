use crate::cep_client::CepEndpoints;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub cep_lookup_timeout_secs: u64,
    pub cep_max_attempts: usize,
    pub viacep_base_url: String,
    pub apicep_base_url: String,
    pub output_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            cep_lookup_timeout_secs: 5,
            cep_max_attempts: 50,
            viacep_base_url: "https://viacep.com.br".to_string(),
            apicep_base_url: "https://ws.apicep.com".to_string(),
            output_dir: "dados_gerados".to_string(),
        }
    }
}

fn positive<T>(name: &str, raw: String) -> anyhow::Result<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let value: T = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{} must be a valid number", name))?;
    if value <= T::default() {
        anyhow::bail!("{} must be greater than zero", name);
    }
    Ok(value)
}

fn base_url(name: &str, url: String) -> anyhow::Result<String> {
    let url = url.trim().trim_end_matches('/').to_string();
    if url.is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    url::Url::parse(&url).map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    Ok(url)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key source; unset keys take the defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            port: lookup("PORT")
                .map(|p| {
                    p.trim().parse().map_err(|_| {
                        anyhow::anyhow!("PORT must be a valid number between 1-65535")
                    })
                })
                .transpose()?
                .unwrap_or(defaults.port),
            cep_lookup_timeout_secs: lookup("CEP_LOOKUP_TIMEOUT_SECS")
                .map(|v| positive("CEP_LOOKUP_TIMEOUT_SECS", v))
                .transpose()?
                .unwrap_or(defaults.cep_lookup_timeout_secs),
            cep_max_attempts: lookup("CEP_MAX_ATTEMPTS")
                .map(|v| positive("CEP_MAX_ATTEMPTS", v))
                .transpose()?
                .unwrap_or(defaults.cep_max_attempts),
            viacep_base_url: lookup("VIACEP_BASE_URL")
                .map(|v| base_url("VIACEP_BASE_URL", v))
                .transpose()?
                .unwrap_or(defaults.viacep_base_url),
            apicep_base_url: lookup("APICEP_BASE_URL")
                .map(|v| base_url("APICEP_BASE_URL", v))
                .transpose()?
                .unwrap_or(defaults.apicep_base_url),
            output_dir: lookup("OUTPUT_DIR")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.output_dir),
        };

        tracing::debug!("ViaCEP Base URL: {}", config.viacep_base_url);
        tracing::debug!("ApiCEP Base URL: {}", config.apicep_base_url);
        tracing::debug!(
            "CEP lookup: {} attempts, {}s timeout",
            config.cep_max_attempts,
            config.cep_lookup_timeout_secs
        );
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    pub fn cep_lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.cep_lookup_timeout_secs)
    }

    pub fn cep_endpoints(&self) -> CepEndpoints {
        CepEndpoints {
            viacep_base_url: self.viacep_base_url.clone(),
            apicep_base_url: self.apicep_base_url.clone(),
        }
    }
}
