//! CEP (postal code) lookup against public providers.
//!
//! [`AddressLookup`] is the capability the generator depends on; the HTTP
//! client here is its production implementation and can be swapped for a
//! stub in tests.

use crate::circuit_breaker::{create_lookup_circuit_breaker, LookupCircuitBreaker};
use crate::errors::{AppError, ResultExt};
use crate::models::{ApiCepResponse, ResolvedAddress, ViaCepResponse};
use async_trait::async_trait;
use failsafe::futures::CircuitBreaker;
use moka::future::Cache;
use std::fmt;
use std::time::Duration;

/// Upstream CEP service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CepProvider {
    ViaCep,
    ApiCep,
}

impl CepProvider {
    /// Providers in the order they are tried for each code.
    pub const ALL: [CepProvider; 2] = [CepProvider::ViaCep, CepProvider::ApiCep];
}

impl fmt::Display for CepProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CepProvider::ViaCep => write!(f, "viacep"),
            CepProvider::ApiCep => write!(f, "apicep"),
        }
    }
}

/// Why a lookup produced no answer at all (as opposed to "not found").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Connection failure or timeout.
    Transport(String),
    /// Non-success HTTP status other than "not found".
    Status(u16),
    /// Body was not the expected JSON.
    Decode(String),
    /// The provider's circuit breaker is open.
    CircuitOpen(CepProvider),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::Transport(msg) => write!(f, "transport error: {}", msg),
            LookupError::Status(code) => write!(f, "unexpected status {}", code),
            LookupError::Decode(msg) => write!(f, "invalid response: {}", msg),
            LookupError::CircuitOpen(provider) => {
                write!(f, "circuit open for provider {}", provider)
            }
        }
    }
}

impl std::error::Error for LookupError {}

impl LookupError {
    /// Failures that say something about the provider's health.
    fn counts_against_provider(&self) -> bool {
        matches!(self, LookupError::Transport(_) | LookupError::Status(500..=599))
    }
}

/// Maps a postal code to a structured address.
///
/// `Ok(None)` means the provider answered and does not know the code.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn resolve(
        &self,
        cep: &str,
        provider: CepProvider,
        timeout: Duration,
    ) -> Result<Option<ResolvedAddress>, LookupError>;
}

/// Base URLs of the CEP providers.
#[derive(Debug, Clone)]
pub struct CepEndpoints {
    pub viacep_base_url: String,
    pub apicep_base_url: String,
}

/// Reqwest-backed [`AddressLookup`] for ViaCEP and ApiCEP.
///
/// Definitive answers (found / not found) are cached per `provider:cep`, and
/// each provider sits behind its own circuit breaker.
#[derive(Clone)]
pub struct HttpCepLookup {
    client: reqwest::Client,
    endpoints: CepEndpoints,
    cache: Cache<String, Option<ResolvedAddress>>,
    viacep_breaker: LookupCircuitBreaker,
    apicep_breaker: LookupCircuitBreaker,
}

impl HttpCepLookup {
    /// Creates a new `HttpCepLookup`.
    ///
    /// # Arguments
    ///
    /// * `endpoints` - Provider base URLs, without trailing slash.
    pub fn new(endpoints: CepEndpoints) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("gerador-dados-br/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create CEP client")?;

        // 10 minute TTL, 10k entries: most random codes do not exist
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(600))
            .max_capacity(10_000)
            .build();

        Ok(Self {
            client,
            endpoints,
            cache,
            viacep_breaker: create_lookup_circuit_breaker(),
            apicep_breaker: create_lookup_circuit_breaker(),
        })
    }

    fn breaker(&self, provider: CepProvider) -> &LookupCircuitBreaker {
        match provider {
            CepProvider::ViaCep => &self.viacep_breaker,
            CepProvider::ApiCep => &self.apicep_breaker,
        }
    }

    async fn fetch(
        &self,
        cep: &str,
        provider: CepProvider,
        timeout: Duration,
    ) -> Result<Option<ResolvedAddress>, LookupError> {
        match provider {
            CepProvider::ViaCep => self.fetch_viacep(cep, timeout).await,
            CepProvider::ApiCep => self.fetch_apicep(cep, timeout).await,
        }
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<Option<String>, LookupError> {
        tracing::debug!("CEP request: {}", url);

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        // Both providers use 400/404 for malformed or unknown codes
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::BAD_REQUEST {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        Ok(Some(body))
    }

    async fn fetch_viacep(
        &self,
        cep: &str,
        timeout: Duration,
    ) -> Result<Option<ResolvedAddress>, LookupError> {
        let url = format!("{}/ws/{}/json/", self.endpoints.viacep_base_url, cep);
        let Some(body) = self.get(&url, timeout).await? else {
            return Ok(None);
        };
        let parsed: ViaCepResponse =
            serde_json::from_str(&body).map_err(|e| LookupError::Decode(e.to_string()))?;
        Ok(from_viacep(cep, parsed))
    }

    async fn fetch_apicep(
        &self,
        cep: &str,
        timeout: Duration,
    ) -> Result<Option<ResolvedAddress>, LookupError> {
        let url = format!("{}/cep/{}.json", self.endpoints.apicep_base_url, cep);
        let Some(body) = self.get(&url, timeout).await? else {
            return Ok(None);
        };
        let parsed: ApiCepResponse =
            serde_json::from_str(&body).map_err(|e| LookupError::Decode(e.to_string()))?;
        Ok(from_apicep(cep, parsed))
    }
}

#[async_trait]
impl AddressLookup for HttpCepLookup {
    async fn resolve(
        &self,
        cep: &str,
        provider: CepProvider,
        timeout: Duration,
    ) -> Result<Option<ResolvedAddress>, LookupError> {
        let cache_key = format!("{}:{}", provider, cep);
        if let Some(cached) = self.cache.get(&cache_key).await {
            tracing::debug!("CEP cache HIT for {}", cache_key);
            return Ok(cached);
        }

        let result = self
            .breaker(provider)
            .call_with(LookupError::counts_against_provider, self.fetch(cep, provider, timeout))
            .await;

        match result {
            Ok(answer) => {
                self.cache.insert(cache_key, answer.clone()).await;
                Ok(answer)
            }
            Err(failsafe::Error::Inner(e)) => Err(e),
            Err(failsafe::Error::Rejected) => Err(LookupError::CircuitOpen(provider)),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn from_viacep(cep: &str, body: ViaCepResponse) -> Option<ResolvedAddress> {
    let flagged = match &body.erro {
        Some(serde_json::Value::Bool(b)) => *b,
        Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    };
    if flagged || body.cep.is_none() {
        return None;
    }

    Some(ResolvedAddress {
        cep: cep.to_string(),
        street: non_empty(body.logradouro),
        neighborhood: non_empty(body.bairro),
        city: non_empty(body.localidade),
        state: non_empty(body.uf),
    })
}

fn from_apicep(cep: &str, body: ApiCepResponse) -> Option<ResolvedAddress> {
    if body.status.is_some_and(|s| s != 200) || body.ok == Some(false) || body.code.is_none() {
        return None;
    }

    Some(ResolvedAddress {
        cep: cep.to_string(),
        street: non_empty(body.address),
        neighborhood: non_empty(body.district),
        city: non_empty(body.city),
        state: non_empty(body.state),
    })
}
