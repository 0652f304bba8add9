use crate::cep_client::{AddressLookup, CepProvider};
use crate::generator;
use crate::models::ResolvedAddress;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

/// Default number of random codes tried before giving up.
pub const MAX_CEP_ATTEMPTS: usize = 50;

/// Default per-request timeout for provider calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Finds a real address for a randomly generated CEP.
///
/// Each attempt draws a fresh code and asks every provider in order before
/// moving on. Provider errors and "not found" answers are both treated as a
/// miss. Exhausting all attempts is not an error: the caller gets `None`.
#[derive(Clone)]
pub struct AddressResolver {
    lookup: Arc<dyn AddressLookup>,
    providers: Vec<CepProvider>,
    max_attempts: usize,
    timeout: Duration,
}

impl AddressResolver {
    pub fn new(lookup: Arc<dyn AddressLookup>) -> Self {
        Self {
            lookup,
            providers: CepProvider::ALL.to_vec(),
            max_attempts: MAX_CEP_ATTEMPTS,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_providers(mut self, providers: Vec<CepProvider>) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Tries up to `max_attempts` random codes against every provider.
    pub async fn resolve_random<R>(&self, rng: &mut R) -> Option<ResolvedAddress>
    where
        R: Rng + Send + ?Sized,
    {
        for attempt in 1..=self.max_attempts {
            let cep = generator::cep(rng);

            for &provider in &self.providers {
                match self.lookup.resolve(&cep, provider, self.timeout).await {
                    Ok(Some(address)) => {
                        tracing::debug!(
                            "Resolved CEP {} via {} on attempt {}",
                            cep,
                            provider,
                            attempt
                        );
                        return Some(address);
                    }
                    Ok(None) => {
                        tracing::trace!("CEP {} not found via {}", cep, provider);
                    }
                    Err(e) => {
                        tracing::debug!("CEP {} lookup via {} failed: {}", cep, provider, e);
                    }
                }
            }
        }

        tracing::warn!(
            "Could not resolve a valid CEP after {} attempts",
            self.max_attempts
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cep_client::LookupError;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    /// Records every call; answers with an address from the `hit_on`-th call on.
    struct RecordingLookup {
        calls: Mutex<Vec<(String, CepProvider)>>,
        hit_on: Option<usize>,
        fail: bool,
    }

    impl RecordingLookup {
        fn new(hit_on: Option<usize>, fail: bool) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                hit_on,
                fail,
            }
        }

        fn calls(&self) -> Vec<(String, CepProvider)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AddressLookup for RecordingLookup {
        async fn resolve(
            &self,
            cep: &str,
            provider: CepProvider,
            _timeout: Duration,
        ) -> Result<Option<ResolvedAddress>, LookupError> {
            let count = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((cep.to_string(), provider));
                calls.len()
            };

            if self.hit_on.is_some_and(|n| count >= n) {
                return Ok(Some(ResolvedAddress {
                    cep: cep.to_string(),
                    street: Some("Rua Teste".into()),
                    neighborhood: Some("Centro".into()),
                    city: Some("Curitiba".into()),
                    state: Some("PR".into()),
                }));
            }
            if self.fail {
                Err(LookupError::Transport("connection refused".into()))
            } else {
                Ok(None)
            }
        }
    }

    #[tokio::test]
    async fn test_exhaustion_calls_every_provider_per_attempt() {
        let lookup = Arc::new(RecordingLookup::new(None, false));
        let resolver = AddressResolver::new(lookup.clone()).with_max_attempts(7);
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(resolver.resolve_random(&mut rng).await, None);

        let calls = lookup.calls();
        assert_eq!(calls.len(), 7 * CepProvider::ALL.len());
        for pair in calls.chunks(2) {
            // Same code against ViaCEP first, then ApiCEP
            assert_eq!(pair[0].0, pair[1].0);
            assert_eq!(pair[0].1, CepProvider::ViaCep);
            assert_eq!(pair[1].1, CepProvider::ApiCep);
        }
    }

    #[tokio::test]
    async fn test_errors_are_treated_as_misses() {
        let lookup = Arc::new(RecordingLookup::new(None, true));
        let resolver = AddressResolver::new(lookup.clone()).with_max_attempts(3);
        let mut rng = StdRng::seed_from_u64(2);

        assert_eq!(resolver.resolve_random(&mut rng).await, None);
        assert_eq!(lookup.calls().len(), 6);
    }

    #[tokio::test]
    async fn test_stops_at_first_hit() {
        // Third call is the first provider of the second code
        let lookup = Arc::new(RecordingLookup::new(Some(3), false));
        let resolver = AddressResolver::new(lookup.clone());
        let mut rng = StdRng::seed_from_u64(3);

        let address = resolver.resolve_random(&mut rng).await.unwrap();
        let calls = lookup.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(address.cep, calls[2].0);
        assert_ne!(calls[0].0, calls[2].0);
        assert_eq!(calls[2].1, CepProvider::ViaCep);
    }

    #[tokio::test]
    async fn test_single_provider() {
        let lookup = Arc::new(RecordingLookup::new(None, false));
        let resolver = AddressResolver::new(lookup.clone())
            .with_providers(vec![CepProvider::ApiCep])
            .with_max_attempts(4);
        let mut rng = StdRng::seed_from_u64(4);

        resolver.resolve_random(&mut rng).await;
        let calls = lookup.calls();
        assert_eq!(calls.len(), 4);
        assert!(calls.iter().all(|(_, p)| *p == CepProvider::ApiCep));
    }
}
