//! Scatter-gather over a fixed set of providers.
//!
//! Every provider is called concurrently; readings and failures come back on
//! separate channels. The first failure aborts the aggregation and cancels the
//! calls still in flight, otherwise the rounded mean of all readings is returned.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{Fahrenheit, WeatherError, WeatherProvider};

/// A provider that averages an ordered set of other providers.
#[derive(Debug, Clone)]
pub struct MultiProvider {
    providers: Arc<[Arc<dyn WeatherProvider>]>,
}

impl MultiProvider {
    pub fn new(providers: Vec<Arc<dyn WeatherProvider>>) -> Self {
        Self { providers: providers.into() }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl WeatherProvider for MultiProvider {
    async fn temperature(&self, city: &str) -> Result<Fahrenheit, WeatherError> {
        let n = self.providers.len();
        if n == 0 {
            return Err(WeatherError::NoProviders);
        }

        // Each task sends exactly once, so capacity `n` means no send ever waits.
        let (temps_tx, mut temps_rx) = mpsc::channel::<Fahrenheit>(n);
        let (errs_tx, mut errs_rx) = mpsc::channel::<WeatherError>(n);

        // Cancelled whenever this future completes or is dropped.
        let cancel = CancellationToken::new();
        let _guard = cancel.clone().drop_guard();

        for provider in self.providers.iter() {
            let provider = Arc::clone(provider);
            let city = city.to_owned();
            let cancel = cancel.clone();
            let temps_tx = temps_tx.clone();
            let errs_tx = errs_tx.clone();

            tokio::spawn(async move {
                let outcome = tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!(city = %city, provider = ?provider, "provider call cancelled");
                        return;
                    }
                    outcome = provider.temperature(&city) => outcome,
                };

                // The receiver is gone once the aggregation has returned.
                match outcome {
                    Ok(temp) => {
                        let _ = temps_tx.send(temp).await;
                    }
                    Err(err) => {
                        let _ = errs_tx.send(err).await;
                    }
                }
            });
        }
        drop(temps_tx);
        drop(errs_tx);

        let mut sum = 0.0;
        for _ in 0..n {
            tokio::select! {
                Some(temp) = temps_rx.recv() => sum += temp.value(),
                Some(err) = errs_rx.recv() => {
                    tracing::warn!(city, error = %err, "aggregation failed");
                    return Err(err);
                }
                else => return Err(WeatherError::Incomplete),
            }
        }

        Ok(Fahrenheit(sum / n as f64).round())
    }
}
