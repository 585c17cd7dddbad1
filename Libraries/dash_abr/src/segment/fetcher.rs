use crate::error::{DashError, DashResult};
use crate::segment::ByteRange;
use bytes::Bytes;
use reqwest::blocking::Client;
use reqwest::header::RANGE;
use reqwest::StatusCode;
use std::time::Instant;
use tracing::{debug, error};

pub struct BandwidthEstimator {
    ewma: f64,
    initialized: bool,
    alpha: f64,
    fallback: f64,
}

impl BandwidthEstimator {
    pub fn new(alpha: f64, fallback: f64) -> Self {
        Self { ewma: 0.0, initialized: false, alpha, fallback }
    }

    /**
     * Records the number of bytes downloaded and the time taken in seconds.
     * Samples without a measurable duration are ignored.
     */
    pub fn record(&mut self, bytes: u64, duration_s: f64) {
        if duration_s <= 0.0 || !duration_s.is_finite() {
            debug!("Ignoring bandwidth sample of {} bytes over {}s", bytes, duration_s);
            return;
        }
        let sample = (bytes as f64 * 8.0) / duration_s;
        self.ewma = if self.initialized {
            self.alpha * sample + (1.0 - self.alpha) * self.ewma
        } else {
            self.initialized = true;
            sample   // first sample
        };
    }

    /**
     * Returns the estimated bandwidth in bits per second.
     * If no samples are recorded, returns the configured fallback.
     */
    pub fn estimate(&self) -> f64 {
        if self.initialized { self.ewma } else { self.fallback }
    }
}

/// Plain HTTP transport for manifests, initializations and segments. No retry policy.
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// Downloads `url` (restricted to `range` unless it is the whole resource) and returns
    /// the body together with the download duration in seconds.
    pub fn fetch(&self, url: &str, range: ByteRange) -> DashResult<(Bytes, f64)> {
        let start = Instant::now();
        let mut request = self.client.get(url);
        if let Some(value) = range.header_value() {
            request = request.header(RANGE, value);
        }

        let response = request.send().map_err(|e| {
            error!("Fetch failed for {}: {}", url, e);
            e
        })?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::NOT_FOUND {
                debug!("404 Not Found: {}", url);
            } else {
                error!("Received {} from {}", status, url);
            }
            return Err(DashError::HttpStatus { status, url: url.to_string() });
        }

        let bytes = response.bytes()?;
        let duration_secs = start.elapsed().as_secs_f64();
        Ok((bytes, duration_secs))
    }

    pub fn download(&self, url: &str) -> DashResult<Bytes> {
        self.fetch(url, ByteRange::WHOLE).map(|(bytes, _)| bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimator_uses_fallback_until_first_sample() {
        let mut estimator = BandwidthEstimator::new(0.25, 50_000_000.0);
        assert_eq!(estimator.estimate(), 50_000_000.0);
        estimator.record(125_000, 1.0);
        assert_eq!(estimator.estimate(), 1_000_000.0);
    }

    #[test]
    fn estimator_smooths_following_samples() {
        let mut estimator = BandwidthEstimator::new(0.5, 0.0);
        estimator.record(125_000, 1.0); // 1 Mbit/s
        estimator.record(375_000, 1.0); // 3 Mbit/s
        assert_eq!(estimator.estimate(), 2_000_000.0);
    }

    #[test]
    fn estimator_ignores_zero_duration() {
        let mut estimator = BandwidthEstimator::new(0.25, 42.0);
        estimator.record(1_000, 0.0);
        assert_eq!(estimator.estimate(), 42.0);
    }
}
