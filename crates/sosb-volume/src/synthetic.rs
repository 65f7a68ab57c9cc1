//! Deterministic synthetic volumes for demos and tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sosb_core::{AnalysisRequest, RawVolumeObservation};

use crate::error::SourceError;
use crate::source::VolumeSource;

const BASE_VOLUME: f64 = 1_000.0;
const VOLUME_STEP: f64 = 200.0;

/// Generates one observation per qualifying keyword per bucket.
///
/// The base volume grows linearly with the bucket ordinal and every keyword
/// gets an independent ±30 % jitter drawn from a seeded RNG, so the same
/// seed, brands and settings always yield the same observations.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticSource {
    seed: u64,
}

impl SyntheticSource {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    #[must_use]
    pub fn generate(&self, request: &AnalysisRequest) -> Vec<RawVolumeObservation> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut observations = Vec::new();

        for (ordinal, period) in request.periods().iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let base = BASE_VOLUME + VOLUME_STEP * ordinal as f64;
            let label = period.label();
            for brand in request.qualifying_brands() {
                for _keyword in brand.qualifying_keywords() {
                    let factor: f64 = rng.random_range(0.7..1.3);
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let volume = (base * factor).round() as u64;
                    observations.push(RawVolumeObservation::new(
                        brand.display_name(),
                        label.clone(),
                        volume,
                    ));
                }
            }
        }

        tracing::debug!(
            seed = self.seed,
            observations = observations.len(),
            "generated synthetic volumes"
        );
        observations
    }
}

impl VolumeSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn fetch(
        &self,
        request: &AnalysisRequest,
    ) -> Result<Vec<RawVolumeObservation>, SourceError> {
        Ok(self.generate(request))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sosb_core::{Brand, Granularity, Network, SearchSettings};

    use super::*;

    fn request(granularity: Granularity) -> AnalysisRequest {
        let brands = vec![
            Brand::new("Acme", true).with_keywords(["acme", "acme shop"]),
            Brand::new("Globex", false).with_keywords(["globex", " "]),
            Brand::new("Initech", false),
        ];
        let settings = SearchSettings {
            location: "United States".to_string(),
            language: "English".to_string(),
            network: Network::Google,
            date_from: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            granularity,
        };
        AnalysisRequest::new(&brands, settings).unwrap()
    }

    #[test]
    fn one_observation_per_qualifying_keyword_per_bucket() {
        let observations = SyntheticSource::new(7).generate(&request(Granularity::Yearly));
        // 2 buckets x (2 Acme keywords + 1 Globex keyword)
        assert_eq!(observations.len(), 6);
        assert!(observations.iter().all(|o| o.brand_name != "Initech"));
        assert_eq!(observations[0].period, "2022");
        assert_eq!(observations[5].period, "2023");
    }

    #[test]
    fn volumes_stay_within_jitter_band() {
        let observations = SyntheticSource::new(1).generate(&request(Granularity::Quarterly));
        let labels: Vec<String> = request(Granularity::Quarterly)
            .periods()
            .iter()
            .map(sosb_core::Period::label)
            .collect();
        for observation in &observations {
            let ordinal = labels.iter().position(|l| *l == observation.period).unwrap();
            #[allow(clippy::cast_precision_loss)]
            let base = 1_000.0 + 200.0 * ordinal as f64;
            #[allow(clippy::cast_precision_loss)]
            let volume = observation.volume as f64;
            assert!(volume >= (base * 0.7).floor() && volume <= (base * 1.3).ceil());
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        let req = request(Granularity::Monthly);
        assert_eq!(
            SyntheticSource::new(42).generate(&req),
            SyntheticSource::new(42).generate(&req)
        );
        assert_ne!(
            SyntheticSource::new(42).generate(&req),
            SyntheticSource::new(43).generate(&req)
        );
    }

    #[tokio::test]
    async fn fetch_matches_generate() {
        let req = request(Granularity::Yearly);
        let source = SyntheticSource::new(5);
        assert_eq!(source.fetch(&req).await.unwrap(), source.generate(&req));
    }
}
