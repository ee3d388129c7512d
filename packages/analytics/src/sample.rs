//! Seeded down-sampling for the accident map.

use accident_dash_accident_models::AccidentRecord;
use accident_dash_analytics_models::{MapPoint, MapSample};
use rand::SeedableRng as _;
use rand::rngs::StdRng;

/// Returns at most `cap` records, chosen uniformly without replacement.
///
/// Inputs no larger than `cap` come back unchanged. Otherwise the choice is
/// driven by a [`StdRng`] seeded with `seed`, so the same input and seed
/// always give the same sample. Sampled records keep their relative order.
#[must_use]
pub fn sample_records<'a>(
    records: &[&'a AccidentRecord],
    cap: usize,
    seed: u64,
) -> Vec<&'a AccidentRecord> {
    if records.len() <= cap {
        return records.to_vec();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = rand::seq::index::sample(&mut rng, records.len(), cap).into_vec();
    indices.sort_unstable();
    indices.into_iter().map(|i| records[i]).collect()
}

/// Builds the map layer: located records, sampled down to `cap`.
#[must_use]
pub fn sample_points(records: &[&AccidentRecord], cap: usize, seed: u64) -> MapSample {
    let located: Vec<&AccidentRecord> = records
        .iter()
        .copied()
        .filter(|r| r.location().is_some())
        .collect();

    let chosen = sample_records(&located, cap, seed);
    if chosen.len() < located.len() {
        log::debug!(
            "Sampled {} of {} located accidents for the map",
            chosen.len(),
            located.len()
        );
    }

    let points = chosen
        .iter()
        .filter_map(|r| {
            let (latitude, longitude) = r.location()?;
            Some(MapPoint {
                latitude,
                longitude,
                severity: r.severity,
            })
        })
        .collect::<Vec<_>>();

    MapSample {
        sampled: points.len() < located.len(),
        total: located.len() as u64,
        points,
    }
}
