//! Fan-out/fan-in aggregation of platform statistics.

use folio_core::{AchievementStats, FieldMap, PlatformDescriptor, PlatformResult, StatValue};
use futures::future::join_all;

use crate::client::StatsClient;
use crate::path::extract;

/// Runs aggregation sweeps over a set of platform descriptors.
///
/// Holds no state between sweeps: every call re-issues every request and
/// returns a fresh mapping. Keeping the last result is up to the caller.
#[derive(Debug, Clone)]
pub struct Aggregator {
    client: StatsClient,
}

impl Aggregator {
    #[must_use]
    pub fn new(client: StatsClient) -> Self {
        Self { client }
    }

    /// Resolve every descriptor concurrently and return the complete mapping.
    ///
    /// Resolves only after each platform has settled. A failing or slow
    /// platform affects neither the results nor the progress of the others;
    /// the sweep as a whole waits for the slowest request (bounded by the
    /// client's timeout).
    pub async fn aggregate<'a, I>(&self, descriptors: I) -> AchievementStats
    where
        I: IntoIterator<Item = &'a PlatformDescriptor>,
    {
        let descriptors: Vec<&PlatformDescriptor> = descriptors.into_iter().collect();
        tracing::info!(platforms = descriptors.len(), "starting achievements sweep");

        let client = &self.client;
        let settled = join_all(descriptors.into_iter().map(|descriptor| async move {
            let result = resolve_platform(client, descriptor).await;
            (descriptor.name.clone(), result)
        }))
        .await;

        let stats: AchievementStats = settled.into_iter().collect();
        tracing::info!(
            platforms = stats.len(),
            failed = stats.error_count(),
            "achievements sweep complete"
        );
        stats
    }
}

/// Produce one platform's result: fallback seed, optional fetch, overlay.
pub async fn resolve_platform(
    client: &StatsClient,
    descriptor: &PlatformDescriptor,
) -> PlatformResult {
    let mut result = PlatformResult::seeded(&descriptor.fallback);

    let Some(endpoint) = descriptor.endpoint() else {
        tracing::debug!(
            platform = %descriptor.name,
            "no endpoint configured; using fallback values"
        );
        return result;
    };

    match client.fetch_json(endpoint).await {
        Ok(body) => {
            let overridden = overlay_extracted(&mut result, &descriptor.field_map, &body);
            result.error = None;
            tracing::debug!(
                platform = %descriptor.name,
                overridden,
                "statistics fetched"
            );
        }
        Err(e) => {
            tracing::warn!(
                platform = %descriptor.name,
                endpoint,
                error = %e,
                "statistics fetch failed; keeping fallback values"
            );
            result.error = Some(e.result_message());
        }
    }

    result
}

/// Overwrite fields of `result` with non-null values extracted from `body`.
///
/// Fields without a path, or whose path resolves to nothing, keep their
/// current value. Returns the number of fields overwritten.
pub(crate) fn overlay_extracted(
    result: &mut PlatformResult,
    field_map: &FieldMap,
    body: &serde_json::Value,
) -> usize {
    let mut overridden = 0;
    for (field, path) in field_map.paths() {
        if let Some(value) = extract(body, path).and_then(StatValue::from_json) {
            result.set(field, value);
            overridden += 1;
        }
    }
    overridden
}
