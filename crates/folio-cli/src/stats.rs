//! `stats` command: run one aggregation sweep and print the results.

use std::path::Path;

use folio_core::{AchievementStats, Category, PlatformConfig, StatField};
use folio_stats::{Aggregator, StatsClient};

/// Run a sweep over the registry and print the merged results.
///
/// The sweep covers only the platforms in `category` when one is given. Per
/// platform failures are shown next to their fallback values and never fail
/// the command.
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded or the HTTP client
/// cannot be built.
pub(crate) async fn run_stats(
    config: &folio_core::AppConfig,
    platforms_path: &Path,
    category: Option<Category>,
    json: bool,
) -> anyhow::Result<()> {
    let registry = folio_core::load_platforms(platforms_path)?;
    let selected = registry.by_category(category);
    if selected.is_empty() {
        println!(
            "no platforms configured{}",
            category.map(|c| format!(" in category '{c}'")).unwrap_or_default()
        );
        return Ok(());
    }

    let client = StatsClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build stats client: {e}"))?;
    let aggregator = Aggregator::new(client);
    let stats = aggregator
        .aggregate(selected.iter().map(|p| &p.descriptor))
        .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", render_table(&selected, &stats));
    }

    Ok(())
}

/// Render results as a fixed-width table in registry order.
fn render_table(platforms: &[&PlatformConfig], stats: &AchievementStats) -> String {
    let mut out = format!(
        "{:<16}{:<10}{:<30}{:<10}STATUS\n",
        "PLATFORM", "SOLVED", "RANK", "CONTESTS"
    );
    for platform in platforms {
        let Some(result) = stats.get(platform.name()) else {
            continue;
        };
        let status = result.error.as_deref().unwrap_or("ok");
        out.push_str(&format!(
            "{:<16}{:<10}{:<30}{:<10}{}\n",
            platform.name(),
            result.get(StatField::QuestionsSolved).to_string(),
            result.get(StatField::Rank).to_string(),
            result.get(StatField::Contests).to_string(),
            status
        ));
    }
    out
}
