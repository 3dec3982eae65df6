//! Read-only registry commands.

use std::path::Path;

use folio_core::stats::PLACEHOLDER;
use folio_core::Category;

/// List configured platforms in registry order.
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded.
pub(crate) fn run_platforms(platforms_path: &Path, category: Option<Category>) -> anyhow::Result<()> {
    let registry = folio_core::load_platforms(platforms_path)?;

    println!("{:<16}{:<18}{:<13}ENDPOINT", "PLATFORM", "SLUG", "CATEGORY");
    for platform in registry.by_category(category) {
        let category = category_label(platform.display.category);
        let endpoint = platform.descriptor.endpoint().unwrap_or("(manual)");
        println!(
            "{:<16}{:<18}{:<13}{}",
            platform.name(),
            platform.slug(),
            category,
            endpoint
        );
    }

    Ok(())
}

fn category_label(category: Option<Category>) -> String {
    category.map_or_else(|| PLACEHOLDER.to_string(), |c| c.to_string())
}

/// Load and validate the registry, reporting what was found.
///
/// # Errors
///
/// Returns the validation error if the registry is invalid.
pub(crate) fn run_validate(platforms_path: &Path) -> anyhow::Result<()> {
    let registry = folio_core::load_platforms(platforms_path)?;
    let live = registry
        .descriptors()
        .filter(|d| d.endpoint().is_some())
        .count();
    println!(
        "{}: {} platforms ({} live, {} manual-only)",
        platforms_path.display(),
        registry.platforms.len(),
        live,
        registry.platforms.len() - live
    );
    Ok(())
}
