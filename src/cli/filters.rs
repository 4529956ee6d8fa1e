//! Offline commands: search URL preview and filter listing.

use console::style;

use imgacquire::config::Config;
use imgacquire::models::FilterCategory;
use imgacquire::scrapers::QueryUrlBuilder;

use super::SearchArgs;

/// Print the search URL without opening a browser.
pub fn cmd_url(config: &Config, search: &SearchArgs) -> anyhow::Result<()> {
    let request = search.to_request(0, ".".into(), true);
    println!("{}", QueryUrlBuilder::new(&config.engine).build(&request));
    Ok(())
}

/// List every filter category with its accepted labels.
pub fn cmd_filters(config: &Config) -> anyhow::Result<()> {
    let table = &config.engine.filters;

    for category in FilterCategory::ALL {
        let key = table.key(category).unwrap_or("-");
        println!(
            "\n{} {}",
            style(category).bold(),
            style(format!("({})", key)).dim()
        );

        let labels = table.labels(category);
        if labels.is_empty() {
            println!("  {}", style("no labels").dim());
        }
        for label in labels {
            if let Some(token) = table.lookup(category, label) {
                println!("  {:<32} {}", label, style(token).cyan());
            }
        }
    }

    Ok(())
}
