//! CLI command implementations.

use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use tradenet_core::{filtered_subset, rank, CoordinateRegistry, TradeDataset, ValueSummary};
use tradenet_geo::{format_thousands, GeoComposer, MarkerRole};
use tradenet_graph::{layout, ColorScale, GraphBuilder, LayoutKind, Rgb};
use tradenet_server::{compute_view, TradeServer, ViewConfig, ViewRequest, CONFIG_DIR, CONFIG_FILE};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const BAR_WIDTH: usize = 30;

/// Initialize TradeNet settings in a directory.
pub fn init(path: &Path) -> Result<()> {
    let config_path = path.join(CONFIG_DIR).join(CONFIG_FILE);

    if config_path.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    ViewConfig::default().save(&config_path)?;

    println!("{} Wrote {}", "✓".green(), config_path.display());
    println!("  Run {} to see your data", "tradenet partners <file.csv>".cyan());

    Ok(())
}

/// Loads a dataset behind a spinner.
fn load(file: &Path) -> Result<TradeDataset> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("Reading {}...", file.display()));

    let result = TradeDataset::from_path(file);
    spinner.finish_and_clear();

    Ok(result?)
}

/// Picks the requested reporter, or the first one in sorted order.
fn resolve_reporter(dataset: &TradeDataset, reporter: Option<String>) -> Result<String> {
    match reporter {
        Some(name) => {
            dataset.require_reporter(&name)?;
            Ok(name)
        }
        None => dataset
            .reporters()
            .into_iter()
            .next()
            .ok_or_else(|| "Dataset has no reporting countries".into()),
    }
}

/// List the reporters in a dataset.
pub fn reporters(file: &Path) -> Result<()> {
    let dataset = load(file)?;
    let reporters = dataset.reporters();

    println!(
        "{} reporters in {} ({} rows):\n",
        reporters.len().to_string().cyan(),
        file.display(),
        dataset.len()
    );
    for name in reporters {
        println!("  {}", name);
    }

    Ok(())
}

/// Rank a reporter's partners.
pub fn partners(
    file: &Path,
    reporter: Option<String>,
    top: Option<usize>,
    json_output: bool,
    config: &ViewConfig,
) -> Result<()> {
    let dataset = load(file)?;
    let reporter = resolve_reporter(&dataset, reporter)?;
    let ranking = rank(&dataset, &reporter, top.unwrap_or(config.top_k));

    if json_output {
        let output = serde_json::json!({
            "reporter": reporter,
            "partners": ranking,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{} {}", "Top trading partners of".bold(), reporter.cyan().bold());
    println!();

    if ranking.is_empty() {
        println!("  No attributed trade found for {}", reporter);
        return Ok(());
    }

    let name_width = ranking.iter().map(|e| e.partner.len()).max().unwrap_or(0);
    for (i, entry) in ranking.iter().enumerate() {
        println!(
            "  {:>2}. {:<width$}  {:>15}  {}",
            i + 1,
            entry.partner,
            format_thousands(entry.total_value),
            bar(ranking.normalized(entry.total_value)),
            width = name_width
        );
    }
    println!();
    println!("{}", "Values in thousands of USD".dimmed());

    Ok(())
}

/// A bar for `share` of the top partner, colored on the coolwarm scale.
fn bar(share: f64) -> ColoredString {
    let share = share.max(0.0).min(1.0);
    let Rgb(r, g, b) = ColorScale::Coolwarm.color(share);
    "█"
        .repeat((share * BAR_WIDTH as f64).round() as usize)
        .truecolor(r, g, b)
}

/// Build and print the trade graph.
pub fn graph(
    file: &Path,
    reporter: Option<String>,
    kind: Option<LayoutKind>,
    output: Option<&Path>,
    json_output: bool,
    config: &ViewConfig,
) -> Result<()> {
    let dataset = load(file)?;
    let reporter = resolve_reporter(&dataset, reporter)?;
    let kind = kind.unwrap_or(config.layout);

    let ranking = rank(&dataset, &reporter, config.top_k);
    let graph = GraphBuilder::new(config.graph.clone()).build(&reporter, &ranking);
    let positions = layout(&graph, kind, config.seed);
    let export = graph.export(&positions, config.graph.color_scale);

    if let Some(out_path) = output {
        fs::write(out_path, serde_json::to_string_pretty(&export)?)?;
        println!("{} Exported graph to {}", "✓".green(), out_path.display());
        return Ok(());
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&export)?);
        return Ok(());
    }

    println!(
        "{} {} ({})",
        "Trade network of".bold(),
        reporter.cyan().bold(),
        kind.label()
    );
    println!(
        "  {} nodes, {} edges",
        export.stats.node_count, export.stats.edge_count
    );
    println!();

    for node in &export.nodes {
        println!(
            "  {:<8} {:<24} ({:>6.3}, {:>6.3})  size {}",
            node.role.to_string().yellow(),
            node.name,
            node.x,
            node.y,
            node.size
        );
    }

    if !export.edges.is_empty() {
        println!();
        for edge in &export.edges {
            println!(
                "  {} <-> {}  width {:.2}  {}",
                edge.source,
                edge.target,
                edge.width,
                edge.color.dimmed()
            );
        }
    }

    Ok(())
}

/// Compose and print the map view.
pub fn map(
    file: &Path,
    reporter: Option<String>,
    lon_offset: Option<f64>,
    json_output: bool,
    config: &ViewConfig,
) -> Result<()> {
    let dataset = load(file)?;
    let reporter = resolve_reporter(&dataset, reporter)?;
    let ranking = rank(&dataset, &reporter, config.top_k);

    let registry = CoordinateRegistry::builtin();
    let view = GeoComposer::new(config.map.clone()).compose(&reporter, &ranking, registry, lon_offset)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{} {}", "Trade map of".bold(), reporter.cyan().bold());
    println!(
        "  Center: {:.4}, {:.4}  zoom {}",
        view.center.lat, view.center.lon, view.zoom
    );
    if !registry.contains(&reporter) {
        println!(
            "  {} No coordinate for {}, centered on 0, 0",
            "⚠".yellow(),
            reporter
        );
    }
    println!();

    for marker in &view.markers {
        let role = match marker.role {
            MarkerRole::Reporter => "reporter".red(),
            MarkerRole::Partner => "partner".blue(),
        };
        println!(
            "  {:<8} {:<24} ({:>8.4}, {:>9.4})",
            role, marker.name, marker.position.lat, marker.position.lon
        );
    }

    if !view.links.is_empty() {
        println!();
        for link in &view.links {
            println!(
                "  {} → {}  weight {:.2}  {}",
                reporter,
                link.partner,
                link.render_weight,
                link.color.dimmed()
            );
        }
    }

    let unmapped: Vec<_> = ranking
        .iter()
        .filter(|e| !registry.contains(&e.partner))
        .map(|e| e.partner.as_str())
        .collect();
    if !unmapped.is_empty() {
        println!();
        println!("{} {}", "Not on map:".dimmed(), unmapped.join(", "));
    }

    Ok(())
}

/// Write the full view as JSON.
pub fn view(
    file: &Path,
    reporter: Option<String>,
    kind: Option<LayoutKind>,
    lon_offset: Option<f64>,
    output: Option<&Path>,
    config: &ViewConfig,
) -> Result<()> {
    let dataset = load(file)?;
    let reporter = resolve_reporter(&dataset, reporter)?;

    let request = ViewRequest {
        layout: kind,
        lon_offset,
        ..ViewRequest::new(reporter)
    };
    let view = compute_view(&dataset, &request, config, CoordinateRegistry::builtin())?;
    let json = serde_json::to_string_pretty(&view)?;

    match output {
        Some(out_path) => {
            fs::write(out_path, json)?;
            println!("{} Wrote view to {}", "✓".green(), out_path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Export the filtered subset as CSV.
pub fn export(
    file: &Path,
    reporter: Option<String>,
    output: Option<&Path>,
    config: &ViewConfig,
) -> Result<()> {
    let dataset = load(file)?;
    let reporter = resolve_reporter(&dataset, reporter)?;

    let ranking = rank(&dataset, &reporter, config.top_k);
    let subset = filtered_subset(&dataset, &reporter, &ranking);

    let out_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("{}_trade_data.csv", reporter)));
    debug!("Exporting {} rows to {}", subset.len(), out_path.display());

    let written = dataset.write_csv(subset, File::create(&out_path)?)?;

    println!(
        "{} Exported {} rows to {}",
        "✓".green(),
        written.to_string().cyan(),
        out_path.display()
    );

    Ok(())
}

/// Print value statistics for the filtered subset.
pub fn summary(file: &Path, reporter: Option<String>, config: &ViewConfig) -> Result<()> {
    let dataset = load(file)?;
    let reporter = resolve_reporter(&dataset, reporter)?;

    let ranking = rank(&dataset, &reporter, config.top_k);
    let values: Vec<f64> = filtered_subset(&dataset, &reporter, &ranking)
        .iter()
        .filter_map(|r| r.value)
        .collect();

    println!(
        "{} {}",
        "Summary statistics for".bold(),
        reporter.cyan().bold()
    );
    println!();

    let Some(stats) = ValueSummary::from_values(&values) else {
        println!("  No attributed trade found for {}", reporter);
        return Ok(());
    };

    let rows = [
        ("count", stats.count.to_string()),
        ("mean", format!("{:.2}", stats.mean)),
        (
            "std",
            stats.std.map(|s| format!("{:.2}", s)).unwrap_or_else(|| "-".to_string()),
        ),
        ("min", format!("{:.2}", stats.min)),
        ("25%", format!("{:.2}", stats.q25)),
        ("50%", format!("{:.2}", stats.median)),
        ("75%", format!("{:.2}", stats.q75)),
        ("max", format!("{:.2}", stats.max)),
    ];
    for (label, value) in rows {
        println!("  {:<6} {:>18}", label.dimmed(), value);
    }

    Ok(())
}

/// Serve JSON-RPC requests over stdio.
pub fn serve(file: &Path, config: ViewConfig) -> Result<()> {
    let dataset = load(file)?;

    eprintln!(
        "{} Serving {} on stdio (Ctrl+D to stop)",
        "✓".green(),
        file.display()
    );

    let server = TradeServer::new(dataset, config, CoordinateRegistry::builtin());
    server.run_stdio().map_err(|e| e.to_string())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_dataset(dir: &Path) -> PathBuf {
        let path = dir.join("trade.csv");
        fs::write(
            &path,
            "ReporterName,PartnerName,TradeValue in 1000 USD\n\
             Germany,France,100\n\
             Germany,China,50\n\
             Germany,Unspecified,999\n\
             Japan,China,10\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_init_writes_config_once() {
        let dir = TempDir::new().unwrap();
        init(dir.path()).unwrap();

        let config_path = dir.path().join(CONFIG_DIR).join(CONFIG_FILE);
        assert_eq!(ViewConfig::load(&config_path).unwrap(), ViewConfig::default());

        // Second run leaves the file alone.
        init(dir.path()).unwrap();
    }

    #[test]
    fn test_resolve_reporter() {
        let dir = TempDir::new().unwrap();
        let dataset = TradeDataset::from_path(write_dataset(dir.path())).unwrap();

        assert_eq!(resolve_reporter(&dataset, None).unwrap(), "Germany");
        assert_eq!(
            resolve_reporter(&dataset, Some("Japan".to_string())).unwrap(),
            "Japan"
        );
        assert!(resolve_reporter(&dataset, Some("Peru".to_string())).is_err());
    }

    #[test]
    fn test_bar_follows_coolwarm_scale() {
        let full = bar(1.0);
        assert_eq!(full.chars().count(), BAR_WIDTH);
        assert_eq!(full.fgcolor(), Some(colored::Color::TrueColor { r: 180, g: 4, b: 38 }));

        let low = bar(0.0);
        assert!(low.is_empty());
        assert_eq!(low.fgcolor(), Some(colored::Color::TrueColor { r: 59, g: 76, b: 192 }));

        assert_eq!(bar(0.5).chars().count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_export_writes_filtered_rows() {
        let dir = TempDir::new().unwrap();
        let file = write_dataset(dir.path());
        let out = dir.path().join("germany.csv");

        export(&file, None, Some(&out), &ViewConfig::default()).unwrap();

        let exported = TradeDataset::from_path(&out).unwrap();
        assert_eq!(exported.len(), 2);
        assert!(exported.records().iter().all(|r| r.is_reported_by("Germany")));
    }

    #[test]
    fn test_graph_writes_json() {
        let dir = TempDir::new().unwrap();
        let file = write_dataset(dir.path());
        let out = dir.path().join("graph.json");

        graph(
            &file,
            Some("Germany".to_string()),
            Some(LayoutKind::Circular),
            Some(&out),
            false,
            &ViewConfig::default(),
        )
        .unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["stats"]["nodeCount"], 3);
        assert_eq!(json["reporter"], "Germany");
    }
}
