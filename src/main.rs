mod deck;
mod drive;
mod mapper;
mod output;
mod sheets;
mod tabular;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use deck::Deck;
use mapper::tabmap::TabMap;
use mapper::ProcessMap;
use sheets::TrainingRow;

const TAB_URL_MAP_PATH: &str = "data/log10_tab_url_map.csv";
const MANIFEST_PATH: &str = "data/output/deck_manifest.csv";

#[derive(Parser)]
#[command(name = "log10_mapper", about = "Training deck process map builder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch training rows, download each deck, extract process maps
    Run {
        /// Max rows to process (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Output directory for the JSON process maps
        #[arg(short, long, default_value = output::DEFAULT_OUTPUT_DIR)]
        out: PathBuf,
        /// Skip the remote write-back even if SHEET_WEBHOOK_URL is set
        #[arg(long)]
        no_push: bool,
    },
    /// Extract the process map from a local deck dump and print it
    Process {
        /// Path to a deck dump (.json)
        deck: PathBuf,
        /// Demo video link attached to the extracted processes
        #[arg(short, long, default_value = "")]
        video_link: String,
    },
    /// Register local deck dumps in the ingest manifest
    Ingest {
        /// Directory containing deck dumps
        #[arg(default_value = "data/decks")]
        dir: PathBuf,
    },
    /// Resolve a tab label against the tab-url map
    Resolve { label: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { limit, out, no_push } => run(limit, &out, no_push).await,
        Commands::Process { deck, video_link } => process_single(&deck, &video_link),
        Commands::Ingest { dir } => ingest(&dir),
        Commands::Resolve { label } => resolve_label(&label),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Full batch run: one pass over the training sheet, one deck at a time.
async fn run(limit: Option<usize>, out_dir: &Path, no_push: bool) -> Result<()> {
    let sheet_url = std::env::var("SHEET_INPUT_CSV_URL")
        .map_err(|_| anyhow::anyhow!("SHEET_INPUT_CSV_URL environment variable must be set"))?;

    let client = reqwest::Client::new();
    let mut rows = sheets::fetch_training_rows(&client, &sheet_url).await?;
    if rows.is_empty() {
        bail!("no rows in the training sheet");
    }
    if let Some(limit) = limit {
        rows.truncate(limit);
    }

    let tab_map = TabMap::load(Path::new(TAB_URL_MAP_PATH))?;

    let pb = ProgressBar::new(rows.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    let mut all = ProcessMap::default();
    let mut errors = 0usize;

    for (idx, row) in rows.iter().enumerate() {
        let n = idx + 1;
        if row.ppt_link.is_empty() {
            warn!("row {}: no deck link, skipping", n);
            pb.inc(1);
            continue;
        }
        let name = if row.process_name.is_empty() {
            format!("Process_{n}")
        } else {
            row.process_name.clone()
        };
        info!("row {}: {}", n, name);

        match process_row(&client, row, n, &tab_map).await {
            Ok(map) => all.extend(map),
            Err(e) => {
                // One bad document never aborts the run; it lands on the
                // dashboard and gets flagged for review
                warn!("row {} ({}) failed: {:#}", n, name, e);
                errors += 1;
                all.log10
                    .push(mapper::fallback_process(name, &row.video_link, &tab_map));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    output::save_process_maps(out_dir, &all)?;

    if !no_push {
        if let Ok(webhook) = std::env::var("SHEET_WEBHOOK_URL") {
            sheets::push_results(&client, &webhook, &all.log10).await?;
        }
    }

    print_summary(&all, errors);
    Ok(())
}

/// Download one row's deck to a temp file, map it, and clean up.
async fn process_row(
    client: &reqwest::Client,
    row: &TrainingRow,
    n: usize,
    tab_map: &TabMap,
) -> Result<ProcessMap> {
    let temp = TempFile::new(&format!("training_deck_{}_{}.json", std::process::id(), n));
    drive::download_with_retry(client, &row.ppt_link, temp.path()).await?;
    let deck = Deck::open(temp.path())?;
    Ok(mapper::map_deck(&deck, &row.video_link, tab_map))
}

fn process_single(deck_path: &Path, video_link: &str) -> Result<()> {
    let tab_map = TabMap::load(Path::new(TAB_URL_MAP_PATH))?;
    let deck = Deck::open(deck_path)?;
    info!("{}: {} slides", deck_path.display(), deck.slide_count());

    let map = mapper::map_deck(&deck, video_link, &tab_map);
    let json = serde_json::json!({ "log10": map.log10, "external": map.external });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Register every deck dump in `dir` in the manifest CSV.
fn ingest(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();
    if paths.is_empty() {
        println!("No deck dumps found in {}", dir.display());
        return Ok(());
    }

    let manifest = Path::new(MANIFEST_PATH);
    if let Some(parent) = manifest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let is_new = !manifest.exists();
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(manifest)
        .with_context(|| format!("failed to open manifest {}", manifest.display()))?;
    if is_new {
        writeln!(
            file,
            "{}",
            tabular::csv_line(&[
                "Process_Title",
                "Deck_File",
                "Demo_Video_Link",
                "Ingested_At",
                "Slide_Count",
            ])
        )?;
    }

    let mut count = 0usize;
    for path in &paths {
        let deck = match Deck::open(path) {
            Ok(deck) => deck,
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let title = deck
            .slides
            .first()
            .and_then(|s| s.title_text())
            .filter(|t| !t.is_empty())
            .unwrap_or("Unknown Process")
            .to_string();
        let screenshots = deck.slides.iter().filter(|s| s.has_picture()).count();

        let fields = [
            title.clone(),
            path.display().to_string(),
            "demo://placeholder_video".to_string(),
            chrono::Utc::now().to_rfc3339(),
            deck.slide_count().to_string(),
        ];
        writeln!(file, "{}", tabular::csv_line(&fields))?;
        info!(
            "ingested {} ({} slides, {} with screenshots)",
            title,
            deck.slide_count(),
            screenshots
        );
        count += 1;
    }

    println!("Registered {} deck(s) in {}", count, manifest.display());
    Ok(())
}

fn resolve_label(label: &str) -> Result<()> {
    let map = TabMap::load(Path::new(TAB_URL_MAP_PATH))?;
    match map.resolve(label) {
        Some(module) => println!("{} -> {}", label, module),
        None => println!("{}: no module match ({} keys loaded)", label, map.len()),
    }
    Ok(())
}

fn print_summary(map: &ProcessMap, errors: usize) {
    println!("\nLog10 processes:    {}", map.log10.len());
    println!("External processes: {}", map.external.len());
    if errors > 0 {
        println!("Failed documents:   {} (recorded with defaults)", errors);
    }

    if !map.log10.is_empty() {
        println!("\n--- Log10 ---");
        for proc in &map.log10 {
            let flag = if proc.needs_review { "  [needs review]" } else { "" };
            println!(
                "  {} | start: {} | module: {} | steps: {}{}",
                proc.process_name,
                proc.start_tab,
                proc.url_module.as_deref().unwrap_or("-"),
                proc.steps.len(),
                flag
            );
        }
    }
    if !map.external.is_empty() {
        println!("\n--- External ---");
        for proc in &map.external {
            println!("  {} ({})", proc.process_name, proc.platform);
        }
    }
}

/// Temp file removed on drop, whatever the exit path. Removal failures are
/// logged and swallowed.
struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn new(name: &str) -> TempFile {
        TempFile {
            path: std::env::temp_dir().join(name),
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("failed to remove temp file {}: {}", self.path.display(), e);
        }
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
