//! Flux CLI - Command-line interface for Engagement Flux
//!
//! Commands:
//! - transform: Turn a platform's export documents into a cleaned CSV table
//! - compare: Compare two cleaned tables on their shared columns

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use engagement_flux::compare::Comparison;
use engagement_flux::pipeline::process_documents;
use engagement_flux::report::PlatformReport;
use engagement_flux::{Platform, RawDocument, TracingSink, FLUX_VERSION};

/// Flux - Cross-platform engagement datasets from social media exports
#[derive(Parser)]
#[command(name = "flux")]
#[command(version = FLUX_VERSION)]
#[command(
    about = "Normalize Instagram and TikTok exports into one engagement table",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn export documents into a cleaned CSV table
    Transform {
        /// Export format of the input documents
        #[arg(short, long, value_enum)]
        platform: PlatformArg,

        /// JSON files or directories searched recursively for *.json
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output CSV path (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Print the per-platform engagement report to stderr
        #[arg(long)]
        report: bool,

        /// Print the report as JSON
        #[arg(long, requires = "report")]
        json: bool,
    },

    /// Compare two cleaned tables on their shared columns
    Compare {
        /// Cleaned TikTok CSV
        #[arg(long)]
        tiktok: PathBuf,

        /// Cleaned Instagram CSV
        #[arg(long)]
        instagram: PathBuf,

        /// Output the comparison as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PlatformArg {
    /// Instagram GraphQL export ({"data": {"posts": [{"node": ...}]}})
    Instagram,
    /// TikTok aweme export ({"data": [...]})
    Tiktok,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Instagram => Platform::Instagram,
            PlatformArg::Tiktok => Platform::TikTok,
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("engagement_flux=info,flux=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), FluxCliError> {
    match cli.command {
        Commands::Transform {
            platform,
            input,
            output,
            report,
            json,
        } => cmd_transform(platform.into(), &input, &output, report, json),

        Commands::Compare {
            tiktok,
            instagram,
            json,
        } => cmd_compare(&tiktok, &instagram, json),
    }
}

fn cmd_transform(
    platform: Platform,
    inputs: &[PathBuf],
    output: &Path,
    report: bool,
    json: bool,
) -> Result<(), FluxCliError> {
    let documents = load_documents(inputs)?;
    if documents.is_empty() {
        return Err(FluxCliError::NoDocuments);
    }
    info!(platform = %platform, documents = documents.len(), "loaded export documents");

    let dataset = process_documents(platform.adapter(), &documents, &TracingSink);
    dataset.require_rows()?;

    if output.to_string_lossy() == "-" {
        dataset.write_csv(io::stdout().lock())?;
    } else {
        dataset.write_csv_path(output)?;
        info!(path = %output.display(), rows = dataset.len(), "wrote cleaned table");
    }

    if report {
        let report = PlatformReport::for_dataset(&dataset);
        if json {
            eprintln!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            eprint!("{}", render_report(&report));
        }
    }

    Ok(())
}

fn cmd_compare(tiktok: &Path, instagram: &Path, json: bool) -> Result<(), FluxCliError> {
    let comparison = Comparison::from_csv_paths(tiktok, instagram)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
    } else {
        print!("{}", render_comparison(&comparison));
    }

    Ok(())
}

// Helper functions

/// Read every `*.json` file under the given paths, in sorted path order
fn load_documents(inputs: &[PathBuf]) -> Result<Vec<RawDocument>, FluxCliError> {
    let paths = discover_json_files(inputs)?;

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        match fs::read_to_string(&path) {
            Ok(contents) => {
                documents.push(RawDocument::new(path.display().to_string(), contents))
            }
            Err(e) => {
                warn!(document = %path.display(), error = %e, "skipping unreadable document")
            }
        }
    }
    Ok(documents)
}

/// Explicit files as given, directories searched recursively for `*.json`;
/// sorted and deduplicated
fn discover_json_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, FluxCliError> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            collect_json_files(input, &mut paths)?;
        } else if input.exists() {
            paths.push(input.clone());
        } else {
            return Err(FluxCliError::MissingInput(input.clone()));
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}

fn collect_json_files(dir: &Path, paths: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_json_files(&path, paths)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    Ok(())
}

fn format_rate(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.4}"))
        .unwrap_or_else(|| "N/A".to_string())
}

fn render_report(report: &PlatformReport) -> String {
    let mut out = String::new();
    let title = format!("{} Engagement Report", report.platform);
    out.push_str(&format!("{title}\n{}\n", "=".repeat(title.len())));
    out.push_str(&format!("Posts: {}\n", report.posts));

    out.push_str("\nAverage Engagement Rate by Hour:\n");
    for (hour, mean) in &report.mean_engagement_by_hour {
        out.push_str(&format!("  {hour:>2}: {mean:.4}\n"));
    }

    out.push_str("\nAverage Engagement Rate by Day of Week:\n");
    for (day, mean) in &report.mean_engagement_by_weekday {
        out.push_str(&format!("  {day:<9} {mean:.4}\n"));
    }

    out.push_str("\nCaption Length Analysis:\n");
    out.push_str(&format!(
        "  Average caption length: {} characters\n",
        report
            .average_caption_length
            .map(|v| format!("{v:.1}"))
            .unwrap_or_else(|| "N/A".to_string())
    ));
    out.push_str(&format!(
        "  Correlation with engagement rate: {}\n",
        format_rate(report.caption_length_correlation)
    ));
    for (bin, mean) in &report.mean_engagement_by_caption_bin {
        out.push_str(&format!("  {:<8} {mean:.4}\n", bin.label()));
    }

    out.push_str("\nEngagement by Emoji Use:\n");
    out.push_str(&format!(
        "  With Emojis:    {}\n",
        format_rate(report.emoji_split.with_emoji)
    ));
    out.push_str(&format!(
        "  Without Emojis: {}\n",
        format_rate(report.emoji_split.without_emoji)
    ));

    out.push_str("\nTop Hashtags in High-Engagement Posts:\n");
    for (tag, count) in &report.top_hashtags {
        out.push_str(&format!("  {tag}: {count}\n"));
    }

    out
}

fn render_comparison(comparison: &Comparison) -> String {
    let mut out = String::new();
    out.push_str("Platform Comparison\n===================\n");

    out.push_str("\nAverage Engagement Rate by Platform:\n");
    for p in &comparison.platforms {
        out.push_str(&format!(
            "  {:<10} {:.4} ({} posts)\n",
            p.platform, p.mean_engagement, p.posts
        ));
    }

    out.push_str("\nEngagement Rate by Platform and Emoji Use:\n");
    for p in &comparison.platforms {
        out.push_str(&format!(
            "  {:<10} with: {}  without: {}\n",
            p.platform,
            format_rate(p.emoji_split.with_emoji),
            format_rate(p.emoji_split.without_emoji)
        ));
    }

    out.push_str("\nEngagement by Hour of Day:\n");
    for p in &comparison.platforms {
        out.push_str(&format!("  {}:\n", p.platform));
        for (hour, mean) in &p.mean_engagement_by_hour {
            out.push_str(&format!("    {hour:>2}: {mean:.4}\n"));
        }
    }

    out.push_str("\nAvg Caption Length and Engagement Rate:\n");
    for p in &comparison.platforms {
        out.push_str(&format!(
            "  {:<10} caption_length: {:.1}  engagement_rate: {:.4}\n",
            p.platform, p.mean_caption_length, p.mean_engagement
        ));
    }

    out
}

// Error handling

#[derive(Debug)]
enum FluxCliError {
    Io(io::Error),
    Compute(engagement_flux::ComputeError),
    Json(serde_json::Error),
    MissingInput(PathBuf),
    NoDocuments,
}

impl From<io::Error> for FluxCliError {
    fn from(e: io::Error) -> Self {
        FluxCliError::Io(e)
    }
}

impl From<engagement_flux::ComputeError> for FluxCliError {
    fn from(e: engagement_flux::ComputeError) -> Self {
        FluxCliError::Compute(e)
    }
}

impl From<serde_json::Error> for FluxCliError {
    fn from(e: serde_json::Error) -> Self {
        FluxCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FluxCliError> for CliError {
    fn from(e: FluxCliError) -> Self {
        use engagement_flux::ComputeError;

        match e {
            FluxCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FluxCliError::Compute(ComputeError::NoUsableData(msg)) => CliError {
                code: "NO_USABLE_DATA".to_string(),
                message: msg,
                hint: Some(
                    "Check that posts carry valid timestamps (and views for TikTok)".to_string(),
                ),
            },
            FluxCliError::Compute(ComputeError::Csv(e)) => CliError {
                code: "CSV_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure the table was written by 'flux transform'".to_string()),
            },
            FluxCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            FluxCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            FluxCliError::MissingInput(path) => CliError {
                code: "MISSING_INPUT".to_string(),
                message: format!("Input path does not exist: {}", path.display()),
                hint: Some("Pass existing files or directories with --input".to_string()),
            },
            FluxCliError::NoDocuments => CliError {
                code: "NO_DOCUMENTS".to_string(),
                message: "No JSON documents found in input".to_string(),
                hint: Some("Point --input at the extracted export's raw folder".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_discovery_is_recursive_sorted_and_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        for file in ["b/nested/2.json", "b/1.json", "a/3.json", "a/notes.txt", "z.json"] {
            fs::write(root.join(file), "{}").unwrap();
        }

        let inputs = vec![root.join("b"), root.join("a"), root.join("b/1.json")];
        let paths = discover_json_files(&inputs).unwrap();
        let relative: Vec<PathBuf> = paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            relative,
            vec![
                PathBuf::from("a/3.json"),
                PathBuf::from("b/1.json"),
                PathBuf::from("b/nested/2.json"),
            ]
        );
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            discover_json_files(&[missing]),
            Err(FluxCliError::MissingInput(_))
        ));
    }

    #[test]
    fn test_load_documents_names_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.json");
        fs::write(&path, r#"{"data": []}"#).unwrap();

        let documents = load_documents(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].name, path.display().to_string());
        assert_eq!(documents[0].contents, r#"{"data": []}"#);
    }
}
