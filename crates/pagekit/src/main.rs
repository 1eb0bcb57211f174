use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pagekit_core::config::{PagekitConfig, load_config};
use pagekit_core::filesystem::{ScanOptions, scan_page_files};
use pagekit_core::inject::{
    FileStatus, InjectOptions, RunReport, injection_status, inspect_page, run_injection,
};
use pagekit_core::runtime::{
    PathOverrides, ResolutionContext, ResolvedPaths, apply_config, ensure_content_dir,
    init_layout, inspect_runtime, normalize_for_display, resolve_paths,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pagekit",
    version,
    about = "Lift hard-coded data arrays out of storefront pages into a single page configuration block"
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH")]
    project_root: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Print resolved runtime diagnostics")]
    diagnostics: bool,
    #[arg(short, long, global = true, help = "Log debug detail to stderr")]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone)]
struct RuntimeOptions {
    project_root: Option<PathBuf>,
    config: Option<PathBuf>,
    diagnostics: bool,
}

impl RuntimeOptions {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            project_root: cli.project_root.clone(),
            config: cli.config.clone(),
            diagnostics: cli.diagnostics,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Inject a page configuration block into every unprocessed page (default)")]
    Inject(InjectArgs),
    #[command(about = "List the page files a run would consider")]
    Scan(ScanArgs),
    #[command(about = "Count processed and pending pages")]
    Status,
    #[command(about = "Print the configuration that would be injected into one file")]
    Inspect(InspectArgs),
    #[command(about = "Write a commented .pagekit/config.toml")]
    Init(InitArgs),
}

#[derive(Debug, Args, Default)]
struct InjectArgs {
    #[arg(long, help = "Report what would change without writing")]
    dry_run: bool,
    #[arg(long, help = "Include a unified diff per written file")]
    diff: bool,
    #[arg(long, help = "Print the run report as JSON")]
    json: bool,
}

#[derive(Debug, Args)]
struct ScanArgs {
    #[arg(long, help = "Print discovered files as JSON")]
    json: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    file: PathBuf,
    #[arg(long, help = "Print the configuration on a single line")]
    compact: bool,
}

#[derive(Debug, Args)]
struct InitArgs {
    #[arg(long, help = "Overwrite an existing config file")]
    force: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let runtime = RuntimeOptions::from_cli(&cli);

    match cli.command {
        Some(Commands::Inject(args)) => run_inject(&runtime, args),
        Some(Commands::Scan(args)) => run_scan(&runtime, args),
        Some(Commands::Status) => run_status(&runtime),
        Some(Commands::Inspect(args)) => run_inspect(&runtime, args),
        Some(Commands::Init(args)) => run_init(&runtime, args),
        None => run_inject(&runtime, InjectArgs::default()),
    }
}

fn init_logging(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run_inject(runtime: &RuntimeOptions, args: InjectArgs) -> Result<()> {
    let (paths, config) = resolve_runtime(runtime)?;
    ensure_content_dir(&paths)?;

    let report = run_injection(
        &paths,
        &config,
        &InjectOptions {
            dry_run: args.dry_run,
            include_diff: args.diff,
        },
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_run_report(&report);
    }
    if runtime.diagnostics {
        println!("\n[diagnostics]\n{}", paths.diagnostics());
    }
    Ok(())
}

fn print_run_report(report: &RunReport) {
    println!("{}", if report.dry_run { "inject (dry run)" } else { "inject" });
    println!("content_dir: {}", report.content_dir);
    println!("files: {}", report.files.len());
    println!("written: {}", report.written);
    println!("skipped: {}", report.skipped);

    for file in &report.files {
        let verb = match (file.status, report.dry_run) {
            (FileStatus::Written, true) => "would write",
            (status, _) => status.as_str(),
        };
        println!("file: {} ({verb})", file.relative_path);
        if file.status == FileStatus::Skipped {
            continue;
        }
        if file.extracted.is_empty() {
            println!("  extracted: <none>");
        } else {
            println!("  extracted: {}", file.extracted.join(", "));
        }
        for dropped in &file.dropped {
            println!("  dropped: {} ({})", dropped.field.as_str(), dropped.reason);
        }
        if let Some(diff) = file.diff.as_deref() {
            print!("{diff}");
        }
    }
}

fn run_scan(runtime: &RuntimeOptions, args: ScanArgs) -> Result<()> {
    let (paths, config) = resolve_runtime(runtime)?;
    ensure_content_dir(&paths)?;
    let files = scan_page_files(&paths.content_dir, &ScanOptions::from_config(&config.scan));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&files)?);
    } else {
        println!("scan");
        println!("content_dir: {}", normalize_for_display(&paths.content_dir));
        println!("files.count: {}", files.len());
        if files.is_empty() {
            println!("files: <none>");
        }
        for file in &files {
            println!("files.path: {}", file.relative_path);
        }
    }
    if runtime.diagnostics {
        println!("\n[diagnostics]\n{}", paths.diagnostics());
    }
    Ok(())
}

fn run_status(runtime: &RuntimeOptions) -> Result<()> {
    let (paths, config) = resolve_runtime(runtime)?;
    let status = inspect_runtime(&paths);

    println!("runtime status");
    println!("project_root: {}", normalize_for_display(&paths.project_root));
    println!(
        "project_root_exists: {}",
        format_flag(status.project_root_exists)
    );
    println!("content_dir: {}", normalize_for_display(&paths.content_dir));
    println!(
        "content_dir_exists: {}",
        format_flag(status.content_dir_exists)
    );
    println!("config_path: {}", normalize_for_display(&paths.config_path));
    println!("config_exists: {}", format_flag(status.config_exists));
    println!("marker: {}", config.inject.marker);

    if status.content_dir_exists {
        let pages = injection_status(&paths, &config)?;
        println!("pages.total: {}", pages.total);
        println!("pages.processed: {}", pages.processed);
        println!("pages.pending: {}", pages.pending.len());
        for pending in &pages.pending {
            println!("pages.pending.path: {pending}");
        }
    }
    if !status.warnings.is_empty() {
        println!("warnings:");
        for warning in &status.warnings {
            println!("  - {warning}");
        }
    }
    if runtime.diagnostics {
        println!("\n[diagnostics]\n{}", paths.diagnostics());
    }
    Ok(())
}

fn run_inspect(runtime: &RuntimeOptions, args: InspectArgs) -> Result<()> {
    let (paths, config) = resolve_runtime(runtime)?;
    let (merged, extraction) = inspect_page(&args.file, &config)?;

    for dropped in &extraction.dropped {
        eprintln!("dropped: {} ({})", dropped.field.as_str(), dropped.reason);
    }
    let rendered = if args.compact {
        serde_json::to_string(&merged)
    } else {
        serde_json::to_string_pretty(&merged)
    }
    .context("failed to serialize page configuration")?;
    println!("{rendered}");

    if runtime.diagnostics {
        println!("\n[diagnostics]\n{}", paths.diagnostics());
    }
    Ok(())
}

fn run_init(runtime: &RuntimeOptions, args: InitArgs) -> Result<()> {
    let (paths, _) = resolve_runtime(runtime)?;
    let report = init_layout(&paths, args.force)?;

    println!("Initialized pagekit layout");
    println!("project_root: {}", normalize_for_display(&paths.project_root));
    println!("state_dir: {}", normalize_for_display(&paths.state_dir));
    println!("config_path: {}", normalize_for_display(&paths.config_path));
    println!("created_dirs: {}", report.created_dirs.len());
    println!("wrote_config: {}", report.wrote_config);
    if !report.wrote_config {
        println!("note: config already exists (use --force to overwrite)");
    }
    if runtime.diagnostics {
        println!("\n[diagnostics]\n{}", paths.diagnostics());
    }
    Ok(())
}

fn resolve_runtime(runtime: &RuntimeOptions) -> Result<(ResolvedPaths, PagekitConfig)> {
    dotenvy::dotenv().ok();

    let context = ResolutionContext::from_process()?;
    let overrides = PathOverrides {
        project_root: runtime.project_root.clone(),
        config: runtime.config.clone(),
    };

    let initial = resolve_paths(&context, &overrides)?;
    let project_env = initial.project_root.join(".env");
    if project_env.exists() {
        let _ = dotenvy::from_path_override(&project_env);
    }

    let mut paths = resolve_paths(&context, &overrides)?;
    let config = load_config(&paths.config_path)?;
    apply_config(&mut paths, &config);
    debug!(
        project_root = %normalize_for_display(&paths.project_root),
        content_dir = %normalize_for_display(&paths.content_dir),
        "resolved runtime paths"
    );
    Ok((paths, config))
}

fn format_flag(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
