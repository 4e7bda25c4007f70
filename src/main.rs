use clap::{Parser, Subcommand};
use event_gal::admin::{AdminWorkflow, BatchReport, Deletion, ItemTarget};
use event_gal::auth::CredentialGate;
use event_gal::config::{self, GalleryConfig};
use event_gal::service::{GalleryService, HttpGalleryService};
use event_gal::types::UploadFile;
use event_gal::upload::SignedUploader;
use event_gal::{output, view};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use walkdir::WalkDir;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "event-gal")]
#[command(about = "Curate the event gallery of a performance group's website")]
#[command(long_about = "\
Curate the event gallery of a performance group's website

The gallery lives in the Gallery Service; images live at the media host.
Read commands (list, hero, check) need only the service URL. Commands that
change the gallery need the admin password configured in config.toml.

Folders are addressed by storage key: the display name with each run of
whitespace replaced by '_' (\"Ugadi 2025\" -> Ugadi_2025).

A folder holds either photos or video links, decided by its first item.
Uploading images to a video folder, or adding links to a photo folder, is
refused.

Run 'event-gal gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Admin username (defaults to admin.username from config)
    #[arg(long, env = "EVENT_GAL_USERNAME", global = true)]
    username: Option<String>,

    /// Admin password
    #[arg(long, env = "EVENT_GAL_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the public gallery: photo folders, then video folders
    List {
        /// Only folders whose name contains this text
        #[arg(long)]
        query: Option<String>,
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the home page carousel
    Hero,
    /// List every folder with its kind and count, and report mixed folders
    Check,
    /// Show the id, embed and thumbnail URLs for a YouTube link
    Youtube { url: String },
    /// Create an empty folder
    Create { name: String },
    /// Upload images (files or directories) into a folder
    Upload {
        folder: String,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Upload images (files or directories) into the hero carousel
    UploadHero {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Rename a folder
    Rename { folder: String, new_name: String },
    /// Delete a folder and everything in it
    DeleteFolder {
        folder: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Add YouTube links to a folder (comma- or newline-separated)
    AddVideo {
        folder: String,
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Replace a video link, addressed by its 1-based position
    EditVideo {
        folder: String,
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        position: u64,
        url: String,
    },
    /// Delete one item from a folder or the hero carousel
    DeleteItem {
        #[arg(required_unless_present = "hero")]
        folder: Option<String>,
        /// Item URL (defaults to the first item)
        #[arg(long)]
        url: Option<String>,
        /// Delete from the hero carousel instead of a folder
        #[arg(long, conflicts_with = "folder")]
        hero: bool,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> CliResult<()> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Youtube { url } => {
            let lines = output::format_youtube(url)
                .ok_or_else(|| format!("Not a YouTube URL: {url}"))?;
            for line in lines {
                println!("{}", line);
            }
        }
        Command::List { query, json } => {
            let config = config::load_config(&cli.config_dir)?;
            let state = gallery_service(&config)?.fetch()?;
            let gallery = view::GalleryView::build(&state);
            let gallery = match query {
                Some(q) => gallery.search(q),
                None => gallery,
            };
            if *json {
                println!("{}", serde_json::to_string_pretty(&gallery)?);
            } else {
                output::print_gallery_view(&gallery);
            }
        }
        Command::Hero => {
            let config = config::load_config(&cli.config_dir)?;
            let state = gallery_service(&config)?.fetch()?;
            output::print_hero(&view::hero_slides(&state), config.carousel.interval_ms);
        }
        Command::Check => {
            let config = config::load_config(&cli.config_dir)?;
            let service = gallery_service(&config)?;
            println!("==> Checking {}", service.endpoint());
            let state = service.fetch()?;
            output::print_check(&state);
        }
        command => run_admin(&cli, command)?,
    }

    Ok(())
}

/// Initialize logging to stderr; `EVENT_GAL_LOG` takes an `EnvFilter` directive.
fn init_tracing() {
    let env = std::env::var("EVENT_GAL_LOG").unwrap_or_else(|_| "warn".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn gallery_service(config: &GalleryConfig) -> CliResult<HttpGalleryService> {
    Ok(HttpGalleryService::new(
        &config.service.gallery_api,
        config.service.timeout(),
    )?)
}

/// Log in, load the gallery, and run one admin command with progress printed
/// from a separate thread.
fn run_admin(cli: &Cli, command: &Command) -> CliResult<()> {
    let config = config::load_config(&cli.config_dir)?;
    let username = cli
        .username
        .clone()
        .unwrap_or_else(|| config.admin.username.clone());
    let password = cli
        .password
        .as_deref()
        .ok_or("This command needs --password (or EVENT_GAL_PASSWORD)")?;
    let session = CredentialGate::from_config(&config.admin).login(&username, password)?;
    tracing::info!(username = session.username(), "Admin session started");

    let uploader = SignedUploader::new(
        &config.service.signature_api,
        &config.service.upload_host,
        config.service.timeout(),
    )?;
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_admin_event(&event) {
                println!("{}", line);
            }
        }
    });

    let mut workflow = AdminWorkflow::new(
        gallery_service(&config)?,
        uploader,
        session,
        config.uploads.clone(),
    )
    .with_events(tx);
    let result = match workflow.load().map(|_| ()) {
        Ok(()) => admin_command(&mut workflow, command),
        Err(e) => Err(e.into()),
    };
    // Dropping the workflow closes the channel so the printer can finish.
    drop(workflow);
    printer
        .join()
        .map_err(|_| "progress printer panicked")?;

    if let Some(report) = result? {
        for line in output::format_batch_failures(&report) {
            println!("{}", line);
        }
        if !report.is_complete() {
            return Err(format!(
                "{} of {} link(s) failed",
                report.failures.len(),
                report.total
            )
            .into());
        }
    }
    Ok(())
}

fn admin_command(
    workflow: &mut AdminWorkflow<HttpGalleryService, SignedUploader>,
    command: &Command,
) -> CliResult<Option<BatchReport>> {
    match command {
        Command::Create { name } => {
            workflow.create_folder(name)?;
        }
        Command::Upload { folder, paths } => {
            workflow.upload_images(folder, collect_files(paths)?)?;
        }
        Command::UploadHero { paths } => {
            workflow.upload_hero_images(collect_files(paths)?)?;
        }
        Command::Rename { folder, new_name } => {
            workflow.rename_folder(folder, new_name)?;
        }
        Command::DeleteFolder { folder, yes } => {
            let mut confirm = confirmer(*yes);
            report_deletion(workflow.delete_folder(folder, &mut confirm)?);
        }
        Command::AddVideo { folder, urls } => {
            return Ok(Some(workflow.add_video_links(folder, &urls.join("\n"))?));
        }
        Command::EditVideo {
            folder,
            position,
            url,
        } => {
            let index = usize::try_from(position - 1)?;
            workflow.edit_video_link(folder, index, url)?;
        }
        Command::DeleteItem {
            folder,
            url,
            hero,
            yes,
        } => {
            let target = if *hero {
                ItemTarget::Hero
            } else {
                ItemTarget::Folder(folder.clone().unwrap_or_default())
            };
            let mut confirm = confirmer(*yes);
            report_deletion(workflow.delete_item(&target, url.as_deref(), &mut confirm)?);
        }
        Command::List { .. }
        | Command::Hero
        | Command::Check
        | Command::Youtube { .. }
        | Command::GenConfig => {}
    }
    Ok(None)
}

fn report_deletion(outcome: Deletion) {
    if outcome == Deletion::Cancelled {
        println!("Cancelled");
    }
}

/// Confirmation source: `--yes` approves everything, otherwise ask on stdin.
fn confirmer(yes: bool) -> impl FnMut(&str) -> bool {
    move |prompt: &str| yes || ask(prompt)
}

fn ask(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    io::stdout().flush().ok();
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Read upload arguments. Directories are walked recursively in file name
/// order; the image allow-list is applied later by the workflow.
fn collect_files(paths: &[PathBuf]) -> CliResult<Vec<UploadFile>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                files.push(read_file(entry.path())?);
            }
        } else {
            files.push(read_file(path)?);
        }
    }
    Ok(files)
}

fn read_file(path: &Path) -> CliResult<UploadFile> {
    UploadFile::from_path(path)
        .map_err(|e| format!("Cannot read {}: {e}", path.display()).into())
}
