use chrono::{DateTime, Utc};
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use pdastore::config::StoreConfig;
use pdastore::drive::fs::FsDrive;
use pdastore::error::{Result, StoreError};
use pdastore::legacy::{migrate_legacy, SqliteLegacySource};
use pdastore::model::{NewRecord, Record, RecordPatch, RecordType, Visibility};
use pdastore::router;
use pdastore::slug::{normalize_url, to_slug};
use pdastore::store::RecordStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod args;
use args::{Cli, Commands};

const HOME_ENV: &str = "PDASTORE_HOME";
const TIME_WIDTH: usize = 16;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    store: RecordStore<FsDrive>,
    config: StoreConfig,
    data_dir: PathBuf,
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::List) | None => handle_list(&ctx).await,
        Some(Commands::Get { href }) => handle_get(&ctx, &href).await,
        Some(Commands::Add {
            href,
            title,
            description,
            public,
        }) => {
            let new = NewRecord {
                href,
                title,
                description,
                visibility: Visibility::from_public(public),
            };
            handle_add(&ctx, new).await
        }
        Some(Commands::Update {
            old_href,
            href,
            title,
            description,
            public,
            private,
        }) => {
            let visibility = match (public, private) {
                (true, _) => Some(Visibility::Public),
                (_, true) => Some(Visibility::Private),
                _ => None,
            };
            let patch = RecordPatch {
                href,
                title,
                description,
                visibility,
            };
            handle_update(&ctx, &old_href, patch).await
        }
        Some(Commands::Remove { href }) => handle_remove(&ctx, &href).await,
        Some(Commands::Migrate { db }) => handle_migrate(&ctx, db).await,
        Some(Commands::Slug { href }) => {
            handle_slug(&href);
            Ok(())
        }
        Some(Commands::Config { key, value }) => handle_config(&ctx, key, value),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "pdastore=debug" } else { "pdastore=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn data_dir(cli: &Cli) -> Result<PathBuf> {
    if let Some(home) = &cli.home {
        return Ok(home.clone());
    }
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("garden", "unwalled", "pdastore")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| StoreError::InvalidPath("could not determine data directory".into()))
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = data_dir(cli)?;
    let config = StoreConfig::load(&data_dir)?;
    let drive = Arc::new(FsDrive::new(config.drive_root(&data_dir)));
    Ok(AppContext {
        store: RecordStore::bookmarks(drive),
        config,
        data_dir,
    })
}

async fn handle_list(ctx: &AppContext) -> Result<()> {
    let mut records = ctx.store.list().await?;
    if records.is_empty() {
        println!("{}", "No bookmarks.".dimmed());
        return Ok(());
    }
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    for record in &records {
        print_record_line(record);
    }
    Ok(())
}

async fn handle_get(ctx: &AppContext, href: &str) -> Result<()> {
    match ctx.store.get(href).await? {
        Some(record) => print_record(&record, &ctx.store.path_of(&record)),
        None => println!("{} {}", "Not found:".yellow(), href),
    }
    Ok(())
}

async fn handle_add(ctx: &AppContext, new: NewRecord) -> Result<()> {
    let path = ctx.store.add(new).await?;
    println!("{} {}", "Added:".green(), path);
    Ok(())
}

async fn handle_update(ctx: &AppContext, old_href: &str, patch: RecordPatch) -> Result<()> {
    let path = ctx.store.update(old_href, patch).await?;
    println!("{} {}", "Saved:".green(), path);
    Ok(())
}

async fn handle_remove(ctx: &AppContext, href: &str) -> Result<()> {
    ctx.store.remove(href).await?;
    println!("{} {}", "Removed:".green(), href);
    Ok(())
}

async fn handle_migrate(ctx: &AppContext, db: Option<PathBuf>) -> Result<()> {
    let db = db.unwrap_or_else(|| ctx.config.legacy_db(&ctx.data_dir));
    let source = SqliteLegacySource::new(db.clone());
    let report = migrate_legacy(&ctx.store, &source).await?;
    println!(
        "{} {} migrated, {} skipped ({})",
        "Migration:".green(),
        report.migrated,
        report.skipped,
        db.display()
    );
    Ok(())
}

fn handle_slug(href: &str) {
    let record_type = RecordType::bookmark();
    let slug = to_slug(href);
    match normalize_url(href) {
        Ok(normalized) => println!("{:<12}{}", "normalized", normalized),
        Err(e) => println!("{:<12}{} ({})", "normalized", href, e.to_string().yellow()),
    }
    println!("{:<12}{}", "slug", slug);
    for path in router::resolve_both_paths(&record_type, &slug) {
        println!("{:<12}{}", Visibility::from_path(&path), path);
    }
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    match (key, value) {
        (None, _) => {
            println!("{:<12}{}", "data", ctx.data_dir.display());
            println!(
                "{:<12}{}",
                "drive_root",
                ctx.config.drive_root(&ctx.data_dir).display()
            );
            println!(
                "{:<12}{}",
                "legacy_db",
                ctx.config.legacy_db(&ctx.data_dir).display()
            );
        }
        (Some(key), None) => match ctx.config.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("{}", "(default)".dimmed()),
        },
        (Some(key), Some(value)) => {
            let mut config = ctx.config.clone();
            config.set(&key, &value)?;
            config.save(&ctx.data_dir)?;
            let shown = config.get(&key)?.unwrap_or_else(|| "(default)".to_string());
            println!("{} set to {}", key, shown);
        }
    }
    Ok(())
}

fn visibility_label(visibility: Visibility) -> ColoredString {
    match visibility {
        Visibility::Public => "public ".green(),
        Visibility::Private => "private".blue(),
    }
}

fn print_record_line(record: &Record) {
    let title = record.title.as_deref().unwrap_or("(untitled)");
    let age = record
        .created_at
        .map(format_time_ago)
        .unwrap_or_else(|| format!("{:>width$}", "", width = TIME_WIDTH));
    println!(
        "{} {} {} {}",
        visibility_label(record.visibility),
        age.dimmed(),
        title.bold(),
        record.href.dimmed()
    );
}

fn print_record(record: &Record, path: &str) {
    println!("{}", record.title.as_deref().unwrap_or("(untitled)").bold());
    println!("{:<12}{}", "href", record.href);
    if let Some(description) = &record.description {
        println!("{:<12}{}", "description", description);
    }
    println!("{:<12}{}", "visibility", visibility_label(record.visibility));
    if let Some(created) = record.created_at {
        println!("{:<12}{}", "created", created.to_rfc3339());
    }
    if let Some(updated) = record.updated_at {
        println!("{:<12}{}", "updated", updated.to_rfc3339());
    }
    println!("{:<12}{}", "path", path.dimmed());
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
