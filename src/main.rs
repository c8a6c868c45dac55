use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use cliptrail::clipboard_history::{
    decide_password, detect_content_type, skip_reason, ClipboardHistory, ContentType, EntryId,
    HistoryEntry, ListQuery, MemoryClipboard, Page, SortOrder, SqliteHistoryStore,
};
use cliptrail::config::{load_config, ConfigHandle};
use cliptrail::logging;

#[derive(Parser)]
#[command(name = "cliptrail")]
#[command(about = "Inspect and maintain the clipboard history database", long_about = None)]
struct Cli {
    /// Database file (default: ~/.cliptrail/db/clipboard-history.sqlite)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    /// Most recently copied or recalled first
    Accessed,
    /// Most recently created first
    Created,
}

impl From<SortArg> for SortOrder {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Accessed => SortOrder::LastAccessed,
            SortArg::Created => SortOrder::Created,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the most recent entries (pinned first)
    Recent {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Only entries of this type (text, image, file)
        #[arg(short = 't', long = "type")]
        content_type: Option<ContentType>,
        /// Override the configured ordering
        #[arg(long)]
        sort: Option<SortArg>,
    },
    /// Search entry previews
    Search {
        query: String,
        /// Treat the query as a regular expression
        #[arg(short, long)]
        regex: bool,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Pin an entry so retention never removes it
    Pin { id: String },
    /// Unpin an entry
    Unpin { id: String },
    /// Delete one entry
    Delete { id: String },
    /// Delete many entries at once
    Clear {
        /// Only entries of this type (text, image, file)
        #[arg(short = 't', long = "type")]
        content_type: Option<ContentType>,
        /// Delete pinned entries too
        #[arg(long)]
        include_pinned: bool,
    },
    /// Apply the retention policy now
    Cleanup,
    /// Show how a piece of text would be classified (reads stdin without TEXT)
    Classify { text: Option<String> },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init_with_filter("warn");

    if let Commands::Classify { text } = &cli.command {
        let text = match text {
            Some(text) => text.clone(),
            None => read_stdin()?,
        };
        return run_classify(&text, cli.json);
    }

    let history = open_history(cli.db.as_deref())?;

    match cli.command {
        Commands::Recent {
            limit,
            offset,
            content_type,
            sort,
        } => {
            let sort = sort
                .map(SortOrder::from)
                .unwrap_or_else(|| history.config().snapshot().get_sort_order());
            let entries = history.list(&ListQuery {
                page: Page::new(limit, offset),
                content_type,
                sort,
            })?;
            print_entries(&entries, cli.json)?;
        }
        Commands::Search {
            query,
            regex,
            limit,
            offset,
        } => {
            let entries = history.search(&query, regex, limit, offset)?;
            print_entries(&entries, cli.json)?;
        }
        Commands::Pin { id } => {
            history.pin(&EntryId::from(id.as_str()), true)?;
            println!("Pinned {}", id);
        }
        Commands::Unpin { id } => {
            history.pin(&EntryId::from(id.as_str()), false)?;
            println!("Unpinned {}", id);
        }
        Commands::Delete { id } => {
            history.delete(&EntryId::from(id.as_str()))?;
            println!("Deleted {}", id);
        }
        Commands::Clear {
            content_type,
            include_pinned,
        } => {
            let preserve_pinned = !include_pinned;
            let deleted = match content_type {
                Some(content_type) => history.clear_by_type(content_type, preserve_pinned)?,
                None => history.clear_all(preserve_pinned)?,
            };
            println!("Deleted {} entries", deleted);
        }
        Commands::Cleanup => {
            let report = history.run_cleanup()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Removed {} expired and {} overflow entries",
                    report.expired, report.overflow
                );
            }
        }
        Commands::Classify { .. } => {}
    }

    Ok(())
}

/// The CLI never touches the OS clipboard; recalls land in an in-memory one.
fn open_history(db: Option<&std::path::Path>) -> Result<ClipboardHistory> {
    let store = match db {
        Some(path) => SqliteHistoryStore::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?,
        None => SqliteHistoryStore::open_default().context("Failed to open default database")?,
    };

    let clipboard = Arc::new(MemoryClipboard::new());
    Ok(ClipboardHistory::new(
        clipboard.clone(),
        clipboard,
        Arc::new(store),
        ConfigHandle::new(load_config()),
    ))
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    Ok(text)
}

fn run_classify(text: &str, json: bool) -> Result<()> {
    let config = load_config();
    let skip = skip_reason(text, config.allows_password_like_content());
    let content_type = detect_content_type(text);
    let password = decide_password(text);

    if json {
        let value = serde_json::json!({
            "skip": skip.map(|r| r.as_str()),
            "contentType": content_type,
            "passwordLike": password.is_password_like(),
            "decidingRule": password.rule,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match skip {
        Some(reason) => println!("skip:          yes ({})", reason.as_str()),
        None => println!("skip:          no"),
    }
    println!("content type:  {}", content_type);
    println!(
        "password-like: {} (rule: {})",
        password.is_password_like(),
        password.rule.unwrap_or("none matched")
    );
    Ok(())
}

fn print_entries(entries: &[HistoryEntry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No entries");
        return Ok(());
    }

    for entry in entries {
        let preview: String = entry
            .preview
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        println!(
            "{} {} {:<5} {}  {}",
            entry.id,
            if entry.pinned { "*" } else { " " },
            entry.content_type,
            entry.last_accessed_at.format("%Y-%m-%d %H:%M"),
            preview
        );
    }
    Ok(())
}
