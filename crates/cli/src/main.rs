//! credstore - command-line front end for the document store
//!
//! Both persistence tiers live under `--data-dir`, so a login survives
//! between invocations. Output is JSON for listings and plain text for
//! acknowledgements.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use credstore_core::{
    AuthorityKind, DocumentCategory, EventDraft, EventId, FileId, FileUpload, ReviewDecision,
    UserId, UserProfile,
};
use credstore_engine::{DocumentStore, StoreConfig};

/// credstore - reactive credential document store
#[derive(Parser, Debug)]
#[command(name = "credstore")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding snapshots and the session
    #[arg(long, default_value = ".credstore")]
    data_dir: PathBuf,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    // === Profiles and session ===
    /// Register (or overwrite) a user profile
    Register {
        /// User id
        id: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Email address
        #[arg(long)]
        email: String,
        /// Date of birth
        #[arg(long)]
        dob: String,
        /// Password
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in as a user
    Login {
        /// User id
        id: String,
        /// Password; omit to skip the check
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Log out
    Logout,

    /// Show the logged-in profile
    Whoami,

    /// Overwrite the password of the user with this email
    ResetPassword {
        /// Email address
        email: String,
        /// New password
        #[arg(long)]
        password: String,
    },

    // === Documents ===
    /// Upload a document as the logged-in user
    Upload {
        /// certificates, internship, gradesheets or projects
        category: DocumentCategory,
        /// File to upload
        path: PathBuf,
    },

    /// Issue a verified document to a student
    Issue {
        /// Acting authority kind
        #[arg(long = "as", default_value = "admin")]
        authority: AuthorityKind,
        /// Recipient user id
        user: String,
        /// Target collection
        category: DocumentCategory,
        /// PDF to issue
        path: PathBuf,
        /// Event key (certificates) or signature
        #[arg(long)]
        key: String,
    },

    /// List documents
    Files {
        /// User id; defaults to the logged-in user
        #[arg(long)]
        user: Option<String>,
        /// Limit to one collection
        #[arg(long)]
        category: Option<DocumentCategory>,
    },

    /// Remove one of the logged-in user's documents
    Remove {
        /// Collection
        category: DocumentCategory,
        /// Document id
        id: String,
    },

    /// Approve or reject a pending document
    Review {
        /// Acting authority kind
        #[arg(long = "as", default_value = "faculty")]
        authority: AuthorityKind,
        /// Owner user id
        user: String,
        /// Collection
        category: DocumentCategory,
        /// Document id
        id: String,
        /// approve or reject
        decision: ReviewDecision,
    },

    // === Notifications ===
    /// List notifications, newest first
    Notifications {
        /// User id; defaults to the logged-in user
        #[arg(long)]
        user: Option<String>,
    },

    /// Mark every notification as read
    ReadAll {
        /// User id; defaults to the logged-in user
        #[arg(long)]
        user: Option<String>,
    },

    // === Events ===
    /// Event management
    #[command(subcommand)]
    Event(EventCommands),

    /// Store-wide counts
    Stats,
}

#[derive(Subcommand, Debug)]
enum EventCommands {
    /// Register an event
    Add {
        /// Acting authority kind
        #[arg(long = "as", default_value = "event_organizer")]
        authority: AuthorityKind,
        /// Event name
        #[arg(long)]
        name: String,
        /// Start (RFC 3339)
        #[arg(long)]
        start: DateTime<Utc>,
        /// End (RFC 3339)
        #[arg(long)]
        end: DateTime<Utc>,
        /// Verification key
        #[arg(long)]
        key: String,
        /// Organizing body
        #[arg(long)]
        organizer: String,
        /// External link
        #[arg(long)]
        link: String,
    },

    /// List events
    #[command(alias = "ls")]
    List,

    /// Delete an event
    Remove {
        /// Acting authority kind
        #[arg(long = "as", default_value = "admin")]
        authority: AuthorityKind,
        /// Event id
        id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(&cli.data_dir)?;
    let store = DocumentStore::open(&config)
        .with_context(|| format!("failed to open store at {}", cli.data_dir.display()))?;
    tracing::debug!(target: "credstore::cli", ?config, "Store opened");

    run(&store, cli.command)
}

/// Config from `<data_dir>/credstore.toml`, falling back to defaults
fn load_config(data_dir: &Path) -> Result<StoreConfig> {
    let path = data_dir.join(StoreConfig::FILE_NAME);
    let mut config = if path.exists() {
        StoreConfig::from_file(&path)?
    } else {
        StoreConfig::default()
    };
    if config.data_dir.is_none() {
        config.data_dir = Some(data_dir.to_path_buf());
    }
    Ok(config)
}

fn run(store: &DocumentStore, command: Commands) -> Result<()> {
    match command {
        Commands::Register {
            id,
            name,
            email,
            dob,
            password,
        } => {
            let mut profile = UserProfile::new(id.as_str(), name, email, dob);
            if let Some(password) = password {
                profile = profile.with_password(password);
            }
            store.register_user(profile);
            println!("registered {}", id);
        }
        Commands::Login { id, password } => {
            let id = UserId::new(id);
            store.set_current_user(&id, password.as_deref())?;
            println!("logged in as {}", id);
        }
        Commands::Logout => {
            store.logout_user();
            println!("logged out");
        }
        Commands::Whoami => match store.current_user_profile() {
            Some(profile) => print_json(&profile)?,
            None => bail!("no user is logged in"),
        },
        Commands::ResetPassword { email, password } => {
            store.update_user_password(&email, &password)?;
            println!("password updated for {}", email);
        }
        Commands::Upload { category, path } => {
            let upload = read_upload(&path)?;
            let id = store.add_file(category, upload)?;
            println!("{}", id);
        }
        Commands::Issue {
            authority,
            user,
            category,
            path,
            key,
        } => {
            let upload = read_upload(&path)?;
            let id = store.issue_verified_document(
                &authority.role(),
                &UserId::new(user),
                category,
                upload,
                &key,
            )?;
            println!("{}", id);
        }
        Commands::Files { user, category } => {
            let user = resolve_user(store, user)?;
            match category {
                Some(category) => print_json(&store.files(&user, category))?,
                None => print_json(&store.documents_by_category(&user))?,
            }
        }
        Commands::Remove { category, id } => match store.remove_file(category, &FileId::new(id))? {
            Some(file) => println!("removed {}", file.name),
            None => bail!("no such document in {}", category),
        },
        Commands::Review {
            authority,
            user,
            category,
            id,
            decision,
        } => {
            store.review_file_as(
                &authority.role(),
                &UserId::new(user),
                category,
                &FileId::new(id),
                decision,
            )?;
            println!("{}", decision.target_status());
        }
        Commands::Notifications { user } => {
            let user = resolve_user(store, user)?;
            print_json(&store.notifications(&user))?;
        }
        Commands::ReadAll { user } => {
            let user = resolve_user(store, user)?;
            let flipped = store.mark_notifications_as_read(&user)?;
            println!("{} marked read", flipped);
        }
        Commands::Event(command) => run_event(store, command)?,
        Commands::Stats => print_json(&store.stats())?,
    }
    Ok(())
}

fn run_event(store: &DocumentStore, command: EventCommands) -> Result<()> {
    match command {
        EventCommands::Add {
            authority,
            name,
            start,
            end,
            key,
            organizer,
            link,
        } => {
            let draft = EventDraft {
                name,
                start_date: start,
                end_date: end,
                key,
                organizer,
                devops_link: link,
            };
            let event = store.add_event_as(&authority.role(), draft)?;
            println!("{}", event.id);
        }
        EventCommands::List => print_json(&store.events())?,
        EventCommands::Remove { authority, id } => {
            let event = store.remove_event_as(&authority.role(), &EventId::new(id))?;
            println!("removed {}", event.key);
        }
    }
    Ok(())
}

fn resolve_user(store: &DocumentStore, user: Option<String>) -> Result<UserId> {
    match user.map(UserId::new).or_else(|| store.current_user_id()) {
        Some(id) => Ok(id),
        None => bail!("no user given and no user is logged in"),
    }
}

fn read_upload(path: &Path) -> Result<FileUpload> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
        Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
        Some(ext) if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    };
    Ok(FileUpload::new(name, content_type, bytes))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
