use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "geda", version, about = "GEDA CMS command-line client", long_about = None)]
pub struct Cli {
    /// Print human-friendly output instead of machine JSON
    #[arg(long, global = true)]
    pub human: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Session management against the CMS
    Auth(AuthArgs),
    /// API health probe
    Health(HealthArgs),
    /// Post management and bilingual markdown import
    Post(PostArgs),
    /// Category management
    Category(ResourceArgs),
    /// Tag management
    Tag(ResourceArgs),
    /// Page management
    Page(ResourceArgs),
    /// Product management
    Product(ResourceArgs),
    /// Site-wide settings
    Settings(SettingsArgs),
}

#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub action: AuthAction,
}

#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Log in and store the session profile
    Login {
        /// API base URL, e.g. https://cms.example.com
        #[arg(long)]
        base_url: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Device name recorded with the issued token
        #[arg(long, default_value = "geda-cli")]
        device: String,
        /// One-time password, when two-factor auth is enabled
        #[arg(long, default_value = "")]
        otp: String,
        #[arg(long, default_value = "")]
        recovery_code: String,
    },
    /// End the server session and remove the stored profile
    Logout,
    /// Show the authenticated user
    Whoami,
}

#[derive(Args, Debug)]
pub struct HealthArgs {
    #[command(subcommand)]
    pub action: HealthAction,
}

#[derive(Subcommand, Debug)]
pub enum HealthAction {
    /// Probe the API health endpoint
    Check {
        /// Base URL override; defaults to the stored profile
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct PostArgs {
    #[command(subcommand)]
    pub action: PostAction,
}

#[derive(Subcommand, Debug)]
pub enum PostAction {
    /// List posts with optional filters
    List(ListArgs),
    /// Fetch one post by slug
    Get {
        #[arg(long)]
        slug: String,
    },
    /// Delete one post by slug
    Delete {
        #[arg(long)]
        slug: String,
    },
    /// Create or update a post from a JSON payload file
    Upsert(UpsertArgs),
    /// Import a bilingual markdown pair as one post
    Import(ImportArgs),
    /// Upload an image with localized alt text
    UploadImage(UploadImageArgs),
}

#[derive(Args, Debug)]
pub struct ResourceArgs {
    #[command(subcommand)]
    pub action: ResourceAction,
}

#[derive(Subcommand, Debug)]
pub enum ResourceAction {
    /// List entries with optional filters
    List(ListArgs),
    /// Fetch one entry by slug
    Get {
        #[arg(long)]
        slug: String,
    },
    /// Delete one entry by slug
    Delete {
        #[arg(long)]
        slug: String,
    },
    /// Create or update an entry from a JSON payload file
    Upsert(UpsertArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Full-text search filter
    #[arg(long)]
    pub search: Option<String>,
    /// Status filter (draft, published, ...)
    #[arg(long)]
    pub status: Option<String>,
    /// Type filter, for resources that have one
    #[arg(long = "type")]
    pub type_filter: Option<String>,
    #[arg(long, default_value_t = 15)]
    pub per_page: u32,
}

#[derive(Args, Debug)]
pub struct UpsertArgs {
    /// JSON payload file
    #[arg(long)]
    pub file: PathBuf,
    /// Slug override; defaults to the payload's slug field
    #[arg(long)]
    pub slug: Option<String>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Vietnamese markdown file
    #[arg(long)]
    pub vi: PathBuf,
    /// English markdown file
    #[arg(long)]
    pub en: PathBuf,
    /// Update the post in place when the slug already exists
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub upsert: bool,
}

#[derive(Args, Debug)]
pub struct UploadImageArgs {
    /// Image file to upload
    #[arg(long)]
    pub file: PathBuf,
    /// Vietnamese alt text
    #[arg(long, default_value = "")]
    pub alt_vi: String,
    /// English alt text
    #[arg(long, default_value = "")]
    pub alt_en: String,
}

#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub action: SettingsAction,
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// List all settings
    List,
    /// Fetch one setting by key
    Get {
        #[arg(long)]
        key: String,
    },
    /// Write one setting; the value may be a JSON literal or a raw string
    Set {
        #[arg(long)]
        key: String,
        #[arg(long)]
        value: String,
    },
}
