//! gid - Kommandozeile für git-id
//!
//! Jedes Kommando ruft genau eine Operation der Bibliothek auf und gibt
//! das Ergebnis als Text oder mit `--json` als JSON aus.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use git_id::store::{self, IdentityPaths};
use git_id::{Identity, PublicKeySummary, Settings};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "gid", version, about = "Generate, load, and fetch Ed25519 Git IDs")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a new identity at the specified path
    Generate {
        /// Private key path, the public key is written next to it as gid.pem
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,

        /// Overwrite an existing identity
        #[arg(short, long, action)]
        force: bool,
    },

    /// Load an existing identity from the specified path
    Load {
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },

    /// Fetch a public key from a GitHub repository
    Fetch {
        /// Repository handler, e.g. "user/repo"
        handler: String,

        /// Git ref the key is published on
        #[arg(long = "ref", value_name = "REF")]
        reference: Option<String>,

        /// Path of the public key inside the repository
        #[arg(long, value_name = "PATH")]
        key_path: Option<String>,
    },
}

// ============================================================================
// OUTPUT
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdentityOutput {
    private_key_path: PathBuf,
    public_key_path: PathBuf,
    #[serde(flatten)]
    public_key: PublicKeySummary,
}

impl IdentityOutput {
    fn new(path: &Path, identity: &Identity) -> Result<Self> {
        let paths = IdentityPaths::for_private_key(path);
        Ok(Self {
            private_key_path: paths.private_key().to_path_buf(),
            public_key_path: paths.public_key().to_path_buf(),
            public_key: PublicKeySummary::new(&identity.verifying_key())?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchOutput {
    url: String,
    #[serde(flatten)]
    public_key: PublicKeySummary,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// COMMANDS
// ============================================================================

fn generate(settings: &Settings, path: Option<PathBuf>, force: bool, json: bool) -> Result<()> {
    let path = resolve_identity_path(settings, path)?;
    let identity = store::create(&path, force)
        .with_context(|| format!("Error generating identity at {}", path.display()))?;

    let output = IdentityOutput::new(&path, &identity)?;
    if json {
        return print_json(&output);
    }

    println!("Identity generated.");
    println!("Public key: {}", output.public_key.public_key_hex);
    println!(
        "Publish {} as {} on ref {} to share it.",
        output.public_key_path.display(),
        settings.key_path,
        settings.default_ref
    );
    Ok(())
}

fn load(settings: &Settings, path: Option<PathBuf>, json: bool) -> Result<()> {
    let path = resolve_identity_path(settings, path)?;
    let identity = store::load(&path)
        .with_context(|| format!("Error loading identity from {}", path.display()))?;

    let output = IdentityOutput::new(&path, &identity)?;
    if json {
        return print_json(&output);
    }

    println!("Loaded identity.");
    println!("Public key: {}", output.public_key.public_key_hex);
    print!("{}", output.public_key.public_key_pem);
    Ok(())
}

fn fetch(
    settings: &Settings,
    handler: &str,
    reference: Option<String>,
    key_path: Option<String>,
    json: bool,
) -> Result<()> {
    let reference = reference.unwrap_or_else(|| settings.default_ref.clone());
    let key_path = key_path.unwrap_or_else(|| settings.key_path.clone());

    let fetcher = settings.fetcher()?;
    let url = fetcher.resolve_url(handler, &reference, &key_path)?;
    let verifying_key = fetcher
        .fetch_public_key(handler, &reference, &key_path)
        .with_context(|| format!("Error fetching public key of {handler}"))?;

    let output = FetchOutput {
        url: url.to_string(),
        public_key: PublicKeySummary::new(&verifying_key)?,
    };
    if json {
        return print_json(&output);
    }

    println!("Fetched public key: {}", output.public_key.public_key_hex);
    Ok(())
}

fn resolve_identity_path(settings: &Settings, path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => Ok(settings.identity_path()?),
    }
}

fn main() -> Result<()> {
    git_id::init_tracing();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Command::Generate { path, force } => generate(&settings, path, force, cli.json),
        Command::Load { path } => load(&settings, path, cli.json),
        Command::Fetch {
            handler,
            reference,
            key_path,
        } => fetch(&settings, &handler, reference, key_path, cli.json),
    }
}
