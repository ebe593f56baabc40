use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use git_revisions::config::Config;
use git_revisions::document::{ContentKind, Document, format_date, timestamp_to_date};
use git_revisions::git::{RepositoryLocator, RevisionStore};
use git_revisions::host::{FileSystemWriter, PassthroughReader};
use git_revisions::paths::repository_file_path;
use git_revisions::plugin::RevisionPlugin;
use git_revisions::revisions::revision_output_paths;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "git-revisions", version, about = "Historical revision pages from git history")]
struct Cli {
    /// Config file (defaults to $GIT_REVISIONS_CONFIG, then ./revisions.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the revisions a document would get
    Plan {
        /// Source file of the live document
        file: PathBuf,
        /// URL of the live document
        #[arg(long)]
        url: String,
        /// Output path of the live document
        #[arg(long)]
        save_as: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write the raw content of every historical revision
    Extract {
        file: PathBuf,
        #[arg(long)]
        url: String,
        #[arg(long)]
        save_as: String,
        /// Output directory (defaults to site.output_path)
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = KindArg::Article)]
        kind: KindArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Article,
    Page,
}

impl From<KindArg> for ContentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Article => ContentKind::Article,
            KindArg::Page => ContentKind::Page,
        }
    }
}

#[derive(Serialize)]
struct PlanEntry {
    hash: String,
    authored: String,
    author: String,
    summary: String,
    save_as: String,
    url: String,
}

fn plan(config: &Config, file: &Path, url: &str, save_as: &str) -> Result<Vec<PlanEntry>> {
    let directory = file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let repository = RepositoryLocator::new()
        .locate(directory)
        .with_context(|| format!("No git repository encloses {}", file.display()))?;
    let tracked_path = repository_file_path(repository.working_dir(), file)
        .with_context(|| format!("{} is outside the repository", file.display()))?;

    let commits = repository.history_for(&tracked_path)?;
    let mut entries = Vec::with_capacity(commits.len());
    for commit in commits {
        let (revision_save_as, revision_url) = revision_output_paths(save_as, url, &commit.hash);
        let authored = timestamp_to_date(commit.authored_timestamp, config.revisions.use_utc)
            .context("Commit timestamp out of range")?;
        entries.push(PlanEntry {
            authored: format_date(&authored, "%Y-%m-%d %H:%M:%S")?,
            hash: commit.hash,
            author: commit.author_name,
            summary: commit.summary,
            save_as: revision_save_as,
            url: revision_url,
        });
    }
    Ok(entries)
}

fn main() -> Result<()> {
    // Logs go to stderr so `plan --json` output stays parseable
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env_overrides();
            config.validate()?;
            config
        }
        None => Config::new()?,
    };

    match cli.command {
        Command::Plan {
            file,
            url,
            save_as,
            json,
        } => {
            let entries = plan(&config, &file, &url, &save_as)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("{} has no history", file.display());
            } else {
                for entry in &entries {
                    println!(
                        "{}  {}  {}  {}",
                        &entry.hash[..entry.hash.len().min(10)],
                        entry.authored,
                        entry.save_as,
                        entry.summary
                    );
                }
            }
        }
        Command::Extract {
            file,
            url,
            save_as,
            output,
            kind,
        } => {
            let kind = ContentKind::from(kind);
            let output = output.unwrap_or_else(|| config.site.output_path.clone());
            let date_format = config.site.date_format.clone();
            let mut plugin = RevisionPlugin::new(config);

            let mut documents =
                vec![Document::new(kind, file, url, save_as).with_date_format(date_format)];
            let report =
                plugin.process_documents(&mut documents, &PassthroughReader, &Value::Null)?;
            if let Some(failure) = report.failures.into_iter().next() {
                return Err(anyhow::Error::new(failure.error).context(format!(
                    "Failed to build revisions of {}",
                    failure.source_path.display()
                )));
            }

            let mut writer = FileSystemWriter::new(output);
            let written = plugin.publish(kind, &documents, &mut writer, &Value::Null)?;
            for path in writer.written() {
                println!("{}", path.display());
            }
            tracing::info!("Wrote {} revisions", written);
        }
    }

    Ok(())
}
