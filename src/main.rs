//! zub-pages - commit directories and publish their tip as static pages

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zubpages::ops::{commit, diff, log};
use zubpages::site::{
    build_index, build_site, BuildOptions, HtmlRenderer, OutputDir, RepoIndex, RepoStore, SiteInfo,
    DEFAULT_INDEX_TITLE,
};
use zubpages::{resolve_ref, Repo};

#[derive(Parser)]
#[command(name = "zub-pages")]
#[command(about = "incremental static pages for a content-addressed tree store")]
#[command(version)]
struct Cli {
    /// repository path
    #[arg(short, long, default_value = ".", env = "ZUB_PAGES_REPO")]
    repo: PathBuf,

    /// more logging, repeat for debug output
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// initialize a new repository
    Init {
        /// path to create repository at
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// commit a directory to a ref
    Commit {
        /// source directory to commit
        source: PathBuf,

        /// ref name to commit to
        #[arg(short = 'r', long)]
        ref_name: String,

        /// commit message
        #[arg(short, long)]
        message: Option<String>,

        /// author name
        #[arg(short, long)]
        author: Option<String>,
    },

    /// show commit log for a ref
    Log {
        /// ref to show log for
        ref_name: String,

        /// maximum number of commits to show
        #[arg(short = 'n', long)]
        max_count: Option<usize>,

        /// only commits touching this path
        #[arg(short, long)]
        path: Option<String>,
    },

    /// show differences between two refs
    Diff {
        /// first ref
        ref1: String,

        /// second ref
        ref2: String,
    },

    /// generate pages for the tip of the tracked ref
    Build {
        /// output directory
        #[arg(short, long, default_value = "./www")]
        dest: PathBuf,

        /// commits listed per page
        #[arg(short = 'c', long)]
        max_commits: Option<usize>,

        /// clone url shown in the page header
        #[arg(short = 'u', long)]
        clone_url: Option<String>,

        /// ref to publish
        #[arg(long = "ref")]
        tip: Option<String>,

        /// ignore the previous build and regenerate everything
        #[arg(short, long)]
        force: bool,
    },

    /// write one landing page listing several repositories
    Index {
        /// repositories to list
        #[arg(required = true)]
        repos: Vec<PathBuf>,

        /// output directory
        #[arg(short, long, default_value = "./www")]
        dest: PathBuf,

        /// page title
        #[arg(short, long, default_value = DEFAULT_INDEX_TITLE)]
        title: String,

        /// short description of the host
        #[arg(short = 's', long)]
        description: Option<String>,

        /// HTML file shown above the list, `-` for stdin
        #[arg(short, long)]
        readme: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins, otherwise -v raises the level
    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(match cli.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> zubpages::Result<()> {
    match cli.command {
        Commands::Init { path } => {
            Repo::init(&path)?;
            println!("initialized zub-pages repository at {}", path.display());
        }

        Commands::Commit {
            source,
            ref_name,
            message,
            author,
        } => {
            let repo = Repo::open(&cli.repo)?;
            let hash = commit(&repo, &source, &ref_name, message.as_deref(), author.as_deref())?;
            println!("{}", hash);
        }

        Commands::Log {
            ref_name,
            max_count,
            path,
        } => {
            let repo = Repo::open(&cli.repo)?;
            let start = resolve_ref(&repo, &ref_name)?;
            let limit = max_count.unwrap_or(repo.config().site.max_commits);
            let history = log(&repo, &start, path.as_deref(), limit)?;
            print!("{}", history);
        }

        Commands::Diff { ref1, ref2 } => {
            let repo = Repo::open(&cli.repo)?;
            for change in diff(&repo, &ref1, &ref2)? {
                println!("{}", change);
            }
        }

        Commands::Build {
            dest,
            max_commits,
            clone_url,
            tip,
            force,
        } => {
            let repo = Repo::open(&cli.repo)?;
            let config = &repo.config().site;

            let options = BuildOptions {
                max_commits: max_commits.unwrap_or(config.max_commits),
                force,
            };
            let tip = tip.unwrap_or_else(|| config.tip.clone());

            let mut site = SiteInfo::from_config(config, repo.path());
            if clone_url.is_some() {
                site.clone_url = clone_url;
            }
            let renderer = HtmlRenderer::new().with_readme_command(config.readme_command.clone());

            let store = RepoStore::new(&repo, tip);
            let out = OutputDir::create(&dest)?;
            let report = build_site(&store, &out, &renderer, &site, &options)?;

            println!(
                "{} build of {} into {}: {} generated, {} deleted",
                report.mode,
                report.tree.short(),
                out.root().display(),
                report.generated,
                report.deleted
            );
        }

        Commands::Index {
            repos,
            dest,
            title,
            description,
            readme,
        } => {
            let readme = readme.as_deref().map(read_readme).transpose()?;
            let index = RepoIndex::new(title)
                .with_description(description)
                .with_readme(readme)
                .load_repos(&repos)?;

            let out = OutputDir::create(&dest)?;
            build_index(&index, &out, &HtmlRenderer::new())?;
            println!(
                "indexed {} repositories into {}",
                index.repos.len(),
                out.root().display()
            );
        }
    }

    Ok(())
}

fn read_readme(path: &Path) -> zubpages::Result<String> {
    if path == Path::new("-") {
        let mut readme = String::new();
        io::stdin()
            .read_to_string(&mut readme)
            .map_err(|e| zubpages::Error::Io { path: "<stdin>".into(), source: e })?;
        Ok(readme)
    } else {
        fs::read_to_string(path).map_err(|e| zubpages::Error::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
