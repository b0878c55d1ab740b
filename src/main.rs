use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

use prowl_core::ProwlConfig;
use prowl_review::github::{parse_repo_reference, GitHubClient};
use prowl_review::llm::LlmClient;
use prowl_review::pipeline::PollingLoop;
use prowl_review::requester::ReviewRequester;

#[derive(Parser)]
#[command(
    name = "prowl",
    version,
    about = "Automated pull request reviewer",
    long_about = "Prowl watches a GitHub repository for new or updated pull requests,\n\
                   sends their diffs to an LLM, and posts the answer as a review comment.\n\n\
                   Examples:\n  \
                     prowl init                              Write a default .prowl.toml\n  \
                     prowl watch --repo octocat/hello-world  Review pull requests every 5 minutes\n  \
                     prowl once --dry-run                    Run one pass without posting"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (default: .prowl.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Poll for pull requests until the process is stopped
    #[command(long_about = "Poll for pull requests until the process is stopped.\n\n\
        Each pass lists open pull requests, reviews the ones that are new or were\n\
        updated since they were last seen, then sleeps for the polling interval.\n\
        Failures are logged and never stop the loop.\n\n\
        Examples:\n  prowl watch\n  prowl watch --repo octocat/hello-world --interval 60")]
    Watch {
        /// Repository to watch (owner/name), overrides [github] in the config
        #[arg(long)]
        repo: Option<String>,

        /// Seconds between passes (default: 300)
        #[arg(long)]
        interval: Option<u64>,

        /// Log reviews instead of posting them
        #[arg(long)]
        dry_run: bool,
    },
    /// Run a single review pass and print a summary
    Once {
        /// Repository to scan (owner/name), overrides [github] in the config
        #[arg(long)]
        repo: Option<String>,

        /// Log reviews instead of posting them
        #[arg(long)]
        dry_run: bool,
    },
    /// Create a default .prowl.toml in the current directory
    Init,
}

const DEFAULT_CONFIG: &str = r#"# Prowl Configuration

[github]
# owner = "octocat"
# repo = "hello-world"
# token = "ghp_..."                     # or set GITHUB_TOKEN
# api_base = "https://api.github.com"

[llm]
# model = "llama3-8b-8192"
# api_key = "..."                       # or set GROQ_API_KEY / OPENAI_API_KEY
# base_url = "https://api.groq.com/openai"

[poll]
# interval_secs = 300
# evict_closed = true
# dry_run = false
"#;

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    // tokens usually live in .env next to the config
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::Init = cli.command {
        return run_init(Path::new(".prowl.toml"));
    }

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Watch {
            ref repo,
            interval,
            dry_run,
        } => {
            apply_overrides(&mut config, repo.as_deref(), dry_run)?;
            if let Some(secs) = interval {
                config.poll.interval_secs = secs;
            }
            let mut polling = build_loop(&config)?;
            tracing::info!(
                repo = %polling.host().slug(),
                interval_secs = config.poll.interval_secs,
                "watching for pull requests"
            );
            polling.run_forever().await;
        }
        Command::Once { ref repo, dry_run } => {
            apply_overrides(&mut config, repo.as_deref(), dry_run)?;
            let mut polling = build_loop(&config)?;
            let report = polling.run_pass().await?;
            print!("{report}");
        }
        Command::Init => unreachable!(),
    }

    Ok(())
}

/// Debug for our own crates only; octocrab, hyper and reqwest stay at info.
const VERBOSE_FILTER: &str = "info,prowl=debug,prowl_review=debug,prowl_core=debug";

fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ProwlConfig> {
    let config = match path {
        Some(path) => ProwlConfig::from_file(path)?,
        None => {
            let default_path = Path::new(".prowl.toml");
            if default_path.exists() {
                ProwlConfig::from_file(default_path)?
            } else {
                ProwlConfig::default()
            }
        }
    };
    Ok(config)
}

fn apply_overrides(config: &mut ProwlConfig, repo: Option<&str>, dry_run: bool) -> Result<()> {
    if let Some(repo_ref) = repo {
        let (owner, name) = parse_repo_reference(repo_ref)?;
        config.github.owner = Some(owner);
        config.github.repo = Some(name);
    }
    if dry_run {
        config.poll.dry_run = true;
    }
    Ok(())
}

fn build_loop(config: &ProwlConfig) -> Result<PollingLoop<GitHubClient, LlmClient>> {
    config.poll.validate()?;
    let (owner, repo) = config.repository()?;
    let github = GitHubClient::new(&config.github, owner, repo)?;

    let llm = LlmClient::new(&config.llm)?;
    if !llm.has_api_key() {
        tracing::warn!("no completion API key configured; set GROQ_API_KEY or [llm] api_key");
    }
    let requester = ReviewRequester::new(llm, config.llm.model.clone());

    tracing::debug!(repo = %github.slug(), model = %config.llm.model, "clients ready");
    Ok(PollingLoop::new(github, requester, config.poll.clone()))
}

fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        miette::bail!(miette::miette!(
            help = "Remove the existing file or edit it directly",
            "{} already exists",
            path.display()
        ));
    }
    std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
    println!("Created {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn verbose_filter_keeps_dependencies_at_info() {
        let buffer = Buffer::default();
        let sink = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(log_filter(true))
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(target: "prowl_review::pipeline", "built review prompt");
            tracing::debug!(target: "prowl", "clients ready");
            tracing::debug!(target: "hyper::proto::h1", "flushed 512 bytes");
            tracing::debug!(target: "octocrab", "sending request");
            tracing::info!(target: "octocrab", "rate limit low");
        });

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("built review prompt"), "{output}");
        assert!(output.contains("clients ready"), "{output}");
        assert!(output.contains("rate limit low"), "{output}");
        assert!(!output.contains("flushed 512 bytes"), "{output}");
        assert!(!output.contains("sending request"), "{output}");
    }
}
