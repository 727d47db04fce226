//! prflow CLI - Command line interface for prflow
//!
//! Commit pending changes in a checkout and open a pull request for them.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use prflow_core::{CliOverrides, Config, Secrets, Settings};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{PublishArgs, SyncArgs};

/// prflow: publish local changes as a GitHub pull request
#[derive(Parser, Debug)]
#[command(name = "prflow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.config/prflow/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Repository URL (overrides config and env)
    #[arg(long, global = true)]
    repo: Option<String>,

    /// Directory holding the checkout (overrides config and env)
    #[arg(long, global = true)]
    workdir: Option<PathBuf>,

    /// SSH private key for clone, pull and push (overrides config and env)
    #[arg(long, global = true)]
    ssh_key: Option<PathBuf>,

    /// Reviewer to request; repeat for several (overrides config and env)
    #[arg(long = "reviewer", global = true)]
    reviewers: Vec<String>,

    /// Branch pull requests target (overrides config and env)
    #[arg(long, global = true)]
    default_branch: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Clone or update the checkout and switch to the default branch
    Sync(SyncArgs),

    /// Commit pending changes on a new branch and open a pull request
    #[command(visible_alias = "pr")]
    Publish(PublishArgs),

    /// Show current configuration
    Config,

    /// Create a secrets file template
    InitSecrets,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            repo: self.repo.clone(),
            working_dir: self.workdir.clone(),
            ssh_key: self.ssh_key.clone(),
            reviewers: self.reviewers.clone(),
            default_branch: self.default_branch.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match run(cli).await {
        Ok(code) => exit_code(code),
        Err(err) => {
            report(&err);
            exit_code(error_exit_code(&err))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = Config::load_with_overrides(cli.config.as_deref(), cli.overrides())?;

    if cli.verbose {
        tracing::info!(?config, "Configuration loaded");
    }

    match &cli.command {
        Some(Commands::Version) => {
            println!("prflow {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Sync(args)) => {
            let settings = Settings::resolve(&config, &Secrets::load()?)?;
            return args.execute(settings);
        }
        Some(Commands::Publish(args)) => {
            let settings = Settings::resolve(&config, &Secrets::load()?)?;
            return args.execute(settings).await;
        }
        Some(Commands::Config) => print_config(&config, cli.config.as_deref()),
        Some(Commands::InitSecrets) => {
            let path = Secrets::create_template()?;
            println!("Created secrets template at {}", path.display());
        }
        None => {
            println!("prflow - publish local changes as a GitHub pull request");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(0)
}

fn print_config(config: &Config, path: Option<&std::path::Path>) {
    let repo = &config.repository;
    let token_source = match Secrets::load() {
        Ok(secrets) => secrets
            .token_source()
            .map(|source| source.to_string())
            .unwrap_or_else(|| "(not set)".to_string()),
        Err(_) => "(secrets file unreadable)".to_string(),
    };

    println!("prflow Configuration");
    println!("====================");
    println!();
    println!("Repository:");
    println!("  url: {}", repo.url.as_deref().unwrap_or("(not set)"));
    println!(
        "  working_dir: {}",
        repo.working_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!("  checkout_dir: {}", repo.checkout_dir);
    println!("  default_branch: {}", repo.default_branch);
    println!(
        "  ssh_key: {}",
        repo.ssh_key
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!();
    println!("Review:");
    if config.review.reviewers.is_empty() {
        println!("  reviewers: (none)");
    } else {
        println!("  reviewers: {}", config.review.reviewers.join(", "));
    }
    println!();
    println!("GitHub:");
    println!("  api_url: {}", config.github.api_url);
    println!("  token: {}", token_source);
    println!();

    let path = path.map(|p| p.to_path_buf()).or_else(Config::default_config_path);
    if let Some(path) = path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}

/// Print a failure the way the user needs to see it
fn report(err: &anyhow::Error) {
    eprintln!("{}", render_error(err));
}

/// A failed command shows its captured output; anything else its error chain
fn render_error(err: &anyhow::Error) -> String {
    let core = err
        .downcast_ref::<prflow_core::Error>()
        .or_else(|| match err.downcast_ref::<prflow_github::Error>() {
            Some(prflow_github::Error::Core(e)) => Some(e),
            _ => None,
        });

    match core {
        Some(prflow_core::Error::Command {
            command,
            stdout,
            stderr,
            ..
        }) => {
            let mut lines = vec![format!("ERROR: '{}'", command)];
            lines.extend(
                [stdout, stderr]
                    .into_iter()
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| s.trim_end().to_string()),
            );
            lines.join("\n")
        }
        _ => format!("ERROR: {:#}", err),
    }
}

fn error_exit_code(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<prflow_core::Error>() {
        return e.exit_code();
    }
    if let Some(e) = err.downcast_ref::<prflow_github::Error>() {
        return e.exit_code();
    }
    1
}

fn exit_code(code: i32) -> ExitCode {
    // Exit statuses are a single byte on Unix
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_publish() {
        let cli = Cli::parse_from([
            "prflow",
            "--reviewer",
            "alice",
            "--reviewer",
            "bob",
            "publish",
            "feature-x",
            "--title",
            "T",
            "--body",
            "B",
        ]);

        assert_eq!(cli.reviewers, vec!["alice", "bob"]);
        match cli.command {
            Some(Commands::Publish(args)) => {
                assert_eq!(args.branch, "feature-x");
                assert_eq!(args.title, "T");
                assert_eq!(args.body, "B");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_overrides_from_flags() {
        let cli = Cli::parse_from([
            "prflow",
            "sync",
            "--repo",
            "octo/site",
            "--workdir",
            "/srv",
            "--default-branch",
            "main",
        ]);
        let overrides = cli.overrides();
        assert_eq!(overrides.repo.as_deref(), Some("octo/site"));
        assert_eq!(overrides.working_dir, Some(PathBuf::from("/srv")));
        assert_eq!(overrides.default_branch.as_deref(), Some("main"));
        assert!(overrides.reviewers.is_empty());
    }

    #[test]
    fn test_error_exit_code() {
        let err = anyhow::Error::from(prflow_core::Error::Command {
            command: "git pull".to_string(),
            code: 128,
            stdout: String::new(),
            stderr: String::new(),
        });
        assert_eq!(error_exit_code(&err), 128);

        let err = anyhow::Error::from(prflow_github::Error::Core(prflow_core::Error::Command {
            command: "git push".to_string(),
            code: 2,
            stdout: String::new(),
            stderr: String::new(),
        }));
        assert_eq!(error_exit_code(&err), 2);

        assert_eq!(error_exit_code(&anyhow::anyhow!("other")), 1);
    }

    #[test]
    fn test_render_command_error_skips_empty_streams() {
        let err = anyhow::Error::from(prflow_core::Error::Command {
            command: "git push --set-upstream origin feature-x".to_string(),
            code: 1,
            stdout: String::new(),
            stderr: "fatal: rejected\n".to_string(),
        });
        assert_eq!(
            render_error(&err),
            "ERROR: 'git push --set-upstream origin feature-x'\nfatal: rejected"
        );

        let err = anyhow::Error::from(prflow_github::Error::Core(prflow_core::Error::Command {
            command: "git pull".to_string(),
            code: 1,
            stdout: "out\n".to_string(),
            stderr: "err\n".to_string(),
        }));
        assert_eq!(render_error(&err), "ERROR: 'git pull'\nout\nerr");
    }
}
