//! Fifth CLI - command-line REPL and script runner
//!
//! This is a thin wrapper around fifth-core that builds the executable.
//! Input comes from a file, from piped stdin, or from an interactive prompt
//! when stdin is a terminal.

#[cfg(feature = "repl")]
mod repl;

use clap::Parser;
use fifth_core::{EvalLimits, ExecutionContext, Session, SessionConfig, StderrOutput, shared};
#[cfg(feature = "repl")]
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fifth", version, about = "Fifth stack language interpreter")]
struct Cli {
    /// Source file to run; reads stdin when omitted
    file: Option<PathBuf>,

    /// Phrases buffered between the parser and the evaluator
    #[arg(long, default_value_t = fifth_core::config::DEFAULT_PHRASE_CAPACITY)]
    phrase_capacity: usize,

    /// Maximum nesting of macro and quotation expansion
    #[arg(long, default_value_t = fifth_core::config::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Maximum evaluation steps per top-level phrase (0 for no limit)
    #[arg(long, default_value_t = fifth_core::config::DEFAULT_MAX_STEPS)]
    max_steps: u64,

    /// Do not print the final stack
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn session_config(&self) -> SessionConfig {
        let limits = EvalLimits {
            max_depth: self.max_depth,
            max_steps: (self.max_steps > 0).then_some(self.max_steps),
        };
        SessionConfig::default()
            .with_phrase_capacity(self.phrase_capacity)
            .with_limits(limits)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let config = cli.session_config();
    debug!(?config, "starting");

    let ctx = match &cli.file {
        Some(path) => run_file(path, config).await?,
        #[cfg(feature = "repl")]
        None if std::io::stdin().is_terminal() => return repl::run_repl(config).await,
        None => run_stdin(config).await?,
    };

    if !cli.quiet {
        println!("Stack: {}", ctx.stack);
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run_file(path: &Path, config: SessionConfig) -> Result<ExecutionContext, Box<dyn std::error::Error>> {
    let source = tokio::fs::read_to_string(path).await?;
    debug!(path = %path.display(), chars = source.len(), "running file");

    let session = Session::spawn(config, shared(StderrOutput::new()));
    feed_source(&session, &source);
    Ok(session.finish().await?)
}

// Piped input is streamed line by line, so phrases run as soon as they arrive
async fn run_stdin(config: SessionConfig) -> Result<ExecutionContext, Box<dyn std::error::Error>> {
    let session = Session::spawn(config, shared(StderrOutput::new()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if !feed_line(&session, &line) {
            break;
        }
    }
    Ok(session.finish().await?)
}

// Files and stdin both arrive as lines: `\n` and `\r\n` endings become `\n`
fn feed_source(session: &Session, source: &str) -> bool {
    source.lines().all(|line| feed_line(session, line))
}

fn feed_line(session: &Session, line: &str) -> bool {
    session.feed(line) && session.feed("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fifth_core::{BufferOutput, Phrase};

    #[tokio::test]
    async fn test_crlf_source_feeds_like_lf() {
        for source in ["\"a\"\r\n[b]\r\n", "\"a\"\n[b]\n", "\"a\"\n[b]"] {
            let errors = BufferOutput::new();
            let session = Session::spawn(SessionConfig::default(), shared(errors.clone()));
            assert!(feed_source(&session, source));

            let ctx = session.finish().await.unwrap();
            assert_eq!(
                ctx.stack.as_slice(),
                &[Phrase::string("a"), Phrase::list([Phrase::instruction("b")])]
            );
            assert_eq!(errors.contents(), "", "source {:?}", source);
        }
    }

    #[test]
    fn test_defaults_match_core() {
        let cli = Cli::parse_from(["fifth"]);
        let config = cli.session_config();
        assert_eq!(config, SessionConfig::default());
        assert!(cli.file.is_none());
        assert!(!cli.quiet);
    }

    #[test]
    fn test_zero_steps_disables_limit() {
        let cli = Cli::parse_from(["fifth", "--max-steps", "0", "--max-depth", "8", "prog.fifth"]);
        let config = cli.session_config();
        assert_eq!(config.limits.max_steps, None);
        assert_eq!(config.limits.max_depth, 8);
        assert_eq!(cli.file, Some(PathBuf::from("prog.fifth")));
    }

    #[test]
    fn test_phrase_capacity_is_clamped() {
        let cli = Cli::parse_from(["fifth", "--phrase-capacity", "0", "-q"]);
        assert_eq!(cli.session_config().phrase_capacity, 1);
        assert!(cli.quiet);
    }
}
