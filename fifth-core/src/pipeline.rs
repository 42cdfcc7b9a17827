// The concurrent session: characters -> parser task -> phrase channel -> evaluator task
//
// ASYNC CONCEPT: Two tasks, one hand-off
// The parser task owns the CharStream; the evaluator task owns the
// ExecutionContext. The only thing they share is the bounded phrase channel
// (plus the error output, which is behind its own lock). When the character
// channel closes, the parser finishes and drops its sender, the evaluator
// drains what is left and returns the context.
//
// RUST LEARNING NOTES:
// - mpsc::channel(n) gives backpressure: the parser suspends while n phrases wait
// - JoinHandle<T> carries the task's return value back, here the final context
// - Shutdown lets both tasks stop early without waiting for input to end

use crate::config::SessionConfig;
use crate::context::ExecutionContext;
use crate::error::SessionError;
use crate::output::{SharedOutput, write_line};
use crate::parser::Parser;
use crate::phrase::Phrase;
use crate::shutdown::{self, Shutdown, ShutdownTrigger};
use crate::stream::CharSource;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// A running interpreter session. Must be created inside a tokio runtime.
pub struct Session {
    input: Option<mpsc::UnboundedSender<char>>,
    shutdown: ShutdownTrigger,
    parser: JoinHandle<usize>,
    evaluator: JoinHandle<ExecutionContext>,
}

impl Session {
    pub fn spawn(config: SessionConfig, errors: SharedOutput) -> Self {
        let ctx = ExecutionContext::with_limits(config.limits);
        Self::with_context(ctx, config, errors)
    }

    /// Start a session on a prepared context (e.g. with macros already defined).
    /// The context keeps its own limits.
    pub fn with_context(ctx: ExecutionContext, config: SessionConfig, errors: SharedOutput) -> Self {
        let (input, chars) = mpsc::unbounded_channel();
        let (shutdown, signal) = shutdown::channel();
        let (parser, evaluator) = spawn_pipeline(chars, ctx, config, errors, signal);

        Self {
            input: Some(input),
            shutdown,
            parser,
            evaluator,
        }
    }

    /// Send text to the parser. Returns false once input has been closed
    /// or the parser has stopped.
    pub fn feed(&self, text: &str) -> bool {
        let Some(input) = &self.input else {
            return false;
        };
        text.chars().all(|ch| input.send(ch).is_ok())
    }

    /// Signal end of input. Phrases already sent are still parsed and evaluated.
    pub fn close_input(&mut self) {
        self.input = None;
    }

    /// Stop both tasks as soon as possible, whether or not input is exhausted.
    pub fn cancel(&self) {
        self.shutdown.trigger();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Close input and wait for both tasks. Returns the final context.
    pub async fn finish(mut self) -> Result<ExecutionContext, SessionError> {
        self.close_input();
        let parsed = (&mut self.parser)
            .await
            .map_err(|source| SessionError::Task { task: "parser", source })?;
        let ctx = (&mut self.evaluator)
            .await
            .map_err(|source| SessionError::Task { task: "evaluator", source })?;
        debug!(parsed, depth = ctx.stack.len(), "session finished");
        Ok(ctx)
    }
}

// A dropped session stops its tasks instead of leaving them parked on input
impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Spawn the parser and evaluator tasks over any character source.
pub fn spawn_pipeline<S>(
    source: S,
    ctx: ExecutionContext,
    config: SessionConfig,
    errors: SharedOutput,
    shutdown: Shutdown,
) -> (JoinHandle<usize>, JoinHandle<ExecutionContext>)
where
    S: CharSource + 'static,
{
    let (phrases_tx, phrases_rx) = mpsc::channel(config.phrase_capacity.max(1));

    let parser = Parser::from_source(source, errors.clone());
    let parser = tokio::spawn(parser.run(phrases_tx, shutdown.clone()));
    let evaluator = tokio::spawn(evaluate_phrases(phrases_rx, ctx, errors, shutdown));

    (parser, evaluator)
}

/// The evaluator loop: evaluate phrases in arrival order until the channel is
/// closed and drained, or `shutdown` fires. Evaluation errors are reported and
/// the loop carries on.
pub async fn evaluate_phrases(
    mut phrases: mpsc::Receiver<Phrase>,
    mut ctx: ExecutionContext,
    errors: SharedOutput,
    mut shutdown: Shutdown,
) -> ExecutionContext {
    let mut evaluated = 0usize;
    debug!("evaluator started");

    loop {
        let next = tokio::select! {
            biased;
            _ = shutdown.triggered() => break,
            next = phrases.recv() => next,
        };
        let Some(phrase) = next else {
            break;
        };

        trace!(phrase = %phrase, "received");
        evaluated += 1;
        if let Err(err) = ctx.eval(&phrase) {
            debug!(error = %err, "evaluation error");
            if let Err(io_err) = write_line(&errors, &err.to_string()).await {
                warn!(error = %io_err, "failed to write evaluation error");
            }
        }
    }

    debug!(evaluated, "evaluator finished");
    ctx
}
