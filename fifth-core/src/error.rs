// Error types for every layer of the interpreter
//
// RUST CONCEPT: One enum per failure domain
// Container errors come back from the stack and queue, parse errors go to the
// error side channel, eval errors come back from evaluation, and session errors
// only happen when a task dies.

use thiserror::Error;

/// Access to an empty container. The container is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("stack is empty")]
    StackEmpty,

    #[error("queue is empty")]
    QueueEmpty,
}

/// Recoverable syntax errors. The `Display` text is the exact line written
/// to the error side channel (without the trailing newline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected character '{0}' in input")]
    UnexpectedCharacter(char),

    #[error("unexpected end of input, expecting ]")]
    UnterminatedList,

    #[error("unexpected end of input, expecting \"")]
    UnterminatedString,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("undefined instruction '{0}'")]
    UndefinedInstruction(String),

    #[error("`{instruction}` requires {}", operand_count(.needed))]
    Underflow {
        instruction: &'static str,
        needed: usize,
    },

    #[error("`{instruction}` requires {expected}")]
    TypeMismatch {
        instruction: &'static str,
        expected: &'static str,
    },

    #[error("expansion nested deeper than {0} levels")]
    ExpansionTooDeep(usize),

    #[error("evaluation exceeded {0} steps")]
    StepLimitExceeded(u64),
}

fn operand_count(needed: &usize) -> String {
    match *needed {
        1 => "an operand".to_string(),
        2 => "two operands".to_string(),
        n => format!("{} operands", n),
    }
}

/// A pipeline task stopped abnormally (panicked or was aborted).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{task} task failed: {source}")]
    Task {
        task: &'static str,
        #[source]
        source: tokio::task::JoinError,
    },
}
