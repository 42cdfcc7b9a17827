use crate::config::EvalLimits;
use crate::error::EvalError;
use crate::evaluator;
use crate::namespace::Namespace;
use crate::phrase::Phrase;
use crate::stack::PhraseStack;

// RUST CONCEPT: The run-time state bundle
// One context lives for one evaluation session. The evaluator task owns it
// exclusively, so nothing in here needs a lock.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub stack: PhraseStack,
    pub namespace: Namespace,
    last_error: Option<EvalError>,
    limits: EvalLimits,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: EvalLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn limits(&self) -> EvalLimits {
        self.limits
    }

    /// Evaluate one phrase. A failure is also kept as the context's last error.
    pub fn eval(&mut self, phrase: &Phrase) -> Result<(), EvalError> {
        let result = evaluator::evaluate(phrase, self);
        if let Err(err) = &result {
            self.last_error = Some(err.clone());
        }
        result
    }

    pub fn last_error(&self) -> Option<&EvalError> {
        self.last_error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<EvalError> {
        self.last_error.take()
    }

    pub fn push(&mut self, phrase: Phrase) {
        self.stack.push(phrase);
    }

    pub fn pop(&mut self) -> Result<Phrase, EvalError> {
        Ok(self.stack.pop()?)
    }
}
