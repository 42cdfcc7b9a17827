// This module implements phrase evaluation against an ExecutionContext
//
// FIFTH EXECUTION MODEL (detailed):
// 1. Strings, integers, lists: push themselves onto the stack (lists are quotations)
// 2. Instructions: resolve in this order
//    a. macro table  -> evaluate the expansion, in order, against the same context
//    b. variables    -> push the bound value
//    c. builtins     -> dup, drop, swap, eval
//    d. otherwise    -> EvalError::UndefinedInstruction, nothing is pushed
//
// RUST CONCEPT: Explicit continuation stack instead of recursion
// Pending work is a stack of PhraseQueues. The front of the top queue runs next.
// An expansion pushes a new queue; a queue is dropped as soon as it is drained,
// before its last phrase executes, so an expansion in tail position reuses
// the depth of the one that produced it.

use crate::builtins::{self, Step};
use crate::context::ExecutionContext;
use crate::error::EvalError;
use crate::phrase::Phrase;
use crate::queue::PhraseQueue;
use std::sync::Arc;
use tracing::trace;

/// Evaluate one top-level phrase. A failure anywhere inside it, an `eval`
/// body or a macro expansion included, leaves the stack as it was before.
pub fn evaluate(phrase: &Phrase, ctx: &mut ExecutionContext) -> Result<(), EvalError> {
    // Only instructions can fail part-way; a literal fails before it pushes
    let snapshot = phrase.as_instruction().map(|_| ctx.stack.clone());
    let result = run(phrase, ctx);
    if let (Err(_), Some(stack)) = (&result, snapshot) {
        ctx.stack = stack;
    }
    result
}

fn run(phrase: &Phrase, ctx: &mut ExecutionContext) -> Result<(), EvalError> {
    let limits = ctx.limits();
    let mut pending: Vec<PhraseQueue> = Vec::new();
    let mut steps: u64 = 0;

    let mut initial = PhraseQueue::new();
    initial.enqueue(phrase.clone());
    pending.push(initial);

    while let Some(queue) = pending.last_mut() {
        let next = queue.dequeue();
        if queue.is_empty() {
            pending.pop();
        }
        let Ok(phrase) = next else {
            continue;
        };

        steps += 1;
        if let Some(max) = limits.max_steps
            && steps > max
        {
            return Err(EvalError::StepLimitExceeded(max));
        }

        trace!(phrase = %phrase, depth = pending.len(), "evaluating");

        let expansion = if let Phrase::Instruction(name) = &phrase {
            resolve_instruction(name, ctx)?
        } else {
            ctx.push(phrase);
            None
        };

        if let Some(queue) = expansion {
            if queue.is_empty() {
                continue;
            }
            if pending.len() >= limits.max_depth {
                return Err(EvalError::ExpansionTooDeep(limits.max_depth));
            }
            pending.push(queue);
        }
    }

    Ok(())
}

// Returns the phrases to evaluate next, if the instruction expands
fn resolve_instruction(
    name: &Arc<str>,
    ctx: &mut ExecutionContext,
) -> Result<Option<PhraseQueue>, EvalError> {
    if let Some(expansion) = ctx.namespace.macro_expansion(name) {
        return Ok(Some(expansion.iter().cloned().collect()));
    }

    if let Some(value) = ctx.namespace.var(name) {
        let value = value.clone();
        ctx.push(value);
        return Ok(None);
    }

    if let Some(builtin) = builtins::lookup(name) {
        return match builtin(ctx)? {
            Step::Done => Ok(None),
            Step::Expand(queue) => Ok(Some(queue)),
        };
    }

    Err(EvalError::UndefinedInstruction(name.to_string()))
}
