// Builtin instructions, consulted after macros and variables
//
// Stack shuffling words and `eval`. Every builtin checks its operands before
// touching the stack, so a failing builtin leaves the stack unchanged.

use crate::context::ExecutionContext;
use crate::error::EvalError;
use crate::phrase::Phrase;
use crate::queue::PhraseQueue;

/// What the evaluator should do after a builtin ran.
#[derive(Debug)]
pub enum Step {
    Done,
    // Evaluate these phrases next, before anything still pending
    Expand(PhraseQueue),
}

pub type BuiltinFn = fn(&mut ExecutionContext) -> Result<Step, EvalError>;

pub const NAMES: &[&str] = &["dup", "drop", "swap", "eval"];

pub fn lookup(name: &str) -> Option<BuiltinFn> {
    match name {
        "dup" => Some(dup_impl),
        "drop" => Some(drop_impl),
        "swap" => Some(swap_impl),
        "eval" => Some(eval_impl),
        _ => None,
    }
}

// Dup: ( a -- a a )
fn dup_impl(ctx: &mut ExecutionContext) -> Result<Step, EvalError> {
    let top = ctx
        .stack
        .peek()
        .map_err(|_| EvalError::Underflow { instruction: "dup", needed: 1 })?
        .clone();
    ctx.push(top);
    Ok(Step::Done)
}

// Drop: ( a -- )
fn drop_impl(ctx: &mut ExecutionContext) -> Result<Step, EvalError> {
    ctx.stack
        .pop()
        .map_err(|_| EvalError::Underflow { instruction: "drop", needed: 1 })?;
    Ok(Step::Done)
}

// Swap: ( a b -- b a )
fn swap_impl(ctx: &mut ExecutionContext) -> Result<Step, EvalError> {
    ctx.stack
        .swap_top()
        .map_err(|_| EvalError::Underflow { instruction: "swap", needed: 2 })?;
    Ok(Step::Done)
}

// Eval: ( [body] -- ... ) - run a quotation
fn eval_impl(ctx: &mut ExecutionContext) -> Result<Step, EvalError> {
    let Ok(Phrase::List(items)) = ctx.stack.peek() else {
        return Err(EvalError::TypeMismatch {
            instruction: "eval",
            expected: "a list",
        });
    };
    let body: PhraseQueue = items.iter().cloned().collect();
    ctx.pop()?;
    Ok(Step::Expand(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(name: &str, ctx: &mut ExecutionContext) -> Result<Step, EvalError> {
        let builtin = lookup(name).unwrap();
        builtin(ctx)
    }

    #[test]
    fn test_lookup_covers_names() {
        for name in NAMES {
            assert!(lookup(name).is_some(), "missing builtin {}", name);
        }
        assert!(lookup("add").is_none());
    }

    #[test]
    fn test_dup() {
        let mut ctx = ExecutionContext::new();
        ctx.push(Phrase::string("x"));
        run("dup", &mut ctx).unwrap();
        assert_eq!(ctx.stack.as_slice(), &[Phrase::string("x"), Phrase::string("x")]);
    }

    #[test]
    fn test_underflow_leaves_stack_alone() {
        let mut ctx = ExecutionContext::new();
        let err = run("dup", &mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "`dup` requires an operand");
        let err = run("drop", &mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "`drop` requires an operand");

        ctx.push(Phrase::integer(1));
        let err = run("swap", &mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "`swap` requires two operands");
        assert_eq!(ctx.stack.as_slice(), &[Phrase::integer(1)]);
    }

    #[test]
    fn test_eval_requires_list() {
        let mut ctx = ExecutionContext::new();
        assert!(matches!(
            run("eval", &mut ctx),
            Err(EvalError::TypeMismatch { instruction: "eval", .. })
        ));

        ctx.push(Phrase::integer(3));
        assert!(run("eval", &mut ctx).is_err());
        assert_eq!(ctx.stack.len(), 1);
    }

    #[test]
    fn test_eval_expands_list_in_order() {
        let mut ctx = ExecutionContext::new();
        ctx.push(Phrase::list([Phrase::integer(1), Phrase::integer(2)]));

        match run("eval", &mut ctx).unwrap() {
            Step::Expand(mut queue) => {
                assert_eq!(queue.dequeue(), Ok(Phrase::integer(1)));
                assert_eq!(queue.dequeue(), Ok(Phrase::integer(2)));
                assert!(queue.is_empty());
            }
            Step::Done => panic!("Expected an expansion"),
        }
        assert!(ctx.stack.is_empty());
    }
}
