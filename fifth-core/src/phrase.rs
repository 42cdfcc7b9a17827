// This module defines the Phrase type - the unit of parsed syntax and of evaluation
//
// FIFTH EXECUTION MODEL:
// - Strings ("hello"): Push themselves onto the stack
// - Integers: Push themselves onto the stack
// - Lists ([one two]): Push themselves onto the stack as data (quotations)
// - Instructions (dup, my-word): Resolve through the namespace and execute
//
// RUST LEARNING NOTES:
// - The variant set is closed by the grammar, so a plain enum with exhaustive
//   `match` replaces dynamic dispatch
// - Arc<str> and Arc<[Phrase]> make clones cheap and keep phrases Send, which the
//   parser -> evaluator channel requires
// - Lists nest as deep as the input does, so nothing here walks a phrase by
//   recursion: Drop, PartialEq, Display and Debug all keep their own work stack

use crate::context::ExecutionContext;
use crate::error::EvalError;
use num_bigint::BigInt;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub enum Phrase {
    String(Arc<str>),
    Integer(BigInt),
    Instruction(Arc<str>),
    List(Arc<[Phrase]>),
}

impl Phrase {
    pub fn string(text: impl Into<Arc<str>>) -> Self {
        Phrase::String(text.into())
    }

    pub fn integer(value: impl Into<BigInt>) -> Self {
        Phrase::Integer(value.into())
    }

    pub fn instruction(name: impl Into<Arc<str>>) -> Self {
        Phrase::Instruction(name.into())
    }

    pub fn list(items: impl IntoIterator<Item = Phrase>) -> Self {
        Phrase::List(items.into_iter().collect())
    }

    /// Evaluate this phrase against `ctx`. See `evaluator::evaluate`.
    pub fn eval(&self, ctx: &mut ExecutionContext) -> Result<(), EvalError> {
        ctx.eval(self)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Phrase::List(_))
    }

    pub fn as_instruction(&self) -> Option<&str> {
        match self {
            Phrase::Instruction(name) => Some(name),
            _ => None,
        }
    }

    /// Write the phrase in source syntax, with `leaf` rendering every
    /// non-list phrase.
    fn write_nested(
        &self,
        f: &mut fmt::Formatter<'_>,
        leaf: fn(&Phrase, &mut fmt::Formatter<'_>) -> fmt::Result,
    ) -> fmt::Result {
        enum Token<'a> {
            Item(&'a Phrase),
            Space,
            Close,
        }

        let mut pending = vec![Token::Item(self)];
        while let Some(token) = pending.pop() {
            match token {
                Token::Space => f.write_str(" ")?,
                Token::Close => f.write_str("]")?,
                Token::Item(Phrase::List(items)) => {
                    f.write_str("[")?;
                    pending.push(Token::Close);
                    // Reversed so the first item is popped first
                    for (i, item) in items.iter().enumerate().rev() {
                        pending.push(Token::Item(item));
                        if i > 0 {
                            pending.push(Token::Space);
                        }
                    }
                }
                Token::Item(phrase) => leaf(phrase, f)?,
            }
        }
        Ok(())
    }
}

// RUST CONCEPT: Structural equality without recursion
// Content equality for every variant; lists compare element-wise and in order.
// Pairs still to compare wait on a heap stack instead of the call stack.
impl PartialEq for Phrase {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (Phrase::String(a), Phrase::String(b))
                | (Phrase::Instruction(a), Phrase::Instruction(b)) => {
                    if a != b {
                        return false;
                    }
                }
                (Phrase::Integer(a), Phrase::Integer(b)) => {
                    if a != b {
                        return false;
                    }
                }
                (Phrase::List(a), Phrase::List(b)) => {
                    if Arc::ptr_eq(a, b) {
                        continue;
                    }
                    if a.len() != b.len() {
                        return false;
                    }
                    pending.extend(a.iter().zip(b.iter()));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Eq for Phrase {}

// RUST CONCEPT: Flattening drop
// Dropping a list drops its items, which would recurse once per nesting level.
// Instead, uniquely owned child lists are detached onto a heap stack and
// released one at a time, each with only shallow children left.
impl Drop for Phrase {
    fn drop(&mut self) {
        let Phrase::List(items) = self else {
            return;
        };
        if !items.iter().any(Phrase::is_list) {
            return;
        }
        let Some(children) = Arc::get_mut(items) else {
            return; // still shared: only the count drops
        };

        let mut pending = Vec::new();
        detach_lists(children, &mut pending);
        while let Some(mut list) = pending.pop() {
            if let Some(children) = Arc::get_mut(&mut list) {
                detach_lists(children, &mut pending);
            }
        }
    }
}

fn detach_lists(items: &mut [Phrase], pending: &mut Vec<Arc<[Phrase]>>) {
    for item in items {
        if let Phrase::List(inner) = item
            && !inner.is_empty()
        {
            pending.push(std::mem::replace(inner, Arc::from(Vec::new())));
        }
    }
}

// Data display mode: strings WITH quotes, lists in source syntax
impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_nested(f, |phrase, f| match phrase {
            Phrase::String(s) => write!(f, "\"{}\"", s),
            Phrase::Integer(i) => write!(f, "{}", i),
            Phrase::Instruction(name) => write!(f, "{}", name),
            Phrase::List(_) => Ok(()),
        })
    }
}

// Debug reads like source too, with string contents escaped
impl fmt::Debug for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_nested(f, |phrase, f| match phrase {
            Phrase::String(s) => write!(f, "{:?}", s),
            Phrase::Integer(i) => write!(f, "{}", i),
            Phrase::Instruction(name) => write!(f, "{}", name),
            Phrase::List(_) => Ok(()),
        })
    }
}

impl From<&str> for Phrase {
    fn from(text: &str) -> Self {
        Phrase::string(text)
    }
}

impl From<i64> for Phrase {
    fn from(value: i64) -> Self {
        Phrase::integer(value)
    }
}

impl From<Vec<Phrase>> for Phrase {
    fn from(items: Vec<Phrase>) -> Self {
        Phrase::list(items)
    }
}
