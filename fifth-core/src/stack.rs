// PhraseStack - the LIFO operand stack used during evaluation
//
// Failed operations never mutate the stack; Push never fails.

use crate::error::ContainerError;
use crate::phrase::Phrase;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhraseStack {
    items: Vec<Phrase>,
}

impl PhraseStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, phrase: Phrase) {
        self.items.push(phrase);
    }

    pub fn peek(&self) -> Result<&Phrase, ContainerError> {
        self.items.last().ok_or(ContainerError::StackEmpty)
    }

    pub fn pop(&mut self) -> Result<Phrase, ContainerError> {
        self.items.pop().ok_or(ContainerError::StackEmpty)
    }

    /// Exchange the top two items. Fails without touching the stack when
    /// fewer than two are present.
    pub fn swap_top(&mut self) -> Result<(), ContainerError> {
        let len = self.items.len();
        if len < 2 {
            return Err(ContainerError::StackEmpty);
        }
        self.items.swap(len - 1, len - 2);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &Phrase> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Phrase] {
        &self.items
    }
}

// Space-separated, bottom first - the way the REPL prints it
impl fmt::Display for PhraseStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, phrase) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", phrase)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let stack = PhraseStack::new();
        assert_eq!(stack.peek(), Err(ContainerError::StackEmpty));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_pop_after_push() {
        let mut stack = PhraseStack::new();
        stack.push(Phrase::string("hello"));

        assert_eq!(stack.pop(), Ok(Phrase::string("hello")));
    }

    #[test]
    fn test_peek_after_push() {
        let mut stack = PhraseStack::new();
        stack.push(Phrase::string("hello"));

        assert_eq!(stack.peek(), Ok(&Phrase::string("hello")));
        assert_eq!(stack.peek(), Ok(&Phrase::string("hello")));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_empty_after_last_pop() {
        let mut stack = PhraseStack::new();
        stack.push(Phrase::string("hello"));

        assert!(stack.pop().is_ok());
        assert_eq!(stack.pop(), Err(ContainerError::StackEmpty));
        assert_eq!(stack.pop().unwrap_err().to_string(), "stack is empty");
    }

    #[test]
    fn test_lifo_order() {
        let mut stack = PhraseStack::new();
        let words = ["one", "two", "three", "four"];
        for word in words {
            stack.push(Phrase::string(word));
        }

        for word in words.iter().rev() {
            assert_eq!(stack.pop(), Ok(Phrase::string(*word)));
        }
        assert!(stack.is_empty());
    }

    #[test]
    fn test_failed_pops_leave_stack_usable() {
        let mut stack = PhraseStack::new();
        for _ in 0..3 {
            assert!(stack.pop().is_err());
            assert!(stack.peek().is_err());
        }
        assert_eq!(stack.len(), 0);

        stack.push(Phrase::integer(1));
        assert_eq!(stack.pop(), Ok(Phrase::integer(1)));
    }

    #[test]
    fn test_swap_top() {
        let mut stack = PhraseStack::new();
        stack.push(Phrase::integer(1));
        assert!(stack.swap_top().is_err());
        assert_eq!(stack.as_slice(), &[Phrase::integer(1)]);

        stack.push(Phrase::integer(2));
        stack.swap_top().unwrap();
        assert_eq!(stack.as_slice(), &[Phrase::integer(2), Phrase::integer(1)]);
    }

    #[test]
    fn test_display() {
        let mut stack = PhraseStack::new();
        assert_eq!(stack.to_string(), "");
        stack.push(Phrase::string("a"));
        stack.push(Phrase::list([Phrase::instruction("b")]));
        assert_eq!(stack.to_string(), "\"a\" [b]");
    }
}
