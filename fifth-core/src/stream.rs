// CharStream - single-character lookahead over an asynchronous character source
//
// ASYNC CONCEPT: The source may be a live terminal
// peek() and next_char() suspend until a character arrives or the source closes.
// Once the source reports closed the stream never asks it again: every later
// peek() / next_char() returns None immediately.

use std::future::Future;
use tokio::sync::mpsc;

/// An asynchronous, possibly unbounded producer of characters.
/// `None` means the source is exhausted.
pub trait CharSource: Send {
    fn recv_char(&mut self) -> impl Future<Output = Option<char>> + Send;
}

impl CharSource for mpsc::UnboundedReceiver<char> {
    fn recv_char(&mut self) -> impl Future<Output = Option<char>> + Send {
        self.recv()
    }
}

impl CharSource for mpsc::Receiver<char> {
    fn recv_char(&mut self) -> impl Future<Output = Option<char>> + Send {
        self.recv()
    }
}

/// A closed source preloaded with `input`.
pub fn source_from_str(input: &str) -> mpsc::UnboundedReceiver<char> {
    let (tx, rx) = mpsc::unbounded_channel();
    for ch in input.chars() {
        // The receiver is alive right here, so this cannot fail
        let _ = tx.send(ch);
    }
    rx
}

#[derive(Debug)]
pub struct CharStream<S> {
    source: S,
    peeked: Option<char>,
    open: bool,
}

impl<S: CharSource> CharStream<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            peeked: None,
            open: true,
        }
    }

    /// The next character, without consuming it.
    pub async fn peek(&mut self) -> Option<char> {
        if self.peeked.is_none() && self.open {
            self.peeked = self.pull().await;
        }
        self.peeked
    }

    /// The next character, consumed.
    pub async fn next_char(&mut self) -> Option<char> {
        match self.peeked.take() {
            Some(ch) => Some(ch),
            None if self.open => self.pull().await,
            None => None,
        }
    }

    /// False once the source has been seen closed. A buffered character
    /// may still be waiting to be consumed.
    pub fn is_open(&self) -> bool {
        self.open
    }

    async fn pull(&mut self) -> Option<char> {
        let next = self.source.recv_char().await;
        if next.is_none() {
            self.open = false;
        }
        next
    }
}
