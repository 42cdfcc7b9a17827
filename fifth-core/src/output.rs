//! Async output sinks for the Fifth interpreter
//!
//! The parser and the evaluator both report recoverable errors, one line at a
//! time, to the same error side channel. This module defines the `AsyncOutput`
//! trait for such destinations, a lock-protected handle that both pipeline
//! tasks can share, and two implementations: stderr and an in-memory buffer.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// AsyncOutput trait for async I/O operations
///
/// Futures are boxed so the trait stays object safe: the pipeline holds a
/// `Box<dyn AsyncOutput>` chosen at run time.
pub trait AsyncOutput: Send {
    /// Write bytes to the output asynchronously
    fn write<'a>(&'a mut self, data: &'a [u8])
        -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + 'a>>;

    /// Flush any buffered output asynchronously
    fn flush<'a>(&'a mut self)
        -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + 'a>>;
}

/// An output shared between tasks. Each `write_line` holds the lock for one
/// whole line, so lines from different tasks never interleave.
pub type SharedOutput = Arc<Mutex<Box<dyn AsyncOutput>>>;

pub fn shared(output: impl AsyncOutput + 'static) -> SharedOutput {
    let boxed: Box<dyn AsyncOutput> = Box::new(output);
    Arc::new(Mutex::new(boxed))
}

/// Write `line` followed by a newline, then flush.
pub async fn write_line(output: &SharedOutput, line: &str) -> io::Result<()> {
    let mut out = output.lock().await;
    out.write(line.as_bytes()).await?;
    out.write(b"\n").await?;
    out.flush().await
}

/// Async stderr wrapper
pub struct StderrOutput {
    inner: tokio::io::Stderr,
}

impl StderrOutput {
    pub fn new() -> Self {
        Self {
            inner: tokio::io::stderr(),
        }
    }
}

impl Default for StderrOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncOutput for StderrOutput {
    fn write<'a>(&'a mut self, data: &'a [u8])
        -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + 'a>>
    {
        Box::pin(self.inner.write_all(data))
    }

    fn flush<'a>(&'a mut self)
        -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + 'a>>
    {
        Box::pin(self.inner.flush())
    }
}

// RUST CONCEPT: Cloneable handle to one buffer
// Hand one clone to the session and keep another to read what was written.
#[derive(Debug, Clone, Default)]
pub struct BufferOutput {
    buffer: Arc<StdMutex<Vec<u8>>>,
}

impl BufferOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    pub fn clear(&self) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl AsyncOutput for BufferOutput {
    fn write<'a>(&'a mut self, data: &'a [u8])
        -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + 'a>>
    {
        Box::pin(async move {
            self.buffer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend_from_slice(data);
            Ok(())
        })
    }

    fn flush<'a>(&'a mut self)
        -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + 'a>>
    {
        Box::pin(async move { Ok(()) })
    }
}
