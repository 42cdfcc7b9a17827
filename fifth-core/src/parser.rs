// This module turns a CharStream into Phrases, incrementally
//
// GRAMMAR (one character of lookahead always picks the production):
//   program     := (phrase | whitespace)*
//   phrase      := list | instruction | string
//   list        := '[' (phrase | whitespace)* ']'
//   instruction := [a-z-]+
//   string      := '"' char* '"'        no escape sequences
//   whitespace  := (' ' | '\t' | '\n')+
//
// Malformed input is reported on the error side channel, one line per error,
// and parsing carries on. Nothing but the end of input stops the parser.
//
// RUST CONCEPT: Nesting without recursion
// Open lists live on an explicit stack, a Vec of partially built lists. Inner
// lists are complete before the enclosing list closes, and deeply nested input
// cannot overflow the native stack.

use crate::error::ParseError;
use crate::output::{SharedOutput, write_line};
use crate::phrase::Phrase;
use crate::shutdown::Shutdown;
use crate::stream::{CharSource, CharStream};
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub struct Parser<S> {
    input: CharStream<S>,
    errors: SharedOutput,
    scratch: String, // reused buffer for instruction and string text
    error_count: usize,
}

impl<S: CharSource> Parser<S> {
    pub fn new(input: CharStream<S>, errors: SharedOutput) -> Self {
        Self {
            input,
            errors,
            scratch: String::new(),
            error_count: 0,
        }
    }

    pub fn from_source(source: S, errors: SharedOutput) -> Self {
        Self::new(CharStream::new(source), errors)
    }

    /// Recoverable errors reported so far.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// The top-level loop: emit every phrase into `out` until the input is
    /// exhausted, the receiver goes away, or `shutdown` fires. Dropping `out`
    /// on return closes the channel. Returns the number of phrases emitted.
    pub async fn run(mut self, out: mpsc::Sender<Phrase>, mut shutdown: Shutdown) -> usize {
        let mut emitted = 0;
        debug!("parser started");

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                next = self.next_phrase() => next,
            };
            let Some(phrase) = next else {
                break;
            };

            // Backpressure: suspends while the channel is full
            let sent = tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                sent = out.send(phrase) => sent,
            };
            if sent.is_err() {
                debug!("phrase receiver dropped");
                break;
            }
            emitted += 1;
        }

        debug!(emitted, errors = self.error_count, "parser finished");
        emitted
    }

    /// The next phrase, skipping whitespace and malformed input.
    /// `None` once the input is exhausted. Can be called again after each phrase.
    pub async fn next_phrase(&mut self) -> Option<Phrase> {
        while self.input.peek().await.is_some() {
            if let Some(phrase) = self.parse_one().await {
                return Some(phrase);
            }
        }
        None
    }

    pub async fn parse_all(&mut self) -> Vec<Phrase> {
        let mut phrases = Vec::new();
        while let Some(phrase) = self.next_phrase().await {
            phrases.push(phrase);
        }
        phrases
    }

    /// One top-level parse step. Returns `None` when the step consumed only
    /// whitespace or a malformed character, or when the input is exhausted.
    pub async fn parse_one(&mut self) -> Option<Phrase> {
        let mut open_lists: Vec<Vec<Phrase>> = Vec::new();

        loop {
            let Some(ch) = self.input.peek().await else {
                // End of input: close whatever is still open, innermost first
                let items = open_lists.pop()?;
                self.report(ParseError::UnterminatedList).await;
                let list = Phrase::list(items);
                match open_lists.last_mut() {
                    Some(outer) => {
                        outer.push(list);
                        continue;
                    }
                    None => return Some(list),
                }
            };

            let produced = match ch {
                ' ' | '\t' | '\n' => {
                    self.skip_whitespace().await;
                    None
                }
                '[' => {
                    self.input.next_char().await;
                    open_lists.push(Vec::new());
                    continue;
                }
                ']' if !open_lists.is_empty() => {
                    self.input.next_char().await;
                    open_lists.pop().map(Phrase::list)
                }
                '"' => Some(self.parse_string().await),
                ch if is_instruction_char(ch) => Some(self.parse_instruction().await),
                _ => {
                    // Consume the offending character and move on
                    self.input.next_char().await;
                    self.report(ParseError::UnexpectedCharacter(ch)).await;
                    None
                }
            };

            match open_lists.last_mut() {
                Some(list) => list.extend(produced),
                None => return produced,
            }
        }
    }

    async fn skip_whitespace(&mut self) {
        while let Some(ch) = self.input.peek().await {
            if !is_whitespace(ch) {
                break;
            }
            self.input.next_char().await;
        }
    }

    async fn parse_instruction(&mut self) -> Phrase {
        self.scratch.clear();
        while let Some(ch) = self.input.peek().await {
            if !is_instruction_char(ch) {
                break;
            }
            self.input.next_char().await;
            self.scratch.push(ch);
        }
        Phrase::instruction(self.scratch.as_str())
    }

    async fn parse_string(&mut self) -> Phrase {
        self.scratch.clear();
        self.input.next_char().await; // opening quote
        loop {
            match self.input.next_char().await {
                Some('"') => break,
                Some(ch) => self.scratch.push(ch),
                None => {
                    self.report(ParseError::UnterminatedString).await;
                    break;
                }
            }
        }
        Phrase::string(self.scratch.as_str())
    }

    async fn report(&mut self, err: ParseError) {
        self.error_count += 1;
        debug!(error = %err, "recoverable parse error");
        if let Err(io_err) = write_line(&self.errors, &err.to_string()).await {
            warn!(error = %io_err, "failed to write parse error");
        }
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n')
}

fn is_instruction_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch == '-'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{BufferOutput, shared};
    use crate::stream::source_from_str;

    // Parse everything and return (phrases, error side-channel text)
    async fn parse(input: &str) -> (Vec<Phrase>, String) {
        let errors = BufferOutput::new();
        let mut parser = Parser::from_source(source_from_str(input), shared(errors.clone()));
        let phrases = parser.parse_all().await;
        (phrases, errors.contents())
    }

    fn instr(name: &str) -> Phrase {
        Phrase::instruction(name)
    }

    #[tokio::test]
    async fn test_whitespace_only() {
        let (phrases, errors) = parse("  \n \t ").await;
        assert!(phrases.is_empty());
        assert_eq!(errors, "");
    }

    #[tokio::test]
    async fn test_one_word() {
        let (phrases, errors) = parse("wow").await;
        assert_eq!(phrases, vec![instr("wow")]);
        assert_eq!(errors, "");
    }

    #[tokio::test]
    async fn test_two_words() {
        let (phrases, errors) = parse("wow willy").await;
        assert_eq!(phrases, vec![instr("wow"), instr("willy")]);
        assert_eq!(errors, "");
    }

    #[tokio::test]
    async fn test_hyphenated_instruction() {
        let (phrases, _) = parse("-my-word-").await;
        assert_eq!(phrases, vec![instr("-my-word-")]);
    }

    #[tokio::test]
    async fn test_list() {
        let (phrases, errors) = parse("[one two]").await;
        assert_eq!(phrases, vec![Phrase::list([instr("one"), instr("two")])]);
        assert_eq!(errors, "");
    }

    #[tokio::test]
    async fn test_list_surrounded_by_whitespace() {
        let (phrases, errors) = parse(" [ one two ] ").await;
        assert_eq!(phrases, vec![Phrase::list([instr("one"), instr("two")])]);
        assert_eq!(errors, "");
    }

    #[tokio::test]
    async fn test_nested_lists() {
        let (phrases, errors) = parse("[[one][]three]").await;
        assert_eq!(
            phrases,
            vec![Phrase::list([
                Phrase::list([instr("one")]),
                Phrase::list([]),
                instr("three"),
            ])]
        );
        assert_eq!(errors, "");
    }

    #[tokio::test]
    async fn test_unexpected_character_is_not_fatal() {
        let (phrases, errors) = parse("a, b").await;
        assert_eq!(phrases, vec![instr("a"), instr("b")]);
        assert_eq!(errors, "unexpected character ',' in input\n");
    }

    #[tokio::test]
    async fn test_string() {
        let (phrases, errors) = parse("\"Hello, world!\"").await;
        assert_eq!(phrases, vec![Phrase::string("Hello, world!")]);
        assert_eq!(errors, "");
    }

    #[tokio::test]
    async fn test_string_has_no_escapes() {
        let (phrases, _) = parse(r#""a\nb" "" [x "y z"]"#).await;
        assert_eq!(
            phrases,
            vec![
                Phrase::string("a\\nb"),
                Phrase::string(""),
                Phrase::list([instr("x"), Phrase::string("y z")]),
            ]
        );
    }

    #[tokio::test]
    async fn test_unterminated_string() {
        let (phrases, errors) = parse("\"never closed").await;
        assert_eq!(phrases, vec![Phrase::string("never closed")]);
        assert_eq!(errors, "unexpected end of input, expecting \"\n");
    }

    #[tokio::test]
    async fn test_unterminated_list_yields_partial_list() {
        let (phrases, errors) = parse("[one two").await;
        assert_eq!(phrases, vec![Phrase::list([instr("one"), instr("two")])]);
        assert_eq!(errors, "unexpected end of input, expecting ]\n");
    }

    #[tokio::test]
    async fn test_unterminated_nested_lists_report_each_bracket() {
        let (phrases, errors) = parse("[a [b").await;
        assert_eq!(
            phrases,
            vec![Phrase::list([instr("a"), Phrase::list([instr("b")])])]
        );
        assert_eq!(
            errors,
            "unexpected end of input, expecting ]\nunexpected end of input, expecting ]\n"
        );
    }

    #[tokio::test]
    async fn test_stray_closing_bracket() {
        let (phrases, errors) = parse("one ] two").await;
        assert_eq!(phrases, vec![instr("one"), instr("two")]);
        assert_eq!(errors, "unexpected character ']' in input\n");
    }

    #[tokio::test]
    async fn test_bad_characters_inside_list() {
        let (phrases, errors) = parse("[A b 7]").await;
        assert_eq!(phrases, vec![Phrase::list([instr("b")])]);
        assert_eq!(
            errors,
            "unexpected character 'A' in input\nunexpected character '7' in input\n"
        );
    }

    #[tokio::test]
    async fn test_adjacent_tokens_split_on_class() {
        let (phrases, errors) = parse("abc\"s\"[x]def").await;
        assert_eq!(
            phrases,
            vec![
                instr("abc"),
                Phrase::string("s"),
                Phrase::list([instr("x")]),
                instr("def"),
            ]
        );
        assert_eq!(errors, "");
    }

    #[tokio::test]
    async fn test_deep_nesting() {
        let depth = 200_000;
        let input = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let (phrases, errors) = parse(&input).await;
        assert_eq!(phrases.len(), 1);
        assert_eq!(errors, "");
        assert_eq!(phrases[0].to_string(), input);

        // Walk down to the innermost list
        let mut current = &phrases[0];
        let mut levels = 1;
        while let Phrase::List(items) = current {
            match items.first() {
                Some(inner) => {
                    current = inner;
                    levels += 1;
                }
                None => break,
            }
        }
        assert_eq!(levels, depth);
    }

    #[tokio::test]
    async fn test_parse_one_steps() {
        let errors = BufferOutput::new();
        let mut parser = Parser::from_source(source_from_str("  go ,"), shared(errors.clone()));

        assert_eq!(parser.parse_one().await, None); // whitespace
        assert_eq!(parser.parse_one().await, Some(instr("go")));
        assert_eq!(parser.parse_one().await, None); // whitespace
        assert_eq!(parser.parse_one().await, None); // ','
        assert_eq!(parser.parse_one().await, None); // exhausted
        assert_eq!(parser.error_count(), 1);
    }

    #[tokio::test]
    async fn test_run_emits_into_channel_and_closes() {
        let errors = BufferOutput::new();
        let parser = Parser::from_source(source_from_str("x [y] \"z\""), shared(errors.clone()));
        let (tx, mut rx) = mpsc::channel(1);

        let task = tokio::spawn(parser.run(tx, Shutdown::never()));

        assert_eq!(rx.recv().await, Some(instr("x")));
        assert_eq!(rx.recv().await, Some(Phrase::list([instr("y")])));
        assert_eq!(rx.recv().await, Some(Phrase::string("z")));
        assert_eq!(rx.recv().await, None);
        assert_eq!(task.await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown_with_open_input() {
        let (chars, source) = mpsc::unbounded_channel();
        let parser = Parser::from_source(source, shared(BufferOutput::new()));
        let (tx, mut rx) = mpsc::channel(8);
        let (trigger, shutdown) = crate::shutdown::channel();

        let task = tokio::spawn(parser.run(tx, shutdown));
        chars.send('a').unwrap();
        chars.send(' ').unwrap();
        assert_eq!(rx.recv().await, Some(instr("a")));

        // Input is still open, the parser is waiting on it
        trigger.trigger();
        assert_eq!(task.await.unwrap(), 1);
        assert_eq!(rx.recv().await, None);
    }
}
