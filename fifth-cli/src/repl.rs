// Interactive prompt using editline with tokio spawn_blocking
//
// Each entry runs in its own session over the same ExecutionContext, so the
// stack and namespace carry over and the stack can be shown after every entry.
// While a list or string is still open the prompt switches to `. ` and the
// following lines join the same entry.

use editline::{LineEditor, terminals::StdioTerminal};
use fifth_core::{ExecutionContext, Session, SessionConfig, SharedOutput, StderrOutput, shared};
use std::io::Write;
use tracing::debug;

pub async fn run_repl(config: SessionConfig) -> Result<(), Box<dyn std::error::Error>> {
    print_banner();

    let errors = shared(StderrOutput::new());
    let mut ctx = ExecutionContext::with_limits(config.limits);

    // Create editline editor and terminal (sync)
    let mut editor = LineEditor::new(1024, 50);
    let mut terminal = StdioTerminal::new();

    let mut pending = String::new(); // lines of an entry that is still open

    loop {
        print!("{}", if pending.is_empty() { "\n> " } else { ". " });
        std::io::stdout().flush()?;

        // Read a line using editline in a blocking task
        let (ed, term, read_result) = tokio::task::spawn_blocking(move || {
            let result = editor.read_line(&mut terminal);
            (editor, terminal, result)
        })
        .await?;
        editor = ed;
        terminal = term;

        match read_result {
            Ok(line) if !pending.is_empty() => {
                pending.push('\n');
                pending.push_str(&line);
                if !is_open(&pending) {
                    let source = std::mem::take(&mut pending);
                    ctx = run_entry(ctx, config, errors.clone(), &source).await?;
                    show_stack(&ctx);
                }
            }
            Ok(line) => {
                let trimmed = line.trim();
                match trimmed {
                    "" => continue,
                    "quit" => break,
                    "stack" => show_stack(&ctx),
                    "clear" => ctx.stack.clear(),
                    "words" => println!("{}", ctx.namespace.macro_names().join(" ")),
                    source if is_open(source) => pending.push_str(source),
                    source => {
                        ctx = run_entry(ctx, config, errors.clone(), source).await?;
                        show_stack(&ctx);
                    }
                }
            }
            Err(editline::Error::Eof) => {
                // EOF (Ctrl-D)
                println!("\nGoodbye!");
                break;
            }
            Err(editline::Error::Interrupted) => {
                // Ctrl-C - drop any open entry and continue
                println!("^C");
                pending.clear();
                continue;
            }
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

async fn run_entry(
    ctx: ExecutionContext,
    config: SessionConfig,
    errors: SharedOutput,
    source: &str,
) -> Result<ExecutionContext, Box<dyn std::error::Error>> {
    debug!(source, "evaluating entry");
    let session = Session::with_context(ctx, config, errors);
    session.feed(source);
    Ok(session.finish().await?)
}

// True while `source` ends inside a string or an unclosed list
fn is_open(source: &str) -> bool {
    let mut depth = 0usize;
    let mut in_string = false;
    for ch in source.chars() {
        match ch {
            '"' => in_string = !in_string,
            '[' if !in_string => depth += 1,
            ']' if !in_string => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    in_string || depth > 0
}

fn show_stack(ctx: &ExecutionContext) {
    if !ctx.stack.is_empty() {
        println!("Stack: {}", ctx.stack);
    }
}

fn print_banner() {
    println!();
    println!(" _____ _  __ _   _     ");
    println!("|  ___(_)/ _| |_| |__  ");
    println!("| |_  | | |_| __| '_ \\ ");
    println!("|  _| | |  _| |_| | | |");
    println!("|_|   |_|_|  \\__|_| |_| v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Type `quit` or press Ctrl-D to exit");
    println!("Type `stack` to see the current stack");
    println!("Type `clear` to clear the stack");
    println!("Type `words` to see defined macros");
    println!();
}
