//! UI utilities for the CLI

use colored::*;
use crossterm::{
    cursor::MoveToColumn,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{Clear, ClearType, disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use pdfqa_core::Result;
use pdfqa_rag::IndexingResult;

use crate::assistant::{Answer, SourceRef};

const PROMPT: &str = "pdfqa>";

/// A line typed into the chat loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Empty,
    Help,
    Sources,
    Clear,
    Exit,
    Ask(String),
}

impl ChatCommand {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        match input.to_lowercase().as_str() {
            "" => Self::Empty,
            "help" | "?" => Self::Help,
            "sources" => Self::Sources,
            "clear" => Self::Clear,
            "exit" | "quit" => Self::Exit,
            _ => Self::Ask(input.to_string()),
        }
    }
}

/// Display startup banner
pub fn display_banner(store: &str, vector_count: Option<usize>) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = 60.min(terminal_width.saturating_sub(4)).max(40);
    let inner = banner_width - 2;

    let top_border = format!("┌{}┐", "─".repeat(inner));
    let bottom_border = format!("└{}┘", "─".repeat(inner));
    let empty_line = format!("│{}│", " ".repeat(inner));

    let padded = |text: &str| {
        let used = text.chars().count() + 2;
        format!("│  {}{}│", text, " ".repeat(inner.saturating_sub(used)))
    };

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());
    println!("{}", padded("PDF Q&A").blue().bold());
    println!("{}", empty_line.blue());
    println!("{}", padded("Ask questions about your indexed PDFs.").blue());
    println!("{}", padded("Use ↑/↓ to recall earlier questions.").blue());
    println!("{}", empty_line.blue());

    let store_line = match vector_count {
        Some(count) => format!("Store: {} ({} passages)", store, count),
        None => format!("Store: {}", store),
    };
    println!("{}", padded(&store_line).blue());
    println!("{}", padded("v0.1.0 • Gemini + Pinecone").blue());
    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
    println!("{}", "💡 Tip: type a question, or 'help' for commands".dimmed());
    println!();
}

fn redraw(input: &str) -> Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    print!("{} {}", PROMPT.green().bold(), input);
    stdout.flush()?;
    Ok(())
}

/// Handle input with question history navigation
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<String> {
    // Piped input: plain line reads, EOF ends the session
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok("exit".to_string());
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(input);
    }

    enable_raw_mode()?;
    let result = read_raw_line(history);
    disable_raw_mode()?;
    println!();

    let input = result?;
    if !input.is_empty() {
        history.push(input.clone());
    }
    Ok(input)
}

fn read_raw_line(history: &[String]) -> Result<String> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    redraw(&input)?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }

        match key_event.code {
            KeyCode::Enter => return Ok(input),
            KeyCode::Char('c') | KeyCode::Char('d')
                if key_event.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                return Ok("exit".to_string());
            }
            KeyCode::Char(c) => {
                input.push(c);
                redraw(&input)?;
            }
            KeyCode::Backspace => {
                if input.pop().is_some() {
                    redraw(&input)?;
                }
            }
            KeyCode::Up => {
                if !history.is_empty() {
                    let new_index = match history_index {
                        None => history.len() - 1,
                        Some(idx) => idx.saturating_sub(1),
                    };
                    history_index = Some(new_index);
                    input = history[new_index].clone();
                    redraw(&input)?;
                }
            }
            KeyCode::Down => {
                if let Some(idx) = history_index {
                    if idx + 1 < history.len() {
                        history_index = Some(idx + 1);
                        input = history[idx + 1].clone();
                    } else {
                        history_index = None;
                        input.clear();
                    }
                    redraw(&input)?;
                }
            }
            KeyCode::Esc => {
                input.clear();
                history_index = None;
                redraw(&input)?;
            }
            _ => {}
        }
    }
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Ask anything about the indexed PDFs", "<question>".green());
    println!("  {} - Show the passages behind the last answer", "sources".green());
    println!("  {} - Forget the question history", "clear".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  What is the refund policy?");
    println!("  Summarize the 2023 annual report");
}

/// Print an answer followed by the files it came from
pub fn print_answer(answer: &Answer) {
    println!();
    println!("{}", answer.text.trim());
    println!();

    let names = answer.source_names();
    if names.is_empty() {
        println!("{}", "No matching passages were found.".dimmed());
    } else {
        println!("{} {}", "📄 Sources:".cyan(), names.join(", ").dimmed());
    }
    println!();
}

/// Print every retrieved passage with its score
pub fn print_sources(sources: &[SourceRef]) {
    if sources.is_empty() {
        println!("{}", "Nothing retrieved yet.".dimmed());
        return;
    }

    for (i, source) in sources.iter().enumerate() {
        let location = match source.chunk_index {
            Some(index) => format!("{} #{}", source.source, index),
            None => source.source.clone(),
        };
        println!(
            "  {}. {} {}",
            i + 1,
            location,
            format!("(score {:.3})", source.score).dimmed()
        );
    }
}

/// Summarize an indexing run
pub fn print_indexing_result(result: &IndexingResult) {
    let summary = format!(
        "Indexed {} chunks from {} PDFs",
        result.chunks_indexed, result.files_processed
    );

    if result.is_success() {
        println!("{} {}", "✅".green(), summary);
    } else {
        println!(
            "{} {} ({} failed)",
            "⚠️".yellow(),
            summary,
            result.files_failed
        );
        for error in &result.errors {
            println!("   {}", error.red());
        }
    }
}

/// Ask a yes/no question, defaulting to no
pub fn confirm(question: &str) -> Result<bool> {
    print!("{} {} [y/N]: ", "❓".cyan(), question);
    io::stdout().flush()?;

    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    let response = response.trim().to_lowercase();

    Ok(response == "y" || response == "yes")
}
