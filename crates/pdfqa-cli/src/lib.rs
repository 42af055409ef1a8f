//! Question answering and terminal UI for pdfqa

mod assistant;
mod ui;

#[cfg(test)]
mod tests;

pub use assistant::{Answer, QuestionAnswerer, SourceRef};
pub use ui::{
    ChatCommand, confirm, display_banner, handle_input_with_history, print_answer,
    print_help, print_indexing_result, print_sources,
};

// Re-export core types
pub use pdfqa_core::{Error, Result};
