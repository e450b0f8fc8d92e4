//! CLI implementation of Prompter for the interactive patch flow

use std::cell::Cell;
use std::io::{self, BufRead, Write};

use libpatcher_core::{Prompter, SemanticValueKind};
use owo_colors::OwoColorize;

/// Terminal prompter. End of input is treated as an abort.
#[derive(Default)]
pub struct CliPrompter {
    offsets_hint_shown: Cell<bool>,
}

impl CliPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_line(&self, prompt: &str) -> Option<String> {
        print!("{}", prompt.yellow().bold());
        io::stdout().flush().ok();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                eprintln!("Failed to read input: {}", e);
                None
            }
        }
    }
}

impl Prompter for CliPrompter {
    fn prompt_path(&self, retry: bool) -> Option<String> {
        if retry {
            self.read_line("\nEnter executable path (or 'x' to terminate): ")
        } else {
            println!(
                "\n{}",
                "// Remember, arm64-v8a and armeabi-v7a are acceptable.".cyan()
            );
            self.read_line("\nEnter executable path: ")
        }
    }

    fn prompt_offsets(&self, kind: SemanticValueKind, retry: bool) -> Option<String> {
        if !self.offsets_hint_shown.replace(true) {
            println!(
                "\n{}\n{}\n",
                "// Leave empty if not necessary.".cyan(),
                "// Separate by commas if there are multiple offsets.".cyan()
            );
        }

        if retry {
            println!("{}", "(e.g. 0x100 or 0x100,0x200)".dimmed());
        }
        self.read_line(&format!("Enter offsets for {}: ", kind))
    }

    fn display_message(&self, message: &str) {
        println!("\n{}", message.green().bold());
    }

    fn display_warning(&self, message: &str) {
        eprintln!("{}", message.red().bold());
    }
}
