use std::io::{stdin, stdout, Write};

use log::debug;

use crate::{CalError, Result};

/// Splits a comma-separated list, dropping blank entries.
pub fn parse_list(items: Option<String>) -> Vec<String> {
    items
        .map(|t| {
            t.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Asks a yes/no question on the terminal. Anything but `y`/`yes` is a no.
pub fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N]: ", question);
    stdout().flush().map_err(CalError::Io)?;

    let mut input = String::new();
    stdin().read_line(&mut input).map_err(CalError::Io)?;

    let input = input.trim().to_lowercase();
    debug!("Confirmation answer: {:?}", input);
    Ok(input == "y" || input == "yes")
}

/// Truncates `text` to at most `max_chars` characters, adding `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
    if first_line.chars().count() <= max_chars {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
