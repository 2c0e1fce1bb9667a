use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use console::style;
use playlist_core::parse_playlist_id;

/// Asks until the operator enters a usable playlist ID or URL.
/// An empty line or end of input gives up.
pub fn prompt_playlist() -> Result<String> {
    loop {
        let Some(input) = read_answer("YouTube playlist ID or URL")? else {
            bail!("no playlist given");
        };
        match parse_playlist_id(&input) {
            Ok(playlist_id) => return Ok(playlist_id),
            Err(err) => println!("{} {err}", style("✗").red()),
        }
    }
}

fn read_answer(message: &str) -> Result<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{message}: ")?;
    stdout.flush().context("failed to flush prompt")?;

    let mut buffer = String::new();
    let read = io::stdin()
        .read_line(&mut buffer)
        .context("failed to read input")?;
    let answer = buffer.trim();
    if read == 0 || answer.is_empty() {
        return Ok(None);
    }
    Ok(Some(answer.to_string()))
}
