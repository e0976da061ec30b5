//! Line-oriented stdin shared by the battle menu and dialogue choices.
use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct Console {
    lines: Arc<Mutex<Lines<BufReader<Stdin>>>>,
}

impl Console {
    pub fn stdin() -> Self {
        Self {
            lines: Arc::new(Mutex::new(BufReader::new(tokio::io::stdin()).lines())),
        }
    }

    /// Prints `prompt` and waits for one trimmed line. `None` on end of input.
    pub async fn ask(&self, prompt: &str) -> Result<Option<String>> {
        let mut lines = self.lines.lock().await;
        print!("{prompt}");
        std::io::stdout().flush()?;
        Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
    }
}
