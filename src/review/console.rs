use async_trait::async_trait;
use console::style;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::process::Command;
use tracing::warn;

use super::ReviewSurface;
use crate::types::{DocSyncError, DocUpdate, Result, ReviewDecision};

/// Interactive terminal reviewer.
///
/// Reads answers line by line on the blocking pool; end of input stops the
/// review and leaves the remaining updates undecided.
pub struct ConsoleReviewer {
    input: Arc<Mutex<Box<dyn BufRead + Send>>>,
    editor: Option<String>,
}

impl Default for ConsoleReviewer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleReviewer {
    pub fn new() -> Self {
        Self {
            input: Arc::new(Mutex::new(Box::new(BufReader::new(std::io::stdin())))),
            editor: None,
        }
    }

    /// Read answers from `input` instead of stdin
    pub fn with_input<R: BufRead + Send + 'static>(mut self, input: R) -> Self {
        self.input = Arc::new(Mutex::new(Box::new(input)));
        self
    }

    /// Editor command; defaults to `$EDITOR`, then `vi`
    pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = Some(editor.into());
        self
    }

    fn editor_command(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| {
                if cfg!(target_os = "windows") {
                    "notepad".to_string()
                } else {
                    "vi".to_string()
                }
            })
    }

    /// Print `prompt` and read one trimmed line; `None` at end of input
    async fn ask(&self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        let _ = std::io::stdout().flush();

        let input = Arc::clone(&self.input);
        let read = tokio::task::spawn_blocking(move || {
            let mut line = String::new();
            let mut input = match input.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            input.read_line(&mut line).map(|n| (n, line))
        })
        .await;

        match read {
            Ok(Ok((0, _))) => None,
            Ok(Ok((_, line))) => Some(line.trim().to_string()),
            Ok(Err(e)) => {
                warn!("Failed to read review input: {}", e);
                None
            }
            Err(e) => {
                warn!("Review input task failed: {}", e);
                None
            }
        }
    }

    async fn edit(&self, update: &DocUpdate) -> Result<String> {
        let extension = Path::new(&update.file_path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        let path = std::env::temp_dir().join(format!(
            "docsync-{}{}",
            uuid::Uuid::new_v4(),
            extension
        ));
        tokio::fs::write(&path, &update.updated_content).await?;

        let result = run_editor(&self.editor_command(), &path).await;
        let edited: Result<String> = match result {
            Ok(()) => tokio::fs::read_to_string(&path).await.map_err(Into::into),
            Err(e) => Err(e),
        };
        let _ = tokio::fs::remove_file(&path).await;
        edited
    }

    async fn review_one(&self, update: &DocUpdate) -> Option<ReviewDecision> {
        print_update(update);

        loop {
            let answer = self.ask(&format!(
                "{} / {} / {}: ",
                style("[a]pprove").green(),
                style("[r]eject").red(),
                style("[e]dit").yellow()
            ))
            .await?;

            match answer.to_lowercase().as_str() {
                "a" | "approve" | "y" | "yes" => return Some(ReviewDecision::approve()),
                "r" | "reject" | "n" | "no" => {
                    let feedback = self
                        .ask("Feedback (optional): ")
                        .await
                        .filter(|f| !f.is_empty());
                    return Some(ReviewDecision::reject(feedback));
                }
                "e" | "edit" => match self.edit(update).await {
                    Ok(content) => return Some(ReviewDecision::edit(content)),
                    Err(e) => println!("{} {}", style("✗").red(), e),
                },
                _ => println!("Please answer a, r or e."),
            }
        }
    }
}

async fn run_editor(command: &str, file: &Path) -> Result<()> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| DocSyncError::Review("Empty editor command".to_string()))?;

    let status = Command::new(program)
        .args(parts)
        .arg(file)
        .status()
        .await
        .map_err(|e| DocSyncError::Review(format!("Failed to launch editor {}: {}", program, e)))?;

    if !status.success() {
        return Err(DocSyncError::Review(format!(
            "Editor {} exited with {}",
            program, status
        )));
    }
    Ok(())
}

fn print_update(update: &DocUpdate) {
    let (added, removed) = line_changes(&update.original_content, &update.updated_content);
    println!();
    println!("{}", style(&update.file_path).bold().underlined());
    println!(
        "  {} {}",
        style(format!("+{}", added)).green(),
        style(format!("-{} lines", removed)).red()
    );
    if !update.reasoning.is_empty() {
        println!("  {}", style(&update.reasoning).dim());
    }
}

/// Lines present only in `new` and only in `old`, counted as multisets
fn line_changes(old: &str, new: &str) -> (usize, usize) {
    let mut counts: HashMap<&str, isize> = HashMap::new();
    for line in old.lines() {
        *counts.entry(line).or_default() -= 1;
    }
    for line in new.lines() {
        *counts.entry(line).or_default() += 1;
    }

    counts.values().fold((0, 0), |(added, removed), &c| {
        if c > 0 {
            (added + c as usize, removed)
        } else {
            (added, removed + c.unsigned_abs())
        }
    })
}

#[async_trait]
impl ReviewSurface for ConsoleReviewer {
    async fn review(&self, updates: &[DocUpdate]) -> Result<Vec<ReviewDecision>> {
        let mut decisions = Vec::with_capacity(updates.len());
        for (i, update) in updates.iter().enumerate() {
            println!(
                "\n{}",
                style(format!("Update {}/{}", i + 1, updates.len())).bold()
            );
            match self.review_one(update).await {
                Some(decision) => decisions.push(decision),
                None => {
                    warn!(
                        "Review input ended; {} update(s) left undecided",
                        updates.len() - i
                    );
                    break;
                }
            }
        }
        Ok(decisions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReviewAction;
    use std::io::{Cursor, Read};
    use std::sync::mpsc;

    fn update(path: &str) -> DocUpdate {
        DocUpdate {
            file_path: path.to_string(),
            original_content: "# API\nfoo()\n".to_string(),
            updated_content: "# API\nfoo(x)\n".to_string(),
            reasoning: "foo gained x".to_string(),
        }
    }

    fn reviewer(answers: &str) -> ConsoleReviewer {
        ConsoleReviewer::new().with_input(Cursor::new(answers.to_string()))
    }

    /// Input whose lines arrive over a channel; reads block until one is sent
    struct ChannelInput {
        rx: mpsc::Receiver<Vec<u8>>,
        pending: Vec<u8>,
    }

    impl Read for ChannelInput {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pending.is_empty() {
                match self.rx.recv() {
                    Ok(bytes) => self.pending = bytes,
                    Err(_) => return Ok(0),
                }
            }
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            Ok(n)
        }
    }

    #[test]
    fn test_line_changes() {
        assert_eq!(line_changes("a\nb\nc", "a\nx\nc\nc"), (2, 1));
        assert_eq!(line_changes("same", "same"), (0, 0));
    }

    #[tokio::test]
    async fn test_approve_and_reject_with_feedback() {
        let decisions = reviewer("a\nwhat\nr\nstale example\n")
            .review(&[update("a.md"), update("b.md")])
            .await
            .unwrap();

        assert_eq!(decisions.len(), 2);
        assert_eq!(decisions[0].action, ReviewAction::Approve);
        assert_eq!(decisions[1].action, ReviewAction::Reject);
        assert_eq!(decisions[1].feedback.as_deref(), Some("stale example"));
    }

    // Single-threaded runtime: the answer can only be sent if waiting for
    // input leaves the runtime free to run other tasks.
    #[tokio::test]
    async fn test_waiting_for_input_does_not_stall_runtime() {
        let (tx, rx) = mpsc::channel();
        let reviewer = ConsoleReviewer::new().with_input(BufReader::new(ChannelInput {
            rx,
            pending: Vec::new(),
        }));

        let answer = tokio::spawn(async move {
            tokio::task::yield_now().await;
            tx.send(b"a\n".to_vec()).unwrap();
        });

        let decisions = reviewer.review(&[update("a.md")]).await.unwrap();
        answer.await.unwrap();

        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].action, ReviewAction::Approve);
    }

    #[tokio::test]
    async fn test_end_of_input_leaves_rest_undecided() {
        let decisions = reviewer("r\n\n")
            .review(&[update("a.md"), update("b.md"), update("c.md")])
            .await
            .unwrap();

        assert_eq!(decisions.len(), 1);
        assert!(decisions[0].feedback.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_edit_uses_saved_file() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-editor.sh");
        std::fs::write(&script, "#!/bin/sh\nprintf 'edited by hand\\n' > \"$1\"\n").unwrap();

        let decisions = reviewer("e\n")
            .with_editor(format!("sh {}", script.display()))
            .review(&[update("a.md")])
            .await
            .unwrap();

        assert_eq!(decisions[0].action, ReviewAction::Edit);
        assert_eq!(decisions[0].edited_content.as_deref(), Some("edited by hand\n"));
    }

    #[tokio::test]
    async fn test_failed_editor_prompts_again() {
        let decisions = reviewer("e\na\n")
            .with_editor("docsync-no-such-editor")
            .review(&[update("a.md")])
            .await
            .unwrap();
        assert_eq!(decisions[0].action, ReviewAction::Approve);
    }
}
