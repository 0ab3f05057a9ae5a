//! Terminal capabilities used by the read loop and by commands.
//!
//! The read loop only needs to read a line and to erase the echoed input.
//! `ask` is offered to commands that want an interactive answer.

use std::io::{self, BufRead, IsTerminal, Write};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

/// Line-oriented access to the user's terminal.
#[async_trait]
pub trait Terminal: Send + Sync {
    /// Read one line without its terminator. `None` means end of input.
    async fn read_line(&self) -> io::Result<Option<String>>;

    /// Write `text` as-is and flush.
    fn write(&self, text: &str) -> io::Result<()>;

    /// Visually remove the line the user just entered.
    fn erase_current_line(&self) -> io::Result<()>;

    /// Prefix printed before questions.
    fn question_prefix(&self) -> &str {
        "[QUESTION]"
    }

    /// Ask until a non-empty answer is given, or fall back to `default`.
    async fn ask(&self, question: &str, default: Option<&str>) -> io::Result<String> {
        loop {
            self.write(&format!("{} {question}: ", self.question_prefix()))?;
            let line = self.read_line().await?;
            self.erase_current_line()?;
            match (line, default) {
                (Some(answer), _) if !answer.is_empty() => return Ok(answer),
                (_, Some(default)) => return Ok(default.to_string()),
                (Some(_), None) => continue,
                (None, None) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "input closed before an answer was given",
                    ));
                },
            }
        }
    }
}

/// Move up one line, clear it, return to column 0.
const ERASE_PREVIOUS_LINE: &str = "\x1b[1A\x1b[2K\r";

/// Terminal backed by the process's stdin and stdout.
///
/// Lines are read on a dedicated thread and forwarded over a channel, so a
/// read abandoned on cancellation never holds up runtime shutdown.
pub struct StdTerminal {
    lines: Mutex<mpsc::Receiver<io::Result<String>>>,
    question_prefix: String,
    ansi: bool,
}

impl StdTerminal {
    /// Start the stdin reader thread.
    pub fn spawn() -> io::Result<Self> {
        let (tx, rx) = mpsc::channel(1);
        std::thread::Builder::new()
            .name("conch-stdin".into())
            .spawn(move || {
                let stdin = io::stdin();
                let mut line = String::new();
                loop {
                    line.clear();
                    let item = match stdin.lock().read_line(&mut line) {
                        Ok(0) => break,
                        Ok(_) => Ok(line.trim_end_matches(['\r', '\n']).to_string()),
                        Err(e) => Err(e),
                    };
                    let failed = item.is_err();
                    if tx.blocking_send(item).is_err() || failed {
                        break;
                    }
                }
                log::debug!("stdin reader finished");
            })?;

        Ok(Self {
            lines: Mutex::new(rx),
            question_prefix: "[QUESTION]".to_string(),
            ansi: io::stdout().is_terminal(),
        })
    }

    pub fn with_question_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.question_prefix = prefix.into();
        self
    }
}

#[async_trait]
impl Terminal for StdTerminal {
    async fn read_line(&self) -> io::Result<Option<String>> {
        self.lines.lock().await.recv().await.transpose()
    }

    fn write(&self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }

    fn erase_current_line(&self) -> io::Result<()> {
        // Escape codes would only garble redirected output.
        if !self.ansi {
            return Ok(());
        }
        self.write(ERASE_PREVIOUS_LINE)
    }

    fn question_prefix(&self) -> &str {
        &self.question_prefix
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// In-memory terminal fed from a fixed script.
    ///
    /// Once the script is exhausted, `read_line` either reports end of
    /// input or blocks forever, like an idle user.
    pub struct ScriptedTerminal {
        lines: Mutex<VecDeque<String>>,
        pub output: Mutex<String>,
        pub erased: Mutex<usize>,
        pub reads: Mutex<usize>,
        eof: bool,
    }

    impl ScriptedTerminal {
        pub fn new(lines: &[&str]) -> Self {
            Self {
                lines: Mutex::new(lines.iter().map(|l| l.to_string()).collect()),
                output: Mutex::default(),
                erased: Mutex::default(),
                reads: Mutex::default(),
                eof: true,
            }
        }

        /// Block instead of reporting end of input.
        pub fn hanging(lines: &[&str]) -> Self {
            Self {
                eof: false,
                ..Self::new(lines)
            }
        }
    }

    #[async_trait]
    impl Terminal for ScriptedTerminal {
        async fn read_line(&self) -> io::Result<Option<String>> {
            *self.reads.lock().unwrap() += 1;
            let next = self.lines.lock().unwrap().pop_front();
            match next {
                Some(line) => Ok(Some(line)),
                None if self.eof => Ok(None),
                None => std::future::pending().await,
            }
        }

        fn write(&self, text: &str) -> io::Result<()> {
            self.output.lock().unwrap().push_str(text);
            Ok(())
        }

        fn erase_current_line(&self) -> io::Result<()> {
            *self.erased.lock().unwrap() += 1;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedTerminal;
    use super::*;

    #[tokio::test]
    async fn ask_returns_answer() {
        let term = ScriptedTerminal::new(&["yes"]);
        let answer = term.ask("Continue?", Some("no")).await.unwrap();
        assert_eq!(answer, "yes");
        assert_eq!(*term.output.lock().unwrap(), "[QUESTION] Continue?: ");
        assert_eq!(*term.erased.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn ask_falls_back_to_default() {
        let term = ScriptedTerminal::new(&[""]);
        let answer = term.ask("Name", Some("guest")).await.unwrap();
        assert_eq!(answer, "guest");
    }

    #[tokio::test]
    async fn ask_repeats_without_default() {
        let term = ScriptedTerminal::new(&["", "", "Bob"]);
        let answer = term.ask("Name", None).await.unwrap();
        assert_eq!(answer, "Bob");
        assert_eq!(term.output.lock().unwrap().matches("[QUESTION] Name: ").count(), 3);
    }

    #[tokio::test]
    async fn ask_at_end_of_input_uses_default() {
        let term = ScriptedTerminal::new(&[]);
        assert_eq!(term.ask("Name", Some("x")).await.unwrap(), "x");
    }

    #[tokio::test]
    async fn ask_at_end_of_input_without_default_fails() {
        let term = ScriptedTerminal::new(&[]);
        let err = term.ask("Name", None).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
