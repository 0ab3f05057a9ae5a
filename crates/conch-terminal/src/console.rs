//! Interactive read loop and line dispatch.
//!
//! One command runs at a time: the next line is not read until the
//! previous command's future has completed. Cancellation is checked before
//! every read and abandons a read that is still pending.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use conch_types::config::ConsoleConfig;

use crate::registry::CommandRegistry;
use crate::terminal::Terminal;

/// What happened to one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Empty or whitespace-only line, nothing resolved.
    Blank,
    /// The first token is not a registered name or alias.
    Unknown(String),
    /// The named command ran (its body may still have rejected the input).
    Executed(String),
}

/// Owns the registry and drives the read loop.
pub struct Console {
    registry: CommandRegistry,
    terminal: Arc<dyn Terminal>,
    prompt: String,
    erase_input: bool,
}

impl Console {
    pub fn new(registry: CommandRegistry, terminal: Arc<dyn Terminal>) -> Self {
        Self {
            registry,
            terminal,
            prompt: String::new(),
            erase_input: true,
        }
    }

    /// Apply prompt and line-erasing settings.
    pub fn configure(mut self, config: &ConsoleConfig) -> Self {
        self.prompt = config.prompt.clone();
        self.erase_input = config.erase_input;
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Read and dispatch lines until `cancel` fires or input ends.
    pub async fn run(&self, cancel: &CancellationToken) {
        log::info!("Console ready ({} commands)", self.registry.len());

        while !cancel.is_cancelled() {
            if !self.prompt.is_empty()
                && let Err(e) = self.terminal.write(&self.prompt)
            {
                log::debug!("failed to write prompt: {e}");
            }

            let line = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                line = self.terminal.read_line() => line,
            };

            match line {
                Ok(Some(line)) => {
                    self.dispatch(&line).await;
                },
                Ok(None) => {
                    log::info!("End of input");
                    break;
                },
                Err(e) => {
                    log::error!("Failed to read from terminal: {e}");
                    break;
                },
            }
        }

        log::info!("Console stopped");
    }

    /// Tokenize one line, resolve its command and run it.
    pub async fn dispatch(&self, line: &str) -> Dispatch {
        self.erase();
        if line.trim().is_empty() {
            return Dispatch::Blank;
        }

        let tokens = tokenize(line);
        let Some((name, args)) = tokens.split_first() else {
            return Dispatch::Blank;
        };

        match self.registry.resolve(name) {
            Some(cmd) => {
                log::debug!("dispatching {} with {} argument(s)", cmd.name(), args.len());
                cmd.execute(args).await;
                Dispatch::Executed(cmd.name().to_string())
            },
            None => {
                log::warn!("{name} is not registered as a console command");
                Dispatch::Unknown(name.clone())
            },
        }
    }

    fn erase(&self) {
        if !self.erase_input {
            return;
        }
        if let Err(e) = self.terminal.erase_current_line() {
            log::debug!("failed to erase input line: {e}");
        }
    }
}

/// Split a line on single spaces.
///
/// Every space is a separator, so doubled, leading or trailing spaces yield
/// empty tokens that take part in arity checks and conversion. Quotes have
/// no special meaning.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split(' ').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::handler::{Arguments, CommandHandler};
    use crate::params::{ParameterSpec, TargetType};
    use crate::terminal::testing::ScriptedTerminal;

    type Calls = Arc<Mutex<Vec<(String, Arguments)>>>;

    fn echo(calls: &Calls) -> CommandHandler {
        let sink = Arc::clone(calls);
        CommandHandler::builder("echo", "Print text")
            .alias("e")
            .param(ParameterSpec::required("text", TargetType::String))
            .sync_body(move |args| sink.lock().unwrap().push(("echo".into(), args)))
            .unwrap()
    }

    fn quit(token: &CancellationToken, calls: &Calls) -> CommandHandler {
        let token = token.clone();
        let sink = Arc::clone(calls);
        CommandHandler::builder("quit", "Leave the console")
            .sync_body(move |args| {
                sink.lock().unwrap().push(("quit".into(), args));
                token.cancel();
            })
            .unwrap()
    }

    fn console(terminal: Arc<ScriptedTerminal>, calls: &Calls) -> Console {
        let mut builder = CommandRegistry::builder();
        builder.register(Box::new(echo(calls)));
        Console::new(builder.build().unwrap(), terminal)
    }

    fn called(calls: &Calls) -> Vec<String> {
        calls.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    #[test]
    fn tokenize_keeps_empty_tokens() {
        assert_eq!(tokenize("echo hello"), ["echo", "hello"]);
        assert_eq!(tokenize("echo  hello"), ["echo", "", "hello"]);
        assert_eq!(tokenize("echo hello "), ["echo", "hello", ""]);
        assert_eq!(tokenize(" echo"), ["", "echo"]);
        assert_eq!(tokenize("a\tb c"), ["a\tb", "c"]);
    }

    #[test]
    fn tokenize_keeps_quotes() {
        assert_eq!(tokenize("say \"a b\""), ["say", "\"a", "b\""]);
    }

    #[tokio::test]
    async fn alias_dispatches_to_command() {
        let calls = Calls::default();
        let con = console(Arc::new(ScriptedTerminal::new(&[])), &calls);
        assert_eq!(con.dispatch("e hello").await, Dispatch::Executed("echo".into()));
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.text(0), Some("hello"));
    }

    #[tokio::test]
    async fn missing_argument_is_not_invoked() {
        let calls = Calls::default();
        let con = console(Arc::new(ScriptedTerminal::new(&[])), &calls);
        assert_eq!(con.dispatch("echo").await, Dispatch::Executed("echo".into()));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn doubled_space_is_an_extra_argument() {
        let calls = Calls::default();
        let con = console(Arc::new(ScriptedTerminal::new(&[])), &calls);
        assert_eq!(con.dispatch("echo  hello").await, Dispatch::Executed("echo".into()));
        assert_eq!(con.dispatch("echo hello ").await, Dispatch::Executed("echo".into()));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_token_goes_through_conversion() {
        let calls = Calls::default();
        let sink = Arc::clone(&calls);
        let add = CommandHandler::builder("add", "Add two integers")
            .param(ParameterSpec::required("a", TargetType::Integer))
            .param(ParameterSpec::required("b", TargetType::Integer))
            .sync_body(move |args| sink.lock().unwrap().push(("add".into(), args)))
            .unwrap();
        let label = {
            let sink = Arc::clone(&calls);
            CommandHandler::builder("label", "Set a label")
                .param(ParameterSpec::required("text", TargetType::String))
                .param(ParameterSpec::required("suffix", TargetType::String))
                .sync_body(move |args| sink.lock().unwrap().push(("label".into(), args)))
                .unwrap()
        };
        let mut builder = CommandRegistry::builder();
        builder.register(Box::new(add)).register(Box::new(label));
        let con = Console::new(
            builder.build().unwrap(),
            Arc::new(ScriptedTerminal::new(&[])) as Arc<dyn Terminal>,
        );

        // "" is not an integer, so the call is aborted.
        con.dispatch("add  2").await;
        assert!(calls.lock().unwrap().is_empty());

        // "" is a valid string.
        con.dispatch("label  x").await;
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.text(0), Some(""));
        assert_eq!(calls[0].1.text(1), Some("x"));
    }

    #[tokio::test]
    async fn leading_space_is_unknown_command() {
        let calls = Calls::default();
        let con = console(Arc::new(ScriptedTerminal::new(&[])), &calls);
        assert_eq!(con.dispatch(" echo hi").await, Dispatch::Unknown(String::new()));
    }

    #[tokio::test]
    async fn unknown_command_is_reported() {
        let calls = Calls::default();
        let con = console(Arc::new(ScriptedTerminal::new(&[])), &calls);
        assert_eq!(con.dispatch("unknown foo").await, Dispatch::Unknown("unknown".into()));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_line_only_erases() {
        let calls = Calls::default();
        let term = Arc::new(ScriptedTerminal::new(&[]));
        let con = console(Arc::clone(&term), &calls);
        assert_eq!(con.dispatch("   ").await, Dispatch::Blank);
        assert_eq!(*term.erased.lock().unwrap(), 1);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn erase_can_be_disabled() {
        let calls = Calls::default();
        let term = Arc::new(ScriptedTerminal::new(&[]));
        let config = ConsoleConfig {
            erase_input: false,
            ..ConsoleConfig::default()
        };
        let con = console(Arc::clone(&term), &calls).configure(&config);
        con.dispatch("").await;
        con.dispatch("echo hi").await;
        assert_eq!(*term.erased.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn run_processes_script_in_order() {
        let calls = Calls::default();
        let term = Arc::new(ScriptedTerminal::new(&[
            "echo one",
            "",
            "nope",
            "E two",
            "echo",
            "echo three four",
        ]));
        let con = console(Arc::clone(&term), &calls);
        con.run(&CancellationToken::new()).await;

        let texts: Vec<String> = calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, a)| a.text(0).unwrap().to_string())
            .collect();
        assert_eq!(texts, ["one", "two"]);
        // Six lines plus the end-of-input read.
        assert_eq!(*term.reads.lock().unwrap(), 7);
    }

    #[tokio::test]
    async fn run_prints_prompt_before_each_read() {
        let calls = Calls::default();
        let term = Arc::new(ScriptedTerminal::new(&["echo a"]));
        let config = ConsoleConfig {
            prompt: "> ".into(),
            ..ConsoleConfig::default()
        };
        let con = console(Arc::clone(&term), &calls).configure(&config);
        con.run(&CancellationToken::new()).await;
        assert_eq!(*term.output.lock().unwrap(), "> > ");
    }

    #[tokio::test]
    async fn cancelled_before_start_reads_nothing() {
        let calls = Calls::default();
        let term = Arc::new(ScriptedTerminal::new(&["echo a"]));
        let con = console(Arc::clone(&term), &calls);
        let token = CancellationToken::new();
        token.cancel();
        con.run(&token).await;
        assert_eq!(*term.reads.lock().unwrap(), 0);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_abandons_pending_read() {
        let calls = Calls::default();
        let term = Arc::new(ScriptedTerminal::hanging(&[]));
        let con = console(Arc::clone(&term), &calls);
        let token = CancellationToken::new();

        tokio::join!(con.run(&token), async {
            // Let the loop block on its read first.
            while *term.reads.lock().unwrap() == 0 {
                tokio::task::yield_now().await;
            }
            token.cancel();
        });

        assert_eq!(*term.reads.lock().unwrap(), 1);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn command_can_cancel_the_loop() {
        let calls = Calls::default();
        let token = CancellationToken::new();
        let term = Arc::new(ScriptedTerminal::hanging(&["echo a", "quit", "echo b"]));
        let mut builder = CommandRegistry::builder();
        builder
            .register(Box::new(echo(&calls)))
            .register(Box::new(quit(&token, &calls)));
        let con = Console::new(builder.build().unwrap(), Arc::clone(&term) as Arc<dyn Terminal>);

        con.run(&token).await;

        assert_eq!(called(&calls), ["echo", "quit"]);
        assert_eq!(*term.reads.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn failing_commands_do_not_stop_the_loop() {
        let calls = Calls::default();
        let term = Arc::new(ScriptedTerminal::new(&["echo", "echo a b", "zzz", "echo ok"]));
        let con = console(Arc::clone(&term), &calls);
        con.run(&CancellationToken::new()).await;
        assert_eq!(called(&calls), ["echo"]);
    }
}
