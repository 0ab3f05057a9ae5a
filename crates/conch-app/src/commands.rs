//! Demo commands for the CONCH console.
//!
//! Each command writes through the shared [`Terminal`] so the same code
//! drives stdout in the binary and an in-memory terminal in tests.

use std::sync::Arc;
use std::time::Duration;

use conch_terminal::{
    CommandHandler, EnumSpec, ParameterSpec, RegistryBuilder, TargetType, Terminal, Value,
};
use conch_types::error::Result;
use tokio_util::sync::CancellationToken;

/// Upper bound for repetition arguments of `greet` and `count`.
const MAX_REPEAT: i64 = 1000;

/// Register every demo command into `reg`.
pub fn register_demo_commands(
    reg: &mut RegistryBuilder,
    term: &Arc<dyn Terminal>,
    cancel: &CancellationToken,
) -> Result<()> {
    reg.register(Box::new(echo(term)?))
        .register(Box::new(greet(term)?))
        .register(Box::new(paint(term)?))
        .register(Box::new(add(term)?))
        .register(Box::new(count(term)?))
        .register(Box::new(wait(term)?))
        .register(Box::new(reset(term)?))
        .register(Box::new(quit(term, cancel)?));
    Ok(())
}

fn capped(n: i64) -> i64 {
    if n > MAX_REPEAT {
        log::warn!("{n} is above the limit of {MAX_REPEAT}, using {MAX_REPEAT}");
    }
    n.clamp(0, MAX_REPEAT)
}

fn say(term: &dyn Terminal, text: &str) {
    if let Err(e) = term.write(&format!("{text}\n")) {
        log::warn!("Failed to write output: {e}");
    }
}

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

fn echo(term: &Arc<dyn Terminal>) -> Result<CommandHandler> {
    let term = Arc::clone(term);
    CommandHandler::builder("echo", "Print a word back")
        .alias("e")
        .param(ParameterSpec::required("text", TargetType::String))
        .example("hello")
        .sync_body(move |args| say(term.as_ref(), args.text(0).unwrap_or_default()))
}

// ---------------------------------------------------------------------------
// greet
// ---------------------------------------------------------------------------

fn greet(term: &Arc<dyn Terminal>) -> Result<CommandHandler> {
    let term = Arc::clone(term);
    CommandHandler::builder("greet", "Greet someone, possibly several times")
        .alias("hi")
        .param(ParameterSpec::required("name", TargetType::String))
        .param(ParameterSpec::optional(
            "times",
            TargetType::Integer,
            Value::Integer(1),
        ))
        .example("Alice 3")
        .sync_body(move |args| {
            let name = args.text(0).unwrap_or_default();
            for _ in 0..capped(args.integer(1).unwrap_or(1)) {
                say(term.as_ref(), &format!("Hello, {name}!"));
            }
        })
}

// ---------------------------------------------------------------------------
// paint
// ---------------------------------------------------------------------------

fn paint(term: &Arc<dyn Terminal>) -> Result<CommandHandler> {
    let term = Arc::clone(term);
    let color = EnumSpec::new("Color", ["Red", "Green", "Blue", "Yellow"]);
    CommandHandler::builder("paint", "Pick a paint color")
        .param(ParameterSpec::required("color", TargetType::Enum(color)))
        .example("green")
        .sync_body(move |args| {
            let color = args.member(0).unwrap_or_default();
            say(term.as_ref(), &format!("Painting in {color}"));
        })
}

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

fn add(term: &Arc<dyn Terminal>) -> Result<CommandHandler> {
    let term = Arc::clone(term);
    CommandHandler::builder("add", "Add two numbers")
        .alias("sum")
        .param(ParameterSpec::required("a", TargetType::Float))
        .param(ParameterSpec::required("b", TargetType::Float))
        .example("1.5 2")
        .sync_body(move |args| {
            let sum = args.float(0).unwrap_or_default() + args.float(1).unwrap_or_default();
            say(term.as_ref(), &sum.to_string());
        })
}

// ---------------------------------------------------------------------------
// count
// ---------------------------------------------------------------------------

const DEFAULT_COUNT: i64 = 3;

fn count(term: &Arc<dyn Terminal>) -> Result<CommandHandler> {
    let term = Arc::clone(term);
    CommandHandler::builder("count", "Count up to a number (3 if omitted or unreadable)")
        .param(ParameterSpec::optional(
            "to",
            TargetType::nullable(TargetType::Integer),
            Value::Null,
        ))
        .example("5")
        .sync_body(move |args| {
            let to = capped(args.integer(0).unwrap_or(DEFAULT_COUNT));
            let numbers: Vec<String> = (1..=to).map(|n| n.to_string()).collect();
            say(term.as_ref(), &numbers.join(" "));
        })
}

// ---------------------------------------------------------------------------
// wait
// ---------------------------------------------------------------------------

fn wait(term: &Arc<dyn Terminal>) -> Result<CommandHandler> {
    let term = Arc::clone(term);
    CommandHandler::builder("wait", "Sleep for a number of seconds")
        .alias("sleep")
        .param(ParameterSpec::required("seconds", TargetType::Integer))
        .example("2")
        .body(move |args| {
            let term = Arc::clone(&term);
            async move {
                let secs = u64::try_from(args.integer(0).unwrap_or(0)).unwrap_or(0);
                tokio::time::sleep(Duration::from_secs(secs)).await;
                say(term.as_ref(), &format!("Waited {secs}s"));
            }
        })
}

// ---------------------------------------------------------------------------
// reset
// ---------------------------------------------------------------------------

fn reset(term: &Arc<dyn Terminal>) -> Result<CommandHandler> {
    let term = Arc::clone(term);
    CommandHandler::builder("reset", "Pretend to reset state, after confirmation")
        .body(move |_| {
            let term = Arc::clone(&term);
            async move {
                match term.ask("Really reset? (y/n)", Some("n")).await {
                    Ok(answer) if answer.eq_ignore_ascii_case("y") => {
                        say(term.as_ref(), "Reset done");
                    },
                    Ok(_) => say(term.as_ref(), "Reset aborted"),
                    Err(e) => log::warn!("reset: {e}"),
                }
            }
        })
}

// ---------------------------------------------------------------------------
// quit
// ---------------------------------------------------------------------------

fn quit(term: &Arc<dyn Terminal>, cancel: &CancellationToken) -> Result<CommandHandler> {
    let term = Arc::clone(term);
    let cancel = cancel.clone();
    CommandHandler::builder("quit", "Leave the console")
        .aliases(["exit", "q"])
        .ignore_extra_args()
        .sync_body(move |_| {
            say(term.as_ref(), "Bye");
            cancel.cancel();
        })
}
