//! Interactive session: one command per stdin line, events as they happen.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use smallwins_core::{CallKind, ChatMode, Command, Config, Event, Session, SessionRuntime};
use tokio::io::{AsyncBufReadExt, BufReader};

/// One line typed into the session.
#[derive(Parser)]
#[command(no_binary_name = true)]
struct Line {
    #[command(subcommand)]
    action: LineAction,
}

#[derive(Subcommand)]
enum LineAction {
    /// Show level, streak, timer and board summary
    Status,
    /// List today's goals
    Goals,
    /// Micro goal actions
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },
    /// Focus timer actions
    Timer {
        #[command(subcommand)]
        action: TimerAction,
    },
    /// Rival room actions
    Rival {
        #[command(subcommand)]
        action: RivalAction,
    },
    /// Activity history actions
    Activity {
        #[command(subcommand)]
        action: ActivityAction,
    },
    /// Anonymous board actions; `chat send <text>` posts the text as typed
    Chat {
        #[command(subcommand)]
        action: ChatAction,
    },
    /// Ask for a voice or video call
    Call { kind: CallArg },
    /// End the session
    Quit,
}

#[derive(Subcommand)]
enum GoalAction {
    /// Mark a goal as done
    Done { id: u32 },
}

#[derive(Subcommand)]
enum TimerAction {
    /// Start or pause
    Toggle,
    /// Show mode and remaining time
    Status,
}

#[derive(Subcommand)]
enum RivalAction {
    /// Join the rival room
    Join,
}

#[derive(Subcommand)]
enum ActivityAction {
    /// Log an activity (study, walk, outing, stretching)
    Log { name: String },
    /// Show last-week daily averages
    Summary,
}

#[derive(Subcommand)]
enum ChatAction {
    /// Choose where messages go
    Mode { mode: ChatModeArg },
    /// Show the combined history
    History,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChatModeArg {
    OneLine,
    Chatbot,
}

impl From<ChatModeArg> for ChatMode {
    fn from(arg: ChatModeArg) -> Self {
        match arg {
            ChatModeArg::OneLine => ChatMode::OneLine,
            ChatModeArg::Chatbot => ChatMode::Chatbot,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CallArg {
    Voice,
    Video,
}

impl From<CallArg> for CallKind {
    fn from(arg: CallArg) -> Self {
        match arg {
            CallArg::Voice => CallKind::Voice,
            CallArg::Video => CallKind::Video,
        }
    }
}

#[derive(PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Printer {
    json: bool,
}

impl Printer {
    fn events(&self, events: &[Event]) -> Result<(), serde_json::Error> {
        for event in events {
            if self.json {
                println!("{}", serde_json::to_string(event)?);
            } else {
                println!("{}", event.describe());
            }
        }
        Ok(())
    }

    fn listing<T: Serialize>(
        &self,
        value: &T,
        text: impl FnOnce() -> String,
    ) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = rt.block_on(drive(Session::from_config(&config), Printer { json }));
    // Stdin is read on a blocking thread that may still be parked on a read.
    rt.shutdown_background();
    result
}

async fn drive(session: Session, printer: Printer) -> Result<(), Box<dyn std::error::Error>> {
    let mut runtime = SessionRuntime::new(session);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    tracing::debug!("session started");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if handle_line(&mut runtime, &printer, &line)? == Flow::Quit {
                    break;
                }
            }
            Some(events) = runtime.next_events() => printer.events(&events)?,
        }
    }

    runtime.teardown();
    Ok(())
}

fn handle_line(
    runtime: &mut SessionRuntime,
    printer: &Printer,
    line: &str,
) -> Result<Flow, Box<dyn std::error::Error>> {
    if let Some(text) = chat_send_text(line) {
        return dispatch(runtime, printer, Command::SendMessage { text: text.to_owned() });
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(Flow::Continue);
    }
    let parsed = match Line::try_parse_from(words) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", e.render());
            return Ok(Flow::Continue);
        }
    };

    let command = match parsed.action {
        LineAction::Quit => return Ok(Flow::Quit),
        LineAction::Status => {
            printer.events(&[runtime.session().snapshot()])?;
            return Ok(Flow::Continue);
        }
        LineAction::Goals => {
            let goals = runtime.session().goals();
            printer.listing(&goals, || {
                goals
                    .iter()
                    .map(|g| {
                        format!(
                            "[{}] {}. {} (+{} XP)",
                            if g.done { "x" } else { " " },
                            g.id,
                            g.title,
                            g.experience_reward
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            return Ok(Flow::Continue);
        }
        LineAction::Timer { action: TimerAction::Status } => {
            let timer = runtime.session().timer();
            let status = serde_json::json!({
                "mode": timer.mode(),
                "remaining": timer.display(),
                "running": timer.is_running(),
                "control": timer.toggle_label(),
            });
            printer.listing(&status, || {
                format!("{} {} [{}]", timer.mode().label(), timer.display(), timer.toggle_label())
            })?;
            return Ok(Flow::Continue);
        }
        LineAction::Activity { action: ActivityAction::Summary } => {
            let summaries = runtime.session().activity_summaries();
            printer.listing(&summaries, || {
                summaries
                    .iter()
                    .map(|s| format!("{}: {} min per day on average", s.name, s.average_minutes))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            return Ok(Flow::Continue);
        }
        LineAction::Chat { action: ChatAction::History } => {
            let history = runtime.session().history();
            printer.listing(&history, || {
                history
                    .iter()
                    .map(|m| format!("{}: {}", m.author, m.text))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            return Ok(Flow::Continue);
        }
        LineAction::Goal { action: GoalAction::Done { id } } => Command::CompleteGoal { id },
        LineAction::Timer { action: TimerAction::Toggle } => Command::ToggleTimer,
        LineAction::Rival { action: RivalAction::Join } => Command::JoinRivalRoom,
        LineAction::Activity { action: ActivityAction::Log { name } } => Command::LogActivity { name },
        LineAction::Chat { action: ChatAction::Mode { mode } } => {
            Command::SwitchChatMode { mode: mode.into() }
        }
        LineAction::Call { kind } => Command::RequestCall { kind: kind.into() },
    };

    dispatch(runtime, printer, command)
}

fn dispatch(
    runtime: &mut SessionRuntime,
    printer: &Printer,
    command: Command,
) -> Result<Flow, Box<dyn std::error::Error>> {
    match runtime.dispatch(command) {
        Ok(events) => printer.events(&events)?,
        Err(e) => eprintln!("error: {e}"),
    }
    Ok(Flow::Continue)
}

/// Message text of a `chat send` line, exactly as typed after the one
/// separator following `send`. Bypasses clap so spacing and leading
/// dashes (`-h`, `--version`) reach the board untouched.
fn chat_send_text(line: &str) -> Option<&str> {
    let rest = line
        .trim_start()
        .strip_prefix("chat")?
        .strip_prefix(char::is_whitespace)?
        .trim_start()
        .strip_prefix("send")?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Option<LineAction> {
        Line::try_parse_from(line.split_whitespace()).ok().map(|l| l.action)
    }

    #[test]
    fn parses_goal_done() {
        assert!(matches!(
            parse("goal done 2"),
            Some(LineAction::Goal { action: GoalAction::Done { id: 2 } })
        ));
        assert!(parse("goal done two").is_none());
    }

    #[test]
    fn chat_send_keeps_text_as_typed() {
        assert_eq!(chat_send_text("chat send a   b"), Some("a   b"));
        assert_eq!(chat_send_text("  chat  send keep -going  "), Some("keep -going  "));
        assert_eq!(chat_send_text("chat send  indented"), Some(" indented"));
        assert_eq!(chat_send_text("chat send"), Some(""));
    }

    #[test]
    fn chat_send_does_not_treat_flags_as_help() {
        assert_eq!(chat_send_text("chat send -h"), Some("-h"));
        assert_eq!(chat_send_text("chat send --help"), Some("--help"));
        assert_eq!(chat_send_text("chat send --version"), Some("--version"));
    }

    #[test]
    fn other_chat_lines_go_through_clap() {
        assert_eq!(chat_send_text("chat mode chatbot"), None);
        assert_eq!(chat_send_text("chat sender hi"), None);
        assert_eq!(chat_send_text("chatsend hi"), None);
        assert_eq!(chat_send_text("goal done 1"), None);
        assert!(matches!(
            parse("chat history"),
            Some(LineAction::Chat { action: ChatAction::History })
        ));
    }

    #[test]
    fn parses_kebab_case_modes() {
        assert!(matches!(
            parse("chat mode one-line"),
            Some(LineAction::Chat { action: ChatAction::Mode { mode: ChatModeArg::OneLine } })
        ));
        assert!(matches!(parse("call video"), Some(LineAction::Call { kind: CallArg::Video })));
    }
}
