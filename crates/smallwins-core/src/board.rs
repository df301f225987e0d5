//! Anonymous board: a one-line room and a chatbot sharing one history.
//!
//! The chatbot is canned. A send in chatbot mode asks the caller to deliver
//! the reply later via [`AnonymousBoard::deliver_bot_reply`]; scheduling that
//! delay is the session runtime's job.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;

pub const BOT_AUTHOR: &str = "bot";
pub const ANONYMOUS_AUTHOR: &str = "anonymous user";
pub const SELF_AUTHOR: &str = "me";

/// Canned chatbot answer.
pub const BOT_REPLY: &str = "What a great thought! I'm cheering for your next goal too.";

/// Delay before the canned answer appears.
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// One-line room post.
    Line,
    /// Daily prompt from the bot.
    Question,
    /// Chatbot answer.
    Bot,
    /// The user's own message to the chatbot.
    Chatbot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    #[default]
    OneLine,
    Chatbot,
}

impl ChatMode {
    pub fn label(&self) -> &'static str {
        match self {
            ChatMode::OneLine => "one-line room",
            ChatMode::Chatbot => "chatbot",
        }
    }

    /// Input hint shown for this mode.
    pub fn placeholder(&self) -> &'static str {
        match self {
            ChatMode::OneLine => "Leave a message of support...",
            ChatMode::Chatbot => "Tell the chatbot anything...",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Voice,
    Video,
}

impl CallKind {
    pub fn label(&self) -> &'static str {
        match self {
            CallKind::Voice => "anonymous voice call",
            CallKind::Video => "sticker video call",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub author: String,
    pub text: String,
    pub kind: MessageKind,
}

impl Message {
    fn new(author: &str, text: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            kind,
        }
    }
}

/// Result of an accepted send.
#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub event: Event,
    /// Set when a canned bot reply is owed after this delay.
    pub reply_after: Option<Duration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymousBoard {
    mode: ChatMode,
    input: String,
    history: Vec<Message>,
    reply_delay: Duration,
}

impl Default for AnonymousBoard {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY_DELAY)
    }
}

impl AnonymousBoard {
    /// Board in one-line mode with the two seeded messages.
    pub fn new(reply_delay: Duration) -> Self {
        Self {
            mode: ChatMode::OneLine,
            input: String::new(),
            history: vec![
                Message::new(ANONYMOUS_AUTHOR, "Finally finished today's goal!", MessageKind::Line),
                Message::new(
                    BOT_AUTHOR,
                    "Question of the day: what are you most grateful to yourself for today?",
                    MessageKind::Question,
                ),
            ],
            reply_delay,
        }
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn reply_delay(&self) -> Duration {
        self.reply_delay
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn switch_mode(&mut self, mode: ChatMode) -> Event {
        self.mode = mode;
        Event::ChatModeSwitched {
            mode,
            at: Utc::now(),
        }
    }

    /// Post the input buffer. Blank input is ignored and left in place.
    pub fn send_input(&mut self) -> Option<Sent> {
        if self.input.trim().is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.input);
        let (author, kind) = match self.mode {
            ChatMode::Chatbot => (SELF_AUTHOR, MessageKind::Chatbot),
            ChatMode::OneLine => (ANONYMOUS_AUTHOR, MessageKind::Line),
        };
        self.history.push(Message::new(author, text.clone(), kind));

        let reply_after = (self.mode == ChatMode::Chatbot).then_some(self.reply_delay);
        Some(Sent {
            event: Event::MessagePosted {
                author: author.into(),
                text,
                kind,
                at: Utc::now(),
            },
            reply_after,
        })
    }

    /// Type `text` into the input and send it.
    pub fn send(&mut self, text: &str) -> Option<Sent> {
        self.set_input(text);
        self.send_input()
    }

    /// Append the canned chatbot answer.
    pub fn deliver_bot_reply(&mut self) -> Event {
        self.history
            .push(Message::new(BOT_AUTHOR, BOT_REPLY, MessageKind::Bot));
        Event::MessagePosted {
            author: BOT_AUTHOR.into(),
            text: BOT_REPLY.into(),
            kind: MessageKind::Bot,
            at: Utc::now(),
        }
    }

    /// Placeholder for real-time calls; only announces the request.
    pub fn request_call(&self, kind: CallKind) -> Event {
        tracing::debug!(?kind, "call requested, no signaling available");
        Event::CallRequested {
            kind,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_with_two_messages() {
        let board = AnonymousBoard::default();
        assert_eq!(board.history().len(), 2);
        assert_eq!(board.history()[1].kind, MessageKind::Question);
        assert_eq!(board.mode(), ChatMode::OneLine);
    }

    #[test]
    fn blank_messages_are_ignored() {
        let mut board = AnonymousBoard::default();
        assert!(board.send("").is_none());
        assert!(board.send("   \t").is_none());
        assert_eq!(board.history().len(), 2);
        assert_eq!(board.input(), "   \t");
    }

    #[test]
    fn one_line_post_is_anonymous_without_reply() {
        let mut board = AnonymousBoard::default();
        let sent = board.send("you can do it").unwrap();
        assert_eq!(sent.reply_after, None);
        let last = board.history().last().unwrap();
        assert_eq!(last.author, ANONYMOUS_AUTHOR);
        assert_eq!(last.kind, MessageKind::Line);
        assert_eq!(board.input(), "");
    }

    #[test]
    fn chatbot_post_requests_reply() {
        let mut board = AnonymousBoard::default();
        board.switch_mode(ChatMode::Chatbot);
        let sent = board.send("hello").unwrap();
        assert_eq!(sent.reply_after, Some(Duration::from_millis(500)));
        assert_eq!(board.history().len(), 3);
        assert_eq!(board.history()[2].author, SELF_AUTHOR);

        board.deliver_bot_reply();
        let last = board.history().last().unwrap();
        assert_eq!(last.kind, MessageKind::Bot);
        assert_eq!(last.text, BOT_REPLY);
    }

    #[test]
    fn text_is_kept_untrimmed() {
        let mut board = AnonymousBoard::default();
        board.send("  hi  ").unwrap();
        assert_eq!(board.history().last().unwrap().text, "  hi  ");
    }

    #[test]
    fn modes_share_history() {
        let mut board = AnonymousBoard::default();
        board.send("first").unwrap();
        board.switch_mode(ChatMode::Chatbot);
        board.send("second").unwrap();
        board.switch_mode(ChatMode::OneLine);
        let texts: Vec<_> = board.history().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(&texts[2..], ["first", "second"]);
    }
}
