//! # Command Registry
//!
//! Maps command names to typed descriptors. Built once at startup, then shared read-only
//! (behind an `Arc`) with the dispatcher, so lookups need no locking.

use std::collections::HashMap;
use thiserror::Error;

/// Every handler the dispatcher knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    Help,
    Post,
    Comment,
    StartJob,
    StopJob,
    Jobs,
    AiChat,
    Translate,
    Languages,
    SpeechToText,
    TextToSpeech,
}

/// How raw tokens become handler arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgRule {
    /// The first `n` tokens; anything after is ignored.
    Tokens(usize),
    /// The first `leading` tokens, then the remainder joined with spaces as free text.
    Text { leading: usize },
}

impl ArgRule {
    pub fn parse(&self, args: &[String]) -> ParsedArgs {
        match *self {
            ArgRule::Tokens(n) => ParsedArgs {
                tokens: args.iter().take(n).cloned().collect(),
                text: None,
            },
            ArgRule::Text { leading } => {
                let split = leading.min(args.len());
                let rest = args[split..].join(" ");
                ParsedArgs {
                    tokens: args[..split].to_vec(),
                    text: Some(rest),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub tokens: Vec<String>,
    pub text: Option<String>,
}

impl ParsedArgs {
    /// Positional token `index`, or `""` when absent.
    pub fn token(&self, index: usize) -> &str {
        self.tokens.get(index).map(String::as_str).unwrap_or("")
    }

    /// Free-text remainder, or `""` when the rule has none.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub min_args: usize,
    pub rule: ArgRule,
    pub command: Command,
    /// Argument synopsis shown in usage replies, e.g. `<lang> <text...>`.
    pub usage: &'static str,
    pub summary: &'static str,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command `{0}` is already registered")]
    DuplicateCommand(String),
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
}

#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDescriptor>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        if self.commands.contains_key(descriptor.name) {
            return Err(RegistryError::DuplicateCommand(descriptor.name.to_string()));
        }
        self.order.push(descriptor.name);
        self.commands.insert(descriptor.name, descriptor);
        Ok(())
    }

    /// Case-sensitive exact match.
    pub fn lookup(&self, name: &str) -> Result<&CommandDescriptor, RegistryError> {
        self.commands
            .get(name)
            .ok_or_else(|| RegistryError::UnknownCommand(name.to_string()))
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.order.iter().filter_map(|name| self.commands.get(name))
    }

    /// The bot's full command table.
    pub fn standard() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for descriptor in standard_descriptors() {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }
}

fn standard_descriptors() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor {
            name: "start",
            min_args: 0,
            rule: ArgRule::Tokens(0),
            command: Command::Start,
            usage: "",
            summary: "Initialize the bot",
        },
        CommandDescriptor {
            name: "help",
            min_args: 0,
            rule: ArgRule::Tokens(0),
            command: Command::Help,
            usage: "",
            summary: "Show this panel",
        },
        CommandDescriptor {
            name: "post",
            min_args: 3,
            rule: ArgRule::Text { leading: 2 },
            command: Command::Post,
            usage: "<subreddit> <title> <body...>",
            summary: "Submit a text post",
        },
        CommandDescriptor {
            name: "comment",
            min_args: 1,
            rule: ArgRule::Tokens(1),
            command: Command::Comment,
            usage: "<subreddit>",
            summary: "Comment on the newest post once",
        },
        CommandDescriptor {
            name: "start_job",
            min_args: 1,
            rule: ArgRule::Tokens(1),
            command: Command::StartJob,
            usage: "<subreddit>",
            summary: "Auto-comment on the newest post periodically",
        },
        CommandDescriptor {
            name: "stop_job",
            min_args: 1,
            rule: ArgRule::Tokens(1),
            command: Command::StopJob,
            usage: "<subreddit>",
            summary: "Stop auto-commenting",
        },
        CommandDescriptor {
            name: "jobs",
            min_args: 0,
            rule: ArgRule::Tokens(0),
            command: Command::Jobs,
            usage: "",
            summary: "List running jobs",
        },
        CommandDescriptor {
            name: "ai_chat",
            min_args: 2,
            rule: ArgRule::Text { leading: 1 },
            command: Command::AiChat,
            usage: "<deepseek|mistral> <query...>",
            summary: "Chat with a language model",
        },
        CommandDescriptor {
            name: "translate",
            min_args: 3,
            rule: ArgRule::Text { leading: 2 },
            command: Command::Translate,
            usage: "<src> <dest> <text...>",
            summary: "Translate text",
        },
        CommandDescriptor {
            name: "languages",
            min_args: 0,
            rule: ArgRule::Tokens(0),
            command: Command::Languages,
            usage: "",
            summary: "Show language codes",
        },
        CommandDescriptor {
            name: "speech_to_text",
            min_args: 0,
            rule: ArgRule::Tokens(0),
            command: Command::SpeechToText,
            usage: "(with an audio attachment)",
            summary: "Transcribe a voice message",
        },
        CommandDescriptor {
            name: "text_to_speech",
            min_args: 2,
            rule: ArgRule::Text { leading: 1 },
            command: Command::TextToSpeech,
            usage: "<lang> <text...>",
            summary: "Generate audio",
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = CommandRegistry::new();
        let descriptor = standard_descriptors().remove(0);
        registry.register(descriptor.clone()).unwrap();
        assert_eq!(
            registry.register(descriptor),
            Err(RegistryError::DuplicateCommand("start".to_string()))
        );
        assert_eq!(registry.descriptors().count(), 1);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = CommandRegistry::standard().unwrap();
        assert_eq!(registry.lookup("post").unwrap().command, Command::Post);
        assert_eq!(
            registry.lookup("POST"),
            Err(RegistryError::UnknownCommand("POST".to_string()))
        );
        assert!(registry.lookup("pos").is_err());
        assert!(registry.lookup("").is_err());
    }

    #[test]
    fn test_standard_table() {
        let registry = CommandRegistry::standard().unwrap();
        let names: Vec<_> = registry.descriptors().map(|d| d.name).collect();
        assert_eq!(names.first(), Some(&"start"));
        assert_eq!(names.len(), 12);

        let min = |name| registry.lookup(name).unwrap().min_args;
        assert_eq!(min("post"), 3);
        assert_eq!(min("start_job"), 1);
        assert_eq!(min("stop_job"), 1);
        assert_eq!(min("ai_chat"), 2);
        assert_eq!(min("translate"), 3);
        assert_eq!(min("speech_to_text"), 0);
        assert_eq!(min("text_to_speech"), 2);
        assert_eq!(min("help"), 0);
    }

    #[test]
    fn test_text_rule_joins_remainder() {
        let parsed = ArgRule::Text { leading: 2 }.parse(&tokens("rust Hello  big   world"));
        assert_eq!(parsed.token(0), "rust");
        assert_eq!(parsed.token(1), "Hello");
        assert_eq!(parsed.text(), "big world");
    }

    #[test]
    fn test_text_rule_with_short_input() {
        let parsed = ArgRule::Text { leading: 2 }.parse(&tokens("rust"));
        assert_eq!(parsed.tokens, vec!["rust".to_string()]);
        assert_eq!(parsed.token(1), "");
        assert_eq!(parsed.text(), "");
    }

    #[test]
    fn test_tokens_rule_ignores_extra() {
        let parsed = ArgRule::Tokens(1).parse(&tokens("rust please now"));
        assert_eq!(parsed.tokens, vec!["rust".to_string()]);
        assert_eq!(parsed.text, None);
    }
}
