//! # Parsing Utils
//!
//! Turns raw chat text into a command name and argument tokens.

/// Splits `.name arg1 arg2` into `("name", ["arg1", "arg2"])`.
///
/// Returns `None` for messages that do not start with `prefix` or carry no command name.
/// A `@botname` suffix on the command (as some clients add) is dropped.
pub fn parse_command(message: &str, prefix: &str) -> Option<(String, Vec<String>)> {
    let body = message.trim().strip_prefix(prefix)?;
    let mut tokens = body.split_whitespace();

    let name = tokens.next()?;
    let name = name.split('@').next().unwrap_or(name);
    if name.is_empty() {
        return None;
    }

    Some((name.to_string(), tokens.map(String::from).collect()))
}
