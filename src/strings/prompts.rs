//! # Prompts
//!
//! Prompt text sent to the chat backends.

/// System instruction for the auto-comment job.
pub const COMMENT_INSTRUCTION: &str = "Generate a relevant, friendly Reddit comment for the post below. \
Reply with the comment text only.";

/// Bodies longer than this are cut before prompting.
const MAX_BODY_CHARS: usize = 4000;

pub fn comment_prompt(title: &str, body: &str) -> String {
    let body: String = body.chars().take(MAX_BODY_CHARS).collect();
    format!("Post: {title}\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_prompt_contains_post() {
        let prompt = comment_prompt("Hello", "World");
        assert_eq!(prompt, "Post: Hello\nWorld");
    }

    #[test]
    fn test_comment_prompt_truncates_body() {
        let body = "x".repeat(MAX_BODY_CHARS * 2);
        let prompt = comment_prompt("t", &body);
        assert_eq!(prompt.len(), "Post: t\n".len() + MAX_BODY_CHARS);
    }
}
