//! # Help Text
//!
//! Help messages for bot commands, displayed via the `.help` command.
//! The command lines themselves come from the registry so usage and help never drift.

pub const HEADER: &str = "**🤖 Courier Help**\nUse: .command _args_\n";

pub const GROUPS: &[(&str, &[&str])] = &[
    ("**📮 Reddit**", &["post", "comment", "start_job", "stop_job", "jobs"]),
    ("**🧠 AI**", &["ai_chat"]),
    (
        "**🔊 Conversion**",
        &["speech_to_text", "text_to_speech", "translate", "languages"],
    ),
    ("**⚡ Misc**", &["start", "help"]),
];

pub const AUDIO_HINT: &str = "_Voice messages are transcribed automatically._";
