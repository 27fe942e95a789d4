//! # Speech
//!
//! Transcription through a Whisper-compatible `/audio/transcriptions` endpoint and
//! synthesis through Google's translate TTS, which only accepts short fragments, so long
//! text is split on word boundaries and the returned MP3 frames are concatenated.

use bytes::BytesMut;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::domain::config::SpeechConfig;
use crate::domain::error::{Failure, ServiceResult};
use crate::domain::types::Attachment;
use crate::infrastructure::http::{check, http_client, transport_failure};

const STT: &str = "speech_to_text";
const TTS: &str = "text_to_speech";
const TTS_CHUNK_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct Transcription {
    #[serde(default)]
    text: String,
}

pub struct SpeechClient {
    stt_endpoint: String,
    stt_model: String,
    api_key: Option<String>,
    tts_endpoint: String,
}

impl SpeechClient {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            stt_endpoint: config.stt_endpoint.trim_end_matches('/').to_string(),
            stt_model: config.stt_model.clone(),
            api_key: config.api_key(),
            tts_endpoint: config.tts_endpoint.clone(),
        }
    }

    pub async fn transcribe(&self, audio: &Attachment) -> ServiceResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Failure::unauthorized(format!("[{STT}] no API key configured")))?;

        let file = Part::bytes(audio.data.to_vec())
            .file_name(audio.file_name.clone())
            .mime_str(&audio.mime)
            .map_err(|e| Failure::invalid_input(format!("unsupported audio type: {e}")))?;
        let form = Form::new()
            .text("model", self.stt_model.clone())
            .part("file", file);

        let response = http_client()
            .post(format!("{}/audio/transcriptions", self.stt_endpoint))
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_failure(STT, &e))?;
        let transcription: Transcription = check(STT, response)
            .await?
            .json()
            .await
            .map_err(|e| transport_failure(STT, &e))?;

        Ok(transcription.text.trim().to_string())
    }

    pub async fn synthesize(&self, lang: &str, text: &str) -> ServiceResult<Attachment> {
        let chunks = chunk_text(text, TTS_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(Failure::invalid_input("nothing to speak"));
        }

        let total = chunks.len().to_string();
        let mut audio = BytesMut::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let idx = idx.to_string();
            let textlen = chunk.chars().count().to_string();
            let response = http_client()
                .get(&self.tts_endpoint)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", lang),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await
                .map_err(|e| transport_failure(TTS, &e))?;
            let bytes = check(TTS, response)
                .await?
                .bytes()
                .await
                .map_err(|e| transport_failure(TTS, &e))?;
            audio.extend_from_slice(&bytes);
        }

        Ok(Attachment::new(audio.freeze(), "audio/mpeg", "speech.mp3"))
    }
}

/// Splits `text` into pieces of at most `max_chars` characters, breaking between words.
/// A single word longer than the limit is cut.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            chunks.push(word.drain(..max_chars).collect());
        }
        if word.is_empty() {
            continue;
        }

        let extra = if current.is_empty() { word.len() } else { word.len() + 1 };
        if current_len + extra > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(chunk_text("  hello   world ", 200), vec!["hello world"]);
        assert!(chunk_text("   ", 200).is_empty());
    }

    #[test]
    fn test_breaks_between_words() {
        assert_eq!(
            chunk_text("aaa bbb ccc dd", 7),
            vec!["aaa bbb", "ccc dd"]
        );
    }

    #[test]
    fn test_long_word_is_cut() {
        assert_eq!(chunk_text("ab abcdefgh c", 4), vec!["ab", "abcd", "efgh", "c"]);
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let chunks = chunk_text("ééé ààà", 7);
        assert_eq!(chunks, vec!["ééé ààà"]);
    }

    #[test]
    fn test_chunks_respect_limit() {
        let text = "lorem ipsum dolor sit amet ".repeat(40);
        let chunks = chunk_text(&text, TTS_CHUNK_CHARS);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= TTS_CHUNK_CHARS));
        assert_eq!(chunks.join(" "), text.trim());
    }

    #[tokio::test]
    async fn test_transcribe_requires_key() {
        let client = SpeechClient {
            stt_endpoint: "http://127.0.0.1:9".to_string(),
            stt_model: "whisper-1".to_string(),
            api_key: None,
            tts_endpoint: "http://127.0.0.1:9".to_string(),
        };
        let audio = Attachment::new(vec![0u8; 4], "audio/ogg", "voice.ogg");
        let err = client.transcribe(&audio).await.unwrap_err();
        assert_eq!(err.kind, crate::domain::error::ErrorKind::Unauthorized);
    }
}
