//! Google Translate (`translate_a/single`, client `gtx`).

use serde_json::Value;

use crate::domain::config::TranslateConfig;
use crate::domain::error::{Failure, ServiceResult};
use crate::infrastructure::http::{check, http_client, transport_failure};

const SERVICE: &str = "translate";

pub struct Translator {
    endpoint: String,
}

impl Translator {
    pub fn new(config: &TranslateConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
        }
    }

    pub async fn translate(&self, source: &str, dest: &str, text: &str) -> ServiceResult<String> {
        let response = http_client()
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", dest),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| transport_failure(SERVICE, &e))?;
        let body: Value = check(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(|e| transport_failure(SERVICE, &e))?;

        extract_translation(&body)
    }
}

/// The first element of the response is a list of `[translated, original, ...]` segments,
/// one per sentence.
fn extract_translation(body: &Value) -> ServiceResult<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| Failure::unknown(format!("[{SERVICE}] unexpected response shape")))?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        return Err(Failure::unknown(format!("[{SERVICE}] empty translation")));
    }
    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_joins_sentence_segments() {
        let body = json!([
            [["Bonjour. ", "Hello. ", null, null, 10], ["Comment ça va ?", "How are you?", null, null, 10]],
            null,
            "en"
        ]);
        assert_eq!(extract_translation(&body).unwrap(), "Bonjour. Comment ça va ?");
    }

    #[test]
    fn test_rejects_unexpected_shape() {
        assert_eq!(
            extract_translation(&json!({"error": "nope"})).unwrap_err().kind,
            ErrorKind::Unknown
        );
        assert_eq!(
            extract_translation(&json!([[], null, "en"])).unwrap_err().kind,
            ErrorKind::Unknown
        );
    }
}
