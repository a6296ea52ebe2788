//! Output parser for engine event streams.
//!
//! Engines emit one JSON event per line, interleaved with progress and
//! diagnostic noise. Each line is decoded on its own; lines that do not
//! decode are dropped without affecting the rest of the stream.

use serde::Deserialize;

/// A decoded line of engine output.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum OutputEvent {
    #[serde(rename = "message")]
    Message {
        #[serde(default)]
        content: Option<MessageContent>,
    },

    #[serde(rename = "output_text")]
    OutputText { text: String },

    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ContentPart {
    fn is_text(&self) -> bool {
        matches!(self.kind.as_str(), "text" | "output_text")
    }
}

impl OutputEvent {
    fn into_fragments(self) -> Vec<String> {
        match self {
            OutputEvent::Message {
                content: Some(MessageContent::Text(text)),
            } => vec![text],
            OutputEvent::Message {
                content: Some(MessageContent::Parts(parts)),
            } => parts
                .into_iter()
                .filter(ContentPart::is_text)
                .filter_map(|part| part.text)
                .collect(),
            OutputEvent::OutputText { text } => vec![text],
            OutputEvent::Message { content: None } | OutputEvent::Other => Vec::new(),
        }
    }
}

fn decode_line(line: &str) -> Option<OutputEvent> {
    serde_json::from_str(line).ok()
}

/// Extract the natural-language answer from raw engine output.
///
/// Falls back to the raw text unchanged when no recognised event was found.
pub fn extract_text(raw: &str) -> String {
    let text = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(decode_line)
        .flat_map(OutputEvent::into_fragments)
        .collect::<Vec<_>>()
        .join("\n");

    if text.is_empty() {
        raw.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_and_output_text_are_joined() {
        let raw = "{\"type\":\"message\",\"content\":\"hi\"}\n{\"type\":\"output_text\",\"text\":\"there\"}";
        assert_eq!(extract_text(raw), "hi\nthere");
    }

    #[test]
    fn plain_text_is_returned_unchanged() {
        let raw = "Here is my analysis.\n\nIt has two paragraphs.\n";
        assert_eq!(extract_text(raw), raw);
    }

    #[test]
    fn noise_lines_are_skipped() {
        let raw = "[2025-01-01] starting session\n\
                   {\"type\":\"output_text\",\"text\":\"first\"}\n\
                   {not json at all\n\
                   \n\
                   {\"type\":\"output_text\",\"text\":\"second\"}\n";
        assert_eq!(extract_text(raw), "first\nsecond");
    }

    #[test]
    fn message_parts_keep_only_text_in_order() {
        let raw = r#"{"type":"message","content":[{"type":"output_text","text":"a"},{"type":"image","url":"x"},{"type":"text","text":"b"}]}"#;
        assert_eq!(extract_text(raw), "a\nb");
    }

    #[test]
    fn other_event_kinds_are_ignored() {
        let raw = "{\"type\":\"turn.started\"}\n\
                   {\"type\":\"reasoning\",\"text\":\"thinking\"}\n\
                   {\"type\":\"output_text\",\"text\":\"done\"}";
        assert_eq!(extract_text(raw), "done");
    }

    #[test]
    fn malformed_events_are_dropped() {
        // Valid JSON, wrong shapes: no type, non-string text, non-object.
        let raw = "{\"text\":\"untyped\"}\n\
                   {\"type\":\"output_text\",\"text\":42}\n\
                   [1,2,3]\n\
                   {\"type\":\"message\",\"content\":\"kept\"}";
        assert_eq!(extract_text(raw), "kept");
    }

    #[test]
    fn only_unrecognised_events_fall_back_to_raw() {
        let raw = "{\"type\":\"turn.started\"}\n{\"type\":\"turn.completed\"}";
        assert_eq!(extract_text(raw), raw);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(extract_text(""), "");
    }
}
