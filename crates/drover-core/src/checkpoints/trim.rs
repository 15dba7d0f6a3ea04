//! Manual history trimming

use serde_json::{Value, json};

use crate::llm::{Content, Part, Role};

/// Start of the text that replaces an oversized tool output
pub const TRIMMED_OUTPUT_PREFIX: &str = "[tool output trimmed:";

/// Keep the last `window` turns of `history`
///
/// A turn is an entry together with the tool responses that follow it, so a
/// kept response always has its call. Tool responses kept in the window whose
/// payload exceeds `threshold_bytes` are replaced by a placeholder naming the
/// original size. Relative order is preserved.
pub fn trim_history(history: &[Content], window: usize, threshold_bytes: usize) -> Vec<Content> {
    let starts = turn_starts(history);
    let start = match starts.len().checked_sub(window) {
        Some(skip) if window > 0 => starts[skip],
        Some(_) => history.len(),
        None => 0,
    };
    let mut replaced = 0usize;

    let trimmed: Vec<Content> = history[start..]
        .iter()
        .map(|content| {
            let parts = content
                .parts
                .iter()
                .map(|part| match part {
                    Part::FunctionResponse { id, name, response } => {
                        let size = payload_size(response);
                        if size > threshold_bytes {
                            replaced += 1;
                            Part::FunctionResponse {
                                id: id.clone(),
                                name: name.clone(),
                                response: placeholder(response, size),
                            }
                        } else {
                            part.clone()
                        }
                    }
                    other => other.clone(),
                })
                .collect();
            Content {
                role: content.role,
                parts,
            }
        })
        .collect();

    tracing::debug!(
        before = history.len(),
        after = trimmed.len(),
        replaced = replaced,
        "Trimmed history"
    );
    trimmed
}

/// Indices of the entries that open a turn
fn turn_starts(history: &[Content]) -> Vec<usize> {
    history
        .iter()
        .enumerate()
        .filter(|(_, content)| !is_tool_response(content))
        .map(|(index, _)| index)
        .collect()
}

fn is_tool_response(content: &Content) -> bool {
    content.role == Role::User
        && !content.parts.is_empty()
        && content
            .parts
            .iter()
            .all(|part| matches!(part, Part::FunctionResponse { .. }))
}

/// Byte length of the payload a response carries
fn payload_size(response: &Value) -> usize {
    match response.get("output").or_else(|| response.get("error")) {
        Some(Value::String(s)) => s.len(),
        Some(other) => other.to_string().len(),
        None => response.to_string().len(),
    }
}

fn placeholder(response: &Value, size: usize) -> Value {
    let text = format!("{} original size {} bytes]", TRIMMED_OUTPUT_PREFIX, size);
    match response.get("error") {
        Some(_) => {
            let mut replaced = response.clone();
            replaced["error"] = Value::String(text);
            replaced
        }
        None => json!({ "output": text }),
    }
}
