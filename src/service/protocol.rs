//! @ai:module:intent Request shaping and answer extraction for each recognizer protocol
//! @ai:module:layer infrastructure
//! @ai:module:public_api Protocol, extract_latex_command
//! @ai:module:stateless true

use crate::answer::Answer;
use crate::corpus::Strokes;
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// @ai:intent Wire protocol spoken by a recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Hwrt,
    Detexify,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Hwrt => "hwrt",
            Protocol::Detexify => "detexify",
        }
    }

    /// @ai:intent Decode a recognizer response body into raw answers
    /// @ai:effects pure
    pub fn extract_answers(&self, service: &str, body: &str) -> Result<Vec<Answer>> {
        let unavailable = |e: serde_json::Error| Error::ClassifierUnavailable {
            service: service.to_string(),
            reason: format!("invalid response: {}", e),
        };

        match self {
            Protocol::Hwrt => {
                let guesses: Vec<HwrtGuess> = serde_json::from_str(body).map_err(unavailable)?;
                Ok(guesses.into_iter().map(HwrtGuess::into_answer).collect())
            }
            Protocol::Detexify => {
                let response: DetexifyResponse =
                    serde_json::from_str(body).map_err(unavailable)?;
                let guesses = match response {
                    DetexifyResponse::Wrapped { results } => results,
                    DetexifyResponse::Bare(results) => results,
                };
                Ok(guesses.into_iter().map(DetexifyGuess::into_answer).collect())
            }
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent hwrt form body; strokes travel as a JSON string
#[derive(Debug, Serialize)]
pub struct HwrtRequest {
    secret: &'static str,
    classify: String,
}

impl HwrtRequest {
    pub fn new(strokes: &Strokes) -> Result<Self> {
        Ok(Self {
            secret: "",
            classify: serde_json::to_string(strokes)?,
        })
    }
}

#[derive(Debug, Serialize)]
struct DetexifyPoint {
    x: f64,
    y: f64,
    t: f64,
}

/// @ai:intent detexify JSON body, points use `t` instead of `time`
#[derive(Debug, Serialize)]
pub struct DetexifyRequest {
    strokes: Vec<Vec<DetexifyPoint>>,
}

impl DetexifyRequest {
    pub fn new(strokes: &Strokes) -> Self {
        Self {
            strokes: strokes
                .0
                .iter()
                .map(|stroke| {
                    stroke
                        .iter()
                        .map(|p| DetexifyPoint {
                            x: p.x,
                            y: p.y,
                            t: p.time,
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HwrtGuess {
    semantics: String,
    probability: f64,
}

impl HwrtGuess {
    /// Only the first semantic is kept; semantics are separated by `;;`.
    fn into_answer(self) -> Answer {
        let first = self.semantics.split(";;").next().unwrap_or_default();
        let mut fields = first.split(';');
        let _dataset_id = fields.next();
        let latex_command = fields.next().unwrap_or_default();
        let unicode = fields
            .next()
            .and_then(|dec| dec.trim().parse::<u32>().ok())
            .map(format_codepoint)
            .unwrap_or_default();

        Answer::new(latex_command, self.probability).with_unicode(unicode)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DetexifyResponse {
    Wrapped { results: Vec<DetexifyGuess> },
    Bare(Vec<DetexifyGuess>),
}

#[derive(Debug, Deserialize)]
struct DetexifyGuess {
    id: String,
    score: f64,
}

impl DetexifyGuess {
    fn into_answer(self) -> Answer {
        let package = self.id.split('-').next().unwrap_or_default().to_string();
        Answer::new(extract_latex_command(&self.id), self.score).with_package(package)
    }
}

/// @ai:intent Format a decimal codepoint as `U+XXXX`
/// @ai:effects pure
pub fn format_codepoint(codepoint: u32) -> String {
    format!("U+{:X}", codepoint)
}

fn detexify_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(?:[^-]*-){1,2}(?P<command>.*)$").expect("valid regex"))
}

/// @ai:intent Extract the latex command from a detexify identifier
///            Old identifiers escape the backslash as `_`, new ones keep it
/// @ai:effects pure
pub fn extract_latex_command(id: &str) -> String {
    let command = detexify_id_pattern()
        .captures(id)
        .and_then(|c| c.name("command"))
        .map(|m| m.as_str())
        .unwrap_or(id);

    let command = command.replace('_', "\\");
    if command == "\\\\" {
        return "\\_".to_string();
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Point;

    #[test]
    fn test_extract_latex_command_old_and_new_formats() {
        let cases = [
            ("amssymb-OT1-\\not_sim", "\\not\\sim"),
            ("amssymb-OT1-\\diagdown", "\\diagdown"),
            ("latex2e-OT1-\\----", "\\----"),
            ("latex2e-OT1-\\\\", "\\_"),
            ("tipa-OT1-_textsca", "\\textsca"),
            ("latex2e-OT1-_----", "\\----"),
            ("latex2e-OT1-__", "\\_"),
            ("latex2e-OT1-]", "]"),
            ("latex2e-OT1-!`", "!`"),
        ];

        for (id, expected) in cases {
            assert_eq!(extract_latex_command(id), expected, "id: {}", id);
        }
    }

    #[test]
    fn test_extract_hwrt_answers() {
        let body = r#"[
            {"semantics": "31;\\alpha;945;;32;a;97", "probability": 0.8},
            {"semantics": "40;\\propto;8733", "probability": 0.1}
        ]"#;
        let answers = Protocol::Hwrt.extract_answers("hwrt", body).unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers[0].symbol_class, "\\alpha");
        assert_eq!(answers[0].unicode, "U+3B1");
        assert_eq!(answers[1].symbol_class, "\\propto");
    }

    #[test]
    fn test_extract_detexify_answers_both_shapes() {
        let wrapped = r#"{"results": [{"id": "latex2e-OT1-_alpha", "score": 0.12}]}"#;
        let bare = r#"[{"id": "latex2e-OT1-\\alpha", "score": 0.12}]"#;

        for body in [wrapped, bare] {
            let answers = Protocol::Detexify.extract_answers("detexify", body).unwrap();
            assert_eq!(answers.len(), 1);
            assert_eq!(answers[0].symbol_class, "\\alpha");
            assert_eq!(answers[0].package, "latex2e");
        }
    }

    #[test]
    fn test_extract_invalid_body_is_unavailable() {
        let err = Protocol::Hwrt.extract_answers("hwrt", "<html>").unwrap_err();
        assert!(matches!(err, Error::ClassifierUnavailable { .. }));
    }

    #[test]
    fn test_detexify_request_renames_time() {
        let strokes = Strokes(vec![vec![Point { x: 1.0, y: 2.0, time: 3.0 }]]);
        let json = serde_json::to_string(&DetexifyRequest::new(&strokes)).unwrap();
        assert_eq!(json, r#"{"strokes":[[{"x":1.0,"y":2.0,"t":3.0}]]}"#);
    }
}
