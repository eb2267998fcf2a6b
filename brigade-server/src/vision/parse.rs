//! Tolerant parsing of the JSON verdict returned by vision models
//!
//! Models wrap JSON in code fences or prose, send scores as strings or
//! floats, and occasionally drift outside 0..=100.

use serde_json::Value;

use super::{VisionError, VisionVerdict};

/// Extract the `{...}` object from raw model text
fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_score(value: &Value) -> Option<i32> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, 100.0) as i32)
}

fn parse_approved(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "approved" | "pass" | "passed" => Some(true),
            "false" | "no" | "rejected" | "fail" | "failed" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Parse a model reply into a verdict
pub fn parse_verdict(text: &str) -> Result<VisionVerdict, VisionError> {
    let object = extract_object(text)
        .ok_or_else(|| VisionError::BadResponse("no JSON object in reply".into()))?;
    let value: Value = serde_json::from_str(object)
        .map_err(|e| VisionError::BadResponse(format!("invalid JSON: {e}")))?;

    let score = value
        .get("score")
        .and_then(parse_score)
        .ok_or_else(|| VisionError::BadResponse("missing or invalid score".into()))?;
    let approved = value
        .get("approved")
        .and_then(parse_approved)
        .ok_or_else(|| VisionError::BadResponse("missing or invalid approved".into()))?;
    let feedback = value
        .get("feedback")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    Ok(VisionVerdict {
        approved,
        score,
        feedback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json() {
        let v = parse_verdict(r#"{"approved": true, "score": 88, "feedback": "Clean."}"#).unwrap();
        assert!(v.approved);
        assert_eq!(v.score, 88);
        assert_eq!(v.feedback, "Clean.");
    }

    #[test]
    fn fenced_json_with_prose() {
        let text = "Here is my assessment:\n```json\n{\"approved\": false, \"score\": 40, \"feedback\": \"Grease on the hood.\"}\n```\nLet me know!";
        let v = parse_verdict(text).unwrap();
        assert!(!v.approved);
        assert_eq!(v.score, 40);
    }

    #[test]
    fn score_as_float_or_string() {
        assert_eq!(parse_verdict(r#"{"approved":true,"score":72.6}"#).unwrap().score, 73);
        assert_eq!(parse_verdict(r#"{"approved":true,"score":"65"}"#).unwrap().score, 65);
        assert_eq!(parse_verdict(r#"{"approved":true,"score":"90%"}"#).unwrap().score, 90);
    }

    #[test]
    fn score_clamped() {
        assert_eq!(parse_verdict(r#"{"approved":true,"score":140}"#).unwrap().score, 100);
        assert_eq!(parse_verdict(r#"{"approved":false,"score":-5}"#).unwrap().score, 0);
    }

    #[test]
    fn approved_as_string() {
        assert!(parse_verdict(r#"{"approved":"yes","score":80}"#).unwrap().approved);
        assert!(!parse_verdict(r#"{"approved":"false","score":80}"#).unwrap().approved);
    }

    #[test]
    fn missing_feedback_is_empty() {
        assert_eq!(parse_verdict(r#"{"approved":true,"score":80}"#).unwrap().feedback, "");
    }

    #[test]
    fn unusable_replies() {
        for text in [
            "I cannot see the image.",
            "{not json}",
            r#"{"approved": true}"#,
            r#"{"score": 50}"#,
            r#"{"approved": "maybe", "score": 50}"#,
            r#"{"approved": true, "score": "high"}"#,
        ] {
            assert!(
                matches!(parse_verdict(text), Err(VisionError::BadResponse(_))),
                "{text}"
            );
        }
    }
}
