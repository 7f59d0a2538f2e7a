//! Structured coaching feedback

use serde::{de, Deserialize, Deserializer, Serialize};

/// Lowest score a record may carry
pub const MIN_SCORE: u8 = 1;
/// Highest score a record may carry
pub const MAX_SCORE: u8 = 10;

/// Structured analysis of one debate message.
///
/// Serializes to exactly seven fields; clients depend on this shape. The
/// `evidence` and `perfect_answer` aliases accept the key names older
/// prompts asked the model for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u8,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub counterarguments: Vec<String>,
    #[serde(alias = "evidence")]
    pub evidence_suggestions: Vec<String>,
    pub overall_feedback: String,
    #[serde(alias = "perfect_answer")]
    pub ideal_answer: String,
}

/// Clamp any integer into the score range
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(MIN_SCORE as i64, MAX_SCORE as i64) as u8
}

/// Accepts integers, floats (rounded) and numeric strings, clamped to 1..=10.
fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let raw = match RawScore::deserialize(deserializer)? {
        RawScore::Int(n) => n,
        RawScore::Float(f) if f.is_finite() => f.round() as i64,
        RawScore::Float(f) => {
            return Err(de::Error::custom(format!("score is not finite: {}", f)));
        }
        RawScore::Text(s) => {
            let trimmed = s.trim();
            // "8/10" style answers keep the numerator
            let head = trimmed.split('/').next().unwrap_or(trimmed).trim();
            head.parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| f.round() as i64)
                .ok_or_else(|| de::Error::custom(format!("score is not numeric: {:?}", s)))?
        }
    };
    Ok(clamp_score(raw))
}

/// Where a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Parsed from the model's reply
    Model,
    /// Substituted because the reply could not be parsed
    Fallback,
}

/// A record plus the provenance flag callers use to tell real feedback
/// from the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackOutcome {
    pub record: FeedbackRecord,
    pub provenance: Provenance,
}

impl FeedbackOutcome {
    pub fn is_fallback(&self) -> bool {
        self.provenance == Provenance::Fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(score: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "score": score,
            "strengths": ["a"],
            "improvements": ["b"],
            "counterarguments": ["c"],
            "evidence_suggestions": ["d"],
            "overall_feedback": "ok",
            "ideal_answer": "better"
        })
    }

    #[test]
    fn test_serializes_seven_fields() {
        let record: FeedbackRecord = serde_json::from_value(sample_json(8.into())).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 7);
        assert!(value.get("evidence_suggestions").is_some());
        assert!(value.get("ideal_answer").is_some());
    }

    #[test]
    fn test_score_coercion() {
        let cases = [
            (serde_json::json!(12), 10),
            (serde_json::json!(0), 1),
            (serde_json::json!(-4), 1),
            (serde_json::json!(6.6), 7),
            (serde_json::json!("9"), 9),
            (serde_json::json!("8/10"), 8),
        ];
        for (raw, expected) in cases {
            let record: FeedbackRecord = serde_json::from_value(sample_json(raw.clone())).unwrap();
            assert_eq!(record.score, expected, "raw score {}", raw);
        }
    }

    #[test]
    fn test_rejects_non_numeric_score() {
        assert!(serde_json::from_value::<FeedbackRecord>(sample_json("great".into())).is_err());
        assert!(serde_json::from_value::<FeedbackRecord>(sample_json(serde_json::Value::Null)).is_err());
    }

    #[test]
    fn test_legacy_aliases() {
        let value = serde_json::json!({
            "score": 5,
            "strengths": [],
            "improvements": [],
            "counterarguments": [],
            "evidence": ["polls"],
            "overall_feedback": "fine",
            "perfect_answer": "say this"
        });
        let record: FeedbackRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.evidence_suggestions, vec!["polls"]);
        assert_eq!(record.ideal_answer, "say this");
    }
}
