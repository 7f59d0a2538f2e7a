//! Practice questions

use serde::{Deserialize, Serialize};

pub const DEFAULT_PRACTICE_TOPIC: &str = "general debate";
pub const DEFAULT_DIFFICULTY: &str = "medium";

/// A drill prompt for solo practice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeQuestion {
    pub question: String,
    pub key_points: Vec<String>,
    pub research_areas: Vec<String>,
    pub time_limit: String,
    pub difficulty: String,
}

/// Build a practice question. Blank inputs use the defaults.
pub fn practice_question(topic: Option<&str>, difficulty: Option<&str>) -> PracticeQuestion {
    let topic = non_blank(topic).unwrap_or(DEFAULT_PRACTICE_TOPIC);
    let difficulty = non_blank(difficulty).unwrap_or(DEFAULT_DIFFICULTY);

    let time_limit = match difficulty.to_ascii_lowercase().as_str() {
        "easy" => "10 minutes preparation, 3 minutes presentation",
        "hard" => "2 minutes preparation, 3 minutes presentation",
        _ => "5 minutes preparation, 3 minutes presentation",
    };

    PracticeQuestion {
        question: format!("Should {} be regulated more strictly?", topic),
        key_points: vec![
            "Economic impact".to_string(),
            "Social implications".to_string(),
            "Ethical considerations".to_string(),
        ],
        research_areas: vec![
            "Current policies".to_string(),
            "Case studies".to_string(),
            "Expert opinions".to_string(),
        ],
        time_limit: time_limit.to_string(),
        difficulty: difficulty.to_string(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
