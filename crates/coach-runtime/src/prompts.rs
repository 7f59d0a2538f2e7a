//! Prompt and search-query construction

use coach_core::{DebateTurn, EvidenceItem, Message, Position, Sender};

/// Persona for feedback requests
pub const COACH_ROLE: &str = "You are an expert debate coach. You assess arguments for quality, \
evidence, structure and persuasiveness, and you answer in strict JSON when asked to.";

/// Persona for counter-argument requests
pub const OPPONENT_ROLE: &str = "You are a skilled debate opponent who argues firmly but keeps \
a respectful coaching tone.";

/// Trailing transcript entries shown to the coach
pub const FEEDBACK_WINDOW: usize = 3;
/// Trailing transcript entries shown to the opponent
pub const COUNTER_WINDOW: usize = 2;

/// Search query backing the feedback request
pub fn feedback_query(topic: &str) -> String {
    format!("{} evidence statistics facts research", topic)
}

/// Search query backing the AI's rebuttal
pub fn counter_query(topic: &str, ai_position: Position) -> String {
    format!("{} {} arguments evidence research", topic, ai_position)
}

fn render_history(window: &[Message], empty: &str) -> String {
    if window.is_empty() {
        return empty.to_string();
    }
    window
        .iter()
        .map(|m| {
            let who = match m.sender {
                Sender::User => "User",
                Sender::Ai => "AI",
            };
            format!("\n  [{}] {}: {}", m.sequence_number, who, m.text)
        })
        .collect()
}

fn render_evidence(header: &str, evidence: &[EvidenceItem]) -> String {
    if evidence.is_empty() {
        return String::new();
    }
    let mut out = format!("{}\n", header);
    for item in evidence {
        out.push_str("- ");
        out.push_str(&item.snippet);
        out.push('\n');
    }
    out
}

/// Build the feedback prompt. `history` is the transcript before this
/// message; only its last [`FEEDBACK_WINDOW`] entries are used.
pub fn feedback_prompt(turn: &DebateTurn, history: &[Message], evidence: &[EvidenceItem]) -> String {
    let start = history.len().saturating_sub(FEEDBACK_WINDOW);
    format!(
        r#"Analyze this debate message.

Debate Topic: {topic}
User's Position: {position}
Message #{count}
User's Message: {message}
Previous Context: {context}

{evidence}
Provide detailed feedback as a single JSON object with exactly these keys:
{{
  "score": integer from 1 to 10 based on argument quality, evidence, structure, persuasiveness,
  "strengths": ["specific positive elements in this argument"],
  "improvements": ["specific actionable improvements"],
  "counterarguments": ["actual counterarguments opponents would make"],
  "evidence_suggestions": ["specific types of evidence that would strengthen this exact argument"],
  "overall_feedback": "comprehensive coaching feedback paragraph",
  "ideal_answer": "a complete, well-structured argument showing what they should have said"
}}

For ideal_answer, write an actual debate argument that makes the same point with superior structure, evidence and persuasiveness. Include specific facts where possible.

IMPORTANT: Return ONLY the JSON object, with no markdown formatting and no additional text. The response must start with {{ and end with }}."#,
        topic = turn.topic,
        position = turn.position,
        count = turn.message_count,
        message = turn.message,
        context = render_history(&history[start..], "This is the opening statement"),
        evidence = render_evidence("Recent web research findings:", evidence),
    )
}

/// Build the counter-argument prompt. Uses the last [`COUNTER_WINDOW`]
/// entries of `history`.
pub fn counter_prompt(turn: &DebateTurn, history: &[Message], evidence: &[EvidenceItem]) -> String {
    let start = history.len().saturating_sub(COUNTER_WINDOW);
    let ai_position = turn.ai_position();
    format!(
        "You are debating the topic: {topic}\n\
         Your position: {ai_position}\n\
         User just said: {message}\n\
         Previous context: {context}\n\
         \n\
         {evidence}\n\
         Provide a thoughtful counter-response that:\n\
         1. Acknowledges their point respectfully\n\
         2. Presents a strong {ai_position} argument with specific evidence\n\
         3. Uses facts from the research provided when relevant\n\
         4. Challenges their reasoning while maintaining a coaching tone\n\
         5. Asks a thought-provoking question to advance the debate\n\
         \n\
         Keep the response conversational but substantive (150-250 words).",
        topic = turn.topic,
        ai_position = ai_position,
        message = turn.message,
        context = render_history(&history[start..], "Opening"),
        evidence = render_evidence("Use these recent facts in your response:", evidence),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_core::Transcript;

    fn turn() -> DebateTurn {
        DebateTurn::from_parts(
            Some("u1"),
            Some("Remote work should be mandatory"),
            Some("for"),
            Some("Remote work increases productivity."),
            Some(3),
        )
        .unwrap()
    }

    #[test]
    fn test_queries() {
        assert_eq!(
            feedback_query("School uniforms"),
            "School uniforms evidence statistics facts research"
        );
        assert_eq!(
            counter_query("School uniforms", Position::Against),
            "School uniforms against arguments evidence research"
        );
    }

    #[test]
    fn test_feedback_prompt_opening() {
        let prompt = feedback_prompt(&turn(), &[], &[]);
        assert!(prompt.contains("Debate Topic: Remote work should be mandatory"));
        assert!(prompt.contains("User's Position: for"));
        assert!(prompt.contains("Message #3"));
        assert!(prompt.contains("This is the opening statement"));
        assert!(prompt.contains("\"evidence_suggestions\""));
        assert!(prompt.contains("JSON"));
        assert!(!prompt.contains("Recent web research findings"));
    }

    #[test]
    fn test_feedback_prompt_windows_history() {
        let mut transcript = Transcript::new();
        for text in ["m1", "m2", "m3", "m4", "m5"] {
            transcript.push(Sender::User, text);
        }
        let evidence = vec![EvidenceItem::new("t", "Productivity rose 13%.", "s")];
        let prompt = feedback_prompt(&turn(), transcript.messages(), &evidence);

        assert!(!prompt.contains("m2"));
        assert!(prompt.contains("m3") && prompt.contains("m5"));
        assert!(prompt.contains("Recent web research findings:\n- Productivity rose 13%."));
    }

    #[test]
    fn test_counter_prompt() {
        let mut transcript = Transcript::new();
        transcript.push(Sender::User, "first claim");
        transcript.push(Sender::Ai, "first rebuttal");
        transcript.push(Sender::User, "second claim");

        let prompt = counter_prompt(&turn(), transcript.messages(), &[]);
        assert!(prompt.contains("Your position: against"));
        assert!(prompt.contains("Presents a strong against argument"));
        assert!(prompt.contains("150-250 words"));
        assert!(!prompt.contains("first claim"));
        assert!(prompt.contains("AI: first rebuttal"));
        assert!(!prompt.contains("JSON"));

        assert!(counter_prompt(&turn(), &[], &[]).contains("Previous context: Opening"));
    }
}
