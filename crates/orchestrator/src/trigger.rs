//! Deliberation trigger heuristic.
//!
//! Decides whether a message goes through the council or a single call.
//! Precedence: tool phrases, then domain phrases, then a complexity score.
//! Matching is plain substring matching over the lowercased message, so
//! short words also match inside longer ones ("and" in "understand").

/// Phrases that suggest a tool is needed.
pub const TOOL_PHRASES: [&str; 19] = [
    "right now",
    "current",
    "latest",
    "today",
    "news",
    "headlines",
    "weather",
    "forecast",
    "search",
    "look up",
    "sources",
    "web",
    "internet",
    "image",
    "photo",
    "picture",
    "uploaded",
    "analyze",
    "describe this image",
];

/// Regulatory, construction and shelter topics.
pub const DOMAIN_PHRASES: [&str; 25] = [
    "permit",
    "permitting",
    "zoning",
    "ordinance",
    "code enforcement",
    "inspection",
    "onslow",
    "camp lejeune",
    "jacksonville nc",
    "north carolina",
    "structural",
    "engineering",
    "foundation",
    "load bearing",
    "rebar",
    "fallout shelter",
    "shelter",
    "bunker",
    "storm shelter",
    "safe room",
    "egress",
    "ventilation",
    "drainage",
    "septic",
    "setback",
];

const DEPTH_PHRASES: [&str; 5] = ["step by step", "detailed", "comprehensive", "plan", "design"];

const CONJUNCTIONS: [&str; 5] = ["and", "but", "however", "because", "whereas"];

/// Score at or above which a message is considered complex.
pub const COMPLEXITY_THRESHOLD: u32 = 2;

/// Why the heuristic decided the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Matched a tool phrase.
    ToolPhrase(&'static str),
    /// Matched a domain phrase.
    DomainPhrase(&'static str),
    /// Complexity score; deliberates iff at or above the threshold.
    Complexity(u32),
}

impl Trigger {
    pub fn deliberate(&self) -> bool {
        match self {
            Trigger::ToolPhrase(_) | Trigger::DomainPhrase(_) => true,
            Trigger::Complexity(score) => *score >= COMPLEXITY_THRESHOLD,
        }
    }
}

fn first_match(haystack: &str, phrases: &[&'static str]) -> Option<&'static str> {
    phrases.iter().copied().find(|p| haystack.contains(p))
}

/// Complexity score of a trimmed message.
///
/// - 220+ characters: +2
/// - 500+ characters: +2 more
/// - two or more question marks: +2
/// - a depth phrase ("step by step", "detailed", ...): +2
/// - a conjunction ("and", "but", ...): +1
pub fn complexity_score(message: &str) -> u32 {
    let text = message.trim();
    let lower = text.to_lowercase();
    let chars = text.chars().count();

    let mut score = 0;
    if chars >= 220 {
        score += 2;
    }
    if chars >= 500 {
        score += 2;
    }
    if text.matches('?').count() >= 2 {
        score += 2;
    }
    if first_match(&lower, &DEPTH_PHRASES).is_some() {
        score += 2;
    }
    if first_match(&lower, &CONJUNCTIONS).is_some() {
        score += 1;
    }
    score
}

/// Classify a message.
pub fn classify(message: &str) -> Trigger {
    let lower = message.trim().to_lowercase();

    if let Some(phrase) = first_match(&lower, &TOOL_PHRASES) {
        return Trigger::ToolPhrase(phrase);
    }
    if let Some(phrase) = first_match(&lower, &DOMAIN_PHRASES) {
        return Trigger::DomainPhrase(phrase);
    }
    Trigger::Complexity(complexity_score(message))
}

/// Whether a message should go through the council.
pub fn should_deliberate(message: &str) -> bool {
    classify(message).deliberate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_phrase_wins() {
        assert_eq!(
            classify("What's the WEATHER like?"),
            Trigger::ToolPhrase("weather")
        );
        assert!(should_deliberate("show me the latest"));
    }

    #[test]
    fn test_domain_phrase() {
        assert_eq!(
            classify("Do I need a permit for a deck?"),
            Trigger::DomainPhrase("permit")
        );
        assert!(should_deliberate("How deep should a bunker be?"));
    }

    #[test]
    fn test_short_plain_message_is_single_call() {
        assert_eq!(classify("hello"), Trigger::Complexity(0));
        assert!(!should_deliberate("hello"));
        assert!(!should_deliberate("   "));
    }

    #[test]
    fn test_conjunction_alone_is_not_enough() {
        assert_eq!(complexity_score("tea and biscuits"), 1);
        assert!(!should_deliberate("tea and biscuits"));
    }

    #[test]
    fn test_depth_phrase_is_enough() {
        assert!(should_deliberate("Give me a detailed answer"));
    }

    #[test]
    fn test_two_questions() {
        assert_eq!(complexity_score("Why? How?"), 2);
        assert!(should_deliberate("Why? How?"));
    }

    #[test]
    fn test_length_thresholds_count_chars() {
        let long = "x".repeat(220);
        assert_eq!(complexity_score(&long), 2);

        let very_long = "x".repeat(500);
        assert_eq!(complexity_score(&very_long), 4);

        // 219 multi-byte chars stay below the first threshold.
        let accented = "é".repeat(219);
        assert_eq!(complexity_score(&accented), 0);
    }

    #[test]
    fn test_length_ignores_surrounding_whitespace() {
        let padded = format!("   {}   ", "x".repeat(219));
        assert_eq!(complexity_score(&padded), 0);
    }

    #[test]
    fn test_substring_matching() {
        // "understand" contains "and"
        assert_eq!(complexity_score("I understand"), 1);
        // "webinar" contains "web"
        assert_eq!(classify("join the webinar"), Trigger::ToolPhrase("web"));
    }
}
