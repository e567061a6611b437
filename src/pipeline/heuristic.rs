/// Keywords that suggest factual questions that might benefit from search.
const SEARCH_KEYWORDS: [&str; 19] = [
    "who",
    "what",
    "when",
    "where",
    "why",
    "how",
    "latest",
    "recent",
    "news",
    "current",
    "today",
    "definition",
    "meaning",
    "explain",
    "information",
    "data",
    "statistics",
    "facts",
    "history",
];

const INTERROGATIVES: [&str; 6] = ["who", "what", "when", "where", "why", "how"];

/// Coarse, recall-favoring classifier for whether a question warrants web
/// search: any keyword hit, a question mark, or an interrogative prefix.
pub fn needs_search(question: &str) -> bool {
    let question = question.to_lowercase();

    if SEARCH_KEYWORDS
        .iter()
        .any(|keyword| question.contains(keyword))
    {
        return true;
    }

    question.contains('?')
        || INTERROGATIVES
            .iter()
            .any(|keyword| question.starts_with(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrogative_questions_need_search() {
        assert!(needs_search("What is AI?"));
        assert!(needs_search("what is artificial intelligence"));
        assert!(needs_search("How do neural networks learn"));
        assert!(needs_search("Who invented the transistor?"));
    }

    #[test]
    fn question_mark_alone_triggers_search() {
        assert!(needs_search("AI?"));
    }

    #[test]
    fn recency_and_lookup_keywords_trigger_search() {
        assert!(needs_search("latest developments in robotics"));
        assert!(needs_search("give me statistics on energy use"));
        assert!(needs_search("definition of entropy"));
    }

    #[test]
    fn keyword_free_declaratives_do_not_need_search() {
        assert!(!needs_search("AI"));
        assert!(!needs_search("Tell me a joke"));
        assert!(!needs_search("Sing a song"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(needs_search("LATEST NEWS"));
        assert!(needs_search("WHY"));
    }
}
