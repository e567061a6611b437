/// Per-request pipeline record. Created fresh for each question, mutated
/// additively by the stages, discarded once the response is sent. Never
/// shared across concurrent requests.
#[derive(Debug, Clone)]
pub struct AgentState {
    pub question: String,
    pub needs_search: bool,
    /// `Some` only after the search stage ran; empty when the search call
    /// failed or returned nothing.
    pub search_results: Option<Vec<String>>,
    /// Set exactly once, by the generate stage.
    pub answer: Option<String>,
}

impl AgentState {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            needs_search: false,
            search_results: None,
            answer: None,
        }
    }

    pub fn has_search_results(&self) -> bool {
        self.search_results
            .as_ref()
            .map(|results| !results.is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_starts_clean() {
        let state = AgentState::new("What is AI?");
        assert_eq!(state.question, "What is AI?");
        assert!(!state.needs_search);
        assert!(state.search_results.is_none());
        assert!(state.answer.is_none());
        assert!(!state.has_search_results());
    }

    #[test]
    fn empty_search_results_do_not_count() {
        let mut state = AgentState::new("q");
        state.search_results = Some(Vec::new());
        assert!(!state.has_search_results());

        state.search_results = Some(vec!["block".to_string()]);
        assert!(state.has_search_results());
    }
}
