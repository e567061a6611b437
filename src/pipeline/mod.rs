pub mod heuristic;
pub mod state;

use std::sync::Arc;

use crate::errors::ApiError;
use crate::evaluator::ToxicityEvaluator;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::prompts::{build_system_prompt, PromptStore};
use crate::search::SearchClient;
use crate::telemetry::{ScoreKind, SpanHandle, TraceClient, TraceHandle};

use self::state::AgentState;

/// Terminal output of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub answer: String,
    pub has_search_results: bool,
}

/// Sequences the three pipeline stages (decide-search, search, generate) over
/// a per-request state record and coordinates manual plus automated toxicity
/// scoring against the tracing backend.
///
/// All handles are constructed once at startup and passed in; the pipeline
/// itself holds no per-request state.
pub struct Pipeline {
    llm: Arc<dyn LlmProvider>,
    search: SearchClient,
    prompts: PromptStore,
    tracer: TraceClient,
    evaluator: ToxicityEvaluator,
    model: String,
    prompt_label: String,
    max_search_results: usize,
}

impl Pipeline {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        search: SearchClient,
        prompts: PromptStore,
        tracer: TraceClient,
        model: String,
        prompt_label: String,
        max_search_results: usize,
    ) -> Self {
        let evaluator = ToxicityEvaluator::new(llm.clone(), model.clone());
        Self {
            llm,
            search,
            prompts,
            tracer,
            evaluator,
            model,
            prompt_label,
            max_search_results,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.llm.name()
    }

    pub fn tracing_enabled(&self) -> bool {
        self.tracer.is_enabled()
    }

    /// Run a question through the pipeline, then apply the best-effort
    /// scoring paths. Only a generation failure is fatal to the request.
    pub async fn process_question(
        &self,
        question: &str,
        manual_toxicity: Option<f64>,
    ) -> Result<PipelineOutcome, ApiError> {
        let trace = match self.tracer.start_trace("qa-request").await {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::debug!("No active trace for this request: {}", err);
                None
            }
        };

        let mut state = AgentState::new(question);
        self.decide_search(&mut state);
        self.perform_search(&mut state).await;
        self.generate(&mut state, trace.as_ref()).await?;

        if let Some(toxicity) = manual_toxicity {
            self.record_manual_score(trace.as_ref(), toxicity).await;
        }

        if let (Some(trace), Some(answer)) = (trace.as_ref(), state.answer.as_deref()) {
            self.run_auto_evaluation(trace, &state.question, answer).await;
        }

        let answer = state
            .answer
            .take()
            .ok_or_else(|| ApiError::Internal("generation produced no answer".to_string()))?;

        Ok(PipelineOutcome {
            has_search_results: state.has_search_results(),
            answer,
        })
    }

    /// Stage 1: classify the question. Always clears any previous search
    /// results, even on a second run for the same question.
    fn decide_search(&self, state: &mut AgentState) {
        state.needs_search = heuristic::needs_search(&state.question);
        state.search_results = None;
    }

    /// Stage 2: best-effort web search. A failure stores an empty result set
    /// and the pipeline proceeds without context.
    async fn perform_search(&self, state: &mut AgentState) {
        if !state.needs_search {
            return;
        }

        let results = match self
            .search
            .research(&state.question, self.max_search_results, false)
            .await
        {
            Ok(results) => results,
            Err(err) => {
                tracing::error!("Search error: {}", err);
                Vec::new()
            }
        };

        state.search_results = Some(results);
    }

    /// Stage 3: build the system prompt from the current search context and
    /// generate the answer. The whole stage runs inside a `generation` span,
    /// closed when the stage completes either way.
    async fn generate(
        &self,
        state: &mut AgentState,
        trace: Option<&TraceHandle>,
    ) -> Result<(), ApiError> {
        let span = self.open_span(trace, "generation").await;
        let result = self.generate_answer(state, trace).await;
        self.close_span(span.as_ref()).await;
        result
    }

    /// Emits a fixed placeholder feedback score against the trace; dynamic
    /// quality signals can replace it later.
    async fn generate_answer(
        &self,
        state: &mut AgentState,
        trace: Option<&TraceHandle>,
    ) -> Result<(), ApiError> {
        let system_prompt = build_system_prompt(
            &self.prompts,
            &self.prompt_label,
            state.search_results.as_deref(),
        )
        .await;

        let request = ChatRequest::new(vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(state.question.clone()),
        ]);

        let answer = self.llm.chat(request, &self.model).await?;

        if let Some(trace) = trace {
            if let Err(err) = self
                .tracer
                .create_score("user-feedback", 1.0, &trace.trace_id, ScoreKind::Numeric, None)
                .await
            {
                tracing::warn!("Failed to record user-feedback score: {}", err);
            }
        }

        state.answer = Some(answer);
        Ok(())
    }

    /// Open a span under the active trace. Span failures degrade to a log
    /// line; the stage runs regardless.
    async fn open_span(&self, trace: Option<&TraceHandle>, name: &str) -> Option<SpanHandle> {
        let trace = trace?;
        match self.tracer.start_span(&trace.trace_id, name).await {
            Ok(span) => Some(span),
            Err(err) => {
                tracing::warn!("Failed to open {} span: {}", name, err);
                None
            }
        }
    }

    async fn close_span(&self, span: Option<&SpanHandle>) {
        if let Some(span) = span {
            if let Err(err) = self.tracer.end_span(span).await {
                tracing::warn!("Failed to close {} span: {}", span.name, err);
            }
        }
    }

    /// Record a human-supplied toxicity score against the active trace. The
    /// "received but not applied" fallback is logged only when no trace
    /// exists.
    async fn record_manual_score(&self, trace: Option<&TraceHandle>, toxicity: f64) {
        let value = toxicity.clamp(0.0, 1.0);

        let Some(trace) = trace else {
            tracing::info!(
                "Expert feedback score received: {} (not applied - no active trace)",
                value
            );
            return;
        };

        match self
            .tracer
            .create_score(
                "expert_feedback",
                value,
                &trace.trace_id,
                ScoreKind::Numeric,
                Some("User-provided expert feedback"),
            )
            .await
        {
            Ok(()) => tracing::info!(
                "Expert feedback score {} applied to trace {}",
                value,
                trace.trace_id
            ),
            Err(err) => tracing::warn!("Failed to create expert feedback score: {}", err),
        }
    }

    /// Run the automated toxicity evaluation and attach the result to the
    /// trace as an independent annotation, inside its own span.
    async fn run_auto_evaluation(&self, trace: &TraceHandle, question: &str, answer: &str) {
        let span = self.open_span(Some(trace), "toxicity-evaluation").await;
        self.evaluate_and_record(trace, question, answer).await;
        self.close_span(span.as_ref()).await;
    }

    async fn evaluate_and_record(&self, trace: &TraceHandle, question: &str, answer: &str) {
        tracing::info!(
            "Starting toxicity evaluation for answer of length {}",
            answer.len()
        );

        let evaluation = match self.evaluator.evaluate(answer, question).await {
            Ok(evaluation) => evaluation,
            Err(err) => {
                tracing::warn!("Failed to run automated toxicity evaluation: {}", err);
                return;
            }
        };

        match self
            .tracer
            .create_score(
                "llm_toxicity_evaluation",
                evaluation.score,
                &trace.trace_id,
                ScoreKind::Numeric,
                Some(&evaluation.reasoning),
            )
            .await
        {
            Ok(()) => tracing::info!(
                "Automated toxicity evaluation (score: {}) applied to trace {}",
                evaluation.score,
                trace.trace_id
            ),
            Err(err) => tracing::warn!("Failed to record toxicity evaluation score: {}", err),
        }
    }
}
