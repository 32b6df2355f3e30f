use std::io::{self, BufRead};

use tracing::debug;

use super::prompts::{self, DEFAULT_LANGUAGE, PROMPT_PREFIX};
use crate::core::{ChunkSink, GenerationConfig, GenerationResult, TextGenerator};

/// What the student is studying right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TutorSession {
    pub concept: String,
    pub difficulty: String,
}

impl TutorSession {
    pub fn new(concept: impl Into<String>, difficulty: impl Into<String>) -> Self {
        Self {
            concept: concept.into(),
            difficulty: difficulty.into(),
        }
    }
}

/// Intent extracted from the model's classification reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorAction {
    Problem,
    Question,
    Exit,
    Unknown,
}

impl TutorAction {
    pub fn parse(reply: &str) -> Self {
        let reply = reply.trim().to_lowercase();
        if reply.contains("--problema--") {
            TutorAction::Problem
        } else if reply.contains("--pergunta--") {
            TutorAction::Question
        } else if reply.contains("--sair--") {
            TutorAction::Exit
        } else {
            TutorAction::Unknown
        }
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "sim" | "s")
}

pub fn is_negative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "não" | "nao")
}

/// Read one trimmed line of student input.
///
/// A closed input yields `UnexpectedEof`, so an interactive loop cannot
/// mistake it for an empty answer and spin.
pub fn read_answer<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "student input closed",
        ));
    }
    Ok(line.trim().to_string())
}

/// Builds tutor prompts and sends them through a [`TextGenerator`].
pub struct Tutor<G> {
    generator: G,
    config: GenerationConfig,
    language: String,
}

impl<G: TextGenerator> Tutor<G> {
    pub fn new(generator: G, config: GenerationConfig) -> Self {
        Self {
            generator,
            config,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub async fn explain_concept(
        &self,
        session: &TutorSession,
        on_chunk: Option<ChunkSink<'_>>,
    ) -> GenerationResult {
        let prompt = prompts::explain_concept(&session.concept, &session.difficulty, &self.language);
        self.ask(prompt, on_chunk).await
    }

    pub async fn generate_problem(
        &self,
        session: &TutorSession,
        on_chunk: Option<ChunkSink<'_>>,
    ) -> GenerationResult {
        let prompt =
            prompts::generate_problem(&session.concept, &session.difficulty, &self.language);
        self.ask(prompt, on_chunk).await
    }

    pub async fn solve_problem(
        &self,
        problem: &str,
        on_chunk: Option<ChunkSink<'_>>,
    ) -> GenerationResult {
        self.ask(prompts::solve_problem(problem, &self.language), on_chunk)
            .await
    }

    pub async fn adjust_explanation(
        &self,
        student_answer: &str,
        on_chunk: Option<ChunkSink<'_>>,
    ) -> GenerationResult {
        self.ask(
            prompts::adjust_explanation(student_answer, &self.language),
            on_chunk,
        )
        .await
    }

    pub async fn answer_question(
        &self,
        question: &str,
        on_chunk: Option<ChunkSink<'_>>,
    ) -> GenerationResult {
        self.ask(prompts::answer_question(question, &self.language), on_chunk)
            .await
    }

    /// Classify free-form input. A failed call is treated as `Unknown`.
    pub async fn classify_intent(&self, user_input: &str) -> TutorAction {
        let result = self.ask(prompts::classify_intent(user_input), None).await;
        let action = match result.into_result() {
            Ok(reply) => TutorAction::parse(&reply),
            Err(_) => TutorAction::Unknown,
        };
        debug!(?action, "Classified student input");
        action
    }

    async fn ask(&self, prompt: String, on_chunk: Option<ChunkSink<'_>>) -> GenerationResult {
        match self.config.request(format!("{PROMPT_PREFIX}{prompt}")) {
            Ok(request) => self.generator.generate(request, on_chunk).await,
            Err(e) => GenerationResult::failure(String::new(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_detects_markers_case_insensitively() {
        assert_eq!(TutorAction::parse("  --PROBLEMA--\n"), TutorAction::Problem);
        assert_eq!(TutorAction::parse("'--pergunta--'"), TutorAction::Question);
        assert_eq!(TutorAction::parse("Resposta: --sair--"), TutorAction::Exit);
        assert_eq!(TutorAction::parse("não entendi"), TutorAction::Unknown);
        assert_eq!(TutorAction::parse(""), TutorAction::Unknown);
    }

    #[test]
    fn yes_no_answers() {
        assert!(is_affirmative("Sim"));
        assert!(is_affirmative(" s "));
        assert!(!is_affirmative("não"));

        assert!(is_negative("NÃO"));
        assert!(is_negative("nao"));
        assert!(!is_negative("sim"));
    }

    #[test]
    fn read_answer_trims_the_line() {
        let mut input = io::Cursor::new("  frações \r\nsim\n");
        assert_eq!(read_answer(&mut input).unwrap(), "frações");
        assert_eq!(read_answer(&mut input).unwrap(), "sim");
    }

    #[test]
    fn read_answer_reports_end_of_input() {
        let mut input = io::Cursor::new("\n");
        assert_eq!(read_answer(&mut input).unwrap(), "");

        let err = read_answer(&mut input).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
