//! Prompt templates used by the tutor.
//!
//! The wording is Brazilian Portuguese and is sent verbatim; only the
//! placeholders change between calls.

/// Prepended to every prompt before it is sent.
pub const PROMPT_PREFIX: &str = "TUTOR: ";

pub const DEFAULT_LANGUAGE: &str = "português do Brasil";

pub fn explain_concept(concept: &str, difficulty: &str, language: &str) -> String {
    format!(
        "Explique o conceito de {concept} para um estudante de nível {difficulty}. Dê a sua resposta em {language}."
    )
}

pub fn generate_problem(concept: &str, difficulty: &str, language: &str) -> String {
    format!(
        "Gere um problema {difficulty} sobre {concept} para um estudante praticar. Não forneça a resposta, apenas a questão. Dê a sua resposta em {language}."
    )
}

pub fn solve_problem(problem: &str, language: &str) -> String {
    format!(
        "Resolva o seguinte problema, mostrando uma explicação passo a passo: {problem}. Dê a sua resposta em {language}."
    )
}

pub fn adjust_explanation(student_answer: &str, language: &str) -> String {
    format!(
        "A resposta do estudante foi: {student_answer}. Retorne um feedback sobre a resposta do estudante com uma explicação adicional caso seja necessário. Dê a sua resposta em {language}."
    )
}

pub fn answer_question(question: &str, language: &str) -> String {
    format!("Responda de forma clara e objetiva: {question}. Dê a sua resposta em {language}.")
}

/// Asks the model to tag free-form student input with one of the
/// [`TutorAction`](super::TutorAction) markers.
pub fn classify_intent(user_input: &str) -> String {
    format!(
        "O aluno disse: '{user_input}'. Classifique esta entrada e responda exatamente no formato '--<classificacao>--', onde 'classificacao' pode ser problema, pergunta ou sair. Exemplo de resposta válida: '--problema--'. Logo, você tem 4 alternativas de respostas:\n'--problema--'\n'--pergunta--'\n'--sair--'\n'não entendi'"
    )
}
