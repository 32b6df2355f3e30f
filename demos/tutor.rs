use std::io::{self, Write};

use dotenv::dotenv;
use ollama_tutor::tutor::{is_affirmative, is_negative, read_answer};
use ollama_tutor::{
    CompletionClient, GenerationChunk, GenerationConfig, GenerationResult, OllamaConfig, Tutor,
    TutorAction, TutorSession,
};
use tracing_subscriber::EnvFilter;

fn ask(question: &str) -> io::Result<String> {
    print!("TUTOR: {question} ");
    io::stdout().flush()?;
    read_answer(&mut io::stdin().lock())
}

fn print_chunk(chunk: &GenerationChunk) {
    print!("{}", chunk.text);
    let _ = io::stdout().flush();
}

/// Streamed text is already on screen; only batched text and errors still need printing.
fn show(result: &GenerationResult, streamed: bool) -> String {
    if !streamed || !result.is_success() {
        println!("{}", result.display_text());
    } else {
        println!("\n");
    }
    result.text.clone()
}

async fn run_session(tutor: &Tutor<CompletionClient>) -> io::Result<()> {
    let streamed = tutor.config().stream;

    let concept = ask("Qual assunto você deseja estudar?")?;
    let difficulty = ask("Qual a dificuldade desejada (fácil, médio, difícil)?")?;
    let session = TutorSession::new(concept, difficulty);
    println!(
        "TUTOR: Vamos começar com uma breve explicação sobre {}.",
        session.concept
    );

    let mut sink = print_chunk;
    show(&tutor.explain_concept(&session, Some(&mut sink)).await, streamed);

    loop {
        let input = ask(
            "O que deseja fazer agora? Você pode pedir um problema, fazer uma pergunta ou encerrar o programa, digitando 'sair'. Digite sua solicitação:",
        )?;

        match tutor.classify_intent(&input).await {
            TutorAction::Problem => {
                let result = tutor.generate_problem(&session, Some(&mut sink)).await;
                let problem = show(&result, streamed);

                let answer = ask("Qual sua resposta para este problema?")?;
                show(&tutor.adjust_explanation(&answer, Some(&mut sink)).await, streamed);

                let more =
                    ask("Você gostaria de uma explicação mais detalhada sobre a solução? (Sim/Não)")?;
                if is_affirmative(&more) {
                    show(&tutor.solve_problem(&problem, Some(&mut sink)).await, streamed);
                }
            }
            TutorAction::Question => {
                let question = ask("Qual sua dúvida?")?;
                show(&tutor.answer_question(&question, Some(&mut sink)).await, streamed);
            }
            TutorAction::Exit => {
                println!("TUTOR: Foi um prazer ensinar você! Até a próxima!");
                return Ok(());
            }
            TutorAction::Unknown => {
                println!("TUTOR: Não entendi, pode reformular sua solicitação?");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    println!(
        "TUTOR: Olá! Sou seu tutor de álgebra. Podemos conversar sobre qualquer conceito que você quiser aprender. Basta perguntar!"
    );

    let client = CompletionClient::new(OllamaConfig::from_env())?;
    let tutor = Tutor::new(client, GenerationConfig::from_env());

    loop {
        let outcome = run_session(&tutor)
            .await
            .and_then(|()| ask("Deseja continuar estudando? (Sim/Não):"));

        match outcome {
            Ok(again) if is_negative(&again) => {
                println!("TUTOR: Até a próxima!");
                break;
            }
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                println!("\nTUTOR: Até a próxima!");
                break;
            }
            Err(e) => {
                println!("\nTUTOR: Erro: {e}");
                break;
            }
        }
    }

    Ok(())
}
