use std::io::{self, Write};

use dotenv::dotenv;
use ollama_tutor::{CompletionClient, GenerationChunk, GenerationConfig, OllamaConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let client = CompletionClient::new(OllamaConfig::from_env())?;
    let config = GenerationConfig::from_env();

    // Batched: the whole answer arrives at once.
    let request = GenerationConfig {
        stream: false,
        ..config.clone()
    }
    .request("Explique o conceito de frações para um estudante de nível fácil.")?;
    let result = client.generate(request, None).await;
    println!("Batched:\n{}\n", result.display_text());

    // Streamed: fragments are printed as they are decoded.
    let request = config.request("Resolva passo a passo: 2x + 3 = 11.")?;
    println!("Streamed:");
    let mut print = |chunk: &GenerationChunk| {
        print!("{}", chunk.text);
        let _ = io::stdout().flush();
    };
    let result = client.generate(request, Some(&mut print)).await;
    println!();

    match (result.error, result.usage) {
        (Some(error), _) => eprintln!("Error: {error}"),
        (None, Some(usage)) => println!(
            "Tokens: {} prompt + {} completion",
            usage.prompt_tokens, usage.completion_tokens
        ),
        (None, None) => {}
    }

    Ok(())
}
