use std::path::PathBuf;

use anyhow::{Context, bail};

use mail_triage::agent::TriageAgent;
use mail_triage::config::AgentConfig;
use mail_triage::email::Email;
use mail_triage::llm::LlmConfig;

const USAGE: &str = "Usage:
  mail-triage triage <email>...   Triage emails and print them as JSON
  mail-triage draft <email>       Print a draft reply

Emails are .json files or raw RFC 822 messages.
Environment: OPENAI_API_KEY (required), TRIAGE_MODEL, TRIAGE_BACKEND, OPENAI_API_BASE,
             TRIAGE_INSTRUCTIONS, TRIAGE_WRITING_PROMPT, TRIAGE_RESEARCH_PROMPT";

enum Command {
    Triage(Vec<PathBuf>),
    Draft(PathBuf),
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    match args {
        [cmd, paths @ ..] if cmd == "triage" && !paths.is_empty() => {
            Ok(Command::Triage(paths.iter().map(PathBuf::from).collect()))
        }
        [cmd, path] if cmd == "draft" => Ok(Command::Draft(PathBuf::from(path))),
        _ => bail!("invalid arguments\n\n{USAGE}"),
    }
}

fn load(path: &PathBuf) -> anyhow::Result<Email> {
    Email::load(path).with_context(|| format!("failed to load {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    let llm_config = LlmConfig::from_env()?;
    let agent = TriageAgent::from_config(&llm_config, AgentConfig::from_env())?;

    eprintln!("📬 Mail Triage v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", llm_config.backend.as_str());
    eprintln!("   Model: {}\n", llm_config.model);

    match command {
        Command::Triage(paths) => {
            let mut emails = paths.iter().map(load).collect::<anyhow::Result<Vec<_>>>()?;
            agent.process_batch(&mut emails).await;
            println!("{}", serde_json::to_string_pretty(&emails)?);
        }
        Command::Draft(path) => {
            let mut email = load(&path)?;
            let draft = agent.generate_draft(&mut email).await;
            if draft.is_empty() {
                eprintln!("No draft generated");
            }
            println!("{draft}");
        }
    }

    Ok(())
}
