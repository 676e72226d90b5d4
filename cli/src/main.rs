use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rebo_core::{AgentError, AgentLoop, ChatMessage, Services, config};
use rustyline::error::ReadlineError;
use termimad::MadSkin;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod facts;
mod onboard;

#[derive(Parser)]
#[command(name = "rebo")]
#[command(about = "rebo - your conversational assistant with memory, search and crypto data", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Onboard,
    Chat {
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Inspect and edit remembered facts
    Facts {
        #[command(subcommand)]
        command: facts::FactsCommands,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "rebo_core=debug,rebo=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_reply(skin: &MadSkin, reply: &str) {
    skin.print_text(reply);
}

/// Typed turn failures get a friendlier line than the full error chain.
fn describe_error(e: &anyhow::Error) -> String {
    match e.downcast_ref::<AgentError>() {
        Some(AgentError::MalformedArguments { tool, .. }) => {
            format!("The model sent garbled arguments for {tool}. Please try again.")
        }
        Some(AgentError::MissingArgument { tool, argument }) => {
            format!("The model called {tool} without '{argument}'. Please try again.")
        }
        Some(AgentError::Tool { tool, source }) => format!("{tool} failed: {source:#}"),
        None => format!("{e:#}"),
    }
}

async fn run_repl(agent: &AgentLoop, skin: &MadSkin) -> Result<()> {
    println!("Rebo");
    println!("Type your message (Ctrl+D to exit):\n");

    let mut rl = rustyline::DefaultEditor::new().context("Failed to initialize line editor")?;
    let mut history: Vec<ChatMessage> = Vec::new();

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                if input == "exit" || input == "quit" {
                    println!("\nGoodbye!");
                    break;
                }
                let _ = rl.add_history_entry(input);

                match agent.process_with_history(input, &history).await {
                    Ok(reply) => {
                        println!();
                        print_reply(skin, &reply);
                        history.push(ChatMessage::user(input));
                        history.push(ChatMessage::assistant(reply));
                    }
                    Err(e) => eprintln!("❌ Error: {}", describe_error(&e)),
                }
                println!();
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or_else(|| {
        if !config::config_exists() {
            Commands::Onboard
        } else {
            Commands::Chat { message: None }
        }
    });

    match command {
        Commands::Onboard => {
            let onboard_config = onboard::run_onboard().map_err(|e| {
                eprintln!("❌ Onboarding failed: {}", e);
                anyhow::anyhow!("Onboarding failed: {}", e)
            })?;
            config::save_config(&onboard_config)?;
        }
        Commands::Chat { message } => {
            let config = config::load_config()?;
            debug!(
                provider = config.provider.as_deref().unwrap_or("openai"),
                model = %config.model,
                memory = ?config.memory.backend,
                "loaded config"
            );
            let services = Services::from_config(&config)?;
            let agent = AgentLoop::new(services);
            let skin = MadSkin::default();

            if let Some(msg) = message {
                match agent.process(&msg).await {
                    Ok(reply) => print_reply(&skin, &reply),
                    Err(e) => {
                        eprintln!("❌ Error: {}", describe_error(&e));
                        return Err(e);
                    }
                }
            } else {
                run_repl(&agent, &skin).await?;
            }
        }
        Commands::Facts { command } => {
            let config = config::load_config()?;
            facts::handle_command(command, &config).await?;
        }
    }

    Ok(())
}
