use anyhow::Result;
use clap::{Parser, Subcommand};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::sync::Arc;
use termimad::MadSkin;
use tymora_core::traits::CharacterStore;
use tymora_core::{agent, config, party, providers, tools};

mod onboard;

#[derive(Parser)]
#[command(name = "tymora")]
#[command(about = "tymora - dice and character sheets for your 5e table", long_about = None)]
struct Cli {
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Onboard,
    Chat {
        #[arg(short, long)]
        message: Option<String>,

        #[arg(short, long)]
        character: Option<String>,
    },
    Roster,
    Sheet {
        name: String,
    },
}

fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let command = cli.command.unwrap_or_else(|| {
        if !config::config_exists() {
            Commands::Onboard
        } else {
            Commands::Chat {
                message: None,
                character: None,
            }
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
        Commands::Chat { message, character } => run_chat(message, character).await?,
        Commands::Roster => run_roster()?,
        Commands::Sheet { name } => run_sheet(&name)?,
    }

    Ok(())
}

async fn run_chat(message: Option<String>, character: Option<String>) -> Result<()> {
    let config = config::load_config()?;

    if !config.workspace_dir.exists() {
        std::fs::create_dir_all(&config.workspace_dir)?;
    }

    let store = Arc::new(party::PartyStore::load_or_demo(&config.party_path())?);
    let provider = providers::create_provider(&config)?;

    let mut registry = agent::ToolRegistry::new();
    registry.register(Box::new(tools::DiceRollTool));
    registry.register(Box::new(tools::CharacterSheetTool::new(store.clone())));

    let agent_loop = agent::AgentLoop::new(
        provider,
        agent::PromptBuilder::new(store),
        Arc::new(registry),
    )
    .with_max_tokens(config.max_tokens)
    .with_max_tool_rounds(config.max_tool_rounds);

    let character = character.or_else(|| config.character.clone());

    if let Some(message) = message {
        return deliver(&agent_loop, &message, character.as_deref()).await;
    }

    println!("🎲 Tymora is listening. Type your prompt (Ctrl+D to leave the table).\n");

    let mut editor = DefaultEditor::new()?;
    let history_path = config.history_path();
    let _ = editor.load_history(&history_path);

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);

                if let Err(e) = deliver(&agent_loop, line, character.as_deref()).await {
                    eprintln!("❌ Error: {}", e);
                }
                println!();
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("👋 May fortune favor you!");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let _ = editor.save_history(&history_path);
    Ok(())
}

// Replies stream through the sink while the model may still be rolling,
// so printing happens on its own task.
async fn deliver(
    agent_loop: &agent::AgentLoop,
    message: &str,
    character: Option<&str>,
) -> Result<()> {
    let (sink, mut replies) = agent::ReplySink::channel(agent::DEFAULT_SINK_CAPACITY);

    let printer = tokio::spawn(async move {
        let skin = MadSkin::default();
        while let Some(reply) = replies.recv().await {
            skin.print_text(&reply);
        }
    });

    let outcome = agent_loop.handle_prompt(message, character, &sink).await;
    drop(sink);
    printer.await?;

    outcome.map(|_| ())
}

fn run_roster() -> Result<()> {
    let config = config::Config::load_or_init()?;
    let store = party::PartyStore::load_or_demo(&config.party_path())?;

    println!("{}", console::style("The party").bold());
    for sheet in store.sheets() {
        println!(
            "  {} - {} {}",
            console::style(&sheet.name).cyan(),
            sheet.race,
            sheet.class_summary()
        );
    }

    Ok(())
}

fn run_sheet(name: &str) -> Result<()> {
    let config = config::Config::load_or_init()?;
    let store = party::PartyStore::load_or_demo(&config.party_path())?;

    let Some(sheet) = store.lookup(name) else {
        anyhow::bail!("character '{}' not found in the party", name);
    };

    println!(
        "{} - {} {}, level {}",
        console::style(&sheet.name).bold().cyan(),
        sheet.race,
        sheet.class_summary(),
        sheet.total_character_level
    );
    println!();
    for (ability, value) in sheet.abilities() {
        let marker = if value.proficient { " (proficient)" } else { "" };
        println!("  {:<13} {:>2}{}", ability, value.score, marker);
    }
    if !sheet.skill_proficiencies.is_empty() {
        println!("\n  Skills:  {}", sheet.skill_proficiencies.join(", "));
    }
    if !sheet.weapon_proficiencies.is_empty() {
        println!("  Weapons: {}", sheet.weapon_proficiencies.join(", "));
    }
    for note in &sheet.other {
        println!("  Note: {}", note);
    }

    Ok(())
}
