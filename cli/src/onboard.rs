use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Select};
use tymora_core::config::{Config, get_config_path};
use tymora_core::party;

const BANNER: &str = r"
    -------------------------------------------------------

    ████████╗██╗   ██╗███╗   ███╗ ██████╗ ██████╗  █████╗
    ╚══██╔══╝╚██╗ ██╔╝████╗ ████║██╔═══██╗██╔══██╗██╔══██╗
       ██║    ╚████╔╝ ██╔████╔██║██║   ██║██████╔╝███████║
       ██║     ╚██╔╝  ██║╚██╔╝██║██║   ██║██╔══██╗██╔══██║
       ██║      ██║   ██║ ╚═╝ ██║╚██████╔╝██║  ██║██║  ██║
       ╚═╝      ╚═╝   ╚═╝     ╚═╝ ╚═════╝ ╚═╝  ╚═╝╚═╝  ╚═╝

    -------------------------------------------------------
";

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

fn setup_api_key() -> Result<String> {
    let api_key: String = Input::new()
        .with_prompt("Enter your Anthropic API key (blank to use ANTHROPIC_API_KEY)")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read API key")?;

    Ok(api_key)
}

fn setup_model() -> Result<String> {
    let models = vec!["claude-haiku-4-5", "claude-sonnet-4-5", "claude-opus-4-1"];

    let selection = Select::new()
        .with_prompt("Select your model")
        .items(&models)
        .default(0)
        .interact()
        .context("Failed to select model")?;

    Ok(models[selection].to_string())
}

fn setup_party(config: &Config) -> Result<Option<String>> {
    std::fs::create_dir_all(&config.workspace_dir)?;

    let party_path = config.party_path();
    if party_path.exists() {
        println!(
            "  {} Using the party already at {}",
            style("✓").green(),
            style(party_path.display()).cyan()
        );
    } else {
        party::save_party(&party_path, &party::demo_party())?;
        println!(
            "  {} Demo party seated at {}",
            style("✓").green(),
            style(party_path.display()).cyan()
        );
    }

    let store = party::PartyStore::load_or_demo(&party_path)?;
    let mut names: Vec<String> = store.sheets().iter().map(|s| s.name.clone()).collect();
    names.push("No default character".to_string());

    let selection = Select::new()
        .with_prompt("Pick your default character")
        .items(&names)
        .default(0)
        .interact()
        .context("Failed to select a character")?;

    if selection == names.len() - 1 {
        Ok(None)
    } else {
        Ok(Some(names[selection].clone()))
    }
}

pub fn run_onboard() -> Result<Config> {
    println!("{}", style(BANNER).cyan().bold());

    println!("  {}", style("Welcome to Tymora!").white().bold());
    println!(
        "  {}",
        style("This wizard sets up your table in under 30 seconds.").dim()
    );
    println!();

    print_step(1, 3, "API Key Setup");
    let api_key = setup_api_key()?;

    print_step(2, 3, "Model Selection");
    let model = setup_model()?;

    let mut config = Config {
        api_key,
        model,
        ..Default::default()
    };

    print_step(3, 3, "Party Setup");
    config.character = setup_party(&config)?;

    println!();
    println!("  {} Configuration complete!", style("✓").green().bold());
    println!(
        "  {} Config saved to {}",
        style("→").green(),
        style(get_config_path().display()).cyan()
    );
    println!();
    println!(
        "  {} You can now run: {}",
        style("→").green(),
        style("tymora chat").cyan().bold()
    );
    println!();

    Ok(config)
}
