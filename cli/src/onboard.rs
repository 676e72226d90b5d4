use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Password, Select};
use rebo_core::config::{Config, MemoryBackend};

const BANNER: &str = r"
    -------------------------------

     ____  _____ ____   ___
    |  _ \| ____| __ ) / _ \
    | |_) |  _| |  _ \| | | |
    |  _ <| |___| |_) | |_| |
    |_| \_\_____|____/ \___/

    -------------------------------
";

const TOTAL_STEPS: usize = 4;

fn print_step(step: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, TOTAL_STEPS, title))
            .cyan()
            .bold()
    );
    println!();
}

fn setup_provider() -> Result<(String, String)> {
    let providers = ["openai", "openrouter"];
    let selection = Select::new()
        .with_prompt("Select your model provider")
        .items(&providers)
        .default(0)
        .interact()
        .context("Failed to select provider")?;
    let provider = providers[selection].to_string();

    let api_key: String = Password::new()
        .with_prompt(format!("Enter your {provider} API key"))
        .interact()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        return Err(anyhow::anyhow!("API key cannot be empty"));
    }

    Ok((provider, api_key.trim().to_string()))
}

fn setup_model(provider: &str) -> Result<String> {
    let models: &[&str] = match provider {
        "openrouter" => &["openai/gpt-4o-mini", "openai/gpt-4o", "anthropic/claude-3.5-haiku"],
        _ => &["gpt-3.5-turbo", "gpt-4o-mini", "gpt-4o"],
    };

    let selection = Select::new()
        .with_prompt("Select your model")
        .items(models)
        .default(0)
        .interact()
        .context("Failed to select model")?;

    Ok(models[selection].to_string())
}

/// Empty input means "not now"; the key can also come from the environment.
fn optional_key(prompt: &str) -> Result<Option<String>> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .context("Failed to read key")?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

fn setup_memory(config: &mut Config) -> Result<()> {
    let backends = ["json file", "in-memory (forgets on exit)", "supabase"];
    let selection = Select::new()
        .with_prompt("Where should facts be stored?")
        .items(&backends)
        .default(0)
        .interact()
        .context("Failed to select memory backend")?;

    config.memory.backend = match selection {
        1 => MemoryBackend::Memory,
        2 => MemoryBackend::Supabase,
        _ => MemoryBackend::Json,
    };

    if config.memory.backend == MemoryBackend::Supabase {
        let url: String = Input::new()
            .with_prompt("Supabase project URL")
            .interact_text()
            .context("Failed to read Supabase URL")?;
        config.memory.supabase_url = Some(url.trim().to_string());
        config.memory.supabase_key = optional_key("Supabase service key (or set SUPABASE_KEY)")?;
    }

    Ok(())
}

pub fn run_onboard() -> Result<Config> {
    println!("{}", style(BANNER).cyan().bold());

    println!("  {}", style("Welcome to Rebo!").white().bold());
    println!(
        "  {}",
        style("This wizard writes your config; every answer can be edited later.").dim()
    );
    println!();

    print_step(1, "Model Provider");
    let (provider, api_key) = setup_provider()?;

    print_step(2, "Model Selection");
    let model = setup_model(&provider)?;

    let mut config = Config {
        provider: Some(provider),
        api_key,
        model,
        ..Default::default()
    };

    print_step(3, "Search and Market Keys");
    config.search.brave_api_key = optional_key("Brave Search API key (enter to skip)")?;
    config.market.coinmarketcap_api_key = optional_key("CoinMarketCap API key (enter to skip)")?;

    print_step(4, "Memory");
    setup_memory(&mut config)?;

    if config.memory.backend == MemoryBackend::Json {
        if let Err(e) = std::fs::create_dir_all(&config.workspace_dir) {
            eprintln!(
                "  {} Warning: Could not create workspace: {}",
                style("!").yellow(),
                e
            );
        } else {
            println!(
                "  {} Facts will be kept in {}",
                style("✓").green(),
                style(config.memory_path().display()).cyan()
            );
        }
    }

    println!();
    println!("  {} Configuration complete!", style("✓").green().bold());
    println!(
        "  {} Config saved to {}",
        style("→").green(),
        style(rebo_core::config::get_config_path().display()).cyan()
    );
    println!();
    println!(
        "  {} You can now run: {}",
        style("→").green(),
        style("rebo chat").cyan().bold()
    );
    println!();

    Ok(config)
}
