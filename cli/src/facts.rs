use anyhow::{Result, anyhow};
use clap::Subcommand;
use console::style;
use rebo_core::{Config, Fact, FactStore, create_fact_store, normalize_key};

#[derive(Subcommand)]
pub enum FactsCommands {
    /// List stored facts, optionally filtered
    List {
        #[arg(short, long)]
        category: Option<String>,
        /// Case-insensitive substring of the value
        #[arg(short, long)]
        keyword: Option<String>,
    },
    Get {
        key: String,
    },
    Set {
        key: String,
        value: String,
        #[arg(short, long)]
        category: Option<String>,
    },
    Delete {
        key: String,
    },
}

pub async fn handle_command(command: FactsCommands, config: &Config) -> Result<()> {
    let store = create_fact_store(config)?;

    match command {
        FactsCommands::List { category, keyword } => {
            list_facts(store.as_ref(), category.as_deref(), keyword.as_deref()).await
        }
        FactsCommands::Get { key } => get_fact(store.as_ref(), &fact_key(&key)?).await,
        FactsCommands::Set {
            key,
            value,
            category,
        } => {
            let category = category.unwrap_or_else(|| config.memory.default_category.clone());
            let key = set_fact(store.as_ref(), &category, &key, &value).await?;
            println!(
                "{} Stored {} = {}",
                style("✓").green().bold(),
                style(&key).white().bold(),
                value
            );
            Ok(())
        }
        FactsCommands::Delete { key } => {
            let key = fact_key(&key)?;
            store.delete(&key).await?;
            println!("{} Removed {}", style("✓").green().bold(), key);
            Ok(())
        }
    }
}

/// Keys typed on the command line get the same shape as keys learned in
/// chat, so `"My Key"` and `my_key` name the same fact.
fn fact_key(raw: &str) -> Result<String> {
    normalize_key(raw).ok_or_else(|| anyhow!("Fact keys need at least two characters: '{raw}'"))
}

/// Returns the normalized key the value was stored under.
async fn set_fact(store: &dyn FactStore, category: &str, key: &str, value: &str) -> Result<String> {
    let key = fact_key(key)?;
    store.upsert(category, &key, value).await?;
    Ok(key)
}

async fn list_facts(
    store: &dyn FactStore,
    category: Option<&str>,
    keyword: Option<&str>,
) -> Result<()> {
    let facts = store.search(category, keyword).await?;

    if facts.is_empty() {
        println!("{} No facts stored", style("!").yellow());
        println!();
        println!("Teach one in chat:");
        println!("  rebo chat -m \"remember that my favorite coin is ETH\"");
        return Ok(());
    }

    println!(
        "{} Stored facts ({}) in {}",
        style("✓").green().bold(),
        facts.len(),
        store.name()
    );
    println!();
    for fact in &facts {
        print_fact(fact);
    }

    Ok(())
}

async fn get_fact(store: &dyn FactStore, key: &str) -> Result<()> {
    match store.get(key).await? {
        Some(fact) => print_fact(&fact),
        None => println!("{} No fact stored under '{}'", style("!").yellow(), key),
    }
    Ok(())
}

fn print_fact(fact: &Fact) {
    println!(
        "  {} = {}  {}",
        style(&fact.key).white().bold(),
        fact.value,
        style(format!(
            "[{}, {}]",
            fact.category,
            fact.timestamp.format("%Y-%m-%d %H:%M")
        ))
        .dim()
    );
}
