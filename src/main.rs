use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use entity_browser::client::EntityClient;
use entity_browser::config::ClientConfig;
use entity_browser::controller::EntityController;
use entity_browser::events::{Element, Event, Key};
use entity_browser::models::{Entity, EntityId, Params};
use entity_browser::render::render_entity;

#[derive(Parser)]
#[command(name = "entity-browser")]
#[command(about = "Search, render and delete entities on a remote entity store")]
struct Cli {
    /// Backend base URL (overrides config file and ENTITY_BROWSER_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Drop search responses superseded by a newer search
    #[arg(long, global = true)]
    discard_stale: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an entity and print the rendered page
    Search {
        id: String,
        /// Load parameters and render them inline
        #[arg(short, long)]
        expanded: bool,
    },
    /// Print a plain-text summary of an entity
    Show { id: String },
    /// Print the parameter payload of an entity as JSON
    Params { id: String },
    /// Delete an entity
    Delete { id: String },
    /// Post free text to the backend's form endpoint
    Submit { text: String },
    /// Render an entity JSON document without contacting the backend
    Render {
        /// JSON file to read (stdin when omitted)
        file: Option<PathBuf>,
        #[arg(short, long)]
        expanded: bool,
    },
    /// Line-oriented session: type an id and press Enter to search,
    /// `delete <id>` to delete, `params <id>` to expand, `quit` to leave
    Interactive,
    /// Print the effective configuration
    Config {
        /// Write it to the user config file
        #[arg(long)]
        save: bool,
    },
}

/// Initialize tracing with output to stderr so stdout carries only results.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "entity_browser=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = ClientConfig::load();
    if let Some(url) = cli.url {
        config.base_url = url;
    }
    if let Some(ms) = cli.timeout_ms {
        config.request_timeout_ms = ms;
    }
    if cli.discard_stale {
        config.discard_stale_responses = true;
    }

    match cli.command {
        Commands::Search { id, expanded } => {
            let controller = EntityController::from_config(config)?;
            let id = EntityId::from(id);
            controller.search(&id).await?;
            if expanded {
                controller.load_params(&id).await?;
            }
            print!("{}", controller.page().to_html());
        }
        Commands::Show { id } => {
            let client = EntityClient::from_config(&config)?;
            let entity = client.get_entity(&EntityId::from(id)).await?;
            print!("{}", summary(&entity));
        }
        Commands::Params { id } => {
            let client = EntityClient::from_config(&config)?;
            let params = client.get_params(&EntityId::from(id)).await?;
            println!("{}", serde_json::to_string_pretty(&params)?);
        }
        Commands::Delete { id } => {
            let client = EntityClient::from_config(&config)?;
            let outcome = client.delete_entity(&EntityId::from(id.clone())).await?;
            println!("{}: {:?}", id, outcome);
        }
        Commands::Submit { text } => {
            let controller = EntityController::from_config(config)?;
            controller.submit(&text).await?;
            print!("{}", controller.page().to_html());
        }
        Commands::Render { file, expanded } => {
            let body = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut body = String::new();
                    std::io::stdin()
                        .read_to_string(&mut body)
                        .context("Failed to read stdin")?;
                    body
                }
            };
            let entity = Entity::from_json(&body).context("Failed to decode entity")?;
            println!("{}", render_entity(&entity, expanded));
        }
        Commands::Interactive => {
            let controller = EntityController::from_config(config)?;
            run_interactive(&controller).await?;
        }
        Commands::Config { save } => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                let path = config.save()?;
                tracing::info!("Saved config to {}", path.display());
            }
        }
    }

    Ok(())
}

async fn run_interactive(controller: &EntityController) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();
        let result = match line.split_once(' ') {
            _ if line == "quit" => break,
            Some(("delete", id)) => {
                let owner = EntityId::from(id.trim());
                controller
                    .dispatch(&Event::click(Element::DeleteLink { owner }))
                    .await
                    .map(|_| ())
            }
            Some(("params", id)) => controller
                .load_params(&EntityId::from(id.trim()))
                .await
                .map(|_| ()),
            Some(("submit", text)) => {
                controller.page().set_text_field(text);
                controller
                    .dispatch(&Event::click(Element::SubmitButton))
                    .await
                    .map(|_| ())
            }
            _ => {
                controller.page().set_search_field(line);
                controller
                    .dispatch(&Event::key(Element::SearchField, Key::Enter))
                    .await
                    .map(|_| ())
            }
        };
        // Failures are already on the page as a status line.
        if let Err(e) = result {
            tracing::debug!("Action failed: {}", e);
        }
        print!("{}", controller.page().to_html());
    }

    Ok(())
}

fn summary(entity: &Entity) -> String {
    let mut output = format!("{} ({})\n", entity.id, entity.kind);
    if let Some(unique_id) = &entity.unique_id {
        output.push_str(&format!("  unique id: {}\n", unique_id));
    }
    match &entity.param {
        Some(Params::Map(map)) => {
            for (key, value) in map {
                output.push_str(&format!("  {} = {}\n", key, value));
            }
        }
        Some(Params::Text(text)) => output.push_str(&format!("  {}\n", text)),
        Some(Params::Other(value)) => output.push_str(&format!("  {}\n", value)),
        None => {}
    }
    for data in &entity.data {
        output.push_str(&format!(
            "  [{}] {} {} bytes\n",
            data.mimetype.as_deref().unwrap_or("application/octet-stream"),
            data.name,
            data.content_length.unwrap_or(0)
        ));
    }
    output
}
