use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use model_lifecycle::config::config;
use model_lifecycle::{
    DefinitionBroadcast, Document, LifecycleEvent, ListenerError, MemoryStore, Model,
    ModelDefinition, Storage, Timestamps,
};

#[derive(Parser)]
#[command(name = "lifecycle-demo")]
#[command(about = "Save and remove a document, printing every lifecycle event on both scopes")]
#[command(version)]
struct Cli {
    #[arg(long, default_value = "Hello world", help = "Title of the demo document")]
    title: String,

    #[arg(long, default_value_t = 1, help = "Number of update saves after the insert")]
    updates: u32,

    #[arg(long, help = "Remove the document at the end")]
    remove: bool,

    #[arg(long, help = "Definition scope policy: all | save-only")]
    broadcast: Option<DefinitionBroadcast>,

    #[arg(long, help = "Reject saves of documents without a title")]
    require_title: bool,

    #[arg(long, help = "Print the persisted document as JSON after each step")]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so LIFECYCLE_* and RUST_LOG apply
    let _ = dotenvy::dotenv();

    let config = config();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!("Starting lifecycle demo in {:?} mode", config.environment);

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut definition = ModelDefinition::<Document>::new("PostSchema").with_lifecycle_events();
    if let Some(broadcast) = cli.broadcast {
        definition = definition.with_broadcast(broadcast);
    }
    let definition = Arc::new(definition);

    let store: Arc<dyn Storage<Document>> = Arc::new(MemoryStore::<Document>::new());
    let mut post = Model::new("Post", Arc::clone(&definition), store);
    if config().dispatch.stamp_timestamps {
        post.register_hook(Arc::new(Timestamps));
    }

    for event in LifecycleEvent::ALL {
        post.on(event, move |doc: &mut Document| {
            println!("  [type]       {:<13} {}", event, doc.to_json());
            Ok(())
        });
        definition.scope().on(event, move |doc: &mut Document| {
            println!("  [definition] {:<13} {}", event, doc.to_json());
            Ok(())
        });
    }

    // Derive the slug from the title on every save
    post.on(LifecycleEvent::BeforeSave, |doc: &mut Document| {
        let slug = doc
            .get("title")
            .and_then(|v| v.as_str())
            .map(slugify)
            .unwrap_or_default();
        doc.set("slug", slug);
        Ok(())
    });

    if cli.require_title {
        post.on(LifecycleEvent::BeforeSave, |doc: &mut Document| {
            match doc.get("title").and_then(|v| v.as_str()) {
                Some(title) if !title.trim().is_empty() => Ok(()),
                _ => Err(ListenerError::veto("title is required")),
            }
        });
    }

    let mut doc = Document::new();
    doc.set("title", cli.title.clone());

    println!("save #1 (insert)");
    post.save(&mut doc).await?;
    print_persisted(&post, &doc, cli.json).await?;

    for n in 1..=cli.updates {
        doc.set("title", format!("{} (rev {})", cli.title, n));
        println!("save #{} (update)", n + 1);
        post.save(&mut doc).await?;
        print_persisted(&post, &doc, cli.json).await?;
    }

    if cli.remove {
        println!("remove");
        post.remove(&mut doc).await?;
        print_persisted(&post, &doc, cli.json).await?;
    }

    Ok(())
}

async fn print_persisted(post: &Model<Document>, doc: &Document, json: bool) -> anyhow::Result<()> {
    use model_lifecycle::Persistable;

    if !json {
        return Ok(());
    }
    match post.find(doc.id()).await? {
        Some(stored) => println!("{}", serde_json::to_string_pretty(&stored.to_json())?),
        None => println!("(not persisted)"),
    }
    Ok(())
}

fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
