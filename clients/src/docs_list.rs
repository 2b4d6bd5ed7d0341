use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use lib_docs::documents::{
    CreateDocumentRequest, CreationBackend, Document, DocumentCache, DocumentCreator, DocumentsApi,
    SortOption, DOCUMENTS_KEY,
};
use lib_docs::retrieve::ApiClient;

mod feed_logic;
use feed_logic::{config, logger};

#[derive(Parser, Debug)]
#[clap(about = "List and create documents", version)]
struct Cli {
    #[command(flatten)]
    config: config::ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch every document and print it in the chosen order.
    List {
        #[clap(long, default_value = "date-desc", help = "title-asc, title-desc, date-asc, date-desc, updated-asc or updated-desc.")]
        sort: SortOption,
    },
    /// Create a document and print the resulting collection.
    Create {
        #[clap(long, default_value = "")]
        title: String,

        #[clap(long, default_value = "")]
        version: String,

        #[clap(long = "attachment", help = "Attachment file name; repeat for more.")]
        attachments: Vec<String>,

        #[clap(long, help = "Post to the server instead of simulating the round-trip.")]
        remote: bool,

        #[clap(long, default_value = "date-desc")]
        sort: SortOption,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = config::load_config(&cli.config)?;
    logger::setup_logging(&settings.log_dir, &settings.log_level, "docs_list")?;
    settings.log_sources();

    let client = ApiClient::new(&settings.client.base_url, settings.client.http_max_retries)?;
    let cache = DocumentCache::new();
    let api = DocumentsApi::new(client, cache.clone());

    match cli.command {
        Command::List { sort } => {
            api.list().await?;
            print_documents(&cache.sorted(DOCUMENTS_KEY, sort), sort);
        }
        Command::Create {
            title,
            version,
            attachments,
            remote,
            sort,
        } => {
            let backend = if remote {
                CreationBackend::Remote(api.clone())
            } else {
                CreationBackend::Simulated
            };
            let creator = DocumentCreator::new(cache.clone(), settings.client.create_delay()).with_backend(backend);

            let request = CreateDocumentRequest {
                title,
                version,
                attachments,
            };
            let outcome = creator.create_document_request(request).await;
            if !outcome.ok {
                for error in &outcome.errors {
                    eprintln!("{}", error.red());
                }
                bail!("document was not created");
            }
            print_documents(&cache.sorted(DOCUMENTS_KEY, sort), sort);
        }
    }

    Ok(())
}

fn print_documents(documents: &[Document], sort: SortOption) {
    println!("{} ({}, {})", "Documents".bold(), documents.len(), sort);
    for doc in documents {
        println!(
            "  {} {} {}  created {}  updated {}",
            doc.title.bold(),
            format!("v{}", doc.version).cyan(),
            doc.id.dimmed(),
            doc.created_at,
            doc.updated_at
        );
        if let Some(contributors) = &doc.contributors {
            if !contributors.is_empty() {
                let names: Vec<_> = contributors.iter().map(|c| c.name.as_str()).collect();
                println!("      contributors: {}", names.join(", "));
            }
        }
        if !doc.attachments.is_empty() {
            println!("      attachments: {}", doc.attachments.join(", "));
        }
    }
}
