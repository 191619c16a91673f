use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use catalog_app::modules::books::{
    models::BookFilters, seed, service::BookService, store::InMemoryBookStore,
};
use catalog_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "catalog-cli", version, about = "Book catalog command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Inspect the seeded catalog
    #[command(subcommand)]
    Books(BooksCommand),
}

#[derive(Debug, Subcommand)]
enum BooksCommand {
    /// List books, optionally filtered
    List(ListArgs),
    /// Show one book
    Get { id: String },
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Substring of the title (case-sensitive)
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    category_id: Option<i64>,
    #[arg(long)]
    status: Option<bool>,
    /// Only books with stock strictly above this
    #[arg(long)]
    stock_min: Option<i32>,
}

impl From<ListArgs> for BookFilters {
    fn from(args: ListArgs) -> Self {
        BookFilters {
            title: args.title,
            language: args.language,
            category_id: args.category_id,
            status: args.status,
            stock_min: args.stock_min,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load catalog settings")?;
    catalog_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve => {
            catalog_app::serve(settings).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Books(command) => run_books(command, &settings).await,
    }
}

async fn run_books(command: BooksCommand, settings: &Settings) -> anyhow::Result<ExitCode> {
    let service = BookService::new(Arc::new(InMemoryBookStore::new()));
    if let Some(path) = &settings.catalog.seed_file {
        seed::seed_from_file(&service, path).await?;
    }

    match command {
        BooksCommand::List(args) => match service.list_books(&args.into()).await {
            Some(books) => print_json(&books),
            None => not_found("no books found"),
        },
        BooksCommand::Get { id } => match service.get_book(&id).await {
            Some(book) => print_json(&book),
            None => not_found("book not found"),
        },
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(ExitCode::SUCCESS)
}

fn not_found(message: &str) -> anyhow::Result<ExitCode> {
    eprintln!("{message}");
    Ok(ExitCode::FAILURE)
}
