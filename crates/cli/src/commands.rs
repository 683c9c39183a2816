use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::ArgMatches;
use console::style;
use libris_catalog::{CatalogManager, CirculationManager};
use libris_config::Config;
use libris_core::{Book, BookId, BorrowId, BorrowStatus, PhysicalBook, Reader, ReaderId};
use libris_database::queries;
use libris_server::AppState;

/// Initialize the database and create tables
pub async fn init(config: &Config) -> Result<()> {
    let catalog = open_catalog(config).await?;
    drop(catalog);
    println!("Database initialized at {}", config.database.path.display());
    Ok(())
}

/// Run the HTTP server
pub async fn serve(config: &Config) -> Result<()> {
    let catalog = open_catalog(config).await?;
    let state = AppState::new(catalog);

    libris_server::serve(&config.server.bind_addr, state)
        .await
        .context("Server failed")?;

    Ok(())
}

/// Search the catalog
pub async fn search(config: &Config, matches: &ArgMatches) -> Result<()> {
    let query = matches
        .get_one::<String>("query")
        .ok_or_else(|| anyhow!("Search query is required"))?;

    let catalog = open_catalog(config).await?;
    let books = catalog
        .search(query)
        .await
        .context("Failed to search books")?;

    if books.is_empty() {
        println!("No books found matching '{}'", query);
        return Ok(());
    }

    println!(
        "\n{} results for '{}'",
        style(books.len()).bold().cyan(),
        query
    );
    println!("{}", "=".repeat(72));

    for book in books {
        print_book_summary(&book);
    }

    Ok(())
}

/// Catalog a new book, creating unknown authors on the way
pub async fn add_book(config: &Config, matches: &ArgMatches) -> Result<()> {
    let title = matches
        .get_one::<String>("title")
        .ok_or_else(|| anyhow!("Book title is required"))?;

    let catalog = open_catalog(config).await?;

    let mut book = Book::new(title.clone());
    book.isbn = matches.get_one::<String>("isbn").cloned();

    if let Some(names) = matches.get_many::<String>("author") {
        for name in names {
            let (author, created) = catalog.get_or_create_author(name).await?;
            if created {
                println!("  New author: {}", author.name);
            }
            book.authors.push(author);
        }
    }

    let duplicates = catalog.find_duplicate_books(&book).await?;
    if !duplicates.is_empty() {
        bail!(
            "An identical book is already cataloged (id {})",
            duplicates[0].id
        );
    }

    queries::create_book(catalog.pool(), &book)
        .await
        .context("Failed to catalog book")?;

    println!("{} Book cataloged!", style("✓").green().bold());
    println!("  ID: {}", book.id);
    println!("  Title: {}", book.title_str());
    if !book.authors.is_empty() {
        println!("  Authors: {}", book.authors_str());
    }

    Ok(())
}

/// Register a physical copy with the next free circulation number
pub async fn add_copy(config: &Config, matches: &ArgMatches) -> Result<()> {
    let book_id = matches
        .get_one::<String>("book")
        .ok_or_else(|| anyhow!("Book ID is required"))?;
    let book_id = BookId::from_string(book_id).context("Invalid book ID")?;

    let catalog = open_catalog(config).await?;

    // confirm the book exists before allocating a number
    let book = queries::get_book(catalog.pool(), book_id)
        .await
        .context("Book not found")?;

    let physical_id = catalog.next_physical_id().await?;
    let copy = PhysicalBook::new(physical_id, book.id);
    catalog.register_copy(&copy).await?;

    println!("{} Copy registered!", style("✓").green().bold());
    println!("  Physical ID: {}", copy.physical_id);
    println!("  Book: {}", book.title_str());

    Ok(())
}

/// Register a reader
pub async fn add_reader(config: &Config, matches: &ArgMatches) -> Result<()> {
    let name = matches
        .get_one::<String>("name")
        .ok_or_else(|| anyhow!("Reader name is required"))?;

    let catalog = open_catalog(config).await?;

    let reader = Reader::new(name.clone());
    queries::create_reader(catalog.pool(), &reader)
        .await
        .context("Failed to register reader")?;

    println!("{} Reader registered!", style("✓").green().bold());
    println!("  ID: {}", reader.id);
    println!("  Name: {}", reader.name);

    Ok(())
}

/// List registered readers
pub async fn list_readers(config: &Config) -> Result<()> {
    let catalog = open_catalog(config).await?;
    let readers = queries::list_readers(catalog.pool())
        .await
        .context("Failed to list readers")?;

    if readers.is_empty() {
        println!("No readers registered.");
        return Ok(());
    }

    for reader in readers {
        println!("{}", reader.label());
    }

    Ok(())
}

/// Lend a copy to a reader
pub async fn borrow(config: &Config, matches: &ArgMatches) -> Result<()> {
    let physical_id: i64 = matches
        .get_one::<String>("copy")
        .ok_or_else(|| anyhow!("Circulation number is required"))?
        .parse()
        .context("Circulation number must be an integer")?;

    let reader_id = matches
        .get_one::<String>("reader")
        .ok_or_else(|| anyhow!("Reader ID is required"))?;
    let reader_id = ReaderId::from_string(reader_id).context("Invalid reader ID")?;

    let date_borrow = parse_date_arg(matches)?;

    let catalog = open_catalog(config).await?;
    let circulation = CirculationManager::with_pool(catalog.pool().clone());

    let borrow = circulation
        .borrow_by_physical_id(physical_id, reader_id, date_borrow)
        .await
        .map_err(circulation_failure)?;

    println!("{} Borrow opened!", style("✓").green().bold());
    println!("  Borrow ID: {}", borrow.id);
    println!("  Due: {}", borrow.due_date());

    Ok(())
}

/// Record the return of a copy
pub async fn return_copy(config: &Config, matches: &ArgMatches) -> Result<()> {
    let id = borrow_id_arg(matches)?;
    let date_return = parse_date_arg(matches)?;

    let catalog = open_catalog(config).await?;
    let circulation = CirculationManager::with_pool(catalog.pool().clone());

    let borrow = circulation
        .return_copy(id, date_return)
        .await
        .map_err(circulation_failure)?;

    let status = borrow.status_on(date_return);
    println!("{} Returned ({})", style("✓").green().bold(), status);

    Ok(())
}

/// Renew an open borrow
pub async fn renew(config: &Config, matches: &ArgMatches) -> Result<()> {
    let id = borrow_id_arg(matches)?;

    let catalog = open_catalog(config).await?;
    let circulation = CirculationManager::with_pool(catalog.pool().clone());

    let borrow = circulation.renew(id).await.map_err(circulation_failure)?;

    println!(
        "{} Renewed (renewal {}), now due {}",
        style("✓").green().bold(),
        borrow.renew_count,
        borrow.due_date()
    );

    Ok(())
}

/// List borrows with status, optionally filtered
pub async fn list_borrows(config: &Config, matches: &ArgMatches) -> Result<()> {
    let filter = matches
        .get_one::<String>("status")
        .map(|s| BorrowStatus::parse(s).ok_or_else(|| anyhow!("Unknown status '{}'", s)))
        .transpose()?;

    let today = Local::now().date_naive();

    let catalog = open_catalog(config).await?;
    let circulation = CirculationManager::with_pool(catalog.pool().clone());

    let entries = circulation.list(filter, today).await?;

    if entries.is_empty() {
        println!("No borrows.");
        return Ok(());
    }

    for entry in entries {
        let copy = queries::get_copy(catalog.pool(), entry.borrow.book_id).await?;
        let reader = queries::get_reader(catalog.pool(), entry.borrow.reader_id).await?;
        let book = queries::get_book(catalog.pool(), copy.book_id).await?;

        let status = match entry.status {
            BorrowStatus::Late | BorrowStatus::ReturnedLate => {
                style(entry.status.to_string()).red().to_string()
            }
            _ => entry.status.to_string(),
        };

        println!(
            "{} | #{} {} | {} | {}",
            entry.borrow.id,
            copy.physical_id,
            book.title_str(),
            reader.name,
            status
        );
    }

    Ok(())
}

async fn open_catalog(config: &Config) -> Result<CatalogManager> {
    CatalogManager::open(config)
        .await
        .context("Failed to open the catalog database")
}

fn borrow_id_arg(matches: &ArgMatches) -> Result<BorrowId> {
    let id = matches
        .get_one::<String>("id")
        .ok_or_else(|| anyhow!("Borrow ID is required"))?;
    BorrowId::from_string(id).context("Invalid borrow ID")
}

fn parse_date_arg(matches: &ArgMatches) -> Result<NaiveDate> {
    match matches.get_one::<String>("date") {
        Some(text) => text.parse().context("Dates must be YYYY-MM-DD"),
        None => Ok(Local::now().date_naive()),
    }
}

/// Surfaces per-field validation messages the way staff expect to read
/// them; other failures pass through untouched
fn circulation_failure(err: libris_catalog::CatalogError) -> anyhow::Error {
    if let Some(validation) = err.as_validation() {
        let messages: Vec<String> = validation
            .iter()
            .flat_map(|(field, msgs)| msgs.iter().map(move |m| format!("{}: {}", field, m)))
            .collect();
        return anyhow!("{}", messages.join("; "));
    }
    err.into()
}

fn print_book_summary(book: &Book) {
    println!("{}", style(book.title_str()).bold());
    if !book.authors.is_empty() {
        println!("  {}", book.authors_str());
    }
    for info in book.infos() {
        println!("  {}", info);
    }
    println!();
}
