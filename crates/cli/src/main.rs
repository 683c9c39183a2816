use anyhow::{Context, Result};
use clap::{Arg, Command};
use libris_config::Config;

mod commands;

fn build_cli() -> Command {
    Command::new("libris")
        .version("0.1.0")
        .about("Library catalog and circulation manager")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Path to the configuration file")
                .global(true),
        )
        .arg(
            Arg::new("database")
                .short('d')
                .long("database")
                .value_name("PATH")
                .help("Database file path (overrides the configuration)")
                .global(true),
        )
        .subcommand(Command::new("init").about("Initialize the database and create tables"))
        .subcommand(Command::new("serve").about("Run the HTTP server"))
        .subcommand(
            Command::new("search")
                .about("Search the catalog by title, ISBN, author or collection")
                .arg(Arg::new("query").required(true).value_name("QUERY").help("Search query")),
        )
        .subcommand(
            Command::new("add-book")
                .about("Catalog a new book")
                .arg(Arg::new("title").required(true).value_name("TITLE").help("Book title"))
                .arg(
                    Arg::new("author")
                        .short('a')
                        .long("author")
                        .value_name("NAME")
                        .help("Author name (repeatable; created if unknown)")
                        .action(clap::ArgAction::Append),
                )
                .arg(Arg::new("isbn").long("isbn").value_name("ISBN").help("ISBN (optional)")),
        )
        .subcommand(
            Command::new("add-copy")
                .about("Register a physical copy of a book")
                .arg(Arg::new("book").required(true).value_name("BOOK_ID").help("Book ID (UUID)")),
        )
        .subcommand(
            Command::new("add-reader")
                .about("Register a reader")
                .arg(Arg::new("name").required(true).value_name("NAME").help("Reader name")),
        )
        .subcommand(Command::new("readers").about("List registered readers"))
        .subcommand(
            Command::new("borrow")
                .about("Lend a copy to a reader")
                .arg(Arg::new("copy").required(true).value_name("PHYSICAL_ID").help("Circulation number of the copy"))
                .arg(Arg::new("reader").required(true).value_name("READER_ID").help("Reader ID (UUID)"))
                .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD").help("Borrow date (defaults to today)")),
        )
        .subcommand(
            Command::new("return")
                .about("Record the return of a copy")
                .arg(Arg::new("id").required(true).value_name("BORROW_ID").help("Borrow ID (UUID)"))
                .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD").help("Return date (defaults to today)")),
        )
        .subcommand(
            Command::new("renew")
                .about("Renew an open borrow for one more week")
                .arg(Arg::new("id").required(true).value_name("BORROW_ID").help("Borrow ID (UUID)")),
        )
        .subcommand(
            Command::new("borrows")
                .about("List borrows with their current status")
                .arg(
                    Arg::new("status")
                        .short('s')
                        .long("status")
                        .value_name("STATUS")
                        .help("Show only this status")
                        .value_parser(["borrowed", "late", "returned", "returned_late"]),
                ),
        )
}

fn load_config(matches: &clap::ArgMatches) -> Result<Config> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load(std::path::Path::new(path))
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => {
            let path = Config::default_path().context("No configuration directory")?;
            Config::load(&path).context("Failed to load configuration")?
        }
    };

    if let Some(db_path) = matches.get_one::<String>("database") {
        config.database.path = db_path.into();
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = build_cli().get_matches();
    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("init", _)) => commands::init(&config).await,
        Some(("serve", _)) => commands::serve(&config).await,
        Some(("search", sub_matches)) => commands::search(&config, sub_matches).await,
        Some(("add-book", sub_matches)) => commands::add_book(&config, sub_matches).await,
        Some(("add-copy", sub_matches)) => commands::add_copy(&config, sub_matches).await,
        Some(("add-reader", sub_matches)) => commands::add_reader(&config, sub_matches).await,
        Some(("readers", _)) => commands::list_readers(&config).await,
        Some(("borrow", sub_matches)) => commands::borrow(&config, sub_matches).await,
        Some(("return", sub_matches)) => commands::return_copy(&config, sub_matches).await,
        Some(("renew", sub_matches)) => commands::renew(&config, sub_matches).await,
        Some(("borrows", sub_matches)) => commands::list_borrows(&config, sub_matches).await,
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
