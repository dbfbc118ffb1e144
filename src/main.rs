use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use userdeck::cli::{parse_args, CliCommand, ListArgs, USAGE, VERSION};
use userdeck::config::AppConfig;
use userdeck::models::UserSummary;
use userdeck::services::Services;
use userdeck::session::{BookmarksSession, UserListSession};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("userdeck=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_row(index: usize, summary: &UserSummary) {
    let marker = if summary.is_bookmarked { '*' } else { ' ' };
    println!(
        "{:>4} {} {:<28} {:<36} {}",
        index, marker, summary.full_name, summary.email, summary.location_text
    );
}

async fn run_list(services: &Services, args: ListArgs) -> Result<()> {
    let session = services.user_list_session();

    if args.refresh {
        session.refresh().await.wrap_err("Failed to load page 1")?;
    }
    while session.next_page() <= args.pages && !session.is_exhausted() {
        let page = session.next_page();
        if let Err(e) = session.load_next_page().await {
            tracing::error!(category = %e.category(), code = e.error_code(), "Page {} failed", page);
            eprintln!("{}\n{}", e.user_message(), e.recovery_hint());
            return Err(e).wrap_err(format!("Failed to load page {}", page));
        }
    }

    if let Some(text) = &args.search {
        session.search(text);
    }

    if let Some(index) = args.toggle_bookmark {
        match session.toggle_bookmark(index) {
            Some(true) => println!("Bookmarked row {}", index),
            Some(false) => println!("Removed bookmark from row {}", index),
            None => return Err(eyre!("No user at row {}", index)),
        }
    }

    if session.is_empty() {
        let (title, subtitle) = session.empty_state_message();
        println!("{}\n{}", title, subtitle);
        return Ok(());
    }
    for index in 0..session.visible_count() {
        if let Some(summary) = session.summary_at(index) {
            print_row(index, &summary);
        }
    }
    print_footer(&session);
    Ok(())
}

fn print_footer(session: &UserListSession) {
    let seed = session.seed().unwrap_or_default();
    if session.is_exhausted() {
        println!("-- {} users, end of list (seed {})", session.visible_count(), seed);
    } else {
        println!("-- {} users (seed {})", session.visible_count(), seed);
    }
}

fn run_bookmarks(session: &BookmarksSession) {
    if session.is_empty() {
        let empty = BookmarksSession::empty_state();
        println!("{}\n{}", empty.title, empty.subtitle);
        return;
    }
    for (index, _) in session.bookmarks().iter().enumerate() {
        if let Some(summary) = session.summary_at(index) {
            print_row(index, &summary);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let command = match parse_args(std::env::args()) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    match command {
        CliCommand::Version => {
            println!("userdeck {}", VERSION);
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        _ => {}
    }

    color_eyre::install()?;
    init_logging();

    let services = Services::from_config(AppConfig::from_env());

    match command {
        CliCommand::List(args) => run_list(&services, args).await?,
        CliCommand::Bookmarks => run_bookmarks(&services.bookmarks_session()),
        CliCommand::ClearBookmarks => {
            let count = services.bookmarks().count();
            services.bookmarks().clear_all();
            if let Some(e) = services.bookmarks().last_persist_error() {
                return Err(e).wrap_err("Failed to clear bookmarks");
            }
            println!("Removed {} bookmarks", count);
        }
        CliCommand::Version | CliCommand::Help => {}
    }

    Ok(())
}
