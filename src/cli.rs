//! Command-line argument parsing for the `userdeck` binary.

use thiserror::Error;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const USAGE: &str = "\
Usage: userdeck [OPTIONS]

Options:
  --pages N          Number of pages to load (default: 1)
  --search TEXT      Filter loaded users by name, email, city or country
  --bookmark INDEX   Toggle the bookmark of the user at INDEX in the listing
  --bookmarks        List bookmarked users
  --clear-bookmarks  Remove every bookmark
  --refresh          Discard the stored seed and start from a fresh ordering
  -V, --version      Print version
  -h, --help         Print this help

Environment:
  USERDECK_API_URL, USERDECK_PAGE_SIZE, USERDECK_RETRIES, USERDECK_DATA_DIR, RUST_LOG";

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Version,
    Help,
    /// Load pages, optionally filter, optionally toggle one bookmark, print.
    List(ListArgs),
    Bookmarks,
    ClearBookmarks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListArgs {
    pub pages: u32,
    pub search: Option<String>,
    pub toggle_bookmark: Option<usize>,
    pub refresh: bool,
}

impl Default for ListArgs {
    fn default() -> Self {
        Self {
            pages: 1,
            search: None,
            toggle_bookmark: None,
            refresh: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("missing value for {0}")]
    MissingValue(&'static str),

    #[error("invalid value for {flag}: {value:?}")]
    InvalidValue { flag: &'static str, value: String },

    #[error("unknown argument: {0}")]
    Unknown(String),
}

/// Parse command-line arguments (including the program name).
///
/// # Examples
///
/// ```
/// use userdeck::cli::{parse_args, CliCommand};
///
/// let args = vec!["userdeck".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), Ok(CliCommand::Version));
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut list = ListArgs::default();
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--bookmarks" => return Ok(CliCommand::Bookmarks),
            "--clear-bookmarks" => return Ok(CliCommand::ClearBookmarks),
            "--refresh" => list.refresh = true,
            "--pages" => {
                let value = args.next().ok_or(ArgsError::MissingValue("--pages"))?;
                list.pages = match value.parse() {
                    Ok(pages) if pages > 0 => pages,
                    _ => return Err(ArgsError::InvalidValue { flag: "--pages", value }),
                };
            }
            "--search" => {
                list.search = Some(args.next().ok_or(ArgsError::MissingValue("--search"))?);
            }
            "--bookmark" => {
                let value = args.next().ok_or(ArgsError::MissingValue("--bookmark"))?;
                let index = value
                    .parse()
                    .map_err(|_| ArgsError::InvalidValue { flag: "--bookmark", value })?;
                list.toggle_bookmark = Some(index);
            }
            _ => return Err(ArgsError::Unknown(arg)),
        }
    }

    Ok(CliCommand::List(list))
}
