// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command};
use colored::Colorize;
use davsync_carddav::{AddressBook, CardDavClient};

/// List the address books of the configured account.
#[derive(Debug, Default, Clone, Copy)]
pub struct CmdList;

impl CmdList {
    /// Subcommand name.
    pub const NAME: &str = "list";

    /// Build the subcommand.
    #[must_use]
    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("ls")
            .about("List the address books under the home set")
    }

    /// Parse the subcommand.
    #[must_use]
    pub fn from(_matches: &ArgMatches) -> Self {
        CmdList
    }

    /// List the address books.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    pub async fn run(self, client: CardDavClient) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "listing address books...");
        let account = client.account()?;
        let books = client.list_address_books(&account).await?;

        if books.is_empty() {
            println!("No address books found under {}", account.home_url);
            return Ok(());
        }

        for book in &books {
            println!("{}", format_book(book));
        }
        Ok(())
    }
}

fn format_book(book: &AddressBook) -> String {
    let method = if book.supports_sync_collection() {
        "sync-collection".green()
    } else {
        "ctag".yellow()
    };
    format!(
        "{} {} {} [{}]",
        "►".green(),
        book.label().bold(),
        book.url.as_str().dimmed(),
        method
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use davsync_carddav::{Report, Url};

    #[test]
    fn test_parse_list() {
        let cmd = Command::new("test").subcommand(CmdList::command());
        let matches = cmd.try_get_matches_from(["test", "ls"]).unwrap();
        let (name, _) = matches.subcommand().unwrap();
        assert_eq!(name, CmdList::NAME);
    }

    #[test]
    fn test_format_book() {
        colored::control::set_override(false);

        let url = Url::parse("https://dav.example.com/books/default/").unwrap();
        let mut book = AddressBook::new(url);
        assert_eq!(
            format_book(&book),
            "► https://dav.example.com/books/default/ https://dav.example.com/books/default/ [ctag]"
        );

        book.display_name = Some("Contacts".to_string());
        book.reports.insert(Report::SyncCollection);
        assert_eq!(
            format_book(&book),
            "► Contacts https://dav.example.com/books/default/ [sync-collection]"
        );
    }
}
