// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command};
use colored::Colorize;
use davsync_carddav::CardDavClient;

/// Check `CardDAV` support and print the address book home set.
#[derive(Debug, Default, Clone, Copy)]
pub struct CmdDiscover;

impl CmdDiscover {
    /// Subcommand name.
    pub const NAME: &str = "discover";

    /// Build the subcommand.
    #[must_use]
    pub fn command() -> Command {
        Command::new(Self::NAME).about("Check the server for CardDAV support")
    }

    /// Parse the subcommand.
    #[must_use]
    pub fn from(_matches: &ArgMatches) -> Self {
        CmdDiscover
    }

    /// Run the discovery against the configured server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be reached.
    pub async fn run(self, client: CardDavClient) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, url = %client.root_url(), "discovering server...");
        let result = client.discover().await?;

        let support = if result.supports_address_books {
            "yes".green()
        } else {
            "no".red()
        };
        println!("{} {}", "Server:".bold(), client.root_url());
        println!("{} {}", "CardDAV:".bold(), support);
        println!("{} {}", "Home:".bold(), result.address_book_home);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_discover() {
        let cmd = Command::new("test").subcommand(CmdDiscover::command());
        let matches = cmd.try_get_matches_from(["test", "discover"]).unwrap();
        let (name, _) = matches.subcommand().unwrap();
        assert_eq!(name, CmdDiscover::NAME);
    }
}
