// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command, arg};
use colored::Colorize;
use davsync_carddav::{
    AccountSyncReport, CardDavClient, Strategy, SyncMethod, SyncOptions, SyncReport, Url,
};

/// Sync every address book of the configured account.
#[derive(Debug, Default, Clone, Copy)]
pub struct CmdSync {
    /// Force ctag based sync even when `sync-collection` is available.
    pub basic: bool,
}

impl CmdSync {
    /// Subcommand name.
    pub const NAME: &str = "sync";

    /// Build the subcommand.
    #[must_use]
    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Sync every address book of the account")
            .arg(arg!(--basic "Always compare the ctag and refetch changed address books"))
    }

    /// Parse the subcommand.
    #[must_use]
    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            basic: matches.get_flag("basic"),
        }
    }

    /// Sync the account and print what changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the address books cannot be listed.
    pub async fn run(self, client: CardDavClient) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "syncing account...");
        let client = if self.basic {
            client.with_sync_options(SyncOptions {
                method: SyncMethod::Basic,
                ..SyncOptions::default()
            })
        } else {
            client
        };

        let mut account = client.account()?;
        let report = client.sync_account(&mut account).await?;

        for line in format_report(&report, |url| {
            account
                .address_books
                .iter()
                .find(|book| &book.url == url)
                .map(|book| (book.label(), book.vcards.len()))
        }) {
            println!("{line}");
        }
        Ok(())
    }
}

fn format_report<F>(report: &AccountSyncReport, lookup: F) -> Vec<String>
where
    F: Fn(&Url) -> Option<(String, usize)>,
{
    let mut lines = Vec::new();
    for (url, sync) in &report.synced {
        let (label, total) = lookup(url).unwrap_or_else(|| (url.to_string(), 0));
        lines.push(format!(
            "{} {} {} ({} cards, {})",
            "►".green(),
            label.bold(),
            format_changes(sync),
            total,
            match sync.strategy {
                Strategy::Basic => "basic",
                Strategy::Incremental => "incremental",
            }
        ));
    }

    for eviction in &report.evictions {
        let label = eviction
            .display_name
            .clone()
            .unwrap_or_else(|| eviction.url.to_string());
        lines.push(format!(
            "{} {} dropped: {}",
            "✗".red(),
            label.bold(),
            eviction.error
        ));
    }

    if report.synced.is_empty() && report.evictions.is_empty() {
        lines.push("No address books found".to_string());
    }
    lines
}

fn format_changes(sync: &SyncReport) -> String {
    if sync.is_unchanged() {
        return "unchanged".dimmed().to_string();
    }
    format!(
        "{} {} {}",
        format!("+{}", sync.created).green(),
        format!("~{}", sync.updated).yellow(),
        format!("-{}", sync.deleted).red()
    )
}
