// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line front end for `davsync-carddav`.

mod cli;
mod cmd_discover;
mod cmd_list;
mod cmd_sync;
mod config;

pub use crate::cli::{Cli, Commands, run};
pub use crate::cmd_discover::CmdDiscover;
pub use crate::cmd_list::CmdList;
pub use crate::cmd_sync::CmdSync;
pub use crate::config::{APP_NAME, Config, parse_config};
