//! phimcli - resilient movie-catalog browser
//!
//! # Usage
//!
//! ```bash
//! phimcli latest
//! phimcli search "the batman" --json
//! phimcli detail inception
//! phimcli play inception -s 1 -e 1 --player mpv
//! ```

// The binary only drives a slice of the library surface; the rest is
// compiled here too because the modules are shared with lib.rs
#![allow(dead_code)]

mod api;
mod cli;
mod commands;
mod config;
mod models;
mod playback;
mod session;

use clap::Parser;

use crate::cli::{Cli, Command, Output};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let output = Output::new(&cli);

    let exit_code = match cli.command {
        Command::Latest(cmd) => commands::latest_cmd(cmd, &output).await,
        Command::Category(cmd) => commands::category_cmd(cmd, &output).await,
        Command::Genre(cmd) => commands::genre_cmd(cmd, &output).await,
        Command::Country(cmd) => commands::country_cmd(cmd, &output).await,
        Command::Year(cmd) => commands::year_cmd(cmd, &output).await,
        Command::Search(cmd) => commands::search_cmd(cmd, &output).await,
        Command::Suggest(cmd) => commands::suggest_cmd(cmd, &output).await,
        Command::Featured(cmd) => commands::featured_cmd(cmd, &output).await,
        Command::Detail(cmd) => commands::detail_cmd(cmd, &output).await,
        Command::Play(cmd) => commands::play_cmd(cmd, &output).await,
        Command::Theme(cmd) => commands::theme_cmd(cmd, &output),
    };

    exit_code.into()
}
