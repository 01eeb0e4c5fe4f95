//! CLI Command Handlers
//!
//! Implements all CLI commands by driving the catalog session, client,
//! and playback controller. Each handler takes CLI args and Output,
//! returns ExitCode.

use serde::Serialize;

use crate::api::CatalogClient;
use crate::cli::{
    DetailCmd, ExitCode, FeaturedCmd, FilterCmd, ListCmd, Output, PlayCmd, PlayerChoice,
    SearchCmd, SuggestCmd, ThemeCmd,
};
use crate::config::{Config, Theme};
use crate::models::{CatalogItem, CatalogQuery};
use crate::playback::{LocalHlsPlayer, PlaybackController, PlaybackDecision, PlayerType};
use crate::session::CatalogSession;

// =============================================================================
// Response Types
// =============================================================================

/// Listing response: accumulated items plus pagination facts
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub query: CatalogQuery,
    pub total_pages: u32,
    pub loaded_pages: u32,
    pub items: Vec<CatalogItem>,
}

/// Playback resolution response
#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub movie: String,
    pub episode: String,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Theme response
#[derive(Debug, Serialize)]
pub struct ThemeResponse {
    pub theme: String,
}

// =============================================================================
// Listing Commands
// =============================================================================

pub async fn latest_cmd(cmd: ListCmd, output: &Output) -> ExitCode {
    run_listing(CatalogQuery::latest(), cmd, output).await
}

pub async fn category_cmd(cmd: FilterCmd, output: &Output) -> ExitCode {
    run_listing(CatalogQuery::category(cmd.value), cmd.list, output).await
}

pub async fn genre_cmd(cmd: FilterCmd, output: &Output) -> ExitCode {
    run_listing(CatalogQuery::genre(cmd.value), cmd.list, output).await
}

pub async fn country_cmd(cmd: FilterCmd, output: &Output) -> ExitCode {
    run_listing(CatalogQuery::country(cmd.value), cmd.list, output).await
}

pub async fn year_cmd(cmd: FilterCmd, output: &Output) -> ExitCode {
    run_listing(CatalogQuery::year(cmd.value), cmd.list, output).await
}

/// Shared listing flow: load with auto-aggregation, optionally request
/// extra pages, print the accumulated set.
async fn run_listing(query: CatalogQuery, opts: ListCmd, output: &Output) -> ExitCode {
    let mut session = CatalogSession::new(CatalogClient::new());

    output.info(format!("Loading {}...", query));
    if let Err(e) = session.set_query(query).await {
        return output.error(format!("Failed to load listing: {}", e), ExitCode::NetworkError);
    }

    for _ in 0..opts.more {
        if !session.has_more() {
            break;
        }
        match session.request_more().await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                return output.error(format!("Failed to load more: {}", e), ExitCode::Error)
            }
        }
    }

    print_listing(&session, opts.limit, output)
}

pub async fn search_cmd(cmd: SearchCmd, output: &Output) -> ExitCode {
    let mut session = CatalogSession::new(CatalogClient::new());

    output.info(format!("Searching for: {}", cmd.keyword));
    if let Err(e) = session.set_query(CatalogQuery::search(cmd.keyword)).await {
        return output.error(format!("Search failed: {}", e), ExitCode::NetworkError);
    }

    print_listing(&session, cmd.limit, output)
}

pub async fn suggest_cmd(cmd: SuggestCmd, output: &Output) -> ExitCode {
    let mut session = CatalogSession::new(CatalogClient::new());

    if let Err(e) = session.set_query(CatalogQuery::search(cmd.keyword)).await {
        return output.error(format!("Suggestion lookup failed: {}", e), ExitCode::NetworkError);
    }

    print_listing(&session, cmd.limit, output)
}

pub async fn featured_cmd(cmd: FeaturedCmd, output: &Output) -> ExitCode {
    // Featured is the head of the latest listing's first page only; no
    // aggregation
    let client = CatalogClient::new();

    match client.list(&CatalogQuery::latest(), 1).await {
        Ok(page) => {
            let mut items = page.items;
            items.truncate(cmd.limit);
            if items.is_empty() {
                output.info("No movies found");
            }
            for item in &items {
                output.line(format!("{:<28} {}", item.slug, item));
            }
            if output.json {
                if let Err(e) = output.print(&items) {
                    return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
                }
            }
            ExitCode::Success
        }
        Err(e) => output.error(format!("Failed to load featured: {}", e), ExitCode::NetworkError),
    }
}

fn print_listing(session: &CatalogSession, limit: usize, output: &Output) -> ExitCode {
    let mut items = session.items().to_vec();
    if limit > 0 {
        items.truncate(limit);
    }

    if items.is_empty() {
        // Valid response with zero items is a legitimate state
        output.info("No movies found");
    }

    for item in &items {
        output.line(format!("{:<28} {}", item.slug, item));
    }

    if output.json {
        let response = ListingResponse {
            query: session.query().clone(),
            total_pages: session.pagination().total_pages,
            loaded_pages: session.pagination().current_page,
            items,
        };
        if let Err(e) = output.print(&response) {
            return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
        }
    }

    ExitCode::Success
}

// =============================================================================
// Detail Command
// =============================================================================

pub async fn detail_cmd(cmd: DetailCmd, output: &Output) -> ExitCode {
    let client = CatalogClient::new();

    output.info(format!("Loading detail for {}...", cmd.slug));
    match client.detail(&cmd.slug).await {
        Ok(Some(detail)) => {
            output.line(format!("{} - {} episode(s)", detail, detail.episode_count()));
            if !detail.description.is_empty() {
                output.line(&detail.description);
            }
            if !detail.category_tags.is_empty() {
                output.line(format!("Tags: {}", detail.category_tags.join(", ")));
            }
            for (si, server) in detail.servers.iter().enumerate() {
                output.line(format!("[{}] {}", si + 1, server.server_name));
                for (ei, episode) in server.episodes.iter().enumerate() {
                    output.line(format!("  {}. {}", ei + 1, episode));
                }
            }

            if output.json {
                if let Err(e) = output.print(&detail) {
                    return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
                }
            }
            ExitCode::Success
        }
        Ok(None) => output.error(
            format!("No movie found for slug '{}'", cmd.slug),
            ExitCode::NotFound,
        ),
        Err(e) => output.error(format!("Failed to load detail: {}", e), ExitCode::NetworkError),
    }
}

// =============================================================================
// Play Command
// =============================================================================

pub async fn play_cmd(cmd: PlayCmd, output: &Output) -> ExitCode {
    if cmd.server == 0 || cmd.episode == 0 {
        return output.error(
            "Server and episode numbers are 1-based",
            ExitCode::InvalidArgs,
        );
    }

    let client = CatalogClient::new();
    let detail = match client.detail(&cmd.slug).await {
        Ok(Some(detail)) => detail,
        Ok(None) => {
            return output.error(
                format!("No movie found for slug '{}'", cmd.slug),
                ExitCode::NotFound,
            )
        }
        Err(e) => {
            return output.error(format!("Failed to load detail: {}", e), ExitCode::NetworkError)
        }
    };

    let Some(source) = detail.episode(cmd.server - 1, cmd.episode - 1) else {
        return output.error(
            format!(
                "Server {} episode {} does not exist ({} server(s) available)",
                cmd.server,
                cmd.episode,
                detail.servers.len()
            ),
            ExitCode::NotFound,
        );
    };

    let response = |action, url: Option<String>| PlayResponse {
        movie: detail.name.clone(),
        episode: source.display_name.clone(),
        action,
        url,
    };

    match PlaybackDecision::for_source(source) {
        PlaybackDecision::OpenExternal(url) => {
            // Third-party embeds refuse to load framed; hand the URL to
            // the user's browser instead of trying to wrap it
            output.line(format!("Open in browser: {}", url));
            if output.json {
                if let Err(e) = output.print(response("open_external", Some(url))) {
                    return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
                }
            }
            ExitCode::Success
        }
        PlaybackDecision::PlayHls(url) => {
            let player_type = match cmd.player {
                PlayerChoice::Vlc => PlayerType::Vlc,
                PlayerChoice::Mpv => PlayerType::Mpv,
            };
            let mut controller = PlaybackController::new();

            if let Err(e) = controller.play(&url, LocalHlsPlayer::new(player_type)) {
                return output.error(format!("Playback failed: {}", e), ExitCode::Error);
            }

            output.info(format!(
                "Playing {} - {} via {}",
                detail.name, source.display_name, player_type
            ));
            if let Some(player) = controller.active_mut() {
                let _ = player.wait().await;
            }
            controller.stop();

            if output.json {
                if let Err(e) = output.print(response("play_hls", Some(url))) {
                    return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
                }
            }
            ExitCode::Success
        }
        PlaybackDecision::NoSource => {
            output.line("No stream available for this episode. Try another server.");
            if output.json {
                if let Err(e) = output.print(response("no_source", None)) {
                    return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
                }
            }
            ExitCode::NoSource
        }
    }
}

// =============================================================================
// Theme Command
// =============================================================================

pub fn theme_cmd(cmd: ThemeCmd, output: &Output) -> ExitCode {
    let mut config = Config::load();

    match cmd.value {
        Some(value) => match value.parse::<Theme>() {
            Ok(theme) => {
                config.set_theme(theme);
                output.line(format!("Theme set to {}", theme));
                if output.json {
                    if let Err(e) = output.print(ThemeResponse {
                        theme: theme.to_string(),
                    }) {
                        return output
                            .error(format!("Failed to serialize: {}", e), ExitCode::Error);
                    }
                }
                ExitCode::Success
            }
            Err(e) => output.error(e, ExitCode::InvalidArgs),
        },
        None => {
            output.line(config.theme.to_string());
            if output.json {
                if let Err(e) = output.print(ThemeResponse {
                    theme: config.theme.to_string(),
                }) {
                    return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
                }
            }
            ExitCode::Success
        }
    }
}
