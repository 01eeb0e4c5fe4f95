//! Playback source resolution and player lifecycle
//!
//! Deciding *what* to play is pure policy: a non-blank embed URL always
//! wins and is opened externally (hosting sites block third-party
//! iframes, so in-page embedding is not attempted), an HLS manifest is
//! the fallback, and a dead episode yields `NoSource`, a user-facing
//! state rather than an error.
//!
//! Playing is a resource problem: at most one player instance is ever
//! alive, and replacing or stopping it must release the old instance
//! exactly once on every exit path.

use std::process::Stdio;
use thiserror::Error;
use tokio::process::{Child, Command};

use crate::models::EpisodeSource;

// =============================================================================
// Playback Decision
// =============================================================================

/// What the caller should do with an episode's candidate sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackDecision {
    /// Open this URL as an external navigation
    OpenExternal(String),
    /// Attach an HLS player to this manifest URL
    PlayHls(String),
    /// Nothing playable; show a "no stream available" state
    NoSource,
}

/// Pick a playback route from the candidate URLs.
///
/// Blank and whitespace-only strings are treated as absent. A present
/// embed URL wins over a present HLS URL.
pub fn resolve(embed_url: &str, hls_url: &str) -> PlaybackDecision {
    let embed = embed_url.trim();
    if !embed.is_empty() {
        return PlaybackDecision::OpenExternal(embed.to_string());
    }

    let hls = hls_url.trim();
    if !hls.is_empty() {
        return PlaybackDecision::PlayHls(hls.to_string());
    }

    PlaybackDecision::NoSource
}

impl PlaybackDecision {
    /// Resolve directly from a normalized episode source
    pub fn for_source(source: &EpisodeSource) -> Self {
        resolve(&source.embed_url, &source.hls_url)
    }
}

// =============================================================================
// Player Seam
// =============================================================================

/// Errors from player operations
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player '{0}' not found. Install it first.")]
    NotFound(String),
    #[error("Failed to start player: {0}")]
    StartFailed(#[from] std::io::Error),
}

/// The HLS playback collaborator. Implementations attach to a manifest
/// URL and must make `release` safe to call exactly once per attach.
pub trait HlsPlayer {
    fn attach(&mut self, manifest_url: &str) -> Result<(), PlayerError>;
    fn release(&mut self);
}

// =============================================================================
// Playback Controller
// =============================================================================

/// Owner of the single active playback instance. Starting a new playback
/// tears down the previous instance before attaching; stop and drop also
/// release. `Option::take` guarantees each instance is released once.
pub struct PlaybackController<P: HlsPlayer> {
    active: Option<P>,
}

impl<P: HlsPlayer> Default for PlaybackController<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: HlsPlayer> PlaybackController<P> {
    pub fn new() -> Self {
        Self { active: None }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The active player, e.g. to wait for it to finish
    pub fn active_mut(&mut self) -> Option<&mut P> {
        self.active.as_mut()
    }

    /// Attach a player to a manifest, releasing any previous instance
    /// first. On attach failure nothing stays active.
    pub fn play(&mut self, manifest_url: &str, mut player: P) -> Result<(), PlayerError> {
        self.stop();
        player.attach(manifest_url)?;
        self.active = Some(player);
        Ok(())
    }

    /// Release the active instance, if any
    pub fn stop(&mut self) {
        if let Some(mut player) = self.active.take() {
            player.release();
        }
    }
}

impl<P: HlsPlayer> Drop for PlaybackController<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// Local Player
// =============================================================================

/// Supported local players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerType {
    /// VLC media player (default)
    #[default]
    Vlc,
    /// mpv media player
    Mpv,
}

impl PlayerType {
    /// Get the command name for this player
    pub fn command(&self) -> &'static str {
        match self {
            PlayerType::Vlc => {
                // On macOS, VLC is an app bundle - check for it
                #[cfg(target_os = "macos")]
                if std::path::Path::new("/Applications/VLC.app").exists() {
                    return "/Applications/VLC.app/Contents/MacOS/VLC";
                }
                "vlc"
            }
            PlayerType::Mpv => "mpv",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerType::Vlc => "VLC",
            PlayerType::Mpv => "mpv",
        }
    }
}

impl std::fmt::Display for PlayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// HLS playback via a local player process. `release` kills the child;
/// a player the user already closed is just a no-op kill.
pub struct LocalHlsPlayer {
    player_type: PlayerType,
    child: Option<Child>,
}

impl LocalHlsPlayer {
    pub fn new(player_type: PlayerType) -> Self {
        Self {
            player_type,
            child: None,
        }
    }

    pub fn vlc() -> Self {
        Self::new(PlayerType::Vlc)
    }

    pub fn mpv() -> Self {
        Self::new(PlayerType::Mpv)
    }

    pub fn player_type(&self) -> PlayerType {
        self.player_type
    }

    /// Wait for the player process to exit (user closed the window).
    /// After this returns the instance has nothing left to release.
    pub async fn wait(&mut self) -> Result<(), PlayerError> {
        if let Some(mut child) = self.child.take() {
            let _ = child.wait().await;
        }
        Ok(())
    }
}

impl HlsPlayer for LocalHlsPlayer {
    fn attach(&mut self, manifest_url: &str) -> Result<(), PlayerError> {
        let mut cmd = Command::new(self.player_type.command());
        cmd.arg(manifest_url);

        match self.player_type {
            PlayerType::Vlc => {
                cmd.arg("--no-video-title-show");
            }
            PlayerType::Mpv => {
                cmd.arg("--force-window=immediate");
            }
        }

        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlayerError::NotFound(self.player_type.command().to_string())
            } else {
                PlayerError::StartFailed(e)
            }
        })?;

        self.child = Some(child);
        Ok(())
    }

    fn release(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
