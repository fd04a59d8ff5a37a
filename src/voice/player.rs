//! Playback of the assistant's spoken reply.
//!
//! The backend returns a URL to a synthesised audio file.  [`CommandPlayer`]
//! hands that URL to an external player program (e.g. `mpv --no-video` or
//! `ffplay -nodisp -autoexit`); [`NullPlayer`] skips playback when none is
//! configured.  The voice loop only logs playback errors.

use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::VoiceConfig;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("failed to launch audio player `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("audio player exited with {0}")]
    Exit(std::process::ExitStatus),
}

#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Play `url` to completion.
    async fn play(&self, url: &str) -> Result<(), PlaybackError>;
}

// ---------------------------------------------------------------------------
// CommandPlayer
// ---------------------------------------------------------------------------

/// Runs `<program> <args..> <url>` and waits for it to exit.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `None` when no (non-empty) `player_command` is configured.
    pub fn from_config(config: &VoiceConfig) -> Option<Self> {
        let (program, args) = config.player_command.as_deref()?.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    async fn play(&self, url: &str) -> Result<(), PlaybackError> {
        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| PlaybackError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(PlaybackError::Exit(status))
        }
    }
}

// ---------------------------------------------------------------------------
// NullPlayer
// ---------------------------------------------------------------------------

pub struct NullPlayer;

#[async_trait]
impl AudioPlayer for NullPlayer {
    async fn play(&self, url: &str) -> Result<(), PlaybackError> {
        log::debug!("voice: no audio player configured, skipping {url}");
        Ok(())
    }
}

/// The configured player, or [`NullPlayer`].
pub fn player_from_config(config: &VoiceConfig) -> std::sync::Arc<dyn AudioPlayer> {
    match CommandPlayer::from_config(config) {
        Some(player) => {
            log::info!("voice: audio replies played with `{}`", player.program);
            std::sync::Arc::new(player)
        }
        None => std::sync::Arc::new(NullPlayer),
    }
}
