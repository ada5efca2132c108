//! Playable media elements.
//!
//! A [`MediaElement`] is the source of truth for whether a recording is
//! playing; controllers read [`MediaElement::paused`] instead of tracking
//! their own flag. The native implementation drives an external audio player
//! process (ffplay, mpv, cvlc or afplay).

use std::process::{Child, Command, Stdio};

use crate::recording::ffmpeg::find_on_path;

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("no audio player found. Install ffplay (ffmpeg), mpv or vlc, or set playback.player")]
    NoPlayer,
    #[error("failed to start audio player '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// A single playable media source.
pub trait MediaElement {
    fn src(&self) -> &str;
    fn paused(&self) -> bool;
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    /// Returns `true` once after playback reached its natural end.
    fn take_ended(&mut self) -> bool;
}

/// Creates media elements for sources.
pub trait MediaPlayer {
    type Media: MediaElement;

    fn open(&self, src: &str) -> Self::Media;
}

/// Known players and the arguments that make them play headless and exit at the end.
const PLAYERS: &[(&str, &[&str])] = &[
    ("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet"]),
    ("mpv", &["--no-video", "--really-quiet"]),
    ("cvlc", &["--play-and-exit", "--quiet"]),
    ("afplay", &[]),
];

/// Media player that runs an external program per element.
#[derive(Debug, Clone)]
pub struct ExternalPlayer {
    command: Option<(String, Vec<String>)>,
}

impl ExternalPlayer {
    /// `player` is "auto" or the program to run; known programs get their headless flags.
    pub fn new(player: &str) -> Self {
        let command = if player == "auto" {
            PLAYERS
                .iter()
                .find(|(program, _)| find_on_path(program).is_some())
                .map(|(program, args)| (program.to_string(), to_owned(args)))
        } else {
            let args = PLAYERS
                .iter()
                .find(|(program, _)| *program == player)
                .map(|(_, args)| to_owned(args))
                .unwrap_or_default();
            Some((player.to_string(), args))
        };

        match &command {
            Some((program, _)) => tracing::debug!("Using audio player: {}", program),
            None => tracing::warn!("No audio player found on PATH"),
        }
        Self { command }
    }
}

fn to_owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

impl MediaPlayer for ExternalPlayer {
    type Media = ProcessMedia;

    fn open(&self, src: &str) -> ProcessMedia {
        ProcessMedia {
            src: src.to_string(),
            command: self.command.clone(),
            child: None,
            suspended: false,
        }
    }
}

/// Media element backed by a player child process.
///
/// On Linux pausing suspends the process so playback resumes where it left
/// off; elsewhere pausing stops it and the next play starts over.
pub struct ProcessMedia {
    src: String,
    command: Option<(String, Vec<String>)>,
    child: Option<Child>,
    suspended: bool,
}

impl MediaElement for ProcessMedia {
    fn src(&self) -> &str {
        &self.src
    }

    fn paused(&self) -> bool {
        self.child.is_none() || self.suspended
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.reap();
        if let Some(child) = &self.child {
            if self.suspended {
                signal(child, Signal::Continue);
                self.suspended = false;
            }
            return Ok(());
        }

        let (program, args) = self.command.as_ref().ok_or(PlaybackError::NoPlayer)?;
        let child = Command::new(program)
            .args(args)
            .arg(&self.src)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| PlaybackError::Spawn {
                program: program.clone(),
                source,
            })?;
        tracing::debug!("Playing {} with {} (pid {})", self.src, program, child.id());
        self.child = Some(child);
        Ok(())
    }

    fn pause(&mut self) {
        // A player that already exited has nothing left to suspend
        if self.reap() {
            return;
        }
        let Some(child) = &mut self.child else {
            return;
        };
        if cfg!(target_os = "linux") {
            signal(child, Signal::Stop);
            self.suspended = true;
        } else {
            let _ = child.kill();
            let _ = child.wait();
            self.child = None;
        }
    }

    fn take_ended(&mut self) -> bool {
        self.reap()
    }
}

impl ProcessMedia {
    /// Collects the player process if it has exited. Returns whether it had.
    ///
    /// A suspended player is stopped, not exited, so it is never collected here.
    fn reap(&mut self) -> bool {
        let Some(child) = &mut self.child else {
            return false;
        };
        match child.try_wait() {
            Ok(Some(status)) => {
                tracing::debug!("Playback of {} ended: {}", self.src, status);
                self.child = None;
                self.suspended = false;
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Failed to poll audio player: {}", e);
                false
            }
        }
    }
}

impl Drop for ProcessMedia {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if self.suspended {
                signal(&child, Signal::Continue);
            }
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

enum Signal {
    Stop,
    Continue,
}

#[cfg(target_os = "linux")]
fn signal(child: &Child, signal: Signal) {
    let sig = match signal {
        Signal::Stop => libc::SIGSTOP,
        Signal::Continue => libc::SIGCONT,
    };
    if unsafe { libc::kill(child.id() as libc::pid_t, sig) } == -1 {
        tracing::warn!("Failed to signal audio player (pid {})", child.id());
    }
}

#[cfg(not(target_os = "linux"))]
fn signal(_child: &Child, _signal: Signal) {}

#[cfg(test)]
pub mod testing {
    //! In-memory media elements.

    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shared log of everything the fake elements did, in order.
    pub type Journal = Rc<RefCell<Vec<String>>>;

    #[derive(Default, Clone)]
    pub struct FakePlayer {
        pub journal: Journal,
    }

    pub struct FakeMedia {
        src: String,
        playing: bool,
        ended: bool,
        journal: Journal,
    }

    impl FakeMedia {
        /// Simulates playback running to its end.
        pub fn finish(&mut self) {
            self.playing = false;
            self.ended = true;
        }
    }

    impl MediaPlayer for FakePlayer {
        type Media = FakeMedia;

        fn open(&self, src: &str) -> FakeMedia {
            FakeMedia {
                src: src.to_string(),
                playing: false,
                ended: false,
                journal: self.journal.clone(),
            }
        }
    }

    impl MediaElement for FakeMedia {
        fn src(&self) -> &str {
            &self.src
        }

        fn paused(&self) -> bool {
            !self.playing
        }

        fn play(&mut self) -> Result<(), PlaybackError> {
            self.playing = true;
            self.journal.borrow_mut().push(format!("play {}", self.src));
            Ok(())
        }

        fn pause(&mut self) {
            self.playing = false;
            self.journal.borrow_mut().push(format!("pause {}", self.src));
        }

        fn take_ended(&mut self) -> bool {
            std::mem::take(&mut self.ended)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_player_gets_known_flags() {
        let player = ExternalPlayer::new("mpv");
        let (program, args) = player.command.unwrap();
        assert_eq!(program, "mpv");
        assert_eq!(args, vec!["--no-video", "--really-quiet"]);
    }

    #[test]
    fn test_unknown_player_runs_without_flags() {
        let player = ExternalPlayer::new("my-player");
        assert_eq!(player.command, Some(("my-player".to_string(), Vec::new())));
    }

    #[test]
    fn test_new_media_is_paused() {
        let media = ExternalPlayer::new("my-player").open("http://host/a");
        assert!(media.paused());
        assert_eq!(media.src(), "http://host/a");
    }

    #[cfg(unix)]
    fn wait_for_exit(media: &mut ProcessMedia) {
        let child = media.child.as_mut().unwrap();
        for _ in 0..200 {
            if child.try_wait().unwrap().is_some() {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        panic!("player did not exit");
    }

    #[cfg(unix)]
    #[test]
    fn test_pause_after_natural_end_leaves_media_playable() {
        // `true` ignores its argument and exits at once, like a finished track
        let mut media = ExternalPlayer::new("true").open("memo.wav");
        media.play().unwrap();
        assert!(!media.paused());
        wait_for_exit(&mut media);

        media.pause();
        assert!(media.paused());
        assert!(!media.suspended);

        media.play().unwrap();
        assert!(!media.paused());
        assert!(!media.suspended);
    }

    #[cfg(unix)]
    #[test]
    fn test_play_after_natural_end_starts_a_new_player() {
        let mut media = ExternalPlayer::new("true").open("memo.wav");
        media.play().unwrap();
        wait_for_exit(&mut media);
        let first = media.child.as_ref().unwrap().id();

        media.play().unwrap();
        assert_ne!(media.child.as_ref().map(Child::id), Some(first));
        assert!(!media.paused());
    }

    #[test]
    fn test_missing_player_fails_to_play_and_stays_paused() {
        let mut media = ExternalPlayer::new("voxmemo-missing-player").open("x.wav");
        assert!(matches!(media.play(), Err(PlaybackError::Spawn { .. })));
        assert!(media.paused());
        assert!(!media.take_ended());
    }
}
