//! Playback controller for the single video panel.
//!
//! Holds the two pieces of view state (loading flag and error message) and
//! drives a [`MediaElement`] through the load/play lifecycle. Every load is an
//! [`Attempt`]. Opening the source happens off the UI thread and comes back
//! through [`PlaybackController::opened`]; that result and the later play
//! completion only touch the state if their attempt is still the current one,
//! so a slow answer from a superseded load can't clobber a newer one.

use url::Url;

use crate::media::{MediaElement, MediaError, Opener, PlaybackError};
use crate::source::{self, Endpoint};
use crate::toast::Toast;

/// Message shown on the error overlay.
pub const LOAD_FAILED_MESSAGE: &str = "无法加载视频，可能是网络问题或视频链接已失效";
/// Message of the failure toast.
pub const LOAD_FAILED_TOAST: &str = "视频加载失败，请稍后重试";

/// Sequence number of one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attempt(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            loading: true,
            error: None,
        }
    }
}

/// What the panel should draw over the video surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay<'a> {
    Loading,
    Error(&'a str),
    Ready,
}

impl ViewState {
    pub fn overlay(&self) -> Overlay<'_> {
        match (&self.error, self.loading) {
            (Some(message), _) => Overlay::Error(message),
            (None, true) => Overlay::Loading,
            (None, false) => Overlay::Ready,
        }
    }
}

/// A started load.
pub struct Load<P> {
    pub attempt: Attempt,
    /// Blocking work that opens the source; run it off the UI thread and
    /// report back through [`PlaybackController::opened`].
    pub open: Option<Opener<P>>,
    /// Set when the load failed before anything could be opened.
    pub toast: Option<Toast>,
}

/// What became of an opened source.
#[derive(Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Attached and asked to play; settle with [`PlaybackController::play_settled`].
    Playing(Attempt),
    /// Opening failed. Carries the toast unless this attempt already raised one.
    Failed(Option<Toast>),
    /// A newer load superseded it, or the panel was unmounted.
    Discarded,
}

pub struct PlaybackController<M> {
    media: Option<M>,
    endpoint: Endpoint,
    clock: fn() -> u64,
    state: ViewState,
    attempt: u64,
    failed: Option<u64>,
    source: Option<Url>,
}

impl<M: MediaElement> PlaybackController<M> {
    pub fn new(endpoint: Endpoint) -> Self {
        PlaybackController {
            media: None,
            endpoint,
            clock: source::now_millis,
            state: ViewState::default(),
            attempt: 0,
            failed: None,
            source: None,
        }
    }

    /// Replace the wall clock used for cache-busting.
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    pub fn mount(&mut self, media: M) {
        self.media = Some(media);
    }

    /// Pause and release the media element.
    pub fn unmount(&mut self) -> Option<M> {
        let mut media = self.media.take()?;
        media.pause();
        log::debug!("Panel unmounted, playback paused");
        Some(media)
    }

    pub fn media(&self) -> Option<&M> {
        self.media.as_ref()
    }

    pub fn media_mut(&mut self) -> Option<&mut M> {
        self.media.as_mut()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// URL of the most recent load.
    pub fn source(&self) -> Option<&Url> {
        self.source.as_ref()
    }

    pub fn attempt(&self) -> Attempt {
        Attempt(self.attempt)
    }

    pub fn next_enabled(&self) -> bool {
        !self.state.loading
    }

    /// Point the media element at a new random video.
    ///
    /// Returns `None` when nothing is mounted. Loading stays true until the
    /// returned opener's result comes back through [`opened`](Self::opened)
    /// and the play request settles, or until an error is reported.
    pub fn load_video(&mut self) -> Option<Load<M::Prepared>> {
        let media = self.media.as_mut()?;

        self.attempt += 1;
        self.state.loading = true;
        self.state.error = None;

        let url = self.endpoint.url_at((self.clock)());
        log::info!("Loading video #{} from {}", self.attempt, url);
        media.assign_source(&url);
        self.source = Some(url);

        let attempt = Attempt(self.attempt);
        match media.load() {
            Ok(open) => Some(Load {
                attempt,
                open: Some(open),
                toast: None,
            }),
            Err(e) => Some(Load {
                attempt,
                open: None,
                toast: self.handle_video_error(&e.to_string()),
            }),
        }
    }

    /// The opener of `attempt` finished. Attaches the source and requests
    /// playback if the attempt is still current.
    pub fn opened(
        &mut self,
        attempt: Attempt,
        result: Result<M::Prepared, MediaError>,
    ) -> OpenOutcome {
        if attempt.0 != self.attempt {
            log::debug!(
                "Discarding source of superseded load #{} (current #{})",
                attempt.0,
                self.attempt
            );
            return OpenOutcome::Discarded;
        }
        let Some(media) = self.media.as_mut() else {
            return OpenOutcome::Discarded;
        };

        match result {
            Ok(prepared) => {
                media.attach(prepared);
                match media.play() {
                    Ok(()) => {}
                    Err(PlaybackError::AutoplayBlocked) => {
                        log::info!("Autoplay blocked, waiting for the user to press play");
                    }
                    Err(e) => log::debug!("Play request for #{} rejected: {}", attempt.0, e),
                }
                OpenOutcome::Playing(attempt)
            }
            Err(e) => OpenOutcome::Failed(self.handle_video_error(&e.to_string())),
        }
    }

    /// The play request of `attempt` has settled, whether or not it succeeded.
    pub fn play_settled(&mut self, attempt: Attempt) {
        if attempt.0 != self.attempt {
            log::trace!(
                "Ignoring stale play completion #{} (current #{})",
                attempt.0,
                self.attempt
            );
            return;
        }
        self.state.loading = false;
    }

    /// First frame of the current source is available.
    pub fn handle_loaded_data(&mut self) {
        if self.state.loading {
            log::info!("Video #{} ready", self.attempt);
        }
        self.state.loading = false;
    }

    /// The media element reported a network or decode failure.
    ///
    /// Returns the failure notification, once per attempt.
    pub fn handle_video_error(&mut self, detail: &str) -> Option<Toast> {
        log::error!("Video error on #{}: {}", self.attempt, detail);
        self.state.loading = false;
        self.state.error = Some(LOAD_FAILED_MESSAGE.to_string());

        if self.failed == Some(self.attempt) {
            return None;
        }
        self.failed = Some(self.attempt);
        Some(Toast::error(LOAD_FAILED_TOAST))
    }

    pub fn handle_next_video(&mut self) -> Option<Load<M::Prepared>> {
        self.load_video()
    }

    pub fn retry(&mut self) -> Option<Load<M::Prepared>> {
        self.load_video()
    }
}
