//! The media element the playback controller drives.
//!
//! [`MediaElement`] is the seam between the controller and the playback
//! backend. [`GstMedia`] is the real one, backed by a GStreamer pipeline
//! through `iced_video_player`.
//!
//! Opening a source is split in two: [`MediaElement::load`] drops the old
//! source and hands back an [`Opener`], blocking work that runs off the UI
//! thread, and [`MediaElement::attach`] installs whatever it produced.

use iced_video_player::Video;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Failure to open or decode a source.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("no source assigned")]
    NoSource,
    #[error("failed to open {url}: {source}")]
    Open {
        url: Url,
        #[source]
        source: iced_video_player::Error,
    },
    #[error("loader thread failed: {0}")]
    Worker(String),
}

/// Rejection of a play request. Never shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("autoplay requires user interaction")]
    AutoplayBlocked,
    #[error("nothing loaded")]
    NotLoaded,
}

/// Whether playback may start without a prior user gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoplayPolicy {
    #[default]
    Allowed,
    RequireInteraction,
}

/// Blocking work that opens the assigned source.
pub type Opener<T> = Box<dyn FnOnce() -> Result<T, MediaError> + Send>;

/// One-shot carrier for a value that has to travel inside a `Clone` message.
pub struct Slot<T>(Arc<Mutex<Option<T>>>);

impl<T> Slot<T> {
    pub fn new(value: T) -> Self {
        Slot(Arc::new(Mutex::new(Some(value))))
    }

    /// Take the value out. Every clone shares it, so only the first take wins.
    pub fn take(&self) -> Option<T> {
        self.0.lock().ok()?.take()
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Slot(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Slot(..)")
    }
}

/// Result of an [`Opener`] on its way back to the UI thread.
pub type OpenResult<T> = Slot<Result<T, MediaError>>;

/// Imperative handle to a playback surface.
pub trait MediaElement {
    /// What an [`Opener`] produces and [`attach`](Self::attach) consumes.
    type Prepared: Send + 'static;

    /// Point the element at a new source. Takes effect on the next `load`.
    fn assign_source(&mut self, url: &Url);
    /// Discard the current source and return the work that opens the assigned one.
    fn load(&mut self) -> Result<Opener<Self::Prepared>, MediaError>;
    /// Install an opened source.
    fn attach(&mut self, prepared: Self::Prepared);
    /// Ask playback to start.
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);

    // Transport controls driven by the user.

    /// Record a user gesture; lifts the autoplay restriction.
    fn activate(&mut self);
    /// A frame was decoded.
    fn on_frame(&mut self);
    fn toggle_pause(&mut self);
    fn toggle_mute(&mut self);
    /// Move the seek bar while dragging.
    fn scrub(&mut self, secs: f64);
    /// Seek to the scrubbed position and resume.
    fn release_scrub(&mut self);
}

/// Opens slower than this get a warning in the log.
const SLOW_OPEN: Duration = Duration::from_millis(1500);

// Simultaneous pipeline prerolls can deadlock inside GStreamer; open one at a time.
static OPEN_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Build and preroll a pipeline for `url`. Blocks until it is ready or fails.
fn open(url: &Url) -> Result<Video, MediaError> {
    let _guard = OPEN_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    let start = Instant::now();
    let video = Video::new(url).map_err(|source| MediaError::Open {
        url: url.clone(),
        source,
    })?;

    let elapsed = start.elapsed();
    if elapsed > SLOW_OPEN {
        log::warn!("Pipeline preroll SLOW: {}ms for {}", elapsed.as_millis(), url);
    } else {
        log::debug!("Pipeline preroll: {}ms for {}", elapsed.as_millis(), url);
    }
    Ok(video)
}

/// GStreamer-backed media element.
pub struct GstMedia {
    source: Option<Url>,
    video: Option<Video>,
    autoplay: AutoplayPolicy,
    user_activated: bool,
    /// Seek bar position in seconds.
    pub position: f64,
    /// True while the seek bar is being dragged.
    pub dragging: bool,
    has_frame: bool,
}

impl GstMedia {
    pub fn new(autoplay: AutoplayPolicy) -> Self {
        GstMedia {
            source: None,
            video: None,
            autoplay,
            user_activated: false,
            position: 0.0,
            dragging: false,
            has_frame: false,
        }
    }

    pub fn video(&self) -> Option<&Video> {
        self.video.as_ref()
    }

    /// Duration in seconds, or 1.0 while unknown so the slider range stays valid.
    pub fn safe_duration(&self) -> f64 {
        let duration = self
            .video
            .as_ref()
            .map(|v| v.duration().as_secs_f64())
            .unwrap_or_default();
        if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            1.0
        }
    }

    /// Whether the current source has produced a frame yet.
    pub fn has_frame(&self) -> bool {
        self.has_frame
    }

    pub fn is_paused(&self) -> bool {
        self.video.as_ref().is_none_or(|v| v.paused())
    }

    pub fn is_muted(&self) -> bool {
        self.video.as_ref().is_some_and(|v| v.muted())
    }
}

impl MediaElement for GstMedia {
    type Prepared = Video;

    fn assign_source(&mut self, url: &Url) {
        self.source = Some(url.clone());
    }

    fn load(&mut self) -> Result<Opener<Video>, MediaError> {
        // Drop the old pipeline so its buffering stops before the new one prerolls.
        self.video = None;
        self.position = 0.0;
        self.dragging = false;
        self.has_frame = false;

        let url = self.source.clone().ok_or(MediaError::NoSource)?;
        Ok(Box::new(move || open(&url)))
    }

    fn attach(&mut self, video: Video) {
        self.video = Some(video);
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let policy = self.autoplay;
        let activated = self.user_activated;
        let video = self.video.as_mut().ok_or(PlaybackError::NotLoaded)?;
        if policy == AutoplayPolicy::RequireInteraction && !activated {
            video.set_paused(true);
            return Err(PlaybackError::AutoplayBlocked);
        }
        video.set_paused(false);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(video) = self.video.as_mut() {
            video.set_paused(true);
        }
    }

    fn activate(&mut self) {
        self.user_activated = true;
    }

    /// Pulls the playback position into the seek bar unless the user is dragging it.
    fn on_frame(&mut self) {
        self.has_frame = true;
        if self.dragging {
            return;
        }
        if let Some(video) = self.video.as_ref() {
            let pos = video.position().as_secs_f64();
            if pos.is_finite() && pos >= 0.0 {
                self.position = pos;
            }
        }
    }

    fn toggle_pause(&mut self) {
        self.activate();
        if let Some(video) = self.video.as_mut() {
            video.set_paused(!video.paused());
        }
    }

    fn toggle_mute(&mut self) {
        if let Some(video) = self.video.as_mut() {
            let muted = !video.muted();
            video.set_muted(muted);
        }
    }

    /// The pipeline stays paused until release.
    fn scrub(&mut self, secs: f64) {
        if !secs.is_finite() || secs < 0.0 {
            return;
        }
        if let Some(video) = self.video.as_mut() {
            self.dragging = true;
            video.set_paused(true);
            self.position = secs;
        }
    }

    fn release_scrub(&mut self) {
        self.dragging = false;
        let Some(video) = self.video.as_mut() else {
            return;
        };
        if let Err(e) = video.seek(Duration::from_secs_f64(self.position), true) {
            log::warn!("Seek to {:.1}s failed: {}", self.position, e);
        }
        video.set_paused(false);
    }
}
