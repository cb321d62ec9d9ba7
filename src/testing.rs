//! Test doubles shared by the controller and app tests.

use std::sync::{Arc, Mutex};
use url::Url;

use crate::media::{MediaElement, MediaError, Opener, PlaybackError};
use crate::player::PlaybackController;
use crate::source::Endpoint;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Assign(String),
    Load,
    Attach,
    Play,
    Pause,
    Activate,
    TogglePause,
}

/// Media element that records what it was asked to do.
///
/// The call log is shared, so tests can keep reading it after the element
/// has been moved into (or dropped by) the controller.
#[derive(Default)]
pub struct FakeMedia {
    pub(crate) log: Arc<Mutex<Vec<Call>>>,
    pub fail_load: bool,
    pub fail_open: bool,
    pub block_autoplay: bool,
}

impl FakeMedia {
    pub fn log(&self) -> CallLog {
        CallLog(Arc::clone(&self.log))
    }

    fn record(&self, call: Call) {
        self.log.lock().unwrap().push(call);
    }
}

#[derive(Clone)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

impl MediaElement for FakeMedia {
    type Prepared = ();

    fn assign_source(&mut self, url: &Url) {
        self.record(Call::Assign(url.to_string()));
    }

    fn load(&mut self) -> Result<Opener<()>, MediaError> {
        self.record(Call::Load);
        if self.fail_load {
            return Err(MediaError::NoSource);
        }
        let fail_open = self.fail_open;
        Ok(Box::new(move || {
            if fail_open {
                Err(MediaError::Worker("connection refused".into()))
            } else {
                Ok(())
            }
        }))
    }

    fn attach(&mut self, _prepared: ()) {
        self.record(Call::Attach);
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.record(Call::Play);
        if self.block_autoplay {
            Err(PlaybackError::AutoplayBlocked)
        } else {
            Ok(())
        }
    }

    fn pause(&mut self) {
        self.record(Call::Pause);
    }

    fn activate(&mut self) {
        self.record(Call::Activate);
    }

    fn on_frame(&mut self) {}

    fn toggle_pause(&mut self) {
        self.record(Call::TogglePause);
    }

    fn toggle_mute(&mut self) {}

    fn scrub(&mut self, _secs: f64) {}

    fn release_scrub(&mut self) {}
}

pub fn fixed_clock() -> u64 {
    1_700_000_000_000
}

pub const FIXED_URL: &str = "https://api.lolimi.cn/API/xjj/xjj.php?t=1700000000000";

/// A controller with `media` mounted and a frozen clock.
pub fn mounted(media: FakeMedia) -> (PlaybackController<FakeMedia>, CallLog) {
    let log = media.log();
    let mut player = PlaybackController::new(Endpoint::default()).with_clock(fixed_clock);
    player.mount(media);
    (player, log)
}
