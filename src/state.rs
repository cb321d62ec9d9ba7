use iced::widget::image;

use crate::config::Config;
use crate::media::GstMedia;
use crate::player::PlaybackController;
use crate::toast::Toasts;
use crate::watchdog::Watchdog;

/// Application state: the one video panel plus what surrounds it.
pub struct App<M = GstMedia> {
    pub config: Config,
    pub panel: PlaybackController<M>,
    /// Poster image, once downloaded.
    pub poster: Option<image::Handle>,
    pub toasts: Toasts,
    pub watchdog: Option<Watchdog>,
}
