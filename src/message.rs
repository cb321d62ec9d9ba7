use iced::Event;
use iced::widget::image;
use iced::window;
use iced_video_player::Video;

use crate::media::OpenResult;
use crate::player::Attempt;
use crate::poster::PosterError;

/// `O` carries an opened source back from the loader thread.
#[derive(Clone, Debug)]
pub enum Message<O = OpenResult<Video>> {
    NextVideo,
    Retry,
    Opened(Attempt, O),
    PlaySettled(Attempt),
    NewFrame,
    VideoError(String),
    EndOfStream,
    TogglePause,
    ToggleMute,
    Seek(f64),
    SeekRelease,
    PosterLoaded(Result<image::Handle, PosterError>),
    DismissToast(usize),
    EventOccurred(Event),
    CloseRequested(window::Id),
}
