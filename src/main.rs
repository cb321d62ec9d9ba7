mod app;
mod config;
mod media;
mod message;
mod player;
mod poster;
mod source;
mod state;
#[cfg(test)]
mod testing;
mod toast;
mod ui;
mod watchdog;

use media::GstMedia;
use state::App;

type Player = App<GstMedia>;

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match gstreamer::init() {
        Ok(()) => log::info!("Using {}", gstreamer::version_string()),
        Err(e) => log::error!("GStreamer failed to initialize, playback will not work: {}", e),
    }

    iced::application(Player::new, Player::update, Player::view)
        .title("视频播放器")
        .subscription(Player::subscription)
        .theme(Player::theme)
        .window_size((480.0, 960.0))
        .exit_on_close_request(false)
        .run()
}
