use iced::widget::text::Shaping;
use iced::widget::{Column, Text, button, center, column, container, image, row, slider, stack, text};
use iced::{Alignment, Color, ContentFit, Element, Length, Theme, alignment};
use iced_video_player::VideoPlayer;

use crate::media::GstMedia;
use crate::message::Message;
use crate::player::Overlay;
use crate::state::App;
use crate::toast::Toast;

const TITLE: &str = "视频播放器";
const LOADING: &str = "加载中...";
const RETRY: &str = "重试";
const NEXT: &str = "下一个视频";
const NO_POSTER: &str = "暂无视频";
const HINTS: [&str; 4] = [
    "如果视频无法播放，可以尝试：",
    "1. 点击播放按钮手动开始播放",
    "2. 点击重试或下一个视频",
    "3. 检查网络连接",
];

/// Panel width; the surface keeps a 9:16 portrait ratio.
const SURFACE_WIDTH: f32 = 360.0;
const SURFACE_HEIGHT: f32 = SURFACE_WIDTH * 16.0 / 9.0;

/// Text with shaping that falls back to system fonts for CJK glyphs.
fn label<'a>(content: &'a str) -> Text<'a> {
    text(content).shaping(Shaping::Advanced)
}

fn scrim(alpha: f32) -> impl Fn(&Theme) -> container::Style {
    move |_theme: &Theme| container::Style {
        background: Some(Color::from_rgba(0.0, 0.0, 0.0, alpha).into()),
        text_color: Some(Color::WHITE),
        ..Default::default()
    }
}

/// Format seconds as m:ss.
pub fn format_position(secs: f64) -> String {
    let secs = if secs.is_finite() && secs > 0.0 { secs as u64 } else { 0 };
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Poster image, or a plain placeholder until it arrives.
fn render_poster(app: &App) -> Element<'_, Message> {
    match &app.poster {
        Some(handle) => container(image(handle).content_fit(ContentFit::Cover))
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => center(label(NO_POSTER).size(16).color(Color::from_rgb8(160, 160, 160)))
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
    }
}

fn render_overlay(app: &App) -> Option<Element<'_, Message>> {
    match app.panel.state().overlay() {
        Overlay::Ready => None,
        Overlay::Loading => Some(
            center(label(LOADING).size(20))
                .style(scrim(0.5))
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
        ),
        Overlay::Error(message) => Some(
            center(
                column![
                    text("!").size(32).color(Color::from_rgb8(239, 68, 68)),
                    label(message).size(18),
                    button(label(RETRY).size(16))
                        .on_press(Message::Retry)
                        .padding([6, 16]),
                ]
                .spacing(12)
                .padding(16)
                .align_x(Alignment::Center),
            )
            .style(scrim(0.7))
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        ),
    }
}

/// Video surface with poster and state overlays stacked on top.
fn render_surface(app: &App) -> Element<'_, Message> {
    let media = app.panel.media();
    let mut layers = stack![].width(Length::Fill).height(Length::Fill);

    if let Some(video) = media.and_then(GstMedia::video) {
        layers = layers.push(
            VideoPlayer::new(video)
                .width(Length::Fill)
                .height(Length::Fill)
                .content_fit(ContentFit::Contain)
                .on_new_frame(Message::NewFrame)
                .on_end_of_stream(Message::EndOfStream)
                .on_error(|e| Message::VideoError(e.to_string())),
        );
    }

    if !media.is_some_and(GstMedia::has_frame) {
        layers = layers.push(render_poster(app));
    }

    if let Some(overlay) = render_overlay(app) {
        layers = layers.push(overlay);
    }

    container(layers)
        .width(Length::Fixed(SURFACE_WIDTH))
        .height(Length::Fixed(SURFACE_HEIGHT))
        .style(|_theme: &Theme| container::Style {
            background: Some(Color::BLACK.into()),
            border: iced::Border {
                radius: 12.0.into(),
                ..Default::default()
            },
            ..Default::default()
        })
        .clip(true)
        .into()
}

/// Play/pause, seek bar, mute and position readout.
fn render_playback_controls(app: &App) -> Element<'_, Message> {
    let Some(media) = app.panel.media().filter(|m| m.video().is_some()) else {
        return container("").height(Length::Fixed(36.0)).into();
    };

    row![
        button(text(if media.is_paused() { ">" } else { "||" }).size(12))
            .on_press(Message::TogglePause)
            .padding(8),
        slider(0.0..=media.safe_duration(), media.position, Message::Seek)
            .step(0.1)
            .on_release(Message::SeekRelease),
        button(text(if media.is_muted() { "M" } else { "~" }).size(12))
            .on_press(Message::ToggleMute)
            .padding(8),
        text(format_position(media.position)).size(12),
    ]
    .spacing(5)
    .align_y(alignment::Vertical::Center)
    .width(Length::Fixed(SURFACE_WIDTH))
    .into()
}

fn render_toast(id: usize, toast: &Toast) -> Element<'_, Message> {
    container(
        row![
            label(&toast.message).size(14),
            button(text("x").size(12))
                .on_press(Message::DismissToast(id))
                .padding([2, 6]),
        ]
        .spacing(10)
        .align_y(alignment::Vertical::Center),
    )
    .padding(10)
    .style(|_theme: &Theme| container::Style {
        background: Some(Color::from_rgb8(153, 27, 27).into()),
        text_color: Some(Color::WHITE),
        border: iced::Border {
            radius: 6.0.into(),
            ..Default::default()
        },
        ..Default::default()
    })
    .into()
}

fn render_toasts(app: &App) -> Element<'_, Message> {
    let toasts = column(app.toasts.iter().map(|(id, toast)| render_toast(id, toast))).spacing(8);

    container(toasts)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(alignment::Horizontal::Right)
        .align_y(alignment::Vertical::Top)
        .padding(16)
        .into()
}

/// Render the main view.
pub fn render_main_view(app: &App) -> Element<'_, Message> {
    let next = button(label(NEXT).size(16))
        .padding([12, 32])
        .on_press_maybe(app.panel.next_enabled().then_some(Message::NextVideo));

    let hints: Column<'_, Message> = column(
        HINTS
            .into_iter()
            .map(|line| label(line).size(12).color(Color::from_rgb8(156, 163, 175)).into()),
    )
    .spacing(2)
    .align_x(Alignment::Center);

    let source = text(app.panel.source().map(|url| url.as_str()).unwrap_or_default())
        .size(10)
        .color(Color::from_rgb8(107, 114, 128));

    let panel = column![
        label(TITLE).size(24),
        render_surface(app),
        render_playback_controls(app),
        source,
        next,
        hints,
    ]
    .spacing(16)
    .align_x(Alignment::Center);

    let content = center(panel).width(Length::Fill).height(Length::Fill);

    if app.toasts.is_empty() {
        return content.into();
    }
    stack![content, render_toasts(app)].into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_formats_as_minutes_and_seconds() {
        assert_eq!(format_position(0.0), "0:00");
        assert_eq!(format_position(59.9), "0:59");
        assert_eq!(format_position(61.0), "1:01");
        assert_eq!(format_position(f64::NAN), "0:00");
        assert_eq!(format_position(-3.0), "0:00");
    }
}
