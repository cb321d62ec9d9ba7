use iced::keyboard::{self, Key, key::Named};
use iced::{Element, Subscription, Task, Theme, event, window};

use crate::config::Config;
use crate::media::{GstMedia, MediaElement, MediaError, OpenResult, Slot};
use crate::message::Message;
use crate::player::{Load, OpenOutcome, PlaybackController};
use crate::poster;
use crate::source::Endpoint;
use crate::state::App;
use crate::toast::{Toast, Toasts};
use crate::ui;
use crate::watchdog::{Thresholds, Watchdog};

/// Message type of an app driving media element `M`.
pub type AppMessage<M> = Message<OpenResult<<M as MediaElement>::Prepared>>;

impl App<GstMedia> {
    /// Build the state, mount the panel and start the first load.
    pub fn new() -> (Self, Task<Message>) {
        let config = Config::default();

        let endpoint = Endpoint::new(&config.endpoint).unwrap_or_else(|e| {
            log::error!("Invalid endpoint {:?}: {}, using default", config.endpoint, e);
            Endpoint::default()
        });
        log::info!("Random video endpoint: {}", endpoint.base());

        let mut panel = PlaybackController::new(endpoint);
        panel.mount(GstMedia::new(config.autoplay));

        let poster_task = Task::perform(
            poster::fetch(config.poster_url.clone()),
            Message::PosterLoaded,
        );

        let mut app = App::with_panel(config, panel);
        app.watchdog = Watchdog::spawn(Thresholds {
            warn: app.config.watchdog_warn,
            stall: app.config.watchdog_stall,
        });
        let load_task = app.start();

        (app, Task::batch([poster_task, load_task]))
    }

    /// Render the view.
    pub fn view(&self) -> Element<'_, Message> {
        ui::render_main_view(self)
    }
}

impl<M: MediaElement + 'static> App<M> {
    pub fn with_panel(config: Config, panel: PlaybackController<M>) -> Self {
        App {
            config,
            panel,
            poster: None,
            toasts: Toasts::default(),
            watchdog: None,
        }
    }

    /// Kick off the first load, as on mount.
    pub fn start(&mut self) -> Task<AppMessage<M>> {
        let load = self.panel.load_video();
        self.after_load(load)
    }

    /// Handle UI messages and state updates.
    pub fn update(&mut self, message: AppMessage<M>) -> Task<AppMessage<M>> {
        if let Some(watchdog) = &self.watchdog {
            watchdog.heartbeat();
        }

        match message {
            Message::NextVideo => {
                self.user_gesture();
                let load = self.panel.handle_next_video();
                self.after_load(load)
            }
            Message::Retry => {
                self.user_gesture();
                let load = self.panel.retry();
                self.after_load(load)
            }
            Message::Opened(attempt, slot) => {
                let Some(result) = slot.take() else {
                    return Task::none();
                };
                match self.panel.opened(attempt, result) {
                    OpenOutcome::Playing(attempt) => Task::done(Message::PlaySettled(attempt)),
                    OpenOutcome::Failed(Some(toast)) => self.show_toast(toast),
                    OpenOutcome::Failed(None) | OpenOutcome::Discarded => Task::none(),
                }
            }
            Message::PlaySettled(attempt) => {
                self.panel.play_settled(attempt);
                Task::none()
            }
            Message::NewFrame => {
                if let Some(media) = self.panel.media_mut() {
                    media.on_frame();
                }
                self.panel.handle_loaded_data();
                Task::none()
            }
            Message::VideoError(detail) => match self.panel.handle_video_error(&detail) {
                Some(toast) => self.show_toast(toast),
                None => Task::none(),
            },
            Message::EndOfStream => {
                log::debug!("End of stream");
                Task::none()
            }
            Message::TogglePause => {
                if let Some(media) = self.panel.media_mut() {
                    media.toggle_pause();
                }
                Task::none()
            }
            Message::ToggleMute => {
                if let Some(media) = self.panel.media_mut() {
                    media.toggle_mute();
                }
                Task::none()
            }
            Message::Seek(secs) => {
                if let Some(media) = self.panel.media_mut() {
                    media.scrub(secs);
                }
                Task::none()
            }
            Message::SeekRelease => {
                if let Some(media) = self.panel.media_mut() {
                    media.release_scrub();
                }
                Task::none()
            }
            Message::PosterLoaded(result) => {
                match result {
                    Ok(handle) => self.poster = Some(handle),
                    Err(e) => log::warn!("Poster unavailable, using placeholder: {}", e),
                }
                Task::none()
            }
            Message::DismissToast(id) => {
                self.toasts.dismiss(id);
                Task::none()
            }
            Message::EventOccurred(event) => self.handle_event(event),
            Message::CloseRequested(id) => {
                log::info!("Window closing after load {:?}", self.panel.attempt());
                self.panel.unmount();
                window::close(id)
            }
        }
    }

    fn handle_event(&mut self, event: iced::Event) -> Task<AppMessage<M>> {
        match event {
            iced::Event::Keyboard(keyboard::Event::KeyPressed { key, .. }) => {
                self.handle_key(key.as_ref())
            }
            _ => Task::none(),
        }
    }

    /// Keyboard shortcuts: next, retry and play/pause.
    pub fn handle_key(&mut self, key: Key<&str>) -> Task<AppMessage<M>> {
        match key {
            Key::Named(Named::ArrowRight) | Key::Character("n" | "N") => {
                if self.panel.next_enabled() {
                    return self.update(Message::NextVideo);
                }
                Task::none()
            }
            Key::Character("r" | "R") if self.panel.state().error.is_some() => {
                self.update(Message::Retry)
            }
            Key::Named(Named::Space) => self.update(Message::TogglePause),
            _ => Task::none(),
        }
    }

    fn user_gesture(&mut self) {
        if let Some(media) = self.panel.media_mut() {
            media.activate();
        }
    }

    /// Follow-up work for a started load: open the source on a blocking
    /// thread, and show the failure toast if the load failed up front.
    fn after_load(&mut self, load: Option<Load<M::Prepared>>) -> Task<AppMessage<M>> {
        let Some(load) = load else {
            log::debug!("Load requested with no media mounted");
            return Task::none();
        };

        let mut tasks = Vec::new();
        if let Some(toast) = load.toast {
            tasks.push(self.show_toast(toast));
        }
        if let Some(open) = load.open {
            let attempt = load.attempt;
            tasks.push(Task::perform(
                async move {
                    tokio::task::spawn_blocking(open)
                        .await
                        .unwrap_or_else(|e| Err(MediaError::Worker(e.to_string())))
                },
                move |result| Message::Opened(attempt, Slot::new(result)),
            ));
        }
        Task::batch(tasks)
    }

    fn show_toast(&mut self, toast: Toast) -> Task<AppMessage<M>> {
        let id = self.toasts.push(toast);
        let lifetime = self.config.toast_lifetime;
        Task::perform(
            async move { tokio::time::sleep(lifetime).await },
            move |_| Message::DismissToast(id),
        )
    }

    /// Subscribe to events.
    pub fn subscription(&self) -> Subscription<AppMessage<M>> {
        Subscription::batch([
            event::listen().map(Message::EventOccurred),
            window::close_requests().map(Message::CloseRequested),
        ])
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{LOAD_FAILED_MESSAGE, LOAD_FAILED_TOAST};
    use crate::testing::{Call, CallLog, FakeMedia, mounted};

    fn app_with(media: FakeMedia) -> (App<FakeMedia>, CallLog) {
        let (panel, log) = mounted(media);
        let mut app = App::with_panel(Config::default(), panel);
        let _ = app.start();
        (app, log)
    }

    /// Deliver a successful open and its play completion.
    fn finish_load(app: &mut App<FakeMedia>) {
        let attempt = app.panel.attempt();
        let _ = app.update(Message::Opened(attempt, Slot::new(Ok(()))));
        let _ = app.update(Message::PlaySettled(attempt));
    }

    fn assigns(log: &CallLog) -> usize {
        log.calls()
            .iter()
            .filter(|c| matches!(c, Call::Assign(_)))
            .count()
    }

    fn toast_messages(app: &App<FakeMedia>) -> Vec<String> {
        app.toasts.iter().map(|(_, t)| t.message.clone()).collect()
    }

    #[test]
    fn next_keys_ignored_while_loading() {
        let (mut app, log) = app_with(FakeMedia::default());
        assert!(app.panel.state().loading);

        let _ = app.handle_key(Key::Character("n"));
        let _ = app.handle_key(Key::Named(Named::ArrowRight));
        assert_eq!(assigns(&log), 1);

        finish_load(&mut app);
        assert!(!app.panel.state().loading);

        let _ = app.handle_key(Key::Character("N"));
        assert_eq!(assigns(&log), 2);
        assert!(app.panel.state().loading);
    }

    #[test]
    fn retry_key_only_acts_on_error() {
        let (mut app, log) = app_with(FakeMedia::default());
        finish_load(&mut app);

        let _ = app.handle_key(Key::Character("r"));
        assert_eq!(assigns(&log), 1);

        let _ = app.update(Message::VideoError("decoder gave up".into()));
        assert_eq!(app.panel.state().error.as_deref(), Some(LOAD_FAILED_MESSAGE));

        let _ = app.handle_key(Key::Character("R"));
        assert_eq!(assigns(&log), 2);
        assert!(app.panel.state().error.is_none());
        assert!(app.panel.state().loading);
        assert!(log.calls().contains(&Call::Activate));
    }

    #[test]
    fn space_toggles_pause() {
        let (mut app, log) = app_with(FakeMedia::default());
        let _ = app.handle_key(Key::Named(Named::Space));
        assert_eq!(log.calls().last(), Some(&Call::TogglePause));
    }

    #[test]
    fn close_request_pauses_and_unmounts() {
        let (mut app, log) = app_with(FakeMedia::default());
        finish_load(&mut app);

        let _ = app.update(Message::CloseRequested(window::Id::unique()));
        assert_eq!(log.calls().last(), Some(&Call::Pause));
        assert!(app.panel.media().is_none());
    }

    #[test]
    fn load_failure_shows_one_toast() {
        let (app, log) = app_with(FakeMedia {
            fail_load: true,
            ..Default::default()
        });
        assert_eq!(toast_messages(&app), vec![LOAD_FAILED_TOAST.to_string()]);
        assert!(!app.panel.state().loading);
        assert!(!log.calls().contains(&Call::Play));
    }

    #[test]
    fn open_failure_shows_one_toast() {
        let (mut app, _log) = app_with(FakeMedia::default());
        assert!(app.toasts.is_empty());

        let attempt = app.panel.attempt();
        let _ = app.update(Message::Opened(
            attempt,
            Slot::new(Err(MediaError::Worker("timed out".into()))),
        ));
        let _ = app.update(Message::VideoError("late pipeline error".into()));

        assert_eq!(toast_messages(&app), vec![LOAD_FAILED_TOAST.to_string()]);
        assert_eq!(app.panel.state().error.as_deref(), Some(LOAD_FAILED_MESSAGE));
    }

    #[test]
    fn opened_message_is_consumed_once() {
        let (mut app, log) = app_with(FakeMedia::default());
        let slot = Slot::new(Ok(()));
        let attempt = app.panel.attempt();

        let _ = app.update(Message::Opened(attempt, slot.clone()));
        let _ = app.update(Message::Opened(attempt, slot));
        let attaches = log.calls().iter().filter(|c| **c == Call::Attach).count();
        assert_eq!(attaches, 1);
    }

    #[test]
    fn dismiss_removes_expired_toast() {
        let (mut app, _log) = app_with(FakeMedia::default());
        let _ = app.update(Message::VideoError("gone".into()));
        let (id, _) = app.toasts.iter().next().expect("a toast is shown");

        let _ = app.update(Message::DismissToast(id));
        assert!(app.toasts.is_empty());
    }
}
