use iced::widget::{button, canvas, column, container, row, scrollable, text, Space};
use iced::{Alignment, Element, Length, Task, Theme};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod feed;
mod location;
mod state;
mod ui;

use feed::reveal::{SentinelRegistration, TimerTicket};
use feed::{CategoryFilter, FeedCache, FeedQuery, RevealController, Tab, ViewMode, ViewSelector};
use location::{ConfiguredLocationProvider, LocationError, LocationFix, LocationProvider, SessionLocation};
use state::collection::{Collection, Upsert};
use state::config::{Config, ThemeChoice};
use state::data::{Photo, MAX_RATING};
use ui::map::MapOverview;

/// Main application state
///
/// Owns the collection and every piece of view state. The feed itself is
/// derived on demand by `FeedCache`.
struct Lumina {
    config: Config,
    collection: Collection,
    query: FeedQuery,
    cache: FeedCache,
    view: ViewSelector,
    reveal: RevealController,
    /// Abort handle of the pending auto-reveal task
    reveal_timer: Option<iced::task::Handle>,
    /// Live sentinel observer, only while the grid has more to reveal
    sentinel: Option<SentinelRegistration>,
    location: SessionLocation,
    provider: Arc<dyn LocationProvider>,
    /// Photo open in the detail panel
    selected: Option<String>,
    /// Photo whose Delete button was pressed, awaiting confirmation
    pending_delete: Option<String>,
    theme: ThemeChoice,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    CategorySelected(CategoryFilter),
    TabSelected(Tab),
    ToggleMap,
    ToggleManage,
    ToggleTheme,
    /// The one-shot reveal timer fired
    RevealTimerElapsed(TimerTicket),
    /// The feed scrollable moved; used to detect the sentinel
    FeedScrolled(scrollable::Viewport),
    /// Background geolocation request finished
    LocationResolved(Result<LocationFix, LocationError>),
    OpenPhoto(String),
    ClosePhoto,
    NextPhoto,
    PreviousPhoto,
    RatePhoto(String, u8),
    /// Ask for confirmation before deleting
    DeletePhoto(String),
    ConfirmDelete,
    CancelDelete,
}

/// Inputs whose change restarts the reveal from the first page
type RevealKey = (CategoryFilter, Tab, u64, ViewMode);

impl Lumina {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = load_config();
        let collection = load_collection(&config);
        let provider: Arc<dyn LocationProvider> = Arc::new(ConfiguredLocationProvider::new(&config.geolocation));

        let mut app = Lumina::with_parts(config, collection, provider);
        info!("🎨 Lumina initialized with {} photos", app.collection.len());

        let task = app.reset_feed();
        (app, task)
    }

    fn with_parts(config: Config, collection: Collection, provider: Arc<dyn LocationProvider>) -> Self {
        let query = FeedQuery {
            tab: Tab::parse_lenient(&config.default_tab),
            ..FeedQuery::default()
        };
        let status = format!("{} photos in the portfolio.", collection.len());

        Lumina {
            reveal: RevealController::new(config.page_size),
            theme: config.theme,
            config,
            collection,
            query,
            cache: FeedCache::default(),
            view: ViewSelector::default(),
            reveal_timer: None,
            sentinel: None,
            location: SessionLocation::default(),
            provider,
            selected: None,
            pending_delete: None,
            status,
        }
    }

    fn reveal_key(&self) -> RevealKey {
        (self.query.category, self.query.tab, self.query.shuffle_epoch, self.view.mode())
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        let before = self.reveal_key();
        let task = self.handle(message);

        if self.reveal_key() != before {
            Task::batch([task, self.reset_feed()])
        } else {
            self.sync_feed();
            task
        }
    }

    fn handle(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::CategorySelected(category) => {
                self.query.category = category;
                Task::none()
            }
            Message::TabSelected(tab) => {
                self.view.on_tab_selected();

                let mut task = Task::none();
                if tab.needs_location() && self.location.begin_request() {
                    task = Task::perform(
                        location::request_with_timeout(self.provider.clone(), self.config.geolocation.timeout()),
                        Message::LocationResolved,
                    );
                }

                self.query.select_tab(tab);
                task
            }
            Message::ToggleMap => {
                self.view.toggle_map();
                Task::none()
            }
            Message::ToggleManage => {
                let managing = !self.view.is_managing();
                self.view.set_managing(managing);
                self.pending_delete = None;
                if managing {
                    self.selected = None;
                }
                Task::none()
            }
            Message::ToggleTheme => {
                self.theme = match self.theme {
                    ThemeChoice::Light => ThemeChoice::Dark,
                    ThemeChoice::Dark => ThemeChoice::Light,
                };
                Task::none()
            }
            Message::RevealTimerElapsed(ticket) => {
                if self.reveal.on_timer_elapsed(ticket) {
                    debug!("Auto-revealed up to {} photos", self.reveal.visible_count());
                }
                if !self.reveal.has_pending_timer() {
                    self.reveal_timer = None;
                }
                Task::none()
            }
            Message::FeedScrolled(viewport) => {
                if let Some(registration) = self.sentinel {
                    let visible = ui::grid::sentinel_visible(
                        viewport.relative_offset().y,
                        viewport.bounds().height,
                        viewport.content_bounds().height,
                        self.config.sentinel_threshold,
                    );
                    if visible {
                        self.reveal.on_sentinel_visible(registration);
                    }
                }
                Task::none()
            }
            Message::LocationResolved(result) => {
                match self.location.complete(result) {
                    Ok(coordinates) => {
                        self.query.user_location = Some(coordinates);
                        self.status = "Sorted by distance from your location.".to_string();
                    }
                    Err(err) => {
                        self.status = err.user_message().to_string();
                    }
                }
                Task::none()
            }
            Message::OpenPhoto(id) => {
                // Cards carry edit controls in manage mode
                if !self.view.is_managing() {
                    self.selected = Some(id);
                }
                Task::none()
            }
            Message::ClosePhoto => {
                self.selected = None;
                Task::none()
            }
            Message::NextPhoto => {
                self.step_photo(true);
                Task::none()
            }
            Message::PreviousPhoto => {
                self.step_photo(false);
                Task::none()
            }
            Message::RatePhoto(id, rating) => {
                if let Some(mut photo) = self.collection.get(&id).cloned() {
                    photo.rating = rating.min(MAX_RATING);
                    if self.collection.upsert(photo) == Upsert::Updated {
                        self.status = format!("Rated photo {} with {} stars.", id, rating.min(MAX_RATING));
                    }
                }
                Task::none()
            }
            Message::DeletePhoto(id) => {
                if self.collection.get(&id).is_some() {
                    self.pending_delete = Some(id);
                }
                Task::none()
            }
            Message::CancelDelete => {
                self.pending_delete = None;
                Task::none()
            }
            Message::ConfirmDelete => {
                let Some(id) = self.pending_delete.take() else {
                    return Task::none();
                };
                if let Some(photo) = self.collection.remove(&id) {
                    info!("🗑️  Deleted photo {} ({})", photo.id, photo.title);
                    self.status = format!("Deleted \"{}\".", photo.title);
                    if self.selected.as_deref() == Some(id.as_str()) {
                        self.selected = None;
                    }
                }
                Task::none()
            }
        }
    }

    /// Move the detail panel to the next or previous photo of the feed
    fn step_photo(&mut self, forward: bool) {
        let target = self
            .selected
            .as_deref()
            .and_then(|id| feed::neighbors(self.cache.feed(), id))
            .and_then(|n| if forward { n.next } else { n.previous });

        if target.is_some() {
            self.selected = target;
        }
    }

    /// Re-derive after a change that keeps the reveal position
    /// (collection edits, location arriving, reveal progress).
    fn sync_feed(&mut self) {
        self.cache.refresh(&self.collection, &self.query);
        self.reveal.set_total(self.cache.feed().len());
        self.watch_sentinel();
    }

    /// Keep the sentinel observer in step with what is on screen. The grid
    /// is hidden while the detail panel is open.
    fn watch_sentinel(&mut self) {
        if self.selected.is_some() {
            self.reveal.release_sentinel();
            self.sentinel = None;
        } else {
            self.sentinel = self.reveal.observe_sentinel();
        }
    }

    /// Start the feed over from the first page: cancel the pending reveal
    /// timer, drop the sentinel observer, arm a new timer and scroll to top.
    fn reset_feed(&mut self) -> Task<Message> {
        self.cache.refresh(&self.collection, &self.query);

        if let Some(handle) = self.reveal_timer.take() {
            handle.abort();
        }

        let ticket = self.reveal.on_query_changed(self.cache.feed().len(), self.view.mode());
        self.watch_sentinel();

        let (timer, handle) =
            Task::perform(reveal_after(self.config.reveal_delay(), ticket), Message::RevealTimerElapsed).abortable();
        self.reveal_timer = Some(handle);

        Task::batch([timer, scrollable::snap_to(feed_scroll_id(), scrollable::RelativeOffset::START)])
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let map_mode = self.view.mode() == ViewMode::Map;

        let mut page = column![].width(Length::Fill).height(Length::Fill);

        // Hero header, hidden in map view
        if !map_mode {
            page = page.push(
                column![
                    text("LUMINA.").size(56),
                    text("A curated collection of moments in light and shadow.").size(16),
                ]
                .spacing(4)
                .padding([24, 32]),
            );
        }

        page = page.push(self.toolbar());

        if self.location.is_pending() {
            page = page.push(container(text("Locating you...").size(12)).padding([0, 24]));
        }

        let content: Element<Message> = if let Some(photo) = self.selected.as_deref().and_then(|id| self.collection.get(id)) {
            let neighbors = feed::neighbors(self.cache.feed(), &photo.id);
            scrollable(ui::grid::detail(photo, neighbors.as_ref(), self.cache.feed().len()))
                .width(Length::Fill)
                .height(Length::Fill)
                .into()
        } else if map_mode {
            let overview = MapOverview::new(self.shown_photos(), self.location.get(), self.theme == ThemeChoice::Dark);
            let caption = text(format!(
                "{} of {} photos placed on the map",
                overview.marker_count(),
                self.cache.feed().len()
            ))
            .size(12);

            column![canvas(overview).width(Length::Fill).height(Length::Fill), caption]
                .spacing(8)
                .padding(8)
                .into()
        } else {
            let body = if self.cache.feed().is_empty() {
                ui::grid::empty_state()
            } else {
                ui::grid::grid(
                    self.shown_photos(),
                    self.view.is_managing(),
                    self.pending_delete.as_deref(),
                    self.reveal.is_complete() || !self.view.is_paginated(),
                )
            };

            scrollable(container(body).padding([16, 24]).width(Length::Fill))
                .id(feed_scroll_id())
                .on_scroll(Message::FeedScrolled)
                .width(Length::Fill)
                .height(Length::Fill)
                .into()
        };

        page.push(content)
            .push(container(text(&self.status).size(14)).padding([8, 16]))
            .into()
    }

    /// Photos the current view lays out: the revealed prefix when
    /// paginated, the whole feed otherwise
    fn shown_photos(&self) -> &[Photo] {
        if self.view.is_paginated() {
            feed::visible_slice(self.cache.feed(), &self.reveal)
        } else {
            self.cache.feed()
        }
    }

    fn toolbar(&self) -> Element<Message> {
        let map_mode = self.view.mode() == ViewMode::Map;

        let tabs = Tab::ALL.iter().fold(row![].spacing(4), |r, tab| {
            r.push(
                button(text(tab.label()))
                    .on_press(Message::TabSelected(*tab))
                    .style(ui::toggle_style(self.query.tab == *tab)),
            )
        });

        let categories = CategoryFilter::options().into_iter().fold(row![].spacing(4), |r, filter| {
            r.push(
                button(text(filter.to_string()).size(12))
                    .on_press(Message::CategorySelected(filter))
                    .style(ui::toggle_style(self.query.category == filter)),
            )
        });

        let theme_label = match self.theme {
            ThemeChoice::Light => "Light",
            ThemeChoice::Dark => "Dark",
        };

        row![
            tabs,
            button(text(if map_mode { "Grid" } else { "Map" }))
                .on_press(Message::ToggleMap)
                .style(ui::toggle_style(map_mode)),
            Space::with_width(Length::Fill),
            categories,
            button(text(theme_label).size(12)).on_press(Message::ToggleTheme).style(button::secondary),
            button(text("Manage").size(12))
                .on_press(Message::ToggleManage)
                .style(ui::toggle_style(self.view.is_managing())),
        ]
        .spacing(12)
        .padding([8, 24])
        .align_y(Alignment::Center)
        .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        match self.theme {
            ThemeChoice::Light => Theme::Light,
            ThemeChoice::Dark => Theme::Dark,
        }
    }
}

fn feed_scroll_id() -> scrollable::Id {
    scrollable::Id::new("feed")
}

/// One-shot timer behind the automatic reveal
async fn reveal_after(delay: Duration, ticket: TimerTicket) -> TimerTicket {
    tokio::time::sleep(delay).await;
    ticket
}

/// Read settings, falling back to defaults when the file is missing or bad
fn load_config() -> Config {
    let Some(path) = Config::default_path() else {
        return Config::default();
    };

    if !path.exists() {
        debug!("No settings at {}, using defaults", path.display());
        return Config::default();
    }

    match Config::load(&path) {
        Ok(config) => {
            info!("⚙️  Settings loaded from {}", path.display());
            config
        }
        Err(err) => {
            warn!("{}; using default settings", err);
            Config::default()
        }
    }
}

/// Load the photo catalog, or the demo collection if there is none
fn load_collection(config: &Config) -> Collection {
    match config.catalog.clone().or_else(Collection::default_path) {
        Some(path) if path.exists() => match Collection::load(&path) {
            Ok(collection) if collection.is_empty() => {
                warn!("Catalog {} is empty; showing the demo collection", path.display());
                Collection::demo()
            }
            Ok(collection) => collection,
            Err(err) => {
                warn!("{}; showing the demo collection", err);
                Collection::demo()
            }
        },
        _ => {
            info!("No photo catalog found, showing the demo collection");
            Collection::demo()
        }
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lumina=info")))
        .init();

    iced::application("Lumina", Lumina::update, Lumina::view)
        .theme(Lumina::theme)
        .centered()
        .run_with(Lumina::new)
}
