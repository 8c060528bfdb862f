//! The weather widget: view state plus the event handlers that mutate it.
//!
//! Every handler is synchronous from the caller's point of view. Work that
//! needs the network is spawned onto the tokio runtime and its `JoinHandle`
//! returned, so a front end can render the loading state right away and
//! await settlement when it wants to. Each fetch takes a generation number;
//! only the newest one may write its outcome back, and nothing is written
//! after [`WeatherWidget::unmount`].

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    Config, Coordinates, LoadingRelease, LocationService, OpenWeatherProvider, WeatherProvider,
    WeatherQuery, WeatherSnapshot,
    view::{self, View},
};

/// Transient view state, created on mount and dropped with the widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetState {
    pub(crate) place: String,
    pub(crate) coords: Option<Coordinates>,
    pub(crate) snapshot: Option<WeatherSnapshot>,
    pub(crate) location_enabled: bool,
    pub(crate) loading: bool,
    pub(crate) expand: bool,
    pub(crate) generation: u64,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            place: String::new(),
            coords: None,
            snapshot: None,
            location_enabled: true,
            loading: false,
            expand: false,
            generation: 0,
        }
    }
}

impl WidgetState {
    pub fn place(&self) -> &str {
        &self.place
    }

    pub fn coords(&self) -> Option<Coordinates> {
        self.coords
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn location_enabled(&self) -> bool {
        self.location_enabled
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn expanded(&self) -> bool {
        self.expand
    }
}

#[derive(Debug, Clone)]
pub struct WeatherWidget {
    provider: Arc<dyn WeatherProvider>,
    locator: Arc<dyn LocationService>,
    loading_release: LoadingRelease,
    state: Arc<Mutex<WidgetState>>,
    cancel: CancellationToken,
}

impl WeatherWidget {
    /// Widget backed by OpenWeather, using the credential from `config`.
    pub fn new(config: &Config, locator: Arc<dyn LocationService>) -> anyhow::Result<Self> {
        let provider = OpenWeatherProvider::from_config(config)?;
        Ok(Self::with_provider(Arc::new(provider), locator, config.loading_release))
    }

    pub fn with_provider(
        provider: Arc<dyn WeatherProvider>,
        locator: Arc<dyn LocationService>,
        loading_release: LoadingRelease,
    ) -> Self {
        Self {
            provider,
            locator,
            loading_release,
            state: Arc::new(Mutex::new(WidgetState::default())),
            cancel: CancellationToken::new(),
        }
    }

    /// Copy of the current state.
    pub fn state(&self) -> WidgetState {
        self.state.lock().clone()
    }

    pub fn view(&self) -> View {
        view::render(&self.state.lock())
    }

    /// First display: resolve the location once and fetch for it.
    pub fn mount(&self) -> JoinHandle<()> {
        debug!("mounting weather widget");
        self.resolve_location()
    }

    /// One-shot position lookup. On success the weather for that position is
    /// fetched; on failure the widget switches to manual place entry.
    ///
    /// The lookup claims a generation of its own, so a fetch still in flight
    /// cannot clear the spinner, and a fetch issued while the lookup runs
    /// keeps it: the lookup then neither fetches nor touches the loading flag.
    pub fn resolve_location(&self) -> JoinHandle<()> {
        let lookup = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.loading = true;
            state.generation
        };

        let widget = self.clone();
        tokio::spawn(async move {
            let position = tokio::select! {
                biased;
                _ = widget.cancel.cancelled() => return,
                position = widget.locator.current_position() => position,
            };

            let (generation, coords) = {
                let mut state = widget.state.lock();
                if widget.cancel.is_cancelled() {
                    return;
                }
                let superseded = state.generation != lookup;

                match position {
                    Ok(coords) => {
                        info!(lat = coords.latitude, lon = coords.longitude, "location resolved");
                        state.coords = Some(coords);
                        state.location_enabled = true;
                        if superseded {
                            debug!(
                                lookup,
                                latest = state.generation,
                                "newer fetch pending, not fetching for position"
                            );
                            return;
                        }
                        (widget.issue(&mut state), coords)
                    }
                    Err(err) => {
                        warn!(error = %err, "location unavailable, falling back to manual entry");
                        state.location_enabled = false;
                        if !superseded {
                            state.loading = false;
                        }
                        return;
                    }
                }
            };

            widget.run_fetch(generation, WeatherQuery::Coordinates(coords)).await;
        })
    }

    /// Input change in the manual entry form.
    pub fn set_place(&self, text: impl Into<String>) {
        self.state.lock().place = text.into();
    }

    /// Form submission: fetch for the entered place.
    pub fn submit(&self) -> JoinHandle<()> {
        let place = self.state.lock().place.clone();
        self.fetch(WeatherQuery::Place(place))
    }

    /// Re-fetch for the last known coordinates, or the last place when
    /// location is disabled. Does not look the position up again.
    pub fn reload(&self) -> Option<JoinHandle<()>> {
        let query = {
            let state = self.state.lock();
            if state.location_enabled {
                match state.coords {
                    Some(coords) => WeatherQuery::Coordinates(coords),
                    None => {
                        warn!("reload requested before a position was resolved");
                        return None;
                    }
                }
            } else {
                WeatherQuery::Place(state.place.clone())
            }
        };

        Some(self.fetch(query))
    }

    /// Click on the summary panel.
    pub fn toggle_expand(&self) {
        let mut state = self.state.lock();
        state.expand = !state.expand;
    }

    /// Tear down. In-flight work stops and never writes back.
    pub fn unmount(&self) {
        debug!("unmounting weather widget");
        self.cancel.cancel();
    }

    fn fetch(&self, query: WeatherQuery) -> JoinHandle<()> {
        let generation = self.issue(&mut self.state.lock());

        let widget = self.clone();
        tokio::spawn(async move { widget.run_fetch(generation, query).await })
    }

    /// Claim the next generation and set the loading flag for it.
    fn issue(&self, state: &mut WidgetState) -> u64 {
        state.generation += 1;
        state.loading = match self.loading_release {
            LoadingRelease::OnSettle => true,
            LoadingRelease::OnIssue => false,
        };
        state.generation
    }

    async fn run_fetch(&self, generation: u64, query: WeatherQuery) {
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!(generation, "fetch abandoned on unmount");
                return;
            }
            result = self.provider.current(&query) => result,
        };

        let mut state = self.state.lock();
        if self.cancel.is_cancelled() {
            return;
        }
        if state.generation != generation {
            debug!(generation, latest = state.generation, "discarding stale weather response");
            return;
        }

        match result {
            Ok(snapshot) => {
                info!(place = %snapshot.name, generation, "weather updated");
                state.snapshot = Some(snapshot);
            }
            Err(err) => {
                error!(error = %err, ?query, "weather fetch failed");
                state.snapshot = None;
            }
        }
        state.loading = false;
    }
}
