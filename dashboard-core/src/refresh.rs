//! Drives the four panels: startup, city change, theme change and the
//! periodic timer all start a refresh cycle.
//!
//! Each panel load runs as its own task and settles on its own; there is no
//! barrier across panels. Every slot counts the requests issued for it and
//! only the most recent one may publish, so a slow response for an old city
//! can never replace newer data.

use std::{
    fmt::{self, Debug},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::{
    api::DashboardApi,
    config::DEFAULT_REFRESH_SECS,
    error::DashboardError,
    forecast::ForecastAggregator,
    panel::{self, PanelContent, PanelId, PanelView},
    theme::{RenderSettings, ThemeStore},
};

/// Where finished panels go. Implementations must be cheap; they are called
/// while the panel's slot is locked.
pub trait PanelSink: Send + Sync + Debug {
    fn show(&self, panel: PanelId, view: PanelView);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Startup,
    CityChanged,
    ThemeChanged,
    Timer,
    Manual,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trigger::Startup => "startup",
            Trigger::CityChanged => "city-changed",
            Trigger::ThemeChanged => "theme-changed",
            Trigger::Timer => "timer",
            Trigger::Manual => "manual",
        })
    }
}

/// Input to [`RefreshController::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    SelectCity(String),
    ToggleTheme,
    Refresh,
    Shutdown,
}

#[derive(Debug, Default)]
struct PanelSlot {
    issued: AtomicU64,
    publish: Mutex<()>,
}

impl PanelSlot {
    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, generation: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == generation
    }
}

/// Handle on the panel tasks of one cycle. Dropping it leaves them running.
#[derive(Debug)]
pub struct RefreshCycle {
    pub trigger: Trigger,
    pub number: u64,
    handles: Vec<JoinHandle<()>>,
}

impl RefreshCycle {
    /// Waits until every panel of this cycle has published or been discarded.
    pub async fn settled(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(cycle = self.number, error = %e, "panel task aborted");
            }
        }
    }
}

#[derive(Debug)]
pub struct RefreshController {
    api: Arc<dyn DashboardApi>,
    sink: Arc<dyn PanelSink>,
    theme: Arc<ThemeStore>,
    aggregator: ForecastAggregator,
    interval: Duration,
    city: Mutex<String>,
    slots: Arc<[PanelSlot; 4]>,
    cycles: AtomicU64,
}

impl RefreshController {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        sink: Arc<dyn PanelSink>,
        theme: Arc<ThemeStore>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            api,
            sink,
            theme,
            aggregator: ForecastAggregator::default(),
            interval: Duration::from_secs(DEFAULT_REFRESH_SECS),
            city: Mutex::new(city.into()),
            slots: Arc::new(Default::default()),
            cycles: AtomicU64::new(0),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_aggregator(mut self, aggregator: ForecastAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    pub fn city(&self) -> String {
        self.city.lock().clone()
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    /// Number of refresh cycles started so far.
    pub fn cycles_started(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    pub fn select_city(&self, city: impl Into<String>) -> RefreshCycle {
        *self.city.lock() = city.into();
        self.refresh(Trigger::CityChanged)
    }

    /// Starts loading all four panels for the current city and theme.
    pub fn refresh(&self, trigger: Trigger) -> RefreshCycle {
        let number = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        let city = self.city();
        let settings = self.theme.settings();

        info!(%trigger, %city, cycle = number, theme = %settings.theme, "refreshing dashboard");

        let handles = PanelId::all()
            .into_iter()
            .map(|panel| self.spawn_panel(panel, &city, &settings))
            .collect();

        RefreshCycle { trigger, number, handles }
    }

    fn spawn_panel(&self, panel: PanelId, city: &str, settings: &RenderSettings) -> JoinHandle<()> {
        let slots = Arc::clone(&self.slots);
        let generation = {
            let slot = &slots[panel as usize];
            let generation = slot.issue();
            if let Some(message) = panel.loading_message() {
                let _guard = slot.publish.lock();
                self.sink.show(panel, PanelView::Loading(message));
            }
            generation
        };

        let api = Arc::clone(&self.api);
        let sink = Arc::clone(&self.sink);
        let aggregator = self.aggregator;
        let city = city.to_string();
        let settings = settings.clone();

        tokio::spawn(async move {
            let view = match load_panel(api.as_ref(), panel, &city, &aggregator, &settings).await {
                Ok(content) => {
                    debug!(%panel, %city, generation, "panel loaded");
                    PanelView::Ready(content)
                }
                Err(err) => {
                    error!(%panel, %city, kind = ?err.kind(), error = %err, "panel load failed");
                    PanelView::failed(panel)
                }
            };

            let slot = &slots[panel as usize];
            let _guard = slot.publish.lock();
            if slot.is_latest(generation) {
                sink.show(panel, view);
            } else {
                debug!(%panel, %city, generation, "discarding stale response");
            }
        })
    }

    /// Runs until `Shutdown` arrives or the command channel closes.
    ///
    /// Refreshes once at startup, then on every timer tick, city selection
    /// and theme change. Cycles are never awaited here.
    pub async fn run(&self, mut commands: mpsc::Receiver<ControlEvent>) {
        let mut theme_changes = self.theme.subscribe();
        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.refresh(Trigger::Startup);

        loop {
            tokio::select! {
                biased;

                Some(theme) = theme_changes.recv() => {
                    debug!(%theme, "theme changed");
                    self.refresh(Trigger::ThemeChanged);
                }
                command = commands.recv() => match command {
                    Some(ControlEvent::SelectCity(city)) => {
                        self.select_city(city);
                    }
                    Some(ControlEvent::ToggleTheme) => {
                        if let Err(e) = self.theme.toggle() {
                            warn!(error = %e, "theme toggle failed");
                        }
                    }
                    Some(ControlEvent::Refresh) => {
                        self.refresh(Trigger::Manual);
                    }
                    Some(ControlEvent::Shutdown) | None => break,
                },
                _ = ticker.tick() => {
                    self.refresh(Trigger::Timer);
                }
            }
        }

        info!(cycles = self.cycles_started(), "refresh controller stopped");
    }
}

async fn load_panel(
    api: &dyn DashboardApi,
    panel: PanelId,
    city: &str,
    aggregator: &ForecastAggregator,
    settings: &RenderSettings,
) -> Result<PanelContent, DashboardError> {
    Ok(match panel {
        PanelId::CurrentWeather => {
            panel::current::build(&api.current_weather(city).await?, aggregator, settings)
        }
        PanelId::Forecast => {
            panel::forecast::build(&api.forecast(city).await?, aggregator, settings)
        }
        PanelId::Predictions => panel::predictions::build(&api.predictions(city).await?, settings),
        PanelId::Recommendations => {
            panel::recommendations::build(&api.recommendations().await?, settings)
        }
    })
}
