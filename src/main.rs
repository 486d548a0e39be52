//! Weather Report - terminal form for current weather by coordinates or city

use std::cell::RefCell;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Rect};
use tui_dispatch::{
    EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};
use weather_report::action::Action;
use weather_report::api::{
    ApiConfig, DEFAULT_FORECAST_URL, DEFAULT_GEOCODING_URL, DEFAULT_TIMEOUT_SECS, OpenMeteoClient,
};
use weather_report::components::{Component, WeatherReport, WeatherReportProps};
use weather_report::effect::{DEFAULT_SEARCH_DEBOUNCE_MS, Effect, EffectHandler};
use weather_report::reducer::reducer;
use weather_report::state::{AppState, Favourite, FormSeed, LOADING_ANIM_TICK_MS};

/// Weather Report - current weather for a coordinate or city
#[derive(Parser, Debug)]
#[command(name = "weather-report")]
#[command(about = "Look up current weather by coordinates or city name")]
struct Args {
    /// Initial latitude (-90 to 90)
    #[arg(long, allow_hyphen_values = true)]
    latitude: Option<f64>,

    /// Initial longitude (-180 to 180)
    #[arg(long, allow_hyphen_values = true)]
    longitude: Option<f64>,

    /// Preloaded favourite as "lat, lon[, city]" (repeatable)
    #[arg(long = "favourite", value_name = "LOCATION", allow_hyphen_values = true)]
    favourites: Vec<Favourite>,

    /// Forecast endpoint
    #[arg(long, default_value = DEFAULT_FORECAST_URL)]
    forecast_url: String,

    /// Geocoding endpoint
    #[arg(long, default_value = DEFAULT_GEOCODING_URL)]
    geocoding_url: String,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,

    /// Quiet period before a typed city is searched, in milliseconds
    #[arg(long, default_value_t = DEFAULT_SEARCH_DEBOUNCE_MS)]
    debounce_ms: u64,

    /// Re-fetch the last submitted location every N seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    refresh_interval: Option<u64>,

    /// Write logs to this file (RUST_LOG controls the level)
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum ReportComponentId {
    Form,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum ReportContext {
    Form,
}

impl EventRoutingState<ReportComponentId, ReportContext> for AppState {
    fn focused(&self) -> Option<ReportComponentId> {
        Some(ReportComponentId::Form)
    }

    fn modal(&self) -> Option<ReportComponentId> {
        None
    }

    fn binding_context(&self, id: ReportComponentId) -> ReportContext {
        match id {
            ReportComponentId::Form => ReportContext::Form,
        }
    }

    fn default_context(&self) -> ReportContext {
        ReportContext::Form
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        latitude,
        longitude,
        favourites,
        forecast_url,
        geocoding_url,
        timeout_secs,
        debounce_ms,
        refresh_interval,
        log_file,
        debug: debug_args,
    } = Args::parse();

    if let Some(path) = &log_file {
        init_logging(path)?;
    }

    let client = OpenMeteoClient::new(ApiConfig {
        forecast_url,
        geocoding_url,
        timeout: Duration::from_secs(timeout_secs),
    })
    .map_err(io::Error::other)?;
    tracing::debug!(
        forecast_url = %client.config().forecast_url,
        geocoding_url = %client.config().geocoding_url,
        "open-meteo client ready"
    );
    let effects = EffectHandler::new(client, Duration::from_millis(debounce_ms));

    let debug = DebugSession::new(debug_args);

    // Export JSON schemas if requested
    debug.save_state_schema::<AppState>().map_err(debug_error)?;
    debug.save_actions_schema::<Action>().map_err(debug_error)?;

    let submit_on_start = latitude.is_some() && longitude.is_some();
    let seed = FormSeed {
        latitude,
        longitude,
        favourites,
    };
    let state = debug
        .load_state_or_else_async(move || async move { Ok::<AppState, io::Error>(AppState::new(seed)) })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;

    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    tracing::info!(submit_on_start, "starting weather report");

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(
        &mut terminal,
        &debug,
        store,
        &effects,
        RunOptions {
            refresh_interval,
            submit_on_start,
        },
        replay_actions,
    )
    .await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    Ok(())
}

/// The terminal belongs to the UI, so logs only go to a file.
fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

struct ReportUi {
    report: WeatherReport,
}

impl ReportUi {
    fn new() -> Self {
        Self {
            report: WeatherReport::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<ReportComponentId>,
    ) {
        event_ctx.set_component_area(ReportComponentId::Form, area);

        let props = WeatherReportProps {
            state,
            is_focused: render_ctx.is_focused(),
        };
        self.report.render(frame, area, props);
    }

    fn handle_form_event(&mut self, event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
        let props = WeatherReportProps {
            state,
            is_focused: true,
        };
        let actions: Vec<_> = self
            .report
            .handle_event(event, props)
            .into_iter()
            .collect();
        if actions.is_empty() {
            HandlerResponse::ignored()
        } else {
            HandlerResponse {
                actions,
                consumed: true,
                needs_render: false,
            }
        }
    }
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

struct RunOptions {
    refresh_interval: Option<u64>,
    submit_on_start: bool,
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    effects: &EffectHandler,
    options: RunOptions,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(ReportUi::new()));
    let mut bus: EventBus<AppState, Action, ReportComponentId, ReportContext> = EventBus::new();
    let keybindings: Keybindings<ReportContext> = Keybindings::new();

    let ui_form = Rc::clone(&ui);
    bus.register(ReportComponentId::Form, move |event, state| {
        ui_form.borrow_mut().handle_form_event(&event.kind, state)
    });

    // Re-render on terminal resize (no action needed, just redraw)
    bus.register_global(|event, _state| match event.kind {
        EventKind::Resize(_, _) => HandlerResponse::ignored().with_render(),
        _ => HandlerResponse::ignored(),
    });

    let RunOptions {
        refresh_interval,
        submit_on_start,
    } = options;

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            submit_on_start.then_some(Action::FormSubmit),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }

                runtime.subscriptions().interval(
                    "tick",
                    Duration::from_millis(LOADING_ANIM_TICK_MS),
                    || Action::Tick,
                );

                if let Some(seconds) = refresh_interval {
                    runtime.subscriptions().interval(
                        "refresh",
                        Duration::from_secs(seconds),
                        || Action::WeatherRefresh,
                    );
                }
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            |effect, ctx| effects.handle(effect, ctx.tasks()),
        )
        .await
}
