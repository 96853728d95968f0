mod audio;
mod cli;
mod config;
mod render;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use macroquad::prelude::*;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use audio::analysis::SpectrumAnalyzer;
use audio::capture::{CaptureManager, StreamParams};
use audio::queue::FrameQueue;
use audio::smoothing::BarSmoother;
use cli::Cli;
use config::Settings;
use render::overlay::{self, FadeTimer, OverlayState};
use render::{bars, palette};
use state::{AudioSource, SharedParams};

const SAMPLE_RATE: u32 = 44_100;

/// Capture backlog: ~1.5 s of 1024-sample frames before eviction kicks in.
const QUEUE_CAPACITY: usize = 64;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Load settings: explicit --config path, or auto-detected location.
    let config_path = config::resolve_path(cli.config.clone());
    let mut settings = match config_path.as_ref() {
        Some(path) if path.exists() => match config::load(path) {
            Some(s) => {
                log::info!("Loaded settings from {}", path.display());
                s
            }
            None => Settings::default(),
        },
        _ => Settings::default(),
    };

    // CLI values win over persisted settings.
    if let Some(w) = cli.width {
        settings.window_width = w;
    }
    if let Some(h) = cli.height {
        settings.window_height = h;
    }
    if let Some(s) = cli.sensitivity {
        settings.sensitivity = s;
    }
    if let Some(p) = cli.palette {
        settings.palette = p;
    }
    if let Some(s) = cli.source {
        settings.source = s;
    }
    settings.palette %= palette::PALETTES.len();

    // 1. Audio subsystem and device snapshot.
    let stream_params = StreamParams {
        sample_rate: SAMPLE_RATE,
        chunk_size: cli.chunk_size,
    };
    let queue = Arc::new(FrameQueue::with_capacity(QUEUE_CAPACITY));
    let host = cpal::default_host();
    let mut capture = CaptureManager::new(&host, stream_params, Arc::clone(&queue))
        .context("audio subsystem is unavailable")?;

    let descriptors = capture.descriptors();
    if cli.list_devices {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&descriptors)?);
        } else {
            for d in &descriptors {
                println!(
                    "[{}] {} - in: {}, out: {}, {} Hz",
                    d.index, d.name, d.input_channels, d.output_channels, d.default_sample_rate
                );
            }
        }
        return Ok(());
    }
    audio::device::log_devices(&descriptors);

    // 2. Initial capture stream. --device bypasses source classification;
    // otherwise try the configured source and fall back to the other one.
    let source = settings.source;
    let opened = match cli.device {
        Some(ref needle) => capture.open_matching(needle).map(|name| (source, name)),
        None => capture.open_source(source).map(|name| (source, name)).or_else(|first| {
            log::warn!("{first}; falling back to {}", source.other());
            capture
                .open_source(source.other())
                .map(|name| (source.other(), name))
        }),
    };
    let (source, device_name) = opened.context("failed to open an initial capture device")?;
    settings.source = source;
    log::info!("Capturing from '{device_name}' ({source})");

    // 3. Shared state and the analysis thread.
    let shared = Arc::new(SharedParams::new(
        settings.sensitivity,
        settings.palette,
        settings.window_height,
    ));
    let bar_data = Arc::new(Mutex::new(vec![0u32; cli.bars]));

    let analysis = {
        let queue = Arc::clone(&queue);
        let shared = Arc::clone(&shared);
        let bar_data = Arc::clone(&bar_data);
        let (chunk, num_bars, history) = (cli.chunk_size, cli.bars, cli.history);
        thread::Builder::new()
            .name("analysis".into())
            .spawn(move || analysis_loop(queue, shared, bar_data, chunk, num_bars, history))
            .context("failed to spawn analysis thread")?
    };

    // 4. Render loop. Blocks until quit or window close.
    let conf = Conf {
        window_title: format!("spectro v{}", env!("CARGO_PKG_VERSION")),
        window_width: settings.window_width as i32,
        window_height: settings.window_height as i32,
        window_resizable: true,
        ..Default::default()
    };
    let app = App {
        capture,
        shared: Arc::clone(&shared),
        bar_data,
        settings,
        config_path,
        source,
    };
    macroquad::Window::from_config(conf, run(app));

    // 5. Teardown: the stream was closed inside `run`; stop the analysis
    // loop and join it regardless of how the window exited.
    shared.shutdown();
    if analysis.join().is_err() {
        log::warn!("analysis thread panicked during shutdown");
    }
    log::info!("Shut down cleanly");
    Ok(())
}

/// Drains the frame queue: window + FFT + binning, then temporal smoothing,
/// publishing each result for the render loop. Polls without blocking so
/// shutdown stays prompt.
fn analysis_loop(
    queue: Arc<FrameQueue>,
    shared: Arc<SharedParams>,
    bar_data: Arc<Mutex<Vec<u32>>>,
    chunk_size: usize,
    num_bars: usize,
    history: usize,
) {
    let mut analyzer = SpectrumAnalyzer::new(chunk_size, num_bars);
    let mut smoother = BarSmoother::new(num_bars, history);
    let mut last_dropped = 0u64;

    while shared.running() {
        let Some(frame) = queue.try_pop() else {
            thread::sleep(Duration::from_millis(1));
            continue;
        };

        let heights = analyzer.analyze(&frame, shared.viewport_height(), shared.sensitivity());
        let smoothed = smoother.smooth(&heights);
        if let Ok(mut slot) = bar_data.lock() {
            *slot = smoothed;
        }

        let dropped = queue.dropped();
        if dropped != last_dropped {
            log::debug!(
                "analysis fell behind: {dropped} frames dropped so far (queue depth {})",
                queue.len()
            );
            last_dropped = dropped;
        }
    }
}

struct App {
    capture: CaptureManager,
    shared: Arc<SharedParams>,
    bar_data: Arc<Mutex<Vec<u32>>>,
    settings: Settings,
    config_path: Option<PathBuf>,
    source: AudioSource,
}

impl App {
    /// Write the current settings back to disk. Window size is only
    /// captured outside fullscreen so a temporary fullscreen stint does not
    /// clobber the stored geometry.
    fn persist(&mut self, fullscreen: bool) {
        if !fullscreen {
            self.settings.window_width = screen_width() as u32;
            self.settings.window_height = screen_height() as u32;
        }
        self.settings.sensitivity = self.shared.sensitivity();
        self.settings.palette = self.shared.palette_index();
        self.settings.source = self.source;

        let Some(path) = self.config_path.as_ref() else {
            return;
        };
        if let Err(e) = config::store(path, &self.settings) {
            log::warn!("failed to save settings to {}: {e}", path.display());
        }
    }
}

async fn run(mut app: App) {
    if app.settings.show_onboarding {
        if overlay::show_onboarding().await {
            app.settings.show_onboarding = false;
        }
        app.persist(false);
    }

    let mut fade = FadeTimer::new();
    let mut status: Option<String> = None;
    let mut fullscreen = false;
    let mut windowed_size = (screen_width(), screen_height());

    while app.shared.running() {
        if is_key_pressed(KeyCode::Q) || is_key_pressed(KeyCode::Escape) {
            app.persist(fullscreen);
            app.shared.shutdown();
            fade.reset();
        }
        if is_key_pressed(KeyCode::M) {
            switch_source(&mut app, &mut status, fullscreen);
            fade.reset();
        }
        if is_key_pressed(KeyCode::C) {
            let index = app.shared.cycle_palette(palette::PALETTES.len());
            log::info!("palette {index}");
            status = None;
            fade.reset();
            app.persist(fullscreen);
        }
        if is_key_pressed(KeyCode::F) {
            if fullscreen {
                set_fullscreen(false);
                request_new_screen_size(windowed_size.0, windowed_size.1);
            } else {
                windowed_size = (screen_width(), screen_height());
                set_fullscreen(true);
            }
            fullscreen = !fullscreen;
            fade.reset();
        }
        if is_key_pressed(KeyCode::Up) {
            app.shared.adjust_sensitivity(0.1);
            fade.reset();
            app.persist(fullscreen);
        }
        if is_key_pressed(KeyCode::Down) {
            app.shared.adjust_sensitivity(-0.1);
            fade.reset();
            app.persist(fullscreen);
        }
        if overlay::button_clicked() {
            overlay::open_project_page();
        }

        // The analyzer scales against whatever the window measures now.
        app.shared.set_viewport_height(screen_height() as u32);

        clear_background(BLACK);

        let heights = match app.bar_data.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => Vec::new(),
        };
        let stops = palette::PALETTES[app.shared.palette_index() % palette::PALETTES.len()];
        bars::draw(&heights, stops, screen_width(), screen_height());

        overlay::draw(&OverlayState {
            source: app.source,
            device_name: app.capture.current_device_name(),
            sensitivity: app.shared.sensitivity(),
            status: status.as_deref(),
            alpha: fade.alpha(),
            fullscreen,
        });

        next_frame().await;
    }

    // Stream teardown happens here, on the thread that owns it; main joins
    // the analysis thread afterwards.
    app.shared.shutdown();
    app.capture.close();
}

/// Toggle between microphone and loopback capture. A failed open leaves the
/// old stream closed, so on error we explicitly reopen the previous source
/// and surface both outcomes on the overlay.
fn switch_source(app: &mut App, status: &mut Option<String>, fullscreen: bool) {
    let target = app.source.other();
    match app.capture.open_source(target) {
        Ok(name) => {
            app.source = target;
            log::info!("switched to {target}: '{name}'");
            *status = None;
            app.persist(fullscreen);
        }
        Err(e) => {
            log::warn!("{e}");
            *status = Some(e.to_string());
            match app.capture.open_source(app.source) {
                Ok(name) => log::info!("kept {} on '{name}'", app.source),
                Err(restore) => {
                    log::error!("could not restore {} capture: {restore}", app.source);
                    *status = Some(format!("{e}; {restore}"));
                }
            }
        }
    }
}
