//! Rotary dial simulator (default binary).
//!
//! Runs the dial firmware loop on a desktop: the keyboard stands in for the
//! encoder and push button, the terminal for the round display, and the
//! optional TCP adapter for remote observers and controllers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};

use rotary_dial::adapter::{Adapter, ClientCommand, InboundCommand};
use rotary_dial::config::{init_logging, RunConfig};
use rotary_dial::core::{GameSnapshot, TickReport};
use rotary_dial::engine::{Demo, DialFrame, Rgb as LedRgb};
use rotary_dial::input::{
    handle_key_event, should_quit, Clock, DetentCounter, DialInput, EncoderSim,
    GestureClassifier, MonotonicClock, SharedEncoder, SimButton,
};
use rotary_dial::term::{AdapterStatusView, DialView, FrameBuffer, Screen, TerminalRenderer, Viewport};
use rotary_dial::types::{GameEvent, Millis, LED_STRIP_MAX_LEDS};

fn main() -> Result<()> {
    init_logging()?;
    let config = RunConfig::from_env();

    let mut adapter = match Adapter::start_from_env() {
        Ok(adapter) => adapter,
        Err(e) => {
            log::warn!("adapter unavailable: {e:#}");
            None
        }
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &config, adapter.as_mut());

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// Simulated hardware plus the per-demo input state.
struct Dial {
    encoder: Arc<SharedEncoder>,
    edges: EncoderSim,
    detents: DetentCounter,
    button: SimButton,
    gesture: GestureClassifier,
}

impl Dial {
    fn new(long_press_ms: u32) -> Result<Self> {
        let encoder = Arc::new(SharedEncoder::at_rest());
        let edges = EncoderSim::spawn(Arc::clone(&encoder)).context("spawn encoder thread")?;
        let detents = DetentCounter::new(&encoder);
        Ok(Self {
            encoder,
            edges,
            detents,
            button: SimButton::new(),
            gesture: GestureClassifier::new(long_press_ms),
        })
    }

    /// Sample the button and the encoder once for this tick
    fn frame(&mut self, now: Millis) -> DialFrame {
        let gesture = self.gesture.poll(self.button.level(now), now);
        DialFrame {
            now_ms: now,
            detent_delta: self.detents.take_delta(&self.encoder),
            gesture,
            held: self.gesture.is_button_held(),
        }
    }

    /// Forget input in flight when the demo changes
    fn reset(&mut self, long_press_ms: u32) {
        self.button.release();
        self.gesture = GestureClassifier::new(long_press_ms);
        self.detents.rebaseline(&self.encoder);
    }
}

fn run(term: &mut TerminalRenderer, config: &RunConfig, mut adapter: Option<&mut Adapter>) -> Result<()> {
    let clock = MonotonicClock::new();
    let mut demo = Demo::new(config.demo, config.seed, clock.now_ms());
    let mut dial = Dial::new(config.long_press_for(demo.kind()))?;
    log::info!("starting {} (seed {})", demo.kind().as_str(), config.seed);
    if let Some(a) = adapter.as_deref() {
        a.set_demo(demo.kind().as_str());
    }

    let view = DialView::new();
    let mut fb = FrameBuffer::new(0, 0);
    let mut snapshot = GameSnapshot::default();
    let mut strip = [LedRgb::BLACK; LED_STRIP_MAX_LEDS];
    let mut dirty = true;
    let mut last_tick = Instant::now();

    loop {
        if dirty {
            let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
            let screen = match &demo {
                Demo::Tetris(app) => {
                    app.snapshot_into(&mut snapshot);
                    Screen::Tetris(&snapshot)
                }
                Demo::Counter(app) => Screen::Counter { value: app.value() },
                Demo::Lights(app) => Screen::Lights { app, strip: &strip },
            };
            let status = adapter.as_deref().map(|a| AdapterStatusView {
                port: a.port(),
                client_count: a.client_count(),
                streaming_count: a.streaming_count(),
            });
            view.render_into(screen, status.as_ref(), Viewport::new(w, h), &mut fb);
            term.draw_swap(&mut fb)?;
            dirty = false;
        }

        // Input with timeout until next tick.
        let tick = Duration::from_millis(demo.tick_ms() as u64);
        let timeout = tick.checked_sub(last_tick.elapsed()).unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press && should_quit(key) {
                        return Ok(());
                    }
                    let now = clock.now_ms();
                    match handle_key_event(key) {
                        Some(DialInput::Turn(direction)) => {
                            dial.edges.turn(direction, 1, false);
                        }
                        Some(DialInput::Click) if key.kind == KeyEventKind::Press => {
                            dial.button.click(now);
                        }
                        Some(DialInput::Hold) if term.key_release_events() => {
                            dial.button.latch();
                        }
                        Some(DialInput::Hold) => dial.button.hold(now),
                        Some(DialInput::Release) => dial.button.release(),
                        Some(DialInput::SwitchDemo) if key.kind == KeyEventKind::Press => {
                            let kind = demo.kind().next();
                            demo = Demo::new(kind, config.seed, now);
                            dial.reset(config.long_press_for(kind));
                            log::info!("switched to {}", kind.as_str());
                            if let Some(a) = adapter.as_deref() {
                                a.set_demo(kind.as_str());
                            }
                            dirty = true;
                        }
                        _ => {}
                    }
                }
                Event::Resize(_, _) => {
                    term.invalidate();
                    dirty = true;
                }
                _ => {}
            }
        }

        if last_tick.elapsed() < tick {
            continue;
        }
        last_tick = Instant::now();
        let now = clock.now_ms();

        let frame = dial.frame(now);
        let mut report = demo.update(&frame);
        if let Demo::Lights(app) = &mut demo {
            app.render(&mut strip);
            report.redraw = true;
        }

        if let Some(a) = adapter.as_deref_mut() {
            while let Some(cmd) = a.try_recv() {
                let applied = apply_remote(&cmd, &mut dial, &mut demo, now, &mut report);
                a.ack(&cmd, applied);
            }
            publish(a, &demo, &report, &mut snapshot);
        }

        dirty |= report.redraw;
    }
}

/// Apply one adapter command; returns whether it had an effect
fn apply_remote(
    cmd: &InboundCommand,
    dial: &mut Dial,
    demo: &mut Demo,
    now: Millis,
    report: &mut TickReport,
) -> bool {
    match cmd.command {
        ClientCommand::Turn(n) => dial.edges.turn_by(n, false),
        ClientCommand::Click => {
            dial.button.click(now);
            true
        }
        ClientCommand::Hold => {
            dial.button.latch();
            true
        }
        ClientCommand::Release => {
            dial.button.release();
            true
        }
        ClientCommand::Restart => {
            let restarted = demo.restart(now);
            if restarted {
                report.push(GameEvent::Restarted);
            }
            restarted
        }
    }
}

fn publish(adapter: &mut Adapter, demo: &Demo, report: &TickReport, snapshot: &mut GameSnapshot) {
    if let Demo::Tetris(app) = demo {
        adapter.publish_events(&report.events);
        if report.redraw {
            app.snapshot_into(snapshot);
            adapter.publish_observation(snapshot);
        }
    }
}
