//! Input probe: prints what the decoder and gesture classifier see.
//!
//! Same key map as the simulator, but instead of a demo it logs every detent
//! delta and gesture with its timestamp. Useful for checking the hold
//! threshold and the encoder path by hand. `q` quits.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal;

use rotary_dial::config::{init_logging, RunConfig};
use rotary_dial::input::{
    handle_key_event, should_quit, Clock, DetentCounter, DialInput, EncoderSim,
    GestureClassifier, MonotonicClock, SharedEncoder, SimButton,
};
use rotary_dial::types::{GestureEvent, TICK_MS};

fn main() -> Result<()> {
    init_logging()?;
    let config = RunConfig::from_env();

    terminal::enable_raw_mode()?;
    let result = probe(&config);
    let _ = terminal::disable_raw_mode();
    result
}

fn probe(config: &RunConfig) -> Result<()> {
    let mut out = io::stdout();
    let threshold = config.long_press_for(config.demo);
    write!(
        out,
        "input probe: hold threshold {threshold} ms; arrows turn, space clicks, down holds, q quits\r\n"
    )?;
    out.flush()?;

    let clock = MonotonicClock::new();
    let encoder = Arc::new(SharedEncoder::at_rest());
    let edges = EncoderSim::spawn(Arc::clone(&encoder))?;
    let mut detents = DetentCounter::new(&encoder);
    let mut button = SimButton::new();
    let mut gesture = GestureClassifier::new(threshold);
    let mut was_held = false;

    let tick = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        let timeout = tick.checked_sub(last_tick.elapsed()).unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && should_quit(key) {
                    return Ok(());
                }
                let now = clock.now_ms();
                match handle_key_event(key) {
                    Some(DialInput::Turn(direction)) => {
                        // Bouncy edges exercise the debounce path.
                        edges.turn(direction, 1, true);
                    }
                    Some(DialInput::Click) if key.kind == KeyEventKind::Press => button.click(now),
                    Some(DialInput::Hold) => button.hold(now),
                    Some(DialInput::Release) => button.release(),
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() < tick {
            continue;
        }
        last_tick = Instant::now();
        let now = clock.now_ms();

        let delta = detents.take_delta(&encoder);
        if delta != 0 {
            let decoder = encoder.decoder();
            write!(
                out,
                "{now:>8} ms  detents {delta:+}  total {}  raw {}\r\n",
                decoder.detents(),
                decoder.raw_count()
            )?;
        }

        match gesture.poll(button.level(now), now) {
            GestureEvent::None => {}
            ev => write!(out, "{now:>8} ms  {ev:?}\r\n")?,
        }
        let held = gesture.is_button_held();
        if was_held && !held {
            write!(out, "{now:>8} ms  hold ended\r\n")?;
        }
        was_held = held;
        out.flush()?;
    }
}
