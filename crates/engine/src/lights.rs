//! LED strip demo.
//!
//! A short press cycles the parameter being edited, turning the dial edits it,
//! and a long press toggles the strip on or off (once per hold).

use rotary_dial_core::{SimpleRng, TickReport};

use crate::types::{GestureEvent, LED_STRIP_MAX_LEDS};
use crate::DialFrame;

const HUE_STEP: i32 = 5;
const LEVEL_STEP: i32 = 8;
const DEFAULT_COUNT: u8 = 10;

/// 8-bit RGB color of one LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Each channel divided by `n`
    pub fn dimmed(self, n: u8) -> Self {
        let n = n.max(1);
        Self::new(self.r / n, self.g / n, self.b / n)
    }
}

/// Integer HSV to RGB (hue 0-359, saturation and value 0-255), six regions
pub fn hsv_to_rgb(h: u16, s: u8, v: u8) -> Rgb {
    if s == 0 {
        return Rgb::new(v, v, v);
    }
    let h = (h % 360) as u32;
    let (s, v) = (s as u32, v as u32);
    let region = h / 60;
    let remainder = (h - region * 60) * 255 / 60;

    let p = ((v * (255 - s)) >> 8) as u8;
    let q = ((v * (255 - ((s * remainder) >> 8))) >> 8) as u8;
    let t = ((v * (255 - ((s * (255 - remainder)) >> 8))) >> 8) as u8;
    let v = v as u8;

    match region {
        0 => Rgb::new(v, t, p),
        1 => Rgb::new(q, v, p),
        2 => Rgb::new(p, v, t),
        3 => Rgb::new(p, q, v),
        4 => Rgb::new(t, p, v),
        _ => Rgb::new(v, p, q),
    }
}

/// Parameter currently edited by the dial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightsMode {
    Hue,
    Saturation,
    Brightness,
    Count,
    Effect,
}

impl LightsMode {
    pub fn next(self) -> Self {
        match self {
            LightsMode::Hue => LightsMode::Saturation,
            LightsMode::Saturation => LightsMode::Brightness,
            LightsMode::Brightness => LightsMode::Count,
            LightsMode::Count => LightsMode::Effect,
            LightsMode::Effect => LightsMode::Hue,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LightsMode::Hue => "Hue",
            LightsMode::Saturation => "Saturation",
            LightsMode::Brightness => "Brightness",
            LightsMode::Count => "LED Count",
            LightsMode::Effect => "Effect",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Solid,
    Rainbow,
    Breathing,
    Chase,
    Sparkle,
}

impl Effect {
    pub const ALL: [Effect; 5] = [
        Effect::Solid,
        Effect::Rainbow,
        Effect::Breathing,
        Effect::Chase,
        Effect::Sparkle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Step through the effect list by `delta`, wrapping both ways
    pub fn shifted(self, delta: i32) -> Self {
        let len = Self::ALL.len() as i32;
        let idx = (self.index() as i32 + delta.rem_euclid(len)).rem_euclid(len);
        Self::ALL[idx as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Effect::Solid => "Solid",
            Effect::Rainbow => "Rainbow",
            Effect::Breathing => "Breathing",
            Effect::Chase => "Chase",
            Effect::Sparkle => "Sparkle",
        }
    }
}

/// Strip settings plus the animation counter
#[derive(Debug, Clone)]
pub struct LightsApp {
    hue: u16,
    saturation: u8,
    brightness: u8,
    count: u8,
    effect: Effect,
    on: bool,
    mode: LightsMode,
    frame: u32,
    rng: SimpleRng,
}

impl LightsApp {
    pub fn new(seed: u32) -> Self {
        Self {
            hue: 0,
            saturation: 255,
            brightness: 128,
            count: DEFAULT_COUNT,
            effect: Effect::Solid,
            on: true,
            mode: LightsMode::Hue,
            frame: 0,
            rng: SimpleRng::new(seed),
        }
    }

    pub fn hue(&self) -> u16 {
        self.hue
    }

    pub fn saturation(&self) -> u8 {
        self.saturation
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn mode(&self) -> LightsMode {
        self.mode
    }

    /// Base color from the current settings
    pub fn color(&self) -> Rgb {
        hsv_to_rgb(self.hue, self.saturation, self.brightness)
    }

    /// Display text for the value of the current mode
    pub fn value_text(&self) -> String {
        match self.mode {
            LightsMode::Hue => format!("{}°", self.hue),
            LightsMode::Saturation => format!("{}%", self.saturation as u32 * 100 / 255),
            LightsMode::Brightness => format!("{}%", self.brightness as u32 * 100 / 255),
            LightsMode::Count => format!("{}", self.count),
            LightsMode::Effect => self.effect.name().to_string(),
        }
    }

    fn adjust(&mut self, delta: i32) {
        match self.mode {
            LightsMode::Hue => {
                self.hue = (self.hue as i32 + delta.saturating_mul(HUE_STEP)).rem_euclid(360) as u16;
            }
            LightsMode::Saturation => {
                self.saturation = step_level(self.saturation, delta);
            }
            LightsMode::Brightness => {
                self.brightness = step_level(self.brightness, delta);
            }
            LightsMode::Count => {
                let count = (self.count as i32).saturating_add(delta);
                self.count = count.clamp(1, LED_STRIP_MAX_LEDS as i32) as u8;
            }
            LightsMode::Effect => {
                self.effect = self.effect.shifted(delta);
            }
        }
    }

    pub fn update(&mut self, frame: &DialFrame) -> TickReport {
        let mut changed = false;
        match frame.gesture {
            GestureEvent::ShortPress => {
                self.mode = self.mode.next();
                changed = true;
            }
            GestureEvent::HoldStarted => {
                self.on = !self.on;
                log::debug!("strip {}", if self.on { "on" } else { "off" });
                changed = true;
            }
            GestureEvent::None => {}
        }
        if frame.detent_delta != 0 {
            self.adjust(frame.detent_delta);
            changed = true;
        }
        if changed {
            TickReport::redraw()
        } else {
            TickReport::default()
        }
    }

    /// Compute one animation frame for the whole strip.
    ///
    /// LEDs past `count`, and every LED while off, are black.
    pub fn render(&mut self, strip: &mut [Rgb; LED_STRIP_MAX_LEDS]) {
        if !self.on {
            strip.fill(Rgb::BLACK);
            return;
        }
        self.frame = self.frame.wrapping_add(1);

        let count = self.count as usize;
        let base = self.color();
        let breathing = {
            let phase = ((self.frame as f64) * 0.05).sin();
            let level = (self.brightness as f64 * (phase + 1.0) / 2.0) as u8;
            hsv_to_rgb(self.hue, self.saturation, level)
        };
        let chase_pos = (self.frame / 3) as usize % count.max(1);

        for (i, led) in strip.iter_mut().enumerate() {
            if i >= count {
                *led = Rgb::BLACK;
                continue;
            }
            *led = match self.effect {
                Effect::Solid => base,
                Effect::Rainbow => {
                    let offset = (i * 360 / count) as u32 + self.frame % 360;
                    let hue = (self.hue as u32 + offset) % 360;
                    hsv_to_rgb(hue as u16, self.saturation, self.brightness)
                }
                Effect::Breathing => breathing,
                Effect::Chase => {
                    if i == chase_pos {
                        base
                    } else {
                        base.dimmed(10)
                    }
                }
                Effect::Sparkle => {
                    if self.rng.one_in(20) {
                        base
                    } else {
                        base.dimmed(8)
                    }
                }
            };
        }
    }
}

fn step_level(value: u8, delta: i32) -> u8 {
    (value as i32)
        .saturating_add(delta.saturating_mul(LEVEL_STEP))
        .clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(app: &mut LightsApp, detents: i32) {
        app.update(&DialFrame {
            detent_delta: detents,
            ..DialFrame::default()
        });
    }

    fn press(app: &mut LightsApp, gesture: GestureEvent) {
        app.update(&DialFrame {
            gesture,
            ..DialFrame::default()
        });
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0, 255, 255), Rgb::new(255, 0, 0));
        assert_eq!(hsv_to_rgb(120, 255, 255), Rgb::new(0, 255, 0));
        assert_eq!(hsv_to_rgb(240, 255, 255), Rgb::new(0, 0, 255));
        assert_eq!(hsv_to_rgb(77, 0, 90), Rgb::new(90, 90, 90));
    }

    #[test]
    fn defaults() {
        let app = LightsApp::new(1);
        assert_eq!(app.hue(), 0);
        assert_eq!(app.saturation(), 255);
        assert_eq!(app.brightness(), 128);
        assert_eq!(app.count(), 10);
        assert_eq!(app.effect(), Effect::Solid);
        assert!(app.is_on());
        assert_eq!(app.mode(), LightsMode::Hue);
    }

    #[test]
    fn hue_wraps_both_ways() {
        let mut app = LightsApp::new(1);
        turn(&mut app, -1);
        assert_eq!(app.hue(), 355);
        turn(&mut app, 2);
        assert_eq!(app.hue(), 5);
        assert_eq!(app.value_text(), "5°");
    }

    #[test]
    fn levels_and_count_clamp() {
        let mut app = LightsApp::new(1);
        press(&mut app, GestureEvent::ShortPress);
        assert_eq!(app.mode(), LightsMode::Saturation);
        turn(&mut app, 3);
        assert_eq!(app.saturation(), 255);
        turn(&mut app, -40);
        assert_eq!(app.saturation(), 0);

        press(&mut app, GestureEvent::ShortPress);
        turn(&mut app, 1);
        assert_eq!(app.brightness(), 136);

        press(&mut app, GestureEvent::ShortPress);
        turn(&mut app, -50);
        assert_eq!(app.count(), 1);
        turn(&mut app, 100);
        assert_eq!(app.count(), 60);

        press(&mut app, GestureEvent::ShortPress);
        turn(&mut app, -1);
        assert_eq!(app.effect(), Effect::Sparkle);
        turn(&mut app, 7);
        assert_eq!(app.effect(), Effect::Rainbow);

        press(&mut app, GestureEvent::ShortPress);
        assert_eq!(app.mode(), LightsMode::Hue);
    }

    #[test]
    fn hold_toggles_power() {
        let mut app = LightsApp::new(1);
        press(&mut app, GestureEvent::HoldStarted);
        assert!(!app.is_on());
        let mut strip = [Rgb::new(1, 1, 1); LED_STRIP_MAX_LEDS];
        app.render(&mut strip);
        assert!(strip.iter().all(|&c| c == Rgb::BLACK));
        press(&mut app, GestureEvent::HoldStarted);
        assert!(app.is_on());
    }

    #[test]
    fn only_first_count_leds_light() {
        let mut app = LightsApp::new(1);
        let mut strip = [Rgb::BLACK; LED_STRIP_MAX_LEDS];
        app.render(&mut strip);
        assert!(strip[..10].iter().all(|&c| c == app.color()));
        assert!(strip[10..].iter().all(|&c| c == Rgb::BLACK));
    }

    #[test]
    fn chase_has_one_bright_led() {
        let mut app = LightsApp::new(1);
        for _ in 0..4 {
            press(&mut app, GestureEvent::ShortPress);
        }
        turn(&mut app, 3);
        assert_eq!(app.effect(), Effect::Chase);
        let mut strip = [Rgb::BLACK; LED_STRIP_MAX_LEDS];
        app.render(&mut strip);
        let bright = strip[..10].iter().filter(|&&c| c == app.color()).count();
        assert_eq!(bright, 1);
    }
}
