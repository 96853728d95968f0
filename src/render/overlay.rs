use macroquad::prelude::*;
use std::time::{Duration, Instant};

use crate::state::AudioSource;

/// How long the status text stays fully opaque after a command, and how
/// long the linear fade to transparent takes afterwards.
const HOLD: Duration = Duration::from_secs(5);
const FADE: Duration = Duration::from_secs(2);

const BUTTON_WIDTH: f32 = 140.0;
const BUTTON_HEIGHT: f32 = 30.0;
const MARGIN: f32 = 10.0;

pub const PROJECT_URL: &str = "https://github.com/spectro-app/spectro";

/// Tracks the opacity of the transient status overlay. Every control
/// command calls [`reset`](Self::reset), making the text reappear.
pub struct FadeTimer {
    last_command: Instant,
}

impl FadeTimer {
    pub fn new() -> Self {
        Self {
            last_command: Instant::now(),
        }
    }

    pub fn reset(&mut self) {
        self.last_command = Instant::now();
    }

    pub fn alpha(&self) -> f32 {
        fade_alpha(self.last_command.elapsed())
    }
}

fn fade_alpha(elapsed: Duration) -> f32 {
    if elapsed <= HOLD {
        return 1.0;
    }
    let fading = elapsed - HOLD;
    if fading >= FADE {
        0.0
    } else {
        1.0 - fading.as_secs_f32() / FADE.as_secs_f32()
    }
}

/// Everything the status overlay displays for one frame.
pub struct OverlayState<'a> {
    pub source: AudioSource,
    pub device_name: Option<&'a str>,
    pub sensitivity: f32,
    pub status: Option<&'a str>,
    pub alpha: f32,
    pub fullscreen: bool,
}

pub fn draw(state: &OverlayState<'_>) {
    if state.fullscreen {
        return;
    }

    if state.alpha > 0.0 {
        let white = Color::new(1.0, 1.0, 1.0, state.alpha);
        let version = concat!("spectro v", env!("CARGO_PKG_VERSION"));
        draw_text(version, MARGIN, 24.0, 20.0, white);

        let source_line = match state.device_name {
            Some(name) => format!("Source: {} ({})", state.source, name),
            None => format!("Source: {} (no stream)", state.source),
        };
        draw_text(&source_line, MARGIN, 52.0, 24.0, white);
        draw_text(
            &format!("Sensitivity: {:.1}", state.sensitivity),
            MARGIN,
            80.0,
            24.0,
            white,
        );

        if let Some(status) = state.status {
            draw_text(status, MARGIN, 108.0, 24.0, Color::new(1.0, 0.8, 0.4, state.alpha));
        }

        draw_text(
            "M: switch source | C: palette | F: fullscreen | Up/Down: sensitivity | Q: quit",
            MARGIN,
            screen_height() - 16.0,
            20.0,
            white,
        );
    }

    draw_button();
}

pub fn button_rect(viewport_width: f32) -> Rect {
    Rect::new(
        viewport_width - BUTTON_WIDTH - MARGIN,
        MARGIN,
        BUTTON_WIDTH,
        BUTTON_HEIGHT,
    )
}

fn draw_button() {
    let rect = button_rect(screen_width());
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, Color::from_rgba(50, 50, 50, 255));
    let label = "Project page";
    let dims = measure_text(label, None, 20, 1.0);
    draw_text(
        label,
        rect.x + (rect.w - dims.width) / 2.0,
        rect.y + (rect.h + dims.height) / 2.0,
        20.0,
        WHITE,
    );
}

/// True when the link button was clicked this frame.
pub fn button_clicked() -> bool {
    if !is_mouse_button_pressed(MouseButton::Left) {
        return false;
    }
    let (mx, my) = mouse_position();
    button_rect(screen_width()).contains(vec2(mx, my))
}

/// Hand the project URL to the platform's URL opener. UI-triggered only,
/// never on the capture or analysis threads.
pub fn open_project_page() {
    #[cfg(target_os = "linux")]
    let result = std::process::Command::new("xdg-open").arg(PROJECT_URL).spawn();
    #[cfg(target_os = "macos")]
    let result = std::process::Command::new("open").arg(PROJECT_URL).spawn();
    #[cfg(target_os = "windows")]
    let result = std::process::Command::new("cmd")
        .args(["/C", "start", PROJECT_URL])
        .spawn();

    match result {
        Ok(_) => log::info!("opened {PROJECT_URL}"),
        Err(e) => log::warn!("failed to open {PROJECT_URL}: {e}"),
    }
}

/// One-time key-reference screen shown on first start. Returns `true` when
/// the user ticked "don't show again" before dismissing it.
pub async fn show_onboarding() -> bool {
    const LINES: &[&str] = &[
        "M - switch audio source (microphone / speaker loopback)",
        "C - next color palette",
        "F - toggle fullscreen",
        "Up / Down - adjust sensitivity",
        "Q or Esc - quit",
    ];

    let mut checked = false;
    loop {
        clear_background(Color::from_rgba(15, 15, 35, 255));

        let w = screen_width();
        let h = screen_height();

        let title = "spectro - keyboard reference";
        let dims = measure_text(title, None, 36, 1.0);
        draw_text(title, (w - dims.width) / 2.0, h * 0.2, 36.0, WHITE);

        for (i, line) in LINES.iter().enumerate() {
            let dims = measure_text(line, None, 24, 1.0);
            draw_text(
                line,
                (w - dims.width) / 2.0,
                h * 0.32 + i as f32 * 34.0,
                24.0,
                Color::from_rgba(200, 220, 255, 255),
            );
        }

        let box_size = 24.0;
        let label = "Don't show this again";
        let label_dims = measure_text(label, None, 22, 1.0);
        let ok_w = 120.0;
        let ok_h = 40.0;
        let row_w = box_size + 12.0 + label_dims.width + 40.0 + ok_w;
        let row_x = (w - row_w) / 2.0;
        let row_y = h * 0.8;

        let checkbox = Rect::new(row_x, row_y, box_size, box_size);
        draw_rectangle(checkbox.x, checkbox.y, checkbox.w, checkbox.h, WHITE);
        if checked {
            draw_line(
                checkbox.x + 5.0,
                checkbox.y + 12.0,
                checkbox.x + 10.0,
                checkbox.y + 19.0,
                3.0,
                GREEN,
            );
            draw_line(
                checkbox.x + 10.0,
                checkbox.y + 19.0,
                checkbox.x + 19.0,
                checkbox.y + 5.0,
                3.0,
                GREEN,
            );
        }
        draw_text(
            label,
            checkbox.x + box_size + 12.0,
            row_y + box_size - 6.0,
            22.0,
            WHITE,
        );

        let ok = Rect::new(row_x + row_w - ok_w, row_y - (ok_h - box_size) / 2.0, ok_w, ok_h);
        draw_rectangle(ok.x, ok.y, ok.w, ok.h, Color::from_rgba(60, 180, 90, 255));
        let ok_dims = measure_text("OK", None, 28, 1.0);
        draw_text(
            "OK",
            ok.x + (ok.w - ok_dims.width) / 2.0,
            ok.y + (ok.h + ok_dims.height) / 2.0,
            28.0,
            WHITE,
        );

        if is_mouse_button_pressed(MouseButton::Left) {
            let (mx, my) = mouse_position();
            let click = vec2(mx, my);
            if checkbox.contains(click) {
                checked = !checked;
            } else if ok.contains(click) {
                return checked;
            }
        }
        if is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::Escape) {
            return checked;
        }

        next_frame().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_during_hold_period() {
        assert_eq!(fade_alpha(Duration::ZERO), 1.0);
        assert_eq!(fade_alpha(Duration::from_secs(5)), 1.0);
    }

    #[test]
    fn fades_linearly_then_disappears() {
        let mid = fade_alpha(Duration::from_secs(6));
        assert!((mid - 0.5).abs() < 1e-3);
        assert_eq!(fade_alpha(Duration::from_secs(7)), 0.0);
        assert_eq!(fade_alpha(Duration::from_secs(60)), 0.0);
    }

    #[test]
    fn button_sits_in_the_top_right_corner() {
        let rect = button_rect(800.0);
        assert_eq!(rect.x, 800.0 - 140.0 - 10.0);
        assert_eq!(rect.y, 10.0);
    }
}
