use macroquad::prelude::*;

use super::palette::{color_at, Rgb};

pub const BAR_SPACING: f32 = 2.0;

/// Horizontal placement of the bar row: fixed per-bar width with fixed
/// spacing, centered in the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    pub bar_width: f32,
    pub start_x: f32,
}

pub fn layout(viewport_width: f32, num_bars: usize) -> Layout {
    let n = num_bars.max(1) as f32;
    let bar_width = ((viewport_width - (n - 1.0) * BAR_SPACING) / n).floor().max(1.0);
    let total = n * bar_width + (n - 1.0) * BAR_SPACING;
    Layout {
        bar_width,
        start_x: ((viewport_width - total) / 2.0).max(0.0),
    }
}

/// Draw the smoothed bars, each filled with the palette gradient along its
/// own height: tip rows sample the gradient at 0, the base row at 1.
pub fn draw(heights: &[u32], stops: &[Rgb], viewport_width: f32, viewport_height: f32) {
    let lay = layout(viewport_width, heights.len());

    for (i, &height) in heights.iter().enumerate() {
        if height == 0 {
            continue;
        }
        let x = lay.start_x + i as f32 * (lay.bar_width + BAR_SPACING);
        let top = viewport_height - height as f32;

        for row in 0..height {
            let t = if height > 1 {
                row as f32 / (height - 1) as f32
            } else {
                1.0
            };
            let (r, g, b) = color_at(stops, t);
            draw_rectangle(
                x,
                top + row as f32,
                lay.bar_width,
                1.0,
                Color::from_rgba(r, g, b, 255),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_centered_and_fits() {
        let lay = layout(800.0, 64);
        let total = 64.0 * lay.bar_width + 63.0 * BAR_SPACING;
        assert!(total <= 800.0);
        assert!((lay.start_x - (800.0 - total) / 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn narrow_viewport_keeps_minimum_bar_width() {
        let lay = layout(40.0, 64);
        assert_eq!(lay.bar_width, 1.0);
        assert_eq!(lay.start_x, 0.0);
    }

    #[test]
    fn single_bar_spans_full_width() {
        let lay = layout(300.0, 1);
        assert_eq!(lay.bar_width, 300.0);
        assert_eq!(lay.start_x, 0.0);
    }
}
