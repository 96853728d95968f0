/// One RGB gradient stop.
pub type Rgb = (u8, u8, u8);

/// Built-in palettes: a handful of solid colors followed by multi-stop
/// gradients. A bar is filled from `stops[0]` at its tip to the last stop
/// at its base.
pub const PALETTES: &[&[Rgb]] = &[
    &[(0, 0, 255)],
    &[(0, 255, 0)],
    &[(255, 0, 0)],
    &[(255, 255, 255)],
    &[(255, 192, 203)],
    &[(0, 0, 255), (0, 255, 255), (0, 255, 0), (255, 255, 0), (255, 0, 0)],
    &[
        (148, 0, 211),
        (75, 0, 130),
        (0, 0, 255),
        (0, 255, 0),
        (255, 255, 0),
        (255, 127, 0),
        (255, 0, 0),
    ],
    &[(255, 0, 255), (0, 255, 255), (255, 255, 0)],
    &[(255, 105, 180), (255, 20, 147), (255, 0, 255)],
    &[(0, 255, 255), (0, 191, 255), (0, 127, 255)],
    &[(255, 215, 0), (255, 165, 0), (255, 140, 0)],
    &[(50, 205, 50), (0, 255, 127), (0, 255, 0)],
    &[(255, 0, 0), (255, 69, 0), (255, 140, 0)],
    &[(147, 112, 219), (138, 43, 226), (148, 0, 211)],
    &[(255, 192, 203), (255, 182, 193), (255, 105, 180)],
    &[(135, 206, 235), (135, 206, 250), (0, 191, 255)],
    &[(255, 218, 185), (255, 228, 196), (255, 235, 205)],
    &[(0, 255, 255), (255, 0, 255), (255, 255, 0)],
    &[(255, 0, 0), (0, 255, 0), (0, 0, 255)],
    &[
        (255, 0, 0),
        (255, 69, 0),
        (255, 140, 0),
        (255, 165, 0),
        (255, 215, 0),
    ],
];

/// Sample the gradient at position `t` in `[0, 1]` (0 = bar tip, 1 = bar
/// base). Positions map onto the segment between two adjacent stops and
/// interpolate each channel linearly; segment boundaries return the stop
/// color exactly. A single-stop palette is constant.
pub fn color_at(stops: &[Rgb], t: f32) -> Rgb {
    match stops {
        [] => (0, 0, 0),
        [only] => *only,
        _ => {
            let t = t.clamp(0.0, 1.0);
            let segments = stops.len() - 1;
            let scaled = t * segments as f32;
            let index = (scaled as usize).min(segments - 1);
            let local = scaled - index as f32;
            lerp(stops[index], stops[index + 1], local)
        }
    }
}

fn lerp(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let channel = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    (channel(a.0, b.0), channel(a.1, b.1), channel(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_return_exact_stop_colors() {
        let stops: &[Rgb] = &[(10, 20, 30), (200, 100, 0)];
        assert_eq!(color_at(stops, 0.0), (10, 20, 30));
        assert_eq!(color_at(stops, 1.0), (200, 100, 0));
    }

    #[test]
    fn interior_stops_are_hit_exactly() {
        let stops: &[Rgb] = &[(0, 0, 0), (100, 100, 100), (255, 255, 255)];
        assert_eq!(color_at(stops, 0.5), (100, 100, 100));
    }

    #[test]
    fn single_stop_is_constant() {
        let stops: &[Rgb] = &[(1, 2, 3)];
        for t in [0.0, 0.25, 0.5, 1.0] {
            assert_eq!(color_at(stops, t), (1, 2, 3));
        }
    }

    #[test]
    fn midpoint_interpolates_per_channel() {
        let stops: &[Rgb] = &[(0, 100, 200), (100, 0, 200)];
        assert_eq!(color_at(stops, 0.5), (50, 50, 200));
    }

    #[test]
    fn out_of_range_positions_clamp() {
        let stops: &[Rgb] = &[(0, 0, 0), (255, 255, 255)];
        assert_eq!(color_at(stops, -1.0), (0, 0, 0));
        assert_eq!(color_at(stops, 2.0), (255, 255, 255));
    }

    #[test]
    fn every_builtin_palette_has_stops() {
        assert_eq!(PALETTES.len(), 20);
        assert!(PALETTES.iter().all(|p| !p.is_empty()));
    }
}
