//! Effective display colors for catalog labels.

use crate::models::BaseLabel;

/// Used when no level has a color and the palette is empty.
pub const DEFAULT_COLOR: &str = "ededed";

/// Resolve the color of a label from its taxonomy levels.
///
/// `levels` runs from most to least specific: a state value then its state, or a
/// flag alone. The first explicit color wins. Without one, a color is drawn from
/// `palette` using `rng`, which must yield values in `[0, 1)` and is seeded by the
/// caller so that repeated runs pick the same colors.
pub fn resolve_color<F>(palette: &[String], mut rng: F, levels: &[&BaseLabel]) -> String
where
    F: FnMut() -> f64,
{
    if let Some(color) = levels.iter().find_map(|level| level.explicit_color()) {
        return color.to_string();
    }

    match palette.len() {
        0 => DEFAULT_COLOR.to_string(),
        1 => palette[0].clone(),
        len => {
            let draw = rng().clamp(0.0, 1.0);
            let index = ((draw * len as f64).floor() as usize).min(len - 1);
            palette[index].clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette(colors: &[&str]) -> Vec<String> {
        colors.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_draw_indexes_palette() {
        let colors = palette(&["a", "b", "c", "d"]);
        let flag = BaseLabel::new("flag");

        assert_eq!(resolve_color(&colors, || 0.0, &[&flag]), "a");
        assert_eq!(resolve_color(&colors, || 0.5, &[&flag]), "c");
        assert_eq!(resolve_color(&colors, || 0.99, &[&flag]), "d");
    }

    #[test]
    fn test_out_of_range_draw_is_clamped() {
        let colors = palette(&["a", "b"]);
        let flag = BaseLabel::new("flag");
        assert_eq!(resolve_color(&colors, || 1.0, &[&flag]), "b");
    }

    #[test]
    fn test_explicit_color_skips_rng() {
        let colors = palette(&["a", "b"]);
        let mut flag = BaseLabel::new("flag");
        flag.color = Some("ff0000".to_string());

        let mut draws = 0;
        let color = resolve_color(
            &colors,
            || {
                draws += 1;
                0.0
            },
            &[&flag],
        );

        assert_eq!(color, "ff0000");
        assert_eq!(draws, 0);
    }

    #[test]
    fn test_empty_palette_uses_default() {
        let flag = BaseLabel::new("flag");
        assert_eq!(resolve_color(&[], || 0.3, &[&flag]), DEFAULT_COLOR);
    }
}
