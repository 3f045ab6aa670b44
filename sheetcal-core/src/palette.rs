//! Evenly spaced event colors.

/// CSS color for the `index`-th of `count` events: hues spread evenly around
/// the wheel at fixed saturation and lightness.
pub fn hsl_color(index: usize, count: usize) -> String {
    let count = count.max(1);
    let hue = (360.0 / count as f64 * (index % count) as f64).floor();
    format!("hsl({hue}deg, 70%, 40%)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsl_color_wraps_around() {
        assert_eq!(hsl_color(0, 3), "hsl(0deg, 70%, 40%)");
        assert_eq!(hsl_color(1, 3), "hsl(120deg, 70%, 40%)");
        assert_eq!(hsl_color(4, 3), "hsl(120deg, 70%, 40%)");
        assert_eq!(hsl_color(5, 0), "hsl(0deg, 70%, 40%)");
    }
}
