//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Default bounds for landscape sources when the caller gives none.
pub const LANDSCAPE_BOUNDS: (u32, u32) = (1280, 720);

/// Default bounds for portrait and square sources when the caller gives none.
pub const PORTRAIT_BOUNDS: (u32, u32) = (600, 900);

/// Calculate the target size that fits `max` while preserving aspect ratio.
///
/// A zero on either axis of `max` means "no bound given": the default is then
/// picked from the source orientation ([`LANDSCAPE_BOUNDS`] when
/// `width > height`, [`PORTRAIT_BOUNDS`] otherwise). The scale factor is the
/// smaller of the two axis ratios and never exceeds `1.0`, so images are
/// never enlarged.
///
/// # Arguments
/// * `original` - Source dimensions (width, height), both non-zero
/// * `max` - Bounding box (width, height); zero on either axis selects a default
///
/// # Examples
/// ```
/// # use pixbatch::imaging::calculate_target_size;
/// // Landscape with no bounds → 1280x720 default
/// assert_eq!(calculate_target_size((1920, 1080), (0, 0)), (1280, 720));
///
/// // Already smaller than the bounds → unchanged
/// assert_eq!(calculate_target_size((400, 300), (800, 600)), (400, 300));
/// ```
pub fn calculate_target_size(original: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (orig_w, orig_h) = original;

    let (max_w, max_h) = if max.0 == 0 || max.1 == 0 {
        if orig_w > orig_h {
            LANDSCAPE_BOUNDS
        } else {
            PORTRAIT_BOUNDS
        }
    } else {
        max
    };

    let width_ratio = max_w as f64 / orig_w as f64;
    let height_ratio = max_h as f64 / orig_h as f64;
    let scale = width_ratio.min(height_ratio).min(1.0);

    (
        (orig_w as f64 * scale).floor() as u32,
        (orig_h as f64 * scale).floor() as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Default bounds
    // =========================================================================

    #[test]
    fn landscape_defaults_to_1280x720() {
        assert_eq!(calculate_target_size((1920, 1080), (0, 0)), (1280, 720));
    }

    #[test]
    fn portrait_defaults_to_600x900() {
        // 1200x1800: width ratio 0.5, height ratio 0.5 → 600x900
        assert_eq!(calculate_target_size((1200, 1800), (0, 0)), (600, 900));
    }

    #[test]
    fn square_uses_portrait_defaults() {
        // 1000x1000 → min(0.6, 0.9) = 0.6
        assert_eq!(calculate_target_size((1000, 1000), (0, 0)), (600, 600));
    }

    #[test]
    fn single_zero_bound_selects_defaults() {
        assert_eq!(calculate_target_size((1920, 1080), (500, 0)), (1280, 720));
        assert_eq!(calculate_target_size((1920, 1080), (0, 500)), (1280, 720));
    }

    #[test]
    fn portrait_over_bound_on_one_axis_only() {
        // 500x1200: width fits 600, height exceeds 900 → scale 0.75
        let (w, h) = calculate_target_size((500, 1200), (0, 0));
        assert_eq!((w, h), (375, 900));
        assert!(w <= 500 && h <= 1200);
    }

    // =========================================================================
    // Explicit bounds
    // =========================================================================

    #[test]
    fn never_upscales() {
        assert_eq!(calculate_target_size((400, 300), (4000, 3000)), (400, 300));
    }

    #[test]
    fn binding_axis_is_the_smaller_ratio() {
        // 2000x1000 into 1000x1000: width ratio 0.5 binds
        assert_eq!(calculate_target_size((2000, 1000), (1000, 1000)), (1000, 500));
        // 1000x2000 into 1000x1000: height ratio 0.5 binds
        assert_eq!(calculate_target_size((1000, 2000), (1000, 1000)), (500, 1000));
    }

    #[test]
    fn dimensions_are_floored() {
        // 1000x333 into 100x100 → scale 0.1, height 33.3 → 33
        assert_eq!(calculate_target_size((1000, 333), (100, 100)), (100, 33));
        // 640x427 into 320x320 → scale 0.5, height 213.5 → 213
        assert_eq!(calculate_target_size((640, 427), (320, 320)), (320, 213));
    }

    #[test]
    fn result_respects_bounds_and_original_over_a_grid() {
        let originals = [(1, 1), (7, 3), (640, 480), (480, 640), (4000, 10), (3, 5000)];
        let bounds = [(1, 1), (100, 100), (1280, 720), (600, 900), (9999, 2)];

        for &orig in &originals {
            for &max in &bounds {
                let (w, h) = calculate_target_size(orig, max);
                assert!(w <= max.0 && h <= max.1, "{orig:?} in {max:?} → {w}x{h}");
                assert!(w <= orig.0 && h <= orig.1, "{orig:?} in {max:?} → {w}x{h}");
            }
        }
    }
}
