//! Magnification curve
//!
//! Zoom falls off as a parabola of the distance between the pointer and an
//! item's resting center, reaching 1 at `zoom_size`.

/// Reach of the magnification effect per unit of icon size and zoom
pub const ZOOM_REACH_FACTOR: f32 = 2.0;

/// Offsets closer than this to full reach snap to it
const SNAP_PERCENT: f32 = 0.99;

/// Reach of the effect in pixels
pub fn zoom_size(icon_size: f32, zoom_percent: f32) -> f32 {
    icon_size * zoom_percent.max(1.0) * ZOOM_REACH_FACTOR
}

/// Clamped distance and its fraction of `zoom_size`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomOffset {
    pub offset: f32,
    pub percent: f32,
}

/// Offset of the pointer from an item's resting center
///
/// With `external_gap` the effective offset is widened so the neighbours of
/// the pointer part and leave room for a drop preview.
pub fn offset(distance: f32, zoom_size: f32, icon_size: f32, zoom_in_percent: f32, external_gap: bool) -> ZoomOffset {
    if zoom_size <= 0.0 {
        return ZoomOffset {
            offset: 0.0,
            percent: 1.0,
        };
    }

    let mut offset = distance.abs().min(zoom_size);
    let mut percent = if external_gap {
        offset += offset * zoom_size / icon_size.max(1.0);
        let zoomed_icon = icon_size * zoom_in_percent;
        offset / (zoom_size + zoomed_icon)
    } else {
        offset / zoom_size
    };

    percent = percent.clamp(0.0, 1.0);
    if percent > SNAP_PERCENT {
        percent = 1.0;
    }
    ZoomOffset { offset, percent }
}

/// Zoom for an offset fraction: `1 + (1 - p²)(zoom_in - 1)`
pub fn magnification(offset_percent: f32, zoom_in_percent: f32) -> f32 {
    let curve = 1.0 - offset_percent * offset_percent;
    1.0 + curve * (zoom_in_percent - 1.0)
}

/// How far an item moves away from the pointer to make room
pub fn displacement(offset: ZoomOffset, zoom_in_percent: f32) -> f32 {
    offset.offset * (zoom_in_percent - 1.0) * (1.0 - offset.percent / 3.0)
}

/// Zoom-in ramp: 1 → `zoom_percent` while hovering, back to 1 after leaving
pub fn zoom_in_percent(zoom_percent: f32, hovering: bool, progress: f32) -> f32 {
    let span = zoom_percent.max(1.0) - 1.0;
    let t = if hovering { progress } else { 1.0 - progress };
    1.0 + span * t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_at_center() {
        let z = offset(0.0, 192.0, 48.0, 2.0, false);
        assert_eq!(z.percent, 0.0);
        assert_eq!(magnification(z.percent, 2.0), 2.0);
    }

    #[test]
    fn test_flat_beyond_reach() {
        for distance in [192.0, 250.0, 10_000.0] {
            let z = offset(distance, 192.0, 48.0, 2.0, false);
            assert_eq!(z.percent, 1.0);
            assert_eq!(magnification(z.percent, 2.0), 1.0);
        }
    }

    #[test]
    fn test_snaps_near_full_reach() {
        let z = offset(191.0, 192.0, 48.0, 2.0, false);
        assert_eq!(z.percent, 1.0);
    }

    #[test]
    fn test_non_increasing_in_distance() {
        let mut last = f32::INFINITY;
        for step in 0..=300 {
            let z = offset(step as f32, 192.0, 48.0, 2.5, false);
            let zoom = magnification(z.percent, 2.5);
            assert!(zoom <= last + 1e-6, "zoom rose at distance {step}");
            assert!(zoom >= 1.0);
            last = zoom;
        }
    }

    #[test]
    fn test_external_gap_weakens_zoom() {
        let plain = offset(40.0, 192.0, 48.0, 2.0, false);
        let gap = offset(40.0, 192.0, 48.0, 2.0, true);
        assert!(gap.offset > plain.offset);
        assert!(magnification(gap.percent, 2.0) <= magnification(plain.percent, 2.0));
    }

    #[test]
    fn test_no_displacement_without_zoom() {
        let z = offset(50.0, 192.0, 48.0, 1.0, false);
        assert_eq!(displacement(z, 1.0), 0.0);
    }

    #[test]
    fn test_ramp() {
        assert_eq!(zoom_in_percent(2.0, true, 0.0), 1.0);
        assert_eq!(zoom_in_percent(2.0, true, 1.0), 2.0);
        assert_eq!(zoom_in_percent(2.0, false, 1.0), 1.0);
        assert_eq!(zoom_in_percent(2.0, false, 0.25), 1.75);
    }
}
