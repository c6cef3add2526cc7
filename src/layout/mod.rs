//! Layout and zoom engine
//!
//! [`compute`] turns the ordered item list, the pointer and the dock
//! preferences into one [`DrawValue`] per item. All math runs in the
//! canonical frame of [`transform`]; results are mapped back to screen
//! coordinates at the end.

pub mod effects;
pub mod transform;
pub mod zoom;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::items::ItemId;

pub use effects::ItemEffects;
pub use transform::{DockEdge, ItemAlignment};

/// Time for the zoom to ramp in after the pointer enters (and out after it leaves)
pub const ZOOM_IN_DURATION: Duration = Duration::from_millis(200);
/// Time for the dock to slide fully hidden or visible
pub const HIDE_DURATION: Duration = Duration::from_millis(250);

/// Gap between items as a fraction of the icon size
pub const GAP_FACTOR: f32 = 0.25;
/// Width of non-square items (separators) as a fraction of the icon size
pub const SEPARATOR_FACTOR: f32 = 0.25;
/// Depth of the reveal strip left at the edge while hidden
pub const REVEAL_STRIP: f32 = 2.0;

/// Gap between neighbouring items
pub fn item_gap(icon_size: f32) -> f32 {
    (icon_size * GAP_FACTOR).round().max(2.0)
}

/// Geometry of one item for one frame (screen coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawValue {
    /// Where the icon is drawn
    pub center: Point,
    /// Where the icon would be without zoom
    pub static_center: Point,
    /// Zoomed box inflated by the hit margin
    pub hover_area: Rect,
    /// Zoomed icon box
    pub bounds: Rect,
    /// Magnification, ≥ 1
    pub zoom: f32,
    pub effects: ItemEffects,
}

/// Inputs to one layout pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub screen: Rect,
    pub edge: DockEdge,
    pub icon_size: f32,
    pub zoom_percent: f32,
    /// Ramped magnification, between 1 and `zoom_percent`
    pub zoom_in_percent: f32,
    pub panel_mode: bool,
    pub alignment: ItemAlignment,
    pub offset: i32,
    /// 0 = fully visible, 1 = fully hidden
    pub hide_progress: f32,
    pub hidden: bool,
    /// Pointer in screen coordinates
    pub cursor: Option<Point>,
    /// An external drag hovers a provider that accepts drops
    pub external_gap: bool,
}

/// Per-item input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutItem {
    pub id: ItemId,
    pub square: bool,
    pub zoomable: bool,
    pub separator: bool,
    /// Remaining slide toward the previous slot, in slots
    pub slide: f32,
    pub effects: ItemEffects,
}

/// Output of one layout pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    /// Draw values in dock order
    pub values: Vec<(ItemId, DrawValue)>,
    /// Item whose hover area contains the pointer
    pub hovered: Option<ItemId>,
    /// Area the pointer must be in for the dock to count as hovered
    pub footprint: Rect,
    /// Visible dock area at rest (no zoom, no hide offset)
    pub static_footprint: Rect,
    /// Background as drawn this frame
    pub background: Rect,
}

/// Lay the items out for one frame
pub fn compute(params: &LayoutParams, items: &[LayoutItem]) -> LayoutResult {
    let edge = params.edge;
    let screen = &params.screen;
    let icon = params.icon_size.max(1.0);
    let gap = item_gap(icon);
    let pad = gap / 2.0;
    let depth = icon + gap;
    let main = edge.main_length(screen);

    let widths: Vec<f32> = items
        .iter()
        .map(|item| if item.square { icon } else { icon * SEPARATOR_FACTOR })
        .collect();
    let content = widths.iter().sum::<f32>() + gap * items.len().saturating_sub(1) as f32;
    let offset = params.offset as f32;

    let (rest, items_start) = if params.panel_mode {
        let start = match params.alignment {
            ItemAlignment::Start => gap + offset,
            ItemAlignment::Center => (main - content) / 2.0 + offset,
            ItemAlignment::End => main - gap - content - offset,
        };
        (Rect::new(0.0, 0.0, main, depth), start)
    } else {
        let length = content + 2.0 * gap;
        let x = (main - length) / 2.0 * (1.0 + offset / 100.0);
        (Rect::new(x, 0.0, length, depth), x + gap)
    };

    let hide_shift = params.hide_progress.clamp(0.0, 1.0) * depth;
    let cursor = params.cursor.map(|p| edge.to_canonical(screen, p));
    let zoom_in = params.zoom_in_percent.max(1.0);
    let reach = zoom::zoom_size(icon, params.zoom_percent);

    let mut values = Vec::with_capacity(items.len());
    let mut rest_extent = rest;
    let mut drawn_extent = Rect::new(rest.x, -hide_shift, rest.width, rest.height);
    let mut x = items_start;

    for (item, &width) in items.iter().zip(&widths) {
        let static_x = x + width / 2.0;
        x += width + gap;

        let (zoom, mut cx) = match cursor {
            Some(c) if item.zoomable && zoom_in > 1.0 => {
                let off = zoom::offset(c.x - static_x, reach, icon, zoom_in, params.external_gap);
                let push = zoom::displacement(off, zoom_in);
                let cx = if c.x > static_x { static_x - push } else { static_x + push };
                (zoom::magnification(off.percent, zoom_in), cx)
            }
            _ => (1.0, static_x),
        };
        cx += item.slide * (width + gap);

        let size = icon * zoom;
        let zoomed_width = width * zoom;
        let rest_y = pad + size / 2.0 + item.effects.lift;
        let center = Point::new(cx, rest_y - hide_shift);
        let bounds = Rect::from_center(center, zoomed_width, size);
        let hover = Rect::new(
            cx - zoomed_width / 2.0 - gap / 2.0,
            -hide_shift,
            zoomed_width + gap,
            pad + size + gap / 2.0,
        );

        rest_extent = rest_extent.union(&Rect::new(bounds.x, 0.0, bounds.width, pad + size));
        drawn_extent = drawn_extent.union(&bounds);

        values.push((
            item.id,
            DrawValue {
                center: edge.to_screen(screen, center),
                static_center: edge.to_screen(screen, Point::new(static_x, pad + icon / 2.0)),
                hover_area: edge.rect_to_screen(screen, &hover),
                bounds: edge.rect_to_screen(screen, &bounds),
                zoom,
                effects: item.effects,
            },
        ));
    }

    let hovered = match params.cursor {
        Some(pointer) if !params.hidden => items
            .iter()
            .zip(&values)
            .filter(|(item, (_, value))| !item.separator && value.hover_area.contains_point(pointer))
            .min_by(|(_, (_, a)), (_, (_, b))| {
                a.center.distance(pointer).total_cmp(&b.center.distance(pointer))
            })
            .map(|(item, _)| item.id),
        _ => None,
    };

    let footprint = if params.hidden {
        Rect::new(rest.x, 0.0, rest.width, REVEAL_STRIP)
    } else {
        rest_extent
    };

    LayoutResult {
        values,
        hovered,
        footprint: edge.rect_to_screen(screen, &footprint),
        static_footprint: edge.rect_to_screen(screen, &rest),
        background: edge.rect_to_screen(screen, &drawn_extent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect::new(0.0, 0.0, 1000.0, 800.0);

    fn params() -> LayoutParams {
        LayoutParams {
            screen: SCREEN,
            edge: DockEdge::Bottom,
            icon_size: 48.0,
            zoom_percent: 2.0,
            zoom_in_percent: 2.0,
            panel_mode: false,
            alignment: ItemAlignment::Center,
            offset: 0,
            hide_progress: 0.0,
            hidden: false,
            cursor: None,
            external_gap: false,
        }
    }

    fn items(n: u64) -> Vec<LayoutItem> {
        (0..n)
            .map(|i| LayoutItem {
                id: ItemId(i),
                square: true,
                zoomable: true,
                separator: false,
                slide: 0.0,
                effects: ItemEffects::default(),
            })
            .collect()
    }

    #[test]
    fn test_items_centered_without_pointer() {
        let result = compute(&params(), &items(3));
        let xs: Vec<f32> = result.values.iter().map(|(_, v)| v.center.x).collect();
        // 3 × 48 + 2 × 12 gap = 168 wide content centered at 500
        assert_eq!(xs, vec![440.0, 500.0, 560.0]);
        assert!(result.values.iter().all(|(_, v)| v.zoom == 1.0));
        assert!(result.hovered.is_none());
    }

    #[test]
    fn test_icons_sit_on_bottom_edge() {
        let result = compute(&params(), &items(1));
        let (_, value) = result.values[0];
        // pad 6 + half icon 24 above the bottom
        assert_eq!(value.center.y, 800.0 - 30.0);
        assert_eq!(result.static_footprint.bottom(), 800.0);
    }

    #[test]
    fn test_pointer_over_item_zooms_and_hovers() {
        let mut p = params();
        p.cursor = Some(Point::new(500.0, 790.0));
        let result = compute(&p, &items(3));
        let (_, middle) = result.values[1];
        assert!((middle.zoom - 2.0).abs() < 1e-4);
        assert_eq!(result.hovered, Some(ItemId(1)));
        // Neighbours are pushed away from the pointer
        assert!(result.values[0].1.center.x < 440.0);
        assert!(result.values[2].1.center.x > 560.0);
    }

    #[test]
    fn test_no_hover_while_hidden() {
        let mut p = params();
        p.cursor = Some(Point::new(500.0, 799.0));
        p.hidden = true;
        p.hide_progress = 1.0;
        let result = compute(&p, &items(3));
        assert!(result.hovered.is_none());
        assert_eq!(result.footprint.height, REVEAL_STRIP);
        assert!(result.footprint.contains(500.0, 799.0));
    }

    #[test]
    fn test_separator_never_hovered() {
        let mut p = params();
        p.cursor = Some(Point::new(500.0, 790.0));
        let mut list = items(3);
        list[1].separator = true;
        list[1].square = false;
        let result = compute(&p, &list);
        assert_ne!(result.hovered, Some(ItemId(1)));
    }

    #[test]
    fn test_non_zoomable_item_keeps_unit_zoom() {
        let mut p = params();
        p.cursor = Some(Point::new(500.0, 790.0));
        let mut list = items(3);
        list[1].zoomable = false;
        let result = compute(&p, &list);
        assert_eq!(result.values[1].1.zoom, 1.0);
        assert_eq!(result.values[1].1.center.x, 500.0);
    }

    #[test]
    fn test_left_edge_runs_vertically() {
        let mut p = params();
        p.edge = DockEdge::Left;
        let result = compute(&p, &items(2));
        let (_, first) = result.values[0];
        let (_, second) = result.values[1];
        assert_eq!(first.center.x, second.center.x);
        assert!(first.center.y < second.center.y);
        assert_eq!(result.static_footprint.x, 0.0);
    }

    #[test]
    fn test_panel_start_alignment() {
        let mut p = params();
        p.panel_mode = true;
        p.alignment = ItemAlignment::Start;
        let result = compute(&p, &items(2));
        assert_eq!(result.values[0].1.center.x, 12.0 + 24.0);
        assert_eq!(result.static_footprint.width, 1000.0);
    }

    #[test]
    fn test_hide_slides_items_off_screen() {
        let mut p = params();
        p.hide_progress = 1.0;
        p.hidden = true;
        let result = compute(&p, &items(1));
        assert!(result.values[0].1.bounds.y >= 800.0);
    }

    #[test]
    fn test_slide_offsets_toward_previous_slot() {
        let mut list = items(2);
        list[0].slide = 1.0;
        let result = compute(&params(), &list);
        assert_eq!(result.values[0].1.center.x, result.values[1].1.center.x);
    }
}
