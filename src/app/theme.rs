//! Theme and styling for the visualizer
//!
//! Color constants, the dark egui style, and the beam-area background.

use eframe::egui::{self, Color32, Rounding, Stroke, Vec2};

/// Background colors
pub mod background {
    use super::Color32;

    /// Beam travel area
    pub const SURFACE: Color32 = Color32::from_rgb(18, 18, 28);

    /// Panel background
    pub const PANEL: Color32 = Color32::from_rgb(35, 35, 55);

    /// Widget background
    pub const WIDGET: Color32 = Color32::from_rgb(45, 45, 70);

    pub const WIDGET_HOVERED: Color32 = Color32::from_rgb(55, 55, 85);

    pub const WIDGET_ACTIVE: Color32 = Color32::from_rgb(65, 65, 100);
}

/// Text colors
pub mod text {
    use super::Color32;

    pub const PRIMARY: Color32 = Color32::from_rgb(240, 240, 245);

    pub const SECONDARY: Color32 = Color32::from_rgb(160, 160, 175);

    pub const DISABLED: Color32 = Color32::from_rgb(100, 100, 115);
}

/// Accent colors
pub mod accent {
    use super::Color32;

    pub const PRIMARY: Color32 = Color32::from_rgb(66, 165, 245);

    pub const SUCCESS: Color32 = Color32::from_rgb(129, 199, 132);

    pub const WARNING: Color32 = Color32::from_rgb(255, 183, 77);
}

/// Guide lines drawn across the beam area
pub mod guide {
    use super::Color32;

    /// Line predictive beams start from
    pub const START_LINE: Color32 = Color32::from_rgba_premultiplied(60, 60, 90, 255);

    /// Line predictive beams must reach on time
    pub const TOUCH_LINE: Color32 = Color32::from_rgba_premultiplied(90, 60, 60, 255);
}

/// Rounding for panels and sliders
pub const ROUNDING_SMALL: Rounding = Rounding {
    nw: 4.0,
    ne: 4.0,
    sw: 4.0,
    se: 4.0,
};

/// Apply the dark theme to an egui context
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    let visuals = &mut style.visuals;
    visuals.dark_mode = true;
    visuals.panel_fill = background::PANEL;
    visuals.window_fill = background::PANEL;

    visuals.widgets.noninteractive.bg_fill = background::WIDGET;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, text::SECONDARY);
    visuals.widgets.noninteractive.rounding = ROUNDING_SMALL;

    visuals.widgets.inactive.bg_fill = background::WIDGET;
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, text::PRIMARY);
    visuals.widgets.inactive.rounding = ROUNDING_SMALL;

    visuals.widgets.hovered.bg_fill = background::WIDGET_HOVERED;
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, text::PRIMARY);
    visuals.widgets.hovered.rounding = ROUNDING_SMALL;

    visuals.widgets.active.bg_fill = background::WIDGET_ACTIVE;
    visuals.widgets.active.fg_stroke = Stroke::new(1.5, accent::PRIMARY);
    visuals.widgets.active.rounding = ROUNDING_SMALL;

    visuals.selection.bg_fill = accent::PRIMARY.gamma_multiply(0.3);
    visuals.selection.stroke = Stroke::new(1.0, accent::PRIMARY);

    style.spacing.item_spacing = Vec2::new(8.0, 6.0);
    style.spacing.slider_width = 220.0;

    ctx.set_style(style);
}

/// Fill the beam area and draw the start and touch lines.
pub fn draw_surface_background(
    painter: &egui::Painter,
    rect: egui::Rect,
    start_line_y: f32,
    touch_line_y: f32,
) {
    painter.rect_filled(rect, 0.0, background::SURFACE);

    for (y, color) in [
        (start_line_y, guide::START_LINE),
        (touch_line_y, guide::TOUCH_LINE),
    ] {
        let y = rect.top() + y;
        if y >= rect.top() && y <= rect.bottom() {
            painter.line_segment(
                [egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)],
                Stroke::new(1.0, color),
            );
        }
    }
}
