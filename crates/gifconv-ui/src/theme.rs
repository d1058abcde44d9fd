// crates/gifconv-ui/src/theme.rs
//
// Dark visuals with a blue accent. Panels import only the named colours
// below; everything else comes from egui's stock dark theme.

use egui::{Color32, Context, CornerRadius, Stroke, Visuals};

pub const ACCENT:      Color32 = Color32::from_rgb( 90, 170, 255);
pub const ACCENT_DIM:  Color32 = Color32::from_rgb( 40, 100, 170);

/// Side panel and top bar.
pub const PANEL_BG:    Color32 = Color32::from_rgb( 22,  23,  28);
/// Section headers inside a panel.
pub const HEADER_BG:   Color32 = Color32::from_rgb( 30,  32,  40);
/// Behind the preview image.
pub const CANVAS_BG:   Color32 = Color32::from_rgb( 12,  12,  15);
pub const WIDGET_BG:   Color32 = Color32::from_rgb( 40,  42,  52);
pub const WIDGET_HOT:  Color32 = Color32::from_rgb( 52,  56,  70);
pub const TEXT_DIM:    Color32 = Color32::from_rgb(125, 128, 145);

pub const STATUS_OK:   Color32 = Color32::from_rgb( 80, 190, 120);
pub const STATUS_ERR:  Color32 = Color32::from_rgb(200,  80,  80);

pub fn configure_style(ctx: &Context) {
    ctx.set_visuals(visuals());
    ctx.style_mut(|s| {
        s.spacing.item_spacing    = egui::vec2(8.0, 6.0);
        s.spacing.button_padding  = egui::vec2(10.0, 4.0);
        s.spacing.interact_size.y = 22.0;
    });
}

fn visuals() -> Visuals {
    let mut v = Visuals::dark();
    v.panel_fill       = PANEL_BG;
    v.window_fill      = HEADER_BG;
    v.extreme_bg_color = CANVAS_BG;
    v.selection.bg_fill = ACCENT_DIM;
    v.hyperlink_color  = ACCENT;

    let round = CornerRadius::same(3);
    let w = &mut v.widgets;
    for (state, fill) in [
        (&mut w.inactive, WIDGET_BG),
        (&mut w.hovered,  WIDGET_HOT),
        (&mut w.active,   ACCENT_DIM),
    ] {
        state.bg_fill       = fill;
        state.weak_bg_fill  = fill;
        state.corner_radius = round;
    }
    w.hovered.bg_stroke = Stroke::new(1.0, ACCENT);
    v
}
