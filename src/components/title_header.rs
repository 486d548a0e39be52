use artbox::{
    Alignment as ArtAlignment, Color as ArtColor, Fill, LinearGradient, Renderer, fonts,
    integrations::ratatui::ArtBox,
};
use ratatui::{Frame, layout::Rect};

use super::Component;
use crate::action::Action;
use crate::state::LOADING_ANIM_CYCLE_TICKS;

pub const TITLE: &str = "Weather Report";
const BANNER_ANGLE: f32 = 5.0;

/// FIGlet banner; the gradient seam sweeps across while a fetch is running
pub struct TitleHeader;

pub struct TitleHeaderProps {
    /// Current temperature in °C, tints the banner
    pub temperature: Option<f64>,
    pub is_animating: bool,
    pub tick_count: u32,
}

type Rgb = (u8, u8, u8);

/// Banner palette by temperature: (upper bound °C, start, end)
const PALETTE: [(f64, Rgb, Rgb); 5] = [
    (0.0, (150, 200, 255), (200, 230, 255)),
    (15.0, (100, 180, 255), (150, 220, 200)),
    (25.0, (100, 200, 150), (255, 220, 100)),
    (35.0, (255, 180, 80), (255, 120, 80)),
    (f64::INFINITY, (255, 100, 80), (255, 60, 60)),
];
const NO_DATA: (Rgb, Rgb) = ((180, 180, 180), (220, 220, 220));

fn palette(temperature: Option<f64>) -> (ArtColor, ArtColor) {
    let (from, to) = temperature
        .and_then(|t| PALETTE.iter().find(|(limit, _, _)| t < *limit))
        .map_or(NO_DATA, |(_, from, to)| (*from, *to));
    (
        ArtColor::rgb(from.0, from.1, from.2),
        ArtColor::rgb(to.0, to.1, to.2),
    )
}

/// Colour at `t` on a loop that runs from -> to -> from over one unit
fn loop_color((from, to): (ArtColor, ArtColor), t: f32) -> ArtColor {
    let t = t.rem_euclid(1.0);
    if t < 0.5 {
        from.interpolate(to, t * 2.0)
    } else {
        to.interpolate(from, (t - 0.5) * 2.0)
    }
}

/// The loop shifted right by `phase`; phase 0 and 1 draw the same banner.
fn banner_fill(colors: (ArtColor, ArtColor), phase: f32) -> Fill {
    let mut stops = vec![
        (0.0, loop_color(colors, -phase)),
        (1.0, loop_color(colors, 1.0 - phase)),
    ];
    for knot in [0.0, 0.5] {
        stops.push(((knot + phase).rem_euclid(1.0), loop_color(colors, knot)));
    }
    stops.sort_by(|a, b| a.0.total_cmp(&b.0));

    let stops = stops
        .into_iter()
        .map(|(pos, color)| artbox::ColorStop::new(pos, color))
        .collect();
    Fill::Linear(LinearGradient::new(BANNER_ANGLE, stops))
}

fn animated_phase(tick_count: u32) -> f32 {
    let steps = LOADING_ANIM_CYCLE_TICKS.max(1);
    (tick_count % steps) as f32 / steps as f32
}

impl Component<Action> for TitleHeader {
    type Props<'a> = TitleHeaderProps;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let phase = if props.is_animating {
            animated_phase(props.tick_count)
        } else {
            0.0
        };
        let fill = banner_fill(palette(props.temperature), phase);

        let renderer = Renderer::new(fonts::stack(&["terminus", "miniwi"]))
            .with_plain_fallback()
            .with_alignment(ArtAlignment::Center)
            .with_fill(fill);

        frame.render_widget(ArtBox::new(&renderer, TITLE), area);
    }
}
