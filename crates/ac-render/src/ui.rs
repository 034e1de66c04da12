use ac_core::config::RenderConfig;
use ac_core::frame::CharacterGrid;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::canvas;
use crate::fps::FpsCounter;

/// Texte affiché tant que la caméra est éteinte et qu'aucune grille n'est figée.
pub const INACTIVE_PLACEHOLDER: &str = "Press v to start the camera";

/// Largeur fixe du panneau de paramètres.
pub const SIDEBAR_WIDTH: u16 = 24;

/// État visible de l'application.
///
/// # Example
/// ```
/// use ac_render::ui::ViewState;
/// assert_eq!(ViewState::default(), ViewState::Inactive);
/// assert_eq!(ViewState::Frozen.label(), "FROZEN");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewState {
    /// Caméra éteinte, rien de figé.
    #[default]
    Inactive,
    /// Grille suivie en direct.
    Live,
    /// Grille figée par une capture.
    Frozen,
}

impl ViewState {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Inactive => "INACTIVE",
            Self::Live => "LIVE",
            Self::Frozen => "FROZEN",
        }
    }

    fn color(self) -> Color {
        match self {
            Self::Inactive => Color::DarkGray,
            Self::Live => Color::Green,
            Self::Frozen => Color::Cyan,
        }
    }
}

/// Tout ce dont une frame d'UI a besoin, emprunté à l'application.
pub struct DrawContext<'a> {
    /// Grille affichée (figée sinon live), `None` si rien à montrer.
    pub grid: Option<&'a CharacterGrid>,
    pub config: &'a RenderConfig,
    pub view: ViewState,
    pub fps: &'a FpsCounter,
    /// Nom de la source (ffmpeg, nokhwa, image).
    pub source: &'a str,
    /// Dernier message de statut (export, erreur caméra).
    pub status: Option<&'a str>,
    pub show_help: bool,
}

/// Draw the full UI: canvas + parameter sidebar (+ help overlay).
pub fn draw(frame: &mut Frame, ctx: &DrawContext<'_>) {
    let area = frame.area();
    let [canvas_area, sidebar_area] =
        Layout::horizontal([Constraint::Min(20), Constraint::Length(SIDEBAR_WIDTH)]).areas(area);

    match ctx.grid {
        Some(grid) => canvas::render_grid(frame.buffer_mut(), canvas_area, grid),
        None => {
            let text = if ctx.view == ViewState::Inactive {
                INACTIVE_PLACEHOLDER
            } else {
                "Waiting for camera..."
            };
            canvas::render_placeholder(frame.buffer_mut(), canvas_area, text);
        }
    }

    draw_sidebar(frame, sidebar_area, ctx);

    if ctx.show_help {
        draw_help_overlay(frame, area);
    }
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("─ {title} ─"),
        Style::default().fg(Color::Yellow),
    ))
}

/// Draw the parameter sidebar with all live values.
fn draw_sidebar(frame: &mut Frame, area: Rect, ctx: &DrawContext<'_>) {
    let config = ctx.config;
    let profile = config.profile();

    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {}", ctx.view.label()),
            Style::default()
                .fg(ctx.view.color())
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Render"),
        Line::from(format!(" Width: {}", config.width)),
        Line::from(format!(" Font: {}px", config.font_size)),
        Line::from(format!(" Chars: {}", profile.name())),
        Line::from(Span::styled(
            format!(" {}", profile.spaced()),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        section("Info"),
        Line::from(format!(" Src: {}", ctx.source)),
    ];
    if let Some(grid) = ctx.grid {
        lines.push(Line::from(format!(" Grid: {}x{}", grid.width(), grid.height())));
    }
    if ctx.view == ViewState::Live {
        lines.push(Line::from(format!(" FPS: {:.0}", ctx.fps.fps())));
        lines.push(Line::from(format!(" {:.1}ms", ctx.fps.frame_time_ms())));
        lines.push(Line::from(format!(" Skip: {}", ctx.fps.skipped())));
    }
    if let Some(status) = ctx.status {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(Color::Magenta),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " ? = help",
        Style::default().fg(Color::DarkGray),
    )));

    let sidebar = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::LEFT).title(" Params "));
    frame.render_widget(sidebar, area);
}

/// Draw the help overlay with all keybindings.
fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let help_text = vec![
        Line::from(Span::styled(
            " asciicam: controls ",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(" v        Start/stop camera"),
        Line::from(" Space    Capture (freeze)"),
        Line::from(" r        Reset to live"),
        Line::from(" s        Export PNG"),
        Line::from(" [/]      Width ∓4"),
        Line::from(" -/+      Font size ∓1"),
        Line::from(" 1-3      Select charset"),
        Line::from(" Tab      Next charset"),
        Line::from(" ?        Toggle help"),
        Line::from(" q/Esc    Quit"),
        Line::from(""),
        Line::from(Span::styled(
            " Press ? or Esc to close ",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let help_width = 34u16.min(area.width);
    let help_height = (help_text.len() as u16 + 2).min(area.height);
    let x = area.x + area.width.saturating_sub(help_width) / 2;
    let y = area.y + area.height.saturating_sub(help_height) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .style(Style::default().bg(Color::Black).fg(Color::White)),
    );
    frame.render_widget(Clear, help_area);
    frame.render_widget(help, help_area);
}
