//! UI rendering for the plant quiz.

use crate::app::{App, View};
use crate::config::DisplayConfig;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

/// Foreground colors for the active theme.
struct Palette {
    text: Color,
    dim: Color,
    accent: Color,
    gold: Color,
    good: Color,
    bad: Color,
}

fn palette(dark: bool) -> Palette {
    if dark {
        Palette {
            text: Color::White,
            dim: Color::DarkGray,
            accent: Color::Green,
            gold: Color::Yellow,
            good: Color::Green,
            bad: Color::Red,
        }
    } else {
        Palette {
            text: Color::Black,
            dim: Color::Gray,
            accent: Color::Green,
            gold: Color::Magenta,
            good: Color::Green,
            bad: Color::Red,
        }
    }
}

/// Draw the application.
pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer/status
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    match app.view {
        View::Menu => draw_menu(f, app, chunks[1]),
        View::Quiz => draw_quiz(f, app, chunks[1]),
        View::Results => draw_results(f, app, chunks[1]),
        View::Collection => draw_collection(f, app, chunks[1]),
    }
    draw_footer(f, app, chunks[2]);

    if app.show_help {
        draw_help_popup(f, app);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.progress.profile().dark_mode);
    let profile = app.progress.profile();

    let line = match app.view {
        View::Quiz => {
            let (number, total) = app
                .question
                .as_ref()
                .map(|q| (q.question_number, q.total_questions))
                .unwrap_or((0, 0));
            Line::from(vec![
                Span::styled(
                    format!("Question {}/{}", number, total),
                    Style::default().fg(colors.text),
                ),
                Span::raw("   "),
                Span::styled(
                    format!("Score: {}", app.round_score()),
                    Style::default().fg(colors.gold),
                ),
                Span::raw("   "),
                Span::styled(
                    format!(
                        "Streak: {}{}",
                        profile.current_streak,
                        streak_marker(profile.current_streak, &app.config.display)
                    ),
                    Style::default().fg(colors.accent),
                ),
            ])
        }
        _ => Line::from(vec![
            Span::styled(
                format!("High score: {}", profile.high_score),
                Style::default().fg(colors.gold),
            ),
            Span::raw("   "),
            Span::styled(
                format!(
                    "Daily streak: {}{}",
                    profile.daily_streak,
                    streak_marker(profile.daily_streak, &app.config.display)
                ),
                Style::default().fg(colors.accent),
            ),
        ]),
    };

    let header = Paragraph::new(line)
        .block(Block::default().borders(Borders::ALL).title(" Leaf & Learn "))
        .alignment(Alignment::Center);
    f.render_widget(header, area);
}

fn draw_menu(f: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.progress.profile().dark_mode);
    let profile = app.progress.profile();
    let mastered = app.progress.mastered_count(&app.catalog);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "🌿  Leaf & Learn  🌿",
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Name that plant",
            Style::default().fg(colors.dim),
        )),
        Line::from(""),
        Line::from(format!(
            "Plants mastered: {}/{}",
            mastered,
            app.catalog.len()
        )),
        Line::from(format!("Games played: {}", profile.games_played)),
        Line::from(format!(
            "Lifetime accuracy: {:.0}%",
            profile.accuracy() * 100.0
        )),
        Line::from(format!("Best streak: {}", profile.best_streak)),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(colors.gold)),
            Span::raw(" start quiz    "),
            Span::styled("c", Style::default().fg(colors.gold)),
            Span::raw(" collection    "),
            Span::styled("?", Style::default().fg(colors.gold)),
            Span::raw(" help"),
        ]),
        Line::from(vec![
            Span::styled("d", Style::default().fg(colors.gold)),
            Span::raw(format!(
                " dark mode ({})    ",
                on_off(profile.dark_mode)
            )),
            Span::styled("m", Style::default().fg(colors.gold)),
            Span::raw(format!(" sound ({})", on_off(profile.sound_enabled))),
        ]),
    ];

    let menu = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(menu, area);
}

fn draw_quiz(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Specimen card
            Constraint::Length(6), // Answer options
            Constraint::Min(0),    // Feedback
        ])
        .split(area);

    draw_specimen(f, app, chunks[0]);
    draw_options(f, app, chunks[1]);
    draw_feedback(f, app, chunks[2]);
}

fn draw_specimen(f: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.progress.profile().dark_mode);
    let Some(question) = &app.question else {
        return;
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("🌿", Style::default().fg(colors.accent))),
        Line::from(Span::styled(
            format!("photo: {}", question.plant.image_ref),
            Style::default().fg(colors.dim),
        )),
    ];

    let card = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" What plant is this? "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(card, area);
}

fn draw_options(f: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.progress.profile().dark_mode);
    let Some(question) = &app.question else {
        return;
    };

    let answered = app.resolution.is_some();
    let items: Vec<ListItem> = question
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let eliminated = app.eliminated.contains(&i);
            let style = if answered {
                if option.is_correct {
                    Style::default()
                        .fg(colors.good)
                        .add_modifier(Modifier::BOLD)
                } else if app.chosen == Some(i) {
                    Style::default().fg(colors.bad).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.dim)
                }
            } else if eliminated {
                Style::default()
                    .fg(colors.dim)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(colors.text)
            };

            let badge = Span::styled(
                format!(" {} ", i + 1),
                Style::default().fg(colors.accent),
            );
            ListItem::new(Line::from(vec![
                badge,
                Span::styled(option.display_text.clone(), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL));
    f.render_widget(list, area);
}

fn draw_feedback(f: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.progress.profile().dark_mode);
    let mut lines = Vec::new();

    if let Some(resolution) = &app.resolution {
        if resolution.correct {
            lines.push(Line::from(Span::styled(
                format!("✓ Correct!  {:+}", resolution.score_delta),
                Style::default()
                    .fg(colors.good)
                    .add_modifier(Modifier::BOLD),
            )));
            if resolution.speed_bonus > 0 {
                let label = if resolution.speed_bonus
                    >= app.config.gameplay.speed_bonus.fast_bonus
                {
                    "Lightning!"
                } else {
                    "Quick!"
                };
                lines.push(Line::from(Span::styled(
                    format!("{} +{}", label, resolution.speed_bonus),
                    Style::default().fg(colors.gold),
                )));
            }
            if resolution.leveled_up {
                lines.push(Line::from(Span::styled(
                    "🌿 MASTERED! 🌿",
                    Style::default()
                        .fg(colors.gold)
                        .add_modifier(Modifier::BOLD),
                )));
            }
        } else {
            lines.push(Line::from(Span::styled(
                format!(
                    "✗ Not quite — it's {}  {:+}",
                    resolution.correct_option.display_text, resolution.score_delta
                ),
                Style::default().fg(colors.bad),
            )));
        }

        if app.config.display.show_mnemonic {
            if let Some(question) = &app.question {
                lines.push(Line::from(Span::styled(
                    format!("💡 {}", question.plant.mnemonic),
                    Style::default().fg(colors.text),
                )));
            }
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter to continue",
            Style::default()
                .fg(colors.dim)
                .add_modifier(Modifier::ITALIC),
        )));
    } else if app.question_active() {
        let hint = if app.eliminated.is_empty() {
            format!("h: hint (-{})", app.config.gameplay.hint_penalty)
        } else {
            "Hint used — two options removed".to_string()
        };
        lines.push(Line::from(Span::styled(
            hint,
            Style::default().fg(colors.dim),
        )));
    }

    let feedback = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(feedback, area);
}

fn draw_results(f: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.progress.profile().dark_mode);
    let Some(summary) = &app.summary else {
        return;
    };

    let title = if summary.is_new_high_score {
        "🏆 New High Score!"
    } else if summary.is_perfect() {
        "Perfect Round!"
    } else {
        "Round Complete"
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(colors.gold)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("{} points", summary.score),
            Style::default()
                .fg(colors.gold)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "{} correct · {} wrong",
            summary.correct_count, summary.wrong_count
        )),
        Line::from(""),
    ];

    if !summary.wrong_answers.is_empty() {
        lines.push(Line::from(Span::styled(
            "Worth another look:",
            Style::default().fg(colors.text),
        )));
        for miss in &summary.wrong_answers {
            lines.push(Line::from(Span::styled(
                format!(
                    "{} — you said {}",
                    miss.plant.scientific_name, miss.chosen_text
                ),
                Style::default().fg(colors.dim),
            )));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled("Enter", Style::default().fg(colors.gold)),
        Span::raw(" play again    "),
        Span::styled("Esc", Style::default().fg(colors.gold)),
        Span::raw(" menu"),
    ]));

    let results = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(results, area);
}

fn draw_collection(f: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.progress.profile().dark_mode);
    let max_level = app.progress.rules().max_mastery;

    let mut items: Vec<ListItem> = app
        .catalog
        .iter()
        .map(|plant| {
            let stats = app.progress.stats(&plant.id);
            let mastered = stats.mastery_level >= max_level;
            let dots = mastery_dots(stats.mastery_level, max_level);

            let style = if mastered {
                Style::default().fg(colors.gold)
            } else {
                Style::default().fg(colors.text)
            };
            ListItem::new(Line::from(vec![
                Span::styled(dots, Style::default().fg(colors.accent)),
                Span::raw(" "),
                Span::styled(
                    format!("{} ({})", plant.common_name(), plant.scientific_name),
                    style,
                ),
                Span::styled(
                    format!("  seen {} · correct {}", stats.times_shown, stats.times_correct),
                    Style::default().fg(colors.dim),
                ),
            ]))
        })
        .collect();

    let hardest = app.analytics.most_difficult(3);
    if !hardest.is_empty() {
        items.push(ListItem::new(Line::from("")));
        items.push(ListItem::new(Line::from(Span::styled(
            "Trickiest plants:",
            Style::default().fg(colors.text),
        ))));
        for entry in hardest {
            let name = app
                .catalog
                .get(&entry.plant_id)
                .map(|p| p.common_name().to_string())
                .unwrap_or_else(|| entry.plant_id.clone());
            items.push(ListItem::new(Line::from(Span::styled(
                format!(
                    "{} — {:.0}% missed, avg {:.1}s",
                    name,
                    entry.error_rate * 100.0,
                    entry.avg_response_ms / 1000.0
                ),
                Style::default().fg(colors.bad),
            ))));
        }
    }

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Plant Collection "),
    );
    f.render_widget(list, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let colors = palette(app.progress.profile().dark_mode);

    let text = if let Some(message) = &app.message {
        Span::styled(message.clone(), Style::default().fg(colors.gold))
    } else {
        let hints = match app.view {
            View::Menu => "Enter: play | c: collection | d/m: settings | q: quit",
            View::Quiz => "1-4: answer | h: hint | Enter: continue | Esc: abandon",
            View::Results => "Enter: play again | Esc: menu",
            View::Collection => "Esc: back",
        };
        Span::styled(hints, Style::default().fg(colors.dim))
    };

    let footer = Paragraph::new(Line::from(text))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame, app: &App) {
    let colors = palette(app.progress.profile().dark_mode);
    let area = centered_rect(60, 60, f.area());

    let lines = vec![
        Line::from("Keys"),
        Line::from(""),
        Line::from("Enter/Space  start round or continue"),
        Line::from("1-4          choose an answer"),
        Line::from(format!(
            "h            hint: removes 2 wrong options (-{} pts)",
            app.config.gameplay.hint_penalty
        )),
        Line::from("c            plant collection"),
        Line::from("d            toggle dark mode"),
        Line::from("m            toggle sound"),
        Line::from("Esc          back / abandon round"),
        Line::from("q            quit (from menu)"),
        Line::from(""),
        Line::from(Span::styled(
            "Answer fast for a speed bonus. A miss resets a plant's mastery.",
            Style::default().fg(colors.dim),
        )),
    ];

    let help = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

fn mastery_dots(level: u8, max: u8) -> String {
    let mut dots = String::new();
    for i in 0..max {
        dots.push(if i < level { '◆' } else { '◇' });
    }
    dots
}

fn streak_marker(streak: u32, display: &DisplayConfig) -> &'static str {
    if streak >= display.streak_explosion {
        " 🔥🔥"
    } else if streak >= display.streak_fire {
        " 🔥"
    } else {
        ""
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

/// Centered popup area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mastery_dots() {
        assert_eq!(mastery_dots(0, 3), "◇◇◇");
        assert_eq!(mastery_dots(2, 3), "◆◆◇");
        assert_eq!(mastery_dots(3, 3), "◆◆◆");
    }

    #[test]
    fn test_streak_marker() {
        let display = DisplayConfig::default();
        assert_eq!(streak_marker(0, &display), "");
        assert_eq!(streak_marker(5, &display), " 🔥");
        assert_eq!(streak_marker(12, &display), " 🔥🔥");
    }
}
