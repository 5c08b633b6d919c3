use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use time_humanize::{Accuracy, HumanTime, Tense};
use unicode_width::UnicodeWidthStr;

use crate::{
    elapsed::Elapsed,
    timefmt,
    util::{group_thousands, pad2},
    App, AppState,
};

const HORIZONTAL_MARGIN: u16 = 5;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Setup => render_setup(self, area, buf),
            AppState::Counting => render_counter(self, area, buf),
        }
    }
}

fn render_setup(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(area.height.saturating_sub(7) / 2),
                Constraint::Length(1), // title
                Constraint::Length(1), // padding
                Constraint::Length(3), // input box
                Constraint::Length(1), // padding
                Constraint::Length(1), // hint
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(area);

    let title = Paragraph::new(Span::styled("since when?", bold_style))
        .alignment(Alignment::Center);
    title.render(chunks[1], buf);

    // Keep the tail of the input visible when it outgrows the box
    let inner_width = chunks[3].width.saturating_sub(2) as usize;
    let visible_width = inner_width.saturating_sub(1); // leave room for the cursor
    let mut shown = app.input.as_str();
    while shown.width() > visible_width && !shown.is_empty() {
        let mut chars = shown.chars();
        chars.next();
        shown = chars.as_str();
    }

    let input_line = Line::from(vec![
        Span::styled(shown.to_string(), bold_style),
        Span::styled("█", dim_style),
    ]);
    let input_box = Paragraph::new(input_line).block(
        Block::default()
            .borders(Borders::ALL)
            .title("start date (YYYY-MM-DDTHH:MM)"),
    );
    input_box.render(chunks[3], buf);

    let hint = Paragraph::new(Span::styled("(enter) start  (esc) quit", dim_style))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    hint.render(chunks[5], buf);
}

fn render_counter(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let italic_dim_style = Style::default()
        .patch(dim_style)
        .add_modifier(Modifier::ITALIC);

    let totals_lines = if app.show_totals { 2 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(area.height.saturating_sub(7 + totals_lines) / 2),
                Constraint::Length(1), // since label
                Constraint::Length(1), // padding
                Constraint::Length(1), // duration
                Constraint::Length(1), // padding
                Constraint::Length(totals_lines), // totals + padding
                Constraint::Length(1), // humanized subtitle
                Constraint::Length(1), // padding
                Constraint::Length(1), // hint
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(area);

    let label = app
        .session
        .start_ms()
        .map(timefmt::since_label)
        .unwrap_or_default();
    Paragraph::new(Span::styled(label, dim_style))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(format_duration(&app.elapsed), green_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    if app.show_totals {
        Paragraph::new(Span::styled(format_totals(&app.elapsed), dim_style))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }

    Paragraph::new(Span::styled(started_ago(&app.elapsed), italic_dim_style))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);

    Paragraph::new(Span::styled("(r)eset  (esc) quit", dim_style))
        .alignment(Alignment::Center)
        .render(chunks[8], buf);
}

/// "2 years 13 days 05:04:33", omitting zero leading units.
pub fn format_duration(e: &Elapsed) -> String {
    let clock = format!("{}:{}:{}", pad2(e.hours), pad2(e.minutes), pad2(e.seconds));

    if e.years > 0 {
        format!(
            "{} {} {} {} {}",
            e.years,
            if e.years == 1 { "year" } else { "years" },
            e.days,
            if e.days == 1 { "day" } else { "days" },
            clock
        )
    } else if e.days > 0 {
        format!(
            "{} {} {}",
            e.days,
            if e.days == 1 { "day" } else { "days" },
            clock
        )
    } else {
        clock
    }
}

/// "= 378 days = 9,073 hours = 544,384 minutes"
pub fn format_totals(e: &Elapsed) -> String {
    format!(
        "= {} days = {} hours = {} minutes",
        group_thousands(e.total_days),
        group_thousands(e.total_hours),
        group_thousands(e.total_minutes)
    )
}

fn started_ago(e: &Elapsed) -> String {
    let human = HumanTime::from(std::time::Duration::from_millis(e.whole_ms()));
    format!("started {}", human.to_text_en(Accuracy::Rough, Tense::Past))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elapsed::MS_PER_DAY;

    #[test]
    fn test_format_duration_sub_day() {
        let e = Elapsed::from_millis(5 * 3_600_000 + 4 * 60_000 + 33_000);
        assert_eq!(format_duration(&e), "05:04:33");
    }

    #[test]
    fn test_format_duration_with_days() {
        let e = Elapsed::from_millis(MS_PER_DAY + 3_600_000);
        assert_eq!(format_duration(&e), "1 day 01:00:00");
    }

    #[test]
    fn test_format_duration_with_years() {
        let e = Elapsed::from_millis(366 * MS_PER_DAY);
        assert_eq!(format_duration(&e), "1 year 1 day 00:00:00");
    }

    #[test]
    fn test_format_duration_plurals() {
        let e = Elapsed::from_millis(2 * 365 * MS_PER_DAY + 3 * MS_PER_DAY);
        assert_eq!(format_duration(&e), "2 years 3 days 00:00:00");
    }

    #[test]
    fn test_format_totals_grouping() {
        let e = Elapsed::from_millis(378 * MS_PER_DAY);
        assert_eq!(
            format_totals(&e),
            "= 378 days = 9,072 hours = 544,320 minutes"
        );
    }

    #[test]
    fn test_started_ago_mentions_past() {
        let e = Elapsed::from_millis(90 * MS_PER_DAY);
        let s = started_ago(&e);
        assert!(s.starts_with("started "));
        assert!(s.ends_with("ago"), "got: {}", s);
    }
}
