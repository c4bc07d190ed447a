use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::{FilterCriteria, TeacherStatistics};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// One-line summary of the active search and range bounds.
pub(crate) fn describe_criteria(criteria: &FilterCriteria) -> String {
    if criteria.is_empty() {
        return "No filters".to_string();
    }
    let range = |label: &str, min: Option<u32>, max: Option<u32>| match (min, max) {
        (None, None) => None,
        (Some(min), None) => Some(format!("{label} >= {min}")),
        (None, Some(max)) => Some(format!("{label} <= {max}")),
        (Some(min), Some(max)) => Some(format!("{label} {min}-{max}")),
    };
    let mut parts = Vec::new();
    if let Some(term) = &criteria.search_term {
        parts.push(format!("\"{term}\""));
    }
    parts.extend(range("age", criteria.min_age, criteria.max_age));
    parts.extend(range("classes", criteria.min_classes, criteria.max_classes));
    parts.join(" • ")
}

/// Lines of the statistics panel on the landing screen.
pub(crate) fn statistics_lines(statistics: Option<&TeacherStatistics>, loading: bool) -> Vec<Line<'static>> {
    let label = Style::default().add_modifier(Modifier::BOLD);
    if loading {
        return vec![Line::from(Span::styled(
            "Loading statistics...",
            Style::default().fg(Color::Gray),
        ))];
    }
    match statistics {
        Some(stats) => vec![
            Line::from(vec![
                Span::styled("Total teachers:   ", label),
                Span::raw(stats.total_teachers.to_string()),
            ]),
            Line::from(vec![
                Span::styled("Average classes:  ", label),
                Span::raw(format!("{:.2}", stats.average_classes)),
            ]),
        ],
        None => vec![Line::from(Span::styled(
            "Statistics unavailable",
            Style::default().fg(Color::DarkGray),
        ))],
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Context};

    use super::*;

    #[test]
    fn surface_error_picks_root_cause() {
        let err = Err::<(), _>(anyhow!("disk full"))
            .context("failed to write teachers.pdf")
            .unwrap_err();
        assert_eq!(surface_error(&err), "disk full");
    }

    #[test]
    fn criteria_summary() {
        assert_eq!(describe_criteria(&FilterCriteria::default()), "No filters");
        let criteria = FilterCriteria {
            search_term: Some("Doe".into()),
            min_age: Some(30),
            max_age: Some(40),
            max_classes: Some(10),
            ..FilterCriteria::default()
        };
        assert_eq!(
            describe_criteria(&criteria),
            "\"Doe\" • age 30-40 • classes <= 10"
        );
    }

    #[test]
    fn centered_rect_stays_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 50, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert!(popup.x >= 20 && popup.y >= 10);
    }
}
