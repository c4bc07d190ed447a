use chrono::NaiveDate;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{FilterCriteria, Teacher};
use crate::validation::{self, Field, ValidationError};

/// Editable state of the teacher form. Values stay raw strings until the
/// whole form validates.
#[derive(Default, Clone)]
pub(crate) struct TeacherForm {
    pub(crate) full_name: String,
    pub(crate) date_of_birth: String,
    pub(crate) number_of_classes: String,
    pub(crate) active: TeacherField,
    touched: [bool; 3],
}

/// Focusable fields of the teacher form.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum TeacherField {
    #[default]
    FullName,
    DateOfBirth,
    NumberOfClasses,
}

impl TeacherField {
    fn index(self) -> usize {
        match self {
            TeacherField::FullName => 0,
            TeacherField::DateOfBirth => 1,
            TeacherField::NumberOfClasses => 2,
        }
    }

    fn rule(self) -> Field {
        match self {
            TeacherField::FullName => Field::FullName,
            TeacherField::DateOfBirth => Field::DateOfBirth,
            TeacherField::NumberOfClasses => Field::NumberOfClasses,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        self.rule().display_name()
    }

    pub(crate) const ALL: [TeacherField; 3] = [
        TeacherField::FullName,
        TeacherField::DateOfBirth,
        TeacherField::NumberOfClasses,
    ];
}

impl TeacherForm {
    /// Populate the form from a record fetched for editing.
    pub(crate) fn from_teacher(teacher: &Teacher) -> Self {
        Self {
            full_name: teacher.full_name.clone(),
            date_of_birth: teacher.date_of_birth.format(validation::DATE_FORMAT).to_string(),
            number_of_classes: teacher.number_of_classes.to_string(),
            active: TeacherField::FullName,
            touched: [false; 3],
        }
    }

    fn value(&self, field: TeacherField) -> &str {
        match field {
            TeacherField::FullName => &self.full_name,
            TeacherField::DateOfBirth => &self.date_of_birth,
            TeacherField::NumberOfClasses => &self.number_of_classes,
        }
    }

    fn value_mut(&mut self, field: TeacherField) -> &mut String {
        match field {
            TeacherField::FullName => &mut self.full_name,
            TeacherField::DateOfBirth => &mut self.date_of_birth,
            TeacherField::NumberOfClasses => &mut self.number_of_classes,
        }
    }

    /// Move focus forward; the field being left counts as touched.
    pub(crate) fn next_field(&mut self) {
        self.touch(self.active);
        self.active = match self.active {
            TeacherField::FullName => TeacherField::DateOfBirth,
            TeacherField::DateOfBirth => TeacherField::NumberOfClasses,
            TeacherField::NumberOfClasses => TeacherField::FullName,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.touch(self.active);
        self.active = match self.active {
            TeacherField::FullName => TeacherField::NumberOfClasses,
            TeacherField::DateOfBirth => TeacherField::FullName,
            TeacherField::NumberOfClasses => TeacherField::DateOfBirth,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.value_mut(self.active).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    fn touch(&mut self, field: TeacherField) {
        self.touched[field.index()] = true;
    }

    pub(crate) fn is_touched(&self, field: TeacherField) -> bool {
        self.touched[field.index()]
    }

    pub(crate) fn mark_all_touched(&mut self) {
        self.touched = [true; 3];
    }

    /// Clear every value and mark every field touched so empty required
    /// fields show their error straight away.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
        self.mark_all_touched();
    }

    pub(crate) fn error(&self, field: TeacherField, today: NaiveDate) -> Option<ValidationError> {
        validation::validate_field(field.rule(), self.value(field), today).err()
    }

    /// Error to render inline: only for fields the user has touched.
    pub(crate) fn visible_error(&self, field: TeacherField, today: NaiveDate) -> Option<ValidationError> {
        if self.is_touched(field) {
            self.error(field, today)
        } else {
            None
        }
    }

    pub(crate) fn is_valid(&self, today: NaiveDate) -> bool {
        TeacherField::ALL
            .iter()
            .all(|field| self.error(*field, today).is_none())
    }

    /// Convert the inputs into a record ready to send, or report the first
    /// failing rule.
    pub(crate) fn to_teacher(&self, today: NaiveDate) -> Result<Teacher, ValidationError> {
        for field in TeacherField::ALL {
            if let Some(err) = self.error(field, today) {
                return Err(err);
            }
        }
        // Both values passed their rules above.
        let date_of_birth = validation::parse_date(&self.date_of_birth).unwrap_or(today);
        let number_of_classes = self.number_of_classes.trim().parse().unwrap_or_default();
        Ok(Teacher::new(
            self.full_name.trim(),
            date_of_birth,
            number_of_classes,
        ))
    }

    /// Render one labelled input line, red when its error is visible.
    pub(crate) fn build_line(&self, field: TeacherField, today: NaiveDate) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;
        let placeholder = match field {
            TeacherField::DateOfBirth => "<YYYY-MM-DD>",
            _ => "<required>",
        };
        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if self.visible_error(field, today).is_some() {
            Style::default().fg(Color::Red)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self, field: TeacherField) -> usize {
        self.value(field).chars().count()
    }
}

/// Range and search inputs of the list screen.
#[derive(Default, Clone)]
pub(crate) struct FilterForm {
    pub(crate) search_term: String,
    pub(crate) min_age: String,
    pub(crate) max_age: String,
    pub(crate) min_classes: String,
    pub(crate) max_classes: String,
    pub(crate) active: FilterField,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum FilterField {
    #[default]
    MinAge,
    MaxAge,
    MinClasses,
    MaxClasses,
}

impl FilterField {
    pub(crate) const ALL: [FilterField; 4] = [
        FilterField::MinAge,
        FilterField::MaxAge,
        FilterField::MinClasses,
        FilterField::MaxClasses,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            FilterField::MinAge => "Min age",
            FilterField::MaxAge => "Max age",
            FilterField::MinClasses => "Min classes",
            FilterField::MaxClasses => "Max classes",
        }
    }
}

impl FilterForm {
    fn value(&self, field: FilterField) -> &str {
        match field {
            FilterField::MinAge => &self.min_age,
            FilterField::MaxAge => &self.max_age,
            FilterField::MinClasses => &self.min_classes,
            FilterField::MaxClasses => &self.max_classes,
        }
    }

    fn value_mut(&mut self, field: FilterField) -> &mut String {
        match field {
            FilterField::MinAge => &mut self.min_age,
            FilterField::MaxAge => &mut self.max_age,
            FilterField::MinClasses => &mut self.min_classes,
            FilterField::MaxClasses => &mut self.max_classes,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            FilterField::MinAge => FilterField::MaxAge,
            FilterField::MaxAge => FilterField::MinClasses,
            FilterField::MinClasses => FilterField::MaxClasses,
            FilterField::MaxClasses => FilterField::MinAge,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            FilterField::MinAge => FilterField::MaxClasses,
            FilterField::MaxAge => FilterField::MinAge,
            FilterField::MinClasses => FilterField::MaxAge,
            FilterField::MaxClasses => FilterField::MinClasses,
        };
    }

    /// Bounds accept digits only, and only while the value still fits a `u32`.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if !ch.is_ascii_digit() {
            return false;
        }
        let value = self.value_mut(self.active);
        value.push(ch);
        if value.parse::<u32>().is_err() {
            value.pop();
            return false;
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.value_mut(self.active).pop();
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    /// Criteria for the server, leaving out every blank input. An entered
    /// bound too large for a `u32` saturates instead of disappearing.
    pub(crate) fn criteria(&self) -> FilterCriteria {
        let bound = |raw: &str| {
            let raw = raw.trim();
            (!raw.is_empty()).then(|| raw.parse::<u32>().unwrap_or(u32::MAX))
        };
        let term = self.search_term.trim();
        FilterCriteria {
            search_term: (!term.is_empty()).then(|| term.to_string()),
            min_age: bound(&self.min_age),
            max_age: bound(&self.max_age),
            min_classes: bound(&self.min_classes),
            max_classes: bound(&self.max_classes),
        }
    }

    pub(crate) fn build_line(&self, field: FilterField) -> Line<'static> {
        let value = self.value(field);
        let style = if self.active == field {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let display = if value.is_empty() {
            "<any>".to_string()
        } else {
            value.to_string()
        };
        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self, field: FilterField) -> usize {
        self.value(field).chars().count()
    }
}

/// Pending delete awaiting confirmation.
#[derive(Clone)]
pub(crate) struct ConfirmDelete {
    pub(crate) id: i64,
    pub(crate) full_name: String,
}

impl ConfirmDelete {
    pub(crate) fn from_teacher(teacher: &Teacher) -> Option<Self> {
        Some(Self {
            id: teacher.id?,
            full_name: teacher.full_name.clone(),
        })
    }
}
