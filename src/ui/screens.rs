use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, warn};

use crate::api::StoreSubscription;
use crate::models::{ExportFormat, Teacher, TeacherStatistics};

use super::dispatch::{Completion, Request, Response};
use super::forms::{FilterForm, TeacherForm};
use super::routes::Route;

/// Severity of a footer notice.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum NoticeKind {
    Success,
    Error,
}

/// Something a screen wants the app to do on its behalf.
#[derive(Debug, PartialEq)]
pub(crate) enum Effect {
    Request(Request),
    Navigate(Route),
    Notify(String, NoticeKind),
    Download(ExportFormat, Vec<u8>),
}

fn notify(text: impl Into<String>, kind: NoticeKind) -> Effect {
    Effect::Notify(text.into(), kind)
}

/// Landing screen: aggregate statistics and export shortcuts.
pub(crate) struct HomeScreen {
    pub(crate) statistics: Option<TeacherStatistics>,
    pub(crate) loading: bool,
}

impl HomeScreen {
    pub(crate) fn open() -> (Self, Vec<Effect>) {
        let screen = Self {
            statistics: None,
            loading: true,
        };
        (screen, vec![Effect::Request(Request::LoadStatistics)])
    }

    pub(crate) fn export(&self, format: ExportFormat) -> Vec<Effect> {
        vec![Effect::Request(Request::Export(format))]
    }

    /// Statistics failures stay silent apart from the log; the panel simply
    /// stays empty.
    pub(crate) fn on_completion(&mut self, completion: Completion) -> Vec<Effect> {
        match completion.result {
            Ok(Response::Statistics(stats)) => {
                self.statistics = Some(stats);
                self.loading = false;
                Vec::new()
            }
            Ok(Response::Exported(format, bytes)) => vec![Effect::Download(format, bytes)],
            Ok(_) => Vec::new(),
            Err(err) => {
                match completion.request {
                    Request::LoadStatistics => {
                        self.loading = false;
                        error!("Error loading statistics: {err}");
                    }
                    Request::Export(format) => {
                        error!("Error exporting to {}: {err}", format.label())
                    }
                    _ => warn!("home: unexpected failure: {err}"),
                }
                Vec::new()
            }
        }
    }
}

/// Teacher list with server-side search and range filtering.
pub(crate) struct ListScreen {
    subscription: StoreSubscription,
    /// Full list as last published by the store.
    pub(crate) teachers: Arc<Vec<Teacher>>,
    /// Search or filter result replacing the full list while active.
    pub(crate) filtered: Option<Vec<Teacher>>,
    pub(crate) filters: FilterForm,
    pub(crate) loading: bool,
    pub(crate) selected: usize,
}

impl ListScreen {
    pub(crate) fn open(mut subscription: StoreSubscription) -> (Self, Vec<Effect>) {
        let snapshot = subscription.latest();
        let screen = Self {
            subscription,
            teachers: snapshot.teachers,
            filtered: None,
            filters: FilterForm::default(),
            loading: true,
            selected: 0,
        };
        (screen, vec![Effect::Request(Request::LoadTeachers)])
    }

    /// Rows currently on display.
    pub(crate) fn displayed(&self) -> &[Teacher] {
        match &self.filtered {
            Some(filtered) => filtered,
            None => &self.teachers,
        }
    }

    pub(crate) fn current(&self) -> Option<&Teacher> {
        self.displayed().get(self.selected)
    }

    /// Pick up whatever the store published since the last tick.
    pub(crate) fn sync_store(&mut self) {
        if self.subscription.has_changed() {
            let snapshot = self.subscription.latest();
            self.teachers = snapshot.teachers;
            self.loading = snapshot.loading;
            self.ensure_in_bounds();
        }
    }

    pub(crate) fn load(&mut self) -> Vec<Effect> {
        self.loading = true;
        vec![Effect::Request(Request::LoadTeachers)]
    }

    /// A blank query shows the full list again; anything else is answered by
    /// the server. The term is only kept once the server has answered.
    pub(crate) fn search(&mut self, query: &str) -> Vec<Effect> {
        let query = query.trim().to_string();
        if query.is_empty() {
            self.filters.search_term.clear();
            self.filtered = None;
            self.ensure_in_bounds();
            Vec::new()
        } else {
            vec![Effect::Request(Request::Search(query))]
        }
    }

    pub(crate) fn apply_filters(&mut self) -> Vec<Effect> {
        vec![Effect::Request(Request::Filter(self.filters.criteria()))]
    }

    pub(crate) fn clear_filters(&mut self) -> Vec<Effect> {
        self.filters.clear();
        self.filtered = None;
        self.ensure_in_bounds();
        vec![notify("Filters cleared", NoticeKind::Success)]
    }

    pub(crate) fn delete(&mut self, id: i64) -> Vec<Effect> {
        vec![Effect::Request(Request::Delete(id))]
    }

    pub(crate) fn export(&self, format: ExportFormat) -> Vec<Effect> {
        vec![Effect::Request(Request::Export(format))]
    }

    /// Apply a completion. Failures leave every displayed value untouched.
    pub(crate) fn on_completion(&mut self, completion: Completion) -> Vec<Effect> {
        let request = completion.request;
        match completion.result {
            Ok(Response::Teachers(teachers)) => {
                self.teachers = Arc::new(teachers);
                self.filtered = None;
                self.loading = false;
                self.ensure_in_bounds();
                Vec::new()
            }
            Ok(Response::SearchResults(teachers)) => {
                if let Request::Search(query) = &request {
                    self.filters.search_term = query.clone();
                }
                self.filtered = Some(teachers);
                self.selected = 0;
                Vec::new()
            }
            Ok(Response::FilterResults(teachers)) => {
                let message = format!("Found {} teachers", teachers.len());
                self.filtered = Some(teachers);
                self.selected = 0;
                vec![notify(message, NoticeKind::Success)]
            }
            Ok(Response::Deleted(_)) => {
                // The client re-fetched the list before reporting success.
                let snapshot = self.subscription.latest();
                self.teachers = snapshot.teachers;
                self.filtered = None;
                self.ensure_in_bounds();
                vec![notify("Teacher deleted successfully", NoticeKind::Success)]
            }
            Ok(Response::Exported(format, bytes)) => vec![
                Effect::Download(format, bytes),
                notify(
                    format!("{} exported successfully", format.label()),
                    NoticeKind::Success,
                ),
            ],
            Ok(_) => Vec::new(),
            Err(err) => {
                let message = match request {
                    Request::LoadTeachers => {
                        self.loading = false;
                        "Error loading teachers".to_string()
                    }
                    Request::Search(_) => "Error searching teachers".to_string(),
                    Request::Filter(_) => "Error filtering teachers".to_string(),
                    Request::Delete(_) => "Error deleting teacher".to_string(),
                    Request::Export(format) => format!("Error exporting to {}", format.label()),
                    _ => "Operation failed".to_string(),
                };
                error!("{message}: {err}");
                vec![notify(message, NoticeKind::Error)]
            }
        }
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        let len = self.displayed().len();
        if len == 0 {
            return;
        }
        let new = (self.selected as isize + offset).clamp(0, len as isize - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.displayed().len().saturating_sub(1);
    }

    fn ensure_in_bounds(&mut self) {
        let len = self.displayed().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

/// Create or edit, decided by whether an id came with the route.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum FormMode {
    Create,
    Edit(i64),
}

pub(crate) struct FormScreen {
    pub(crate) mode: FormMode,
    pub(crate) form: TeacherForm,
    pub(crate) loading: bool,
}

impl FormScreen {
    pub(crate) fn open(id: Option<i64>) -> (Self, Vec<Effect>) {
        match id {
            Some(id) => (
                Self {
                    mode: FormMode::Edit(id),
                    form: TeacherForm::default(),
                    loading: true,
                },
                vec![Effect::Request(Request::LoadTeacher(id))],
            ),
            None => (
                Self {
                    mode: FormMode::Create,
                    form: TeacherForm::default(),
                    loading: false,
                },
                Vec::new(),
            ),
        }
    }

    pub(crate) fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add Teacher",
            FormMode::Edit(_) => "Edit Teacher",
        }
    }

    /// Send the record when every field passes; otherwise reveal all inline
    /// errors.
    pub(crate) fn submit(&mut self, today: NaiveDate) -> Vec<Effect> {
        if self.loading {
            return Vec::new();
        }
        match self.form.to_teacher(today) {
            Ok(teacher) => {
                self.loading = true;
                let request = match self.mode {
                    FormMode::Create => Request::Create(teacher),
                    FormMode::Edit(id) => Request::Update(id, teacher),
                };
                vec![Effect::Request(request)]
            }
            Err(_) => {
                self.form.mark_all_touched();
                vec![notify(
                    "Please correct the errors in the form",
                    NoticeKind::Error,
                )]
            }
        }
    }

    pub(crate) fn cancel(&self) -> Vec<Effect> {
        vec![Effect::Navigate(Route::Teachers)]
    }

    pub(crate) fn reset(&mut self) {
        self.form.reset();
    }

    pub(crate) fn on_completion(&mut self, completion: Completion) -> Vec<Effect> {
        self.loading = false;
        match completion.result {
            Ok(Response::Teacher(teacher)) => {
                self.form = TeacherForm::from_teacher(&teacher);
                Vec::new()
            }
            Ok(Response::Created(_)) => vec![
                notify("Teacher added successfully!", NoticeKind::Success),
                Effect::Navigate(Route::Teachers),
            ],
            Ok(Response::Updated(_)) => vec![
                notify("Teacher updated successfully!", NoticeKind::Success),
                Effect::Navigate(Route::Teachers),
            ],
            Ok(_) => Vec::new(),
            Err(err) => match completion.request {
                Request::LoadTeacher(id) => {
                    error!(id, "Error loading teacher: {err}");
                    vec![
                        notify("Error loading teacher data", NoticeKind::Error),
                        Effect::Navigate(Route::Teachers),
                    ]
                }
                Request::Create(_) => {
                    error!("Error creating teacher: {err}");
                    vec![notify("Error creating teacher", NoticeKind::Error)]
                }
                Request::Update(..) => {
                    error!("Error updating teacher: {err}");
                    vec![notify("Error updating teacher", NoticeKind::Error)]
                }
                _ => {
                    warn!("form: unexpected failure: {err}");
                    Vec::new()
                }
            },
        }
    }
}
