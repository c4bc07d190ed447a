use std::fmt;

/// Addressable screens. Anything that does not parse lands on `Home`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Teachers,
    AddTeacher,
    EditTeacher(i64),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim().trim_matches('/');
        let mut segments = trimmed.split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(""), None, None) | (Some("home"), None, None) => Route::Home,
            (Some("teachers"), None, None) => Route::Teachers,
            (Some("add-teacher"), None, None) => Route::AddTeacher,
            (Some("edit-teacher"), Some(id), None) => id
                .parse()
                .map(Route::EditTeacher)
                .unwrap_or(Route::Home),
            _ => Route::Home,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/home"),
            Route::Teachers => write!(f, "/teachers"),
            Route::AddTeacher => write!(f, "/add-teacher"),
            Route::EditTeacher(id) => write!(f, "/edit-teacher/{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_paths() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/home"), Route::Home);
        assert_eq!(Route::parse("/teachers"), Route::Teachers);
        assert_eq!(Route::parse("/add-teacher"), Route::AddTeacher);
        assert_eq!(Route::parse("/edit-teacher/3"), Route::EditTeacher(3));
        assert_eq!(Route::parse("teachers/"), Route::Teachers);
    }

    #[test]
    fn unknown_paths_redirect_home() {
        assert_eq!(Route::parse("/nope"), Route::Home);
        assert_eq!(Route::parse("/edit-teacher"), Route::Home);
        assert_eq!(Route::parse("/edit-teacher/abc"), Route::Home);
        assert_eq!(Route::parse("/teachers/3/extra"), Route::Home);
    }

    #[test]
    fn display_round_trips() {
        for route in [Route::Home, Route::Teachers, Route::AddTeacher, Route::EditTeacher(9)] {
            assert_eq!(Route::parse(&route.to_string()), route);
        }
    }
}
