use std::path::{Path, PathBuf};

use crate::types::{
    FieldError, Movie, MovieDraft, PasswordChange, Role, Room, RoomDraft, User, UserDraft,
    ValidationErrors,
};

/// Largest poster accepted for upload.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Secret,
    Choice(Vec<Choice>),
    /// Local file path
    File,
}

#[derive(Debug, Clone)]
pub struct Field {
    /// Backend parameter name; validation errors are matched on it.
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub kind: FieldKind,
}

impl Field {
    fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            value: String::new(),
            kind,
        }
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn display_value(&self) -> String {
        match &self.kind {
            FieldKind::Secret => "*".repeat(self.value.chars().count()),
            FieldKind::Choice(choices) => choices
                .iter()
                .find(|c| c.value == self.value)
                .map(|c| c.display.clone())
                .unwrap_or_else(|| self.value.clone()),
            _ => self.value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    Movie { id: Option<String> },
    Room { id: Option<String> },
    User { id: Option<String> },
    Password { user_id: String },
}

/// Validated form content, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Movie {
        id: Option<String>,
        draft: MovieDraft,
        image: Option<PathBuf>,
    },
    Room {
        id: Option<String>,
        draft: RoomDraft,
    },
    User {
        id: Option<String>,
        draft: UserDraft,
    },
    Password {
        user_id: String,
        change: PasswordChange,
    },
}

#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<Field>,
    pub focus: usize,
    pub errors: ValidationErrors,
    pub submitting: bool,
}

impl Form {
    fn new(kind: FormKind, fields: Vec<Field>) -> Self {
        Self {
            kind,
            fields,
            focus: 0,
            errors: ValidationErrors::default(),
            submitting: false,
        }
    }

    pub fn movie(movie: Option<&Movie>) -> Self {
        let text = |v: Option<&String>| v.cloned().unwrap_or_default();
        let fields = vec![
            Field::new("nombre", "Name", FieldKind::Text)
                .with_value(movie.map(|m| m.name.clone()).unwrap_or_default()),
            Field::new("codigo", "Code", FieldKind::Text)
                .with_value(text(movie.and_then(|m| m.code.as_ref()))),
            Field::new("horas", "Hours", FieldKind::Number)
                .with_value(movie.map_or(2, |m| m.hours).to_string()),
            Field::new("minutos", "Minutes", FieldKind::Number)
                .with_value(movie.map_or(0, |m| m.minutes).to_string()),
            Field::new("detalle", "Synopsis", FieldKind::Text)
                .with_value(text(movie.and_then(|m| m.synopsis.as_ref()))),
            Field::new("trailer", "Trailer (YouTube id)", FieldKind::Text)
                .with_value(text(movie.and_then(|m| m.trailer.as_ref()))),
            Field::new("imagen", "Image file", FieldKind::File),
        ];
        Self::new(
            FormKind::Movie {
                id: movie.map(|m| m.id.clone()),
            },
            fields,
        )
    }

    pub fn room(room: Option<&Room>) -> Self {
        let fields = vec![
            Field::new("nombre", "Name", FieldKind::Text)
                .with_value(room.map(|r| r.name.clone()).unwrap_or_default()),
            Field::new("filas", "Rows", FieldKind::Number)
                .with_value(room.map(|r| r.rows.to_string()).unwrap_or_default()),
            Field::new("columnas", "Columns", FieldKind::Number)
                .with_value(room.map(|r| r.columns.to_string()).unwrap_or_default()),
        ];
        Self::new(
            FormKind::Room {
                id: room.map(|r| r.id.clone()),
            },
            fields,
        )
    }

    /// User form; the role choices depend on who is signed in.
    pub fn user(user: Option<&User>, signed_in: Option<Role>) -> Self {
        let assignable = Role::assignable(signed_in);
        let choices = assignable
            .iter()
            .map(|r| Choice {
                value: r.as_api_str().to_string(),
                display: r.to_string(),
            })
            .collect();
        let role = match user {
            Some(u) => u.role,
            None => signed_in.filter(|r| assignable.contains(r)),
        }
        .unwrap_or(assignable[0]);

        let text = |v: Option<&String>| v.cloned().unwrap_or_default();
        let fields = vec![
            Field::new("nombre", "Name", FieldKind::Text)
                .with_value(user.map(|u| u.name.clone()).unwrap_or_default()),
            Field::new("apellido", "Last name", FieldKind::Text)
                .with_value(text(user.and_then(|u| u.last_name.as_ref()))),
            Field::new("telefono", "Phone", FieldKind::Text)
                .with_value(text(user.and_then(|u| u.phone.as_ref()))),
            Field::new("email", "Email", FieldKind::Text)
                .with_value(text(user.and_then(|u| u.email.as_ref()))),
            Field::new("direccion", "Address", FieldKind::Text)
                .with_value(text(user.and_then(|u| u.address.as_ref()))),
            Field::new("usuario", "Username", FieldKind::Text)
                .with_value(user.map(|u| u.username.clone()).unwrap_or_default()),
            Field::new("clave", "Password", FieldKind::Secret),
            Field::new("rol", "Role", FieldKind::Choice(choices)).with_value(role.as_api_str()),
        ];
        Self::new(
            FormKind::User {
                id: user.map(|u| u.id.clone()),
            },
            fields,
        )
    }

    pub fn password(user_id: impl Into<String>) -> Self {
        Self::new(
            FormKind::Password {
                user_id: user_id.into(),
            },
            vec![Field::new("clave", "New password", FieldKind::Secret)],
        )
    }

    pub fn title(&self) -> String {
        let verb = |id: &Option<String>| if id.is_some() { "Edit" } else { "New" };
        match &self.kind {
            FormKind::Movie { id } => format!("{} movie", verb(id)),
            FormKind::Room { id } => format!("{} room", verb(id)),
            FormKind::User { id } => format!("{} user", verb(id)),
            FormKind::Password { .. } => "Change password".to_string(),
        }
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn input(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            match field.kind {
                FieldKind::Choice(_) => {}
                FieldKind::Number if !c.is_ascii_digit() => {}
                _ => field.value.push(c),
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if !matches!(field.kind, FieldKind::Choice(_)) {
                field.value.pop();
            }
        }
    }

    pub fn cycle_choice(&mut self, forward: bool) {
        let Some(field) = self.fields.get_mut(self.focus) else {
            return;
        };
        let FieldKind::Choice(choices) = &field.kind else {
            return;
        };
        if choices.is_empty() {
            return;
        }
        let len = choices.len();
        let next = match choices.iter().position(|c| c.value == field.value) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        field.value = choices[next].value.clone();
    }

    pub fn error_for(&self, key: &str) -> Option<&str> {
        self.errors.for_field(key)
    }

    /// Check what can be checked locally and build the request content.
    pub fn submission(&self) -> Result<Submission, ValidationErrors> {
        let mut problems = Vec::new();
        let mut number = |key: &str| -> u32 {
            let raw = self.value(key).trim();
            match raw.parse::<u32>() {
                Ok(n) => n,
                Err(_) => {
                    problems.push(FieldError {
                        param: key.to_string(),
                        msg: "Must be a whole number".to_string(),
                    });
                    0
                }
            }
        };

        let submission = match &self.kind {
            FormKind::Movie { id } => {
                let hours = number("horas");
                let minutes = number("minutos");
                Submission::Movie {
                    id: id.clone(),
                    draft: MovieDraft {
                        name: self.optional("nombre"),
                        code: self.optional("codigo"),
                        hours,
                        minutes,
                        synopsis: self.optional("detalle"),
                        trailer: self.optional("trailer"),
                    },
                    image: self.optional("imagen").map(PathBuf::from),
                }
            }
            FormKind::Room { id } => {
                let rows = number("filas");
                let columns = number("columnas");
                Submission::Room {
                    id: id.clone(),
                    draft: RoomDraft {
                        name: self.optional("nombre"),
                        rows,
                        columns,
                    },
                }
            }
            FormKind::User { id } => Submission::User {
                id: id.clone(),
                draft: UserDraft {
                    name: self.optional("nombre"),
                    last_name: self.optional("apellido"),
                    phone: self.optional("telefono"),
                    email: self.optional("email"),
                    address: self.optional("direccion"),
                    username: self.optional("usuario"),
                    password: self.optional("clave"),
                    role: Role::from_api_str(self.value("rol")),
                },
            },
            FormKind::Password { user_id } => Submission::Password {
                user_id: user_id.clone(),
                change: PasswordChange {
                    password: self.optional("clave"),
                },
            },
        };

        if problems.is_empty() {
            Ok(submission)
        } else {
            Err(ValidationErrors {
                message: "Please fix the highlighted fields".to_string(),
                fields: problems,
            })
        }
    }

    fn optional(&self, key: &str) -> Option<String> {
        let v = self.value(key).trim();
        if v.is_empty() {
            None
        } else {
            Some(v.to_string())
        }
    }
}

/// Reject poster files that are missing or over the upload limit.
pub fn check_image(path: &Path) -> Result<u64, String> {
    let meta = std::fs::metadata(path)
        .map_err(|e| format!("Cannot read image {}: {}", path.display(), e))?;
    if !meta.is_file() {
        return Err(format!("{} is not a file", path.display()));
    }
    if meta.len() > MAX_IMAGE_BYTES {
        return Err("The maximum image size is 5 MB".to_string());
    }
    Ok(meta.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_into(form: &mut Form, key: &str, s: &str) {
        form.focus = form.fields.iter().position(|f| f.key == key).unwrap();
        for c in s.chars() {
            form.input(c);
        }
    }

    #[test]
    fn new_movie_defaults_to_two_hours() {
        let form = Form::movie(None);
        assert_eq!(form.value("horas"), "2");
        assert_eq!(form.value("minutos"), "0");
        assert_eq!(form.title(), "New movie");
    }

    #[test]
    fn movie_submission_sends_nulls_for_blank_fields() {
        let mut form = Form::movie(None);
        type_into(&mut form, "nombre", "Foo");
        let Submission::Movie { id, draft, image } = form.submission().unwrap() else {
            panic!("expected a movie submission");
        };
        assert!(id.is_none());
        assert!(image.is_none());
        assert_eq!(draft.name.as_deref(), Some("Foo"));
        assert!(draft.code.is_none());
        assert_eq!(draft.hours, 2);
    }

    #[test]
    fn number_fields_ignore_non_digits() {
        let mut form = Form::room(None);
        type_into(&mut form, "filas", "1x2");
        assert_eq!(form.value("filas"), "12");
    }

    #[test]
    fn blank_number_is_reported_on_its_field() {
        let mut form = Form::room(None);
        type_into(&mut form, "nombre", "Sala 1");
        type_into(&mut form, "filas", "8");
        let errors = form.submission().unwrap_err();
        assert_eq!(errors.for_field("columnas"), Some("Must be a whole number"));
        assert_eq!(errors.for_field("filas"), None);
    }

    #[test]
    fn manager_can_only_assign_manager() {
        let mut form = Form::user(None, Some(Role::Manager));
        assert_eq!(form.value("rol"), "Gerente");
        form.focus = form.fields.iter().position(|f| f.key == "rol").unwrap();
        form.cycle_choice(true);
        assert_eq!(form.value("rol"), "Gerente");
    }

    #[test]
    fn admin_defaults_to_own_role_and_can_cycle() {
        let mut form = Form::user(None, Some(Role::Admin));
        assert_eq!(form.value("rol"), "Administrador");
        form.focus = form.fields.iter().position(|f| f.key == "rol").unwrap();
        form.cycle_choice(true);
        assert_eq!(form.value("rol"), "Gerente");
        form.cycle_choice(false);
        assert_eq!(form.value("rol"), "Administrador");
        assert_eq!(form.fields[form.focus].display_value(), "Administrator");
    }

    #[test]
    fn editing_user_starts_with_blank_password() {
        let user: User = serde_json::from_str(
            r#"{"_id":"u1","nombre":"Ana","usuario":"ana","rol":"Gerente"}"#,
        )
        .unwrap();
        let form = Form::user(Some(&user), Some(Role::Admin));
        assert_eq!(form.value("clave"), "");
        let Submission::User { id, draft } = form.submission().unwrap() else {
            panic!("expected a user submission");
        };
        assert_eq!(id.as_deref(), Some("u1"));
        assert!(draft.password.is_none());
        assert_eq!(draft.role, Some(Role::Manager));
    }

    #[test]
    fn secret_fields_are_masked() {
        let mut form = Form::password("u1");
        type_into(&mut form, "clave", "hunter2");
        assert_eq!(form.fields[0].display_value(), "*******");
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = Form::room(None);
        form.focus_prev();
        assert_eq!(form.focus, 2);
        form.focus_next();
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn image_size_limit() {
        let dir = std::env::temp_dir();
        let small = dir.join(format!("cine-admin-small-{}.png", std::process::id()));
        std::fs::write(&small, [0u8; 16]).unwrap();
        assert_eq!(check_image(&small), Ok(16));

        let big = dir.join(format!("cine-admin-big-{}.png", std::process::id()));
        let file = std::fs::File::create(&big).unwrap();
        file.set_len(MAX_IMAGE_BYTES + 1).unwrap();
        assert_eq!(
            check_image(&big),
            Err("The maximum image size is 5 MB".to_string())
        );

        assert!(check_image(&dir.join("cine-admin-missing.png")).is_err());
        let _ = std::fs::remove_file(small);
        let _ = std::fs::remove_file(big);
    }
}
