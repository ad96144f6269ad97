use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A record shown in a list view, identified by its backend id.
pub trait Row {
    fn id(&self) -> &str;
    /// Short human label, used in confirmations and headers.
    fn label(&self) -> &str;
}

/// REST collection backing a list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Movies,
    Rooms,
    Showtimes,
    Invoices,
    Reports,
    Users,
}

impl Resource {
    /// Collection path segment on the backend.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Movies => "peliculas",
            Resource::Rooms => "salas",
            Resource::Showtimes => "horarios",
            Resource::Invoices => "facturas",
            Resource::Reports => "reportes",
            Resource::Users => "usuarios",
        }
    }

    pub fn is_deletable(&self) -> bool {
        matches!(self, Resource::Movies | Resource::Rooms | Resource::Users)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Movies => write!(f, "Movies"),
            Resource::Rooms => write!(f, "Rooms"),
            Resource::Showtimes => write!(f, "Showtimes"),
            Resource::Invoices => write!(f, "Invoices"),
            Resource::Reports => write!(f, "Reports"),
            Resource::Users => write!(f, "Users"),
        }
    }
}

/// One page of a collection as returned by the backend
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub docs: Vec<T>,
    #[serde(rename = "totalDocs", default)]
    pub total_docs: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            docs: Vec::new(),
            total_docs: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub param: String,
    pub msg: String,
}

/// Field-level rejection of a create/update request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub message: String,
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn for_field(&self, param: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|e| e.param == param)
            .map(|e| e.msg.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "Validation failed")
        } else {
            write!(f, "{}", self.message)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Administrador")]
    Admin,
    #[serde(rename = "Gerente")]
    Manager,
}

impl Role {
    /// Roles a user with this role may assign to others.
    pub fn assignable(role: Option<Role>) -> Vec<Role> {
        match role {
            Some(Role::Admin) => vec![Role::Admin, Role::Manager],
            _ => vec![Role::Manager],
        }
    }

    pub fn as_api_str(&self) -> &'static str {
        match self {
            Role::Admin => "Administrador",
            Role::Manager => "Gerente",
        }
    }

    pub fn from_api_str(s: &str) -> Option<Role> {
        match s {
            "Administrador" => Some(Role::Admin),
            "Gerente" => Some(Role::Manager),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "Administrator"),
            Role::Manager => write!(f, "Manager"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "codigo", default)]
    pub code: Option<String>,
    #[serde(rename = "horas", default)]
    pub hours: u32,
    #[serde(rename = "minutos", default)]
    pub minutes: u32,
    #[serde(rename = "detalle", default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub trailer: Option<String>,
}

impl Row for Movie {
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "filas", default)]
    pub rows: u32,
    #[serde(rename = "columnas", default)]
    pub columns: u32,
}

impl Row for Room {
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomRef {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieRef {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "codigo", default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Showtime {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "precio", default)]
    pub price: f64,
    #[serde(rename = "horaInicio", default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(rename = "horaFin", default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(rename = "sala", default)]
    pub room: RoomRef,
    #[serde(rename = "pelicula", default)]
    pub movie: MovieRef,
}

impl Row for Showtime {
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        self.room.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(default)]
    pub nit: Option<String>,
    #[serde(rename = "correo", default)]
    pub email: Option<String>,
    #[serde(default)]
    pub total: f64,
    #[serde(rename = "butacas", default)]
    pub seats: Vec<serde_json::Value>,
}

impl Row for Invoice {
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
}

/// Sales summary of one movie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportLine {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "horariosFuturos", default)]
    pub upcoming_showtimes: u64,
    #[serde(rename = "horariosPasados", default)]
    pub past_showtimes: u64,
    #[serde(rename = "totalButacas", default)]
    pub total_seats: u64,
    #[serde(rename = "totalButacasVendidas", default)]
    pub seats_sold: u64,
    #[serde(rename = "totalEsperado", default)]
    pub expected_total: f64,
    #[serde(rename = "totalRecaudado", default)]
    pub collected_total: f64,
}

impl Row for ReportLine {
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "apellido", default)]
    pub last_name: Option<String>,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "direccion", default)]
    pub address: Option<String>,
    #[serde(rename = "usuario", default)]
    pub username: String,
    #[serde(rename = "rol", default)]
    pub role: Option<Role>,
}

impl User {
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.name, last),
            _ => self.name.clone(),
        }
    }
}

impl Row for User {
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.username
    }
}

/// Showtime header plus one page of its invoices
#[derive(Debug, Clone, Deserialize)]
pub struct InvoicePage {
    #[serde(rename = "horario")]
    pub showtime: Showtime,
    #[serde(rename = "facturas")]
    pub invoices: Page<Invoice>,
}

/// Body of a movie create/update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDraft {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "codigo")]
    pub code: Option<String>,
    #[serde(rename = "horas")]
    pub hours: u32,
    #[serde(rename = "minutos")]
    pub minutes: u32,
    #[serde(rename = "detalle")]
    pub synopsis: Option<String>,
    pub trailer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomDraft {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "filas")]
    pub rows: u32,
    #[serde(rename = "columnas")]
    pub columns: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDraft {
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "apellido")]
    pub last_name: Option<String>,
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "direccion")]
    pub address: Option<String>,
    #[serde(rename = "usuario")]
    pub username: Option<String>,
    #[serde(rename = "clave")]
    pub password: Option<String>,
    #[serde(rename = "rol")]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PasswordChange {
    #[serde(rename = "clave")]
    pub password: Option<String>,
}

/// Result of a successful create/update
#[derive(Debug, Clone)]
pub struct Saved<T> {
    pub message: String,
    pub record: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_decodes_backend_field_names() {
        let page: Page<Movie> = serde_json::from_str(
            r#"{"docs":[{"_id":"a","nombre":"Foo","horas":1,"minutos":5}],"totalDocs":1}"#,
        )
        .unwrap();
        assert_eq!(page.total_docs, 1);
        assert_eq!(page.docs[0].id, "a");
        assert_eq!(page.docs[0].name, "Foo");
        assert_eq!(page.docs[0].minutes, 5);
        assert!(page.docs[0].trailer.is_none());
    }

    #[test]
    fn invoice_page_decodes_nested_showtime() {
        let json = r#"{
            "horario": {
                "_id": "h1",
                "precio": 35.5,
                "horaInicio": "2022-11-05T19:30:00.000Z",
                "sala": {"_id": "s1", "nombre": "Sala 1"},
                "pelicula": {"_id": "p1", "nombre": "Foo", "codigo": "F01"}
            },
            "facturas": {
                "docs": [{"_id": "f1", "nombre": "Ana", "total": 71, "butacas": [{"fila": 1}, {"fila": 2}]}],
                "totalDocs": 1
            }
        }"#;
        let page: InvoicePage = serde_json::from_str(json).unwrap();
        assert_eq!(page.showtime.room.name.as_deref(), Some("Sala 1"));
        assert!(page.showtime.starts_at.is_some());
        assert!(page.showtime.ends_at.is_none());
        assert_eq!(page.invoices.docs[0].seats.len(), 2);
    }

    #[test]
    fn role_uses_backend_names() {
        let user: User =
            serde_json::from_str(r#"{"_id":"u","nombre":"Ana","usuario":"ana","rol":"Gerente"}"#)
                .unwrap();
        assert_eq!(user.role, Some(Role::Manager));
        assert_eq!(
            serde_json::to_string(&Role::Admin).unwrap(),
            "\"Administrador\""
        );
    }

    #[test]
    fn only_admins_assign_admin() {
        assert_eq!(
            Role::assignable(Some(Role::Admin)),
            vec![Role::Admin, Role::Manager]
        );
        assert_eq!(Role::assignable(Some(Role::Manager)), vec![Role::Manager]);
        assert_eq!(Role::assignable(None), vec![Role::Manager]);
    }

    #[test]
    fn validation_errors_lookup_by_param() {
        let errors = ValidationErrors {
            message: "Datos inválidos".to_string(),
            fields: vec![FieldError {
                param: "nombre".to_string(),
                msg: "Requerido".to_string(),
            }],
        };
        assert_eq!(errors.for_field("nombre"), Some("Requerido"));
        assert_eq!(errors.for_field("codigo"), None);
        assert_eq!(errors.to_string(), "Datos inválidos");
    }

    #[test]
    fn blank_user_password_serializes_as_null() {
        let draft = UserDraft {
            name: Some("Ana".to_string()),
            last_name: None,
            phone: None,
            email: None,
            address: None,
            username: Some("ana".to_string()),
            password: None,
            role: Some(Role::Manager),
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert!(value["clave"].is_null());
        assert_eq!(value["rol"], "Gerente");
        assert_eq!(value["usuario"], "ana");
    }
}
