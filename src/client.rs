use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::backend::Backend;
use crate::error::{AdminError, Result};
use crate::format::truncate;
use crate::list_view::PageQuery;
use crate::types::{
    FieldError, InvoicePage, Movie, MovieDraft, Page, PasswordChange, ReportLine, Resource, Room,
    RoomDraft, Saved, Showtime, User, UserDraft, ValidationErrors,
};

/// HTTP client for the ticketing REST API.
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn record_url(&self, resource: &str, id: &str) -> String {
        self.url(&format!("{}/{}", resource, urlencoding::encode(id)))
    }

    async fn send<T: DeserializeOwned + Send>(
        &self,
        request: RequestBuilder,
    ) -> Result<(String, Option<T>)> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode(status, &body)
    }

    async fn get_page<T: DeserializeOwned + Send>(&self, url: &str, query: &PageQuery) -> Result<T> {
        tracing::debug!(
            url,
            page = query.page,
            limit = query.limit,
            offset = query.offset(),
            search = %query.search,
            "GET"
        );
        let request = self.client.get(url).query(&[
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
            ("buscar", query.search.clone()),
        ]);
        let (_, data) = self.send(request).await?;
        data.ok_or_else(|| AdminError::Api("Response carried no data".to_string()))
    }

    async fn get_data<T: DeserializeOwned + Send>(&self, url: &str) -> Result<T> {
        tracing::debug!(url, "GET");
        let (_, data) = self.send(self.client.get(url)).await?;
        data.ok_or_else(|| AdminError::Api("Response carried no data".to_string()))
    }

    /// POST to the collection when `id` is None, PATCH the record otherwise.
    async fn save<B: Serialize + Sync, T: DeserializeOwned + Send>(
        &self,
        resource: &str,
        id: Option<&str>,
        body: &B,
    ) -> Result<(String, Option<T>)> {
        let request = match id {
            Some(id) => {
                let url = self.record_url(resource, id);
                tracing::debug!(url = %url, "PATCH");
                self.client.patch(url)
            }
            None => {
                let url = self.url(resource);
                tracing::debug!(url = %url, "POST");
                self.client.post(url)
            }
        };
        self.send(request.json(body)).await
    }
}

// Response envelope: {error, mensaje, datos}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    mensaje: String,
    datos: Option<T>,
}

#[derive(Deserialize)]
struct ErrorBody {
    mensaje: Option<String>,
    #[serde(default)]
    datos: serde_json::Value,
}

#[derive(Deserialize)]
struct MovieData {
    pelicula: Movie,
}

#[derive(Deserialize)]
struct RoomData {
    sala: Room,
}

#[derive(Deserialize)]
struct UserData {
    usuario: User,
}

/// Turn a response into `(message, data)` or the matching error.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<(String, Option<T>)> {
    if !status.is_success() {
        return Err(failure(status, body));
    }
    let envelope: Envelope<serde_json::Value> = serde_json::from_str(body)
        .map_err(|e| AdminError::Api(format!("Malformed response: {}", e)))?;
    if envelope.error {
        return Err(failure(status, body));
    }
    let data = match envelope.datos {
        None | Some(serde_json::Value::Null) => None,
        Some(value) => Some(
            serde_json::from_value(value)
                .map_err(|e| AdminError::Api(format!("Unexpected response data: {}", e)))?,
        ),
    };
    Ok((envelope.mensaje, data))
}

fn failure(status: StatusCode, body: &str) -> AdminError {
    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        let text = if body.trim().is_empty() {
            status.to_string()
        } else {
            format!("{}: {}", status, truncate(body.trim(), 200))
        };
        return AdminError::Api(text);
    };

    let message = parsed
        .mensaje
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.to_string());

    if status == StatusCode::UNAUTHORIZED {
        return AdminError::Auth(message);
    }

    match serde_json::from_value::<Vec<FieldError>>(parsed.datos) {
        Ok(fields) if !fields.is_empty() => {
            AdminError::Validation(ValidationErrors { message, fields })
        }
        _ => AdminError::Api(message),
    }
}

fn image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl Backend for ApiClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn current_user(&self) -> Result<User> {
        let data: UserData = self.get_data(&self.url("autenticar")).await?;
        Ok(data.usuario)
    }

    async fn list_movies(&self, query: &PageQuery) -> Result<Page<Movie>> {
        self.get_page(&self.url(Resource::Movies.path()), query).await
    }

    async fn list_rooms(&self, query: &PageQuery) -> Result<Page<Room>> {
        self.get_page(&self.url(Resource::Rooms.path()), query).await
    }

    async fn list_showtimes(&self, movie_id: &str, query: &PageQuery) -> Result<Page<Showtime>> {
        let url = self.record_url(Resource::Showtimes.path(), movie_id);
        self.get_page(&url, query).await
    }

    async fn list_invoices(&self, showtime_id: &str, query: &PageQuery) -> Result<InvoicePage> {
        let url = self.record_url(Resource::Invoices.path(), showtime_id);
        self.get_page(&url, query).await
    }

    async fn list_reports(&self, query: &PageQuery) -> Result<Page<ReportLine>> {
        self.get_page(&self.url(Resource::Reports.path()), query).await
    }

    async fn list_users(&self, query: &PageQuery) -> Result<Page<User>> {
        self.get_page(&self.url(Resource::Users.path()), query).await
    }

    async fn delete(&self, resource: Resource, id: &str) -> Result<String> {
        let url = self.record_url(resource.path(), id);
        tracing::debug!(url = %url, "DELETE");
        let (message, _) = self
            .send::<serde_json::Value>(self.client.delete(url))
            .await?;
        Ok(message)
    }

    async fn get_movie(&self, id: &str) -> Result<Movie> {
        let data: MovieData = self
            .get_data(&self.record_url(Resource::Movies.path(), id))
            .await?;
        Ok(data.pelicula)
    }

    async fn save_movie(&self, id: Option<&str>, draft: &MovieDraft) -> Result<Saved<Movie>> {
        let (message, data): (String, Option<MovieData>) =
            self.save(Resource::Movies.path(), id, draft).await?;
        // The poster upload needs the saved record's id.
        let data = data.ok_or_else(|| AdminError::Api("Response carried no data".to_string()))?;
        Ok(Saved {
            message,
            record: data.pelicula,
        })
    }

    async fn upload_movie_image(&self, id: &str, path: &Path) -> Result<()> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "imagen".to_string());
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(image_mime(path))?;
        let form = reqwest::multipart::Form::new().part("imagen", part);

        let url = self.url(&format!(
            "{}/{}/imagen",
            Resource::Movies.path(),
            urlencoding::encode(id)
        ));
        tracing::debug!(url = %url, path = %path.display(), "POST multipart");
        self.send::<serde_json::Value>(self.client.post(url).multipart(form))
            .await?;
        Ok(())
    }

    async fn get_room(&self, id: &str) -> Result<Room> {
        let data: RoomData = self
            .get_data(&self.record_url(Resource::Rooms.path(), id))
            .await?;
        Ok(data.sala)
    }

    async fn save_room(&self, id: Option<&str>, draft: &RoomDraft) -> Result<String> {
        let (message, _): (String, Option<serde_json::Value>) =
            self.save(Resource::Rooms.path(), id, draft).await?;
        Ok(message)
    }

    async fn get_user(&self, id: &str) -> Result<User> {
        let data: UserData = self
            .get_data(&self.record_url(Resource::Users.path(), id))
            .await?;
        Ok(data.usuario)
    }

    async fn save_user(&self, id: Option<&str>, draft: &UserDraft) -> Result<String> {
        let (message, _): (String, Option<serde_json::Value>) =
            self.save(Resource::Users.path(), id, draft).await?;
        Ok(message)
    }

    async fn change_password(&self, user_id: &str, change: &PasswordChange) -> Result<String> {
        let url = self.record_url("autenticar", user_id);
        tracing::debug!(url = %url, "PATCH");
        let (message, _) = self
            .send::<serde_json::Value>(self.client.patch(url).json(change))
            .await?;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_list_envelope() {
        let body = r#"{"error":false,"mensaje":"","datos":{"docs":[{"_id":"a","nombre":"Foo"}],"totalDocs":1}}"#;
        let (_, data): (String, Option<Page<Movie>>) = decode(StatusCode::OK, body).unwrap();
        let page = data.unwrap();
        assert_eq!(page.total_docs, 1);
        assert_eq!(page.docs[0].name, "Foo");
    }

    #[test]
    fn decode_message_without_data() {
        let body = r#"{"error":false,"mensaje":"Registro eliminado","datos":null}"#;
        let (message, data): (String, Option<serde_json::Value>) =
            decode(StatusCode::OK, body).unwrap();
        assert_eq!(message, "Registro eliminado");
        assert!(data.is_none());
    }

    #[test]
    fn validation_errors_are_keyed_by_param() {
        let body = r#"{"error":true,"mensaje":"Datos inválidos","datos":[
            {"param":"nombre","msg":"El nombre es requerido"},
            {"param":"horas","msg":"Debe ser un número"}]}"#;
        let err = decode::<serde_json::Value>(StatusCode::BAD_REQUEST, body).unwrap_err();
        let AdminError::Validation(errors) = err else {
            panic!("expected validation error, got {:?}", err);
        };
        assert_eq!(errors.message, "Datos inválidos");
        assert_eq!(errors.for_field("nombre"), Some("El nombre es requerido"));
        assert_eq!(errors.for_field("horas"), Some("Debe ser un número"));
    }

    #[test]
    fn error_flag_fails_even_with_ok_status() {
        let body = r#"{"error":true,"mensaje":"No se pudo eliminar","datos":null}"#;
        let err = decode::<serde_json::Value>(StatusCode::OK, body).unwrap_err();
        assert_eq!(err.to_string(), "API error: No se pudo eliminar");
    }

    #[test]
    fn unauthorized_maps_to_auth() {
        let body = r#"{"error":true,"mensaje":"Token inválido"}"#;
        let err = decode::<serde_json::Value>(StatusCode::UNAUTHORIZED, body).unwrap_err();
        assert!(matches!(err, AdminError::Auth(m) if m == "Token inválido"));
    }

    #[test]
    fn non_json_failure_keeps_status() {
        let err = decode::<serde_json::Value>(StatusCode::BAD_GATEWAY, "").unwrap_err();
        assert_eq!(err.to_string(), "API error: 502 Bad Gateway");
        let err = decode::<serde_json::Value>(StatusCode::NOT_FOUND, "<html>nope</html>")
            .unwrap_err();
        assert_eq!(err.to_string(), "API error: 404 Not Found: <html>nope</html>");
    }

    #[test]
    fn urls_join_base_and_encode_ids() {
        let client = ApiClient::new("http://localhost:4000/api/".to_string(), "t".to_string());
        assert_eq!(
            client.url("peliculas"),
            "http://localhost:4000/api/peliculas"
        );
        assert_eq!(
            client.record_url("salas", "a b/c"),
            "http://localhost:4000/api/salas/a%20b%2Fc"
        );
    }

    /// Answer a single HTTP request with `body` and return the base URL.
    async fn serve_once(body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{}/api/", addr)
    }

    fn user_draft() -> UserDraft {
        UserDraft {
            name: Some("Ana".to_string()),
            last_name: None,
            phone: None,
            email: None,
            address: None,
            username: Some("ana".to_string()),
            password: None,
            role: None,
        }
    }

    #[tokio::test]
    async fn user_save_needs_only_a_message() {
        let base = serve_once(r#"{"error":false,"mensaje":"Usuario actualizado"}"#).await;
        let client = ApiClient::new(base, "t".to_string());
        let message = client.save_user(Some("u1"), &user_draft()).await.unwrap();
        assert_eq!(message, "Usuario actualizado");
    }

    #[tokio::test]
    async fn room_save_ignores_returned_record() {
        let base = serve_once(
            r#"{"error":false,"mensaje":"Sala creada","datos":{"sala":{"_id":"r1"}}}"#,
        )
        .await;
        let client = ApiClient::new(base, "t".to_string());
        let draft = RoomDraft {
            name: Some("Sala 1".to_string()),
            rows: 5,
            columns: 8,
        };
        assert_eq!(client.save_room(None, &draft).await.unwrap(), "Sala creada");
    }

    #[tokio::test]
    async fn movie_save_without_record_fails() {
        let base = serve_once(r#"{"error":false,"mensaje":"Pelicula creada"}"#).await;
        let client = ApiClient::new(base, "t".to_string());
        let draft = MovieDraft {
            name: Some("Foo".to_string()),
            code: None,
            hours: 1,
            minutes: 30,
            synopsis: None,
            trailer: None,
        };
        let err = client.save_movie(None, &draft).await.unwrap_err();
        assert_eq!(err.to_string(), "API error: Response carried no data");
    }

    #[test]
    fn image_mime_by_extension() {
        assert_eq!(image_mime(Path::new("poster.JPG")), "image/jpeg");
        assert_eq!(image_mime(Path::new("poster.png")), "image/png");
        assert_eq!(image_mime(Path::new("poster")), "application/octet-stream");
    }
}
