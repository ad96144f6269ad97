use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::list_view::PageQuery;
use crate::types::{
    InvoicePage, Movie, MovieDraft, Page, PasswordChange, ReportLine, Resource, Room, RoomDraft,
    Saved, Showtime, User, UserDraft,
};

/// Operations the admin screens need from the ticketing backend.
#[async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// Root every resource path is resolved against.
    fn base_url(&self) -> &str;

    async fn current_user(&self) -> Result<User>;

    async fn list_movies(&self, query: &PageQuery) -> Result<Page<Movie>>;
    async fn list_rooms(&self, query: &PageQuery) -> Result<Page<Room>>;
    async fn list_showtimes(&self, movie_id: &str, query: &PageQuery) -> Result<Page<Showtime>>;
    async fn list_invoices(&self, showtime_id: &str, query: &PageQuery) -> Result<InvoicePage>;
    async fn list_reports(&self, query: &PageQuery) -> Result<Page<ReportLine>>;
    async fn list_users(&self, query: &PageQuery) -> Result<Page<User>>;

    /// Delete one record; yields the backend's confirmation message.
    async fn delete(&self, resource: Resource, id: &str) -> Result<String>;

    async fn get_movie(&self, id: &str) -> Result<Movie>;
    async fn save_movie(&self, id: Option<&str>, draft: &MovieDraft) -> Result<Saved<Movie>>;
    async fn upload_movie_image(&self, id: &str, path: &Path) -> Result<()>;

    async fn get_room(&self, id: &str) -> Result<Room>;
    /// Create or update a room; yields the backend's message.
    async fn save_room(&self, id: Option<&str>, draft: &RoomDraft) -> Result<String>;

    async fn get_user(&self, id: &str) -> Result<User>;
    async fn save_user(&self, id: Option<&str>, draft: &UserDraft) -> Result<String>;

    /// Change the signed-in user's password; yields the backend's message.
    async fn change_password(&self, user_id: &str, change: &PasswordChange) -> Result<String>;
}
