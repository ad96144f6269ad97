use crate::error::AdminError;
use crate::form::Form;
use crate::types::{
    InvoicePage, Movie, Page, ReportLine, Resource, Room, Showtime, User, ValidationErrors,
};

/// One fetched page, tagged with the list it belongs to
#[derive(Debug, Clone)]
pub enum Listing {
    Movies(Page<Movie>),
    Rooms(Page<Room>),
    Showtimes(Page<Showtime>),
    Invoices(InvoicePage),
    Reports(Page<ReportLine>),
    Users(Page<User>),
}

impl Listing {
    pub fn resource(&self) -> Resource {
        match self {
            Listing::Movies(_) => Resource::Movies,
            Listing::Rooms(_) => Resource::Rooms,
            Listing::Showtimes(_) => Resource::Showtimes,
            Listing::Invoices(_) => Resource::Invoices,
            Listing::Reports(_) => Resource::Reports,
            Listing::Users(_) => Resource::Users,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    Start,
    Tick,
    Quit,
    Back,
    ScrollUp,
    ScrollDown,
    Select,

    // Navigation
    OpenList(Resource),
    OpenProfile,

    // Pagination
    NextPage,
    PrevPage,
    CyclePageSize,
    Refresh,
    PageLoaded {
        seq: u64,
        listing: Listing,
    },
    PageFailed {
        resource: Resource,
        seq: u64,
        error: String,
    },

    // Search
    EnterSearchMode,
    ExitSearchMode,
    SearchInput(char),
    SearchBackspace,
    ClearSearch,

    // Delete
    RequestDelete,
    ConfirmYes,
    ConfirmNo,
    Deleted {
        resource: Resource,
        message: String,
    },
    DeleteFailed {
        resource: Resource,
        error: String,
    },

    // Forms
    NewRecord,
    EditRecord,
    ChangePassword,
    FormReady(Box<Form>),
    FormLoadFailed(String),
    FormNext,
    FormPrev,
    FormInput(char),
    FormBackspace,
    FormCycle(bool),
    SubmitForm,
    Saved {
        resource: Resource,
        message: String,
        /// Set when the record was saved but a follow-up step failed
        warning: Option<String>,
    },
    PasswordChanged(String),
    ValidationFailed(ValidationErrors),
    SubmitFailed(String),

    // Session
    SessionLoaded(Box<User>),

    // Movies
    OpenTrailer,
    YankUrl,

    AcknowledgeNotification,
    Error(String),
    None,
}

impl From<AdminError> for Action {
    fn from(err: AdminError) -> Self {
        Action::Error(err.to_string())
    }
}
