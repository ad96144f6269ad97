use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::action::{Action, Listing};
use crate::auth;
use crate::backend::Backend;
use crate::config::{Config, ListsConfig};
use crate::error::AdminError;
use crate::event::{is_ctrl, Event};
use crate::form::{check_image, Form, FormKind, Submission};
use crate::format;
use crate::grid::GridContext;
use crate::list_view::{FetchRequest, ListControl, ListView, Sequencer};
use crate::notify::{NotificationCenter, Notifier};
use crate::types::{
    Invoice, InvoicePage, Movie, ReportLine, Resource, Role, Room, Row, Showtime, User,
    ValidationErrors,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List(Resource),
    Form,
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
}

pub struct App {
    pub screen: Screen,
    pub mode: InputMode,

    // One view per list; replaced with a fresh one whenever its screen is entered
    pub movies: ListView<Movie>,
    pub rooms: ListView<Room>,
    pub showtimes: ListView<Showtime>,
    pub invoices: ListView<Invoice>,
    pub reports: ListView<ReportLine>,
    pub users: ListView<User>,

    /// Movie whose showtimes are listed
    pub current_movie: Option<Movie>,
    /// Showtime whose invoices are listed
    pub current_showtime: Option<String>,
    /// Header of the invoices screen, from the first successful response
    pub showtime_header: Option<Showtime>,

    pub form: Option<Form>,
    pub session: Option<User>,
    pub notifications: NotificationCenter,
    pub exit_message: Option<String>,
    pub should_quit: bool,

    /// List the profile and forms return to
    last_list: Resource,
    form_return: Screen,
    lists: ListsConfig,
    debounce: Duration,
    sequencer: Sequencer,
    notifier: Notifier,
    backend: Arc<dyn Backend>,
    action_tx: mpsc::UnboundedSender<Action>,
}

fn fresh<R: Row>(
    resource: Resource,
    lists: &ListsConfig,
    debounce: Duration,
    sequencer: &Sequencer,
) -> ListView<R> {
    ListView::new(
        resource,
        lists.page_sizes(resource),
        debounce,
        sequencer.clone(),
    )
}

/// List a form's record belongs to
fn form_resource(kind: &FormKind) -> Option<Resource> {
    match kind {
        FormKind::Movie { .. } => Some(Resource::Movies),
        FormKind::Room { .. } => Some(Resource::Rooms),
        FormKind::User { .. } => Some(Resource::Users),
        FormKind::Password { .. } => None,
    }
}

fn submit_error(err: AdminError) -> Action {
    match err {
        AdminError::Validation(errors) => Action::ValidationFailed(errors),
        other => Action::SubmitFailed(other.to_string()),
    }
}

impl App {
    pub fn new(
        backend: Arc<dyn Backend>,
        config: &Config,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        let lists = config.lists.clone();
        let debounce = config.ui.search_debounce();
        let sequencer = Sequencer::default();
        let (notifications, notifier) =
            NotificationCenter::new(config.ui.notification_duration());

        Self {
            screen: Screen::List(Resource::Movies),
            mode: InputMode::Normal,
            movies: fresh(Resource::Movies, &lists, debounce, &sequencer),
            rooms: fresh(Resource::Rooms, &lists, debounce, &sequencer),
            showtimes: fresh(Resource::Showtimes, &lists, debounce, &sequencer),
            invoices: fresh(Resource::Invoices, &lists, debounce, &sequencer),
            reports: fresh(Resource::Reports, &lists, debounce, &sequencer),
            users: fresh(Resource::Users, &lists, debounce, &sequencer),
            current_movie: None,
            current_showtime: None,
            showtime_header: None,
            form: None,
            session: None,
            notifications,
            exit_message: None,
            should_quit: false,
            last_list: Resource::Movies,
            form_return: Screen::List(Resource::Movies),
            lists,
            debounce,
            sequencer,
            notifier,
            backend,
            action_tx,
        }
    }

    pub fn grid_context(&self) -> GridContext {
        GridContext {
            base_url: self.backend.base_url().to_string(),
        }
    }

    pub fn active_resource(&self) -> Option<Resource> {
        match self.screen {
            Screen::List(resource) => Some(resource),
            _ => None,
        }
    }

    pub fn list(&self, resource: Resource) -> &dyn ListControl {
        match resource {
            Resource::Movies => &self.movies,
            Resource::Rooms => &self.rooms,
            Resource::Showtimes => &self.showtimes,
            Resource::Invoices => &self.invoices,
            Resource::Reports => &self.reports,
            Resource::Users => &self.users,
        }
    }

    fn list_mut(&mut self, resource: Resource) -> &mut dyn ListControl {
        match resource {
            Resource::Movies => &mut self.movies,
            Resource::Rooms => &mut self.rooms,
            Resource::Showtimes => &mut self.showtimes,
            Resource::Invoices => &mut self.invoices,
            Resource::Reports => &mut self.reports,
            Resource::Users => &mut self.users,
        }
    }

    pub fn active_list(&self) -> Option<&dyn ListControl> {
        self.active_resource().map(|r| self.list(r))
    }

    fn session_role(&self) -> Option<Role> {
        self.session.as_ref().and_then(|u| u.role)
    }

    /// Header line: where the user is.
    pub fn breadcrumb(&self) -> String {
        let movie = || {
            self.current_movie
                .as_ref()
                .map(|m| m.name.as_str())
                .unwrap_or("?")
        };
        match self.screen {
            Screen::List(Resource::Showtimes) => format!("Movies › {} › Showtimes", movie()),
            Screen::List(Resource::Invoices) => {
                format!("Movies › {} › Showtimes › Invoices", movie())
            }
            Screen::List(resource) => resource.to_string(),
            Screen::Form => self
                .form
                .as_ref()
                .map(|f| f.title())
                .unwrap_or_default(),
            Screen::Profile => "Profile".to_string(),
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::Start,
            Event::Tick => Action::Tick,
            Event::Key(key) => self.handle_key(key),
            Event::Render => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Esc && self.notifications.is_visible() {
            return Action::AcknowledgeNotification;
        }

        if let Some(list) = self.active_list() {
            let gate = list.delete_gate();
            if gate.is_deleting() {
                return Action::None;
            }
            if gate.is_open() {
                return match key.code {
                    KeyCode::Char('y') => Action::ConfirmYes,
                    KeyCode::Char('n') | KeyCode::Esc => Action::ConfirmNo,
                    _ => Action::None,
                };
            }
        }

        if self.mode == InputMode::Search {
            return self.handle_search_key(key);
        }

        match self.screen {
            Screen::Form => self.handle_form_key(key),
            Screen::Profile => match key.code {
                KeyCode::Char('p') | KeyCode::Enter => Action::ChangePassword,
                KeyCode::Char('q') | KeyCode::Esc => Action::Back,
                _ => self.handle_global_key(key),
            },
            Screen::List(resource) => self.handle_list_key(resource, key),
        }
    }

    fn handle_global_key(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('1') => Action::OpenList(Resource::Movies),
            KeyCode::Char('2') => Action::OpenList(Resource::Rooms),
            KeyCode::Char('3') => Action::OpenList(Resource::Reports),
            KeyCode::Char('4') => Action::OpenList(Resource::Users),
            KeyCode::Char('P') => Action::OpenProfile,
            _ => Action::None,
        }
    }

    fn handle_search_key(&self, key: KeyEvent) -> Action {
        if is_ctrl(&key, 'u') {
            return Action::ClearSearch;
        }
        match key.code {
            KeyCode::Enter | KeyCode::Esc => Action::ExitSearchMode,
            KeyCode::Backspace => Action::SearchBackspace,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                Action::SearchInput(c)
            }
            _ => Action::None,
        }
    }

    fn handle_form_key(&self, key: KeyEvent) -> Action {
        if is_ctrl(&key, 's') {
            return Action::SubmitForm;
        }
        match key.code {
            KeyCode::Esc => Action::Back,
            KeyCode::Tab | KeyCode::Down | KeyCode::Enter => Action::FormNext,
            KeyCode::BackTab | KeyCode::Up => Action::FormPrev,
            KeyCode::Left => Action::FormCycle(false),
            KeyCode::Right => Action::FormCycle(true),
            KeyCode::Backspace => Action::FormBackspace,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                Action::FormInput(c)
            }
            _ => Action::None,
        }
    }

    fn handle_list_key(&self, resource: Resource, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => match resource {
                Resource::Showtimes | Resource::Invoices => Action::Back,
                _ => Action::Quit,
            },
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Char('l') | KeyCode::Right => Action::NextPage,
            KeyCode::Char('h') | KeyCode::Left => Action::PrevPage,
            KeyCode::Char('s') => Action::CyclePageSize,
            KeyCode::Char('/') => Action::EnterSearchMode,
            KeyCode::Char('c') => Action::ClearSearch,
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Enter => Action::Select,
            KeyCode::Char('d') if resource.is_deletable() => Action::RequestDelete,
            KeyCode::Char('n') if resource.is_deletable() => Action::NewRecord,
            KeyCode::Char('e') if resource.is_deletable() => Action::EditRecord,
            KeyCode::Char('o') if resource == Resource::Movies => Action::OpenTrailer,
            KeyCode::Char('y') if resource == Resource::Movies => Action::YankUrl,
            _ => self.handle_global_key(key),
        }
    }

    pub fn update(&mut self, action: Action) {
        match action {
            Action::Start => {
                self.spawn_load_session();
                self.open_list(Resource::Movies);
            }
            Action::Tick => self.tick(Instant::now()),
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Back => self.back(),
            Action::ScrollUp => {
                if let Some(r) = self.active_resource() {
                    self.list_mut(r).select_prev();
                }
            }
            Action::ScrollDown => {
                if let Some(r) = self.active_resource() {
                    self.list_mut(r).select_next();
                }
            }
            Action::Select => self.drill_down(),

            // Navigation
            Action::OpenList(resource) => {
                self.mode = InputMode::Normal;
                self.current_movie = None;
                self.current_showtime = None;
                self.showtime_header = None;
                self.open_list(resource);
            }
            Action::OpenProfile => {
                self.mode = InputMode::Normal;
                self.screen = Screen::Profile;
            }

            // Pagination
            Action::NextPage => self.with_active_list(|l| l.next_page()),
            Action::PrevPage => self.with_active_list(|l| l.prev_page()),
            Action::CyclePageSize => self.with_active_list(|l| l.cycle_page_size()),
            Action::Refresh => self.with_active_list(|l| Some(l.refresh())),
            Action::PageLoaded { seq, listing } => self.apply_listing(seq, listing),
            Action::PageFailed {
                resource,
                seq,
                error,
            } => {
                if self.list_mut(resource).apply_failure(seq) {
                    tracing::error!(%resource, seq, %error, "list fetch failed");
                    if resource == Resource::Invoices {
                        self.showtime_header = None;
                    }
                    self.notifier.error(error);
                } else {
                    tracing::debug!(%resource, seq, "dropping stale failure");
                }
            }

            // Search
            Action::EnterSearchMode => {
                if self.active_resource().is_some() {
                    self.mode = InputMode::Search;
                }
            }
            Action::ExitSearchMode => {
                self.mode = InputMode::Normal;
            }
            Action::SearchInput(c) => {
                if let Some(r) = self.active_resource() {
                    self.list_mut(r).search_insert(c, Instant::now());
                }
            }
            Action::SearchBackspace => {
                if let Some(r) = self.active_resource() {
                    self.list_mut(r).search_backspace(Instant::now());
                }
            }
            Action::ClearSearch => self.with_active_list(|l| Some(l.clear_search())),

            // Delete
            Action::RequestDelete => {
                if let Some(r) = self.active_resource() {
                    self.list_mut(r).request_delete();
                }
            }
            Action::ConfirmNo => {
                if let Some(r) = self.active_resource() {
                    self.list_mut(r).cancel_delete();
                }
            }
            Action::ConfirmYes => {
                if let Some(r) = self.active_resource() {
                    if let Some(id) = self.list_mut(r).confirm_delete() {
                        self.spawn_delete(r, id);
                    }
                }
            }
            Action::Deleted { resource, message } => {
                let req = self.list_mut(resource).delete_succeeded();
                self.notifier.success(message);
                self.spawn_fetch(req);
            }
            Action::DeleteFailed { resource, error } => {
                self.list_mut(resource).delete_failed();
                tracing::error!(%resource, %error, "delete failed");
                self.notifier.error(error);
            }

            // Forms
            Action::NewRecord => {
                let form = match self.active_resource() {
                    Some(Resource::Movies) => Form::movie(None),
                    Some(Resource::Rooms) => Form::room(None),
                    Some(Resource::Users) => Form::user(None, self.session_role()),
                    _ => return,
                };
                self.open_form(form);
            }
            Action::EditRecord => {
                if let Some(r) = self.active_resource() {
                    if let Some(id) = self.list(r).selected_id() {
                        self.spawn_load_form(r, id);
                    }
                }
            }
            Action::ChangePassword => {
                if let Some(user) = &self.session {
                    let form = Form::password(user.id.clone());
                    self.open_form(form);
                } else {
                    self.notifier.info("Profile is still loading");
                }
            }
            Action::FormReady(form) => {
                let expected = form_resource(&form.kind).map(Screen::List);
                if expected == Some(self.screen) {
                    self.open_form(*form);
                } else {
                    tracing::debug!("dropping form for a screen that was left");
                }
            }
            Action::FormLoadFailed(error) => {
                tracing::error!(%error, "could not load record");
                self.notifier.error(error);
            }
            Action::FormNext => self.with_form(Form::focus_next),
            Action::FormPrev => self.with_form(Form::focus_prev),
            Action::FormInput(c) => self.with_form(|f| f.input(c)),
            Action::FormBackspace => self.with_form(Form::backspace),
            Action::FormCycle(forward) => self.with_form(|f| f.cycle_choice(forward)),
            Action::SubmitForm => self.submit_form(),
            Action::Saved {
                resource,
                message,
                warning,
            } => {
                match warning {
                    Some(warning) => self.notifier.error(format!("{}\n{}", message, warning)),
                    None => self.notifier.success(message),
                }
                self.form = None;
                self.open_list(resource);
            }
            Action::PasswordChanged(message) => {
                if let Err(e) = auth::forget_token() {
                    tracing::warn!(error = %e, "could not remove stored token");
                }
                self.exit_message = Some(message);
                self.should_quit = true;
            }
            Action::ValidationFailed(errors) => {
                if let Some(form) = self.form.as_mut() {
                    form.submitting = false;
                    form.errors = errors;
                }
            }
            Action::SubmitFailed(error) => {
                if let Some(form) = self.form.as_mut() {
                    form.submitting = false;
                }
                tracing::error!(%error, "save failed");
                self.notifier.error(error);
            }

            Action::SessionLoaded(user) => {
                tracing::debug!(user = %user.username, "signed in");
                self.session = Some(*user);
            }

            Action::OpenTrailer => {
                if let Some(url) = self.selected_trailer() {
                    match open::that(&url) {
                        Ok(()) => self.notifier.info(format!("Opened {}", url)),
                        Err(e) => self.notifier.error(format!("Could not open {}: {}", url, e)),
                    }
                }
            }
            Action::YankUrl => {
                if let Some(url) = self.selected_trailer() {
                    let copied =
                        arboard::Clipboard::new().and_then(|mut cb| cb.set_text(url.clone()));
                    match copied {
                        Ok(()) => self.notifier.success(format!("Copied {}", url)),
                        Err(e) => self.notifier.error(format!("Clipboard error: {}", e)),
                    }
                }
            }

            Action::AcknowledgeNotification => self.notifications.acknowledge(),
            Action::Error(msg) => {
                tracing::error!(error = %msg);
                self.notifier.error(msg);
            }
            Action::None => {}
        }
    }

    /// Advance timers: pending searches and the visible notification.
    pub fn tick(&mut self, now: Instant) {
        self.notifications.tick(now);
        if let Some(r) = self.active_resource() {
            if let Some(req) = self.list_mut(r).tick(now) {
                self.spawn_fetch(req);
            }
        }
    }

    fn with_active_list(&mut self, f: impl FnOnce(&mut dyn ListControl) -> Option<FetchRequest>) {
        let Some(r) = self.active_resource() else {
            return;
        };
        if let Some(req) = f(self.list_mut(r)) {
            self.spawn_fetch(req);
        }
    }

    fn with_form(&mut self, f: impl FnOnce(&mut Form)) {
        if let Some(form) = self.form.as_mut() {
            if !form.submitting {
                f(form);
            }
        }
    }

    /// Enter a list screen with a fresh view and load its first page.
    fn open_list(&mut self, resource: Resource) {
        let (lists, debounce, seq) = (&self.lists, self.debounce, &self.sequencer);
        match resource {
            Resource::Movies => self.movies = fresh(resource, lists, debounce, seq),
            Resource::Rooms => self.rooms = fresh(resource, lists, debounce, seq),
            Resource::Showtimes => self.showtimes = fresh(resource, lists, debounce, seq),
            Resource::Invoices => self.invoices = fresh(resource, lists, debounce, seq),
            Resource::Reports => self.reports = fresh(resource, lists, debounce, seq),
            Resource::Users => self.users = fresh(resource, lists, debounce, seq),
        }
        self.screen = Screen::List(resource);
        self.mode = InputMode::Normal;
        self.last_list = resource;
        let req = self.list_mut(resource).refresh();
        self.spawn_fetch(req);
    }

    fn open_form(&mut self, form: Form) {
        self.form_return = self.screen;
        self.form = Some(form);
        self.screen = Screen::Form;
        self.mode = InputMode::Normal;
    }

    fn back(&mut self) {
        match self.screen {
            Screen::Form => {
                self.form = None;
                match self.form_return {
                    Screen::List(resource) => self.open_list(resource),
                    other => self.screen = other,
                }
            }
            Screen::Profile => self.open_list(self.last_list),
            Screen::List(Resource::Invoices) => {
                self.current_showtime = None;
                self.showtime_header = None;
                self.open_list(Resource::Showtimes);
            }
            Screen::List(Resource::Showtimes) => {
                self.current_movie = None;
                self.open_list(Resource::Movies);
            }
            Screen::List(_) => {
                self.should_quit = true;
            }
        }
    }

    fn drill_down(&mut self) {
        match self.screen {
            Screen::List(Resource::Movies) => {
                if let Some(movie) = self.movies.selected_row().cloned() {
                    self.current_movie = Some(movie);
                    self.open_list(Resource::Showtimes);
                }
            }
            Screen::List(Resource::Showtimes) => {
                if let Some(id) = self.showtimes.selected_id() {
                    self.current_showtime = Some(id);
                    self.showtime_header = None;
                    self.open_list(Resource::Invoices);
                }
            }
            _ => {}
        }
    }

    fn apply_listing(&mut self, seq: u64, listing: Listing) {
        tracing::debug!(resource = %listing.resource(), seq, "page loaded");
        match listing {
            Listing::Movies(page) => {
                self.movies.apply_page(seq, page);
            }
            Listing::Rooms(page) => {
                self.rooms.apply_page(seq, page);
            }
            Listing::Showtimes(page) => {
                self.showtimes.apply_page(seq, page);
            }
            Listing::Invoices(InvoicePage { showtime, invoices }) => {
                if self.invoices.apply_page(seq, invoices) && self.showtime_header.is_none() {
                    self.showtime_header = Some(showtime);
                }
            }
            Listing::Reports(page) => {
                self.reports.apply_page(seq, page);
            }
            Listing::Users(page) => {
                self.users.apply_page(seq, page);
            }
        }
    }

    fn selected_trailer(&self) -> Option<String> {
        if self.screen != Screen::List(Resource::Movies) {
            return None;
        }
        let trailer = self.movies.selected_row()?.trailer.as_deref()?;
        if trailer.is_empty() {
            return None;
        }
        Some(format::trailer_url(trailer))
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if form.submitting {
            return;
        }
        let submission = match form.submission() {
            Ok(submission) => submission,
            Err(errors) => {
                form.errors = errors;
                return;
            }
        };
        if let Submission::Movie {
            image: Some(path), ..
        } = &submission
        {
            if let Err(msg) = check_image(path) {
                self.notifier.error(msg);
                return;
            }
        }
        form.errors = ValidationErrors::default();
        form.submitting = true;
        self.spawn_submit(submission);
    }

    fn spawn_fetch(&self, req: FetchRequest) {
        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        let parent = match req.resource {
            Resource::Showtimes => self.current_movie.as_ref().map(|m| m.id.clone()),
            Resource::Invoices => self.current_showtime.clone(),
            _ => None,
        };
        tokio::spawn(async move {
            let FetchRequest {
                resource,
                seq,
                query,
            } = req;
            let missing_parent = || AdminError::Api(format!("no parent selected for {}", resource));
            let result = match resource {
                Resource::Movies => backend.list_movies(&query).await.map(Listing::Movies),
                Resource::Rooms => backend.list_rooms(&query).await.map(Listing::Rooms),
                Resource::Showtimes => match parent {
                    Some(id) => backend
                        .list_showtimes(&id, &query)
                        .await
                        .map(Listing::Showtimes),
                    None => Err(missing_parent()),
                },
                Resource::Invoices => match parent {
                    Some(id) => backend
                        .list_invoices(&id, &query)
                        .await
                        .map(Listing::Invoices),
                    None => Err(missing_parent()),
                },
                Resource::Reports => backend.list_reports(&query).await.map(Listing::Reports),
                Resource::Users => backend.list_users(&query).await.map(Listing::Users),
            };
            let action = match result {
                Ok(listing) => Action::PageLoaded { seq, listing },
                Err(e) => Action::PageFailed {
                    resource,
                    seq,
                    error: e.to_string(),
                },
            };
            tx.send(action).ok();
        });
    }

    fn spawn_delete(&self, resource: Resource, id: String) {
        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            let action = match backend.delete(resource, &id).await {
                Ok(message) => Action::Deleted { resource, message },
                Err(e) => Action::DeleteFailed {
                    resource,
                    error: e.to_string(),
                },
            };
            tx.send(action).ok();
        });
    }

    fn spawn_load_form(&self, resource: Resource, id: String) {
        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        let signed_in = self.session_role();
        tokio::spawn(async move {
            let result = match resource {
                Resource::Movies => backend.get_movie(&id).await.map(|m| Form::movie(Some(&m))),
                Resource::Rooms => backend.get_room(&id).await.map(|r| Form::room(Some(&r))),
                Resource::Users => backend
                    .get_user(&id)
                    .await
                    .map(|u| Form::user(Some(&u), signed_in)),
                other => Err(AdminError::Api(format!("{} cannot be edited", other))),
            };
            let action = match result {
                Ok(form) => Action::FormReady(Box::new(form)),
                Err(e) => Action::FormLoadFailed(e.to_string()),
            };
            tx.send(action).ok();
        });
    }

    fn spawn_submit(&self, submission: Submission) {
        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            let action = match submission {
                Submission::Movie { id, draft, image } => {
                    match backend.save_movie(id.as_deref(), &draft).await {
                        Ok(saved) => {
                            let warning = match image {
                                Some(path) => backend
                                    .upload_movie_image(&saved.record.id, &path)
                                    .await
                                    .err()
                                    .map(|e| format!("Image upload failed: {}", e)),
                                None => None,
                            };
                            Action::Saved {
                                resource: Resource::Movies,
                                message: saved.message,
                                warning,
                            }
                        }
                        Err(e) => submit_error(e),
                    }
                }
                Submission::Room { id, draft } => {
                    match backend.save_room(id.as_deref(), &draft).await {
                        Ok(message) => Action::Saved {
                            resource: Resource::Rooms,
                            message,
                            warning: None,
                        },
                        Err(e) => submit_error(e),
                    }
                }
                Submission::User { id, draft } => {
                    match backend.save_user(id.as_deref(), &draft).await {
                        Ok(message) => Action::Saved {
                            resource: Resource::Users,
                            message,
                            warning: None,
                        },
                        Err(e) => submit_error(e),
                    }
                }
                Submission::Password { user_id, change } => {
                    match backend.change_password(&user_id, &change).await {
                        Ok(message) => Action::PasswordChanged(message),
                        Err(e) => submit_error(e),
                    }
                }
            };
            tx.send(action).ok();
        });
    }

    fn spawn_load_session(&self) {
        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            match backend.current_user().await {
                Ok(user) => {
                    tx.send(Action::SessionLoaded(Box::new(user))).ok();
                }
                Err(e) => {
                    tx.send(Action::from(e)).ok();
                }
            }
        });
    }
}
