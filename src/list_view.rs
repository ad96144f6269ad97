//! Server-paginated list view with debounced search and a delete gate.
//!
//! A `ListView` never performs I/O. Every operation that needs data returns a
//! `FetchRequest`; the caller runs it and feeds the outcome back through
//! `apply_page` / `apply_failure` together with the request's sequence number.
//! Only the response to the most recently issued request is applied.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::confirm::DeleteGate;
use crate::search::SearchInput;
use crate::types::{Page, Resource, Row};

/// Process-wide source of request sequence numbers.
#[derive(Debug, Clone, Default)]
pub struct Sequencer(Arc<AtomicU64>);

impl Sequencer {
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
}

impl PageQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub resource: Resource,
    pub seq: u64,
    pub query: PageQuery,
}

#[derive(Debug, Clone)]
pub struct PageState<R> {
    pub loading: bool,
    pub items: Vec<R>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<R> PageState<R> {
    pub fn new(page_size: u32) -> Self {
        Self {
            loading: false,
            items: Vec::new(),
            total_count: 0,
            page: 1,
            page_size,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn page_count(&self) -> u32 {
        page_count(self.total_count, self.page_size)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) * u64::from(self.page_size) < self.total_count
    }
}

fn page_count(total: u64, size: u32) -> u32 {
    let pages = total.div_ceil(u64::from(size.max(1)));
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

/// Allowed page sizes of a view; the first one is the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSizes(Vec<u32>);

impl PageSizes {
    const FALLBACK: u32 = 10;

    pub fn new(sizes: &[u32]) -> Self {
        let sizes: Vec<u32> = sizes.iter().copied().filter(|s| *s > 0).collect();
        if sizes.is_empty() {
            Self(vec![Self::FALLBACK])
        } else {
            Self(sizes)
        }
    }

    pub fn default_size(&self) -> u32 {
        self.0[0]
    }

    pub fn after(&self, current: u32) -> u32 {
        match self.0.iter().position(|s| *s == current) {
            Some(i) => self.0[(i + 1) % self.0.len()],
            None => self.default_size(),
        }
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

pub struct ListView<R> {
    resource: Resource,
    state: PageState<R>,
    sizes: PageSizes,
    search: SearchInput,
    delete: DeleteGate,
    sequencer: Sequencer,
    latest_seq: u64,
    selected: usize,
}

impl<R: Row> ListView<R> {
    pub fn new(
        resource: Resource,
        sizes: PageSizes,
        debounce: Duration,
        sequencer: Sequencer,
    ) -> Self {
        Self {
            resource,
            state: PageState::new(sizes.default_size()),
            sizes,
            search: SearchInput::new(debounce),
            delete: DeleteGate::default(),
            sequencer,
            latest_seq: 0,
            selected: 0,
        }
    }

    pub fn state(&self) -> &PageState<R> {
        &self.state
    }

    pub fn items(&self) -> &[R] {
        &self.state.items
    }

    pub fn page_sizes(&self) -> &PageSizes {
        &self.sizes
    }

    /// A typed search is waiting for its quiet period.
    pub fn search_pending(&self) -> bool {
        self.search.is_pending()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&R> {
        self.state.items.get(self.selected)
    }

    /// First load after the view is shown.
    pub fn mount(&mut self) -> FetchRequest {
        self.begin_fetch(self.search.text().to_string())
    }

    /// Apply a successful response. Returns false if the response is stale.
    pub fn apply_page(&mut self, seq: u64, page: Page<R>) -> bool {
        if seq != self.latest_seq {
            tracing::debug!(resource = %self.resource, seq, latest = self.latest_seq, "dropping stale page");
            return false;
        }
        let mut items = page.docs;
        let limit = self.state.page_size as usize;
        if items.len() > limit {
            tracing::warn!(
                resource = %self.resource,
                received = items.len(),
                limit,
                "backend returned more rows than requested"
            );
            items.truncate(limit);
        }
        self.state.loading = false;
        self.state.items = items;
        self.state.total_count = page.total_docs;
        self.clamp_selection();
        true
    }

    fn begin_fetch(&mut self, search: String) -> FetchRequest {
        let seq = self.sequencer.next();
        self.latest_seq = seq;
        self.state.loading = true;
        FetchRequest {
            resource: self.resource,
            seq,
            query: PageQuery {
                page: self.state.page,
                limit: self.state.page_size,
                search,
            },
        }
    }

    fn clamp_selection(&mut self) {
        if self.selected >= self.state.items.len() {
            self.selected = self.state.items.len().saturating_sub(1);
        }
    }

    fn page_fetch(&mut self) -> FetchRequest {
        // The page request already carries the current text.
        self.search.cancel_pending();
        self.begin_fetch(self.search.text().to_string())
    }
}

/// Row-type independent operations, so the app can drive whichever list is on screen.
pub trait ListControl {
    fn resource(&self) -> Resource;
    fn search_text(&self) -> &str;
    fn is_loading(&self) -> bool;
    fn latest_seq(&self) -> u64;

    fn search_insert(&mut self, c: char, now: Instant);
    fn search_backspace(&mut self, now: Instant);
    fn clear_search(&mut self) -> FetchRequest;
    fn tick(&mut self, now: Instant) -> Option<FetchRequest>;

    fn set_page(&mut self, page: u32) -> Option<FetchRequest>;
    fn next_page(&mut self) -> Option<FetchRequest>;
    fn prev_page(&mut self) -> Option<FetchRequest>;
    fn set_page_size(&mut self, size: u32) -> Option<FetchRequest>;
    fn cycle_page_size(&mut self) -> Option<FetchRequest>;
    fn refresh(&mut self) -> FetchRequest;
    fn apply_failure(&mut self, seq: u64) -> bool;

    fn select_next(&mut self);
    fn select_prev(&mut self);
    fn selected_id(&self) -> Option<String>;

    fn delete_gate(&self) -> &DeleteGate;
    fn request_delete(&mut self) -> bool;
    fn cancel_delete(&mut self);
    fn confirm_delete(&mut self) -> Option<String>;
    fn delete_succeeded(&mut self) -> FetchRequest;
    fn delete_failed(&mut self);
}

impl<R: Row> ListControl for ListView<R> {
    fn resource(&self) -> Resource {
        self.resource
    }

    fn search_text(&self) -> &str {
        self.search.text()
    }

    fn is_loading(&self) -> bool {
        self.state.loading
    }

    fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    fn search_insert(&mut self, c: char, now: Instant) {
        self.search.insert(c, now);
    }

    fn search_backspace(&mut self, now: Instant) {
        self.search.backspace(now);
    }

    fn clear_search(&mut self) -> FetchRequest {
        self.search.clear();
        self.begin_fetch(String::new())
    }

    fn tick(&mut self, now: Instant) -> Option<FetchRequest> {
        let text = self.search.poll(now)?;
        Some(self.begin_fetch(text))
    }

    fn set_page(&mut self, page: u32) -> Option<FetchRequest> {
        if page == 0 || page == self.state.page {
            return None;
        }
        self.state.page = page;
        Some(self.page_fetch())
    }

    fn next_page(&mut self) -> Option<FetchRequest> {
        if !self.state.has_next() {
            return None;
        }
        self.set_page(self.state.page + 1)
    }

    fn prev_page(&mut self) -> Option<FetchRequest> {
        if !self.state.has_prev() {
            return None;
        }
        self.set_page(self.state.page - 1)
    }

    fn set_page_size(&mut self, size: u32) -> Option<FetchRequest> {
        if size == 0 || size == self.state.page_size {
            return None;
        }
        self.state.page_size = size;
        let last = page_count(self.state.total_count, size);
        self.state.page = self.state.page.min(last);
        Some(self.page_fetch())
    }

    fn cycle_page_size(&mut self) -> Option<FetchRequest> {
        let next = self.sizes.after(self.state.page_size);
        self.set_page_size(next)
    }

    fn refresh(&mut self) -> FetchRequest {
        self.page_fetch()
    }

    fn apply_failure(&mut self, seq: u64) -> bool {
        if seq != self.latest_seq {
            return false;
        }
        self.state = PageState::new(self.sizes.default_size());
        self.selected = 0;
        true
    }

    fn select_next(&mut self) {
        if !self.state.items.is_empty() && self.selected < self.state.items.len() - 1 {
            self.selected += 1;
        }
    }

    fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    fn selected_id(&self) -> Option<String> {
        self.selected_row().map(|r| r.id().to_string())
    }

    fn delete_gate(&self) -> &DeleteGate {
        &self.delete
    }

    fn request_delete(&mut self) -> bool {
        if !self.resource.is_deletable() {
            return false;
        }
        let Some(row) = self.state.items.get(self.selected) else {
            return false;
        };
        let (id, label) = (row.id().to_string(), row.label().to_string());
        self.delete.open(id, label)
    }

    fn cancel_delete(&mut self) {
        self.delete.cancel();
    }

    fn confirm_delete(&mut self) -> Option<String> {
        self.delete.confirm()
    }

    fn delete_succeeded(&mut self) -> FetchRequest {
        self.delete.finish();
        self.state.page = 1;
        self.page_fetch()
    }

    fn delete_failed(&mut self) {
        self.delete.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(600);

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        name: String,
    }

    impl Row for Item {
        fn id(&self) -> &str {
            &self.id
        }
        fn label(&self) -> &str {
            &self.name
        }
    }

    fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            name: id.to_uppercase(),
        }
    }

    fn page(ids: &[&str], total: u64) -> Page<Item> {
        Page {
            docs: ids.iter().map(|id| item(id)).collect(),
            total_docs: total,
        }
    }

    fn view(resource: Resource, sizes: &[u32]) -> ListView<Item> {
        ListView::new(resource, PageSizes::new(sizes), WINDOW, Sequencer::default())
    }

    fn loaded(total: u64) -> ListView<Item> {
        let mut v = view(Resource::Movies, &[10, 20, 30]);
        let req = v.mount();
        assert!(v.apply_page(req.seq, page(&["a", "b", "c"], total)));
        v
    }

    #[test]
    fn mount_requests_first_page_with_default_size() {
        let mut v = view(Resource::Movies, &[3, 6, 9]);
        let req = v.mount();
        assert!(v.is_loading());
        assert_eq!(
            req.query,
            PageQuery {
                page: 1,
                limit: 3,
                search: String::new()
            }
        );
        assert_eq!(req.query.offset(), 0);
    }

    #[test]
    fn apply_page_replaces_items_and_total() {
        let v = loaded(42);
        assert!(!v.is_loading());
        assert_eq!(v.items().len(), 3);
        assert_eq!(v.state().total_count, 42);
    }

    #[test]
    fn single_result_disables_next_page() {
        let mut v = view(Resource::Movies, &[10]);
        let req = v.mount();
        v.apply_page(req.seq, page(&["a"], 1));
        assert!(!v.state().has_next());
        assert!(v.next_page().is_none());
        assert!(v.prev_page().is_none());
    }

    #[test]
    fn keystroke_burst_issues_one_fetch_with_final_text() {
        let mut v = loaded(42);
        let t0 = Instant::now();
        let mut now = t0;
        for c in "dune".chars() {
            v.search_insert(c, now);
            now += Duration::from_millis(100);
        }
        assert_eq!(v.search_text(), "dune");

        let mut fetches = Vec::new();
        let mut clock = t0;
        while clock < t0 + Duration::from_secs(3) {
            if let Some(req) = v.tick(clock) {
                fetches.push(req);
            }
            clock += Duration::from_millis(25);
        }
        assert_eq!(fetches.len(), 1);
        assert_eq!(fetches[0].query.search, "dune");
        assert_eq!(fetches[0].query.page, 1);
    }

    #[test]
    fn editing_search_alone_never_fetches() {
        let mut v = loaded(42);
        let t0 = Instant::now();
        v.search_insert('x', t0);
        assert!(v.tick(t0 + Duration::from_millis(599)).is_none());
    }

    #[test]
    fn clear_fetches_immediately_with_empty_filter() {
        let mut v = loaded(42);
        let t0 = Instant::now();
        v.search_insert('x', t0);
        let req = v.clear_search();
        assert_eq!(req.query.search, "");
        assert_eq!(v.search_text(), "");
        // The pending debounced search is gone.
        assert!(v.tick(t0 + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn page_change_keeps_query() {
        let mut v = loaded(42);
        let t0 = Instant::now();
        v.search_insert('a', t0);
        let first = v.tick(t0 + WINDOW).unwrap();
        v.apply_page(first.seq, page(&["a", "b", "c"], 42));

        let req = v.next_page().unwrap();
        assert_eq!(req.query.page, 2);
        assert_eq!(req.query.search, "a");
        assert_eq!(req.query.offset(), 10);
    }

    #[test]
    fn page_change_absorbs_pending_search() {
        let mut v = loaded(42);
        let t0 = Instant::now();
        v.search_insert('z', t0);
        let req = v.next_page().unwrap();
        assert_eq!(req.query.search, "z");
        assert!(v.tick(t0 + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn page_size_change_fetches_and_clamps_page() {
        let mut v = loaded(25);
        let req = v.set_page(3).unwrap();
        v.apply_page(req.seq, page(&["u"], 25));

        let req = v.set_page_size(30).unwrap();
        assert_eq!(req.query.limit, 30);
        assert_eq!(req.query.page, 1);
        assert!(v.set_page_size(30).is_none());
    }

    #[test]
    fn cycle_page_size_wraps() {
        let mut v = loaded(100);
        assert_eq!(v.cycle_page_size().unwrap().query.limit, 20);
        assert_eq!(v.cycle_page_size().unwrap().query.limit, 30);
        assert_eq!(v.cycle_page_size().unwrap().query.limit, 10);
    }

    #[test]
    fn stale_response_is_ignored() {
        let mut v = loaded(42);
        let slow = v.next_page().unwrap();
        let fast = v.next_page().unwrap();
        assert!(v.apply_page(fast.seq, page(&["p3"], 42)));
        assert!(!v.apply_page(slow.seq, page(&["p2"], 42)));
        assert_eq!(v.items()[0].id, "p3");
        assert!(!v.apply_failure(slow.seq));
    }

    #[test]
    fn failure_resets_to_defaults() {
        let mut v = loaded(100);
        v.cycle_page_size();
        let req = v.next_page().unwrap();
        assert!(v.apply_failure(req.seq));

        let state = v.state();
        assert!(!state.loading);
        assert!(state.items.is_empty());
        assert_eq!(state.total_count, 0);
        assert_eq!(state.page, 1);
        assert_eq!(state.page_size, 10);
    }

    #[test]
    fn oversized_page_is_truncated() {
        let mut v = view(Resource::Movies, &[2]);
        let req = v.mount();
        v.apply_page(req.seq, page(&["a", "b", "c"], 3));
        assert_eq!(v.items().len(), 2);
    }

    #[test]
    fn delete_confirm_targets_selected_row_and_refreshes_page_one() {
        let mut v = loaded(42);
        let req = v.set_page(2).unwrap();
        v.apply_page(req.seq, page(&["d", "e", "f"], 42));
        v.select_next();

        assert!(v.request_delete());
        assert_eq!(v.delete_gate().label(), Some("E"));
        assert_eq!(v.confirm_delete(), Some("e".to_string()));

        let refetch = v.delete_succeeded();
        assert!(!v.delete_gate().is_open());
        assert_eq!(refetch.query.page, 1);
        assert_eq!(refetch.query.search, "");
    }

    #[test]
    fn delete_cancel_changes_nothing() {
        let mut v = loaded(42);
        let before = v.latest_seq();
        v.request_delete();
        v.cancel_delete();
        assert!(!v.delete_gate().is_open());
        assert_eq!(v.latest_seq(), before);
        assert_eq!(v.state().page, 1);
    }

    #[test]
    fn delete_failure_closes_without_refresh() {
        let mut v = loaded(42);
        let before = v.latest_seq();
        v.request_delete();
        v.confirm_delete();
        v.delete_failed();
        assert!(!v.delete_gate().is_open());
        assert_eq!(v.latest_seq(), before);
    }

    #[test]
    fn reports_are_not_deletable() {
        let mut v = view(Resource::Reports, &[10]);
        let req = v.mount();
        v.apply_page(req.seq, page(&["a"], 1));
        assert!(!v.request_delete());
    }

    #[test]
    fn sequencer_is_shared_between_views() {
        let seq = Sequencer::default();
        let mut a: ListView<Item> =
            ListView::new(Resource::Movies, PageSizes::new(&[3]), WINDOW, seq.clone());
        let mut b: ListView<Item> =
            ListView::new(Resource::Movies, PageSizes::new(&[3]), WINDOW, seq);
        let ra = a.mount();
        let rb = b.mount();
        assert_ne!(ra.seq, rb.seq);
        // A remounted view never accepts its predecessor's response.
        assert!(!b.apply_page(ra.seq, page(&["x"], 1)));
    }

    #[test]
    fn page_sizes_ignore_zero_and_fall_back() {
        assert_eq!(PageSizes::new(&[0, 5]).default_size(), 5);
        assert_eq!(PageSizes::new(&[]).default_size(), 10);
        assert_eq!(PageSizes::new(&[3, 6]).after(7), 3);
    }

    #[test]
    fn page_count_rounds_up() {
        let mut state: PageState<Item> = PageState::new(10);
        state.total_count = 21;
        assert_eq!(state.page_count(), 3);
        state.total_count = 0;
        assert_eq!(state.page_count(), 1);
    }
}
