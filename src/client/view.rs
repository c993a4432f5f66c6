use std::cmp::Ordering;
use std::fmt::Debug;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::validation::Checked;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A row type the admin console manages as a whole collection.
pub trait Record: Clone + DeserializeOwned {
    type Filter: Default + Clone + Debug;
    type SortKey: Copy + PartialEq + Debug;
    type Form: Checked + Serialize + DeserializeOwned;
    type UpdateForm: Checked + Serialize + DeserializeOwned;

    /// Collection path under `/api`.
    const PATH: &'static str;
    /// Field of the list reply holding the rows.
    const COLLECTION: &'static str;

    fn id(&self) -> i64;
    fn matches(&self, filter: &Self::Filter) -> bool;
    fn sort_value(&self, key: Self::SortKey) -> SortValue;
    fn default_sort() -> SortSpec<Self::SortKey>;
    fn search_filter(text: &str) -> Self::Filter;
    /// One table row for the console.
    fn row(&self) -> String;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
}

impl SortValue {
    pub fn text(value: &str) -> Self {
        SortValue::Text(value.to_lowercase())
    }

    pub fn optional_text(value: Option<&str>) -> Self {
        Self::text(value.unwrap_or_default())
    }

    /// Missing numbers sort as zero.
    pub fn number(value: Option<i64>) -> Self {
        SortValue::Number(value.unwrap_or_default() as f64)
    }

    /// Missing dates sort as the epoch.
    pub fn date(value: Option<NaiveDate>) -> Self {
        SortValue::Date(
            value
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
        )
    }

    pub fn timestamp(value: Option<NaiveDateTime>) -> Self {
        SortValue::Date(value.unwrap_or_default())
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortSpec<K> {
    pub key: K,
    pub direction: Direction,
}

impl<K> SortSpec<K> {
    pub fn ascending(key: K) -> Self {
        Self {
            key,
            direction: Direction::Ascending,
        }
    }

    pub fn descending(key: K) -> Self {
        Self {
            key,
            direction: Direction::Descending,
        }
    }
}

/// One page of the filtered, sorted collection.
#[derive(Debug)]
pub struct Page<'a, R> {
    pub items: Vec<&'a R>,
    pub number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

/// The full collection plus the filter, sort and page the user picked.
///
/// The visible order is recomputed from scratch whenever the rows, the filter or the
/// sort change; rows are never patched in place.
#[derive(Debug)]
pub struct CollectionView<R: Record> {
    items: Vec<R>,
    filter: R::Filter,
    sort: SortSpec<R::SortKey>,
    page: usize,
    page_size: usize,
    visible: Vec<usize>,
}

impl<R: Record> Default for CollectionView<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> CollectionView<R> {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            filter: R::Filter::default(),
            sort: R::default_sort(),
            page: 1,
            page_size: page_size.max(1),
            visible: Vec::new(),
        }
    }

    /// Swaps in a freshly fetched collection, keeping filter and sort.
    pub fn replace(&mut self, items: Vec<R>) {
        self.items = items;
        self.derive();
        self.page = self.page.clamp(1, self.total_pages().max(1));
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn filter(&self) -> &R::Filter {
        &self.filter
    }

    pub fn sort(&self) -> SortSpec<R::SortKey> {
        self.sort
    }

    pub fn set_filter(&mut self, filter: R::Filter) {
        self.filter = filter;
        self.page = 1;
        self.derive();
    }

    pub fn update_filter(&mut self, change: impl FnOnce(&mut R::Filter)) {
        let mut filter = self.filter.clone();
        change(&mut filter);
        self.set_filter(filter);
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(R::Filter::default());
    }

    pub fn sort_by(&mut self, sort: SortSpec<R::SortKey>) {
        self.sort = sort;
        self.page = 1;
        self.derive();
    }

    /// Same key flips the direction, a new key starts ascending.
    pub fn toggle_sort(&mut self, key: R::SortKey) {
        let sort = if self.sort.key == key {
            SortSpec {
                key,
                direction: self.sort.direction.flipped(),
            }
        } else {
            SortSpec::ascending(key)
        };
        self.sort_by(sort);
    }

    pub fn filtered(&self) -> impl Iterator<Item = &R> {
        self.visible.iter().map(|&index| &self.items[index])
    }

    pub fn filtered_len(&self) -> usize {
        self.visible.len()
    }

    pub fn total_pages(&self) -> usize {
        self.visible.len().div_ceil(self.page_size)
    }

    pub fn page_number(&self) -> usize {
        self.page
    }

    pub fn page(&self) -> Page<'_, R> {
        let total_pages = self.total_pages();
        let start = (self.page - 1) * self.page_size;
        let items = self
            .filtered()
            .skip(start)
            .take(self.page_size)
            .collect();

        Page {
            items,
            number: self.page,
            total_pages,
            total_items: self.visible.len(),
            has_previous: total_pages > 0 && self.page > 1,
            has_next: self.page < total_pages,
        }
    }

    pub fn next_page(&mut self) -> bool {
        if self.page < self.total_pages() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn previous_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages().max(1));
    }

    fn derive(&mut self) {
        let filter = &self.filter;
        let items = &self.items;
        let mut visible: Vec<usize> = (0..items.len())
            .filter(|&index| items[index].matches(filter))
            .collect();

        let SortSpec { key, direction } = self.sort;
        visible.sort_by(|&a, &b| {
            let ordering = items[a].sort_value(key).compare(&items[b].sort_value(key));
            match direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });

        self.visible = visible;
    }
}
