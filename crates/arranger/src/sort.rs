//! Pluggable orderings for matched windows.
//!
//! Every strategy is pure and yields a total order: the window handle is
//! always the last tie-breaker, so sorting is idempotent and stable across
//! polls even when titles collide.

use std::{cmp::Ordering, collections::BTreeMap};

use tracing::warn;

use crate::{Error, Result, WindowSnapshot};

/// An ordering over window snapshots.
pub trait SortStrategy: Send + Sync {
    /// Registry name of this strategy.
    fn name(&self) -> &'static str;

    /// Return a new ordering of `windows`; the input is untouched.
    fn sort(&self, windows: &[WindowSnapshot]) -> Vec<WindowSnapshot>;
}

/// Ascending by lowercased title, then lowercased process name.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultByTitle;

impl SortStrategy for DefaultByTitle {
    fn name(&self) -> &'static str {
        "title"
    }

    fn sort(&self, windows: &[WindowSnapshot]) -> Vec<WindowSnapshot> {
        let mut keyed: Vec<_> = windows
            .iter()
            .map(|w| ((w.title.to_lowercase(), w.process_name.to_lowercase()), w))
            .collect();
        keyed.sort_by(|(ka, a), (kb, b)| ka.cmp(kb).then(a.handle.cmp(&b.handle)));
        keyed.into_iter().map(|(_, w)| w.clone()).collect()
    }
}

/// Ascending by the integer formed from every digit in the title.
///
/// `"1-41704 - full control"` sorts with key `141704`. Titles without digits
/// sort after all titles with digits; ties fall back to the title. Keys are
/// compared as digit strings, so arbitrarily long numbers still order
/// correctly.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumericByExtractedDigits;

/// Integer key built from the decimal digits of `title`, `None` when there
/// are none. Saturates at `u64::MAX`; sorting does not rely on this value.
pub fn digit_key(title: &str) -> Option<u64> {
    let mut seen = false;
    let mut key: u64 = 0;
    for d in title.chars().filter_map(|c| c.to_digit(10)) {
        seen = true;
        key = key.saturating_mul(10).saturating_add(u64::from(d));
    }
    seen.then_some(key)
}

/// The digits of `title` without leading zeros (`"0"` when every digit is
/// zero), `None` when there are none.
fn digit_string(title: &str) -> Option<String> {
    let digits: String = title.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let trimmed = digits.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
}

/// Numeric order of two digit strings; `None` sorts last.
fn cmp_digits(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl SortStrategy for NumericByExtractedDigits {
    fn name(&self) -> &'static str {
        "numeric"
    }

    fn sort(&self, windows: &[WindowSnapshot]) -> Vec<WindowSnapshot> {
        let mut keyed: Vec<_> = windows.iter().map(|w| (digit_string(&w.title), w)).collect();
        keyed.sort_by(|(ka, a), (kb, b)| {
            cmp_digits(ka.as_deref(), kb.as_deref())
                .then_with(|| a.title.cmp(&b.title))
                .then(a.handle.cmp(&b.handle))
        });
        keyed.into_iter().map(|(_, w)| w.clone()).collect()
    }
}

/// Reading order of the current geometry: top edge, then left edge.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByPosition;

impl SortStrategy for ByPosition {
    fn name(&self) -> &'static str {
        "position"
    }

    fn sort(&self, windows: &[WindowSnapshot]) -> Vec<WindowSnapshot> {
        let mut out = windows.to_vec();
        out.sort_by_key(|w| (w.rect.y, w.rect.x, w.handle));
        out
    }
}

/// Constructor stored in the registry.
pub type StrategyCtor = fn() -> Box<dyn SortStrategy>;

/// Name → constructor table, built explicitly at startup.
#[derive(Clone)]
pub struct SortRegistry {
    ctors: BTreeMap<String, StrategyCtor>,
}

impl SortRegistry {
    /// Name of the strategy used when a lookup fails.
    pub const DEFAULT: &'static str = "title";

    /// Registry without any strategies.
    pub fn empty() -> Self {
        Self {
            ctors: BTreeMap::new(),
        }
    }

    /// Registry with every built-in strategy.
    pub fn builtin() -> Self {
        let mut r = Self::empty();
        r.register("title", || Box::new(DefaultByTitle));
        r.register("numeric", || Box::new(NumericByExtractedDigits));
        r.register("position", || Box::new(ByPosition));
        r
    }

    /// Add or replace a strategy.
    pub fn register(&mut self, name: &str, ctor: StrategyCtor) {
        self.ctors.insert(name.to_ascii_lowercase(), ctor);
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.ctors.keys().cloned().collect()
    }

    /// Construct the strategy registered as `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Result<Box<dyn SortStrategy>> {
        self.ctors
            .get(&name.trim().to_ascii_lowercase())
            .map(|ctor| ctor())
            .ok_or_else(|| Error::UnknownStrategy(name.to_string()))
    }

    /// Like [`SortRegistry::get`], falling back to [`DefaultByTitle`] with a
    /// warning when `name` is unknown.
    pub fn get_or_default(&self, name: &str) -> Box<dyn SortStrategy> {
        match self.get(name) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, fallback = Self::DEFAULT, "sort strategy fallback");
                Box::new(DefaultByTitle)
            }
        }
    }
}

impl Default for SortRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
