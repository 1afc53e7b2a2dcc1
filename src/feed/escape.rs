use lru::LruCache;
use std::borrow::Cow;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

static GLOBAL_ESCAPER: OnceLock<Escaper> = OnceLock::new();

/// Backing store for escaped strings, keyed by the exact raw input.
enum Store {
    /// Grows with every distinct input; never evicts.
    Unbounded(HashMap<String, Arc<str>>),
    /// Evicts the least recently used entry once full.
    Bounded(LruCache<String, Arc<str>>),
}

/// Memoizing XML escaper.
///
/// Output is safe both as element content and inside double-quoted attribute
/// values. A cache hit returns a clone of the stored `Arc`, so identical raw
/// inputs share one allocation.
///
/// [`Escaper::global`] is the lazily created, process-wide cache that is
/// never cleared. Long-lived processes rendering many unrelated feeds should
/// hand a scoped [`Escaper::bounded`] to [`super::FeedWriter::with_escaper`]
/// instead.
pub struct Escaper {
    store: Mutex<Store>,
}

impl Escaper {
    /// A fresh cache with no size limit.
    pub fn unbounded() -> Self {
        Self {
            store: Mutex::new(Store::Unbounded(HashMap::new())),
        }
    }

    /// A fresh cache holding at most `capacity` entries.
    pub fn bounded(capacity: NonZeroUsize) -> Self {
        Self {
            store: Mutex::new(Store::Bounded(LruCache::new(capacity))),
        }
    }

    /// Builds a scoped cache from a configured capacity, `0` meaning unbounded.
    pub fn with_capacity(capacity: u64) -> Self {
        match usize::try_from(capacity).ok().and_then(NonZeroUsize::new) {
            Some(capacity) => Self::bounded(capacity),
            None => Self::unbounded(),
        }
    }

    /// The process-wide cache, created on first use.
    pub fn global() -> &'static Escaper {
        GLOBAL_ESCAPER.get_or_init(|| {
            tracing::trace!("Initializing process-wide escape cache");
            Escaper::unbounded()
        })
    }

    /// Escapes `raw`, consulting and filling the cache.
    ///
    /// Empty input returns empty output and is not cached.
    pub fn escape(&self, raw: &str) -> Arc<str> {
        if raw.is_empty() {
            return Arc::from("");
        }

        // The store only holds derived values, so a poisoned lock is still usable
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *store {
            Store::Unbounded(map) => {
                if let Some(hit) = map.get(raw) {
                    return Arc::clone(hit);
                }
                let escaped: Arc<str> = Arc::from(escape_markup(raw));
                map.insert(raw.to_owned(), Arc::clone(&escaped));
                escaped
            }
            Store::Bounded(lru) => {
                if let Some(hit) = lru.get(raw) {
                    return Arc::clone(hit);
                }
                let escaped: Arc<str> = Arc::from(escape_markup(raw));
                lru.put(raw.to_owned(), Arc::clone(&escaped));
                escaped
            }
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        match &*self.store.lock().unwrap_or_else(PoisonError::into_inner) {
            Store::Unbounded(map) => map.len(),
            Store::Bounded(lru) => lru.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_bounded(&self) -> bool {
        matches!(
            &*self.store.lock().unwrap_or_else(PoisonError::into_inner),
            Store::Bounded(_)
        )
    }
}

impl Default for Escaper {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl std::fmt::Debug for Escaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Escaper")
            .field("bounded", &self.is_bounded())
            .field("entries", &self.len())
            .finish()
    }
}

/// Escapes text through the process-wide cache.
pub fn escape_xml(raw: &str) -> Arc<str> {
    Escaper::global().escape(raw)
}

/// Uncached escaping of the five XML special characters.
///
/// `&` is replaced first so entities introduced by the later substitutions
/// are not escaped twice.
fn escape_markup(s: &str) -> Cow<'_, str> {
    // Fast path: check if escaping is needed
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}
