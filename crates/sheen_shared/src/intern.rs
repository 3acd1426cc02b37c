//! Interned string table
//!
//! Identifiers and strings referenced by compiled declarations and computed styles are
//! deduplicated through an [`Interner`]. Interned strings ([`Istr`]) are reference counted and can
//! be shared freely between threads. The table itself keeps one reference to every entry; entries
//! that nobody else references any more are released by [`Interner::purge`].

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::Mutex;

/// A reference counted, interned string
#[derive(Clone)]
pub struct Istr(Arc<str>);

impl Istr {
    /// Creates a string that is not entered in any table
    #[must_use]
    pub fn detached(s: &str) -> Istr {
        Istr(Arc::from(s))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when both handles point to the same table entry
    #[must_use]
    pub fn ptr_eq(&self, other: &Istr) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// ASCII case-insensitive comparison, which is what CSS keywords use
    #[must_use]
    pub fn eq_ignore_ascii_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }

    /// Number of live references to this string (including the one held by the table)
    #[must_use]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl PartialEq for Istr {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl Eq for Istr {}

impl Hash for Istr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Deref for Istr {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Istr {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Istr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Istr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Istr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

lazy_static! {
    static ref GLOBAL_INTERNER: Interner = Interner::new();
}

/// Handle to an interned string table. Cloning the handle shares the table.
#[derive(Clone, Default)]
pub struct Interner {
    table: Arc<Mutex<HashSet<Arc<str>>>>,
}

impl Interner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process wide table. Parsing never feeds it unless it is handed to the parser explicitly.
    #[must_use]
    pub fn global() -> &'static Interner {
        &GLOBAL_INTERNER
    }

    /// Returns the interned version of `s`, adding it to the table when needed
    pub fn intern(&self, s: &str) -> Istr {
        let mut table = self.table.lock();
        if let Some(existing) = table.get(s) {
            return Istr(existing.clone());
        }

        let entry: Arc<str> = Arc::from(s);
        table.insert(entry.clone());
        Istr(entry)
    }

    /// Number of entries in the table
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }

    /// Releases every entry that is only referenced by the table itself. Returns the number of
    /// released entries.
    pub fn purge(&self) -> usize {
        let mut table = self.table.lock();
        let before = table.len();
        table.retain(|entry| Arc::strong_count(entry) > 1);
        let released = before - table.len();
        if released > 0 {
            log::trace!("interner: released {released} unreferenced strings");
        }
        released
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interner").field("len", &self.len()).finish()
    }
}
