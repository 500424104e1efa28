use log::{debug, info};
use std::collections::HashMap;
use std::sync::RwLock;

/// Script whose decompiled body carries the localization map
pub const GETTEXT_SOURCE_SCRIPT: &str = "gml_Script_textdata_en";

const MAP_ADD_PREFIX: &str = "ds_map_add(global.text_data_en, \"";

/// Localization id to string-table index mapping, recovered by pattern
/// matching the textdata script's decompiled output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GettextTable {
    entries: HashMap<String, usize>,
}

impl GettextTable {
    /// Scan decompiled text for `ds_map_add(global.text_data_en, ...)`
    /// calls. Lines that do not match are unrelated setup code and are
    /// skipped.
    pub fn from_decompiled(text: &str) -> Self {
        let mut entries = HashMap::new();
        for line in text.split('\n') {
            if let Some((key, index)) = parse_map_add(line) {
                entries.insert(key.to_string(), index);
            }
        }
        debug!("recovered {} localization entries", entries.len());
        GettextTable { entries }
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.entries.get(key).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Match `ds_map_add(global.text_data_en, "<key>"@<k>, "<value>"@<v>)`
/// from the start of a line, yielding the key and the value's
/// string-table index
fn parse_map_add(line: &str) -> Option<(&str, usize)> {
    let rest = line.strip_prefix(MAP_ADD_PREFIX)?;
    let (key, rest) = rest.split_once("\"@")?;
    let (key_index, rest) = rest.split_once(", \"")?;
    if key_index.is_empty() || !key_index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (_value, tail) = rest.rsplit_once("\"@")?;
    let digit_end = tail
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(tail.len());
    if digit_end == 0 || !tail[digit_end..].starts_with(')') {
        return None;
    }
    let index = tail[..digit_end].parse().ok()?;
    Some((key, index))
}

/// Lifecycle of the process-wide localization table
#[derive(Debug)]
pub enum GettextState {
    Uninitialized,
    Building,
    Built(GettextTable),
}

/// Process-wide localization cache
///
/// Built at most once per session unless invalidated. The table is
/// published in one swap after the build completes, so readers observe
/// either no table or a complete one.
#[derive(Debug)]
pub struct GettextCache {
    state: RwLock<GettextState>,
}

impl Default for GettextCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GettextCache {
    pub fn new() -> Self {
        GettextCache {
            state: RwLock::new(GettextState::Uninitialized),
        }
    }

    /// Snapshot of the built table, if any
    pub fn table(&self) -> Option<GettextTable> {
        match &*self.state.read().expect("gettext state poisoned") {
            GettextState::Built(table) => Some(table.clone()),
            _ => None,
        }
    }

    pub fn is_built(&self) -> bool {
        matches!(
            &*self.state.read().expect("gettext state poisoned"),
            GettextState::Built(_)
        )
    }

    /// Build the table from the textdata script unless it is already
    /// built or being built
    ///
    /// `source` yields the script's decompiled text, or `None` when the
    /// script is absent. Absence leaves the cache unbuilt so a later
    /// session that does have the script can still build; a source that
    /// yields empty text publishes an empty table.
    pub fn ensure_built<F>(&self, source: F)
    where
        F: FnOnce() -> Option<String>,
    {
        if !self.begin_build() {
            return;
        }
        match source() {
            Some(text) => {
                let table = GettextTable::from_decompiled(&text);
                info!("localization table ready: {} keys", table.len());
                self.publish(table);
            }
            None => {
                debug!("localization source script absent, table not built");
                self.abandon();
            }
        }
    }

    /// Drop the table; the next decompile rebuilds it
    pub fn invalidate(&self) {
        let mut state = self.state.write().expect("gettext state poisoned");
        *state = GettextState::Uninitialized;
    }

    fn begin_build(&self) -> bool {
        let mut state = self.state.write().expect("gettext state poisoned");
        match *state {
            GettextState::Uninitialized => {
                *state = GettextState::Building;
                true
            }
            _ => false,
        }
    }

    fn publish(&self, table: GettextTable) {
        let mut state = self.state.write().expect("gettext state poisoned");
        *state = GettextState::Built(table);
    }

    fn abandon(&self) {
        let mut state = self.state.write().expect("gettext state poisoned");
        if matches!(*state, GettextState::Building) {
            *state = GettextState::Uninitialized;
        }
    }
}

lazy_static! {
    /// Process-wide instance consumed by the decompile pipeline
    pub static ref GETTEXT: GettextCache = GettextCache::new();
}
