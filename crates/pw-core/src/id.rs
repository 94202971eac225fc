use crate::model::WidgetKind;
use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use winnow::ascii::digit1;
use winnow::prelude::*;
use winnow::token::take_while;

/// String interner for widget ids: O(1) compare and hash, 4-byte handles.
///
/// Interning is content-addressed: it never allocates ids, so it holds no
/// per-project state. Id allocation lives in [`IdCounters`].
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Identifier of a widget within a project (e.g. `button3`, `login_panel`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetId(Spur);

impl WidgetId {
    /// Intern a string as a WidgetId, or return the existing handle.
    pub fn intern(s: &str) -> Self {
        WidgetId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    /// Parent references that mean "the design surface" in project files.
    pub fn is_surface_alias(&self) -> bool {
        matches!(self.as_str(), "" | "root")
    }
}

impl fmt::Debug for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WidgetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WidgetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(WidgetId::intern(&s))
    }
}

// ─── Generated ids ───────────────────────────────────────────────────────

fn kind_prefix<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_lowercase()).parse_next(input)
}

fn counter_suffix(input: &mut &str) -> ModalResult<u32> {
    digit1.try_map(|digits: &str| digits.parse::<u32>()).parse_next(input)
}

/// Split a factory-style id (`"button12"`) into its kind and number.
///
/// Returns `None` for ids that do not follow the `<kind><n>` shape or whose
/// prefix is not a known widget kind (`"login_btn"`, `"Panel3"`, `"x"`).
pub fn parse_generated_id(id: &str) -> Option<(WidgetKind, u32)> {
    let (prefix, n) = (kind_prefix, counter_suffix).parse(id).ok()?;
    Some((WidgetKind::from_type_name(prefix)?, n))
}

/// The generated id `<kind><n>`, e.g. `button3`.
pub fn generated_id(kind: WidgetKind, n: u32) -> WidgetId {
    WidgetId::intern(&format!("{}{n}", kind.type_name()))
}

/// Per-kind id counters owned by a widget tree.
///
/// Each kind starts at 1 and only ever increases, so deleting `button2`
/// never causes `button2` to be handed out again in the same session.
#[derive(Debug, Clone, Default)]
pub struct IdCounters {
    next: HashMap<WidgetKind, u32>,
}

impl IdCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number the next id of `kind` will carry.
    pub fn peek(&self, kind: WidgetKind) -> u32 {
        self.next.get(&kind).copied().unwrap_or(1)
    }

    /// Hand out the next id for `kind` and advance its counter.
    ///
    /// Returns `None` once the counter has run out of `u32` suffixes.
    pub fn allocate(&mut self, kind: WidgetKind) -> Option<WidgetId> {
        let slot = self.next.entry(kind).or_insert(1);
        let n = *slot;
        *slot = n.checked_add(1)?;
        Some(generated_id(kind, n))
    }

    /// Make sure future allocations never collide with an existing id.
    ///
    /// A suffix of `u32::MAX` is never allocated, so it is not observed.
    pub fn observe(&mut self, id: WidgetId) {
        if let Some((kind, n)) = parse_generated_id(id.as_str())
            && let Some(next) = n.checked_add(1)
        {
            let slot = self.next.entry(kind).or_insert(1);
            *slot = (*slot).max(next);
        }
    }

    /// Reset all counters and reseed them from a loaded project's ids.
    pub fn reseed<I: IntoIterator<Item = WidgetId>>(&mut self, ids: I) {
        self.next.clear();
        for id in ids {
            self.observe(id);
        }
        log::debug!("id counters reseeded: {:?}", self.next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = WidgetId::intern("login_panel");
        let b = WidgetId::intern("login_panel");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "login_panel");
    }

    #[test]
    fn surface_aliases() {
        assert!(WidgetId::intern("").is_surface_alias());
        assert!(WidgetId::intern("root").is_surface_alias());
        assert!(!WidgetId::intern("panel1").is_surface_alias());
    }

    #[test]
    fn parses_generated_ids() {
        assert_eq!(
            parse_generated_id("button12"),
            Some((WidgetKind::Button, 12))
        );
        assert_eq!(
            parse_generated_id("textinput3"),
            Some((WidgetKind::TextInput, 3))
        );
        assert_eq!(parse_generated_id("login_btn"), None);
        assert_eq!(parse_generated_id("Panel3"), None);
        assert_eq!(parse_generated_id("panel"), None);
        assert_eq!(parse_generated_id("widget7"), None);
        assert_eq!(parse_generated_id("panel7b"), None);
    }

    #[test]
    fn counters_are_per_kind() {
        let mut counters = IdCounters::new();
        let id = WidgetId::intern;
        assert_eq!(counters.allocate(WidgetKind::Button), Some(id("button1")));
        assert_eq!(counters.allocate(WidgetKind::Button), Some(id("button2")));
        assert_eq!(counters.allocate(WidgetKind::Panel), Some(id("panel1")));
    }

    #[test]
    fn exhausted_counter_stops_allocating() {
        let mut counters = IdCounters::new();
        counters.observe(WidgetId::intern("button4294967295"));
        assert_eq!(counters.peek(WidgetKind::Button), 1);

        counters.observe(WidgetId::intern("button4294967294"));
        assert_eq!(counters.peek(WidgetKind::Button), u32::MAX);
        assert_eq!(counters.allocate(WidgetKind::Button), None);
        assert_eq!(counters.allocate(WidgetKind::Button), None);
        assert_eq!(counters.peek(WidgetKind::Button), u32::MAX);
    }

    #[test]
    fn reseed_uses_max_suffix() {
        let mut counters = IdCounters::new();
        counters.allocate(WidgetKind::Label);
        counters.reseed(
            ["button4", "button9", "panel2", "custom_name"]
                .into_iter()
                .map(WidgetId::intern),
        );
        assert_eq!(counters.peek(WidgetKind::Button), 10);
        assert_eq!(counters.peek(WidgetKind::Panel), 3);
        // Reseed resets counters that no loaded id mentions.
        assert_eq!(counters.peek(WidgetKind::Label), 1);
    }
}
