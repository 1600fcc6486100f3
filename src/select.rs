use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Multi-select over a caller-owned selection set
// ---------------------------------------------------------------------------

/// Multi-select control for territory names.
///
/// The selection set is owned by the caller and changed only through the
/// replacement sets returned here; the control owns the ordered item list
/// and its open/closed display flag. The flag has no bearing on selection
/// correctness. Item entries are not deduplicated; uniqueness is the
/// caller's responsibility.
#[derive(Debug, Clone, Default)]
pub struct TerritorySelect {
    items: Vec<String>,
    open: bool,
}

impl TerritorySelect {
    pub fn new(items: Vec<String>) -> Self {
        TerritorySelect { items, open: false }
    }

    /// The selectable items, in their original order.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Flip `item`'s membership, returning the replacement selection.
    pub fn toggle(&self, selected: &BTreeSet<String>, item: &str) -> BTreeSet<String> {
        let mut next = selected.clone();
        if !next.remove(item) {
            next.insert(item.to_string());
        }
        next
    }

    /// Exactly the current item list, regardless of prior selection.
    pub fn select_all(&self) -> BTreeSet<String> {
        self.items.iter().cloned().collect()
    }

    /// The empty selection.
    pub fn clear_all(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }

    /// Label for the collapsed control.
    pub fn summary(&self, selected: &BTreeSet<String>) -> String {
        match selected.len() {
            0 => "none selected".to_string(),
            n => format!("{n} selected"),
        }
    }

    /// Whether the selectable list is visible. Display-only state.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Flip the list's visibility (click on the summary control).
    pub fn toggle_open(&mut self) {
        self.open = !self.open;
    }
}

// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn control() -> TerritorySelect {
        TerritorySelect::new(vec!["B".into(), "A".into(), "C".into()])
    }

    #[test]
    fn toggle_twice_is_an_involution() {
        let control = control();
        let initial: BTreeSet<String> = ["A".to_string()].into();

        let once = control.toggle(&initial, "B");
        assert!(once.contains("B"));
        let twice = control.toggle(&once, "B");
        assert_eq!(twice, initial);

        // Also holds for an initially-present item.
        let removed = control.toggle(&initial, "A");
        assert!(removed.is_empty());
        assert_eq!(control.toggle(&removed, "A"), initial);
    }

    #[test]
    fn toggle_never_reorders_items() {
        let control = control();
        let _ = control.toggle(&BTreeSet::new(), "C");
        assert_eq!(control.items(), ["B", "A", "C"]);
    }

    #[test]
    fn select_all_is_a_full_replacement() {
        let control = control();
        // Prior selection is irrelevant; the result is exactly the items.
        let expected: BTreeSet<String> = ["A", "B", "C"].map(String::from).into();
        assert_eq!(control.select_all(), expected);
    }

    #[test]
    fn select_all_then_clear_all_is_empty() {
        let control = control();
        let all = control.select_all();
        assert!(!all.is_empty());
        assert!(control.clear_all().is_empty());
    }

    #[test]
    fn open_flag_does_not_affect_selection() {
        let mut control = control();
        assert!(!control.is_open());
        control.toggle_open();
        assert!(control.is_open());

        let selected = control.toggle(&BTreeSet::new(), "A");
        control.toggle_open();
        assert!(!control.is_open());
        assert!(selected.contains("A"));
    }

    #[test]
    fn summary_counts_the_selection() {
        let control = control();
        assert_eq!(control.summary(&BTreeSet::new()), "none selected");
        assert_eq!(control.summary(&control.select_all()), "3 selected");
    }
}
