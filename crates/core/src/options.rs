pub const ALL_LABEL: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub value: String,
    pub label: String,
}

impl DropdownOption {
    fn sentinel() -> Self {
        Self {
            value: String::new(),
            label: ALL_LABEL.to_string(),
        }
    }

    fn from_value(value: String) -> Self {
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// A selector's options. The first entry is always the "All" sentinel whose
/// value is the empty string. Contents are only ever replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    options: Vec<DropdownOption>,
    selected: usize,
}

impl Default for OptionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionSet {
    pub fn new() -> Self {
        Self {
            options: vec![DropdownOption::sentinel()],
            selected: 0,
        }
    }

    /// Replaces every option. Selection falls back to the sentinel.
    pub fn replace_all<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.options = std::iter::once(DropdownOption::sentinel())
            .chain(
                values
                    .into_iter()
                    .filter(|value| !value.is_empty())
                    .map(DropdownOption::from_value),
            )
            .collect();
        self.selected = 0;
    }

    /// Replaces every option and auto-selects a lone candidate.
    pub fn fill_candidates<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.replace_all(values);
        if self.candidate_count() == 1 {
            self.selected = 1;
        }
    }

    pub fn options(&self) -> &[DropdownOption] {
        &self.options
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.options.iter().skip(1).map(|option| option.value.as_str())
    }

    pub fn candidate_count(&self) -> usize {
        self.options.len() - 1
    }

    /// Value of the current selection; empty for "All".
    pub fn selected(&self) -> &str {
        self.options
            .get(self.selected)
            .map(|option| option.value.as_str())
            .unwrap_or_default()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Selects `value` if present. An empty value selects the sentinel.
    pub fn select(&mut self, value: &str) -> bool {
        match self.options.iter().position(|option| option.value == value) {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn new_set_only_holds_the_sentinel() {
        let set = OptionSet::new();
        assert_eq!(set.options().len(), 1);
        assert_eq!(set.options()[0].label, ALL_LABEL);
        assert_eq!(set.selected(), "");
    }

    #[test]
    fn replace_all_resets_selection() {
        let mut set = OptionSet::new();
        set.replace_all(owned(&["Downtown", "Airport"]));
        assert!(set.select("Airport"));

        set.replace_all(owned(&["Airport", "Harbor"]));

        assert_eq!(set.selected(), "");
        assert_eq!(set.values().collect::<Vec<_>>(), vec!["Airport", "Harbor"]);
    }

    #[test]
    fn fill_candidates_auto_selects_single_value() {
        let mut set = OptionSet::new();
        set.fill_candidates(owned(&["Downtown"]));
        assert_eq!(set.selected(), "Downtown");

        set.fill_candidates(owned(&["Downtown", "Airport"]));
        assert_eq!(set.selected(), "");
    }

    #[test]
    fn select_rejects_unknown_values() {
        let mut set = OptionSet::new();
        set.replace_all(owned(&["1007"]));
        assert!(!set.select("2000"));
        assert!(set.select(""));
        assert_eq!(set.selected_index(), 0);
    }
}
