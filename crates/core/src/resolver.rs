use crate::api::{ApiError, PosUniverse};
use crate::options::OptionSet;

/// Single-slot guard for one resolution axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisGuard {
    #[default]
    Idle,
    InFlight,
}

impl AxisGuard {
    /// Claims the slot. Returns false while a request is already out.
    fn try_claim(&mut self) -> bool {
        match self {
            AxisGuard::Idle => {
                *self = AxisGuard::InFlight;
                true
            }
            AxisGuard::InFlight => false,
        }
    }

    fn release(&mut self) {
        *self = AxisGuard::Idle;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PosRequest {
    Universe,
    NamesForId(String),
    IdsForName(String),
}

/// Keeps the POS name and POS id selectors consistent with each other.
///
/// Selecting on one axis resolves the other. Filling a selector never
/// triggers a request of its own, so resolution cannot loop.
#[derive(Debug, Clone, Default)]
pub struct PosResolver {
    names: OptionSet,
    ids: OptionSet,
    names_guard: AxisGuard,
    ids_guard: AxisGuard,
}

impl PosResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &OptionSet {
        &self.names
    }

    pub fn ids(&self) -> &OptionSet {
        &self.ids
    }

    pub fn names_guard(&self) -> AxisGuard {
        self.names_guard
    }

    pub fn ids_guard(&self) -> AxisGuard {
        self.ids_guard
    }

    pub fn reset(&mut self) -> PosRequest {
        self.names.clear_selection();
        self.ids.clear_selection();
        PosRequest::Universe
    }

    /// Records a POS id choice and asks for its names unless a lookup is pending.
    pub fn select_id(&mut self, pos_id: &str) -> Option<PosRequest> {
        self.ids.select(pos_id);
        if pos_id.is_empty() {
            return None;
        }
        if !self.names_guard.try_claim() {
            tracing::debug!(pos_id, "POS name lookup already in flight; skipping");
            return None;
        }
        Some(PosRequest::NamesForId(pos_id.to_string()))
    }

    pub fn select_name(&mut self, pos_name: &str) -> Option<PosRequest> {
        self.names.select(pos_name);
        if pos_name.is_empty() {
            return None;
        }
        if !self.ids_guard.try_claim() {
            tracing::debug!(pos_name, "POS id lookup already in flight; skipping");
            return None;
        }
        Some(PosRequest::IdsForName(pos_name.to_string()))
    }

    pub fn complete_universe(&mut self, result: Result<PosUniverse, ApiError>) {
        match result {
            Ok(universe) => {
                tracing::debug!(
                    names = universe.pos_names.len(),
                    ids = universe.pos_ids.len(),
                    "loaded POS universe"
                );
                self.names.replace_all(universe.pos_names);
                self.ids.replace_all(universe.pos_ids);
            }
            Err(err) => tracing::warn!(error = %err, "failed to load POS names and ids"),
        }
    }

    pub fn complete_names(&mut self, result: Result<Vec<String>, ApiError>) {
        self.names_guard.release();
        match result {
            Ok(names) => self.names.fill_candidates(names),
            Err(err) => tracing::warn!(error = %err, "failed to resolve POS names"),
        }
    }

    pub fn complete_ids(&mut self, result: Result<Vec<String>, ApiError>) {
        self.ids_guard.release();
        match result {
            Ok(ids) => self.ids.fill_candidates(ids),
            Err(err) => tracing::warn!(error = %err, "failed to resolve POS ids"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn loaded() -> PosResolver {
        let mut resolver = PosResolver::new();
        resolver.complete_universe(Ok(PosUniverse {
            pos_names: owned(&["Airport", "Downtown"]),
            pos_ids: owned(&["1007", "2001", "2002"]),
        }));
        resolver
    }

    #[test]
    fn single_candidate_is_auto_selected() {
        let mut resolver = loaded();

        let request = resolver.select_id("1007");
        assert_eq!(request, Some(PosRequest::NamesForId("1007".into())));
        assert_eq!(resolver.names_guard(), AxisGuard::InFlight);

        resolver.complete_names(Ok(owned(&["Downtown"])));

        assert_eq!(resolver.names().selected(), "Downtown");
        assert_eq!(resolver.names_guard(), AxisGuard::Idle);
    }

    #[test]
    fn second_trigger_is_suppressed_while_in_flight() {
        let mut resolver = loaded();

        assert!(resolver.select_id("1007").is_some());
        assert_eq!(resolver.select_id("2001"), None);
        assert_eq!(resolver.ids().selected(), "2001");

        resolver.complete_names(Ok(owned(&["Downtown"])));
        assert!(resolver.select_id("2002").is_some());
    }

    #[test]
    fn axes_are_guarded_independently() {
        let mut resolver = loaded();
        assert!(resolver.select_id("1007").is_some());
        assert_eq!(
            resolver.select_name("Airport"),
            Some(PosRequest::IdsForName("Airport".into()))
        );
    }

    #[test]
    fn failure_keeps_previous_options_and_releases_guard() {
        let mut resolver = loaded();
        let before = resolver.names().clone();

        resolver.select_id("1007");
        resolver.complete_names(Err(ApiError::Transport("connection refused".into())));

        assert_eq!(resolver.names(), &before);
        assert_eq!(resolver.names_guard(), AxisGuard::Idle);
    }

    #[test]
    fn empty_selection_issues_no_request() {
        let mut resolver = loaded();
        assert_eq!(resolver.select_name(""), None);
        assert_eq!(resolver.ids_guard(), AxisGuard::Idle);
    }

    #[test]
    fn reset_clears_selections_and_requests_universe() {
        let mut resolver = loaded();
        resolver.select_name("Airport");
        resolver.complete_ids(Ok(owned(&["2001", "2002"])));

        assert_eq!(resolver.reset(), PosRequest::Universe);
        assert_eq!(resolver.names().selected(), "");
        assert_eq!(resolver.ids().selected(), "");
    }
}
