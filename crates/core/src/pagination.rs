use crate::filter::FilterSpec;

/// Server-reported position. Never derived client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current: u32,
    total: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current: 1,
            total: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Previous(u32),
    Next(u32),
}

impl PageLink {
    pub fn target(self) -> u32 {
        match self {
            PageLink::Previous(page) | PageLink::Next(page) => page,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PageLink::Previous(_) => "Previous",
            PageLink::Next(_) => "Next",
        }
    }
}

impl Pagination {
    pub fn from_server(page: u32, total_pages: u32) -> Self {
        Self {
            current: page,
            total: total_pages,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn previous(&self) -> Option<PageLink> {
        (self.current > 1).then(|| PageLink::Previous(self.current - 1))
    }

    pub fn next(&self) -> Option<PageLink> {
        (self.current < self.total).then(|| PageLink::Next(self.current + 1))
    }

    pub fn links(&self) -> Vec<PageLink> {
        self.previous().into_iter().chain(self.next()).collect()
    }

    pub fn label(&self) -> String {
        format!("Page {} of {}", self.current, self.total.max(1))
    }

    fn contains(&self, page: u32) -> bool {
        page >= 1 && page <= self.total.max(1)
    }
}

/// Remembers the last query so page changes re-issue it.
#[derive(Debug, Clone, Default)]
pub struct PaginationController {
    last_filter: Option<FilterSpec>,
    pagination: Pagination,
}

impl PaginationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn last_filter(&self) -> Option<&FilterSpec> {
        self.last_filter.as_ref()
    }

    /// A new filter or search always starts on page 1.
    pub fn apply(&mut self, filter: FilterSpec) -> FilterSpec {
        let filter = filter.with_page(1);
        self.last_filter = Some(filter.clone());
        filter
    }

    /// Re-issues the last query for `page`. Pages outside `[1, total]` are refused.
    pub fn go_to_page(&mut self, page: u32) -> Option<FilterSpec> {
        if !self.pagination.contains(page) {
            tracing::debug!(page, total = self.pagination.total, "page out of range");
            return None;
        }
        let filter = self
            .last_filter
            .clone()
            .unwrap_or_else(FilterSpec::unfiltered)
            .with_page(page);
        self.last_filter = Some(filter.clone());
        Some(filter)
    }

    pub fn follow(&mut self, link: PageLink) -> Option<FilterSpec> {
        self.go_to_page(link.target())
    }

    /// Re-issues the last query on its current page.
    pub fn reload(&self) -> FilterSpec {
        self.last_filter
            .clone()
            .unwrap_or_else(FilterSpec::unfiltered)
    }

    pub fn on_response(&mut self, page: u32, total_pages: u32) {
        self.pagination = Pagination::from_server(page, total_pages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(1, 1, vec![])]
    #[case(1, 3, vec![PageLink::Next(2)])]
    #[case(2, 3, vec![PageLink::Previous(1), PageLink::Next(3)])]
    #[case(3, 3, vec![PageLink::Previous(2)])]
    #[case(1, 0, vec![])]
    fn links_respect_bounds(#[case] page: u32, #[case] total: u32, #[case] links: Vec<PageLink>) {
        assert_eq!(Pagination::from_server(page, total).links(), links);
    }

    #[test]
    fn label_uses_server_values() {
        assert_eq!(Pagination::from_server(2, 7).label(), "Page 2 of 7");
    }

    #[test]
    fn empty_result_still_counts_one_page() {
        let pagination = Pagination::from_server(1, 0);
        assert_eq!(pagination.label(), "Page 1 of 1");
        assert!(pagination.links().is_empty());
    }

    #[test]
    fn go_to_page_reuses_last_filter() {
        let mut controller = PaginationController::new();
        let mut filter = FilterSpec::unfiltered();
        filter.search_query = "drawer".into();
        controller.apply(filter);
        controller.on_response(1, 4);

        let next = controller.go_to_page(3).unwrap();

        assert_eq!(next.search_query, "drawer");
        assert_eq!(next.page, 3);
    }

    #[test]
    fn out_of_range_pages_are_refused() {
        let mut controller = PaginationController::new();
        controller.apply(FilterSpec::unfiltered());
        controller.on_response(1, 2);

        assert!(controller.go_to_page(0).is_none());
        assert!(controller.go_to_page(3).is_none());
        assert!(controller.go_to_page(2).is_some());
    }

    #[test]
    fn apply_resets_to_first_page() {
        let mut controller = PaginationController::new();
        controller.apply(FilterSpec::unfiltered());
        controller.on_response(1, 5);
        controller.go_to_page(4);

        let filter = controller.apply(FilterSpec::unfiltered().with_page(4));

        assert_eq!(filter.page, 1);
        assert_eq!(controller.reload().page, 1);
    }
}
