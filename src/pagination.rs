//! Common functionality for paging list data.

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of rows to display per page.
    pub page_size: u64,
    /// The maximum number of numbered pages to show in the pagination indicator.
    pub max_indicator_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            page_size: 10,
            max_indicator_pages: 5,
        }
    }
}

/// The page window of a list query, derived from a row count and the
/// requested page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    /// The 1-based page being displayed. Out-of-range requests are clamped.
    pub current_page: u64,
    /// The total number of pages. At least 1, even with no rows.
    pub page_count: u64,
    /// The number of rows per page.
    pub page_size: u64,
}

impl Pager {
    /// Create a pager for `row_count` rows, clamping `requested_page` into the
    /// valid range.
    pub fn new(row_count: u64, requested_page: u64, page_size: u64) -> Self {
        let page_count = row_count.div_ceil(page_size).max(1);
        let current_page = requested_page.clamp(1, page_count);

        Self {
            current_page,
            page_count,
            page_size,
        }
    }

    /// The number of rows to skip for the current page, for use in an SQL
    /// OFFSET clause.
    pub fn offset(&self) -> u64 {
        (self.current_page - 1) * self.page_size
    }

    /// The sequence of indicators to render for this pager.
    pub fn indicators(&self, max_indicator_pages: u64) -> Vec<PaginationIndicator> {
        create_pagination_indicators(self.current_page, self.page_count, max_indicator_pages)
    }
}

/// An element of the pagination control under a list page.
#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    /// A link to another page.
    Page(u64),
    /// The page currently displayed.
    CurrPage(u64),
    /// A gap between page links.
    Ellipsis,
    /// A link to the next page.
    NextButton(u64),
    /// A link to the previous page.
    BackButton(u64),
}

fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let map_page = |page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    };

    let mut indicators: Vec<PaginationIndicator> = if page_count <= max_pages {
        (1..=page_count).map(map_page).collect()
    } else if curr_page <= (max_pages / 2) {
        (1..=max_pages).map(map_page).collect()
    } else if curr_page > (page_count - max_pages / 2) {
        ((page_count - max_pages + 1)..=page_count)
            .map(map_page)
            .collect()
    } else {
        ((curr_page - max_pages / 2)..=(curr_page + max_pages / 2))
            .map(map_page)
            .collect()
    };

    if page_count > max_pages {
        if curr_page > (max_pages / 2) + 1 {
            indicators.insert(0, PaginationIndicator::Page(1));
            indicators.insert(1, PaginationIndicator::Ellipsis);
        }

        if curr_page < (page_count - max_pages / 2) {
            indicators.push(PaginationIndicator::Ellipsis);
            indicators.push(PaginationIndicator::Page(page_count));
        }
    }

    if curr_page > 1 {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

#[cfg(test)]
mod pager_tests {
    use crate::pagination::Pager;

    #[test]
    fn computes_page_count_and_offset() {
        let pager = Pager::new(35, 2, 10);

        assert_eq!(pager.page_count, 4);
        assert_eq!(pager.current_page, 2);
        assert_eq!(pager.offset(), 10);
    }

    #[test]
    fn empty_list_has_one_page() {
        let pager = Pager::new(0, 1, 10);

        assert_eq!(pager.page_count, 1);
        assert_eq!(pager.current_page, 1);
        assert_eq!(pager.offset(), 0);
    }

    #[test]
    fn clamps_out_of_range_pages() {
        let pager = Pager::new(35, 99, 10);
        assert_eq!(pager.current_page, 4);

        let pager = Pager::new(35, 0, 10);
        assert_eq!(pager.current_page, 1);
    }
}
