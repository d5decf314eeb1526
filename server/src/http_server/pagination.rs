use serde::{Deserialize, Serialize};
use url::Url;

/// Matches the original service's default page size.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl Pagination {
    pub fn page(self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(self) -> i64 {
        i64::from(self.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1))
    }

    pub fn offset(self) -> i64 {
        i64::from(self.page() - 1) * self.limit()
    }
}

/// The `{count, next, previous, results}` envelope around list responses.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(
        base: &Url,
        path: &str,
        pagination: Pagination,
        count: i64,
        results: Vec<T>,
    ) -> Self {
        let page = i64::from(pagination.page());
        let limit = pagination.limit();
        let total_pages = count.div_euclid(limit) + i64::from(count % limit != 0);

        let link = |target_page: i64| {
            let mut url = base.clone();
            url.set_path(path);
            url.set_query(Some(&format!("page={target_page}&limit={limit}")));
            url.to_string()
        };

        let next = (page < total_pages).then(|| link(page + 1));
        let previous = (page > 1).then(|| link(page - 1));

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:3000").unwrap()
    }

    fn paged(page: u32, limit: u32) -> Pagination {
        Pagination {
            page: Some(page),
            limit: Some(limit),
        }
    }

    #[test]
    fn defaults_to_first_page() {
        let pagination = Pagination::default();

        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.limit(), i64::from(DEFAULT_PAGE_SIZE));
        assert_eq!(pagination.offset(), 0);
    }

    #[test]
    fn offset_follows_page_and_limit() {
        assert_eq!(paged(3, 10).offset(), 20);
    }

    #[test]
    fn middle_page_links_both_ways() {
        let envelope = Paginated::new(&base(), "/api/recipes", paged(2, 10), 25, vec![1, 2]);

        assert_eq!(
            envelope.next.as_deref(),
            Some("http://localhost:3000/api/recipes?page=3&limit=10")
        );
        assert_eq!(
            envelope.previous.as_deref(),
            Some("http://localhost:3000/api/recipes?page=1&limit=10")
        );
    }

    #[test]
    fn boundary_pages_drop_dangling_links() {
        let first = Paginated::new(&base(), "/api/users", paged(1, 10), 25, vec![0]);
        assert!(first.previous.is_none());
        assert!(first.next.is_some());

        let last = Paginated::new(&base(), "/api/users", paged(3, 10), 25, vec![0]);
        assert!(last.next.is_none());
        assert!(last.previous.is_some());
    }

    #[test]
    fn empty_result_has_no_links() {
        let envelope = Paginated::new(&base(), "/api/users", Pagination::default(), 0, Vec::<i32>::new());

        assert!(envelope.next.is_none());
        assert!(envelope.previous.is_none());
        assert_eq!(envelope.count, 0);
    }
}
