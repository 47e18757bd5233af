use bookcat_dal::Batch;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Requested page of a listing, as given in `page` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Number(u32),
    Last,
}

impl PageRequest {
    /// Missing or empty parameter means first page, anything else than positive number or `last` is not found
    pub fn parse(raw: Option<&str>) -> AppResult<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(PageRequest::Number(1)),
            Some("last") => Ok(PageRequest::Last),
            Some(n) => match n.parse::<u32>() {
                Ok(n) if n >= 1 => Ok(PageRequest::Number(n)),
                _ => Err(AppError::NotFound("Invalid page".to_string())),
            },
        }
    }

    /// Resolves to page number within available pages, empty listing still has first page
    pub fn resolve(self, total: u64, page_size: u32) -> AppResult<u32> {
        let total_pages = total_pages(total, page_size)?;
        match self {
            PageRequest::Last => Ok(total_pages),
            PageRequest::Number(n) if n <= total_pages => Ok(n),
            PageRequest::Number(_) => Err(AppError::NotFound("Page".to_string())),
        }
    }
}

fn total_pages(total: u64, page_size: u32) -> Result<u32, std::num::TryFromIntError> {
    let pages = total.div_ceil(page_size.max(1) as u64).max(1);
    u32::try_from(pages)
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    page: u32,
    page_size: u32,
    total_pages: u32,
    total: u64,
    previous_page: Option<u32>,
    next_page: Option<u32>,
    rows: Vec<T>,
}

impl<T> Page<T>
where
    T: Serialize,
{
    pub fn try_from_batch(
        batch: Batch<T>,
        page_size: u32,
    ) -> Result<Self, std::num::TryFromIntError> {
        let page = u32::try_from(batch.offset)? / page_size.max(1) + 1;
        let total_pages = total_pages(batch.total, page_size)?;
        Ok(Self {
            page,
            page_size,
            total_pages,
            total: batch.total,
            previous_page: (page > 1).then(|| page - 1),
            next_page: (page < total_pages).then(|| page + 1),
            rows: batch.rows,
        })
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }
}
