//! Size-bounded paging of rendered output.
//!
//! Render functions write into a pending buffer. Committing moves the buffer
//! onto the current page, starting a new page first if the page would grow
//! past the size limit. A page is ready to be read once it is no longer the
//! current page. Sizes are measured in bytes of UTF-8.

use std::collections::VecDeque;

use tracing::trace;
use warden_foundation::{Error, Result};

/// The default page size limit in bytes.
pub const DEFAULT_PAGE_SIZE_LIMIT: usize = 20_000;

/// A buffered stream of text split into bounded pages.
#[derive(Clone, Debug)]
pub struct PagedDuplexStream {
    buffer: String,
    pages: VecDeque<String>,
    size_limit: usize,
}

impl Default for PagedDuplexStream {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE_LIMIT)
    }
}

impl PagedDuplexStream {
    /// Creates a stream whose pages hold at most `size_limit` bytes.
    #[must_use]
    pub fn new(size_limit: usize) -> Self {
        Self {
            buffer: String::new(),
            pages: VecDeque::from([String::new()]),
            size_limit,
        }
    }

    /// Returns the page size limit.
    #[must_use]
    pub const fn size_limit(&self) -> usize {
        self.size_limit
    }

    /// Appends text to the pending buffer.
    pub fn write_str(&mut self, text: &str) -> &mut Self {
        self.buffer.push_str(text);
        self
    }

    /// Returns the length of the pending buffer.
    #[must_use]
    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the last character written, looking through the buffer and
    /// then the current page.
    #[must_use]
    pub fn last_char(&self) -> Option<char> {
        self.buffer
            .chars()
            .next_back()
            .or_else(|| self.current_page().chars().next_back())
    }

    fn current_page(&self) -> &str {
        self.pages.back().map_or("", String::as_str)
    }

    /// Returns true if nothing has been committed to the current page.
    #[must_use]
    pub fn is_current_page_empty(&self) -> bool {
        self.current_page().is_empty()
    }

    /// Returns true if committing the buffer now would overflow the current
    /// page.
    #[must_use]
    pub fn is_page_and_buffer_over_size(&self) -> bool {
        self.current_page().len().saturating_add(self.buffer.len()) > self.size_limit
    }

    /// Starts a new page unless the current page is empty.
    pub fn ensure_new_page(&mut self) {
        if !self.is_current_page_empty() {
            self.force_new_page();
        }
    }

    /// Starts a new page even if the current page is empty.
    pub fn force_new_page(&mut self) {
        trace!(
            page = self.pages.len(),
            length = self.current_page().len(),
            "starting new page"
        );
        self.pages.push_back(String::new());
    }

    /// Moves the buffer onto the current page, starting a new page first if
    /// it would not fit.
    ///
    /// # Errors
    ///
    /// Returns an oversized commit error if the buffer alone is larger than
    /// a page. The buffer and pages are left untouched in that case.
    pub fn commit(&mut self) -> Result<()> {
        if self.is_page_and_buffer_over_size() {
            if self.buffer.len() > self.size_limit {
                return Err(Error::oversized_commit(self.buffer.len(), self.size_limit));
            }
            self.ensure_new_page();
        }
        let buffer = std::mem::take(&mut self.buffer);
        match self.pages.back_mut() {
            Some(page) => page.push_str(&buffer),
            None => self.pages.push_back(buffer),
        }
        Ok(())
    }

    /// Returns the oldest completed page without removing it.
    #[must_use]
    pub fn peek_page(&self) -> Option<&str> {
        if self.pages.len() < 2 {
            return None;
        }
        self.pages.front().map(String::as_str)
    }

    /// Removes and returns the oldest completed page.
    pub fn read_page(&mut self) -> Option<String> {
        if self.pages.len() < 2 {
            return None;
        }
        self.pages.pop_front()
    }

    /// Commits whatever is still buffered and returns every remaining page,
    /// including the current one, leaving the stream empty.
    ///
    /// # Errors
    ///
    /// Returns an oversized commit error if the remaining buffer alone is
    /// larger than a page.
    pub fn finish(&mut self) -> Result<Vec<String>> {
        if !self.buffer.is_empty() {
            self.commit()?;
        }
        let pages = std::mem::replace(&mut self.pages, VecDeque::from([String::new()]));
        Ok(pages.into_iter().collect())
    }
}
