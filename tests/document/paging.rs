//! Integration tests for the paged duplex stream

use proptest::prelude::*;
use warden_document::{DEFAULT_PAGE_SIZE_LIMIT, PagedDuplexStream};
use warden_foundation::ErrorKind;

proptest! {
    #[test]
    fn pages_stay_within_the_limit(
        limit in 1usize..40,
        chunks in prop::collection::vec("[a-z]{0,30}", 0..20),
    ) {
        let mut stream = PagedDuplexStream::new(limit);
        let mut pages = Vec::new();
        let mut committed = String::new();
        let mut failed = false;
        for chunk in &chunks {
            stream.write_str(chunk);
            match stream.commit() {
                Ok(()) => committed.push_str(chunk),
                Err(error) => {
                    prop_assert!(chunk.len() > limit);
                    let is_oversized = matches!(error.kind, ErrorKind::OversizedCommit { .. });
                    prop_assert!(is_oversized);
                    failed = true;
                    break;
                }
            }
            while let Some(page) = stream.read_page() {
                pages.push(page);
            }
        }
        if !failed {
            pages.extend(stream.finish().unwrap());
        }
        for page in &pages {
            prop_assert!(page.len() <= limit);
        }
        if failed {
            prop_assert!(committed.starts_with(&pages.concat()));
        } else {
            prop_assert_eq!(pages.concat(), committed);
        }
    }
}

#[test]
fn default_limit_is_twenty_thousand_bytes() {
    assert_eq!(PagedDuplexStream::default().size_limit(), DEFAULT_PAGE_SIZE_LIMIT);
    assert_eq!(DEFAULT_PAGE_SIZE_LIMIT, 20_000);
}

#[test]
fn pages_roll_only_on_commit() {
    let mut stream = PagedDuplexStream::new(8);
    stream.write_str("abcdef");
    stream.commit().unwrap();
    stream.write_str("ghijkl");
    assert!(stream.is_page_and_buffer_over_size());
    assert!(stream.peek_page().is_none());
    stream.commit().unwrap();
    assert_eq!(stream.peek_page(), Some("abcdef"));
    assert_eq!(stream.read_page().as_deref(), Some("abcdef"));
    assert_eq!(stream.finish().unwrap(), vec!["ghijkl".to_string()]);
}

#[test]
fn oversized_commits_leave_the_stream_untouched() {
    let mut stream = PagedDuplexStream::new(4);
    stream.write_str("ab");
    stream.commit().unwrap();
    stream.write_str("too long");
    let error = stream.commit().unwrap_err();
    assert!(error.is_oversized_commit());
    assert_eq!(error.to_string(), "commit of 8 bytes cannot fit in a page of 4 bytes");
    assert_eq!(stream.position(), 8);
    assert!(!stream.is_current_page_empty());
}
