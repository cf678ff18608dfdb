//! Transit string cache.
//!
//! Writers replace repeated cacheable strings with `^N` codes; readers keep
//! the same table so codes resolve to the string seen at that position.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::error::ValueError;

/// Marker opening an array-encoded map.
pub const MAP_AS_ARRAY: &str = "^ ";

const SUB: char = '^';
const CACHE_CODE_DIGITS: u32 = 44;
const BASE_CHAR_INDEX: u32 = 48;
const MIN_SIZE_CACHEABLE: usize = 4;
const MAX_CACHE_ENTRIES: usize = (CACHE_CODE_DIGITS * CACHE_CODE_DIGITS) as usize;

/// Whether `s` is a cache reference rather than a literal string.
pub fn is_cache_code(s: &str) -> bool {
    s.len() > 1 && s.starts_with(SUB) && s != MAP_AS_ARRAY
}

/// Whether `s` enters the cache when written (or read) in this position.
pub fn is_cacheable(s: &str, as_map_key: bool) -> bool {
    s.len() >= MIN_SIZE_CACHEABLE
        && (as_map_key || s.starts_with("~:") || s.starts_with("~$") || s.starts_with("~#"))
}

fn index_to_code(index: usize) -> String {
    let index = index as u32;
    let digit = |n: u32| char::from_u32(n + BASE_CHAR_INDEX).unwrap_or(SUB);
    let hi = index / CACHE_CODE_DIGITS;
    let lo = index % CACHE_CODE_DIGITS;
    if hi == 0 {
        format!("{SUB}{}", digit(lo))
    } else {
        format!("{SUB}{}{}", digit(hi), digit(lo))
    }
}

fn code_to_index(code: &str) -> Option<usize> {
    let digit = |c: char| {
        let n = (c as u32).checked_sub(BASE_CHAR_INDEX)?;
        (n < CACHE_CODE_DIGITS).then_some(n as usize)
    };
    let mut chars = code.strip_prefix(SUB)?.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(lo), None, None) => digit(lo),
        (Some(hi), Some(lo), None) => Some(digit(hi)? * CACHE_CODE_DIGITS as usize + digit(lo)?),
        _ => None,
    }
}

/// Cache used while emitting.
#[derive(Debug, Default)]
pub struct WriteCache {
    codes: HashMap<String, String>,
}

impl WriteCache {
    /// Return the code for `s` if it was seen before, otherwise record it and
    /// return `s` itself.
    pub fn cache_write<'a>(&mut self, s: &'a str, as_map_key: bool) -> Cow<'a, str> {
        if !is_cacheable(s, as_map_key) {
            return Cow::Borrowed(s);
        }
        if let Some(code) = self.codes.get(s) {
            return Cow::Owned(code.clone());
        }
        if self.codes.len() == MAX_CACHE_ENTRIES {
            self.codes.clear();
        }
        let code = index_to_code(self.codes.len());
        self.codes.insert(s.to_owned(), code);
        Cow::Borrowed(s)
    }
}

/// Cache used while reading.
#[derive(Debug, Default)]
pub struct ReadCache {
    entries: Vec<String>,
}

impl ReadCache {
    /// Resolve a cache code, or record a cacheable string and return it.
    pub fn cache_read(&mut self, s: String, as_map_key: bool) -> Result<String, ValueError> {
        if is_cache_code(&s) {
            return code_to_index(&s)
                .and_then(|index| self.entries.get(index))
                .cloned()
                .ok_or(ValueError::InvalidCacheRef(s));
        }
        if is_cacheable(&s, as_map_key) {
            if self.entries.len() == MAX_CACHE_ENTRIES {
                self.entries.clear();
            }
            self.entries.push(s.clone());
        }
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for index in [0, 1, 43, 44, 45, 100, MAX_CACHE_ENTRIES - 1] {
            assert_eq!(code_to_index(&index_to_code(index)), Some(index), "{index}");
        }
        assert_eq!(index_to_code(0), "^0");
        assert_eq!(index_to_code(44), "^10");
    }

    #[test]
    fn test_cacheable() {
        assert!(is_cacheable("name", true));
        assert!(!is_cacheable("name", false));
        assert!(!is_cacheable("abc", true));
        assert!(is_cacheable("~:page-id", false));
        assert!(is_cacheable("~#point", false));
        assert!(is_cacheable("~:id", false));
        assert!(!is_cacheable("~:x", false));
        assert!(!is_cacheable("~uabc", false));
    }

    #[test]
    fn test_is_cache_code() {
        assert!(is_cache_code("^0"));
        assert!(is_cache_code("^1A"));
        assert!(!is_cache_code("^ "));
        assert!(!is_cache_code("^"));
        assert!(!is_cache_code("name"));
    }

    #[test]
    fn test_write_then_read_mirror() {
        let mut write = WriteCache::default();
        assert_eq!(write.cache_write("~:page-id", true), "~:page-id");
        assert_eq!(write.cache_write("~:page-id", true), "^0");
        assert_eq!(write.cache_write("short", false), "short");
        assert_eq!(write.cache_write("~:frame-id", false), "~:frame-id");
        assert_eq!(write.cache_write("~:frame-id", false), "^1");

        let mut read = ReadCache::default();
        assert_eq!(read.cache_read("~:page-id".into(), true).unwrap(), "~:page-id");
        assert_eq!(read.cache_read("^0".into(), true).unwrap(), "~:page-id");
        assert_eq!(read.cache_read("~:frame-id".into(), false).unwrap(), "~:frame-id");
        assert_eq!(read.cache_read("^1".into(), false).unwrap(), "~:frame-id");
    }

    #[test]
    fn test_unknown_code() {
        let mut read = ReadCache::default();
        assert_eq!(
            read.cache_read("^5".into(), false).unwrap_err(),
            ValueError::InvalidCacheRef("^5".into())
        );
    }
}
