//! # Package Name Normalization
//!
//! System and language package managers spell the same logical package
//! differently: `typing_extensions`, `typing-extensions` and
//! `Typing.Extensions` all refer to one distribution. Every comparison between
//! package names in lockweave goes through [`normalize`], which lowercases the
//! name and collapses each run of `-`, `_` and `.` to a single `-`.
//!
//! Leading separators survive as a single `-`, so a virtual marker such as
//! `__glibc` can never collide with a real package called `glibc`.
//!
//! [`NameIndex`] memoizes spelling-to-canonical conversions. It is plain owned
//! state: each merge or propagation builds its own, so platforms processed in
//! parallel never share a table.

use std::collections::HashMap;

/// Returns true for the characters treated as interchangeable separators.
pub fn is_separator(c: char) -> bool {
    matches!(c, '-' | '_' | '.')
}

/// Canonicalize a package name.
///
/// Pure and total: every input produces an output, and two names that differ
/// only in case or separator choice produce the same output.
pub fn normalize(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut in_separator_run = false;
    for c in name.chars() {
        if is_separator(c) {
            if !in_separator_run {
                canonical.push('-');
                in_separator_run = true;
            }
        } else {
            canonical.extend(c.to_lowercase());
            in_separator_run = false;
        }
    }
    canonical
}

/// Every single-separator spelling of `name`, starting with `name` itself.
///
/// Each separator run is rewritten with one of `-`, `_`, `.` in turn. The
/// result has no duplicates.
pub fn separator_variants(name: &str) -> Vec<String> {
    let mut variants = vec![name.to_string()];
    for sep in ['-', '_', '.'] {
        let mut variant = String::with_capacity(name.len());
        let mut in_separator_run = false;
        for c in name.chars() {
            if is_separator(c) {
                if !in_separator_run {
                    variant.push(sep);
                    in_separator_run = true;
                }
            } else {
                variant.push(c);
                in_separator_run = false;
            }
        }
        if !variants.contains(&variant) {
            variants.push(variant);
        }
    }
    variants
}

/// Whether `name` is a virtual marker (a platform capability rather than an
/// installable package).
pub fn is_virtual(name: &str, prefix: &str) -> bool {
    !prefix.is_empty() && name.starts_with(prefix)
}

/// Memo table from manager-local spellings to canonical names.
#[derive(Debug, Default, Clone)]
pub struct NameIndex {
    canonical: HashMap<String, String>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical form of `spelling`, computed once per distinct spelling.
    pub fn canonical(&mut self, spelling: &str) -> &str {
        self.canonical
            .entry(spelling.to_string())
            .or_insert_with(|| normalize(spelling))
    }

    /// Number of distinct spellings seen so far.
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }
}
