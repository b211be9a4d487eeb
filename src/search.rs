use std::time::{Duration, Instant};

use crate::{defaults, objects::participant::Participant};

#[cfg(test)]
mod tests;

/// Case-insensitive name search over the rows currently on screen. Queries
/// only take effect once typing has been quiet for the debounce period.
#[derive(Debug, Clone)]
pub struct SearchIndexer {
    debounce: Duration,
    pending: Option<(String, Instant)>,
    query: String,
    matches: Vec<usize>,
    cursor: Option<usize>,
}

impl Default for SearchIndexer {
    fn default() -> Self {
        SearchIndexer::new(Duration::from_millis(defaults::DEFAULT_SEARCH_DEBOUNCE_MS))
    }
}

impl SearchIndexer {
    pub fn new(debounce: Duration) -> SearchIndexer {
        SearchIndexer {
            debounce,
            pending: None,
            query: String::new(),
            matches: Vec::new(),
            cursor: None,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Records a keystroke. Each call restarts the quiet period.
    pub fn set_query(&mut self, query: &str, now: Instant) {
        self.pending = Some((String::from(query), now));
    }

    /// Applies the pending query if it has been quiet long enough. Returns
    /// true when the matches were recomputed.
    pub fn poll(&mut self, now: Instant, subset: &[Participant]) -> bool {
        let due = match &self.pending {
            Some((_, at)) => now.saturating_duration_since(*at) >= self.debounce,
            None => false,
        };
        if !due {
            return false
        }
        if let Some((query, _)) = self.pending.take() {
            self.search(&query, subset);
        }
        true
    }

    /// Runs a query immediately, skipping the debounce.
    pub fn search(&mut self, query: &str, subset: &[Participant]) {
        self.query = String::from(query);
        self.refresh(subset);
    }

    /// Re-runs the current query against a changed subset.
    pub fn refresh(&mut self, subset: &[Participant]) {
        if self.query.is_empty() {
            self.matches.clear();
            self.cursor = None;
            return
        }
        let needle = self.query.to_lowercase();
        self.matches = subset.iter().enumerate()
            .filter(|(_, p)| p.name().to_lowercase().contains(&needle))
            .map(|(ix, _)| ix)
            .collect();
        self.cursor = if self.matches.is_empty() { None } else { Some(0) };
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    /// Position within `matches`, not a subset index.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Subset index the cursor points at, the row to scroll to.
    pub fn current(&self) -> Option<usize> {
        self.cursor.and_then(|c| self.matches.get(c).copied())
    }

    pub fn next(&mut self) -> Option<usize> {
        self.step(true)
    }

    pub fn prev(&mut self) -> Option<usize> {
        self.step(false)
    }

    fn step(&mut self, forward: bool) -> Option<usize> {
        let len = self.matches.len();
        if len == 0 {
            return None
        }
        let cursor = match self.cursor {
            None => 0,
            Some(c) if forward => (c + 1) % len,
            Some(c) => (c + len - 1) % len,
        };
        self.cursor = Some(cursor);
        self.current()
    }
}

/// Splits `text` into runs that do or don't match `query`, ignoring case.
pub fn highlight_spans(text: &str, query: &str) -> Vec<(String, bool)> {
    let needle: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return vec![(String::from(text), false)]
    }
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut output: Vec<(String, bool)> = Vec::new();
    let mut plain_from: usize = 0;
    let mut ix: usize = 0;
    while ix < chars.len() {
        match match_len(&chars[ix..], &needle) {
            Some(len) => {
                let start = chars[ix].0;
                let end = chars.get(ix + len).map(|(b, _)| *b).unwrap_or(text.len());
                if plain_from < start {
                    output.push((String::from(&text[plain_from..start]), false));
                }
                output.push((String::from(&text[start..end]), true));
                plain_from = end;
                ix += len;
            },
            None => ix += 1,
        }
    }
    if plain_from < text.len() {
        output.push((String::from(&text[plain_from..]), false));
    }
    output
}

// number of text chars consumed when `needle` matches at the front of `chars`
fn match_len(chars: &[(usize, char)], needle: &[char]) -> Option<usize> {
    let mut matched: usize = 0;
    for (count, (_, c)) in chars.iter().enumerate() {
        for lower in c.to_lowercase() {
            if matched >= needle.len() || needle[matched] != lower {
                return None
            }
            matched += 1;
        }
        if matched == needle.len() {
            return Some(count + 1)
        }
    }
    None
}
