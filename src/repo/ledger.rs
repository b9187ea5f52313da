use std::collections::VecDeque;

/// Append-only log that drops its oldest entries past `cap`.
#[derive(Debug, Clone)]
pub struct Ledger<T> {
    entries: VecDeque<T>,
    cap: usize,
}

impl<T: Clone> Ledger<T> {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            entries: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn append(&mut self, entry: T) {
        self.entries.push_back(entry);
        while self.entries.len() > self.cap {
            self.entries.pop_front();
        }
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = T>) {
        for e in entries {
            self.append(e);
        }
    }

    /// Up to `n` most recent entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<T> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_oldest_past_cap() {
        let mut ledger = Ledger::new(3);
        ledger.extend(1..=5);
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.recent(10), vec![3, 4, 5]);
        assert_eq!(ledger.recent(2), vec![4, 5]);
    }

    #[test]
    fn zero_cap_keeps_one() {
        let mut ledger = Ledger::new(0);
        ledger.append("a");
        ledger.append("b");
        assert_eq!(ledger.recent(5), vec!["b"]);
    }
}
