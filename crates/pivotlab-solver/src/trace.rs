use std::fmt;

/// Step log accumulated by every driver.
///
/// One entry per pivot, cut, node expansion, prune and driver
/// transition. Entries mirror to the `log` facade at debug level, so
/// `RUST_LOG=debug` shows the same narrative live.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    entries: Vec<String>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        log::debug!("{entry}");
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move every entry of `other` onto the end of this trace.
    pub fn append(&mut self, other: &mut Trace) {
        self.entries.append(&mut other.entries);
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_insertion_order() {
        let mut trace = Trace::new();
        trace.push("first");
        trace.push(String::from("second"));
        assert_eq!(trace.entries(), ["first", "second"]);
        assert_eq!(trace.to_string(), "first\nsecond\n");
    }
}
