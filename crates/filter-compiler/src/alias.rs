use std::fmt;

/// A query-local table alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Alias(String);

impl Alias {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mints the aliases of one compile call: `__nc0`, `__nc1`, ...
///
/// Every compile call owns a fresh allocator and threads it through the
/// whole recursion, so two branches joining the same relation never share
/// an alias.
#[derive(Debug)]
pub struct AliasAllocator {
    prefix: String,
    next: usize,
}

impl AliasAllocator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    pub fn next_alias(&mut self) -> Alias {
        let alias = Alias(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        alias
    }

    /// Number of aliases handed out so far.
    pub fn issued(&self) -> usize {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_aliases_are_never_reused() {
        let mut aliases = AliasAllocator::new("__nc");
        let minted: HashSet<_> = (0..100).map(|_| aliases.next_alias()).collect();
        assert_eq!(minted.len(), 100);
        assert_eq!(aliases.issued(), 100);
    }

    #[test]
    fn test_allocators_are_independent() {
        let mut first = AliasAllocator::new("__nc");
        let mut second = AliasAllocator::new("__nc");
        assert_eq!(first.next_alias().as_str(), "__nc0");
        assert_eq!(first.next_alias().as_str(), "__nc1");
        assert_eq!(second.next_alias().as_str(), "__nc0");
    }
}
