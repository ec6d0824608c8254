use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Architectures that can be installed on a given base architecture.
///
/// The base architecture scores 1, each compatible architecture one more
/// than the architecture it was reached from. `noarch` is always accepted,
/// source packages never are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchFilter {
    base: String,
    compat: BTreeMap<String, Vec<String>>,
}

impl ArchFilter {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            compat: BTreeMap::new(),
        }
    }

    /// Declare that packages built for `compatible` run on `arch`.
    pub fn with_compat(mut self, arch: impl Into<String>, compatible: Vec<String>) -> Self {
        self.compat.entry(arch.into()).or_default().extend(compatible);
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Score of an architecture, lower is better. `None` means the
    /// architecture cannot be installed.
    pub fn score(&self, arch: &str) -> Option<u32> {
        if is_source_arch(arch) {
            return None;
        }

        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([(self.base.as_str(), 1u32)]);
        while let Some((current, score)) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            if current == arch {
                return Some(score);
            }
            if let Some(next) = self.compat.get(current) {
                queue.extend(next.iter().map(|a| (a.as_str(), score + 1)));
            }
        }

        if arch == "noarch" {
            Some(2)
        } else {
            None
        }
    }

    pub fn accepts(&self, arch: &str) -> bool {
        self.score(arch).is_some()
    }
}

pub(crate) fn is_source_arch(arch: &str) -> bool {
    arch == "src" || arch == "nosrc"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x86_64() -> ArchFilter {
        ArchFilter::new("x86_64")
            .with_compat("x86_64", vec!["i686".to_string(), "noarch".to_string()])
            .with_compat("i686", vec!["i586".to_string()])
    }

    #[test]
    fn test_scores() {
        let filter = x86_64();
        assert_eq!(filter.score("x86_64"), Some(1));
        assert_eq!(filter.score("i686"), Some(2));
        assert_eq!(filter.score("noarch"), Some(2));
        assert_eq!(filter.score("i586"), Some(3));
        assert_eq!(filter.score("aarch64"), None);
    }

    #[test]
    fn test_noarch_without_compat_table() {
        let filter = ArchFilter::new("aarch64");
        assert!(filter.accepts("noarch"));
        assert!(filter.accepts("aarch64"));
        assert!(!filter.accepts("x86_64"));
    }

    #[test]
    fn test_source_never_accepted() {
        let filter = ArchFilter::new("src");
        assert!(!filter.accepts("src"));
        assert!(!x86_64().accepts("nosrc"));
    }

    #[test]
    fn test_cycles_terminate() {
        let filter = ArchFilter::new("a")
            .with_compat("a", vec!["b".to_string()])
            .with_compat("b", vec!["a".to_string()]);
        assert_eq!(filter.score("b"), Some(2));
        assert_eq!(filter.score("c"), None);
    }
}
