use super::usage::UsageSet;
use crate::config::NamespaceMatching;
use crate::graph::Package;

/// Decides whether a used name falls under an autoload prefix
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceMatcher {
    mode: NamespaceMatching,
}

impl NamespaceMatcher {
    pub fn new(mode: NamespaceMatching) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> NamespaceMatching {
        self.mode
    }

    /// Whether `candidate` lies under `prefix`
    pub fn matches(&self, prefix: &str, candidate: &str) -> bool {
        if prefix.is_empty() {
            return true;
        }

        match self.mode {
            NamespaceMatching::Prefix => candidate.starts_with(prefix),
            NamespaceMatching::Segment => {
                // PEAR-style prefixes (`Twig_`) are not namespace segments
                if prefix.ends_with('_') {
                    return candidate.starts_with(prefix);
                }
                let stem = prefix.trim_end_matches('\\');
                match candidate.strip_prefix(stem) {
                    Some("") => true,
                    Some(rest) => rest.starts_with('\\'),
                    None => false,
                }
            }
        }
    }

    /// The first used name that falls under one of the package's psr-4 or
    /// psr-0 prefixes, as `(prefix, name)`
    pub fn find_match<'a>(&self, package: &'a Package, usage: &'a UsageSet) -> Option<(&'a str, &'a str)> {
        package
            .autoload
            .namespace_prefixes()
            .find_map(|(_, prefix)| {
                usage
                    .names()
                    .find(|name| self.matches(prefix, name))
                    .map(|name| (prefix, name))
            })
    }

    pub fn is_used(&self, package: &Package, usage: &UsageSet) -> bool {
        self.find_match(package, usage).is_some()
    }
}
