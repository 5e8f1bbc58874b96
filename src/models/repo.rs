use std::fmt::Display;

use indexmap::IndexSet;

/// Repository identifier, unique by its owner/name pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Snapshot of the repositories one user watches
///
/// Duplicates are dropped on construction; the remaining repositories keep the
/// order the API returned them in, which drives every downstream iteration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchSet {
    repos: IndexSet<RepoId>,
}

impl WatchSet {
    pub fn new(repos: impl IntoIterator<Item = RepoId>) -> Self {
        Self {
            repos: repos.into_iter().collect(),
        }
    }

    pub fn contains(&self, repo: &RepoId) -> bool {
        self.repos.contains(repo)
    }

    /// Number of repositories present in both sets
    pub fn overlap(&self, other: &WatchSet) -> usize {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().filter(|repo| large.contains(repo)).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RepoId> {
        self.repos.iter()
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }
}

impl<'a> IntoIterator for &'a WatchSet {
    type Item = &'a RepoId;
    type IntoIter = indexmap::set::Iter<'a, RepoId>;

    fn into_iter(self) -> Self::IntoIter {
        self.repos.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(owner: &str, name: &str) -> RepoId {
        RepoId::new(owner, name)
    }

    #[test]
    fn test_watch_set_drops_duplicates_keeping_first_order() {
        let set = WatchSet::new(vec![
            repo("rust-lang", "rust"),
            repo("tokio-rs", "tokio"),
            repo("rust-lang", "rust"),
        ]);

        assert_eq!(set.len(), 2);
        let order: Vec<String> = set.iter().map(|r| r.to_string()).collect();
        assert_eq!(order, vec!["rust-lang/rust", "tokio-rs/tokio"]);
    }

    #[test]
    fn test_repo_identity_is_the_pair() {
        assert_ne!(repo("alice", "dotfiles"), repo("bob", "dotfiles"));
        let set = WatchSet::new(vec![repo("alice", "dotfiles")]);
        assert!(set.contains(&repo("alice", "dotfiles")));
        assert!(!set.contains(&repo("bob", "dotfiles")));
    }

    #[test]
    fn test_overlap_is_intersection_size() {
        let subject = WatchSet::new(vec![repo("a", "x"), repo("a", "y"), repo("a", "z")]);
        let candidate = WatchSet::new(vec![repo("a", "y"), repo("a", "z"), repo("b", "w")]);
        let disjoint = WatchSet::new(vec![repo("c", "q")]);

        assert_eq!(subject.overlap(&candidate), 2);
        assert_eq!(candidate.overlap(&subject), 2);
        assert_eq!(subject.overlap(&disjoint), 0);
        assert_eq!(subject.overlap(&WatchSet::default()), 0);
    }
}
