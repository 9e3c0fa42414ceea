use std::collections::BTreeSet;

/// Lowercase vocabulary of banned substance names.
///
/// Built once at startup and shared read-only between requests. Entries are trimmed and
/// lowercased on the way in; blank entries are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannedSubstanceSet {
    names: BTreeSet<String>,
}

impl BannedSubstanceSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Every entry occurring anywhere in `text`, case-insensitively.
    ///
    /// Plain substring containment: "aspirin" matches inside "aspirinate". Results come
    /// back in the set's sorted order.
    pub fn find_banned_substances(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let text_lower = text.to_lowercase();
        self.names
            .iter()
            .filter(|name| text_lower.contains(name.as_str()))
            .cloned()
            .collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for BannedSubstanceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clenbuterol_scenario() {
        let set = BannedSubstanceSet::new(["clenbuterol", "testosterone"]);
        let found =
            set.find_banned_substances("Patient tested positive for Clenbuterol and Caffeine");
        assert_eq!(found, vec!["clenbuterol".to_string()]);
    }

    #[test]
    fn test_empty_text_matches_nothing() {
        let set = BannedSubstanceSet::new(["clenbuterol", "ephedrine"]);
        assert!(set.find_banned_substances("").is_empty());
    }

    #[test]
    fn test_no_word_boundaries() {
        let set = BannedSubstanceSet::new(["aspirin"]);
        assert_eq!(
            set.find_banned_substances("ASPIRINATE compound"),
            vec!["aspirin".to_string()]
        );
    }

    #[test]
    fn test_each_match_reported_once() {
        let set = BannedSubstanceSet::new(["EPO", "epo", " Epo "]);
        assert_eq!(set.len(), 1);

        let found = set.find_banned_substances("epo EPO Epo");
        assert_eq!(found, vec!["epo".to_string()]);
    }

    #[test]
    fn test_results_are_subset_and_substrings() {
        let set = BannedSubstanceSet::new([
            "nandrolone",
            "stanozolol",
            "caffeine",
            "meldonium",
            "ostarine",
        ]);
        let text = "Label: Meldonium 250mg, trace OSTARINE, excipients";
        let found = set.find_banned_substances(text);

        let lower = text.to_lowercase();
        for name in &found {
            assert!(set.contains(name));
            assert!(lower.contains(name.as_str()));
        }
        // 反方向：集合中所有出現過的都要被找到
        for name in set.iter() {
            assert_eq!(lower.contains(name), found.iter().any(|f| f == name));
        }
        assert_eq!(found, vec!["meldonium".to_string(), "ostarine".to_string()]);
    }

    #[test]
    fn test_blank_entries_dropped() {
        let set: BannedSubstanceSet = ["", "  ", "DHEA"].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["dhea"]);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let set = BannedSubstanceSet::default();
        assert!(set.find_banned_substances("clenbuterol").is_empty());
    }
}
