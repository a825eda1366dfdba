//! Known-instance sets and the name-matching algorithm

use tracing::debug;

use cpekit_core::{Attribute, CpeVersion, Relation, Result};

use crate::legacy;
use crate::name::{Element, Name};

/// Compare two names attribute by attribute.
///
/// Both names are lifted to their canonical WFN first, so the result is
/// one relation per attribute in canonical order. Fails with
/// `Incompatible` when either name has no single-element 2.3
/// counterpart.
pub fn compare_names(source: &Name, target: &Name) -> Result<[Relation; 11]> {
    let source = source.to_wfn()?;
    let target = target.to_wfn()?;
    let source_element = &source.elements()[0];
    let target_element = &target.elements()[0];

    let mut relations = [Relation::Equal; 11];
    for attribute in Attribute::ALL {
        relations[attribute.index()] =
            source_element.get(attribute).compare(target_element.get(attribute));
    }
    Ok(relations)
}

/// True when the source is a (non-proper) superset of the target
pub fn superset(source: &Name, target: &Name) -> Result<bool> {
    Ok(compare_names(source, target)?
        .iter()
        .all(|r| matches!(r, Relation::Superset | Relation::Equal)))
}

/// True when the source is a (non-proper) subset of the target
pub fn subset(source: &Name, target: &Name) -> Result<bool> {
    Ok(compare_names(source, target)?
        .iter()
        .all(|r| matches!(r, Relation::Subset | Relation::Equal)))
}

/// True when every pairwise attribute comparison is equal
pub fn equal(source: &Name, target: &Name) -> Result<bool> {
    Ok(compare_names(source, target)?
        .iter()
        .all(|r| matches!(r, Relation::Equal)))
}

/// True when any pairwise attribute comparison is disjoint
pub fn disjoint(source: &Name, target: &Name) -> Result<bool> {
    Ok(compare_names(source, target)?
        .iter()
        .any(|r| matches!(r, Relation::Disjoint)))
}

/// Does one element of the candidate cover one element of a known name?
///
/// Components of two 1.1 names follow the 1.1 operator rules; every
/// other pairing uses the wildcard containment relation.
fn element_covers(
    candidate_version: CpeVersion,
    known_version: CpeVersion,
    candidate: &Element,
    known: &Element,
) -> bool {
    let v1_pair = candidate_version == CpeVersion::V1_1 && known_version == CpeVersion::V1_1;
    Attribute::ALL.iter().all(|att| {
        let c = candidate.get(*att);
        let k = known.get(*att);
        if v1_pair {
            legacy::value_contains(c, k)
        } else {
            c.contains(k)
        }
    })
}

/// An unordered set of known CPE names, deduplicated by source text
#[derive(Debug, Clone, Default)]
pub struct NameSet {
    names: Vec<Name>,
}

impl NameSet {
    /// Creates an empty set of CPE names
    pub fn new() -> Self {
        NameSet { names: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Name> {
        self.names.iter()
    }

    /// Adds a name to the set if not already present
    pub fn append(&mut self, name: Name) {
        if self.names.iter().any(|n| n.source() == name.source()) {
            return;
        }
        self.names.push(name);
    }

    /// Name matching: true when the candidate can be shown to cover a
    /// member of the set.
    ///
    /// Every element of the candidate must cover some element of some
    /// known name; the search short-circuits on the first covering
    /// member. Pairs that cannot be compared (a multi-element name
    /// against a 2.x name) simply do not match.
    pub fn name_match(&self, candidate: &Name) -> bool {
        if self.names.is_empty() {
            return false;
        }

        if self.names.iter().any(|n| n.source() == candidate.source()) {
            return true;
        }

        for candidate_element in candidate.elements() {
            let covered = self.names.iter().any(|known| {
                known.elements().iter().any(|known_element| {
                    element_covers(
                        candidate.version(),
                        known.version(),
                        candidate_element,
                        known_element,
                    )
                })
            });
            if !covered {
                debug!(candidate = %candidate, "candidate element not covered by any known name");
                return false;
            }
        }

        true
    }
}

impl FromIterator<Name> for NameSet {
    fn from_iter<I: IntoIterator<Item = Name>>(iter: I) -> Self {
        let mut set = NameSet::new();
        for name in iter {
            set.append(name);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(text: &str) -> Name {
        Name::parse(text).unwrap()
    }

    fn set(names: &[&str]) -> NameSet {
        names.iter().map(|n| name(n)).collect()
    }

    #[test]
    fn test_append_deduplicates() {
        let mut k = NameSet::new();
        k.append(name("cpe:/o:redhat:enterprise_linux:3"));
        k.append(name("cpe:/o:sun:sunos:5.8"));
        k.append(name("cpe:/o:sun:sunos:5.8"));
        assert_eq!(k.len(), 2);
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let k = NameSet::new();
        assert!(!k.name_match(&name("cpe:/o:microsoft:windows_2000")));
    }

    #[test]
    fn test_identical_member_matches() {
        let k = set(&["cpe:/o:redhat:enterprise_linux:3", "cpe:/o:sun:sunos:5.8"]);
        assert!(k.name_match(&name("cpe:/o:sun:sunos:5.8")));
    }

    #[test]
    fn test_general_candidate_covers_specific_known() {
        // the candidate's unset attributes cover any known value
        let k = set(&[
            "cpe:/o:microsoft:windows_2000::sp3:pro",
            "cpe:/a:microsoft:ie:5.5",
        ]);
        assert!(k.name_match(&name("cpe:/o:microsoft:windows_2000")));
        assert!(!k.name_match(&name("cpe:/o:sun")));

        let k = set(&["cpe:/o:redhat:enterprise_linux:3", "cpe:/o:sun:sunos:5.8"]);
        assert!(k.name_match(&name("cpe:/o:sun")));
    }

    #[test]
    fn test_specific_candidate_does_not_match() {
        let k = set(&["cpe:/o:redhat:enterprise_linux:3", "cpe:/o:sun:sunos:5.8"]);
        assert!(!k.name_match(&name("cpe:/a:microsoft:ie:9")));
    }

    #[test]
    fn test_wildcard_candidate() {
        let k = set(&["cpe:2.3:a:bea:weblogic:8.1:*:*:*:*:*:*:*"]);
        assert!(k.name_match(&name("cpe:2.3:a:bea:weblogic:8.*:*:*:*:*:*:*:*")));
        assert!(!k.name_match(&name("cpe:2.3:a:bea:weblogic:9.*:*:*:*:*:*:*:*")));
    }

    #[test]
    fn test_set_match_is_monotone() {
        let candidate = name("cpe:/o:microsoft:windows_2000");
        let mut k = set(&["cpe:/o:microsoft:windows_2000::sp3:pro"]);
        assert!(k.name_match(&candidate));

        // adding members can never turn a match into a non-match
        k.append(name("cpe:/a:microsoft:ie:5.5"));
        k.append(name("cpe:2.3:h:nvidia:geforce:*:*:*:*:*:*:*:*"));
        assert!(k.name_match(&candidate));
    }

    #[test]
    fn test_v1_multi_element_matching() {
        let k = set(&["cpe://sun:sunos:5.9/bea:weblogic:8.1;mysql:server:5.0"]);
        // each candidate element finds a covering known element
        assert!(k.name_match(&name("cpe://sun:sunos:5.9")));
        assert!(!k.name_match(&name("cpe://sun:sunos:5.8")));
    }

    #[test]
    fn test_v1_operator_matching() {
        let k = set(&["cpe://microsoft:windows:vista"]);
        let or_candidate = name("cpe://microsoft:windows:xp!vista");
        assert!(k.name_match(&or_candidate));

        let not_candidate = name("cpe://microsoft:windows:~xp");
        assert!(k.name_match(&not_candidate));

        let k_xp = set(&["cpe://microsoft:windows:xp"]);
        assert!(!k_xp.name_match(&not_candidate));
    }

    #[test]
    fn test_cross_version_pairs_that_cannot_lift_do_not_match() {
        let k = set(&["cpe://sun:sunos:5.9/bea:weblogic:8.1;mysql:server:5.0"]);
        // a 2.x candidate compared against a multi-element 1.1 name is
        // simply a non-match, never an error
        assert!(!k.name_match(&name("cpe:/a:oracle:database:11g")));
    }

    #[test]
    fn test_relation_predicates() {
        let wide = name("cpe:2.3:a:bea:weblogic:8.*:*:*:*:*:*:*:*");
        let narrow = name("cpe:2.3:a:bea:weblogic:8.1:*:*:*:*:*:*:*");
        assert!(superset(&wide, &narrow).unwrap());
        assert!(!superset(&narrow, &wide).unwrap());
        // wildcards in the target leave the relation undefined, not subset
        assert!(!subset(&narrow, &wide).unwrap());
        assert!(equal(&narrow, &narrow.clone()).unwrap());
        assert!(disjoint(&narrow, &name("cpe:2.3:a:bea:weblogic:9.0:*:*:*:*:*:*:*")).unwrap());
    }

    #[test]
    fn test_compare_names_reports_each_attribute() {
        let wide = name("cpe:2.3:a:bea:weblogic:8.*:*:*:*:*:*:*:*");
        let narrow = name("cpe:2.3:a:bea:weblogic:8.1:*:*:*:*:*:*:*");
        let relations = compare_names(&wide, &narrow).unwrap();
        assert_eq!(relations[Attribute::Part.index()], Relation::Equal);
        assert_eq!(relations[Attribute::Version.index()], Relation::Superset);
    }

    #[test]
    fn test_incompatible_names_error_in_relation_api() {
        let multi = name("cpe://sun:sunos:5.9/bea:weblogic:8.1;mysql:server:5.0");
        let single = name("cpe:/a:oracle:database:11g");
        assert!(compare_names(&multi, &single).is_err());
    }
}
