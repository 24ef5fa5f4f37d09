//! Match plan structures: groups of corresponding files across two sides.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Group id reserved for the unmatched bucket.
pub const UNMATCHED_GROUP_ID: &str = "";

/// Tag used for members coming from the old (A) side.
pub const SIDE_A_TAG: &str = "1";

/// Tag used for members coming from the new (B) side.
pub const SIDE_B_TAG: &str = "2";

/// Tri-state enabled flag as it appears in a reviewed plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnabledFlag {
    /// Left blank by the reviewer.
    #[default]
    Unset,
    /// Explicitly enabled.
    Yes,
    /// Explicitly disabled.
    No,
}

impl EnabledFlag {
    /// Parse a reviewer token. Returns `None` for unrecognized tokens.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "" => Some(EnabledFlag::Unset),
            "y" | "yes" | "true" | "1" | "x" => Some(EnabledFlag::Yes),
            "n" | "no" | "false" | "0" => Some(EnabledFlag::No),
            _ => None,
        }
    }

    /// Token written to the plan table.
    pub fn as_token(&self) -> &'static str {
        match self {
            EnabledFlag::Unset => "",
            EnabledFlag::Yes => "y",
            EnabledFlag::No => "n",
        }
    }
}

/// One file inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    /// Logical side this member belongs to.
    pub subgroup_tag: String,
    /// Reviewer enable flag.
    pub enabled: EnabledFlag,
    /// File path.
    pub path: PathBuf,
}

impl GroupMember {
    /// Create a member with an unset enabled flag.
    pub fn new(subgroup_tag: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            subgroup_tag: subgroup_tag.into(),
            enabled: EnabledFlag::Unset,
            path: path.into(),
        }
    }

    /// Set the enabled flag.
    pub fn with_enabled(mut self, enabled: EnabledFlag) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A proposed or confirmed correspondence between files of two sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchGroup {
    pub group_id: String,
    pub members: Vec<GroupMember>,
}

/// Members of one side of a group, in member order.
#[derive(Debug, Clone)]
pub struct GroupSide<'a> {
    pub tag: &'a str,
    pub members: Vec<&'a GroupMember>,
}

impl<'a> GroupSide<'a> {
    /// Paths of this side's members.
    pub fn paths(&self) -> Vec<&'a Path> {
        self.members.iter().map(|m| m.path.as_path()).collect()
    }
}

impl MatchGroup {
    /// Create an empty group.
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            members: Vec::new(),
        }
    }

    /// Append a member.
    pub fn push(&mut self, member: GroupMember) {
        self.members.push(member);
    }

    /// Whether this is the unmatched bucket.
    pub fn is_unmatched_bucket(&self) -> bool {
        self.group_id == UNMATCHED_GROUP_ID
    }

    /// Members that take part in comparison.
    ///
    /// Blank flags are resolved against siblings: if any member is explicitly
    /// enabled only explicit members count, otherwise every member that is
    /// not explicitly disabled counts.
    pub fn enabled_members(&self) -> Vec<&GroupMember> {
        let any_yes = self.members.iter().any(|m| m.enabled == EnabledFlag::Yes);
        self.members
            .iter()
            .filter(|m| {
                if any_yes {
                    m.enabled == EnabledFlag::Yes
                } else {
                    m.enabled != EnabledFlag::No
                }
            })
            .collect()
    }

    /// Enabled members split by subgroup tag, in first-appearance order.
    pub fn sides(&self) -> Vec<GroupSide<'_>> {
        let mut sides: Vec<GroupSide<'_>> = Vec::new();
        for member in self.enabled_members() {
            match sides.iter_mut().find(|s| s.tag == member.subgroup_tag) {
                Some(side) => side.members.push(member),
                None => sides.push(GroupSide {
                    tag: &member.subgroup_tag,
                    members: vec![member],
                }),
            }
        }
        sides
    }

    /// A group is comparable when at least two enabled members span at
    /// least two distinct tags. The unmatched bucket never is.
    pub fn is_comparable(&self) -> bool {
        if self.is_unmatched_bucket() {
            return false;
        }
        let enabled = self.enabled_members();
        let tags: HashSet<&str> = enabled.iter().map(|m| m.subgroup_tag.as_str()).collect();
        enabled.len() >= 2 && tags.len() >= 2
    }
}

/// Complete result of one matching run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPlan {
    groups: Vec<MatchGroup>,
    unmatched: MatchGroup,
}

impl Default for MatchPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            unmatched: MatchGroup::new(UNMATCHED_GROUP_ID),
        }
    }

    /// Committed groups in commit order.
    pub fn groups(&self) -> &[MatchGroup] {
        &self.groups
    }

    /// The unmatched bucket.
    pub fn unmatched(&self) -> &MatchGroup {
        &self.unmatched
    }

    /// Look up a committed group by id.
    pub fn get(&self, group_id: &str) -> Option<&MatchGroup> {
        self.groups.iter().find(|g| g.group_id == group_id)
    }

    /// Add a committed group. Groups with the reserved id go to the bucket.
    pub fn push_group(&mut self, group: MatchGroup) {
        if group.is_unmatched_bucket() {
            self.unmatched.members.extend(group.members);
        } else {
            self.groups.push(group);
        }
    }

    /// Place a file in the unmatched bucket as its own entry.
    pub fn push_unmatched(&mut self, path: impl Into<PathBuf>) {
        self.unmatched.push(GroupMember::new("", path));
    }

    /// Groups eligible for comparison.
    pub fn comparable_groups(&self) -> impl Iterator<Item = &MatchGroup> {
        self.groups.iter().filter(|g| g.is_comparable())
    }

    /// Every path occurrence across groups and the bucket.
    pub fn all_paths(&self) -> Vec<&Path> {
        self.groups
            .iter()
            .chain(std::iter::once(&self.unmatched))
            .flat_map(|g| g.members.iter().map(|m| m.path.as_path()))
            .collect()
    }

    /// Number of path occurrences across groups and the bucket.
    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum::<usize>() + self.unmatched.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(flags: &[(&str, EnabledFlag)]) -> MatchGroup {
        let mut g = MatchGroup::new("001");
        for (i, (tag, flag)) in flags.iter().enumerate() {
            g.push(GroupMember::new(*tag, format!("f{}.mkv", i)).with_enabled(*flag));
        }
        g
    }

    #[test]
    fn parses_enabled_tokens() {
        assert_eq!(EnabledFlag::parse(""), Some(EnabledFlag::Unset));
        assert_eq!(EnabledFlag::parse(" Y "), Some(EnabledFlag::Yes));
        assert_eq!(EnabledFlag::parse("no"), Some(EnabledFlag::No));
        assert_eq!(EnabledFlag::parse("maybe"), None);
    }

    #[test]
    fn all_blank_means_all_enabled() {
        let g = group(&[("1", EnabledFlag::Unset), ("2", EnabledFlag::Unset)]);
        assert_eq!(g.enabled_members().len(), 2);
        assert!(g.is_comparable());
    }

    #[test]
    fn explicit_yes_excludes_blanks() {
        let g = group(&[
            ("1", EnabledFlag::Yes),
            ("2", EnabledFlag::Unset),
            ("2", EnabledFlag::Yes),
        ]);
        let enabled = g.enabled_members();
        assert_eq!(enabled.len(), 2);
        assert!(enabled.iter().all(|m| m.enabled == EnabledFlag::Yes));
    }

    #[test]
    fn explicit_no_disables_only_that_member() {
        let g = group(&[
            ("1", EnabledFlag::Unset),
            ("2", EnabledFlag::No),
            ("2", EnabledFlag::Unset),
        ]);
        let enabled = g.enabled_members();
        assert_eq!(enabled.len(), 2);
        assert!(g.is_comparable());
    }

    #[test]
    fn single_tag_is_not_comparable() {
        let g = group(&[("1", EnabledFlag::Unset), ("1", EnabledFlag::Unset)]);
        assert!(!g.is_comparable());
    }

    #[test]
    fn sides_follow_first_appearance() {
        let g = group(&[
            ("b", EnabledFlag::Unset),
            ("a", EnabledFlag::Unset),
            ("b", EnabledFlag::Unset),
        ]);
        let sides = g.sides();
        assert_eq!(sides.len(), 2);
        assert_eq!(sides[0].tag, "b");
        assert_eq!(sides[0].members.len(), 2);
        assert_eq!(sides[1].tag, "a");
    }

    #[test]
    fn plan_counts_bucket_entries() {
        let mut plan = MatchPlan::new();
        plan.push_group(group(&[("1", EnabledFlag::Unset), ("2", EnabledFlag::Unset)]));
        plan.push_unmatched("lonely.mkv");

        assert_eq!(plan.item_count(), 3);
        assert_eq!(plan.comparable_groups().count(), 1);
        assert!(!plan.unmatched().is_comparable());
        assert!(plan.get("001").is_some());
    }
}
