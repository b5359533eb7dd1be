// ── Keyed three-way diff ──
//
// Old (remembered) and new (desired) collections are matched on a stable
// key. Every old key missing from new is a delete, every new key missing
// from old (or new entry without a key yet) is a create, and every shared
// key whose entries differ is an update carrying both sides.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::Hash;

use crate::model::{AppInstance, Application, Team, TeamUser};

/// Identity used to match entries across old and new.
pub trait Keyed {
    type Key: Eq + Hash + Clone;

    /// `None` for entries the server has not assigned an identity yet.
    fn key(&self) -> Option<Self::Key>;
}

impl Keyed for Application {
    type Key = String;
    fn key(&self) -> Option<String> {
        self.id.clone()
    }
}

impl Keyed for Team {
    type Key = String;
    fn key(&self) -> Option<String> {
        self.id.clone()
    }
}

impl Keyed for TeamUser {
    type Key = String;
    fn key(&self) -> Option<String> {
        Some(self.user_id.clone())
    }
}

impl Keyed for AppInstance {
    type Key = String;
    fn key(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

/// An entry present on both sides with differing fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Update<T> {
    pub old: T,
    pub new: T,
}

/// Disjoint create/update/delete partition of one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Changes<T> {
    pub create: Vec<T>,
    pub update: Vec<Update<T>>,
    pub delete: Vec<T>,
}

impl<T> Default for Changes<T> {
    fn default() -> Self {
        Self {
            create: Vec::new(),
            update: Vec::new(),
            delete: Vec::new(),
        }
    }
}

impl<T> Changes<T> {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }

    pub fn len(&self) -> usize {
        self.create.len() + self.update.len() + self.delete.len()
    }
}

/// Diff two collections by [`Keyed::key`].
///
/// Old entries without a key cannot be addressed remotely and are ignored.
pub fn diff<T>(old: &[T], new: &[T]) -> Changes<T>
where
    T: Keyed + PartialEq + Clone,
{
    let new_by_key: HashMap<T::Key, &T> = new
        .iter()
        .filter_map(|item| item.key().map(|k| (k, item)))
        .collect();
    let old_keys: HashSet<T::Key> = old.iter().filter_map(Keyed::key).collect();

    let mut changes = Changes::default();

    for item in old {
        let Some(key) = item.key() else { continue };
        match new_by_key.get(&key) {
            None => changes.delete.push(item.clone()),
            Some(desired) if *desired != item => changes.update.push(Update {
                old: item.clone(),
                new: (*desired).clone(),
            }),
            Some(_) => {}
        }
    }

    for item in new {
        match item.key() {
            Some(key) if old_keys.contains(&key) => {}
            _ => changes.create.push(item.clone()),
        }
    }

    changes
}

/// Added and removed names between two name sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameSetDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl NameSetDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Set difference of two name lists, ignoring order and duplicates.
pub fn name_set_diff(old: &[String], new: &[String]) -> NameSetDiff {
    let old: BTreeSet<&str> = old.iter().map(String::as_str).collect();
    let new: BTreeSet<&str> = new.iter().map(String::as_str).collect();
    NameSetDiff {
        added: new.difference(&old).map(|s| (*s).to_owned()).collect(),
        removed: old.difference(&new).map(|s| (*s).to_owned()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn team(id: &str, name: &str, role: &str) -> Team {
        let mut t = Team::new(name);
        t.id = Some(id.into());
        t.role = role.into();
        t
    }

    fn app(id: Option<&str>, name: &str) -> Application {
        let mut a = Application::new(name);
        a.id = id.map(Into::into);
        a
    }

    fn keys<T: Keyed<Key = String>>(items: &[T]) -> Vec<String> {
        items.iter().filter_map(Keyed::key).collect()
    }

    #[test]
    fn changed_team_role_is_an_update() {
        let old = vec![team("t1", "Alpha", "Member")];
        let new = vec![team("t1", "Alpha", "Admin")];
        let changes = diff(&old, &new);
        assert!(changes.create.is_empty());
        assert!(changes.delete.is_empty());
        assert_eq!(changes.update.len(), 1);
        assert_eq!(changes.update[0].new.role, "Admin");
    }

    #[test]
    fn replaced_application_is_delete_plus_create() {
        let old = vec![app(Some("a"), "A"), app(Some("b"), "B")];
        let new = vec![app(Some("b"), "B"), app(None, "C")];
        let changes = diff(&old, &new);
        assert_eq!(keys(&changes.delete), vec!["a".to_owned()]);
        assert_eq!(changes.create.len(), 1);
        assert_eq!(changes.create[0].name, "C");
        assert!(changes.update.is_empty());
    }

    #[test]
    fn emptied_user_list_removes_everyone() {
        let old = vec![TeamUser::new("u1").with_role("Member")];
        let changes = diff(&old, &[]);
        assert_eq!(keys(&changes.delete), vec!["u1".to_owned()]);
        assert!(changes.create.is_empty() && changes.update.is_empty());
    }

    #[test]
    fn user_role_update_only_when_role_differs() {
        let old = vec![TeamUser::new("u1"), TeamUser::new("u2").with_role("Observer")];
        let new = vec![
            TeamUser::new("u1").with_role(""),
            TeamUser::new("u2").with_role("Member"),
        ];
        let changes = diff(&old, &new);
        assert_eq!(changes.update.len(), 1);
        assert_eq!(changes.update[0].new.user_id, "u2");
    }

    #[test]
    fn instances_are_keyed_by_name() {
        let old = vec![AppInstance::new("Wiki", 1.0), AppInstance::new("Chat", 2.0)];
        let new = vec![AppInstance::new("Wiki", 3.0), AppInstance::new("Mail", 1.0)];
        let changes = diff(&old, &new);
        let updated: Vec<AppInstance> = changes.update.iter().map(|u| u.new.clone()).collect();
        assert_eq!(keys(&updated), vec!["Wiki".to_owned()]);
        assert_eq!(keys(&changes.create), vec!["Mail".to_owned()]);
        assert_eq!(keys(&changes.delete), vec!["Chat".to_owned()]);
    }

    #[test]
    fn identical_collections_produce_no_changes() {
        let items = vec![team("t1", "A", "x"), team("t2", "B", "y")];
        assert!(diff(&items, &items).is_empty());
    }

    #[test]
    fn partition_is_exhaustive_and_disjoint() {
        let universe = ["a", "b", "c", "d"];
        // Every subset pair over a small key universe, with one field flipped
        // on shared keys when the mask bit says so.
        for old_mask in 0u8..16 {
            for new_mask in 0u8..16 {
                for change_mask in [0u8, 0b0101, 0b1111] {
                    let old: Vec<Team> = universe
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| old_mask & (1 << i) != 0)
                        .map(|(_, k)| team(k, k, "r"))
                        .collect();
                    let new: Vec<Team> = universe
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| new_mask & (1 << i) != 0)
                        .map(|(i, k)| {
                            let role = if change_mask & (1 << i) != 0 { "r2" } else { "r" };
                            team(k, k, role)
                        })
                        .collect();

                    let changes = diff(&old, &new);
                    let created: BTreeSet<String> = keys(&changes.create).into_iter().collect();
                    let deleted: BTreeSet<String> = keys(&changes.delete).into_iter().collect();
                    let updated: BTreeSet<String> =
                        changes.update.iter().filter_map(|u| u.old.key()).collect();

                    for (i, k) in universe.iter().enumerate() {
                        let k = (*k).to_owned();
                        let in_old = old_mask & (1 << i) != 0;
                        let in_new = new_mask & (1 << i) != 0;
                        let changed = change_mask & (1 << i) != 0;
                        assert_eq!(deleted.contains(&k), in_old && !in_new);
                        assert_eq!(created.contains(&k), in_new && !in_old);
                        assert_eq!(updated.contains(&k), in_old && in_new && changed);
                    }
                    assert!(created.is_disjoint(&deleted));
                    assert!(created.is_disjoint(&updated));
                    assert!(updated.is_disjoint(&deleted));
                }
            }
        }
    }

    #[test]
    fn name_sets_ignore_order_and_duplicates() {
        let old = vec!["ViewAdmin".to_owned(), "EditTeam".to_owned()];
        let new = vec![
            "EditTeam".to_owned(),
            "SystemAdmin".to_owned(),
            "SystemAdmin".to_owned(),
        ];
        let d = name_set_diff(&old, &new);
        assert_eq!(d.added, vec!["SystemAdmin".to_owned()]);
        assert_eq!(d.removed, vec!["ViewAdmin".to_owned()]);
        assert!(name_set_diff(&new, &new).is_empty());
    }
}
