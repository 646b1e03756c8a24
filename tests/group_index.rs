// GroupIndex: records grouped by an integer attribute.
use double_key_hashtable::{GroupIndex, Grouped, TableError};

#[derive(Clone, Debug, PartialEq)]
struct Computer {
    name: String,
    difficulty: u32,
    value: u32,
}

impl Grouped for Computer {
    type Group = u32;
    type Id = String;

    fn group(&self) -> u32 {
        self.difficulty
    }
    fn id(&self) -> String {
        self.name.clone()
    }
}

fn computer(name: &str, difficulty: u32, value: u32) -> Computer {
    Computer {
        name: name.to_string(),
        difficulty,
        value,
    }
}

fn sorted_names(records: Vec<&Computer>) -> Vec<&str> {
    let mut names: Vec<&str> = records.iter().map(|c| c.name.as_str()).collect();
    names.sort_unstable();
    names
}

// Test: grouping, lookup and removal through owned string ids.
// Verifies: in_group lists exactly the records of a group; absent groups
// are empty; removing the last record drops the group.
#[test]
fn records_grouped_by_difficulty() {
    let mut idx: GroupIndex<Computer> = GroupIndex::new();
    for c in [
        computer("c1", 4, 4),
        computer("c2", 3, 2),
        computer("c3", 3, 5),
        computer("c4", 4, 3),
        computer("c5", 1, 9),
    ] {
        idx.add(c).unwrap();
    }
    assert_eq!(idx.len(), 5);
    assert_eq!(idx.group_count(), 3);
    assert_eq!(sorted_names(idx.in_group(&3)), vec!["c2", "c3"]);
    assert_eq!(sorted_names(idx.in_group(&4)), vec!["c1", "c4"]);
    assert!(idx.in_group(&2).is_empty());

    assert_eq!(idx.get(&3, &"c3".to_string()).map(|c| c.value), Ok(5));
    assert_eq!(idx.remove(&1, &"c5".to_string()).map(|c| c.value), Ok(9));
    assert_eq!(idx.group_count(), 2);
    assert!(idx.in_group(&1).is_empty());
    assert_eq!(
        idx.remove(&1, &"c5".to_string()),
        Err(TableError::NotFound)
    );

    let total: usize = idx.groups().iter().map(Vec::len).sum();
    assert_eq!(total, idx.len());
}

// Test: edit moves a record to another group.
#[test]
fn edit_regroups_record() {
    let mut idx: GroupIndex<Computer> = GroupIndex::new();
    idx.add(computer("c1", 4, 4)).unwrap();
    let old = idx.edit(&4, &"c1".to_string(), computer("c1", 2, 6)).unwrap();
    assert_eq!(old, computer("c1", 4, 4));
    assert!(idx.in_group(&4).is_empty());
    assert_eq!(sorted_names(idx.in_group(&2)), vec!["c1"]);
    assert_eq!(idx.group_keys().copied().collect::<Vec<_>>(), vec![2]);
    assert_eq!(idx.len(), 1);
}
