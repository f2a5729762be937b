use lazyflow::testing::*;
use lazyflow::*;
use serde_json::json;

/// Pull `pulls` entries, fork, then drain both the fork and the original.
fn fork_after(mut c: Collection, pulls: usize) -> anyhow::Result<(Vec<Entry>, Vec<Entry>)> {
    for _ in 0..pulls {
        c.next().transpose()?;
    }
    let fork = c
        .try_clone()
        .ok_or_else(|| anyhow::anyhow!("collection cannot be forked"))?;
    Ok((fork.to_entries()?, c.to_entries()?))
}

fn values_of(entries: &[Entry]) -> Vec<Value> {
    entries.iter().map(|(_, v)| v.clone()).collect()
}

#[test]
fn fork_of_a_drained_take_is_empty() -> anyhow::Result<()> {
    let (fork, rest) = fork_after(collection(json!([1, 2, 3, 4, 5])).take(2, 0), 2)?;
    assert!(fork.is_empty());
    assert!(rest.is_empty());
    Ok(())
}

#[test]
fn fork_of_a_take_keeps_the_remaining_budget() -> anyhow::Result<()> {
    let (fork, rest) = fork_after(collection(json!([1, 2, 3, 4, 5])).take(2, 1), 1)?;
    assert_values_equal(&values_of(&fork), json!([3]));
    assert_eq!(fork, rest);
    Ok(())
}

#[test]
fn fork_after_stop_yields_nothing() -> anyhow::Result<()> {
    let mut c = collection(json!([1, 2, 3, 4, 5])).stop_when(|v, _| v.as_i64() == Some(3));
    assert!(c.next().is_some());
    assert!(c.next().is_some());
    assert!(c.next().is_none());
    let fork = c.try_clone().expect("memory-backed chains fork");
    assert!(fork.to_list()?.is_empty());
    Ok(())
}

#[test]
fn fork_of_a_sort_continues_in_sorted_order() -> anyhow::Result<()> {
    let sorted = collection(json!([3, 1, 2])).sort_by_with(
        Extractor::identity(),
        SortOrder::Ascending,
        SortMode::Numeric,
    );
    let (fork, rest) = fork_after(sorted, 1)?;
    assert_values_equal(&values_of(&fork), json!([2, 3]));
    assert_eq!(fork, rest);
    Ok(())
}

#[test]
fn sorted_generator_forks_once_materialised() -> anyhow::Result<()> {
    let mut c = Collection::from_generator(vec![3, 1, 2]).sort_by_with(
        Extractor::identity(),
        SortOrder::Ascending,
        SortMode::Numeric,
    );
    assert!(c.try_clone().is_none());
    c.next().transpose()?;
    let fork = c.try_clone().expect("sorted output is in memory");
    assert_values_equal(&fork.to_list()?, json!([2, 3]));
    assert_values_equal(&c.to_list()?, json!([2, 3]));
    Ok(())
}

#[test]
fn fork_of_unique_remembers_seen_keys() -> anyhow::Result<()> {
    let (fork, rest) = fork_after(collection(json!([1, 1, 2, 1, 3])).unique(), 1)?;
    assert_values_equal(&values_of(&fork), json!([2, 3]));
    assert_eq!(fork, rest);
    Ok(())
}

#[test]
fn fork_of_chunk_keeps_chunk_numbering() -> anyhow::Result<()> {
    let (fork, rest) = fork_after(collection(json!([1, 2, 3, 4, 5])).chunk(2)?, 1)?;
    assert_keys(&fork, &[1usize, 2]);
    assert_values_equal(&values_of(&fork), json!([[3, 4], [5]]));
    assert_eq!(fork, rest);
    Ok(())
}

#[test]
fn fork_of_zip_keeps_row_numbering() -> anyhow::Result<()> {
    let zipped = collection(json!([1, 2, 3])).zip(vec![collection(json!([4, 5, 6]))]);
    let (fork, rest) = fork_after(zipped, 1)?;
    assert_keys(&fork, &[1usize, 2]);
    assert_values_equal(&values_of(&fork), json!([[2, 5], [3, 6]]));
    assert_eq!(fork, rest);
    Ok(())
}

#[test]
fn fork_of_values_keeps_positional_keys() -> anyhow::Result<()> {
    let (fork, rest) = fork_after(collection(json!({"a": 1, "b": 2, "c": 3})).values(), 1)?;
    assert_keys(&fork, &[1usize, 2]);
    assert_eq!(fork, rest);
    Ok(())
}

#[test]
fn fork_inside_a_flattened_list_resumes_mid_list() -> anyhow::Result<()> {
    let (fork, rest) = fork_after(collection(json!([[1, [2, 3]], [4]])).flatten(), 1)?;
    assert_values_equal(&values_of(&fork), json!([2, 3, 4]));
    assert_eq!(fork, rest);
    Ok(())
}

#[test]
fn fork_of_a_buffer_resumes_at_its_position() -> anyhow::Result<()> {
    let (fork, rest) = fork_after(Collection::from_generator(1..=4).buffer(), 1)?;
    assert_values_equal(&values_of(&fork), json!([2, 3, 4]));
    assert_eq!(fork, rest);
    Ok(())
}

#[test]
fn fork_of_group_by_yields_the_remaining_groups() -> anyhow::Result<()> {
    let grouped = collection(json!([{"g": "a"}, {"g": "b"}, {"g": "a"}])).group_by("g");
    let (fork, rest) = fork_after(grouped, 1)?;
    assert_eq!(fork.len(), 1);
    assert_eq!(fork[0].0, Key::from("b"));
    assert_eq!(fork, rest);
    Ok(())
}

#[test]
fn fork_of_take_last_over_a_generator_replays_the_window() -> anyhow::Result<()> {
    let (fork, rest) = fork_after(Collection::from_generator(1..=5).take_last(2)?, 1)?;
    assert_values_equal(&values_of(&fork), json!([5]));
    assert_eq!(fork, rest);
    Ok(())
}

#[test]
fn fork_of_nest_yields_the_remaining_roots() -> anyhow::Result<()> {
    let rows = json!([
        {"id": 1, "parent_id": null},
        {"id": 2, "parent_id": null},
        {"id": 3, "parent_id": 2},
    ]);
    let (fork, rest) = fork_after(collection(rows).nest("id", "parent_id"), 1)?;
    assert_eq!(fork.len(), 1);
    assert_eq!(fork[0].1.property("id").as_deref(), Some(&Value::from(2)));
    assert_eq!(fork, rest);
    Ok(())
}

#[test]
fn fork_of_insert_stays_past_the_inserted_values() -> anyhow::Result<()> {
    let inserted = collection(json!([{"a": 1}, {"a": 2}, {"a": 3}])).insert("b", json!([10]));
    let (fork, rest) = fork_after(inserted, 2)?;
    assert_values_equal(&values_of(&fork), json!([{"a": 3}]));
    assert_eq!(fork, rest);
    Ok(())
}
