use lazyflow::testing::*;
use lazyflow::*;
use serde_json::json;

#[test]
fn group_by_keeps_first_seen_group_order() -> anyhow::Result<()> {
    let groups = Collection::from_vec(scored_people())
        .group_by("group")
        .to_array(true)?;
    let keys: Vec<&Key> = groups.keys().collect();
    assert_eq!(keys, vec![&Key::from("a"), &Key::from("b"), &Key::from("c")]);

    let names = collection(groups.get(&Key::from("b")).cloned().unwrap_or_default())
        .extract("name")
        .to_list()?;
    assert_values_equal(&names, json!(["ben", "eve"]));
    Ok(())
}

#[test]
fn group_by_with_a_callback() -> anyhow::Result<()> {
    let groups = collection(json!([1, 2, 3, 4, 5]))
        .group_by(Extractor::from_fn(|v, _| {
            Value::from(if v.as_i64().unwrap_or(0) % 2 == 0 { "even" } else { "odd" })
        }))
        .to_array(true)?;
    assert_record_equal(&groups, json!({"odd": [1, 3, 5], "even": [2, 4]}));
    Ok(())
}

#[test]
fn null_group_key_fails_on_first_pull() {
    let grouped = collection(json!([{"g": "a"}, {"g": null}])).group_by("g");
    let err = grouped.to_list().expect_err("null key must fail");
    assert!(matches!(err, PipelineError::InvalidGroupKey { .. }));
}

#[test]
fn index_by_rejects_null_keys() {
    let indexed = collection(json!([{"id": "x"}, {"id": null}])).index_by("id");
    let err = indexed.to_list().expect_err("null key must fail");
    assert!(matches!(err, PipelineError::InvalidGroupKey { .. }));
}

#[test]
fn combine_rejects_null_keys() {
    let combined =
        collection(json!([{"k": "a", "v": 1}, {"k": null, "v": 2}])).combine("k", "v", None);
    let err = combined.to_list().expect_err("null key must fail");
    assert!(matches!(err, PipelineError::InvalidGroupKey { .. }));
}

#[test]
fn combine_rejects_null_groups() {
    let combined = collection(json!([{"k": "a", "v": 1, "g": "x"}, {"k": "b", "v": 2, "g": null}]))
        .combine("k", "v", Some(Extractor::path("g")));
    let err = combined.to_list().expect_err("null group must fail");
    assert!(matches!(err, PipelineError::InvalidGroupKey { .. }));
}

#[test]
fn index_by_lets_the_last_element_win() -> anyhow::Result<()> {
    let indexed = collection(json!([
        {"id": "x", "v": 1},
        {"id": "y", "v": 2},
        {"id": "x", "v": 3},
    ]))
    .index_by("id")
    .to_array(true)?;
    assert_record_equal(
        &indexed,
        json!({"x": {"id": "x", "v": 3}, "y": {"id": "y", "v": 2}}),
    );
    Ok(())
}

#[test]
fn count_by_counts_each_group() -> anyhow::Result<()> {
    let counts = Collection::from_vec(scored_people())
        .count_by("group")
        .to_array(true)?;
    assert_record_equal(&counts, json!({"a": 2, "b": 2, "c": 1}));

    let by_author = Collection::from_vec(articles_with_comments())
        .count_by("author.name")
        .to_array(true)?;
    assert_record_equal(&by_author, json!({"mariano": 2, "jose": 1}));
    Ok(())
}

#[test]
fn combine_without_group_maps_keys_to_values() -> anyhow::Result<()> {
    let names = Collection::from_vec(scored_people())
        .combine("name", "score", None)
        .to_array(true)?;
    assert_record_equal(
        &names,
        json!({"ann": 10, "ben": 25, "cat": 2.5, "dan": "7", "eve": 40}),
    );
    Ok(())
}

#[test]
fn combine_with_group_keeps_first_value_per_key() -> anyhow::Result<()> {
    let rows = json!([
        {"id": 1, "name": "first", "group": "a"},
        {"id": 2, "name": "second", "group": "b"},
        {"id": 1, "name": "again", "group": "a"},
        {"id": 3, "name": "third", "group": "a"},
    ]);
    let combined = collection(rows)
        .combine("id", "name", Some(Extractor::path("group")))
        .to_array(true)?;
    assert_record_equal(
        &combined,
        json!({"a": {"1": "first", "3": "third"}, "b": {"2": "second"}}),
    );
    Ok(())
}

#[test]
fn custom_map_reduce_runs_user_callbacks() -> anyhow::Result<()> {
    let engine = MapReduce::new(|value, _, emitter| {
        let n = value.as_i64().unwrap_or(0);
        let parity = if n % 2 == 0 { "even" } else { "odd" };
        emitter.emit_intermediate(n * n, parity);
        Ok(())
    })
    .with_reducer(|squares, parity, emitter| {
        let total: i64 = squares.iter().filter_map(Value::as_i64).sum();
        emitter.emit(total, parity.clone());
        Ok(())
    });
    let out = collection(json!([1, 2, 3, 4]))
        .map_reduce(engine)
        .to_array(true)?;
    assert_record_equal(&out, json!({"odd": 10, "even": 20}));
    Ok(())
}

#[test]
fn map_reduce_without_reducer_rejects_intermediates() {
    let engine = MapReduce::new(|value, _, emitter| {
        emitter.emit_intermediate(value, "all");
        Ok(())
    });
    let err = collection(json!([1])).map_reduce(engine).to_list();
    assert!(matches!(err, Err(PipelineError::InvalidArgument(_))));
}
