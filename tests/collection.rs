use lazyflow::testing::*;
use lazyflow::*;
use serde_json::json;

#[test]
fn json_output_keeps_key_order() -> anyhow::Result<()> {
    let c = collection(json!({"b": 1, "a": [1, 2], "c": {"x": null}}));
    assert_eq!(c.to_json_string()?, r#"{"b":1,"a":[1,2],"c":{"x":null}}"#);

    let list = collection(json!([3, 1])).to_json()?;
    assert_eq!(list, json!({"0": 3, "1": 1}));
    Ok(())
}

#[test]
fn json_serialize_collapses_duplicate_keys() -> anyhow::Result<()> {
    let value = collection(json!([1, 2]))
        .append(json!([3]))
        .json_serialize()?;
    let Value::Map(record) = value else {
        anyhow::bail!("expected a record");
    };
    assert_record_equal(&record, json!({"0": 3, "1": 2}));
    Ok(())
}

#[test]
fn count_uses_known_length_or_iterates() -> anyhow::Result<()> {
    assert_eq!(collection(json!([1, 2, 3])).count()?, 3);
    assert_eq!(
        Collection::from_generator((1..=9).filter(|n| n % 3 == 0)).count()?,
        3
    );
    let with_dupes = collection(json!([1, 2])).append(json!([3]));
    assert_eq!(with_dupes.count_keys()?, 2);
    Ok(())
}

#[test]
fn try_clone_resumes_mid_stream() -> anyhow::Result<()> {
    let mut c = collection(json!([1, 2, 3, 4]));
    assert!(c.is_replayable());
    let (_, first) = c.next().transpose()?.unwrap_or((Key::Int(-1), Value::Null));
    assert_eq!(first, Value::from(1));
    let rest = c.try_clone().map(Collection::to_list).transpose()?;
    assert_eq!(rest.map(|r| r.len()), Some(3));
    assert_eq!(c.to_list()?.len(), 3);
    Ok(())
}

#[test]
fn chained_stages_stay_replayable_over_memory() -> anyhow::Result<()> {
    let c = collection(json!([1, 2, 3, 4]))
        .filter(|v, _| v.as_i64().is_some_and(|n| n > 1))
        .map(|v, _| Value::from(v.as_i64().unwrap_or(0) * 2));
    let replay = c.try_clone().expect("memory-backed chains fork");
    assert_eq!(c.to_list()?, replay.to_list()?);
    Ok(())
}

#[test]
fn config_flows_through_every_derived_collection() -> anyhow::Result<()> {
    let config = CollectionConfig::default()
        .with_sort_order(SortOrder::Ascending)
        .with_nesting_key("kids");
    let c = collection(json!([3, 1, 2]))
        .with_config(config.clone())
        .filter_truthy();
    assert_eq!(c.config(), &config);
    let sorted = c.sort_by(Extractor::identity()).to_list()?;
    assert_values_equal(&sorted, json!([1, 2, 3]));

    let product = collection(json!([[1], [2]]))
        .with_config(config.clone())
        .cartesian_product(None, None)?;
    assert_eq!(product.config(), &config);
    Ok(())
}

#[test]
fn config_loads_from_json() -> anyhow::Result<()> {
    let config = CollectionConfig::from_json_str(r#"{"tree_spacer": "  ", "sort_mode": "natural"}"#)?;
    assert_eq!(config.tree_spacer, "  ");
    assert_eq!(config.sort_mode, SortMode::Natural);
    assert_eq!(config.nesting_key, "children");
    Ok(())
}

#[test]
fn lookups_and_predicates() -> anyhow::Result<()> {
    let people = || Collection::from_vec(scored_people());
    assert_eq!(
        people()
            .first_match(Conditions::new([("group", "b")]))?
            .and_then(|p| p.property("name").map(|n| n.into_owned())),
        Some(Value::from("ben"))
    );
    assert_eq!(people().first_match(Conditions::new([("group", "z")]))?, None);
    assert!(people().every(|p, _| p.property("score").is_some())?);
    assert!(people().some(|p, _| p.property("score").is_some_and(|s| *s == Value::from(40)))?);
    assert!(!people().is_empty()?);
    assert!(Collection::empty().is_empty()?);
    assert!(Collection::empty().every(|_, _| false)?);
    assert!(collection(json!([1, "2"])).contains(&Value::from("2"))?);
    assert!(!collection(json!([1, "2"])).contains(&Value::from(2))?);
    Ok(())
}

#[test]
fn match_conditions_uses_loose_equality() -> anyhow::Result<()> {
    let matched = Collection::from_vec(articles_with_comments())
        .match_conditions(Conditions::new([("author.id", Value::from("10"))]))
        .extract("id")
        .to_list()?;
    assert_values_equal(&matched, json!([1, 3]));
    Ok(())
}

#[test]
fn each_visits_in_order() -> anyhow::Result<()> {
    let mut seen = Vec::new();
    collection(json!({"a": 1, "b": 2})).each(|v, k| seen.push(format!("{k}:{v}")))?;
    assert_eq!(seen, vec!["a:1", "b:2"]);
    Ok(())
}

#[test]
fn collection_is_a_plain_iterator() -> anyhow::Result<()> {
    let keys: Vec<Key> = collection(json!({"x": 1, "y": 2}))
        .map(|v, _| v)
        .map_while(|item| item.ok().map(|(k, _)| k))
        .collect();
    assert_eq!(keys, vec![Key::from("x"), Key::from("y")]);
    Ok(())
}

#[test]
fn from_results_surfaces_source_errors() {
    let source = vec![
        Ok(Value::from(1)),
        Err(PipelineError::invalid_argument("bad row")),
        Ok(Value::from(3)),
    ];
    let out = Collection::from_results(source).to_list();
    assert!(matches!(out, Err(PipelineError::InvalidArgument(_))));
}

#[test]
fn count_surfaces_source_errors() {
    let source = vec![
        Ok(Value::from(1)),
        Err(PipelineError::invalid_argument("bad row")),
        Ok(Value::from(3)),
    ];
    let counted = Collection::from_results(source).count();
    assert!(matches!(counted, Err(PipelineError::InvalidArgument(_))));
}

#[test]
fn count_runs_fallible_transforms_over_memory() {
    let counted = collection(json!([1, 2, 3]))
        .try_map(|v, _| match v.as_i64() {
            Some(2) => Err(PipelineError::invalid_argument("two")),
            _ => Ok(v),
        })
        .count();
    assert!(matches!(counted, Err(PipelineError::InvalidArgument(_))));
}

#[test]
fn count_of_a_generator_pulls_every_element() -> anyhow::Result<()> {
    assert_eq!(Collection::from_generator(1..=4).count()?, 4);
    Ok(())
}

#[test]
fn debug_helpers_pass_elements_through() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let out = collection(json!([1, 2]))
        .debug_inspect("before")
        .debug_count("after")
        .to_list()?;
    assert_values_equal(&out, json!([1, 2]));
    Ok(())
}
