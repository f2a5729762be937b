use lazyflow::testing::*;
use lazyflow::*;
use serde_json::json;

fn memory() -> Collection {
    collection(json!([1, 2, 3, 4, 5]))
}

/// Known length without a backing slice: skips ahead.
fn mapped_memory() -> Collection {
    memory().map(|v, _| v)
}

/// Unknown length: forces the ring buffer.
fn filtered_generator() -> Collection {
    Collection::from_generator((1..=10).filter(|n| n % 2 == 1 || *n < 5).take(5))
}

#[test]
fn take_last_agrees_across_source_kinds() -> anyhow::Result<()> {
    let expected = [
        (3, json!([3, 4, 5])),
        (1, json!([5])),
        (5, json!([1, 2, 3, 4, 5])),
        (7, json!([1, 2, 3, 4, 5])),
    ];
    for (n, want) in expected {
        assert_values_equal(&memory().take_last(n)?.to_list()?, want.clone());
        assert_values_equal(&mapped_memory().take_last(n)?.to_list()?, want.clone());
        assert_values_equal(&filtered_generator().take_last(n)?.to_list()?, want);
    }
    Ok(())
}

#[test]
fn take_last_keeps_original_keys() -> anyhow::Result<()> {
    let tail = memory().take_last(2)?.to_entries()?;
    assert_keys(&tail, &[3, 4]);

    let ring = filtered_generator().take_last(2)?.to_entries()?;
    assert_keys(&ring, &[3, 4]);

    let named = collection(json!({"a": 1, "b": 2, "c": 3}))
        .take_last(2)?
        .to_array(true)?;
    assert_record_equal(&named, json!({"b": 2, "c": 3}));
    Ok(())
}

#[test]
fn take_last_after_lazy_stages() -> anyhow::Result<()> {
    let tail = Collection::from_generator(1..=100)
        .filter(|v, _| v.as_i64().is_some_and(|n| n % 10 == 0))
        .take_last(3)?
        .to_list()?;
    assert_values_equal(&tail, json!([80, 90, 100]));
    Ok(())
}

#[test]
fn take_last_zero_fails_before_pulling() {
    assert!(matches!(
        memory().take_last(0),
        Err(PipelineError::InvalidArgument(_))
    ));
    assert!(matches!(
        filtered_generator().take_last(0),
        Err(PipelineError::InvalidArgument(_))
    ));
}

#[test]
fn last_and_first() -> anyhow::Result<()> {
    assert_eq!(memory().last()?, Some(Value::from(5)));
    assert_eq!(filtered_generator().last()?, Some(Value::from(5)));
    assert_eq!(Collection::empty().last()?, None);
    assert_eq!(memory().first()?, Some(Value::from(1)));
    Ok(())
}

#[test]
fn circular_buffer_holds_the_newest_items() {
    let mut ring = CircularBuffer::new(3);
    for i in 1..=7 {
        ring.push(i);
    }
    assert_eq!(ring.len(), 3);
    assert_eq!(ring.seen(), 7);
    assert_eq!(ring.into_chronological(), vec![5, 6, 7]);
}
