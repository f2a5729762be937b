use lazyflow::testing::*;
use lazyflow::*;
use serde_json::json;

#[test]
fn cartesian_product_varies_the_last_row_fastest() -> anyhow::Result<()> {
    let out = collection(json!([["A", "B"], [1, 2]]))
        .cartesian_product(None, None)?
        .to_list()?;
    assert_values_equal(&out, json!([["A", 1], ["A", 2], ["B", 1], ["B", 2]]));
    Ok(())
}

#[test]
fn cartesian_product_filters_before_mapping() -> anyhow::Result<()> {
    let join = |combination: Vec<Value>| {
        let parts: Vec<String> = combination.iter().map(Value::to_string_lossy).collect();
        Value::from(parts.join("-"))
    };
    let skip_twos = |combination: &[Value]| combination[1] != Value::from(2);
    let out = collection(json!([["A", "B"], [1, 2, 3]]))
        .cartesian_product(Some(&join), Some(&skip_twos))?
        .to_list()?;
    assert_values_equal(&out, json!(["A-1", "A-3", "B-1", "B-3"]));
    Ok(())
}

#[test]
fn cartesian_product_of_three_rows_and_records() -> anyhow::Result<()> {
    let out = collection(json!([{"x": 1, "y": 2}, [3, 4], ["z"]]))
        .cartesian_product(None, None)?
        .to_list()?;
    assert_values_equal(
        &out,
        json!([[1, 3, "z"], [1, 4, "z"], [2, 3, "z"], [2, 4, "z"]]),
    );
    Ok(())
}

#[test]
fn cartesian_product_rejects_bad_rows() {
    assert!(matches!(
        collection(json!([[[1, 2]], [3]])).cartesian_product(None, None),
        Err(PipelineError::UnsupportedShape(_))
    ));
    assert!(matches!(
        collection(json!([1, [2]])).cartesian_product(None, None),
        Err(PipelineError::UnsupportedShape(_))
    ));
}

#[test]
fn cartesian_product_of_nothing_is_empty() -> anyhow::Result<()> {
    assert!(Collection::empty().cartesian_product(None, None)?.to_list()?.is_empty());
    assert!(
        collection(json!([[1, 2], []]))
            .cartesian_product(None, None)?
            .to_list()?
            .is_empty()
    );
    Ok(())
}

#[test]
fn transpose_swaps_rows_and_columns() -> anyhow::Result<()> {
    let out = collection(json!([
        ["Products", "2012", "2013"],
        ["Product A", "200", "100"],
        ["Product B", "300", "200"],
    ]))
    .transpose()?
    .to_list()?;
    assert_values_equal(
        &out,
        json!([
            ["Products", "Product A", "Product B"],
            ["2012", "200", "300"],
            ["2013", "100", "200"],
        ]),
    );
    Ok(())
}

#[test]
fn transpose_rejects_ragged_rows() {
    let ragged = collection(json!([[1, 2], [3]])).transpose();
    assert!(matches!(ragged, Err(PipelineError::UnsupportedShape(_))));
    assert!(matches!(
        collection(json!([1, 2])).transpose(),
        Err(PipelineError::UnsupportedShape(_))
    ));
}

#[test]
fn transpose_of_empty_is_empty() -> anyhow::Result<()> {
    assert_eq!(Collection::empty().transpose()?.count()?, 0);
    Ok(())
}
