use lazyflow::testing::*;
use lazyflow::*;
use serde_json::json;
use std::any::Any;

#[derive(Debug)]
struct Account {
    owner: String,
    balance: i64,
}

impl Object for Account {
    fn property(&self, name: &str) -> Option<Value> {
        match name {
            "owner" => Some(Value::from(self.owner.as_str())),
            "balance" => Some(Value::from(self.balance)),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::record([("owner", Value::from(self.owner.as_str()))])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn accounts() -> Vec<Value> {
    vec![
        Value::object(Account {
            owner: "ada".into(),
            balance: 30,
        }),
        Value::object(Account {
            owner: "bob".into(),
            balance: 5,
        }),
    ]
}

#[test]
fn path_walks_records_and_list_indexes() {
    let article = articles_with_comments().remove(0);
    assert_eq!(Path::new("author.name").resolve(&article), Value::from("mariano"));
    assert_eq!(Path::new("comments.1.user").resolve(&article), Value::from("mark"));
    assert_eq!(Path::new("comments.9.user").resolve(&article), Value::Null);
    assert_eq!(Path::new("title.length").resolve(&article), Value::Null);
}

#[test]
fn path_reports_its_segments() {
    let path = Path::new("comments.{*}.user");
    assert_eq!(path.segments(), ["comments", WILDCARD, "user"]);
    assert!(path.has_wildcard());
    assert_eq!(path.to_string(), "comments.{*}.user");
    assert!(!Path::new("author.name").has_wildcard());
}

#[test]
fn wildcard_returns_one_value_per_child() {
    let article = articles_with_comments().remove(0);
    let votes = Path::new("comments.{*}.votes").resolve(&article);
    assert_eq!(votes, Value::from(json!([3, 1])));
}

#[test]
fn repeated_wildcards_fan_out_again() -> anyhow::Result<()> {
    let rows = json!([
        {"groups": [{"ids": [1, 2]}, {"ids": [3]}]},
        {"groups": [{"ids": [4]}]},
        {"groups": []},
    ]);
    let ids = collection(rows).extract("groups.{*}.ids.{*}").to_list()?;
    assert_values_equal(&ids, json!([1, 2, 3, 4]));
    Ok(())
}

#[test]
fn objects_expose_properties_to_paths() -> anyhow::Result<()> {
    let owners = Collection::from_vec(accounts())
        .sort_by_with("balance", SortOrder::Ascending, SortMode::Numeric)
        .extract("owner")
        .to_list()?;
    assert_values_equal(&owners, json!(["bob", "ada"]));

    let rich = Collection::from_vec(accounts())
        .first_match(Conditions::new([("owner", "ada")]))?
        .and_then(|v| v.as_object().and_then(|o| o.as_any().downcast_ref::<Account>().map(|a| a.balance)));
    assert_eq!(rich, Some(30));
    Ok(())
}

#[test]
fn objects_serialize_through_to_value() -> anyhow::Result<()> {
    let json = Collection::from_vec(accounts()).take(1, 0).to_json_string()?;
    assert_eq!(json, r#"{"0":{"owner":"ada"}}"#);
    Ok(())
}

#[test]
fn closure_extractors_see_the_key() -> anyhow::Result<()> {
    let labels = collection(json!({"a": 1, "b": 2}))
        .extract(Extractor::from_fn(|v, k| Value::from(format!("{k}{v}"))))
        .to_list()?;
    assert_values_equal(&labels, json!(["a1", "b2"]));
    Ok(())
}

#[test]
fn conditions_require_every_pair() {
    let row = Value::from(json!({"a": 1, "b": {"c": "x"}}));
    let key = Key::Int(0);
    assert!(Conditions::new([("a", Value::from(1)), ("b.c", Value::from("x"))]).matches(&row, &key));
    assert!(!Conditions::new([("a", Value::from(1)), ("b.c", Value::from("y"))]).matches(&row, &key));
    assert!(Conditions::new([("a", "1")]).matches(&row, &key));
    let none: [(&str, Value); 0] = [];
    let empty = Conditions::new(none);
    assert!(empty.is_empty());
    assert!(empty.matches(&row, &key));
}
