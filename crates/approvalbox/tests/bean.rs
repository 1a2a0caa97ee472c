use approvalbox::assert_that;
use approvalbox::equal_to;
use approvalbox::matcher_fn;
use approvalbox::report::Palette;
use approvalbox::same_bean_as;
use approvalbox::Assert;
use approvalbox::ErrorKind;
use approvalbox::FnMatcher;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChildBean {
    child_string: String,
    child_integer: i32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParentBean {
    parent_string: String,
    child_bean: Option<ChildBean>,
}

#[derive(Clone, Debug, Serialize)]
struct Pair {
    a: Inner,
}

#[derive(Clone, Debug, Serialize)]
struct Inner {
    b: i32,
    c: i32,
}

#[derive(Clone, Debug, Serialize)]
struct Stamp(u64);

#[derive(Clone, Debug, Serialize)]
struct Audited {
    name: String,
    created: Stamp,
    updated: Stamp,
}

#[derive(Clone, Debug, Serialize)]
struct Basket {
    children: Vec<ChildBean>,
}

fn basket(child_strings: &[&str]) -> Basket {
    let children = child_strings
        .iter()
        .map(|child_string| ChildBean {
            child_string: (*child_string).to_owned(),
            child_integer: 1,
        })
        .collect();
    Basket { children }
}

fn parent(child_string: &str) -> ParentBean {
    ParentBean {
        parent_string: "parent".to_owned(),
        child_bean: Some(ChildBean {
            child_string: child_string.to_owned(),
            child_integer: 1,
        }),
    }
}

fn having_string_field(expected: &'static str) -> FnMatcher<impl Fn(&Value) -> Result<(), String>> {
    matcher_fn(
        format!("having string field \"{expected}\""),
        move |child: &Value| {
            let actual = &child["childString"];
            if actual == expected {
                Ok(())
            } else {
                Err(format!("string field was {actual}"))
            }
        },
    )
}

fn message_of<T: Serialize>(actual: &T, matcher: approvalbox::SameBeanAs<ParentBean>) -> String {
    Assert::new()
        .palette(Palette::never())
        .try_that(actual, matcher)
        .unwrap_err()
        .message()
        .to_owned()
}

#[test]
fn equal_values_match() {
    assert_that(&parent("apple"), same_bean_as(parent("apple")));
}

#[test]
fn differing_field_names_its_path() {
    let message = message_of(&parent("banana"), same_bean_as(parent("apple")));
    assert!(
        message.contains("     but: differs at $.childBean.childString"),
        "{message}"
    );
    assert!(message.contains("\"childString\": \"banana\""), "{message}");
}

#[test]
fn override_mismatch_names_field_and_value() {
    let matcher = same_bean_as(parent("apple")).with("childBean.childString", equal_to("kiwi"));
    let message = message_of(&parent("banana"), matcher);
    assert!(
        message.ends_with(
            "and childBean.childString \"kiwi\"\n     but: childBean.childString was \"banana\""
        ),
        "{message}"
    );
}

#[test]
fn override_mismatch_on_bean_appends_snippet() {
    let matcher = same_bean_as(parent("apple")).with("childBean", having_string_field("kiwi"));
    let message = message_of(&parent("banana"), matcher);
    assert!(
        message.ends_with(
            "and childBean having string field \"kiwi\"\n     but: childBean string field was \"banana\"\n{\n  \"childString\": \"banana\",\n  \"childInteger\": 1\n}"
        ),
        "{message}"
    );
}

#[test]
fn override_mismatch_on_missing_bean_omits_snippet() {
    let matcher = same_bean_as(parent("apple")).with("childBean", having_string_field("kiwi"));
    let mut actual = parent("apple");
    actual.child_bean = None;
    let message = message_of(&actual, matcher);
    assert!(
        message.ends_with("and childBean having string field \"kiwi\"\n     but: childBean was null"),
        "{message}"
    );
}

#[test]
fn matching_override_replaces_expected_value() {
    assert_that(
        &parent("kiwi"),
        same_bean_as(parent("apple")).with("childBean", having_string_field("kiwi")),
    );
}

#[test]
fn unknown_override_path_is_configuration_error() {
    let matcher =
        same_bean_as(parent("apple")).with("childBean.nonExistingField", equal_to("kiwi"));
    let err = Assert::new()
        .try_that(&parent("banana"), matcher)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(
        err.message().ends_with("childBean.nonExistingField does not exist"),
        "{}",
        err.message()
    );
}

#[test]
#[should_panic(expected = "childBean.nonExistingField does not exist")]
fn unknown_override_path_panics() {
    assert_that(
        &parent("apple"),
        same_bean_as(parent("apple")).with("childBean.nonExistingField", equal_to("kiwi")),
    );
}

#[test]
fn unknown_ignored_path_is_configuration_error() {
    let err = Assert::new()
        .try_that(&parent("apple"), same_bean_as(parent("apple")).ignoring("nonexistent.path"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(err.message(), "nonexistent.path does not exist");
}

#[test]
fn path_below_missing_bean_is_accepted() {
    let mut expected = parent("apple");
    expected.child_bean = None;
    let mut actual = parent("apple");
    actual.child_bean = None;
    assert_that(
        &actual,
        same_bean_as(expected).ignoring("childBean.childString"),
    );
}

#[test]
fn ignoring_nested_path() {
    let expected = Pair {
        a: Inner { b: 1, c: 2 },
    };
    let actual = Pair {
        a: Inner { b: 10, c: 2 },
    };
    assert_that(&actual, same_bean_as(&expected).ignoring("a.b"));

    let other = Pair {
        a: Inner { b: 1, c: 20 },
    };
    let err = Assert::new()
        .palette(Palette::never())
        .try_that(&other, same_bean_as(&expected).ignoring("a.b"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mismatch);
    assert!(err.message().contains("differs at $.a.c"), "{}", err.message());
}

#[test]
fn ignoring_type_everywhere() {
    let expected = Audited {
        name: "x".to_owned(),
        created: Stamp(1),
        updated: Stamp(2),
    };
    let actual = Audited {
        name: "x".to_owned(),
        created: Stamp(100),
        updated: Stamp(200),
    };
    assert_that(&actual, same_bean_as(&expected).ignoring_type_of::<Stamp>());
    assert_that(&actual, same_bean_as(&expected).ignoring_type("Stamp"));
}

#[test]
fn scalars_compare_by_value() {
    let err = Assert::new()
        .palette(Palette::never())
        .try_that("banana", same_bean_as("apple"))
        .unwrap_err();
    assert_eq!(err.message(), "Expected: \"apple\"\n     but: was \"banana\"");
    assert_eq!(err.expected(), None);
}

#[test]
fn structural_mismatch_carries_both_renderings() {
    let err = Assert::new()
        .palette(Palette::never())
        .try_that(&parent("banana"), same_bean_as(parent("apple")))
        .unwrap_err();
    let expected = err.expected().unwrap();
    let actual = err.actual().unwrap();
    assert!(expected.contains("apple"), "{expected}");
    assert!(actual.contains("banana"), "{actual}");
}

#[test]
fn override_through_sequence_sees_every_element() {
    assert_that(
        &basket(&["a", "b"]),
        same_bean_as(basket(&["x", "y"])).with("children.childString", equal_to(["a", "b"])),
    );
    assert_that(
        &basket(&["a"]),
        same_bean_as(basket(&["x"])).with("children.childString", equal_to(["a"])),
    );
    assert_that(
        &basket(&[]),
        same_bean_as(basket(&[])).with("children.childString", equal_to(Vec::<String>::new())),
    );

    let err = Assert::new()
        .palette(Palette::never())
        .try_that(
            &basket(&["a"]),
            same_bean_as(basket(&["x"])).with("children.childString", equal_to("a")),
        )
        .unwrap_err();
    assert!(
        err.message().contains("     but: children.childString was [\"a\"]"),
        "{}",
        err.message()
    );
}

#[test]
fn unknown_type_is_configuration_error() {
    let audited = Audited {
        name: "x".to_owned(),
        created: Stamp(1),
        updated: Stamp(2),
    };
    let err = Assert::new()
        .try_that(&audited, same_bean_as(&audited).ignoring_type("Stmp"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(err.message(), "type Stmp does not exist");

    let err = Assert::new()
        .try_that(&audited, same_bean_as(&audited).circular_reference("Nope"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(err.message(), "type Nope does not exist");
}

#[test]
fn type_behind_missing_bean_is_accepted() {
    let mut bean = parent("apple");
    bean.child_bean = None;
    assert_that(&bean, same_bean_as(bean.clone()).ignoring_type("ChildBean"));
}

#[test]
fn path_below_map_key_must_exist() {
    let expected = serde_json::json!({"stamp": 1, "name": "x"});
    let actual = serde_json::json!({"stamp": 2, "name": "x"});
    assert_that(&actual, same_bean_as(&expected).ignoring("stamp"));
    assert_that(
        &actual,
        same_bean_as(&expected).ignoring("stamp").ignoring("absent"),
    );

    let err = Assert::new()
        .try_that(&actual, same_bean_as(&expected).ignoring("typo.deep"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(err.message(), "typo.deep does not exist");
}
