use chrono::{DateTime, FixedOffset};
use fieldmap::{
    Record, Value, fill_struct, fill_struct_by_tags, map_fields, map_tags, map_tags_with_default, mapped,
    mapped_from_json,
};
use serde_json::json;

#[derive(Record, Debug, Default, Clone, PartialEq)]
pub struct Address {
    #[tag(json = "city")]
    pub city: String,
    #[tag(json = "zip,omitempty")]
    pub zip: Option<String>,
}

#[derive(Record, Debug, Default, Clone, PartialEq)]
pub struct User {
    #[tag(json = "id", db = "user_id")]
    pub id: i64,
    #[tag(json = "name,omitempty")]
    pub name: String,
    #[tag(json = "email")]
    pub email: Option<String>,
    #[tag(json = "tags")]
    pub tags: Vec<String>,
    #[tag(json = "addr")]
    pub addr: Option<Address>,
    #[tag(json = "joined")]
    pub joined: DateTime<FixedOffset>,
    secret: String,
}

fn joined() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z").unwrap()
}

fn sample() -> User {
    User {
        id: 7,
        name: "ann".into(),
        email: None,
        tags: vec!["a".into(), "b".into()],
        addr: Some(Address {
            city: "Oslo".into(),
            zip: Some("0150".into()),
        }),
        joined: joined(),
        secret: "hidden".into(),
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

#[test]
fn map_fields_uses_field_names_and_skips_private() {
    let m = map_fields(&sample());
    let mut keys: Vec<&str> = m.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, ["addr", "email", "id", "joined", "name", "tags"]);
    assert_eq!(m["id"], Value::I64(7));
    assert_eq!(m["email"], Value::Null);
    assert_eq!(m["joined"], Value::Time(joined()));

    let addr = m["addr"].as_map().unwrap();
    assert_eq!(addr["city"], Value::Str("Oslo".into()));
    assert_eq!(addr["zip"], Value::Str("0150".into()));
}

#[test]
fn map_tags_keys_by_name_head() {
    let m = map_tags(&sample(), "json");
    assert!(m.contains_key("name"));
    assert!(!m.contains_key("name,omitempty"));
    assert_eq!(
        m["tags"],
        Value::Array(vec![Value::Str("a".into()), Value::Str("b".into())])
    );
}

#[test]
fn map_tags_filters_by_scheme() {
    let m = map_tags(&sample(), "db");
    assert_eq!(m, mapped! { "user_id" => 7_i64 });
    assert!(map_tags(&sample(), "bson").is_empty());
}

#[test]
fn fallback_schemes_apply_in_order() {
    let m = map_tags_with_default(&sample(), "db", &["json"]);
    assert_eq!(m["user_id"], Value::I64(7));
    assert!(!m.contains_key("id"));
    assert_eq!(m["name"], Value::Str("ann".into()));
    let addr = m["addr"].as_map().unwrap();
    assert_eq!(addr["city"], Value::Str("Oslo".into()));
}

#[derive(Record, Debug, Default, Clone, PartialEq)]
pub struct Segment {
    #[tag(b = "seg_b")]
    pub b: i32,
    #[tag(c = "seg_c")]
    pub c: i32,
}

#[derive(Record, Debug, Default, Clone, PartialEq)]
pub struct Route {
    #[tag(a = "from_a", c = "shadowed_c")]
    pub first: i32,
    #[tag(c = "from_c,omitempty")]
    pub second: i32,
    #[tag(c = "segment")]
    pub segment: Segment,
    pub untagged: i32,
}

#[test]
fn later_fallback_applies_when_earlier_ones_have_no_tag() {
    let route = Route {
        first: 1,
        second: 2,
        segment: Segment { b: 3, c: 4 },
        untagged: 5,
    };
    let m = map_tags_with_default(&route, "a", &["b", "c"]);

    let mut keys: Vec<&str> = m.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, ["from_a", "from_c", "segment"]);
    assert_eq!(m["from_a"], Value::I32(1));
    assert_eq!(m["from_c"], Value::I32(2));
    assert_eq!(m["segment"], Value::Map(mapped! { "seg_c" => 4_i32 }));
}

#[test]
fn non_record_inputs_map_to_empty() {
    let none: Option<User> = None;
    assert!(map_tags(&none, "json").is_empty());
    assert!(map_fields(&none).is_empty());
    assert_eq!(map_tags(&Some(sample()), "db").len(), 1);
    assert_eq!(map_tags(&Box::new(sample()), "db").len(), 1);
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[test]
fn tag_round_trip_restores_visible_fields() {
    let original = sample();
    let m = map_tags(&original, "json");

    let mut restored = User::default();
    fill_struct_by_tags(&mut restored, &m, "json").unwrap();

    assert_eq!(restored.id, original.id);
    assert_eq!(restored.name, original.name);
    assert_eq!(restored.tags, original.tags);
    assert_eq!(restored.addr, original.addr);
    assert_eq!(restored.joined, original.joined);
    assert_eq!(restored.secret, "");
}

#[test]
fn plain_round_trip_restores_visible_fields() {
    let mut original = sample();
    original.secret = String::new();
    let m = map_fields(&original);

    let mut restored = User::default();
    fill_struct(&mut restored, &m).unwrap();
    assert_eq!(restored, original);
}

#[test]
fn nil_values_leave_fields_untouched() {
    let mut target = User {
        email: Some("keep@example.com".into()),
        ..User::default()
    };
    fill_struct_by_tags(&mut target, &mapped! { "email" => Value::Null, "id" => 3_i64 }, "json").unwrap();
    assert_eq!(target.email.as_deref(), Some("keep@example.com"));
    assert_eq!(target.id, 3);
}

#[test]
fn unknown_keys_are_ignored() {
    let mut target = User::default();
    fill_struct_by_tags(&mut target, &mapped! { "nope" => 1_i64, "user_id" => 9_i64 }, "json").unwrap();
    assert_eq!(target, User::default());
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[test]
fn decoded_json_fills_record() {
    let m = mapped_from_json(json!({
        "id": 5,
        "name": "bob",
        "email": null,
        "tags": ["x"],
        "addr": { "city": "Bergen" },
        "joined": "2024-01-02T03:04:05Z",
    }))
    .unwrap();

    let mut user = User::default();
    fill_struct_by_tags(&mut user, &m, "json").unwrap();
    assert_eq!(user.id, 5);
    assert_eq!(user.name, "bob");
    assert_eq!(user.email, None);
    assert_eq!(user.tags, ["x"]);
    assert_eq!(user.addr.as_ref().map(|a| a.city.as_str()), Some("Bergen"));
    assert_eq!(user.joined, joined());
}

#[test]
fn extracted_map_serializes_to_json() {
    let out = serde_json::to_value(Value::Map(map_tags(&sample(), "json"))).unwrap();
    assert_eq!(
        out,
        json!({
            "id": 7,
            "name": "ann",
            "email": null,
            "tags": ["a", "b"],
            "addr": { "city": "Oslo", "zip": "0150" },
            "joined": "2024-01-02T03:04:05Z",
        })
    );
}
