use ::spore::{freeze, impl_ordinal, spore, Error, Freeze, Locale, Ordinal, Spore, SporeBuilder, Thaw};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl_ordinal!(Priority {
    Low,
    Medium,
    High,
    Critical,
});

#[test]
fn test_spore_macro_null() {
    let value = spore!(null);
    assert_eq!(value, Spore::null());
    assert!(value.is_payload_null());
}

#[test]
fn test_spore_macro_empty() {
    let value = spore!(empty);
    assert_eq!(value, Spore::empty_collection());
    assert_eq!(value.to_string(), "-e-");
}

#[test]
fn test_spore_macro_primitives() {
    assert_eq!(spore!(true), Spore::atomic("true"));
    assert_eq!(spore!(42), Spore::atomic("42"));
    assert_eq!(spore!(-123), Spore::atomic("-123"));
    assert_eq!(spore!(3.5), Spore::atomic("3.5"));
    assert_eq!(spore!('x'), Spore::atomic("x"));
    assert_eq!(spore!("hello"), Spore::atomic("hello"));
}

#[test]
fn test_spore_macro_expressions() {
    let name = String::from("Alice");
    assert_eq!(spore!(name), Spore::atomic("Alice"));

    let missing: Option<u32> = None;
    assert_eq!(spore!(missing), Spore::null());

    let locale = Locale::new("en", Some("us")).unwrap();
    assert_eq!(spore!(locale), Spore::atomic("en-US"));
}

#[test]
fn test_spore_macro_composites() {
    assert_eq!(spore!([]).to_string(), "{||}");
    assert_eq!(spore!(["a"]).to_string(), "{|a|}");
    assert_eq!(
        spore!(["a", 1, null, empty]).to_string(),
        "{|a_|_1_|_--_|_-e-|}"
    );
    assert_eq!(spore!([[1, 2], [3]]).to_string(), "{|{|1_|_2|}_|_{|3|}|}");
}

#[test]
fn test_spore_macro_metadata() {
    let tree = spore!({ version: "001", id: "Filter" } ["name", "description", 3245]);
    assert_eq!(
        tree.to_string(),
        "{|{|spr_|_v001_|_uFilter|}_|_name_|_description_|_3245|}"
    );
    assert_eq!(tree.version().unwrap(), Some("001"));
    assert_eq!(tree.unique_identifier().unwrap(), Some("Filter"));
}

#[test]
fn test_spore_macro_matches_builder() {
    let from_macro = spore!({ id: "Pair" } ["left", ["right"]]);
    let from_builder = SporeBuilder::new()
        .unique_identifier("Pair")
        .append("left")
        .append_spore(Spore::composite(vec![Spore::atomic("right")]))
        .build();
    assert_eq!(from_macro, from_builder);
}

#[test]
fn test_spore_macro_round_trip() {
    let tree = spore!({ version: "2" } [1, [null, "x"], empty]);
    let back: Spore = tree.to_string().parse().unwrap();
    assert_eq!(back, tree);
}

#[test]
fn test_impl_ordinal_positions() {
    let all = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];
    for (index, priority) in all.iter().enumerate() {
        assert_eq!(priority.ordinal(), index);
        assert_eq!(Priority::from_ordinal(index), Some(*priority));
    }
    assert_eq!(Priority::from_ordinal(all.len()), None);
}

#[test]
fn test_impl_ordinal_with_builder() {
    let spore = SporeBuilder::new()
        .append_ordinal(&Priority::High)
        .build();
    assert_eq!(spore.to_string(), "{|2|}");

    let mut reader = spore.reader();
    assert_eq!(
        reader.next_as_ordinal::<Priority>().unwrap(),
        Some(Priority::High)
    );
}

#[test]
fn test_impl_ordinal_freezes_by_position() {
    assert_eq!(freeze(&Priority::Critical), Spore::atomic("3"));
    assert_eq!(spore!(Priority::Low), Spore::atomic("0"));

    let spore = SporeBuilder::new()
        .append(&Priority::Medium)
        .append(&None::<Priority>)
        .append(&"9")
        .build();
    assert_eq!(spore.to_string(), "{|1_|_--_|_9|}");

    let mut reader = spore.reader();
    assert_eq!(reader.next_as::<Priority>().unwrap(), Some(Priority::Medium));
    assert_eq!(reader.next_as::<Priority>().unwrap(), None);
    assert!(matches!(
        reader.next_as::<Priority>(),
        Err(Error::InvalidOrdinal { ordinal: 9, .. })
    ));
}

#[test]
fn test_impl_ordinal_collection_round_trip() {
    let priorities = vec![Priority::High, Priority::Low, Priority::Critical];
    let spore = SporeBuilder::new()
        .append_as_collection(Some(&priorities), |p| p.freeze())
        .build();
    assert_eq!(spore.to_string(), "{|{|2_|_0_|_3|}|}");

    let thawed = Spore::from_frozen(&spore.to_string()).unwrap();
    let decoded = thawed.reader().next_as_list(Priority::thaw).unwrap();
    assert_eq!(decoded, Some(priorities));
}
