use indexmap::IndexMap;
use spore::{
    impl_ordinal, Elements, Error, Freeze, Locale, ResolveHints, Result, Sporable, Spore,
    SporeBuilder, SporeRegistry, SporeType, Thaw,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Relevance,
}

impl_ordinal!(SortOrder {
    Newest,
    Oldest,
    Relevance
});

#[derive(Debug, Clone, PartialEq, Default)]
struct FilterModel {
    name: String,
    description: Option<String>,
    limit: i64,
}

impl SporeType for FilterModel {
    const UNIQUE_IDENTIFIER: &'static str = "FilterModelUniqueId";
    const VERSION: Option<&'static str> = Some("001");
}

impl Sporable for FilterModel {
    fn assemble_spore(&self) -> Spore {
        SporeBuilder::for_type::<Self>()
            .append(&self.name)
            .append(&self.description)
            .append(&self.limit)
            .build()
    }

    fn populate_from_spore(&mut self, spore: &Spore) -> Result<()> {
        let mut reader = spore.reader();
        self.name = reader.next_as_string()?.unwrap_or_default();
        self.description = reader.next_as_string()?;
        self.limit = reader.next_as_i64()?.unwrap_or_default();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct SavedSearch {
    id: Option<Uuid>,
    owner: String,
    order: SortOrder,
    tags: Option<Vec<String>>,
    weights: Option<IndexMap<String, f64>>,
    filter: Option<FilterModel>,
}

impl SporeType for SavedSearch {
    const UNIQUE_IDENTIFIER: &'static str = "SavedSearch";
}

impl Sporable for SavedSearch {
    fn assemble_spore(&self) -> Spore {
        SporeBuilder::for_type::<Self>()
            .append(&self.id)
            .append(&self.owner)
            .append_ordinal(&self.order)
            .append_as_collection(self.tags.as_ref(), |tag| tag.freeze())
            .append_as_map(self.weights.as_ref(), |k| k.freeze(), |v| v.freeze())
            .append(&self.filter)
            .build()
    }

    fn populate_from_spore(&mut self, spore: &Spore) -> Result<()> {
        let mut reader = spore.reader();
        self.id = reader.next_as_uuid()?;
        self.owner = reader.next_as_string()?.unwrap_or_default();
        self.order = reader.next_as_ordinal()?.unwrap_or_default();
        self.tags = reader.next_as_list(String::thaw)?;
        self.weights = reader.next_as_map()?;
        self.filter = reader.next_as_sporable(FilterModel::default)?;
        Ok(())
    }
}

fn sample_search() -> SavedSearch {
    let mut weights = IndexMap::new();
    weights.insert("title".to_string(), 2.5);
    weights.insert("body".to_string(), 1.0);

    SavedSearch {
        id: Some(Uuid::new_v4()),
        owner: "ada".to_string(),
        order: SortOrder::Relevance,
        tags: Some(vec!["rust".to_string(), "parsers".to_string()]),
        weights: Some(weights),
        filter: Some(FilterModel {
            name: "recent".to_string(),
            description: None,
            limit: 50,
        }),
    }
}

fn thaw_search(frozen: &str) -> SavedSearch {
    let spore = Spore::from_frozen(frozen).unwrap();
    let mut search = SavedSearch::default();
    search.populate_from_spore(&spore).unwrap();
    search
}

#[test]
fn test_sporable_round_trip() {
    let search = sample_search();
    let frozen = search.freeze().to_string();
    println!("SavedSearch spore: {}", frozen);

    assert_eq!(thaw_search(&frozen), search);
}

#[test]
fn test_sporable_round_trip_with_absent_fields() {
    let search = SavedSearch {
        id: None,
        owner: "grace".to_string(),
        order: SortOrder::Newest,
        tags: None,
        weights: Some(IndexMap::new()),
        filter: None,
    };

    let frozen = search.freeze().to_string();
    assert_eq!(frozen, "{|{|spr_|_uSavedSearch|}_|_--_|_grace_|_0_|_--_|_-e-_|_--|}");
    assert_eq!(thaw_search(&frozen), search);
}

#[test]
fn test_nested_sporable_carries_metadata() {
    let filter = FilterModel {
        name: "weekly".to_string(),
        description: Some("last seven days".to_string()),
        limit: 7,
    };

    let spore = filter.freeze();
    assert_eq!(spore.version().unwrap(), Some("001"));
    assert_eq!(spore.unique_identifier().unwrap(), Some("FilterModelUniqueId"));
    assert_eq!(
        spore.to_string(),
        "{|{|spr_|_v001_|_uFilterModelUniqueId|}_|_weekly_|_last seven days_|_7|}"
    );
}

#[test]
fn test_collection_states_are_distinguishable() {
    let empty: Vec<i32> = Vec::new();
    let spore = SporeBuilder::new()
        .append_as_collection(None::<&Vec<i32>>, |n| n.freeze())
        .append_as_collection(Some(&empty), |n| n.freeze())
        .append_as_collection(Some(&vec![5]), |n| n.freeze())
        .build();

    let thawed = Spore::from_frozen(&spore.to_string()).unwrap();
    let mut reader = thawed.reader();

    assert!(reader.next_elements().unwrap().is_absent());
    assert!(reader.next_elements().unwrap().is_empty());
    match reader.next_elements().unwrap() {
        Elements::Present(mut elements) => {
            assert_eq!(elements.next_as_i32().unwrap(), Some(5));
            assert!(elements.is_exhausted());
        }
        other => panic!("expected a present collection, got {:?}", other),
    }
}

#[test]
fn test_collection_of_nulls_is_not_null() {
    let items: Vec<Option<String>> = vec![None, None];
    let spore = SporeBuilder::new()
        .append_as_collection(Some(&items), |item| item.freeze())
        .build();

    let collection = &spore.children()[0];
    assert!(!collection.is_empty());
    assert!(!collection.is_payload_null());

    let mut reader = spore.reader();
    let decoded = reader.next_as_list(Option::<String>::thaw).unwrap();
    assert_eq!(decoded, Some(vec![None, None]));
}

#[test]
fn test_collection_excluding_null() {
    let items = vec![Some(1), None, Some(3)];
    let spore = SporeBuilder::new()
        .append_as_stream(&items, |item| item.freeze())
        .build();

    let mut reader = spore.reader();
    let decoded: Option<Vec<i32>> = reader
        .next_as_collection_excluding_null(|child| i32::thaw(child).map(Some))
        .unwrap();
    assert_eq!(decoded, Some(vec![1, 3]));
}

#[test]
fn test_set_drops_duplicates() {
    let spore = SporeBuilder::new()
        .append_as_stream(["a", "b", "a"], |s| s.freeze())
        .build();

    let mut reader = spore.reader();
    let set = reader.next_as_set(String::thaw).unwrap().unwrap();
    assert_eq!(set.len(), 2);
    assert!(set.contains("a") && set.contains("b"));
}

#[test]
fn test_collect_into_any_container() {
    let spore = SporeBuilder::new()
        .append_as_stream([3, 1, 2], |n| n.freeze())
        .build();

    let mut reader = spore.reader();
    let sorted: Option<BTreeSet<i32>> = reader.next_as_collection(i32::thaw).unwrap();
    assert_eq!(sorted.unwrap().into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn test_map_parity() {
    let mut scores = HashMap::new();
    scores.insert("alpha".to_string(), 1);
    scores.insert("beta".to_string(), 2);
    scores.insert("gamma".to_string(), 3);

    let spore = SporeBuilder::new()
        .append_as_map(Some(&scores), |k| k.freeze(), |v| v.freeze())
        .build();

    let thawed = Spore::from_frozen(&spore.to_string()).unwrap();
    let decoded: HashMap<String, i32> = thawed.reader().next_as_map().unwrap().unwrap();
    assert_eq!(decoded.len(), scores.len());
    assert_eq!(decoded, scores);
}

#[test]
fn test_header_lookalike_collection_round_trip() {
    let values = vec!["v2".to_string(), "u".to_string(), "abc".to_string()];
    let spore = SporeBuilder::new()
        .append_as_collection(Some(&values), |s| s.freeze())
        .build();

    let frozen = spore.to_string();
    assert_eq!(frozen, "{|{|v2_|_u_|_abc|}|}");

    let thawed = Spore::from_frozen(&frozen).unwrap();
    assert_eq!(thawed, spore);
    assert_eq!(thawed.reader().next_as_list(String::thaw).unwrap(), Some(values));
}

#[test]
fn test_header_lookalike_map_round_trip() {
    let mut pairs = BTreeMap::new();
    pairs.insert("v1".to_string(), "u".to_string());
    pairs.insert("w".to_string(), "x".to_string());

    let spore = SporeBuilder::new()
        .append_as_map(Some(&pairs), |k| k.freeze(), |v| v.freeze())
        .build();

    let frozen = spore.to_string();
    assert_eq!(frozen, "{|{|v1_|_u_|_w_|_x|}|}");

    let thawed = Spore::from_frozen(&frozen).unwrap();
    assert_eq!(thawed, spore);
    let decoded: BTreeMap<String, String> = thawed.reader().next_as_map().unwrap().unwrap();
    assert_eq!(decoded, pairs);
}

#[test]
fn test_empty_map_is_not_null() {
    let empty: HashMap<String, String> = HashMap::new();
    let spore = SporeBuilder::new()
        .append_as_map(Some(&empty), |k| k.freeze(), |v| v.freeze())
        .append_as_map(None::<&HashMap<String, String>>, |k| k.freeze(), |v| v.freeze())
        .build();

    let mut reader = spore.reader();
    let present: Option<HashMap<String, String>> = reader.next_as_map().unwrap();
    assert_eq!(present, Some(HashMap::new()));
    let absent: Option<HashMap<String, String>> = reader.next_as_map().unwrap();
    assert_eq!(absent, None);
}

#[test]
fn test_map_with_null_value_skips_decoder() {
    let spore = Spore::from_frozen("{|{|k1_|_--_|_k2_|_9|}|}").unwrap();
    let mut reader = spore.reader();

    let mut calls = 0;
    let pairs: Vec<(Option<String>, Option<i32>)> = reader
        .next_as_map_with(String::thaw, |value| {
            calls += 1;
            i32::thaw(value)
        })
        .unwrap()
        .unwrap();

    assert_eq!(calls, 1);
    assert_eq!(
        pairs,
        vec![
            (Some("k1".to_string()), None),
            (Some("k2".to_string()), Some(9))
        ]
    );
}

#[test]
fn test_odd_map_is_rejected() {
    let spore = Spore::from_frozen("{|{|k1_|_v1_|_k2|}|}").unwrap();
    let result: Result<Option<HashMap<String, String>>> = spore.reader().next_as_map();
    assert_eq!(result, Err(Error::AmbiguousMapEncoding { len: 3 }));
}

#[test]
fn test_reader_exhaustion() {
    let spore = SporeBuilder::new().append(&1).append(&2).build();
    let mut reader = spore.reader();

    assert_eq!(reader.remaining(), 2);
    assert_eq!(reader.next_as_i32().unwrap(), Some(1));
    assert_eq!(reader.position(), 1);
    assert_eq!(reader.next_as_i32().unwrap(), Some(2));
    assert!(!reader.has_next());
    assert_eq!(
        reader.next_as_i32(),
        Err(Error::CursorExhausted { consumed: 2 })
    );
}

#[test]
fn test_primitive_reads() {
    let id = Uuid::new_v4();
    let date = chrono::NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    let locale: Locale = "en_gb".parse().unwrap();

    let spore = SporeBuilder::new()
        .append(&-7i64)
        .append(&0.25f64)
        .append(&true)
        .append(&locale)
        .append(&id)
        .append(&date)
        .append_null_payload()
        .build();

    let thawed = Spore::from_frozen(&spore.to_string()).unwrap();
    let mut reader = thawed.reader();
    assert_eq!(reader.next_as_i64().unwrap(), Some(-7));
    assert_eq!(reader.next_as_f64().unwrap(), Some(0.25));
    assert_eq!(reader.next_as_bool().unwrap(), Some(true));
    assert_eq!(reader.next_as_locale().unwrap(), Some(locale));
    assert_eq!(reader.next_as_uuid().unwrap(), Some(id));
    assert_eq!(reader.next_as_date().unwrap(), Some(date));
    assert_eq!(reader.next_as_string().unwrap(), None);
}

#[test]
fn test_ordinal_out_of_range() {
    let spore = SporeBuilder::new().append(&7).build();
    let result = spore.reader().next_as_ordinal::<SortOrder>();
    assert!(matches!(result, Err(Error::InvalidOrdinal { ordinal: 7, .. })));
}

#[test]
fn test_versioned_factory_sees_version() {
    let filter = FilterModel {
        name: "x".to_string(),
        description: None,
        limit: 1,
    };
    let spore = SporeBuilder::new().append(&filter).build();

    let mut seen = None;
    let decoded = spore
        .reader()
        .next_as_sporable_versioned(|version| {
            seen = version.map(str::to_string);
            FilterModel::default()
        })
        .unwrap();

    assert_eq!(seen.as_deref(), Some("001"));
    assert_eq!(decoded, Some(filter));
}

#[test]
fn test_parse_next_into_existing_instance() {
    let filter = FilterModel {
        name: "inbox".to_string(),
        description: Some("unread".to_string()),
        limit: 10,
    };
    let spore = SporeBuilder::new().append(&filter).build();

    let mut target = FilterModel::default();
    spore.reader().parse_next_into(&mut target).unwrap();
    assert_eq!(target, filter);
}

#[test]
fn test_next_reader_if_present() {
    let spore = SporeBuilder::new()
        .append_builder(SporeBuilder::new().append("inner"))
        .build();

    let mut reader = spore.reader();
    let mut inner = reader.next_reader_if_present().unwrap();
    assert_eq!(inner.next_as_string().unwrap().as_deref(), Some("inner"));
    assert!(reader.next_reader_if_present().is_none());
}

fn registry() -> SporeRegistry {
    let mut registry: SporeRegistry = SporeRegistry::new();
    registry
        .register_type::<FilterModel>()
        .register_type::<SavedSearch>();
    registry
}

#[test]
fn test_registry_dispatch() {
    let registry = registry();
    let search = sample_search();
    let spore = SporeBuilder::new()
        .append(&search)
        .append(search.filter.as_ref().unwrap())
        .build();

    let thawed = Spore::from_frozen(&spore.to_string()).unwrap();
    let mut reader = thawed.reader();

    let first = reader.next_as_automatic(&registry).unwrap().unwrap();
    assert_eq!(first.assemble_spore(), search.freeze());

    let second = reader.next_as_automatic(&registry).unwrap().unwrap();
    assert_eq!(second.assemble_spore(), search.filter.unwrap().freeze());
}

#[test]
fn test_registry_dispatch_of_legacy_header() {
    let registry = registry();
    let spore =
        Spore::from_frozen("{|v001_|_u_|_FilterModelUniqueId_|_name_|_description_|_3245|}")
            .unwrap();

    let instance = spore.to_instance(&registry).unwrap();
    let expected = FilterModel {
        name: "name".to_string(),
        description: Some("description".to_string()),
        limit: 3245,
    };
    assert_eq!(instance.assemble_spore(), expected.freeze());
}

#[test]
fn test_registry_failures() {
    let registry = registry();

    let no_metadata = SporeBuilder::new().append("x").build();
    assert!(matches!(
        no_metadata.to_instance(&registry),
        Err(Error::MissingMetadata)
    ));

    let unknown = SporeBuilder::new().unique_identifier("Unknown").build();
    assert!(matches!(
        unknown.to_instance(&registry),
        Err(Error::TypeResolutionFailed { .. })
    ));

    let mut ambiguous: SporeRegistry = SporeRegistry::new();
    ambiguous
        .register("Shared", "app::v1::Shared", || {
            Ok(Box::new(FilterModel::default()) as Box<dyn Sporable>)
        })
        .register("Shared", "app::v2::Shared", || {
            Ok(Box::new(SavedSearch::default()) as Box<dyn Sporable>)
        });

    let shared = SporeBuilder::new().unique_identifier("Shared").build();
    match shared.to_instance(&ambiguous) {
        Err(Error::TypeResolutionAmbiguous { candidates, .. }) => {
            assert_eq!(candidates, vec!["app::v1::Shared", "app::v2::Shared"]);
        }
        _ => panic!("expected an ambiguous resolution"),
    }

    let hints = ResolveHints::new().with_type_hint("app::v2");
    assert!(shared
        .instantiate_without_populating_with_hints(&ambiguous, &hints)
        .is_ok());

    let hints = ResolveHints::new().with_name_hint("Missing");
    assert!(matches!(
        shared.instantiate_without_populating_with_hints(&ambiguous, &hints),
        Err(Error::TypeResolutionFailed { .. })
    ));
}

#[test]
fn test_instantiation_failure_propagates() {
    let mut registry: SporeRegistry = SporeRegistry::new();
    registry.register("Broken", "app::Broken", || {
        Err(Error::instantiation_failed("app::Broken", "no default state"))
    });

    let spore = SporeBuilder::new().unique_identifier("Broken").build();
    assert!(matches!(
        spore.instantiate_without_populating(&registry),
        Err(Error::InstantiationFailed { .. })
    ));
}
