use crate::*;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        let span = (end_exclusive - start) as u64;
        start + (self.next_u64() % span) as usize
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() >> 33) & 1 == 1
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Details {
    category: String,
    rating: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
struct Person {
    age: u32,
    name: String,
    details: Details,
    manager: Option<Details>,
}

fn person(age: u32, name: &str) -> Person {
    Person {
        age,
        name: name.to_owned(),
        details: Details {
            category: String::new(),
            rating: None,
        },
        manager: None,
    }
}

fn details_fields() -> FieldTable<Details> {
    FieldTable::<Details>::new()
        .field("Category", |d| d.category.as_str().into())
        .field("Rating", |d| d.rating.into())
}

fn person_fields() -> FieldTable<Person> {
    let details = details_fields();
    FieldTable::<Person>::new()
        .field("Age", |p| p.age.into())
        .field("Name", |p| p.name.as_str().into())
        .nested("Details", |p| &p.details, &details)
        .nested_opt("Manager", |p| p.manager.as_ref(), &details)
}

fn request(start_index: usize, count: Option<usize>, sort_keys: Vec<SortKey>) -> ItemsRequest {
    ItemsRequest::new(start_index, count).with_sort_keys(sort_keys)
}

fn names(people: &[Person]) -> Vec<&str> {
    people.iter().map(|p| p.name.as_str()).collect()
}

// --- codec -----------------------------------------------------------------------------------

#[test]
fn codec_parses_concatenated_groups() {
    let keys = codec::parse("[Age,Ascending][Details.Category,Descending]");
    assert_eq!(
        keys,
        vec![
            SortKey::ascending("Age"),
            SortKey::descending("Details.Category")
        ]
    );
}

#[test]
fn codec_accepts_comma_delimited_groups() {
    let keys = codec::parse("[A,Ascending],[B,Descending]");
    assert_eq!(keys, vec![SortKey::ascending("A"), SortKey::descending("B")]);
}

#[test]
fn codec_defaults_missing_or_unknown_direction_to_ascending() {
    let keys = codec::parse("[A][B,sideways][C,descending]");
    assert_eq!(
        keys,
        vec![
            SortKey::ascending("A"),
            SortKey::ascending("B"),
            SortKey::ascending("C"),
        ]
    );
}

#[test]
fn codec_takes_first_and_last_tokens_of_a_group() {
    let keys = codec::parse("[Name,ignored,Descending]");
    assert_eq!(keys, vec![SortKey::descending("Name")]);
}

#[test]
fn codec_blank_input_is_empty() {
    assert!(codec::parse("").is_empty());
    assert!(codec::parse("   ").is_empty());
    assert!(codec::parse_all(Vec::<String>::new()).is_empty());
    assert!(codec::parse_all(None::<&str>).is_empty());
}

#[test]
fn codec_drops_malformed_groups() {
    let keys = codec::parse("[][,Descending][Age,Descending][  ]");
    assert_eq!(keys, vec![SortKey::descending("Age")]);
}

#[test]
fn codec_joins_repeated_values_in_order() {
    let keys = codec::parse_all(["[B,Descending]", "[A,Ascending]"]);
    assert_eq!(keys, vec![SortKey::descending("B"), SortKey::ascending("A")]);
}

#[test]
fn codec_round_trips() {
    let mut rng = Lcg::new(7);
    let paths = ["Age", "Name", "Details.Category", "A.B.C", "x"];
    for _ in 0..200 {
        let n = rng.gen_range_usize(0, 5);
        let keys: Vec<SortKey> = (0..n)
            .map(|_| {
                let path = paths[rng.gen_range_usize(0, paths.len())];
                if rng.gen_bool() {
                    SortKey::descending(path)
                } else {
                    SortKey::ascending(path)
                }
            })
            .collect();
        assert_eq!(codec::parse(&codec::serialize(&keys)), keys);
    }
}

#[test]
fn sort_key_display_is_single_group() {
    assert_eq!(
        SortKey::descending("Details.Category").to_string(),
        "[Details.Category,Descending]"
    );
    assert_eq!(codec::serialize(&[]), "");
}

// --- binder ----------------------------------------------------------------------------------

#[test]
fn bind_reads_all_parameters() {
    let req = ItemsRequest::bind([
        ("startIndex", "20"),
        ("count", "10"),
        ("sortBy", "[Age,Descending]"),
        ("sortBy", "[Name,Ascending]"),
        ("unrelated", "x"),
    ])
    .unwrap();
    assert_eq!(req.start_index, 20);
    assert_eq!(req.count, Some(10));
    assert_eq!(
        req.sort_keys,
        vec![SortKey::descending("Age"), SortKey::ascending("Name")]
    );
    assert!(!req.is_cancelled());
}

#[test]
fn bind_requires_start_index() {
    assert_eq!(
        ItemsRequest::bind([("count", "10")]),
        Err(BindError::MissingStartIndex)
    );
    assert_eq!(
        ItemsRequest::bind([("startIndex", "-1")]),
        Err(BindError::InvalidStartIndex("-1".to_owned()))
    );
    assert_eq!(
        ItemsRequest::bind([("startIndex", "ten")]),
        Err(BindError::InvalidStartIndex("ten".to_owned()))
    );
}

#[test]
fn bind_treats_bad_count_as_absent() {
    let req = ItemsRequest::bind([("StartIndex", "3"), ("COUNT", "lots")]).unwrap();
    assert_eq!(req.start_index, 3);
    assert_eq!(req.count, None);
    assert!(req.sort_keys.is_empty());
}

#[test]
fn bind_accepts_its_own_query_pairs() {
    let req = request(
        5,
        Some(25),
        vec![SortKey::ascending("Age"), SortKey::descending("Name")],
    );
    let pairs = req.to_query_pairs();
    assert_eq!(pairs[0], ("startIndex", "5".to_owned()));
    assert_eq!(ItemsRequest::bind(pairs).unwrap(), req);
}

// --- sort values / field table ---------------------------------------------------------------

#[test]
fn sort_values_order_across_variants() {
    assert!(SortValue::Null < SortValue::Bool(false));
    assert!(SortValue::Bool(true) < SortValue::Int(-5));
    assert!(SortValue::Int(-1) < SortValue::UInt(0));
    assert!(SortValue::UInt(3) > SortValue::Int(2));
    assert!(SortValue::Float(2.5) > SortValue::Int(2));
    assert!(SortValue::UInt(3) > SortValue::Float(2.5));
    assert!(SortValue::Float(f64::MAX) < SortValue::Text(String::new()));
    assert_eq!(SortValue::Int(4), SortValue::UInt(4));
    assert_eq!(SortValue::from(None::<i32>), SortValue::Null);
}

#[test]
fn sort_values_compare_integers_and_floats_exactly() {
    const P53: i64 = 1 << 53;
    assert!(SortValue::Int(P53 + 1) > SortValue::Float(P53 as f64));
    assert_eq!(SortValue::Float(P53 as f64), SortValue::Int(P53));
    assert!(SortValue::UInt(u64::MAX) < SortValue::Float(u64::MAX as f64));
    assert!(SortValue::UInt(u64::MAX) < SortValue::Float(f64::INFINITY));
    assert!(SortValue::Int(i64::MIN) > SortValue::Float(f64::NEG_INFINITY));
    assert!(SortValue::Int(0) > SortValue::Float(-0.5));
    assert!(SortValue::Int(-1) < SortValue::Float(-0.5));
    assert_eq!(SortValue::Float(-0.0), SortValue::Int(0));
    assert_eq!(SortValue::Float(-0.0), SortValue::Float(0.0));
    assert!(SortValue::Float(f64::NAN) > SortValue::Int(i64::MAX));
    assert!(SortValue::Float(-f64::NAN) < SortValue::Int(i64::MIN));
}

#[test]
fn apply_orders_mixed_numeric_kinds_past_float_precision() {
    const P53: i64 = 1 << 53;
    let mut rng = Lcg::new(53);
    let source: Vec<SortValue> = (0..64)
        .map(|i| match (i + rng.gen_range_usize(0, 3)) % 3 {
            0 => SortValue::Int(P53 + 1),
            1 => SortValue::Float(P53 as f64),
            _ => SortValue::UInt(P53 as u64),
        })
        .collect();
    let fields = FieldTable::<SortValue>::new().field("Value", |v| v.clone());
    let req = request(0, None, vec![SortKey::ascending("Value")]);
    let out: Vec<SortValue> = fields.apply(&source, &req).unwrap().cloned().collect();

    assert_eq!(out.len(), source.len());
    assert!(out.windows(2).all(|pair| pair[0] <= pair[1]));
    let bigger = out.iter().filter(|v| **v == SortValue::Int(P53 + 1)).count();
    assert!(out[out.len() - bigger..]
        .iter()
        .all(|v| matches!(v, SortValue::Int(n) if *n == P53 + 1)));
}

#[test]
fn field_table_registers_nested_paths() {
    let fields = person_fields();
    for path in [
        "Age",
        "Name",
        "Details.Category",
        "Details.Rating",
        "Manager.Category",
        "Manager.Rating",
    ] {
        assert!(fields.contains(path), "missing {path}");
    }
    assert_eq!(fields.len(), 6);
    assert!(!fields.contains("details.category"));
}

#[test]
fn nested_opt_resolves_absent_structure_to_null() {
    let fields = person_fields();
    let accessor = fields.resolve("Manager.Category").unwrap();
    assert_eq!(accessor(&person(1, "x")), SortValue::Null);
}

// --- query -----------------------------------------------------------------------------------

#[test]
fn apply_end_to_end_example() {
    let source = vec![person(30, "A"), person(25, "B"), person(25, "C")];
    let fields = person_fields();
    let req = request(0, Some(2), vec![SortKey::ascending("Age")]);

    let window: Vec<Person> = fields.apply(source.clone(), &req).unwrap().collect();
    assert_eq!(names(&window), ["B", "C"]);

    let result = ItemsResult::new(window, source.len());
    assert_eq!(result.total_item_count, 3);
}

#[test]
fn apply_multi_key_orders_groups_and_ties() {
    let source = vec![
        person(2, "a"),
        person(1, "b"),
        person(2, "c"),
        person(1, "d"),
        person(2, "b"),
    ];
    let fields = person_fields();
    let req = request(
        0,
        None,
        vec![SortKey::ascending("Age"), SortKey::descending("Name")],
    );
    let out: Vec<&Person> = fields.apply(&source, &req).unwrap().collect();
    let pairs: Vec<(u32, &str)> = out.iter().map(|p| (p.age, p.name.as_str())).collect();
    assert_eq!(
        pairs,
        [(1, "d"), (1, "b"), (2, "c"), (2, "b"), (2, "a")]
    );
    // The input is untouched.
    assert_eq!(names(&source), ["a", "b", "c", "d", "b"]);
}

#[test]
fn apply_sort_is_stable_and_matches_compare() {
    let mut rng = Lcg::new(42);
    let source: Vec<Person> = (0..300)
        .map(|i| person(rng.gen_range_usize(0, 8) as u32, &format!("{i:04}")))
        .collect();
    let fields = person_fields();
    let req = request(0, None, vec![SortKey::descending("Age")]);
    let out: Vec<&Person> = fields.apply(&source, &req).unwrap().collect();

    let plan = fields.compile(&req.sort_keys).unwrap();
    for pair in out.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert_ne!(plan.compare(a, b), core::cmp::Ordering::Greater);
        if a.age == b.age {
            // Names encode the original position.
            assert!(a.name < b.name);
        }
    }
}

#[test]
fn apply_sorts_by_nested_path() {
    let mut source = vec![person(1, "x"), person(2, "y"), person(3, "z")];
    source[0].details.category = "tools".to_owned();
    source[1].details.category = "books".to_owned();
    source[2].details.category = "garden".to_owned();

    let fields = person_fields();
    let req = request(0, None, vec![SortKey::ascending("Details.Category")]);
    let out: Vec<&Person> = fields.apply(&source, &req).unwrap().collect();
    assert_eq!(
        out.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        ["y", "z", "x"]
    );
}

#[test]
fn apply_without_sort_keys_preserves_order() {
    let source = vec![person(3, "c"), person(1, "a"), person(2, "b")];
    let fields = person_fields();
    let out: Vec<&Person> = fields.apply(&source, &request(1, None, vec![])).unwrap().collect();
    assert_eq!(
        out.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        ["a", "b"]
    );
}

#[test]
fn apply_window_boundaries() {
    let source: Vec<u32> = (0..10).collect();
    let fields = FieldTable::<u32>::new().field("Value", |v| (*v).into());

    let mut rng = Lcg::new(9);
    for _ in 0..500 {
        let start = rng.gen_range_usize(0, 15);
        let count = rng.gen_range_usize(0, 15);
        let req = request(start, Some(count), vec![SortKey::ascending("Value")]);
        let out: Vec<&u32> = fields.apply(&source, &req).unwrap().collect();
        let expected = count.min(source.len().saturating_sub(start));
        assert_eq!(out.len(), expected, "start={start} count={count}");
        if let Some(first) = out.first() {
            assert_eq!(**first as usize, start);
        }
    }

    let all: Vec<&u32> = fields.apply(&source, &request(4, None, vec![])).unwrap().collect();
    assert_eq!(all.len(), 6);
    assert_eq!(fields.apply(&source, &request(10, None, vec![])).unwrap().count(), 0);
    assert_eq!(fields.apply(&source, &request(0, Some(0), vec![])).unwrap().count(), 0);
}

#[test]
fn apply_result_composes_with_further_adapters() {
    let source: Vec<u32> = (0..20).collect();
    let fields = FieldTable::<u32>::new().field("Value", |v| (*v).into());
    let req = request(0, Some(10), vec![SortKey::descending("Value")]);
    let evens: Vec<u32> = fields
        .apply(source.iter().copied(), &req)
        .unwrap()
        .filter(|v| v % 2 == 0)
        .collect();
    assert_eq!(evens, [18, 16, 14, 12, 10]);
}

#[test]
fn apply_without_sort_keys_is_lazy() {
    let fields = FieldTable::<u64>::new();
    let mut pulled = 0usize;
    let source = (0u64..).inspect(|_| pulled += 1);
    let out: Vec<u64> = fields.apply(source, &request(3, Some(2), vec![])).unwrap().collect();
    assert_eq!(out, [3, 4]);
    assert_eq!(pulled, 5);
}

#[test]
fn apply_unknown_field_fails_before_touching_source() {
    let fields = person_fields();
    let mut touched = false;
    let source = core::iter::once(person(1, "a")).inspect(|_| touched = true);
    let req = request(
        0,
        None,
        vec![SortKey::ascending("Age"), SortKey::ascending("Details.Missing")],
    );
    let err = fields.apply(source, &req).unwrap_err();
    assert_eq!(
        err,
        QueryError::UnknownField {
            path: "Details.Missing".to_owned()
        }
    );
    assert!(!touched);
}

#[test]
fn apply_sorts_nulls_first_ascending() {
    let mut source = vec![person(1, "a"), person(2, "b"), person(3, "c")];
    source[0].details.rating = Some(4.5);
    source[2].details.rating = Some(1.0);
    let fields = person_fields();
    let req = request(0, None, vec![SortKey::ascending("Details.Rating")]);
    let out: Vec<&Person> = fields.apply(&source, &req).unwrap().collect();
    assert_eq!(
        out.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        ["b", "c", "a"]
    );
}

// --- pagination ------------------------------------------------------------------------------

#[test]
fn pagination_tracks_last_page() {
    let mut p = PaginationState::new(10);
    assert_eq!(p.last_page_index(), None);
    p.set_total_item_count(0);
    assert_eq!(p.last_page_index(), Some(0));
    p.set_total_item_count(10);
    assert_eq!(p.last_page_index(), Some(0));
    p.set_total_item_count(11);
    assert_eq!(p.last_page_index(), Some(1));
    assert_eq!(PaginationState::new(0).items_per_page(), 1);
}

#[test]
fn pagination_clamps_when_total_shrinks() {
    let mut p = PaginationState::new(10);
    assert!(p.set_current_page_index(7));
    assert_eq!(p.current_page_index(), 7);

    assert!(p.set_total_item_count(35));
    assert_eq!(p.current_page_index(), 3);
    assert!(!p.set_total_item_count(40));

    assert!(!p.set_current_page_index(9));
    assert_eq!(p.current_page_index(), 3);
    assert!(p.set_current_page_index(1));
}

#[test]
fn pagination_builds_page_requests() {
    let mut p = PaginationState::new(25);
    p.set_total_item_count(100);
    p.set_current_page_index(2);
    let req = p.request(vec![SortKey::ascending("Age")]);
    assert_eq!(req.start_index, 50);
    assert_eq!(req.count, Some(25));
    assert_eq!(req.sort_keys, vec![SortKey::ascending("Age")]);

    p.set_items_per_page(10);
    assert_eq!(p.current_page_index(), 5);
    assert_eq!(p.start_index(), 50);
}

#[test]
fn items_result_map_keeps_total() {
    let r = ItemsResult::new(vec![1, 2, 3], 10).map(|v| v * 2);
    assert_eq!(r.items, [2, 4, 6]);
    assert_eq!(r.total_item_count, 10);
    assert!(ItemsResult::<u8>::default().is_empty());
}

#[test]
fn request_clones_share_cancellation() {
    let req = request(0, Some(1), vec![]);
    let copy = req.clone();
    copy.cancel.cancel();
    assert!(req.is_cancelled());
    assert_eq!(req.end_index(), Some(1));
}
