// Tests for runtime shape inference and instantiation
use crate::*;
use tracing_test::traced_test;

fn mixed(n: usize) -> Vec<LuaValue> {
    (0..n)
        .map(|i| match i % 4 {
            0 => LuaValue::integer(i as i64),
            1 => LuaValue::string(format!("s{}", i)),
            2 => LuaValue::nil(),
            _ => LuaValue::boolean(i % 2 == 0),
        })
        .collect()
}

#[test]
fn test_make_instance_type_small() {
    let values = [
        LuaValue::integer(1),
        LuaValue::string("a"),
        LuaValue::nil(),
        LuaValue::new_table(),
    ];
    assert_eq!(
        make_instance_type(0, &values),
        MultiReturnsShape::Fixed(vec![
            ValueCategory::Number,
            ValueCategory::String,
            ValueCategory::Any,
            ValueCategory::Table,
        ])
    );

    // Offset selects the tail
    assert_eq!(
        make_instance_type(2, &values),
        MultiReturnsShape::Fixed(vec![ValueCategory::Any, ValueCategory::Table])
    );
    assert_eq!(make_instance_type(4, &values), MultiReturnsShape::Untyped);
    assert_eq!(make_instance_type(0, &[]), MultiReturnsShape::Untyped);
}

#[test]
fn test_make_instance_type_nests_by_seven() {
    let seven = make_instance_type(0, &mixed(7));
    assert_eq!(seven.slots().len(), 7);
    assert!(seven.continuation().is_none());

    let eight = make_instance_type(0, &mixed(8));
    assert_eq!(eight.slots().len(), 7);
    assert_eq!(
        eight.continuation(),
        Some(&MultiReturnsShape::Fixed(vec![ValueCategory::Boolean]))
    );

    let fifteen = make_instance_type(0, &mixed(15));
    let tail = fifteen.continuation().and_then(MultiReturnsShape::continuation);
    assert_eq!(tail.map(|t| t.slots().len()), Some(1));
    assert!(fifteen.is_supported());

    let fourteen = make_instance_type(0, &mixed(14));
    assert_eq!(
        fourteen.continuation().map(|t| t.slots().len()),
        Some(7)
    );
}

#[test]
fn test_round_trip_keeps_matching_values() {
    for n in [0, 1, 5, 7, 8, 13, 14, 15, 30] {
        let values = mixed(n);
        let shaped = MultiReturns::create_instance(&values);

        assert_eq!(shaped.shape(), &make_instance_type(0, &values));
        for (i, value) in values.iter().enumerate() {
            assert_eq!(&shaped.get(i), value, "position {} of {}", i, n);
        }
        assert!(shaped.get(n).is_nil());
        assert_eq!(
            shaped.len(),
            MultiReturns::new(values.iter().cloned()).len()
        );
    }
}

#[test]
fn test_create_instance_drops_mismatched_slots() {
    let shape = MultiReturnsShape::Fixed(vec![ValueCategory::Number, ValueCategory::String]);
    let values = [LuaValue::string("x"), LuaValue::string("y"), LuaValue::integer(3)];

    let shaped = create_instance(&shape, 0, &values).unwrap();
    assert!(shaped.get(0).is_nil());
    assert_eq!(shaped.get(1), LuaValue::string("y"));
    // Beyond the shape's arity
    assert!(shaped.get(2).is_nil());
    assert_eq!(shaped.len(), 2);
}

#[test]
fn test_create_instance_with_offset() {
    let values = mixed(10);
    let shape = make_instance_type(3, &values);
    let shaped = create_instance(&shape, 3, &values).unwrap();

    for i in 0..7 {
        assert_eq!(shaped.get(i), values[3 + i]);
    }
}

#[test]
fn test_create_instance_offset_past_end() {
    let values = mixed(3);
    let shape = make_instance_type(10, &values);
    assert_eq!(shape, MultiReturnsShape::Untyped);

    let shaped = create_instance(&shape, 10, &values).unwrap();
    assert!(shaped.is_empty());
    assert!(shaped.get(0).is_nil());
}

#[test]
fn test_create_instance_continued_shape() {
    let values: Vec<LuaValue> = (0..10).map(LuaValue::integer).collect();
    let shape = MultiReturnsShape::Continued(
        vec![ValueCategory::Number; 7],
        Box::new(MultiReturnsShape::Fixed(vec![
            ValueCategory::String,
            ValueCategory::Number,
        ])),
    );

    let shaped = create_instance(&shape, 0, &values).unwrap();
    let rest = shaped.rest().unwrap();
    assert!(rest.get(0).is_nil());
    assert_eq!(rest.get(1), LuaValue::integer(8));
    assert_eq!(shaped.get(8), LuaValue::integer(8));
    assert_eq!(shaped.len(), 9);
}

#[test]
fn test_unsupported_shapes() {
    let values = mixed(3);
    let unsupported = [
        MultiReturnsShape::Fixed(vec![]),
        MultiReturnsShape::Fixed(vec![ValueCategory::Any; 8]),
        MultiReturnsShape::Continued(
            vec![ValueCategory::Any; 6],
            Box::new(MultiReturnsShape::Untyped),
        ),
        MultiReturnsShape::Continued(
            vec![ValueCategory::Any; 7],
            Box::new(MultiReturnsShape::Fixed(vec![])),
        ),
    ];

    for shape in unsupported {
        assert!(!shape.is_supported());
        match create_instance(&shape, 0, &values) {
            Err(LuaError::UnsupportedMultiReturnsShape { shape: name }) => {
                assert_eq!(name, shape.to_string());
            }
            other => panic!("expected unsupported shape error, got {:?}", other),
        }
    }
}

#[test]
fn test_shape_display() {
    let shape = MultiReturnsShape::Continued(
        vec![ValueCategory::Any; 7],
        Box::new(MultiReturnsShape::Fixed(vec![ValueCategory::Boolean])),
    );
    assert_eq!(
        shape.to_string(),
        "MultiReturns8<LuaValue, LuaValue, LuaValue, LuaValue, LuaValue, LuaValue, LuaValue, MultiReturns1<bool>>"
    );
    assert_eq!(MultiReturnsShape::Untyped.to_string(), "MultiReturns");

    let err = create_instance(&MultiReturnsShape::Fixed(vec![]), 0, &[]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "type 'MultiReturns0<>' is not a supported MultiReturns type"
    );
}

#[test]
fn test_static_shape_matches_inferred() {
    let values = [LuaValue::integer(1), LuaValue::string("a"), LuaValue::nil()];
    assert_eq!(
        MultiReturns3::<LuaNumber, LuaString, LuaValue>::shape(),
        make_instance_type(0, &values)
    );

    let mut long: Vec<LuaValue> = (0..7).map(LuaValue::integer).collect();
    long.push(LuaValue::boolean(true));
    assert_eq!(
        MultiReturns8::<
            LuaNumber,
            LuaNumber,
            LuaNumber,
            LuaNumber,
            LuaNumber,
            LuaNumber,
            LuaNumber,
            MultiReturns1<bool>,
        >::shape(),
        make_instance_type(0, &long)
    );
    assert_eq!(MultiReturns::shape(), MultiReturnsShape::Untyped);
}

#[test]
fn test_downcast_to_static_type() {
    let values = [LuaValue::integer(1), LuaValue::string("a")];
    let shaped = MultiReturns::create_instance(&values);

    let typed = shaped
        .downcast::<MultiReturns2<LuaNumber, LuaString>>()
        .unwrap();
    assert_eq!(typed.value1(), Some(LuaNumber::Integer(1)));
    assert_eq!(typed.value2(), Some(LuaString::new("a")));

    assert!(shaped.downcast::<MultiReturns2<LuaString, LuaString>>().is_none());
    assert!(shaped.downcast::<MultiReturns>().is_none());
}

#[test]
fn test_create_instance_of_static_type() {
    let values = [LuaValue::integer(1), LuaValue::string("x"), LuaValue::integer(3)];
    let typed = MultiReturns::create_instance_of::<MultiReturns2<LuaNumber, bool>>(&values);

    assert_eq!(typed.value1(), Some(LuaNumber::Integer(1)));
    assert_eq!(typed.value2(), None);
    assert_eq!(typed.len(), 1);
}

#[test]
fn test_shaped_adjusts_like_any_multi_returns() {
    let shaped = MultiReturns::create_instance(&mixed(9));
    let untyped: MultiReturns = shaped.clone().into();
    assert_eq!(untyped.len(), shaped.len());

    let first: MultiReturns1<LuaNumber> = shaped.adjust();
    assert_eq!(first.value1(), Some(LuaNumber::Integer(0)));
}

#[test]
#[traced_test]
fn test_slot_mismatch_is_logged() {
    let shape = MultiReturnsShape::Fixed(vec![ValueCategory::Table]);
    let shaped = create_instance(&shape, 0, &[LuaValue::integer(5)]).unwrap();
    assert!(shaped.is_empty());
    assert!(logs_contain("does not fit its slot"));
}
