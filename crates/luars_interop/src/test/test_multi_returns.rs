// Tests for the MultiReturns core and the typed family
use crate::*;

fn ints(range: std::ops::Range<i64>) -> MultiReturns {
    range.map(LuaValue::integer).collect()
}

#[test]
fn test_count_trims_trailing_nils() {
    let values = MultiReturns::new([
        LuaValue::integer(1),
        LuaValue::nil(),
        LuaValue::string("x"),
        LuaValue::nil(),
        LuaValue::nil(),
    ]);

    // Interior nil keeps its position, trailing nils are not counted
    assert_eq!(values.len(), 3);
    assert!(values.get(1).is_nil());
    assert_eq!(values.get(2), LuaValue::string("x"));

    let all_nil = MultiReturns::new([LuaValue::nil(), LuaValue::nil()]);
    assert!(all_nil.is_empty());
    assert!(MultiReturns::empty().is_empty());
}

#[test]
fn test_get_past_end_is_nil() {
    let values = ints(0..3);
    assert_eq!(values.get(2), LuaValue::integer(2));
    assert!(values.get(3).is_nil());
    assert!(values.get(usize::MAX).is_nil());
    assert!(MultiReturns::empty().first().is_nil());
}

#[test]
fn test_constructor_copies_input() {
    let mut source = vec![LuaValue::integer(1), LuaValue::integer(2)];
    let values = MultiReturns::from(source.clone());
    source[0] = LuaValue::integer(100);

    assert_eq!(values.get(0), LuaValue::integer(1));
    assert_eq!(values.to_vec(), vec![LuaValue::integer(1), LuaValue::integer(2)]);
}

#[test]
fn test_deconstruct_matches_indexing() {
    let values = MultiReturns::new([
        LuaValue::integer(1),
        LuaValue::string("two"),
        LuaValue::nil(),
        LuaValue::boolean(true),
        LuaValue::number(5.5),
    ]);

    let (a,): (LuaValue,) = values.deconstruct();
    assert_eq!(a, values.get(0));

    let (a, b): (LuaValue, LuaValue) = values.deconstruct();
    assert_eq!((a, b), (values.get(0), values.get(1)));

    let (a, b, c): (LuaValue, LuaValue, LuaValue) = values.deconstruct();
    assert_eq!((a, b, c), (values.get(0), values.get(1), values.get(2)));

    let (a, b, c, d): (LuaValue, LuaValue, LuaValue, LuaValue) = values.deconstruct();
    assert_eq!(
        vec![a, b, c, d],
        (0..4).map(|i| values.get(i)).collect::<Vec<_>>()
    );

    let (a, b, c, d, e): (LuaValue, LuaValue, LuaValue, LuaValue, LuaValue) =
        values.deconstruct();
    assert_eq!(
        vec![a, b, c, d, e],
        (0..5).map(|i| values.get(i)).collect::<Vec<_>>()
    );

    let (a, b, c, d, e, f): (LuaValue, LuaValue, LuaValue, LuaValue, LuaValue, LuaValue) =
        values.deconstruct();
    assert_eq!(
        vec![a, b, c, d, e, f],
        (0..6).map(|i| values.get(i)).collect::<Vec<_>>()
    );

    let (a, b, c, d, e, f, g): (
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
    ) = values.deconstruct();
    assert_eq!(a, values.get(0));
    assert_eq!(b, values.get(1));
    assert!(c.is_nil());
    assert_eq!(d, values.get(3));
    assert_eq!(e, values.get(4));
    // Shortfall reads as nil
    assert!(f.is_nil());
    assert!(g.is_nil());
}

#[test]
fn test_rest_shares_storage() {
    let values = ints(0..20);

    let (a, _, _, _, _, _, g, rest): (
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        MultiReturns,
    ) = values.deconstruct();
    assert_eq!(a, LuaValue::integer(0));
    assert_eq!(g, LuaValue::integer(6));
    assert!(rest.shares_storage_with(&values));
    assert_eq!(rest.len(), 13);

    for k in 0..rest.len() {
        assert_eq!(rest.get(k), values.get(7 + k));
    }

    // Second level continuation still points into the same buffer
    let (h, _, _, _, _, _, _, rest2): (
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        MultiReturns,
    ) = rest.deconstruct();
    assert_eq!(h, values.get(7));
    assert!(rest2.shares_storage_with(&values));
    assert_eq!(rest2.to_vec(), values.as_slice()[14..].to_vec());
}

#[test]
fn test_rest_of_short_values_is_empty() {
    let values = ints(0..3);
    let (.., rest): (
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        MultiReturns,
    ) = values.deconstruct();
    assert!(rest.is_empty());
    assert!(rest.get(0).is_nil());
}

#[test]
fn test_typed_nil_padding() {
    let values: MultiReturns4<LuaValue, LuaNumber, LuaString, bool> =
        MultiReturns4::new(Some(LuaValue::string("a")), Some(LuaNumber::Integer(2)), None, None);

    assert_eq!(values.len(), 2);
    assert_eq!(values.value1(), Some(LuaValue::string("a")));
    assert_eq!(values.value2(), Some(LuaNumber::Integer(2)));
    assert_eq!(values.value3(), None);
    assert_eq!(values.value4(), None);
    for i in 2..10 {
        assert!(values.get(i).is_nil());
    }
}

#[test]
fn test_typed_values_tuple() {
    let values: MultiReturns3<bool, LuaString, LuaNumber> =
        MultiReturns3::new(Some(true), Some(LuaString::new("s")), Some(LuaNumber::Float(0.5)));

    let (a, b, c) = values.values();
    assert_eq!(a, Some(true));
    assert_eq!(b, Some(LuaString::new("s")));
    assert_eq!(c, Some(LuaNumber::Float(0.5)));
}

#[test]
fn test_widen_then_narrow_is_identity() {
    let two: MultiReturns2<LuaNumber, LuaString> =
        MultiReturns2::new(Some(LuaNumber::Integer(1)), Some(LuaString::new("b")));

    let three: MultiReturns3<LuaNumber, LuaString, bool> = two.clone().into();
    assert_eq!(three.value3(), None);
    assert!(three.get(2).is_nil());

    let back = three.narrow();
    assert_eq!(back, two);
    assert_eq!(back.values(), two.values());
}

#[test]
fn test_narrow_then_widen_loses_values() {
    let three: MultiReturns3<LuaValue, LuaValue, LuaValue> = MultiReturns3::new(
        Some(LuaValue::integer(1)),
        Some(LuaValue::integer(2)),
        Some(LuaValue::integer(3)),
    );

    let widened: MultiReturns3<LuaValue, LuaValue, LuaValue> = three.clone().narrow().into();
    assert_eq!(widened.value2(), Some(LuaValue::integer(2)));
    // The dropped slot does not come back
    assert_eq!(widened.value3(), None);
    assert_ne!(widened, three);
}

#[test]
fn test_from_multi_returns_drops_mismatched_slots() {
    let values = MultiReturns::new([LuaValue::string("x"), LuaValue::string("y")]);
    let typed = MultiReturns2::<LuaNumber, LuaString>::from_multi_returns(&values);

    assert_eq!(typed.value1(), None);
    assert!(typed.get(0).is_nil());
    assert_eq!(typed.value2(), Some(LuaString::new("y")));
    assert_eq!(typed.len(), 2);
}

#[test]
fn test_from_multi_returns_shares_when_everything_fits() {
    let values = ints(0..5);
    let typed = MultiReturns3::<LuaNumber, LuaValue, LuaNumber>::from_multi_returns(&values);

    assert!(typed.as_untyped().shares_storage_with(&values));
    assert_eq!(typed.len(), 3);
    assert!(typed.get(3).is_nil());
}

#[test]
fn test_adjust_between_arities() {
    let values = ints(0..4);

    let one: MultiReturns1<LuaNumber> = values.adjust();
    assert_eq!(one.value1(), Some(LuaNumber::Integer(0)));
    assert_eq!(one.len(), 1);

    let five: MultiReturns5<LuaNumber, LuaNumber, LuaNumber, LuaNumber, LuaNumber> = one.adjust();
    assert_eq!(five.len(), 1);
    assert_eq!(five.value5(), None);

    let untyped: MultiReturns = five.adjust();
    assert_eq!(untyped.to_vec(), vec![LuaValue::integer(0)]);
}

type Any7<TRest> = MultiReturns8<
    LuaValue,
    LuaValue,
    LuaValue,
    LuaValue,
    LuaValue,
    LuaValue,
    LuaValue,
    TRest,
>;

#[test]
fn test_eight_with_untyped_rest() {
    let values = ints(0..10);
    let typed = Any7::<MultiReturns>::from_multi_returns(&values);

    assert_eq!(typed.len(), 10);
    assert_eq!(typed.value7(), Some(LuaValue::integer(6)));
    assert_eq!(typed.rest().to_vec(), values.as_slice()[7..].to_vec());
    assert!(typed.rest().shares_storage_with(&values));
    assert_eq!(typed.get(9), LuaValue::integer(9));
    assert!(typed.get(10).is_nil());

    // Joined back without copying
    let untyped = typed.to_multi_returns();
    assert!(untyped.shares_storage_with(&values));
    assert_eq!(untyped, values);
}

#[test]
fn test_eight_nested_continuations() {
    let values = ints(0..17);
    let typed = Any7::<Any7<MultiReturns3<LuaNumber, LuaNumber, LuaNumber>>>::from_multi_returns(
        &values,
    );

    assert_eq!(typed.len(), 17);
    let inner = typed.rest().rest();
    assert_eq!(inner.value1(), Some(LuaNumber::Integer(14)));
    assert_eq!(inner.value3(), Some(LuaNumber::Integer(16)));
    for i in 0..17 {
        assert_eq!(typed.get(i), values.get(i));
    }
}

#[test]
fn test_eight_with_rest_values() {
    let typed: MultiReturns8<
        LuaNumber,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        LuaValue,
        bool,
        MultiReturns2<LuaString, LuaNumber>,
    > = MultiReturns8::with_rest_values(
            Some(LuaNumber::Integer(1)),
            None,
            None,
            None,
            None,
            None,
            Some(false),
            [LuaValue::string("r"), LuaValue::integer(9)],
        );

    assert_eq!(typed.len(), 9);
    assert_eq!(typed.value1(), Some(LuaNumber::Integer(1)));
    assert_eq!(typed.value2(), None);
    assert_eq!(typed.value7(), Some(false));
    assert_eq!(typed.rest().value1(), Some(LuaString::new("r")));
    assert_eq!(typed.get(8), LuaValue::integer(9));

    let seven = typed.clone().narrow();
    assert_eq!(seven.len(), 7);
    assert_eq!(seven.value7(), Some(false));
    assert!(seven.get(7).is_nil());

    let untyped: MultiReturns = typed.into();
    assert_eq!(untyped.len(), 9);
    assert_eq!(untyped.get(7), LuaValue::string("r"));
}

#[test]
fn test_widen_into_eight() {
    let two: MultiReturns2<LuaNumber, LuaString> =
        MultiReturns2::new(Some(LuaNumber::Integer(3)), Some(LuaString::new("s")));
    let eight: MultiReturns8<LuaNumber, LuaString, bool, bool, bool, bool, bool, MultiReturns> =
        two.into();

    assert_eq!(eight.len(), 2);
    assert_eq!(eight.value2(), Some(LuaString::new("s")));
    assert_eq!(eight.value3(), None);
    assert!(eight.rest().is_empty());
}

#[test]
fn test_typed_into_untyped() {
    let typed: MultiReturns2<LuaValue, LuaValue> =
        MultiReturns2::new(None, Some(LuaValue::boolean(true)));
    let untyped: MultiReturns = typed.into();

    assert_eq!(untyped.len(), 2);
    assert!(untyped.get(0).is_nil());
    assert_eq!(untyped.get(1), LuaValue::boolean(true));
}
