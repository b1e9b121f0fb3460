//! Deferred referent tests
//!
//! Ordering of pointees in the stream, repeated referent IDs, and errors
//! raised while draining the referent queue.

use std::sync::Arc;

mod common;

use common::{init_tracing, Payload};
use rpc_ndr::{
    DecodeOptions, Decoder, DeferralOrder, NdrError, ReferentAliasing, StructSchema, TypeDesc,
    Value,
};

/// `Outer { P1: *Inner, P2: *u32 }`, `Inner { X: u32, Q: *u32 }`
fn outer() -> TypeDesc {
    let inner = StructSchema::builder("Inner")
        .field::<u32>("X")
        .annotated::<Option<u32>>("Q", "pointer")
        .build()
        .unwrap();
    let outer = StructSchema::builder("Outer")
        .field_desc("P1", TypeDesc::Struct(inner), "pointer")
        .annotated::<Option<u32>>("P2", "pointer")
        .build()
        .unwrap();
    TypeDesc::Struct(outer)
}

fn pair() -> TypeDesc {
    let schema: Arc<StructSchema> = StructSchema::builder("Pair")
        .annotated::<Option<u32>>("A", "pointer")
        .annotated::<Option<u32>>("B", "pointer")
        .build()
        .unwrap();
    TypeDesc::Struct(schema)
}

fn decode(words: &[u32], options: DecodeOptions, ty: &TypeDesc) -> Result<Value, NdrError> {
    init_tracing();
    let mut dec = Decoder::with_options(Payload::new().u32s(words).frame(), options)?;
    let value = dec.decode_type(ty)?;
    assert_eq!(dec.remaining(), 0, "trailing bytes after decode");
    Ok(value)
}

fn pointee<'v>(value: &'v Value, field: &str) -> Option<&'v Value> {
    value.as_struct()?.get(field)?.as_pointer()?.get()
}

#[test]
fn test_breadth_first_order() {
    let value = decode(&[4, 8, 0x11, 12, 0x22, 0x33], DecodeOptions::new(), &outer()).unwrap();

    let inner = pointee(&value, "P1").unwrap();
    assert_eq!(inner.as_struct().unwrap().get("X"), Some(&Value::U32(0x11)));
    assert_eq!(pointee(inner, "Q"), Some(&Value::U32(0x33)));
    assert_eq!(pointee(&value, "P2"), Some(&Value::U32(0x22)));
}

#[test]
fn test_depth_first_order() {
    let options = DecodeOptions::new().with_deferral(DeferralOrder::DepthFirst);
    let value = decode(&[4, 8, 0x11, 12, 0x22, 0x33], options, &outer()).unwrap();

    let inner = pointee(&value, "P1").unwrap();
    assert_eq!(pointee(inner, "Q"), Some(&Value::U32(0x22)));
    assert_eq!(pointee(&value, "P2"), Some(&Value::U32(0x33)));
}

#[test]
fn test_null_pointers_have_no_payload() {
    let value = decode(&[4, 0, 0x11, 0], DecodeOptions::new(), &outer()).unwrap();

    let fields = value.as_struct().unwrap();
    assert!(fields.get("P2").and_then(Value::as_pointer).unwrap().is_null());
    let inner = pointee(&value, "P1").unwrap();
    let q = inner.as_struct().unwrap().get("Q").and_then(Value::as_pointer).unwrap();
    assert!(q.is_null());
    assert_eq!(q.get(), None);
}

#[test]
fn test_repeated_id_independent_by_default() {
    let value = decode(&[5, 5, 0x77, 0x88], DecodeOptions::new(), &pair()).unwrap();
    assert_eq!(pointee(&value, "A"), Some(&Value::U32(0x77)));
    assert_eq!(pointee(&value, "B"), Some(&Value::U32(0x88)));
}

#[test]
fn test_repeated_id_shared() {
    let options = DecodeOptions::new().with_aliasing(ReferentAliasing::Shared);
    let value = decode(&[5, 5, 0x77], options, &pair()).unwrap();

    assert_eq!(pointee(&value, "A"), Some(&Value::U32(0x77)));
    assert_eq!(pointee(&value, "B"), Some(&Value::U32(0x77)));
    let b = value.as_struct().unwrap().get("B").and_then(Value::as_pointer).unwrap();
    assert_eq!(b.referent_id(), 5);
}

#[test]
fn test_shared_referent_containing_itself() {
    // Inner.Q repeats the ID of Outer.P1, so the payload points at itself
    let options = DecodeOptions::new().with_aliasing(ReferentAliasing::Shared);
    let err = decode(&[4, 0, 0x11, 4], options, &outer()).unwrap_err();
    assert_eq!(err, NdrError::CyclicReferent(4));
}

#[test]
fn test_truncated_referent_breadth_first() {
    let err = decode(&[4, 8, 0x11, 12], DecodeOptions::new(), &outer()).unwrap_err();
    assert_eq!(err.path(), Some("Outer.P2"));
    assert_eq!(err.root_cause(), &NdrError::EndOfStream { needed: 4, have: 0 });
}

#[test]
fn test_truncated_referent_depth_first() {
    let options = DecodeOptions::new().with_deferral(DeferralOrder::DepthFirst);
    let err = decode(&[4, 8, 0x11, 12], options, &outer()).unwrap_err();
    assert_eq!(err.path(), Some("Outer.P1.Q"));
    assert_eq!(err.root_cause(), &NdrError::EndOfStream { needed: 4, have: 0 });
}

#[test]
fn test_each_decode_call_has_its_own_referents() {
    init_tracing();
    let bytes = Payload::new().u32s(&[5, 5, 0x77, 5, 5, 0x99]).frame();
    let options = DecodeOptions::new().with_aliasing(ReferentAliasing::Shared);
    let mut dec = Decoder::with_options(bytes, options).unwrap();

    let first = dec.decode_type(&pair()).unwrap();
    let second = dec.decode_type(&pair()).unwrap();
    assert_eq!(pointee(&first, "B"), Some(&Value::U32(0x77)));
    assert_eq!(pointee(&second, "A"), Some(&Value::U32(0x99)));
    assert_eq!(dec.remaining(), 0);
}
