// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;
use typewire::types::{RecordBuilder, TypeDescriptor};
use typewire::ProtoSerdes;

/// A recursive record touching every structural variant.
fn fuzz_type() -> TypeDescriptor {
    let point = RecordBuilder::new("Point")
        .field("x", TypeDescriptor::float())
        .field("y", TypeDescriptor::float())
        .build();
    RecordBuilder::new("Node")
        .field("id", TypeDescriptor::int())
        .field("flag", TypeDescriptor::boolean())
        .field("tag", TypeDescriptor::byte())
        .field("blob", TypeDescriptor::array(TypeDescriptor::byte()))
        .field("amount", TypeDescriptor::Decimal)
        .field("grid", TypeDescriptor::array_of(TypeDescriptor::int(), 2))
        .field("attrs", TypeDescriptor::map(TypeDescriptor::string()))
        .field("points", TypeDescriptor::table(point.clone()))
        .field(
            "pair",
            TypeDescriptor::tuple(vec![TypeDescriptor::string(), point.clone()]),
        )
        .field(
            "choice",
            TypeDescriptor::union(vec![
                TypeDescriptor::int(),
                point,
                TypeDescriptor::array(TypeDescriptor::string()),
                TypeDescriptor::Null,
            ]),
        )
        .optional("next", TypeDescriptor::reference("Node"))
        .build()
}

fn serdes() -> &'static ProtoSerdes {
    static SERDES: OnceLock<ProtoSerdes> = OnceLock::new();
    SERDES.get_or_init(|| ProtoSerdes::new(fuzz_type()).expect("fuzz type compiles"))
}

fuzz_target!(|data: &[u8]| {
    let serdes = serdes();

    // Arbitrary bytes must never panic; accepted input must re-encode to
    // something that decodes to the same value.
    if let Ok(value) = serdes.deserialize(data) {
        let bytes = serdes.serialize(&value).expect("decoded value re-encodes");
        let again = serdes.deserialize(&bytes).expect("re-encoded bytes decode");
        assert_eq!(format!("{:?}", again), format!("{:?}", value));
    }
});
