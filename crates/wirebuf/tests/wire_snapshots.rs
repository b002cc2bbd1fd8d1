#![expect(missing_docs)]

use wirebuf::{BufferOptions, ByteBuffer, EncodingRegistry, Endianness, Result};

fn record(endianness: Endianness) -> Result<String> {
    let registry = EncodingRegistry::default();
    let mut buf = ByteBuffer::with_options(BufferOptions {
        capacity: 4,
        endianness,
        ..Default::default()
    });
    buf.write_u8(1)?
        .write_i16(-2)?
        .write_u32(0xDEAD_BEEF)?
        .write_f32(1.0)?
        .write_varint32(300)?
        .write_zigzag_varint32(-3)?
        .write_cstring("hi")?
        .write_istring("é")?
        .write_vstring("ok")?;
    buf.flip();
    buf.to_encoded(&registry, "hex")
}

#[test]
fn snapshot_record_big_endian() {
    insta::assert_snapshot!(record(Endianness::Big).unwrap(), @"01fffedeadbeef3f800000ac020568690000000002c3a9026f6b");
}

#[test]
fn snapshot_record_little_endian() {
    insta::assert_snapshot!(record(Endianness::Little).unwrap(), @"01feffefbeadde0000803fac020568690002000000c3a9026f6b");
}

#[test]
fn snapshot_varint64_extremes_base64() {
    let registry = EncodingRegistry::default();
    let mut buf = ByteBuffer::allocate(0);
    buf.write_varint64(u64::MAX)
        .unwrap()
        .write_zigzag_varint64(-1)
        .unwrap()
        .write_varint64(1 << 35)
        .unwrap();
    buf.flip();
    insta::assert_snapshot!(buf.to_encoded(&registry, "hex").unwrap(), @"ffffffffffffffffff0101808080808001");
    insta::assert_snapshot!(buf.to_encoded(&registry, "base64").unwrap(), @"////////////AQGAgICAgAE=");

    let decoded =
        ByteBuffer::from_encoded(&registry, "base64", "////////////AQGAgICAgAE=", BufferOptions::default())
            .unwrap();
    assert_eq!(decoded.to_vec().unwrap(), buf.to_vec().unwrap());
}

#[test]
fn snapshot_debug_rendering() {
    let mut buf = ByteBuffer::from_utf8("wire", BufferOptions::default());
    insta::assert_snapshot!(format!("{buf:?}"), @r#"ByteBuffer { offset: 0, limit: 4, capacity: 4, endianness: Big, content: "wire" }"#);
    buf.set_offset(1);
    insta::assert_snapshot!(format!("{buf:?}"), @r#"ByteBuffer { offset: 1, limit: 4, capacity: 4, endianness: Big, content: "ire" }"#);
}
