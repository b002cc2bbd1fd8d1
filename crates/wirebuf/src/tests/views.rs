use alloc::vec;

use crate::{BufferError, BufferOptions, ByteBuffer, ErrorKind};

fn wrapped(bytes: &[u8]) -> ByteBuffer {
    ByteBuffer::wrap(bytes, BufferOptions::default())
}

#[test]
fn compact_keeps_only_the_window() {
    let mut buf = wrapped(&[0x12, 0x34, 0x56]);
    let alias = buf.clone();
    buf.set_offset(1).set_limit(2);
    buf.compact().unwrap();

    assert_eq!(buf.capacity(), 1);
    assert_eq!(buf.offset(), 0);
    assert_eq!(buf.limit(), 1);
    assert_eq!(buf.read_u8_at(0).unwrap(), 0x34);
    assert!(!buf.shares_storage_with(&alias));
    assert_eq!(alias.capacity(), 3);
}

#[test]
fn compact_flips_a_written_buffer_first() {
    let mut buf = ByteBuffer::allocate(16);
    buf.write_u16(0xABCD).unwrap();
    buf.compact().unwrap();
    assert_eq!(buf.capacity(), 2);
    assert_eq!(buf.to_vec().unwrap(), vec![0xAB, 0xCD]);
}

#[test]
fn compact_of_an_empty_window_yields_empty_storage() {
    let mut buf = wrapped(&[1, 2, 3]);
    buf.mark_at(2);
    buf.compact_range(2, 2).unwrap();
    assert_eq!(buf.capacity(), 0);
    assert_eq!((buf.offset(), buf.limit()), (0, 0));
    assert_eq!(buf.marked_offset(), Some(0));
}

#[test]
fn compacting_the_whole_storage_is_a_no_op() {
    let mut buf = wrapped(&[1, 2, 3]);
    let alias = buf.clone();
    buf.compact().unwrap();
    assert!(buf.shares_storage_with(&alias));
}

#[test]
fn compact_drops_a_mark_before_the_window() {
    let mut buf = wrapped(&[1, 2, 3, 4]);
    buf.mark_at(0);
    buf.compact_range(1, 3).unwrap();
    assert_eq!(buf.marked_offset(), None);
    assert_eq!(
        buf.compact_range(1, 0).unwrap_err().kind(),
        ErrorKind::OutOfRange
    );
}

#[test]
fn ensure_capacity_doubles_unless_that_is_too_small() {
    let mut buf = ByteBuffer::allocate(5);
    buf.ensure_capacity(6);
    assert_eq!(buf.capacity(), 10);
    buf.ensure_capacity(21);
    assert_eq!(buf.capacity(), 21);
    buf.ensure_capacity(4);
    assert_eq!(buf.capacity(), 21);
}

#[test]
fn slices_share_storage_and_copies_do_not() {
    let buf = wrapped(&[1, 2, 3, 4]);
    let slice = buf.slice(1, 3).unwrap();
    let copy = buf.copy();
    assert_eq!((slice.offset(), slice.limit()), (1, 3));
    assert_eq!((copy.offset(), copy.limit()), (0, 4));

    slice.storage().set_u8(1, 0xEE).unwrap();
    assert_eq!(buf.read_u8_at(1).unwrap(), 0xEE);
    assert_eq!(copy.read_u8_at(1).unwrap(), 2);

    copy.storage().set_u8(0, 0xAA).unwrap();
    assert_eq!(buf.read_u8_at(0).unwrap(), 1);
}

#[test]
fn slice_bounds_are_checked() {
    let buf = wrapped(&[1, 2, 3]);
    assert_eq!(
        buf.slice(2, 1).unwrap_err(),
        BufferError::IllegalRange {
            begin: 2,
            end: 1,
            capacity: 3
        }
    );
    assert!(buf.slice(0, 4).is_err());
    assert!(buf.slice(3, 3).is_ok());
}

#[test]
fn growth_of_one_alias_is_invisible_to_the_other() {
    let mut buf = ByteBuffer::allocate(2);
    let alias = buf.clone();
    buf.write_u32(7).unwrap();
    assert_eq!(buf.capacity(), 4);
    assert_eq!(alias.capacity(), 2);
    assert!(!buf.shares_storage_with(&alias));
}

#[test]
fn clone_duplicates_cursor_and_mark() {
    let mut buf = wrapped(&[1, 2, 3]);
    buf.set_offset(1).mark();
    let mut clone = buf.clone();
    clone.set_offset(2);
    assert_eq!(buf.offset(), 1);
    assert_eq!(clone.restore_mark().offset(), 1);
    assert_eq!(ByteBuffer::wrap_buffer(&buf).marked_offset(), None);
}

#[test]
fn flip_reset_and_restore_mark() {
    let mut buf = ByteBuffer::allocate(8);
    buf.write_u8(1).unwrap().mark().write_u16(2).unwrap();
    buf.restore_mark();
    assert_eq!(buf.offset(), 1);
    buf.restore_mark();
    assert_eq!(buf.offset(), 0, "no mark rewinds to zero");

    buf.set_offset(3).flip();
    assert_eq!((buf.offset(), buf.limit()), (0, 3));
    buf.reset();
    assert_eq!((buf.offset(), buf.limit()), (0, 0));
}

#[test]
fn skip_moves_both_ways() {
    let mut buf = ByteBuffer::allocate(4);
    buf.skip(3).unwrap().skip(-2).unwrap();
    assert_eq!(buf.offset(), 1);
    assert_eq!(buf.skip(-2).unwrap_err().kind(), ErrorKind::OutOfRange);
    assert_eq!(buf.skip(4).unwrap_err().kind(), ErrorKind::OutOfRange);
    assert_eq!(buf.offset(), 1);
}

#[test]
fn reverse_mirrors_content_and_cursor() {
    let mut buf = wrapped(&[1, 2, 3, 4, 5]);
    buf.set_offset(1).set_limit(3);
    buf.reverse();
    assert_eq!(buf.storage().to_vec(0, 5).unwrap(), vec![5, 4, 3, 2, 1]);
    assert_eq!((buf.offset(), buf.limit()), (2, 4));
    assert_eq!(buf.to_vec().unwrap(), vec![3, 2]);
}

#[test]
fn append_copies_the_source_window_without_touching_it() {
    let mut src = wrapped(&[0xAA, 0xBB, 0xCC]);
    src.set_offset(1);

    let mut buf = ByteBuffer::allocate(1);
    buf.write_u8(0x01).unwrap().append(&src).unwrap();
    assert_eq!(buf.offset(), 3);
    assert_eq!(buf.capacity(), 3);
    assert_eq!(buf.storage().to_vec(0, 3).unwrap(), vec![0x01, 0xBB, 0xCC]);
    assert_eq!((src.offset(), src.limit()), (1, 3));

    assert_eq!(buf.append_at(&src, 0).unwrap(), 2);
    assert_eq!(buf.offset(), 3);
    assert_eq!(buf.storage().to_vec(0, 3).unwrap(), vec![0xBB, 0xCC, 0xCC]);
}

#[test]
fn append_of_an_unflipped_source_uses_what_was_written() {
    let mut src = ByteBuffer::allocate(8);
    src.write_u16(0x0102).unwrap();

    let mut buf = ByteBuffer::allocate(8);
    buf.append(&src).unwrap();
    assert_eq!(buf.offset(), 2);
    assert_eq!(buf.storage().to_vec(0, 2).unwrap(), vec![0x01, 0x02]);
    assert_eq!((src.offset(), src.limit()), (2, 0));
}

#[test]
fn prepend_with_room_writes_before_the_cursor() {
    let header = wrapped(&[0x7E]);
    let mut buf = ByteBuffer::allocate(4);
    buf.set_offset(2).write_u16(0xCAFE).unwrap();
    buf.set_offset(2).set_limit(4);

    buf.prepend(&header).unwrap();
    assert_eq!((buf.offset(), buf.limit()), (1, 4));
    assert_eq!(buf.capacity(), 4);
    assert_eq!(buf.to_vec().unwrap(), vec![0x7E, 0xCA, 0xFE]);
}

#[test]
fn prepend_rejects_a_limit_that_cannot_shift() {
    let header = wrapped(&[0x01, 0x02]);
    let mut buf = wrapped(&[0xAA, 0xBB, 0xCC]);
    buf.set_limit(usize::MAX);

    let err = buf.prepend(&header).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfRange);
    assert_eq!((buf.offset(), buf.limit()), (0, usize::MAX));
    assert_eq!(buf.capacity(), 3);
    assert_eq!(buf.storage().to_vec(0, 3).unwrap(), vec![0xAA, 0xBB, 0xCC]);
}

#[test]
fn prepend_without_room_shifts_the_content_right() {
    let header = wrapped(&[0x01, 0x02, 0x03]);
    let mut buf = wrapped(&[0xAA, 0xBB, 0xCC]);
    buf.set_offset(1).mark();

    buf.prepend(&header).unwrap();
    assert_eq!(buf.capacity(), 5);
    assert_eq!((buf.offset(), buf.limit()), (0, 5));
    assert_eq!(buf.marked_offset(), Some(3));
    assert_eq!(
        buf.to_vec().unwrap(),
        vec![0x01, 0x02, 0x03, 0xBB, 0xCC]
    );
}

#[test]
fn read_bytes_returns_an_aliasing_view() {
    let mut buf = wrapped(&[1, 2, 3, 4]);
    let view = buf.read_bytes(3).unwrap();
    assert_eq!(buf.offset(), 3);
    assert_eq!(view.to_vec().unwrap(), vec![1, 2, 3]);
    assert!(view.shares_storage_with(&buf));
    assert!(buf.read_bytes(2).unwrap_err().is_truncated());
}

#[test]
fn debug_output_shows_the_window() {
    let buf = ByteBuffer::from_utf8("hi", BufferOptions::default());
    let rendered = std::format!("{buf:?}");
    assert!(rendered.contains("offset: 0"), "{rendered}");
    assert!(rendered.contains("\"hi\""), "{rendered}");
}
