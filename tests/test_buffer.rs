use harbor::buffer::BinaryBuffer;

#[test]
fn test_typed_values_read_back_in_order() {
    let mut buf = BinaryBuffer::default();
    buf.put_u8(0xAB);
    buf.put_u16(0xBEEF);
    buf.put_u32(0xDEAD_BEEF);
    buf.put_u64(u64::MAX - 1);
    buf.put_f32(1.5);
    buf.put_f64(-2.25);
    buf.put_char('x').unwrap();
    buf.put_char('é').unwrap();
    buf.put_u8(7);

    assert_eq!(buf.len(), 1 + 2 + 4 + 8 + 4 + 8 + 1 + 1 + 1);
    assert_eq!(buf.get_u8(), 0xAB);
    assert_eq!(buf.get_u16(), 0xBEEF);
    assert_eq!(buf.get_u32(), 0xDEAD_BEEF);
    assert_eq!(buf.get_u64(), u64::MAX - 1);
    assert_eq!(buf.get_f32(), 1.5);
    assert_eq!(buf.get_f64(), -2.25);
    assert_eq!(buf.get_char(), 'x');
    assert_eq!(buf.get_char(), 'é');
    assert_eq!(buf.get_u8(), 7);
    assert_eq!(buf.bytes_remaining(), 0);
}

#[test]
fn test_index_reads_do_not_move_cursor() {
    let mut buf = BinaryBuffer::default();
    buf.put_u16(7);
    buf.put_u16(9);

    assert_eq!(buf.get_u16_at(2), 9);
    assert_eq!(buf.read_pos(), 0);
    assert_eq!(buf.peek(), 7);
    assert_eq!(buf.read_pos(), 0);
}

#[test]
fn test_index_write_sets_write_cursor() {
    let mut buf = BinaryBuffer::from_bytes(&[0; 10]);
    buf.put_u16_at(0x0102, 2);
    assert_eq!(buf.write_pos(), 4);
    assert_eq!(buf.len(), 10);

    buf.put_u8(0xFF);
    assert_eq!(buf.get_u8_at(4), 0xFF);
}

#[test]
fn test_get_bytes_advances_and_zero_fills() {
    let mut buf = BinaryBuffer::from_bytes(b"abcd");
    assert_eq!(buf.get_bytes(2), b"ab");
    assert_eq!(buf.get_bytes(4), vec![b'c', b'd', 0, 0]);
    assert_eq!(buf.read_pos(), 6);
}

#[test]
fn test_clone_equals_original() {
    let mut buf = BinaryBuffer::from_bytes(b"hello world");
    buf.get_u32();

    let copy = buf.clone();
    assert!(copy.equals(&buf));
    assert_eq!(copy.read_pos(), 0);
    assert_eq!(copy.write_pos(), 0);
}

#[test]
fn test_equals_detects_first_difference() {
    let a = BinaryBuffer::from_bytes(b"abcdef");
    let b = BinaryBuffer::from_bytes(b"abcdeX");
    let c = BinaryBuffer::from_bytes(b"Xbcdef");

    assert!(a.equals(&a.clone()));
    assert!(!a.equals(&b));
    assert!(!a.equals(&c));
    assert_ne!(a, b);
}

#[test]
fn test_equals_different_lengths() {
    let a = BinaryBuffer::from_bytes(b"abc");
    let b = BinaryBuffer::from_bytes(b"abcd");
    assert!(!a.equals(&b));
    assert!(!b.equals(&a));
}

#[test]
fn test_find_stops_at_zero_byte() {
    let buf = BinaryBuffer::from_bytes(b"ab\0c:d");
    assert_eq!(buf.find(b'b', 0), Some(1));
    assert_eq!(buf.find(b':', 0), None);
    assert_eq!(buf.find(0, 0), Some(2));
    assert_eq!(buf.find(b':', 3), Some(4));
}

#[test]
fn test_replace_first_only_and_all() {
    let mut buf = BinaryBuffer::from_bytes(b"a-b-c");
    buf.replace(b'-', b'+', 0, true);
    assert_eq!(buf.as_slice(), b"a+b-c");

    buf.replace(b'-', b'+', 0, false);
    assert_eq!(buf.as_slice(), b"a+b+c");
}

#[test]
fn test_resize_resets_cursors() {
    let mut buf = BinaryBuffer::from_bytes(b"abc");
    buf.get_u8();
    buf.resize(8);

    assert_eq!(buf.len(), 8);
    assert_eq!(buf.read_pos(), 0);
    assert_eq!(buf.write_pos(), 0);
    assert_eq!(buf.get_u8_at(7), 0);
}

#[test]
fn test_clear_empties_buffer() {
    let mut buf = BinaryBuffer::from_bytes(b"abc");
    buf.clear();
    assert!(buf.is_empty());
    assert_eq!(buf.write_pos(), 0);
}

#[test]
fn test_char_is_one_byte_wide() {
    let mut buf = BinaryBuffer::default();
    assert!(buf.put_char('€').is_err());
    assert!(buf.is_empty());

    buf.put_char_at('ÿ', 2).unwrap();
    assert_eq!(buf.len(), 3);
    assert_eq!(buf.write_pos(), 3);
    assert_eq!(buf.get_char_at(2), 'ÿ');
}

#[test]
fn test_put_bytes_at_moves_write_cursor() {
    let mut buf = BinaryBuffer::from_bytes(b"HTTP/1.1 200 OK");
    buf.put_bytes_at(b"404", 9);
    assert_eq!(buf.write_pos(), 12);
    assert_eq!(buf.as_slice(), b"HTTP/1.1 404 OK");

    buf.set_write_pos(buf.len());
    buf.put_bytes(b"!");
    assert_eq!(buf.as_slice(), b"HTTP/1.1 404 OK!");
}

#[test]
fn test_put_buffer_ignores_source_cursors() {
    let mut src = BinaryBuffer::from_bytes(b"tail");
    src.get_u16();

    let mut buf = BinaryBuffer::from_bytes(b"head-");
    buf.put_buffer(&src);
    assert_eq!(buf.as_slice(), b"head-tail");
    assert_eq!(buf.write_pos(), 9);
}
