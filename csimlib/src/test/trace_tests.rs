use std::io::Cursor;
use crate::trace::{parse_line, read_trace, MemoryAccess, Operation, TraceError, TraceReader};

#[test]
fn parses_loads_and_stores() {
    assert_eq!(parse_line("l 0x1fffff50 1", 1).unwrap(), Some(MemoryAccess::load(0x1fffff50)));
    assert_eq!(parse_line("s 0x1fffff50 1", 1).unwrap(), Some(MemoryAccess::store(0x1fffff50)));
}

#[test]
fn prefix_and_extra_field_are_optional() {
    assert_eq!(parse_line("l 1f", 1).unwrap(), Some(MemoryAccess::load(0x1f)));
    assert_eq!(parse_line("s 0XABCDEF01", 1).unwrap(), Some(MemoryAccess::store(0xabcdef01)));
}

#[test]
fn leading_zeros_beyond_eight_digits_are_accepted() {
    assert_eq!(parse_line("l 0x000000010 0", 1).unwrap(), Some(MemoryAccess::load(0x10)));
    assert_eq!(parse_line("s 0000000000ffffffff 2", 1).unwrap(), Some(MemoryAccess::store(u32::MAX)));
}

#[test]
fn addresses_wider_than_32_bits_are_rejected() {
    for line in ["l 0x123456789 1", "s 0x100000000 0"] {
        assert!(matches!(parse_line(line, 2), Err(TraceError::Malformed { line: 2, .. })));
    }
}

#[test]
fn surrounding_whitespace_is_ignored() {
    let access = parse_line("  l\t0x10   7  \r", 3).unwrap().unwrap();
    assert_eq!(access.operation, Operation::Load);
    assert_eq!(access.address, 0x10);
}

#[test]
fn blank_lines_are_skipped() {
    assert_eq!(parse_line("", 1).unwrap(), None);
    assert_eq!(parse_line("   \t", 1).unwrap(), None);
}

#[test]
fn malformed_lines_are_rejected() {
    for line in ["x 0x10 1", "l", "l 0xzz 1", "l 0x123456789 1", "ls 0x10 1", "l 0x10 1 extra", "L 0x10 1"] {
        match parse_line(line, 4) {
            Err(TraceError::Malformed { line: 4, content }) => assert_eq!(content, line),
            other => panic!("{line:?} gave {other:?}"),
        }
    }
}

#[test]
fn reader_reports_line_numbers() {
    let trace = "l 0x0 0\n\ns 0x4 0\nbogus\n";
    let mut reader = TraceReader::new(Cursor::new(trace));
    assert_eq!(reader.next().unwrap().unwrap(), MemoryAccess::load(0x0));
    assert_eq!(reader.next().unwrap().unwrap(), MemoryAccess::store(0x4));
    match reader.next() {
        Some(Err(TraceError::Malformed { line, .. })) => assert_eq!(line, 4),
        other => panic!("expected a malformed line, got {other:?}"),
    }
}

#[test]
fn read_trace_collects_everything_or_nothing() {
    let accesses = read_trace("l 0x0 0\ns 0x4 0\n\nl 0x8 0".as_bytes()).unwrap();
    assert_eq!(accesses, vec![MemoryAccess::load(0x0), MemoryAccess::store(0x4), MemoryAccess::load(0x8)]);
    assert!(read_trace("l 0x0 0\nq 0x4 0\n".as_bytes()).is_err());
    assert!(read_trace("".as_bytes()).unwrap().is_empty());
}
