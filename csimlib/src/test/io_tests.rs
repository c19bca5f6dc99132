use std::error::Error;
use std::path::Path;
use crate::io::open_trace;
use crate::trace::{read_trace, MemoryAccess};
use crate::util::TRACE_FILES_PATH;

#[test]
fn open_trace_yields_accesses() -> Result<(), Box<dyn Error>> {
    let path = format!("{TRACE_FILES_PATH}/lru_fifo.trace");
    let accesses = open_trace(Path::new(&path))?.collect::<Result<Vec<_>, _>>()?;
    assert_eq!(
        accesses,
        vec![
            MemoryAccess::load(0x00),
            MemoryAccess::load(0x20),
            MemoryAccess::load(0x00),
            MemoryAccess::load(0x40),
            MemoryAccess::load(0x00),
        ]
    );
    Ok(())
}

#[test]
fn open_trace_matches_reading_from_memory() -> Result<(), Box<dyn Error>> {
    let path = format!("{TRACE_FILES_PATH}/mixed.trace");
    let mapped = open_trace(Path::new(&path))?.collect::<Result<Vec<_>, _>>()?;
    let read = read_trace(std::fs::read(&path)?.as_slice())?;
    assert_eq!(mapped, read);
    assert_eq!(mapped.len(), 7);
    Ok(())
}

#[test]
fn missing_trace_is_an_error() {
    let path = format!("{TRACE_FILES_PATH}/does_not_exist.trace");
    match open_trace(Path::new(&path)) {
        Err(message) => assert!(message.contains("does_not_exist.trace"), "{message}"),
        Ok(_) => panic!("opened a missing trace"),
    }
}
