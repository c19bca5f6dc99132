use std::fs::File;
use std::io::BufRead;
use std::path::Path;
use crate::trace::TraceReader;

/// Opens a trace file for reading accesses
///
/// On unix the file is memory mapped with sequential access advice. Elsewhere, or if mapping
/// fails, it falls back to a buffered reader
///
/// # Arguments
///
/// * `path`: The trace file
///
/// returns: Result<TraceReader<Box<dyn BufRead>>, String>
pub fn open_trace(path: &Path) -> Result<TraceReader<Box<dyn BufRead>>, String> {
    let file = File::open(path).map_err(|e| format!("Couldn't open the trace file at path {}: {e}", path.display()))?;
    Ok(TraceReader::new(trace_source(file)))
}

#[cfg(unix)]
fn trace_source(file: File) -> Box<dyn BufRead> {
    use std::io::Cursor;
    use memmap2::{Advice, Mmap};
    // The map is only read, and the file isn't modified while the simulator runs
    match unsafe { Mmap::map(&file) } {
        Ok(m) => {
            if let Err(e) = m.advise(Advice::Sequential) {
                log::debug!("Sequential access advice was refused: {e}");
            }
            Box::new(Cursor::new(m))
        }
        Err(e) => {
            log::debug!("Couldn't memory map the trace, reading it instead: {e}");
            buffered(file)
        }
    }
}

#[cfg(not(unix))]
fn trace_source(file: File) -> Box<dyn BufRead> {
    buffered(file)
}

fn buffered(file: File) -> Box<dyn BufRead> {
    use std::io::BufReader;
    // Traces are read start to finish once, a large buffer keeps syscalls down
    const BUFFER_SIZE: usize = 64 * 4096;
    Box::new(BufReader::with_capacity(BUFFER_SIZE, file))
}
