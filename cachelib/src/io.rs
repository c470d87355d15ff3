use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;
use crate::error::SimError;

/// Opens a trace file for sequential reading
///
/// Failing to open or map the file is fatal for a simulation, the error names the path
pub fn open_trace(path: &Path) -> Result<impl BufRead, SimError> {
    let file = File::open(path).map_err(|e| {
        io::Error::new(e.kind(), format!("couldn't open the trace file at path {}: {e}", path.display()))
    })?;
    get_reader(file)
}

pub fn get_reader(file: File) -> Result<impl BufRead, SimError> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::BufReader;
        // Trace lines are short, a multiple of the standard 4096 byte block keeps reads aligned
        const BUFFER_SIZE: usize = 40 * 4096;
        Ok(BufReader::with_capacity(BUFFER_SIZE, file))
    }
    // Memory map the file for speed on unix systems
    #[cfg(unix)]
    {
        use std::io::Cursor;
        use memmap2::{Advice, Mmap};
        // Mapping an empty file fails on some platforms, and there is nothing to read anyway
        if file.metadata()?.len() == 0 {
            return Ok(Cursor::new(TraceBytes::Empty));
        }
        // The mapping is read only and lives as long as the reader. Truncating the file while a
        // simulation runs is not supported
        let m = unsafe { Mmap::map(&file) }
            .map_err(|e| io::Error::new(e.kind(), format!("couldn't memory map the trace file: {e}")))?;
        m.advise(Advice::Sequential)
            .map_err(|e| io::Error::new(e.kind(), format!("failed to provide access advice to the OS: {e}")))?;
        Ok(Cursor::new(TraceBytes::Mapped(m)))
    }
}

#[cfg(unix)]
enum TraceBytes {
    Empty,
    Mapped(memmap2::Mmap),
}

#[cfg(unix)]
impl AsRef<[u8]> for TraceBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            TraceBytes::Empty => &[],
            TraceBytes::Mapped(m) => &m[..],
        }
    }
}
