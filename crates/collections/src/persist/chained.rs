use std::{
    io::{BufRead, Read, Write},
    path::Path,
};

use log::debug;

use super::{
    LineReader, PersistError, open_reader, read_header, read_string, single_line, with_writer,
    write_str, write_u64,
};
use crate::ChainedTable;

// Text layout: the live count on the first line, then a key line and a
// value line per entry. Keys and values must not contain line breaks.
//
// Binary layout: the live count as u64 little-endian, then every key and
// value as a u32 little-endian length followed by the UTF-8 bytes.
//
// Neither layout stores the bucket count, loading starts from a table of
// `DEFAULT_CAPACITY` buckets.

impl ChainedTable {
    /// Fails without writing anything if a key or value holds a line break
    pub fn write_text<W: Write>(&self, w: &mut W) -> Result<(), PersistError> {
        let entries = self
            .iter()
            .map(|(k, v)| -> Result<_, PersistError> {
                Ok((single_line("key", k)?, single_line("value", v)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        writeln!(w, "{}", self.items)?;
        for (k, v) in entries {
            writeln!(w, "{k}")?;
            writeln!(w, "{v}")?;
        }
        Ok(())
    }

    /// Replaces the contents of the table with what `r` holds
    pub fn read_text<R: BufRead>(&mut self, r: R) -> Result<(), PersistError> {
        let mut lines = LineReader::new(r);
        let declared: u64 = lines.header("count")?;

        self.clear();
        for read in 0..declared {
            let key: String = lines.entry_field(declared, read, "key")?;
            let value: String = lines.entry_field(declared, read, "value")?;
            self.insert(&key, &value);
        }
        Ok(())
    }

    pub fn save_text<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistError> {
        let path = path.as_ref();
        // rendered up front so a rejected table leaves the old file alone
        let mut buf = Vec::new();
        self.write_text(&mut buf)?;
        with_writer(path, |w| Ok(w.write_all(&buf)?))?;
        debug!(target: "save_text", "wrote {} entries to {}", self.items, path.display());
        Ok(())
    }

    pub fn load_text<P: AsRef<Path>>(&mut self, path: P) -> Result<(), PersistError> {
        let path = path.as_ref();
        self.read_text(open_reader(path)?)?;
        debug!(target: "load_text", "read {} entries from {}", self.items, path.display());
        Ok(())
    }

    pub fn write_binary<W: Write>(&self, w: &mut W) -> Result<(), PersistError> {
        write_u64(w, self.items as u64)?;
        for (k, v) in self.iter() {
            write_str(w, k)?;
            write_str(w, v)?;
        }
        Ok(())
    }

    /// Replaces the contents of the table with what `r` holds
    pub fn read_binary<R: Read>(&mut self, mut r: R) -> Result<(), PersistError> {
        let declared = read_header(&mut r, "count")?;

        self.clear();
        for read in 0..declared {
            let (key, value) = read_string(&mut r)
                .and_then(|k| Ok((k, read_string(&mut r)?)))
                .map_err(|e| e.in_entry(declared, read))?;
            self.insert(&key, &value);
        }
        Ok(())
    }

    pub fn save_binary<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistError> {
        let path = path.as_ref();
        with_writer(path, |w| self.write_binary(w))?;
        debug!(target: "save_binary", "wrote {} entries to {}", self.items, path.display());
        Ok(())
    }

    pub fn load_binary<P: AsRef<Path>>(&mut self, path: P) -> Result<(), PersistError> {
        let path = path.as_ref();
        self.read_binary(open_reader(path)?)?;
        debug!(target: "load_binary", "read {} entries from {}", self.items, path.display());
        Ok(())
    }
}
