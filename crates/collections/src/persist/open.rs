use std::{
    fmt::Display,
    io::{BufRead, Read, Write},
    path::Path,
    str::FromStr,
};

use log::debug;

use super::{
    BinaryScalar, LineReader, PersistError, checked_capacity, open_reader, read_header,
    single_line, with_writer, write_u64,
};
use crate::{OpenTable, hash::BucketHash};

// Text layout:
//
//   <live count>
//   <capacity>
//   <touched>
//   <key>
//   <value>
//   ...
//
// Binary layout: the same three header fields as u64 little-endian,
// then every key and value as a `BinaryScalar`.

impl<K, V> OpenTable<K, V>
where
    K: BucketHash + Eq + Display + FromStr,
    K::Err: Display,
    V: Display + FromStr,
    V::Err: Display,
{
    /// Fails without writing anything if a key or value prints
    /// across more than one line
    pub fn write_text<W: Write>(&self, w: &mut W) -> Result<(), PersistError> {
        let entries = self
            .iter()
            .map(|(k, v)| -> Result<_, PersistError> {
                Ok((single_line("key", k)?, single_line("value", v)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        writeln!(w, "{}", self.items)?;
        writeln!(w, "{}", self.capacity())?;
        writeln!(w, "{}", self.touched)?;
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
        let capacity = checked_capacity(lines.header("capacity")?)?;
        // recomputed while inserting
        let _touched: u64 = lines.header("touched")?;

        *self = Self::with_capacity(capacity);
        for read in 0..declared {
            let key: K = lines.entry_field(declared, read, "key")?;
            let value: V = lines.entry_field(declared, read, "value")?;
            self.insert(key, value);
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
}

impl<K, V> OpenTable<K, V>
where
    K: BucketHash + Eq + BinaryScalar,
    V: BinaryScalar,
{
    pub fn write_binary<W: Write>(&self, w: &mut W) -> Result<(), PersistError> {
        write_u64(w, self.items as u64)?;
        write_u64(w, self.capacity() as u64)?;
        write_u64(w, self.touched as u64)?;
        for (k, v) in self.iter() {
            k.write_to(w)?;
            v.write_to(w)?;
        }
        Ok(())
    }

    /// Replaces the contents of the table with what `r` holds
    pub fn read_binary<R: Read>(&mut self, mut r: R) -> Result<(), PersistError> {
        let declared = read_header(&mut r, "count")?;
        let capacity = checked_capacity(read_header(&mut r, "capacity")?)?;
        let _touched = read_header(&mut r, "touched")?;

        *self = Self::with_capacity(capacity);
        for read in 0..declared {
            let (key, value) = K::read_from(&mut r)
                .and_then(|k| Ok((k, V::read_from(&mut r)?)))
                .map_err(|e| e.in_entry(declared, read))?;
            self.insert(key, value);
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
