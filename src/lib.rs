pub mod command;
pub mod store;

use std::io::{self, Write};

use collections::{ChainedTable, OpenTable, PersistError};
use command::{Command, Invocation, Variant};
use log::{debug, trace};
use store::Store;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// The arguments did not make up a valid invocation
    #[error("{0}")]
    Usage(String),

    /// Loading or saving the table failed
    #[error("{0}")]
    Persist(#[from] PersistError),

    /// Derived IO error, writing the output
    #[error("Io error: {0}")]
    Io(#[from] io::Error),
}

/// Runs the command described by `args` (program name excluded),
/// writing its output to `out`
pub fn run<W: Write>(args: &[String], out: &mut W) -> Result<(), CliError> {
    let inv = command::parse_args(args)?;
    trace!(target: "run", "{inv:?}");

    match inv.variant {
        Variant::Open => execute::<OpenTable<i64, String>, W>(&inv, out),
        Variant::Chained => execute::<ChainedTable, W>(&inv, out),
    }
}

fn execute<S: Store, W: Write>(inv: &Invocation, out: &mut W) -> Result<(), CliError> {
    let mut store = S::default();
    match store.load(&inv.path, inv.format) {
        Ok(()) => {}
        // a file that does not exist yet is an empty table
        Err(PersistError::Open { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            debug!(target: "run", "{} does not exist, starting empty", inv.path.display());
        }
        Err(e) => return Err(e.into()),
    }

    let dirty = match &inv.command {
        Command::Set { key, value } => {
            let written = store.set(key, value)?;
            writeln!(out, "{}", if written { "OK" } else { "(exists)" })?;
            written
        }
        Command::Get { key } => {
            match store.get(key)? {
                Some(v) => writeln!(out, "{v}")?,
                None => writeln!(out, "(nil)")?,
            }
            false
        }
        Command::Del { key } => {
            let deleted = store.del(key)?;
            writeln!(out, "{}", if deleted { "OK" } else { "(nil)" })?;
            deleted
        }
        Command::List => {
            for (k, v) in store.entries() {
                writeln!(out, "{k} {v}")?;
            }
            false
        }
        Command::Size => {
            writeln!(out, "{}", store.len())?;
            false
        }
    };

    if dirty {
        store.save(&inv.path, inv.format)?;
    }
    Ok(())
}
