use std::path::PathBuf;

use crate::CliError;

pub const USAGE: &str = "usage: htable <open|chain> <text|bin> <file> <set KEY VALUE | get KEY | del KEY | list | size>";

/// Which table implementation backs the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// `OpenTable<i64, String>`
    Open,
    /// `ChainedTable`
    Chained,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Binary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { key: String, value: String },
    Get { key: String },
    Del { key: String },
    List,
    Size,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub variant: Variant,
    pub format: Format,
    pub path: PathBuf,
    pub command: Command,
}

/// Parses the arguments following the program name
pub fn parse_args(args: &[String]) -> Result<Invocation, CliError> {
    let [variant, format, path, cmd @ ..] = args else {
        return Err(CliError::Usage("expected a variant, a format and a file".into()));
    };

    let variant = match variant.as_str() {
        "open" => Variant::Open,
        "chain" | "chained" => Variant::Chained,
        other => return Err(CliError::Usage(format!("unknown table variant {other:?}"))),
    };

    let format = match format.as_str() {
        "text" | "txt" => Format::Text,
        "bin" | "binary" => Format::Binary,
        other => return Err(CliError::Usage(format!("unknown format {other:?}"))),
    };

    Ok(Invocation {
        variant,
        format,
        path: PathBuf::from(path),
        command: parse_command(cmd)?,
    })
}

fn parse_command(cmd: &[String]) -> Result<Command, CliError> {
    match cmd.len() {
        3 if cmd[0] == "set" => Ok(Command::Set {
            key: cmd[1].clone(),
            value: cmd[2].clone(),
        }),
        2 if cmd[0] == "get" => Ok(Command::Get {
            key: cmd[1].clone(),
        }),
        2 if cmd[0] == "del" => Ok(Command::Del {
            key: cmd[1].clone(),
        }),
        1 if cmd[0] == "list" => Ok(Command::List),
        1 if cmd[0] == "size" => Ok(Command::Size),
        0 => Err(CliError::Usage("missing command".into())),
        _ => Err(CliError::Usage(format!(
            "bad command {:?} with {} argument(s)",
            cmd[0],
            cmd.len() - 1
        ))),
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn set() {
        let inv = parse_args(&args("open bin data.bin set 4 four")).unwrap();
        assert_eq!(
            inv,
            Invocation {
                variant: Variant::Open,
                format: Format::Binary,
                path: PathBuf::from("data.bin"),
                command: Command::Set {
                    key: "4".into(),
                    value: "four".into()
                },
            }
        );
    }

    #[test]
    fn read_only_commands() {
        let inv = parse_args(&args("chain text t.txt get apple")).unwrap();
        assert_eq!(inv.variant, Variant::Chained);
        assert_eq!(inv.format, Format::Text);
        assert_eq!(inv.command, Command::Get { key: "apple".into() });

        assert_eq!(parse_args(&args("chain text t list")).unwrap().command, Command::List);
        assert_eq!(parse_args(&args("open txt t size")).unwrap().command, Command::Size);
        assert_eq!(
            parse_args(&args("open txt t del 3")).unwrap().command,
            Command::Del { key: "3".into() }
        );
    }

    #[test]
    fn usage_errors() {
        for bad in [
            "",
            "open text",
            "open text file",
            "closed text file list",
            "open json file list",
            "open text file get",
            "open text file set k",
            "open text file frobnicate",
        ] {
            let err = parse_args(&args(bad)).unwrap_err();
            assert!(matches!(err, CliError::Usage(_)), "{bad}: {err}");
        }
    }
}
