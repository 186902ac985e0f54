use std::borrow::Cow;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use percent_encoding::percent_decode_str;

use crate::error::Error;
use crate::options::SqliteJournalMode;
use crate::SqliteConnectOptions;

// https://www.sqlite.org/uri.html

impl FromStr for SqliteConnectOptions {
    type Err = Error;

    fn from_str(mut uri: &str) -> Result<Self, Self::Err> {
        let mut options = Self::new();

        // remove scheme from the URI
        uri = uri
            .trim_start_matches("sqlite://")
            .trim_start_matches("sqlite:");

        let (database, params) = match uri.split_once('?') {
            Some((database, params)) => (database, Some(params)),
            None => (uri, None),
        };

        if database == ":memory:" {
            options.in_memory = true;
        } else {
            // % decode to allow for `?` or `#` in the filename
            options.filename = Cow::Owned(
                Path::new(
                    &*percent_decode_str(database)
                        .decode_utf8()
                        .map_err(Error::config)?,
                )
                .to_path_buf(),
            );
        }

        if let Some(params) = params {
            for (key, value) in url::form_urlencoded::parse(params.as_bytes()) {
                match &*key {
                    // The mode query parameter determines if the new database is opened read-only,
                    // read-write, read-write and created if it does not exist, or that the
                    // database is a pure in-memory database that never interacts with disk,
                    // respectively.
                    "mode" => match &*value {
                        "ro" => {
                            options.read_only = true;
                        }

                        // default
                        "rw" => {}

                        "rwc" => {
                            options.create_if_missing = true;
                        }

                        "memory" => {
                            options.in_memory = true;
                        }

                        _ => {
                            return Err(Error::Configuration(
                                format!("unknown value {value:?} for `mode`").into(),
                            ));
                        }
                    },

                    // The cache query parameter specifies the cache behaviour across multiple
                    // connections to the same database within the process.
                    "cache" => match &*value {
                        "private" => {
                            options.shared_cache = false;
                        }

                        "shared" => {
                            options.shared_cache = true;
                        }

                        _ => {
                            return Err(Error::Configuration(
                                format!("unknown value {value:?} for `cache`").into(),
                            ));
                        }
                    },

                    "immutable" => {
                        options.immutable = parse_bool(&key, &value)?;
                    }

                    "foreign_keys" => {
                        options = options.foreign_keys(parse_bool(&key, &value)?);
                    }

                    "journal_mode" => {
                        options = options.journal_mode(value.parse::<SqliteJournalMode>()?);
                    }

                    "busy_timeout" => {
                        let millis = value.parse::<u64>().map_err(|_| {
                            Error::Configuration(
                                format!("invalid value {value:?} for `busy_timeout`").into(),
                            )
                        })?;

                        options.busy_timeout = Duration::from_millis(millis);
                    }

                    _ => {
                        return Err(Error::Configuration(
                            format!("unknown query parameter `{key}` while parsing connection URI")
                                .into(),
                        ));
                    }
                }
            }
        }

        Ok(options)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, Error> {
    match value {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" => Ok(false),
        _ => Err(Error::Configuration(
            format!("unknown value {value:?} for `{key}`").into(),
        )),
    }
}

#[test]
fn test_parse_in_memory() -> Result<(), Error> {
    let options: SqliteConnectOptions = "sqlite::memory:".parse()?;
    assert!(options.in_memory);

    let options: SqliteConnectOptions = "sqlite://?mode=memory".parse()?;
    assert!(options.in_memory);

    let options: SqliteConnectOptions = "sqlite://:memory:".parse()?;
    assert!(options.in_memory);

    Ok(())
}

#[test]
fn test_parse_read_only() -> Result<(), Error> {
    let options: SqliteConnectOptions = "sqlite://a.db?mode=ro".parse()?;
    assert!(options.read_only);
    assert_eq!(&*options.filename.to_string_lossy(), "a.db");

    Ok(())
}

#[test]
fn test_parse_absolute_path_and_encoding() -> Result<(), Error> {
    let options: SqliteConnectOptions = "sqlite:///var/data/my%3Fdb.sqlite?mode=rwc".parse()?;
    assert!(options.create_if_missing);
    assert_eq!(
        &*options.filename.to_string_lossy(),
        "/var/data/my?db.sqlite"
    );

    Ok(())
}

#[test]
fn test_parse_settings() -> Result<(), Error> {
    let options: SqliteConnectOptions =
        "sqlite:a.db?busy_timeout=250&immutable=true&journal_mode=wal&foreign_keys=false"
            .parse()?;

    assert_eq!(options.busy_timeout, Duration::from_millis(250));
    assert!(options.immutable);
    assert_eq!(
        options.pragma_string(),
        "PRAGMA journal_mode = WAL; PRAGMA foreign_keys = OFF; "
    );

    Ok(())
}

#[test]
fn test_parse_rejects_unknown_settings() {
    for uri in [
        "sqlite:a.db?mode=rx",
        "sqlite:a.db?busy_timeout=soon",
        "sqlite:a.db?journal_mode=fast",
        "sqlite:a.db?synchronous=off",
    ] {
        let error = uri.parse::<SqliteConnectOptions>().unwrap_err();
        assert!(matches!(error, Error::Configuration(_)), "{uri}: {error:?}");
    }
}

#[test]
fn test_default_pragmas() {
    assert_eq!(
        SqliteConnectOptions::new().pragma_string(),
        "PRAGMA foreign_keys = ON; "
    );
}
