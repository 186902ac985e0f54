use prepq::error::ErrorKind;
use prepq::sqlite::{SqliteError, SqliteQueryFactory};
use prepq::{DatabaseError, Error, RowFactory};
use prepq_test::new;

fn factory_with_table() -> anyhow::Result<SqliteQueryFactory> {
    let conn = new()?;
    conn.execute_batch(
        "CREATE TEMPORARY TABLE tweet (id INTEGER PRIMARY KEY, text TEXT NOT NULL)",
    )?;

    Ok(SqliteQueryFactory::new(conn, RowFactory))
}

#[test]
fn it_fails_to_prepare() -> anyhow::Result<()> {
    let mut factory = factory_with_table()?;

    let Err(Error::StatementPreparation { message, source }) = factory.prepare("SEELCT 1") else {
        panic!("expected a preparation error");
    };

    assert_eq!(message, "near \"SEELCT\": syntax error");
    assert!(source.downcast_ref::<SqliteError>().is_some());

    let err = factory.prepare("SELECT * FROM nowhere").unwrap_err();
    assert_eq!(
        err.to_string(),
        "could not create statement: no such table: nowhere"
    );

    Ok(())
}

#[test]
fn it_fails_to_prepare_nothing() -> anyhow::Result<()> {
    let mut factory = factory_with_table()?;

    for sql in ["", "   ", "-- a comment"] {
        let err = factory.prepare(sql).unwrap_err();
        assert!(
            matches!(err, Error::StatementPreparation { .. }),
            "{sql:?}: {err:?}"
        );
    }

    Ok(())
}

#[test]
fn it_reports_unique_violations_with_a_dump() -> anyhow::Result<()> {
    let mut factory = factory_with_table()?;

    let insert = factory
        .prepare("INSERT INTO tweet (id, text) VALUES (:id, :text)")?
        .with_param("id", 1)
        .with_param("text", "hello");

    insert.get_results()?;

    let Err(Error::QueryExecution {
        message,
        debug,
        source,
    }) = insert.get_results()
    else {
        panic!("expected an execution error");
    };

    assert_eq!(message, "UNIQUE constraint failed: tweet.id");
    assert_eq!(
        debug,
        "SQL: [48] INSERT INTO tweet (id, text) VALUES (:id, :text)\n\
         Params:  2\n\
         Key: Name: [3] :id\n\
         paramno=1\n\
         name=[3] \":id\"\n\
         param_type=INT\n\
         value=1\n\
         Key: Name: [5] :text\n\
         paramno=2\n\
         name=[5] \":text\"\n\
         param_type=STR\n\
         value=\"hello\"\n"
    );

    let source = source
        .downcast_ref::<SqliteError>()
        .expect("source is a SqliteError");

    assert_eq!(source.sqlstate(), "23000");
    assert_eq!(source.kind(), ErrorKind::UniqueViolation);

    // the statement recovers once the bindings change
    insert.with_param("id", 2).get_results()?;

    Ok(())
}

#[test]
fn it_reports_not_null_violations() -> anyhow::Result<()> {
    let mut factory = factory_with_table()?;

    let err = factory
        .prepare("INSERT INTO tweet (text) VALUES (:text)")?
        .with_param("text", None::<String>)
        .get_results()
        .unwrap_err();

    assert!(err
        .to_string()
        .starts_with("NOT NULL constraint failed: tweet.text\nDebug info:\nSQL: [39] "));
    assert!(err.to_string().contains("param_type=NULL\nvalue=NULL\n"));

    Ok(())
}

#[test]
fn it_reports_errors_while_stepping() -> anyhow::Result<()> {
    let mut factory = factory_with_table()?;

    // rows are produced before the failing one
    let query = factory.prepare(
        "WITH n(x) AS (VALUES (1), (2), (:min)) SELECT abs(x) AS a FROM n",
    )?;

    assert_eq!(query.with_param("min", 3).get_results()?.count(), 3);

    let err = query.with_param("min", i64::MIN).get_results().unwrap_err();
    let Error::QueryExecution { message, debug, .. } = err else {
        panic!("expected an execution error");
    };

    assert_eq!(message, "integer overflow");
    assert!(debug.contains("value=-9223372036854775808"));

    // and the statement is usable again
    assert_eq!(query.with_param("min", 4).get_results()?.count(), 3);

    Ok(())
}

#[test]
fn it_rejects_unknown_parameters() -> anyhow::Result<()> {
    let mut factory = factory_with_table()?;

    let query = factory.prepare("SELECT * FROM tweet WHERE id = :id")?;

    let err = query
        .with_param("id", 1)
        .with_param("nope", 1)
        .get_results()
        .unwrap_err();

    let Error::QueryExecution { message, debug, .. } = err else {
        panic!("expected an execution error");
    };

    assert_eq!(message, "parameter `nope` is not defined in the statement");

    // the known parameter was bound before the failure
    assert!(debug.starts_with("SQL: [34] SELECT * FROM tweet WHERE id = :id\nParams:  1\n"));

    assert!(query.with_param("id", 1).get_results()?.is_empty());

    Ok(())
}

#[test]
fn it_reports_connection_errors() -> anyhow::Result<()> {
    let conn = new()?;

    let err = conn.execute_batch("DROP TABLE nowhere").unwrap_err();
    let Error::Database(err) = err else {
        panic!("expected a database error");
    };

    assert_eq!(err.message(), "no such table: nowhere");
    assert_eq!(err.code().as_deref(), Some("1"));

    Ok(())
}
