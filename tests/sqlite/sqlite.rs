use prepq::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteQueryFactory};
use prepq::{ConnectOptions, Connection, RowFactory, Statement, Value};
use prepq_test::new;

#[test]
fn it_connects() -> anyhow::Result<()> {
    let conn = new()?;
    conn.execute_batch("SELECT 1")?;

    Ok(())
}

#[test]
fn it_fails_to_connect() -> anyhow::Result<()> {
    assert!(
        SqliteConnection::connect("sqlite:///please_do_not_run_prepq_tests_as_root/missing.db")
            .is_err()
    );

    // read-write without `create_if_missing`
    let dir = tempfile::tempdir()?;
    let options = SqliteConnectOptions::new().filename(dir.path().join("missing.db"));
    assert!(options.connect().is_err());

    Ok(())
}

#[test]
fn it_creates_a_database_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("created.db");

    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);

    let conn = options.connect()?;
    conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY)")?;
    drop(conn);

    assert!(path.exists());

    // and it is there on the next connection
    let conn = SqliteConnectOptions::new().filename(&path).read_only(true).connect()?;
    let mut factory = SqliteQueryFactory::new(conn, RowFactory);
    let results = factory.prepare("SELECT name FROM sqlite_master")?.get_results()?;

    assert_eq!(results.count(), 1);
    assert_eq!(results.get(0).unwrap()["name"], Value::from("t"));

    Ok(())
}

#[test]
fn it_applies_pragmas() -> anyhow::Result<()> {
    let conn = SqliteConnection::connect("sqlite::memory:?foreign_keys=false")?;
    let mut factory = SqliteQueryFactory::new(conn, RowFactory);

    let results = factory.prepare("PRAGMA foreign_keys")?.get_results()?;
    assert_eq!(results.get(0).unwrap()["foreign_keys"], Value::Integer(0));

    // on by default
    let mut factory = SqliteQueryFactory::new(new()?, RowFactory);

    let results = factory.prepare("PRAGMA foreign_keys")?.get_results()?;
    assert_eq!(results.get(0).unwrap()["foreign_keys"], Value::Integer(1));

    Ok(())
}

#[test]
fn it_can_execute_multiple_statements() -> anyhow::Result<()> {
    let conn = new()?;

    conn.execute_batch(
        r#"
CREATE TEMPORARY TABLE users (id INTEGER PRIMARY KEY, other INTEGER);
INSERT INTO users (other) VALUES (1);
INSERT INTO users (other) VALUES (2);
        "#,
    )?;

    assert_eq!(conn.last_insert_rowid(), 2);

    Ok(())
}

#[test]
fn it_lists_parameter_names() -> anyhow::Result<()> {
    let mut conn = new()?;

    let statement = conn.prepare("SELECT :a, @b, $c, ?, :a")?;

    assert_eq!(statement.parameter_names(), [":a", "@b", "$c"]);
    assert_eq!(statement.column_count(), 5);
    assert_eq!(statement.sql(), "SELECT :a, @b, $c, ?, :a");

    Ok(())
}

#[test]
fn it_prepares_only_the_first_statement() -> anyhow::Result<()> {
    let mut factory = SqliteQueryFactory::new(new()?, RowFactory);

    let query = factory.prepare("SELECT 1 AS one; SELECT 2 AS two")?;
    assert_eq!(query.sql(), "SELECT 1 AS one;");

    let results = query.get_results()?;
    assert_eq!(results.count(), 1);
    assert_eq!(results.get(0).unwrap()["one"], Value::Integer(1));

    Ok(())
}

#[test]
fn it_reads_every_storage_class() -> anyhow::Result<()> {
    let mut factory = SqliteQueryFactory::new(new()?, RowFactory);

    let results = factory
        .prepare("SELECT NULL AS n, 7 AS i, 1.5 AS r, 'x' AS t, X'DEADBEEF' AS b, X'' AS e")?
        .get_results()?;

    let row = results.get(0).unwrap();

    assert_eq!(row["n"], Value::Null);
    assert_eq!(row["i"], Value::Integer(7));
    assert_eq!(row["r"], Value::Real(1.5));
    assert_eq!(row["t"], Value::Text("x".into()));
    assert_eq!(row["b"], Value::Blob(vec![0xDE, 0xAD, 0xBE, 0xEF]));
    assert_eq!(row["e"], Value::Blob(Vec::new()));
    assert_eq!(row.columns().collect::<Vec<_>>(), ["n", "i", "r", "t", "b", "e"]);

    Ok(())
}

#[test]
fn it_returns_no_rows_for_writes() -> anyhow::Result<()> {
    let conn = new()?;
    conn.execute_batch("CREATE TEMPORARY TABLE notes (body TEXT)")?;

    let mut factory = SqliteQueryFactory::new(conn, RowFactory);
    let insert = factory.prepare("INSERT INTO notes (body) VALUES (:body)")?;

    let results = insert.with_param("body", "hello").get_results()?;
    assert!(results.is_empty());
    assert_eq!(factory.connection().last_insert_rowid(), 1);

    Ok(())
}

#[test]
fn it_refuses_to_fetch_twice_per_execution() -> anyhow::Result<()> {
    let mut conn = new()?;

    let mut statement = conn.prepare("SELECT 1 AS one")?;
    statement.execute()?;
    assert_eq!(statement.fetch_all()?.len(), 1);
    assert!(statement.fetch_all().is_err());

    // the same without any row
    let mut statement = conn.prepare("SELECT 1 AS one WHERE 0")?;
    statement.execute()?;
    assert!(statement.fetch_all()?.is_empty());
    assert!(statement.fetch_all().is_err());

    // executing again makes the rows available again
    statement.execute()?;
    assert!(statement.fetch_all()?.is_empty());

    Ok(())
}
