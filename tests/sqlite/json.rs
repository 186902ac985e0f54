use prepq::sqlite::SqliteQueryFactory;
use prepq::{JsonMapFactory, RowFactory};
use prepq_test::new;
use serde_json::json;

#[test]
fn it_maps_rows_to_json_objects() -> anyhow::Result<()> {
    let conn = new()?;
    conn.execute_batch(
        r#"
CREATE TEMPORARY TABLE todos (id INTEGER PRIMARY KEY, description TEXT NOT NULL, done BOOLEAN, weight REAL);
INSERT INTO todos (description, done, weight) VALUES ('write tests', TRUE, 0.5), ('ship', NULL, NULL);
        "#,
    )?;

    let mut factory = SqliteQueryFactory::new(conn, JsonMapFactory);

    let results = factory
        .prepare("SELECT * FROM todos WHERE id >= :minId ORDER BY id")?
        .with_param("minId", 1)
        .get_results()?;

    let todos: Vec<_> = results.iter().map(serde_json::Value::Object).collect();

    assert_eq!(
        serde_json::Value::Array(todos),
        json!([
            { "id": 1, "description": "write tests", "done": 1, "weight": 0.5 },
            { "id": 2, "description": "ship", "done": null, "weight": null },
        ])
    );

    Ok(())
}

#[test]
fn it_serializes_rows() -> anyhow::Result<()> {
    let mut factory = SqliteQueryFactory::new(new()?, RowFactory);

    let results = factory
        .prepare("SELECT :name AS name, 31 AS teeth, X'00FF' AS raw")?
        .with_param("name", "Anton")
        .get_results()?;

    let row = results.get(0).expect("one row");

    assert_eq!(
        serde_json::to_value(&row)?,
        json!({ "name": "Anton", "teeth": 31, "raw": [0, 255] })
    );

    Ok(())
}
