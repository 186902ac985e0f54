use prepq::sqlite::{SqliteQuery, SqliteQueryFactory};
use prepq::{params, Arguments, Param, QueryFactory, Row, RowFactory, Value};
use prepq_test::new;

const SELECT_PERSONS: &str = "SELECT
        `id`,
        `name`,
        `dob`,
        `weight`,
        `is_dev`,
        `teeth`
    FROM `persons`
    WHERE (`dob` <= :maxDob OR `weight` <= :maxWeight)
      AND `is_dev` = :isDev
      AND `teeth` >= :minTeeth";

fn persons() -> Vec<Arguments> {
    vec![
        params! {
            "id" => None::<i64>,
            "name" => "Anton",
            "dob" => "1987-11-03",
            "weight" => 71.3,
            "is_dev" => true,
            "teeth" => 31,
        },
        params! {
            "id" => None::<i64>,
            "name" => "Melissa",
            "dob" => "1988-12-30",
            "weight" => 64,
            "is_dev" => true,
            "teeth" => 30,
        },
        params! {
            "id" => None::<i64>,
            "name" => "Wendy",
            "dob" => "2005-10-22",
            "weight" => 60.8,
            "is_dev" => true,
            "teeth" => 32,
        },
        params! {
            "id" => None::<i64>,
            "name" => "Kenneth",
            "dob" => "2007-02-19",
            "weight" => 82.1,
            "is_dev" => true,
            "teeth" => 32,
        },
        params! {
            "id" => None::<i64>,
            "name" => "James",
            "dob" => "1992-05-17",
            "weight" => 74.5,
            "is_dev" => false,
            "teeth" => 32,
        },
    ]
}

fn factory_with_persons() -> anyhow::Result<SqliteQueryFactory> {
    let conn = new()?;

    conn.execute_batch(
        "CREATE TEMPORARY TABLE `persons` (`id` int(6) PRIMARY KEY, `name` varchar(255), `dob` datetime, `weight` float(5), `is_dev` bool, `teeth` int(2))",
    )?;

    let mut factory = SqliteQueryFactory::new(conn, RowFactory);

    // one statement, five executions
    let insert = factory.prepare(
        "INSERT INTO `persons` (`id`, `name`, `dob`, `weight`, `is_dev`, `teeth`) VALUES (:id, :name, :dob, :weight, :is_dev, :teeth)",
    )?;

    for person in persons() {
        insert.with_params(person).get_results()?;
    }

    Ok(factory)
}

fn names(rows: &[Row]) -> Vec<&str> {
    rows.iter()
        .map(|row| row["name"].as_str().unwrap_or_default())
        .collect()
}

#[test]
fn it_selects_persons() -> anyhow::Result<()> {
    let mut factory = factory_with_persons()?;

    let query = factory.prepare(SELECT_PERSONS)?.with_params(params! {
        "maxDob" => "2003-01-16",
        "maxWeight" => 65,
        "isDev" => true,
        "minTeeth" => 31,
    });

    let results = query.get_results()?;
    assert_eq!(results.count(), 2);

    let mut rows: Vec<Row> = results.iter().collect();
    rows.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));

    assert_eq!(names(&rows), ["Anton", "Wendy"]);

    let anton: Row = [
        ("id", Value::Null),
        ("name", Value::from("Anton")),
        ("dob", Value::from("1987-11-03")),
        ("weight", Value::Real(71.3)),
        ("is_dev", Value::Integer(1)),
        ("teeth", Value::Integer(31)),
    ]
    .into_iter()
    .collect();

    let wendy: Row = [
        ("id", Value::Null),
        ("name", Value::from("Wendy")),
        ("dob", Value::from("2005-10-22")),
        ("weight", Value::Real(60.8)),
        ("is_dev", Value::Integer(1)),
        ("teeth", Value::Integer(32)),
    ]
    .into_iter()
    .collect();

    assert_eq!(rows, [anton, wendy]);

    Ok(())
}

#[test]
fn it_reuses_one_statement_with_many_params() -> anyhow::Result<()> {
    let mut factory = factory_with_persons()?;

    let by_name: SqliteQuery =
        factory.prepare("SELECT `teeth` FROM `persons` WHERE `name` = :name")?;

    let anton = by_name.with_param("name", "Anton");
    let james = by_name.with_param("name", "James");

    // interleaved executions of the same statement
    let teeth = |query: &SqliteQuery| -> anyhow::Result<Option<i64>> {
        Ok(query
            .get_results()?
            .get(0)
            .and_then(|row| row["teeth"].as_i64()))
    };

    assert_eq!(teeth(&anton)?, Some(31));
    assert_eq!(teeth(&james)?, Some(32));
    assert_eq!(teeth(&anton)?, Some(31));
    assert_eq!(teeth(&anton.with_param("name", "Nobody"))?, None);

    Ok(())
}

#[test]
fn it_never_modifies_a_query() -> anyhow::Result<()> {
    let mut factory = factory_with_persons()?;

    let base =
        factory.prepare("SELECT COUNT(*) AS n FROM `persons` WHERE `teeth` >= :minTeeth")?;
    let derived = base.with_param("minTeeth", 32);

    assert!(base.params().is_empty());
    assert_eq!(derived.params().get("minTeeth"), Some(&Param::Int(32)));

    let stricter = derived.with_params([("minTeeth", 33)]);
    let relaxed = stricter.without_params(["minTeeth", "absent"]);

    assert_eq!(derived.params().get("minTeeth"), Some(&Param::Int(32)));
    assert!(relaxed.params().is_empty());

    let count =
        |results: prepq::ResultSet<RowFactory>| results.get(0).map(|row| row["n"].clone());

    assert_eq!(count(derived.get_results()?), Some(Value::Integer(3)));
    assert_eq!(count(stricter.get_results()?), Some(Value::Integer(0)));

    // an unbound placeholder is NULL, and nothing is >= NULL
    assert_eq!(count(relaxed.get_results()?), Some(Value::Integer(0)));

    Ok(())
}

#[test]
fn it_infers_bind_types() -> anyhow::Result<()> {
    let mut factory = SqliteQueryFactory::new(new()?, RowFactory);
    let query = factory.prepare("SELECT typeof(:v) AS t, :v AS v")?;

    let bound = |value: Param| -> anyhow::Result<(Value, Value)> {
        let row = query
            .with_param("v", value)
            .get_results()?
            .get(0)
            .ok_or_else(|| anyhow::anyhow!("no row"))?;

        Ok((row["t"].clone(), row["v"].clone()))
    };

    // floats are bound by their decimal string
    assert_eq!(
        bound(Param::from(65.0))?,
        (Value::from("text"), Value::from("65"))
    );
    assert_eq!(
        bound(Param::from(71.3))?,
        (Value::from("text"), Value::from("71.3"))
    );

    assert_eq!(
        bound(Param::from(true))?,
        (Value::from("integer"), Value::Integer(1))
    );
    assert_eq!(
        bound(Param::from(false))?,
        (Value::from("integer"), Value::Integer(0))
    );
    assert_eq!(
        bound(Param::from(i64::MAX))?,
        (Value::from("integer"), Value::Integer(i64::MAX))
    );
    assert_eq!(bound(Param::Null)?, (Value::from("null"), Value::Null));
    assert_eq!(
        bound(Param::from("2003-01-16"))?,
        (Value::from("text"), Value::from("2003-01-16"))
    );

    // anything displayable is bound as text, even a boolean
    assert_eq!(
        bound(Param::display(true))?,
        (Value::from("text"), Value::from("true"))
    );
    assert_eq!(
        bound(Param::display(std::net::Ipv4Addr::LOCALHOST))?,
        (Value::from("text"), Value::from("127.0.0.1"))
    );

    Ok(())
}

#[test]
fn it_accepts_prefixed_names() -> anyhow::Result<()> {
    let mut factory = SqliteQueryFactory::new(new()?, RowFactory);
    let query = factory.prepare("SELECT :a + @b + $c AS sum")?;

    let results = query
        .with_params(params! { ":a" => 1, "b" => 2, "$c" => 3 })
        .get_results()?;

    assert_eq!(results.get(0).unwrap()["sum"], Value::Integer(6));

    Ok(())
}

#[test]
fn it_binds_every_spelling_of_a_name() -> anyhow::Result<()> {
    let mut factory = SqliteQueryFactory::new(new()?, RowFactory);
    let query = factory.prepare("SELECT :x AS a, $x AS b, @x AS c")?;

    let all = query.with_param("x", 5).get_results()?;
    let row = all.get(0).unwrap();
    assert_eq!(row["a"], Value::Integer(5));
    assert_eq!(row["b"], Value::Integer(5));
    assert_eq!(row["c"], Value::Integer(5));

    // a prefixed name only binds that spelling
    let one = query.with_param("$x", 7).get_results()?;
    let row = one.get(0).unwrap();
    assert_eq!(row["a"], Value::Null);
    assert_eq!(row["b"], Value::Integer(7));
    assert_eq!(row["c"], Value::Null);

    Ok(())
}

#[test]
fn it_binds_f32_by_its_shortest_digits() -> anyhow::Result<()> {
    let mut factory = SqliteQueryFactory::new(new()?, RowFactory);

    let results = factory
        .prepare("SELECT :v AS v")?
        .with_param("v", 0.1_f32)
        .get_results()?;

    assert_eq!(results.get(0).unwrap()["v"], Value::from("0.1"));

    Ok(())
}

#[test]
fn it_walks_the_cursor() -> anyhow::Result<()> {
    let mut factory = factory_with_persons()?;

    let mut results = factory
        .prepare("SELECT `name` FROM `persons` WHERE `is_dev` = :isDev ORDER BY `name`")?
        .with_param("isDev", true)
        .get_results()?;

    // unset until the first rewind
    assert!(!results.valid());
    assert_eq!(results.key(), None);
    results.advance();
    assert_eq!(results.key(), None);

    for _ in 0..2 {
        let mut seen = Vec::new();

        results.rewind();
        while results.valid() {
            seen.push(results.current()["name"].to_string());
            results.advance();
        }

        assert_eq!(seen, ["Anton", "Kenneth", "Melissa", "Wendy"]);
        assert_eq!(results.key(), Some(4));
    }

    assert_eq!(results.count(), 4);
    assert_eq!(results.iter().len(), 4);
    assert_eq!(
        results.iter().rev().next().map(|row| row["name"].clone()),
        Some(Value::from("Wendy"))
    );

    Ok(())
}

#[test]
fn it_maps_rows_through_any_factory() -> anyhow::Result<()> {
    let conn = new()?;
    conn.execute_batch(
        "CREATE TEMPORARY TABLE kv (k TEXT, v INTEGER); INSERT INTO kv VALUES ('a', 1), ('b', 2)",
    )?;

    let mut factory = QueryFactory::new(conn, |fields: &prepq::RawRow| {
        (
            fields["k"].to_string(),
            fields["v"].as_i64().unwrap_or_default(),
        )
    });

    let results = factory.prepare("SELECT k, v FROM kv ORDER BY k")?.get_results()?;
    let pairs: Vec<(String, i64)> = results.iter().collect();

    assert_eq!(pairs, [("a".to_owned(), 1), ("b".to_owned(), 2)]);

    Ok(())
}
