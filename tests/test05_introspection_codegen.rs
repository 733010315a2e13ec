use std::sync::Arc;

use firebird_middleware::prelude::*;
use firebird_middleware::test_utils::MockPool;
use tokio::runtime::Runtime;

fn relation(name: &str) -> CustomDbRow {
    // catalog names come back blank-padded to CHAR(63)
    CustomDbRow::from_pairs([
        ("RDB$RELATION_NAME", RowValues::Text(format!("{name:<63}"))),
        ("RDB$SYSTEM_FLAG", RowValues::Int(0)),
        ("RDB$VIEW_SOURCE", RowValues::Null),
    ])
}

fn field(
    relation: &str,
    name: &str,
    type_code: i64,
    not_null: bool,
    identity: bool,
) -> CustomDbRow {
    CustomDbRow::from_pairs([
        ("RDB$RELATION_NAME", RowValues::Text(format!("{relation:<63}"))),
        ("RDB$FIELD_NAME", RowValues::Text(format!("{name:<63}"))),
        ("RDB$FIELD_TYPE", RowValues::Int(type_code)),
        ("RDB$FIELD_LENGTH", RowValues::Int(4)),
        ("RDB$FIELD_PRECISION", RowValues::Null),
        ("RDB$FIELD_SCALE", RowValues::Int(0)),
        (
            "RDB$NULL_FLAG",
            if not_null { RowValues::Int(1) } else { RowValues::Null },
        ),
        ("RDB$DEFAULT_SOURCE", RowValues::Null),
        (
            "RDB$IDENTITY_TYPE",
            if identity { RowValues::Int(1) } else { RowValues::Null },
        ),
    ])
}

fn scripted_pool() -> MockPool {
    let pool = MockPool::new();
    pool.respond_to(
        "RDB$RELATION_FIELDS",
        NativeResult::Rows(vec![
            field("ADULTS", "FIRST_NAME", 37, false, false),
            field("PERSON", "ID", 8, true, true),
            field("PERSON", "FIRST_NAME", 37, true, false),
            field("PERSON", "LAST_NAME", 37, false, false),
            field("PET", "NAME", 37, true, false),
        ]),
    );
    pool.respond_to(
        "RDB$VIEW_SOURCE is null",
        NativeResult::Rows(vec![relation("PERSON"), relation("PET")]),
    );
    pool.respond_to(
        "RDB$VIEW_SOURCE is not null",
        NativeResult::Rows(vec![relation("ADULTS")]),
    );
    pool
}

fn driver(pool: &MockPool) -> FirebirdDriver {
    let native: Arc<dyn NativePool> = Arc::new(pool.clone());
    FirebirdDialect::new(FirebirdDialectConfig::new(native)).create_driver()
}

#[test]
fn introspects_tables_and_views() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let pool = scripted_pool();
        let dialect = FirebirdDialect::new(FirebirdDialectConfig::new(Arc::new(pool.clone())));
        let driver = dialect.create_driver();
        let mut conn = driver.acquire_connection().await?;
        let introspector = dialect.create_introspector(&conn);

        let schemas = introspector.get_schemas();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].name, "default");

        let tables = introspector.get_tables().await?;
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["PERSON", "PET"]);
        let person = &tables[0];
        assert!(!person.is_view);
        assert_eq!(person.columns.len(), 3);
        assert_eq!(person.columns[0].name, "ID");
        assert_eq!(person.columns[0].data_type, FieldType::Integer);
        assert!(person.columns[0].is_auto_incrementing);
        assert!(!person.columns[0].is_nullable);
        assert!(person.columns[2].is_nullable);

        let views = introspector.get_views().await?;
        assert_eq!(views.len(), 1);
        assert!(views[0].is_view);
        assert_eq!(views[0].columns[0].data_type, FieldType::Varchar);

        let all = introspector.get_metadata().await?;
        let names: Vec<&str> = all.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["PERSON", "PET", "ADULTS"]);

        driver.release_connection(&mut conn).await;
        Ok(())
    })
}

#[test]
fn generates_types_and_skips_unchanged_output() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let dir = tempfile::tempdir()?;
        let types_path = dir.path().join("types.rs");
        let json_path = dir.path().join("tables.json");

        let pool = scripted_pool();
        let driver = driver(&pool);
        let mut conn = driver.acquire_connection().await?;
        let introspector = FirebirdIntrospector::new(&conn);

        let options = GeneratorOptions::default()
            .with_target(GeneratorTarget::All)
            .with_tables(["PERSON", "ADULTS"])
            .with_file_path(&types_path)
            .with_metadata_file(&json_path)
            .with_check_diff(true);

        let outcome = generate(&introspector, &options).await?;
        assert_eq!(outcome, GenerateOutcome::Written);

        let types = std::fs::read_to_string(&types_path)?;
        assert!(types.starts_with("// This file was generated automatically."));
        assert!(types.contains(
            "pub struct Person {\n    pub id: i32,\n    pub first_name: String,\n    \
             pub last_name: Option<String>,\n}"
        ));
        assert!(types.contains("pub struct NewPerson {\n    pub id: Option<i32>,"));
        assert!(types.contains("pub struct Adults {"));
        assert!(!types.contains("pub struct Pet "));
        assert!(types.contains("pub const TABLES: &[&str] = &[\"PERSON\", \"ADULTS\"];"));

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path)?)?;
        let relations = json.as_array().ok_or("metadata should be a list")?;
        assert_eq!(relations.len(), 2);
        assert_eq!(relations[0]["name"], "PERSON");
        assert_eq!(relations[0]["columns"][0]["dataType"], "INTEGER");
        assert_eq!(relations[0]["columns"][0]["isAutoIncrementing"], true);
        assert_eq!(relations[1]["isView"], true);

        let outcome = generate(&introspector, &options).await?;
        assert_eq!(outcome, GenerateOutcome::Unchanged);
        assert_eq!(std::fs::read_to_string(&types_path)?, types);

        driver.release_connection(&mut conn).await;
        Ok(())
    })
}

#[test]
fn introspection_failures_surface() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let dir = tempfile::tempdir()?;
        let pool = scripted_pool();
        let driver = driver(&pool);
        let mut conn = driver.acquire_connection().await?;
        let introspector = FirebirdIntrospector::new(&conn);

        pool.fail_next_query("no permission for SELECT access to TABLE RDB$RELATIONS");
        let options = GeneratorOptions::default().with_file_path(dir.path().join("types.rs"));
        let err = generate(&introspector, &options).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Native);
        assert!(!dir.path().join("types.rs").exists());

        driver.release_connection(&mut conn).await;
        Ok(())
    })
}
