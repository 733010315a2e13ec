use std::sync::Arc;

use firebird_middleware::prelude::*;
use firebird_middleware::test_utils::{MockEvent, MockPool};
use tokio::runtime::Runtime;

fn dialect(pool: &MockPool, default_level: IsolationLevel) -> FirebirdDialect {
    let native: Arc<dyn NativePool> = Arc::new(pool.clone());
    FirebirdDialectConfig::builder(native)
        .isolation_level(default_level)
        .inline_log_parameters(false)
        .build()
}

#[test]
fn statements_route_through_the_active_transaction() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let pool = MockPool::new();
        let driver = dialect(&pool, IsolationLevel::ReadCommitted).create_driver();
        let mut conn = driver.acquire_connection().await?;

        conn.execute("select 1 from rdb$database", &[]).await?;

        driver
            .begin_transaction(
                &mut conn,
                TransactionSettings::with_isolation_level(IsolationLevel::Serializable),
            )
            .await?;
        assert_eq!(conn.isolation_level(), Some(IsolationLevel::Serializable));

        conn.execute(
            "update person set age = $1 where id = $2",
            &[RowValues::Int(41), RowValues::Int(7)],
        )
        .await?;
        driver.commit_transaction(&mut conn).await?;
        assert!(!conn.has_active_transaction());

        conn.execute("select 2 from rdb$database", &[]).await?;
        driver.release_connection(&mut conn).await;

        assert_eq!(
            pool.events(),
            vec![
                MockEvent::Get,
                MockEvent::ConnectionQuery("select 1 from rdb$database".into()),
                MockEvent::Begin(vec![9, 1]),
                MockEvent::TransactionQuery("update person set age = ? where id = ?".into()),
                MockEvent::Commit,
                MockEvent::ConnectionQuery("select 2 from rdb$database".into()),
                MockEvent::Detach,
            ]
        );
        assert_eq!(pool.parameters()[1], vec![RowValues::Int(41), RowValues::Int(7)]);
        Ok(())
    })
}

#[test]
fn unset_isolation_uses_the_configured_default() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let pool = MockPool::new();
        let driver = dialect(&pool, IsolationLevel::Snapshot).create_driver();
        let mut conn = driver.acquire_connection().await?;

        driver
            .begin_transaction(&mut conn, TransactionSettings::default())
            .await?;
        assert_eq!(conn.isolation_level(), Some(IsolationLevel::Snapshot));
        driver.rollback_transaction(&mut conn).await?;

        for (level, codes) in [
            (IsolationLevel::ReadUncommitted, vec![9, 15, 17]),
            (IsolationLevel::ReadCommitted, vec![9, 15, 18]),
            (IsolationLevel::RepeatableRead, vec![9, 2]),
        ] {
            driver
                .begin_transaction(
                    &mut conn,
                    TransactionSettings::with_isolation_level(level),
                )
                .await?;
            driver.rollback_transaction(&mut conn).await?;
            assert!(pool.events().contains(&MockEvent::Begin(codes)));
        }

        let begins: Vec<MockEvent> = pool
            .events()
            .into_iter()
            .filter(|e| matches!(e, MockEvent::Begin(_)))
            .collect();
        assert_eq!(begins[0], MockEvent::Begin(vec![9, 2]));
        assert_eq!(begins.len(), 4);
        driver.release_connection(&mut conn).await;
        Ok(())
    })
}

#[test]
fn transaction_state_errors() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let pool = MockPool::new();
        let driver = dialect(&pool, IsolationLevel::ReadCommitted).create_driver();
        let mut conn = driver.acquire_connection().await?;

        let err = driver.commit_transaction(&mut conn).await.unwrap_err();
        assert!(matches!(err, FirebirdDbError::NoActiveTransaction));
        let err = driver.rollback_transaction(&mut conn).await.unwrap_err();
        assert!(matches!(err, FirebirdDbError::NoActiveTransaction));

        driver
            .begin_transaction(&mut conn, TransactionSettings::default())
            .await?;
        let err = driver
            .begin_transaction(&mut conn, TransactionSettings::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "You can't create a new transaction, one is already active"
        );
        assert!(conn.has_active_transaction());

        pool.fail_next_commit("deadlock");
        let err = driver.commit_transaction(&mut conn).await.unwrap_err();
        assert_eq!(err.to_string(), "deadlock");
        assert_eq!(err.class(), ErrorClass::Native);
        assert!(!conn.has_active_transaction());

        driver.release_connection(&mut conn).await;
        Ok(())
    })
}

#[test]
fn native_errors_pass_through_and_keep_the_connection_usable()
-> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let pool = MockPool::new();
        pool.respond_to(
            "from person",
            NativeResult::Rows(vec![CustomDbRow::from_pairs([
                ("ID", RowValues::Int(1)),
                ("FIRST_NAME", RowValues::Text("Jennifer".into())),
            ])]),
        );
        let driver = dialect(&pool, IsolationLevel::ReadCommitted).create_driver();
        let mut conn = driver.acquire_connection().await?;

        pool.fail_next_query("Dynamic SQL Error");
        let err = conn.execute("select * from person", &[]).await.unwrap_err();
        assert_eq!(err.to_string(), "Dynamic SQL Error");

        let rows = conn.execute("select * from person", &[]).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.results[0].get_int("ID"), Some(1));
        assert_eq!(
            rows.results[0].get_trimmed_text("FIRST_NAME"),
            Some("Jennifer")
        );

        let err = conn
            .execute("select * from person where id = $1", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, FirebirdDbError::PlaceholderError(_)));

        driver.release_connection(&mut conn).await;
        Ok(())
    })
}

#[test]
fn compiled_queries_run_through_the_connection_trait() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let pool = MockPool::new();
        let dialect = dialect(&pool, IsolationLevel::ReadCommitted);
        let driver = dialect.create_driver();
        let mut conn = driver.acquire_connection().await?;

        let query = dialect.create_query_compiler().compile(
            &SelectQueryNode::from(table("person"))
                .select_all()
                .where_eq("id", 5)
                .into(),
        )?;
        let connection: &dyn DatabaseConnection = &conn;
        let result = connection.execute_query(&query).await?;
        assert!(result.is_empty());

        let err = connection
            .stream_query(&query, Some(100))
            .await
            .unwrap_err();
        assert!(matches!(err, FirebirdDbError::Unimplemented(_)));

        assert_eq!(
            pool.events()[1],
            MockEvent::ConnectionQuery("select * from person where id = ?".into())
        );
        assert_eq!(pool.parameters()[0], vec![RowValues::Int(5)]);
        driver.release_connection(&mut conn).await;
        Ok(())
    })
}
