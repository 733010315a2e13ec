use std::sync::Arc;

use firebird_middleware::prelude::*;
use firebird_middleware::test_utils::{MockEvent, MockPool};
use tokio::runtime::Runtime;

fn driver(pool: &MockPool) -> FirebirdDriver {
    let native: Arc<dyn NativePool> = Arc::new(pool.clone());
    FirebirdDialect::new(FirebirdDialectConfig::new(native)).create_driver()
}

#[test]
fn callbacks_from_foreign_threads_resolve() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let pool = MockPool::new();
        pool.set_threaded(true);
        pool.respond_to(
            "rdb$database",
            NativeResult::Row(CustomDbRow::from_pairs([("ONE", RowValues::Int(1))])),
        );
        pool.respond_positional(
            "execute procedure",
            vec![vec![RowValues::Int(3), RowValues::Text("done".into())]],
        );
        let driver = driver(&pool);

        let mut conn = driver.acquire_connection().await?;
        let rows = conn.execute("select 1 as one from rdb$database", &[]).await?;
        assert_eq!(rows.results[0].get_int("ONE"), Some(1));

        let rows = conn.execute_rows("execute procedure tally", &[]).await?;
        assert_eq!(rows, vec![vec![RowValues::Int(3), RowValues::Text("done".into())]]);

        driver
            .begin_transaction(&mut conn, TransactionSettings::default())
            .await?;
        conn.execute("select 1 as one from rdb$database", &[]).await?;
        driver.commit_transaction(&mut conn).await?;
        driver.release_connection(&mut conn).await;

        assert_eq!(pool.attached(), 0);
        assert_eq!(pool.events().last(), Some(&MockEvent::Detach));
        Ok(())
    })
}

#[test]
fn concurrent_connections_are_tracked_independently() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let pool = MockPool::new();
        pool.set_threaded(true);
        let driver = Arc::new(driver(&pool));

        let mut handles = Vec::new();
        for n in 0..4_i64 {
            let driver = Arc::clone(&driver);
            handles.push(tokio::spawn(async move {
                let conn = driver.acquire_connection().await?;
                conn.execute("select ? from rdb$database", &[RowValues::Int(n)])
                    .await?;
                Ok::<_, FirebirdDbError>(conn)
            }));
        }

        let mut connections = Vec::new();
        for handle in handles {
            connections.push(handle.await??);
        }
        assert_eq!(driver.outstanding_connections(), 4);
        assert_eq!(pool.attached(), 4);

        let mut released = connections.pop().ok_or("no connection")?;
        driver.release_connection(&mut released).await;
        assert_eq!(driver.outstanding_connections(), 3);
        assert!(driver.connection(released.id()).is_none());
        for conn in &connections {
            assert!(driver.connection(conn.id()).is_some());
        }

        driver.destroy().await;
        assert_eq!(driver.outstanding_connections(), 0);
        assert!(pool.is_destroyed());
        for conn in &connections {
            assert!(conn.is_released());
        }
        Ok(())
    })
}

#[test]
fn release_is_best_effort() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let pool = MockPool::new();
        let driver = driver(&pool);

        let mut conn = driver.acquire_connection().await?;
        driver
            .begin_transaction(&mut conn, TransactionSettings::default())
            .await?;
        pool.fail_next_rollback("connection shutdown");
        pool.fail_next_detach("network error");
        driver.release_connection(&mut conn).await;

        assert!(!conn.has_active_transaction());
        assert!(conn.is_released());
        assert_eq!(driver.outstanding_connections(), 0);

        let err = conn
            .execute("select 1 from rdb$database", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, FirebirdDbError::ConnectionReleased(_)));

        let err = driver
            .begin_transaction(&mut conn, TransactionSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FirebirdDbError::ConnectionReleased(_)));
        Ok(())
    })
}

#[test]
fn destroyed_driver_refuses_new_connections() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let pool = MockPool::new();
        let driver = driver(&pool);
        let _conn = driver.acquire_connection().await?;

        driver.destroy().await;
        driver.destroy().await;

        let err = driver.acquire_connection().await.unwrap_err();
        assert_eq!(err.to_string(), "Connection pool has been destroyed");
        assert!(driver.is_destroyed());

        let events = pool.events();
        assert_eq!(
            events,
            vec![MockEvent::Get, MockEvent::Detach, MockEvent::Destroy]
        );
        Ok(())
    })
}

#[test]
fn driver_trait_wraps_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    async fn roundtrip<D: Driver>(driver: &D) -> Result<(), FirebirdDbError> {
        driver.init().await?;
        let mut conn = driver.acquire_connection().await?;
        driver
            .begin_transaction(&mut conn, TransactionSettings::default())
            .await?;
        driver.rollback_transaction(&mut conn).await?;
        driver.release_connection(&mut conn).await?;
        driver.destroy().await
    }

    let rt = Runtime::new()?;
    rt.block_on(async {
        let pool = MockPool::new();
        roundtrip(&driver(&pool)).await?;
        assert_eq!(
            pool.events(),
            vec![
                MockEvent::Get,
                MockEvent::Begin(vec![9, 15, 18]),
                MockEvent::Rollback,
                MockEvent::Detach,
                MockEvent::Destroy,
            ]
        );
        Ok(())
    })
}
