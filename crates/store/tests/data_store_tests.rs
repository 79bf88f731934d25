use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tempfile::tempdir;

use vigil_core::data::entity::{Client, Side, TableKind, Trade};
use vigil_core::data::port::TradeDataStore;
use vigil_store::config::set_root_dir;
use vigil_store::data::SqliteTradeDataStore;

fn trade(id: &str, client: &str, symbol: &str, side: Side, minutes_ago: i64) -> Trade {
    Trade {
        trade_id: id.to_string(),
        order_id: None,
        client_id: client.to_string(),
        symbol: symbol.to_string(),
        side,
        quantity: 10,
        price: Decimal::new(10005, 2), // 100.05
        timestamp: Utc::now() - Duration::minutes(minutes_ago),
    }
}

#[tokio::test]
async fn test_data_store_full_integration() {
    // 1. 初始化临时测试环境
    let tmp_dir = tempdir().expect("Failed to create temp dir");
    set_root_dir(tmp_dir.path().to_path_buf());

    let store = SqliteTradeDataStore::new().await.expect("Failed to create data store");

    // 2. 整表替换写入
    let rows = vec![
        trade("t1", "C1", "AAPL", Side::Buy, 30),
        trade("t2", "C1", "AAPL", Side::Sell, 20),
        trade("t3", "C2", "TSLA", Side::Buy, 10),
    ];
    let written = store.replace_trades(&rows).await.unwrap();
    assert_eq!(written, 3);
    assert_eq!(store.count(TableKind::Trades).await.unwrap(), 3);

    // 3. 读回快照：按时间升序，Decimal 精确还原
    let loaded = store.load_trades().await.unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[0].trade_id, "t1");
    assert_eq!(loaded[0].price, Decimal::new(10005, 2));
    assert_eq!(loaded[1].side, Side::Sell);

    // 4. 再次上传替换整表而非追加
    let written = store
        .replace_trades(&[trade("t9", "C3", "NVDA", Side::Buy, 1)])
        .await
        .unwrap();
    assert_eq!(written, 1);
    assert_eq!(store.count(TableKind::Trades).await.unwrap(), 1);

    // 5. 客户表与活跃标的
    store
        .replace_clients(&[Client {
            client_id: "C3".to_string(),
            client_name: "Carol".to_string(),
            client_type: Some("RETAIL".to_string()),
            risk_rating: None,
            account_status: Some("ACTIVE".to_string()),
            created_date: None,
        }])
        .await
        .unwrap();
    assert_eq!(store.count(TableKind::Clients).await.unwrap(), 1);

    let active = store
        .active_symbols(Utc::now() - Duration::hours(24), 5)
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].symbol, "NVDA");
    assert_eq!(active[0].trade_count, 1);

    // 6. 清空单表与全量清空
    store.clear(TableKind::Trades).await.unwrap();
    assert_eq!(store.count(TableKind::Trades).await.unwrap(), 0);
    assert_eq!(store.count(TableKind::Clients).await.unwrap(), 1);

    store.clear_all().await.unwrap();
    assert_eq!(store.count(TableKind::Clients).await.unwrap(), 0);
}
