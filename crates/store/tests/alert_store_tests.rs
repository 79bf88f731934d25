use tempfile::tempdir;

use vigil_core::alert::entity::{AlertFilter, AlertStatus, Severity};
use vigil_core::alert::port::AlertStore;
use vigil_core::detect::entity::AlertDraft;
use vigil_core::rules::entity::RuleName;
use vigil_store::alert::SqliteAlertStore;
use vigil_store::config::set_root_dir;

fn draft(rule: RuleName, severity: Severity, client: &str, symbol: &str, desc: &str) -> AlertDraft {
    AlertDraft {
        rule_name: rule,
        severity,
        description: desc.to_string(),
        client_id: Some(client.to_string()),
        symbol: Some(symbol.to_string()),
        data_json: Some(serde_json::json!({ "trade_pairs": 4 })),
        fingerprint: AlertDraft::fingerprint_for(rule, client, symbol),
    }
}

#[tokio::test]
async fn test_alert_store_full_integration() {
    // 1. 初始化临时测试环境
    let tmp_dir = tempdir().expect("Failed to create temp dir");
    set_root_dir(tmp_dir.path().to_path_buf());

    let store = SqliteAlertStore::new().await.expect("Failed to create alert store");

    // 2. 空库查询返回空列表而非错误
    let empty = store.list(&AlertFilter::default()).await.unwrap();
    assert!(empty.is_empty());
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_alerts, 0);

    // 3. 整批插入
    let drafts = vec![
        draft(
            RuleName::SelfTrade,
            Severity::High,
            "C1",
            "AAPL",
            "Client C1 executed 8 offsetting trades in AAPL within 24 hours",
        ),
        draft(
            RuleName::WashTrade,
            Severity::Medium,
            "C2",
            "TSLA",
            "Wash trade pattern for client C2 in TSLA",
        ),
    ];
    let inserted = store.insert_batch(&drafts).await.unwrap();
    assert_eq!(inserted, 2);

    // 4. 指纹去重：重复插入同一批草稿不产生新告警
    let inserted_again = store.insert_batch(&drafts).await.unwrap();
    assert_eq!(inserted_again, 0);
    assert_eq!(store.stats().await.unwrap().total_alerts, 2);

    // 5. 大小写不敏感子串搜索
    let hits = store
        .list(&AlertFilter {
            search: Some("wash".to_string()),
            ..AlertFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].rule_name, RuleName::WashTrade);

    let hits = store
        .list(&AlertFilter {
            search: Some("AAPL".to_string()),
            ..AlertFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].symbol.as_deref(), Some("AAPL"));

    let misses = store
        .list(&AlertFilter {
            search: Some("MSFT".to_string()),
            ..AlertFilter::default()
        })
        .await
        .unwrap();
    assert!(misses.is_empty());

    // 6. 状态迁移只改 status，其余字段逐位不变
    let target = &hits[0];
    let before = store.get(&target.alert_id).await.unwrap();
    let updated = store
        .set_status(&target.alert_id, AlertStatus::FalsePositive)
        .await
        .unwrap();
    assert_eq!(updated.status, AlertStatus::FalsePositive);
    assert_eq!(updated.alert_id, before.alert_id);
    assert_eq!(updated.rule_name, before.rule_name);
    assert_eq!(updated.severity, before.severity);
    assert_eq!(updated.description, before.description);
    assert_eq!(updated.client_id, before.client_id);
    assert_eq!(updated.symbol, before.symbol);
    assert_eq!(updated.data_json, before.data_json);
    assert_eq!(updated.created_at, before.created_at);

    // 7. 状态过滤：FALSE_POSITIVE 命中，OPEN 不再命中
    let fp = store
        .list(&AlertFilter {
            status: Some(AlertStatus::FalsePositive),
            ..AlertFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(fp.len(), 1);
    assert_eq!(fp[0].alert_id, target.alert_id);

    let open = store
        .list(&AlertFilter {
            status: Some(AlertStatus::Open),
            ..AlertFilter::default()
        })
        .await
        .unwrap();
    assert!(open.iter().all(|a| a.alert_id != target.alert_id));

    // 8. 未知 ID 迁移返回 NotFound
    let err = store
        .set_status("no-such-alert", AlertStatus::Closed)
        .await
        .unwrap_err();
    assert!(matches!(err, vigil_core::store::error::StoreError::NotFound));

    // 9. 聚合统计
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_alerts, 2);
    assert_eq!(stats.high_alerts, 1);
    assert_eq!(stats.medium_alerts, 1);
    assert_eq!(stats.alerts_today, 2);
    assert_eq!(stats.open_alerts, 1);
    assert_eq!(stats.false_positive_alerts, 1);
    assert_eq!(stats.open_high_alerts, 1);

    // 10. 清空
    store.clear().await.unwrap();
    assert_eq!(store.stats().await.unwrap().total_alerts, 0);
}
