use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;

use vigil_api::server::{AppState, build_router};
use vigil_core::alert::policy::PermissivePolicy;
use vigil_engine::factory::default_detectors;
use vigil_manager::detection::DetectionManager;
use vigil_manager::review::ReviewService;
use vigil_store::alert::SqliteAlertStore;
use vigil_store::data::SqliteTradeDataStore;
use vigil_store::rules::MemoryRuleStore;

// 帮助函数：在随机端口启动测试服务器
async fn spawn_test_server() -> (String, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    vigil_store::config::set_root_dir(tmp_dir.path().to_path_buf());

    let rule_store = Arc::new(MemoryRuleStore::new());
    let data_store = Arc::new(SqliteTradeDataStore::new().await.unwrap());
    let alert_store = Arc::new(SqliteAlertStore::new().await.unwrap());

    let detection = DetectionManager::new(
        rule_store.clone(),
        data_store.clone(),
        alert_store.clone(),
        default_detectors(),
    );
    let review = ReviewService::new(alert_store, data_store, Arc::new(PermissivePolicy));

    let state = AppState {
        detection,
        review,
        rules: rule_store,
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let addr = format!("http://127.0.0.1:{}", port);

    let app = build_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // 稍微等待服务器启动
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    (addr, tmp_dir)
}

// 同一客户在 AAPL 上的 2 买 2 卖，触发自成交规则
fn self_trade_csv() -> String {
    let now = Utc::now();
    let mut csv = String::from("trade_id,order_id,client_id,symbol,side,quantity,price,timestamp\n");
    for (i, side) in ["BUY", "SELL", "BUY", "SELL"].iter().enumerate() {
        let ts = now - Duration::minutes(60 - (i as i64) * 10);
        csv.push_str(&format!(
            "T{i},,C1,AAPL,{side},10,100.05,{}\n",
            ts.to_rfc3339()
        ));
    }
    csv
}

async fn upload_csv(
    client: &reqwest::Client,
    addr: &str,
    file_name: &str,
    table_type: &str,
    body: String,
) -> reqwest::Response {
    let form = reqwest::multipart::Form::new()
        .part(
            "file",
            reqwest::multipart::Part::text(body).file_name(file_name.to_string()),
        )
        .text("table_type", table_type.to_string());
    client
        .post(format!("{addr}/api/v1/data/upload/csv"))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_api_workflow() {
    let (addr, _tmp_dir) = spawn_test_server().await;
    let client = reqwest::Client::new();

    // 1. 健康检查
    let resp = client
        .get(format!("{addr}/api/v1/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "ok");

    // 2. 上传 trades CSV：整表替换并联动检测
    let resp = upload_csv(&client, &addr, "trades.csv", "trades", self_trade_csv()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["records_uploaded"], 4);
    assert_eq!(body["data"]["table_type"], "trades");
    assert_eq!(body["data"]["new_alerts_generated"], 1);

    // 非 CSV 文件名与非法表类型被拒绝
    let resp = upload_csv(&client, &addr, "trades.xlsx", "trades", self_trade_csv()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let resp = upload_csv(&client, &addr, "trades.csv", "alerts", self_trade_csv()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 3. 检测状态可轮询，最近一轮已完成
    let body: Value = client
        .get(format!("{addr}/api/v1/data/run-status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["state"], "completed");

    // 4. 告警列表与过滤
    let body: Value = client
        .get(format!("{addr}/api/v1/alerts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let alerts = body["data"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["rule_name"], "self_trade");
    assert_eq!(alerts[0]["status"], "OPEN");
    let alert_id = alerts[0]["alert_id"].as_str().unwrap().to_string();

    // 大小写不敏感的子串搜索
    let body: Value = client
        .get(format!("{addr}/api/v1/alerts?search=aapl"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let body: Value = client
        .get(format!("{addr}/api/v1/alerts?search=msft"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());

    // 非法过滤条件整体拒绝
    let resp = client
        .get(format!("{addr}/api/v1/alerts?severity=EXTREME"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // 5. 状态迁移
    let resp = client
        .put(format!(
            "{addr}/api/v1/alerts/{alert_id}/status?status=IN_REVIEW"
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], "IN_REVIEW");
    // 除 status 外其余字段保持不变
    assert_eq!(body["data"]["alert_id"].as_str().unwrap(), alert_id);
    assert_eq!(body["data"]["rule_name"], "self_trade");

    let resp = client
        .put(format!(
            "{addr}/api/v1/alerts/{alert_id}/status?status=ARCHIVED"
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .put(format!("{addr}/api/v1/alerts/missing/status?status=CLOSED"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);

    // 6. 告警统计
    let body: Value = client
        .get(format!("{addr}/api/v1/alerts/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["total_alerts"], 1);
    assert_eq!(body["data"]["in_review_alerts"], 1);

    // 7. 规则配置：列表、校验后更新、越界拒绝、开关与重置
    let body: Value = client
        .get(format!("{addr}/api/v1/rules"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"][0]["rule_name"], "self_trade");

    let resp = client
        .put(format!("{addr}/api/v1/rules/self_trade/params"))
        .json(&serde_json::json!({"params": {"min_trade_pairs": 6}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["params"]["min_trade_pairs"], 6);

    // 越界写入被拒绝，已存值保持不变
    let resp = client
        .put(format!("{addr}/api/v1/rules/self_trade/params"))
        .json(&serde_json::json!({"params": {"min_trade_pairs": 999}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = client
        .get(format!("{addr}/api/v1/rules/self_trade"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["params"]["min_trade_pairs"], 6);

    // 未识别的规则族返回 404
    let resp = client
        .get(format!("{addr}/api/v1/rules/insider_trading"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .put(format!("{addr}/api/v1/rules/self_trade/enabled"))
        .json(&serde_json::json!({"enabled": false}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["enabled"], false);

    let resp = client
        .post(format!("{addr}/api/v1/rules/reset"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = client
        .get(format!("{addr}/api/v1/rules/self_trade"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["enabled"], true);
    assert_eq!(body["data"]["params"]["min_trade_pairs"], 4);

    // 8. 表信息与看板
    let body: Value = client
        .get(format!("{addr}/api/v1/data/tables/info"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["trades"]["record_count"], 4);
    assert_eq!(body["data"]["alerts"]["record_count"], 1);

    let body: Value = client
        .get(format!("{addr}/api/v1/dashboard/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["total_alerts"], 1);
    assert_eq!(body["data"]["total_trades"], 4);

    // 1 条未决告警 / 4 笔成交：扣减后截断到 0 分 / HIGH
    let body: Value = client
        .get(format!("{addr}/api/v1/dashboard/compliance-score"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["compliance_score"], 0.0);
    assert_eq!(body["data"]["risk_level"], "HIGH");
    assert_eq!(body["data"]["open_alerts"], 1);

    let body: Value = client
        .get(format!("{addr}/api/v1/dashboard/recent-activity"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["recent_alerts"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["active_symbols"][0]["symbol"], "AAPL");

    // 9. 清空指定表与清空全部
    let resp = client
        .delete(format!("{addr}/api/v1/data/clear?table_type=trades"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = client
        .get(format!("{addr}/api/v1/data/tables/info"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["trades"]["record_count"], 0);
    assert_eq!(body["data"]["alerts"]["record_count"], 1);

    let resp = client
        .delete(format!("{addr}/api/v1/data/clear-all"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = client
        .get(format!("{addr}/api/v1/data/tables/info"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["alerts"]["record_count"], 0);

    // 清空后评分回到满分基线
    let body: Value = client
        .get(format!("{addr}/api/v1/dashboard/compliance-score"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["compliance_score"], 100.0);
    assert_eq!(body["data"]["risk_level"], "LOW");
}
