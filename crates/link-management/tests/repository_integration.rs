//! 仓储与服务集成测试
//!
//! 需要 PostgreSQL，测试开始前自动执行迁移：
//!
//! ```bash
//! TEST_DATABASE_URL=postgres://... cargo test -p link-management --test repository_integration -- --ignored
//! ```

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use sqlx::PgPool;

use link_management::LinkError;
use link_management::links::{CaseSensitivity, encode_key};
use link_management::models::TestCompletionCursor;
use link_management::repository::{
    CustomerRepository, EventRepository, LinkRepository, ProgramRepository, UserRepository,
};
use link_management::service::{CustomerActivityService, GetProgramOptions, ProgramService};
use linkhub_shared::database::Database;
use linkhub_shared::test_utils::{test_database_config, test_id};

// ==================== 辅助函数 ====================

async fn connect() -> PgPool {
    let db = Database::connect(&test_database_config()).await.unwrap();
    db.run_migrations().await.unwrap();
    db.pool().clone()
}

async fn cleanup(pool: &PgPool, workspace_id: &str) {
    sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(workspace_id)
        .execute(pool)
        .await
        .unwrap();
}

async fn seed_workspace(pool: &PgPool, workspace_id: &str) {
    cleanup(pool, workspace_id).await;
    sqlx::query("INSERT INTO projects (id, name, slug) VALUES ($1, $2, $1)")
        .bind(workspace_id)
        .bind("Integration Workspace")
        .execute(pool)
        .await
        .unwrap();
}

async fn seed_link(pool: &PgPool, workspace_id: &str, id: &str, domain: &str, key: &str) {
    sqlx::query(
        r#"
        INSERT INTO links (id, domain, key, url, short_link, project_id)
        VALUES ($1, $2, $3, 'https://example.com', 'https://' || $2 || '/' || $3, $4)
        "#,
    )
    .bind(id)
    .bind(domain)
    .bind(key)
    .bind(workspace_id)
    .execute(pool)
    .await
    .unwrap();
}

// ==================== 测试 ====================

/// 客户活动：LTV、首条链接解码与事件排序
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_customer_activity_end_to_end() {
    let pool = connect().await;
    let ws = "ws_integ_activity";
    seed_workspace(&pool, ws).await;

    let encoded = encode_key("Summer");
    seed_link(&pool, ws, "link_integ_first", "lnkh.ub", &encoded).await;
    seed_link(&pool, ws, "link_integ_second", "example.link", "winter").await;

    let created_at = Utc::now() - Duration::days(3);
    sqlx::query(
        r#"
        INSERT INTO customers (id, name, email, project_id, clicked_at, created_at)
        VALUES ('cus_integ_1', 'Ada', 'ada@example.com', $1, $2, $3)
        "#,
    )
    .bind(ws)
    .bind(created_at - Duration::minutes(2))
    .bind(created_at)
    .execute(&pool)
    .await
    .unwrap();

    let events = [
        ("evt_integ_1", "click", created_at - Duration::minutes(2), "link_integ_first", None),
        ("evt_integ_2", "lead", created_at, "link_integ_second", None),
        ("evt_integ_3", "sale", created_at + Duration::hours(1), "link_integ_second", Some(2500i64)),
        ("evt_integ_4", "sale", created_at + Duration::hours(5), "link_integ_second", Some(1500i64)),
    ];
    for (id, kind, at, link_id, amount) in events {
        sqlx::query(
            r#"
            INSERT INTO events (id, event, timestamp, workspace_id, link_id, customer_id, sale_amount)
            VALUES ($1, $2, $3, $4, $5, 'cus_integ_1', $6)
            "#,
        )
        .bind(id)
        .bind(kind)
        .bind(at)
        .bind(ws)
        .bind(link_id)
        .bind(amount)
        .execute(&pool)
        .await
        .unwrap();
    }

    let service = CustomerActivityService::new(
        Arc::new(CustomerRepository::new(pool.clone())),
        Arc::new(EventRepository::new(pool.clone())),
        Arc::new(LinkRepository::new(pool.clone())),
        CaseSensitivity::new(["lnkh.ub"]),
        100,
    );

    let activity = service.get_customer_activity(ws, "cus_integ_1").await.unwrap();
    assert_eq!(activity.ltv, 4000);
    assert_eq!(activity.time_to_lead, Some(120_000));
    assert_eq!(activity.time_to_sale, Some(3_600_000));
    assert_eq!(activity.events[0].id, "evt_integ_4");

    let link = activity.link.unwrap();
    assert_eq!(link.key, "Summer");
    assert_eq!(link.short_link, "https://lnkh.ub/Summer");

    // 其它工作区看不到该客户
    let err = service
        .get_customer_activity("ws_integ_other", "cus_integ_1")
        .await
        .unwrap_err();
    assert!(matches!(err, LinkError::CustomerNotFound(_)));

    cleanup(&pool, ws).await;
}

/// Program 查询：折扣顺序与默认奖励
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_program_with_relations() {
    let pool = connect().await;
    let ws = "ws_integ_program";
    seed_workspace(&pool, ws).await;

    sqlx::query(
        r#"
        INSERT INTO programs (id, workspace_id, name, slug, default_reward_id)
        VALUES ('prog_integ_1', $1, 'Integration Program', 'integ-program', 'rew_integ_1')
        "#,
    )
    .bind(ws)
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        r#"
        INSERT INTO rewards (id, program_id, event, type, amount)
        VALUES ('rew_integ_1', 'prog_integ_1', 'sale', 'percentage', 30)
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();
    for (id, age) in [("disc_integ_new", 1), ("disc_integ_old", 5)] {
        sqlx::query(
            r#"
            INSERT INTO discounts (id, program_id, amount, created_at)
            VALUES ($1, 'prog_integ_1', 10, NOW() - make_interval(days => $2))
            "#,
        )
        .bind(id)
        .bind(age)
        .execute(&pool)
        .await
        .unwrap();
    }

    let service = ProgramService::new(Arc::new(ProgramRepository::new(pool.clone())));
    let program = service
        .get_program_or_throw(
            ws,
            "prog_integ_1",
            GetProgramOptions {
                include_discounts: true,
                include_default_reward: true,
            },
        )
        .await
        .unwrap();

    let discounts = program.discounts.unwrap();
    assert_eq!(discounts[0].id, "disc_integ_old");
    assert_eq!(program.rewards.unwrap()[0].amount, 30);

    cleanup(&pool, ws).await;
}

/// A/B 测试线索统计与 URL 更新
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_lead_counts_and_url_update() {
    let pool = connect().await;
    let ws = "ws_integ_ab";
    seed_workspace(&pool, ws).await;
    seed_link(&pool, ws, "link_integ_ab", "example.link", "ab-test").await;

    let now = Utc::now();
    sqlx::query(
        r#"
        UPDATE links
        SET test_variants = $2, test_started_at = $3, test_completed_at = $4
        WHERE id = $1
        "#,
    )
    .bind("link_integ_ab")
    .bind(json!([
        {"url": "https://a.example.com", "percentage": 50},
        {"url": "https://b.example.com", "percentage": 50}
    ]))
    .bind(now - Duration::days(7))
    .bind(now - Duration::seconds(10))
    .execute(&pool)
    .await
    .unwrap();

    for (i, url) in ["https://a.example.com", "https://b.example.com", "https://b.example.com"]
        .iter()
        .enumerate()
    {
        sqlx::query(
            r#"
            INSERT INTO events (id, event, timestamp, workspace_id, link_id, url)
            VALUES ($1, 'lead', $2, $3, 'link_integ_ab', $4)
            "#,
        )
        .bind(format!("evt_integ_ab_{}", i))
        .bind(now - Duration::days(1))
        .bind(ws)
        .bind(url)
        .execute(&pool)
        .await
        .unwrap();
    }

    let events = EventRepository::new(pool.clone());
    let mut counts = events
        .count_leads_by_url("link_integ_ab", now - Duration::days(7), now)
        .await
        .unwrap();
    counts.sort_by(|a, b| a.url.cmp(&b.url));
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[1].count, 2);

    let links = LinkRepository::new(pool.clone());
    let completed = links
        .list_completed_tests(&TestCompletionCursor::after(now - Duration::minutes(1)), now, 10)
        .await
        .unwrap();
    assert!(completed.iter().any(|l| l.id == "link_integ_ab"));

    let updated = links
        .update_url("link_integ_ab", "https://b.example.com")
        .await
        .unwrap();
    assert_eq!(updated.url, "https://b.example.com");

    cleanup(&pool, ws).await;
}

/// 同一时刻结束的测试多于批大小时按 id 翻页，不遗漏
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_completed_tests_page_by_id_within_same_instant() {
    let pool = connect().await;
    let ws = "ws_integ_ab_page";
    seed_workspace(&pool, ws).await;

    let ends_at = Utc.with_ymd_and_hms(2001, 2, 3, 4, 5, 6).unwrap();
    for id in ["link_page_3", "link_page_1", "link_page_2"] {
        seed_link(&pool, ws, id, "example.link", id).await;
        sqlx::query(
            "UPDATE links SET test_variants = '[]'::jsonb, test_completed_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(ends_at)
        .execute(&pool)
        .await
        .unwrap();
    }

    let links = LinkRepository::new(pool.clone());
    let first = links
        .list_completed_tests(&TestCompletionCursor::after(ends_at - Duration::seconds(1)), ends_at, 2)
        .await
        .unwrap();
    let first_ids: Vec<&str> = first.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(first_ids, vec!["link_page_1", "link_page_2"]);

    let second = links
        .list_completed_tests(&TestCompletionCursor::after_link(ends_at, "link_page_2"), ends_at, 2)
        .await
        .unwrap();
    let second_ids: Vec<&str> = second.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(second_ids, vec!["link_page_3"]);

    let drained = links
        .list_completed_tests(&TestCompletionCursor::after(ends_at), ends_at, 2)
        .await
        .unwrap();
    assert!(drained.is_empty());

    cleanup(&pool, ws).await;
}

/// 默认合作伙伴：users.default_partner_id 优先，其次最早的 partner_users 记录
#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_default_partner_resolution() {
    let pool = connect().await;
    let with_default = test_id("usr");
    let without_default = test_id("usr");

    sqlx::query(
        r#"
        INSERT INTO users (id, email, default_partner_id) VALUES
            ($1, $1 || '@example.com', 'pn_default'),
            ($2, $2 || '@example.com', NULL)
        "#,
    )
    .bind(&with_default)
    .bind(&without_default)
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        r#"
        INSERT INTO partner_users (user_id, partner_id, created_at) VALUES
            ($1, 'pn_later', NOW()),
            ($1, 'pn_first', NOW() - INTERVAL '1 day')
        "#,
    )
    .bind(&without_default)
    .execute(&pool)
    .await
    .unwrap();

    let users = UserRepository::new(pool.clone());
    assert_eq!(
        users.find_default_partner_id(&with_default).await.unwrap().as_deref(),
        Some("pn_default")
    );
    assert_eq!(
        users.find_default_partner_id(&without_default).await.unwrap().as_deref(),
        Some("pn_first")
    );
    assert_eq!(users.find_default_partner_id("usr_missing").await.unwrap(), None);

    sqlx::query("DELETE FROM users WHERE id IN ($1, $2)")
        .bind(&with_default)
        .bind(&without_default)
        .execute(&pool)
        .await
        .unwrap();
}
