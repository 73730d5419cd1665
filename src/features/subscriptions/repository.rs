use super::models::{CreateSubscriptionDto, Subscription, UpdateSubscriptionDto};
use crate::features::payments::models::Payment;
use crate::features::payments::repository as payment_repository;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{current_timestamp, normalize_string};
use chrono_tz::Tz;
use rusqlite::{params, Connection, Row};
use std::collections::HashMap;

const SELECT_COLUMNS: &str =
    "SELECT id, name, price, billing_cycle, start_date, category, created_at, updated_at
     FROM subscriptions";

/// サブスクリプションを作成する
///
/// # 引数
/// * `conn` - データベース接続
/// * `dto` - サブスクリプション作成用DTO
/// * `tz` - タイムスタンプに使用するタイムゾーン
///
/// # 戻り値
/// 作成されたサブスクリプション（支払い履歴は空）、または失敗時はエラー
pub fn create(conn: &Connection, dto: CreateSubscriptionDto, tz: Tz) -> AppResult<Subscription> {
    let now = current_timestamp(tz);

    conn.execute(
        "INSERT INTO subscriptions (name, price, billing_cycle, start_date, category, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            normalize_string(&dto.name),
            dto.price,
            dto.billing_cycle,
            dto.start_date,
            normalize_string(&dto.category),
            now,
            now
        ],
    )?;

    let id = conn.last_insert_rowid();
    log::info!("サブスクリプションを作成しました: id={id}");
    find_by_id(conn, id)
}

/// IDでサブスクリプションを取得する（支払い履歴を含む）
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - サブスクリプションID
///
/// # 戻り値
/// サブスクリプション、または存在しない場合は NotFound エラー
pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Subscription> {
    let mut subscription = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            map_subscription_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                AppError::NotFound(format!("ID {id} のサブスクリプションが見つかりません"))
            }
            _ => AppError::Database(e.to_string()),
        })?;

    subscription.payments = payment_repository::find_by_subscription(conn, id)?;
    Ok(subscription)
}

/// サブスクリプション一覧を取得する（名前順、支払い履歴を含む）
///
/// # 引数
/// * `conn` - データベース接続
/// * `category` - カテゴリフィルター（オプション）
///
/// # 戻り値
/// サブスクリプションのリスト、または失敗時はエラー
pub fn find_all(conn: &Connection, category: Option<&str>) -> AppResult<Vec<Subscription>> {
    let mut subscriptions = match category {
        Some(category) => {
            let mut stmt =
                conn.prepare(&format!("{SELECT_COLUMNS} WHERE category = ?1 ORDER BY name"))?;
            let rows = stmt.query_map(params![category], map_subscription_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY name"))?;
            let rows = stmt.query_map([], map_subscription_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        }
    };

    let mut payments_by_subscription: HashMap<i64, Vec<Payment>> = HashMap::new();
    for payment in payment_repository::find_all(conn)? {
        payments_by_subscription
            .entry(payment.subscription_id)
            .or_default()
            .push(payment);
    }

    for subscription in &mut subscriptions {
        subscription.payments = payments_by_subscription
            .remove(&subscription.id)
            .unwrap_or_default();
    }

    Ok(subscriptions)
}

/// サブスクリプションを更新する
///
/// 指定されたフィールドのみを更新し、それ以外は既存の値を維持する。
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - サブスクリプションID
/// * `dto` - サブスクリプション更新用DTO
/// * `tz` - タイムスタンプに使用するタイムゾーン
///
/// # 戻り値
/// 更新されたサブスクリプション、または失敗時はエラー
pub fn update(
    conn: &Connection,
    id: i64,
    dto: UpdateSubscriptionDto,
    tz: Tz,
) -> AppResult<Subscription> {
    let now = current_timestamp(tz);

    let existing = find_by_id(conn, id)?;

    let name = dto.name.map(|n| normalize_string(&n)).unwrap_or(existing.name);
    let price = dto.price.unwrap_or(existing.price);
    let billing_cycle = dto.billing_cycle.unwrap_or(existing.billing_cycle);
    let start_date = dto.start_date.unwrap_or(existing.start_date);
    let category = dto
        .category
        .map(|c| normalize_string(&c))
        .unwrap_or(existing.category);

    if start_date != existing.start_date {
        log::warn!(
            "サブスクリプションの開始日（請求の起点）が変更されます: id={id}, {} -> {start_date}",
            existing.start_date
        );
    }

    conn.execute(
        "UPDATE subscriptions
         SET name = ?1, price = ?2, billing_cycle = ?3, start_date = ?4, category = ?5, updated_at = ?6
         WHERE id = ?7",
        params![name, price, billing_cycle, start_date, category, now, id],
    )?;

    find_by_id(conn, id)
}

/// サブスクリプションを削除する
///
/// 支払い履歴とリマインダー送信記録は外部キー制約によって同時に削除される。
///
/// # 引数
/// * `conn` - データベース接続
/// * `id` - サブスクリプションID
///
/// # 戻り値
/// 成功時はOk(())、存在しない場合は NotFound エラー
pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    let rows_affected = conn.execute("DELETE FROM subscriptions WHERE id = ?1", params![id])?;

    if rows_affected == 0 {
        return Err(AppError::NotFound(format!(
            "ID {id} のサブスクリプションが見つかりません"
        )));
    }

    log::info!("サブスクリプションを削除しました: id={id}");
    Ok(())
}

/// サブスクリプションが存在するかどうかを確認する
pub fn exists(conn: &Connection, id: i64) -> AppResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM subscriptions WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn map_subscription_row(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        billing_cycle: row.get(3)?,
        start_date: row.get(4)?,
        category: row.get(5)?,
        payments: Vec::new(),
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
