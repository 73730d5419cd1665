use super::models::ReminderLogEntry;
use crate::shared::errors::{AppError, AppResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection};

/// 指定の期日に対するリマインダーが送信済みか確認する
pub fn is_logged(conn: &Connection, subscription_id: i64, due_date: NaiveDate) -> AppResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reminder_log WHERE subscription_id = ?1 AND due_date = ?2",
        params![subscription_id, due_date],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// リマインダーの送信を記録する
///
/// # 戻り値
/// 新しく記録した場合はtrue、同じ期日の記録が既にあった場合はfalse
pub fn record(
    conn: &Connection,
    subscription_id: i64,
    due_date: NaiveDate,
    notified_on: NaiveDate,
) -> AppResult<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO reminder_log (subscription_id, due_date, notified_on)
         VALUES (?1, ?2, ?3)",
        params![subscription_id, due_date, notified_on],
    )?;
    Ok(inserted > 0)
}

/// サブスクリプションのリマインダー送信履歴を取得する（期日の新しい順）
pub fn find_by_subscription(
    conn: &Connection,
    subscription_id: i64,
) -> AppResult<Vec<ReminderLogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, subscription_id, due_date, notified_on
         FROM reminder_log
         WHERE subscription_id = ?1
         ORDER BY due_date DESC",
    )?;

    let entries = stmt.query_map(params![subscription_id], |row| {
        Ok(ReminderLogEntry {
            id: row.get(0)?,
            subscription_id: row.get(1)?,
            due_date: row.get(2)?,
            notified_on: row.get(3)?,
        })
    })?;

    entries
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Database(e.to_string()))
}
