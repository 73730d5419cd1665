use super::models::{Payment, RecordPaymentDto, UpdatePaymentDto};
use crate::features::subscriptions::repository as subscription_repository;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::current_timestamp;
use chrono::NaiveDate;
use chrono_tz::Tz;
use rusqlite::{params, Connection, Row};

const SELECT_COLUMNS: &str =
    "SELECT id, subscription_id, amount, paid_on, created_at FROM payments";

/// 支払いを記録する
///
/// # 引数
/// * `conn` - データベース接続
/// * `subscription_id` - 支払い対象のサブスクリプションID
/// * `dto` - 支払い記録用DTO
/// * `tz` - タイムスタンプに使用するタイムゾーン
///
/// # 戻り値
/// 記録された支払い、またはサブスクリプションが存在しない場合は NotFound エラー
pub fn create(
    conn: &Connection,
    subscription_id: i64,
    dto: RecordPaymentDto,
    tz: Tz,
) -> AppResult<Payment> {
    ensure_subscription_exists(conn, subscription_id)?;

    let now = current_timestamp(tz);
    conn.execute(
        "INSERT INTO payments (subscription_id, amount, paid_on, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![subscription_id, dto.amount, dto.paid_on, now],
    )?;

    let id = conn.last_insert_rowid();
    log::info!(
        "支払いを記録しました: id={id}, subscription_id={subscription_id}, paid_on={}",
        dto.paid_on
    );
    find_by_id(conn, id)
}

/// IDで支払いを取得する
pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Payment> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        params![id],
        map_payment_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => {
            AppError::NotFound(format!("ID {id} の支払いが見つかりません"))
        }
        _ => AppError::Database(e.to_string()),
    })
}

/// サブスクリプションの支払い履歴を取得する（支払日の新しい順）
pub fn find_by_subscription(conn: &Connection, subscription_id: i64) -> AppResult<Vec<Payment>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE subscription_id = ?1 ORDER BY paid_on DESC, id DESC"
    ))?;
    let payments = stmt.query_map(params![subscription_id], map_payment_row)?;

    payments
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Database(e.to_string()))
}

/// すべての支払いを取得する
pub fn find_all(conn: &Connection) -> AppResult<Vec<Payment>> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY paid_on DESC, id DESC"))?;
    let payments = stmt.query_map([], map_payment_row)?;

    payments
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Database(e.to_string()))
}

/// 指定月の支払いを取得する
///
/// # 引数
/// * `conn` - データベース接続
/// * `year` - 年
/// * `month` - 月（1始まり）
pub fn find_in_month(conn: &Connection, year: i32, month: u32) -> AppResult<Vec<Payment>> {
    let (first_day, next_first_day) = month_bounds(year, month)?;

    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE paid_on >= ?1 AND paid_on < ?2 ORDER BY paid_on, id"
    ))?;
    let payments = stmt.query_map(params![first_day, next_first_day], map_payment_row)?;

    payments
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Database(e.to_string()))
}

/// 支払いを更新する
///
/// 指定されたフィールドのみを更新し、それ以外は既存の値を維持する。
pub fn update(conn: &Connection, id: i64, dto: UpdatePaymentDto) -> AppResult<Payment> {
    let existing = find_by_id(conn, id)?;

    let amount = dto.amount.unwrap_or(existing.amount);
    let paid_on = dto.paid_on.unwrap_or(existing.paid_on);

    conn.execute(
        "UPDATE payments SET amount = ?1, paid_on = ?2 WHERE id = ?3",
        params![amount, paid_on, id],
    )?;

    find_by_id(conn, id)
}

/// 支払いを削除する
///
/// # 戻り値
/// 削除された支払い（所属するサブスクリプションの再取得に使用）
pub fn delete(conn: &Connection, id: i64) -> AppResult<Payment> {
    let existing = find_by_id(conn, id)?;

    conn.execute("DELETE FROM payments WHERE id = ?1", params![id])?;

    log::info!(
        "支払いを削除しました: id={id}, subscription_id={}",
        existing.subscription_id
    );
    Ok(existing)
}

fn ensure_subscription_exists(conn: &Connection, subscription_id: i64) -> AppResult<()> {
    if !subscription_repository::exists(conn, subscription_id)? {
        return Err(AppError::NotFound(format!(
            "ID {subscription_id} のサブスクリプションが見つかりません"
        )));
    }
    Ok(())
}

/// 指定月の初日と翌月の初日を取得する
fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let first_day = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::validation("月は1から12の間で指定してください"))?;
    let next_first_day = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::validation("年が範囲外です"))?;

    Ok((first_day, next_first_day))
}

fn map_payment_row(row: &Row<'_>) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: row.get(0)?,
        subscription_id: row.get(1)?,
        amount: row.get(2)?,
        paid_on: row.get(3)?,
        created_at: row.get(4)?,
    })
}
