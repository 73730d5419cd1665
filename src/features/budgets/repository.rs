use super::models::Budget;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::current_timestamp;
use chrono_tz::Tz;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SELECT_COLUMNS: &str =
    "SELECT id, category, monthly_limit, created_at, updated_at FROM budgets";

/// 予算を設定する（同じ対象の予算があれば上書き）
///
/// # 引数
/// * `conn` - データベース接続
/// * `category` - 対象カテゴリ（Noneの場合は全体予算）
/// * `monthly_limit` - 月額上限
/// * `tz` - タイムスタンプに使用するタイムゾーン
///
/// # 戻り値
/// 設定された予算
pub fn upsert(
    conn: &Connection,
    category: Option<&str>,
    monthly_limit: f64,
    tz: Tz,
) -> AppResult<Budget> {
    let now = current_timestamp(tz);

    let id = match find_by_category(conn, category)? {
        Some(existing) => {
            conn.execute(
                "UPDATE budgets SET monthly_limit = ?1, updated_at = ?2 WHERE id = ?3",
                params![monthly_limit, now, existing.id],
            )?;
            existing.id
        }
        None => {
            conn.execute(
                "INSERT INTO budgets (category, monthly_limit, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![category, monthly_limit, now, now],
            )?;
            conn.last_insert_rowid()
        }
    };

    log::info!(
        "予算を設定しました: category={}, monthly_limit={monthly_limit}",
        category.unwrap_or("(全体)")
    );
    find_by_id(conn, id)
}

/// IDで予算を取得する
pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Budget> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        params![id],
        map_budget_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => {
            AppError::NotFound(format!("ID {id} の予算が見つかりません"))
        }
        _ => AppError::Database(e.to_string()),
    })
}

/// 対象カテゴリの予算を取得する（Noneは全体予算）
pub fn find_by_category(conn: &Connection, category: Option<&str>) -> AppResult<Option<Budget>> {
    // IS 演算子はNULL同士も等しいとみなす
    let budget = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE category IS ?1"),
            params![category],
            map_budget_row,
        )
        .optional()?;
    Ok(budget)
}

/// すべての予算を取得する（全体予算が先頭、以降はカテゴリ名順）
pub fn find_all(conn: &Connection) -> AppResult<Vec<Budget>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} ORDER BY category IS NOT NULL, category"
    ))?;
    let budgets = stmt.query_map([], map_budget_row)?;

    budgets
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Database(e.to_string()))
}

/// 予算を削除する
pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    let rows_affected = conn.execute("DELETE FROM budgets WHERE id = ?1", params![id])?;

    if rows_affected == 0 {
        return Err(AppError::NotFound(format!("ID {id} の予算が見つかりません")));
    }

    Ok(())
}

fn map_budget_row(row: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        category: row.get(1)?,
        monthly_limit: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
