use crate::shared::errors::AppResult;
use rusqlite::Connection;
use std::path::Path;

/// データベース接続を初期化し、テーブルを作成する
///
/// # 引数
/// * `database_path` - データベースファイルのパス
///
/// # 戻り値
/// データベース接続、または失敗時はエラー
///
/// # 処理内容
/// 1. データベース接続の開設（ファイルが存在しない場合は自動作成）
/// 2. 外部キー制約の有効化
/// 3. テーブル作成とマイグレーションの実行
pub fn initialize_database(database_path: &Path) -> AppResult<Connection> {
    let conn = Connection::open(database_path)?;
    prepare_connection(&conn)?;

    log::info!("データベースを初期化しました: {database_path:?}");

    Ok(conn)
}

/// インメモリデータベースを初期化する（テスト・一時利用向け）
pub fn open_in_memory() -> AppResult<Connection> {
    let conn = Connection::open_in_memory()?;
    prepare_connection(&conn)?;
    Ok(conn)
}

fn prepare_connection(conn: &Connection) -> AppResult<()> {
    // 支払い・リマインダー記録のカスケード削除に必要
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    create_tables(conn)
}

/// データベーステーブルを作成する
///
/// 何度呼び出しても安全（既存のテーブルは変更しない）。
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    create_subscriptions_table(conn)?;
    create_payments_table(conn)?;
    create_budgets_table(conn)?;
    create_reminder_log_table(conn)?;
    migrate_existing_tables(conn)?;
    Ok(())
}

/// サブスクリプションテーブルを作成する
///
/// billing_cycle にはCHECK制約を付けない。未知の値は読み込み時に
/// 月額扱いとなり、書き込み時のバリデーションで弾く。
fn create_subscriptions_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS subscriptions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            price REAL NOT NULL CHECK(price >= 0),
            billing_cycle TEXT NOT NULL,
            start_date TEXT NOT NULL,
            category TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_subscriptions_category ON subscriptions(category)",
        [],
    )?;

    Ok(())
}

/// 支払い履歴テーブルを作成する
fn create_payments_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS payments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            subscription_id INTEGER NOT NULL
                REFERENCES subscriptions(id) ON DELETE CASCADE,
            amount REAL NOT NULL CHECK(amount >= 0),
            paid_on TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_payments_subscription ON payments(subscription_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_payments_paid_on ON payments(paid_on)",
        [],
    )?;

    Ok(())
}

/// 予算テーブルを作成する
///
/// category がNULLの行は全体予算を表す。
fn create_budgets_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS budgets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT,
            monthly_limit REAL NOT NULL CHECK(monthly_limit >= 0),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// リマインダー送信記録テーブルを作成する
fn create_reminder_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS reminder_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            subscription_id INTEGER NOT NULL
                REFERENCES subscriptions(id) ON DELETE CASCADE,
            due_date TEXT NOT NULL,
            notified_on TEXT NOT NULL,
            UNIQUE(subscription_id, due_date)
        )",
        [],
    )?;

    Ok(())
}

/// 既存テーブルのマイグレーションを実行する
///
/// 古いスキーマでは料金カラムが amount という名前だった。
fn migrate_existing_tables(conn: &Connection) -> AppResult<()> {
    if check_column_exists(conn, "subscriptions", "amount")
        && !check_column_exists(conn, "subscriptions", "price")
    {
        log::info!("subscriptions.amount カラムを price に改名します...");
        conn.execute(
            "ALTER TABLE subscriptions RENAME COLUMN amount TO price",
            [],
        )?;
    }

    Ok(())
}

/// テーブルに指定されたカラムが存在するかチェックする
///
/// # 引数
/// * `conn` - データベース接続
/// * `table_name` - テーブル名
/// * `column_name` - カラム名
///
/// # 戻り値
/// カラムが存在する場合はtrue、存在しないかエラーの場合はfalse
pub fn check_column_exists(conn: &Connection, table_name: &str, column_name: &str) -> bool {
    let query = format!("PRAGMA table_info({table_name})");

    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };

    let Ok(rows) = stmt.query_map([], |row| row.get::<_, String>(1)) else {
        return false;
    };

    let exists = rows.flatten().any(|col_name| col_name == column_name);
    exists
}
