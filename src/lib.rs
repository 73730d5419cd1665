// 機能モジュールと共通モジュール
pub mod features;
pub mod shared;

use chrono::NaiveDate;
use features::analytics;
use features::reminders::{self, LogNotifier};
use features::subscriptions::repository as subscription_repository;
use rusqlite::Connection;
use shared::config::{
    initialize_application, initialize_logging_system, load_environment_variables,
    log_initialization_complete, EnvironmentConfig,
};
use shared::database::initialize_database;
use shared::errors::{AppError, AppResult};
use shared::utils::today_in;
use std::sync::{Mutex, MutexGuard};

/// アプリケーション状態（データベース接続と環境設定を保持）
pub struct AppState {
    pub db: Mutex<Connection>,
    pub config: EnvironmentConfig,
}

impl AppState {
    pub fn new(conn: Connection, config: EnvironmentConfig) -> Self {
        Self {
            db: Mutex::new(conn),
            config,
        }
    }

    /// データベース接続のロックを取得する
    pub fn lock_db(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロックエラー: {e}")))
    }

    /// 状態判定に使う「今日」
    ///
    /// `APP_TODAY` が設定されていればその日付、なければ設定タイムゾーンでの現在日付。
    pub fn today(&self) -> NaiveDate {
        self.config
            .today_override
            .unwrap_or_else(|| today_in(self.config.timezone))
    }
}

/// アプリケーションを1回実行する
///
/// # 処理内容
/// 1. 環境変数とログシステムの初期化
/// 2. 設定の検証
/// 3. データディレクトリとデータベースの初期化
/// 4. リマインダーチェック
/// 5. ダッシュボード集計を標準出力へJSONで出力
pub fn run() -> AppResult<()> {
    // .envファイルはログシステム初期化前に読み込む
    load_environment_variables();

    let config = EnvironmentConfig::from_env()?;
    initialize_logging_system(&config);
    log::info!("アプリケーション初期化を開始します...");

    config.validate()?;

    let init_result = initialize_application(&config)?;
    let conn = initialize_database(&init_result.database_path).map_err(|e| {
        log::error!("データベースの初期化に失敗しました: {e}");
        e
    })?;
    log_initialization_complete(&init_result);

    let state = AppState::new(conn, config);
    let today = state.today();
    log::info!("基準日: {today}");

    let summary = {
        let db = state.lock_db()?;
        let run_summary =
            reminders::run_reminder_check(&db, &LogNotifier, today, state.config.reminder_days)?;
        log::debug!("リマインダー実行結果: {run_summary:?}");

        let subscriptions = subscription_repository::find_all(&db, None)?;
        analytics::dashboard_summary(&subscriptions, today)
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
