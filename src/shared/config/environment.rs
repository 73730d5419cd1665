use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::parse_date;
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::path::PathBuf;

/// リマインダー日数のデフォルト値（支払い期日の何日前に通知するか）
pub const DEFAULT_REMINDER_DAYS: u32 = 3;

/// リマインダー日数の上限
const MAX_REMINDER_DAYS: u32 = 365;

/// アプリケーションデータディレクトリ名
const APP_DIR_NAME: &str = "subscription-tracker";

/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

/// 環境設定を管理する構造体
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// 実行環境
    pub environment: String,
    /// デバッグモードの有効/無効
    pub debug_mode: bool,
    /// ログレベル
    pub log_level: String,
    /// 支払い期日の何日前にリマインダーを送るか
    pub reminder_days: u32,
    /// 「今日」の判定とタイムスタンプに使用するタイムゾーン
    pub timezone: Tz,
    /// データベースファイルを置くディレクトリ
    pub data_dir: PathBuf,
    /// 固定の「今日」（レポートを特定の日付で再現する場合）
    pub today_override: Option<NaiveDate>,
}

impl EnvironmentConfig {
    /// 環境変数から設定を読み込む
    ///
    /// # 戻り値
    /// 環境設定、または値が不正な場合はエラー
    ///
    /// # 読み込む環境変数
    /// - `LOG_LEVEL`: ログレベル（未設定時は環境に応じたデフォルト）
    /// - `REMINDER_DAYS`: リマインダー日数（デフォルト3日）
    /// - `APP_TIMEZONE`: タイムゾーン（デフォルト Asia/Tokyo）
    /// - `APP_DATA_DIR`: データディレクトリ
    /// - `APP_TODAY`: 固定の今日（YYYY-MM-DD）
    pub fn from_env() -> AppResult<Self> {
        let environment = get_environment();
        let debug_mode = environment == Environment::Development;
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if debug_mode {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

        let reminder_days = match std::env::var("REMINDER_DAYS") {
            Ok(value) => parse_reminder_days(&value)?,
            Err(_) => DEFAULT_REMINDER_DAYS,
        };

        let timezone = match std::env::var("APP_TIMEZONE") {
            Ok(value) => parse_timezone(&value)?,
            Err(_) => chrono_tz::Asia::Tokyo,
        };

        let data_dir = match std::env::var("APP_DATA_DIR") {
            Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
            _ => default_data_dir()?,
        };

        let today_override = match std::env::var("APP_TODAY") {
            Ok(value) => Some(parse_date(&value).map_err(|_| {
                AppError::configuration(format!("APP_TODAY の形式が不正です: {value}"))
            })?),
            Err(_) => None,
        };

        Ok(Self {
            environment: format!("{environment:?}").to_lowercase(),
            debug_mode,
            log_level,
            reminder_days,
            timezone,
            data_dir,
            today_override,
        })
    }

    /// プロダクション環境かどうかを判定
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 開発環境かどうかを判定
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// 設定を検証する
    ///
    /// # 戻り値
    /// 設定が有効な場合はOk(())、無効な場合は設定エラー
    pub fn validate(&self) -> AppResult<()> {
        if self.reminder_days > MAX_REMINDER_DAYS {
            return Err(AppError::configuration(format!(
                "リマインダー日数は{MAX_REMINDER_DAYS}日以内である必要があります"
            )));
        }

        if self.data_dir.as_os_str().is_empty() {
            return Err(AppError::configuration(
                "データディレクトリが設定されていません",
            ));
        }

        Ok(())
    }

    /// 実行環境を列挙型で取得
    pub fn environment_kind(&self) -> Environment {
        if self.is_production() {
            Environment::Production
        } else {
            Environment::Development
        }
    }
}

/// 現在の実行環境を判定する
///
/// # 判定ロジック
/// 1. コンパイル時埋め込み環境変数を最優先
/// 2. 実行時環境変数 ENVIRONMENT を確認
/// 3. デバッグビルドの場合は Development
/// 4. リリースビルドの場合は Production
pub fn get_environment() -> Environment {
    if let Some(embedded_env) = option_env!("EMBEDDED_ENVIRONMENT") {
        let env = match embedded_env {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
        log::debug!("環境判定: コンパイル時埋め込み値を使用 -> {embedded_env} -> {env:?}");
        return env;
    }

    if let Ok(env_var) = std::env::var("ENVIRONMENT") {
        let env = match env_var.as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
        log::debug!("環境判定: 実行時環境変数を使用 -> {env_var} -> {env:?}");
        return env;
    }

    // フォールバック: ビルド設定に基づく判定
    let env = if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    };
    log::debug!(
        "環境判定: ビルド設定を使用 -> debug_assertions={} -> {env:?}",
        cfg!(debug_assertions)
    );
    env
}

/// 環境に応じたデータベースファイル名を取得する
///
/// # ファイル名の規則
/// - 開発環境: "dev_subscriptions.db"
/// - プロダクション環境: "subscriptions.db"
pub fn get_database_filename(env: Environment) -> &'static str {
    match env {
        Environment::Development => "dev_subscriptions.db",
        Environment::Production => "subscriptions.db",
    }
}

/// 環境に応じた.envファイルを読み込む
///
/// # 処理内容
/// 1. コンパイル時埋め込み環境変数をチェック
/// 2. 環境に応じた.envファイルを読み込み
/// 3. フォールバック処理
pub fn load_environment_variables() {
    if let Some(env) = option_env!("EMBEDDED_ENVIRONMENT") {
        log::info!("コンパイル時埋め込み環境設定を使用: {env}");
        return;
    }

    let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    let env_file = match environment.as_str() {
        "production" => ".env.production",
        _ => ".env",
    };

    log::info!("環境: {environment}, 読み込み対象: {env_file}");

    match dotenv::from_filename(env_file) {
        Ok(_) => {
            log::info!("{env_file}ファイルを読み込みました");
        }
        Err(_) => {
            // 環境固有のファイルがない場合は、デフォルトの.envを試行
            if env_file != ".env" && dotenv::dotenv().is_ok() {
                log::warn!("{env_file}が見つからないため、デフォルトの.envファイルを読み込みました");
            } else {
                log::warn!("環境変数ファイルが見つかりません。直接設定された環境変数を使用します。");
            }
        }
    }
}

/// ログシステムを初期化する
///
/// 二重初期化（テストや組み込み利用時）はエラーにせず無視する。
pub fn initialize_logging_system(config: &EnvironmentConfig) {
    let log_level = match config.log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };

    let initialized = env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .try_init()
        .is_ok();

    if initialized {
        log::info!(
            "ログシステムを初期化しました: level={}, environment={}",
            config.log_level,
            config.environment
        );
    }
}

/// リマインダー日数を解析する
fn parse_reminder_days(value: &str) -> AppResult<u32> {
    value.trim().parse::<u32>().map_err(|_| {
        AppError::configuration(format!(
            "REMINDER_DAYS は0以上の整数である必要があります: {value}"
        ))
    })
}

/// タイムゾーン名を解析する
fn parse_timezone(value: &str) -> AppResult<Tz> {
    value
        .trim()
        .parse::<Tz>()
        .map_err(|_| AppError::configuration(format!("不明なタイムゾーンです: {value}")))
}

/// デフォルトのデータディレクトリを取得する
fn default_data_dir() -> AppResult<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| AppError::configuration("データディレクトリの取得に失敗しました"))
}
