use super::models::{CategorySummary, DashboardSummary, MonthlyTrendPoint};
use super::service;
use crate::features::subscriptions::repository as subscription_repository;
use crate::shared::errors::AppError;
use crate::AppState;

/// 月別推移で指定できる最大月数
const MAX_TREND_MONTHS: u32 = 60;

/// カテゴリ別の月額内訳を取得する
pub fn get_category_breakdown(state: &AppState) -> Result<Vec<CategorySummary>, String> {
    let db = state.lock_db()?;
    let subscriptions = subscription_repository::find_all(&db, None)?;
    Ok(service::category_breakdown(&subscriptions, state.today()))
}

/// 月別推移を取得する
///
/// # 引数
/// * `months` - 遡る月数（1〜60）
/// * `state` - アプリケーション状態
///
/// # 戻り値
/// 古い月から順に並んだ月別推移、または失敗時はエラーメッセージ
pub fn get_monthly_trend(months: u32, state: &AppState) -> Result<Vec<MonthlyTrendPoint>, String> {
    if months == 0 || months > MAX_TREND_MONTHS {
        return Err(AppError::validation(format!(
            "月数は1から{MAX_TREND_MONTHS}の範囲で指定してください"
        ))
        .into());
    }

    let db = state.lock_db()?;
    let subscriptions = subscription_repository::find_all(&db, None)?;
    Ok(service::monthly_trend(&subscriptions, months, state.today()))
}

/// ダッシュボード用の集計を取得する
pub fn get_dashboard_summary(state: &AppState) -> Result<DashboardSummary, String> {
    let db = state.lock_db()?;
    let subscriptions = subscription_repository::find_all(&db, None)?;
    Ok(service::dashboard_summary(&subscriptions, state.today()))
}
