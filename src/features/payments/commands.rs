use super::models::{Payment, RecordPaymentDto, UpdatePaymentDto};
use super::repository;
use crate::features::subscriptions::models::SubscriptionView;
use crate::features::subscriptions::repository as subscription_repository;
use crate::shared::errors::AppResult;
use crate::shared::utils::{validate_amount, validate_date};
use crate::AppState;

/// 支払いを記録する
///
/// # 引数
/// * `subscription_id` - 支払い対象のサブスクリプションID
/// * `dto` - 支払い記録用DTO
/// * `state` - アプリケーション状態
///
/// # 戻り値
/// 支払い記録後に再取得したサブスクリプション（状態・次回期日を再計算済み）
pub fn record_payment(
    subscription_id: i64,
    dto: RecordPaymentDto,
    state: &AppState,
) -> Result<SubscriptionView, String> {
    validate_record_payment_dto(&dto)?;

    let db = state.lock_db()?;
    repository::create(&db, subscription_id, dto, state.config.timezone)?;

    let subscription = subscription_repository::find_by_id(&db, subscription_id)?;
    Ok(SubscriptionView::build(subscription, state.today()))
}

/// サブスクリプションの支払い履歴を取得する（支払日の新しい順）
pub fn get_payments(subscription_id: i64, state: &AppState) -> Result<Vec<Payment>, String> {
    let db = state.lock_db()?;

    // 存在しないサブスクリプションは空リストではなくエラーにする
    subscription_repository::find_by_id(&db, subscription_id)?;
    Ok(repository::find_by_subscription(&db, subscription_id)?)
}

/// 指定月の支払いを取得する（支払日の古い順）
///
/// # 引数
/// * `year` - 年
/// * `month` - 月（1始まり）
/// * `state` - アプリケーション状態
pub fn get_payments_in_month(
    year: i32,
    month: u32,
    state: &AppState,
) -> Result<Vec<Payment>, String> {
    let db = state.lock_db()?;
    Ok(repository::find_in_month(&db, year, month)?)
}

/// 支払いを更新する
///
/// # 戻り値
/// 更新後に再取得した所属サブスクリプション
pub fn update_payment(
    id: i64,
    dto: UpdatePaymentDto,
    state: &AppState,
) -> Result<SubscriptionView, String> {
    validate_update_payment_dto(&dto)?;

    let db = state.lock_db()?;
    let payment = repository::update(&db, id, dto)?;

    let subscription = subscription_repository::find_by_id(&db, payment.subscription_id)?;
    Ok(SubscriptionView::build(subscription, state.today()))
}

/// 支払いを削除する
///
/// # 戻り値
/// 削除後に再取得した所属サブスクリプション
pub fn delete_payment(id: i64, state: &AppState) -> Result<SubscriptionView, String> {
    let db = state.lock_db()?;
    let deleted = repository::delete(&db, id)?;

    let subscription = subscription_repository::find_by_id(&db, deleted.subscription_id)?;
    Ok(SubscriptionView::build(subscription, state.today()))
}

fn validate_record_payment_dto(dto: &RecordPaymentDto) -> AppResult<()> {
    validate_amount(dto.amount, "支払い金額")?;
    validate_date(dto.paid_on, "支払日")?;
    Ok(())
}

fn validate_update_payment_dto(dto: &UpdatePaymentDto) -> AppResult<()> {
    if let Some(amount) = dto.amount {
        validate_amount(amount, "支払い金額")?;
    }
    if let Some(paid_on) = dto.paid_on {
        validate_date(paid_on, "支払日")?;
    }
    Ok(())
}
