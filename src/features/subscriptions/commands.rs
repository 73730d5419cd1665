use super::models::{CreateSubscriptionDto, SubscriptionView, UpdateSubscriptionDto};
use super::repository;
use crate::features::renewal::{self, BillingCycle, SubscriptionStatus};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{
    round_to_cents, validate_amount, validate_category, validate_date, validate_required_field,
    validate_text_length,
};
use crate::AppState;

/// サブスクリプションを作成する
///
/// # 引数
/// * `dto` - サブスクリプション作成用DTO
/// * `state` - アプリケーション状態
///
/// # 戻り値
/// 作成されたサブスクリプション（算出値付き）、または失敗時はエラーメッセージ
pub fn create_subscription(
    dto: CreateSubscriptionDto,
    state: &AppState,
) -> Result<SubscriptionView, String> {
    validate_create_subscription_dto(&dto)?;

    let db = state.lock_db()?;
    let subscription = repository::create(&db, dto, state.config.timezone)?;
    Ok(SubscriptionView::build(subscription, state.today()))
}

/// IDでサブスクリプションを取得する
pub fn get_subscription(id: i64, state: &AppState) -> Result<SubscriptionView, String> {
    let db = state.lock_db()?;
    let subscription = repository::find_by_id(&db, id)?;
    Ok(SubscriptionView::build(subscription, state.today()))
}

/// サブスクリプション一覧を取得する
///
/// # 引数
/// * `status_filter` - 状態フィルター（"upcoming" / "active" / "expired"、オプション）
/// * `state` - アプリケーション状態
///
/// # 戻り値
/// サブスクリプションのリスト、または失敗時はエラーメッセージ
///
/// 状態は保存値ではなく、今日の日付で算出した値でフィルタリングする。
pub fn get_subscriptions(
    status_filter: Option<String>,
    state: &AppState,
) -> Result<Vec<SubscriptionView>, String> {
    let status_filter = match status_filter.as_deref() {
        Some(value) => Some(SubscriptionStatus::parse(value).ok_or_else(|| {
            format!("状態は'upcoming'、'active'、'expired'のいずれかを指定してください: {value}")
        })?),
        None => None,
    };

    let db = state.lock_db()?;
    let today = state.today();

    let views = repository::find_all(&db, None)?
        .into_iter()
        .map(|subscription| SubscriptionView::build(subscription, today))
        .filter(|view| status_filter.map_or(true, |s| view.calculated_status == s))
        .collect();

    Ok(views)
}

/// サブスクリプションを更新する
pub fn update_subscription(
    id: i64,
    dto: UpdateSubscriptionDto,
    state: &AppState,
) -> Result<SubscriptionView, String> {
    validate_update_subscription_dto(&dto)?;

    let db = state.lock_db()?;
    let subscription = repository::update(&db, id, dto, state.config.timezone)?;
    Ok(SubscriptionView::build(subscription, state.today()))
}

/// サブスクリプションを削除する（支払い履歴も削除される）
pub fn delete_subscription(id: i64, state: &AppState) -> Result<(), String> {
    let db = state.lock_db()?;
    repository::delete(&db, id)?;
    Ok(())
}

/// 有効なサブスクリプションの月額換算合計を取得する
///
/// # 引数
/// * `state` - アプリケーション状態
///
/// # 戻り値
/// 月額合計金額（小数点以下2桁）、または失敗時はエラーメッセージ
pub fn get_monthly_subscription_total(state: &AppState) -> Result<f64, String> {
    let db = state.lock_db()?;
    let today = state.today();

    let total = repository::find_all(&db, None)?
        .iter()
        .filter(|s| renewal::compute_status(s, today) == SubscriptionStatus::Active)
        .map(renewal::normalized_monthly_cost)
        .sum::<f64>();

    Ok(round_to_cents(total))
}

/// サブスクリプション作成DTOのバリデーション
fn validate_create_subscription_dto(dto: &CreateSubscriptionDto) -> AppResult<()> {
    validate_name(&dto.name)?;
    validate_amount(dto.price, "料金")?;
    validate_billing_cycle(&dto.billing_cycle)?;
    validate_date(dto.start_date, "開始日")?;
    validate_category(&dto.category)?;
    Ok(())
}

/// サブスクリプション更新DTOのバリデーション
fn validate_update_subscription_dto(dto: &UpdateSubscriptionDto) -> AppResult<()> {
    if let Some(ref name) = dto.name {
        validate_name(name)?;
    }
    if let Some(price) = dto.price {
        validate_amount(price, "料金")?;
    }
    if let Some(ref billing_cycle) = dto.billing_cycle {
        validate_billing_cycle(billing_cycle)?;
    }
    if let Some(start_date) = dto.start_date {
        validate_date(start_date, "開始日")?;
    }
    if let Some(ref category) = dto.category {
        validate_category(category)?;
    }
    Ok(())
}

fn validate_name(name: &str) -> AppResult<()> {
    validate_required_field(name, "サービス名")?;
    validate_text_length(name.trim(), 100, "サービス名")
}

/// 書き込み時は月額・年額のみ受け付ける
///
/// 読み込み時は未知の値も許容する（月額扱い）ため、ここでのみ弾く。
fn validate_billing_cycle(cycle: &BillingCycle) -> AppResult<()> {
    if !cycle.is_known() {
        return Err(AppError::validation(format!(
            "支払いサイクルは'monthly'または'yearly'である必要があります: {cycle}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::payments::models::RecordPaymentDto;
    use crate::features::payments::repository as payment_repository;
    use crate::test_support::test_state;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dto(name: &str, price: f64, cycle: &str, start_date: NaiveDate) -> CreateSubscriptionDto {
        CreateSubscriptionDto {
            name: name.to_string(),
            price,
            billing_cycle: BillingCycle::parse(cycle),
            start_date,
            category: "エンタメ".to_string(),
        }
    }

    #[test]
    fn test_create_subscription_returns_computed_fields() {
        let state = test_state(date(2024, 2, 15));

        let view = create_subscription(dto("Netflix", 15.49, "Monthly", date(2024, 1, 15)), &state)
            .unwrap();

        assert_eq!(view.calculated_status, SubscriptionStatus::Active);
        assert_eq!(view.next_renewal_date, date(2024, 2, 15));
        assert_eq!(view.total_amount_spent, 0.0);
        assert_eq!(view.last_payment_date, None);
    }

    #[test]
    fn test_create_subscription_validation() {
        let state = test_state(date(2024, 2, 15));

        assert!(create_subscription(dto("", 10.0, "Monthly", date(2024, 1, 1)), &state).is_err());
        assert!(
            create_subscription(dto(&"a".repeat(101), 10.0, "Monthly", date(2024, 1, 1)), &state)
                .is_err()
        );
        let negative = dto("Gym", -1.0, "Monthly", date(2024, 1, 1));
        assert!(create_subscription(negative, &state).is_err());
        let too_old = dto("Gym", 10.0, "Monthly", date(1899, 1, 1));
        assert!(create_subscription(too_old, &state).is_err());

        // 週額は書き込み時に拒否する
        let err = create_subscription(dto("Gym", 10.0, "Weekly", date(2024, 1, 1)), &state)
            .unwrap_err();
        assert!(err.contains("支払いサイクル"));

        // 無料プランは許可
        assert!(create_subscription(dto("Free", 0.0, "yearly", date(2024, 1, 1)), &state).is_ok());
    }

    #[test]
    fn test_get_subscriptions_filters_by_computed_status() {
        let state = test_state(date(2024, 3, 1));

        create_subscription(dto("Upcoming", 10.0, "Monthly", date(2024, 4, 1)), &state).unwrap();
        create_subscription(dto("Active", 10.0, "Monthly", date(2024, 2, 15)), &state).unwrap();
        create_subscription(dto("Expired", 10.0, "Monthly", date(2023, 6, 1)), &state).unwrap();

        let all = get_subscriptions(None, &state).unwrap();
        assert_eq!(all.len(), 3);

        let active = get_subscriptions(Some("active".to_string()), &state).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].subscription.name, "Active");

        let expired = get_subscriptions(Some("Expired".to_string()), &state).unwrap();
        assert_eq!(expired[0].subscription.name, "Expired");

        assert!(get_subscriptions(Some("paused".to_string()), &state).is_err());
    }

    #[test]
    fn test_monthly_total_counts_only_active() {
        let state = test_state(date(2024, 3, 1));

        create_subscription(dto("Monthly", 10.0, "Monthly", date(2024, 2, 15)), &state).unwrap();
        create_subscription(dto("Yearly", 120.0, "Yearly", date(2024, 1, 1)), &state).unwrap();
        create_subscription(dto("Old", 99.0, "Monthly", date(2023, 1, 1)), &state).unwrap();

        assert_eq!(get_monthly_subscription_total(&state).unwrap(), 20.0);
    }

    #[test]
    fn test_update_and_delete_subscription() {
        let state = test_state(date(2024, 3, 1));
        let spotify = dto("Spotify", 980.0, "Monthly", date(2024, 1, 1));
        let id = create_subscription(spotify, &state).unwrap().subscription.id;

        {
            let db = state.db.lock().unwrap();
            payment_repository::create(
                &db,
                id,
                RecordPaymentDto {
                    amount: 980.0,
                    paid_on: date(2024, 2, 20),
                },
                state.config.timezone,
            )
            .unwrap();
        }

        let updated = update_subscription(
            id,
            UpdateSubscriptionDto {
                billing_cycle: Some(BillingCycle::Yearly),
                ..Default::default()
            },
            &state,
        )
        .unwrap();
        assert_eq!(updated.next_renewal_date, date(2025, 2, 20));

        let invalid = UpdateSubscriptionDto {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(update_subscription(id, invalid, &state).is_err());

        delete_subscription(id, &state).unwrap();
        assert!(get_subscription(id, &state).is_err());
    }
}
