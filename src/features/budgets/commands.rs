use super::models::{Budget, BudgetStatus, SetBudgetDto};
use super::{repository, service};
use crate::features::subscriptions::repository as subscription_repository;
use crate::shared::errors::AppResult;
use crate::shared::utils::{normalize_string, validate_amount, validate_category};
use crate::AppState;

/// 月額予算を設定する
///
/// # 引数
/// * `dto` - 予算設定用DTO（カテゴリ未指定の場合は全体予算）
/// * `state` - アプリケーション状態
///
/// # 戻り値
/// 設定された予算、または失敗時はエラーメッセージ
pub fn set_budget(dto: SetBudgetDto, state: &AppState) -> Result<Budget, String> {
    validate_set_budget_dto(&dto)?;

    let category = dto.category.as_deref().map(normalize_string);
    let db = state.lock_db()?;
    Ok(repository::upsert(
        &db,
        category.as_deref(),
        dto.monthly_limit,
        state.config.timezone,
    )?)
}

/// すべての予算の消化状況を取得する
pub fn get_budget_statuses(state: &AppState) -> Result<Vec<BudgetStatus>, String> {
    let db = state.lock_db()?;
    let budgets = repository::find_all(&db)?;
    let subscriptions = subscription_repository::find_all(&db, None)?;

    Ok(service::evaluate(&budgets, &subscriptions, state.today()))
}

/// 予算を削除する
pub fn delete_budget(id: i64, state: &AppState) -> Result<(), String> {
    let db = state.lock_db()?;
    repository::delete(&db, id)?;
    Ok(())
}

fn validate_set_budget_dto(dto: &SetBudgetDto) -> AppResult<()> {
    validate_amount(dto.monthly_limit, "月額予算")?;
    if let Some(ref category) = dto.category {
        validate_category(category)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::renewal::BillingCycle;
    use crate::features::subscriptions::commands::create_subscription;
    use crate::features::subscriptions::models::CreateSubscriptionDto;
    use crate::test_support::test_state;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_budget_commands() {
        let state = test_state(date(2024, 3, 1));
        create_subscription(
            CreateSubscriptionDto {
                name: "Netflix".to_string(),
                price: 1490.0,
                billing_cycle: BillingCycle::Monthly,
                start_date: date(2024, 2, 20),
                category: "エンタメ".to_string(),
            },
            &state,
        )
        .unwrap();

        let overall = set_budget(
            SetBudgetDto {
                category: None,
                monthly_limit: 1000.0,
            },
            &state,
        )
        .unwrap();
        set_budget(
            SetBudgetDto {
                category: Some(" エンタメ ".to_string()),
                monthly_limit: 2000.0,
            },
            &state,
        )
        .unwrap();

        let statuses = get_budget_statuses(&state).unwrap();
        assert_eq!(statuses.len(), 2);
        assert!(statuses[0].is_exceeded);
        assert_eq!(statuses[1].budget.category.as_deref(), Some("エンタメ"));
        assert!(!statuses[1].is_exceeded);

        delete_budget(overall.id, &state).unwrap();
        assert_eq!(get_budget_statuses(&state).unwrap().len(), 1);
    }

    #[test]
    fn test_set_budget_validation() {
        let state = test_state(date(2024, 3, 1));

        let negative = SetBudgetDto {
            category: None,
            monthly_limit: -1.0,
        };
        assert!(set_budget(negative, &state).is_err());

        let blank_category = SetBudgetDto {
            category: Some("  ".to_string()),
            monthly_limit: 100.0,
        };
        assert!(set_budget(blank_category, &state).is_err());
    }
}
