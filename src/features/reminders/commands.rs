use super::models::ReminderLogEntry;
use super::repository;
use crate::features::subscriptions::repository as subscription_repository;
use crate::shared::errors::AppError;
use crate::AppState;

/// サブスクリプションのリマインダー送信履歴を取得する（期日の新しい順）
pub fn get_reminder_history(
    subscription_id: i64,
    state: &AppState,
) -> Result<Vec<ReminderLogEntry>, String> {
    let db = state.lock_db()?;

    if !subscription_repository::exists(&db, subscription_id)? {
        return Err(AppError::not_found(format!("ID {subscription_id} のサブスクリプション")).into());
    }
    Ok(repository::find_by_subscription(&db, subscription_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::service::{run_reminder_check, LogNotifier};
    use crate::features::renewal::BillingCycle;
    use crate::features::subscriptions::commands::create_subscription;
    use crate::features::subscriptions::models::CreateSubscriptionDto;
    use crate::test_support::test_state;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_get_reminder_history() {
        let state = test_state(date(2024, 2, 27));
        let id = create_subscription(
            CreateSubscriptionDto {
                name: "Netflix".to_string(),
                price: 1490.0,
                billing_cycle: BillingCycle::Monthly,
                start_date: date(2024, 2, 1),
                category: "エンタメ".to_string(),
            },
            &state,
        )
        .unwrap()
        .subscription
        .id;

        assert!(get_reminder_history(id, &state).unwrap().is_empty());

        {
            let db = state.lock_db().unwrap();
            run_reminder_check(&db, &LogNotifier, state.today(), 3).unwrap();
        }

        let history = get_reminder_history(id, &state).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].due_date, date(2024, 3, 1));
        assert_eq!(history[0].notified_on, date(2024, 2, 27));

        let err = get_reminder_history(999, &state).unwrap_err();
        assert!(err.contains("見つかりません"));
    }
}
