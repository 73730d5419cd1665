use super::models::{Budget, BudgetStatus};
use crate::features::renewal::{self, SubscriptionStatus};
use crate::features::subscriptions::models::Subscription;
use crate::shared::utils::round_to_cents;
use chrono::NaiveDate;

/// 予算ごとの消化状況を算出する
///
/// # 引数
/// * `budgets` - 評価対象の予算
/// * `subscriptions` - すべてのサブスクリプション
/// * `today` - 状態判定の基準日
///
/// # 戻り値
/// 予算と同じ順序の消化状況リスト
///
/// 支出は今日時点で `Active` なサブスクリプションの月額換算料金の合計。
/// 開始前・期限切れのサブスクリプションは含めない。
pub fn evaluate(
    budgets: &[Budget],
    subscriptions: &[Subscription],
    today: NaiveDate,
) -> Vec<BudgetStatus> {
    let active: Vec<&Subscription> = subscriptions
        .iter()
        .filter(|s| renewal::compute_status(s, today) == SubscriptionStatus::Active)
        .collect();

    budgets
        .iter()
        .map(|budget| {
            let spent = round_to_cents(
                active
                    .iter()
                    .filter(|s| in_scope(budget, s))
                    .map(|s| renewal::normalized_monthly_cost(s))
                    .sum(),
            );
            build_status(budget.clone(), spent)
        })
        .collect()
}

fn in_scope(budget: &Budget, subscription: &Subscription) -> bool {
    match budget.category {
        Some(ref category) => subscription.category == *category,
        None => true,
    }
}

fn build_status(budget: Budget, spent: f64) -> BudgetStatus {
    let limit = budget.monthly_limit;
    let usage_ratio = if limit > 0.0 {
        Some(spent / limit)
    } else {
        None
    };

    if spent > limit {
        log::warn!(
            "予算を超過しています: category={}, limit={limit}, spent={spent}",
            budget.category.as_deref().unwrap_or("(全体)")
        );
    }

    BudgetStatus {
        remaining: round_to_cents(limit - spent),
        is_exceeded: spent > limit,
        usage_ratio,
        spent,
        budget,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::payments::models::Payment;
    use crate::features::renewal::BillingCycle;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn budget(category: Option<&str>, monthly_limit: f64) -> Budget {
        Budget {
            id: 1,
            category: category.map(str::to_string),
            monthly_limit,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn subscription(
        category: &str,
        price: f64,
        billing_cycle: BillingCycle,
        start_date: NaiveDate,
        payments: Vec<Payment>,
    ) -> Subscription {
        Subscription {
            id: 1,
            name: "test".to_string(),
            price,
            billing_cycle,
            start_date,
            category: category.to_string(),
            payments,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_evaluate_overall_and_category_budgets() {
        let today = date(2024, 3, 1);
        let subscriptions = vec![
            subscription("音楽", 10.0, BillingCycle::Monthly, date(2024, 2, 15), vec![]),
            subscription("仕事", 120.0, BillingCycle::Yearly, date(2024, 1, 1), vec![]),
            // 期限切れは含めない
            subscription("音楽", 50.0, BillingCycle::Monthly, date(2023, 1, 1), vec![]),
            // 開始前も含めない
            subscription("音楽", 70.0, BillingCycle::Monthly, date(2024, 5, 1), vec![]),
        ];
        let budgets = vec![budget(None, 15.0), budget(Some("音楽"), 30.0)];

        let statuses = evaluate(&budgets, &subscriptions, today);

        assert_eq!(statuses[0].spent, 20.0);
        assert_eq!(statuses[0].remaining, -5.0);
        assert!(statuses[0].is_exceeded);

        assert_eq!(statuses[1].spent, 10.0);
        assert_eq!(statuses[1].remaining, 20.0);
        assert_eq!(statuses[1].usage_ratio, Some(10.0 / 30.0));
        assert!(!statuses[1].is_exceeded);
    }

    #[test]
    fn test_zero_limit_has_no_ratio() {
        let statuses = evaluate(&[budget(None, 0.0)], &[], date(2024, 3, 1));
        assert_eq!(statuses[0].usage_ratio, None);
        assert_eq!(statuses[0].spent, 0.0);
        assert!(!statuses[0].is_exceeded);
    }
}
