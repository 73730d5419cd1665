//! 更新エンジン
//!
//! 開始日・支払いサイクル・支払い履歴だけからサブスクリプションの状態と
//! 支払い期日を算出する純粋関数群。データベースにも現在時刻にも依存せず、
//! 「今日」は必ず引数で受け取る。

use super::models::{BillingCycle, SubscriptionStatus};
use crate::features::subscriptions::models::Subscription;
use crate::shared::utils::round_to_cents;
use chrono::{Datelike, Days, NaiveDate};

/// 日付に支払いサイクル1回分を加算する
///
/// # 引数
/// * `date` - 起点となる日付
/// * `cycle` - 支払いサイクル
///
/// # 戻り値
/// 1サイクル後の日付
///
/// # 月末の扱い
/// 加算先の月に同じ日が存在しない場合は、あふれた日数を翌月に繰り越す
/// （1月31日 + 1ヶ月 = 3月3日、うるう年は3月2日。2月29日 + 1年 = 3月1日）。
/// `Unknown` のサイクルは月額として扱う。
pub fn advance_by_cycle(date: NaiveDate, cycle: &BillingCycle) -> NaiveDate {
    match cycle {
        BillingCycle::Yearly => add_months_rolling_over(date, 12),
        BillingCycle::Monthly | BillingCycle::Unknown(_) => add_months_rolling_over(date, 1),
    }
}

/// 月を加算し、存在しない日付は翌月へ繰り越す
///
/// 表現可能な範囲を超える場合は `NaiveDate::MAX` に飽和させる。
fn add_months_rolling_over(date: NaiveDate, months: u32) -> NaiveDate {
    let total_months = date.year() as i64 * 12 + date.month0() as i64 + months as i64;
    let year = total_months.div_euclid(12);
    let month = total_months.rem_euclid(12) as u32 + 1;

    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, 1))
        .and_then(|first_day| first_day.checked_add_days(Days::new(u64::from(date.day0()))))
        .unwrap_or(NaiveDate::MAX)
}

/// サブスクリプションの状態を算出する
///
/// # 引数
/// * `subscription` - 対象のサブスクリプション
/// * `today` - 判定基準日
///
/// # 戻り値
/// `Upcoming`（開始日前）、`Active`（期日以内）、`Expired`（期日超過）のいずれか
///
/// # 判定ロジック
/// 1. 今日が開始日より前なら `Upcoming`（支払い履歴に関係なく）
/// 2. 支払いがなければ、開始日 + 1サイクルまでを猶予期間として `Active`
/// 3. 支払いがあれば、最終支払日 + 1サイクルまで `Active`
///
/// 期日当日は `Active` に含まれる。
pub fn compute_status(subscription: &Subscription, today: NaiveDate) -> SubscriptionStatus {
    if today < subscription.start_date {
        return SubscriptionStatus::Upcoming;
    }

    if today <= next_due_date(subscription) {
        SubscriptionStatus::Active
    } else {
        SubscriptionStatus::Expired
    }
}

/// 支払い総額を算出する（小数点以下2桁に丸める）
pub fn total_amount_spent(subscription: &Subscription) -> f64 {
    let total: f64 = subscription.payments.iter().map(|p| p.amount).sum();
    round_to_cents(total)
}

/// 最終支払日を取得する
///
/// 支払い履歴は挿入順に並んでいる保証がないため、最大の支払日を探す。
pub fn last_payment_date(subscription: &Subscription) -> Option<NaiveDate> {
    subscription.payments.iter().map(|p| p.paid_on).max()
}

/// 次回支払い期日を算出する
///
/// 支払いがなければ開始日から、あれば最終支払日から1サイクル後。
pub fn next_due_date(subscription: &Subscription) -> NaiveDate {
    let anchor = last_payment_date(subscription).unwrap_or(subscription.start_date);
    advance_by_cycle(anchor, &subscription.billing_cycle)
}

/// 指定月に支払いがあったかどうかを判定する
///
/// # 引数
/// * `subscription` - 対象のサブスクリプション
/// * `month` - 月（1始まり、1 = 1月）
/// * `year` - 年
pub fn is_active_in_month(subscription: &Subscription, month: u32, year: i32) -> bool {
    subscription
        .payments
        .iter()
        .any(|p| p.paid_on.month() == month && p.paid_on.year() == year)
}

/// 月額換算の料金を算出する
///
/// 年額は12で割る。未知のサイクルは換算せずそのままの料金を返す。
pub fn normalized_monthly_cost(subscription: &Subscription) -> f64 {
    match subscription.billing_cycle {
        BillingCycle::Monthly => subscription.price,
        BillingCycle::Yearly => subscription.price / 12.0,
        BillingCycle::Unknown(_) => subscription.price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::payments::models::Payment;
    use quickcheck::{Arbitrary, Gen, TestResult};
    use quickcheck_macros::quickcheck;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payment(id: i64, amount: f64, paid_on: NaiveDate) -> Payment {
        Payment {
            id,
            subscription_id: 1,
            amount,
            paid_on,
            created_at: String::new(),
        }
    }

    fn subscription(
        start_date: NaiveDate,
        billing_cycle: BillingCycle,
        payments: Vec<Payment>,
    ) -> Subscription {
        Subscription {
            id: 1,
            name: "Spotify".to_string(),
            price: 10.0,
            billing_cycle,
            start_date,
            category: "音楽".to_string(),
            payments,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_advance_by_cycle_monthly_and_yearly() {
        assert_eq!(
            advance_by_cycle(date(2024, 1, 15), &BillingCycle::Monthly),
            date(2024, 2, 15)
        );
        assert_eq!(
            advance_by_cycle(date(2024, 12, 10), &BillingCycle::Monthly),
            date(2025, 1, 10)
        );
        assert_eq!(
            advance_by_cycle(date(2023, 1, 31), &BillingCycle::Yearly),
            date(2024, 1, 31)
        );
    }

    #[test]
    fn test_advance_by_cycle_rolls_over_month_end() {
        // 2月31日は存在しないため3月に繰り越す
        assert_eq!(
            advance_by_cycle(date(2023, 1, 31), &BillingCycle::Monthly),
            date(2023, 3, 3)
        );
        assert_eq!(
            advance_by_cycle(date(2024, 1, 31), &BillingCycle::Monthly),
            date(2024, 3, 2)
        );
        assert_eq!(
            advance_by_cycle(date(2024, 3, 31), &BillingCycle::Monthly),
            date(2024, 5, 1)
        );
        assert_eq!(
            advance_by_cycle(date(2024, 2, 29), &BillingCycle::Yearly),
            date(2025, 3, 1)
        );
    }

    #[test]
    fn test_advance_by_cycle_unknown_defaults_to_monthly() {
        let weekly = BillingCycle::parse("Weekly");
        assert_eq!(advance_by_cycle(date(2024, 1, 1), &weekly), date(2024, 2, 1));
    }

    #[test]
    fn test_advance_by_cycle_saturates_at_max_date() {
        assert_eq!(
            advance_by_cycle(NaiveDate::MAX, &BillingCycle::Yearly),
            NaiveDate::MAX
        );
    }

    #[test]
    fn test_status_without_payments_has_inclusive_grace_period() {
        let sub = subscription(date(2024, 1, 15), BillingCycle::Monthly, vec![]);

        assert_eq!(
            compute_status(&sub, date(2024, 1, 14)),
            SubscriptionStatus::Upcoming
        );
        assert_eq!(
            compute_status(&sub, date(2024, 1, 15)),
            SubscriptionStatus::Active
        );
        assert_eq!(
            compute_status(&sub, date(2024, 2, 15)),
            SubscriptionStatus::Active
        );
        assert_eq!(
            compute_status(&sub, date(2024, 2, 16)),
            SubscriptionStatus::Expired
        );
    }

    #[test]
    fn test_status_follows_latest_payment() {
        let sub = subscription(
            date(2024, 1, 15),
            BillingCycle::Monthly,
            vec![payment(1, 100.0, date(2024, 2, 10))],
        );

        assert_eq!(next_due_date(&sub), date(2024, 3, 10));
        assert_eq!(
            compute_status(&sub, date(2024, 3, 10)),
            SubscriptionStatus::Active
        );
        assert_eq!(
            compute_status(&sub, date(2024, 3, 11)),
            SubscriptionStatus::Expired
        );
    }

    #[test]
    fn test_expired_subscription_becomes_active_after_new_payment() {
        let mut sub = subscription(date(2024, 1, 1), BillingCycle::Monthly, vec![]);
        let today = date(2024, 4, 1);
        assert_eq!(compute_status(&sub, today), SubscriptionStatus::Expired);

        sub.payments.push(payment(1, 10.0, date(2024, 3, 25)));
        assert_eq!(compute_status(&sub, today), SubscriptionStatus::Active);
    }

    #[test]
    fn test_yearly_next_due_date() {
        let sub = subscription(
            date(2023, 1, 31),
            BillingCycle::Yearly,
            vec![payment(1, 120.0, date(2023, 1, 31))],
        );
        assert_eq!(next_due_date(&sub), date(2024, 1, 31));
    }

    #[test]
    fn test_unordered_payments() {
        let sub = subscription(
            date(2024, 1, 1),
            BillingCycle::Monthly,
            vec![
                payment(2, 70.0, date(2024, 3, 1)),
                payment(1, 50.0, date(2024, 1, 1)),
            ],
        );

        assert_eq!(last_payment_date(&sub), Some(date(2024, 3, 1)));
        assert_eq!(total_amount_spent(&sub), 120.0);
    }

    #[test]
    fn test_total_amount_spent_rounds_to_cents() {
        let sub = subscription(
            date(2024, 1, 1),
            BillingCycle::Monthly,
            vec![
                payment(1, 0.1, date(2024, 1, 1)),
                payment(2, 0.2, date(2024, 2, 1)),
            ],
        );
        assert_eq!(total_amount_spent(&sub), 0.3);

        let empty = subscription(date(2024, 1, 1), BillingCycle::Monthly, vec![]);
        assert_eq!(total_amount_spent(&empty), 0.0);
        assert_eq!(last_payment_date(&empty), None);
    }

    #[test]
    fn test_is_active_in_month() {
        let sub = subscription(
            date(2024, 1, 1),
            BillingCycle::Monthly,
            vec![
                payment(1, 10.0, date(2024, 2, 29)),
                payment(2, 10.0, date(2023, 2, 10)),
            ],
        );

        assert!(is_active_in_month(&sub, 2, 2024));
        assert!(is_active_in_month(&sub, 2, 2023));
        assert!(!is_active_in_month(&sub, 3, 2024));
        assert!(!is_active_in_month(&sub, 1, 2024));
    }

    #[test]
    fn test_normalized_monthly_cost() {
        let mut yearly = subscription(date(2024, 1, 1), BillingCycle::Yearly, vec![]);
        yearly.price = 120.0;
        assert_eq!(normalized_monthly_cost(&yearly), 10.0);

        let monthly = subscription(date(2024, 1, 1), BillingCycle::Monthly, vec![]);
        assert_eq!(normalized_monthly_cost(&monthly), 10.0);

        let mut weekly = subscription(date(2024, 1, 1), BillingCycle::parse("Weekly"), vec![]);
        weekly.price = 3.5;
        assert_eq!(normalized_monthly_cost(&weekly), 3.5);
    }

    /// quickcheck用の日付生成（2000年〜2040年）
    #[derive(Debug, Clone, Copy)]
    struct ArbDate(NaiveDate);

    impl Arbitrary for ArbDate {
        fn arbitrary(g: &mut Gen) -> Self {
            let offset = u64::arbitrary(g) % (365 * 40);
            ArbDate(date(2000, 1, 1) + Days::new(offset))
        }
    }

    fn payments_from(dates: &[ArbDate]) -> Vec<Payment> {
        dates
            .iter()
            .enumerate()
            .map(|(i, d)| payment(i as i64, (i % 7) as f64 * 1.25, d.0))
            .collect()
    }

    #[quickcheck]
    fn prop_before_start_is_always_upcoming(
        start: ArbDate,
        days_before: u16,
        paid: Vec<ArbDate>,
    ) -> bool {
        let today = start.0 - Days::new(u64::from(days_before) + 1);
        let sub = subscription(start.0, BillingCycle::Monthly, payments_from(&paid));
        compute_status(&sub, today) == SubscriptionStatus::Upcoming
    }

    #[quickcheck]
    fn prop_status_ignores_payment_order(
        start: ArbDate,
        today: ArbDate,
        paid: Vec<ArbDate>,
        yearly: bool,
    ) -> bool {
        let cycle = if yearly {
            BillingCycle::Yearly
        } else {
            BillingCycle::Monthly
        };
        let forward = subscription(start.0, cycle.clone(), payments_from(&paid));
        let mut reversed_payments = payments_from(&paid);
        reversed_payments.reverse();
        let reversed = subscription(start.0, cycle, reversed_payments);

        compute_status(&forward, today.0) == compute_status(&reversed, today.0)
            && total_amount_spent(&forward) == total_amount_spent(&reversed)
            && next_due_date(&forward) == next_due_date(&reversed)
    }

    #[quickcheck]
    fn prop_first_due_date_boundary(start: ArbDate) -> bool {
        let sub = subscription(start.0, BillingCycle::Monthly, vec![]);
        let first_due = advance_by_cycle(start.0, &BillingCycle::Monthly);

        compute_status(&sub, first_due) == SubscriptionStatus::Active
            && compute_status(&sub, first_due + Days::new(1)) == SubscriptionStatus::Expired
    }

    #[quickcheck]
    fn prop_advance_moves_forward(start: ArbDate, yearly: bool) -> TestResult {
        let cycle = if yearly {
            BillingCycle::Yearly
        } else {
            BillingCycle::Monthly
        };
        let next = advance_by_cycle(start.0, &cycle);
        let days = (next - start.0).num_days();
        let (min, max) = if yearly { (365, 367) } else { (28, 31) };
        TestResult::from_bool(next > start.0 && (min..=max).contains(&days))
    }

    #[quickcheck]
    fn prop_total_is_rounded_sum(amounts: Vec<u16>) -> bool {
        let start = date(2024, 1, 1);
        let payments: Vec<Payment> = amounts
            .iter()
            .enumerate()
            .map(|(i, cents)| payment(i as i64, f64::from(*cents) / 100.0, start))
            .collect();
        let expected_cents: u64 = amounts.iter().map(|c| u64::from(*c)).sum();
        let sub = subscription(start, BillingCycle::Monthly, payments);

        (total_amount_spent(&sub) - expected_cents as f64 / 100.0).abs() < 1e-9
    }
}
