use super::models::{
    CategorySummary, DashboardSummary, MonthlyTrendPoint, StatusCounts, UpcomingRenewal,
};
use crate::features::renewal::{self, SubscriptionStatus};
use crate::features::subscriptions::models::Subscription;
use crate::shared::utils::round_to_cents;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// ダッシュボードで表示する更新予定の日数
pub const DASHBOARD_RENEWAL_WINDOW_DAYS: i64 = 7;

/// 状態別の件数を集計する
pub fn status_counts(subscriptions: &[Subscription], today: NaiveDate) -> StatusCounts {
    subscriptions
        .iter()
        .fold(StatusCounts::default(), |mut counts, subscription| {
            match renewal::compute_status(subscription, today) {
                SubscriptionStatus::Upcoming => counts.upcoming += 1,
                SubscriptionStatus::Active => counts.active += 1,
                SubscriptionStatus::Expired => counts.expired += 1,
            }
            counts
        })
}

/// 有効なサブスクリプションの月額換算合計
pub fn monthly_total(subscriptions: &[Subscription], today: NaiveDate) -> f64 {
    let total = active_subscriptions(subscriptions, today)
        .map(renewal::normalized_monthly_cost)
        .sum();
    round_to_cents(total)
}

/// カテゴリ別の月額換算料金を集計する
///
/// # 引数
/// * `subscriptions` - すべてのサブスクリプション
/// * `today` - 状態判定の基準日
///
/// # 戻り値
/// 月額の高い順（同額ならカテゴリ名順）に並んだカテゴリ別集計。
/// 有効なサブスクリプションのみを対象とする。
pub fn category_breakdown(
    subscriptions: &[Subscription],
    today: NaiveDate,
) -> Vec<CategorySummary> {
    let mut by_category: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for subscription in active_subscriptions(subscriptions, today) {
        let entry = by_category
            .entry(subscription.category.as_str())
            .or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += renewal::normalized_monthly_cost(subscription);
    }

    let grand_total: f64 = by_category.values().map(|(_, cost)| cost).sum();

    let mut summaries: Vec<CategorySummary> = by_category
        .into_iter()
        .map(|(category, (count, cost))| CategorySummary {
            category: category.to_string(),
            subscription_count: count,
            monthly_cost: round_to_cents(cost),
            share: if grand_total > 0.0 {
                cost / grand_total
            } else {
                0.0
            },
        })
        .collect();

    // BTreeMap由来のカテゴリ名順を保ったまま、金額の降順に並べ替える
    summaries.sort_by(|a, b| b.monthly_cost.total_cmp(&a.monthly_cost));
    summaries
}

/// 月別推移を集計する
///
/// # 引数
/// * `subscriptions` - すべてのサブスクリプション
/// * `months` - 遡る月数（今日の月を含む）
/// * `today` - 基準日
///
/// # 戻り値
/// 古い月から順に並んだ月別の支払い件数・支払い合計
pub fn monthly_trend(
    subscriptions: &[Subscription],
    months: u32,
    today: NaiveDate,
) -> Vec<MonthlyTrendPoint> {
    let current = today.year() * 12 + today.month0() as i32;

    (0..months as i32)
        .rev()
        .map(|offset| {
            let index = current - offset;
            let year = index.div_euclid(12);
            let month = index.rem_euclid(12) as u32 + 1;

            let active_count = subscriptions
                .iter()
                .filter(|s| renewal::is_active_in_month(s, month, year))
                .count();

            let amount_paid: f64 = subscriptions
                .iter()
                .flat_map(|s| s.payments.iter())
                .filter(|p| p.paid_on.year() == year && p.paid_on.month() == month)
                .map(|p| p.amount)
                .sum();

            MonthlyTrendPoint {
                year,
                month,
                active_count,
                amount_paid: round_to_cents(amount_paid),
            }
        })
        .collect()
}

/// 指定日数以内に更新を迎えるサブスクリプションを取得する
///
/// 期限切れのサブスクリプションは対象外。期日の近い順に並べる。
pub fn upcoming_renewals(
    subscriptions: &[Subscription],
    today: NaiveDate,
    within_days: i64,
) -> Vec<UpcomingRenewal> {
    let mut renewals: Vec<UpcomingRenewal> = subscriptions
        .iter()
        .filter(|s| renewal::compute_status(s, today) != SubscriptionStatus::Expired)
        .filter_map(|s| {
            let due_date = renewal::next_due_date(s);
            let days_until = (due_date - today).num_days();
            (0..=within_days).contains(&days_until).then(|| UpcomingRenewal {
                subscription_id: s.id,
                name: s.name.clone(),
                due_date,
                price: s.price,
                days_until,
            })
        })
        .collect();

    renewals.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.name.cmp(&b.name)));
    renewals
}

/// ダッシュボード用の集計をまとめて算出する
pub fn dashboard_summary(subscriptions: &[Subscription], today: NaiveDate) -> DashboardSummary {
    let total_spent = subscriptions
        .iter()
        .map(renewal::total_amount_spent)
        .sum::<f64>();

    DashboardSummary {
        today,
        status_counts: status_counts(subscriptions, today),
        monthly_total: monthly_total(subscriptions, today),
        total_spent: round_to_cents(total_spent),
        upcoming_renewals: upcoming_renewals(subscriptions, today, DASHBOARD_RENEWAL_WINDOW_DAYS),
    }
}

fn active_subscriptions(
    subscriptions: &[Subscription],
    today: NaiveDate,
) -> impl Iterator<Item = &Subscription> {
    subscriptions
        .iter()
        .filter(move |s| renewal::compute_status(s, today) == SubscriptionStatus::Active)
}
