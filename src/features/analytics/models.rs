use chrono::NaiveDate;
use serde::Serialize;

/// 状態別のサブスクリプション件数
#[derive(Debug, Default, Serialize, Clone, PartialEq, Eq)]
pub struct StatusCounts {
    pub upcoming: usize,
    pub active: usize,
    pub expired: usize,
}

/// カテゴリ別の集計
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: String,
    pub subscription_count: usize,
    pub monthly_cost: f64,
    /// 全体の月額合計に対する割合（0.0〜1.0）
    pub share: f64,
}

/// 月別推移の1点
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MonthlyTrendPoint {
    pub year: i32,
    /// 月（1始まり）
    pub month: u32,
    /// その月に支払いがあったサブスクリプション数
    pub active_count: usize,
    /// その月の支払い合計
    pub amount_paid: f64,
}

/// 近日中の更新予定
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct UpcomingRenewal {
    pub subscription_id: i64,
    pub name: String,
    pub due_date: NaiveDate,
    pub price: f64,
    pub days_until: i64,
}

/// ダッシュボード用の集計
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DashboardSummary {
    pub today: NaiveDate,
    pub status_counts: StatusCounts,
    pub monthly_total: f64,
    pub total_spent: f64,
    pub upcoming_renewals: Vec<UpcomingRenewal>,
}
