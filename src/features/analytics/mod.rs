/// 分析機能モジュール
///
/// 算出済みの状態をもとに、状態別件数・カテゴリ別内訳・月別推移・
/// 近日の更新予定を集計します。
pub mod commands;
pub mod models;
pub mod service;

// 公開インターフェース
pub use commands::{get_category_breakdown, get_dashboard_summary, get_monthly_trend};

pub use models::{
    CategorySummary, DashboardSummary, MonthlyTrendPoint, StatusCounts, UpcomingRenewal,
};

pub use service::{
    category_breakdown, dashboard_summary, monthly_total, monthly_trend, status_counts,
    upcoming_renewals,
};
