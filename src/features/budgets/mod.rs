/// 予算機能モジュール
///
/// 全体またはカテゴリ別の月額予算を管理し、有効なサブスクリプションの
/// 月額換算合計と比較した消化状況を提供します。
pub mod commands;
pub mod models;
pub mod repository;
pub mod service;

// 公開インターフェース
pub use commands::{delete_budget, get_budget_statuses, set_budget};

pub use models::{Budget, BudgetStatus, SetBudgetDto};

pub use service::evaluate;
