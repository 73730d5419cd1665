use serde::{Deserialize, Serialize};

/// 月額予算データモデル
///
/// `category` が `None` の場合は全体予算を表す。
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Budget {
    pub id: i64,
    pub category: Option<String>,
    pub monthly_limit: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// 予算設定用DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct SetBudgetDto {
    pub category: Option<String>,
    pub monthly_limit: f64,
}

/// 予算の消化状況
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BudgetStatus {
    pub budget: Budget,
    /// 有効なサブスクリプションの月額換算合計
    pub spent: f64,
    /// 残額（超過時は負の値）
    pub remaining: f64,
    /// 消化率（予算が0の場合はNone）
    pub usage_ratio: Option<f64>,
    pub is_exceeded: bool,
}
