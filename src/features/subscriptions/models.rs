use crate::features::payments::models::Payment;
use crate::features::renewal::{self, BillingCycle, SubscriptionStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// サブスクリプションデータモデル
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Subscription {
    pub id: i64,
    pub name: String,                // サービス名、100文字以内
    pub price: f64,                  // 0以上、10桁以内
    pub billing_cycle: BillingCycle, // "Monthly" または "Yearly"
    pub start_date: NaiveDate,       // 最初の請求日（支払い期日計算の起点）
    pub category: String,            // カテゴリ名、50文字以内
    pub payments: Vec<Payment>,      // 支払い履歴（順不同）
    pub created_at: String,          // RFC3339形式
    pub updated_at: String,          // RFC3339形式
}

/// サブスクリプション作成用DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSubscriptionDto {
    pub name: String,
    pub price: f64,
    pub billing_cycle: BillingCycle,
    pub start_date: NaiveDate,
    pub category: String,
}

/// サブスクリプション更新用DTO
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateSubscriptionDto {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub billing_cycle: Option<BillingCycle>,
    pub start_date: Option<NaiveDate>,
    pub category: Option<String>,
}

/// 算出済みフィールド付きのサブスクリプション
///
/// 保存されたフィールドに、更新エンジンで算出した値を付け加えたもの。
/// 画面側が参照する3つの算出値のみcamelCaseで出力し、それ以外はsnake_case。
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub subscription: Subscription,
    #[serde(rename = "calculatedStatus")]
    pub calculated_status: SubscriptionStatus,
    #[serde(rename = "totalAmountSpent")]
    pub total_amount_spent: f64,
    #[serde(rename = "nextRenewalDate")]
    pub next_renewal_date: NaiveDate,
    pub last_payment_date: Option<NaiveDate>,
    pub monthly_cost: f64,
}

impl SubscriptionView {
    /// 指定日時点の算出値を付けてビューを作成する
    pub fn build(subscription: Subscription, today: NaiveDate) -> Self {
        let calculated_status = renewal::compute_status(&subscription, today);
        let total_amount_spent = renewal::total_amount_spent(&subscription);
        let next_renewal_date = renewal::next_due_date(&subscription);
        let last_payment_date = renewal::last_payment_date(&subscription);
        let monthly_cost = renewal::normalized_monthly_cost(&subscription);

        Self {
            subscription,
            calculated_status,
            total_amount_spent,
            next_renewal_date,
            last_payment_date,
            monthly_cost,
        }
    }
}
