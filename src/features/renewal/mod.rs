/// 更新エンジン機能モジュール
///
/// サブスクリプションの状態（開始前/有効/期限切れ）、次回支払い期日、
/// 支払い総額、月額換算料金を算出する純粋関数を提供します。
/// 状態は保存せず、呼び出しのたびに支払い履歴から再計算します。
pub mod engine;
pub mod models;

// 公開インターフェース
pub use engine::{
    advance_by_cycle, compute_status, is_active_in_month, last_payment_date, next_due_date,
    normalized_monthly_cost, total_amount_spent,
};

pub use models::{BillingCycle, SubscriptionStatus};
