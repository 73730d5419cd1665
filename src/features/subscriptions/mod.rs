/// サブスクリプション機能モジュール
///
/// このモジュールは、サブスクリプション管理に関連するすべての機能を提供します：
/// - サブスクリプションの作成、読み取り、更新、削除
/// - 算出済み状態によるフィルタリング
/// - 月額合計の計算
pub mod commands;
pub mod models;
pub mod repository;

// 公開インターフェース
pub use commands::{
    create_subscription, delete_subscription, get_monthly_subscription_total, get_subscription,
    get_subscriptions, update_subscription,
};

pub use models::{CreateSubscriptionDto, Subscription, SubscriptionView, UpdateSubscriptionDto};
