/// 支払い履歴機能モジュール
///
/// サブスクリプションごとの支払い記録の追加・更新・削除と、月別の支払い一覧を提供します。
/// 支払いを変更したコマンドは、所属サブスクリプションを再取得して
/// 再計算済みの状態を返します。
pub mod commands;
pub mod models;
pub mod repository;

// 公開インターフェース
pub use commands::{
    delete_payment, get_payments, get_payments_in_month, record_payment, update_payment,
};

pub use models::{Payment, RecordPaymentDto, UpdatePaymentDto};
