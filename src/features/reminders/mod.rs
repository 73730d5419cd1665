/// リマインダー機能モジュール
///
/// 次回支払い期日の数日前にリマインダーを通知し、
/// 同じ期日への通知が重複しないよう送信履歴を記録します。
pub mod commands;
pub mod models;
pub mod repository;
pub mod service;

// 公開インターフェース
pub use commands::get_reminder_history;

pub use models::{Reminder, ReminderLogEntry, ReminderRunSummary};

pub use service::{
    find_due_reminders, reminder_date, run_reminder_check, LogNotifier, ReminderNotifier,
};
