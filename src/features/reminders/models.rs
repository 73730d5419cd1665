use chrono::NaiveDate;
use serde::Serialize;

/// 支払い期日のリマインダー
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Reminder {
    pub subscription_id: i64,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub due_date: NaiveDate,
    pub reminder_date: NaiveDate,
    /// 期日の何日前の通知か
    pub days_before: u32,
}

/// 送信済みリマインダーの記録
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReminderLogEntry {
    pub id: i64,
    pub subscription_id: i64,
    pub due_date: NaiveDate,
    pub notified_on: NaiveDate,
}

/// リマインダーチェック1回分の実行結果
#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct ReminderRunSummary {
    /// 評価したサブスクリプション数
    pub checked: usize,
    pub sent: usize,
    /// 同じ期日で送信済みのためスキップした件数
    pub skipped_duplicates: usize,
    pub failed: usize,
}
