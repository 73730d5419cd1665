use super::models::{Reminder, ReminderRunSummary};
use super::repository;
use crate::features::renewal::{self, SubscriptionStatus};
use crate::features::subscriptions::models::Subscription;
use crate::features::subscriptions::repository as subscription_repository;
use crate::shared::errors::AppResult;
use crate::shared::utils::format_amount;
use chrono::{Days, NaiveDate};
use rusqlite::Connection;

/// リマインダー通知トレイト
///
/// リマインダーの配送手段を定義します。
/// メールなどの配送はこのトレイトの実装として外部から差し込みます。
pub trait ReminderNotifier: Send + Sync {
    /// リマインダーを通知する
    ///
    /// # 引数
    /// * `reminder` - 通知内容
    ///
    /// # 戻り値
    /// 通知に失敗した場合は `AppError::Notification`
    fn notify(&self, reminder: &Reminder) -> AppResult<()>;
}

/// ログ出力によるリマインダー通知
#[derive(Debug, Default)]
pub struct LogNotifier;

impl ReminderNotifier for LogNotifier {
    fn notify(&self, reminder: &Reminder) -> AppResult<()> {
        log::info!(
            "[リマインダー] {} の支払い期日が近づいています: 期日={}, 金額={}, カテゴリ={}",
            reminder.name,
            reminder.due_date,
            format_amount(reminder.price),
            reminder.category
        );
        Ok(())
    }
}

/// リマインダーを送る日を算出する（次回支払い期日のN日前）
pub fn reminder_date(subscription: &Subscription, reminder_days: u32) -> NaiveDate {
    let due_date = renewal::next_due_date(subscription);
    due_date
        .checked_sub_days(Days::new(u64::from(reminder_days)))
        .unwrap_or(NaiveDate::MIN)
}

/// 今日リマインダーを送るべきサブスクリプションを抽出する
///
/// # 引数
/// * `subscriptions` - すべてのサブスクリプション
/// * `today` - 基準日
/// * `reminder_days` - 期日の何日前に通知するか
///
/// # 戻り値
/// 期限切れでなく、リマインダー日が今日と一致するもののリマインダー
pub fn find_due_reminders(
    subscriptions: &[Subscription],
    today: NaiveDate,
    reminder_days: u32,
) -> Vec<Reminder> {
    subscriptions
        .iter()
        .filter(|s| renewal::compute_status(s, today) != SubscriptionStatus::Expired)
        .filter(|s| reminder_date(s, reminder_days) == today)
        .map(|s| Reminder {
            subscription_id: s.id,
            name: s.name.clone(),
            price: s.price,
            category: s.category.clone(),
            due_date: renewal::next_due_date(s),
            reminder_date: today,
            days_before: reminder_days,
        })
        .collect()
}

/// リマインダーチェックを1回実行する
///
/// # 引数
/// * `conn` - データベース接続
/// * `notifier` - 通知手段
/// * `today` - 基準日
/// * `reminder_days` - 期日の何日前に通知するか
///
/// # 戻り値
/// 実行結果の集計
///
/// 同じ期日のリマインダーは一度だけ送る。通知または送信履歴の記録に失敗したものは
/// `failed` に数えて残りの処理を続け、同じ日に再実行すれば再送される。
pub fn run_reminder_check(
    conn: &Connection,
    notifier: &dyn ReminderNotifier,
    today: NaiveDate,
    reminder_days: u32,
) -> AppResult<ReminderRunSummary> {
    let subscriptions = subscription_repository::find_all(conn, None)?;
    let mut summary = ReminderRunSummary {
        checked: subscriptions.len(),
        ..Default::default()
    };

    for reminder in find_due_reminders(&subscriptions, today, reminder_days) {
        if repository::is_logged(conn, reminder.subscription_id, reminder.due_date)? {
            log::debug!(
                "送信済みのためスキップ: subscription_id={}, due_date={}",
                reminder.subscription_id,
                reminder.due_date
            );
            summary.skipped_duplicates += 1;
            continue;
        }

        if let Err(e) = notifier.notify(&reminder) {
            log::error!(
                "リマインダーの通知に失敗しました: subscription_id={}, error={}",
                reminder.subscription_id,
                e.details()
            );
            summary.failed += 1;
            continue;
        }

        // 記録できなかった通知は次回の実行で再送される
        match repository::record(conn, reminder.subscription_id, reminder.due_date, today) {
            Ok(_) => summary.sent += 1,
            Err(e) => {
                log::error!(
                    "リマインダー送信履歴の記録に失敗しました: subscription_id={}, error={}",
                    reminder.subscription_id,
                    e.details()
                );
                summary.failed += 1;
            }
        }
    }

    log::info!(
        "リマインダーチェック完了: checked={}, sent={}, skipped={}, failed={}",
        summary.checked,
        summary.sent,
        summary.skipped_duplicates,
        summary.failed
    );

    Ok(summary)
}
