use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 支払いサイクル
///
/// 保存済みデータとの互換性のため、未知の値は `Unknown` として保持する。
/// `Unknown` はサイクル計算では月額扱い、月額換算では換算なしとなる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BillingCycle {
    Monthly,
    Yearly,
    Unknown(String),
}

impl BillingCycle {
    /// 文字列から支払いサイクルを判定する（大文字小文字を区別しない）
    ///
    /// この関数は失敗しない。認識できない値は `Unknown` になる。
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "monthly" => BillingCycle::Monthly,
            "yearly" => BillingCycle::Yearly,
            _ => BillingCycle::Unknown(value.to_string()),
        }
    }

    /// 保存・表示用の文字列表現
    pub fn as_str(&self) -> &str {
        match self {
            BillingCycle::Monthly => "Monthly",
            BillingCycle::Yearly => "Yearly",
            BillingCycle::Unknown(raw) => raw,
        }
    }

    /// 認識済みのサイクルかどうか
    pub fn is_known(&self) -> bool {
        !matches!(self, BillingCycle::Unknown(_))
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for BillingCycle {
    fn from(value: String) -> Self {
        BillingCycle::parse(&value)
    }
}

impl From<BillingCycle> for String {
    fn from(cycle: BillingCycle) -> Self {
        cycle.as_str().to_string()
    }
}

impl ToSql for BillingCycle {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for BillingCycle {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(BillingCycle::parse)
    }
}

/// サブスクリプションのライフサイクル状態
///
/// 保存はせず、開始日・支払いサイクル・支払い履歴から毎回算出する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriptionStatus {
    /// 開始日前
    Upcoming,
    /// 次回支払い期日まで有効
    Active,
    /// 支払い期日を過ぎている
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Upcoming => "Upcoming",
            SubscriptionStatus::Active => "Active",
            SubscriptionStatus::Expired => "Expired",
        }
    }

    /// 文字列から状態を解析する（フィルター指定用）
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "upcoming" => Some(SubscriptionStatus::Upcoming),
            "active" => Some(SubscriptionStatus::Active),
            "expired" => Some(SubscriptionStatus::Expired),
            _ => None,
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
