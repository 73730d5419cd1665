use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 支払い記録データモデル
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Payment {
    pub id: i64,
    pub subscription_id: i64,
    pub amount: f64,        // 0以上、小数点以下2桁まで
    pub paid_on: NaiveDate, // YYYY-MM-DD形式
    pub created_at: String, // RFC3339形式
}

/// 支払い記録用DTO
#[derive(Debug, Serialize, Deserialize)]
pub struct RecordPaymentDto {
    pub amount: f64,
    pub paid_on: NaiveDate,
}

/// 支払い更新用DTO
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdatePaymentDto {
    pub amount: Option<f64>,
    pub paid_on: Option<NaiveDate>,
}
