use crate::shared::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

/// 受け付ける日付の年の範囲
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// 金額の上限（10桁以内）
const MAX_AMOUNT: f64 = 10_000_000_000.0;

/// 日付のバリデーション
///
/// # 引数
/// * `date` - 検証対象の日付
/// * `field_name` - フィールド名（エラーメッセージ用）
///
/// # 戻り値
/// 有効な日付の場合はOk(())、範囲外の場合はエラー
///
/// # バリデーション規則
/// - 1900年以降、2100年以前であること
pub fn validate_date(date: NaiveDate, field_name: &str) -> AppResult<()> {
    let year = date.year();
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(AppError::validation(format!(
            "{field_name}は{MIN_YEAR}年から{MAX_YEAR}年の間で入力してください"
        )));
    }
    Ok(())
}

/// 日付文字列（YYYY-MM-DD形式）を解析する
///
/// # 引数
/// * `date_str` - 日付文字列
///
/// # 戻り値
/// 解析された日付、または形式が不正な場合はエラー
pub fn parse_date(date_str: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation("日付はYYYY-MM-DD形式で入力してください"))
}

/// 金額のバリデーション
///
/// # 引数
/// * `amount` - 金額
/// * `field_name` - フィールド名（エラーメッセージ用）
///
/// # 戻り値
/// 有効な金額の場合はOk(())、無効な場合はエラー
///
/// # バリデーション規則
/// - 有限の数値であること
/// - 0以上であること（無料プランや無料期間の支払い記録を許可）
/// - 10桁以内であること
/// - 小数点以下は2桁まで
pub fn validate_amount(amount: f64, field_name: &str) -> AppResult<()> {
    if !amount.is_finite() {
        return Err(AppError::validation(format!("{field_name}が無効な数値です")));
    }

    if amount < 0.0 {
        return Err(AppError::validation(format!(
            "{field_name}は0以上の数値で入力してください"
        )));
    }

    if amount >= MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{field_name}は10桁以内で入力してください"
        )));
    }

    // 小数点以下の桁数チェック（2桁まで）
    let amount_str = format!("{amount:.10}");
    if let Some(decimal_pos) = amount_str.find('.') {
        let significant_decimals = amount_str[decimal_pos + 1..].trim_end_matches('0');
        if significant_decimals.len() > 2 {
            return Err(AppError::validation(format!(
                "{field_name}は小数点以下2桁まで入力してください"
            )));
        }
    }

    Ok(())
}

/// 文字列の長さバリデーション
///
/// # 引数
/// * `text` - 検証対象の文字列
/// * `max_length` - 最大文字数
/// * `field_name` - フィールド名（エラーメッセージ用）
pub fn validate_text_length(text: &str, max_length: usize, field_name: &str) -> AppResult<()> {
    let char_count = text.chars().count();
    if char_count > max_length {
        return Err(AppError::validation(format!(
            "{field_name}は{max_length}文字以内で入力してください（現在: {char_count}文字）"
        )));
    }
    Ok(())
}

/// 必須フィールドのバリデーション
pub fn validate_required_field(text: &str, field_name: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::validation(format!("{field_name}は必須項目です")));
    }
    Ok(())
}

/// カテゴリ名のバリデーション（必須、50文字以内）
pub fn validate_category(category: &str) -> AppResult<()> {
    validate_required_field(category, "カテゴリ")?;
    validate_text_length(category, 50, "カテゴリ")?;
    Ok(())
}

/// 指定タイムゾーンの現在時刻をRFC3339形式で取得
pub fn current_timestamp(tz: Tz) -> String {
    Utc::now().with_timezone(&tz).to_rfc3339()
}

/// 指定タイムゾーンにおける今日の日付を取得
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// 金額を小数点以下2桁に丸める
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// 文字列の正規化（前後の空白を削除）
pub fn normalize_string(text: &str) -> String {
    text.trim().to_string()
}

/// 金額を表示用にフォーマット
///
/// 小数点以下が0の場合は整数として表示する。
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{amount:.0}")
    } else {
        format!("{amount:.2}")
    }
}
