use subscription_tracker_lib::shared::errors::ErrorSeverity;

fn main() {
    if let Err(e) = subscription_tracker_lib::run() {
        match e.severity() {
            ErrorSeverity::High | ErrorSeverity::Critical => {
                log::error!("アプリケーションの実行に失敗しました: {e}")
            }
            ErrorSeverity::Low | ErrorSeverity::Medium => {
                log::warn!("アプリケーションの実行を中断しました: {e}")
            }
        }
        eprintln!("エラー: {}", e.details());
        std::process::exit(1);
    }
}
