//! Panic hook for server modes
//!
//! 崩溃信息追加到 `crash.log`，终端只打印摘要。

use std::any::Any;
use std::backtrace::Backtrace;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic::{self, PanicHookInfo};
use std::path::Path;

use chrono::Utc;
use colored::Colorize;

const CRASH_LOG: &str = "crash.log";
const RULE: &str = "------------------------------------------";

/// 一次 panic 的记录
#[derive(Debug)]
pub struct CrashReport {
    pub service: &'static str,
    pub thread: String,
    pub message: String,
    pub location: Option<String>,
    pub timestamp: String,
}

impl CrashReport {
    fn from_hook(service: &'static str, info: &PanicHookInfo<'_>) -> Self {
        Self {
            service,
            thread: std::thread::current()
                .name()
                .unwrap_or("<unnamed>")
                .to_string(),
            message: payload_message(info.payload()),
            location: info
                .location()
                .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column())),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// crash.log 中的一条记录（不含 backtrace）
    pub fn render(&self) -> String {
        format!(
            "{RULE}\n[{}] geoguard {} v{} panicked\nthread:   {}\nmessage:  {}\nlocation: {}\n",
            self.timestamp,
            self.service,
            env!("CARGO_PKG_VERSION"),
            self.thread,
            self.message,
            self.location.as_deref().unwrap_or("unknown"),
        )
    }

    pub fn append_to(&self, path: &Path, backtrace: &Backtrace) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        write!(file, "{}", self.render())?;
        writeln!(file, "backtrace:\n{}\n", backtrace)?;
        Ok(())
    }

    fn print_summary(&self) {
        eprintln!(
            "\n{} {} {}",
            "PANIC".red().bold(),
            format!("[{}]", self.service).yellow(),
            self.message.white()
        );
        if let Some(location) = &self.location {
            eprintln!("  at {}", location);
        }
        eprintln!("  {}\n", format!("details appended to {}", CRASH_LOG).cyan());
    }
}

/// panic payload 通常是 `&str` 或 `String`
fn payload_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Install the panic hook for `service` ("geo" / "image")
pub fn install_panic_hook(service: &'static str) {
    panic::set_hook(Box::new(move |info| {
        let report = CrashReport::from_hook(service, info);
        let backtrace = Backtrace::force_capture();

        if let Err(e) = report.append_to(Path::new(CRASH_LOG), &backtrace) {
            eprintln!("Failed to write {}: {}", CRASH_LOG, e);
        }
        report.print_summary();
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> CrashReport {
        CrashReport {
            service: "image",
            thread: "actix-rt|system:0|arbiter:1".to_string(),
            message: "index out of bounds".to_string(),
            location: None,
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_payload_message() {
        let s: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(payload_message(s.as_ref()), "static message");

        let owned: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(payload_message(owned.as_ref()), "owned message");

        let other: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(payload_message(other.as_ref()), "non-string panic payload");
    }

    #[test]
    fn test_render() {
        let out = sample_report().render();
        assert!(out.contains("geoguard image v"));
        assert!(out.contains("message:  index out of bounds"));
        assert!(out.contains("location: unknown"));
    }

    #[test]
    fn test_append_to_keeps_previous_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crash.log");
        let report = sample_report();

        report.append_to(&path, &Backtrace::disabled()).unwrap();
        report.append_to(&path, &Backtrace::disabled()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("index out of bounds").count(), 2);
    }
}
