// Desktop notifications via the platform's notifier command
//
// macOS: osascript `display notification`; Linux/BSD: notify-send.
// Other platforms report an error, and the caller falls back to an in-app
// alert dialog.
//
// The command is spawned and reaped on a separate thread, so a notifier
// stuck waiting on D-Bus never stalls the frame loop. Only a command that
// cannot start counts as a failed delivery.

use super::traits::Notifier;
use crate::error::{Result, SmartPlanError};
use std::process::{Command, Stdio};

/// Shells out to the OS notification tool
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    fn command(&self, title: &str, body: &str) -> Option<Command> {
        if cfg!(target_os = "macos") {
            let script = format!(
                "display notification \"{}\" with title \"{}\"",
                escape_applescript(body),
                escape_applescript(title)
            );
            let mut cmd = Command::new("osascript");
            cmd.arg("-e").arg(script);
            Some(cmd)
        } else if cfg!(unix) {
            let mut cmd = Command::new("notify-send");
            cmd.arg("--app-name").arg(&self.app_name).arg(title).arg(body);
            Some(cmd)
        } else {
            None
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        let mut cmd = self.command(title, body).ok_or_else(|| {
            SmartPlanError::ConfigError(
                "Desktop notifications are not supported on this platform".to_string(),
            )
        })?;

        spawn_detached(cmd)
    }
}

/// Start `cmd` and log its exit status from a reaper thread
fn spawn_detached(mut cmd: Command) -> Result<()> {
    let child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    std::thread::Builder::new()
        .name("notifier".to_string())
        .spawn(move || match child.wait_with_output() {
            Ok(output) if output.status.success() => {}
            Ok(output) => tracing::warn!(
                "Notifier exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
            Err(e) => tracing::warn!("Failed to wait for notifier: {}", e),
        })?;
    Ok(())
}

fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_applescript() {
        assert_eq!(escape_applescript(r#"say "hi" \o/"#), r#"say \"hi\" \\o/"#);
    }

    #[test]
    fn test_missing_command_is_an_error() {
        let result = spawn_detached(Command::new("smartplan-missing-notifier"));
        assert!(matches!(result, Err(SmartPlanError::IoError(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_slow_notifier_does_not_block() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");

        let started = std::time::Instant::now();
        spawn_detached(cmd).unwrap();
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn test_unix_command_uses_notify_send() {
        let notifier = DesktopNotifier::new("SmartPlan");
        let cmd = notifier.command("Alarm: Standup", "Room 4").unwrap();

        assert_eq!(cmd.get_program(), "notify-send");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["--app-name", "SmartPlan", "Alarm: Standup", "Room 4"]);
    }
}
