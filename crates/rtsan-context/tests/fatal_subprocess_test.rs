//! Behavior that only shows up process-wide: the fatal abort path and
//! environment-driven configuration. Each test re-runs this test binary
//! filtered to itself with a marker variable set, and checks the child.

use std::env;
use std::process::{Command, Output};

use rtsan_context::fatal::die;
use rtsan_context::{ContextError, LeavePolicy, get_context_for_current_thread};

const CHILD_MARKER: &str = "RTSAN_CONTEXT_TEST_CHILD";

fn is_child(role: &str) -> bool {
    env::var(CHILD_MARKER).is_ok_and(|v| v == role)
}

fn run_child(test_name: &str, role: &str, envs: &[(&str, &str)]) -> Output {
    let exe = env::current_exe().expect("test binary path");
    Command::new(exe)
        .args([test_name, "--exact", "--nocapture", "--test-threads=1"])
        .env(CHILD_MARKER, role)
        .envs(envs.iter().copied())
        .output()
        .expect("spawn test child")
}

#[test]
fn die_reports_and_aborts() {
    if is_child("die") {
        die(ContextError::KeyCreate { code: 11 });
    }

    let out = run_child("die_reports_and_aborts", "die", &[]);
    assert!(!out.status.success());
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(out.status.signal(), Some(libc::SIGABRT));
    }
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("rtsan-context: fatal: thread-local key creation failed (code 11)\n"),
        "stderr was: {stderr}"
    );
}

#[test]
fn clamp_policy_from_environment() {
    if is_child("clamp") {
        assert_eq!(rtsan_context::config::leave_policy(), LeavePolicy::Clamp);
        let ctx = get_context_for_current_thread();
        ctx.leave_realtime();
        ctx.leave_bypass();
        assert_eq!(ctx.realtime_depth(), 0);
        assert_eq!(ctx.bypass_depth(), 0);
        ctx.enter_realtime();
        assert!(ctx.is_in_realtime_context());
        return;
    }

    let out = run_child(
        "clamp_policy_from_environment",
        "clamp",
        &[("RTSAN_CONTEXT_LEAVE_POLICY", " Clamp ")],
    );
    assert!(
        out.status.success(),
        "child failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn unset_policy_leaves_unchecked() {
    if is_child("unchecked") {
        assert_eq!(rtsan_context::config::leave_policy(), LeavePolicy::Unchecked);
        let ctx = get_context_for_current_thread();
        ctx.leave_realtime();
        assert_eq!(ctx.realtime_depth(), -1);
        return;
    }

    let out = Command::new(env::current_exe().expect("test binary path"))
        .args(["unset_policy_leaves_unchecked", "--exact", "--test-threads=1"])
        .env(CHILD_MARKER, "unchecked")
        .env_remove("RTSAN_CONTEXT_LEAVE_POLICY")
        .output()
        .expect("spawn test child");
    assert!(out.status.success());
}
